use crate::screening::models::QualityReport;

struct SectionCheck {
    indicators: &'static [&'static str],
    penalty: f64,
    issue: &'static str,
}

const SECTION_CHECKS: &[SectionCheck] = &[
    SectionCheck {
        indicators: &["skills", "technical skills", "competencies", "expertise"],
        penalty: 20.0,
        issue: "No skills section detected",
    },
    SectionCheck {
        indicators: &["experience", "work", "employment", "career", "years"],
        penalty: 25.0,
        issue: "No experience section detected",
    },
    SectionCheck {
        indicators: &[
            "education",
            "degree",
            "university",
            "college",
            "bachelor",
            "master",
        ],
        penalty: 15.0,
        issue: "No education section detected",
    },
];

const TOO_SHORT_WORDS: usize = 100;
const DETAILED_WORDS: usize = 200;

/// Scores résumé completeness from 100 down, one fixed penalty per failed check.
/// Checks are independent; the total is floored at 0.
pub fn check_resume_quality(text: &str) -> QualityReport {
    let mut issues = Vec::new();
    let mut score = 100.0_f64;

    let word_count = text.split_whitespace().count();
    if word_count < TOO_SHORT_WORDS {
        issues.push("Resume is too short".to_string());
        score -= 30.0;
    } else if word_count < DETAILED_WORDS {
        issues.push("Resume could be more detailed".to_string());
        score -= 10.0;
    }

    let lowered = text.to_lowercase();
    for check in SECTION_CHECKS {
        if !check.indicators.iter().any(|i| lowered.contains(i)) {
            issues.push(check.issue.to_string());
            score -= check.penalty;
        }
    }

    QualityReport {
        score: score.max(0.0),
        issues,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn words(n: usize) -> String {
        vec!["lorem"; n].join(" ")
    }

    #[test]
    fn test_empty_text_hits_every_penalty() {
        let report = check_resume_quality("");
        // 100 - 30 - 20 - 25 - 15 = 10
        assert_eq!(report.score, 10.0);
        assert_eq!(
            report.issues,
            vec![
                "Resume is too short",
                "No skills section detected",
                "No experience section detected",
                "No education section detected",
            ]
        );
    }

    #[test]
    fn test_complete_resume_scores_100() {
        let text = format!(
            "Skills: Rust. Experience: 5 years. Education: University of Somewhere. {}",
            words(200)
        );
        let report = check_resume_quality(&text);
        assert_eq!(report.score, 100.0);
        assert!(report.issues.is_empty());
    }

    #[test]
    fn test_medium_length_penalty() {
        let text = format!("skills experience education {}", words(120));
        let report = check_resume_quality(&text);
        assert_eq!(report.score, 90.0);
        assert_eq!(report.issues, vec!["Resume could be more detailed"]);
    }

    #[test]
    fn test_word_count_boundaries() {
        let sections = "skills experience education";
        // 3 section words + 96 filler = 99 words
        assert!(check_resume_quality(&format!("{sections} {}", words(96)))
            .issues
            .contains(&"Resume is too short".to_string()));
        // exactly 100 words
        assert_eq!(
            check_resume_quality(&format!("{sections} {}", words(97))).issues,
            vec!["Resume could be more detailed"]
        );
        // exactly 200 words
        assert!(check_resume_quality(&format!("{sections} {}", words(197)))
            .issues
            .is_empty());
    }

    #[test]
    fn test_indicators_are_case_insensitive_substrings() {
        // "Homework" contains "work", "Mastery" contains "master"
        let text = format!("EXPERTISE Homework Mastery {}", words(200));
        let report = check_resume_quality(&text);
        assert_eq!(report.score, 100.0);
    }

    proptest! {
        #[test]
        fn prop_quality_score_within_bounds(text in ".{0,400}") {
            let report = check_resume_quality(&text);
            prop_assert!(report.score >= 0.0);
            prop_assert!(report.score <= 100.0);
        }
    }
}

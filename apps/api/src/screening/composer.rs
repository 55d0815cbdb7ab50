//! Score composition: turns skill overlap, semantic similarity and experience into one 0–100 score.
//!
//! Algorithm:
//! 1. Sub-scores in [0, 1]: skills overlap ratio, semantic similarity, experience ratio
//! 2. raw = 0.45 × skills + 0.35 × semantic + 0.20 × experience
//! 3. Missing required skills cap the result at skills + 10% of the remaining headroom
//! 4. Otherwise strong all-round profiles get a small boost
//! 5. Label: Strong (≥ 90), Moderate (≥ 50), Weak

use serde::{Deserialize, Serialize};

use crate::errors::ScreeningError;
use crate::screening::models::{
    ComponentScores, ExperienceYears, MatchLabel, ScoreResult, SkillSet,
};
use crate::screening::similarity::SemanticEstimator;

/// Neutral sub-score used when the job gives nothing to compare against.
pub const NEUTRAL_SCORE: f64 = 0.5;

/// Share of the remaining headroom a candidate with missing skills may still earn.
const MISSING_SKILL_HEADROOM: f64 = 0.10;

// ────────────────────────────────────────────────────────────────────────────
// Weights and sub-scores
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub skills: f64,
    pub semantic: f64,
    pub experience: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            skills: 0.45,
            semantic: 0.35,
            experience: 0.20,
        }
    }
}

/// The three sub-scores, each in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubScores {
    pub skills: f64,
    pub semantic: f64,
    pub experience: f64,
}

/// Overlap between required and offered skills.
///
/// Returns `(ratio, matched, missing)`, both lists sorted. An empty requirement
/// set yields the neutral score and two empty lists.
pub fn skills_score(jd_skills: &SkillSet, resume_skills: &SkillSet) -> (f64, Vec<String>, Vec<String>) {
    if jd_skills.is_empty() {
        return (NEUTRAL_SCORE, vec![], vec![]);
    }

    let matched: Vec<String> = jd_skills.intersection(resume_skills).cloned().collect();
    let missing: Vec<String> = jd_skills.difference(resume_skills).cloned().collect();
    let ratio = matched.len() as f64 / jd_skills.len() as f64;
    (ratio, matched, missing)
}

/// 0.5 when the job states no requirement, 1.0 at or above it, linear below.
pub fn experience_score(jd_years: ExperienceYears, resume_years: ExperienceYears) -> f64 {
    if jd_years == 0 {
        return NEUTRAL_SCORE;
    }
    if resume_years >= jd_years {
        return 1.0;
    }
    (f64::from(resume_years) / f64::from(jd_years)).clamp(0.0, 1.0)
}

// ────────────────────────────────────────────────────────────────────────────
// Composition
// ────────────────────────────────────────────────────────────────────────────

/// Applies the missing-skill cap or the graduated boost to the weighted sum.
/// Returns the final value in [0, 1].
fn adjust(raw: f64, sub: SubScores, has_missing: bool, jd_skill_count: usize) -> f64 {
    if has_missing && jd_skill_count > 0 {
        let max_allowed = sub.skills + (1.0 - sub.skills) * MISSING_SKILL_HEADROOM;
        return max_allowed.min(raw);
    }

    if sub.skills >= 0.8 && sub.semantic >= 0.8 && sub.experience >= 0.8 {
        (raw * 1.10).min(1.0)
    } else if sub.skills >= 0.9 && sub.semantic >= 0.7 && sub.experience >= 0.7 {
        (raw * 1.05).min(0.95)
    } else {
        raw.min(1.0)
    }
}

/// Pure composition step: everything after the three sub-scores are known.
pub fn compose(
    sub: SubScores,
    matched_skills: Vec<String>,
    missing_skills: Vec<String>,
    jd_skill_count: usize,
    weights: &ScoringWeights,
) -> ScoreResult {
    let raw = weights.skills * sub.skills
        + weights.semantic * sub.semantic
        + weights.experience * sub.experience;

    let adjusted = adjust(raw, sub, !missing_skills.is_empty(), jd_skill_count);
    let score = (adjusted * 100.0).clamp(0.0, 100.0);

    let explanation = format!(
        "Skills match: {:.2}, Semantic match: {:.2}, Experience match: {:.2}. Final score (0-100): {:.1}.",
        sub.skills, sub.semantic, sub.experience, score
    );

    ScoreResult {
        score,
        matched_skills,
        missing_skills,
        explanation,
        component_scores: ComponentScores {
            skills: round1(sub.skills * 100.0),
            semantic: round1(sub.semantic * 100.0),
            experience: round1(sub.experience * 100.0),
        },
        match_label: MatchLabel::from_score(score),
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

// ────────────────────────────────────────────────────────────────────────────
// ScoreComposer: binds the composition to a similarity backend
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct ScoreComposer {
    estimator: SemanticEstimator,
    weights: ScoringWeights,
}

impl ScoreComposer {
    pub fn new(estimator: SemanticEstimator) -> Self {
        Self {
            estimator,
            weights: ScoringWeights::default(),
        }
    }

    pub fn estimator(&self) -> &SemanticEstimator {
        &self.estimator
    }

    /// Scores one résumé against one job description. Fails only when the
    /// similarity backend does.
    pub fn compute_score(
        &self,
        jd_text: &str,
        resume_text: &str,
        jd_skills: &SkillSet,
        resume_skills: &SkillSet,
        jd_years: ExperienceYears,
        resume_years: ExperienceYears,
    ) -> Result<ScoreResult, ScreeningError> {
        let semantic = self.estimator.similarity(jd_text, resume_text)?;
        let (skills, matched, missing) = skills_score(jd_skills, resume_skills);
        let experience = experience_score(jd_years, resume_years);

        let sub = SubScores {
            skills,
            semantic,
            experience,
        };
        Ok(compose(sub, matched, missing, jd_skills.len(), &self.weights))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screening::similarity::SimilarityBackend;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use std::sync::Arc;

    struct FixedSimilarity(f64);

    impl SimilarityBackend for FixedSimilarity {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn similarity(&self, _: &str, _: &str) -> Result<f64, ScreeningError> {
            Ok(self.0)
        }
    }

    fn composer(semantic: f64) -> ScoreComposer {
        ScoreComposer::new(SemanticEstimator::with_backend(Arc::new(FixedSimilarity(semantic))))
    }

    fn set(skills: &[&str]) -> SkillSet {
        skills.iter().map(|s| s.to_string()).collect()
    }

    fn compose_sub(skills: f64, semantic: f64, experience: f64, missing: usize, jd: usize) -> ScoreResult {
        let missing = (0..missing).map(|i| format!("skill{i}")).collect();
        compose(
            SubScores {
                skills,
                semantic,
                experience,
            },
            vec![],
            missing,
            jd,
            &ScoringWeights::default(),
        )
    }

    #[test]
    fn test_missing_skill_cap_scenario() {
        let result = composer(0.8)
            .compute_score("jd", "resume", &set(&["python", "sql"]), &set(&["python"]), 3, 5)
            .unwrap();
        // raw 0.705 capped at 0.5 + 0.5 * 0.10 = 0.55
        assert!((result.score - 55.0).abs() < 1e-9, "score was {}", result.score);
        assert_eq!(result.match_label, MatchLabel::Moderate);
        assert_eq!(result.matched_skills, vec!["python"]);
        assert_eq!(result.missing_skills, vec!["sql"]);
        assert_eq!(
            result.component_scores,
            ComponentScores {
                skills: 50.0,
                semantic: 80.0,
                experience: 100.0
            }
        );
    }

    #[test]
    fn test_empty_jd_skills_scenario() {
        let result = composer(0.5)
            .compute_score("jd", "resume", &set(&[]), &set(&["java"]), 0, 0)
            .unwrap();
        assert_eq!(result.score, 50.0);
        assert_eq!(result.match_label, MatchLabel::Moderate);
        assert!(result.matched_skills.is_empty());
        assert!(result.missing_skills.is_empty());
    }

    #[test]
    fn test_full_boost_when_all_components_strong() {
        let result = composer(0.9)
            .compute_score("jd", "resume", &set(&["rust"]), &set(&["rust", "go"]), 2, 4)
            .unwrap();
        // raw = 0.45 + 0.315 + 0.2 = 0.965 → ×1.10 capped at 1.0
        assert_eq!(result.score, 100.0);
        assert_eq!(result.match_label, MatchLabel::Strong);
    }

    #[test]
    fn test_partial_boost_capped_at_95() {
        // skills 1.0, semantic 0.75, experience 0.75: second tier
        let result = compose_sub(1.0, 0.75, 0.75, 0, 4);
        // raw = 0.45 + 0.2625 + 0.15 = 0.8625 → ×1.05 = 0.905625
        assert!((result.score - 90.5625).abs() < 1e-9);

        let result = compose_sub(1.0, 0.79, 1.0, 0, 4);
        // raw = 0.45 + 0.2765 + 0.2 = 0.9265 → ×1.05 = 0.972825 → capped 0.95
        assert!((result.score - 95.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_boost_for_middling_profile() {
        let result = compose_sub(1.0, 0.5, 1.0, 0, 2);
        // raw = 0.45 + 0.175 + 0.2 = 0.825
        assert!((result.score - 82.5).abs() < 1e-9);
    }

    #[test]
    fn test_empty_jd_never_caps_even_with_boostable_scores() {
        // jd has no skills: neutral 0.5 skills never reaches a boost tier
        let result = compose_sub(NEUTRAL_SCORE, 1.0, 1.0, 0, 0);
        // raw = 0.225 + 0.35 + 0.2 = 0.775
        assert!((result.score - 77.5).abs() < 1e-9);
    }

    #[test]
    fn test_zero_match_capped_at_ten() {
        let result = compose_sub(0.0, 1.0, 1.0, 3, 3);
        assert!((result.score - 10.0).abs() < 1e-9);
        assert_eq!(result.match_label, MatchLabel::Weak);
    }

    #[test]
    fn test_experience_score_rules() {
        assert_eq!(experience_score(0, 10), NEUTRAL_SCORE);
        assert_eq!(experience_score(3, 3), 1.0);
        assert_eq!(experience_score(3, 7), 1.0);
        assert!((experience_score(4, 1) - 0.25).abs() < 1e-12);
        assert_eq!(experience_score(5, 0), 0.0);
    }

    #[test]
    fn test_skills_score_lists_are_sorted() {
        let (ratio, matched, missing) =
            skills_score(&set(&["sql", "aws", "python", "docker"]), &set(&["python", "aws", "java"]));
        assert_eq!(ratio, 0.5);
        assert_eq!(matched, vec!["aws", "python"]);
        assert_eq!(missing, vec!["docker", "sql"]);
    }

    #[test]
    fn test_explanation_format() {
        let result = compose_sub(0.5, 0.8, 1.0, 1, 2);
        assert_eq!(
            result.explanation,
            "Skills match: 0.50, Semantic match: 0.80, Experience match: 1.00. Final score (0-100): 55.0."
        );
    }

    #[test]
    fn test_backend_error_propagates() {
        struct Broken;
        impl SimilarityBackend for Broken {
            fn name(&self) -> &'static str {
                "broken"
            }
            fn similarity(&self, _: &str, _: &str) -> Result<f64, ScreeningError> {
                Err(ScreeningError::Similarity("offline".to_string()))
            }
        }
        let composer = ScoreComposer::new(SemanticEstimator::with_backend(Arc::new(Broken)));
        let err = composer
            .compute_score("jd", "resume", &set(&[]), &set(&[]), 0, 0)
            .unwrap_err();
        assert!(matches!(err, ScreeningError::Similarity(_)));
    }

    proptest! {
        #[test]
        fn prop_scores_within_bounds(
            skills in 0.0f64..=1.0,
            semantic in 0.0f64..=1.0,
            experience in 0.0f64..=1.0,
            missing in 0usize..4,
        ) {
            let result = compose_sub(skills, semantic, experience, missing, 4);
            prop_assert!((0.0..=100.0).contains(&result.score));
            let c = result.component_scores;
            for v in [c.skills, c.semantic, c.experience] {
                prop_assert!((0.0..=100.0).contains(&v));
            }
        }

        #[test]
        fn prop_missing_skills_cap(
            jd_count in 1usize..12,
            matched_seed in 0usize..12,
            semantic in 0.0f64..=1.0,
            experience in 0.0f64..=1.0,
        ) {
            let matched = matched_seed % jd_count; // always at least one missing
            let skills = matched as f64 / jd_count as f64;
            let result = compose_sub(skills, semantic, experience, jd_count - matched, jd_count);
            let cap = skills * 100.0 + (100.0 - skills * 100.0) * 0.10;
            prop_assert!(result.score <= cap + 1e-9);
        }

        #[test]
        fn prop_more_matches_never_lower_capped_score(
            jd_count in 2usize..12,
            matched_seed in 0usize..12,
            semantic in 0.0f64..=1.0,
            experience in 0.0f64..=1.0,
        ) {
            // both sides keep at least one missing skill
            let matched = matched_seed % (jd_count - 1);
            let lower = compose_sub(
                matched as f64 / jd_count as f64, semantic, experience, jd_count - matched, jd_count,
            );
            let higher = compose_sub(
                (matched + 1) as f64 / jd_count as f64, semantic, experience, jd_count - matched - 1, jd_count,
            );
            prop_assert!(higher.score >= lower.score - 1e-9);
        }
    }
}

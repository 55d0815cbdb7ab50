//! Skill extraction: folds free text into canonical skills and a years-of-experience estimate.
//!
//! Matching rules:
//! - single-word vocabulary entries must appear as a whole token
//! - multi-word entries match as a substring of the lowercased text, so
//!   "machine learning" also hits inside "machine learningish"
//! - synonyms add their canonical name, never the variant itself

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::ScreeningError;
use crate::screening::models::{ExperienceYears, SkillSet};

static TOKEN_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-zA-Z+\\.]+").unwrap());
static YEARS_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)\+?\s+years?").unwrap());

const DEFAULT_SKILLS: &[&str] = &[
    "python",
    "java",
    "javascript",
    "typescript",
    "react",
    "node",
    "django",
    "flask",
    "fastapi",
    "machine learning",
    "deep learning",
    "nlp",
    "ml",
    "pandas",
    "numpy",
    "scikit-learn",
    "sql",
    "nosql",
    "postgresql",
    "mysql",
    "mongodb",
    "docker",
    "kubernetes",
    "aws",
    "gcp",
    "azure",
];

const DEFAULT_SYNONYMS: &[(&str, &[&str])] = &[
    ("nlp", &["natural language processing"]),
    ("ml", &["machine learning"]),
    ("fastapi", &["api", "backend api"]),
    ("python", &["python3"]),
];

/// Skill vocabulary plus synonym map (canonical → variant phrases).
///
/// Built once at startup and handed to the extractor; never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillVocabulary {
    pub skills: BTreeSet<String>,
    #[serde(default)]
    pub synonyms: BTreeMap<String, Vec<String>>,
}

impl Default for SkillVocabulary {
    fn default() -> Self {
        Self {
            skills: DEFAULT_SKILLS.iter().map(|s| s.to_string()).collect(),
            synonyms: DEFAULT_SYNONYMS
                .iter()
                .map(|(canon, variants)| {
                    (
                        canon.to_string(),
                        variants.iter().map(|v| v.to_string()).collect(),
                    )
                })
                .collect(),
        }
    }
}

impl SkillVocabulary {
    /// Parses a JSON vocabulary (`{"skills": [...], "synonyms": {...}}`).
    /// Entries are trimmed and lowercased; blanks are dropped.
    pub fn from_json(json: &str) -> Result<Self, ScreeningError> {
        let raw: SkillVocabulary =
            serde_json::from_str(json).map_err(|e| ScreeningError::Vocabulary(e.to_string()))?;
        raw.normalized()
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ScreeningError> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            ScreeningError::Vocabulary(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json(&json)
    }

    fn normalized(self) -> Result<Self, ScreeningError> {
        let skills: BTreeSet<String> = self
            .skills
            .iter()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();

        let mut synonyms = BTreeMap::new();
        for (canon, variants) in self.synonyms {
            let canon = canon.trim().to_lowercase();
            if canon.is_empty() {
                return Err(ScreeningError::Vocabulary(
                    "synonym map contains an empty canonical skill".to_string(),
                ));
            }
            let variants: Vec<String> = variants
                .iter()
                .map(|v| v.trim().to_lowercase())
                .filter(|v| !v.is_empty())
                .collect();
            synonyms.entry(canon).or_insert_with(Vec::new).extend(variants);
        }

        if skills.is_empty() && synonyms.is_empty() {
            return Err(ScreeningError::Vocabulary(
                "vocabulary declares no skills".to_string(),
            ));
        }

        Ok(Self { skills, synonyms })
    }

    /// Every name the extractor can ever emit.
    pub fn canonical_names(&self) -> BTreeSet<String> {
        self.skills
            .iter()
            .chain(self.synonyms.keys())
            .cloned()
            .collect()
    }
}

/// Pure extractor over an injected vocabulary.
#[derive(Debug, Clone, Default)]
pub struct SkillExtractor {
    vocabulary: SkillVocabulary,
}

impl SkillExtractor {
    pub fn new(vocabulary: SkillVocabulary) -> Self {
        Self { vocabulary }
    }

    pub fn vocabulary(&self) -> &SkillVocabulary {
        &self.vocabulary
    }

    /// Returns the canonical skills found in `text` and the largest "N years" figure.
    pub fn extract(&self, text: &str) -> (SkillSet, ExperienceYears) {
        let lowered = text.to_lowercase();
        let tokens: HashSet<&str> = TOKEN_PATTERN
            .find_iter(&lowered)
            .map(|m| m.as_str())
            .collect();

        let mut skills = SkillSet::new();

        for skill in &self.vocabulary.skills {
            if phrase_present(skill, &lowered, &tokens) {
                skills.insert(skill.clone());
            }
        }

        for (canon, variants) in &self.vocabulary.synonyms {
            if variants
                .iter()
                .any(|variant| phrase_present(variant, &lowered, &tokens))
            {
                skills.insert(canon.clone());
            }
        }

        (skills, extract_years(&lowered))
    }

    /// List form of [`extract`](Self::extract): skills sorted and unique.
    pub fn extract_skills_and_experience(&self, text: &str) -> (Vec<String>, ExperienceYears) {
        let (skills, years) = self.extract(text);
        (skills.into_iter().collect(), years)
    }
}

fn phrase_present(phrase: &str, lowered: &str, tokens: &HashSet<&str>) -> bool {
    if phrase.contains(' ') {
        lowered.contains(phrase)
    } else {
        tokens.contains(phrase)
    }
}

/// Max over every "<digits>[+] year(s)" occurrence. Figures too large for u32 are ignored.
fn extract_years(lowered: &str) -> ExperienceYears {
    YEARS_PATTERN
        .captures_iter(lowered)
        .filter_map(|caps| caps.get(1)?.as_str().parse::<ExperienceYears>().ok())
        .max()
        .unwrap_or(0)
}

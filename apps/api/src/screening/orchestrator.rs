//! Batch screening: scores a batch of résumés against one job description and ranks them.

use std::panic::{catch_unwind, AssertUnwindSafe};

use chrono::Utc;
use rayon::prelude::*;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::errors::ScreeningError;
use crate::screening::composer::ScoreComposer;
use crate::screening::models::{
    CandidateInput, CandidateResult, ComponentScores, ExperienceYears, MatchLabel, ScoreResult,
    ScreeningReport, SkillSet,
};
use crate::screening::quality::check_resume_quality;
use crate::screening::skills::SkillExtractor;

/// Number of missing skills spelled out in a gap message.
const GAP_MESSAGE_SKILLS: usize = 3;

#[derive(Clone)]
pub struct Screener {
    extractor: SkillExtractor,
    composer: ScoreComposer,
}

impl Screener {
    pub fn new(extractor: SkillExtractor, composer: ScoreComposer) -> Self {
        Self {
            extractor,
            composer,
        }
    }

    pub fn extractor(&self) -> &SkillExtractor {
        &self.extractor
    }

    pub fn semantic_backend(&self) -> &'static str {
        self.composer.estimator().backend_name()
    }

    /// Scores a single résumé against a job description, extracting both sides.
    pub fn score_pair(&self, job_description: &str, resume_text: &str) -> Result<ScoreResult, ScreeningError> {
        let (jd_skills, jd_years) = self.extractor.extract(job_description);
        let (resume_skills, resume_years) = self.extractor.extract(resume_text);
        self.composer.compute_score(
            job_description,
            resume_text,
            &jd_skills,
            &resume_skills,
            jd_years,
            resume_years,
        )
    }

    /// Scores every candidate and returns them best first.
    ///
    /// Candidates are scored in parallel. Equal scores keep input order; a
    /// candidate that fails to score is reported with `error` set and ranked
    /// after every scored one.
    pub fn screen(&self, job_description: &str, candidates: &[CandidateInput]) -> ScreeningReport {
        let (jd_skills, jd_years) = self.extractor.extract(job_description);

        let mut results: Vec<CandidateResult> = candidates
            .par_iter()
            .map(|candidate| self.screen_candidate(job_description, &jd_skills, jd_years, candidate))
            .collect();

        results.sort_by(|a, b| {
            a.error
                .is_some()
                .cmp(&b.error.is_some())
                .then_with(|| b.score.total_cmp(&a.score))
        });

        let failed = results.iter().filter(|r| r.error.is_some()).count();
        info!(
            candidates = results.len(),
            failed,
            job_skills = jd_skills.len(),
            backend = self.semantic_backend(),
            "Screening batch complete"
        );

        ScreeningReport {
            screening_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            semantic_backend: self.semantic_backend(),
            job_skills: jd_skills.into_iter().collect(),
            job_years: jd_years,
            results,
        }
    }

    fn screen_candidate(
        &self,
        job_description: &str,
        jd_skills: &SkillSet,
        jd_years: ExperienceYears,
        candidate: &CandidateInput,
    ) -> CandidateResult {
        let (resume_skills, resume_years) = self.extractor.extract(&candidate.text);
        let quality = check_resume_quality(&candidate.text);
        let anonymized_name = format!("Candidate {}", candidate.id);

        // A panicking backend (ONNX runtime, model code) fails this candidate only
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            self.composer.compute_score(
                job_description,
                &candidate.text,
                jd_skills,
                &resume_skills,
                jd_years,
                resume_years,
            )
        }))
        .unwrap_or_else(|_| {
            Err(ScreeningError::Similarity(
                "similarity backend panicked".to_string(),
            ))
        });

        match outcome {
            Ok(scored) => {
                debug!(
                    candidate = %candidate.id,
                    score = scored.score,
                    label = %scored.match_label,
                    "Scored candidate"
                );
                CandidateResult {
                    id: candidate.id.clone(),
                    anonymized_name,
                    score: round_to(scored.score, 2),
                    gap_message: build_gap_message(&scored.missing_skills),
                    matched_skills: scored.matched_skills,
                    missing_skills: scored.missing_skills,
                    explanation: scored.explanation,
                    component_scores: scored.component_scores,
                    match_label: scored.match_label,
                    quality_score: round_to(quality.score, 1),
                    quality_issues: quality.issues,
                    resume_years,
                    resume_text: candidate.text.clone(),
                    error: None,
                }
            }
            Err(e) => {
                warn!(candidate = %candidate.id, "Candidate could not be scored: {e}");
                CandidateResult {
                    id: candidate.id.clone(),
                    anonymized_name,
                    score: 0.0,
                    matched_skills: vec![],
                    missing_skills: vec![],
                    explanation: format!("Scoring failed: {e}"),
                    component_scores: ComponentScores {
                        skills: 0.0,
                        semantic: 0.0,
                        experience: 0.0,
                    },
                    match_label: MatchLabel::Weak,
                    quality_score: round_to(quality.score, 1),
                    quality_issues: quality.issues,
                    gap_message: String::new(),
                    resume_years,
                    resume_text: candidate.text.clone(),
                    error: Some(e.to_string()),
                }
            }
        }
    }
}

/// "Candidate needs: a, b, c (+N more) to match role." Empty when nothing is missing.
pub fn build_gap_message(missing: &[String]) -> String {
    if missing.is_empty() {
        return String::new();
    }

    let shown: Vec<&str> = missing
        .iter()
        .take(GAP_MESSAGE_SKILLS)
        .map(String::as_str)
        .collect();
    let mut message = format!("Candidate needs: {}", shown.join(", "));
    if missing.len() > GAP_MESSAGE_SKILLS {
        message.push_str(&format!(
            " (+{} more) to match role.",
            missing.len() - GAP_MESSAGE_SKILLS
        ));
    }
    message
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round() / factor
}

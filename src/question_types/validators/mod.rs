// src/question_types/validators/mod.rs

//! One validator per question type.
//!
//! Every validator has a non-staged path, which checks fields on the payload
//! itself, and a staged path, which applies the same rule to each stage's
//! content and reports the first failing stage by its 1-based position.

mod choices;
mod media;
mod words;

use serde_json::Value;

pub use choices::{ClickCorrectImage, DragToBox, ImageOrdering, LookAndPickBox};
pub use media::{Dialogue, GiveImageAskText, ListenAndChoose, VideoListening};
pub use words::{ImageFillBlank, ImageToWord, LookAndOrderCorrectly, SurpriseWord};

use super::payload::{Payload, stage_content};
use super::rejection::{Rejection, ValidationResult};

pub const OPTIONS_REQUIRED: &str = "options required";

/// Staging information derived from a submission.
#[derive(Debug, Clone, Copy)]
pub struct StageContext<'a> {
    /// The `staged` flag as submitted.
    pub is_staged: bool,
    /// `staged` is set and at least one stage was supplied.
    pub staged_filled: bool,
    pub stages: &'a [Value],
}

impl<'a> StageContext<'a> {
    pub fn from_payload(payload: &Payload<'a>) -> Self {
        let is_staged = payload.is_staged();
        let stages = payload.stages();
        Self {
            is_staged,
            staged_filled: is_staged && !stages.is_empty(),
            stages,
        }
    }
}

pub trait QuestionValidator: Send + Sync {
    fn validate(&self, payload: &Payload<'_>, ctx: &StageContext<'_>) -> ValidationResult;
}

/// Runs `check` against every stage's content when the staged branch applies.
///
/// Returns `None` when there are no stages to check, so the caller falls
/// through to its non-staged rules.
fn check_stages<F>(ctx: &StageContext<'_>, check: F) -> Option<ValidationResult>
where
    F: Fn(&Payload<'_>) -> ValidationResult,
{
    if !ctx.staged_filled || ctx.stages.is_empty() {
        return None;
    }
    for (index, stage) in ctx.stages.iter().enumerate() {
        let content = stage_content(stage);
        if let Err(rejection) = check(&Payload::new(&content)) {
            return Some(Err(rejection.at_stage(index + 1)));
        }
    }
    Some(Ok(()))
}

fn require_text(view: &Payload<'_>, keys: &[&str], message: &str) -> ValidationResult {
    match view.text(keys) {
        Some(_) => Ok(()),
        None => Err(Rejection::new(message)),
    }
}

/// Types whose only structural rule is a non-empty options list.
pub struct OptionsOnly;

impl QuestionValidator for OptionsOnly {
    fn validate(&self, payload: &Payload<'_>, ctx: &StageContext<'_>) -> ValidationResult {
        if ctx.staged_filled || !payload.options().is_empty() {
            Ok(())
        } else {
            Err(Rejection::new(OPTIONS_REQUIRED))
        }
    }
}

/// Recognized types without a known structural contract.
pub struct Unconstrained;

impl QuestionValidator for Unconstrained {
    fn validate(&self, _payload: &Payload<'_>, _ctx: &StageContext<'_>) -> ValidationResult {
        Ok(())
    }
}

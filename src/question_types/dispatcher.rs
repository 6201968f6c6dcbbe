// src/question_types/dispatcher.rs

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use super::{
    payload::Payload,
    registry::{QuestionType, is_recognized},
    rejection::{Rejection, ValidationResult},
    validators::{self, OPTIONS_REQUIRED, QuestionValidator, StageContext},
};

const INVALID_TYPE: &str = "valid question type required";

/// Which wizard a submission came from. Both share the same rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentDomain {
    Activity,
    Book,
}

impl fmt::Display for ContentDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentDomain::Activity => f.write_str("activity"),
            ContentDomain::Book => f.write_str("book"),
        }
    }
}

/// Options policy for `question_type`.
///
/// The domain is accepted so a rule specific to one wizard can be added
/// here; today both wizards use the same exemptions.
pub fn requires_options(question_type: QuestionType, _domain: ContentDomain) -> bool {
    question_type.requires_options()
}

/// Validator for a type id; ids outside the registry get the options-only rule.
pub fn validator_for(type_id: &str) -> &'static dyn QuestionValidator {
    validator_of(QuestionType::from_id(type_id))
}

fn validator_of(question_type: Option<QuestionType>) -> &'static dyn QuestionValidator {
    question_type
        .map(QuestionType::validator)
        .unwrap_or(&validators::OptionsOnly)
}

/// Validates a new question.
pub fn validate_for_create(body: &Value, domain: ContentDomain) -> ValidationResult {
    let payload = Payload::new(body);
    let Some(question_type) = payload.type_id().and_then(QuestionType::from_id) else {
        tracing::debug!(%domain, type_id = ?payload.type_id(), "rejected unrecognized question type");
        return Err(Rejection::new(INVALID_TYPE));
    };
    run(&payload, Some(question_type), domain)
}

/// Validates an update whose type was resolved from the stored question and
/// any override in the body. The type is not checked against the registry.
pub fn validate_for_update(
    body: &Value,
    resolved_type: &str,
    domain: ContentDomain,
) -> ValidationResult {
    let payload = Payload::new(body);
    run(&payload, QuestionType::from_id(resolved_type), domain)
}

/// The type named in an update body, if any. A named type must be in the
/// registry; only a type already stored may fall outside it.
pub fn requested_update_type(body: &Value) -> Result<Option<&str>, Rejection> {
    match Payload::new(body).type_id().filter(|t| !t.trim().is_empty()) {
        Some(type_id) if !is_recognized(type_id) => {
            tracing::debug!(type_id, "rejected unrecognized question type on update");
            Err(Rejection::new(INVALID_TYPE))
        }
        requested => Ok(requested),
    }
}

/// The type an update should be validated as: the body's `type` when given,
/// otherwise the stored one.
pub fn resolve_update_type<'a>(
    body: &'a Value,
    stored: Option<&'a str>,
) -> Result<Option<&'a str>, Rejection> {
    Ok(requested_update_type(body)?.or(stored))
}

fn run(
    payload: &Payload<'_>,
    question_type: Option<QuestionType>,
    domain: ContentDomain,
) -> ValidationResult {
    let ctx = StageContext::from_payload(payload);

    if ctx.is_staged && ctx.stages.is_empty() {
        return Err(Rejection::new(
            "at least one stage required for staged question",
        ));
    }

    let options_required = question_type.is_none_or(|t| requires_options(t, domain));
    if options_required && !ctx.staged_filled && payload.options().is_empty() {
        return Err(Rejection::new(OPTIONS_REQUIRED));
    }

    let result = validator_of(question_type).validate(payload, &ctx);
    if let Err(rejection) = &result {
        tracing::debug!(%domain, question_type = ?question_type, %rejection, "question rejected");
    }
    result
}

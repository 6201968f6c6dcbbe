// src/question_types/validators/words.rs

use serde_json::Value;

use super::{QuestionValidator, StageContext, check_stages, require_text};
use crate::question_types::{
    payload::{Payload, as_index, fields, lookup, non_empty_text},
    rejection::{Rejection, ValidationResult},
};

/// `gorsele_uygun_kelime`: an image and the word it depicts.
pub struct ImageToWord;

fn image_to_word(view: &Payload<'_>) -> ValidationResult {
    require_text(view, fields::IMAGE, "question image is required")?;
    require_text(view, fields::CORRECT_WORD, "correct word is required")
}

impl QuestionValidator for ImageToWord {
    fn validate(&self, payload: &Payload<'_>, ctx: &StageContext<'_>) -> ValidationResult {
        check_stages(ctx, image_to_word).unwrap_or_else(|| image_to_word(payload))
    }
}

/// `bak_ve_dogru_sirala`: an image and the sentence the words must be ordered into.
pub struct LookAndOrderCorrectly;

fn look_and_order(view: &Payload<'_>) -> ValidationResult {
    require_text(view, fields::IMAGE, "question image is required")?;
    require_text(view, fields::CORRECT_SENTENCE, "correct sentence is required")
}

impl QuestionValidator for LookAndOrderCorrectly {
    fn validate(&self, payload: &Payload<'_>, ctx: &StageContext<'_>) -> ValidationResult {
        check_stages(ctx, look_and_order).unwrap_or_else(|| look_and_order(payload))
    }
}

/// `gorsele_gore_bosluk_doldur`: a full sentence with one or more words
/// blanked out by their word position.
pub struct ImageFillBlank;

fn image_fill_blank(view: &Payload<'_>) -> ValidationResult {
    require_text(view, fields::IMAGE, "question image is required")?;
    let sentence = view
        .text(fields::CORRECT_SENTENCE)
        .ok_or_else(|| Rejection::new("correct sentence is required"))?;
    check_blanks(&sentence, view.get(fields::BLANK_INDICES))
}

fn check_blanks(sentence: &str, blanks: Option<&Value>) -> ValidationResult {
    let word_count = sentence.split_whitespace().count();
    if word_count == 0 {
        return Err(Rejection::new(
            "correct sentence must contain at least one word",
        ));
    }

    let indices = match blanks.and_then(Value::as_array) {
        Some(indices) if !indices.is_empty() => indices,
        _ => return Err(Rejection::new("select at least one blank word")),
    };

    // Repeated indices name the same blank and are accepted.
    for raw in indices {
        match as_index(Some(raw)) {
            Some(index) if index >= 0 && (index as usize) < word_count => {}
            _ => return Err(Rejection::new(format!("invalid blank index: {}", raw))),
        }
    }
    Ok(())
}

impl QuestionValidator for ImageFillBlank {
    fn validate(&self, payload: &Payload<'_>, ctx: &StageContext<'_>) -> ValidationResult {
        check_stages(ctx, image_fill_blank).unwrap_or_else(|| image_fill_blank(payload))
    }
}

/// `surpriz_kelime`: two word groups the surprise word can be dropped into.
pub struct SurpriseWord;

fn group_has_word(group: Option<&Value>) -> bool {
    group
        .and_then(|g| lookup(g, fields::WORDS))
        .and_then(Value::as_array)
        .is_some_and(|words| words.iter().any(|w| non_empty_text(Some(w)).is_some()))
}

fn surprise_word(view: &Payload<'_>) -> ValidationResult {
    if group_has_word(view.get(fields::GROUP1)) && group_has_word(view.get(fields::GROUP2)) {
        Ok(())
    } else {
        Err(Rejection::new(
            "group 1 and group 2 each need at least one word",
        ))
    }
}

impl QuestionValidator for SurpriseWord {
    fn validate(&self, payload: &Payload<'_>, ctx: &StageContext<'_>) -> ValidationResult {
        check_stages(ctx, surprise_word).unwrap_or_else(|| surprise_word(payload))
    }
}

// src/question_types/normalize.rs

//! Turns an already validated submission into persistence parameters.

use serde_json::Value;

use super::dispatcher::ContentDomain;
use super::payload::{
    Payload, as_index, as_number, fields, is_truthy, lookup, non_empty_text, stage_content,
};
use crate::utils::html::clean_html;

/// Trimmed text, or `None` when absent or blank. Numbers are kept as their text.
pub fn trim_or_null(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Number(n) => Some(n.to_string()),
        other => non_empty_text(Some(other)),
    }
}

/// Finite number, or `None` for absent, blank or non-numeric input. Zero is kept.
pub fn num_or_null(value: Option<&Value>) -> Option<f64> {
    as_number(value)
}

/// Stored correctness marker: 1 for `true`, `1`, `"1"`, `"true"`; 0 otherwise.
pub fn correct_flag(value: Option<&Value>) -> i16 {
    i16::from(is_truthy(value))
}

/// Stage content as the JSON value to store.
pub fn stage_content_json(stage: &Value) -> Value {
    stage_content(stage)
}

#[derive(Debug, Clone, PartialEq)]
pub struct StageRow {
    pub stage_number: i32,
    pub content: Value,
}

/// Stage rows for a staged submission; empty when the question is not staged.
pub fn stage_rows(payload: &Payload<'_>) -> Vec<StageRow> {
    if !payload.is_staged() {
        return Vec::new();
    }
    payload
        .stages()
        .iter()
        .enumerate()
        .map(|(index, stage)| {
            let stage_number = as_index(lookup(stage, fields::STAGE_NUMBER))
                .filter(|n| *n >= 1)
                .and_then(|n| i32::try_from(n).ok())
                .unwrap_or(index as i32 + 1);
            StageRow {
                stage_number,
                content: stage_content_json(stage),
            }
        })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuestionFields {
    pub question_number: Option<i64>,
    pub name: Option<String>,
    pub question_text: Option<String>,
    pub instruction: Option<String>,
    pub instruction_audio: Option<String>,
    pub option_background_image: Option<String>,
    pub video_url: Option<String>,
    pub image: Option<String>,
    pub audio: Option<String>,
    pub background_image: Option<String>,
    pub background_image_portrait: Option<String>,
    pub check_mark_image: Option<String>,
    pub points: Option<i32>,
    pub stars: Option<i32>,
    pub extra: Option<Value>,
    pub staged: bool,
}

impl QuestionFields {
    /// Value for the question image column. Books have no background columns,
    /// so a scene image submitted as a background is stored as the question image.
    pub fn stored_image(&self, domain: ContentDomain) -> Option<String> {
        match domain {
            ContentDomain::Activity => self.image.clone(),
            ContentDomain::Book => self.image.clone().or_else(|| self.background_image.clone()),
        }
    }
}

fn sanitized(value: Option<&Value>) -> Option<String> {
    trim_or_null(value)
        .map(|text| clean_html(&text))
        .filter(|text| !text.trim().is_empty())
}

/// Extra info to store. Strings are decoded when they hold JSON and kept as a
/// JSON string otherwise.
fn extra_json(value: Option<&Value>) -> Option<Value> {
    match value? {
        Value::String(raw) if raw.trim().is_empty() => None,
        Value::String(raw) => {
            Some(serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.clone())))
        }
        other => Some(other.clone()),
    }
}

pub fn question_fields(payload: &Payload<'_>) -> QuestionFields {
    let root = payload.root();
    let get = |keys: &[&str]| lookup(root, keys);
    let whole = |keys: &[&str]| {
        num_or_null(get(keys))
            .filter(|n| *n >= 0.0)
            .map(|n| n.round() as i32)
    };

    QuestionFields {
        question_number: as_index(get(fields::QUESTION_NUMBER)).filter(|n| *n >= 1),
        name: sanitized(get(fields::NAME)),
        question_text: sanitized(get(fields::QUESTION_TEXT)),
        instruction: sanitized(get(fields::INSTRUCTION)),
        instruction_audio: trim_or_null(get(fields::INSTRUCTION_AUDIO)),
        option_background_image: trim_or_null(get(fields::OPTION_BACKGROUND_IMAGE)),
        video_url: trim_or_null(get(fields::VIDEO_URL)),
        image: trim_or_null(get(fields::IMAGE)),
        audio: trim_or_null(get(fields::AUDIO)),
        background_image: trim_or_null(get(fields::BACKGROUND_IMAGE)),
        background_image_portrait: trim_or_null(get(fields::BACKGROUND_IMAGE_PORTRAIT)),
        check_mark_image: trim_or_null(get(fields::CHECK_MARK_IMAGE)),
        points: whole(fields::POINTS),
        stars: whole(fields::STARS),
        extra: extra_json(get(fields::EXTRA)),
        staged: payload.is_staged(),
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionRow {
    pub text: Option<String>,
    pub image: Option<String>,
    pub audio: Option<String>,
    pub color: Option<String>,
    pub category: Option<String>,
    pub is_correct: i16,
    pub sort_order: i32,
}

pub fn option_row(option: &Value) -> OptionRow {
    OptionRow {
        text: trim_or_null(lookup(option, fields::OPTION_TEXT)),
        image: trim_or_null(lookup(option, fields::OPTION_IMAGE)),
        audio: trim_or_null(lookup(option, fields::OPTION_AUDIO)),
        color: trim_or_null(lookup(option, fields::OPTION_COLOR)),
        category: trim_or_null(lookup(option, fields::OPTION_CATEGORY)),
        is_correct: correct_flag(lookup(option, fields::OPTION_IS_CORRECT)),
        sort_order: as_index(lookup(option, fields::OPTION_SORT_ORDER))
            .and_then(|n| i32::try_from(n).ok())
            .unwrap_or(0),
    }
}

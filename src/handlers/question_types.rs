// src/handlers/question_types.rs

use axum::{Json, response::IntoResponse};
use serde_json::json;

use crate::{
    models::question::QuestionTypeInfo,
    question_types::RECOGNIZED,
};

/// Lists every recognized question type with its options policy.
pub async fn list_question_types() -> impl IntoResponse {
    let types: Vec<QuestionTypeInfo> = RECOGNIZED
        .into_iter()
        .map(|question_type| QuestionTypeInfo {
            question_type,
            requires_options: question_type.requires_options(),
        })
        .collect();

    Json(types)
}

/// Liveness check.
pub async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

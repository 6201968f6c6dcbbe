// src/models/question.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::question_types::{ContentDomain, QuestionType};

/// Table names backing one wizard's questions.
///
/// Both wizards store questions the same way; they differ in table names and
/// in a few domain-specific columns.
#[derive(Debug)]
pub struct QuestionTables {
    /// Parent content table ('etkinlikler' or 'kitaplar').
    pub content: &'static str,
    pub questions: &'static str,
    /// Column on `questions` pointing at the parent content row.
    pub content_fk: &'static str,
    pub options: &'static str,
    pub stages: &'static str,
    /// Only activities record an owner; books are editable by any editor.
    pub owner_column: Option<&'static str>,
    /// Activities keep a type (`tur`) taken from their first question and a
    /// status (`durum`) following their question count.
    pub tracks_status: bool,
}

pub const ACTIVITY_TABLES: QuestionTables = QuestionTables {
    content: "etkinlikler",
    questions: "etkinlik_sorulari",
    content_fk: "etkinlik_id",
    options: "soru_secenekleri",
    stages: "etkinlik_soru_asamalari",
    owner_column: Some("olusturan_id"),
    tracks_status: true,
};

pub const BOOK_TABLES: QuestionTables = QuestionTables {
    content: "kitaplar",
    questions: "kitap_sorulari",
    content_fk: "kitap_id",
    options: "kitap_soru_secenekleri",
    stages: "kitap_soru_asamalari",
    owner_column: None,
    tracks_status: false,
};

pub fn tables_for(domain: ContentDomain) -> &'static QuestionTables {
    match domain {
        ContentDomain::Activity => &ACTIVITY_TABLES,
        ContentDomain::Book => &BOOK_TABLES,
    }
}

/// One entry of a reorder request.
#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct QuestionOrder {
    #[serde(alias = "soru_id")]
    pub question_id: i64,
    #[serde(alias = "soru_numarasi")]
    #[validate(range(min = 1, message = "Question numbers start at 1."))]
    pub question_number: i64,
}

/// DTO for renumbering a content's questions.
#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct ReorderQuestionsRequest {
    #[serde(alias = "soruSiralamalari")]
    #[validate(length(min = 1, message = "At least one question order is required."), nested)]
    pub orders: Vec<QuestionOrder>,
}

/// Registry entry as reported to the wizards.
#[derive(Debug, Serialize)]
pub struct QuestionTypeInfo {
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub requires_options: bool,
}

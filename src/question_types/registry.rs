// src/question_types/registry.rs

use std::fmt;

use serde::{Serialize, Serializer};

use super::validators::{self, QuestionValidator};

/// Every question type the wizards know about.
///
/// Activities and books share this single list; the persisted identifier is
/// returned by [`QuestionType::as_str`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuestionType {
    ListenAndChoose,
    ImageToWord,
    ImageFillBlank,
    DragToBox,
    ImageOrdering,
    LookAndPickBox,
    ClickCorrectImage,
    LookAndOrderCorrectly,
    ColorSoundMatch,
    CorrectSoundCorrectImage,
    Grouping,
    SwapPuzzle,
    MemoryPuzzle,
    ListenAndMatch,
    FillBlank,
    MissingLetter,
    VideoListening,
    Dialogue,
    GiveImageAskText,
    SurpriseWord,
}

/// Registry order; also the order reported by the question-types endpoint.
pub const RECOGNIZED: [QuestionType; 20] = [
    QuestionType::ListenAndChoose,
    QuestionType::ImageToWord,
    QuestionType::ImageFillBlank,
    QuestionType::DragToBox,
    QuestionType::ImageOrdering,
    QuestionType::LookAndPickBox,
    QuestionType::ClickCorrectImage,
    QuestionType::LookAndOrderCorrectly,
    QuestionType::ColorSoundMatch,
    QuestionType::CorrectSoundCorrectImage,
    QuestionType::Grouping,
    QuestionType::SwapPuzzle,
    QuestionType::MemoryPuzzle,
    QuestionType::ListenAndMatch,
    QuestionType::FillBlank,
    QuestionType::MissingLetter,
    QuestionType::VideoListening,
    QuestionType::Dialogue,
    QuestionType::GiveImageAskText,
    QuestionType::SurpriseWord,
];

impl QuestionType {
    pub fn as_str(self) -> &'static str {
        match self {
            QuestionType::ListenAndChoose => "dinle_sec",
            QuestionType::ImageToWord => "gorsele_uygun_kelime",
            QuestionType::ImageFillBlank => "gorsele_gore_bosluk_doldur",
            QuestionType::DragToBox => "kutucugu_surukle_birak",
            QuestionType::ImageOrdering => "gorsel_sirala",
            QuestionType::LookAndPickBox => "bak_ve_kutucuk_sec",
            QuestionType::ClickCorrectImage => "dogru_resme_tikla",
            QuestionType::LookAndOrderCorrectly => "bak_ve_dogru_sirala",
            QuestionType::ColorSoundMatch => "renk_ses_eslestir",
            QuestionType::CorrectSoundCorrectImage => "dogru_ses_dogru_gorsel",
            QuestionType::Grouping => "gruplama",
            QuestionType::SwapPuzzle => "swap_puzzle",
            QuestionType::MemoryPuzzle => "puzzle_hatirla_yerlestir",
            QuestionType::ListenAndMatch => "klick_hor_gut_zu",
            QuestionType::FillBlank => "bosluk_doldurma",
            QuestionType::MissingLetter => "eksik_harf_tamamlama",
            QuestionType::VideoListening => "video_dinleme",
            QuestionType::Dialogue => "diyalog",
            QuestionType::GiveImageAskText => "gorsel_ver_yazi_iste",
            QuestionType::SurpriseWord => "surpriz_kelime",
        }
    }

    /// Exact, case-sensitive match against the registry.
    pub fn from_id(id: &str) -> Option<Self> {
        RECOGNIZED.into_iter().find(|t| t.as_str() == id)
    }

    /// Whether a generic, non-empty options list is mandatory.
    ///
    /// Exempt types carry their answer in type-specific fields (an index, a
    /// permutation, a target sentence, word groups) or have no answer at all.
    pub fn requires_options(self) -> bool {
        !matches!(
            self,
            QuestionType::VideoListening
                | QuestionType::Dialogue
                | QuestionType::GiveImageAskText
                | QuestionType::CorrectSoundCorrectImage
                | QuestionType::ImageToWord
                | QuestionType::ImageFillBlank
                | QuestionType::ClickCorrectImage
                | QuestionType::LookAndOrderCorrectly
                | QuestionType::DragToBox
                | QuestionType::ImageOrdering
                | QuestionType::LookAndPickBox
                | QuestionType::SurpriseWord
        )
    }

    pub fn validator(self) -> &'static dyn QuestionValidator {
        match self {
            QuestionType::ListenAndChoose => &validators::ListenAndChoose,
            QuestionType::ImageToWord => &validators::ImageToWord,
            QuestionType::ImageFillBlank => &validators::ImageFillBlank,
            QuestionType::DragToBox => &validators::DragToBox,
            QuestionType::ImageOrdering => &validators::ImageOrdering,
            QuestionType::LookAndPickBox => &validators::LookAndPickBox,
            QuestionType::ClickCorrectImage => &validators::ClickCorrectImage,
            QuestionType::LookAndOrderCorrectly => &validators::LookAndOrderCorrectly,
            QuestionType::VideoListening => &validators::VideoListening,
            QuestionType::Dialogue => &validators::Dialogue,
            QuestionType::GiveImageAskText => &validators::GiveImageAskText,
            QuestionType::SurpriseWord => &validators::SurpriseWord,
            QuestionType::CorrectSoundCorrectImage => &validators::Unconstrained,
            QuestionType::ColorSoundMatch
            | QuestionType::Grouping
            | QuestionType::SwapPuzzle
            | QuestionType::MemoryPuzzle
            | QuestionType::ListenAndMatch
            | QuestionType::FillBlank
            | QuestionType::MissingLetter => &validators::OptionsOnly,
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for QuestionType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Membership test against the shared registry.
pub fn is_recognized(id: &str) -> bool {
    QuestionType::from_id(id).is_some()
}

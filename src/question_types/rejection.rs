// src/question_types/rejection.rs

use std::fmt;

/// Reason a question submission was refused.
///
/// Only the first failing rule is reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    message: String,
}

pub type ValidationResult = Result<(), Rejection>;

impl Rejection {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Prefixes the message with the 1-based stage position.
    pub fn at_stage(self, position: usize) -> Self {
        Self::new(format!("stage {}: {}", position, self.message))
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for Rejection {}

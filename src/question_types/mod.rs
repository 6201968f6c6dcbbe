// src/question_types/mod.rs

//! Question-type validation shared by the activity and book wizards.
//!
//! Routers call [`validate_for_create`] / [`validate_for_update`] with the raw
//! JSON body and persist only when they return `Ok`. Everything in here is
//! pure and can be called from any number of requests at once.

pub mod dispatcher;
pub mod normalize;
pub mod payload;
pub mod registry;
pub mod rejection;
pub mod validators;

pub use dispatcher::{
    ContentDomain, requested_update_type, requires_options, resolve_update_type,
    validate_for_create, validate_for_update, validator_for,
};
pub use registry::{QuestionType, RECOGNIZED, is_recognized};
pub use rejection::{Rejection, ValidationResult};

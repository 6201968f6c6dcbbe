// src/handlers/mod.rs

pub mod question_types;
pub mod questions;

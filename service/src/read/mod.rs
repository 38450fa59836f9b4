//! Read entities definitions.

pub mod lead;
pub mod project;
pub mod quotation;
pub mod score_history;

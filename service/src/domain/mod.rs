//! Domain definitions.

pub mod activity;
pub mod boq;
pub mod customer;
pub mod document;
pub mod lead;
pub mod project;
pub mod quotation;
pub mod score;
pub mod score_history;
pub mod user;

pub use self::{
    customer::Customer, document::Document, lead::Lead, project::Project,
    quotation::Quotation, user::User,
};

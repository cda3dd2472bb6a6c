//! Client-side domain model for projects, sections and credentials.
//!
//! # Responsibility
//! - Define the shapes exchanged with DocService and held in session state.
//! - Hold local validation rules that run before any network call.
//!
//! # Invariants
//! - Project and section ids are server-assigned and never minted locally.
//! - Section `order` is 1-based and dense once a project exists.

pub mod credential;
pub mod draft;
pub mod project;
pub mod validation;

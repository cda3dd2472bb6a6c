//! Session-level use-case services.
//!
//! # Responsibility
//! - Own the mutable client state: credential, project list, open document
//!   and current screen.
//! - Orchestrate `ApiClient` calls into user actions and apply their results.
//!
//! # Invariants
//! - A failed call never mutates state.
//! - No lock is held across an `.await`; every operation may interleave with
//!   any other.

pub mod activity;
pub mod catalog;
pub mod document;
pub mod export;
pub mod session_store;
pub mod view;
pub mod workbench;

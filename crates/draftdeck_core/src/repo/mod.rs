//! Durable local storage contracts.
//!
//! # Responsibility
//! - Keep the persisted bearer token behind a small repository trait.
//! - Isolate SQLite details from session orchestration.
//!
//! # Invariants
//! - At most one token is persisted at any time.
//! - The persisted token is the single source of truth for "a session may
//!   be resumed" across process restarts.

pub mod credential_repo;

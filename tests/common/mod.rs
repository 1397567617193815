//! Shared test utilities for deckhand
//!
//! - In-memory collaborators and app builders
//! - Git repository fixtures
//! - TUI rendering helpers

pub mod fixtures;

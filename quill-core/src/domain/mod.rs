//! Core domain types
//!
//! This module contains the domain structures used across Quill services.
//! The orchestrator owns and mutates them; the client and CLI only read them
//! off the wire.

pub mod content;
pub mod pipeline;

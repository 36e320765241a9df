//! # Shared Types Crate
//!
//! Primitive identifiers and the `CallContext` envelope used across the
//! block reward workspace.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: Address, epoch and pool identifiers are
//!   defined once here.
//! - **Envelope Authority**: The `CallContext` caller is the only identity an
//!   entry point may trust. Payloads never carry a redundant sender field.

pub mod entities;
pub mod envelope;

pub use entities::*;
pub use envelope::CallContext;

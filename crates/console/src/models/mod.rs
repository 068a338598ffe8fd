//! Domain models for the console.
//!
//! Entity schemas for the remote API live in [`crate::api::types`]; this
//! module holds what the console keeps for itself.

pub mod session;

pub use session::{Flash, FlashKind, SESSION_MAX_AGE, SessionContext, keys as session_keys};

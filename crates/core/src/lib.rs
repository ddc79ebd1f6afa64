//! `clinica-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no IO, no transport).

pub mod email;
pub mod error;
pub mod value_object;

pub use email::Email;
pub use error::DomainError;
pub use value_object::ValueObject;

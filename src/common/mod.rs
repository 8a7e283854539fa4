//! Shared types, errors, and channel policy

pub mod channels;
pub mod errors;
pub mod types;

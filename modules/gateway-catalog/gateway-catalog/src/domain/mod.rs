//! Gateway catalog domain logic.

pub mod cipher;
pub mod error;
pub mod identity;
pub mod normalizer;
pub mod sealing;
pub mod service;
pub mod validate;
pub mod vendor;

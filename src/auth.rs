//! Credential models: redacted secrets and cached access tokens.

pub mod secret;
pub mod token;

pub use secret::*;
pub use token::*;

//! Authentication module
//!
//! - [`JwtService`] - token issuing and validation
//! - [`CurrentUser`] - authenticated staff context, extracted per request

pub mod extractor;
pub mod jwt;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};

//! Utilities - errors and logging

pub mod error;
pub mod logger;

pub use error::{AppError, AppResponse, AppResult, ok};

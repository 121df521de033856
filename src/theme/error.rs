//! Template engine error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ThemeError {
    /// No template registered under this name
    #[error("Template not found: {0}")]
    NotFound(String),

    /// Parse, inheritance or render failure
    #[error("Template error: {0}")]
    TemplateError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

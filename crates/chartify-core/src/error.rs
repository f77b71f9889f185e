//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Invalid value path: {path}")]
    InvalidPath { path: String },
}

pub type Result<T> = std::result::Result<T, CoreError>;

#![forbid(unsafe_code)]

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PakError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid input file: {}", .0.display())]
    MissingInput(PathBuf),

    #[error("duplicate file key: {0}")]
    DuplicateName(String),

    #[error("path is outside root dir: {0}")]
    Outside(String),

    #[error("invalid pak: {0}")]
    Invalid(String),

    #[error("resource not found: {0}")]
    NotFound(String),
}

pub type PakResult<T> = Result<T, PakError>;

use thiserror::Error;

use crate::shell::ShellError;

#[derive(Error, Debug)]
pub enum LabHealthError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Shell error: {0}")]
    Shell(#[from] ShellError),

    #[error("Reporter {reporter} failed: {reason}")]
    Reporter { reporter: String, reason: String },

    #[error("Programming error: {0}")]
    Programming(String),

    #[error("Interrupted before all metrics completed")]
    Interrupted,
}

pub type Result<T> = std::result::Result<T, LabHealthError>;

pub mod agent;
pub mod bio;
pub mod cli;
pub mod core;
pub mod pipeline;
pub mod sketch;

pub use crate::pipeline::{runner::Pipeline, stage::Stage};
pub use crate::sketch::batch::sketch_batch;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FabulaError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Stage '{stage}' failed: {message}")]
    Stage { stage: String, message: String },

    #[error("Cannot resume at '{stage}': {missing} has not been computed")]
    ResumeContract { stage: String, missing: String },

    #[error("Unknown stage: {0}")]
    InvalidStage(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, FabulaError>;

//! Chart/table specifications and their embedding into page fragments.
//!
//! Specs are declarative: they describe columns, glyphs and tools over a
//! [`source::ColumnDataSource`] and are rendered client-side by the
//! `TargetView` bootstrap that reads the embedded JSON document.

use thiserror::Error;

pub mod embed;
pub mod models;
pub mod registry;
pub mod sample;
pub mod source;
pub mod views;

#[derive(Debug, Error)]
pub enum VisualizationError {
    #[error("Field '{field}' referenced by {model} not found in data source")]
    FieldNotFound { model: String, field: String },
    #[error("Column '{column}' has {len} values, expected {expected}")]
    RaggedColumn {
        column: String,
        len: usize,
        expected: usize,
    },
    #[error("Hover tool references renderer {0}, which does not exist")]
    UnknownRenderer(usize),
    #[error("At least one model is required for embedding")]
    EmptyEmbed,
    #[error("Unknown dashboard app '{0}'")]
    UnknownApp(String),
    #[error("Invalid column declaration '{0}', expected 'name:text|numeric|datetime'")]
    InvalidColumnDecl(String),
    #[error(transparent)]
    Serialize(#[from] serde_json::Error),
}

use crate::model::EntityKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PaperzError {
    #[error("No {kind} matching '{name}'")]
    NotFound { kind: EntityKind, name: String },

    #[error("The {0} registry has not been refreshed")]
    MissingRegistry(EntityKind),

    #[error("Request to {url} failed with status {status}")]
    Remote { status: u16, url: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("Merge error: {0}")]
    Merge(String),

    #[error("Api Error: {0}")]
    Api(String),
}

pub type Result<T> = std::result::Result<T, PaperzError>;

use thiserror::Error;

/// Client-input problems found before an album is written
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Album title is required")]
    EmptyTitle,

    #[error("Valid artist ID is required, got {0}")]
    InvalidArtistId(i64),

    #[error("Artist not found: {0}")]
    ArtistNotFound(i64),

    #[error("Release year must be between 1900 and 2100, got {0}")]
    ReleaseYearOutOfRange(i32),
}

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Core initialization failed: {0}")]
    InitializationFailed(String),

    #[error("Configuration error: {0}")]
    Config(#[from] core_runtime::Error),

    #[error("Library error: {0}")]
    Library(#[from] core_library::LibraryError),

    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),
}

pub type Result<T> = std::result::Result<T, CoreError>;

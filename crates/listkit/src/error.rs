use thiserror::Error;

#[derive(Error, Debug)]
pub enum ListError {
    #[error("Index out of range: {index} (size {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("No such element: {0}")]
    NoSuchElement(String),

    #[error("Filtering not supported: {0}")]
    FilteringUnsupported(String),

    #[error("Illegal state: {0}")]
    IllegalState(String),

    #[error("Configuration error: {0}")]
    Config(#[from] confique::Error),
}

pub type Result<T> = std::result::Result<T, ListError>;

/// Checks `index` against `len`, the way every index-taking operation does
/// before touching any state.
pub(crate) fn check_index(index: usize, len: usize) -> Result<()> {
    if index < len {
        Ok(())
    } else {
        Err(ListError::IndexOutOfRange { index, len })
    }
}

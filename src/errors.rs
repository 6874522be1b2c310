use thiserror::Error;

/// Errors that can occur when operating on the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RingListError {
    #[error("invalid handle")]
    InvalidHandle,

    #[error("value not found in list")]
    NotFound,
}

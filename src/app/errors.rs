use std::sync::PoisonError;

use crate::catalog::{PersistenceError, StoreError};
use crate::config::ConfigError;
use crate::semantic::{EmbeddingError, SearchError};

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    Search(#[from] SearchError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    #[error("catalog lock poisoned")]
    LockPoisoned,

    #[error("io error: {0:?}")]
    IO(#[from] std::io::Error),
}

impl<T> From<PoisonError<T>> for AppError {
    fn from(_: PoisonError<T>) -> Self {
        AppError::LockPoisoned
    }
}

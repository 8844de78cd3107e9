use std::fmt::Display;

use thiserror::Error;

use crate::{Address, Asset, AsyncResult, TaskError};

/// Pending or finished load of a value of type `T`
pub type LoadResult<T> = AsyncResult<T, LoadError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("No content found at {0}")]
    NotFound(Address),
    #[error("Failed to read {address}: {reason}")]
    Io { address: Address, reason: String },
    #[error("Failed to decode {address} as {asset}: {reason}")]
    Decode {
        address: Address,
        asset: &'static str,
        reason: String,
    },
    #[error("A dependency of {address} failed to load: {source}")]
    Dependency {
        address: Address,
        source: Box<LoadError>,
    },
    #[error("Asset type {0} is not registered")]
    Unregistered(&'static str),
    #[error("Load was abandoned before completing")]
    Abandoned,
}

impl LoadError {
    pub fn decode<A: Asset>(address: &Address, reason: impl Display) -> Self {
        Self::Decode {
            address: address.clone(),
            asset: A::NAME,
            reason: reason.to_string(),
        }
    }
    pub fn dependency(address: &Address, source: LoadError) -> Self {
        Self::Dependency {
            address: address.clone(),
            source: Box::new(source),
        }
    }
    /// Follows dependency failures down to the error that started them
    pub fn root_cause(&self) -> &LoadError {
        match self {
            Self::Dependency { source, .. } => source.root_cause(),
            other => other,
        }
    }
    pub fn is_not_found(&self) -> bool {
        matches!(self.root_cause(), Self::NotFound(_))
    }
}

impl TaskError for LoadError {
    fn abandoned() -> Self {
        Self::Abandoned
    }
}

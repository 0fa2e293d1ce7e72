//! Domain types shared across Fixlane crates.
//!
//! This crate contains only pure types with no framework dependencies.
//! Import in `usecase/` and `domain/` layers; `infra/` uses it only to map
//! stored strings back into typed statuses.

pub mod activity;
pub mod job;
pub mod money;
pub mod pagination;
pub mod payment;
pub mod quote;
pub mod request;
pub mod user;

use thiserror::Error;

/// Error returned when a stored or wire string is not a known variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: {value:?}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownVariant {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_owned(),
        }
    }
}

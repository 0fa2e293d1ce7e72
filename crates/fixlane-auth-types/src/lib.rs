//! Auth types shared across Fixlane services.
//!
//! Authentication happens upstream. Services only read the identity the
//! gateway injects, through the [`identity::IdentityHeaders`] extractor.

pub mod identity;

//! Test utilities for Fixlane services.
//!
//! Provides `MockAuth`, webhook signing and gateway event fixtures.
//! Import from tests only, never from production code.

pub mod auth;
pub mod fixture;
pub mod webhook;

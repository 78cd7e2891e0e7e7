//! Shared widget helpers.

pub mod fmt;

//! Command implementations

pub mod query;

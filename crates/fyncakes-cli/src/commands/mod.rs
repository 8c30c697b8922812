//! Command handlers

pub mod config;
pub mod query;
pub mod stats;

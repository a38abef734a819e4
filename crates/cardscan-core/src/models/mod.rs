//! Data models for extracted business cards and engine configuration.

pub mod card;
pub mod config;

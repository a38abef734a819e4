//! Core library for business card text extraction.
//!
//! This crate provides:
//! - Line segmentation of raw OCR text
//! - Definite-field classification (email, URL, phones by role)
//! - Contextual candidate generation for name, job title, company and address
//! - Candidate resolution with per-field and overall confidence scores
//!
//! The engine is a pure function of its input text: no OCR, no I/O, no
//! shared mutable state between calls.

pub mod error;
pub mod models;
pub mod card;

pub use error::{CardscanError, Result};
pub use models::card::{FieldConfidence, ParsedBusinessCard, Phones};
pub use models::config::{CardscanConfig, ExtractionConfig, StrategyKind};
pub use card::{
    parse_business_card, BusinessCardParser, CardParser, ExtractionResult, ExtractionStrategy,
    FieldTrace, ScoredStrategy, TwoPassStrategy,
};

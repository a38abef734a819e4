//! Business card field extraction.
//!
//! Raw OCR text flows through four stages: line segmentation, definite-field
//! classification (Pass 1), contextual candidate generation and re-scoring
//! (Pass 2), and resolution into a [`ParsedBusinessCard`](crate::ParsedBusinessCard).

pub mod candidate;
pub mod classifier;
pub mod context;
pub mod generator;
pub mod normalize;
mod parser;
pub mod rescoring;
pub mod resolver;
pub mod rules;
pub mod segmenter;
pub mod strategy;

pub use parser::{parse_business_card, BusinessCardParser, CardParser, ExtractionResult};
pub use resolver::FieldTrace;
pub use strategy::{strategy_for, ExtractionStrategy, ScoredStrategy, TwoPassStrategy};

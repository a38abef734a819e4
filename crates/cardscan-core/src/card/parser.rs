//! Business card parser: the full pipeline behind one call.

use lazy_static::lazy_static;
use serde::Serialize;
use tracing::{debug, info};

use super::classifier::classify;
use super::context::Context;
use super::resolver::{resolve, FieldTrace};
use super::rules::Vocabulary;
use super::segmenter::segment;
use super::strategy::{strategy_for, ExtractionStrategy};
use crate::error::Result;
use crate::models::card::ParsedBusinessCard;
use crate::models::config::{CardscanConfig, StrategyKind};

lazy_static! {
    static ref DEFAULT_PARSER: BusinessCardParser = BusinessCardParser::new();
}

/// Wall-clock timer for the result envelope. `std::time::Instant` panics on
/// `wasm32-unknown-unknown`, where the elapsed time is reported as 0.
struct Timer {
    #[cfg(not(target_arch = "wasm32"))]
    start: std::time::Instant,
}

impl Timer {
    fn start() -> Self {
        Self {
            #[cfg(not(target_arch = "wasm32"))]
            start: std::time::Instant::now(),
        }
    }

    fn elapsed_ms(&self) -> u64 {
        #[cfg(not(target_arch = "wasm32"))]
        return self.start.elapsed().as_millis() as u64;
        #[cfg(target_arch = "wasm32")]
        return 0;
    }
}

/// Result of one parse call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    /// Extracted contact record.
    pub card: ParsedBusinessCard,
    /// Winning candidate of every filled field.
    pub trace: Vec<FieldTrace>,
    /// Web addresses found on the card.
    pub urls: Vec<String>,
    /// Fields that could not be extracted.
    pub warnings: Vec<String>,
    /// Strategy that produced the record.
    pub strategy: String,
    /// Non-empty lines in the input.
    pub line_count: usize,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Trait for business card parsing.
pub trait CardParser {
    /// Parse a card from raw OCR text.
    fn parse(&self, text: &str) -> ExtractionResult;
}

/// Parser holding the configuration, compiled vocabulary and strategy.
///
/// Holds no per-call state: one instance can serve any number of threads.
pub struct BusinessCardParser {
    config: CardscanConfig,
    vocabulary: Vocabulary,
    strategy: Box<dyn ExtractionStrategy>,
}

impl BusinessCardParser {
    /// Create a parser with the default configuration.
    pub fn new() -> Self {
        let config = CardscanConfig::default();
        Self {
            strategy: strategy_for(config.extraction.strategy),
            vocabulary: Vocabulary::builtin().clone(),
            config,
        }
    }

    /// Create a parser from a configuration, compiling any extra vocabulary.
    pub fn from_config(config: CardscanConfig) -> Result<Self> {
        config.validate()?;
        let vocabulary = Vocabulary::new(&config.vocabulary)?;
        Ok(Self {
            strategy: strategy_for(config.extraction.strategy),
            vocabulary,
            config,
        })
    }

    /// Switch the contextual strategy.
    pub fn with_strategy(mut self, kind: StrategyKind) -> Self {
        self.config.extraction.strategy = kind;
        self.strategy = strategy_for(kind);
        self
    }

    pub fn config(&self) -> &CardscanConfig {
        &self.config
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// Parse and keep only the card.
    pub fn parse_card(&self, text: &str) -> ParsedBusinessCard {
        self.parse(text).card
    }
}

impl Default for BusinessCardParser {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for BusinessCardParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BusinessCardParser")
            .field("strategy", &self.strategy.name())
            .field("config", &self.config)
            .finish()
    }
}

impl CardParser for BusinessCardParser {
    fn parse(&self, text: &str) -> ExtractionResult {
        let timer = Timer::start();

        let lines = segment(text);
        info!(
            "Parsing card from {} lines ({} characters) with {}",
            lines.len(),
            text.len(),
            self.strategy.name()
        );

        let classification = classify(&lines, &self.config, &self.vocabulary);
        debug!(
            "Pass 1: {} definite candidates, {} lines consumed",
            classification.pool.len(),
            classification.consumed.len()
        );

        let ctx = Context::new(&lines, &classification, &self.vocabulary, &self.config);
        let mut pool = classification.pool.clone();
        pool.extend(self.strategy.generate(&ctx));
        let pool = self.strategy.rescore(pool, &ctx);
        debug!("Pass 2: {} candidates after re-scoring", pool.len());

        let resolution = resolve(&pool, &ctx);
        let warnings = resolution
            .card
            .missing_fields()
            .into_iter()
            .map(|field| format!("Could not extract {}", field))
            .collect();

        debug!(
            "Extracted card for {:?} with confidence {:.2}",
            resolution.card.name, resolution.card.confidence.overall
        );

        ExtractionResult {
            card: resolution.card,
            trace: resolution.trace,
            urls: classification.urls.clone(),
            warnings,
            strategy: self.strategy.name().to_string(),
            line_count: lines.len(),
            processing_time_ms: timer.elapsed_ms(),
        }
    }
}

/// Parse raw OCR text with the default configuration.
///
/// Never fails: fields that cannot be extracted are empty with confidence 0.
pub fn parse_business_card(text: &str) -> ParsedBusinessCard {
    DEFAULT_PARSER.parse_card(text)
}

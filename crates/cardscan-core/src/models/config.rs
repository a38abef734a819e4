//! Configuration structures for the extraction engine.
//!
//! Every boost and base score below was tuned by hand against real cards;
//! they are exposed here so they can be retuned without touching the rules.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{CardscanError, Result};

/// Main configuration for cardscan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardscanConfig {
    /// Candidate generation and scoring.
    pub extraction: ExtractionConfig,

    /// Phone number shape rules.
    pub phone: PhoneConfig,

    /// Extra keywords appended to the built-in vocabularies.
    pub vocabulary: VocabularyConfig,
}

/// Which candidate generation strategy to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Positional top-region name search with address blocks.
    #[default]
    TwoPass,
    /// Multi-candidate scorer with additive regional weighting.
    Scored,
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StrategyKind::TwoPass => write!(f, "two_pass"),
            StrategyKind::Scored => write!(f, "scored"),
        }
    }
}

impl std::str::FromStr for StrategyKind {
    type Err = CardscanError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "two_pass" | "twopass" => Ok(StrategyKind::TwoPass),
            "scored" => Ok(StrategyKind::Scored),
            other => Err(CardscanError::Config(format!("unknown strategy: {}", other))),
        }
    }
}

/// Candidate generation and scoring configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Strategy used for the contextual pass.
    pub strategy: StrategyKind,

    /// Share of lines (from the top) searched first for the person's name.
    pub top_region_ratio: f32,

    /// Relative position where the bottom band starts (scored strategy).
    pub bottom_band_start: f32,

    /// Shortest email domain token used for company correlation.
    pub min_domain_token_len: usize,

    /// Webmail domains that say nothing about the employer.
    pub generic_email_domains: Vec<String>,

    /// Base confidences and boosts.
    pub weights: ScoringWeights,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::TwoPass,
            top_region_ratio: 0.4,
            bottom_band_start: 0.6,
            min_domain_token_len: 3,
            generic_email_domains: [
                "gmail", "googlemail", "yahoo", "ymail", "hotmail", "outlook", "live", "msn",
                "icloud", "me", "aol", "proton", "protonmail", "qq", "163", "126",
            ]
            .iter()
            .map(|d| d.to_string())
            .collect(),
            weights: ScoringWeights::default(),
        }
    }
}

/// Base confidences per candidate family, and the cross-field boosts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub email: f32,
    pub phones: f32,
    pub name_strict: f32,
    pub name_cjk: f32,
    pub name_lenient: f32,
    pub name_synthesized: f32,
    pub job_title: f32,
    pub company_suffix: f32,
    pub company_keyword: f32,
    pub company_domain: f32,
    pub address_block: f32,
    pub address_fragment: f32,

    /// Company candidate containing the email domain token.
    pub email_domain_company_boost: f32,
    /// Name token found in the email local part (cross-check).
    pub email_name_boost: f32,
    /// Same match, applied again while resolving the name.
    pub email_name_resolution_boost: f32,
    /// Name directly above or below a job title.
    pub adjacent_name_boost: f32,
    /// Job title directly above or below a name.
    pub adjacent_title_boost: f32,
    /// Name in the top band (scored strategy).
    pub region_name_boost: f32,
    /// Company in the middle band (scored strategy).
    pub region_company_boost: f32,
    /// Address in the bottom band (scored strategy).
    pub region_address_boost: f32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            email: 0.95,
            phones: 0.9,
            name_strict: 0.8,
            name_cjk: 0.75,
            name_lenient: 0.5,
            name_synthesized: 0.65,
            job_title: 0.85,
            company_suffix: 0.85,
            company_keyword: 0.6,
            company_domain: 0.7,
            address_block: 0.8,
            address_fragment: 0.7,
            email_domain_company_boost: 0.2,
            email_name_boost: 0.15,
            email_name_resolution_boost: 0.2,
            adjacent_name_boost: 0.2,
            adjacent_title_boost: 0.1,
            region_name_boost: 0.15,
            region_company_boost: 0.1,
            region_address_boost: 0.1,
        }
    }
}

impl ScoringWeights {
    fn named(&self) -> [(&'static str, f32); 20] {
        [
            ("email", self.email),
            ("phones", self.phones),
            ("name_strict", self.name_strict),
            ("name_cjk", self.name_cjk),
            ("name_lenient", self.name_lenient),
            ("name_synthesized", self.name_synthesized),
            ("job_title", self.job_title),
            ("company_suffix", self.company_suffix),
            ("company_keyword", self.company_keyword),
            ("company_domain", self.company_domain),
            ("address_block", self.address_block),
            ("address_fragment", self.address_fragment),
            ("email_domain_company_boost", self.email_domain_company_boost),
            ("email_name_boost", self.email_name_boost),
            ("email_name_resolution_boost", self.email_name_resolution_boost),
            ("adjacent_name_boost", self.adjacent_name_boost),
            ("adjacent_title_boost", self.adjacent_title_boost),
            ("region_name_boost", self.region_name_boost),
            ("region_company_boost", self.region_company_boost),
            ("region_address_boost", self.region_address_boost),
        ]
    }
}

/// Phone shape rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhoneConfig {
    /// Country calling code stripped before prefix classification.
    pub country_code: String,

    /// Leading digits (after the trunk `0`) that mark a mobile number.
    pub mobile_prefixes: Vec<String>,

    /// Fewest digits accepted as a phone number.
    pub min_digits: usize,

    /// Most digits accepted as a phone number.
    pub max_digits: usize,
}

impl Default for PhoneConfig {
    fn default() -> Self {
        Self {
            country_code: "60".to_string(),
            mobile_prefixes: vec!["1".to_string()],
            min_digits: 8,
            max_digits: 15,
        }
    }
}

/// Extra keywords, matched case-insensitively on word boundaries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VocabularyConfig {
    pub extra_job_titles: Vec<String>,
    pub extra_company_suffixes: Vec<String>,
    pub extra_address_keywords: Vec<String>,
    pub extra_regions: Vec<String>,
}

impl CardscanConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check that every tunable is usable.
    pub fn validate(&self) -> Result<()> {
        let extraction = &self.extraction;

        if !(extraction.top_region_ratio > 0.0 && extraction.top_region_ratio <= 1.0) {
            return Err(CardscanError::Config(format!(
                "extraction.top_region_ratio must be in (0, 1], got {}",
                extraction.top_region_ratio
            )));
        }
        if !(0.0..=1.0).contains(&extraction.bottom_band_start) {
            return Err(CardscanError::Config(format!(
                "extraction.bottom_band_start must be in [0, 1], got {}",
                extraction.bottom_band_start
            )));
        }
        for (name, value) in extraction.weights.named() {
            if !(0.0..=1.0).contains(&value) {
                return Err(CardscanError::Config(format!(
                    "extraction.weights.{} must be in [0, 1], got {}",
                    name, value
                )));
            }
        }

        let phone = &self.phone;
        if !phone.country_code.chars().all(|c| c.is_ascii_digit()) {
            return Err(CardscanError::Config(format!(
                "phone.country_code must be digits, got {:?}",
                phone.country_code
            )));
        }
        if phone.mobile_prefixes.is_empty()
            || phone
                .mobile_prefixes
                .iter()
                .any(|p| p.is_empty() || !p.chars().all(|c| c.is_ascii_digit()))
        {
            return Err(CardscanError::Config(
                "phone.mobile_prefixes must be a non-empty list of digit strings".to_string(),
            ));
        }
        if phone.min_digits < 4 || phone.min_digits > phone.max_digits {
            return Err(CardscanError::Config(format!(
                "phone digit bounds are invalid: min {} max {}",
                phone.min_digits, phone.max_digits
            )));
        }

        Ok(())
    }
}

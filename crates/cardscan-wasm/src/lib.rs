//! WASM bindings for business card text extraction.
//!
//! This crate exposes the extraction engine to browsers and Node.js hosts.

use wasm_bindgen::prelude::*;

use cardscan_core::models::config::CardscanConfig;
use cardscan_core::{BusinessCardParser, CardParser};

fn js_error(message: impl std::fmt::Display) -> JsValue {
    js_sys::Error::new(&message.to_string()).into()
}

fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, JsValue> {
    // Plain objects rather than ES Maps, so hosts can read `card.jobTitle`.
    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
    value.serialize(&serializer).map_err(js_error)
}

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Parse raw OCR text into a contact record with the default settings.
#[wasm_bindgen]
pub fn parse_business_card(text: &str) -> Result<JsValue, JsValue> {
    to_js(&cardscan_core::parse_business_card(text))
}

/// Format a phone number with `-` delimiters, dropping any label.
#[wasm_bindgen]
pub fn format_phone(raw: &str) -> String {
    cardscan_core::card::normalize::format_phone(raw)
}

/// Card extractor class holding its own configuration.
#[wasm_bindgen]
pub struct CardExtractor {
    parser: BusinessCardParser,
}

#[wasm_bindgen]
impl CardExtractor {
    /// Create an extractor, optionally from a JSON configuration string.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<CardExtractor, JsValue> {
        let parser = match config_json.as_deref().map(str::trim) {
            Some(json) if !json.is_empty() => {
                let config: CardscanConfig = serde_json::from_str(json).map_err(js_error)?;
                BusinessCardParser::from_config(config).map_err(js_error)?
            }
            _ => BusinessCardParser::new(),
        };
        Ok(Self { parser })
    }

    /// Parse text and return the contact record.
    #[wasm_bindgen]
    pub fn parse(&self, text: &str) -> Result<JsValue, JsValue> {
        to_js(&self.parser.parse_card(text))
    }

    /// Parse text and return the full result: record, field trace, URLs
    /// and warnings.
    #[wasm_bindgen(js_name = parseWithTrace)]
    pub fn parse_with_trace(&self, text: &str) -> Result<JsValue, JsValue> {
        to_js(&self.parser.parse(text))
    }

    /// Name of the active strategy.
    #[wasm_bindgen]
    pub fn strategy(&self) -> String {
        self.parser.strategy_name().to_string()
    }
}

impl Default for CardExtractor {
    fn default() -> Self {
        Self {
            parser: BusinessCardParser::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert_eq!(version(), env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_format_phone() {
        assert_eq!(format_phone("Mobile No : 017-334 7211"), "017-334-7211");
    }

    #[test]
    fn test_default_strategy() {
        assert_eq!(CardExtractor::default().strategy(), "two_pass");
    }
}

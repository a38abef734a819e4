//! Browser-side checks, run with `wasm-pack test --headless --chrome`.

#![cfg(target_arch = "wasm32")]

use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

use cardscan_wasm::{parse_business_card, CardExtractor};

wasm_bindgen_test_configure!(run_in_browser);

fn field(value: &JsValue, key: &str) -> JsValue {
    js_sys::Reflect::get(value, &JsValue::from_str(key)).unwrap()
}

#[wasm_bindgen_test]
fn parses_card_into_plain_object() {
    let card = parse_business_card("RACHEL TAN\nFINANCE MANAGER\nrachel@psg.com.my").unwrap();
    assert_eq!(field(&card, "name").as_string().as_deref(), Some("Rachel Tan"));
    assert_eq!(field(&card, "jobTitle").as_string().as_deref(), Some("Finance Manager"));
}

#[wasm_bindgen_test]
fn extractor_accepts_json_config() {
    let extractor =
        CardExtractor::new(Some(r#"{"extraction":{"strategy":"scored"}}"#.to_string())).unwrap();
    assert_eq!(extractor.strategy(), "scored");
}

#[wasm_bindgen_test]
fn extractor_rejects_bad_config() {
    assert!(CardExtractor::new(Some("{not json".to_string())).is_err());
}

#[wasm_bindgen_test]
fn trace_lists_warnings() {
    let extractor = CardExtractor::new(None).unwrap();
    let result = extractor.parse_with_trace("").unwrap();
    let warnings = js_sys::Array::from(&field(&result, "warnings"));
    assert_eq!(warnings.length(), 6);
}

//! Phone number matching, shape classification and formatting.

use lazy_static::lazy_static;
use regex::Regex;

use super::patterns::{FAX_KEYWORD, MOBILE_KEYWORD, OFFICE_KEYWORD, PHONE};
use crate::models::config::PhoneConfig;

lazy_static! {
    static ref SEPARATORS: Regex = Regex::new(r"[\s.\-]+").unwrap();
    static ref LEADING_LABEL: Regex = Regex::new(r"^[^+\d(]*").unwrap();
}

/// A phone number found in a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneMatch {
    /// Matched text as it appears in the line.
    pub raw: String,
    /// Digits only.
    pub digits: String,
    /// Byte offsets of the match in the searched text.
    pub start: usize,
    pub end: usize,
}

/// Coarse number shape used when no role keyword is present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhoneShape {
    Mobile,
    Landline,
}

/// Role announced by a keyword on the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhoneRole {
    Mobile,
    Office,
    Fax,
}

/// Earliest role keyword on the line and the byte offset just past it.
pub fn keyword_role(text: &str) -> Option<(PhoneRole, usize)> {
    [
        (PhoneRole::Mobile, &*MOBILE_KEYWORD),
        (PhoneRole::Office, &*OFFICE_KEYWORD),
        (PhoneRole::Fax, &*FAX_KEYWORD),
    ]
    .into_iter()
    .filter_map(|(role, pattern)| pattern.find(text).map(|m| (m.start(), role, m.end())))
    .min_by_key(|(start, _, _)| *start)
    .map(|(_, role, end)| (role, end))
}

/// Find the first phone-shaped run with an acceptable digit count.
///
/// A match glued to further digits on either side is part of a longer number
/// (an account or ID) and is rejected.
pub fn find_phone(text: &str, config: &PhoneConfig) -> Option<PhoneMatch> {
    PHONE.find_iter(text).find_map(|m| {
        let glued = text[..m.start()].ends_with(|c: char| c.is_ascii_digit())
            || text[m.end()..].starts_with(|c: char| c.is_ascii_digit());
        let digits: String = m.as_str().chars().filter(|c| c.is_ascii_digit()).collect();
        (!glued && (config.min_digits..=config.max_digits).contains(&digits.len()))
            .then(|| PhoneMatch {
                raw: m.as_str().trim().to_string(),
                digits,
                start: m.start(),
                end: m.end(),
            })
    })
}

/// Classify a number as mobile or landline by its leading digits.
///
/// The country code is dropped when the number is written internationally
/// (leading `+`, or starting with the code and no trunk `0`), then a single
/// trunk `0`; what remains is compared with the mobile prefixes.
pub fn classify_shape(phone: &PhoneMatch, config: &PhoneConfig) -> PhoneShape {
    let mut national = phone.digits.as_str();

    let international = phone.raw.starts_with('+') || !national.starts_with('0');
    if international && !config.country_code.is_empty() {
        national = national.strip_prefix(config.country_code.as_str()).unwrap_or(national);
    }
    national = national.strip_prefix('0').unwrap_or(national);

    if config
        .mobile_prefixes
        .iter()
        .any(|prefix| national.starts_with(prefix.as_str()))
    {
        PhoneShape::Mobile
    } else {
        PhoneShape::Landline
    }
}

/// Format a phone number: drop any leading label, use `-` between groups.
pub fn format_phone(raw: &str) -> String {
    let unlabeled = LEADING_LABEL.replace(raw.trim(), "");
    let unbracketed = unlabeled.replace(['(', ')'], " ");
    let joined = SEPARATORS
        .split(unbracketed.trim())
        .filter(|group| !group.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    joined.replacen("+-", "+", 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phone(text: &str) -> PhoneMatch {
        find_phone(text, &PhoneConfig::default()).unwrap()
    }

    #[test]
    fn test_find_phone_digits() {
        let m = phone("Mobile No : 017-334 7211");
        assert_eq!(m.raw, "017-334 7211");
        assert_eq!(m.digits, "0173347211");
        assert_eq!(&"Mobile No : 017-334 7211"[..m.start], "Mobile No : ");
    }

    #[test]
    fn test_find_phone_rejects_short_runs() {
        assert!(find_phone("Ref 12-345", &PhoneConfig::default()).is_none());
        assert!(find_phone("", &PhoneConfig::default()).is_none());
    }

    #[test]
    fn test_find_phone_rejects_long_digit_runs() {
        let config = PhoneConfig::default();
        assert!(find_phone("Acc 12345678901234567890", &config).is_none());
        assert!(find_phone("ID 0123456789012345", &config).is_none());
        assert!(find_phone("Ref 9017-334 72118", &config).is_none());
        assert_eq!(phone("H/P 0173347211").digits, "0173347211");
    }

    #[test]
    fn test_find_phone_max_digits() {
        let config = PhoneConfig {
            max_digits: 9,
            ..PhoneConfig::default()
        };
        assert!(find_phone("017-334 7211", &config).is_none());
        assert!(find_phone("03-334 7211", &config).is_some());
    }

    #[test]
    fn test_keyword_role() {
        assert_eq!(keyword_role("Mobile No : 017-334 7211"), Some((PhoneRole::Mobile, 6)));
        assert_eq!(keyword_role("Tel/Fax: 03-1234 5678").map(|(r, _)| r), Some(PhoneRole::Office));
        assert_eq!(keyword_role("Fax/Tel: 03-1234 5678").map(|(r, _)| r), Some(PhoneRole::Fax));
        assert_eq!(keyword_role("No. 88, Jalan Merdeka"), None);
    }

    #[test]
    fn test_classify_shape() {
        let config = PhoneConfig::default();
        assert_eq!(classify_shape(&phone("017-334 7211"), &config), PhoneShape::Mobile);
        assert_eq!(classify_shape(&phone("+60 12-345 6789"), &config), PhoneShape::Mobile);
        assert_eq!(classify_shape(&phone("03-3342 0758"), &config), PhoneShape::Landline);
        assert_eq!(classify_shape(&phone("+60 3-3342 0758"), &config), PhoneShape::Landline);
    }

    #[test]
    fn test_format_phone() {
        assert_eq!(format_phone("017-334 7211"), "017-334-7211");
        assert_eq!(format_phone("03-3342 0758"), "03-3342-0758");
        assert_eq!(format_phone("Tel: 03.3342.0758"), "03-3342-0758");
        assert_eq!(format_phone("(03) 3342 0758"), "03-3342-0758");
        assert_eq!(format_phone("+60 12-345 6789"), "+60-12-345-6789");
    }
}

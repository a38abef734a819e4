//! Common regex patterns for business card extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Email address (local@domain.tld)
    pub static ref EMAIL: Regex = Regex::new(
        r"[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}"
    ).unwrap();

    // Web address, with or without scheme
    pub static ref URL: Regex = Regex::new(
        r"(?i)\b(?:https?://|www\.)[^\s,;]+"
    ).unwrap();

    // Phone number: +country code and area group, or a 2-4 digit prefix,
    // followed by two digit groups
    pub static ref PHONE: Regex = Regex::new(
        r"(?:\+\s?\d{1,3}[\s.\-]?\(?\d{1,4}\)?|\(?\d{2,4}\)?)[\s.\-]?\d{3,4}[\s.\-]?\d{3,4}"
    ).unwrap();

    // Role keywords for phone lines
    pub static ref MOBILE_KEYWORD: Regex = Regex::new(
        r"(?i)(?:\b(?:mobile|mob|hp|h/p|cell|cellphone|handphone|hand\s+phone)\b|\bm\s*:|手机)"
    ).unwrap();

    pub static ref OFFICE_KEYWORD: Regex = Regex::new(
        r"(?i)(?:\b(?:tel|telephone|office|direct|phone|landline)\b|\bt\s*:|电话)"
    ).unwrap();

    pub static ref FAX_KEYWORD: Regex = Regex::new(
        r"(?i)(?:\bfax\b|\bf\s*:|传真)"
    ).unwrap();

    // Malaysian 5-digit postcode
    pub static ref POSTCODE: Regex = Regex::new(
        r"\b\d{5}\b"
    ).unwrap();

    // Street / lot number, e.g. "No. 88", "No 12A"
    pub static ref STREET_NUMBER: Regex = Regex::new(
        r"(?i)\bno\.?\s*\d+[a-z]?\b"
    ).unwrap();

    // "Last, First" two-part names
    pub static ref COMMA_NAME: Regex = Regex::new(
        r"^([A-Za-z][A-Za-z'\-]*)\s*,\s*([A-Za-z][A-Za-z'\-]*(?:\s+[A-Za-z][A-Za-z'\-]*)?)$"
    ).unwrap();

    // Honorifics stripped from the front of a name
    pub static ref HONORIFIC: Regex = Regex::new(
        r"(?i)^(?:(?:mr|mrs|ms|miss|mdm|madam|dr|ir|prof|sir|encik|puan|datuk|datin|dato'?|tuan|haji|tan\s+sri|puan\s+sri)\.?|(?:en|pn|hj|cik)\.)\s+"
    ).unwrap();

    // Phone/email label left dangling at the end of an address
    pub static ref TRAILING_LABEL: Regex = Regex::new(
        r"(?i)[\s,;:.\-]*\b(?:tel|telephone|phone|mobile|hp|h/p|handphone|cell|office|direct|fax|email|e-mail)\b(?:\s*(?:no|add|address)\b)?[\s.:]*$"
    ).unwrap();

    // Legal-form acronyms kept upper-case in company names
    pub static ref COMPANY_ACRONYM: Regex = Regex::new(
        r"(?i)\b(sdn|bhd|llc|llp|plc|pte|pty|gmbh)\b"
    ).unwrap();

    // Acronyms kept upper-case in job titles
    pub static ref TITLE_ACRONYM: Regex = Regex::new(
        r"(?i)\b(ceo|cto|cfo|coo|cio|cmo|vp|svp|evp|it|hr|gm|md|pr|qa|ui|ux)\b"
    ).unwrap();

    // Joining words lower-cased inside job titles
    pub static ref TITLE_JOINER: Regex = Regex::new(
        r"(?i)\s(of|and|the|for|in|to)\b"
    ).unwrap();

    // Clean-up
    pub static ref REPEATED_COMMAS: Regex = Regex::new(
        r"\s*,(?:\s*,)+"
    ).unwrap();

    pub static ref SPACE_BEFORE_COMMA: Regex = Regex::new(
        r"\s+,"
    ).unwrap();

    pub static ref MULTI_SPACE: Regex = Regex::new(
        r"\s{2,}"
    ).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email() {
        let m = EMAIL.find("Email Add. : rachel@psg.com.my").unwrap();
        assert_eq!(m.as_str(), "rachel@psg.com.my");
    }

    #[test]
    fn test_phone_shapes() {
        assert_eq!(PHONE.find("Mobile No : 017-334 7211").unwrap().as_str(), "017-334 7211");
        assert_eq!(PHONE.find("+60 12-345 6789").unwrap().as_str(), "+60 12-345 6789");
        assert_eq!(PHONE.find("+60 3-3342 0758").unwrap().as_str(), "+60 3-3342 0758");
        assert_eq!(PHONE.find("Mobile 2 019-876 5432").unwrap().as_str(), "019-876 5432");
        assert!(PHONE.find("Lot 210, Jalan Sungai Putus, 42100 Klang").is_none());
    }

    #[test]
    fn test_role_keywords() {
        assert!(MOBILE_KEYWORD.is_match("H/P: 012-345 6789"));
        assert!(MOBILE_KEYWORD.is_match("Handphone"));
        assert!(OFFICE_KEYWORD.is_match("Telephone No : 03-3342 0758"));
        assert!(FAX_KEYWORD.is_match("F: 03-3359 1780"));
        assert!(!OFFICE_KEYWORD.is_match("Handphone"));
        assert!(!FAX_KEYWORD.is_match("Fairfax Tower"));
    }

    #[test]
    fn test_street_number() {
        assert!(STREET_NUMBER.is_match("No. 88, Jalan Merdeka"));
        assert!(!STREET_NUMBER.is_match("Fax No."));
    }

    #[test]
    fn test_trailing_label() {
        let cleaned = TRAILING_LABEL.replace("42100 Klang, Selangor, Fax No.", "");
        assert_eq!(cleaned, "42100 Klang, Selangor");
    }

    #[test]
    fn test_honorific() {
        assert_eq!(HONORIFIC.replace("Dr. Lim Wei", ""), "Lim Wei");
        assert_eq!(HONORIFIC.replace("Tan Sri Ahmad", ""), "Ahmad");
        assert_eq!(HONORIFIC.replace("Tan Wei Ming", ""), "Tan Wei Ming");
    }
}

//! Keyword vocabularies compiled into word-boundary patterns.
//!
//! The built-in lists can be extended from configuration; the extended tables
//! are compiled once when a parser is built and shared by reference after.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::Result;
use crate::models::config::VocabularyConfig;

const JOB_TITLES: &[&str] = &[
    "manager", "director", "ceo", "cto", "cfo", "coo", "cio", "cmo", "founder", "co-founder",
    "cofounder", "owner", "proprietor", "president", "vice president", "vp", "chairman",
    "chairwoman", "chairperson", "engineer", "developer", "programmer", "designer", "architect",
    "consultant", "analyst", "accountant", "auditor", "executive", "officer", "specialist",
    "coordinator", "supervisor", "administrator", "assistant", "associate", "advisor", "adviser",
    "partner", "principal", "head", "lead", "chief", "secretary", "treasurer", "agent",
    "representative", "technician", "salesman", "saleswoman", "sales", "marketing", "intern",
    "lawyer", "advocate", "solicitor", "trainer", "producer", "editor", "pengurus", "pengarah",
    "eksekutif", "penolong",
];

const JOB_TITLES_CJK: &[&str] = &["经理", "總經理", "总经理", "总监", "董事", "总裁", "主任", "主管", "工程师"];

const COMPANY_SUFFIXES: &[&str] = &[
    "sdn bhd", "bhd", "berhad", "inc", "incorporated", "ltd", "limited", "llc", "llp", "plc",
    "corp", "corporation", "company", "co ltd", "group", "holdings", "holding", "enterprise",
    "enterprises", "pte ltd", "pty ltd", "gmbh", "plt",
];

const COMPANY_SUFFIXES_CJK: &[&str] = &["有限公司", "公司", "集团", "株式会社"];

const COMPANY_KEYWORDS: &[&str] = &[
    "solutions", "solution", "technology", "technologies", "consulting", "consultancy",
    "services", "trading", "industries", "industrial", "international", "systems", "studio",
    "agency", "associates", "ventures", "labs", "bank", "university", "college", "hospital",
    "clinic", "restaurant", "resources", "media", "logistics", "engineering", "networks",
    "software", "manufacturing", "properties", "realty", "foundation", "institute",
];

const ADDRESS_KEYWORDS: &[&str] = &[
    "jalan", "jln", "lorong", "lrg", "persiaran", "lebuh", "lebuhraya", "taman", "tmn",
    "kampung", "kg", "seksyen", "bandar", "pusat", "street", "road", "rd", "avenue", "ave",
    "lane", "boulevard", "blvd", "drive", "highway", "lot", "unit", "suite", "level", "floor",
    "flr", "block", "blk", "apartment", "apt", "section", "po box", "p o box", "industrial park",
];

const ADDRESS_KEYWORDS_CJK: &[&str] = &["路", "街", "号", "楼", "大厦"];

const BUILDING_WORDS: &[&str] = &[
    "plaza", "tower", "towers", "mall", "menara", "wisma", "centre", "center", "complex",
    "building", "bangunan", "court", "square", "residence", "residences", "heights", "galleria",
    "arcade",
];

const REGIONS: &[&str] = &[
    "johor", "kedah", "kelantan", "melaka", "malacca", "negeri sembilan", "pahang", "penang",
    "pulau pinang", "perak", "perlis", "sabah", "sarawak", "selangor", "terengganu",
    "kuala lumpur", "putrajaya", "labuan", "wilayah persekutuan", "darul ehsan", "petaling jaya",
    "shah alam", "klang", "subang jaya", "puchong", "cyberjaya", "seremban", "ipoh",
    "johor bahru", "kota kinabalu", "kuching", "georgetown", "malaysia", "singapore",
];

lazy_static! {
    static ref BUILTIN: Vocabulary = Vocabulary::new(&VocabularyConfig::default())
        .expect("built-in vocabulary compiles");
}

/// Compiled keyword tables.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    pub job_title: Regex,
    pub company_suffix: Regex,
    pub company_keyword: Regex,
    pub address: Regex,
    pub building: Regex,
    pub region: Regex,
}

impl Vocabulary {
    /// Compile the built-in lists plus the configured extras.
    pub fn new(extra: &VocabularyConfig) -> Result<Self> {
        Ok(Self {
            job_title: compile_words(JOB_TITLES, JOB_TITLES_CJK, &extra.extra_job_titles)?,
            company_suffix: compile_words(
                COMPANY_SUFFIXES,
                COMPANY_SUFFIXES_CJK,
                &extra.extra_company_suffixes,
            )?,
            company_keyword: compile_words(COMPANY_KEYWORDS, &[], &[])?,
            address: compile_words(
                ADDRESS_KEYWORDS,
                ADDRESS_KEYWORDS_CJK,
                &extra.extra_address_keywords,
            )?,
            building: compile_words(BUILDING_WORDS, &[], &[])?,
            region: compile_words(REGIONS, &[], &extra.extra_regions)?,
        })
    }

    /// The built-in vocabulary, compiled on first use.
    pub fn builtin() -> &'static Vocabulary {
        &BUILTIN
    }

    /// Line looks like part of a postal address.
    pub fn is_address_like(&self, text: &str) -> bool {
        self.address.is_match(text)
            || self.building.is_match(text)
            || self.region.is_match(text)
            || super::POSTCODE.is_match(text)
            || super::STREET_NUMBER.is_match(text)
    }
}

/// Put `\b` on each side of a word whose edge character is a word character.
fn with_boundaries(word: &str, escaped: String) -> String {
    let is_word = |c: Option<char>| c.is_some_and(|c| c.is_alphanumeric() || c == '_');
    let start = if is_word(word.chars().next()) { r"\b" } else { "" };
    let end = if is_word(word.chars().next_back()) { r"\b" } else { "" };
    format!("{start}{escaped}{end}")
}

/// Build one case-insensitive alternation.
///
/// ASCII words are matched on word boundaries and their inner spaces accept
/// any run of dots and whitespace ("Sdn. Bhd." matches "sdn bhd"). Words in
/// scripts without spaces are matched anywhere.
fn compile_words(ascii: &[&str], unspaced: &[&str], extra: &[String]) -> Result<Regex> {
    let mut bounded: Vec<String> = Vec::new();
    let mut anywhere: Vec<String> = Vec::new();

    let words = ascii
        .iter()
        .chain(unspaced.iter())
        .map(|w| w.to_string())
        .chain(extra.iter().map(|w| w.trim().to_lowercase()))
        .filter(|w| !w.is_empty());

    for word in words {
        let escaped = word
            .split_whitespace()
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(r"[.\s]+");
        if word.is_ascii() {
            bounded.push(with_boundaries(&word, escaped));
        } else {
            anywhere.push(escaped);
        }
    }

    // Longest first so "vice president" wins over "president".
    bounded.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    bounded.dedup();
    anywhere.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    anywhere.dedup();

    let mut alternatives = Vec::new();
    if !bounded.is_empty() {
        alternatives.push(format!("(?:{})", bounded.join("|")));
    }
    if !anywhere.is_empty() {
        alternatives.push(format!("(?:{})", anywhere.join("|")));
    }

    Ok(Regex::new(&format!("(?i){}", alternatives.join("|")))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_titles() {
        let vocab = Vocabulary::builtin();
        assert!(vocab.job_title.is_match("FINANCE MANAGER"));
        assert!(vocab.job_title.is_match("Co-Founder & CEO"));
        assert!(vocab.job_title.is_match("销售经理"));
        assert!(!vocab.job_title.is_match("Managerial Plaza"));
    }

    #[test]
    fn test_company_suffix_with_dots() {
        let vocab = Vocabulary::builtin();
        assert!(vocab.company_suffix.is_match("PSG SDN BHD"));
        assert!(vocab.company_suffix.is_match("Acme Sdn. Bhd."));
        assert!(vocab.company_suffix.is_match("Acme Pte Ltd"));
        assert!(vocab.company_suffix.is_match("绿叶有限公司"));
        assert!(!vocab.company_suffix.is_match("Rachel Tan"));
    }

    #[test]
    fn test_address_like() {
        let vocab = Vocabulary::builtin();
        assert!(vocab.is_address_like("Lot 210, Jalan Sungai Putus, 42100 Klang, Selangor"));
        assert!(vocab.is_address_like("No. 88, Jalan Merdeka"));
        assert!(vocab.is_address_like("Menara Citibank"));
        assert!(vocab.is_address_like("Kuala Lumpur"));
        assert!(!vocab.is_address_like("Rachel Tan"));
        assert!(!vocab.is_address_like("Fax No."));
    }

    #[test]
    fn test_extra_words() {
        let extra = VocabularyConfig {
            extra_job_titles: vec!["Barista".to_string()],
            extra_regions: vec!["Tasmania".to_string()],
            ..Default::default()
        };
        let vocab = Vocabulary::new(&extra).unwrap();
        assert!(vocab.job_title.is_match("Head BARISTA"));
        assert!(vocab.region.is_match("Hobart, Tasmania"));
        assert!(!Vocabulary::builtin().region.is_match("Hobart, Tasmania"));
    }

    #[test]
    fn test_extra_words_are_escaped() {
        let extra = VocabularyConfig {
            extra_company_suffixes: vec!["(pty".to_string()],
            ..Default::default()
        };
        let vocab = Vocabulary::new(&extra).unwrap();
        assert!(vocab.company_suffix.is_match("Acme (Pty) Ltd"));
        assert!(vocab.company_suffix.is_match("ACME (PTY"));
        assert!(!vocab.company_suffix.is_match("Acme (Ptyx"));
    }

    #[test]
    fn test_punctuated_builtin_words() {
        let vocab = Vocabulary::builtin();
        assert!(vocab.job_title.is_match("Co-Founder"));
        assert!(vocab.job_title.is_match("VP, Sales"));
        assert!(!vocab.job_title.is_match("VPN Gateway"));
    }
}

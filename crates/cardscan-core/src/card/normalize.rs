//! Output clean-up applied to resolved values.

use super::rules::{
    cjk_count, COMMA_NAME, COMPANY_ACRONYM, HONORIFIC, MULTI_SPACE, REPEATED_COMMAS,
    SPACE_BEFORE_COMMA, TITLE_ACRONYM, TITLE_JOINER, TRAILING_LABEL,
};

pub use super::rules::format_phone;

/// Upper-case the first letter of each word (and after `-` or `'`),
/// lower-case the rest.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut start = true;
    for c in text.chars() {
        if start {
            out.extend(c.to_uppercase());
        } else {
            out.extend(c.to_lowercase());
        }
        start = c.is_whitespace() || c == '-' || c == '\'';
    }
    out
}

fn collapse_spaces(text: &str) -> String {
    MULTI_SPACE.replace_all(text.trim(), " ").into_owned()
}

/// Reorder "Last, First", strip honorifics and Title-Case Latin names.
pub fn normalize_name(raw: &str) -> String {
    let mut name = collapse_spaces(raw);

    if let Some(caps) = COMMA_NAME.captures(&name) {
        name = format!("{} {}", &caps[2], &caps[1]);
    }

    loop {
        let stripped = HONORIFIC.replace(&name, "").into_owned();
        if stripped == name || stripped.is_empty() {
            break;
        }
        name = stripped;
    }

    if cjk_count(&name) > 0 {
        name
    } else {
        title_case(&name)
    }
}

/// Title-Case an ALL-CAPS title, keeping acronyms upper-case and joining
/// words lower-case. Mixed-case titles are left alone.
pub fn normalize_job_title(raw: &str) -> String {
    let title = collapse_spaces(raw);
    let has_letters = title.chars().any(|c| c.is_alphabetic());
    if !has_letters || title.chars().any(|c| c.is_lowercase()) {
        return title;
    }

    let cased = title_case(&title);
    let cased = TITLE_ACRONYM.replace_all(&cased, |caps: &regex::Captures| caps[1].to_uppercase());
    TITLE_JOINER
        .replace_all(&cased, |caps: &regex::Captures| format!(" {}", caps[1].to_lowercase()))
        .into_owned()
}

/// Upper-case legal-form acronyms (`GmbH` keeps its own casing).
pub fn normalize_company(raw: &str) -> String {
    let company = collapse_spaces(raw);
    COMPANY_ACRONYM
        .replace_all(&company, |caps: &regex::Captures| {
            let word = &caps[1];
            if word.eq_ignore_ascii_case("gmbh") {
                "GmbH".to_string()
            } else {
                word.to_uppercase()
            }
        })
        .into_owned()
}

/// Drop trailing phone or email labels and tidy commas and spaces.
pub fn normalize_address(raw: &str) -> String {
    let mut address = collapse_spaces(raw);
    loop {
        let stripped = TRAILING_LABEL.replace(&address, "").into_owned();
        if stripped == address {
            break;
        }
        address = stripped;
    }

    let address = REPEATED_COMMAS.replace_all(&address, ",");
    let address = SPACE_BEFORE_COMMA.replace_all(&address, ",");
    let address = MULTI_SPACE.replace_all(&address, " ");
    address
        .trim_matches(|c: char| c == ',' || c.is_whitespace())
        .to_string()
}

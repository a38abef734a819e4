//! Compiled-once pattern tables and lexical rules for business cards.

pub mod patterns;
pub mod phone;
pub mod vocabulary;

pub use patterns::*;
pub use phone::{
    classify_shape, find_phone, format_phone, keyword_role, PhoneMatch, PhoneRole, PhoneShape,
};
pub use vocabulary::Vocabulary;

/// Check if a character is a CJK ideograph.
pub fn is_cjk(c: char) -> bool {
    matches!(c,
        '\u{4E00}'..='\u{9FFF}'
        | '\u{3400}'..='\u{4DBF}'
        | '\u{F900}'..='\u{FAFF}'
        | '\u{20000}'..='\u{2A6DF}')
}

/// Number of CJK ideographs in the text.
pub fn cjk_count(text: &str) -> usize {
    text.chars().filter(|c| is_cjk(*c)).count()
}

/// Share of non-whitespace characters that are letters.
pub fn letter_density(text: &str) -> f32 {
    let mut letters = 0usize;
    let mut total = 0usize;
    for c in text.chars().filter(|c| !c.is_whitespace()) {
        total += 1;
        if c.is_alphabetic() {
            letters += 1;
        }
    }
    if total == 0 {
        0.0
    } else {
        letters as f32 / total as f32
    }
}

/// Split a line into words on whitespace and commas.
pub fn words(text: &str) -> Vec<&str> {
    text.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|w| !w.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cjk_detection() {
        assert_eq!(cjk_count("陈美玲"), 3);
        assert_eq!(cjk_count("Rachel 陈"), 1);
        assert_eq!(cjk_count("Rachel Tan"), 0);
    }

    #[test]
    fn test_letter_density() {
        assert_eq!(letter_density("RACHEL TAN"), 1.0);
        assert!(letter_density("017-334 7211") < 0.1);
        assert_eq!(letter_density("   "), 0.0);
    }

    #[test]
    fn test_words() {
        assert_eq!(words("Tan,  Rachel  Mei"), vec!["Tan", "Rachel", "Mei"]);
    }
}

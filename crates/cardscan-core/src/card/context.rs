//! Read-only view of one parse call shared by the contextual pass.

use std::collections::BTreeSet;

use super::classifier::Classification;
use super::generator::{is_cjk_name, is_western_name};
use super::rules::{
    find_phone, keyword_role, words, Vocabulary, COMMA_NAME, POSTCODE, STREET_NUMBER, URL,
};
use super::segmenter::Line;
use crate::models::config::{CardscanConfig, ScoringWeights};

/// Everything Pass 2 may look at. Nothing in here changes during the pass.
pub struct Context<'a> {
    pub lines: &'a [Line],
    pub consumed: &'a BTreeSet<usize>,
    pub vocabulary: &'a Vocabulary,
    pub config: &'a CardscanConfig,
    /// The email chosen in Pass 1, if any.
    pub email: Option<String>,
    /// Employer token from the email domain (or website when no email).
    pub domain_token: Option<String>,
    remaining: Vec<&'a Line>,
}

impl<'a> Context<'a> {
    pub fn new(
        lines: &'a [Line],
        classification: &'a Classification,
        vocabulary: &'a Vocabulary,
        config: &'a CardscanConfig,
    ) -> Self {
        let remaining = lines
            .iter()
            .filter(|line| !classification.consumed.contains(&line.index))
            .collect();
        let email = classification.email().map(str::to_string);

        let extraction = &config.extraction;
        let domain_token = email
            .as_deref()
            .and_then(email_domain_token)
            .or_else(|| classification.urls.first().and_then(|url| url_domain_token(url)))
            .filter(|token| token.chars().count() >= extraction.min_domain_token_len)
            .filter(|token| {
                !extraction
                    .generic_email_domains
                    .iter()
                    .any(|generic| generic.eq_ignore_ascii_case(token))
            });

        Self {
            lines,
            consumed: &classification.consumed,
            vocabulary,
            config,
            email,
            domain_token,
            remaining,
        }
    }

    /// Lines Pass 1 left untouched, in card order.
    pub fn remaining(&self) -> &[&'a Line] {
        &self.remaining
    }

    pub fn line(&self, index: usize) -> Option<&'a Line> {
        self.lines.get(index)
    }

    pub fn is_consumed(&self, index: usize) -> bool {
        self.consumed.contains(&index)
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.config.extraction.weights
    }

    /// Local part of the chosen email, lower-cased.
    pub fn email_local_part(&self) -> Option<String> {
        self.email
            .as_deref()
            .and_then(|email| email.split('@').next())
            .filter(|local| !local.is_empty())
            .map(str::to_lowercase)
    }

    /// Position of a line as a fraction of the card height.
    pub fn relative_position(&self, index: usize) -> f32 {
        if self.lines.is_empty() {
            0.0
        } else {
            index as f32 / self.lines.len() as f32
        }
    }

    /// Number of remaining lines searched first for the name.
    pub fn top_region_len(&self) -> usize {
        let n = self.remaining.len();
        if n == 0 {
            return 0;
        }
        let share = (n as f32 * self.config.extraction.top_region_ratio).ceil() as usize;
        share.clamp(1, n)
    }

    /// A phone number or a bare phone label ("Fax No.").
    pub fn is_phone_related(&self, text: &str) -> bool {
        find_phone(text, &self.config.phone).is_some()
            || (keyword_role(text).is_some() && words(text).len() <= 3)
    }

    pub fn is_title_line(&self, text: &str) -> bool {
        self.vocabulary.job_title.is_match(text) && !self.vocabulary.company_suffix.is_match(text)
    }

    /// Line that can start or extend an address.
    ///
    /// A legal-suffix line only counts when it also carries a street keyword,
    /// postcode or street number.
    pub fn is_address_trigger(&self, text: &str) -> bool {
        let vocab = self.vocabulary;
        if !vocab.is_address_like(text) || self.is_phone_related(text) {
            return false;
        }
        if vocab.company_suffix.is_match(text) {
            return vocab.address.is_match(text)
                || POSTCODE.is_match(text)
                || STREET_NUMBER.is_match(text);
        }
        true
    }

    /// Rules shared by every name family: the line must not belong to
    /// another field.
    pub fn excluded_from_name(&self, text: &str) -> bool {
        let vocab = self.vocabulary;
        vocab.company_suffix.is_match(text)
            || vocab.company_keyword.is_match(text)
            || vocab.is_address_like(text)
            || self.is_title_line(text)
            || self.is_phone_related(text)
            || text.contains('@')
            || URL.is_match(text)
    }

    /// Loose test used to close address blocks.
    pub fn looks_like_name(&self, text: &str) -> bool {
        COMMA_NAME.is_match(text) || is_western_name(text) || is_cjk_name(text)
    }
}

/// Token between `@` and the first `.` of an email address.
pub fn email_domain_token(email: &str) -> Option<String> {
    let domain = email.split('@').nth(1)?;
    let token = domain.split('.').next()?.trim().to_lowercase();
    (!token.is_empty()).then_some(token)
}

/// First label of a URL host, skipping `www`.
pub fn url_domain_token(url: &str) -> Option<String> {
    let lower = url.to_lowercase();
    let host = lower
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .split(['/', '?', '#', ':'])
        .next()?;
    let host = host.strip_prefix("www.").unwrap_or(host);
    let token = host.split('.').next()?.trim();
    (!token.is_empty()).then(|| token.to_string())
}

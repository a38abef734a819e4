//! Structured contact record produced by the extraction engine.

use serde::{Deserialize, Serialize};

/// A parsed business card.
///
/// Every string field is present; a field that could not be extracted is an
/// empty string with confidence 0 so consumers always see the same shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParsedBusinessCard {
    /// Person's name, title-cased, honorifics removed.
    pub name: String,

    /// Job title or role.
    pub job_title: String,

    /// Company or organisation name.
    pub company: String,

    /// Phone numbers by role.
    pub phones: Phones,

    /// Email address.
    pub email: String,

    /// Postal address joined into one line.
    pub address: String,

    /// Per-field and overall confidence scores.
    pub confidence: FieldConfidence,
}

/// Phone numbers by role, formatted with `-` delimiters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Phones {
    pub mobile1: String,
    pub mobile2: String,
    pub office: String,
    pub fax: String,
}

impl Phones {
    /// Check if no phone number was found.
    pub fn is_empty(&self) -> bool {
        self.mobile1.is_empty()
            && self.mobile2.is_empty()
            && self.office.is_empty()
            && self.fax.is_empty()
    }

    /// Iterate over `(role, number)` pairs that are filled.
    pub fn filled(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("mobile1", self.mobile1.as_str()),
            ("mobile2", self.mobile2.as_str()),
            ("office", self.office.as_str()),
            ("fax", self.fax.as_str()),
        ]
        .into_iter()
        .filter(|(_, number)| !number.is_empty())
    }
}

/// Confidence scores (0.0 - 1.0).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldConfidence {
    /// Mean of the strictly positive field confidences, or 0.
    pub overall: f32,
    pub name: f32,
    pub job_title: f32,
    pub company: f32,
    /// One flat score for the whole phone bundle.
    pub phones: f32,
    pub email: f32,
    pub address: f32,
}

impl FieldConfidence {
    fn fields(&self) -> [f32; 6] {
        [
            self.name,
            self.job_title,
            self.company,
            self.phones,
            self.email,
            self.address,
        ]
    }

    /// Recompute `overall` from the field scores.
    ///
    /// Fields at 0 are left out of the mean rather than dragging it down.
    pub fn with_overall(mut self) -> Self {
        let positive: Vec<f32> = self.fields().into_iter().filter(|c| *c > 0.0).collect();
        self.overall = if positive.is_empty() {
            0.0
        } else {
            positive.iter().sum::<f32>() / positive.len() as f32
        };
        self
    }
}

impl ParsedBusinessCard {
    /// An all-empty, all-zero record.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Check if nothing at all was extracted.
    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
            && self.job_title.is_empty()
            && self.company.is_empty()
            && self.phones.is_empty()
            && self.email.is_empty()
            && self.address.is_empty()
    }

    /// Names of the fields left empty.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.name.is_empty() {
            missing.push("name");
        }
        if self.job_title.is_empty() {
            missing.push("jobTitle");
        }
        if self.company.is_empty() {
            missing.push("company");
        }
        if self.phones.is_empty() {
            missing.push("phones");
        }
        if self.email.is_empty() {
            missing.push("email");
        }
        if self.address.is_empty() {
            missing.push("address");
        }
        missing
    }
}

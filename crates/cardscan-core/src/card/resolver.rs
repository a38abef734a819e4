//! Final selection: one winner per field, merged addresses, confidences.

use std::cmp::Ordering;

use serde::Serialize;
use tracing::debug;

use super::candidate::{CandidatePool, FieldCandidate, FieldKind, PhoneSlot};
use super::context::Context;
use super::generator::join_address;
use super::normalize::{
    format_phone, normalize_address, normalize_company, normalize_job_title, normalize_name,
};
use super::rescoring::email_resolution_name;
use crate::models::card::{FieldConfidence, ParsedBusinessCard, Phones};

/// Why a field ended up with its value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldTrace {
    pub field: &'static str,
    /// Normalized output value.
    pub value: String,
    pub confidence: f32,
    pub line_index: Option<usize>,
    pub source_tags: Vec<String>,
}

impl FieldTrace {
    fn new(field: FieldKind, candidate: &FieldCandidate, value: String) -> Self {
        Self {
            field: field.label(),
            value,
            confidence: candidate.confidence,
            line_index: candidate.line_index,
            source_tags: candidate.source_tags.iter().map(|t| t.to_string()).collect(),
        }
    }
}

/// Resolved card plus the trace of every winning candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub card: ParsedBusinessCard,
    pub trace: Vec<FieldTrace>,
}

/// Candidates by confidence, highest first; ties go to the earlier line,
/// then to discovery order.
pub fn rank(candidates: &[FieldCandidate]) -> Vec<&FieldCandidate> {
    let mut ranked: Vec<&FieldCandidate> = candidates.iter().collect();
    ranked.sort_by(|a, b| {
        b.confidence
            .total_cmp(&a.confidence)
            .then_with(|| line_order(a.line_index, b.line_index))
    });
    ranked
}

fn line_order(a: Option<usize>, b: Option<usize>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Merge address candidates on neighbouring lines.
///
/// Candidates are ordered by line and grouped into runs where each line is
/// at most one below the previous. The run holding the best candidate wins;
/// its confidence is that candidate's.
pub fn merge_address(candidates: &[FieldCandidate]) -> Option<FieldCandidate> {
    let best = *rank(candidates).first()?;
    if candidates.len() == 1 {
        return Some(best.clone());
    }

    let mut ordered: Vec<&FieldCandidate> = candidates.iter().collect();
    ordered.sort_by(|a, b| line_order(a.line_index, b.line_index));

    let mut runs: Vec<Vec<&FieldCandidate>> = Vec::new();
    for candidate in ordered {
        let extends = runs
            .last()
            .and_then(|run| run.last())
            .and_then(|prev| Some((prev.line_index?, candidate.line_index?)))
            .is_some_and(|(prev, next)| next.saturating_sub(prev) <= 1);
        if let (true, Some(run)) = (extends, runs.last_mut()) {
            run.push(candidate);
        } else {
            runs.push(vec![candidate]);
        }
    }

    let run = runs
        .into_iter()
        .find(|run| run.iter().any(|c| std::ptr::eq(*c, best)))?;
    if run.len() == 1 {
        return Some(best.clone());
    }

    let parts: Vec<&str> = run.iter().map(|c| c.value.as_str()).collect();
    let mut merged = best.adjusted(0.0, "address_merged");
    merged.value = join_address(&parts);
    merged.line_index = run[0].line_index;
    for candidate in &run {
        merged.source_tags.extend(candidate.source_tags.iter().copied());
    }
    Some(merged)
}

/// First ranked candidate whose normalized value is non-empty and not
/// already used by another field.
fn pick<'p>(
    candidates: &'p [FieldCandidate],
    normalize: fn(&str) -> String,
    taken: &[String],
) -> Option<(&'p FieldCandidate, String)> {
    rank(candidates).into_iter().find_map(|candidate| {
        let value = normalize(&candidate.value);
        let key = value.to_lowercase();
        (!value.is_empty() && !taken.contains(&key)).then_some((candidate, value))
    })
}

/// Pick every field's winner and compute the confidences.
pub fn resolve(pool: &CandidatePool, ctx: &Context) -> Resolution {
    let pool = pool.apply(&email_resolution_name(pool, ctx));
    let mut card = ParsedBusinessCard::empty();
    let mut confidence = FieldConfidence::default();
    let mut trace = Vec::new();
    let mut taken: Vec<String> = Vec::new();

    if let Some((winner, value)) = pick(pool.get(FieldKind::Name), normalize_name, &taken) {
        confidence.name = winner.confidence;
        taken.push(value.to_lowercase());
        trace.push(FieldTrace::new(FieldKind::Name, winner, value.clone()));
        card.name = value;
    }

    if let Some((winner, value)) = pick(pool.get(FieldKind::JobTitle), normalize_job_title, &taken) {
        confidence.job_title = winner.confidence;
        taken.push(value.to_lowercase());
        trace.push(FieldTrace::new(FieldKind::JobTitle, winner, value.clone()));
        card.job_title = value;
    }

    if let Some((winner, value)) = pick(pool.get(FieldKind::Company), normalize_company, &taken) {
        confidence.company = winner.confidence;
        trace.push(FieldTrace::new(FieldKind::Company, winner, value.clone()));
        card.company = value;
    }

    if let Some(winner) = rank(pool.get(FieldKind::Email)).first() {
        confidence.email = winner.confidence;
        card.email = winner.value.trim().to_string();
        trace.push(FieldTrace::new(FieldKind::Email, winner, card.email.clone()));
    }

    let mut phones = Phones::default();
    for slot in PhoneSlot::ALL {
        let field = FieldKind::Phone(slot);
        let Some(winner) = rank(pool.get(field)).first().copied() else {
            continue;
        };
        let number = format_phone(&winner.value);
        confidence.phones = confidence.phones.max(winner.confidence);
        trace.push(FieldTrace::new(field, winner, number.clone()));
        match slot {
            PhoneSlot::Mobile1 => phones.mobile1 = number,
            PhoneSlot::Mobile2 => phones.mobile2 = number,
            PhoneSlot::Office => phones.office = number,
            PhoneSlot::Fax => phones.fax = number,
        }
    }
    card.phones = phones;

    if let Some(merged) = merge_address(pool.get(FieldKind::Address)) {
        let value = normalize_address(&merged.value);
        if !value.is_empty() {
            confidence.address = merged.confidence;
            trace.push(FieldTrace::new(FieldKind::Address, &merged, value.clone()));
            card.address = value;
        }
    }

    card.confidence = confidence.with_overall();
    debug!(
        "resolved {} fields, overall confidence {:.2}",
        trace.len(),
        card.confidence.overall
    );

    Resolution { card, trace }
}

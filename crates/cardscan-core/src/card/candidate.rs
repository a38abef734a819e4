//! Field candidates and the per-call candidate pool.
//!
//! Generation pushes candidates into a pool it owns. Every later change is an
//! [`Adjustment`] applied through [`CandidatePool::apply`], which returns a
//! new pool and leaves the input untouched.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

/// Phone roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PhoneSlot {
    Mobile1,
    Mobile2,
    Office,
    Fax,
}

impl PhoneSlot {
    pub const ALL: [PhoneSlot; 4] = [
        PhoneSlot::Mobile1,
        PhoneSlot::Mobile2,
        PhoneSlot::Office,
        PhoneSlot::Fax,
    ];
}

/// Field a candidate is proposed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum FieldKind {
    Name,
    JobTitle,
    Company,
    Email,
    Address,
    Url,
    Phone(PhoneSlot),
}

impl FieldKind {
    /// Field name as it appears in the output record.
    pub fn label(&self) -> &'static str {
        match self {
            FieldKind::Name => "name",
            FieldKind::JobTitle => "jobTitle",
            FieldKind::Company => "company",
            FieldKind::Email => "email",
            FieldKind::Address => "address",
            FieldKind::Url => "url",
            FieldKind::Phone(PhoneSlot::Mobile1) => "phones.mobile1",
            FieldKind::Phone(PhoneSlot::Mobile2) => "phones.mobile2",
            FieldKind::Phone(PhoneSlot::Office) => "phones.office",
            FieldKind::Phone(PhoneSlot::Fax) => "phones.fax",
        }
    }
}

/// A proposed value for one field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldCandidate {
    pub value: String,
    /// Always within [0, 1].
    pub confidence: f32,
    /// Rules that produced or re-weighted this candidate.
    pub source_tags: BTreeSet<&'static str>,
    pub line_index: Option<usize>,
}

impl FieldCandidate {
    pub fn new(value: impl Into<String>, confidence: f32, tag: &'static str) -> Self {
        Self {
            value: value.into(),
            confidence: clamp(confidence),
            source_tags: BTreeSet::from([tag]),
            line_index: None,
        }
    }

    pub fn at_line(mut self, index: usize) -> Self {
        self.line_index = Some(index);
        self
    }

    /// A copy with the confidence shifted by `delta` and `tag` recorded.
    pub fn adjusted(&self, delta: f32, tag: &'static str) -> Self {
        let mut next = self.clone();
        next.confidence = clamp(self.confidence + delta);
        next.source_tags.insert(tag);
        next
    }
}

fn clamp(confidence: f32) -> f32 {
    if confidence.is_nan() {
        0.0
    } else {
        confidence.clamp(0.0, 1.0)
    }
}

/// Address of one candidate inside a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CandidateRef {
    pub field: FieldKind,
    pub position: usize,
}

/// A confidence change for one candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct Adjustment {
    pub target: CandidateRef,
    pub delta: f32,
    pub tag: &'static str,
}

/// Output of one re-scoring rule.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rescore {
    pub adjustments: Vec<Adjustment>,
    pub additions: Vec<(FieldKind, FieldCandidate)>,
}

impl Rescore {
    pub fn adjust(&mut self, target: CandidateRef, delta: f32, tag: &'static str) {
        self.adjustments.push(Adjustment { target, delta, tag });
    }

    pub fn add(&mut self, field: FieldKind, candidate: FieldCandidate) {
        self.additions.push((field, candidate));
    }

    pub fn is_empty(&self) -> bool {
        self.adjustments.is_empty() && self.additions.is_empty()
    }
}

/// All candidates of one parse call, keyed by field, in discovery order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidatePool {
    fields: BTreeMap<FieldKind, Vec<FieldCandidate>>,
}

impl CandidatePool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: FieldKind, candidate: FieldCandidate) {
        self.fields.entry(field).or_default().push(candidate);
    }

    /// Candidates for a field, in discovery order.
    pub fn get(&self, field: FieldKind) -> &[FieldCandidate] {
        self.fields.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has(&self, field: FieldKind) -> bool {
        !self.get(field).is_empty()
    }

    /// Candidates for a field with their addresses.
    pub fn refs(&self, field: FieldKind) -> impl Iterator<Item = (CandidateRef, &FieldCandidate)> {
        self.get(field)
            .iter()
            .enumerate()
            .map(move |(position, candidate)| (CandidateRef { field, position }, candidate))
    }

    /// Check if a field already has a candidate on the given line.
    pub fn on_line(&self, field: FieldKind, index: usize) -> bool {
        self.get(field).iter().any(|c| c.line_index == Some(index))
    }

    /// Remove and return every candidate of a field.
    pub fn take(&mut self, field: FieldKind) -> Vec<FieldCandidate> {
        self.fields.remove(&field).unwrap_or_default()
    }

    /// Total number of candidates.
    pub fn len(&self) -> usize {
        self.fields.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Move every candidate of `other` into this pool, after the existing ones.
    pub fn extend(&mut self, other: CandidatePool) {
        for (field, candidates) in other.fields {
            self.fields.entry(field).or_default().extend(candidates);
        }
    }

    /// Produce a new pool with a rule's adjustments and additions applied.
    ///
    /// Adjustments to unknown addresses are ignored. Additions that repeat an
    /// existing value on the same line are dropped.
    pub fn apply(&self, rescore: &Rescore) -> CandidatePool {
        let mut next = self.clone();

        for adjustment in &rescore.adjustments {
            let target = adjustment.target;
            if let Some(candidate) = next
                .fields
                .get_mut(&target.field)
                .and_then(|candidates| candidates.get_mut(target.position))
            {
                *candidate = candidate.adjusted(adjustment.delta, adjustment.tag);
            }
        }

        for (field, candidate) in &rescore.additions {
            let duplicate = next.get(*field).iter().any(|existing| {
                existing.line_index == candidate.line_index && existing.value == candidate.value
            });
            if !duplicate {
                next.push(*field, candidate.clone());
            }
        }

        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_is_clamped() {
        let candidate = FieldCandidate::new("PSG SDN BHD", 0.9, "company_suffix");
        let boosted = candidate.adjusted(0.2, "email_domain");
        assert_eq!(boosted.confidence, 1.0);
        assert_eq!(candidate.confidence, 0.9);

        let lowered = candidate.adjusted(-2.0, "penalty");
        assert_eq!(lowered.confidence, 0.0);
        assert_eq!(FieldCandidate::new("x", f32::NAN, "t").confidence, 0.0);
    }

    #[test]
    fn test_tags_accumulate() {
        let candidate = FieldCandidate::new("Rachel Tan", 0.8, "name_western")
            .adjusted(0.15, "email_local_part")
            .adjusted(0.2, "title_adjacent");
        assert_eq!(
            candidate.source_tags.iter().copied().collect::<Vec<_>>(),
            vec!["email_local_part", "name_western", "title_adjacent"]
        );
    }

    #[test]
    fn test_apply_returns_new_pool() {
        let mut pool = CandidatePool::new();
        pool.push(FieldKind::Name, FieldCandidate::new("Rachel Tan", 0.8, "name_western").at_line(0));

        let mut rescore = Rescore::default();
        rescore.adjust(CandidateRef { field: FieldKind::Name, position: 0 }, 0.1, "boost");
        rescore.adjust(CandidateRef { field: FieldKind::Name, position: 7 }, 0.1, "missing");
        rescore.add(FieldKind::Company, FieldCandidate::new("PSG", 0.7, "email_domain_line").at_line(2));

        let next = pool.apply(&rescore);

        assert!((pool.get(FieldKind::Name)[0].confidence - 0.8).abs() < 1e-6);
        assert!((next.get(FieldKind::Name)[0].confidence - 0.9).abs() < 1e-6);
        assert_eq!(next.get(FieldKind::Company).len(), 1);
        assert_eq!(next.len(), 2);
    }

    #[test]
    fn test_apply_skips_duplicate_additions() {
        let mut pool = CandidatePool::new();
        pool.push(FieldKind::Name, FieldCandidate::new("Rachel Tan", 0.8, "name_western").at_line(0));

        let mut rescore = Rescore::default();
        rescore.add(FieldKind::Name, FieldCandidate::new("Rachel Tan", 0.65, "line_above_title").at_line(0));

        assert_eq!(pool.apply(&rescore).get(FieldKind::Name).len(), 1);
    }

    #[test]
    fn test_on_line_and_refs() {
        let mut pool = CandidatePool::new();
        pool.push(FieldKind::JobTitle, FieldCandidate::new("Manager", 0.85, "job_title").at_line(3));

        assert!(pool.on_line(FieldKind::JobTitle, 3));
        assert!(!pool.on_line(FieldKind::JobTitle, 2));
        let refs: Vec<_> = pool.refs(FieldKind::JobTitle).map(|(r, _)| r.position).collect();
        assert_eq!(refs, vec![0]);
        assert!(pool.get(FieldKind::Company).is_empty());
    }
}

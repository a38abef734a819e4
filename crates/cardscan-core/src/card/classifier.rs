//! Pass 1: lift out fields with unambiguous lexical signatures.
//!
//! Email, phone and URL lines are claimed here and never reach the
//! contextual pass.

use std::collections::BTreeSet;

use tracing::trace;

use super::candidate::{CandidatePool, FieldCandidate, FieldKind, PhoneSlot};
use super::rules::{
    classify_shape, find_phone, keyword_role, PhoneMatch, PhoneRole, PhoneShape, Vocabulary,
    EMAIL, URL,
};
use super::segmenter::Line;
use crate::models::config::CardscanConfig;

const MOBILE2_LABEL: &str = "mobile2_label";

/// Result of Pass 1.
#[derive(Debug, Clone, Default)]
pub struct Classification {
    /// Email, phone and URL candidates.
    pub pool: CandidatePool,
    /// Indices of the lines claimed.
    pub consumed: BTreeSet<usize>,
    /// Web addresses seen, in card order.
    pub urls: Vec<String>,
}

impl Classification {
    /// The email that won (the first one on the card).
    pub fn email(&self) -> Option<&str> {
        self.pool.get(FieldKind::Email).first().map(|c| c.value.as_str())
    }

    pub fn has_phone(&self) -> bool {
        PhoneSlot::ALL.iter().any(|slot| self.pool.has(FieldKind::Phone(*slot)))
    }
}

/// Run Pass 1 over every line.
pub fn classify(lines: &[Line], config: &CardscanConfig, vocabulary: &Vocabulary) -> Classification {
    let mut result = Classification::default();
    let weights = &config.extraction.weights;

    for line in lines {
        let text = line.text.as_str();

        if let Some(m) = EMAIL.find(text) {
            if result.pool.has(FieldKind::Email) {
                trace!("line {}: extra email {} ignored", line.index, m.as_str());
            } else {
                result.pool.push(
                    FieldKind::Email,
                    FieldCandidate::new(m.as_str(), weights.email, "email_pattern").at_line(line.index),
                );
            }
            result.consumed.insert(line.index);
            continue;
        }

        if let Some((role, phone, label, tag)) = phone_on_line(text, config, vocabulary) {
            let candidate =
                FieldCandidate::new(phone.raw.as_str(), weights.phones, tag).at_line(line.index);
            match place_phone(&mut result.pool, role, label, candidate) {
                Some(slot) => trace!("line {}: phone {} -> {:?}", line.index, phone.raw, slot),
                None => trace!("line {}: no free slot for {:?} {}", line.index, role, phone.raw),
            }
            result.consumed.insert(line.index);
            continue;
        }

        if let Some(m) = URL.find(text) {
            let url = m.as_str().trim_end_matches(['.', ')']).to_string();
            result.pool.push(
                FieldKind::Url,
                FieldCandidate::new(url.clone(), weights.email, "url_pattern").at_line(line.index),
            );
            result.urls.push(url);
            result.consumed.insert(line.index);
        }
    }

    result
}

/// Find the phone on a line and decide its role.
///
/// A role keyword takes the first number after it. Without a keyword the
/// number's shape decides, unless the line reads like an address (a postcode
/// is digit-heavy enough to pass for a phone run).
fn phone_on_line<'t>(
    text: &'t str,
    config: &CardscanConfig,
    vocabulary: &Vocabulary,
) -> Option<(PhoneRole, PhoneMatch, &'t str, &'static str)> {
    if let Some((role, keyword_end)) = keyword_role(text) {
        if let Some(phone) = find_phone(&text[keyword_end..], &config.phone) {
            let label = &text[..keyword_end + phone.start];
            return Some((role, phone, label, "phone_keyword"));
        }
    }

    let phone = find_phone(text, &config.phone)?;
    if vocabulary.is_address_like(text) {
        return None;
    }
    let role = match classify_shape(&phone, &config.phone) {
        PhoneShape::Mobile => PhoneRole::Mobile,
        PhoneShape::Landline => PhoneRole::Office,
    };
    let label = &text[..phone.start];
    Some((role, phone, label, "phone_shape"))
}

/// Put a number into its slot, or drop it when the role is full.
///
/// Mobiles fill `mobile1` then `mobile2`. A label carrying a literal `2`
/// ("Mobile 2", "HP 2") always takes `mobile2`, replacing an unlabelled number
/// already there. `mobile1` is filled before `mobile2`, so the replaced number
/// has nowhere else to go.
fn place_phone(
    pool: &mut CandidatePool,
    role: PhoneRole,
    label: &str,
    mut candidate: FieldCandidate,
) -> Option<PhoneSlot> {
    let free = |pool: &CandidatePool, slot: PhoneSlot| !pool.has(FieldKind::Phone(slot));

    let slot = match role {
        PhoneRole::Mobile if label.contains('2') => {
            candidate.source_tags.insert(MOBILE2_LABEL);
            let occupants = pool.take(FieldKind::Phone(PhoneSlot::Mobile2));
            if occupants.iter().any(|c| c.source_tags.contains(MOBILE2_LABEL)) {
                // The first explicit "Mobile 2" keeps the slot.
                for occupant in occupants {
                    pool.push(FieldKind::Phone(PhoneSlot::Mobile2), occupant);
                }
                return None;
            }
            for occupant in occupants {
                trace!("mobile {} displaced from mobile2", occupant.value);
            }
            PhoneSlot::Mobile2
        }
        PhoneRole::Mobile => [PhoneSlot::Mobile1, PhoneSlot::Mobile2]
            .into_iter()
            .find(|slot| free(pool, *slot))?,
        PhoneRole::Office => Some(PhoneSlot::Office).filter(|slot| free(pool, *slot))?,
        PhoneRole::Fax => Some(PhoneSlot::Fax).filter(|slot| free(pool, *slot))?,
    };

    pool.push(FieldKind::Phone(slot), candidate);
    Some(slot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::segmenter::segment;

    fn run(text: &str) -> (Vec<Line>, Classification) {
        let lines = segment(text);
        let classification = classify(&lines, &CardscanConfig::default(), Vocabulary::builtin());
        (lines, classification)
    }

    fn slot(classification: &Classification, slot: PhoneSlot) -> Option<&str> {
        classification
            .pool
            .get(FieldKind::Phone(slot))
            .first()
            .map(|c| c.value.as_str())
    }

    #[test]
    fn test_keyword_phones() {
        let (_, c) = run(
            "Mobile No : 017-334 7211\nTelephone No : 03-3342 0758\nFax No : 03-3359 1780",
        );

        assert_eq!(slot(&c, PhoneSlot::Mobile1), Some("017-334 7211"));
        assert_eq!(slot(&c, PhoneSlot::Office), Some("03-3342 0758"));
        assert_eq!(slot(&c, PhoneSlot::Fax), Some("03-3359 1780"));
        assert_eq!(c.consumed, BTreeSet::from([0, 1, 2]));
    }

    #[test]
    fn test_numbered_mobiles() {
        let (_, c) = run("Mobile 1: 012-345 6789\nMobile 2: 019-876 5432");
        assert_eq!(slot(&c, PhoneSlot::Mobile1), Some("012-345 6789"));
        assert_eq!(slot(&c, PhoneSlot::Mobile2), Some("019-876 5432"));
    }

    #[test]
    fn test_mobile_two_label_first() {
        let (_, c) = run("HP 2: 019-876 5432\nHP: 012-345 6789");
        assert_eq!(slot(&c, PhoneSlot::Mobile2), Some("019-876 5432"));
        assert_eq!(slot(&c, PhoneSlot::Mobile1), Some("012-345 6789"));
    }

    #[test]
    fn test_mobile_two_label_takes_filled_slot() {
        let (_, c) = run("HP: 012-345 6789\nHP: 013-345 6789\nMobile 2: 019-876 5432");
        assert_eq!(slot(&c, PhoneSlot::Mobile1), Some("012-345 6789"));
        assert_eq!(slot(&c, PhoneSlot::Mobile2), Some("019-876 5432"));
        assert_eq!(c.pool.get(FieldKind::Phone(PhoneSlot::Mobile2)).len(), 1);
        assert_eq!(c.consumed.len(), 3);
    }

    #[test]
    fn test_first_explicit_mobile_two_keeps_slot() {
        let (_, c) = run("Mobile: 012-345 6789\nMobile 2: 019-876 5432\nHP 2: 018-111 2222");
        assert_eq!(slot(&c, PhoneSlot::Mobile1), Some("012-345 6789"));
        assert_eq!(slot(&c, PhoneSlot::Mobile2), Some("019-876 5432"));
        assert_eq!(c.consumed.len(), 3);
    }

    #[test]
    fn test_unlabeled_numbers_by_shape() {
        let (_, c) = run("012-345 6789\n03-7722 1100\n019-876 5432");
        assert_eq!(slot(&c, PhoneSlot::Mobile1), Some("012-345 6789"));
        assert_eq!(slot(&c, PhoneSlot::Office), Some("03-7722 1100"));
        assert_eq!(slot(&c, PhoneSlot::Mobile2), Some("019-876 5432"));
    }

    #[test]
    fn test_third_mobile_dropped_but_consumed() {
        let (_, c) = run("HP: 012-345 6789\nHP: 013-345 6789\nHP: 014-345 6789");
        assert_eq!(c.pool.get(FieldKind::Phone(PhoneSlot::Mobile1)).len(), 1);
        assert_eq!(c.pool.get(FieldKind::Phone(PhoneSlot::Mobile2)).len(), 1);
        assert_eq!(c.consumed.len(), 3);
    }

    #[test]
    fn test_first_email_wins() {
        let (_, c) = run("a@one.com\nb@two.com");
        assert_eq!(c.email(), Some("a@one.com"));
        assert_eq!(c.pool.get(FieldKind::Email).len(), 1);
        assert_eq!(c.consumed.len(), 2);
    }

    #[test]
    fn test_address_line_not_taken_as_phone() {
        let (_, c) = run("Lot 210, Jalan Sungai Putus, 42100 Klang, Selangor");
        assert!(!c.has_phone());
        assert!(c.consumed.is_empty());
    }

    #[test]
    fn test_url_consumed() {
        let (_, c) = run("www.psg.com.my\nhttps://acme.io/team.");
        assert_eq!(c.urls, vec!["www.psg.com.my".to_string(), "https://acme.io/team".to_string()]);
        assert_eq!(c.consumed.len(), 2);
    }

    #[test]
    fn test_plain_lines_untouched() {
        let (_, c) = run("RACHEL TAN\nFINANCE MANAGER\nPSG SDN BHD");
        assert!(c.pool.is_empty());
        assert!(c.consumed.is_empty());
    }
}

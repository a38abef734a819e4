//! Cross-field re-scoring rules.
//!
//! Each rule reads a pool and the parse context and returns a [`Rescore`]
//! (confidence deltas plus any new candidates). Rules never touch the pool
//! they read; [`CandidatePool::apply`] builds the next one.

use std::collections::BTreeSet;

use tracing::trace;

use super::candidate::{CandidatePool, CandidateRef, FieldCandidate, FieldKind, Rescore};
use super::context::Context;
use super::rules::{words, URL};

/// Signature shared by every rule.
pub type RescoreRule = fn(&CandidatePool, &Context) -> Rescore;

/// Company candidates containing the email domain token get a boost; other
/// company-looking lines containing it become new low-confidence candidates.
pub fn email_domain_company(pool: &CandidatePool, ctx: &Context) -> Rescore {
    let mut rescore = Rescore::default();
    let Some(token) = ctx.domain_token.as_deref() else {
        return rescore;
    };
    let weights = ctx.weights();

    for (target, candidate) in pool.refs(FieldKind::Company) {
        if candidate.value.to_lowercase().contains(token) {
            trace!("company {} matches domain {}", candidate.value, token);
            rescore.adjust(target, weights.email_domain_company_boost, "email_domain");
        }
    }

    for line in ctx.remaining() {
        let text = line.text.as_str();
        if pool.on_line(FieldKind::Company, line.index)
            || !contains_word_with(text, token)
            || !is_company_looking(ctx, text)
        {
            continue;
        }
        trace!("line {}: company from domain {}", line.index, token);
        rescore.add(
            FieldKind::Company,
            FieldCandidate::new(text, weights.company_domain, "email_domain_line").at_line(line.index),
        );
    }

    rescore
}

fn contains_word_with(text: &str, token: &str) -> bool {
    words(text).iter().any(|word| {
        let folded: String = word
            .chars()
            .filter(|c| c.is_alphanumeric())
            .flat_map(char::to_lowercase)
            .collect();
        folded.contains(token)
    })
}

fn is_company_looking(ctx: &Context, text: &str) -> bool {
    !(ctx.is_phone_related(text)
        || ctx.is_title_line(text)
        || ctx.is_address_trigger(text)
        || text.contains('@')
        || URL.is_match(text))
}

/// Name candidates sharing a token with the email local part.
pub fn email_local_part_name(pool: &CandidatePool, ctx: &Context) -> Rescore {
    boost_names_matching_email(pool, ctx, ctx.weights().email_name_boost, "email_local_part")
}

/// The same match applied once more while the name is resolved.
pub fn email_resolution_name(pool: &CandidatePool, ctx: &Context) -> Rescore {
    boost_names_matching_email(
        pool,
        ctx,
        ctx.weights().email_name_resolution_boost,
        "email_resolution",
    )
}

fn boost_names_matching_email(
    pool: &CandidatePool,
    ctx: &Context,
    delta: f32,
    tag: &'static str,
) -> Rescore {
    let mut rescore = Rescore::default();
    let Some(local) = ctx.email_local_part() else {
        return rescore;
    };
    for (target, candidate) in pool.refs(FieldKind::Name) {
        if email_matches_name(&local, &candidate.value) {
            rescore.adjust(target, delta, tag);
        }
    }
    rescore
}

/// A name token (3+ letters) inside the local part, or a local-part piece
/// inside a name token.
pub fn email_matches_name(local: &str, name: &str) -> bool {
    let local = local.to_lowercase();
    let pieces: Vec<&str> = local
        .split(|c: char| !c.is_alphabetic())
        .filter(|piece| piece.chars().count() >= 3)
        .collect();

    words(name)
        .iter()
        .map(|token| {
            token
                .chars()
                .filter(|c| c.is_alphabetic())
                .flat_map(char::to_lowercase)
                .collect::<String>()
        })
        .filter(|token| token.chars().count() >= 3)
        .any(|token| local.contains(&token) || pieces.iter().any(|piece| token.contains(piece)))
}

/// Names and titles on neighbouring lines reinforce each other. A title with
/// no neighbouring name proposes the line above it as the name.
pub fn title_name_adjacency(pool: &CandidatePool, ctx: &Context) -> Rescore {
    let mut rescore = Rescore::default();
    let weights = ctx.weights();
    let mut boosted: BTreeSet<CandidateRef> = BTreeSet::new();

    for (title_ref, title) in pool.refs(FieldKind::JobTitle) {
        let Some(title_line) = title.line_index else {
            continue;
        };

        let mut has_neighbour = false;
        for (name_ref, name) in pool.refs(FieldKind::Name) {
            let Some(name_line) = name.line_index else {
                continue;
            };
            if name_line.abs_diff(title_line) != 1 {
                continue;
            }
            has_neighbour = true;
            if boosted.insert(name_ref) {
                rescore.adjust(name_ref, weights.adjacent_name_boost, "title_adjacent");
            }
            if boosted.insert(title_ref) {
                rescore.adjust(title_ref, weights.adjacent_title_boost, "name_adjacent");
            }
        }

        if !has_neighbour {
            if let Some(candidate) = line_above_title(ctx, title_line) {
                trace!("name synthesized above title at line {}", title_line);
                rescore.add(FieldKind::Name, candidate);
            }
        }
    }

    rescore
}

fn line_above_title(ctx: &Context, title_line: usize) -> Option<FieldCandidate> {
    let above = ctx.line(title_line.checked_sub(1)?)?;
    let text = above.text.as_str();
    let usable = !ctx.is_consumed(above.index)
        && !ctx.vocabulary.company_suffix.is_match(text)
        && !ctx.vocabulary.company_keyword.is_match(text)
        && !ctx.is_title_line(text)
        && !ctx.is_phone_related(text)
        && !ctx.is_address_trigger(text)
        && !text.contains('@');
    usable.then(|| {
        FieldCandidate::new(text, ctx.weights().name_synthesized, "line_above_title")
            .at_line(above.index)
    })
}

/// Additive positional weighting: names near the top, companies in the
/// middle band, addresses near the bottom.
pub fn regional_weighting(pool: &CandidatePool, ctx: &Context) -> Rescore {
    let mut rescore = Rescore::default();
    let extraction = &ctx.config.extraction;
    let weights = ctx.weights();

    let position = |candidate: &FieldCandidate| {
        candidate.line_index.map(|index| ctx.relative_position(index))
    };

    for (target, candidate) in pool.refs(FieldKind::Name) {
        if position(candidate).is_some_and(|p| p < extraction.top_region_ratio) {
            rescore.adjust(target, weights.region_name_boost, "top_band");
        }
    }
    for (target, candidate) in pool.refs(FieldKind::Company) {
        if position(candidate)
            .is_some_and(|p| p >= extraction.top_region_ratio && p < extraction.bottom_band_start)
        {
            rescore.adjust(target, weights.region_company_boost, "middle_band");
        }
    }
    for (target, candidate) in pool.refs(FieldKind::Address) {
        if position(candidate).is_some_and(|p| p >= extraction.bottom_band_start) {
            rescore.adjust(target, weights.region_address_boost, "bottom_band");
        }
    }

    rescore
}

/// Apply rules in order, each seeing the previous rule's output.
pub fn run_rules(pool: CandidatePool, ctx: &Context, rules: &[RescoreRule]) -> CandidatePool {
    rules.iter().fold(pool, |pool, rule| {
        let rescore = rule(&pool, ctx);
        if rescore.is_empty() {
            pool
        } else {
            pool.apply(&rescore)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::classifier::{classify, Classification};
    use crate::card::rules::Vocabulary;
    use crate::card::segmenter::{segment, Line};
    use crate::models::config::CardscanConfig;

    struct Fixture {
        config: CardscanConfig,
        lines: Vec<Line>,
        classification: Classification,
    }

    impl Fixture {
        fn new(text: &str) -> Self {
            let config = CardscanConfig::default();
            let lines = segment(text);
            let classification = classify(&lines, &config, Vocabulary::builtin());
            Self { config, lines, classification }
        }

        fn context(&self) -> Context<'_> {
            Context::new(&self.lines, &self.classification, Vocabulary::builtin(), &self.config)
        }
    }

    fn candidate(value: &str, confidence: f32, line: usize) -> FieldCandidate {
        FieldCandidate::new(value, confidence, "fixture").at_line(line)
    }

    fn confidence(pool: &CandidatePool, field: FieldKind, position: usize) -> f32 {
        pool.get(field)[position].confidence
    }

    #[test]
    fn test_email_matches_name() {
        assert!(email_matches_name("rachel", "RACHEL TAN"));
        assert!(email_matches_name("rachel.tan", "Rachel Tan"));
        assert!(email_matches_name("wm.tan88", "Tan Wei Ming"));
        assert!(email_matches_name("rach", "Rachel Tan"));
        assert!(!email_matches_name("sales", "Rachel Tan"));
        assert!(!email_matches_name("ab", "Ab Cd"));
    }

    #[test]
    fn test_email_domain_boosts_company() {
        let fixture = Fixture::new("Rachel Tan\nPSG SDN BHD\nrachel@psg.com.my");
        let ctx = fixture.context();

        let mut pool = CandidatePool::new();
        pool.push(FieldKind::Company, candidate("PSG SDN BHD", 0.85, 1));
        pool.push(FieldKind::Company, candidate("Other Holdings", 0.85, 9));

        let rescore = email_domain_company(&pool, &ctx);
        let next = pool.apply(&rescore);

        assert!((confidence(&next, FieldKind::Company, 0) - 1.0).abs() < 1e-6);
        assert!((confidence(&next, FieldKind::Company, 1) - 0.85).abs() < 1e-6);
        assert!(next.get(FieldKind::Company)[0].source_tags.contains("email_domain"));
    }

    #[test]
    fn test_email_domain_adds_company_line() {
        let fixture = Fixture::new("Rachel Tan\nPSG Digital Team\nrachel@psg.com.my");
        let ctx = fixture.context();

        let mut pool = CandidatePool::new();
        pool.push(FieldKind::Name, candidate("Rachel Tan", 0.8, 0));

        let next = pool.apply(&email_domain_company(&pool, &ctx));
        let companies = next.get(FieldKind::Company);

        assert_eq!(companies.len(), 1);
        assert_eq!(companies[0].value, "PSG Digital Team");
        assert!((companies[0].confidence - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_email_domain_adds_line_that_is_also_a_name_candidate() {
        let fixture = Fixture::new("Jason Ng\nDirector\nZentec Digital\njason@zentec.com.my");
        let ctx = fixture.context();

        let mut pool = CandidatePool::new();
        pool.push(FieldKind::Name, candidate("Jason Ng", 0.8, 0));
        pool.push(FieldKind::Name, candidate("Zentec Digital", 0.8, 2));

        let next = pool.apply(&email_domain_company(&pool, &ctx));
        let companies = next.get(FieldKind::Company);
        assert_eq!(companies.len(), 1);
        assert_eq!(companies[0].value, "Zentec Digital");
        assert_eq!(companies[0].line_index, Some(2));
    }

    #[test]
    fn test_generic_domain_does_nothing() {
        let fixture = Fixture::new("Rachel Tan\nGmail Fans Club\nrachel@gmail.com");
        let ctx = fixture.context();
        let mut pool = CandidatePool::new();
        pool.push(FieldKind::Company, candidate("Gmail Fans Club", 0.6, 1));

        assert!(email_domain_company(&pool, &ctx).is_empty());
    }

    #[test]
    fn test_local_part_boost() {
        let fixture = Fixture::new("Rachel Tan\nJohn Lee\nrachel@psg.com.my");
        let ctx = fixture.context();

        let mut pool = CandidatePool::new();
        pool.push(FieldKind::Name, candidate("Rachel Tan", 0.8, 0));
        pool.push(FieldKind::Name, candidate("John Lee", 0.8, 1));

        let next = pool.apply(&email_local_part_name(&pool, &ctx));
        assert!((confidence(&next, FieldKind::Name, 0) - 0.95).abs() < 1e-6);
        assert!((confidence(&next, FieldKind::Name, 1) - 0.8).abs() < 1e-6);

        // Both email rules stack.
        let again = next.apply(&email_resolution_name(&next, &ctx));
        assert!((confidence(&again, FieldKind::Name, 0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_adjacency_boosts_both() {
        let fixture = Fixture::new("Rachel Tan\nFinance Manager");
        let ctx = fixture.context();

        let mut pool = CandidatePool::new();
        pool.push(FieldKind::Name, candidate("Rachel Tan", 0.8, 0));
        pool.push(FieldKind::JobTitle, candidate("Finance Manager", 0.85, 1));

        let next = pool.apply(&title_name_adjacency(&pool, &ctx));
        assert!((confidence(&next, FieldKind::Name, 0) - 1.0).abs() < 1e-6);
        assert!((confidence(&next, FieldKind::JobTitle, 0) - 0.95).abs() < 1e-6);
    }

    #[test]
    fn test_adjacency_synthesizes_name() {
        let fixture = Fixture::new("ACME SDN BHD\nrachel tan\nFinance Manager");
        let ctx = fixture.context();

        let mut pool = CandidatePool::new();
        pool.push(FieldKind::JobTitle, candidate("Finance Manager", 0.85, 2));

        let next = pool.apply(&title_name_adjacency(&pool, &ctx));
        let names = next.get(FieldKind::Name);
        assert_eq!(names.len(), 1);
        assert_eq!(names[0].value, "rachel tan");
        assert_eq!(names[0].line_index, Some(1));
        assert!((names[0].confidence - 0.65).abs() < 1e-6);
    }

    #[test]
    fn test_no_synthesis_from_company_line() {
        let fixture = Fixture::new("ACME SDN BHD\nFinance Manager");
        let ctx = fixture.context();

        let mut pool = CandidatePool::new();
        pool.push(FieldKind::JobTitle, candidate("Finance Manager", 0.85, 1));

        assert!(title_name_adjacency(&pool, &ctx).is_empty());
    }

    #[test]
    fn test_regional_weighting_bands() {
        let fixture = Fixture::new("A\nB\nC\nD\nE\nF\nG\nH\nI\nJ");
        let ctx = fixture.context();

        let mut pool = CandidatePool::new();
        pool.push(FieldKind::Name, candidate("top", 0.5, 0));
        pool.push(FieldKind::Name, candidate("low", 0.5, 8));
        pool.push(FieldKind::Company, candidate("middle", 0.5, 5));
        pool.push(FieldKind::Address, candidate("bottom", 0.5, 9));

        let next = pool.apply(&regional_weighting(&pool, &ctx));
        assert!((confidence(&next, FieldKind::Name, 0) - 0.65).abs() < 1e-6);
        assert!((confidence(&next, FieldKind::Name, 1) - 0.5).abs() < 1e-6);
        assert!((confidence(&next, FieldKind::Company, 0) - 0.6).abs() < 1e-6);
        assert!((confidence(&next, FieldKind::Address, 0) - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_run_rules_leaves_input_untouched() {
        let fixture = Fixture::new("Rachel Tan\nFinance Manager\nrachel@psg.com.my");
        let ctx = fixture.context();

        let mut pool = CandidatePool::new();
        pool.push(FieldKind::Name, candidate("Rachel Tan", 0.8, 0));
        pool.push(FieldKind::JobTitle, candidate("Finance Manager", 0.85, 1));
        let before = pool.clone();

        let next = run_rules(pool.clone(), &ctx, &[email_local_part_name, title_name_adjacency]);
        assert_eq!(pool, before);
        assert!((confidence(&next, FieldKind::Name, 0) - 1.0).abs() < 1e-6);
    }
}

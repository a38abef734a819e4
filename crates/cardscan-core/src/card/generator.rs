//! Pass 2 candidate families: name, job title, company and address.
//!
//! Every generator reads only lines Pass 1 left unconsumed and returns plain
//! candidates; cross-field re-scoring happens afterwards in `rescoring`.

use tracing::trace;

use super::candidate::FieldCandidate;
use super::context::Context;
use super::rules::{cjk_count, letter_density, words, COMMA_NAME};
use super::segmenter::Line;

/// Western-style name: 1-5 words, mostly letters, at least one word in
/// Title Case or ALL CAPS.
pub fn is_western_name(text: &str) -> bool {
    let tokens = words(text);
    if tokens.is_empty() || tokens.len() > 5 || cjk_count(text) > 0 {
        return false;
    }
    letter_density(text) >= 0.6 && tokens.iter().any(|token| is_capitalized(token))
}

/// Native-script name: 2-6 ideographs and no digits.
pub fn is_cjk_name(text: &str) -> bool {
    let ideographs = cjk_count(text);
    (2..=6).contains(&ideographs) && !text.chars().any(|c| c.is_ascii_digit())
}

/// "Tan, Rachel": both parts alphabetic.
pub fn is_comma_name(text: &str) -> bool {
    COMMA_NAME.is_match(text)
}

fn is_capitalized(token: &str) -> bool {
    let letters: Vec<char> = token.chars().filter(|c| c.is_alphabetic()).collect();
    let Some(first) = letters.first() else {
        return false;
    };
    first.is_uppercase()
        && (letters[1..].iter().all(|c| c.is_lowercase())
            || letters.iter().all(|c| c.is_uppercase()))
}

/// Strict name candidates among `lines`, in card order.
pub fn name_candidates(ctx: &Context, lines: &[&Line]) -> Vec<FieldCandidate> {
    let weights = ctx.weights();
    lines
        .iter()
        .filter(|line| !ctx.excluded_from_name(&line.text))
        .filter_map(|line| {
            let text = line.text.as_str();
            let candidate = if is_comma_name(text) {
                FieldCandidate::new(text, weights.name_strict, "name_comma")
            } else if is_western_name(text) {
                FieldCandidate::new(text, weights.name_strict, "name_western")
            } else if is_cjk_name(text) {
                FieldCandidate::new(text, weights.name_cjk, "name_cjk")
            } else {
                return None;
            };
            Some(candidate.at_line(line.index))
        })
        .collect()
}

/// Positional name search: the top region first, then every remaining line
/// with the lenient rules.
///
/// The first Western match in the top region wins outright over any CJK
/// match.
pub fn propose_names(ctx: &Context) -> Vec<FieldCandidate> {
    let top = &ctx.remaining()[..ctx.top_region_len()];
    let strict = name_candidates(ctx, top);

    let western = strict.iter().find(|c| !c.source_tags.contains("name_cjk"));
    if let Some(name) = western.or_else(|| strict.first()) {
        trace!("name from top region: {}", name.value);
        return vec![name.clone()];
    }

    lenient_names(ctx).into_iter().take(1).collect()
}

/// Lenient fallback over the whole remaining set: 1-4 words and mostly
/// letters. Lines that belong to another field are still skipped.
pub fn lenient_names(ctx: &Context) -> Vec<FieldCandidate> {
    ctx.remaining()
        .iter()
        .filter(|line| {
            let count = words(&line.text).len();
            (1..=4).contains(&count)
                && letter_density(&line.text) >= 0.7
                && !ctx.excluded_from_name(&line.text)
        })
        .map(|line| {
            FieldCandidate::new(line.text.as_str(), ctx.weights().name_lenient, "name_lenient")
                .at_line(line.index)
        })
        .collect()
}

/// Lines carrying a job-title word.
pub fn title_candidates(ctx: &Context) -> Vec<FieldCandidate> {
    ctx.remaining()
        .iter()
        .filter(|line| {
            ctx.is_title_line(&line.text)
                && !ctx.is_phone_related(&line.text)
                && !ctx.is_address_trigger(&line.text)
                && !line.text.contains('@')
        })
        .map(|line| {
            FieldCandidate::new(line.text.as_str(), ctx.weights().job_title, "job_title")
                .at_line(line.index)
        })
        .collect()
}

/// Lines carrying a legal suffix, or failing that a company keyword.
pub fn company_candidates(ctx: &Context) -> Vec<FieldCandidate> {
    let vocab = ctx.vocabulary;
    let weights = ctx.weights();

    ctx.remaining()
        .iter()
        .filter(|line| !ctx.is_phone_related(&line.text) && !ctx.is_address_trigger(&line.text))
        .filter_map(|line| {
            let text = line.text.as_str();
            let candidate = if vocab.company_suffix.is_match(text) {
                FieldCandidate::new(text, weights.company_suffix, "company_suffix")
            } else if vocab.company_keyword.is_match(text) && !ctx.is_title_line(text) {
                FieldCandidate::new(text, weights.company_keyword, "company_keyword")
            } else {
                return None;
            };
            Some(candidate.at_line(line.index))
        })
        .collect()
}

/// Reassemble multi-line addresses.
///
/// A trigger line opens a block. Following lines join it until one is
/// consumed, phone-related, name-like, a job title or a company line; another
/// trigger line always joins.
pub fn address_blocks(ctx: &Context) -> Vec<FieldCandidate> {
    let mut blocks = Vec::new();
    let mut current: Option<(usize, Vec<&str>)> = None;

    for line in ctx.lines {
        let text = line.text.as_str();
        let joins = match current {
            None => !ctx.is_consumed(line.index) && ctx.is_address_trigger(text),
            Some(_) => continues_block(ctx, line),
        };

        if joins {
            current.get_or_insert_with(|| (line.index, Vec::new())).1.push(text);
        } else if let Some(block) = current.take() {
            blocks.push(block);
        }
    }
    blocks.extend(current);

    blocks
        .into_iter()
        .map(|(start, parts)| {
            trace!("address block at line {} ({} lines)", start, parts.len());
            FieldCandidate::new(join_address(&parts), ctx.weights().address_block, "address_block")
                .at_line(start)
        })
        .collect()
}

fn continues_block(ctx: &Context, line: &Line) -> bool {
    let text = line.text.as_str();
    if ctx.is_consumed(line.index) || ctx.is_phone_related(text) {
        return false;
    }
    if ctx.is_address_trigger(text) {
        return true;
    }
    !(ctx.looks_like_name(text)
        || ctx.is_title_line(text)
        || ctx.vocabulary.company_suffix.is_match(text)
        || text.contains('@'))
}

/// One candidate per address-like line; the resolver merges neighbours.
pub fn address_fragments(ctx: &Context) -> Vec<FieldCandidate> {
    ctx.remaining()
        .iter()
        .filter(|line| ctx.is_address_trigger(&line.text))
        .map(|line| {
            FieldCandidate::new(
                line.text.as_str(),
                ctx.weights().address_fragment,
                "address_fragment",
            )
            .at_line(line.index)
        })
        .collect()
}

/// Join address parts with `", "`, or a plain space where a comma is
/// already present at the seam.
pub fn join_address<S: AsRef<str>>(parts: &[S]) -> String {
    let mut joined = String::new();
    for part in parts.iter().map(|p| p.as_ref().trim()).filter(|p| !p.is_empty()) {
        if !joined.is_empty() {
            if joined.ends_with(',') || part.starts_with(',') {
                joined.push(' ');
            } else {
                joined.push_str(", ");
            }
        }
        joined.push_str(part);
    }
    joined
}

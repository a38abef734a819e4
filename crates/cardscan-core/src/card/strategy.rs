//! Selectable Pass 2 strategies.
//!
//! Both strategies share Pass 1, the re-scoring rules and the resolver. They
//! differ in how candidates are proposed and in which rules run.

use tracing::debug;

use super::candidate::{CandidatePool, FieldCandidate, FieldKind};
use super::context::Context;
use super::generator;
use super::rescoring::{
    email_domain_company, email_local_part_name, regional_weighting, run_rules,
    title_name_adjacency, RescoreRule,
};
use crate::models::config::StrategyKind;

/// Candidate generation and re-scoring for the contextual pass.
pub trait ExtractionStrategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    /// Strategy name for logs and result envelopes.
    fn name(&self) -> &'static str;

    /// Propose name, title, company and address candidates.
    fn generate(&self, ctx: &Context) -> CandidatePool;

    /// Cross-field rules run in order after generation.
    fn rules(&self) -> &'static [RescoreRule];

    /// Apply [`rules`](Self::rules) to a pool, returning a new one.
    fn rescore(&self, pool: CandidatePool, ctx: &Context) -> CandidatePool {
        run_rules(pool, ctx, self.rules())
    }
}

fn push_all(pool: &mut CandidatePool, field: FieldKind, candidates: Vec<FieldCandidate>) {
    for candidate in candidates {
        pool.push(field, candidate);
    }
}

/// Positional name search in the top region with a lenient fallback, and
/// multi-line address blocks.
#[derive(Debug, Clone, Copy, Default)]
pub struct TwoPassStrategy;

// Adjacency may add a name, so the local-part cross-check runs after it.
const TWO_PASS_RULES: &[RescoreRule] =
    &[email_domain_company, title_name_adjacency, email_local_part_name];

impl ExtractionStrategy for TwoPassStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::TwoPass
    }

    fn name(&self) -> &'static str {
        "two_pass"
    }

    fn generate(&self, ctx: &Context) -> CandidatePool {
        let mut pool = CandidatePool::new();
        push_all(&mut pool, FieldKind::Name, generator::propose_names(ctx));
        push_all(&mut pool, FieldKind::JobTitle, generator::title_candidates(ctx));
        push_all(&mut pool, FieldKind::Company, generator::company_candidates(ctx));
        push_all(&mut pool, FieldKind::Address, generator::address_blocks(ctx));
        debug!("two_pass generated {} candidates", pool.len());
        pool
    }

    fn rules(&self) -> &'static [RescoreRule] {
        TWO_PASS_RULES
    }
}

/// Every line competes for every field; position is an additive weight and
/// per-line address fragments are merged by the resolver.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoredStrategy;

const SCORED_RULES: &[RescoreRule] = &[
    email_domain_company,
    title_name_adjacency,
    email_local_part_name,
    regional_weighting,
];

impl ExtractionStrategy for ScoredStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Scored
    }

    fn name(&self) -> &'static str {
        "scored"
    }

    fn generate(&self, ctx: &Context) -> CandidatePool {
        let mut pool = CandidatePool::new();

        let mut names = generator::name_candidates(ctx, ctx.remaining());
        if names.is_empty() {
            names = generator::lenient_names(ctx);
        }
        push_all(&mut pool, FieldKind::Name, names);
        push_all(&mut pool, FieldKind::JobTitle, generator::title_candidates(ctx));
        push_all(&mut pool, FieldKind::Company, generator::company_candidates(ctx));
        push_all(&mut pool, FieldKind::Address, generator::address_fragments(ctx));
        debug!("scored generated {} candidates", pool.len());
        pool
    }

    fn rules(&self) -> &'static [RescoreRule] {
        SCORED_RULES
    }
}

/// Build the strategy for a configured kind.
pub fn strategy_for(kind: StrategyKind) -> Box<dyn ExtractionStrategy> {
    match kind {
        StrategyKind::TwoPass => Box::new(TwoPassStrategy),
        StrategyKind::Scored => Box::new(ScoredStrategy),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::classifier::classify;
    use crate::card::resolver::resolve;
    use crate::card::rules::Vocabulary;
    use crate::card::segmenter::segment;
    use crate::models::config::CardscanConfig;

    const CARD: &str = "陈美玲\nRachel Tan\nFinance Manager\nAcme Sdn Bhd\nLot 5, Jalan Ampang\n50450 Kuala Lumpur";

    fn generate(strategy: &dyn ExtractionStrategy, text: &str) -> CandidatePool {
        let config = CardscanConfig::default();
        let lines = segment(text);
        let classification = classify(&lines, &config, Vocabulary::builtin());
        let ctx = Context::new(&lines, &classification, Vocabulary::builtin(), &config);
        let pool = strategy.generate(&ctx);
        strategy.rescore(pool, &ctx)
    }

    #[test]
    fn test_strategy_for() {
        assert_eq!(strategy_for(StrategyKind::TwoPass).name(), "two_pass");
        assert_eq!(strategy_for(StrategyKind::Scored).kind(), StrategyKind::Scored);
    }

    #[test]
    fn test_two_pass_keeps_one_name_and_blocks() {
        let pool = generate(&TwoPassStrategy, CARD);
        assert_eq!(pool.get(FieldKind::Name).len(), 1);
        assert_eq!(pool.get(FieldKind::Name)[0].value, "Rachel Tan");

        let addresses = pool.get(FieldKind::Address);
        assert_eq!(addresses.len(), 1);
        assert_eq!(addresses[0].value, "Lot 5, Jalan Ampang, 50450 Kuala Lumpur");
    }

    #[test]
    fn test_synthesized_name_gets_both_email_boosts() {
        let config = CardscanConfig::default();
        let lines = segment("ACME SDN BHD\nrachel tan\nFinance Manager\nrachel@acme.com.my");
        let classification = classify(&lines, &config, Vocabulary::builtin());
        let ctx = Context::new(&lines, &classification, Vocabulary::builtin(), &config);

        let mut pool = CandidatePool::new();
        pool.push(
            FieldKind::JobTitle,
            FieldCandidate::new("Finance Manager", 0.85, "job_title").at_line(2),
        );

        let pool = TwoPassStrategy.rescore(pool, &ctx);
        let names = pool.get(FieldKind::Name);
        assert_eq!(names.len(), 1);
        assert!(names[0].source_tags.contains("line_above_title"));
        assert!(names[0].source_tags.contains("email_local_part"));
        assert!((names[0].confidence - 0.8).abs() < 1e-6);

        let resolution = resolve(&pool, &ctx);
        assert_eq!(resolution.card.name, "Rachel Tan");
        assert!((resolution.card.confidence.name - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_scored_keeps_every_candidate() {
        let pool = generate(&ScoredStrategy, CARD);
        let names: Vec<&str> = pool.get(FieldKind::Name).iter().map(|c| c.value.as_str()).collect();
        assert_eq!(names, vec!["陈美玲", "Rachel Tan"]);
        assert_eq!(pool.get(FieldKind::Address).len(), 2);

        // Adjacent to the title and in the top band.
        let rachel = &pool.get(FieldKind::Name)[1];
        assert!(rachel.source_tags.contains("title_adjacent"));
        assert!(rachel.source_tags.contains("top_band"));
    }
}

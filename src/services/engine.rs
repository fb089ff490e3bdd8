use rand::Rng;
use std::sync::Arc;

use crate::models::{CategorySynonyms, Event, Recommendation};
use crate::services::scoring::{EventScorer, QueryContext, ScoringWeights};
use crate::services::selection::{self, Tier, MAX_RECOMMENDATIONS};

/// Recommendations together with the tier that produced them
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendations {
    pub tier: Tier,
    pub items: Vec<Recommendation>,
}

/// Keyword-based event recommender
///
/// Pure and synchronous: callers fetch candidate events and pass them in,
/// together with an RNG used only by the random fallback tiers. The same
/// engine backs the HTTP endpoint and in-process callers.
#[derive(Debug, Clone)]
pub struct RecommendationEngine {
    synonyms: Arc<CategorySynonyms>,
    weights: ScoringWeights,
    limit: usize,
}

impl Default for RecommendationEngine {
    fn default() -> Self {
        Self::new(Arc::new(CategorySynonyms::default()))
    }
}

impl RecommendationEngine {
    pub fn new(synonyms: Arc<CategorySynonyms>) -> Self {
        Self {
            synonyms,
            weights: ScoringWeights::default(),
            limit: MAX_RECOMMENDATIONS,
        }
    }

    pub fn synonyms(&self) -> &CategorySynonyms {
        &self.synonyms
    }

    /// Ranks `events` for `context`, falling back through the tiers in order
    ///
    /// `events` are expected to be eligible (today or later) and sorted by
    /// ascending date. Never fails; an empty candidate set yields an empty
    /// list.
    pub fn recommend<R: Rng + ?Sized>(
        &self,
        events: &[Event],
        context: &QueryContext,
        rng: &mut R,
    ) -> Recommendations {
        let scorer = EventScorer::new(&self.synonyms, &self.weights, context);

        if !scorer.is_empty_query() {
            let items = selection::select_direct_matches(scorer.score_all(events), self.limit);
            if !items.is_empty() {
                return Recommendations {
                    tier: Tier::DirectMatch,
                    items,
                };
            }
        }

        let items = selection::sample_categorized(events, self.limit, rng);
        if !items.is_empty() {
            return Recommendations {
                tier: Tier::Category,
                items,
            };
        }

        self.popular(events, rng)
    }

    /// Last-resort selection used when nothing better is available
    pub fn popular<R: Rng + ?Sized>(&self, events: &[Event], rng: &mut R) -> Recommendations {
        Recommendations {
            tier: Tier::Random,
            items: selection::sample_any(events, self.limit, rng),
        }
    }
}

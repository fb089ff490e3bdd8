use rand::{seq::SliceRandom, Rng};
use std::fmt::Display;

use crate::models::{Event, Recommendation};
use crate::services::scoring::{MatchLabel, ScoredEvent};

/// Maximum number of events ever recommended at once
pub const MAX_RECOMMENDATIONS: usize = 3;

/// Fallback strategy that produced a set of recommendations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// Events that scored against the query
    DirectMatch,
    /// Random events that carry a category
    Category,
    /// Random events from the whole candidate set
    Random,
}

impl Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tier::DirectMatch => write!(f, "direct_match"),
            Tier::Category => write!(f, "category"),
            Tier::Random => write!(f, "random"),
        }
    }
}

/// Keeps events with a positive score, best first
///
/// The sort is stable, so equal scores keep the order events arrived in
/// (ascending date), favouring the soonest event.
pub fn select_direct_matches(mut scored: Vec<ScoredEvent<'_>>, limit: usize) -> Vec<Recommendation> {
    scored.retain(|s| s.score > 0.0);
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));

    scored
        .iter()
        .take(limit)
        .map(|s| Recommendation::from_event(s.event, match_reason(&s.matched)))
        .collect()
}

/// Picks up to `limit` categorized events uniformly at random
pub fn sample_categorized<R: Rng + ?Sized>(
    events: &[Event],
    limit: usize,
    rng: &mut R,
) -> Vec<Recommendation> {
    let categorized: Vec<&Event> = events.iter().filter(|e| e.category().is_some()).collect();

    categorized
        .choose_multiple(rng, limit)
        .map(|event| {
            let category = event.category().unwrap_or_default();
            Recommendation::from_event(
                event,
                format!("Recommended {} event you might enjoy", category),
            )
        })
        .collect()
}

/// Picks up to `limit` events from the whole set uniformly at random
pub fn sample_any<R: Rng + ?Sized>(
    events: &[Event],
    limit: usize,
    rng: &mut R,
) -> Vec<Recommendation> {
    events
        .choose_multiple(rng, limit)
        .map(|event| {
            Recommendation::from_event(event, "Recommended event you might enjoy".to_string())
        })
        .collect()
}

/// Builds the explanation shown for a direct match
pub fn match_reason(matched: &[MatchLabel]) -> String {
    let labels: Vec<&str> = matched.iter().filter_map(MatchLabel::text).collect();
    let boosted = matched.contains(&MatchLabel::PastRegistrations);

    match (labels.is_empty(), boosted) {
        (false, false) => format!("Matched: {}", labels.join(", ")),
        (false, true) => format!(
            "Matched: {} (similar to events you registered for)",
            labels.join(", ")
        ),
        (true, true) => "Recommended based on your past registrations".to_string(),
        (true, false) => "Recommended based on your interests".to_string(),
    }
}

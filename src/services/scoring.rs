use std::collections::HashSet;

use crate::models::{CategorySynonyms, Event};
use crate::services::tokenizer::{tokenize, tokenize_all};

/// Additive weights applied while scoring an event
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringWeights {
    pub title: f64,
    pub description: f64,
    pub location: f64,
    pub category: f64,
    pub history_title: f64,
    pub history_description: f64,
    pub history_category: f64,
    pub category_inference: f64,
    pub past_registration: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            title: 3.0,
            description: 2.0,
            location: 1.0,
            category: 4.0,
            history_title: 1.0,
            history_description: 0.5,
            history_category: 2.0,
            category_inference: 2.0,
            past_registration: 3.0,
        }
    }
}

/// Why an event scored, in the order the signals were found
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchLabel {
    /// A query keyword found in one of the event's fields
    Keyword(String),
    /// A category inferred through the synonym table
    Category(String),
    /// The event shares a category with something the user registered for
    PastRegistrations,
}

impl MatchLabel {
    fn same_as(&self, other: &MatchLabel) -> bool {
        match (self, other) {
            (MatchLabel::PastRegistrations, MatchLabel::PastRegistrations) => true,
            (
                MatchLabel::Keyword(a) | MatchLabel::Category(a),
                MatchLabel::Keyword(b) | MatchLabel::Category(b),
            ) => a.eq_ignore_ascii_case(b),
            _ => false,
        }
    }

    /// Display text for keyword and category labels
    pub fn text(&self) -> Option<&str> {
        match self {
            MatchLabel::Keyword(text) | MatchLabel::Category(text) => Some(text.as_str()),
            MatchLabel::PastRegistrations => None,
        }
    }
}

/// Everything known about the person asking for recommendations
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryContext {
    pub interests: String,
    /// Prior queries, most recent first
    pub search_history: Vec<String>,
    /// Events the user registered for previously
    pub past_registrations: Vec<Event>,
}

impl QueryContext {
    pub fn new(interests: impl Into<String>) -> Self {
        Self {
            interests: interests.into(),
            ..Self::default()
        }
    }

    pub fn with_search_history(mut self, history: Vec<String>) -> Self {
        self.search_history = history;
        self
    }

    pub fn with_past_registrations(mut self, events: Vec<Event>) -> Self {
        self.past_registrations = events;
        self
    }
}

/// Score and match labels computed for one candidate event
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredEvent<'a> {
    pub event: &'a Event,
    pub score: f64,
    pub matched: Vec<MatchLabel>,
}

impl ScoredEvent<'_> {
    fn push_label(&mut self, label: MatchLabel) {
        if !self.matched.iter().any(|existing| existing.same_as(&label)) {
            self.matched.push(label);
        }
    }
}

/// Scores candidate events against one query context
///
/// Keyword lists are derived once up front so scoring each event is a pure
/// function of that event.
pub struct EventScorer<'a> {
    synonyms: &'a CategorySynonyms,
    weights: &'a ScoringWeights,
    keywords: Vec<String>,
    history_keywords: Vec<String>,
    /// Lowercased interests and history entries, for multi-word synonyms
    query_texts: Vec<String>,
    past_categories: HashSet<String>,
}

impl<'a> EventScorer<'a> {
    pub fn new(
        synonyms: &'a CategorySynonyms,
        weights: &'a ScoringWeights,
        context: &QueryContext,
    ) -> Self {
        let keywords = tokenize(&context.interests);
        let history_keywords = tokenize_all(context.search_history.iter().map(String::as_str))
            .into_iter()
            .filter(|k| !keywords.contains(k))
            .collect();
        let query_texts = std::iter::once(&context.interests)
            .chain(&context.search_history)
            .map(|text| text.to_lowercase())
            .collect();
        let past_categories = context
            .past_registrations
            .iter()
            .filter_map(Event::category)
            .map(str::to_lowercase)
            .collect();

        Self {
            synonyms,
            weights,
            keywords,
            history_keywords,
            query_texts,
            past_categories,
        }
    }

    /// Keywords extracted from the primary query
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// True when the primary query produced nothing to score against
    pub fn is_empty_query(&self) -> bool {
        self.keywords.is_empty()
    }

    pub fn score_all<'e>(&self, events: &'e [Event]) -> Vec<ScoredEvent<'e>> {
        events.iter().map(|event| self.score(event)).collect()
    }

    pub fn score<'e>(&self, event: &'e Event) -> ScoredEvent<'e> {
        let mut scored = ScoredEvent {
            event,
            score: 0.0,
            matched: Vec::new(),
        };

        let title = event.title.to_lowercase();
        let description = event.description.to_lowercase();
        let location = event.location.to_lowercase();
        let category = event.category().map(str::to_lowercase);

        self.score_keywords(&mut scored, &title, &description, &location, category.as_deref());
        self.score_history(&mut scored, &title, &description, category.as_deref());
        self.score_inferred_categories(&mut scored, &title, &description, category.as_deref());
        self.score_past_registrations(&mut scored, category.as_deref());

        scored
    }

    /// Fields are visited in weight-table order, so labels read title
    /// matches first
    fn score_keywords(
        &self,
        scored: &mut ScoredEvent<'_>,
        title: &str,
        description: &str,
        location: &str,
        category: Option<&str>,
    ) {
        let fields = [
            (Some(title), self.weights.title),
            (Some(description), self.weights.description),
            (Some(location), self.weights.location),
            (category, self.weights.category),
        ];

        for (text, weight) in fields {
            let Some(text) = text else { continue };
            for keyword in &self.keywords {
                if text.contains(keyword.as_str()) {
                    scored.score += weight;
                    scored.push_label(MatchLabel::Keyword(keyword.clone()));
                }
            }
        }
    }

    /// History keywords raise the score without showing up in the reason
    fn score_history(
        &self,
        scored: &mut ScoredEvent<'_>,
        title: &str,
        description: &str,
        category: Option<&str>,
    ) {
        for keyword in &self.history_keywords {
            if title.contains(keyword.as_str()) {
                scored.score += self.weights.history_title;
            }
            if description.contains(keyword.as_str()) {
                scored.score += self.weights.history_description;
            }
            if category.is_some_and(|c| c.contains(keyword.as_str())) {
                scored.score += self.weights.history_category;
            }
        }
    }

    /// An event without a category is an open match for every category
    fn score_inferred_categories(
        &self,
        scored: &mut ScoredEvent<'_>,
        title: &str,
        description: &str,
        category: Option<&str>,
    ) {
        for entry in self.synonyms.iter() {
            let category_fits = match category {
                Some(c) => c == entry.name.to_lowercase(),
                None => true,
            };
            if !category_fits {
                continue;
            }

            let mentioned = entry.synonyms.iter().any(|synonym| {
                self.queried(synonym)
                    || title.contains(synonym.as_str())
                    || description.contains(synonym.as_str())
            });

            if mentioned {
                scored.score += self.weights.category_inference;
                scored.push_label(MatchLabel::Category(entry.name.clone()));
            }
        }
    }

    /// Single words must equal a keyword; phrases such as "food bank" can
    /// never be one token, so they are looked up in the raw query text
    fn queried(&self, synonym: &str) -> bool {
        if synonym.contains(char::is_whitespace) {
            return self.query_texts.iter().any(|text| text.contains(synonym));
        }
        self.keywords.iter().any(|k| k == synonym)
            || self.history_keywords.iter().any(|k| k == synonym)
    }

    fn score_past_registrations(&self, scored: &mut ScoredEvent<'_>, category: Option<&str>) {
        if category.is_some_and(|c| self.past_categories.contains(c)) {
            scored.score += self.weights.past_registration;
            scored.push_label(MatchLabel::PastRegistrations);
        }
    }
}

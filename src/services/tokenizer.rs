/// Keywords shorter than this carry too little signal to match on
pub const MIN_KEYWORD_LEN: usize = 3;

/// Splits free text into lowercase keywords
///
/// Splits on whitespace and commas, drops tokens shorter than
/// [`MIN_KEYWORD_LEN`] characters and collapses repeats, keeping the first
/// occurrence so the result stays in input order.
pub fn tokenize(text: &str) -> Vec<String> {
    let mut keywords = Vec::new();
    push_keywords(&mut keywords, text);
    keywords
}

/// Pools the keywords of several queries into one de-duplicated list
///
/// Used for search history, where the most recent query comes first and
/// therefore contributes its keywords first.
pub fn tokenize_all<'a, I>(texts: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut keywords = Vec::new();
    for text in texts {
        push_keywords(&mut keywords, text);
    }
    keywords
}

fn push_keywords(keywords: &mut Vec<String>, text: &str) {
    for token in text.split(|c: char| c.is_whitespace() || c == ',') {
        if token.chars().count() < MIN_KEYWORD_LEN {
            continue;
        }
        let token = token.to_lowercase();
        if !keywords.contains(&token) {
            keywords.push(token);
        }
    }
}

//! Search query value object

use super::note::Note;

/// Case-insensitive substring filter over note content.
///
/// No tokenization and no ranking: a note matches when its lowercased
/// content contains the lowercased query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    raw: String,
    needle: String,
}

impl SearchQuery {
    pub fn new(query: impl Into<String>) -> Self {
        let raw = query.into();
        let needle = raw.to_lowercase();
        Self { raw, needle }
    }

    /// Query that matches everything
    pub fn all() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Whether a single note matches
    pub fn matches(&self, note: &Note) -> bool {
        self.is_empty() || note.content().to_lowercase().contains(&self.needle)
    }

    /// Order-preserving subsequence of matching notes
    pub fn filter<'a>(&self, notes: &'a [Note]) -> Vec<&'a Note> {
        if self.is_empty() {
            return notes.iter().collect();
        }
        notes.iter().filter(|n| self.matches(n)).collect()
    }
}

impl From<&str> for SearchQuery {
    fn from(query: &str) -> Self {
        Self::new(query)
    }
}

impl From<Option<String>> for SearchQuery {
    fn from(query: Option<String>) -> Self {
        query.map(Self::new).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notes(contents: &[&str]) -> Vec<Note> {
        contents
            .iter()
            .enumerate()
            .map(|(i, c)| Note::from_parts(format!("n{}", i).parse().unwrap(), chrono::Utc::now(), *c).unwrap())
            .collect()
    }

    #[test]
    fn empty_query_is_identity() {
        let all = notes(&["b", "a", "c"]);
        let result = SearchQuery::all().filter(&all);
        assert_eq!(result, all.iter().collect::<Vec<_>>());
    }

    #[test]
    fn case_insensitive_substring_in_order() {
        let all = notes(&["ABCd", "xyz", "zzAbCzz"]);
        let result = SearchQuery::new("abc").filter(&all);

        let ids: Vec<&str> = result.iter().map(|n| n.id().as_str()).collect();
        assert_eq!(ids, vec!["n0", "n2"]);
    }

    #[test]
    fn uppercase_query_matches_lowercase_content() {
        let all = notes(&["reunião amanhã", "outra"]);
        let result = SearchQuery::new("REUNIÃO").filter(&all);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].content(), "reunião amanhã");
    }

    #[test]
    fn no_matches() {
        let all = notes(&["one", "two"]);
        assert!(SearchQuery::new("three").filter(&all).is_empty());
    }

    #[test]
    fn whitespace_query_is_literal() {
        let all = notes(&["a b", "ab"]);
        let result = SearchQuery::new(" ").filter(&all);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].content(), "a b");
    }

    #[test]
    fn from_option() {
        assert!(SearchQuery::from(None).is_empty());
        assert_eq!(SearchQuery::from(Some("x".to_string())).as_str(), "x");
    }
}

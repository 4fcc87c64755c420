/// Outcome of running or refreshing a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// No query is active.
    Inactive,
    /// At least one match; the line of the current match.
    Found(usize),
    /// The query is kept but nothing matches.
    NoMatch,
}

/// In-document search over the plain form of the rendered text.
///
/// Matches are 0-based line numbers, one entry per occurrence, so a line
/// with two hits appears twice.
#[derive(Debug, Default, Clone)]
pub struct SearchState {
    query: String,
    matches: Vec<usize>,
    current: Option<usize>,
}

impl SearchState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    #[cfg(test)]
    pub fn matches(&self) -> &[usize] {
        &self.matches
    }

    #[cfg(test)]
    pub fn current(&self) -> Option<usize> {
        self.current
    }

    pub fn is_active(&self) -> bool {
        !self.query.is_empty()
    }

    /// Line of the current match.
    pub fn current_line(&self) -> Option<usize> {
        self.current.and_then(|i| self.matches.get(i).copied())
    }

    /// Run a fresh search. The first match becomes current.
    pub fn perform(&mut self, query: &str, plain: &str) -> SearchOutcome {
        self.query = query.trim().to_string();
        if self.query.is_empty() {
            self.clear();
            return SearchOutcome::Inactive;
        }
        self.matches = find_matches(plain, &self.query);
        self.current = if self.matches.is_empty() { None } else { Some(0) };
        self.outcome()
    }

    /// Advance to the next match, wrapping around.
    pub fn next_match(&mut self) -> Option<usize> {
        if self.matches.is_empty() {
            return None;
        }
        self.current = Some(match self.current {
            Some(i) => (i + 1) % self.matches.len(),
            None => 0,
        });
        self.current_line()
    }

    /// Step back to the previous match, wrapping around.
    pub fn previous_match(&mut self) -> Option<usize> {
        if self.matches.is_empty() {
            return None;
        }
        self.current = Some(match self.current {
            Some(i) if i > 0 => i - 1,
            _ => self.matches.len() - 1,
        });
        self.current_line()
    }

    /// Re-run the active query against new content, keeping the current
    /// match as close as possible to the line it was on.
    pub fn on_content_changed(&mut self, plain: &str) -> SearchOutcome {
        if !self.is_active() {
            return SearchOutcome::Inactive;
        }
        let previous_line = self.current_line();
        self.matches = find_matches(plain, &self.query);
        if self.matches.is_empty() {
            self.current = None;
            return SearchOutcome::NoMatch;
        }
        self.current = Some(match (previous_line, self.current) {
            (Some(line), _) => closest_match_index(&self.matches, line),
            (None, Some(i)) if i < self.matches.len() => i,
            _ => 0,
        });
        self.outcome()
    }

    pub fn clear(&mut self) {
        self.query.clear();
        self.matches.clear();
        self.current = None;
    }

    fn outcome(&self) -> SearchOutcome {
        match self.current_line() {
            Some(line) => SearchOutcome::Found(line),
            None if self.is_active() => SearchOutcome::NoMatch,
            None => SearchOutcome::Inactive,
        }
    }

    /// Status text such as `/query (2/5)`; empty without a query.
    pub fn status_line(&self) -> String {
        if !self.is_active() {
            return String::new();
        }
        match self.current {
            Some(i) if !self.matches.is_empty() => {
                format!("/{} ({}/{})", self.query, i + 1, self.matches.len())
            }
            _ => format!("/{} (0/0)", self.query),
        }
    }
}

/// Line numbers of every case-insensitive, non-overlapping occurrence of `query`.
pub fn find_matches(plain: &str, query: &str) -> Vec<usize> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() || plain.is_empty() {
        return Vec::new();
    }
    let mut matches = Vec::new();
    for (line_no, line) in plain.lines().enumerate() {
        let haystack = line.to_lowercase();
        let count = haystack.matches(needle.as_str()).count();
        matches.extend(std::iter::repeat(line_no).take(count));
    }
    matches
}

/// Index of the match whose line is nearest to `line`; the lowest index wins ties.
pub fn closest_match_index(matches: &[usize], line: usize) -> usize {
    let mut best = 0;
    let mut best_diff = usize::MAX;
    for (i, m) in matches.iter().enumerate() {
        let diff = m.abs_diff(line);
        if diff < best_diff {
            best = i;
            best_diff = diff;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_every_occurrence_per_line() {
        assert_eq!(
            find_matches("Hello hello world\nhello again", "hello"),
            vec![0, 0, 1]
        );
    }

    #[test]
    fn matches_do_not_overlap() {
        assert_eq!(find_matches("aaaa", "aa"), vec![0, 0]);
    }

    #[test]
    fn blank_query_or_content_matches_nothing() {
        assert!(find_matches("text", "   ").is_empty());
        assert!(find_matches("", "text").is_empty());
    }

    #[test]
    fn next_cycles_through_matches() {
        let mut search = SearchState::new();
        assert_eq!(
            search.perform("hello", "Hello hello world\nhello again"),
            SearchOutcome::Found(0)
        );
        assert_eq!(search.current(), Some(0));
        assert_eq!(search.next_match(), Some(0));
        assert_eq!(search.current(), Some(1));
        assert_eq!(search.next_match(), Some(1));
        assert_eq!(search.current(), Some(2));
        search.next_match();
        assert_eq!(search.current(), Some(0));
    }

    #[test]
    fn previous_wraps_to_last() {
        let mut search = SearchState::new();
        search.perform("x", "x\nx\nx");
        assert_eq!(search.previous_match(), Some(2));
        assert_eq!(search.previous_match(), Some(1));
    }

    #[test]
    fn cycling_without_matches_is_noop() {
        let mut search = SearchState::new();
        assert_eq!(search.perform("zzz", "abc"), SearchOutcome::NoMatch);
        assert_eq!(search.next_match(), None);
        assert_eq!(search.previous_match(), None);
        assert_eq!(search.current(), None);
        assert_eq!(search.query(), "zzz");
    }

    #[test]
    fn perform_trims_query_and_resets_index() {
        let mut search = SearchState::new();
        search.perform("x", "x\nx");
        search.next_match();
        search.perform("  x ", "x\nx");
        assert_eq!(search.query(), "x");
        assert_eq!(search.current(), Some(0));
    }

    #[test]
    fn empty_query_clears() {
        let mut search = SearchState::new();
        search.perform("x", "x");
        assert_eq!(search.perform("  ", "x"), SearchOutcome::Inactive);
        assert!(!search.is_active());
        assert!(search.matches().is_empty());
    }

    #[test]
    fn content_change_selects_closest_line() {
        let mut search = SearchState::new();
        let before = "\n\nfoo\n\n\nfoo\n\n\n\nfoo";
        search.perform("foo", before);
        assert_eq!(search.matches(), &[2, 5, 9]);
        search.next_match();
        assert_eq!(search.current_line(), Some(5));

        let after = "\n\nfoo\n\n\n\nfoo\n\n\nfoo";
        assert_eq!(search.on_content_changed(after), SearchOutcome::Found(6));
        assert_eq!(search.matches(), &[2, 6, 9]);
        assert_eq!(search.current(), Some(1));
    }

    #[test]
    fn closest_match_ties_prefer_lowest_index() {
        assert_eq!(closest_match_index(&[2, 6], 4), 0);
        assert_eq!(closest_match_index(&[1, 1, 7], 1), 0);
        assert_eq!(closest_match_index(&[3, 8, 12], 11), 2);
    }

    #[test]
    fn content_change_without_matches_keeps_query() {
        let mut search = SearchState::new();
        search.perform("foo", "foo");
        assert_eq!(search.on_content_changed("bar"), SearchOutcome::NoMatch);
        assert_eq!(search.query(), "foo");
        assert_eq!(search.current(), None);
        assert_eq!(search.status_line(), "/foo (0/0)");

        assert_eq!(search.on_content_changed("x\nfoo"), SearchOutcome::Found(1));
        assert_eq!(search.current(), Some(0));
    }

    #[test]
    fn content_change_without_query_is_inactive() {
        let mut search = SearchState::new();
        assert_eq!(search.on_content_changed("anything"), SearchOutcome::Inactive);
    }

    #[test]
    fn status_line_reports_position() {
        let mut search = SearchState::new();
        assert_eq!(search.status_line(), "");
        search.perform("hello", "Hello hello world\nhello again");
        search.next_match();
        assert_eq!(search.status_line(), "/hello (2/3)");
    }
}

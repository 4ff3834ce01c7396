//! UI state - presentation state separate from domain data

/// Top-level view selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Search,
    Favorites,
    Collections,
}

impl View {
    pub fn all() -> Vec<View> {
        vec![View::Search, View::Favorites, View::Collections]
    }

    pub fn name(&self) -> &str {
        match self {
            View::Search => "Search",
            View::Favorites => "Favorites",
            View::Collections => "Collections",
        }
    }

    /// Views that only make sense for a signed-in user
    pub fn requires_account(&self) -> bool {
        !matches!(self, View::Search)
    }

    pub fn next(&self) -> View {
        match self {
            View::Search => View::Favorites,
            View::Favorites => View::Collections,
            View::Collections => View::Search,
        }
    }

    pub fn previous(&self) -> View {
        match self {
            View::Search => View::Collections,
            View::Favorites => View::Search,
            View::Collections => View::Favorites,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_cycle() {
        for view in View::all() {
            assert_eq!(view.next().previous(), view);
        }
        assert_eq!(View::Collections.next(), View::Search);
        assert!(!View::Search.requires_account());
    }
}

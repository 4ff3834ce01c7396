//! Search filters and catalog query composition

/// Default number of cards requested per page
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Largest page the catalog will serve
pub const MAX_PAGE_SIZE: u32 = 250;

/// Supertypes offered by the filter form
pub const SUPERTYPES: [&str; 3] = ["Pokémon", "Trainer", "Energy"];

/// Filter selections submitted by the filter form
///
/// Empty strings, empty lists, and `None` all mean "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilters {
    pub query: String,
    pub types: Vec<String>,
    pub subtypes: Vec<String>,
    pub rarities: Vec<String>,
    pub set_id: String,
    pub supertype: String,
    pub min_hp: Option<u32>,
}

impl SearchFilters {
    /// True when no field constrains the search
    pub fn is_empty(&self) -> bool {
        self.query.trim().is_empty()
            && non_blank(&self.types).is_empty()
            && non_blank(&self.subtypes).is_empty()
            && non_blank(&self.rarities).is_empty()
            && self.set_id.trim().is_empty()
            && self.supertype.trim().is_empty()
            && self.min_hp.is_none()
    }

    /// Build one clause per non-empty filter, in a stable field order
    pub fn clauses(&self) -> Vec<String> {
        let mut clauses = Vec::new();

        let query = self.query.trim();
        if !query.is_empty() {
            if query.contains(char::is_whitespace) {
                clauses.push(format!("name:{}", quoted(query)));
            } else {
                clauses.push(format!("name:{}*", query));
            }
        }

        if let Some(clause) = any_of("types", &self.types, false) {
            clauses.push(clause);
        }

        if let Some(clause) = any_of("subtypes", &self.subtypes, false) {
            clauses.push(clause);
        }

        let supertype = self.supertype.trim();
        if !supertype.is_empty() {
            clauses.push(format!("supertype:{}", maybe_quoted(supertype)));
        }

        if let Some(clause) = any_of("rarity", &self.rarities, true) {
            clauses.push(clause);
        }

        let set_id = self.set_id.trim();
        if !set_id.is_empty() {
            clauses.push(format!("set.id:{}", set_id));
        }

        if let Some(hp) = self.min_hp {
            clauses.push(format!("hp:[{} TO *]", hp));
        }

        clauses
    }

    /// Number of active filters, excluding the free-text query
    pub fn active_filter_count(&self) -> usize {
        let mut count = self.clauses().len();
        if !self.query.trim().is_empty() {
            count -= 1;
        }
        count
    }
}

/// A filter set bound to a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParams {
    pub filters: SearchFilters,
    pub page: u32,
    pub page_size: u32,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            filters: SearchFilters::default(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl SearchParams {
    pub fn new(filters: SearchFilters, page: u32, page_size: u32) -> Self {
        Self {
            filters,
            page,
            page_size,
        }
    }

    /// Page number sent to the catalog (1-based)
    pub fn effective_page(&self) -> u32 {
        self.page.max(1)
    }

    /// Page size sent to the catalog, clamped to what it accepts
    pub fn effective_page_size(&self) -> u32 {
        self.page_size.clamp(1, MAX_PAGE_SIZE)
    }

    /// The `q` expression, or `None` when no filter is set
    ///
    /// Clauses are space-separated, which the catalog treats as AND.
    pub fn query_expression(&self) -> Option<String> {
        let clauses = self.filters.clauses();
        if clauses.is_empty() {
            None
        } else {
            Some(clauses.join(" "))
        }
    }
}

fn non_blank(values: &[String]) -> Vec<&str> {
    values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .collect()
}

/// `field:a` for one value, `(field:a OR field:b)` for several
fn any_of(field: &str, values: &[String], always_quote: bool) -> Option<String> {
    let terms: Vec<String> = non_blank(values)
        .into_iter()
        .map(|v| {
            let value = if always_quote { quoted(v) } else { maybe_quoted(v) };
            format!("{}:{}", field, value)
        })
        .collect();

    match terms.len() {
        0 => None,
        1 => terms.into_iter().next(),
        _ => Some(format!("({})", terms.join(" OR "))),
    }
}

fn quoted(value: &str) -> String {
    format!("\"{}\"", value.replace('"', ""))
}

fn maybe_quoted(value: &str) -> String {
    if value.contains(char::is_whitespace) {
        quoted(value)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_empty_filters_have_no_expression() {
        let params = SearchParams::default();
        assert!(params.filters.is_empty());
        assert_eq!(params.query_expression(), None);
    }

    #[test]
    fn test_name_clause_uses_prefix_wildcard() {
        let filters = SearchFilters {
            query: "Pikachu".to_string(),
            ..Default::default()
        };
        assert_eq!(filters.clauses(), vec!["name:Pikachu*"]);
    }

    #[test]
    fn test_multi_word_name_is_quoted() {
        let filters = SearchFilters {
            query: " Mr. Mime ".to_string(),
            ..Default::default()
        };
        assert_eq!(filters.clauses(), vec!["name:\"Mr. Mime\""]);
    }

    #[test]
    fn test_list_filters_render_or_groups() {
        let filters = SearchFilters {
            types: strings(&["Fire", "Water"]),
            subtypes: strings(&["Stage 1"]),
            rarities: strings(&["Rare Holo", "Rare"]),
            ..Default::default()
        };

        assert_eq!(
            filters.clauses(),
            vec![
                "(types:Fire OR types:Water)",
                "subtypes:\"Stage 1\"",
                "(rarity:\"Rare Holo\" OR rarity:\"Rare\")",
            ]
        );
    }

    #[test]
    fn test_one_clause_per_non_empty_field() {
        let filters = SearchFilters {
            query: "Char".to_string(),
            types: strings(&["Fire"]),
            subtypes: strings(&["Basic", "Stage 2"]),
            rarities: strings(&["Rare Holo"]),
            set_id: "base1".to_string(),
            supertype: "Pokémon".to_string(),
            min_hp: Some(100),
        };

        let clauses = filters.clauses();
        assert_eq!(clauses.len(), 7);
        assert_eq!(clauses.iter().filter(|c| c.starts_with("name:")).count(), 1);
        assert!(clauses.contains(&"set.id:base1".to_string()));
        assert!(clauses.contains(&"supertype:Pokémon".to_string()));
        assert!(clauses.contains(&"hp:[100 TO *]".to_string()));
        assert_eq!(filters.active_filter_count(), 6);

        let params = SearchParams::new(filters, 1, 20);
        assert_eq!(params.query_expression().unwrap(), clauses.join(" "));
    }

    #[test]
    fn test_blank_entries_are_ignored() {
        let filters = SearchFilters {
            query: "   ".to_string(),
            types: strings(&["", "  "]),
            rarities: strings(&["", "Rare"]),
            ..Default::default()
        };

        assert_eq!(filters.clauses(), vec!["rarity:\"Rare\""]);
        assert!(!filters.is_empty());
    }

    #[test]
    fn test_page_bounds() {
        let params = SearchParams::new(SearchFilters::default(), 0, 1000);
        assert_eq!(params.effective_page(), 1);
        assert_eq!(params.effective_page_size(), MAX_PAGE_SIZE);

        let params = SearchParams::new(SearchFilters::default(), 3, 0);
        assert_eq!(params.effective_page(), 3);
        assert_eq!(params.effective_page_size(), 1);
    }
}

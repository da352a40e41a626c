//! Heuristic column role resolution.
//!
//! Sales exports name the same columns differently per tool and locale
//! ("TOTAL", "Valor Total", "Account manager", "Consultor", ...). Rather
//! than requiring configuration, each semantic role is resolved from a
//! candidate list through a fixed cascade of matching strategies:
//!
//! 1. exact match
//! 2. case-insensitive match
//! 3. case-insensitive containment
//! 4. word match, where words longer than 3 characters also match on their
//!    first-4-character prefix ("Created By" matches "Created by User")
//!
//! Each strategy is tried across the whole candidate list before falling
//! through to the next, so a weaker match for an early candidate never
//! shadows a stronger match for a later one.

use serde::Serialize;

pub const TOTAL_CANDIDATES: &[&str] = &[
    "TOTAL",
    "Total",
    "total",
    "Valor",
    "valor",
    "VALOR",
    "Price",
    "Amount",
    "Value",
    "Total Value",
    "Valor Total",
];

pub const DATE_CANDIDATES: &[&str] = &["Date", "Data", "data", "DATA", "Date Created"];

pub const CONSULTANT_CANDIDATES: &[&str] = &[
    "Account manager",
    "Consultant",
    "consultor",
    "Consultor",
    "Created by",
    "Vendedor",
];

pub const PRODUCT_CANDIDATES: &[&str] = &[
    "Product", "Produto", "produto", "PRODUTO", "Item", "Service",
];

pub const CATEGORY_KEYWORDS: &[&str] = &["category", "categoria", "type", "tipo"];
pub const SUBSCRIPTION_KEYWORDS: &[&str] = &["assinatura", "subscription", "membership"];
pub const PLAN_KEYWORDS: &[&str] = &["plano", "plan", "package"];
// "type" intentionally overlaps with the category keywords; ambiguous
// headers land in both sets.
pub const MODALITY_KEYWORDS: &[&str] = &["modalidade", "modality", "mode", "type"];

/// Picks the first header matching any candidate, trying the strategies in
/// priority order. The result is always a member of `headers`.
pub fn resolve_column<'a>(headers: &'a [String], candidates: &[&str]) -> Option<&'a str> {
    for name in candidates {
        if let Some(header) = headers.iter().find(|h| h.as_str() == *name) {
            return Some(header.as_str());
        }
    }

    for name in candidates {
        let needle = name.to_lowercase();
        if let Some(header) = headers.iter().find(|h| h.to_lowercase() == needle) {
            return Some(header.as_str());
        }
    }

    for name in candidates {
        let needle = name.to_lowercase();
        if let Some(header) = headers.iter().find(|h| h.to_lowercase().contains(&needle)) {
            return Some(header.as_str());
        }
    }

    for name in candidates {
        let words: Vec<String> = name.to_lowercase().split_whitespace().map(String::from).collect();
        if words.is_empty() {
            continue;
        }
        let matched = headers.iter().find(|header| {
            let lowered = header.to_lowercase();
            words.iter().all(|word| {
                if lowered.contains(word.as_str()) {
                    return true;
                }
                if word.chars().count() > 3 {
                    let prefix: String = word.chars().take(4).collect();
                    return lowered.contains(&prefix);
                }
                false
            })
        });
        if let Some(header) = matched {
            return Some(header.as_str());
        }
    }

    None
}

/// Every header whose lowercased form contains any of the keywords, in
/// header order.
pub fn resolve_column_set(headers: &[String], keywords: &[&str]) -> Vec<String> {
    headers
        .iter()
        .filter(|header| {
            let lowered = header.to_lowercase();
            keywords.iter().any(|keyword| lowered.contains(keyword))
        })
        .cloned()
        .collect()
}

/// Column roles resolved once per dataset; immutable afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ColumnRoles {
    pub total: Option<String>,
    pub date: Option<String>,
    pub consultant: Option<String>,
    pub product: Option<String>,
    pub category: Vec<String>,
    pub subscription: Vec<String>,
    pub plan: Vec<String>,
    pub modality: Vec<String>,
}

impl ColumnRoles {
    pub fn resolve(headers: &[String]) -> Self {
        ColumnRoles {
            total: resolve_column(headers, TOTAL_CANDIDATES).map(String::from),
            date: resolve_column(headers, DATE_CANDIDATES).map(String::from),
            consultant: resolve_column(headers, CONSULTANT_CANDIDATES).map(String::from),
            product: resolve_column(headers, PRODUCT_CANDIDATES).map(String::from),
            category: resolve_column_set(headers, CATEGORY_KEYWORDS),
            subscription: resolve_column_set(headers, SUBSCRIPTION_KEYWORDS),
            plan: resolve_column_set(headers, PLAN_KEYWORDS),
            modality: resolve_column_set(headers, MODALITY_KEYWORDS),
        }
    }

    /// True when at least one categorization column was found; drives the
    /// contract-count policy in the aggregator.
    pub fn has_contract_markers(&self) -> bool {
        !(self.category.is_empty()
            && self.subscription.is_empty()
            && self.plan.is_empty()
            && self.modality.is_empty())
    }

    /// All categorization columns, in role order, duplicates preserved.
    pub fn contract_marker_columns(&self) -> impl Iterator<Item = &str> {
        self.category
            .iter()
            .chain(&self.subscription)
            .chain(&self.plan)
            .chain(&self.modality)
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn exact_match_wins_over_weaker_strategies() {
        let cols = headers(&["Grand Total", "TOTAL"]);
        assert_eq!(resolve_column(&cols, TOTAL_CANDIDATES), Some("TOTAL"));
    }

    #[test]
    fn case_insensitive_match_beats_containment() {
        let cols = headers(&["Total Geral", "ToTaL"]);
        assert_eq!(resolve_column(&cols, TOTAL_CANDIDATES), Some("ToTaL"));
    }

    #[test]
    fn containment_matches_longer_headers() {
        let cols = headers(&["Order Date Created", "Net Amount (BRL)"]);
        assert_eq!(
            resolve_column(&cols, TOTAL_CANDIDATES),
            Some("Net Amount (BRL)")
        );
    }

    #[test]
    fn word_match_ignores_separators_between_words() {
        // "Created by" fails containment against the hyphenated header but
        // matches word-by-word
        let cols = headers(&["Created-by-User"]);
        assert_eq!(
            resolve_column(&cols, CONSULTANT_CANDIDATES),
            Some("Created-by-User")
        );
    }

    #[test]
    fn word_match_uses_four_char_prefixes() {
        // "Consultant" matches the abbreviated header through its "cons"
        // prefix
        let cols = headers(&["Cons. Responsavel"]);
        assert_eq!(
            resolve_column(&cols, CONSULTANT_CANDIDATES),
            Some("Cons. Responsavel")
        );
    }

    #[test]
    fn result_is_always_a_member_of_headers() {
        let cols = headers(&["Foo", "Bar", "Baz"]);
        if let Some(found) = resolve_column(&cols, TOTAL_CANDIDATES) {
            assert!(cols.iter().any(|h| h == found));
        }
        assert_eq!(resolve_column(&cols, TOTAL_CANDIDATES), None);
    }

    #[test]
    fn keyword_sets_collect_all_matches() {
        let cols = headers(&["Categoria", "Tipo de Plano", "Notes"]);
        assert_eq!(
            resolve_column_set(&cols, CATEGORY_KEYWORDS),
            vec!["Categoria".to_string(), "Tipo de Plano".to_string()]
        );
        assert_eq!(
            resolve_column_set(&cols, PLAN_KEYWORDS),
            vec!["Tipo de Plano".to_string()]
        );
    }

    #[test]
    fn type_headers_land_in_category_and_modality() {
        let cols = headers(&["Type"]);
        let roles = ColumnRoles::resolve(&cols);
        assert_eq!(roles.category, vec!["Type".to_string()]);
        assert_eq!(roles.modality, vec!["Type".to_string()]);
    }

    #[test]
    fn roles_resolve_the_reference_export_layout() {
        let cols = headers(&["Date", "TOTAL", "Account manager", "Product", "Category"]);
        let roles = ColumnRoles::resolve(&cols);
        assert_eq!(roles.total.as_deref(), Some("TOTAL"));
        assert_eq!(roles.date.as_deref(), Some("Date"));
        assert_eq!(roles.consultant.as_deref(), Some("Account manager"));
        assert_eq!(roles.product.as_deref(), Some("Product"));
        assert_eq!(roles.category, vec!["Category".to_string()]);
        assert!(roles.has_contract_markers());
    }
}

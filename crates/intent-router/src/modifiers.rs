//! Secondary modifiers detected in question text.
//!
//! A region only ever reaches generated SQL as a [`RegionLiteral`], and a
//! `RegionLiteral` can only be obtained from the table below.

/// Recognized `Order Region` values: lower-cased needle, canonical literal.
const ORDER_REGIONS: &[(&str, &str)] = &[
    ("southwest", "Southwest"),
    ("southeast asia", "Southeast Asia"),
    ("south asia", "South Asia"),
    ("central asia", "Central Asia"),
    ("west asia", "West Asia"),
    ("eastern asia", "Eastern Asia"),
    ("western europe", "Western Europe"),
    ("northern europe", "Northern Europe"),
    ("southern europe", "Southern Europe"),
    ("eastern europe", "Eastern Europe"),
    ("central america", "Central America"),
    ("south america", "South America"),
    ("caribbean", "Caribbean"),
    ("oceania", "Oceania"),
    ("canada", "Canada"),
    ("west of usa", "West of USA"),
    ("east of usa", "East of USA"),
    ("us center", "US Center"),
    ("north africa", "North Africa"),
    ("southern africa", "Southern Africa"),
    ("west africa", "West Africa"),
    ("east africa", "East Africa"),
    ("central africa", "Central Africa"),
];

/// A canonical order-region value drawn from the recognized region table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegionLiteral(&'static str);

impl RegionLiteral {
    /// First recognized region mentioned in `text` as whole words, in table
    /// order.
    pub fn detect(text: &str) -> Option<Self> {
        let haystack = text.to_lowercase();
        ORDER_REGIONS
            .iter()
            .find(|(needle, _)| mentions(&haystack, needle))
            .map(|(_, canonical)| Self(canonical))
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }

    /// Single-quoted SQL string literal.
    pub fn to_sql(&self) -> String {
        format!("'{}'", self.0.replace('\'', "''"))
    }

    pub fn all() -> impl Iterator<Item = RegionLiteral> {
        ORDER_REGIONS.iter().map(|(_, canonical)| Self(canonical))
    }
}

/// `phrase` occurs in `haystack` with no letter or digit directly on either
/// side.
fn mentions(haystack: &str, phrase: &str) -> bool {
    haystack.match_indices(phrase).any(|(start, found)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + found.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

pub(crate) fn wants_region_grouping(text: &str) -> bool {
    let haystack = text.to_lowercase();
    haystack.contains("by region") || haystack.contains("per region")
}

pub(crate) fn wants_full_ranking(text: &str) -> bool {
    let haystack = text.to_lowercase();
    ["each", "compare", "all shipping modes"]
        .iter()
        .any(|marker| mentions(&haystack, marker))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_canonical_casing() {
        let region = RegionLiteral::detect("total SALES SouthWest please").unwrap();
        assert_eq!(region.as_str(), "Southwest");
        assert_eq!(region.to_sql(), "'Southwest'");
    }

    #[test]
    fn user_text_never_leaks_into_literal() {
        let region = RegionLiteral::detect("southwest'; DROP TABLE inventory; --").unwrap();
        assert_eq!(region.to_sql(), "'Southwest'");
        assert!(RegionLiteral::detect("Atlantis'; DROP TABLE inventory").is_none());
    }

    #[test]
    fn regions_match_whole_words_only() {
        assert!(RegionLiteral::detect("total sales for the campus center").is_none());
        assert!(RegionLiteral::detect("total sales in the caribbeans").is_none());
        assert_eq!(
            RegionLiteral::detect("total sales (US Center)").map(|r| r.as_str()),
            Some("US Center")
        );
        assert_eq!(
            RegionLiteral::detect("total sales, oceania.").map(|r| r.as_str()),
            Some("Oceania")
        );
    }

    #[test]
    fn every_literal_is_plain() {
        for region in RegionLiteral::all() {
            assert!(region
                .as_str()
                .chars()
                .all(|c| c.is_ascii_alphabetic() || c == ' '));
        }
    }

    #[test]
    fn grouping_and_ranking_markers() {
        assert!(wants_region_grouping("total sales by region"));
        assert!(!wants_region_grouping("total sales"));
        assert!(wants_full_ranking("compare all shipping modes"));
        assert!(!wants_full_ranking("worst shipping mode"));
        assert!(!wants_full_ranking("which mode can reach customers on time"));
    }
}

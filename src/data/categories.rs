//! The category label space and the `name-value;...` blob it is stored in.

use crate::error::{Result, TocsinError};

/// The category column dropped during cleaning; it never carries a positive.
pub const DROPPED_CATEGORY: &str = "child_alone";

/// The category whose raw value 2 is read as 1.
pub const RELATED_CATEGORY: &str = "related";

/// Raw categories of the source dataset, in blob order.
pub const RAW_CATEGORY_NAMES: [&str; 36] = [
    "related",
    "request",
    "offer",
    "aid_related",
    "medical_help",
    "medical_products",
    "search_and_rescue",
    "security",
    "military",
    "child_alone",
    "water",
    "food",
    "shelter",
    "clothing",
    "money",
    "missing_people",
    "refugees",
    "death",
    "other_aid",
    "infrastructure_related",
    "transport",
    "buildings",
    "electricity",
    "tools",
    "hospitals",
    "shops",
    "aid_centers",
    "other_infrastructure",
    "weather_related",
    "floods",
    "storm",
    "fire",
    "earthquake",
    "cold",
    "other_weather",
    "direct_report",
];

/// The 35 categories a trained model predicts, in column order.
pub const CATEGORY_NAMES: [&str; 35] = [
    "related",
    "request",
    "offer",
    "aid_related",
    "medical_help",
    "medical_products",
    "search_and_rescue",
    "security",
    "military",
    "water",
    "food",
    "shelter",
    "clothing",
    "money",
    "missing_people",
    "refugees",
    "death",
    "other_aid",
    "infrastructure_related",
    "transport",
    "buildings",
    "electricity",
    "tools",
    "hospitals",
    "shops",
    "aid_centers",
    "other_infrastructure",
    "weather_related",
    "floods",
    "storm",
    "fire",
    "earthquake",
    "cold",
    "other_weather",
    "direct_report",
];

/// `CATEGORY_NAMES` as owned strings.
pub fn category_names() -> Vec<String> {
    CATEGORY_NAMES.iter().map(|name| name.to_string()).collect()
}

/// Split one `related-1;request-0;...` blob into `(name, raw value)` pairs.
///
/// Each entry's value is its final character; the name is what precedes the
/// `-` in front of it.
pub fn parse_blob(blob: &str) -> Result<Vec<(&str, u8)>> {
    blob.split(';')
        .map(|entry| {
            let entry = entry.trim();
            let (name, value) = entry
                .rsplit_once('-')
                .filter(|(name, value)| !name.is_empty() && value.len() == 1)
                .ok_or_else(|| {
                    TocsinError::dataset(format!("malformed category entry '{entry}'"))
                })?;
            let value = value
                .chars()
                .next()
                .and_then(|c| c.to_digit(10))
                .ok_or_else(|| {
                    TocsinError::dataset(format!("category '{name}' has non-digit value '{value}'"))
                })?;
            Ok((name, value as u8))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_drop_one_category() {
        assert_eq!(RAW_CATEGORY_NAMES.len(), CATEGORY_NAMES.len() + 1);
        assert!(!CATEGORY_NAMES.contains(&DROPPED_CATEGORY));

        let kept: Vec<&str> = RAW_CATEGORY_NAMES
            .iter()
            .copied()
            .filter(|name| *name != DROPPED_CATEGORY)
            .collect();
        assert_eq!(kept, CATEGORY_NAMES.to_vec());
    }

    #[test]
    fn test_parse_blob() {
        let parsed = parse_blob("related-2;search_and_rescue-0;water-1").unwrap();
        assert_eq!(
            parsed,
            vec![("related", 2), ("search_and_rescue", 0), ("water", 1)]
        );
    }

    #[test]
    fn test_parse_blob_malformed() {
        assert!(parse_blob("related").is_err());
        assert!(parse_blob("related-x").is_err());
        assert!(parse_blob("related-10").is_err());
        assert!(parse_blob("-1").is_err());
    }
}

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;

/// Placeholder written for any field the page did not provide.
pub const NOT_AVAILABLE: &str = "N/A";

/// Keys with a fixed position in a serialized record. Category labels that
/// collide with one of these are dropped.
pub const RESERVED_KEYS: [&str; 5] = ["package", "score", "stars", "forks", "contributors"];

/// A package name taken from one manifest line, version constraints stripped.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageName(String);

impl PackageName {
    /// Trims `raw` and rejects it when nothing is left.
    pub fn new(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PackageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PackageName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Body of one fetched advisor page.
#[derive(Debug, Clone)]
pub struct RawPage {
    pub body: String,
}

impl RawPage {
    pub fn new(body: impl Into<String>) -> Self {
        Self { body: body.into() }
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// Which fixed output field a repository stat is routed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatField {
    Stars,
    Forks,
    Contributors,
}

/// Metadata persisted for one package.
#[derive(Debug, Clone, PartialEq)]
pub struct PackageRecord {
    pub package: String,
    pub score: String,
    categories: Vec<(String, String)>,
    pub stars: String,
    pub forks: String,
    pub contributors: String,
    pub error: Option<String>,
}

impl PackageRecord {
    pub fn new(package: &PackageName) -> Self {
        Self {
            package: package.to_string(),
            score: NOT_AVAILABLE.to_string(),
            categories: Vec::new(),
            stars: NOT_AVAILABLE.to_string(),
            forks: NOT_AVAILABLE.to_string(),
            contributors: NOT_AVAILABLE.to_string(),
            error: None,
        }
    }

    /// Record for a package that could not be fetched or parsed.
    pub fn failed(package: &PackageName, reason: impl Into<String>) -> Self {
        Self {
            error: Some(reason.into()),
            ..Self::new(package)
        }
    }

    /// Sets a category score. A repeated key keeps its first position and
    /// takes the newest value.
    pub fn set_category(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if RESERVED_KEYS.contains(&key.as_str()) {
            tracing::debug!("Ignoring category '{}' that shadows a fixed field", key);
            return;
        }
        match self.categories.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.categories.push((key, value)),
        }
    }

    pub fn category(&self, key: &str) -> Option<&str> {
        self.categories
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn categories(&self) -> &[(String, String)] {
        &self.categories
    }

    pub fn set_stat(&mut self, field: StatField, value: impl Into<String>) {
        let value = value.into();
        match field {
            StatField::Stars => self.stars = value,
            StatField::Forks => self.forks = value,
            StatField::Contributors => self.contributors = value,
        }
    }
}

impl Serialize for PackageRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let len = 5 + self.categories.len() + usize::from(self.error.is_some());
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry("package", &self.package)?;
        map.serialize_entry("score", &self.score)?;
        for (key, value) in &self.categories {
            map.serialize_entry(key, value)?;
        }
        map.serialize_entry("stars", &self.stars)?;
        map.serialize_entry("forks", &self.forks)?;
        map.serialize_entry("contributors", &self.contributors)?;
        if let Some(error) = &self.error {
            map.serialize_entry("error", error)?;
        }
        map.end()
    }
}

/// A record paired with the integer used to rank it. Only exists between
/// parsing and ranking; the persisted form is the bare [`PackageRecord`].
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredRecord {
    pub record: PackageRecord,
    pub score_value: i64,
}

impl ScoredRecord {
    pub fn new(record: PackageRecord) -> Self {
        let score_value = extract_score_value(&record.score);
        Self {
            record,
            score_value,
        }
    }
}

/// Numerator of a `"85/100"` style score, or 0 when there is none.
pub fn extract_score_value(score: &str) -> i64 {
    match score.split_once('/') {
        Some((numerator, _)) => numerator.trim().parse().unwrap_or(0),
        None => 0,
    }
}

/// What a finished run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadSummary {
    pub output_path: String,
    pub record_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> PackageName {
        PackageName::new(s).unwrap()
    }

    #[test]
    fn test_package_name_rejects_blank() {
        assert!(PackageName::new("   ").is_none());
        assert_eq!(name("  requests ").as_str(), "requests");
    }

    #[test]
    fn test_extract_score_value() {
        assert_eq!(extract_score_value("85/100"), 85);
        assert_eq!(extract_score_value(" 72 / 100"), 72);
        assert_eq!(extract_score_value("N/A"), 0);
        assert_eq!(extract_score_value("bad"), 0);
        assert_eq!(extract_score_value("/100"), 0);
        assert_eq!(extract_score_value(""), 0);
    }

    #[test]
    fn test_duplicate_category_keeps_position() {
        let mut record = PackageRecord::new(&name("numpy"));
        record.set_category("popularity", "Influential project");
        record.set_category("security", "No known security issues");
        record.set_category("popularity", "Key ecosystem project");

        assert_eq!(
            record.categories(),
            &[
                ("popularity".to_string(), "Key ecosystem project".to_string()),
                ("security".to_string(), "No known security issues".to_string()),
            ]
        );
    }

    #[test]
    fn test_reserved_category_is_ignored() {
        let mut record = PackageRecord::new(&name("numpy"));
        record.set_category("stars", "999");
        assert!(record.categories().is_empty());
        assert_eq!(record.stars, NOT_AVAILABLE);
    }

    #[test]
    fn test_error_category_is_kept() {
        let mut record = PackageRecord::new(&name("numpy"));
        record.set_category("error", "Deprecated");

        assert_eq!(record.category("error"), Some("Deprecated"));
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["error"], "Deprecated");
    }

    #[test]
    fn test_serialized_key_order() {
        let mut record = PackageRecord::new(&name("requests"));
        record.score = "90/100".to_string();
        record.set_category("maintenance", "Healthy");
        record.set_stat(StatField::Stars, "51.2K");

        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            r#"{"package":"requests","score":"90/100","maintenance":"Healthy","stars":"51.2K","forks":"N/A","contributors":"N/A"}"#
        );
        assert!(!json.contains("score_value"));
    }

    #[test]
    fn test_failed_record_carries_error() {
        let record = PackageRecord::failed(&name("numpy"), "HTTP 404");
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["error"], "HTTP 404");
        assert_eq!(value["score"], NOT_AVAILABLE);
        assert_eq!(ScoredRecord::new(record).score_value, 0);
    }
}

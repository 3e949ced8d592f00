//! Selector table used to pull metadata out of an advisor page.
//!
//! The advisor markup is third-party and changes without notice. When the
//! output starts showing `N/A` everywhere, update the selectors here (or ship
//! a rules file with `--rules`) rather than touching the parser.

use crate::domain::model::StatField;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{validate_non_empty_string, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionRules {
    /// Candidates for the overall score, tried in order. First match wins.
    pub score: Vec<String>,
    pub categories: CategoryRules,
    pub stats: StatsRules,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryRules {
    pub item: String,
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsRules {
    pub item: String,
    pub label: String,
    pub value: String,
    pub routes: Vec<StatRoute>,
}

/// Sends a stat whose label contains `label_contains` to `field`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatRoute {
    pub label_contains: String,
    pub field: StatField,
}

impl Default for ExtractionRules {
    fn default() -> Self {
        Self {
            score: vec![
                "span[data-v-3f4fee08][data-v-77223d2e]".to_string(),
                "div.number span".to_string(),
            ],
            categories: CategoryRules::default(),
            stats: StatsRules::default(),
        }
    }
}

impl Default for CategoryRules {
    fn default() -> Self {
        Self {
            item: "ul.scores li".to_string(),
            label: "span".to_string(),
            value: ".vue--pill .vue--pill__body".to_string(),
        }
    }
}

impl Default for StatsRules {
    fn default() -> Self {
        Self {
            item: ".stats-item".to_string(),
            label: "dt span".to_string(),
            value: "dd span".to_string(),
            routes: vec![
                StatRoute {
                    label_contains: "GitHub Stars".to_string(),
                    field: StatField::Stars,
                },
                StatRoute {
                    label_contains: "Forks".to_string(),
                    field: StatField::Forks,
                },
                StatRoute {
                    label_contains: "Contributors".to_string(),
                    field: StatField::Contributors,
                },
            ],
        }
    }
}

impl StatsRules {
    /// First route whose substring occurs in `label`.
    pub fn route(&self, label: &str) -> Option<StatField> {
        self.routes
            .iter()
            .find(|route| label.contains(&route.label_contains))
            .map(|route| route.field)
    }
}

impl ExtractionRules {
    /// 從 TOML 檔案載入規則
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析規則，未指定的欄位沿用預設值
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;
        let rules: Self = toml::from_str(&processed_content)?;
        Ok(rules)
    }

    /// 替換環境變數 (例如 ${SCORE_SELECTOR})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }
}

impl Validate for ExtractionRules {
    fn validate(&self) -> Result<()> {
        if self.score.is_empty() {
            return Err(EtlError::ConfigValidationError {
                field: "score".to_string(),
                message: "At least one score selector is required".to_string(),
            });
        }
        for selector in &self.score {
            validate_non_empty_string("score", selector)?;
        }

        validate_non_empty_string("categories.item", &self.categories.item)?;
        validate_non_empty_string("categories.label", &self.categories.label)?;
        validate_non_empty_string("categories.value", &self.categories.value)?;

        validate_non_empty_string("stats.item", &self.stats.item)?;
        validate_non_empty_string("stats.label", &self.stats.label)?;
        validate_non_empty_string("stats.value", &self.stats.value)?;
        for route in &self.stats.routes {
            validate_non_empty_string("stats.routes.label_contains", &route.label_contains)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules_are_valid() {
        let rules = ExtractionRules::default();
        assert!(rules.validate().is_ok());
        assert_eq!(rules.score.len(), 2);
        assert_eq!(rules.stats.routes.len(), 3);
    }

    #[test]
    fn test_shipped_rules_file_matches_defaults() {
        let rules = ExtractionRules::from_toml_str(include_str!("../../advisor-rules.toml")).unwrap();
        assert_eq!(rules, ExtractionRules::default());
    }

    #[test]
    fn test_route_matches_substring_in_order() {
        let stats = StatsRules::default();
        assert_eq!(stats.route("GitHub Stars"), Some(StatField::Stars));
        assert_eq!(stats.route("Forks"), Some(StatField::Forks));
        assert_eq!(stats.route("Contributors"), Some(StatField::Contributors));
        assert_eq!(stats.route("Weekly Downloads"), None);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let rules = ExtractionRules::from_toml_str(
            r#"
score = ["div.score-badge"]

[stats]
item = "li.stat"
"#,
        )
        .unwrap();

        assert_eq!(rules.score, vec!["div.score-badge".to_string()]);
        assert_eq!(rules.stats.item, "li.stat");
        assert_eq!(rules.stats.label, "dt span");
        assert_eq!(rules.stats.routes.len(), 3);
        assert_eq!(rules.categories, CategoryRules::default());
    }

    #[test]
    fn test_toml_routes_override() {
        let rules = ExtractionRules::from_toml_str(
            r#"
[[stats.routes]]
label_contains = "Stargazers"
field = "stars"
"#,
        )
        .unwrap();

        assert_eq!(rules.stats.routes.len(), 1);
        assert_eq!(rules.stats.route("Stargazers"), Some(StatField::Stars));
        assert_eq!(rules.stats.route("GitHub Stars"), None);
    }

    #[test]
    fn test_env_substitution() {
        std::env::set_var("ADVISOR_META_TEST_SCORE", "span.total");
        let rules =
            ExtractionRules::from_toml_str(r#"score = ["${ADVISOR_META_TEST_SCORE}"]"#).unwrap();
        assert_eq!(rules.score, vec!["span.total".to_string()]);
    }

    #[test]
    fn test_invalid_toml_is_error() {
        let result = ExtractionRules::from_toml_str("score = [");
        assert!(matches!(result, Err(EtlError::TomlError(_))));
    }

    #[test]
    fn test_empty_score_list_fails_validation() {
        let rules = ExtractionRules {
            score: vec![],
            ..ExtractionRules::default()
        };
        assert!(rules.validate().is_err());
    }
}

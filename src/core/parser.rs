use crate::domain::model::{PackageName, PackageRecord, RawPage, ScoredRecord, NOT_AVAILABLE};
use crate::domain::rules::{ExtractionRules, StatsRules};
use crate::utils::error::{EtlError, Result};
use scraper::{ElementRef, Html, Selector};

/// [`ExtractionRules`] compiled into selectors once per run.
pub struct PageParser {
    score: Vec<Selector>,
    category_item: Selector,
    category_label: Selector,
    category_value: Selector,
    stats_item: Selector,
    stats_label: Selector,
    stats_value: Selector,
    stats_rules: StatsRules,
}

fn compile(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| EtlError::SelectorError {
        selector: selector.to_string(),
        message: e.to_string(),
    })
}

/// Text of all descendants, trimmed.
fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn first_text(scope: ElementRef<'_>, selector: &Selector) -> String {
    scope
        .select(selector)
        .next()
        .map(element_text)
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

impl PageParser {
    pub fn new(rules: &ExtractionRules) -> Result<Self> {
        let score = rules
            .score
            .iter()
            .map(|s| compile(s))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            score,
            category_item: compile(&rules.categories.item)?,
            category_label: compile(&rules.categories.label)?,
            category_value: compile(&rules.categories.value)?,
            stats_item: compile(&rules.stats.item)?,
            stats_label: compile(&rules.stats.label)?,
            stats_value: compile(&rules.stats.value)?,
            stats_rules: rules.stats.clone(),
        })
    }

    /// Builds the record for `package`. A missing or zero-length page gives `None`;
    /// anything missing inside a page falls back to `"N/A"`.
    pub fn parse(&self, page: Option<&RawPage>, package: &PackageName) -> Option<ScoredRecord> {
        let page = page.filter(|page| !page.is_empty())?;
        let document = Html::parse_document(&page.body);
        let mut record = PackageRecord::new(package);

        if let Some(score) = self
            .score
            .iter()
            .find_map(|selector| document.select(selector).next())
        {
            record.score = element_text(score);
        }

        self.extract_categories(&document, &mut record);
        self.extract_stats(&document, &mut record);

        tracing::debug!(
            "Parsed {}: score={}, {} categories",
            package,
            record.score,
            record.categories().len()
        );
        Some(ScoredRecord::new(record))
    }

    fn extract_categories(&self, document: &Html, record: &mut PackageRecord) {
        for item in document.select(&self.category_item) {
            let Some(label) = item.select(&self.category_label).next() else {
                continue;
            };
            let category = element_text(label).to_lowercase();
            let value = first_text(item, &self.category_value);
            record.set_category(category, value);
        }
    }

    fn extract_stats(&self, document: &Html, record: &mut PackageRecord) {
        for item in document.select(&self.stats_item) {
            let Some(label) = item.select(&self.stats_label).next() else {
                continue;
            };
            let label_text = element_text(label);
            let value = first_text(item, &self.stats_value);

            match self.stats_rules.route(&label_text) {
                Some(field) => record.set_stat(field, value),
                None => tracing::trace!("Ignoring stat '{}'", label_text),
            }
        }
    }
}

use crate::core::fetcher::PageFetcher;
use crate::core::manifest::read_manifest;
use crate::core::parser::PageParser;
use crate::core::ranking::rank;
use crate::core::{ConfigProvider, Pipeline, Storage};
use crate::domain::model::{LoadSummary, PackageName, PackageRecord, ScoredRecord};
use crate::utils::error::{EtlError, Result};

/// Scrapes one advisor page per manifest entry, ranks by score and writes JSON.
pub struct AdvisorPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    fetcher: PageFetcher,
    parser: PageParser,
}

impl<S: Storage, C: ConfigProvider> AdvisorPipeline<S, C> {
    /// Fails only when the extraction rules do not compile.
    pub fn new(storage: S, config: C) -> Result<Self> {
        let parser = PageParser::new(config.extraction_rules())?;
        let fetcher = PageFetcher::new(config.base_url(), config.user_agent());
        Ok(Self {
            storage,
            config,
            fetcher,
            parser,
        })
    }

    /// Fetches and parses a single package. The error string is the reason
    /// the package produced no record.
    async fn process_package(
        &self,
        package: &PackageName,
    ) -> std::result::Result<ScoredRecord, String> {
        let page = match self.fetcher.fetch(package).await {
            Ok(page) => page,
            Err(e) => {
                report_fetch_error(package, &e);
                return Err(e.to_string());
            }
        };

        self.parser.parse(Some(&page), package).ok_or_else(|| {
            tracing::debug!("Empty page for {}, skipping", package);
            "empty page".to_string()
        })
    }
}

fn report_fetch_error(package: &PackageName, error: &EtlError) {
    match error {
        EtlError::HttpStatus { status, .. } => {
            tracing::warn!("Failed to fetch data for {}: HTTP {}", package, status)
        }
        other => tracing::warn!("Error fetching {}: {}", package, other),
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for AdvisorPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<ScoredRecord>> {
        let manifest_path = self.config.manifest_path();
        let packages = read_manifest(&self.storage, manifest_path).await?;
        println!("Found {} packages in {}", packages.len(), manifest_path);

        let delay = self.config.request_delay();
        let total = packages.len();
        let mut records = Vec::with_capacity(total);

        for (i, package) in packages.iter().enumerate() {
            println!("Processing {}/{}: {}", i + 1, total, package);

            match self.process_package(package).await {
                Ok(record) => records.push(record),
                Err(reason) if self.config.include_failed() => {
                    records.push(ScoredRecord::new(PackageRecord::failed(package, reason)))
                }
                Err(_) => {}
            }

            // 固定間隔，降低被限流的機會
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }

        tracing::info!("Collected {} of {} packages", records.len(), total);
        Ok(records)
    }

    async fn transform(&self, data: Vec<ScoredRecord>) -> Result<Vec<PackageRecord>> {
        Ok(rank(data))
    }

    async fn load(&self, records: Vec<PackageRecord>) -> Result<LoadSummary> {
        let output_path = self.config.output_path();
        let json = serde_json::to_string_pretty(&records)?;

        tracing::debug!("Writing {} bytes to {}", json.len(), output_path);
        self.storage.write_file(output_path, json.as_bytes()).await?;

        Ok(LoadSummary {
            output_path: output_path.to_string(),
            record_count: records.len(),
        })
    }
}

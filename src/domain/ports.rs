use crate::domain::rules::ExtractionRules;
use crate::domain::model::{LoadSummary, PackageRecord, ScoredRecord};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn manifest_path(&self) -> &str;
    fn output_path(&self) -> &str;
    fn base_url(&self) -> &str;
    fn user_agent(&self) -> &str;
    fn request_delay(&self) -> Duration;
    fn include_failed(&self) -> bool;
    fn extraction_rules(&self) -> &ExtractionRules;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<ScoredRecord>>;
    async fn transform(&self, data: Vec<ScoredRecord>) -> Result<Vec<PackageRecord>>;
    async fn load(&self, records: Vec<PackageRecord>) -> Result<LoadSummary>;
}

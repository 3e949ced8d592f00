use crate::core::Pipeline;
use crate::domain::model::LoadSummary;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<LoadSummary> {
        tracing::info!("Starting advisor scrape");
        self.monitor.log_stats("Start");

        // Extract
        let scraped = self.pipeline.extract().await?;
        tracing::info!("Extracted {} records", scraped.len());
        self.monitor.log_stats("Extract");

        // Transform
        let ranked = self.pipeline.transform(scraped).await?;
        tracing::debug!("Ranked {} records", ranked.len());
        self.monitor.log_stats("Transform");

        // Load
        let summary = self.pipeline.load(ranked).await?;
        tracing::info!(
            "Saved {} records to {}",
            summary.record_count,
            summary.output_path
        );
        self.monitor.log_stats("Load");
        self.monitor.log_final_stats();

        Ok(summary)
    }
}

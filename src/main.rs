use advisor_meta::config::USAGE;
use advisor_meta::utils::{logger, validation::Validate};
use advisor_meta::{AdvisorPipeline, CliConfig, EtlEngine, EtlError, LocalStorage};
use clap::Parser;

fn fail(e: &EtlError) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    std::process::exit(e.exit_code());
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut config = CliConfig::parse();

    if config.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(config.verbose);
    }

    if config.manifest.is_none() {
        eprintln!("{}", USAGE);
        std::process::exit(1);
    }

    tracing::info!("Starting advisor-meta");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.load_rules().and_then(|_| config.validate()) {
        fail(&e);
    }

    let monitor_enabled = config.monitor;
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let pipeline = match AdvisorPipeline::new(LocalStorage::default(), config) {
        Ok(pipeline) => pipeline,
        Err(e) => fail(&e),
    };
    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(summary) => {
            println!(
                "Saved sorted metadata for {} packages to {}",
                summary.record_count, summary.output_path
            );
        }
        Err(e) => fail(&e),
    }

    Ok(())
}

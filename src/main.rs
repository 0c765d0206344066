use clap::Parser;
use ref_matcher::utils::logger;
use ref_matcher::{match_references, CliConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliConfig::parse();

    // 先解析設定，日誌格式取決於設定檔
    let config = match args.resolve() {
        Ok(config) => config,
        Err(e) => {
            logger::init_cli_logger(args.verbose, logger::LogFormat::Compact);
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(e.exit_code());
        }
    };

    logger::init_cli_logger(config.verbose, config.log_format);
    tracing::info!("Starting ref-matcher");
    tracing::debug!("Run config: {:?}", config);

    match match_references(config).await {
        Ok(output_path) => {
            tracing::info!("✅ Reference matching completed successfully!");
            tracing::info!("📁 Output saved to: {}", output_path);
            Ok(())
        }
        Err(e) => {
            tracing::error!(
                "❌ Reference matching failed: {} (Severity: {:?})",
                e,
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(e.exit_code());
        }
    }
}

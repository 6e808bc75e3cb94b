use clap::Parser;
use ore_session::config::toml_config::SessionFileConfig;
use ore_session::config::LogFormat;
use ore_session::core::runner::{ctrl_c_signal, run_configured};
use ore_session::domain::ports::ReportSink;
use ore_session::utils::{logger, validation::Validate};
use ore_session::{CliConfig, JsonFileSink, SessionError, SessionOutcome, SessionSettings};

fn print_banner(settings: &SessionSettings) {
    let rule = "═".repeat(64);
    println!("╔{}╗", rule);
    println!(
        "║ {:^62} ║",
        format!("⛏️  ORE SESSION v{}", env!("CARGO_PKG_VERSION"))
    );
    println!("║ {:^62} ║", format!("mode: {} | driver: {}", settings.mode, settings.driver));
    println!("╚{}╝", rule);
}

fn fail(e: &SessionError) -> ! {
    tracing::error!("❌ Configuration validation failed: {}", e);
    tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    std::process::exit(1);
}

#[tokio::main]
async fn main() {
    let config = CliConfig::parse();

    // 初始化日誌
    match config.log_format {
        LogFormat::Compact => logger::init_cli_logger(config.verbose),
        LogFormat::Json => logger::init_json_logger(config.verbose),
    }

    tracing::info!("Starting ore-session CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        fail(&e);
    }

    let file_config = match &config.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            match SessionFileConfig::from_file(path) {
                Ok(file_config) => Some(file_config),
                Err(e) => fail(&e),
            }
        }
        None => None,
    };

    let settings = match SessionSettings::resolve(&config, file_config) {
        Ok(settings) => settings,
        Err(e) => fail(&e),
    };
    if settings.monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    print_banner(&settings);
    println!(
        "\n🚀 Starting session for {} minutes...\n",
        settings.duration.as_secs() / 60
    );

    let report_dir = settings.report_dir.clone();
    let summary = match run_configured(settings, ctrl_c_signal()).await {
        Ok(summary) => summary,
        Err(e) => {
            tracing::error!(
                "❌ Session could not start: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
            std::process::exit(e.exit_code());
        }
    };

    println!("{}", summary.render());

    if let Some(dir) = report_dir {
        match JsonFileSink::new(dir).publish(&summary).await {
            Ok(path) => {
                tracing::info!("📁 Report saved to: {}", path);
                println!("📁 Report saved to: {}", path);
            }
            Err(e) => {
                tracing::error!("❌ Could not write report: {}", e);
                eprintln!("❌ {}", e.user_friendly_message());
            }
        }
    }

    if let SessionOutcome::Faulted { .. } = summary.outcome {
        std::process::exit(3);
    }
}

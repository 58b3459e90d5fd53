use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use stagehand_api::{Verifier, VerifyConfig};
use stagehand_observe::{LoggerConfig, logger_init};

const EXIT_FAILED: u8 = 1;
const EXIT_CONFIG: u8 = 2;

/// Check the demo service answers both routes with the exact expected bodies.
#[derive(Debug, Parser)]
#[command(name = "stagehand-verify", version)]
struct Cli {
    /// Service base URL; overrides STAGEHAND_BASE_URL.
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let verifier = match setup(cli) {
        Ok(verifier) => verifier,
        Err(e) => {
            eprintln!("stagehand-verify: {e:#}");
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    let report = verifier.run().await;
    for check in &report.checks {
        println!("{check}");
    }

    if report.passed() {
        info!(base_url = %report.base_url, "all checks passed");
        ExitCode::SUCCESS
    } else {
        error!(
            base_url = %report.base_url,
            failed = report.failures().count(),
            "verification failed"
        );
        ExitCode::from(EXIT_FAILED)
    }
}

fn setup(cli: Cli) -> anyhow::Result<Verifier> {
    logger_init(&LoggerConfig::from_env()?)?;

    let mut cfg = VerifyConfig::from_env();
    if let Some(url) = cli.base_url {
        cfg.base_url = url;
    }
    Ok(Verifier::new(cfg)?)
}

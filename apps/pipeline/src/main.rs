use std::{path::PathBuf, process::ExitCode, sync::Arc};

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use stagehand_api::{HookApi, serve, shutdown_signal};
use stagehand_core::{
    LogNotifier, Notifier, PipelineRunner, RunnerConfig, Scheduler, WebhookNotifier,
    change_channel,
};
use stagehand_exec::{ShellExecutor, ShellProbe};
use stagehand_model::PipelineDef;
use stagehand_observe::{Journal, LoggerConfig, logger_init};

/// Run the delivery pipeline on SCM changes or on a polling interval.
#[derive(Debug, Parser)]
#[command(name = "stagehand-pipeline", version)]
struct Cli {
    /// Run the pipeline once and exit 0 on SUCCESS, 1 on FAILURE.
    #[arg(long)]
    once: bool,

    /// Pipeline definition (JSON); overrides STAGEHAND_PIPELINE.
    #[arg(long, value_name = "PATH")]
    pipeline: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // 1) Logger
    logger_init(&LoggerConfig::from_env()?)?;

    // 2) Config + pipeline definition
    let mut cfg = RunnerConfig::from_env()?;
    if let Some(path) = cli.pipeline {
        cfg.pipeline_path = path;
    }
    let def = PipelineDef::load(&cfg.pipeline_path)
        .with_context(|| format!("loading {}", cfg.pipeline_path.display()))?;
    info!(
        pipeline = %def.name,
        stages = def.stages.len(),
        path = %cfg.pipeline_path.display(),
        "pipeline loaded"
    );

    // 3) Runner
    let notifier: Arc<dyn Notifier> = match &cfg.webhook_url {
        Some(url) => Arc::new(WebhookNotifier::new(url.clone())),
        None => Arc::new(LogNotifier),
    };
    let runner = PipelineRunner::new(def, Arc::new(ShellExecutor::new()), notifier)?
        .with_env(cfg.stage_env())
        .with_subscriber(Arc::new(Journal::new()));

    // 4) Cancellation on Ctrl+C / SIGTERM
    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            shutdown_signal().await;
            cancel.cancel();
        }
    });

    if cli.once {
        let result = runner.run(&cancel).await;
        return Ok(if result.is_success() {
            ExitCode::SUCCESS
        } else {
            ExitCode::from(1)
        });
    }

    // 5) Change hook
    let (changes, rx) = change_channel();
    match cfg.hook_addr {
        Some(addr) => {
            let listener = TcpListener::bind(addr)
                .await
                .with_context(|| format!("binding change hook on {addr}"))?;
            let stop = cancel.clone();
            tokio::spawn(async move {
                let router = HookApi::new(changes).router();
                if let Err(e) = serve(listener, router, async move { stop.cancelled().await }).await {
                    error!(error = %e, "change hook stopped");
                }
            });
        }
        None => drop(changes),
    }

    // 6) Scheduler
    let mut scheduler = Scheduler::new(Arc::new(runner)).with_poll_interval(cfg.poll_interval);
    if let Some(script) = &cfg.revision_probe {
        let probe = ShellProbe::new(script.clone()).with_cwd(cfg.app_dir.clone());
        scheduler = scheduler.with_probe(Arc::new(probe));
    }
    info!(poll_secs = cfg.poll_interval.as_secs(), "scheduler running; press Ctrl+C to stop");

    let runs = scheduler.run(rx, cancel).await;
    info!(runs, "scheduler stopped");
    Ok(ExitCode::SUCCESS)
}

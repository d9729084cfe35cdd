use std::io::Write;
use std::process::ExitCode;

use anyhow::Context;
use tokio::sync::watch;
use tracing::{error, info, warn};

use rigcheck::config::{Config, OutputFormat};
use rigcheck::diagnostics::{probes, Collection, Collector, Diagnosis, Evaluator, Status};
use rigcheck::observability::metrics;

/// Exit code for configuration and startup failures.
const EXIT_ERROR: u8 = 3;

fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("rigcheck: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    if let Err(e) = rigcheck::logging::init(&config.logging) {
        eprintln!("rigcheck: failed to initialize logging: {}", e);
    }

    info!("Starting rigcheck {}", rigcheck::VERSION);
    config.log_summary();

    // Probes are I/O bound subprocess and file reads
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(error = %e, "Failed to build runtime");
            return ExitCode::from(EXIT_ERROR);
        }
    };

    match runtime.block_on(async_main(config)) {
        Ok(status) => ExitCode::from(status.exit_code() as u8),
        Err(e) => {
            error!("{:#}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

async fn async_main(config: Config) -> anyhow::Result<Status> {
    let rules = config.output.load_rules().context("loading rules")?;
    let baselines = config
        .output
        .load_baselines()
        .context("loading baselines")?;
    info!(rules = rules.len(), baselines = baselines.len(), "Rules loaded");

    let evaluator = Evaluator::new(rules).with_baselines(baselines);
    let collector = build_collector(&config)?;

    let (stop_tx, stop_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Interrupted, stopping...");
                let _ = stop_tx.send(true);
            }
            Err(e) => {
                warn!(error = %e, "Ctrl-C handler unavailable");
                // Keep the sender alive so receivers never observe a stop
                std::future::pending::<()>().await;
            }
        }
    });

    let Some(period) = config.output.watch_interval else {
        return run_once(&collector, &evaluator, config.output.format, stop_rx).await;
    };

    let mut interval = tokio::time::interval(period);
    let mut stop = stop_rx.clone();
    let mut status = Status::Healthy;

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = stop.wait_for(|stopped| *stopped) => break,
        }

        status = run_once(&collector, &evaluator, config.output.format, stop_rx.clone()).await?;

        if *stop_rx.borrow() {
            break;
        }
    }

    Ok(status)
}

fn build_collector(config: &Config) -> anyhow::Result<Collector> {
    let mut collector = Collector::new()
        .with_timeout(config.collector.timeout)
        .with_parallel(config.collector.parallel);

    for name in &config.collector.probes {
        let probe = probes::builtin(name, &config.collector.settings)
            .with_context(|| format!("unknown probe '{}'", name))?;
        collector.register_arc(probe)?;
    }

    Ok(collector)
}

/// One collection and evaluation pass, report written to stdout.
async fn run_once(
    collector: &Collector,
    evaluator: &Evaluator,
    format: OutputFormat,
    mut stop: watch::Receiver<bool>,
) -> anyhow::Result<Status> {
    let collection = collector
        .collect_until(async move {
            let _ = stop.wait_for(|stopped| *stopped).await;
        })
        .await;

    let diagnosis = evaluator.evaluate_collection(&collection);
    info!(
        run_id = %collection.run_id,
        status = %diagnosis.status,
        findings = diagnosis.findings.len(),
        "Evaluation finished"
    );

    let report = render(format, &collection, &diagnosis)?;
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(report.as_bytes())?;
    stdout.flush()?;

    Ok(diagnosis.status)
}

fn render(
    format: OutputFormat,
    collection: &Collection,
    diagnosis: &Diagnosis,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Text => Ok(diagnosis.render_text()),
        OutputFormat::Json => {
            let report = serde_json::json!({
                "run_id": collection.run_id,
                "started_at": collection.started_at,
                "collection_time_ms": collection.collection_time_ms,
                "probes": collection.slots,
                "diagnosis": diagnosis,
            });
            Ok(serde_json::to_string_pretty(&report)? + "\n")
        }
        OutputFormat::Prometheus => Ok(metrics::render(collection, diagnosis)?),
    }
}

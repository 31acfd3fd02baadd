use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use artifact_rater::config::{AppConfig, ScoringConfig};
use artifact_rater::error::AppError;
use artifact_rater::scoring::{
    enabled_builds, run_scoring, scoring_router, Artifact, BuildEntry, BuildMap, ProgressSink,
    ScoringOutcome, ScoringService,
};
use artifact_rater::telemetry;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use clap::{Args, Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use tracing::info;

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
}

#[derive(Parser, Debug)]
#[command(
    name = "Artifact Fitness Rater",
    about = "Run the artifact scoring service or score an inventory from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Score an artifact inventory against enabled builds in one pass
    Score(ScoreArgs),
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Args, Debug)]
struct ScoreArgs {
    /// JSON file containing the artifact list
    #[arg(long)]
    artifacts: PathBuf,
    /// JSON file containing the build map (keyed by build name)
    #[arg(long)]
    builds: PathBuf,
    /// Fitness threshold for keepers and the lock file
    #[arg(long, default_value_t = 0.5)]
    min_fitness: f64,
    /// Rarity threshold for keepers and the lock file
    #[arg(long, default_value_t = 6.0)]
    min_rarity: f64,
    /// Write the fitness and rarity tables to a CSV file
    #[arg(long)]
    csv_out: Option<PathBuf>,
    /// Write indices of unlocked keepers as a JSON lock file
    #[arg(long)]
    lock_out: Option<PathBuf>,
    /// Print every scored artifact instead of only keepers
    #[arg(long)]
    list_all: bool,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
        Command::Score(args) => run_score(args),
    }
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
    };

    let service = Arc::new(ScoringService::new(config.scoring.clone()));

    let app = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .with_state(state)
        .merge(scoring_router(service))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "artifact scoring service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Synchronous scoring pass for offline use; the same algorithm the service
/// runs in the background, invoked inline on the calling context.
fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let artifacts: Vec<Artifact> = serde_json::from_str(&fs::read_to_string(&args.artifacts)?)?;
    let entries: BTreeMap<String, BuildEntry> =
        serde_json::from_str(&fs::read_to_string(&args.builds)?)?;
    let builds = enabled_builds(entries);

    let mut progress = ConsoleProgress::default();
    let outcome = run_scoring(
        &artifacts,
        &builds,
        None,
        ScoringConfig::default().progress_batch,
        &mut progress,
    );

    render_score_report(&artifacts, &builds, &outcome, &args);

    if let Some(path) = &args.csv_out {
        write_csv(path, &artifacts, &builds, &outcome)?;
    }
    if let Some(path) = &args.lock_out {
        write_lock_file(path, &artifacts, &outcome, args.min_fitness, args.min_rarity)?;
    }

    Ok(())
}

#[derive(Default)]
struct ConsoleProgress {
    last: Option<u32>,
}

impl ProgressSink for ConsoleProgress {
    fn progress(&mut self, fraction: f64) {
        let percent = (fraction * 100.0).round() as u32;
        if self.last.map_or(true, |seen| percent > seen) {
            println!("progress {percent:>3}%");
            self.last = Some(percent);
        }
    }
}

fn best_fit(fits: &BTreeMap<String, f64>) -> Option<(&str, f64)> {
    fits.iter()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(key, value)| (key.as_str(), *value))
}

fn clears_thresholds(
    outcome: &ScoringOutcome,
    index: usize,
    min_fitness: f64,
    min_rarity: f64,
) -> bool {
    let rarity = outcome
        .tables
        .all_rarity
        .get(&index)
        .copied()
        .unwrap_or(0.0);
    let fitness = outcome
        .tables
        .all_fits
        .get(&index)
        .and_then(best_fit)
        .map(|(_, value)| value)
        .unwrap_or(0.0);
    fitness >= min_fitness || rarity >= min_rarity
}

fn render_score_report(
    artifacts: &[Artifact],
    builds: &BuildMap,
    outcome: &ScoringOutcome,
    args: &ScoreArgs,
) {
    println!("Artifact scoring report");
    println!(
        "{} artifacts, {} enabled builds (fingerprint {})",
        artifacts.len(),
        builds.len(),
        outcome.fingerprint
    );

    if !outcome.skipped.is_empty() {
        println!("Skipped malformed artifacts: {:?}", outcome.skipped);
    }

    if args.list_all {
        println!("\nAll scored artifacts");
    } else {
        println!(
            "\nKeepers (fitness >= {:.0}% or rarity >= {:.1})",
            args.min_fitness * 100.0,
            args.min_rarity
        );
    }

    for (&index, fits) in &outcome.tables.all_fits {
        if !args.list_all && !clears_thresholds(outcome, index, args.min_fitness, args.min_rarity) {
            continue;
        }
        let artifact = &artifacts[index];
        let rarity = outcome
            .tables
            .all_rarity
            .get(&index)
            .copied()
            .unwrap_or(0.0);
        match best_fit(fits) {
            Some((key, value)) => println!(
                "- #{index} {} slot {} {}* | rarity {rarity:.1} | best fit {:.0}% ({key})",
                artifact.set,
                artifact.position,
                artifact.rarity,
                value * 100.0
            ),
            None => println!(
                "- #{index} {} slot {} {}* | rarity {rarity:.1} | no enabled builds",
                artifact.set, artifact.position, artifact.rarity
            ),
        }
    }
}

fn write_csv(
    path: &PathBuf,
    artifacts: &[Artifact],
    builds: &BuildMap,
    outcome: &ScoringOutcome,
) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)?;

    let mut header = vec![
        "index".to_string(),
        "set".to_string(),
        "position".to_string(),
        "rarity".to_string(),
        "rarity_score".to_string(),
    ];
    header.extend(builds.keys().cloned());
    writer.write_record(&header)?;

    for (&index, fits) in &outcome.tables.all_fits {
        let artifact = &artifacts[index];
        let rarity = outcome
            .tables
            .all_rarity
            .get(&index)
            .copied()
            .unwrap_or(0.0);
        let mut record = vec![
            index.to_string(),
            artifact.set.clone(),
            artifact.position.to_string(),
            artifact.rarity.to_string(),
            format!("{rarity:.4}"),
        ];
        for key in builds.keys() {
            record.push(format!("{:.6}", fits.get(key).copied().unwrap_or(0.0)));
        }
        writer.write_record(&record)?;
    }

    writer.flush()?;
    println!("score tables written to {}", path.display());
    Ok(())
}

/// Export the indices worth keeping so an external optimizer can lock them:
/// unlocked artifacts whose best fitness or rarity clears the thresholds.
fn write_lock_file(
    path: &PathBuf,
    artifacts: &[Artifact],
    outcome: &ScoringOutcome,
    min_fitness: f64,
    min_rarity: f64,
) -> Result<(), AppError> {
    let keep: Vec<usize> = outcome
        .tables
        .all_fits
        .keys()
        .copied()
        .filter(|index| !artifacts[*index].locked)
        .filter(|index| clears_thresholds(outcome, *index, min_fitness, min_rarity))
        .collect();

    fs::write(path, serde_json::to_string(&keep)?)?;
    println!(
        "lock file written to {} ({} artifacts)",
        path.display(),
        keep.len()
    );
    Ok(())
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

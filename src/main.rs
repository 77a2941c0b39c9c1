mod cli;

use trimline::client::{request_suggestions, HttpRenderClient, HttpSuggestionClient, RenderService};
use trimline::config;
use trimline::simulate::{run_simulation, SimulationOptions};
use trimline_engine::export::{output_duration, plan_segments, serialize_export};
use trimline_engine::suggest::SpriteSummary;
use trimline_engine::ticker::frame_period;
use trimline_engine::RangeStore;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, Timeline};
use std::path::Path;
use tokio_util::sync::CancellationToken;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "trimline=trace,trimline_engine=trace,trimline_common=debug".to_string()
        } else {
            "trimline=info,trimline_engine=warn,trimline_common=warn".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Normalize { timeline, json } => normalize(&timeline, json),
        Commands::Plan { timeline, json } => plan(&timeline, json),
        Commands::Simulate {
            timeline,
            from,
            notify_ms,
        } => {
            let config = config::load_config_or_default(cli.config.as_deref())?;
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            rt.block_on(simulate(&config, timeline, from, notify_ms))
        }
        Commands::Suggest {
            prompt,
            duration,
            json,
        } => {
            let config = config::load_config_or_default(cli.config.as_deref())?;
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(suggest(&config, &prompt, duration, json))
        }
        Commands::Export {
            source,
            timeline,
            dry_run,
        } => {
            let config = config::load_config_or_default(cli.config.as_deref())?;
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(export(&config, &source, &timeline, dry_run))
        }
        Commands::Validate { file } => {
            let path = file.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("trimline {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Load a timeline into a store, normalizing its spans.
fn load_store(timeline: &Timeline) -> RangeStore {
    let mut store = RangeStore::with_duration(timeline.duration);
    store.import_ranges(&timeline.trims, &timeline.speeds);
    store
}

fn normalize(timeline: &Timeline, json: bool) -> Result<()> {
    let store = load_store(timeline);

    if json {
        let value = serde_json::json!({
            "duration": store.duration(),
            "trim_ranges": store.trims(),
            "speed_ranges": store.speeds(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("Duration: {:.3}", store.duration());
    println!("Trim ranges: {}", store.trims().len());
    for range in store.trims() {
        println!("  {}", range);
    }
    println!("Speed ranges: {}", store.speeds().len());
    for range in store.speeds() {
        println!("  {}", range);
    }
    Ok(())
}

fn plan(timeline: &Timeline, json: bool) -> Result<()> {
    let store = load_store(timeline);
    let segments = plan_segments(store.duration(), store.trims(), store.speeds());
    let total = output_duration(&segments);

    if json {
        let value = serde_json::json!({
            "segments": segments,
            "output_duration": total,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("Segments: {}", segments.len());
    for (i, segment) in segments.iter().enumerate() {
        println!(
            "  {}. {:.3}-{:.3} @ {}x",
            i + 1,
            segment.start,
            segment.end,
            segment.speed
        );
    }
    println!("Output duration: {:.3}", total);
    Ok(())
}

async fn simulate(
    config: &config::Config,
    timeline: Timeline,
    from: f64,
    notify_ms: Option<u64>,
) -> Result<()> {
    let notify_interval = notify_ms
        .filter(|ms| *ms > 0)
        .map(std::time::Duration::from_millis)
        .unwrap_or_else(|| config.playback.notify_interval());
    let options = SimulationOptions {
        duration: timeline.duration,
        trims: timeline.trims,
        speeds: timeline.speeds,
        from,
        frame_period: frame_period(config.playback.frame_rate_hz),
        notify_interval,
    };

    let cancel = CancellationToken::new();
    let local = tokio::task::LocalSet::new();
    let end = local
        .run_until(async {
            let ctrl_c = cancel.clone();
            tokio::task::spawn_local(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    ctrl_c.cancel();
                }
            });

            run_simulation(&options, cancel.clone(), |sample| {
                println!(
                    "{:>9.3} {:>9.3} {:>6.2}x",
                    sample.physical, sample.display, sample.rate
                );
            })
            .await
        })
        .await;

    println!("Ended at {:.3}", end);
    Ok(())
}

async fn suggest(config: &config::Config, prompt: &str, duration: f64, json: bool) -> Result<()> {
    let client = HttpSuggestionClient::new(&config.services);
    let mut store = RangeStore::with_duration(duration);
    let summary = SpriteSummary::for_duration(
        duration,
        config.analysis.sprite_interval_sec,
        config.analysis.frames_per_sheet,
    );

    let response = request_suggestions(&client, &mut store, prompt, Some(&summary))
        .await
        .map_err(|e| {
            tracing::warn!("Suggestion request failed: {}", e);
            anyhow::anyhow!(e.user_message())
        })?;

    if json {
        let value = serde_json::json!({
            "model": response.model,
            "strategy": response.strategy,
            "suggestions": response.suggestions,
            "trim_ranges": store.trims(),
            "speed_ranges": store.speeds(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("Model: {} ({})", response.model, response.strategy);
    for suggestion in &response.suggestions {
        println!(
            "  {:?} {:.3}-{:.3}: {}",
            suggestion.action, suggestion.start_sec, suggestion.end_sec, suggestion.reason
        );
    }
    println!("Trim ranges:");
    for range in store.trims() {
        println!("  {}", range);
    }
    println!("Speed ranges:");
    for range in store.speeds() {
        println!("  {}", range);
    }
    Ok(())
}

async fn export(
    config: &config::Config,
    source: &Path,
    timeline: &Timeline,
    dry_run: bool,
) -> Result<()> {
    if !source.exists() {
        anyhow::bail!("Source file does not exist: {:?}", source);
    }

    let store = load_store(timeline);
    let request = serialize_export(source, store.duration(), store.trims(), store.speeds())
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;

    if dry_run {
        println!("[DRY RUN] Would send {} to {}", source.display(), config.services.render_url);
        for (name, value) in request.form_fields() {
            println!("  {} = {}", name, value);
        }
        return Ok(());
    }

    let client = HttpRenderClient::new(&config.services);
    let response = client.export(&request).await.map_err(|e| {
        tracing::warn!("Export failed: {}", e);
        anyhow::anyhow!(e.user_message())
    })?;

    println!("Export complete!");
    println!("Output: {}", response.output_name);
    println!("URL: {}", response.output_url);
    println!("Removed ranges: {}", response.removed_ranges_count);
    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p).context("Configuration is invalid")?;
            println!("✓ Configuration is valid");
            print_config(&config);
        }
        None => {
            println!("No config file specified, using defaults");
            print_config(&config::Config::default());
        }
    }

    Ok(())
}

fn print_config(config: &config::Config) {
    println!("  Render service: {}", config.services.render_url);
    println!("  Suggestion service: {}", config.services.suggest_url);
    println!("  Timeout: {}s", config.services.timeout_secs);
    println!("  Frame rate: {} Hz", config.playback.frame_rate_hz);
    println!("  Sprite interval: {}s", config.analysis.sprite_interval_sec);
}

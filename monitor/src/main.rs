use anyhow::Context;
use aquacore::timeseries::DatasetSelection;
use aquacore::{DetectionMode, SearchInput};
use clap::Parser;
use gui_bridge::bridge::GuiBridge;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use workflow::config::{ConfigOverrides, MonitorConfig};
use workflow::renderer::spawn_log_renderer;
use workflow::runner::Runner;

mod gui_bridge;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "AquaSentinel time-series map monitor")]
struct Args {
    /// Load a monitor config from YAML
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, env = "AQUA_BACKEND_URL")]
    backend_url: Option<String>,
    #[arg(long, env = "AQUA_NOMINATIM_URL")]
    geocoder_url: Option<String>,
    /// Replay this dataset index instead of the configured one
    #[arg(long, conflicts_with = "random_dataset")]
    dataset: Option<usize>,
    /// Pick the dataset at random (optionally seeded)
    #[arg(long, default_value_t = false)]
    random_dataset: bool,
    #[arg(long, requires = "random_dataset")]
    seed: Option<u64>,
    /// Seconds between slot requests
    #[arg(long)]
    pacing_secs: Option<u64>,
    /// JSON file that keeps accumulated alerts across runs
    #[arg(long)]
    alert_store: Option<PathBuf>,
    #[arg(long)]
    bind: Option<SocketAddr>,
    /// Place name or "lat,lon" to select at startup
    #[arg(long, conflicts_with_all = ["lat", "lon"])]
    search: Option<String>,
    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    lat: Option<f64>,
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    lon: Option<f64>,
    /// Detection overlay mode: none, ships, debris or distance
    #[arg(long, default_value = "none")]
    mode: DetectionMode,
    /// Fetch the time series for the startup location
    #[arg(long, default_value_t = false)]
    fetch: bool,
    /// Clear persisted alerts before doing anything else
    #[arg(long, default_value_t = false)]
    reset_alerts: bool,
    /// Keep the HTTP bridge alive for the visualizer
    #[arg(long, default_value_t = false)]
    serve: bool,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        let dataset = if self.random_dataset {
            Some(DatasetSelection::Random { seed: self.seed })
        } else {
            self.dataset.map(|index| DatasetSelection::Fixed { index })
        };
        ConfigOverrides {
            backend_url: self.backend_url.clone(),
            geocoder_url: self.geocoder_url.clone(),
            pacing_secs: self.pacing_secs,
            dataset,
            alert_store: self.alert_store.clone(),
            bind: self.bind,
        }
    }

    fn startup_search(&self) -> Option<SearchInput> {
        match (self.lat, self.lon, self.search.as_deref()) {
            (Some(lat), Some(lon), _) => Some(SearchInput::coordinate(lat, lon)),
            (_, _, Some(text)) if !text.trim().is_empty() => Some(SearchInput::text(text)),
            _ => None,
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = if let Some(path) = &args.config {
        MonitorConfig::load(path)?
    } else {
        MonitorConfig::default()
    }
    .with_overrides(args.overrides());

    let runtime = TokioBuilder::new_multi_thread()
        .enable_all()
        .build()
        .context("creating tokio runtime")?;
    runtime.block_on(run(args, config))
}

async fn run(args: Args, config: MonitorConfig) -> anyhow::Result<()> {
    let runner = Runner::new(config)?;
    let service = runner.service().clone();
    let renderer = spawn_log_renderer(service.subscribe()?);

    if args.reset_alerts {
        service.reset_alerts().context("clearing persisted alerts")?;
    }
    service.set_mode(args.mode)?;

    if let Some(input) = args.startup_search() {
        match runner.bootstrap(&input).await? {
            Some(location) => println!("Selected {}", location.name),
            None => println!("Location not found"),
        }
    }

    if args.fetch {
        let result = runner.execute().await?;
        println!(
            "Time series for {} -> frames {}, alerts {} (total {}), failed slots {}",
            result.location.name,
            result.frames.len(),
            result.frames.iter().map(|frame| frame.alerts).sum::<usize>(),
            result.alerts_total,
            result.metrics.slot_failures
        );
        for frame in &result.frames {
            println!(
                "  {} patches={} alerts={}",
                frame.timestamp, frame.patches, frame.alerts
            );
        }
    }

    if args.serve {
        let bridge = GuiBridge::new(service.clone());
        let server = bridge.serve(runner.config().bind);
        bridge.publish_status("HTTP bridge running (Ctrl+C to stop)...");
        signal::ctrl_c().await.context("awaiting Ctrl+C to exit")?;
        server.abort();
    }

    renderer.abort();
    Ok(())
}

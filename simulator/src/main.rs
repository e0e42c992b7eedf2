//! LEO Link Simulator CLI
//!
//! Runs a headless session: one ground site, a random LEO constellation,
//! frame-by-frame link selection. Stands in for the 3D renderer by logging
//! handovers and optionally streaming every frame as JSON lines.
//!
//! Usage:
//!   leo-link-sim --seed 7 --frames 3600 --json > frames.jsonl
//!   leo-link-sim --config sim.json --realtime

use anyhow::{bail, Result};
use clap::Parser;
use constellation_state::ConstellationEvent;
use leo_link_sim::{SimConfig, SimulationSession};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::time::Duration;
use tokio::time;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "leo-link-sim",
    about = "Headless LEO constellation link-selection simulator"
)]
struct Args {
    /// JSON config file (all fields optional)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of satellites
    #[arg(short = 'n', long)]
    satellites: Option<usize>,

    /// RNG seed for a reproducible run
    #[arg(short, long)]
    seed: Option<u64>,

    /// Ground site latitude in degrees
    #[arg(long, allow_hyphen_values = true)]
    lat: Option<f64>,

    /// Ground site longitude in degrees
    #[arg(long, allow_hyphen_values = true)]
    lon: Option<f64>,

    /// Frames per simulated second
    #[arg(long)]
    fps: Option<f64>,

    /// Frames to run (0 = until Ctrl-C, requires --realtime)
    #[arg(short, long, default_value_t = 3600)]
    frames: u64,

    /// Pace frames against the wall clock
    #[arg(long)]
    realtime: bool,

    /// Stream frame reports to stdout as JSON lines
    #[arg(long)]
    json: bool,

    /// Log a status line every N frames
    #[arg(long, default_value_t = 300)]
    report_every: u64,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn sim_config(&self) -> Result<SimConfig> {
        let mut config = match &self.config {
            Some(path) => SimConfig::load(path)?,
            None => SimConfig::default(),
        };

        if let Some(n) = self.satellites {
            config.constellation.satellite_count = n;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if let Some(lat) = self.lat {
            config.site.latitude_deg = lat;
        }
        if let Some(lon) = self.lon {
            config.site.longitude_deg = lon;
        }
        if let Some(fps) = self.fps {
            config.frame_rate_hz = fps;
        }

        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Default)]
struct RunStats {
    frames: u64,
    linked_frames: u64,
    handovers: u64,
    storms: u64,
    faults: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr so --json output stays clean
    let default_filter = if args.verbose {
        "leo_link_sim=debug,link_selector=debug,constellation_state=debug"
    } else {
        "leo_link_sim=info,link_selector=info,constellation_state=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(io::stderr)
        .init();

    if args.frames == 0 && !args.realtime {
        bail!("--frames 0 runs forever and requires --realtime");
    }

    let config = args.sim_config()?;
    let dt = config.frame_period_s();

    info!("{}", "=".repeat(60));
    info!("LEO Link Simulator");
    info!("{}", "=".repeat(60));

    let mut session = SimulationSession::new(&config)?;
    info!("Started at {}", session.started_at().to_rfc3339());

    let mut out = BufWriter::new(io::stdout().lock());
    let mut stats = RunStats::default();

    let mut interval = time::interval(Duration::from_secs_f64(dt));
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    while args.frames == 0 || stats.frames < args.frames {
        if args.realtime {
            tokio::select! {
                _ = interval.tick() => {}
                _ = &mut shutdown => {
                    info!("Interrupted");
                    break;
                }
            }
        }

        let report = session.step(dt);
        stats.frames += 1;

        for event in &report.events {
            match event {
                ConstellationEvent::WeatherOnset { .. } => stats.storms += 1,
                ConstellationEvent::StatusToggled { .. } => stats.faults += 1,
                ConstellationEvent::WeatherCleared => {}
            }
        }

        let snap = &report.snapshot;
        if snap.is_linked() {
            stats.linked_frames += 1;
        }
        if matches!(snap.transition, link_selector::Transition::Handover { .. }) {
            stats.handovers += 1;
        }

        if args.report_every > 0 && report.frame % args.report_every == 0 {
            info!(
                "t={:>7.1}s | {:8} | q={:5.1} {:?} | next {:8} | {:?} | {}/{} active",
                snap.sim_time,
                snap.connected_id.as_deref().unwrap_or("SCANNING"),
                snap.signal_quality,
                snap.signal_band,
                snap.next_id.as_deref().unwrap_or("NONE"),
                snap.weather,
                snap.active_count,
                snap.satellite_count
            );
        }

        if args.json {
            serde_json::to_writer(&mut out, &report)?;
            out.write_all(b"\n")?;
        }
    }

    out.flush()?;

    let coverage = if stats.frames > 0 {
        100.0 * stats.linked_frames as f64 / stats.frames as f64
    } else {
        0.0
    };

    info!("{}", "=".repeat(60));
    info!("SUMMARY");
    info!("{}", "=".repeat(60));
    info!("Frames:     {}", stats.frames);
    info!("Simulated:  {:.1}s", session.sim_time());
    info!("Coverage:   {:.1}%", coverage);
    info!("Handovers:  {}", stats.handovers);
    info!("Storms:     {}", stats.storms);
    info!("Faults:     {}", stats.faults);

    Ok(())
}

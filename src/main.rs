//! tankguard — command-line front end.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                     Adapters (outer ring)                     │
//! │                                                               │
//! │  Plant (sim)        LogEventSink    MemoryStore   Clock       │
//! │  (Input+Output)     (EventSink)     (Config+KV)   (pacing)    │
//! │                                                               │
//! │  ──────────────── Port Trait Boundary ──────────────────      │
//! │                                                               │
//! │  ┌─────────────────────────────────────────────────────┐      │
//! │  │          ControlService → PolicyEvaluator           │      │
//! │  └─────────────────────────────────────────────────────┘      │
//! │                                                               │
//! │  program::render (IL · smbp · md)   vision (sketch answers)   │
//! └───────────────────────────────────────────────────────────────┘
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use log::{info, warn};

use tankguard::adapters::log_sink::{LogEventSink, RecordingSink, Tee};
use tankguard::adapters::time::MonotonicClock;
use tankguard::app::commands::{AppCommand, CommandReply};
use tankguard::app::events::AppEvent;
use tankguard::config::{ControllerConfig, ControllerVariant, FillMode, validate_config};
use tankguard::program::{self, ArtifactKind};
use tankguard::sim::{PlantParams, Simulation};
use tankguard::topology::{PumpId, TankId, Topology};
use tankguard::vision::{self, Platform};

/// Pump/tank backup controller tooling for TM221 PLCs.
#[derive(Debug, Parser)]
#[command(name = "tankguard", version)]
struct Cli {
    /// Controller configuration (JSON).  Defaults apply when omitted.
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Target controller, overriding the configuration.
    #[arg(long, global = true, value_enum)]
    variant: Option<VariantArg>,

    /// Fill command behaviour, overriding the configuration.
    #[arg(long = "fill-mode", global = true, value_enum)]
    fill_mode: Option<FillModeArg>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the controller against the simulated plant.
    Simulate(SimulateArgs),
    /// Write the PLC program as an IL listing, .smbp project or Markdown document.
    Render(RenderArgs),
    /// Parse a saved vision-model answer for a ladder sketch.
    AnalyzeResponse(AnalyzeArgs),
}

#[derive(Debug, Parser)]
struct SimulateArgs {
    /// Simulated run time.
    #[arg(long, default_value_t = 60.0, value_name = "SECS")]
    seconds: f32,

    /// Seize this pump (1-3) after `--fail-at` seconds.
    #[arg(long = "fail-pump", value_name = "N", value_parser = clap::value_parser!(u8).range(1..=3))]
    fail_pump: Option<u8>,

    #[arg(long = "fail-at", default_value_t = 10.0, value_name = "SECS")]
    fail_at: f32,

    /// Repair the failed pump, jog it and press FAULT RESET at this time.
    #[arg(long = "reset-at", value_name = "SECS")]
    reset_at: Option<f32>,

    /// Pace scans against the wall clock.
    #[arg(long)]
    realtime: bool,
}

#[derive(Debug, Parser)]
struct RenderArgs {
    #[arg(value_enum)]
    kind: KindArg,

    /// Output file; stdout when omitted.
    #[arg(long, short, value_name = "PATH")]
    out: Option<PathBuf>,
}

#[derive(Debug, Parser)]
struct AnalyzeArgs {
    /// File holding the model's raw answer.
    #[arg(value_name = "FILE")]
    file: PathBuf,

    #[arg(long, default_value = "schneider")]
    platform: String,

    /// Write the export JSON here.
    #[arg(long, value_name = "PATH")]
    export: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum VariantArg {
    #[value(name = "24")]
    Ce24t,
    #[value(name = "40")]
    Ce40t,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FillModeArg {
    Level,
    Band,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum KindArg {
    Il,
    Smbp,
    Markdown,
}

impl From<KindArg> for ArtifactKind {
    fn from(k: KindArg) -> Self {
        match k {
            KindArg::Il => Self::InstructionList,
            KindArg::Smbp => Self::Smbp,
            KindArg::Markdown => Self::Markdown,
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match cli.command {
        Command::Simulate(args) => simulate(config, &args),
        Command::Render(args) => render(&config, &args),
        Command::AnalyzeResponse(args) => analyze(&args),
    }
}

fn load_config(cli: &Cli) -> Result<ControllerConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str::<ControllerConfig>(&text)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => ControllerConfig::default(),
    };
    if let Some(v) = cli.variant {
        config.variant = match v {
            VariantArg::Ce24t => ControllerVariant::Tm221Ce24t,
            VariantArg::Ce40t => ControllerVariant::Tm221Ce40t,
        };
    }
    if let Some(m) = cli.fill_mode {
        config.fill_mode = match m {
            FillModeArg::Level => FillMode::LevelSwitch,
            FillModeArg::Band => FillMode::Band,
        };
    }
    validate_config(&config).context("invalid configuration")?;
    Ok(config)
}

// ── simulate ──────────────────────────────────────────────────

fn simulate(config: ControllerConfig, args: &SimulateArgs) -> Result<()> {
    if !(args.seconds.is_finite() && args.seconds > 0.0) {
        bail!("--seconds must be positive");
    }
    let failed = args.fail_pump.and_then(|n| PumpId::from_index(usize::from(n) - 1));
    let interval = Duration::from_millis(u64::from(config.scan_interval_ms));

    let mut log_sink = LogEventSink::new();
    let mut recorder = RecordingSink::new();
    let mut sim = {
        let mut sink = Tee(&mut log_sink, &mut recorder);
        Simulation::new(config, PlantParams::default(), &mut sink)
            .context("cannot start the simulated controller")?
    };
    let mut clock = MonotonicClock::new();

    sim.plant.press_start();
    let mut failure_injected = false;
    let mut reset_done = false;

    while sim.service.uptime_secs() < args.seconds {
        let t = sim.service.uptime_secs();
        if let Some(pump) = failed {
            if !failure_injected && t >= args.fail_at {
                warn!("Injecting failure: {pump} seized at t={t:.2}s");
                sim.plant.seize_pump(pump);
                failure_injected = true;
            }
            if let Some(at) = args.reset_at {
                if failure_injected && !reset_done && t >= at {
                    info!("Operator repairs {pump} and presses FAULT RESET at t={t:.2}s");
                    sim.plant.repair_pump(pump);
                    sim.plant.jog_pump(pump, 1.0);
                    sim.plant.press_fault_reset();
                    reset_done = true;
                }
            }
        }

        if args.realtime {
            clock.pace(interval);
        }
        let mut sink = Tee(&mut log_sink, &mut recorder);
        sim.tick(&mut sink).context("scan rejected")?;
    }

    let reply = {
        let Simulation { service, plant, store, .. } = &mut sim;
        service.handle_command(AppCommand::GetDiagnostics, plant, store)?
    };

    info!("──── simulation summary ────");
    for tank in TankId::ALL {
        info!(
            "{tank}: level {:5.1} %  (lowest {:5.1} %)",
            sim.plant.level(tank),
            sim.plant.lowest_level(tank)
        );
    }
    if let CommandReply::Diagnostics(report) = reply {
        let m = report.metrics;
        info!(
            "scans={} rejected={} fault_events={} backup_engagements={} active_faults=0b{:03b}",
            m.scans, m.rejected_scans, m.fault_events, m.backup_engagements, m.active_faults
        );
        for entry in &report.history {
            info!(
                "  t={:7.2}s {} {:?}: {}",
                entry.uptime_secs, entry.pump, entry.kind, entry.note
            );
        }
    }
    let engaged = recorder
        .events
        .iter()
        .filter(|e| matches!(e, AppEvent::BackupEngaged(_)))
        .count();
    info!("backup engagements observed: {engaged}");
    Ok(())
}

// ── render ────────────────────────────────────────────────────

fn render(config: &ControllerConfig, args: &RenderArgs) -> Result<()> {
    let topology = Topology::baseline(config.timer_preset_secs);
    let kind = ArtifactKind::from(args.kind);
    let text = program::render(kind, &topology, config)
        .with_context(|| format!("rendering {kind}"))?;
    write_out(args.out.as_deref(), &text)
}

fn write_out(path: Option<&Path>, text: &str) -> Result<()> {
    match path {
        Some(p) => {
            fs::write(p, text).with_context(|| format!("writing {}", p.display()))?;
            info!("Wrote {} ({} bytes)", p.display(), text.len());
        }
        None => print!("{text}"),
    }
    Ok(())
}

// ── analyze-response ──────────────────────────────────────────

fn analyze(args: &AnalyzeArgs) -> Result<()> {
    let text = fs::read_to_string(&args.file)
        .with_context(|| format!("reading {}", args.file.display()))?;
    let Ok(platform) = args.platform.parse::<Platform>();
    let source = args.file.display().to_string();
    let outcome = vision::parse_response(&text, Some(&source), platform);

    println!("{}", outcome.summary());
    let problems = outcome.validate();
    if problems.is_empty() {
        info!("analysis complete");
    } else {
        for p in &problems {
            warn!("{p}");
        }
    }

    if let Some(path) = &args.export {
        let json = serde_json::to_string_pretty(&outcome.to_json()).context("encoding export")?;
        write_out(Some(path), &json)?;
    }
    Ok(())
}

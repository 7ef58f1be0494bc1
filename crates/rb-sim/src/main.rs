//! Reel Bank Simulator
//!
//! Usage:
//!   rb-sim run [--config machine.yaml] [--reels 5] [--seed 7] [--spins 10]
//!   rb-sim config [--json]        - Print the default machine config
//!
//! Set `RUST_LOG=info` (or `debug`) to follow the session transitions.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use rb_core::{MachineConfig, ReelConfig};
use rb_session::{IdleState, SlotMachine, SpinningReadyState};

#[derive(Parser)]
#[command(name = "rb-sim", about = "Reel Bank spin simulator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run scripted spin sessions
    Run {
        /// Machine config file (yaml, yml or json)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Reel count when no config file is given
        #[arg(short, long, default_value_t = 3)]
        reels: usize,
        /// Use the turbo motion profile when no config file is given
        #[arg(long)]
        turbo: bool,
        /// RNG seed (overrides the config)
        #[arg(short, long)]
        seed: Option<u64>,
        /// Number of sessions
        #[arg(long, default_value_t = 5)]
        spins: u32,
        /// Simulation frame rate
        #[arg(long, default_value_t = 60.0)]
        fps: f32,
        /// Extra time to hold full speed before pressing stop (seconds)
        #[arg(long, default_value_t = 0.0)]
        hold: f32,
    },
    /// Print the default machine config
    Config {
        /// JSON instead of YAML
        #[arg(long)]
        json: bool,
    },
}

/// Upper bound on simulated time per phase before giving up
const PHASE_TIMEOUT_SECS: f32 = 120.0;

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            reels,
            turbo,
            seed,
            spins,
            fps,
            hold,
        } => {
            let config = load_config(config, reels, turbo, seed)?;
            run_sessions(config, spins, fps, hold)
        }
        Commands::Config { json } => {
            let config = MachineConfig::three_reel();
            let text = if json { config.to_json()? } else { config.to_yaml()? };
            println!("{text}");
            Ok(())
        }
    }
}

fn load_config(
    path: Option<PathBuf>,
    reels: usize,
    turbo: bool,
    seed: Option<u64>,
) -> Result<MachineConfig> {
    let mut config = match path {
        Some(path) => MachineConfig::load(&path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => {
            let reel = if turbo {
                ReelConfig::turbo()
            } else {
                ReelConfig::standard()
            };
            MachineConfig::uniform(reels, reel)
        }
    };

    if let Some(seed) = seed {
        config.seed = Some(seed);
    }
    Ok(config)
}

fn run_sessions(config: MachineConfig, spins: u32, fps: f32, hold: f32) -> Result<()> {
    if !(fps.is_finite() && fps > 0.0) {
        bail!("fps must be positive, got {fps}");
    }
    let dt = 1.0 / fps;

    let mut machine = SlotMachine::new(config).context("Failed to build slot machine")?;
    log::info!(
        "Simulating {spins} spin(s) on {} reel(s) at {fps} fps",
        machine.reels_count()
    );

    for spin in 1..=spins {
        if !machine.press_start() {
            bail!("start rejected in state {:?}", machine.state());
        }
        advance_until(&mut machine, dt, SpinningReadyState::NAME)?;
        advance_for(&mut machine, dt, hold);

        if !machine.press_stop() {
            bail!("stop rejected in state {:?}", machine.state());
        }
        advance_until(&mut machine, dt, IdleState::NAME)?;

        let faces: Vec<String> = machine
            .center_symbols()
            .into_iter()
            .map(|s| s.unwrap_or_else(|| "-".to_string()))
            .collect();
        println!(
            "spin {spin:>3}  t={:>7.2}s  [{}]",
            machine.elapsed(),
            faces.join(" | ")
        );
    }

    log::info!(
        "Done: {} stop fx restart(s), {:.2}s simulated",
        machine.stop_fx().restarts(),
        machine.elapsed()
    );
    Ok(())
}

fn advance_until(machine: &mut SlotMachine, dt: f32, state: &str) -> Result<()> {
    let mut waited = 0.0;
    while machine.state() != Some(state) {
        if waited > PHASE_TIMEOUT_SECS {
            bail!(
                "timed out waiting for {state}, stuck in {:?}",
                machine.state()
            );
        }
        machine.tick(dt);
        waited += dt;
    }
    Ok(())
}

fn advance_for(machine: &mut SlotMachine, dt: f32, seconds: f32) {
    let mut remaining = seconds;
    while remaining > 0.0 {
        machine.tick(dt);
        remaining -= dt;
    }
}

//! Scuttle procedural locomotion CLI.
//!
//! Provides two modes of operation:
//! - `walk`: Drive an agent over a scripted course headless and print gait statistics
//! - `info`: Print workspace crate versions and default tunables

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use nalgebra::Vector3;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use scuttle_core::prelude::*;
use scuttle_gait::{GaitStats, LocomotionController};
use scuttle_terrain::{TerrainConfig, TerrainWorld};

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

/// Procedural multi-limb locomotion.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Log step decisions (equivalent to RUST_LOG=debug).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Walk an agent over a scripted course and print gait statistics.
    Walk {
        /// Agent configuration (TOML). Defaults to a four-limbed walker.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Terrain description (TOML). Defaults to flat ground at y = 0.
        #[arg(short, long)]
        terrain: Option<PathBuf>,

        /// Override the gait policy from the configuration.
        #[arg(short, long)]
        policy: Option<PolicyArg>,

        /// Number of fixed ticks to simulate.
        #[arg(short = 'n', long, default_value_t = 1000)]
        ticks: u32,

        /// Fixed tick length in seconds.
        #[arg(long, default_value_t = 0.02)]
        dt: f64,

        /// Spawn height of the body above the origin.
        #[arg(long, default_value_t = 1.2)]
        height: f64,
    },

    /// Print crate information.
    Info,
}

#[derive(Clone, Copy, ValueEnum)]
enum PolicyArg {
    RoundRobin,
    FarthestFirst,
}

impl From<PolicyArg> for GaitPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::RoundRobin => Self::RoundRobin,
            PolicyArg::FarthestFirst => Self::FarthestFirst,
        }
    }
}

// ---------------------------------------------------------------------------
// Course
// ---------------------------------------------------------------------------

/// Input for tick `i` of the built-in course.
///
/// The course repeats every 300 ticks: walk forward, turn left in place,
/// strafe right, then stand still long enough for idle re-planting.
fn course_input(i: u32) -> TickInput {
    match i % 300 {
        0..120 => TickInput::moving(0.0, -1.0),
        120..150 => TickInput::idle().with_yaw(0.03),
        150..210 => TickInput::moving(-1.0, 0.0),
        _ => TickInput::idle(),
    }
}

/// Default agent: four limbs at the corners of a 1.6 × 2.0 body.
fn default_walker() -> LocomotionConfig {
    LocomotionConfig::default()
        .with_limb(LimbConfig::new("front_left", [-0.8, 0.0, 1.0]))
        .with_limb(LimbConfig::new("front_right", [0.8, 0.0, 1.0]))
        .with_limb(LimbConfig::new("rear_left", [-0.8, 0.0, -1.0]))
        .with_limb(LimbConfig::new("rear_right", [0.8, 0.0, -1.0]))
}

// ---------------------------------------------------------------------------
// Mode implementations
// ---------------------------------------------------------------------------

struct WalkArgs {
    config: Option<PathBuf>,
    terrain: Option<PathBuf>,
    policy: Option<PolicyArg>,
    ticks: u32,
    dt: f64,
    height: f64,
}

fn run_walk(args: WalkArgs) -> Result<(), ScuttleError> {
    let mut config = match &args.config {
        Some(path) => LocomotionConfig::from_file(path)?,
        None => default_walker(),
    };
    if let Some(policy) = args.policy {
        config.gait_policy = policy.into();
    }
    let world = match &args.terrain {
        Some(path) => TerrainConfig::from_file(path)?.build()?,
        None => TerrainWorld::flat(0.0),
    };
    if !(args.dt.is_finite() && args.dt > 0.0) {
        return Err(ConfigError::invalid("dt", "must be positive").into());
    }
    info!(
        limbs = config.limbs.len(),
        surfaces = world.len(),
        ticks = args.ticks,
        "Starting walk"
    );

    let spawn = Pose::from_position(Vector3::new(0.0, args.height, 0.0));
    let mut ctrl = LocomotionController::new(config, spawn, world)?;

    for i in 0..args.ticks {
        let report = ctrl.tick(&course_input(i), args.dt);
        if let Some((limb, trigger)) = report.armed() {
            debug!(tick = report.tick, %limb, ?trigger, "step");
        }
    }

    print_summary(&ctrl);
    Ok(())
}

fn print_summary(ctrl: &LocomotionController<TerrainWorld>) {
    let GaitStats {
        ticks,
        drift_steps,
        rotation_steps,
        idle_steps,
        completed_steps,
        initial_locks,
        misses,
        distance_travelled,
    } = *ctrl.stats();
    let root = ctrl.root().position;

    println!("simulated {} ({ticks} ticks)", ctrl.clock());
    println!("distance travelled: {distance_travelled:.2}");
    println!(
        "final position: ({:.2}, {:.2}, {:.2})",
        root.x, root.y, root.z
    );
    println!();
    println!("steps armed:     {}", ctrl.stats().steps_armed());
    println!("  drift:         {drift_steps}");
    println!("  rotation:      {rotation_steps}");
    println!("  idle:          {idle_steps}");
    println!("steps completed: {completed_steps}");
    println!("initial locks:   {initial_locks}");
    println!("missed probes:   {misses}");
    println!();
    for limb in ctrl.limbs() {
        let state = match limb.lock().position() {
            Some(p) if limb.is_stepping() => format!(
                "stepping to ({:.2}, {:.2}, {:.2}) at {:.0}%",
                p.x,
                p.y,
                p.z,
                limb.step_progress() * 100.0
            ),
            Some(p) => format!("planted at ({:.2}, {:.2}, {:.2})", p.x, p.y, p.z),
            None => "no foothold".to_owned(),
        };
        println!("  {:<12} {state}", limb.name());
    }
}

fn run_info() {
    let defaults = LocomotionConfig::default();
    println!("scuttle v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("crates:");
    println!("  scuttle-core     {}", env!("CARGO_PKG_VERSION"));
    println!("  scuttle-gait     {}", env!("CARGO_PKG_VERSION"));
    println!("  scuttle-terrain  {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("defaults:");
    println!("  move_speed          {}", defaults.move_speed);
    println!("  step_speed          {}", defaults.step_speed);
    println!("  leg_distance        {}", defaults.leg_distance);
    println!("  step_height         {}", defaults.step_height);
    println!("  idle_timeout_secs   {}", defaults.idle_timeout_secs);
    println!("  near_rest_threshold {}", defaults.near_rest_threshold);
    println!("  gait_policy         {:?}", defaults.gait_policy);
    println!();
    println!("edition: 2024");
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();

    let result = match cli.command {
        Some(Commands::Walk {
            config,
            terrain,
            policy,
            ticks,
            dt,
            height,
        }) => run_walk(WalkArgs {
            config,
            terrain,
            policy,
            ticks,
            dt,
            height,
        }),
        Some(Commands::Info) => {
            run_info();
            Ok(())
        }
        None => {
            // Default: walk the built-in course with defaults
            run_walk(WalkArgs {
                config: None,
                terrain: None,
                policy: None,
                ticks: 1000,
                dt: 0.02,
                height: 1.2,
            })
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

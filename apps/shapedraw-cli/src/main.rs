use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use glam::DVec3;
use shapedraw_animation::{AnimatedColor, AnimatedValue, Animates, TimelineEngine};
use shapedraw_common::{Axis, LineStyle, Rgba};
use shapedraw_controller::{
    Controller, EventListener, PlayerId, RespawnEvent, Session, Settings, WorldId,
};
use shapedraw_render::{share, DrawLog, RecordingFacade, RenderStats, ShapeRotate, WireframeCuboid};
use shapedraw_tween::{StepEngine, DEFAULT_PULSE};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Host game ticks run at 20 Hz.
const TICK: Duration = Duration::from_millis(50);

#[derive(Parser)]
#[command(name = "shapedraw-cli", about = "Headless host driver for shapedraw sessions")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Directory holding settings.yaml
    #[arg(short, long, default_value = ".")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print crate info and the effective settings
    Info,
    /// Simulate a host: ticks, frames, one respawn and one dimension change
    Demo {
        /// Number of game ticks to simulate
        #[arg(short, long, default_value = "20")]
        ticks: u64,
        /// Drive animations from a background ticker thread in real time
        #[arg(long)]
        realtime: bool,
    },
    /// Build the demo scene, run one tick and print the debug dump
    Dump {
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

struct RespawnLogger;

impl EventListener for RespawnLogger {
    fn on_respawn(&mut self, event: &RespawnEvent) -> anyhow::Result<()> {
        info!(
            session = %event.session(),
            new_server = event.is_new_server(),
            new_dimension = event.is_new_dimension(),
            "player respawned"
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "respawn-logger"
    }
}

/// A spinning, color-pulsing cuboid in its own session.
struct Scene {
    controller: Controller,
    log: DrawLog,
    _spin: AnimatedValue<f64>,
    _pulse: AnimatedColor,
}

fn build_scene(settings: Settings, engine: &StepEngine) -> anyhow::Result<Scene> {
    let facade = RecordingFacade::new();
    let log = facade.log();
    let mut controller = Controller::new(settings);
    controller.initialize(Box::new(facade))?;

    let engine: Arc<dyn TimelineEngine> = Arc::new(engine.clone());
    let style = LineStyle::default_style();
    let rotate = Arc::new(ShapeRotate::around(0.0, Axis::Y));

    let mut spin = AnimatedValue::from_cell(Arc::clone(&engine), Arc::clone(rotate.angle_cell()));
    spin.animate_start_loop(360.0, false, 2000)?;
    let mut pulse = AnimatedColor::new(engine, Arc::clone(style.main_color()));
    pulse.animate_start_loop(Rgba::CYAN, true, 1000)?;

    let mut cuboid = WireframeCuboid::from_corners(DVec3::new(-1.0, 64.0, -1.0), DVec3::new(1.0, 66.0, 1.0));
    cuboid.set_line_style(Some(style)).add_transform(rotate);

    let session = Session::new(&mut controller, "demo")?;
    session
        .add_shape(share(cuboid))
        .add_listener(std::rc::Rc::new(std::cell::RefCell::new(RespawnLogger)));

    Ok(Scene {
        controller,
        log,
        _spin: spin,
        _pulse: pulse,
    })
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let settings = Settings::load_or_default(&cli.config)?;

    match cli.command {
        Commands::Info => {
            println!("shapedraw-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", shapedraw_common::crate_info());
            println!("animation: {}", shapedraw_animation::crate_info());
            println!("tween: {}", shapedraw_tween::crate_info());
            println!("render: {}", shapedraw_render::crate_info());
            println!("controller: {}", shapedraw_controller::crate_info());
            println!(
                "settings: logging-enabled={} debug-dump-interval-ms={}",
                settings.logging_enabled, settings.debug_dump_interval_ms
            );
        }
        Commands::Demo { ticks, realtime } => {
            println!("Demo: ticks={ticks}, realtime={realtime}");
            let engine = StepEngine::new();
            let mut scene = build_scene(settings, &engine)?;
            let ticker = if realtime {
                Some(engine.spawn_ticker(DEFAULT_PULSE)?)
            } else {
                None
            };

            let player = DVec3::new(0.5, 65.0, 4.0);
            let mut totals = RenderStats::default();
            for tick in 0..ticks {
                // Second half of the run happens after a portal trip.
                let (world, dimension) = if tick >= ticks / 2 { (2, -1) } else { (1, 0) };
                let report = scene
                    .controller
                    .on_game_tick(player, WorldId(world), PlayerId(world), dimension)?;
                if let Some(respawn) = report.respawn {
                    println!("tick {tick}: respawn {respawn:?}");
                }
                if realtime {
                    std::thread::sleep(TICK);
                } else {
                    engine.advance(TICK);
                }
                totals += scene.controller.on_pre_render(player, 0.0, false)?;
            }
            drop(ticker);

            println!("Frames: {totals}");
            println!("Draw calls: {}", scene.log.summary());
            println!("Counters: {}", scene.controller.counters());
        }
        Commands::Dump { json } => {
            let engine = StepEngine::new();
            let mut scene = build_scene(settings, &engine)?;
            scene
                .controller
                .on_game_tick(DVec3::ZERO, WorldId(1), PlayerId(1), 0)?;
            let report = scene.controller.report();
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{report}");
            }
        }
    }

    Ok(())
}

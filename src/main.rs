//! Spatial motion engine demo host.
//!
//! Builds an engine from an INI config, lays out a ring of sources as one
//! macro, configures a demo scenario and drives the fixed-step loop for a
//! while. A collaborator thread stands in for the renderer and consumes the
//! per-tick frames.
//!
//! # Running
//!
//! ```sh
//! RUST_LOG=debug cargo run --release -- --scenario rotate --seconds 5
//! ```

use std::f32::consts::{PI, TAU};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use crossbeam_channel::Receiver;
use log::{debug, error, info};

use spatialmotion::components::concentration::ConcentrationCurve;
use spatialmotion::components::playback::PlaybackMode;
use spatialmotion::components::shape::{ShapeParams, TrajectoryShape};
use spatialmotion::components::sourcemotion::SourceId;
use spatialmotion::engine::Engine;
use spatialmotion::error::EngineResult;
use spatialmotion::events::frame::RenderFrame;
use spatialmotion::math::Vector3;
use spatialmotion::resources::engineconfig::EngineConfig;

const DEMO_MACRO: &str = "ring";
const RING_RADIUS: f32 = 3.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Scenario {
    /// Manual yaw rotation of the whole ring by half a turn.
    Rotate,
    /// Animate the ring into its centroid and hold.
    Concentrate,
    /// Ring follows a circle while spinning slowly.
    Orbit,
}

/// Spatial motion engine
#[derive(Parser)]
#[command(version, about = "Delta-compositing motion engine for spatial audio sources")]
struct Cli {
    /// INI configuration file.
    #[arg(long, value_name = "PATH", default_value = "./spatialmotion.ini")]
    config: PathBuf,

    /// Seconds of simulated time to run.
    #[arg(long, default_value_t = 5.0)]
    seconds: f32,

    /// Number of sources in the ring.
    #[arg(long, default_value_t = 4)]
    sources: u32,

    #[arg(long, value_enum, default_value_t = Scenario::Rotate)]
    scenario: Scenario,

    /// Sleep between ticks to run at the configured rate.
    #[arg(long)]
    realtime: bool,

    /// Print the final frame as JSON.
    #[arg(long)]
    dump_json: bool,
}

fn setup_ring(engine: &mut Engine, count: u32) -> EngineResult<()> {
    let mut ids = Vec::with_capacity(count as usize);
    for i in 0..count {
        let angle = TAU * i as f32 / count.max(1) as f32 + PI / 4.0;
        let position = Vector3::new(angle.cos(), angle.sin(), 0.0) * RING_RADIUS;
        engine.create_source_at(SourceId(i), position)?;
        ids.push(SourceId(i));
    }
    engine.create_macro(DEMO_MACRO, &ids)
}

fn setup_scenario(engine: &mut Engine, scenario: Scenario) -> EngineResult<()> {
    match scenario {
        Scenario::Rotate => {
            engine.set_manual_macro_rotation(DEMO_MACRO, Vector3::new(PI, 0.0, 0.0), 0.05, None)
        }
        Scenario::Concentrate => engine.set_concentration(
            DEMO_MACRO,
            None,
            0.0,
            Some(2.0),
            Some(ConcentrationCurve::EaseInOut),
        ),
        Scenario::Orbit => {
            engine.set_macro_trajectory(
                DEMO_MACRO,
                TrajectoryShape::Circle,
                ShapeParams::default().with_radius(2.0),
                PlaybackMode::Fix,
                0.1,
            )?;
            engine.set_macro_rotation(DEMO_MACRO, Vector3::new(0.0, 0.0, 0.5), None)?;
            engine.set_macro_trajectory_follow_centroid(DEMO_MACRO, true)
        }
    }
}

/// Stand-in for the downstream renderer: consumes frames until the engine
/// drops its sender.
fn renderer_thread(rx_frame: Receiver<RenderFrame>) -> u64 {
    let mut received = 0;
    for frame in rx_frame.iter() {
        received += 1;
        if frame.tick % 60 == 0 {
            for source in &frame.sources {
                debug!(
                    "tick {} source {}: pos=({:.2}, {:.2}, {:.2}) yaw={:.2}",
                    frame.tick,
                    source.id,
                    source.position.x,
                    source.position.y,
                    source.position.z,
                    source.orientation.x
                );
            }
        }
    }
    received
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = EngineConfig::with_path(&cli.config);
    if let Err(e) = config.load_from_file() {
        info!("{}; using defaults", e);
    }
    let renderer_enabled = config.renderer_enabled;
    let queue_capacity = config.queue_capacity;
    let period = config.tick_period();

    let mut engine = Engine::new(config);

    let renderer = renderer_enabled.then(|| {
        let rx_frame = engine.attach_renderer(queue_capacity);
        thread::spawn(move || renderer_thread(rx_frame))
    });

    if let Err(e) = setup_ring(&mut engine, cli.sources)
        .and_then(|_| setup_scenario(&mut engine, cli.scenario))
    {
        error!("Setup failed: {}", e);
        std::process::exit(1);
    }

    info!(
        "Running {:?} scenario with {} sources for {}s",
        cli.scenario, cli.sources, cli.seconds
    );
    engine.start();
    let ticks = (cli.seconds.max(0.0) / period).round() as u64;
    for _ in 0..ticks {
        engine.update(Some(period));
        if cli.realtime {
            thread::sleep(Duration::from_secs_f32(period));
        }
    }
    engine.stop();

    let frame = engine.snapshot();
    for source in &frame.sources {
        info!(
            "source {}: ({:.3}, {:.3}, {:.3})",
            source.id, source.position.x, source.position.y, source.position.z
        );
    }
    if cli.dump_json {
        match serde_json::to_string_pretty(&frame) {
            Ok(json) => println!("{}", json),
            Err(e) => error!("Failed to serialize frame: {}", e),
        }
    }

    let dropped = engine.renderer().map(|bridge| bridge.dropped).unwrap_or(0);
    engine.detach_renderer();
    if let Some(handle) = renderer {
        match handle.join() {
            Ok(received) => info!("Renderer received {} frames ({} dropped)", received, dropped),
            Err(_) => error!("Renderer thread panicked"),
        }
    }
}

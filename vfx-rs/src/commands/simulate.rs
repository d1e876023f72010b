//! Headless simulation command
//!
//! Runs one instance of an effect on an emitter moving along +X, sampling
//! pool statistics as it goes. Output is either a table of samples or a JSON
//! summary that includes the final frame's render batch.

use anyhow::{Context, Result, bail};
use clap::Args;
use glam::Vec3;
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use vfx_particles::{
    Camera, DefinitionLibrary, EmitterTransform, EntityId, ParticleManager, RenderBatch,
    SeededRandom, SimulationSettings,
};

use crate::loader::{effect_name, load_definition};
use crate::utils::{add_table_row, create_progress_bar, create_table};

const EMITTER: EntityId = EntityId(1);

#[derive(Args, Debug, Clone)]
pub struct SimulateArgs {
    /// Path to the definition (.json, .yaml or .yml)
    pub file: PathBuf,

    /// Number of frames to simulate
    #[arg(short, long, default_value_t = 120)]
    pub frames: u32,

    /// Frame length in seconds
    #[arg(long, default_value_t = 1.0 / 60.0)]
    pub dt: f32,

    /// Seed for the random source
    #[arg(short, long, default_value_t = 42)]
    pub seed: u64,

    /// Emitter speed along +X in units per second
    #[arg(long, default_value_t = 0.0)]
    pub speed: f32,

    /// Wind velocity along +X in units per second
    #[arg(long, default_value_t = 0.0)]
    pub wind: f32,

    /// Start a fade-out at this time (seconds)
    #[arg(long)]
    pub fade_at: Option<f32>,

    /// Length of the fade-out in seconds
    #[arg(long, default_value_t = 1.0, requires = "fade_at")]
    pub fade_duration: f32,

    /// Frames between table rows
    #[arg(short, long, default_value_t = 10)]
    pub interval: u32,

    /// Print a JSON summary instead of a table
    #[arg(long)]
    pub json: bool,
}

/// Pool statistics at one frame
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FrameSample {
    pub frame: u32,
    pub time: f32,
    pub alive: usize,
    pub emitted: u64,
    /// A fade-out has been requested
    pub fading: bool,
    pub fade_ratio: f32,
}

/// Result of a headless run
#[derive(Debug, Serialize)]
pub struct SimulationReport {
    pub effect: String,
    pub seed: u64,
    pub frames_run: u32,
    pub simulated_seconds: f32,
    /// The instance reported termination before the last frame
    pub finished: bool,
    pub peak_alive: usize,
    pub emitted: u64,
    pub final_alive: usize,
    pub final_fade_ratio: f32,
    pub samples: Vec<FrameSample>,
    /// Render output of the last simulated frame
    pub batch: Option<RenderBatch>,
}

pub fn execute(args: &SimulateArgs, quiet: bool) -> Result<()> {
    if !(args.dt.is_finite() && args.dt > 0.0) {
        bail!("--dt must be a positive number of seconds, got {}", args.dt);
    }

    let report = run(args, args.json || quiet)?;

    if args.json {
        let json = serde_json::to_string_pretty(&report)
            .context("Failed to serialize simulation report")?;
        println!("{json}");
    } else {
        print_report(&report);
    }
    Ok(())
}

/// Simulate the definition named by `args.file`
pub fn run(args: &SimulateArgs, hide_progress: bool) -> Result<SimulationReport> {
    let path = args.file.as_path();
    let name = effect_name(path);
    let definition = load_definition(path)?;

    let mut library = DefinitionLibrary::new();
    let slot = library
        .insert(name.clone(), definition)
        .with_context(|| format!("{} is not a valid particle definition", path.display()))?;

    let mut scene = HashMap::from([(EMITTER, EmitterTransform::default())]);
    let mut manager =
        ParticleManager::with_rng(SimulationSettings::default(), SeededRandom::new(args.seed));
    manager.set_wind_velocity(Vec3::new(args.wind, 0.0, 0.0));
    let handle = manager.launch(&slot, EMITTER, &scene);
    let camera = Camera::default();

    let interval = args.interval.max(1);
    let pb = create_progress_bar(u64::from(args.frames), "Simulating", hide_progress);

    let mut report = SimulationReport {
        effect: name,
        seed: args.seed,
        frames_run: 0,
        simulated_seconds: 0.0,
        finished: false,
        peak_alive: 0,
        emitted: 0,
        final_alive: 0,
        final_fade_ratio: 1.0,
        samples: Vec::new(),
        batch: None,
    };
    let mut fade_started = false;

    for frame in 1..=args.frames {
        let time = frame as f32 * args.dt;
        if let Some(emitter) = scene.get_mut(&EMITTER) {
            emitter.translation.x = args.speed * time;
        }

        if let Some(fade_at) = args.fade_at
            && !fade_started
            && time >= fade_at
        {
            manager.fade_out(handle, args.fade_duration)?;
            fade_started = true;
            log::info!("Fading out over {:.2}s at t={time:.2}s", args.fade_duration);
        }

        manager.update(args.dt, &scene);
        report.frames_run = frame;
        report.simulated_seconds = time;
        pb.inc(1);

        let Some(instance) = manager.instance(handle) else {
            report.finished = true;
            report.final_alive = 0;
            log::info!("Effect finished after {frame} frames");
            break;
        };

        let sample = FrameSample {
            frame,
            time,
            alive: instance.len(),
            emitted: instance.emitted_total(),
            fading: instance.is_fading(),
            fade_ratio: instance.fade_ratio(),
        };
        report.peak_alive = report.peak_alive.max(sample.alive);
        report.emitted = sample.emitted;
        report.final_alive = sample.alive;
        report.final_fade_ratio = sample.fade_ratio;
        if frame % interval == 0 || frame == args.frames {
            report.samples.push(sample);
        }
    }
    pb.finish_and_clear();

    report.batch = manager.render(&camera, &scene).into_iter().next();
    Ok(report)
}

fn print_report(report: &SimulationReport) {
    println!("Simulating: {} (seed {})", report.effect, report.seed);
    println!();

    let mut table = create_table(&["Frame", "Time", "Alive", "Emitted", "Fade"]);
    for sample in &report.samples {
        add_table_row(
            &mut table,
            vec![
                sample.frame.to_string(),
                format!("{:.2}s", sample.time),
                sample.alive.to_string(),
                sample.emitted.to_string(),
                if sample.fading {
                    format!("{:.2}", sample.fade_ratio)
                } else {
                    "-".to_string()
                },
            ],
        );
    }
    table.printstd();

    println!();
    println!(
        "Frames: {} ({:.2}s simulated)",
        report.frames_run, report.simulated_seconds
    );
    println!("Peak particles: {}", report.peak_alive);
    println!("Total emitted: {}", report.emitted);
    if report.finished {
        println!("✓ Effect finished");
    } else {
        println!("Effect still running ({} particles alive)", report.final_alive);
    }
}

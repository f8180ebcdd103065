//! Tick a preset and report what the emitters hold

use anyhow::{Context, Result, bail};
use clap::Args;
use fx_particles::{ParticleSystemInstance, TickStats};

use crate::presets::Preset;
use crate::utils::{ReportTable, format_bytes, format_fill};

#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Preset particle system to run
    #[arg(value_enum)]
    pub preset: Preset,

    /// Number of ticks to run
    #[arg(short = 'n', long, default_value_t = 120)]
    pub ticks: u32,

    /// Seconds per tick
    #[arg(long, default_value_t = 1.0 / 30.0)]
    pub dt: f32,

    /// Seed for the emitter random streams
    #[arg(short, long, default_value_t = 0, env = "FXSIM_SEED")]
    pub seed: u64,

    /// Particle capacity of every emitter
    #[arg(short, long, default_value_t = 512)]
    pub max_particles: usize,

    /// LOD level every emitter runs at
    #[arg(long, default_value_t = 0)]
    pub lod: usize,

    /// Blend toward this lower LOD level while ticking
    #[arg(long)]
    pub preview: Option<usize>,

    /// Weight of the active LOD when previewing
    #[arg(long, default_value_t = 0.5, requires = "preview")]
    pub alpha: f32,

    /// Print particle counts after every tick
    #[arg(long)]
    pub trace: bool,
}

pub fn execute(args: &SimulateArgs) -> Result<()> {
    if args.dt.is_nan() || args.dt <= 0.0 {
        bail!("Tick length must be positive, got {}", args.dt);
    }

    let system = args.preset.build(args.max_particles);
    let mut instance = ParticleSystemInstance::new(&system, args.seed)
        .with_context(|| format!("Failed to instantiate preset {:?}", args.preset))?;

    instance
        .set_lod(args.lod)
        .with_context(|| format!("Failed to switch to LOD {}", args.lod))?;
    if let Some(lower) = args.preview {
        for template in &system.emitters {
            instance
                .emitter_mut(&template.name)?
                .set_lod_preview(lower, args.alpha)
                .with_context(|| {
                    format!("Failed to preview LOD {} on '{}'", lower, template.name)
                })?;
        }
    }

    log::info!(
        "Running {} ticks of {}s on '{}'",
        args.ticks,
        args.dt,
        instance.name()
    );

    let mut totals = TickStats::default();
    for tick in 0..args.ticks {
        let stats = instance.tick(args.dt);
        totals.spawned += stats.spawned;
        totals.killed += stats.killed;
        totals.active = stats.active;
        if args.trace {
            println!(
                "tick {:>5}: +{:<4} -{:<4} active {}",
                tick + 1,
                stats.spawned,
                stats.killed,
                stats.active
            );
        }
    }

    println!(
        "Simulated '{}' for {:.2}s ({} ticks)",
        instance.name(),
        args.dt * args.ticks as f32,
        args.ticks
    );

    let mut table = ReportTable::new(&[
        "Emitter", "LOD", "Active", "Fill", "Stride", "Store", "Loops", "Time",
    ]);
    for emitter in instance.emitters() {
        let lod = match emitter.lod_preview() {
            Some(preview) => format!(
                "{} -> {} ({:.2})",
                emitter.lod_index(),
                preview.lower,
                preview.alpha
            ),
            None => emitter.lod_index().to_string(),
        };
        let store = emitter.store();
        let status = if emitter.is_finished() {
            format!("{} (done)", emitter.loops_completed())
        } else {
            emitter.loops_completed().to_string()
        };
        table.push([
            emitter.name().to_string(),
            lod,
            emitter.active_count().to_string(),
            format_fill(emitter.active_count(), store.capacity()),
            store.stride().to_string(),
            format_bytes(store.stride() * store.capacity()),
            status,
            format!("{:.3}", emitter.emitter_time()),
        ]);
    }
    table.print();

    println!("\nSummary:");
    println!("  Spawned: {}", totals.spawned);
    println!("  Killed:  {}", totals.killed);
    println!("  Active:  {}", totals.active);
    Ok(())
}

//! Fuse preset emitters into uber modules

use std::sync::Arc;

use anyhow::{Result, bail};
use clap::Args;
use fx_particles::{
    EmitterInstance, ParticleEmitter, PayloadLayout, TickEnvironment, compact_emitter,
};

use crate::presets::Preset;
use crate::utils::ReportTable;

#[derive(Args, Debug)]
pub struct CompactArgs {
    /// Preset particle system to compact
    #[arg(value_enum)]
    pub preset: Preset,

    /// Tick fused and unfused copies this many times and compare them
    #[arg(long, value_name = "TICKS")]
    pub verify: Option<u32>,

    /// Seed for the verification runs
    #[arg(short, long, default_value_t = 0, env = "FXSIM_SEED")]
    pub seed: u64,

    /// Largest allowed location difference between the two runs
    #[arg(long, default_value_t = 1e-4)]
    pub tolerance: f32,
}

pub fn execute(args: &CompactArgs) -> Result<()> {
    let system = args.preset.build(256);

    let mut table = ReportTable::new(&["Emitter", "Result", "Modules", "Stride"]);
    let mut fused = Vec::new();
    for template in &system.emitters {
        let mut emitter = ParticleEmitter::clone(template);
        let modules_before = emitter.lods.first().map_or(0, |lod| lod.modules.len());
        let stride_before = emitter
            .lods
            .first()
            .map_or(0, |lod| PayloadLayout::compute(lod).stride());

        match compact_emitter(&mut emitter) {
            Ok(kind) => {
                let stride_after = emitter
                    .lods
                    .first()
                    .map_or(0, |lod| PayloadLayout::compute(lod).stride());
                table.push([
                    emitter.name.clone(),
                    kind.to_string(),
                    format!("{modules_before} -> 1"),
                    format!("{stride_before} -> {stride_after}"),
                ]);
                fused.push((Arc::clone(template), Arc::new(emitter)));
            }
            Err(e) => {
                log::debug!("{e}");
                table.push([
                    emitter.name.clone(),
                    "not fusable".to_string(),
                    modules_before.to_string(),
                    stride_before.to_string(),
                ]);
            }
        }
    }
    table.print();

    if fused.is_empty() {
        println!("\nNo emitter of this preset matches an uber module.");
        return Ok(());
    }

    if let Some(ticks) = args.verify {
        println!("\nVerification ({ticks} ticks):");
        for (flat, uber) in fused {
            let name = flat.name.clone();
            let deviation = compare_runs(flat, uber, ticks, args.seed)?;
            if deviation > args.tolerance {
                bail!(
                    "Fused emitter '{name}' diverged by {deviation} (tolerance {})",
                    args.tolerance
                );
            }
            println!("  {name}: OK (max location difference {deviation:e})");
        }
    }
    Ok(())
}

/// Tick both emitters in lockstep; returns the largest location difference
fn compare_runs(
    flat: Arc<ParticleEmitter>,
    uber: Arc<ParticleEmitter>,
    ticks: u32,
    seed: u64,
) -> Result<f32> {
    let name = flat.name.clone();
    let mut flat = EmitterInstance::new(flat, seed)?;
    let mut uber = EmitterInstance::new(uber, seed)?;
    let env = TickEnvironment::isolated();

    let mut deviation = 0.0_f32;
    for tick in 0..ticks {
        flat.tick(1.0 / 30.0, &env);
        uber.tick(1.0 / 30.0, &env);
        if flat.active_count() != uber.active_count() {
            bail!(
                "Emitter '{}' diverged at tick {}: {} particles unfused, {} fused",
                name,
                tick + 1,
                flat.active_count(),
                uber.active_count()
            );
        }
        deviation = flat
            .particles()
            .zip(uber.particles())
            .map(|(a, b)| a.location.distance(b.location))
            .fold(deviation, f32::max);
    }
    log::info!("Emitter '{name}' matches its fused copy over {ticks} ticks");
    Ok(deviation)
}

//! Show where every module keeps its per-particle data

use anyhow::{Context, Result};
use clap::Args;
use fx_particles::particle::InstanceLayout;
use fx_particles::{ParticleEmitter, PayloadLayout, SubImageMethod};

use crate::presets::Preset;
use crate::utils::{ReportTable, format_bytes, format_range};

#[derive(Args, Debug)]
pub struct LayoutArgs {
    /// Preset particle system to inspect
    #[arg(value_enum)]
    pub preset: Preset,

    /// Only show this emitter
    #[arg(short, long)]
    pub emitter: Option<String>,

    /// LOD level to lay out
    #[arg(long, default_value_t = 0)]
    pub lod: usize,

    /// Particle capacity used for the store size
    #[arg(short, long, default_value_t = 512)]
    pub max_particles: usize,
}

pub fn execute(args: &LayoutArgs) -> Result<()> {
    let system = args.preset.build(args.max_particles);
    let emitters: Vec<&ParticleEmitter> = match &args.emitter {
        Some(name) => vec![
            system
                .emitter(name)
                .map(AsRef::as_ref)
                .with_context(|| format!("Preset has no emitter named '{name}'"))?,
        ],
        None => system.emitters.iter().map(AsRef::as_ref).collect(),
    };

    for emitter in emitters {
        show_emitter(emitter, args.lod)?;
    }
    Ok(())
}

fn show_emitter(emitter: &ParticleEmitter, lod_index: usize) -> Result<()> {
    let lod = emitter.lod(lod_index).with_context(|| {
        format!(
            "Emitter '{}' has {} LOD levels, no LOD {}",
            emitter.name,
            emitter.lod_count(),
            lod_index
        )
    })?;
    let layout = PayloadLayout::compute(lod);
    let instance = InstanceLayout::compute(&lod.modules);

    println!("\nEmitter '{}' (LOD {}):", emitter.name, lod_index);

    let mut table = ReportTable::new(&["#", "Module", "Payload", "Instance"]);
    for (index, module) in lod.modules.iter().enumerate() {
        let payload = layout
            .range(index)
            .map_or_else(|| "-".to_string(), |r| format_range(r.offset, r.len));
        let scratch = instance
            .range(index)
            .map_or_else(|| "-".to_string(), |r| format_range(r.offset, r.len));
        table.push([index.to_string(), module.kind().to_string(), payload, scratch]);
    }
    if let Some(range) = layout.sub_image() {
        // No instance column for the emitter-owned record
        table.push([
            "-".to_string(),
            format!("SubImage ({:?})", lod.required.sub_image_method),
            format_range(range.offset, range.len),
        ]);
    }
    table.print();

    println!("  Base record:   {} bytes", layout.base_size());
    println!("  Payload:       {} bytes", layout.payload_size());
    println!("  Stride:        {} bytes", layout.stride());
    println!("  Instance data: {} bytes", instance.total());
    if lod.required.sub_image_method != SubImageMethod::None {
        println!(
            "  Sub-images:    {}x{}",
            lod.required.sub_images_horizontal, lod.required.sub_images_vertical
        );
    }
    println!(
        "  Store:         {} for {} particles",
        format_bytes(layout.stride() * emitter.max_particles),
        emitter.max_particles
    );
    Ok(())
}

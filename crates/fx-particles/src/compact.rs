//! Offline fusion of common module sequences into uber modules
//!
//! An emitter whose every LOD level lists exactly the modules of a known
//! sequence can have them replaced by one uber module, which walks the
//! module list once instead of several times per particle.

use crate::emitter::{LodLevel, ParticleEmitter};
use crate::error::{ParticleError, Result};
use crate::module::{ModuleKind, ParticleModule, UberLtisivclModule, UberLtisivclilModule};

/// Uber module types the compactor can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UberKind {
    /// Lifetime, Size, Velocity, ColorOverLife
    Ltisivcl,
    /// Lifetime, Size, Velocity, ColorOverLife, Location
    Ltisivclil,
}

impl UberKind {
    pub const ALL: [Self; 2] = [Self::Ltisivcl, Self::Ltisivclil];

    /// Module list an LOD level must have, in order, to be fused
    pub fn sequence(self) -> &'static [ModuleKind] {
        match self {
            Self::Ltisivcl => &[
                ModuleKind::Lifetime,
                ModuleKind::Size,
                ModuleKind::Velocity,
                ModuleKind::ColorOverLife,
            ],
            Self::Ltisivclil => &[
                ModuleKind::Lifetime,
                ModuleKind::Size,
                ModuleKind::Velocity,
                ModuleKind::ColorOverLife,
                ModuleKind::Location,
            ],
        }
    }

    /// Tag of the fused module
    pub fn module_kind(self) -> ModuleKind {
        match self {
            Self::Ltisivcl => ModuleKind::UberLtisivcl,
            Self::Ltisivclil => ModuleKind::UberLtisivclil,
        }
    }

    /// Whether `modules` is exactly this uber module's sequence
    pub fn is_compatible(self, modules: &[ParticleModule]) -> bool {
        let sequence = self.sequence();
        modules.len() == sequence.len()
            && modules
                .iter()
                .zip(sequence)
                .all(|(module, kind)| module.kind() == *kind)
    }

    /// Build the fused module from copies of the matched modules
    fn fuse(self, modules: &[ParticleModule]) -> Option<ParticleModule> {
        use ParticleModule as M;

        match (self, modules) {
            (
                Self::Ltisivcl,
                [
                    M::Lifetime(lifetime),
                    M::Size(size),
                    M::Velocity(velocity),
                    M::ColorOverLife(color),
                ],
            ) => Some(
                UberLtisivclModule {
                    lifetime: lifetime.clone(),
                    size: size.clone(),
                    velocity: velocity.clone(),
                    color: color.clone(),
                }
                .into(),
            ),
            (
                Self::Ltisivclil,
                [
                    M::Lifetime(lifetime),
                    M::Size(size),
                    M::Velocity(velocity),
                    M::ColorOverLife(color),
                    M::Location(location),
                ],
            ) => Some(
                UberLtisivclilModule {
                    lifetime: lifetime.clone(),
                    size: size.clone(),
                    velocity: velocity.clone(),
                    color: color.clone(),
                    location: location.clone(),
                }
                .into(),
            ),
            _ => None,
        }
    }
}

impl std::fmt::Display for UberKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.module_kind().name())
    }
}

/// First uber kind every LOD level of `emitter` is compatible with
pub fn find_compatible(emitter: &ParticleEmitter) -> Option<UberKind> {
    if emitter.lods.is_empty() {
        return None;
    }
    UberKind::ALL.into_iter().find(|kind| {
        emitter
            .lods
            .iter()
            .all(|lod| kind.is_compatible(&lod.modules))
    })
}

fn mismatch(
    emitter: &ParticleEmitter,
    kind: UberKind,
    index: usize,
    lod: &LodLevel,
) -> ParticleError {
    ParticleError::UberIncompatible {
        emitter: emitter.name.clone(),
        uber: Some(kind.module_kind()),
        reason: format!(
            "LOD {} has modules {:?}, expected {:?}",
            index,
            lod.module_kinds(),
            kind.sequence()
        ),
    }
}

/// Replace the module list of every LOD level with one `kind` uber module
///
/// Either every level is converted or, on error, the emitter is left
/// untouched.
pub fn convert_to_uber_module(emitter: &mut ParticleEmitter, kind: UberKind) -> Result<()> {
    if emitter.lods.is_empty() {
        return Err(ParticleError::NoLodLevels(emitter.name.clone()));
    }

    let fused = emitter
        .lods
        .iter()
        .enumerate()
        .map(|(index, lod)| {
            kind.fuse(&lod.modules)
                .ok_or_else(|| mismatch(emitter, kind, index, lod))
        })
        .collect::<Result<Vec<_>>>()?;

    for (lod, module) in emitter.lods.iter_mut().zip(fused) {
        lod.modules = vec![module];
    }
    log::debug!(
        "Fused {} LOD levels of emitter '{}' into {}",
        emitter.lods.len(),
        emitter.name,
        kind
    );
    Ok(())
}

/// Fuse `emitter` into whichever uber module fits it
pub fn compact_emitter(emitter: &mut ParticleEmitter) -> Result<UberKind> {
    let Some(kind) = find_compatible(emitter) else {
        let kinds = emitter
            .lods
            .first()
            .map(LodLevel::module_kinds)
            .unwrap_or_default();
        return Err(ParticleError::UberIncompatible {
            emitter: emitter.name.clone(),
            uber: None,
            reason: format!("no uber module matches modules {:?}", kinds),
        });
    };
    convert_to_uber_module(emitter, kind)?;
    log::info!("Compacted emitter '{}' into {}", emitter.name, kind);
    Ok(kind)
}

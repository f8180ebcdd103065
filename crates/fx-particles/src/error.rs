use thiserror::Error;

use crate::module::ModuleKind;

/// Error types for emitter construction, LOD control and compaction
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParticleError {
    /// The emitter template has no LOD levels to simulate
    #[error("Emitter '{0}' has no LOD levels")]
    NoLodLevels(String),

    /// An LOD index outside the emitter's level list
    #[error("Invalid LOD index {index}: emitter has {count} levels")]
    InvalidLod { index: usize, count: usize },

    /// Two LOD levels cannot be blended because their module lists differ structurally
    #[error(
        "LOD mismatch at module {module_index}: {primary:?} cannot be blended with {lower:?}"
    )]
    LodMismatch {
        module_index: usize,
        primary: Option<ModuleKind>,
        lower: Option<ModuleKind>,
    },

    /// Sub-image atlas dimensions must both be non-zero
    #[error("Invalid sub-image grid {horizontal}x{vertical}")]
    InvalidSubImageGrid { horizontal: u32, vertical: u32 },

    /// The particle store needs room for at least one particle
    #[error("Invalid particle capacity: {0}")]
    InvalidMaxParticles(usize),

    /// No uber module matches the emitter's module sequence
    #[error("Emitter '{emitter}' cannot be fused into {uber:?}: {reason}")]
    UberIncompatible {
        emitter: String,
        uber: Option<ModuleKind>,
        reason: String,
    },

    /// A particle system lookup by emitter name failed
    #[error("Unknown emitter: {0}")]
    UnknownEmitter(String),
}

/// Result type using ParticleError
pub type Result<T> = std::result::Result<T, ParticleError>;

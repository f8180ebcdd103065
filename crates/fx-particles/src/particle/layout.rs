//! Per-particle and per-instance payload layout

use std::ops::Range;

use super::{BASE_PARTICLE_SIZE, SubImageRecord};
use crate::emitter::{LodLevel, SubImageMethod};
use crate::module::ParticleModule;

/// Size of the emitter-owned sub-image record
pub const SUB_IMAGE_PAYLOAD_SIZE: usize = std::mem::size_of::<SubImageRecord>();

/// Byte range inside the payload region (or the instance block)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PayloadRange {
    pub offset: usize,
    pub len: usize,
}

impl PayloadRange {
    pub fn end(&self) -> usize {
        self.offset + self.len
    }

    pub fn as_range(&self) -> Range<usize> {
        self.offset..self.end()
    }
}

/// Round a record size up so consecutive base records stay word aligned
pub fn align_stride(bytes: usize) -> usize {
    bytes.next_multiple_of(4)
}

/// Assign consecutive ranges to a list of byte requirements
///
/// Zero-byte requirements get no range and do not move later offsets.
fn assign_ranges(
    requirements: impl IntoIterator<Item = usize>,
) -> (Vec<Option<PayloadRange>>, usize) {
    let mut offset = 0;
    let ranges = requirements
        .into_iter()
        .map(|len| {
            if len == 0 {
                return None;
            }
            let range = PayloadRange { offset, len };
            offset += len;
            Some(range)
        })
        .collect();
    (ranges, offset)
}

/// Per-particle payload layout of one LOD level
///
/// Offsets are relative to the start of the payload region, which directly
/// follows the base record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadLayout {
    ranges: Vec<Option<PayloadRange>>,
    sub_image: Option<PayloadRange>,
    payload_size: usize,
    stride: usize,
}

impl PayloadLayout {
    /// Compute the layout for a LOD level's module list
    ///
    /// Module ranges come first in list order. When the level interpolates
    /// sub-images, one emitter-owned sub-image record follows them.
    pub fn compute(lod: &LodLevel) -> Self {
        let requirements = lod
            .modules
            .iter()
            .map(|module| module.required_bytes(&lod.required));
        let layout = Self::from_requirements(
            requirements,
            lod.required.sub_image_method != SubImageMethod::None,
        );
        log::debug!(
            "Computed payload layout: {} module ranges, {} payload bytes, stride {}",
            layout.ranges.iter().flatten().count(),
            layout.payload_size,
            layout.stride
        );
        layout
    }

    /// Build a layout from raw byte requirements in module order
    pub fn from_requirements(
        requirements: impl IntoIterator<Item = usize>,
        with_sub_image: bool,
    ) -> Self {
        let (ranges, mut payload_size) = assign_ranges(requirements);

        let sub_image = with_sub_image.then(|| {
            let range = PayloadRange {
                offset: payload_size,
                len: SUB_IMAGE_PAYLOAD_SIZE,
            };
            payload_size += SUB_IMAGE_PAYLOAD_SIZE;
            range
        });

        Self {
            ranges,
            sub_image,
            payload_size,
            stride: align_stride(BASE_PARTICLE_SIZE + payload_size),
        }
    }

    /// Range assigned to the module at `module_index`, if it asked for bytes
    pub fn range(&self, module_index: usize) -> Option<PayloadRange> {
        self.ranges.get(module_index).copied().flatten()
    }

    pub fn ranges(&self) -> &[Option<PayloadRange>] {
        &self.ranges
    }

    /// Range of the emitter-owned sub-image record
    pub fn sub_image(&self) -> Option<PayloadRange> {
        self.sub_image
    }

    /// Total payload bytes (module ranges plus the sub-image record)
    pub fn payload_size(&self) -> usize {
        self.payload_size
    }

    /// Bytes per particle record, base record included
    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn base_size(&self) -> usize {
        BASE_PARTICLE_SIZE
    }
}

/// Per-instance scratch layout of one LOD level
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InstanceLayout {
    ranges: Vec<Option<PayloadRange>>,
    total: usize,
}

impl InstanceLayout {
    pub fn compute(modules: &[ParticleModule]) -> Self {
        Self::from_requirements(modules.iter().map(ParticleModule::required_instance_bytes))
    }

    pub fn from_requirements(requirements: impl IntoIterator<Item = usize>) -> Self {
        let (ranges, total) = assign_ranges(requirements);
        Self { ranges, total }
    }

    pub fn range(&self, module_index: usize) -> Option<PayloadRange> {
        self.ranges.get(module_index).copied().flatten()
    }

    pub fn ranges(&self) -> &[Option<PayloadRange>] {
        &self.ranges
    }

    pub fn total(&self) -> usize {
        self.total
    }
}

//! Fixed-stride particle storage

use bytemuck::Pod;

use super::{BASE_PARTICLE_SIZE, Particle, ParticleFlags};

/// Mutable view of one particle: base record plus its payload region
#[derive(Debug)]
pub struct ParticleRecord<'a> {
    pub particle: &'a mut Particle,
    pub payload: &'a mut [u8],
}

/// Read a plain-old-data value from the start of a payload slice
///
/// Returns None when the slice is too short.
pub fn read_payload<T: Pod>(bytes: &[u8]) -> Option<T> {
    bytes
        .get(..std::mem::size_of::<T>())
        .map(bytemuck::pod_read_unaligned)
}

/// Write a plain-old-data value to the start of a payload slice
///
/// Returns false (and writes nothing) when the slice is too short.
pub fn write_payload<T: Pod>(bytes: &mut [u8], value: &T) -> bool {
    let source = bytemuck::bytes_of(value);
    match bytes.get_mut(..source.len()) {
        Some(target) => {
            target.copy_from_slice(source);
            true
        }
        None => false,
    }
}

/// Contiguous particle buffer with an active-slot index list
///
/// Records live in fixed slots for their whole life; `indices[..active]` lists
/// the live slots in spawn order and the remainder lists free slots. Removal
/// keeps the relative order of the survivors.
#[derive(Debug, Clone)]
pub struct ParticleStore {
    data: Vec<u32>,
    stride: usize,
    capacity: usize,
    indices: Vec<u32>,
    active: usize,
    next_serial: u32,
}

impl ParticleStore {
    /// Create a store for `capacity` records of `stride` bytes
    ///
    /// `stride` must be a multiple of four and at least the base record size.
    pub fn new(stride: usize, capacity: usize) -> Self {
        debug_assert!(stride % 4 == 0 && stride >= BASE_PARTICLE_SIZE);
        Self {
            data: vec![0; stride / 4 * capacity],
            stride,
            capacity,
            indices: (0..capacity as u32).collect(),
            active: 0,
            next_serial: 1,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn active_count(&self) -> usize {
        self.active
    }

    pub fn is_full(&self) -> bool {
        self.active >= self.capacity
    }

    /// Slot of the live particle at `active_index`
    pub fn slot(&self, active_index: usize) -> Option<u32> {
        self.indices[..self.active].get(active_index).copied()
    }

    /// Live slots in spawn order
    pub fn active_slots(&self) -> &[u32] {
        &self.indices[..self.active]
    }

    fn bytes(&self, slot: u32) -> Option<&[u8]> {
        let start = slot as usize * self.stride;
        let bytes: &[u8] = bytemuck::cast_slice(&self.data);
        bytes.get(start..start + self.stride)
    }

    fn bytes_mut(&mut self, slot: u32) -> Option<&mut [u8]> {
        let start = slot as usize * self.stride;
        let bytes: &mut [u8] = bytemuck::cast_slice_mut(&mut self.data);
        bytes.get_mut(start..start + self.stride)
    }

    /// Base record of a slot
    pub fn particle(&self, slot: u32) -> Option<&Particle> {
        self.bytes(slot)
            .map(|bytes| bytemuck::from_bytes(&bytes[..BASE_PARTICLE_SIZE]))
    }

    pub fn particle_mut(&mut self, slot: u32) -> Option<&mut Particle> {
        self.bytes_mut(slot)
            .map(|bytes| bytemuck::from_bytes_mut(&mut bytes[..BASE_PARTICLE_SIZE]))
    }

    /// Payload region of a slot
    pub fn payload(&self, slot: u32) -> Option<&[u8]> {
        self.bytes(slot).map(|bytes| &bytes[BASE_PARTICLE_SIZE..])
    }

    /// Base record and payload of a slot, borrowed together
    pub fn record_mut(&mut self, slot: u32) -> Option<ParticleRecord<'_>> {
        self.bytes_mut(slot).map(|bytes| {
            let (base, payload) = bytes.split_at_mut(BASE_PARTICLE_SIZE);
            ParticleRecord {
                particle: bytemuck::from_bytes_mut(base),
                payload,
            }
        })
    }

    /// Base record of the live particle at `active_index`
    pub fn active_particle(&self, active_index: usize) -> Option<&Particle> {
        self.slot(active_index).and_then(|slot| self.particle(slot))
    }

    /// Base record of a slot if it still holds the particle with `serial`
    pub fn live_particle(&self, slot: u32, serial: u32) -> Option<&Particle> {
        self.particle(slot)
            .filter(|p| p.is_alive() && !p.is_kill_pending() && p.serial == serial)
    }

    /// Iterate live particles in spawn order
    pub fn iter(&self) -> impl Iterator<Item = &Particle> + '_ {
        self.active_slots()
            .iter()
            .filter_map(|&slot| self.particle(slot))
    }

    /// Claim a free slot, zero its record and mark it alive
    pub fn allocate(&mut self) -> Option<u32> {
        if self.is_full() {
            return None;
        }
        let slot = self.indices[self.active];
        self.active += 1;

        let serial = self.next_serial;
        self.next_serial = self.next_serial.wrapping_add(1).max(1);

        let bytes = self.bytes_mut(slot)?;
        bytes.fill(0);
        let particle: &mut Particle = bytemuck::from_bytes_mut(&mut bytes[..BASE_PARTICLE_SIZE]);
        particle.serial = serial;
        particle.set_flags(ParticleFlags::ALIVE);
        Some(slot)
    }

    /// Flag a slot for removal at the next [`compact`](Self::compact)
    pub fn request_kill(&mut self, slot: u32) {
        if let Some(particle) = self.particle_mut(slot) {
            if particle.is_alive() {
                particle.set_flags(particle.flags() | ParticleFlags::KILL_PENDING);
            }
        }
    }

    /// Remove the live particle at `active_index` immediately
    pub fn remove(&mut self, active_index: usize) -> bool {
        if active_index >= self.active {
            return false;
        }
        let slot = self.indices[active_index];
        self.indices[active_index..self.active].rotate_left(1);
        self.active -= 1;
        if let Some(particle) = self.particle_mut(slot) {
            particle.set_flags(ParticleFlags::empty());
        }
        true
    }

    /// Remove every particle flagged for removal, keeping survivor order
    ///
    /// Returns the number of particles removed.
    pub fn compact(&mut self) -> usize {
        let mut write = 0;
        for read in 0..self.active {
            let slot = self.indices[read];
            let pending = self.particle(slot).is_some_and(Particle::is_kill_pending);
            if pending {
                if let Some(particle) = self.particle_mut(slot) {
                    particle.set_flags(ParticleFlags::empty());
                }
            } else {
                self.indices.swap(write, read);
                write += 1;
            }
        }
        let removed = self.active - write;
        self.active = write;
        removed
    }

    /// Remove every particle
    pub fn clear(&mut self) {
        for i in 0..self.active {
            let slot = self.indices[i];
            if let Some(particle) = self.particle_mut(slot) {
                particle.set_flags(ParticleFlags::empty());
            }
        }
        self.active = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn store(capacity: usize) -> ParticleStore {
        ParticleStore::new(BASE_PARTICLE_SIZE + 8, capacity)
    }

    #[test]
    fn test_allocate_until_full() {
        let mut s = store(3);
        assert_eq!(s.allocate(), Some(0));
        assert_eq!(s.allocate(), Some(1));
        assert_eq!(s.allocate(), Some(2));
        assert_eq!(s.allocate(), None);
        assert!(s.is_full());
        assert_eq!(s.active_count(), 3);
    }

    #[test]
    fn test_allocate_zeroes_and_marks_alive() {
        let mut s = store(1);
        let slot = s.allocate().unwrap();
        {
            let record = s.record_mut(slot).unwrap();
            record.particle.location = Vec3::ONE;
            record.payload[0] = 0xFF;
        }
        s.remove(0);

        let slot = s.allocate().unwrap();
        let p = s.particle(slot).unwrap();
        assert_eq!(p.location, Vec3::ZERO);
        assert!(p.is_alive());
        assert_eq!(s.payload(slot).unwrap()[0], 0);
        assert_eq!(p.serial, 2);
    }

    #[test]
    fn test_payload_round_trip() {
        let mut s = store(2);
        let slot = s.allocate().unwrap();
        let record = s.record_mut(slot).unwrap();
        assert!(write_payload(&mut record.payload[4..], &1.5_f32));
        assert_eq!(read_payload::<f32>(&record.payload[4..]), Some(1.5));

        // Too short for a Vec3
        assert!(!write_payload(&mut record.payload[4..], &Vec3::ONE));
        assert_eq!(read_payload::<Vec3>(&record.payload[4..]), None);
    }

    #[test]
    fn test_compact_keeps_order() {
        let mut s = store(5);
        for _ in 0..5 {
            s.allocate();
        }
        s.request_kill(1);
        s.request_kill(3);

        assert_eq!(s.compact(), 2);
        assert_eq!(s.active_slots(), &[0, 2, 4]);

        // Freed slots are reused
        let reused = s.allocate().unwrap();
        assert!(reused == 1 || reused == 3);
    }

    #[test]
    fn test_live_particle_detects_recycled_slot() {
        let mut s = store(1);
        let slot = s.allocate().unwrap();
        let serial = s.particle(slot).unwrap().serial;
        assert!(s.live_particle(slot, serial).is_some());

        s.remove(0);
        assert!(s.live_particle(slot, serial).is_none());

        let again = s.allocate().unwrap();
        assert_eq!(again, slot);
        assert!(s.live_particle(slot, serial).is_none());
    }

    #[test]
    fn test_remove_out_of_range() {
        let mut s = store(2);
        s.allocate();
        assert!(!s.remove(4));
        assert!(s.remove(0));
        assert_eq!(s.active_count(), 0);
    }
}

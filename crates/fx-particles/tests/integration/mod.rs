//! Feature integration tests
//!
//! These tests drive emitter instances through the public API only.

pub mod compaction;
pub mod layout;
pub mod lod_blend;
pub mod properties;
pub mod system;

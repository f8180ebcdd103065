//! End-to-end scenario tests
//!
//! These tests run emitters the way a game would and check what a viewer
//! would see.

pub mod fountain;
pub mod size_scale;
pub mod sphere_surface;

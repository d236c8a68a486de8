//! Compute layer: projection, validation, clustering and export.
//!
//! Everything here is pure. Nothing in this module talks to a map widget
//! or holds selection state; that lives in [`crate::marker`].

pub mod cluster;
pub mod geojson;
pub mod projection;
pub mod validation;

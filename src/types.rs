//! Core type definitions for the microcloud simulator.
//!
//! This module defines the identifiers and scalar units shared by every
//! other module.

/// Trace timestamp unit (seconds, as recorded by the mobility trace).
///
/// Latencies are expressed in the same unit, measured from a vehicle's first
/// trace sample.
pub type SimTime = f64;

/// Identifier of a vehicle, taken verbatim from the movement trace.
pub type VehicleId = String;

/// Identifier of a microcloud: its position in the deployment list.
pub type MicrocloudId = usize;

/// Identifier of a content block within the global catalog.
pub type BlockId = u32;

/// A planar `(x, y)` coordinate.
pub type Coordinate = (f64, f64);

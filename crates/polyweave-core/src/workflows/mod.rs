//! # Workflows Module
//!
//! High-level entry points that run a complete procedure on a monomer group.
//!
//! - **Linear Workflow** ([`linear`]) - Builds a linear chain: end-group resolution, middle
//!   template registration, replication, charge neutralization and optional relaxation.

pub mod linear;

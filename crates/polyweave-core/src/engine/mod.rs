//! # Engine Module
//!
//! The algorithmic layer used by the assembly workflows.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Validated build settings and their builder
//! - **End Groups** ([`end_groups`]) - Head and tail selection, declared or inferred
//! - **Estimation** ([`estimate`]) - Expected atom count of a chain, for reporting
//! - **Diagnostics** ([`diagnostics`]) - Milestone events delivered to an optional callback
//! - **Relaxation** ([`relax`]) - The seam for external geometric relaxation
//! - **Error Handling** ([`error`]) - The assembly error taxonomy
//!
//! Diagnostics are purely observational. Every algorithm here behaves identically whether or
//! not a callback is installed.

pub mod config;
pub mod diagnostics;
pub mod end_groups;
pub mod error;
pub mod estimate;
pub mod relax;

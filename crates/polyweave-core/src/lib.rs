//! # Polyweave Core Library
//!
//! A library for describing polymers as small sets of interchangeable monomer fragments
//! and assembling them into complete linear chain descriptions.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer architecture so each concern can be tested in isolation.
//!
//! - **[`core`]: The Foundation.** Stateless data models: fragment patterns and their ports,
//!   the `MonomerGroup` aggregate, the assembled `PolymerChain`, and loading of monomer files.
//!
//! - **[`engine`]: The Logic Core.** Build configuration, the diagnostics port, end-group
//!   resolution, chain-length estimation and the relaxation seam, plus the error taxonomy
//!   shared by the assembly algorithm.
//!
//! - **[`workflows`]: The Public API.** Ties `core` and `engine` together to run complete
//!   procedures, such as building a linear polymer from a monomer group.

pub mod core;
pub mod engine;
pub mod workflows;

//! # Core Module
//!
//! This module provides the fundamental building blocks of Polyweave: the representation of
//! monomer fragments, the groups that collect them under residue names, and the chain
//! structure produced by assembly.
//!
//! ## Architecture
//!
//! - **Fragment Inspection** ([`fragment`]) - Pattern validation, port counting and the
//!   canonicalization seam
//! - **Molecular Representation** ([`models`]) - Monomer groups and assembled chains
//! - **File I/O** ([`io`]) - Loading monomer groups from declarative TOML files
//!
//! Everything in this module is immutable once constructed, with the exception of the chain
//! being grown inside a workflow, which is owned exclusively by that workflow until returned.

pub mod fragment;
pub mod io;
pub mod models;

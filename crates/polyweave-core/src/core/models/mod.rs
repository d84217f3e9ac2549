//! # Core Models Module
//!
//! Data structures describing monomer collections and the chains assembled from them.
//!
//! ## Key Components
//!
//! - [`group`] - The `MonomerGroup` aggregate with its classification queries
//! - [`chain`] - The assembled `PolymerChain`, its units, atoms and links
//! - [`ids`] - Stable identifiers for chain units
//!
//! ## Usage
//!
//! ```ignore
//! use polyweave::core::models::group::{MonomerGroup, TerminalOrientation};
//!
//! let group = MonomerGroup::new(
//!     [("A", "[*]-C-C-[*]"), ("B", "[*]-O")],
//!     TerminalOrientation::new("B", "B"),
//! )?;
//! assert!(group.is_linear());
//! ```

pub mod chain;
pub mod group;
pub mod ids;

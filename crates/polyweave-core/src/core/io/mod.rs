//! # I/O Module
//!
//! Loading of monomer definitions from declarative files.
//!
//! Monomer files are TOML documents with a `[monomers]` table mapping residue names to a
//! pattern or a list of patterns, and an optional `[term_orient]` table assigning residues to
//! the `head` and `tail` roles. Residue order in the file is preserved, since it determines
//! default end-group and middle-unit selection.

pub mod monomer_file;

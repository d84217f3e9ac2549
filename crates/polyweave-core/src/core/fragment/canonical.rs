use super::Fragment;
use std::fmt;

/// Default capping group: a hydrogen on each port.
pub const HYDROGEN_CAP: &str = "[H]-[*]";

/// The group used to saturate ports before two fragments are compared.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PortCap(String);

impl PortCap {
    pub fn new(pattern: &str) -> Self {
        Self(pattern.to_string())
    }

    pub fn pattern(&self) -> &str {
        &self.0
    }
}

impl Default for PortCap {
    fn default() -> Self {
        Self::new(HYDROGEN_CAP)
    }
}

impl fmt::Display for PortCap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Produces equality keys for fragments under a capping convention.
///
/// Two fragments belong to the same equivalence class exactly when their keys are equal.
/// No canonicalization scheme ships with the library; callers bring one backed by a
/// cheminformatics toolkit.
pub trait FragmentCanonicalizer {
    type Error: std::error::Error;

    fn canonical_key(&self, fragment: &Fragment, cap: &PortCap) -> Result<String, Self::Error>;
}

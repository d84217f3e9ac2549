//! # Fragment Module
//!
//! Representation of monomer fragments: opaque substructure patterns together with the atoms
//! and open attachment points ("ports") derived from them.
//!
//! ## Key Components
//!
//! - [`Fragment`] - A validated pattern with its inspected atoms
//! - [`FragmentValidator`] - The seam through which patterns are checked and profiled
//! - [`smarts`] - The built-in SMARTS scanner implementing `FragmentValidator`
//! - [`canonical`] - The seam for fragment canonicalization under a port-capping convention
//!
//! Ports are wildcard atoms. A fragment with one port is terminal, with two ports is a middle
//! unit, and with more than two ports makes its owning group branchable.

pub mod canonical;
mod elements;
pub mod smarts;

pub use smarts::{PatternError, SmartsInspector};

use std::fmt;

/// A single atom of an inspected fragment pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PatternAtom {
    /// Element symbol, `*` for wildcard ports, or `?` for query atoms without a fixed element.
    pub symbol: String,
    /// Formal charge declared in the pattern (zero when absent).
    pub formal_charge: i8,
    /// Whether this atom is an open attachment point.
    pub is_port: bool,
}

impl PatternAtom {
    pub fn new(symbol: &str, formal_charge: i8, is_port: bool) -> Self {
        Self {
            symbol: symbol.to_string(),
            formal_charge,
            is_port,
        }
    }
}

/// The structural information a validator extracts from a pattern.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FragmentProfile {
    pub atoms: Vec<PatternAtom>,
}

impl FragmentProfile {
    pub fn port_count(&self) -> usize {
        self.atoms.iter().filter(|atom| atom.is_port).count()
    }
}

/// Checks fragment patterns and reports their atoms and ports.
///
/// Implementors decide what a well-formed pattern is. Rejections from validators that are not
/// built on [`SmartsInspector`] should be reported through [`PatternError::Rejected`].
pub trait FragmentValidator {
    fn inspect(&self, pattern: &str) -> Result<FragmentProfile, PatternError>;
}

/// Classification of a fragment by its number of ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortClass {
    /// No ports; cannot take part in a chain.
    Inert,
    /// Exactly one port; caps a chain end.
    Terminal,
    /// Exactly two ports; sits inside a chain.
    Middle,
    /// More than two ports; allows branching.
    Branch,
}

impl PortClass {
    pub fn from_port_count(ports: usize) -> Self {
        match ports {
            0 => Self::Inert,
            1 => Self::Terminal,
            2 => Self::Middle,
            _ => Self::Branch,
        }
    }
}

impl fmt::Display for PortClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Inert => "Inert",
                Self::Terminal => "Terminal",
                Self::Middle => "Middle",
                Self::Branch => "Branch",
            }
        )
    }
}

/// A validated monomer fragment pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fragment {
    pattern: String,
    atoms: Vec<PatternAtom>,
}

impl Fragment {
    /// Validates `pattern` with the built-in [`SmartsInspector`].
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        Self::with_validator(pattern, &SmartsInspector)
    }

    /// Validates `pattern` with a caller-supplied validator.
    pub fn with_validator<V>(pattern: &str, validator: &V) -> Result<Self, PatternError>
    where
        V: FragmentValidator + ?Sized,
    {
        let profile = validator.inspect(pattern)?;
        Ok(Self {
            pattern: pattern.to_string(),
            atoms: profile.atoms,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn atoms(&self) -> &[PatternAtom] {
        &self.atoms
    }

    /// Number of atoms in the pattern, ports included.
    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    pub fn port_count(&self) -> usize {
        self.atoms.iter().filter(|atom| atom.is_port).count()
    }

    /// Indices (into [`Fragment::atoms`]) of the port atoms, in pattern order.
    pub fn port_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.atoms
            .iter()
            .enumerate()
            .filter(|(_, atom)| atom.is_port)
            .map(|(index, _)| index)
    }

    pub fn class(&self) -> PortClass {
        PortClass::from_port_count(self.port_count())
    }

    pub fn is_terminal(&self) -> bool {
        self.class() == PortClass::Terminal
    }

    pub fn is_middle(&self) -> bool {
        self.class() == PortClass::Middle
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pattern)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedPorts(usize);

    impl FragmentValidator for FixedPorts {
        fn inspect(&self, pattern: &str) -> Result<FragmentProfile, PatternError> {
            if pattern == "reject" {
                return Err(PatternError::Rejected {
                    reason: "refused by test validator".to_string(),
                });
            }
            let mut atoms = vec![PatternAtom::new("C", 0, false)];
            atoms.extend((0..self.0).map(|_| PatternAtom::new("*", 0, true)));
            Ok(FragmentProfile { atoms })
        }
    }

    #[test]
    fn port_class_follows_port_count() {
        assert_eq!(PortClass::from_port_count(0), PortClass::Inert);
        assert_eq!(PortClass::from_port_count(1), PortClass::Terminal);
        assert_eq!(PortClass::from_port_count(2), PortClass::Middle);
        assert_eq!(PortClass::from_port_count(3), PortClass::Branch);
        assert_eq!(PortClass::from_port_count(6), PortClass::Branch);
    }

    #[test]
    fn parse_classifies_builtin_patterns() {
        let terminal = Fragment::parse("[*]-O").unwrap();
        let middle = Fragment::parse("[*:1]-C-C-[*:2]").unwrap();
        let branch = Fragment::parse("[*]-C(-[*])-[*]").unwrap();

        assert!(terminal.is_terminal());
        assert!(middle.is_middle());
        assert_eq!(branch.class(), PortClass::Branch);
        assert_eq!(middle.atom_count(), 4);
        assert_eq!(middle.port_indices().collect::<Vec<_>>(), vec![0, 3]);
    }

    #[test]
    fn custom_validator_drives_port_count() {
        let fragment = Fragment::with_validator("anything", &FixedPorts(2)).unwrap();
        assert_eq!(fragment.port_count(), 2);
        assert_eq!(fragment.pattern(), "anything");
        assert!(fragment.is_middle());
    }

    #[test]
    fn custom_validator_rejection_is_propagated() {
        let result = Fragment::with_validator("reject", &FixedPorts(1));
        assert!(matches!(result, Err(PatternError::Rejected { .. })));
    }

    #[test]
    fn display_prints_original_pattern() {
        let fragment = Fragment::parse("[*]-N").unwrap();
        assert_eq!(fragment.to_string(), "[*]-N");
    }
}

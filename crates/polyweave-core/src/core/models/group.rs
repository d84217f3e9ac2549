use crate::core::fragment::canonical::{FragmentCanonicalizer, PortCap};
use crate::core::fragment::{Fragment, FragmentValidator, PatternError, SmartsInspector};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, warn};

/// The declared patterns of one residue: either a bare pattern or a list of variants.
///
/// Bare patterns are normalized into one-element lists when a group is constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PatternSpec {
    Single(String),
    Many(Vec<String>),
}

impl From<&str> for PatternSpec {
    fn from(pattern: &str) -> Self {
        Self::Single(pattern.to_string())
    }
}

impl From<String> for PatternSpec {
    fn from(pattern: String) -> Self {
        Self::Single(pattern)
    }
}

impl<S: Into<String>> From<Vec<S>> for PatternSpec {
    fn from(patterns: Vec<S>) -> Self {
        Self::Many(patterns.into_iter().map(Into::into).collect())
    }
}

/// The two ends of a linear chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TerminalRole {
    Head,
    Tail,
}

impl TerminalRole {
    pub const ALL: [TerminalRole; 2] = [TerminalRole::Head, TerminalRole::Tail];
}

#[derive(Debug, Error)]
#[error("Invalid terminal role string (expected 'head' or 'tail')")]
pub struct ParseTerminalRoleError;

impl FromStr for TerminalRole {
    type Err = ParseTerminalRoleError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "head" => Ok(Self::Head),
            "tail" => Ok(Self::Tail),
            _ => Err(ParseTerminalRoleError),
        }
    }
}

impl fmt::Display for TerminalRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Head => "head",
                Self::Tail => "tail",
            }
        )
    }
}

/// Which residue plays the head and tail roles of a linear chain.
///
/// Residue names are trusted as declared; they are not checked against the group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TerminalOrientation {
    #[serde(skip_serializing_if = "Option::is_none")]
    head: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tail: Option<String>,
}

impl TerminalOrientation {
    /// A complete declaration of both roles.
    pub fn new(head: &str, tail: &str) -> Self {
        Self {
            head: Some(head.to_string()),
            tail: Some(tail.to_string()),
        }
    }

    /// No declaration; end groups will be inferred.
    pub fn undeclared() -> Self {
        Self::default()
    }

    pub fn with_role(mut self, role: TerminalRole, residue_name: &str) -> Self {
        self.set(role, residue_name);
        self
    }

    pub fn set(&mut self, role: TerminalRole, residue_name: &str) {
        let slot = match role {
            TerminalRole::Head => &mut self.head,
            TerminalRole::Tail => &mut self.tail,
        };
        *slot = Some(residue_name.to_string());
    }

    pub fn get(&self, role: TerminalRole) -> Option<&str> {
        match role {
            TerminalRole::Head => self.head.as_deref(),
            TerminalRole::Tail => self.tail.as_deref(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none() && self.tail.is_none()
    }

    /// Whether both the head and the tail are declared.
    pub fn is_complete(&self) -> bool {
        self.head.is_some() && self.tail.is_some()
    }
}

impl fmt::Display for TerminalOrientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{head: {}, tail: {}}}",
            self.head.as_deref().unwrap_or("-"),
            self.tail.as_deref().unwrap_or("-")
        )
    }
}

/// Selects fragments by their port classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PortFilter {
    #[default]
    All,
    TerminalOnly,
    MiddleOnly,
}

impl PortFilter {
    pub fn accepts(self, fragment: &Fragment) -> bool {
        match self {
            Self::All => true,
            Self::TerminalOnly => fragment.is_terminal(),
            Self::MiddleOnly => fragment.is_middle(),
        }
    }
}

#[derive(Debug, Error)]
pub enum GroupError {
    #[error("Invalid monomer pattern for {residue}[{index}]: \"{pattern}\" ({source})")]
    MalformedFragment {
        residue: String,
        index: usize,
        pattern: String,
        source: PatternError,
    },
    #[error("Empty monomer declaration for residue '{residue}'")]
    EmptyResidue { residue: String },
    #[error("Cannot merge monomer groups: conflicting {role} declarations ('{left}' vs '{right}')")]
    IncompatibleMerge {
        role: TerminalRole,
        left: String,
        right: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ResidueEntry {
    name: String,
    fragments: Vec<Fragment>,
}

/// Residue-labelled collections of monomer fragments.
///
/// Residue order is the order of declaration and is significant: it decides which
/// fragments are picked as default end groups and middle units.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonomerGroup {
    residues: Vec<ResidueEntry>,
    residue_index: HashMap<String, usize>,
    orientation: TerminalOrientation,
}

impl MonomerGroup {
    /// Builds a group, validating every pattern with the built-in [`SmartsInspector`].
    pub fn new<I, K, S>(fragments: I, orientation: TerminalOrientation) -> Result<Self, GroupError>
    where
        I: IntoIterator<Item = (K, S)>,
        K: Into<String>,
        S: Into<PatternSpec>,
    {
        Self::with_validator(fragments, orientation, &SmartsInspector)
    }

    /// Builds a group, validating every pattern with `validator`.
    ///
    /// A residue declared more than once keeps its first position and its last patterns.
    ///
    /// # Errors
    ///
    /// Returns `GroupError::EmptyResidue` if a residue declares no patterns.
    /// Returns `GroupError::MalformedFragment` if any pattern fails validation.
    pub fn with_validator<I, K, S, V>(
        fragments: I,
        orientation: TerminalOrientation,
        validator: &V,
    ) -> Result<Self, GroupError>
    where
        I: IntoIterator<Item = (K, S)>,
        K: Into<String>,
        S: Into<PatternSpec>,
        V: FragmentValidator + ?Sized,
    {
        let mut group = Self {
            orientation,
            ..Self::default()
        };

        for (name, spec) in fragments {
            let name = name.into();
            let patterns = match spec.into() {
                PatternSpec::Many(patterns) => {
                    if patterns.is_empty() {
                        return Err(GroupError::EmptyResidue { residue: name });
                    }
                    patterns
                }
                PatternSpec::Single(pattern) => {
                    warn!(
                        "Wrapping bare monomer pattern for '{}' in a list (storing as [\"{}\"])",
                        name, pattern
                    );
                    vec![pattern]
                }
            };

            let fragments = patterns
                .iter()
                .enumerate()
                .map(|(index, pattern)| {
                    Fragment::with_validator(pattern, validator).map_err(|source| {
                        GroupError::MalformedFragment {
                            residue: name.clone(),
                            index,
                            pattern: pattern.clone(),
                            source,
                        }
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;

            group.insert_residue(name, fragments);
        }

        debug!(
            "Constructed monomer group with residues [{}]",
            group.residue_names().join(", ")
        );
        Ok(group)
    }

    fn insert_residue(&mut self, name: String, fragments: Vec<Fragment>) {
        match self.residue_index.get(&name) {
            Some(&idx) => self.residues[idx].fragments = fragments,
            None => {
                self.residue_index.insert(name.clone(), self.residues.len());
                self.residues.push(ResidueEntry { name, fragments });
            }
        }
    }

    pub fn terminal_orientation(&self) -> &TerminalOrientation {
        &self.orientation
    }

    pub fn residue_names(&self) -> impl Iterator<Item = &str> + Clone + '_ {
        self.residues.iter().map(|entry| entry.name.as_str())
    }

    pub fn contains_residue(&self, name: &str) -> bool {
        self.residue_index.contains_key(name)
    }

    /// All fragment variants declared under `name`.
    pub fn fragments(&self, name: &str) -> Option<&[Fragment]> {
        self.residue_index
            .get(name)
            .map(|&idx| self.residues[idx].fragments.as_slice())
    }

    pub fn is_empty(&self) -> bool {
        self.residues.is_empty()
    }

    /// `(residue name, fragment)` pairs accepted by `filter`, in declaration order.
    ///
    /// Each call starts a fresh iteration; the returned iterator can also be cloned.
    pub fn iter_fragments(
        &self,
        filter: PortFilter,
    ) -> impl Iterator<Item = (&str, &Fragment)> + Clone + '_ {
        self.residues
            .iter()
            .flat_map(|entry| {
                entry
                    .fragments
                    .iter()
                    .map(move |fragment| (entry.name.as_str(), fragment))
            })
            .filter(move |(_, fragment)| filter.accepts(fragment))
    }

    /// Fragments accepted by `filter`, grouped under their residue name in declaration order.
    ///
    /// Residues without any accepted fragment are left out.
    pub fn group_by_residue(&self, filter: PortFilter) -> Vec<(&str, Vec<&Fragment>)> {
        let chunks = self.iter_fragments(filter).chunk_by(|&(name, _)| name);
        chunks
            .into_iter()
            .map(|(name, pairs)| (name, pairs.map(|(_, fragment)| fragment).collect()))
            .collect()
    }

    /// Number of fragments in the group; variants under one residue name count separately.
    pub fn n_monomers(&self) -> usize {
        self.residues.iter().map(|entry| entry.fragments.len()).sum()
    }

    /// Whether `fragment` can cap a chain end.
    pub fn is_terminal(fragment: &Fragment) -> bool {
        fragment.is_terminal()
    }

    /// Returns `(middle, terminal)` fragment counts.
    pub fn count_by_role(&self) -> (usize, usize) {
        self.iter_fragments(PortFilter::All)
            .fold((0, 0), |(middle, terminal), (_, fragment)| {
                (
                    middle + usize::from(fragment.is_middle()),
                    terminal + usize::from(fragment.is_terminal()),
                )
            })
    }

    /// Whether any fragment has more than two ports.
    pub fn is_branchable(&self) -> bool {
        self.iter_fragments(PortFilter::All)
            .any(|(_, fragment)| fragment.port_count() > 2)
    }

    /// Whether the fragments can only be assembled into a linear chain.
    pub fn is_linear(&self) -> bool {
        !self.is_branchable()
    }

    /// Whether exactly one equivalence class of middle fragments exists under `canonicalizer`.
    pub fn is_homopolymer<C>(&self, canonicalizer: &C, cap: &PortCap) -> Result<bool, C::Error>
    where
        C: FragmentCanonicalizer + ?Sized,
    {
        let keys = self
            .iter_fragments(PortFilter::MiddleOnly)
            .map(|(_, fragment)| canonicalizer.canonical_key(fragment, cap))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(keys.iter().unique().count() == 1)
    }

    pub fn is_linear_homopolymer<C>(
        &self,
        canonicalizer: &C,
        cap: &PortCap,
    ) -> Result<bool, C::Error>
    where
        C: FragmentCanonicalizer + ?Sized,
    {
        Ok(self.is_linear() && self.is_homopolymer(canonicalizer, cap)?)
    }

    /// A group keeping only the first fragment of each equivalence class.
    ///
    /// Residues left without fragments are dropped, and so are orientation roles naming them.
    pub fn unique<C>(&self, canonicalizer: &C, cap: &PortCap) -> Result<Self, C::Error>
    where
        C: FragmentCanonicalizer + ?Sized,
    {
        let mut seen = HashSet::new();
        let mut unique = Self::default();

        for entry in &self.residues {
            let mut kept = Vec::new();
            for fragment in &entry.fragments {
                if seen.insert(canonicalizer.canonical_key(fragment, cap)?) {
                    kept.push(fragment.clone());
                }
            }
            if !kept.is_empty() {
                unique.insert_residue(entry.name.clone(), kept);
            }
        }

        for role in TerminalRole::ALL {
            if let Some(name) = self.orientation.get(role) {
                if unique.contains_residue(name) {
                    unique.orientation.set(role, name);
                }
            }
        }
        Ok(unique)
    }

    /// Combines two groups into a new one.
    ///
    /// Residues from `other` replace same-named residues of `self` in place; new residues are
    /// appended. Each terminal role keeps whichever side declares it.
    ///
    /// # Errors
    ///
    /// Returns `GroupError::IncompatibleMerge` if both sides declare the same role with
    /// different residues.
    pub fn merge(&self, other: &MonomerGroup) -> Result<Self, GroupError> {
        let mut orientation = TerminalOrientation::default();
        for role in TerminalRole::ALL {
            match (self.orientation.get(role), other.orientation.get(role)) {
                (Some(left), Some(right)) if left != right => {
                    return Err(GroupError::IncompatibleMerge {
                        role,
                        left: left.to_string(),
                        right: right.to_string(),
                    });
                }
                (Some(name), _) | (None, Some(name)) => orientation.set(role, name),
                (None, None) => {}
            }
        }

        let mut merged = self.clone();
        merged.orientation = orientation;
        for entry in &other.residues {
            merged.insert_residue(entry.name.clone(), entry.fragments.clone());
        }
        Ok(merged)
    }
}

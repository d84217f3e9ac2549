use super::diagnostics::{Diagnostic, DiagnosticReporter};
use super::error::AssemblyError;
use crate::core::fragment::Fragment;
use crate::core::models::chain::OrientationSource;
use crate::core::models::group::{MonomerGroup, PortFilter, TerminalOrientation, TerminalRole};
use std::collections::HashMap;
use tracing::{info, warn};

/// A terminal fragment chosen to cap one end of a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndGroup<'g> {
    pub residue_name: &'g str,
    pub fragment: &'g Fragment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndGroups<'g> {
    pub head: EndGroup<'g>,
    pub tail: EndGroup<'g>,
    pub source: OrientationSource,
}

impl<'g> EndGroups<'g> {
    pub fn get(&self, role: TerminalRole) -> EndGroup<'g> {
        match role {
            TerminalRole::Head => self.head,
            TerminalRole::Tail => self.tail,
        }
    }
}

/// Wrap-around cursor over the terminal variants of one residue.
///
/// Never exhausts while non-empty, so a residue with a single variant can fill both roles.
#[derive(Debug, Clone)]
struct CyclicCursor<'g> {
    items: Vec<&'g Fragment>,
    position: usize,
}

impl<'g> CyclicCursor<'g> {
    fn new(items: Vec<&'g Fragment>) -> Self {
        Self { items, position: 0 }
    }

    fn advance(&mut self) -> Option<&'g Fragment> {
        if self.items.is_empty() {
            return None;
        }
        let item = self.items[self.position % self.items.len()];
        self.position += 1;
        Some(item)
    }
}

/// Chooses the head and tail end groups of a linear chain built from `group`.
///
/// A complete terminal orientation on the group is followed exactly; each declared residue
/// hands out its terminal variants in turn, head first. Without one, the first two terminal
/// fragments of the group become the head and the tail, and the choice is flagged as unverified.
///
/// # Errors
///
/// Returns `AssemblyError::UnknownResidue` if a declared residue is not in the group.
/// Returns `AssemblyError::InsufficientTerminalGroups` if a declared residue has no terminal
/// variant, or if an orientation must be inferred from fewer than two terminal fragments.
pub fn resolve_end_groups<'g>(
    group: &'g MonomerGroup,
    reporter: &DiagnosticReporter,
) -> Result<EndGroups<'g>, AssemblyError> {
    let orientation = group.terminal_orientation();
    if orientation.is_complete() {
        resolve_declared(group, orientation, reporter)
    } else {
        resolve_inferred(group, reporter)
    }
}

fn resolve_declared<'g>(
    group: &'g MonomerGroup,
    orientation: &TerminalOrientation,
    reporter: &DiagnosticReporter,
) -> Result<EndGroups<'g>, AssemblyError> {
    info!("Using pre-defined terminal group orientation {}", orientation);

    let mut cursors: HashMap<&str, CyclicCursor<'g>> = HashMap::new();
    let mut draw = |role: TerminalRole| -> Result<EndGroup<'g>, AssemblyError> {
        let declared = orientation.get(role).ok_or_else(|| {
            AssemblyError::Internal(format!("complete orientation is missing its {role} entry"))
        })?;
        let residue_name = group
            .residue_names()
            .find(|name| *name == declared)
            .ok_or_else(|| AssemblyError::UnknownResidue {
                residue: declared.to_string(),
            })?;

        let cursor = cursors.entry(residue_name).or_insert_with(|| {
            CyclicCursor::new(
                group
                    .fragments(residue_name)
                    .unwrap_or_default()
                    .iter()
                    .filter(|fragment| fragment.is_terminal())
                    .collect(),
            )
        });
        let fragment = cursor
            .advance()
            .ok_or_else(|| AssemblyError::InsufficientTerminalGroups {
                found: 0,
                residue: Some(residue_name.to_string()),
            })?;
        Ok(EndGroup {
            residue_name,
            fragment,
        })
    };

    let head = draw(TerminalRole::Head)?;
    let tail = draw(TerminalRole::Tail)?;

    reporter.report(Diagnostic::OrientationDeclared {
        head: head.residue_name.to_string(),
        tail: tail.residue_name.to_string(),
    });
    Ok(EndGroups {
        head,
        tail,
        source: OrientationSource::Declared,
    })
}

fn resolve_inferred<'g>(
    group: &'g MonomerGroup,
    reporter: &DiagnosticReporter,
) -> Result<EndGroups<'g>, AssemblyError> {
    let mut terminals = group
        .iter_fragments(PortFilter::TerminalOnly)
        .map(|(residue_name, fragment)| EndGroup {
            residue_name,
            fragment,
        });

    let (Some(head), Some(tail)) = (terminals.next(), terminals.next()) else {
        let found = group.iter_fragments(PortFilter::TerminalOnly).count();
        warn!(
            "No valid terminal monomer orientation declared and only {} terminal group(s) available",
            found
        );
        return Err(AssemblyError::InsufficientTerminalGroups {
            found,
            residue: None,
        });
    };

    warn!(
        "No valid terminal monomer orientation declared; inferred {{head: {}, tail: {}}}. \
         Verify that this yields a chemically valid polymer",
        head.residue_name, tail.residue_name
    );
    reporter.report(Diagnostic::OrientationInferred {
        head: head.residue_name.to_string(),
        tail: tail.residue_name.to_string(),
    });
    Ok(EndGroups {
        head,
        tail,
        source: OrientationSource::Inferred,
    })
}

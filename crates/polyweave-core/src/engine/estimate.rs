use crate::core::models::group::{MonomerGroup, PortFilter};

/// Estimates how many atoms a linear chain of `degree_of_polymerization` units will hold.
///
/// Each fragment contributes its non-port atoms. Terminal fragments count once; the remaining
/// fragments share the `degree_of_polymerization - n_terminal` middle slots equally.
/// The result feeds progress reporting only.
pub fn estimate_chain_atoms_linear(
    group: &MonomerGroup,
    degree_of_polymerization: usize,
) -> usize {
    let (n_terminal, n_other) = group
        .iter_fragments(PortFilter::All)
        .fold((0usize, 0usize), |(terminal, other), (_, fragment)| {
            if fragment.is_terminal() {
                (terminal + 1, other)
            } else {
                (terminal, other + 1)
            }
        });

    let middle_multiplicity = degree_of_polymerization
        .saturating_sub(n_terminal)
        .checked_div(n_other)
        .unwrap_or(0);

    group
        .iter_fragments(PortFilter::All)
        .map(|(_, fragment)| {
            let contribution = fragment.atom_count() - fragment.port_count();
            let multiplicity = if fragment.is_terminal() {
                1
            } else {
                middle_multiplicity
            };
            contribution * multiplicity
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::group::TerminalOrientation;

    fn group(entries: &[(&str, &str)]) -> MonomerGroup {
        MonomerGroup::new(
            entries.iter().map(|&(name, pattern)| (name, vec![pattern])),
            TerminalOrientation::undeclared(),
        )
        .unwrap()
    }

    #[test]
    fn terminals_count_once_and_middles_fill_the_rest() {
        let group = group(&[("A", "[*]-C-C-[*]"), ("B", "[*]-O"), ("C", "[*]-N")]);
        // 2 middle atoms x 3 slots + 1 + 1
        assert_eq!(estimate_chain_atoms_linear(&group, 5), 8);
    }

    #[test]
    fn middle_slots_are_shared_between_middle_fragments() {
        let group = group(&[
            ("A", "[*]-C-C-[*]"),
            ("D", "[*]-C-O-C-[*]"),
            ("B", "[*]-O"),
            ("C", "[*]-N"),
        ]);
        // 6 slots split 3/3
        assert_eq!(estimate_chain_atoms_linear(&group, 8), 2 * 3 + 3 * 3 + 2);
    }

    #[test]
    fn short_chains_saturate_to_terminals_only() {
        let group = group(&[("A", "[*]-C-C-[*]"), ("B", "[*]-O"), ("C", "[*]-N")]);
        assert_eq!(estimate_chain_atoms_linear(&group, 1), 2);
    }

    #[test]
    fn group_without_middles_counts_terminals() {
        let group = group(&[("B", "[*]-O"), ("C", "[*]-N-C")]);
        assert_eq!(estimate_chain_atoms_linear(&group, 10), 3);
    }
}

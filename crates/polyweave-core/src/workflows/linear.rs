use crate::core::fragment::Fragment;
use crate::core::models::chain::{ChainUnit, OrientationSource, PolymerChain, UnitRole};
use crate::core::models::group::{MonomerGroup, PortFilter, TerminalRole};
use crate::core::models::ids::UnitId;
use crate::engine::config::{LinearBuildConfig, MIN_DEGREE_OF_POLYMERIZATION};
use crate::engine::diagnostics::{Diagnostic, DiagnosticReporter};
use crate::engine::end_groups::{EndGroup, resolve_end_groups};
use crate::engine::error::AssemblyError;
use crate::engine::estimate::estimate_chain_atoms_linear;
use crate::engine::relax::ChainRelaxer;
use std::collections::HashMap;
use tracing::{debug, info, instrument, warn};

/// A middle fragment paired with the block symbol that selects it.
#[derive(Debug, Clone, Copy)]
struct TemplateEntry<'g> {
    block: char,
    residue_name: &'g str,
    fragment: &'g Fragment,
}

/// Assembles a linear chain of `config.degree_of_polymerization` repeat positions.
///
/// The head and tail end groups are resolved first. Middle fragments are then paired one by
/// one with the symbols of `config.sequence`; the shorter of the two bounds the template. The
/// template's symbols are laid down `degree_of_polymerization - 2` times between the head and
/// the tail, each symbol placing the first middle fragment registered under it.
///
/// # Errors
///
/// Returns `AssemblyError::Config` if `config` fails validation, `AssemblyError::Morphology` if
/// the group can branch, any end-group resolution error, and `AssemblyError::Relaxation` if the
/// supplied relaxer fails.
#[instrument(skip_all, name = "linear_build_workflow")]
pub fn run(
    group: &MonomerGroup,
    config: &LinearBuildConfig,
    relaxer: Option<&dyn ChainRelaxer>,
    reporter: &DiagnosticReporter,
) -> Result<PolymerChain, AssemblyError> {
    config.validate()?;
    if !group.is_linear() {
        return Err(AssemblyError::Morphology);
    }

    // === Phase 1: End groups ===
    let ends = resolve_end_groups(group, reporter)?;

    // === Phase 2: Middle template ===
    let template = register_middle_template(
        group,
        &config.sequence,
        config.degree_of_polymerization,
        reporter,
    );

    // === Phase 3: Terminal registration ===
    for role in TerminalRole::ALL {
        let end = ends.get(role);
        info!(
            "Registering terminal monomer {} (orientation \"{}\")",
            end.residue_name, role
        );
        reporter.report(Diagnostic::TerminalUnitRegistered {
            residue: end.residue_name.to_string(),
            role,
        });
    }

    // === Phase 4: Assembly ===
    let dop = config.degree_of_polymerization;
    let estimated_atoms = estimate_chain_atoms_linear(group, dop);
    info!(
        "Assembling linear polymer chain with {} monomers ({} atoms)",
        dop, estimated_atoms
    );
    reporter.report(Diagnostic::AssemblyStart {
        degree_of_polymerization: dop,
        estimated_atoms,
    });

    let mut chain = assemble(&ends.head, &ends.tail, &template, dop, config, ends.source)?;
    if config.add_hydrogens {
        let caps = chain.cap_open_ports();
        debug!("Capped {} open port(s) with hydrogen", caps);
    }
    chain.neutralize_charges();

    info!(
        "Successfully assembled linear polymer chain with {} monomers ({} atoms)",
        chain.len(),
        chain.atom_count()
    );
    reporter.report(Diagnostic::AssemblyFinish {
        units: chain.len(),
        atoms: chain.atom_count(),
    });

    // === Phase 5: Relaxation (optional) ===
    if config.relax {
        relax_chain(&mut chain, relaxer, reporter)?;
    }

    Ok(chain)
}

fn register_middle_template<'g>(
    group: &'g MonomerGroup,
    sequence: &str,
    dop: usize,
    reporter: &DiagnosticReporter,
) -> Vec<TemplateEntry<'g>> {
    let template: Vec<_> = sequence
        .chars()
        .zip(group.iter_fragments(PortFilter::MiddleOnly))
        .map(|(block, (residue_name, fragment))| {
            info!(
                "Registering middle monomer {} (block identifier \"{}\")",
                residue_name, block
            );
            reporter.report(Diagnostic::MiddleUnitRegistered {
                residue: residue_name.to_string(),
                block,
            });
            TemplateEntry {
                block,
                residue_name,
                fragment,
            }
        })
        .collect();

    let symbols = sequence.chars().count();
    if template.len() < symbols {
        // A head-to-tail chain places no middle units, so nothing is lost.
        if dop > MIN_DEGREE_OF_POLYMERIZATION {
            warn!(
                "Sequence '{}' truncated to {} of {} block(s) by the available middle monomers",
                sequence,
                template.len(),
                symbols
            );
            reporter.report(Diagnostic::SequenceTruncated {
                requested: symbols,
                used: template.len(),
            });
        } else {
            debug!(
                "Sequence '{}' truncated to {} block(s); no middle units are placed",
                sequence,
                template.len()
            );
        }
    }
    template
}

fn assemble(
    head: &EndGroup,
    tail: &EndGroup,
    template: &[TemplateEntry],
    dop: usize,
    config: &LinearBuildConfig,
    source: OrientationSource,
) -> Result<PolymerChain, AssemblyError> {
    let mut blocks: HashMap<char, &TemplateEntry> = HashMap::new();
    for entry in template {
        blocks.entry(entry.block).or_insert(entry);
    }

    let mut chain = PolymerChain::new(&config.sequence, source);
    let mut previous = chain.push_unit(ChainUnit::new(
        head.residue_name,
        head.fragment,
        UnitRole::Head,
        None,
    ));

    let repeats = dop.saturating_sub(2);
    for _ in 0..repeats {
        for block in template.iter().map(|entry| entry.block) {
            let entry = blocks.get(&block).ok_or_else(|| {
                AssemblyError::Internal(format!("block '{block}' has no registered middle unit"))
            })?;
            let unit = ChainUnit::new(
                entry.residue_name,
                entry.fragment,
                UnitRole::Middle,
                Some(block),
            );
            let id = chain.push_unit(unit);
            link(&mut chain, previous, id)?;
            previous = id;
        }
    }

    let tail_id = chain.push_unit(ChainUnit::new(
        tail.residue_name,
        tail.fragment,
        UnitRole::Tail,
        None,
    ));
    link(&mut chain, previous, tail_id)?;

    Ok(chain)
}

fn link(chain: &mut PolymerChain, from: UnitId, to: UnitId) -> Result<(), AssemblyError> {
    chain.link(from, to).map(|_| ()).ok_or_else(|| {
        AssemblyError::Internal("no open port left to link consecutive units".to_string())
    })
}

fn relax_chain(
    chain: &mut PolymerChain,
    relaxer: Option<&dyn ChainRelaxer>,
    reporter: &DiagnosticReporter,
) -> Result<(), AssemblyError> {
    let Some(relaxer) = relaxer else {
        warn!("Relaxation requested but no relaxer is available; leaving chain unrelaxed");
        reporter.report(Diagnostic::RelaxationSkipped);
        return Ok(());
    };

    info!("Relaxing chain to find a more stable conformer");
    reporter.report(Diagnostic::RelaxationStart);
    relaxer.relax(chain)?;
    chain.mark_relaxed();
    info!("Chain relaxation completed");
    reporter.report(Diagnostic::RelaxationFinish);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::group::{GroupError, TerminalOrientation};
    use crate::engine::config::LinearBuildConfigBuilder;
    use crate::engine::relax::RelaxationError;
    use std::cell::Cell;
    use std::sync::Mutex;

    fn group(entries: &[(&str, &[&str])], orientation: TerminalOrientation) -> MonomerGroup {
        MonomerGroup::new(
            entries
                .iter()
                .map(|&(name, patterns)| (name, patterns.to_vec())),
            orientation,
        )
        .unwrap()
    }

    fn abc_group() -> MonomerGroup {
        group(
            &[
                ("A", &["[*]-C-C-[*]"]),
                ("B", &["[*]-O"]),
                ("C", &["[*]-N"]),
            ],
            TerminalOrientation::new("B", "C"),
        )
    }

    fn config(dop: usize, sequence: &str) -> LinearBuildConfig {
        LinearBuildConfigBuilder::new()
            .degree_of_polymerization(dop)
            .sequence(sequence)
            .build()
            .unwrap()
    }

    struct CountingRelaxer {
        calls: Cell<usize>,
    }

    impl ChainRelaxer for CountingRelaxer {
        fn relax(&self, _chain: &mut PolymerChain) -> Result<(), RelaxationError> {
            self.calls.set(self.calls.get() + 1);
            Ok(())
        }
    }

    struct FailingRelaxer;

    impl ChainRelaxer for FailingRelaxer {
        fn relax(&self, _chain: &mut PolymerChain) -> Result<(), RelaxationError> {
            Err(RelaxationError("embedding failed".to_string()))
        }
    }

    #[test]
    fn declared_homopolymer_has_requested_length_and_order() {
        let group = abc_group();
        let chain = run(&group, &config(5, "A"), None, &DiagnosticReporter::new()).unwrap();

        assert_eq!(chain.residue_names(), vec!["B", "A", "A", "A", "C"]);
        assert_eq!(
            chain.roles(),
            vec![
                UnitRole::Head,
                UnitRole::Middle,
                UnitRole::Middle,
                UnitRole::Middle,
                UnitRole::Tail
            ]
        );
        assert_eq!(chain.links().len(), 4);
        assert_eq!(chain.open_port_count(), 0);
        assert_eq!(chain.orientation_source(), OrientationSource::Declared);
    }

    #[test]
    fn every_atom_is_neutralized() {
        let group = abc_group();
        let chain = run(&group, &config(4, "A"), None, &DiagnosticReporter::new()).unwrap();
        assert_eq!(chain.atom_count(), 1 + 2 * 2 + 1);
        assert!(chain.atoms().all(|atom| atom.partial_charge == Some(0.0)));
    }

    #[test]
    fn minimal_chain_links_head_to_tail() {
        let group = abc_group();
        let chain = run(&group, &config(2, "A"), None, &DiagnosticReporter::new()).unwrap();
        assert_eq!(chain.residue_names(), vec!["B", "C"]);
        assert_eq!(chain.links().len(), 1);
    }

    #[test]
    fn sequence_is_truncated_to_available_middle_monomers() {
        let events = Mutex::new(Vec::new());
        let reporter = DiagnosticReporter::with_callback(Box::new(|event| {
            events.lock().unwrap().push(event);
        }));
        let group = abc_group();
        let chain = run(&group, &config(4, "AB"), None, &reporter).unwrap();
        drop(reporter);

        assert_eq!(chain.residue_names(), vec!["B", "A", "A", "C"]);
        assert_eq!(chain.sequence(), "AB");
        let events = events.into_inner().unwrap();
        assert!(events.contains(&Diagnostic::SequenceTruncated {
            requested: 2,
            used: 1
        }));
        assert!(events.iter().any(Diagnostic::is_unverified));
    }

    #[test]
    fn group_without_middle_monomers_is_flagged() {
        let events = Mutex::new(Vec::new());
        let reporter = DiagnosticReporter::with_callback(Box::new(|event| {
            events.lock().unwrap().push(event);
        }));
        let group = group(
            &[("B", &["[*]-O"]), ("C", &["[*]-N"])],
            TerminalOrientation::new("B", "C"),
        );
        let chain = run(&group, &config(10, "A"), None, &reporter).unwrap();
        drop(reporter);

        assert_eq!(chain.residue_names(), vec!["B", "C"]);
        assert!(
            events
                .into_inner()
                .unwrap()
                .contains(&Diagnostic::SequenceTruncated {
                    requested: 1,
                    used: 0
                })
        );
    }

    #[test]
    fn head_to_tail_chain_reports_no_truncation() {
        let events = Mutex::new(Vec::new());
        let reporter = DiagnosticReporter::with_callback(Box::new(|event| {
            events.lock().unwrap().push(event);
        }));
        let group = group(
            &[("B", &["[*]-O"]), ("C", &["[*]-N"])],
            TerminalOrientation::new("B", "C"),
        );
        run(&group, &config(2, "A"), None, &reporter).unwrap();
        drop(reporter);

        assert!(!events.into_inner().unwrap().iter().any(Diagnostic::is_unverified));
    }

    #[test]
    fn hand_built_invalid_config_is_rejected() {
        let group = abc_group();
        let mut cfg = config(3, "A");
        cfg.degree_of_polymerization = 1;
        let result = run(&group, &cfg, None, &DiagnosticReporter::new());
        assert!(matches!(result, Err(AssemblyError::Config { .. })));
    }

    #[test]
    fn block_copolymer_alternates_middle_monomers() {
        let group = group(
            &[
                ("A", &["[*]-C-C-[*]"]),
                ("D", &["[*]-C-O-[*]"]),
                ("B", &["[*]-O"]),
                ("C", &["[*]-N"]),
            ],
            TerminalOrientation::new("B", "C"),
        );
        let chain = run(&group, &config(4, "AB"), None, &DiagnosticReporter::new()).unwrap();
        assert_eq!(chain.residue_names(), vec!["B", "A", "D", "A", "D", "C"]);
        let blocks: Vec<_> = chain.units().filter_map(|unit| unit.block()).collect();
        assert_eq!(blocks, vec!['A', 'B', 'A', 'B']);
    }

    #[test]
    fn repeated_symbol_reuses_first_registered_monomer() {
        let group = group(
            &[
                ("A", &["[*]-C-C-[*]"]),
                ("D", &["[*]-C-O-[*]"]),
                ("B", &["[*]-O"]),
                ("C", &["[*]-N"]),
            ],
            TerminalOrientation::new("B", "C"),
        );
        let chain = run(&group, &config(3, "AA"), None, &DiagnosticReporter::new()).unwrap();
        assert_eq!(chain.residue_names(), vec!["B", "A", "A", "C"]);
    }

    #[test]
    fn branchable_group_is_rejected_for_any_length() {
        let group = group(
            &[("A", &["[*]-C(-[*])-[*]"]), ("B", &["[*]-O"]), ("C", &["[*]-N"])],
            TerminalOrientation::new("B", "C"),
        );
        assert!(group.is_branchable());
        for dop in [2, 5, 50] {
            let result = run(&group, &config(dop, "A"), None, &DiagnosticReporter::new());
            assert!(matches!(result, Err(AssemblyError::Morphology)));
        }
    }

    #[test]
    fn empty_residue_never_reaches_assembly() {
        let result = MonomerGroup::new(
            [("A", Vec::<String>::new())],
            TerminalOrientation::undeclared(),
        );
        assert!(matches!(
            result,
            Err(GroupError::EmptyResidue { residue }) if residue == "A"
        ));
    }

    #[test]
    fn inferred_orientation_is_recorded_and_reported() {
        let events = Mutex::new(Vec::new());
        let reporter = DiagnosticReporter::with_callback(Box::new(|event| {
            events.lock().unwrap().push(event);
        }));
        let group = group(
            &[
                ("A", &["[*]-C-C-[*]"]),
                ("B", &["[*]-O"]),
                ("C", &["[*]-N"]),
            ],
            TerminalOrientation::undeclared(),
        );

        let chain = run(&group, &config(3, "A"), None, &reporter).unwrap();
        drop(reporter);

        assert_eq!(chain.orientation_source(), OrientationSource::Inferred);
        assert_eq!(chain.residue_names(), vec!["B", "A", "C"]);
        let events = events.into_inner().unwrap();
        assert!(events.iter().any(Diagnostic::is_unverified));
    }

    #[test]
    fn milestones_are_reported_in_order() {
        let events = Mutex::new(Vec::new());
        let reporter = DiagnosticReporter::with_callback(Box::new(|event| {
            events.lock().unwrap().push(event);
        }));
        let group = abc_group();
        run(&group, &config(3, "A"), None, &reporter).unwrap();
        drop(reporter);

        let events = events.into_inner().unwrap();
        assert_eq!(
            events,
            vec![
                Diagnostic::OrientationDeclared {
                    head: "B".to_string(),
                    tail: "C".to_string()
                },
                Diagnostic::MiddleUnitRegistered {
                    residue: "A".to_string(),
                    block: 'A'
                },
                Diagnostic::TerminalUnitRegistered {
                    residue: "B".to_string(),
                    role: TerminalRole::Head
                },
                Diagnostic::TerminalUnitRegistered {
                    residue: "C".to_string(),
                    role: TerminalRole::Tail
                },
                Diagnostic::AssemblyStart {
                    degree_of_polymerization: 3,
                    estimated_atoms: 4
                },
                Diagnostic::AssemblyFinish { units: 3, atoms: 4 },
            ]
        );
    }

    #[test]
    fn diagnostics_do_not_change_the_result() {
        let group = abc_group();
        let silent = run(&group, &config(6, "A"), None, &DiagnosticReporter::new()).unwrap();
        let reporter = DiagnosticReporter::with_callback(Box::new(|_| {}));
        let observed = run(&group, &config(6, "A"), None, &reporter).unwrap();
        assert_eq!(silent.residue_names(), observed.residue_names());
        assert_eq!(silent.atom_count(), observed.atom_count());
    }

    #[test]
    fn hydrogen_capping_leaves_no_open_ports() {
        let group = group(
            &[("A", &["[*]-C-C-[*]"]), ("B", &["[*]-O"])],
            TerminalOrientation::new("B", "B"),
        );
        let mut cfg = config(3, "A");
        cfg.add_hydrogens = true;

        let chain = run(&group, &cfg, None, &DiagnosticReporter::new()).unwrap();
        assert_eq!(chain.residue_names(), vec!["B", "A", "B"]);
        assert_eq!(chain.open_port_count(), 0);
        // Linked ports are bonds, not caps.
        assert_eq!(chain.atoms().filter(|atom| atom.is_cap).count(), 0);
    }

    #[test]
    fn relaxation_runs_when_requested() {
        let group = abc_group();
        let relaxer = CountingRelaxer {
            calls: Cell::new(0),
        };
        let mut cfg = config(3, "A");
        cfg.relax = true;

        let chain = run(&group, &cfg, Some(&relaxer), &DiagnosticReporter::new()).unwrap();
        assert!(chain.is_relaxed());
        assert_eq!(relaxer.calls.get(), 1);
    }

    #[test]
    fn relaxation_is_skipped_without_relaxer() {
        let events = Mutex::new(Vec::new());
        let reporter = DiagnosticReporter::with_callback(Box::new(|event| {
            events.lock().unwrap().push(event);
        }));
        let group = abc_group();
        let mut cfg = config(3, "A");
        cfg.relax = true;

        let chain = run(&group, &cfg, None, &reporter).unwrap();
        drop(reporter);

        assert!(!chain.is_relaxed());
        assert!(
            events
                .into_inner()
                .unwrap()
                .contains(&Diagnostic::RelaxationSkipped)
        );
    }

    #[test]
    fn relaxer_is_not_called_unless_requested() {
        let group = abc_group();
        let relaxer = CountingRelaxer {
            calls: Cell::new(0),
        };
        let chain = run(&group, &config(3, "A"), Some(&relaxer), &DiagnosticReporter::new())
            .unwrap();
        assert!(!chain.is_relaxed());
        assert_eq!(relaxer.calls.get(), 0);
    }

    #[test]
    fn relaxation_failure_is_propagated() {
        let group = abc_group();
        let mut cfg = config(3, "A");
        cfg.relax = true;
        let result = run(&group, &cfg, Some(&FailingRelaxer), &DiagnosticReporter::new());
        assert!(matches!(result, Err(AssemblyError::Relaxation { .. })));
    }
}

use crate::cli::InspectArgs;
use crate::error::{CliError, Result};
use polyweave::core::models::group::{MonomerGroup, PortFilter, TerminalRole};
use polyweave::engine::config::MIN_DEGREE_OF_POLYMERIZATION;
use polyweave::engine::estimate::estimate_chain_atoms_linear;
use std::fmt::Write as _;
use tracing::info;

pub fn run(args: InspectArgs) -> Result<()> {
    if let Some(dop) = args.degree_of_polymerization {
        if dop < MIN_DEGREE_OF_POLYMERIZATION {
            return Err(CliError::Argument(format!(
                "--dop must be at least {MIN_DEGREE_OF_POLYMERIZATION} (got {dop})"
            )));
        }
    }

    info!("Loading monomer definitions from {:?}", &args.monomers);
    let group = MonomerGroup::load(&args.monomers)?;
    print!("{}", render_group_summary(&group, args.degree_of_polymerization));
    Ok(())
}

fn render_group_summary(group: &MonomerGroup, dop: Option<usize>) -> String {
    let mut out = String::new();
    let (middle, terminal) = group.count_by_role();

    let _ = writeln!(
        out,
        "Monomer group: {} residue(s), {} fragment(s) ({} middle, {} terminal)",
        group.residue_names().count(),
        group.n_monomers(),
        middle,
        terminal
    );
    for name in group.residue_names() {
        for (index, fragment) in group.fragments(name).unwrap_or_default().iter().enumerate() {
            let _ = writeln!(
                out,
                "  {:<8} [{}] {:<9} {}",
                name,
                index,
                fragment.class().to_string(),
                fragment.pattern()
            );
        }
    }

    let morphology = if group.is_linear() { "linear" } else { "branchable" };
    let _ = writeln!(out, "Morphology: {morphology}");

    let orientation = group.terminal_orientation();
    if orientation.is_complete() {
        let _ = writeln!(out, "End groups: declared {orientation}");
    } else {
        let candidates = group
            .iter_fragments(PortFilter::TerminalOnly)
            .map(|(name, _)| name)
            .take(TerminalRole::ALL.len())
            .collect::<Vec<_>>()
            .join(", ");
        let _ = writeln!(out, "End groups: not declared (would infer from: {candidates})");
    }

    if let Some(dop) = dop {
        let _ = writeln!(
            out,
            "Estimated atoms for {} units: {}",
            dop,
            estimate_chain_atoms_linear(group, dop)
        );
    }
    out
}

use crate::cli::BuildArgs;
use crate::config::PartialBuildConfig;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use polyweave::{
    core::models::chain::PolymerChain, core::models::group::MonomerGroup,
    engine::diagnostics::DiagnosticReporter, workflows,
};
use std::fmt::Write as _;
use tracing::{info, warn};

pub fn run(args: BuildArgs) -> Result<()> {
    let partial_config = match &args.config {
        Some(path) => PartialBuildConfig::from_file(path)?,
        None => PartialBuildConfig::default(),
    };
    info!("Merging build configuration from file and CLI arguments...");
    let config = partial_config.merge_with_cli(&args)?;

    info!("Loading monomer definitions from {:?}", &args.monomers);
    let group = MonomerGroup::load(&args.monomers)?;

    let progress_handler = CliProgressHandler::new();
    let reporter = DiagnosticReporter::with_callback(progress_handler.get_callback());

    println!("Starting linear chain assembly...");
    info!("Invoking the linear build workflow...");
    let chain = workflows::linear::run(&group, &config, None, &reporter)?;

    if !chain.orientation_source().is_verified() {
        warn!(
            "End groups were inferred rather than declared; add a [term_orient] table to fix them."
        );
    }
    print!("{}", render_chain_summary(&chain));
    Ok(())
}

fn render_chain_summary(chain: &PolymerChain) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Assembled chain: {} units, {} atoms, {} links (end groups {})",
        chain.len(),
        chain.atom_count(),
        chain.links().len(),
        chain.orientation_source()
    );
    for (position, unit) in chain.units().enumerate() {
        let block = unit
            .block()
            .map(|block| format!(" [{block}]"))
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "  {:>4}  {:<8} {:<6}{}",
            position + 1,
            unit.residue_name(),
            unit.role().to_string(),
            block
        );
    }
    if chain.open_port_count() > 0 {
        let _ = writeln!(out, "  {} port(s) left open", chain.open_port_count());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use polyweave::core::models::group::TerminalOrientation;
    use polyweave::engine::config::LinearBuildConfigBuilder;

    #[test]
    fn summary_lists_units_in_chain_order() {
        let group = MonomerGroup::new(
            [
                ("A", vec!["[*]-C-C-[*]"]),
                ("B", vec!["[*]-O"]),
                ("C", vec!["[*]-N"]),
            ],
            TerminalOrientation::new("B", "C"),
        )
        .unwrap();
        let config = LinearBuildConfigBuilder::new()
            .degree_of_polymerization(3)
            .build()
            .unwrap();
        let chain =
            workflows::linear::run(&group, &config, None, &DiagnosticReporter::new()).unwrap();

        let summary = render_chain_summary(&chain);
        let lines: Vec<_> = summary.lines().collect();
        assert_eq!(
            lines[0],
            "Assembled chain: 3 units, 4 atoms, 2 links (end groups declared)"
        );
        assert!(lines[1].contains('B') && lines[1].contains("head"));
        assert!(lines[2].contains("middle") && lines[2].ends_with("[A]"));
        assert!(lines[3].contains('C') && lines[3].contains("tail"));
        assert_eq!(lines.len(), 4);
    }
}

use indicatif::{ProgressBar, ProgressStyle};
use polyweave::engine::diagnostics::{Diagnostic, DiagnosticCallback};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::warn;

const SPINNER_TICK_MS: u64 = 80;

/// Renders assembly diagnostics as a spinner on stderr.
#[derive(Clone)]
pub struct CliProgressHandler {
    pb: Arc<Mutex<ProgressBar>>,
}

impl CliProgressHandler {
    pub fn new() -> Self {
        let pb = ProgressBar::new(0)
            .with_style(Self::spinner_style())
            .with_message("Initializing...");
        pb.set_draw_target(indicatif::ProgressDrawTarget::stderr());
        pb.disable_steady_tick();
        pb.finish_and_clear();

        Self {
            pb: Arc::new(Mutex::new(pb)),
        }
    }

    pub fn get_callback(&self) -> DiagnosticCallback<'static> {
        let pb_clone = self.pb.clone();

        Box::new(move |diagnostic: Diagnostic| {
            let Ok(pb_guard) = pb_clone.lock() else {
                warn!("Progress bar mutex was poisoned. Cannot update progress.");
                return;
            };

            match diagnostic {
                Diagnostic::OrientationDeclared { head, tail } => {
                    pb_guard.println(format!(
                        "  Using declared end groups: head {head}, tail {tail}"
                    ));
                }
                Diagnostic::OrientationInferred { head, tail } => {
                    pb_guard.println(format!(
                        "  ⚠ End groups inferred (head {head}, tail {tail}); verify the chain before use"
                    ));
                }
                Diagnostic::MiddleUnitRegistered { residue, block } => {
                    pb_guard.set_message(format!("Registered middle unit {residue} [{block}]"));
                }
                Diagnostic::SequenceTruncated { requested, used } => {
                    pb_guard.println(format!(
                        "  ⚠ Sequence truncated to {used} of {requested} block(s); add middle monomers or shorten the sequence"
                    ));
                }
                Diagnostic::TerminalUnitRegistered { residue, role } => {
                    pb_guard.set_message(format!("Registered {role} unit {residue}"));
                }
                Diagnostic::AssemblyStart {
                    degree_of_polymerization,
                    estimated_atoms,
                } => {
                    pb_guard.reset();
                    pb_guard.set_style(Self::spinner_style());
                    pb_guard.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
                    pb_guard.set_message(format!(
                        "Assembling {degree_of_polymerization} units (~{estimated_atoms} atoms)"
                    ));
                }
                Diagnostic::AssemblyFinish { units, atoms } => {
                    pb_guard.disable_steady_tick();
                    pb_guard
                        .finish_with_message(format!("✓ Assembled {units} units ({atoms} atoms)"));
                }
                Diagnostic::RelaxationStart => {
                    pb_guard.reset();
                    pb_guard.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
                    pb_guard.set_message("Relaxing chain");
                }
                Diagnostic::RelaxationFinish => {
                    pb_guard.disable_steady_tick();
                    pb_guard.finish_with_message("✓ Relaxed");
                }
                Diagnostic::RelaxationSkipped => {
                    pb_guard.println("  Relaxation skipped: no relaxer is available");
                }
            }
        })
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .expect("Failed to create spinner style template")
    }
}

impl Default for CliProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}

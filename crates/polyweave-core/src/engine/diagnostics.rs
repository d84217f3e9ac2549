use crate::core::models::group::TerminalRole;

/// Milestone events emitted while a chain is assembled.
///
/// Events are informational. Whether a callback is installed never changes the outcome of
/// an assembly.
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    OrientationDeclared { head: String, tail: String },
    /// The end groups were picked automatically and should be verified by the caller.
    OrientationInferred { head: String, tail: String },

    MiddleUnitRegistered { residue: String, block: char },
    /// Fewer sequence symbols were placed than requested because middle fragments ran out.
    SequenceTruncated { requested: usize, used: usize },
    TerminalUnitRegistered { residue: String, role: TerminalRole },

    AssemblyStart {
        degree_of_polymerization: usize,
        estimated_atoms: usize,
    },
    AssemblyFinish { units: usize, atoms: usize },

    RelaxationStart,
    RelaxationFinish,
    RelaxationSkipped,
}

impl Diagnostic {
    /// Whether this event flags an outcome that was not validated against a declaration.
    pub fn is_unverified(&self) -> bool {
        matches!(
            self,
            Self::OrientationInferred { .. } | Self::SequenceTruncated { .. }
        )
    }
}

pub type DiagnosticCallback<'a> = Box<dyn Fn(Diagnostic) + Send + Sync + 'a>;

#[derive(Default)]
pub struct DiagnosticReporter<'a> {
    callback: Option<DiagnosticCallback<'a>>,
}

impl<'a> DiagnosticReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: DiagnosticCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Diagnostic) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }
}

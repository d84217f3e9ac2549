use thiserror::Error;

/// Sequence used when none is given: a single block repeated along the chain.
pub const DEFAULT_SEQUENCE: &str = "A";

/// The smallest chain that still has a head and a tail.
pub const MIN_DEGREE_OF_POLYMERIZATION: usize = 2;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

/// Settings for assembling one linear chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinearBuildConfig {
    /// Total number of units in the chain, end groups included.
    pub degree_of_polymerization: usize,
    /// Block symbols; each distinct symbol selects one middle fragment.
    pub sequence: String,
    /// Cap ports left open after linking with hydrogens.
    pub add_hydrogens: bool,
    /// Hand the finished chain to a relaxer.
    pub relax: bool,
}

impl LinearBuildConfig {
    /// Checks the settings that the builder enforces, for configs assembled by hand.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let dop = self.degree_of_polymerization;
        if dop < MIN_DEGREE_OF_POLYMERIZATION {
            return Err(ConfigError::InvalidParameter {
                name: "degree_of_polymerization",
                reason: format!(
                    "must be at least {MIN_DEGREE_OF_POLYMERIZATION} to hold both end groups (got {dop})"
                ),
            });
        }
        if self.sequence.is_empty() {
            return Err(ConfigError::InvalidParameter {
                name: "sequence",
                reason: "must contain at least one block symbol".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct LinearBuildConfigBuilder {
    degree_of_polymerization: Option<usize>,
    sequence: Option<String>,
    add_hydrogens: bool,
    relax: bool,
}

impl LinearBuildConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn degree_of_polymerization(mut self, dop: usize) -> Self {
        self.degree_of_polymerization = Some(dop);
        self
    }
    pub fn sequence(mut self, sequence: &str) -> Self {
        self.sequence = Some(sequence.to_string());
        self
    }
    pub fn add_hydrogens(mut self, add_hydrogens: bool) -> Self {
        self.add_hydrogens = add_hydrogens;
        self
    }
    pub fn relax(mut self, relax: bool) -> Self {
        self.relax = relax;
        self
    }

    pub fn build(self) -> Result<LinearBuildConfig, ConfigError> {
        let degree_of_polymerization = self
            .degree_of_polymerization
            .ok_or(ConfigError::MissingParameter("degree_of_polymerization"))?;

        let config = LinearBuildConfig {
            degree_of_polymerization,
            sequence: self
                .sequence
                .unwrap_or_else(|| DEFAULT_SEQUENCE.to_string()),
            add_hydrogens: self.add_hydrogens,
            relax: self.relax,
        };
        config.validate()?;
        Ok(config)
    }
}

use crate::cli::{BuildArgs, HydrogenFlags, RelaxFlags};
use crate::error::{CliError, Result};
use polyweave::engine::config as core_config;
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

/// Build settings as written in a configuration file; every key is optional.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct PartialBuildConfig {
    #[serde(rename = "degree-of-polymerization")]
    degree_of_polymerization: Option<usize>,
    sequence: Option<String>,
    #[serde(rename = "add-hydrogens")]
    add_hydrogens: Option<bool>,
    relax: Option<bool>,
}

impl PartialBuildConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading build configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Resolves the final build settings: CLI flags first, then `--set` values, then the file.
    pub fn merge_with_cli(mut self, args: &BuildArgs) -> Result<core_config::LinearBuildConfig> {
        self.apply_set_values(&args.set_values)?;

        let degree_of_polymerization = args
            .degree_of_polymerization
            .or(self.degree_of_polymerization)
            .ok_or_else(|| {
                CliError::Config(
                    "`degree-of-polymerization` is required either in the config file or via --dop."
                        .to_string(),
                )
            })?;
        let sequence = args
            .sequence
            .clone()
            .or(self.sequence)
            .unwrap_or_else(|| core_config::DEFAULT_SEQUENCE.to_string());

        core_config::LinearBuildConfigBuilder::new()
            .degree_of_polymerization(degree_of_polymerization)
            .sequence(&sequence)
            .add_hydrogens(Self::merge_hydrogens(args.hydrogens, self.add_hydrogens))
            .relax(Self::merge_relax(args.relaxation, self.relax))
            .build()
            .map_err(|e| CliError::Config(e.to_string()))
    }

    fn merge_hydrogens(cli_flags: HydrogenFlags, file_val: Option<bool>) -> bool {
        if cli_flags.add_hydrogens {
            true
        } else if cli_flags.no_hydrogens {
            false
        } else {
            file_val.unwrap_or(false)
        }
    }

    fn merge_relax(cli_flags: RelaxFlags, file_val: Option<bool>) -> bool {
        if cli_flags.relax {
            true
        } else if cli_flags.no_relax {
            false
        } else {
            file_val.unwrap_or(false)
        }
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let Some((key, value_str)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };

            match key {
                "degree-of-polymerization" => {
                    self.degree_of_polymerization = Some(value_str.parse().map_err(|_| {
                        CliError::Config(format!(
                            "Invalid integer value for {}: {}",
                            key, value_str
                        ))
                    })?);
                }
                "sequence" => {
                    self.sequence = Some(value_str.to_string());
                }
                "add-hydrogens" => {
                    self.add_hydrogens = Some(parse_bool(key, value_str)?);
                }
                "relax" => {
                    self.relax = Some(parse_bool(key, value_str)?);
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}

fn parse_bool(key: &str, value_str: &str) -> Result<bool> {
    value_str.parse().map_err(|_| {
        CliError::Config(format!("Invalid boolean value for {}: {}", key, value_str))
    })
}

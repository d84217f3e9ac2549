use crate::core::models::group::{
    GroupError, MonomerGroup, PatternSpec, TerminalOrientation, TerminalRole,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

const INLINE_SOURCE: &str = "<inline>";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawMonomerFile {
    monomers: toml::Table,
    #[serde(default)]
    term_orient: BTreeMap<String, String>,
}

#[derive(Debug, Serialize)]
struct MonomerFileOut {
    monomers: toml::Table,
    #[serde(skip_serializing_if = "TerminalOrientation::is_empty")]
    term_orient: TerminalOrientation,
}

#[derive(Debug, Error)]
pub enum MonomerFileError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error("Residue '{residue}' must map to a pattern string or a list of pattern strings: {source}")]
    InvalidPatternSpec {
        residue: String,
        source: toml::de::Error,
    },
    #[error("Unknown terminal orientation key '{key}' (expected 'head' or 'tail')")]
    UnknownOrientationKey { key: String },
    #[error("TOML serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error(transparent)]
    Group(#[from] GroupError),
}

impl MonomerGroup {
    /// Loads a monomer group from a TOML file.
    ///
    /// The file holds a `[monomers]` table mapping residue names to a pattern or a list of
    /// patterns, and an optional `[term_orient]` table with `head` and/or `tail` entries.
    /// Residues keep the order in which they appear in the file.
    pub fn load(path: &Path) -> Result<Self, MonomerFileError> {
        let path_str = path.to_string_lossy().to_string();
        let content = std::fs::read_to_string(path).map_err(|e| MonomerFileError::Io {
            path: path_str.clone(),
            source: e,
        })?;
        let group = parse_monomer_file(&content, &path_str)?;
        debug!(
            "Loaded {} monomer fragments from '{}'",
            group.n_monomers(),
            path_str
        );
        Ok(group)
    }

    /// Parses a monomer group from TOML text in the format read by [`MonomerGroup::load`].
    pub fn from_toml_str(content: &str) -> Result<Self, MonomerFileError> {
        parse_monomer_file(content, INLINE_SOURCE)
    }

    /// Writes the group to `path` in the format read by [`MonomerGroup::load`].
    pub fn save(&self, path: &Path) -> Result<(), MonomerFileError> {
        let path_str = path.to_string_lossy().to_string();
        let content = self.to_toml_string()?;
        std::fs::write(path, content).map_err(|e| MonomerFileError::Io {
            path: path_str.clone(),
            source: e,
        })?;
        debug!(
            "Saved {} monomer fragments to '{}'",
            self.n_monomers(),
            path_str
        );
        Ok(())
    }

    /// Renders the group as a monomer file.
    ///
    /// Every residue is written as a list of patterns, in declaration order. The
    /// `[term_orient]` table is omitted when no role is declared.
    pub fn to_toml_string(&self) -> Result<String, MonomerFileError> {
        let mut monomers = toml::Table::new();
        for name in self.residue_names() {
            let patterns = self
                .fragments(name)
                .unwrap_or_default()
                .iter()
                .map(|fragment| fragment.pattern().to_string())
                .collect();
            monomers.insert(
                name.to_string(),
                toml::Value::try_from(PatternSpec::Many(patterns))?,
            );
        }

        let out = MonomerFileOut {
            monomers,
            term_orient: self.terminal_orientation().clone(),
        };
        Ok(toml::to_string(&out)?)
    }
}

fn parse_monomer_file(content: &str, path: &str) -> Result<MonomerGroup, MonomerFileError> {
    let raw: RawMonomerFile = toml::from_str(content).map_err(|e| MonomerFileError::Toml {
        path: path.to_string(),
        source: e,
    })?;

    let mut orientation = TerminalOrientation::undeclared();
    for (key, residue) in &raw.term_orient {
        let role: TerminalRole = key
            .parse()
            .map_err(|_| MonomerFileError::UnknownOrientationKey { key: key.clone() })?;
        orientation.set(role, residue);
    }

    let fragments = raw
        .monomers
        .into_iter()
        .map(|(residue, value)| match PatternSpec::deserialize(value) {
            Ok(spec) => Ok((residue, spec)),
            Err(source) => Err(MonomerFileError::InvalidPatternSpec { residue, source }),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(MonomerGroup::new(fragments, orientation)?)
}

use super::elements;
use super::{FragmentProfile, FragmentValidator, PatternAtom};
use std::collections::BTreeMap;
use thiserror::Error;

const WILDCARD_SYMBOL: &str = "*";
const QUERY_SYMBOL: &str = "?";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("Pattern is empty")]
    Empty,
    #[error("Unexpected character '{ch}' at position {position}")]
    UnexpectedChar { position: usize, ch: char },
    #[error("Bracket atom opened at position {position} is never closed")]
    UnclosedBracket { position: usize },
    #[error("Empty bracket atom at position {position}")]
    EmptyBracket { position: usize },
    #[error("Unknown element symbol '{symbol}' at position {position}")]
    UnknownElement { position: usize, symbol: String },
    #[error("Unbalanced branch at position {position}")]
    UnbalancedBranch { position: usize },
    #[error("Empty branch opened at position {position}")]
    EmptyBranch { position: usize },
    #[error("Bond at position {position} does not join two atoms")]
    DanglingBond { position: usize },
    #[error("Ring closure {label} is never closed")]
    UnclosedRing { label: u16 },
    #[error("Pattern rejected: {reason}")]
    Rejected { reason: String },
}

/// Structural SMARTS scanner used as the default fragment validator.
///
/// Checks bracket atoms, organic-subset atoms, bonds, branches, ring closures and
/// dot-separated components. Atom primitives after the element (degree, hydrogen count,
/// atom maps, ...) are accepted without further interpretation, except for the formal charge.
/// Wildcard atoms (`*`, `[*:1]`, `[1*]`, `[#0]`) are ports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SmartsInspector;

impl FragmentValidator for SmartsInspector {
    fn inspect(&self, pattern: &str) -> Result<FragmentProfile, PatternError> {
        Scanner::new(pattern).scan()
    }
}

struct OpenBranch {
    opened_at: usize,
    parent: usize,
    atoms_before: usize,
}

struct Scanner<'a> {
    pattern: &'a str,
    bytes: &'a [u8],
    pos: usize,
    atoms: Vec<PatternAtom>,
    branches: Vec<OpenBranch>,
    prev_atom: Option<usize>,
    pending_bond: Option<usize>,
    pending_dot: Option<usize>,
    open_rings: BTreeMap<u16, usize>,
}

impl<'a> Scanner<'a> {
    fn new(pattern: &'a str) -> Self {
        Self {
            pattern,
            bytes: pattern.as_bytes(),
            pos: 0,
            atoms: Vec::new(),
            branches: Vec::new(),
            prev_atom: None,
            pending_bond: None,
            pending_dot: None,
            open_rings: BTreeMap::new(),
        }
    }

    fn scan(mut self) -> Result<FragmentProfile, PatternError> {
        if self.pattern.is_empty() {
            return Err(PatternError::Empty);
        }

        while let Some(&byte) = self.bytes.get(self.pos) {
            match byte {
                b'(' => self.open_branch()?,
                b')' => self.close_branch()?,
                b'.' => self.split_component()?,
                b'[' => self.bracket_atom()?,
                b'*' => {
                    self.pos += 1;
                    self.push_atom(PatternAtom::new(WILDCARD_SYMBOL, 0, true));
                }
                b'%' => self.two_digit_ring_closure()?,
                b'0'..=b'9' => {
                    let start = self.pos;
                    self.pos += 1;
                    self.ring_closure(u16::from(byte - b'0'), start)?;
                }
                b'-' | b'=' | b'#' | b':' | b'~' | b'@' | b'/' | b'\\' | b'!' | b',' | b';'
                | b'&' => self.bond()?,
                b if b.is_ascii_alphabetic() => self.bare_atom()?,
                _ => return Err(self.unexpected(self.pos)),
            }
        }

        self.finish()
    }

    fn finish(self) -> Result<FragmentProfile, PatternError> {
        if let Some(branch) = self.branches.last() {
            return Err(PatternError::UnbalancedBranch {
                position: branch.opened_at,
            });
        }
        if let Some(position) = self.pending_bond {
            return Err(PatternError::DanglingBond { position });
        }
        if let Some(position) = self.pending_dot {
            return Err(PatternError::UnexpectedChar { position, ch: '.' });
        }
        if let Some(&label) = self.open_rings.keys().next() {
            return Err(PatternError::UnclosedRing { label });
        }
        if self.atoms.is_empty() {
            return Err(PatternError::Empty);
        }
        Ok(FragmentProfile { atoms: self.atoms })
    }

    fn push_atom(&mut self, atom: PatternAtom) {
        self.atoms.push(atom);
        self.prev_atom = Some(self.atoms.len() - 1);
        self.pending_bond = None;
        self.pending_dot = None;
    }

    fn unexpected(&self, position: usize) -> PatternError {
        let ch = self
            .pattern
            .get(position..)
            .and_then(|rest| rest.chars().next())
            .unwrap_or(char::REPLACEMENT_CHARACTER);
        PatternError::UnexpectedChar { position, ch }
    }

    fn open_branch(&mut self) -> Result<(), PatternError> {
        let start = self.pos;
        let parent = self
            .prev_atom
            .ok_or(PatternError::UnbalancedBranch { position: start })?;
        if let Some(position) = self.pending_bond {
            return Err(PatternError::DanglingBond { position });
        }
        self.branches.push(OpenBranch {
            opened_at: start,
            parent,
            atoms_before: self.atoms.len(),
        });
        self.pos += 1;
        Ok(())
    }

    fn close_branch(&mut self) -> Result<(), PatternError> {
        let start = self.pos;
        let branch = self
            .branches
            .pop()
            .ok_or(PatternError::UnbalancedBranch { position: start })?;
        if let Some(position) = self.pending_bond {
            return Err(PatternError::DanglingBond { position });
        }
        if self.atoms.len() == branch.atoms_before {
            return Err(PatternError::EmptyBranch {
                position: branch.opened_at,
            });
        }
        self.prev_atom = Some(branch.parent);
        self.pos += 1;
        Ok(())
    }

    fn split_component(&mut self) -> Result<(), PatternError> {
        if self.prev_atom.is_none() || self.pending_bond.is_some() {
            return Err(self.unexpected(self.pos));
        }
        self.prev_atom = None;
        self.pending_dot = Some(self.pos);
        self.pos += 1;
        Ok(())
    }

    fn bond(&mut self) -> Result<(), PatternError> {
        if self.prev_atom.is_none() {
            return Err(PatternError::DanglingBond { position: self.pos });
        }
        // Compound bond expressions such as `-,=` or `!@` keep the position of their first symbol.
        self.pending_bond.get_or_insert(self.pos);
        self.pos += 1;
        Ok(())
    }

    fn ring_closure(&mut self, label: u16, start: usize) -> Result<(), PatternError> {
        if self.prev_atom.is_none() {
            return Err(self.unexpected(start));
        }
        if self.open_rings.remove(&label).is_none() {
            self.open_rings.insert(label, start);
        }
        self.pending_bond = None;
        Ok(())
    }

    fn two_digit_ring_closure(&mut self) -> Result<(), PatternError> {
        let start = self.pos;
        let digits = self.pattern.get(start + 1..start + 3).unwrap_or("");
        if digits.len() != 2 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(self.unexpected(start));
        }
        let label = digits
            .parse::<u16>()
            .map_err(|_| self.unexpected(start))?;
        self.pos += 3;
        self.ring_closure(label, start)
    }

    fn bare_atom(&mut self) -> Result<(), PatternError> {
        let start = self.pos;
        let pattern = self.pattern;
        let rest = &pattern[start..];

        if let Some(two) = rest.get(..2) {
            if two.as_bytes()[1].is_ascii_lowercase() {
                if elements::is_organic_subset(two) {
                    self.pos += 2;
                    self.push_atom(PatternAtom::new(two, 0, false));
                    return Ok(());
                }
                if let Some(element) = elements::aromatic_element(two) {
                    self.pos += 2;
                    self.push_atom(PatternAtom::new(element, 0, false));
                    return Ok(());
                }
            }
        }

        let one = &rest[..1];
        let symbol = if elements::is_organic_subset(one) {
            one
        } else if let Some(element) = elements::aromatic_element(one) {
            element
        } else if one == "a" || one == "A" {
            QUERY_SYMBOL
        } else {
            return Err(PatternError::UnknownElement {
                position: start,
                symbol: one.to_string(),
            });
        };
        self.pos += 1;
        self.push_atom(PatternAtom::new(symbol, 0, false));
        Ok(())
    }

    fn bracket_atom(&mut self) -> Result<(), PatternError> {
        let start = self.pos;
        let mut depth = 0usize;
        let mut end = None;
        for (offset, &byte) in self.bytes[start..].iter().enumerate() {
            match byte {
                b'[' => depth += 1,
                b']' => {
                    depth -= 1;
                    if depth == 0 {
                        end = Some(start + offset);
                        break;
                    }
                }
                _ => {}
            }
        }
        let end = end.ok_or(PatternError::UnclosedBracket { position: start })?;

        let content = &self.pattern[start + 1..end];
        if content.is_empty() {
            return Err(PatternError::EmptyBracket { position: start });
        }
        let atom = parse_bracket_content(content, start + 1)?;
        self.pos = end + 1;
        self.push_atom(atom);
        Ok(())
    }
}

fn parse_bracket_content(content: &str, offset: usize) -> Result<PatternAtom, PatternError> {
    let body = content.trim_start_matches(|c: char| c.is_ascii_digit());
    let body_offset = offset + (content.len() - body.len());
    let unknown = |symbol: &str| PatternError::UnknownElement {
        position: body_offset,
        symbol: symbol.to_string(),
    };

    let Some(first) = body.chars().next() else {
        return Err(unknown(content));
    };

    let (symbol, is_port, rest): (&str, bool, &str) = if let Some(rest) = body.strip_prefix('*') {
        (WILDCARD_SYMBOL, true, rest)
    } else if let Some(after_hash) = body.strip_prefix('#') {
        let digits_len = after_hash
            .bytes()
            .take_while(|b| b.is_ascii_digit())
            .count();
        let digits = &after_hash[..digits_len];
        let number = digits.parse::<usize>().map_err(|_| unknown(body))?;
        let symbol = elements::symbol_for_atomic_number(number).ok_or_else(|| unknown(body))?;
        (symbol, number == 0, &after_hash[digits_len..])
    } else if first.is_ascii_uppercase() {
        match body.get(..2) {
            Some(two) if two.as_bytes()[1].is_ascii_lowercase() && elements::is_element(two) => {
                (two, false, &body[2..])
            }
            _ if elements::is_element(&body[..1]) => (&body[..1], false, &body[1..]),
            _ if first == 'A' => (QUERY_SYMBOL, false, &body[1..]),
            _ => return Err(unknown(&body[..1])),
        }
    } else if first.is_ascii_lowercase() {
        match body.get(..2).and_then(elements::aromatic_element) {
            Some(element) => (element, false, &body[2..]),
            None => match elements::aromatic_element(&body[..1]) {
                Some(element) => (element, false, &body[1..]),
                None if first == 'a' => (QUERY_SYMBOL, false, &body[1..]),
                None => return Err(unknown(&body[..1])),
            },
        }
    } else if matches!(first, '!' | '$') {
        (QUERY_SYMBOL, false, "")
    } else {
        return Err(unknown(&first.to_string()));
    };

    Ok(PatternAtom::new(symbol, parse_charge(rest), is_port))
}

fn parse_charge(primitives: &str) -> i8 {
    if primitives.contains('$') {
        return 0;
    }
    let Some(sign_at) = primitives.find(['+', '-']) else {
        return 0;
    };
    let sign_char = primitives.as_bytes()[sign_at];
    let sign: i8 = if sign_char == b'+' { 1 } else { -1 };
    let after = &primitives[sign_at + 1..];

    let digits_len = after.bytes().take_while(|b| b.is_ascii_digit()).count();
    let magnitude = if digits_len > 0 {
        after[..digits_len].parse::<i8>().unwrap_or(i8::MAX)
    } else {
        let repeats = after.bytes().take_while(|&b| b == sign_char).count();
        i8::try_from(repeats + 1).unwrap_or(i8::MAX)
    };
    sign * magnitude
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inspect(pattern: &str) -> Result<FragmentProfile, PatternError> {
        SmartsInspector.inspect(pattern)
    }

    fn symbols(profile: &FragmentProfile) -> Vec<&str> {
        profile.atoms.iter().map(|a| a.symbol.as_str()).collect()
    }

    #[test]
    fn counts_wildcard_ports_in_all_spellings() {
        assert_eq!(inspect("*C").unwrap().port_count(), 1);
        assert_eq!(inspect("[*]-C-[*]").unwrap().port_count(), 2);
        assert_eq!(inspect("[*:1]CC[*:2]").unwrap().port_count(), 2);
        assert_eq!(inspect("[1*]C([2*])[3*]").unwrap().port_count(), 3);
        assert_eq!(inspect("[#0]-[#6]").unwrap().port_count(), 1);
        assert_eq!(inspect("CCO").unwrap().port_count(), 0);
    }

    #[test]
    fn reads_explicit_atom_number_patterns() {
        let profile =
            inspect("[*:1]-[#6D4+0:2](-[#1D1+0:4])(-[#1D1+0:5])-[*:3]").unwrap();
        assert_eq!(symbols(&profile), vec!["*", "C", "H", "H", "*"]);
        assert_eq!(profile.port_count(), 2);
        assert!(profile.atoms.iter().all(|a| a.formal_charge == 0));
    }

    #[test]
    fn resolves_two_letter_and_aromatic_symbols() {
        let profile = inspect("ClCBr.c1ccccc1").unwrap();
        assert_eq!(
            symbols(&profile),
            vec!["Cl", "C", "Br", "C", "C", "C", "C", "C", "C"]
        );
        let profile = inspect("[se]1cc[nH]c1").unwrap();
        assert_eq!(symbols(&profile), vec!["Se", "C", "C", "N", "C"]);
    }

    #[test]
    fn parses_formal_charges() {
        let profile = inspect("[NH4+].[O-][Fe+++].[#8-2]").unwrap();
        let charges: Vec<i8> = profile.atoms.iter().map(|a| a.formal_charge).collect();
        assert_eq!(charges, vec![1, -1, 3, -2]);
    }

    #[test]
    fn accepts_query_atoms_and_compound_bonds() {
        let profile = inspect("[*]-,=[C,N;!H0]!@a").unwrap();
        assert_eq!(symbols(&profile), vec!["*", "C", "?"]);
    }

    #[test]
    fn accepts_two_digit_ring_labels() {
        let profile = inspect("C%12CCC%12").unwrap();
        assert_eq!(profile.atoms.len(), 4);
    }

    #[test]
    fn rejects_empty_pattern() {
        assert_eq!(inspect(""), Err(PatternError::Empty));
    }

    #[test]
    fn rejects_unclosed_and_empty_brackets() {
        assert_eq!(
            inspect("C[*"),
            Err(PatternError::UnclosedBracket { position: 1 })
        );
        assert_eq!(inspect("C[]"), Err(PatternError::EmptyBracket { position: 1 }));
    }

    #[test]
    fn rejects_unknown_elements() {
        assert!(matches!(
            inspect("CXC"),
            Err(PatternError::UnknownElement { position: 1, .. })
        ));
        assert!(matches!(
            inspect("[Xy]"),
            Err(PatternError::UnknownElement { .. })
        ));
        assert!(matches!(
            inspect("[#200]"),
            Err(PatternError::UnknownElement { .. })
        ));
    }

    #[test]
    fn rejects_unbalanced_and_empty_branches() {
        assert_eq!(
            inspect("C(C"),
            Err(PatternError::UnbalancedBranch { position: 1 })
        );
        assert_eq!(
            inspect("CC)"),
            Err(PatternError::UnbalancedBranch { position: 2 })
        );
        assert_eq!(
            inspect("(C)C"),
            Err(PatternError::UnbalancedBranch { position: 0 })
        );
        assert_eq!(inspect("C()C"), Err(PatternError::EmptyBranch { position: 1 }));
    }

    #[test]
    fn rejects_dangling_bonds() {
        assert_eq!(inspect("-C"), Err(PatternError::DanglingBond { position: 0 }));
        assert_eq!(inspect("C="), Err(PatternError::DanglingBond { position: 1 }));
        assert_eq!(inspect("C(C-)"), Err(PatternError::DanglingBond { position: 3 }));
    }

    #[test]
    fn rejects_unclosed_rings() {
        assert_eq!(inspect("C1CC"), Err(PatternError::UnclosedRing { label: 1 }));
    }

    #[test]
    fn rejects_stray_characters_and_dots() {
        assert_eq!(
            inspect("C C"),
            Err(PatternError::UnexpectedChar { position: 1, ch: ' ' })
        );
        assert_eq!(
            inspect("C."),
            Err(PatternError::UnexpectedChar { position: 1, ch: '.' })
        );
        assert_eq!(
            inspect(".C"),
            Err(PatternError::UnexpectedChar { position: 0, ch: '.' })
        );
    }
}

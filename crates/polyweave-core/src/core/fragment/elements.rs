use phf::{phf_map, phf_set};

/// Element symbols indexed by atomic number. Atomic number zero is the wildcard.
pub(crate) const ELEMENT_SYMBOLS: [&str; 119] = [
    "*", "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne", "Na", "Mg", "Al", "Si", "P", "S",
    "Cl", "Ar", "K", "Ca", "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn", "Ga", "Ge",
    "As", "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr", "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd",
    "In", "Sn", "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd", "Pm", "Sm", "Eu", "Gd",
    "Tb", "Dy", "Ho", "Er", "Tm", "Yb", "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg",
    "Tl", "Pb", "Bi", "Po", "At", "Rn", "Fr", "Ra", "Ac", "Th", "Pa", "U", "Np", "Pu", "Am", "Cm",
    "Bk", "Cf", "Es", "Fm", "Md", "No", "Lr", "Rf", "Db", "Sg", "Bh", "Hs", "Mt", "Ds", "Rg", "Cn",
    "Nh", "Fl", "Mc", "Lv", "Ts", "Og",
];

/// Elements that may be written without brackets.
static ORGANIC_SUBSET: phf::Set<&'static str> = phf_set! {
    "B", "C", "N", "O", "P", "S", "F", "Cl", "Br", "I",
};

/// Aromatic (lowercase) symbols and the elements they denote.
static AROMATIC_SYMBOLS: phf::Map<&'static str, &'static str> = phf_map! {
    "b" => "B",
    "c" => "C",
    "n" => "N",
    "o" => "O",
    "p" => "P",
    "s" => "S",
    "se" => "Se",
    "as" => "As",
    "te" => "Te",
};

pub(crate) fn symbol_for_atomic_number(number: usize) -> Option<&'static str> {
    ELEMENT_SYMBOLS.get(number).copied()
}

pub(crate) fn is_element(symbol: &str) -> bool {
    symbol != "*" && ELEMENT_SYMBOLS.contains(&symbol)
}

pub(crate) fn is_organic_subset(symbol: &str) -> bool {
    ORGANIC_SUBSET.contains(symbol)
}

pub(crate) fn aromatic_element(symbol: &str) -> Option<&'static str> {
    AROMATIC_SYMBOLS.get(symbol).copied()
}

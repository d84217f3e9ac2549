use super::ids::UnitId;
use crate::core::fragment::Fragment;
use slotmap::SlotMap;
use std::fmt;

const HYDROGEN_SYMBOL: &str = "H";

/// Position of a unit within a linear chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitRole {
    Head,
    Middle,
    Tail,
}

impl fmt::Display for UnitRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Head => "head",
                Self::Middle => "middle",
                Self::Tail => "tail",
            }
        )
    }
}

/// How the head and tail of a chain were chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrientationSource {
    /// Taken from the terminal orientation declared on the monomer group.
    Declared,
    /// Picked from the first terminal fragments of the group; should be verified by the caller.
    Inferred,
}

impl OrientationSource {
    pub fn is_verified(self) -> bool {
        self == Self::Declared
    }
}

impl fmt::Display for OrientationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Declared => "declared",
                Self::Inferred => "inferred",
            }
        )
    }
}

/// An atom materialized in an assembled chain.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainAtom {
    pub symbol: String,
    pub formal_charge: i8,
    /// Partial charge; `None` until the chain has been neutralized.
    pub partial_charge: Option<f64>,
    /// Whether this atom was added to saturate an open port.
    pub is_cap: bool,
}

impl ChainAtom {
    fn hydrogen_cap() -> Self {
        Self {
            symbol: HYDROGEN_SYMBOL.to_string(),
            formal_charge: 0,
            partial_charge: None,
            is_cap: true,
        }
    }
}

/// One monomer instance placed in a chain.
#[derive(Debug, Clone)]
pub struct ChainUnit {
    residue_name: String,
    fragment: Fragment,
    role: UnitRole,
    block: Option<char>,
    atoms: Vec<ChainAtom>,
    open_ports: Vec<usize>,
    capped_ports: Vec<usize>,
}

impl ChainUnit {
    /// Creates a unit from a fragment, copying every non-port atom into the chain.
    ///
    /// # Arguments
    ///
    /// * `residue_name` - The residue the fragment was declared under.
    /// * `fragment` - The fragment this unit instantiates.
    /// * `role` - The unit's position in the chain.
    /// * `block` - The sequence symbol that placed a middle unit, if any.
    pub fn new(
        residue_name: &str,
        fragment: &Fragment,
        role: UnitRole,
        block: Option<char>,
    ) -> Self {
        let atoms = fragment
            .atoms()
            .iter()
            .filter(|atom| !atom.is_port)
            .map(|atom| ChainAtom {
                symbol: atom.symbol.clone(),
                formal_charge: atom.formal_charge,
                partial_charge: None,
                is_cap: false,
            })
            .collect();

        Self {
            residue_name: residue_name.to_string(),
            fragment: fragment.clone(),
            role,
            block,
            atoms,
            open_ports: fragment.port_indices().collect(),
            capped_ports: Vec::new(),
        }
    }

    pub fn residue_name(&self) -> &str {
        &self.residue_name
    }

    pub fn fragment(&self) -> &Fragment {
        &self.fragment
    }

    pub fn role(&self) -> UnitRole {
        self.role
    }

    pub fn block(&self) -> Option<char> {
        self.block
    }

    pub fn atoms(&self) -> &[ChainAtom] {
        &self.atoms
    }

    /// Pattern atom indices of the ports not yet bonded or capped.
    pub fn open_ports(&self) -> &[usize] {
        &self.open_ports
    }

    pub fn capped_ports(&self) -> &[usize] {
        &self.capped_ports
    }

    fn claim_first_port(&mut self) -> Option<usize> {
        (!self.open_ports.is_empty()).then(|| self.open_ports.remove(0))
    }

    fn claim_last_port(&mut self) -> Option<usize> {
        self.open_ports.pop()
    }

    /// Saturates every open port with a hydrogen, returning how many were capped.
    fn cap_open_ports(&mut self) -> usize {
        let count = self.open_ports.len();
        self.atoms
            .extend(std::iter::repeat_with(ChainAtom::hydrogen_cap).take(count));
        self.capped_ports.append(&mut self.open_ports);
        count
    }
}

/// A port-to-port bond between two consecutive units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Link {
    pub from: UnitId,
    /// Pattern atom index of the consumed port on `from`.
    pub from_port: usize,
    pub to: UnitId,
    /// Pattern atom index of the consumed port on `to`.
    pub to_port: usize,
}

/// A linear chain assembled from monomer fragments.
///
/// Units are stored under stable [`UnitId`] keys; their chain order (head first, tail last)
/// is kept separately. Consecutive units are joined by exactly one [`Link`].
#[derive(Debug, Clone)]
pub struct PolymerChain {
    units: SlotMap<UnitId, ChainUnit>,
    order: Vec<UnitId>,
    links: Vec<Link>,
    sequence: String,
    orientation: OrientationSource,
    relaxed: bool,
}

impl PolymerChain {
    /// Creates an empty chain.
    ///
    /// # Arguments
    ///
    /// * `sequence` - The block sequence used to place middle units.
    /// * `orientation` - How the chain's end groups were chosen.
    pub fn new(sequence: &str, orientation: OrientationSource) -> Self {
        Self {
            units: SlotMap::with_key(),
            order: Vec::new(),
            links: Vec::new(),
            sequence: sequence.to_string(),
            orientation,
            relaxed: false,
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn unit(&self, id: UnitId) -> Option<&ChainUnit> {
        self.units.get(id)
    }

    /// Unit keys in chain order.
    pub fn unit_ids(&self) -> &[UnitId] {
        &self.order
    }

    /// Units in chain order, from head to tail.
    pub fn units(&self) -> impl Iterator<Item = &ChainUnit> + '_ {
        self.order.iter().filter_map(|&id| self.units.get(id))
    }

    pub fn residue_names(&self) -> Vec<&str> {
        self.units().map(ChainUnit::residue_name).collect()
    }

    pub fn roles(&self) -> Vec<UnitRole> {
        self.units().map(ChainUnit::role).collect()
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn sequence(&self) -> &str {
        &self.sequence
    }

    pub fn orientation_source(&self) -> OrientationSource {
        self.orientation
    }

    pub fn is_relaxed(&self) -> bool {
        self.relaxed
    }

    /// Total number of atoms over all units, caps included.
    pub fn atom_count(&self) -> usize {
        self.units.values().map(|unit| unit.atoms.len()).sum()
    }

    pub fn open_port_count(&self) -> usize {
        self.units.values().map(|unit| unit.open_ports.len()).sum()
    }

    pub fn atoms(&self) -> impl Iterator<Item = &ChainAtom> + '_ {
        self.units().flat_map(|unit| unit.atoms.iter())
    }

    /// Mutable access to every atom, for collaborators that annotate the chain after assembly.
    pub fn atoms_mut(&mut self) -> impl Iterator<Item = &mut ChainAtom> + '_ {
        self.units.values_mut().flat_map(|unit| unit.atoms.iter_mut())
    }

    pub(crate) fn push_unit(&mut self, unit: ChainUnit) -> UnitId {
        let id = self.units.insert(unit);
        self.order.push(id);
        id
    }

    /// Bonds the last open port of `from` to the first open port of `to`.
    ///
    /// Returns `None` if either unit is unknown or has no open port left.
    pub(crate) fn link(&mut self, from: UnitId, to: UnitId) -> Option<Link> {
        if from == to {
            return None;
        }
        let from_has_port = !self.units.get(from)?.open_ports.is_empty();
        let to_has_port = !self.units.get(to)?.open_ports.is_empty();
        if !(from_has_port && to_has_port) {
            return None;
        }

        let from_port = self.units[from].claim_last_port()?;
        let to_port = self.units[to].claim_first_port()?;
        let link = Link {
            from,
            from_port,
            to,
            to_port,
        };
        self.links.push(link);
        Some(link)
    }

    /// Caps every open port with a hydrogen, returning the number of caps added.
    pub(crate) fn cap_open_ports(&mut self) -> usize {
        self.units
            .values_mut()
            .map(ChainUnit::cap_open_ports)
            .sum()
    }

    pub(crate) fn neutralize_charges(&mut self) {
        for atom in self.atoms_mut() {
            atom.partial_charge = Some(0.0);
        }
    }

    pub(crate) fn mark_relaxed(&mut self) {
        self.relaxed = true;
    }
}

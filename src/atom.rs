/// Handedness of a tetrahedral stereocenter.
///
/// Looking from the first ligand of a
/// [`TetrahedralStereo`](crate::TetrahedralStereo) towards the center, the
/// remaining three ligands run either clockwise or anticlockwise. The tag is
/// only meaningful together with the ligand order it was recorded against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Chirality {
    /// Clockwise (@@) arrangement.
    #[default]
    Cw,
    /// Counterclockwise (@) arrangement.
    Ccw,
}

impl Chirality {
    /// `+1` for clockwise, `-1` for anticlockwise.
    pub fn sign(self) -> i8 {
        match self {
            Chirality::Cw => 1,
            Chirality::Ccw => -1,
        }
    }
}

/// Default atom type for a molecular graph node.
///
/// `Atom` stores intrinsic atomic properties, the things you would read off
/// a structural formula. Stereo configuration is not stored here; it lives on
/// the [`Mol`](crate::Mol) as [`TetrahedralStereo`](crate::TetrahedralStereo)
/// and [`EZStereo`](crate::EZStereo) elements.
///
/// # Examples
///
/// ```
/// use crabmatch::Atom;
///
/// let carbon = Atom {
///     atomic_num: 6,
///     formal_charge: 0,
///     isotope: 0,
///     hydrogen_count: 3,
///     is_aromatic: false,
/// };
/// assert_eq!(carbon.atomic_num, 6);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Atom {
    /// Atomic number (1 = H, 6 = C, 7 = N, ...). Identifies the element.
    pub atomic_num: u8,
    /// Formal charge in elementary charge units (e.g. -1 for a carboxylate oxygen).
    pub formal_charge: i8,
    /// Mass number. `0` means natural isotopic abundance (the common case).
    pub isotope: u16,
    /// Number of virtual (suppressed) hydrogens on this atom.
    ///
    /// These are not graph nodes. A stereocenter that carries one refers to
    /// it through [`AtomId::VirtualH`](crate::AtomId::VirtualH).
    pub hydrogen_count: u8,
    /// Whether this atom is in an aromatic ring.
    pub is_aromatic: bool,
}

impl Atom {
    /// A neutral, non-aromatic atom of the given element with no implicit hydrogens.
    pub fn element(atomic_num: u8) -> Self {
        Self {
            atomic_num,
            ..Self::default()
        }
    }

    /// An aromatic atom of the given element.
    pub fn aromatic(atomic_num: u8) -> Self {
        Self {
            atomic_num,
            is_aromatic: true,
            ..Self::default()
        }
    }
}

impl crate::traits::HasAtomicNum for Atom {
    fn atomic_num(&self) -> u8 {
        self.atomic_num
    }
}

impl crate::traits::HasFormalCharge for Atom {
    fn formal_charge(&self) -> i8 {
        self.formal_charge
    }
}

impl crate::traits::HasIsotope for Atom {
    fn isotope(&self) -> u16 {
        self.isotope
    }
}

impl crate::traits::HasHydrogenCount for Atom {
    fn hydrogen_count(&self) -> u8 {
        self.hydrogen_count
    }
}

impl crate::traits::HasAromaticity for Atom {
    fn is_aromatic(&self) -> bool {
        self.is_aromatic
    }
}

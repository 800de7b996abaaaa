#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BondOrder {
    #[default]
    Single,
    Double,
    Triple,
}

/// Default bond type for a molecular graph edge.
///
/// Aromatic bonds keep a concrete Kekulé order and set `is_aromatic`; the
/// aromatic-aware matchers compare the flag instead of the order.
#[derive(Debug, Clone, PartialEq)]
pub struct Bond {
    pub order: BondOrder,
    pub is_aromatic: bool,
}

impl Bond {
    pub fn new(order: BondOrder) -> Self {
        Self {
            order,
            is_aromatic: false,
        }
    }

    pub fn aromatic(order: BondOrder) -> Self {
        Self {
            order,
            is_aromatic: true,
        }
    }
}

impl Default for Bond {
    fn default() -> Self {
        Self::new(BondOrder::Single)
    }
}

impl crate::traits::HasBondOrder for Bond {
    fn bond_order(&self) -> BondOrder {
        self.order
    }
}

impl crate::traits::HasAromaticity for Bond {
    fn is_aromatic(&self) -> bool {
        self.is_aromatic
    }
}

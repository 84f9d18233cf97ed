//! Common types shared between target backends and the analysis passes.

use std::fmt;

/// A set of physical registers, one bit per register.
///
/// The bit assignment is target-specific: each backend maps its registers
/// onto bit indices `0..64` and leaves untracked registers out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct RegMask(pub u64);

impl RegMask {
    pub const EMPTY: RegMask = RegMask(0);

    /// A mask containing only `bit`.
    pub const fn bit(bit: u8) -> Self {
        RegMask(1 << bit)
    }

    pub fn insert(&mut self, bit: u8) {
        self.0 |= 1 << bit;
    }

    pub fn contains(self, bit: u8) -> bool {
        self.0 & (1 << bit) != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> u32 {
        self.0.count_ones()
    }

    pub fn union(self, other: RegMask) -> RegMask {
        RegMask(self.0 | other.0)
    }

    pub fn intersection(self, other: RegMask) -> RegMask {
        RegMask(self.0 & other.0)
    }

    /// Iterate over the set bit indices in ascending order.
    pub fn iter(self) -> impl Iterator<Item = u8> {
        let mut bits = self.0;
        std::iter::from_fn(move || {
            if bits == 0 {
                return None;
            }
            let bit = bits.trailing_zeros() as u8;
            bits &= bits - 1;
            Some(bit)
        })
    }
}

impl std::ops::BitOr for RegMask {
    type Output = RegMask;

    fn bitor(self, rhs: RegMask) -> RegMask {
        self.union(rhs)
    }
}

impl std::ops::BitOrAssign for RegMask {
    fn bitor_assign(&mut self, rhs: RegMask) {
        self.0 |= rhs.0;
    }
}

impl FromIterator<u8> for RegMask {
    fn from_iter<T: IntoIterator<Item = u8>>(iter: T) -> Self {
        let mut mask = RegMask::EMPTY;
        for bit in iter {
            mask.insert(bit);
        }
        mask
    }
}

impl fmt::Display for RegMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, bit) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{bit}")?;
        }
        write!(f, "}}")
    }
}

/// Operand kind: whether a register is read, written, or both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OpKind {
    /// Register is read by this instruction.
    Use,
    /// Register is written by this instruction.
    Def,
    /// Register is both read and written (e.g., `add dst, src`).
    UseDef,
}

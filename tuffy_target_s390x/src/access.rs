//! Register uses and definitions of a resolved instruction.
//!
//! Folds a [`DecodedInst`] and its resolved [`ProgInfo`] into the physical
//! registers it reads and writes, the form the liveness and allocation
//! passes work with.

use tuffy_target::{OpKind, ProgInfo, RegMask};

use crate::inst::DecodedInst;
use crate::reg::{self, Reg};

/// Registers read and written by one instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RegAccesses {
    pub uses: RegMask,
    pub defs: RegMask,
}

impl RegAccesses {
    /// How `reg` is accessed, if at all.
    pub fn kind_of(&self, reg: Reg) -> Option<OpKind> {
        let bit = reg.mask_bit()?;
        match (self.uses.contains(bit), self.defs.contains(bit)) {
            (true, true) => Some(OpKind::UseDef),
            (true, false) => Some(OpKind::Use),
            (false, true) => Some(OpKind::Def),
            (false, false) => None,
        }
    }

    /// Every accessed register with its access kind, in register order.
    pub fn iter(&self) -> impl Iterator<Item = (Reg, OpKind)> + '_ {
        reg::regs_in(self.uses | self.defs).filter_map(|r| self.kind_of(r).map(|k| (r, k)))
    }
}

/// Compute the register accesses of `inst` from its resolved properties.
pub fn reg_accesses(inst: &DecodedInst, info: &ProgInfo) -> RegAccesses {
    let mut acc = RegAccesses::default();

    // Value operands.
    if let Some(r) = inst.from.as_reg() {
        if info.reads_left() {
            acc.uses |= r.mask();
        }
        if info.writes_left() {
            acc.defs |= r.mask();
        }
    }
    if let Some(r) = inst.to.as_reg() {
        if info.reads_right() {
            acc.uses |= r.mask();
        }
        if info.writes_right() {
            acc.defs |= r.mask();
        }
    }
    if let Some(r) = inst.reg {
        if info.reads_reg() {
            acc.uses |= r.mask();
        }
    }

    // Side effects collected by the resolver.
    acc.uses |= info.regindex | info.reguse;
    acc.defs |= info.regset;
    acc
}

//! Property resolver: refines a table entry against the operands of one
//! decoded instruction.
//!
//! Refinements, each computed from the decoded instruction and the base
//! record only, then OR-ed onto the base record:
//!
//! 1. A `REG_READ` opcode written without its middle register reads the
//!    right operand instead.
//! 2. Base registers of memory and address operands go to `regindex`; with
//!    post-increment addressing they are also written (`regset`).
//! 3. A left operand that is the address of a symbol is an address use, not
//!    a value read.
//! 4. Load/store multiple add their whole register range to `regset` or
//!    `reguse`.

use thiserror::Error;
use tuffy_target::{ProgFlags, ProgInfo, RegMask};

use crate::inst::{AddrMode, DecodedInst, Opcode, Operand, OperandKind};
use crate::progtable;
use crate::reg::Reg;

/// The instruction's opcode has no entry in the property table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unclassified opcode {opcode} in instruction `{inst}`")]
pub struct UnclassifiedOpcode {
    pub opcode: Opcode,
    /// Assembler text of the offending instruction.
    pub inst: String,
}

/// Resolve the properties of `inst`.
///
/// # Panics
///
/// Panics if the opcode is not classified. That means a new opcode reached
/// the analysis passes without a table entry, and continuing would feed
/// them wrong operand facts.
pub fn resolve(inst: &DecodedInst) -> ProgInfo {
    match try_resolve(inst) {
        Ok(info) => info,
        Err(e) => {
            log::error!("proginfo: {e}");
            panic!("proginfo: {e}");
        }
    }
}

/// Resolve the properties of `inst`, reporting an unclassified opcode as an
/// error instead of panicking.
pub fn try_resolve(inst: &DecodedInst) -> Result<ProgInfo, UnclassifiedOpcode> {
    let base = match progtable::lookup(inst.opcode) {
        Some(info) if !info.is_empty() => info,
        _ => {
            return Err(UnclassifiedOpcode {
                opcode: inst.opcode,
                inst: inst.to_string(),
            });
        }
    };

    let mut info = base;

    if base.reads_reg() && inst.reg.is_none() {
        info.flags.remove(ProgFlags::REG_READ);
        info.flags.insert(ProgFlags::RIGHT_READ);
    }

    for operand in [&inst.from, &inst.to] {
        let Some(base_reg) = address_base(operand) else {
            continue;
        };
        info.regindex |= base_reg.mask();
        if base.post_increments() || operand.mode == AddrMode::PostInc {
            info.flags.insert(ProgFlags::POST_INC);
            info.regset |= base_reg.mask();
        }
    }

    if inst.from.kind == OperandKind::Addr && inst.from.sym.is_some() && base.reads_left() {
        info.flags.remove(ProgFlags::LEFT_READ);
        info.flags.insert(ProgFlags::LEFT_ADDR);
    }

    match inst.opcode {
        // Load multiple sets a range of registers.
        Opcode::Lmg | Opcode::Lmy => {
            info.regset |= reg_range(inst, inst.reg, inst.to.reg);
        }
        // Store multiple reads a range of registers.
        Opcode::Stmg | Opcode::Stmy => {
            info.reguse |= reg_range(inst, inst.from.reg, inst.reg);
        }
        _ => {}
    }

    log::trace!("proginfo: {inst} => {info}");
    Ok(info)
}

/// Base register of a memory or address operand.
fn address_base(operand: &Operand) -> Option<Reg> {
    if operand.is_address() {
        operand.reg
    } else {
        None
    }
}

/// Mask of the inclusive register range `[lo, hi]`. Empty when `lo > hi`,
/// when a bound is missing, or when the bounds are in different register
/// files.
fn reg_range(inst: &DecodedInst, lo: Option<Reg>, hi: Option<Reg>) -> RegMask {
    let (Some(lo), Some(hi)) = (lo, hi) else {
        log::warn!("proginfo: register range with missing bound in `{inst}`");
        return RegMask::EMPTY;
    };
    if lo.class() != hi.class() {
        log::warn!("proginfo: register range {lo}-{hi} spans register files in `{inst}`");
        return RegMask::EMPTY;
    }
    (lo.number()..=hi.number())
        .map(|n| lo.with_number(n).mask())
        .fold(RegMask::EMPTY, |acc, m| acc | m)
}

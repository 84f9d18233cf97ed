//! Instruction property records.
//!
//! A [`ProgInfo`] summarizes what a machine instruction does to its operands
//! and to control flow. Each backend keeps a table of base records keyed by
//! opcode and refines them per instruction from the concrete operands; the
//! liveness, register allocation and scheduling passes read the result.
//!
//! Operand slots follow the assembler order `OP from, reg, to`: the "left"
//! operand is `from`, the "right" operand is `to`, and the optional middle
//! register is the "reg" operand.

use std::fmt;

use bitflags::bitflags;

use crate::types::{OpKind, RegMask};

bitflags! {
    /// Operand-access and instruction-class flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct ProgFlags: u32 {
        /// Classified, but carries no other semantics.
        const OK          = 1 << 0;
        /// Directive or annotation; not a real machine instruction.
        const PSEUDO      = 1 << 1;
        /// Left operand value is read.
        const LEFT_READ   = 1 << 2;
        /// Left operand is written.
        const LEFT_WRITE  = 1 << 3;
        /// Left operand is an address expression, not a value.
        const LEFT_ADDR   = 1 << 4;
        /// The middle register operand is read.
        const REG_READ    = 1 << 5;
        /// Right operand value is read.
        const RIGHT_READ  = 1 << 6;
        /// Right operand is written.
        const RIGHT_WRITE = 1 << 7;
        /// Right operand is an address expression, not a value.
        const RIGHT_ADDR  = 1 << 8;
        /// Address base registers are updated after use.
        const POST_INC    = 1 << 9;
        /// Pure data copy.
        const MOVE        = 1 << 10;
        /// Value conversion or width change.
        const CONV        = 1 << 11;
        /// Conditional control transfer.
        const COND_JUMP   = 1 << 12;
        /// Unconditional control transfer.
        const JUMP        = 1 << 13;
        /// Does not fall through to the next instruction.
        const BREAK       = 1 << 14;
        const CALL        = 1 << 15;
        /// Skipped by the analysis passes.
        const SKIP        = 1 << 16;

        const LEFT_RDWR  = Self::LEFT_READ.bits() | Self::LEFT_WRITE.bits();
        const RIGHT_RDWR = Self::RIGHT_READ.bits() | Self::RIGHT_WRITE.bits();
    }
}

impl Default for ProgFlags {
    fn default() -> Self {
        ProgFlags::empty()
    }
}

/// Natural operand width of an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OpWidth {
    /// 8-bit integer.
    Byte,
    /// 16-bit integer.
    HalfWord,
    /// 32-bit integer.
    Word,
    /// 64-bit integer.
    DoubleWord,
    /// IEEE 754 single precision.
    Single,
    /// IEEE 754 double precision.
    Double,
}

impl OpWidth {
    /// Operand size in bytes.
    pub fn bytes(self) -> u32 {
        match self {
            OpWidth::Byte => 1,
            OpWidth::HalfWord => 2,
            OpWidth::Word | OpWidth::Single => 4,
            OpWidth::DoubleWord | OpWidth::Double => 8,
        }
    }

    pub fn is_float(self) -> bool {
        matches!(self, OpWidth::Single | OpWidth::Double)
    }
}

impl fmt::Display for OpWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OpWidth::Byte => "b",
            OpWidth::HalfWord => "h",
            OpWidth::Word => "w",
            OpWidth::DoubleWord => "d",
            OpWidth::Single => "f32",
            OpWidth::Double => "f64",
        };
        f.write_str(s)
    }
}

/// Operand-access and control-flow facts for one instruction.
///
/// Table entries only carry `flags` and `width`; the register sets are
/// filled in when a record is resolved against a concrete instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProgInfo {
    pub flags: ProgFlags,
    pub width: Option<OpWidth>,
    /// Registers used to compute an address.
    pub regindex: RegMask,
    /// Registers written as a side effect (post-increment, load multiple).
    pub regset: RegMask,
    /// Registers read as a side effect (store multiple).
    pub reguse: RegMask,
}

impl ProgInfo {
    /// A record with the given flags and no width class.
    pub const fn new(flags: ProgFlags) -> Self {
        Self {
            flags,
            width: None,
            regindex: RegMask::EMPTY,
            regset: RegMask::EMPTY,
            reguse: RegMask::EMPTY,
        }
    }

    /// A record with the given flags and width class.
    pub const fn sized(flags: ProgFlags, width: OpWidth) -> Self {
        Self {
            width: Some(width),
            ..Self::new(flags)
        }
    }

    /// True when no flag is set. A classified instruction never resolves to
    /// an empty record.
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Union of two records. Flags and register sets are OR-ed together;
    /// the width of `self` wins when both carry one.
    pub fn combine(&self, other: &ProgInfo) -> ProgInfo {
        ProgInfo {
            flags: self.flags | other.flags,
            width: self.width.or(other.width),
            regindex: self.regindex | other.regindex,
            regset: self.regset | other.regset,
            reguse: self.reguse | other.reguse,
        }
    }

    pub fn reads_left(&self) -> bool {
        self.flags.contains(ProgFlags::LEFT_READ)
    }

    pub fn writes_left(&self) -> bool {
        self.flags.contains(ProgFlags::LEFT_WRITE)
    }

    pub fn left_is_addr(&self) -> bool {
        self.flags.contains(ProgFlags::LEFT_ADDR)
    }

    pub fn reads_reg(&self) -> bool {
        self.flags.contains(ProgFlags::REG_READ)
    }

    pub fn reads_right(&self) -> bool {
        self.flags.contains(ProgFlags::RIGHT_READ)
    }

    pub fn writes_right(&self) -> bool {
        self.flags.contains(ProgFlags::RIGHT_WRITE)
    }

    pub fn right_is_addr(&self) -> bool {
        self.flags.contains(ProgFlags::RIGHT_ADDR)
    }

    pub fn post_increments(&self) -> bool {
        self.flags.contains(ProgFlags::POST_INC)
    }

    pub fn is_pseudo(&self) -> bool {
        self.flags.contains(ProgFlags::PSEUDO)
    }

    pub fn is_move(&self) -> bool {
        self.flags.contains(ProgFlags::MOVE)
    }

    pub fn is_conv(&self) -> bool {
        self.flags.contains(ProgFlags::CONV)
    }

    pub fn is_jump(&self) -> bool {
        self.flags.contains(ProgFlags::JUMP)
    }

    pub fn is_cond_jump(&self) -> bool {
        self.flags.contains(ProgFlags::COND_JUMP)
    }

    pub fn is_call(&self) -> bool {
        self.flags.contains(ProgFlags::CALL)
    }

    pub fn is_skip(&self) -> bool {
        self.flags.contains(ProgFlags::SKIP)
    }

    /// Whether control can reach the next instruction.
    pub fn falls_through(&self) -> bool {
        !self.flags.contains(ProgFlags::BREAK)
    }

    /// Whether this instruction ends a basic block.
    pub fn is_terminator(&self) -> bool {
        self.flags
            .intersects(ProgFlags::BREAK | ProgFlags::JUMP | ProgFlags::COND_JUMP)
    }

    /// How the left operand's value is accessed, if at all.
    pub fn left_access(&self) -> Option<OpKind> {
        access_kind(self.reads_left(), self.writes_left())
    }

    /// How the right operand's value is accessed, if at all.
    pub fn right_access(&self) -> Option<OpKind> {
        access_kind(self.reads_right(), self.writes_right())
    }
}

fn access_kind(read: bool, write: bool) -> Option<OpKind> {
    match (read, write) {
        (true, true) => Some(OpKind::UseDef),
        (true, false) => Some(OpKind::Use),
        (false, true) => Some(OpKind::Def),
        (false, false) => None,
    }
}

impl fmt::Display for ProgInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (name, _) in self.flags.iter_names() {
            if !first {
                f.write_str("|")?;
            }
            f.write_str(name)?;
            first = false;
        }
        if first {
            f.write_str("0")?;
        }
        if let Some(width) = self.width {
            write!(f, " size={width}")?;
        }
        if !self.regindex.is_empty() {
            write!(f, " index={}", self.regindex)?;
        }
        if !self.reguse.is_empty() {
            write!(f, " use={}", self.reguse)?;
        }
        if !self.regset.is_empty() {
            write!(f, " set={}", self.regset)?;
        }
        Ok(())
    }
}

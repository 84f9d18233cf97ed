//! s390x machine instruction definitions.
//!
//! A [`DecodedInst`] is the fully decoded form the assembler hands to the
//! analysis passes: `OPCODE from, reg, to`, where `reg` is the optional
//! middle register of three-operand forms and the range bound of the
//! load/store-multiple instructions.

use std::fmt;

use crate::reg::Reg;

/// s390x opcodes, including the backend-internal pseudo-instructions.
///
/// Mnemonics are the ones the backend assembler prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "UPPERCASE"))]
#[repr(u16)]
pub enum Opcode {
    // Backend-internal pseudo-instructions.
    Type,
    Text,
    Funcdata,
    Pcdata,
    Undef,
    Usefield,
    Checknil,
    Vardef,
    Varkill,
    Varlive,
    Nop,
    Ret,
    Call,
    Jmp,
    Duffcopy,
    Duffzero,
    End,
    Globl,
    Data,

    // Integer arithmetic, logical and shift.
    Add,
    Addc,
    Adde,
    Sub,
    Subc,
    Sube,
    Neg,
    And,
    Or,
    Xor,
    Mulld,
    Mullw,
    Mulhd,
    Mulhdu,
    Divd,
    Divdu,
    Rem,
    Remu,
    Sld,
    Srd,
    Srad,
    Slw,
    Srw,
    Sraw,
    Rll,
    Cmp,
    Cmpu,

    // Floating point.
    Fadd,
    Fadds,
    Fsub,
    Fsubs,
    Fmul,
    Fmuls,
    Fdiv,
    Fdivs,
    Fcmpu,
    Cebr,
    Ledbr,
    Ldebr,
    Fsqrt,
    Fabs,
    Fneg,
    Fmadd,
    Fmsub,

    // Integer/float conversions.
    Cefbra,
    Cdfbra,
    Cegbra,
    Cdgbra,
    Cfebra,
    Cfdbra,
    Cgebra,
    Cgdbra,
    Celfbr,
    Cdlfbr,
    Celgbr,
    Cdlgbr,
    Clfebr,
    Clfdbr,
    Clgebr,
    Clgdbr,

    // Moves, loads and stores.
    Movb,
    Movbz,
    Movh,
    Movhz,
    Movw,
    Movwz,
    Movd,
    Fmovs,
    Fmovd,
    Movdbr,
    Movwbr,
    Movhbr,
    La,
    Lay,
    Larl,

    // Storage-to-storage operations.
    Mvc,
    Clc,
    Xc,
    Oc,
    Nc,

    // Branches.
    Br,
    Bl,
    Beq,
    Bne,
    Bge,
    Blt,
    Bgt,
    Ble,
    Cmpbeq,
    Cmpbne,
    Cmpbge,
    Cmpblt,
    Cmpbgt,
    Cmpble,
    Cmpubeq,
    Cmpubne,
    Cmpubge,
    Cmpublt,
    Cmpubgt,
    Cmpuble,
    Brct,
    Brctg,

    // Macros, multi-register transfers and system.
    Clear,
    Stmg,
    Stmy,
    Lmg,
    Lmy,
    Cs,
    Csg,
    Sync,
    Syscall,
    Byte,
    Word,
    Dword,
}

impl Opcode {
    /// Number of opcodes.
    pub const COUNT: usize = 133;

    /// Every opcode, in declaration order.
    pub const ALL: [Opcode; Opcode::COUNT] = [
        Opcode::Type,
        Opcode::Text,
        Opcode::Funcdata,
        Opcode::Pcdata,
        Opcode::Undef,
        Opcode::Usefield,
        Opcode::Checknil,
        Opcode::Vardef,
        Opcode::Varkill,
        Opcode::Varlive,
        Opcode::Nop,
        Opcode::Ret,
        Opcode::Call,
        Opcode::Jmp,
        Opcode::Duffcopy,
        Opcode::Duffzero,
        Opcode::End,
        Opcode::Globl,
        Opcode::Data,
        Opcode::Add,
        Opcode::Addc,
        Opcode::Adde,
        Opcode::Sub,
        Opcode::Subc,
        Opcode::Sube,
        Opcode::Neg,
        Opcode::And,
        Opcode::Or,
        Opcode::Xor,
        Opcode::Mulld,
        Opcode::Mullw,
        Opcode::Mulhd,
        Opcode::Mulhdu,
        Opcode::Divd,
        Opcode::Divdu,
        Opcode::Rem,
        Opcode::Remu,
        Opcode::Sld,
        Opcode::Srd,
        Opcode::Srad,
        Opcode::Slw,
        Opcode::Srw,
        Opcode::Sraw,
        Opcode::Rll,
        Opcode::Cmp,
        Opcode::Cmpu,
        Opcode::Fadd,
        Opcode::Fadds,
        Opcode::Fsub,
        Opcode::Fsubs,
        Opcode::Fmul,
        Opcode::Fmuls,
        Opcode::Fdiv,
        Opcode::Fdivs,
        Opcode::Fcmpu,
        Opcode::Cebr,
        Opcode::Ledbr,
        Opcode::Ldebr,
        Opcode::Fsqrt,
        Opcode::Fabs,
        Opcode::Fneg,
        Opcode::Fmadd,
        Opcode::Fmsub,
        Opcode::Cefbra,
        Opcode::Cdfbra,
        Opcode::Cegbra,
        Opcode::Cdgbra,
        Opcode::Cfebra,
        Opcode::Cfdbra,
        Opcode::Cgebra,
        Opcode::Cgdbra,
        Opcode::Celfbr,
        Opcode::Cdlfbr,
        Opcode::Celgbr,
        Opcode::Cdlgbr,
        Opcode::Clfebr,
        Opcode::Clfdbr,
        Opcode::Clgebr,
        Opcode::Clgdbr,
        Opcode::Movb,
        Opcode::Movbz,
        Opcode::Movh,
        Opcode::Movhz,
        Opcode::Movw,
        Opcode::Movwz,
        Opcode::Movd,
        Opcode::Fmovs,
        Opcode::Fmovd,
        Opcode::Movdbr,
        Opcode::Movwbr,
        Opcode::Movhbr,
        Opcode::La,
        Opcode::Lay,
        Opcode::Larl,
        Opcode::Mvc,
        Opcode::Clc,
        Opcode::Xc,
        Opcode::Oc,
        Opcode::Nc,
        Opcode::Br,
        Opcode::Bl,
        Opcode::Beq,
        Opcode::Bne,
        Opcode::Bge,
        Opcode::Blt,
        Opcode::Bgt,
        Opcode::Ble,
        Opcode::Cmpbeq,
        Opcode::Cmpbne,
        Opcode::Cmpbge,
        Opcode::Cmpblt,
        Opcode::Cmpbgt,
        Opcode::Cmpble,
        Opcode::Cmpubeq,
        Opcode::Cmpubne,
        Opcode::Cmpubge,
        Opcode::Cmpublt,
        Opcode::Cmpubgt,
        Opcode::Cmpuble,
        Opcode::Brct,
        Opcode::Brctg,
        Opcode::Clear,
        Opcode::Stmg,
        Opcode::Stmy,
        Opcode::Lmg,
        Opcode::Lmy,
        Opcode::Cs,
        Opcode::Csg,
        Opcode::Sync,
        Opcode::Syscall,
        Opcode::Byte,
        Opcode::Word,
        Opcode::Dword,
    ];

    /// Index into per-opcode tables.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Assembler mnemonic.
    pub fn name(self) -> &'static str {
        match self {
            Opcode::Type => "TYPE",
            Opcode::Text => "TEXT",
            Opcode::Funcdata => "FUNCDATA",
            Opcode::Pcdata => "PCDATA",
            Opcode::Undef => "UNDEF",
            Opcode::Usefield => "USEFIELD",
            Opcode::Checknil => "CHECKNIL",
            Opcode::Vardef => "VARDEF",
            Opcode::Varkill => "VARKILL",
            Opcode::Varlive => "VARLIVE",
            Opcode::Nop => "NOP",
            Opcode::Ret => "RET",
            Opcode::Call => "CALL",
            Opcode::Jmp => "JMP",
            Opcode::Duffcopy => "DUFFCOPY",
            Opcode::Duffzero => "DUFFZERO",
            Opcode::End => "END",
            Opcode::Globl => "GLOBL",
            Opcode::Data => "DATA",
            Opcode::Add => "ADD",
            Opcode::Addc => "ADDC",
            Opcode::Adde => "ADDE",
            Opcode::Sub => "SUB",
            Opcode::Subc => "SUBC",
            Opcode::Sube => "SUBE",
            Opcode::Neg => "NEG",
            Opcode::And => "AND",
            Opcode::Or => "OR",
            Opcode::Xor => "XOR",
            Opcode::Mulld => "MULLD",
            Opcode::Mullw => "MULLW",
            Opcode::Mulhd => "MULHD",
            Opcode::Mulhdu => "MULHDU",
            Opcode::Divd => "DIVD",
            Opcode::Divdu => "DIVDU",
            Opcode::Rem => "REM",
            Opcode::Remu => "REMU",
            Opcode::Sld => "SLD",
            Opcode::Srd => "SRD",
            Opcode::Srad => "SRAD",
            Opcode::Slw => "SLW",
            Opcode::Srw => "SRW",
            Opcode::Sraw => "SRAW",
            Opcode::Rll => "RLL",
            Opcode::Cmp => "CMP",
            Opcode::Cmpu => "CMPU",
            Opcode::Fadd => "FADD",
            Opcode::Fadds => "FADDS",
            Opcode::Fsub => "FSUB",
            Opcode::Fsubs => "FSUBS",
            Opcode::Fmul => "FMUL",
            Opcode::Fmuls => "FMULS",
            Opcode::Fdiv => "FDIV",
            Opcode::Fdivs => "FDIVS",
            Opcode::Fcmpu => "FCMPU",
            Opcode::Cebr => "CEBR",
            Opcode::Ledbr => "LEDBR",
            Opcode::Ldebr => "LDEBR",
            Opcode::Fsqrt => "FSQRT",
            Opcode::Fabs => "FABS",
            Opcode::Fneg => "FNEG",
            Opcode::Fmadd => "FMADD",
            Opcode::Fmsub => "FMSUB",
            Opcode::Cefbra => "CEFBRA",
            Opcode::Cdfbra => "CDFBRA",
            Opcode::Cegbra => "CEGBRA",
            Opcode::Cdgbra => "CDGBRA",
            Opcode::Cfebra => "CFEBRA",
            Opcode::Cfdbra => "CFDBRA",
            Opcode::Cgebra => "CGEBRA",
            Opcode::Cgdbra => "CGDBRA",
            Opcode::Celfbr => "CELFBR",
            Opcode::Cdlfbr => "CDLFBR",
            Opcode::Celgbr => "CELGBR",
            Opcode::Cdlgbr => "CDLGBR",
            Opcode::Clfebr => "CLFEBR",
            Opcode::Clfdbr => "CLFDBR",
            Opcode::Clgebr => "CLGEBR",
            Opcode::Clgdbr => "CLGDBR",
            Opcode::Movb => "MOVB",
            Opcode::Movbz => "MOVBZ",
            Opcode::Movh => "MOVH",
            Opcode::Movhz => "MOVHZ",
            Opcode::Movw => "MOVW",
            Opcode::Movwz => "MOVWZ",
            Opcode::Movd => "MOVD",
            Opcode::Fmovs => "FMOVS",
            Opcode::Fmovd => "FMOVD",
            Opcode::Movdbr => "MOVDBR",
            Opcode::Movwbr => "MOVWBR",
            Opcode::Movhbr => "MOVHBR",
            Opcode::La => "LA",
            Opcode::Lay => "LAY",
            Opcode::Larl => "LARL",
            Opcode::Mvc => "MVC",
            Opcode::Clc => "CLC",
            Opcode::Xc => "XC",
            Opcode::Oc => "OC",
            Opcode::Nc => "NC",
            Opcode::Br => "BR",
            Opcode::Bl => "BL",
            Opcode::Beq => "BEQ",
            Opcode::Bne => "BNE",
            Opcode::Bge => "BGE",
            Opcode::Blt => "BLT",
            Opcode::Bgt => "BGT",
            Opcode::Ble => "BLE",
            Opcode::Cmpbeq => "CMPBEQ",
            Opcode::Cmpbne => "CMPBNE",
            Opcode::Cmpbge => "CMPBGE",
            Opcode::Cmpblt => "CMPBLT",
            Opcode::Cmpbgt => "CMPBGT",
            Opcode::Cmpble => "CMPBLE",
            Opcode::Cmpubeq => "CMPUBEQ",
            Opcode::Cmpubne => "CMPUBNE",
            Opcode::Cmpubge => "CMPUBGE",
            Opcode::Cmpublt => "CMPUBLT",
            Opcode::Cmpubgt => "CMPUBGT",
            Opcode::Cmpuble => "CMPUBLE",
            Opcode::Brct => "BRCT",
            Opcode::Brctg => "BRCTG",
            Opcode::Clear => "CLEAR",
            Opcode::Stmg => "STMG",
            Opcode::Stmy => "STMY",
            Opcode::Lmg => "LMG",
            Opcode::Lmy => "LMY",
            Opcode::Cs => "CS",
            Opcode::Csg => "CSG",
            Opcode::Sync => "SYNC",
            Opcode::Syscall => "SYSCALL",
            Opcode::Byte => "BYTE",
            Opcode::Word => "WORD",
            Opcode::Dword => "DWORD",
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What an operand slot holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum OperandKind {
    /// Slot is unused.
    #[default]
    None,
    /// Integer immediate in `offset`.
    Imm,
    /// Register value.
    Reg,
    /// Memory reference `offset(reg)` or `sym+offset(SB)`.
    Mem,
    /// Address expression `$offset(reg)` or `$sym+offset(SB)`; the address
    /// itself is the operand, nothing is loaded.
    Addr,
    /// Branch target (instruction offset in `offset`).
    Branch,
}

/// How a memory operand's base register is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AddrMode {
    /// Base plus displacement; the base register is unchanged.
    #[default]
    Offset,
    /// The base register is advanced after the access.
    PostInc,
}

/// One operand slot of a decoded instruction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Operand {
    pub kind: OperandKind,
    /// Register value, or base register for memory and address operands.
    pub reg: Option<Reg>,
    /// Symbol for static-base memory and address operands.
    pub sym: Option<String>,
    pub offset: i64,
    pub mode: AddrMode,
}

impl Operand {
    /// An unused slot.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn imm(value: i64) -> Self {
        Self {
            kind: OperandKind::Imm,
            offset: value,
            ..Self::default()
        }
    }

    pub fn reg(reg: Reg) -> Self {
        Self {
            kind: OperandKind::Reg,
            reg: Some(reg),
            ..Self::default()
        }
    }

    /// `offset(base)`.
    pub fn mem(base: Reg, offset: i64) -> Self {
        Self {
            kind: OperandKind::Mem,
            reg: Some(base),
            offset,
            ..Self::default()
        }
    }

    /// `offset(base)+`, advancing `base` after the access.
    pub fn mem_post_inc(base: Reg, offset: i64) -> Self {
        Self {
            mode: AddrMode::PostInc,
            ..Self::mem(base, offset)
        }
    }

    /// `sym+offset(SB)`.
    pub fn sym_mem(sym: impl Into<String>, offset: i64) -> Self {
        Self {
            kind: OperandKind::Mem,
            sym: Some(sym.into()),
            offset,
            ..Self::default()
        }
    }

    /// `$offset(base)`.
    pub fn addr(base: Reg, offset: i64) -> Self {
        Self {
            kind: OperandKind::Addr,
            reg: Some(base),
            offset,
            ..Self::default()
        }
    }

    /// `$sym+offset(SB)`.
    pub fn addr_of(sym: impl Into<String>, offset: i64) -> Self {
        Self {
            kind: OperandKind::Addr,
            sym: Some(sym.into()),
            offset,
            ..Self::default()
        }
    }

    pub fn branch(target: i64) -> Self {
        Self {
            kind: OperandKind::Branch,
            offset: target,
            ..Self::default()
        }
    }

    /// Whether the base register (if any) is used to form an address.
    pub fn is_address(&self) -> bool {
        matches!(self.kind, OperandKind::Mem | OperandKind::Addr)
    }

    pub fn is_none(&self) -> bool {
        self.kind == OperandKind::None
    }

    /// Register value operand, if this is one.
    pub fn as_reg(&self) -> Option<Reg> {
        match self.kind {
            OperandKind::Reg => self.reg,
            _ => None,
        }
    }

    fn fmt_location(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.sym, self.reg) {
            (Some(sym), _) if self.offset != 0 => write!(f, "{sym}+{}(SB)", self.offset),
            (Some(sym), _) => write!(f, "{sym}(SB)"),
            (None, Some(base)) => write!(f, "{}({base})", self.offset),
            (None, None) => write!(f, "{}", self.offset),
        }?;
        if self.mode == AddrMode::PostInc {
            f.write_str("+")?;
        }
        Ok(())
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            OperandKind::None => Ok(()),
            OperandKind::Imm => write!(f, "${}", self.offset),
            OperandKind::Reg => match self.reg {
                Some(reg) => write!(f, "{reg}"),
                None => f.write_str("?"),
            },
            OperandKind::Mem => self.fmt_location(f),
            OperandKind::Addr => {
                f.write_str("$")?;
                self.fmt_location(f)
            }
            OperandKind::Branch => write!(f, "{}(PC)", self.offset),
        }
    }
}

/// A decoded s390x instruction: `opcode from, reg, to`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DecodedInst {
    pub opcode: Opcode,
    /// Left (source) operand.
    #[cfg_attr(feature = "serde", serde(default))]
    pub from: Operand,
    /// Middle register: second source of three-operand forms, range bound
    /// of load/store multiple.
    #[cfg_attr(feature = "serde", serde(default))]
    pub reg: Option<Reg>,
    /// Right (destination) operand.
    #[cfg_attr(feature = "serde", serde(default))]
    pub to: Operand,
}

impl DecodedInst {
    /// An instruction with no operands.
    pub fn bare(opcode: Opcode) -> Self {
        Self::new(opcode, Operand::none(), Operand::none())
    }

    /// Two-operand form `opcode from, to`.
    pub fn new(opcode: Opcode, from: Operand, to: Operand) -> Self {
        Self {
            opcode,
            from,
            reg: None,
            to,
        }
    }

    /// Three-operand form `opcode from, reg, to`.
    pub fn with_reg(opcode: Opcode, from: Operand, reg: Reg, to: Operand) -> Self {
        Self {
            opcode,
            from,
            reg: Some(reg),
            to,
        }
    }
}

impl fmt::Display for DecodedInst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.opcode)?;
        let mut sep = " ";
        if !self.from.is_none() {
            write!(f, "{sep}{}", self.from)?;
            sep = ", ";
        }
        if let Some(reg) = self.reg {
            write!(f, "{sep}{reg}")?;
            sep = ", ";
        }
        if !self.to.is_none() {
            write!(f, "{sep}{}", self.to)?;
        }
        Ok(())
    }
}

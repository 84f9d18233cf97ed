//! s390x register definitions.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use tuffy_target::RegMask;

/// Error parsing an assembler register name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid s390x register name `{0}`")]
pub struct ParseRegError(pub String);

/// Register file a [`Reg`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RegClass {
    /// General-purpose registers R0-R15.
    Gpr,
    /// Floating-point registers F0-F15.
    Fpr,
    /// Access registers AR0-AR15.
    Ar,
}

/// An s390x architectural register.
///
/// Encoded as `class * 16 + number`, so registers of one class are
/// contiguous and ordered by hardware number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub struct Reg(u8);

impl Reg {
    pub const R0: Reg = Reg::gpr(0);
    pub const R1: Reg = Reg::gpr(1);
    pub const R2: Reg = Reg::gpr(2);
    pub const R3: Reg = Reg::gpr(3);
    pub const R4: Reg = Reg::gpr(4);
    pub const R5: Reg = Reg::gpr(5);
    pub const R6: Reg = Reg::gpr(6);
    pub const R7: Reg = Reg::gpr(7);
    pub const R8: Reg = Reg::gpr(8);
    pub const R9: Reg = Reg::gpr(9);
    pub const R10: Reg = Reg::gpr(10);
    pub const R11: Reg = Reg::gpr(11);
    pub const R12: Reg = Reg::gpr(12);
    pub const R13: Reg = Reg::gpr(13);
    pub const R14: Reg = Reg::gpr(14);
    pub const R15: Reg = Reg::gpr(15);

    /// Scratch register reserved for the assembler.
    pub const TMP: Reg = Reg::R10;
    /// Second assembler scratch register.
    pub const TMP2: Reg = Reg::R11;
    /// Closure context pointer.
    pub const CTXT: Reg = Reg::R12;
    /// Current goroutine pointer.
    pub const G: Reg = Reg::R13;
    /// Link register.
    pub const LR: Reg = Reg::R14;
    /// Stack pointer.
    pub const SP: Reg = Reg::R15;

    /// General-purpose register `n` (0..16).
    pub const fn gpr(n: u8) -> Reg {
        assert!(n < 16, "GPR number out of range");
        Reg(n)
    }

    /// Floating-point register `n` (0..16).
    pub const fn fpr(n: u8) -> Reg {
        assert!(n < 16, "FPR number out of range");
        Reg(16 + n)
    }

    /// Access register `n` (0..16).
    pub const fn ar(n: u8) -> Reg {
        assert!(n < 16, "AR number out of range");
        Reg(32 + n)
    }

    pub fn class(self) -> RegClass {
        match self.0 >> 4 {
            0 => RegClass::Gpr,
            1 => RegClass::Fpr,
            _ => RegClass::Ar,
        }
    }

    /// Hardware register number within the class (0..16).
    pub fn number(self) -> u8 {
        self.0 & 0xf
    }

    /// Register of the same class with hardware number `n`.
    pub fn with_number(self, n: u8) -> Reg {
        match self.class() {
            RegClass::Gpr => Reg::gpr(n),
            RegClass::Fpr => Reg::fpr(n),
            RegClass::Ar => Reg::ar(n),
        }
    }

    /// Bit index in a [`RegMask`]: GPR n -> n, FPR n -> 32 + n.
    /// Access registers are not tracked by the analysis passes.
    pub fn mask_bit(self) -> Option<u8> {
        match self.class() {
            RegClass::Gpr => Some(self.number()),
            RegClass::Fpr => Some(32 + self.number()),
            RegClass::Ar => None,
        }
    }

    /// Single-register mask; empty for untracked registers.
    pub fn mask(self) -> RegMask {
        self.mask_bit().map_or(RegMask::EMPTY, RegMask::bit)
    }

    /// Inverse of [`Reg::mask_bit`].
    pub fn from_mask_bit(bit: u8) -> Option<Reg> {
        match bit {
            0..16 => Some(Reg::gpr(bit)),
            32..48 => Some(Reg::fpr(bit - 32)),
            _ => None,
        }
    }

    /// Assembler name.
    pub fn name(self) -> String {
        match self.class() {
            RegClass::Gpr => format!("R{}", self.number()),
            RegClass::Fpr => format!("F{}", self.number()),
            RegClass::Ar => format!("AR{}", self.number()),
        }
    }
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Registers of `mask` in ascending mask-bit order.
pub fn regs_in(mask: RegMask) -> impl Iterator<Item = Reg> {
    mask.iter().filter_map(Reg::from_mask_bit)
}

impl FromStr for Reg {
    type Err = ParseRegError;

    /// Parses `R0`-`R15`, `F0`-`F15`, `AR0`-`AR15` and the `SP`, `LR`, `g`
    /// aliases.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseRegError(s.to_string());
        match s {
            "SP" => return Ok(Reg::SP),
            "LR" => return Ok(Reg::LR),
            "g" => return Ok(Reg::G),
            _ => {}
        }
        let (ctor, digits): (fn(u8) -> Reg, &str) = if let Some(d) = s.strip_prefix("AR") {
            (Reg::ar, d)
        } else if let Some(d) = s.strip_prefix('R') {
            (Reg::gpr, d)
        } else if let Some(d) = s.strip_prefix('F') {
            (Reg::fpr, d)
        } else {
            return Err(err());
        };
        let n: u8 = digits.parse().map_err(|_| err())?;
        if n >= 16 {
            return Err(err());
        }
        Ok(ctor(n))
    }
}

impl TryFrom<String> for Reg {
    type Error = ParseRegError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Reg> for String {
    fn from(reg: Reg) -> String {
        reg.name()
    }
}

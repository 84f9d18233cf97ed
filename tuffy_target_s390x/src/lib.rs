//! tuffy_target_s390x: s390x (z/Architecture) backend.
//!
//! Classifies s390x instructions for the analysis passes: the opcode
//! property table, the per-instruction resolver, and the register access
//! summary built from a resolved record.

pub mod access;
pub mod inst;
pub mod progtable;
pub mod reg;
pub mod resolve;

pub use access::{RegAccesses, reg_accesses};
pub use inst::{AddrMode, DecodedInst, Opcode, Operand, OperandKind};
pub use reg::Reg;
pub use resolve::{UnclassifiedOpcode, resolve, try_resolve};

#[cfg(test)]
mod tests;

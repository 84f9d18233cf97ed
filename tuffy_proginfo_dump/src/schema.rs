//! JSON output records.

use serde::Serialize;
use tuffy_target::ProgInfo;
use tuffy_target_s390x::Opcode;

/// One classified opcode and its base record.
#[derive(Debug, Serialize)]
pub struct TableEntry {
    pub opcode: Opcode,
    pub info: ProgInfo,
}

/// One decoded instruction and its resolved record.
#[derive(Debug, Serialize)]
pub struct ResolvedInst {
    /// Assembler text of the instruction.
    pub asm: String,
    pub info: ProgInfo,
}

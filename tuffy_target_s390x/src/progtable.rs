//! Opcode property table: base operand-access facts for every opcode the
//! backend generates.
//!
//! Entries are grouped by instruction family. Every size variant of an
//! operation is listed even when instruction selection only uses some of
//! them. Opcodes the backend never emits (assembler-only forms, data
//! directives) are deliberately left unclassified; resolving one is a
//! programming error upstream.

use std::sync::OnceLock;

use tuffy_target::{OpWidth, ProgFlags, ProgInfo};

use crate::inst::Opcode;

const PSEUDO: ProgFlags = ProgFlags::PSEUDO;
const LEFT_READ: ProgFlags = ProgFlags::LEFT_READ;
const LEFT_ADDR: ProgFlags = ProgFlags::LEFT_ADDR;
const REG_READ: ProgFlags = ProgFlags::REG_READ;
const RIGHT_READ: ProgFlags = ProgFlags::RIGHT_READ;
const RIGHT_WRITE: ProgFlags = ProgFlags::RIGHT_WRITE;
const RIGHT_ADDR: ProgFlags = ProgFlags::RIGHT_ADDR;
const MOVE: ProgFlags = ProgFlags::MOVE;
const CONV: ProgFlags = ProgFlags::CONV;

/// `from op reg -> to`, or `from op to -> to` when `reg` is absent.
const BINOP: ProgFlags = LEFT_READ.union(REG_READ).union(RIGHT_WRITE);
/// Both operands read, nothing written.
const COMPARE: ProgFlags = LEFT_READ.union(RIGHT_READ);
const CONVERT: ProgFlags = LEFT_READ.union(RIGHT_WRITE).union(CONV);
/// Narrow or reinterpreting move.
const MOVE_CONV: ProgFlags = LEFT_READ.union(RIGHT_WRITE).union(MOVE).union(CONV);
const MOVE_FULL: ProgFlags = LEFT_READ.union(RIGHT_WRITE).union(MOVE);

/// Base record for `op`, or `None` if the backend never generates it.
///
/// The match is exhaustive: a new opcode does not compile until it is
/// either classified here or added to the unclassified arm.
pub fn classify(op: Opcode) -> Option<ProgInfo> {
    use Opcode::*;

    let info = match op {
        // Pseudo-instructions and annotations.
        Type => ProgInfo::new(PSEUDO | ProgFlags::SKIP),
        Text | Funcdata | Pcdata => ProgInfo::new(PSEUDO),
        Undef => ProgInfo::new(ProgFlags::BREAK),
        Usefield => ProgInfo::new(ProgFlags::OK),
        Checknil => ProgInfo::new(LEFT_READ),
        Vardef | Varkill => ProgInfo::new(PSEUDO | RIGHT_WRITE),
        Varlive => ProgInfo::new(PSEUDO | LEFT_READ),
        // NOP is the internal no-op that also stands for USED and SET
        // annotations, not the machine NOP.
        Nop => ProgInfo::new(LEFT_READ | RIGHT_WRITE),

        // Integer.
        Add | Sub | Neg | And | Or | Xor | Mulld | Divd | Divdu | Sld | Srd | Srad => {
            ProgInfo::sized(BINOP, OpWidth::DoubleWord)
        }
        Mullw | Mulhdu => ProgInfo::sized(BINOP, OpWidth::Word),
        Cmp | Cmpu => ProgInfo::sized(COMPARE, OpWidth::DoubleWord),

        // Floating point.
        Fadd | Fsub | Fmul | Fdiv => ProgInfo::sized(BINOP, OpWidth::Double),
        Fadds | Fsubs | Fmuls | Fdivs => ProgInfo::sized(BINOP, OpWidth::Single),
        Fcmpu => ProgInfo::sized(COMPARE, OpWidth::Double),
        Cebr => ProgInfo::sized(COMPARE, OpWidth::Single),
        Ledbr | Ldebr => ProgInfo::sized(CONVERT, OpWidth::Double),
        Fsqrt => ProgInfo::sized(LEFT_READ | RIGHT_WRITE, OpWidth::Double),

        // Conversions, sized by destination.
        Cefbra | Cegbra | Celfbr | Celgbr => ProgInfo::sized(CONVERT, OpWidth::Single),
        Cdfbra | Cdgbra | Cdlfbr | Cdlgbr => ProgInfo::sized(CONVERT, OpWidth::Double),
        Cfebra | Cfdbra | Clfebr | Clfdbr => ProgInfo::sized(CONVERT, OpWidth::Word),
        Cgebra | Cgdbra | Clgebr | Clgdbr => ProgInfo::sized(CONVERT, OpWidth::DoubleWord),

        // Moves.
        Movb | Movbz => ProgInfo::sized(MOVE_CONV, OpWidth::Byte),
        Movh | Movhz => ProgInfo::sized(MOVE_CONV, OpWidth::HalfWord),
        // MOVWZ zero-extends, MOVW sign-extends.
        Movw | Movwz => ProgInfo::sized(MOVE_CONV, OpWidth::Word),
        Movd => ProgInfo::sized(MOVE_FULL, OpWidth::DoubleWord),
        Fmovs => ProgInfo::sized(MOVE_CONV, OpWidth::Single),
        Fmovd => ProgInfo::sized(MOVE_FULL, OpWidth::Double),

        // Storage operations: the memory side effect is expressed through
        // the address operands, not a register write.
        Mvc | Clc | Xc | Oc | Nc => ProgInfo::sized(COMPARE, OpWidth::DoubleWord),

        // Jumps.
        Br => ProgInfo::new(ProgFlags::JUMP | ProgFlags::BREAK),
        Bl => ProgInfo::new(ProgFlags::CALL),
        Beq | Bne | Bge | Blt | Bgt | Ble => ProgInfo::new(ProgFlags::COND_JUMP),
        Cmpbeq | Cmpbne | Cmpbge | Cmpblt | Cmpbgt | Cmpble => {
            ProgInfo::new(ProgFlags::COND_JUMP)
        }
        Cmpubeq | Cmpubne | Cmpubge | Cmpublt | Cmpubgt | Cmpuble => {
            ProgInfo::new(ProgFlags::COND_JUMP)
        }

        // Macros.
        Clear => ProgInfo::sized(LEFT_READ | RIGHT_ADDR | RIGHT_WRITE, OpWidth::DoubleWord),

        // Load/store multiple. The register range itself is added by the
        // resolver.
        Stmg => ProgInfo::sized(LEFT_READ | RIGHT_ADDR | RIGHT_WRITE, OpWidth::DoubleWord),
        Stmy => ProgInfo::sized(LEFT_READ | RIGHT_ADDR | RIGHT_WRITE, OpWidth::Word),
        Lmg => ProgInfo::sized(LEFT_ADDR | LEFT_READ | RIGHT_WRITE, OpWidth::DoubleWord),
        Lmy => ProgInfo::sized(LEFT_ADDR | LEFT_READ | RIGHT_WRITE, OpWidth::Word),

        Ret => ProgInfo::new(ProgFlags::BREAK),

        // Never generated by the backend.
        Call | Jmp | Duffcopy | Duffzero | End | Globl | Data | Addc | Adde | Subc | Sube
        | Mulhd | Rem | Remu | Slw | Srw | Sraw | Rll | Fabs | Fneg | Fmadd | Fmsub | Movdbr
        | Movwbr | Movhbr | La | Lay | Larl | Brct | Brctg | Cs | Csg | Sync | Syscall | Byte
        | Word | Dword => return None,
    };
    Some(info)
}

type Table = [Option<ProgInfo>; Opcode::COUNT];

fn build_table() -> Table {
    let mut table = [None; Opcode::COUNT];
    for op in Opcode::ALL {
        let entry = classify(op);
        if let Some(info) = entry {
            assert!(!info.is_empty(), "progtable: empty entry for {op}");
        }
        table[op.index()] = entry;
    }
    log::debug!(
        "progtable: {} of {} opcodes classified",
        table.iter().filter(|e| e.is_some()).count(),
        Opcode::COUNT
    );
    table
}

fn table() -> &'static Table {
    static TABLE: OnceLock<Table> = OnceLock::new();
    TABLE.get_or_init(build_table)
}

/// Base record for `op`.
///
/// `None` means `op` is outside the set of opcodes the backend generates.
pub fn lookup(op: Opcode) -> Option<ProgInfo> {
    table()[op.index()]
}

pub fn is_classified(op: Opcode) -> bool {
    lookup(op).is_some()
}

/// All classified opcodes with their base records, in opcode order.
pub fn classified() -> impl Iterator<Item = (Opcode, ProgInfo)> {
    Opcode::ALL
        .into_iter()
        .filter_map(|op| lookup(op).map(|info| (op, info)))
}

//! Tests for the s390x register model, opcode table, resolver and access
//! summary.

use tuffy_target::{OpKind, OpWidth, ProgFlags, ProgInfo, RegMask};

use crate::access::reg_accesses;
use crate::inst::{DecodedInst, Opcode, Operand};
use crate::progtable::{self, classify, lookup};
use crate::reg::{Reg, RegClass};
use crate::resolve::{resolve, try_resolve};

fn regs(list: &[Reg]) -> RegMask {
    list.iter().fold(RegMask::EMPTY, |m, r| m | r.mask())
}

// --- Registers ---

#[test]
fn reg_classes_and_numbers() {
    assert_eq!(Reg::R7.class(), RegClass::Gpr);
    assert_eq!(Reg::R7.number(), 7);
    assert_eq!(Reg::fpr(3).class(), RegClass::Fpr);
    assert_eq!(Reg::fpr(3).number(), 3);
    assert_eq!(Reg::ar(2).class(), RegClass::Ar);
    assert_eq!(Reg::SP, Reg::R15);
    assert_eq!(Reg::LR, Reg::R14);
}

#[test]
fn reg_mask_layout() {
    assert_eq!(Reg::R0.mask_bit(), Some(0));
    assert_eq!(Reg::R15.mask_bit(), Some(15));
    assert_eq!(Reg::fpr(0).mask_bit(), Some(32));
    assert_eq!(Reg::fpr(15).mask_bit(), Some(47));
    assert_eq!(Reg::ar(1).mask_bit(), None);
    assert!(Reg::ar(1).mask().is_empty());
    assert_eq!(Reg::from_mask_bit(34), Some(Reg::fpr(2)));
    assert_eq!(Reg::from_mask_bit(20), None);
}

#[test]
fn reg_names_round_trip() {
    assert_eq!(Reg::R12.to_string(), "R12");
    assert_eq!(Reg::fpr(9).to_string(), "F9");
    assert_eq!(Reg::ar(4).to_string(), "AR4");
    assert_eq!("R5".parse::<Reg>(), Ok(Reg::R5));
    assert_eq!("F15".parse::<Reg>(), Ok(Reg::fpr(15)));
    assert_eq!("AR0".parse::<Reg>(), Ok(Reg::ar(0)));
    assert_eq!("SP".parse::<Reg>(), Ok(Reg::R15));
    assert_eq!("g".parse::<Reg>(), Ok(Reg::R13));
    assert!("R16".parse::<Reg>().is_err());
    assert!("X1".parse::<Reg>().is_err());
    assert!("R".parse::<Reg>().is_err());
}

// --- Instruction model ---

#[test]
fn opcode_index_matches_all() {
    for (i, op) in Opcode::ALL.iter().enumerate() {
        assert_eq!(op.index(), i, "{op}");
    }
}

#[test]
fn decoded_inst_display() {
    let add = DecodedInst::with_reg(
        Opcode::Add,
        Operand::reg(Reg::R1),
        Reg::R2,
        Operand::reg(Reg::R3),
    );
    assert_eq!(add.to_string(), "ADD R1, R2, R3");

    let lmg = DecodedInst::with_reg(
        Opcode::Lmg,
        Operand::mem(Reg::R15, 8),
        Reg::R2,
        Operand::reg(Reg::R5),
    );
    assert_eq!(lmg.to_string(), "LMG 8(R15), R2, R5");

    let load = DecodedInst::new(
        Opcode::Movd,
        Operand::addr_of("runtime.x", 16),
        Operand::reg(Reg::R1),
    );
    assert_eq!(load.to_string(), "MOVD $runtime.x+16(SB), R1");

    let post = DecodedInst::new(
        Opcode::Movd,
        Operand::mem_post_inc(Reg::R2, 0),
        Operand::reg(Reg::R3),
    );
    assert_eq!(post.to_string(), "MOVD 0(R2)+, R3");

    assert_eq!(DecodedInst::bare(Opcode::Ret).to_string(), "RET");
    assert_eq!(
        DecodedInst::new(Opcode::Beq, Operand::none(), Operand::branch(12)).to_string(),
        "BEQ 12(PC)"
    );
}

// --- Table ---

#[test]
fn every_classified_entry_is_non_empty() {
    for (op, info) in progtable::classified() {
        assert!(!info.is_empty(), "{op} has an empty base record");
    }
}

#[test]
fn table_agrees_with_classify() {
    for op in Opcode::ALL {
        assert_eq!(lookup(op), classify(op), "{op}");
    }
}

#[test]
fn unclassified_opcodes() {
    let unclassified: Vec<Opcode> = Opcode::ALL
        .into_iter()
        .filter(|op| !progtable::is_classified(*op))
        .collect();
    for op in [
        Opcode::Syscall,
        Opcode::Movdbr,
        Opcode::La,
        Opcode::Data,
        Opcode::Call,
        Opcode::Jmp,
    ] {
        assert!(unclassified.contains(&op), "{op} should be unclassified");
    }
    assert_eq!(
        unclassified.len() + progtable::classified().count(),
        Opcode::COUNT
    );
}

#[test]
fn pseudo_family() {
    let ty = lookup(Opcode::Type).unwrap();
    assert!(ty.is_pseudo() && ty.is_skip());
    assert_eq!(lookup(Opcode::Text).unwrap().flags, ProgFlags::PSEUDO);
    assert_eq!(lookup(Opcode::Funcdata).unwrap().flags, ProgFlags::PSEUDO);
    assert_eq!(
        lookup(Opcode::Varlive).unwrap().flags,
        ProgFlags::PSEUDO | ProgFlags::LEFT_READ
    );
    assert_eq!(
        lookup(Opcode::Vardef).unwrap().flags,
        ProgFlags::PSEUDO | ProgFlags::RIGHT_WRITE
    );
    assert_eq!(lookup(Opcode::Usefield).unwrap().flags, ProgFlags::OK);
    assert_eq!(
        lookup(Opcode::Nop).unwrap().flags,
        ProgFlags::LEFT_READ | ProgFlags::RIGHT_WRITE
    );
    assert!(!lookup(Opcode::Undef).unwrap().falls_through());
}

#[test]
fn arithmetic_family() {
    let binop = ProgFlags::LEFT_READ | ProgFlags::REG_READ | ProgFlags::RIGHT_WRITE;
    for op in [Opcode::Add, Opcode::Sub, Opcode::Sld, Opcode::Divdu] {
        assert_eq!(
            lookup(op),
            Some(ProgInfo::sized(binop, OpWidth::DoubleWord)),
            "{op}"
        );
    }
    assert_eq!(lookup(Opcode::Mullw).unwrap().width, Some(OpWidth::Word));
    assert_eq!(lookup(Opcode::Fadds).unwrap().width, Some(OpWidth::Single));
    assert_eq!(lookup(Opcode::Fdiv).unwrap().width, Some(OpWidth::Double));

    let cmp = lookup(Opcode::Cmpu).unwrap();
    assert!(cmp.reads_left() && cmp.reads_right());
    assert!(!cmp.writes_right());
    let cebr = lookup(Opcode::Cebr).unwrap();
    assert_eq!(cebr.flags, ProgFlags::LEFT_READ | ProgFlags::RIGHT_READ);
    assert_eq!(cebr.width, Some(OpWidth::Single));
}

#[test]
fn conversion_family_sized_by_destination() {
    let cases = [
        (Opcode::Cefbra, OpWidth::Single),
        (Opcode::Cdgbra, OpWidth::Double),
        (Opcode::Cfdbra, OpWidth::Word),
        (Opcode::Clgebr, OpWidth::DoubleWord),
        (Opcode::Ledbr, OpWidth::Double),
    ];
    for (op, width) in cases {
        let info = lookup(op).unwrap();
        assert!(info.is_conv(), "{op}");
        assert!(info.reads_left() && info.writes_right(), "{op}");
        assert_eq!(info.width, Some(width), "{op}");
    }
}

#[test]
fn move_family() {
    let movb = lookup(Opcode::Movb).unwrap();
    assert!(movb.is_move() && movb.is_conv());
    assert_eq!(movb.width, Some(OpWidth::Byte));
    assert_eq!(lookup(Opcode::Movhz).unwrap().width, Some(OpWidth::HalfWord));

    let movd = lookup(Opcode::Movd).unwrap();
    assert!(movd.is_move() && !movd.is_conv());
    let fmovd = lookup(Opcode::Fmovd).unwrap();
    assert!(fmovd.is_move() && !fmovd.is_conv());
    assert!(lookup(Opcode::Fmovs).unwrap().is_conv());
}

#[test]
fn storage_family_has_no_write() {
    for op in [Opcode::Mvc, Opcode::Clc, Opcode::Xc, Opcode::Oc, Opcode::Nc] {
        let info = lookup(op).unwrap();
        assert_eq!(info.flags, ProgFlags::LEFT_READ | ProgFlags::RIGHT_READ, "{op}");
    }
}

#[test]
fn control_transfer_family() {
    let br = lookup(Opcode::Br).unwrap();
    assert!(br.is_jump() && !br.falls_through());
    assert_eq!(lookup(Opcode::Bl).unwrap().flags, ProgFlags::CALL);
    for op in [Opcode::Beq, Opcode::Cmpblt, Opcode::Cmpubge] {
        assert_eq!(lookup(op).unwrap().flags, ProgFlags::COND_JUMP, "{op}");
    }
    let ret = lookup(Opcode::Ret).unwrap();
    assert_eq!(ret.flags, ProgFlags::BREAK);
}

#[test]
fn multi_register_family() {
    let lmg = lookup(Opcode::Lmg).unwrap();
    assert!(lmg.left_is_addr() && lmg.reads_left() && lmg.writes_right());
    let stmy = lookup(Opcode::Stmy).unwrap();
    assert!(stmy.right_is_addr() && stmy.reads_left() && stmy.writes_right());
    assert_eq!(stmy.width, Some(OpWidth::Word));
    let clear = lookup(Opcode::Clear).unwrap();
    assert!(clear.right_is_addr() && clear.writes_right());
}

// --- Resolver ---

#[test]
fn three_operand_form_keeps_reg_read() {
    let inst = DecodedInst::with_reg(
        Opcode::Add,
        Operand::reg(Reg::R1),
        Reg::R2,
        Operand::reg(Reg::R3),
    );
    let info = resolve(&inst);
    assert!(info.reads_reg());
    assert!(!info.reads_right());
}

#[test]
fn two_operand_form_reads_right() {
    let inst = DecodedInst::new(Opcode::Add, Operand::reg(Reg::R1), Operand::reg(Reg::R3));
    let info = resolve(&inst);
    assert!(!info.reads_reg());
    assert!(info.reads_right());
    assert!(info.writes_right());
    assert_eq!(info.width, Some(OpWidth::DoubleWord));
}

#[test]
fn float_two_operand_reads_right() {
    let inst = DecodedInst::new(Opcode::Fadds, Operand::reg(Reg::fpr(1)), Operand::reg(Reg::fpr(2)));
    let info = resolve(&inst);
    assert_eq!(
        info.flags,
        ProgFlags::LEFT_READ | ProgFlags::RIGHT_READ | ProgFlags::RIGHT_WRITE
    );
}

#[test]
fn memory_base_is_indexed() {
    let inst = DecodedInst::new(
        Opcode::Movd,
        Operand::mem(Reg::R15, 16),
        Operand::reg(Reg::R2),
    );
    let info = resolve(&inst);
    assert_eq!(info.regindex, Reg::R15.mask());
    assert!(info.regset.is_empty());
    assert!(!info.post_increments());

    let store = DecodedInst::new(
        Opcode::Movw,
        Operand::reg(Reg::R2),
        Operand::mem(Reg::R4, 0),
    );
    assert_eq!(resolve(&store).regindex, Reg::R4.mask());
}

#[test]
fn static_base_is_not_indexed() {
    let inst = DecodedInst::new(
        Opcode::Movd,
        Operand::sym_mem("runtime.x", 0),
        Operand::reg(Reg::R2),
    );
    let info = resolve(&inst);
    assert!(info.regindex.is_empty());
    assert!(info.regset.is_empty());
}

#[test]
fn register_operand_is_not_indexed() {
    let inst = DecodedInst::new(Opcode::Movd, Operand::reg(Reg::R1), Operand::reg(Reg::R2));
    let info = resolve(&inst);
    assert!(info.regindex.is_empty());
}

#[test]
fn post_increment_on_read_operand_sets_base() {
    let inst = DecodedInst::new(
        Opcode::Movd,
        Operand::mem_post_inc(Reg::R2, 8),
        Operand::reg(Reg::R3),
    );
    let info = resolve(&inst);
    assert!(info.post_increments());
    assert_eq!(info.regindex, Reg::R2.mask());
    assert_eq!(info.regset, Reg::R2.mask());
}

#[test]
fn post_increment_on_written_operand_sets_base() {
    let inst = DecodedInst::new(
        Opcode::Movb,
        Operand::reg(Reg::R3),
        Operand::mem_post_inc(Reg::R4, 1),
    );
    let info = resolve(&inst);
    assert_eq!(info.regindex, Reg::R4.mask());
    assert_eq!(info.regset, Reg::R4.mask());
}

#[test]
fn symbol_address_is_left_addr() {
    let inst = DecodedInst::new(
        Opcode::Movd,
        Operand::addr_of("type.int", 0),
        Operand::reg(Reg::R1),
    );
    let info = resolve(&inst);
    assert!(!info.reads_left());
    assert!(info.left_is_addr());
    assert!(info.writes_right());
}

#[test]
fn frame_address_keeps_left_read() {
    let inst = DecodedInst::new(
        Opcode::Movd,
        Operand::addr(Reg::R15, 24),
        Operand::reg(Reg::R1),
    );
    let info = resolve(&inst);
    assert!(info.reads_left());
    assert!(!info.left_is_addr());
    assert_eq!(info.regindex, Reg::R15.mask());
}

#[test]
fn load_multiple_sets_range() {
    let inst = DecodedInst::with_reg(
        Opcode::Lmg,
        Operand::mem(Reg::R15, 0),
        Reg::R2,
        Operand::reg(Reg::R5),
    );
    let info = resolve(&inst);
    assert_eq!(info.regset, regs(&[Reg::R2, Reg::R3, Reg::R4, Reg::R5]));
    assert!(info.reguse.is_empty());
    assert_eq!(info.regindex, Reg::R15.mask());
    // The base flags survive the range expansion.
    assert!(info.left_is_addr() && info.reads_left() && info.writes_right());
}

#[test]
fn store_multiple_uses_range() {
    let inst = DecodedInst::with_reg(
        Opcode::Stmg,
        Operand::reg(Reg::R1),
        Reg::R4,
        Operand::mem(Reg::R15, 0),
    );
    let info = resolve(&inst);
    assert_eq!(info.reguse, regs(&[Reg::R1, Reg::R2, Reg::R3, Reg::R4]));
    assert!(info.regset.is_empty());
    assert_eq!(info.regindex, Reg::R15.mask());
}

#[test]
fn store_multiple_word_form() {
    let inst = DecodedInst::with_reg(
        Opcode::Stmy,
        Operand::reg(Reg::R6),
        Reg::R6,
        Operand::mem(Reg::R15, 4),
    );
    let info = resolve(&inst);
    assert_eq!(info.reguse, Reg::R6.mask());
    assert_eq!(info.width, Some(OpWidth::Word));
}

#[test]
fn reversed_range_is_empty() {
    let inst = DecodedInst::with_reg(
        Opcode::Lmy,
        Operand::mem(Reg::R15, 0),
        Reg::R5,
        Operand::reg(Reg::R2),
    );
    assert!(resolve(&inst).regset.is_empty());
}

#[test]
fn range_without_bound_is_empty() {
    let inst = DecodedInst::new(Opcode::Lmg, Operand::mem(Reg::R15, 0), Operand::reg(Reg::R5));
    let info = resolve(&inst);
    assert!(info.regset.is_empty());
    assert_eq!(info.regindex, Reg::R15.mask());
}

#[test]
fn range_across_register_files_is_empty() {
    let inst = DecodedInst::with_reg(
        Opcode::Stmg,
        Operand::reg(Reg::R1),
        Reg::fpr(4),
        Operand::mem(Reg::R15, 0),
    );
    assert!(resolve(&inst).reguse.is_empty());
}

#[test]
fn resolve_is_deterministic() {
    let inst = DecodedInst::with_reg(
        Opcode::Lmg,
        Operand::mem_post_inc(Reg::R9, 0),
        Reg::R6,
        Operand::reg(Reg::R12),
    );
    assert_eq!(resolve(&inst), resolve(&inst.clone()));
}

#[test]
fn resolve_does_not_touch_table() {
    let inst = DecodedInst::with_reg(
        Opcode::Lmg,
        Operand::mem_post_inc(Reg::R9, 0),
        Reg::R6,
        Operand::reg(Reg::R12),
    );
    let before = lookup(Opcode::Lmg);
    let _ = resolve(&inst);
    assert_eq!(lookup(Opcode::Lmg), before);
    assert!(before.unwrap().regset.is_empty());
}

#[test]
fn pseudo_resolves_to_pseudo() {
    let info = resolve(&DecodedInst::new(
        Opcode::Varkill,
        Operand::none(),
        Operand::sym_mem("autotmp_1", 0),
    ));
    assert!(info.is_pseudo());
    assert!(info.writes_right());
}

#[test]
fn unclassified_opcode_is_an_error() {
    let inst = DecodedInst::bare(Opcode::Syscall);
    let err = try_resolve(&inst).unwrap_err();
    assert_eq!(err.opcode, Opcode::Syscall);
    assert_eq!(err.inst, "SYSCALL");
    assert_eq!(
        err.to_string(),
        "unclassified opcode SYSCALL in instruction `SYSCALL`"
    );
}

#[test]
#[should_panic(expected = "unclassified opcode MOVDBR in instruction `MOVDBR R1, R2`")]
fn unclassified_opcode_is_fatal() {
    let inst = DecodedInst::new(Opcode::Movdbr, Operand::reg(Reg::R1), Operand::reg(Reg::R2));
    resolve(&inst);
}

// --- Access summary ---

#[test]
fn accesses_three_operand() {
    let inst = DecodedInst::with_reg(
        Opcode::Sub,
        Operand::reg(Reg::R1),
        Reg::R2,
        Operand::reg(Reg::R3),
    );
    let acc = reg_accesses(&inst, &resolve(&inst));
    assert_eq!(acc.uses, regs(&[Reg::R1, Reg::R2]));
    assert_eq!(acc.defs, Reg::R3.mask());
    assert_eq!(acc.kind_of(Reg::R3), Some(OpKind::Def));
    assert_eq!(acc.kind_of(Reg::R4), None);
}

#[test]
fn accesses_two_operand_is_read_modify_write() {
    let inst = DecodedInst::new(Opcode::Xor, Operand::reg(Reg::R1), Operand::reg(Reg::R3));
    let acc = reg_accesses(&inst, &resolve(&inst));
    assert_eq!(acc.kind_of(Reg::R1), Some(OpKind::Use));
    assert_eq!(acc.kind_of(Reg::R3), Some(OpKind::UseDef));
}

#[test]
fn accesses_load_multiple() {
    let inst = DecodedInst::with_reg(
        Opcode::Lmg,
        Operand::mem(Reg::R15, 0),
        Reg::R6,
        Operand::reg(Reg::R8),
    );
    let acc = reg_accesses(&inst, &resolve(&inst));
    assert_eq!(acc.uses, Reg::R15.mask());
    assert_eq!(acc.defs, regs(&[Reg::R6, Reg::R7, Reg::R8]));
    let listed: Vec<_> = acc.iter().collect();
    assert_eq!(
        listed,
        vec![
            (Reg::R6, OpKind::Def),
            (Reg::R7, OpKind::Def),
            (Reg::R8, OpKind::Def),
            (Reg::R15, OpKind::Use),
        ]
    );
}

#[test]
fn accesses_post_increment_base_is_use_def() {
    let inst = DecodedInst::new(
        Opcode::Movd,
        Operand::mem_post_inc(Reg::R2, 8),
        Operand::reg(Reg::R3),
    );
    let acc = reg_accesses(&inst, &resolve(&inst));
    assert_eq!(acc.kind_of(Reg::R2), Some(OpKind::UseDef));
    assert_eq!(acc.kind_of(Reg::R3), Some(OpKind::Def));
}

#[test]
fn accesses_compare_only_uses() {
    let inst = DecodedInst::new(
        Opcode::Fcmpu,
        Operand::reg(Reg::fpr(1)),
        Operand::reg(Reg::fpr(2)),
    );
    let acc = reg_accesses(&inst, &resolve(&inst));
    assert_eq!(acc.uses, regs(&[Reg::fpr(1), Reg::fpr(2)]));
    assert!(acc.defs.is_empty());
}

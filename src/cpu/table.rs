//! The 16x16 opcode descriptor table.
//!
//! Every one of the 256 opcodes gets an entry: mnemonic (for the
//! disassembler), operation tag, addressing-mode tag and base cycle count.
//! Unofficial opcodes are present as `Xxx` (or cycle-accurate `Nop`/`Sbc`
//! aliases) so execution never panics on them; their mnemonic is "???".

/// Addressing mode tags. Names follow the traditional 6502 shorthand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddrMode {
    /// Implied (also covers accumulator operands).
    Imp,
    /// Immediate.
    Imm,
    /// Zero page.
    Zp0,
    /// Zero page, X-indexed.
    Zpx,
    /// Zero page, Y-indexed.
    Zpy,
    /// Relative (branches only).
    Rel,
    /// Absolute.
    Abs,
    /// Absolute, X-indexed.
    Abx,
    /// Absolute, Y-indexed.
    Aby,
    /// Indirect (JMP only, with the $xxFF page-wrap quirk).
    Ind,
    /// Indexed indirect, (zp,X).
    Izx,
    /// Indirect indexed, (zp),Y.
    Izy,
}

/// Operation tags, one per implemented instruction plus `Xxx` for
/// unofficial opcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Adc, And, Asl, Bcc, Bcs, Beq, Bit, Bmi, Bne, Bpl, Brk, Bvc, Bvs, Clc,
    Cld, Cli, Clv, Cmp, Cpx, Cpy, Dec, Dex, Dey, Eor, Inc, Inx, Iny, Jmp,
    Jsr, Lda, Ldx, Ldy, Lsr, Nop, Ora, Pha, Php, Pla, Plp, Rol, Ror, Rti,
    Rts, Sbc, Sec, Sed, Sei, Sta, Stx, Sty, Tax, Tay, Tsx, Txa, Txs, Tya,
    Xxx,
}

/// One row of the opcode table.
#[derive(Debug, Clone, Copy)]
pub struct Instruction {
    pub name: &'static str,
    pub op: Operation,
    pub mode: AddrMode,
    pub cycles: u8,
}

const fn i(name: &'static str, op: Operation, mode: AddrMode, cycles: u8) -> Instruction {
    Instruction {
        name,
        op,
        mode,
        cycles,
    }
}

use AddrMode::*;
use Operation::*;

/// Indexed directly by opcode byte. Layout mirrors the 16x16 matrix found
/// on every 6502 datasheet; read it row by row.
#[rustfmt::skip]
pub static LOOKUP: [Instruction; 256] = [
    i("BRK", Brk, Imm, 7), i("ORA", Ora, Izx, 6), i("???", Xxx, Imp, 2), i("???", Xxx, Imp, 8), i("???", Nop, Imp, 3), i("ORA", Ora, Zp0, 3), i("ASL", Asl, Zp0, 5), i("???", Xxx, Imp, 5), i("PHP", Php, Imp, 3), i("ORA", Ora, Imm, 2), i("ASL", Asl, Imp, 2), i("???", Xxx, Imp, 2), i("???", Nop, Imp, 4), i("ORA", Ora, Abs, 4), i("ASL", Asl, Abs, 6), i("???", Xxx, Imp, 6),
    i("BPL", Bpl, Rel, 2), i("ORA", Ora, Izy, 5), i("???", Xxx, Imp, 2), i("???", Xxx, Imp, 8), i("???", Nop, Imp, 4), i("ORA", Ora, Zpx, 4), i("ASL", Asl, Zpx, 6), i("???", Xxx, Imp, 6), i("CLC", Clc, Imp, 2), i("ORA", Ora, Aby, 4), i("???", Nop, Imp, 2), i("???", Xxx, Imp, 7), i("???", Nop, Imp, 4), i("ORA", Ora, Abx, 4), i("ASL", Asl, Abx, 7), i("???", Xxx, Imp, 7),
    i("JSR", Jsr, Abs, 6), i("AND", And, Izx, 6), i("???", Xxx, Imp, 2), i("???", Xxx, Imp, 8), i("BIT", Bit, Zp0, 3), i("AND", And, Zp0, 3), i("ROL", Rol, Zp0, 5), i("???", Xxx, Imp, 5), i("PLP", Plp, Imp, 4), i("AND", And, Imm, 2), i("ROL", Rol, Imp, 2), i("???", Xxx, Imp, 2), i("BIT", Bit, Abs, 4), i("AND", And, Abs, 4), i("ROL", Rol, Abs, 6), i("???", Xxx, Imp, 6),
    i("BMI", Bmi, Rel, 2), i("AND", And, Izy, 5), i("???", Xxx, Imp, 2), i("???", Xxx, Imp, 8), i("???", Nop, Imp, 4), i("AND", And, Zpx, 4), i("ROL", Rol, Zpx, 6), i("???", Xxx, Imp, 6), i("SEC", Sec, Imp, 2), i("AND", And, Aby, 4), i("???", Nop, Imp, 2), i("???", Xxx, Imp, 7), i("???", Nop, Imp, 4), i("AND", And, Abx, 4), i("ROL", Rol, Abx, 7), i("???", Xxx, Imp, 7),
    i("RTI", Rti, Imp, 6), i("EOR", Eor, Izx, 6), i("???", Xxx, Imp, 2), i("???", Xxx, Imp, 8), i("???", Nop, Imp, 3), i("EOR", Eor, Zp0, 3), i("LSR", Lsr, Zp0, 5), i("???", Xxx, Imp, 5), i("PHA", Pha, Imp, 3), i("EOR", Eor, Imm, 2), i("LSR", Lsr, Imp, 2), i("???", Xxx, Imp, 2), i("JMP", Jmp, Abs, 3), i("EOR", Eor, Abs, 4), i("LSR", Lsr, Abs, 6), i("???", Xxx, Imp, 6),
    i("BVC", Bvc, Rel, 2), i("EOR", Eor, Izy, 5), i("???", Xxx, Imp, 2), i("???", Xxx, Imp, 8), i("???", Nop, Imp, 4), i("EOR", Eor, Zpx, 4), i("LSR", Lsr, Zpx, 6), i("???", Xxx, Imp, 6), i("CLI", Cli, Imp, 2), i("EOR", Eor, Aby, 4), i("???", Nop, Imp, 2), i("???", Xxx, Imp, 7), i("???", Nop, Imp, 4), i("EOR", Eor, Abx, 4), i("LSR", Lsr, Abx, 7), i("???", Xxx, Imp, 7),
    i("RTS", Rts, Imp, 6), i("ADC", Adc, Izx, 6), i("???", Xxx, Imp, 2), i("???", Xxx, Imp, 8), i("???", Nop, Imp, 3), i("ADC", Adc, Zp0, 3), i("ROR", Ror, Zp0, 5), i("???", Xxx, Imp, 5), i("PLA", Pla, Imp, 4), i("ADC", Adc, Imm, 2), i("ROR", Ror, Imp, 2), i("???", Xxx, Imp, 2), i("JMP", Jmp, Ind, 5), i("ADC", Adc, Abs, 4), i("ROR", Ror, Abs, 6), i("???", Xxx, Imp, 6),
    i("BVS", Bvs, Rel, 2), i("ADC", Adc, Izy, 5), i("???", Xxx, Imp, 2), i("???", Xxx, Imp, 8), i("???", Nop, Imp, 4), i("ADC", Adc, Zpx, 4), i("ROR", Ror, Zpx, 6), i("???", Xxx, Imp, 6), i("SEI", Sei, Imp, 2), i("ADC", Adc, Aby, 4), i("???", Nop, Imp, 2), i("???", Xxx, Imp, 7), i("???", Nop, Imp, 4), i("ADC", Adc, Abx, 4), i("ROR", Ror, Abx, 7), i("???", Xxx, Imp, 7),
    i("???", Nop, Imp, 2), i("STA", Sta, Izx, 6), i("???", Nop, Imp, 2), i("???", Xxx, Imp, 6), i("STY", Sty, Zp0, 3), i("STA", Sta, Zp0, 3), i("STX", Stx, Zp0, 3), i("???", Xxx, Imp, 3), i("DEY", Dey, Imp, 2), i("???", Nop, Imp, 2), i("TXA", Txa, Imp, 2), i("???", Xxx, Imp, 2), i("STY", Sty, Abs, 4), i("STA", Sta, Abs, 4), i("STX", Stx, Abs, 4), i("???", Xxx, Imp, 4),
    i("BCC", Bcc, Rel, 2), i("STA", Sta, Izy, 6), i("???", Xxx, Imp, 2), i("???", Xxx, Imp, 6), i("STY", Sty, Zpx, 4), i("STA", Sta, Zpx, 4), i("STX", Stx, Zpy, 4), i("???", Xxx, Imp, 4), i("TYA", Tya, Imp, 2), i("STA", Sta, Aby, 5), i("TXS", Txs, Imp, 2), i("???", Xxx, Imp, 5), i("???", Nop, Imp, 5), i("STA", Sta, Abx, 5), i("???", Xxx, Imp, 5), i("???", Xxx, Imp, 5),
    i("LDY", Ldy, Imm, 2), i("LDA", Lda, Izx, 6), i("LDX", Ldx, Imm, 2), i("???", Xxx, Imp, 6), i("LDY", Ldy, Zp0, 3), i("LDA", Lda, Zp0, 3), i("LDX", Ldx, Zp0, 3), i("???", Xxx, Imp, 3), i("TAY", Tay, Imp, 2), i("LDA", Lda, Imm, 2), i("TAX", Tax, Imp, 2), i("???", Xxx, Imp, 2), i("LDY", Ldy, Abs, 4), i("LDA", Lda, Abs, 4), i("LDX", Ldx, Abs, 4), i("???", Xxx, Imp, 4),
    i("BCS", Bcs, Rel, 2), i("LDA", Lda, Izy, 5), i("???", Xxx, Imp, 2), i("???", Xxx, Imp, 5), i("LDY", Ldy, Zpx, 4), i("LDA", Lda, Zpx, 4), i("LDX", Ldx, Zpy, 4), i("???", Xxx, Imp, 4), i("CLV", Clv, Imp, 2), i("LDA", Lda, Aby, 4), i("TSX", Tsx, Imp, 2), i("???", Xxx, Imp, 4), i("LDY", Ldy, Abx, 4), i("LDA", Lda, Abx, 4), i("LDX", Ldx, Aby, 4), i("???", Xxx, Imp, 4),
    i("CPY", Cpy, Imm, 2), i("CMP", Cmp, Izx, 6), i("???", Nop, Imp, 2), i("???", Xxx, Imp, 8), i("CPY", Cpy, Zp0, 3), i("CMP", Cmp, Zp0, 3), i("DEC", Dec, Zp0, 5), i("???", Xxx, Imp, 5), i("INY", Iny, Imp, 2), i("CMP", Cmp, Imm, 2), i("DEX", Dex, Imp, 2), i("???", Xxx, Imp, 2), i("CPY", Cpy, Abs, 4), i("CMP", Cmp, Abs, 4), i("DEC", Dec, Abs, 6), i("???", Xxx, Imp, 6),
    i("BNE", Bne, Rel, 2), i("CMP", Cmp, Izy, 5), i("???", Xxx, Imp, 2), i("???", Xxx, Imp, 8), i("???", Nop, Imp, 4), i("CMP", Cmp, Zpx, 4), i("DEC", Dec, Zpx, 6), i("???", Xxx, Imp, 6), i("CLD", Cld, Imp, 2), i("CMP", Cmp, Aby, 4), i("NOP", Nop, Imp, 2), i("???", Xxx, Imp, 7), i("???", Nop, Imp, 4), i("CMP", Cmp, Abx, 4), i("DEC", Dec, Abx, 7), i("???", Xxx, Imp, 7),
    i("CPX", Cpx, Imm, 2), i("SBC", Sbc, Izx, 6), i("???", Nop, Imp, 2), i("???", Xxx, Imp, 8), i("CPX", Cpx, Zp0, 3), i("SBC", Sbc, Zp0, 3), i("INC", Inc, Zp0, 5), i("???", Xxx, Imp, 5), i("INX", Inx, Imp, 2), i("SBC", Sbc, Imm, 2), i("NOP", Nop, Imp, 2), i("???", Sbc, Imp, 2), i("CPX", Cpx, Abs, 4), i("SBC", Sbc, Abs, 4), i("INC", Inc, Abs, 6), i("???", Xxx, Imp, 6),
    i("BEQ", Beq, Rel, 2), i("SBC", Sbc, Izy, 5), i("???", Xxx, Imp, 2), i("???", Xxx, Imp, 8), i("???", Nop, Imp, 4), i("SBC", Sbc, Zpx, 4), i("INC", Inc, Zpx, 6), i("???", Xxx, Imp, 6), i("SED", Sed, Imp, 2), i("SBC", Sbc, Aby, 4), i("NOP", Nop, Imp, 2), i("???", Xxx, Imp, 7), i("???", Nop, Imp, 4), i("SBC", Sbc, Abx, 4), i("INC", Inc, Abx, 7), i("???", Xxx, Imp, 7),
];

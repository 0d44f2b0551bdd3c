//! Static decode table: one descriptor per opcode byte.
//!
//! Cycle counts are the documented base costs; `page_penalty` marks the read instructions that
//! take one more cycle when indexing crosses a page. Branch costs are added at execution time.

/// How an instruction locates its operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressingMode {
    Implied,
    Accumulator,
    Immediate,
    ZeroPage,
    ZeroPageX,
    ZeroPageY,
    Absolute,
    AbsoluteX,
    AbsoluteY,
    /// JMP only; reproduces the page-wrap bug when the pointer ends in $FF.
    Indirect,
    /// (zp,X)
    IndirectX,
    /// (zp),Y
    IndirectY,
    Relative,
}

impl AddressingMode {
    /// Operand bytes following the opcode.
    pub fn operand_len(self) -> u16 {
        match self {
            Self::Implied | Self::Accumulator => 0,
            Self::Absolute | Self::AbsoluteX | Self::AbsoluteY | Self::Indirect => 2,
            _ => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Adc,
    And,
    Asl,
    Bcc,
    Bcs,
    Beq,
    Bit,
    Bmi,
    Bne,
    Bpl,
    Brk,
    Bvc,
    Bvs,
    Clc,
    Cld,
    Cli,
    Clv,
    Cmp,
    Cpx,
    Cpy,
    Dec,
    Dex,
    Dey,
    Eor,
    Inc,
    Inx,
    Iny,
    Jmp,
    Jsr,
    Lda,
    Ldx,
    Ldy,
    Lsr,
    Nop,
    Ora,
    Pha,
    Php,
    Pla,
    Plp,
    Rol,
    Ror,
    Rti,
    Rts,
    Sbc,
    Sec,
    Sed,
    Sei,
    Sta,
    Stx,
    Sty,
    Tax,
    Tay,
    Tsx,
    Txa,
    Txs,
    Tya,
    // Stable undocumented
    Lax,
    Sax,
    Dcp,
    Isc,
    Slo,
    Rla,
    Sre,
    Rra,
    /// KIL: locks the bus until reset.
    Jam,
    /// Undocumented opcode whose result depends on analog effects; trapped.
    Unstable,
}

#[derive(Debug, Clone, Copy)]
pub struct Instruction {
    pub mnemonic: &'static str,
    pub operation: Operation,
    pub mode: AddressingMode,
    pub cycles: u8,
    pub page_penalty: bool,
}

macro_rules! op {
    ($name:literal, $op:ident, $mode:ident, $cycles:literal) => {
        Instruction {
            mnemonic: $name,
            operation: Operation::$op,
            mode: AddressingMode::$mode,
            cycles: $cycles,
            page_penalty: false,
        }
    };
    ($name:literal, $op:ident, $mode:ident, $cycles:literal, +) => {
        Instruction {
            mnemonic: $name,
            operation: Operation::$op,
            mode: AddressingMode::$mode,
            cycles: $cycles,
            page_penalty: true,
        }
    };
}

const JAM: Instruction = op!("JAM", Jam, Implied, 2);

#[rustfmt::skip]
pub static OPCODES: [Instruction; 256] = [
    // 0x00
    op!("BRK", Brk, Implied, 7),      op!("ORA", Ora, IndirectX, 6),    JAM,                                op!("SLO", Slo, IndirectX, 8),
    op!("NOP", Nop, ZeroPage, 3),     op!("ORA", Ora, ZeroPage, 3),     op!("ASL", Asl, ZeroPage, 5),       op!("SLO", Slo, ZeroPage, 5),
    op!("PHP", Php, Implied, 3),      op!("ORA", Ora, Immediate, 2),    op!("ASL", Asl, Accumulator, 2),    op!("ANC", Unstable, Immediate, 2),
    op!("NOP", Nop, Absolute, 4),     op!("ORA", Ora, Absolute, 4),     op!("ASL", Asl, Absolute, 6),       op!("SLO", Slo, Absolute, 6),
    // 0x10
    op!("BPL", Bpl, Relative, 2),     op!("ORA", Ora, IndirectY, 5, +), JAM,                                op!("SLO", Slo, IndirectY, 8),
    op!("NOP", Nop, ZeroPageX, 4),    op!("ORA", Ora, ZeroPageX, 4),    op!("ASL", Asl, ZeroPageX, 6),      op!("SLO", Slo, ZeroPageX, 6),
    op!("CLC", Clc, Implied, 2),      op!("ORA", Ora, AbsoluteY, 4, +), op!("NOP", Nop, Implied, 2),        op!("SLO", Slo, AbsoluteY, 7),
    op!("NOP", Nop, AbsoluteX, 4, +), op!("ORA", Ora, AbsoluteX, 4, +), op!("ASL", Asl, AbsoluteX, 7),      op!("SLO", Slo, AbsoluteX, 7),
    // 0x20
    op!("JSR", Jsr, Absolute, 6),     op!("AND", And, IndirectX, 6),    JAM,                                op!("RLA", Rla, IndirectX, 8),
    op!("BIT", Bit, ZeroPage, 3),     op!("AND", And, ZeroPage, 3),     op!("ROL", Rol, ZeroPage, 5),       op!("RLA", Rla, ZeroPage, 5),
    op!("PLP", Plp, Implied, 4),      op!("AND", And, Immediate, 2),    op!("ROL", Rol, Accumulator, 2),    op!("ANC", Unstable, Immediate, 2),
    op!("BIT", Bit, Absolute, 4),     op!("AND", And, Absolute, 4),     op!("ROL", Rol, Absolute, 6),       op!("RLA", Rla, Absolute, 6),
    // 0x30
    op!("BMI", Bmi, Relative, 2),     op!("AND", And, IndirectY, 5, +), JAM,                                op!("RLA", Rla, IndirectY, 8),
    op!("NOP", Nop, ZeroPageX, 4),    op!("AND", And, ZeroPageX, 4),    op!("ROL", Rol, ZeroPageX, 6),      op!("RLA", Rla, ZeroPageX, 6),
    op!("SEC", Sec, Implied, 2),      op!("AND", And, AbsoluteY, 4, +), op!("NOP", Nop, Implied, 2),        op!("RLA", Rla, AbsoluteY, 7),
    op!("NOP", Nop, AbsoluteX, 4, +), op!("AND", And, AbsoluteX, 4, +), op!("ROL", Rol, AbsoluteX, 7),      op!("RLA", Rla, AbsoluteX, 7),
    // 0x40
    op!("RTI", Rti, Implied, 6),      op!("EOR", Eor, IndirectX, 6),    JAM,                                op!("SRE", Sre, IndirectX, 8),
    op!("NOP", Nop, ZeroPage, 3),     op!("EOR", Eor, ZeroPage, 3),     op!("LSR", Lsr, ZeroPage, 5),       op!("SRE", Sre, ZeroPage, 5),
    op!("PHA", Pha, Implied, 3),      op!("EOR", Eor, Immediate, 2),    op!("LSR", Lsr, Accumulator, 2),    op!("ALR", Unstable, Immediate, 2),
    op!("JMP", Jmp, Absolute, 3),     op!("EOR", Eor, Absolute, 4),     op!("LSR", Lsr, Absolute, 6),       op!("SRE", Sre, Absolute, 6),
    // 0x50
    op!("BVC", Bvc, Relative, 2),     op!("EOR", Eor, IndirectY, 5, +), JAM,                                op!("SRE", Sre, IndirectY, 8),
    op!("NOP", Nop, ZeroPageX, 4),    op!("EOR", Eor, ZeroPageX, 4),    op!("LSR", Lsr, ZeroPageX, 6),      op!("SRE", Sre, ZeroPageX, 6),
    op!("CLI", Cli, Implied, 2),      op!("EOR", Eor, AbsoluteY, 4, +), op!("NOP", Nop, Implied, 2),        op!("SRE", Sre, AbsoluteY, 7),
    op!("NOP", Nop, AbsoluteX, 4, +), op!("EOR", Eor, AbsoluteX, 4, +), op!("LSR", Lsr, AbsoluteX, 7),      op!("SRE", Sre, AbsoluteX, 7),
    // 0x60
    op!("RTS", Rts, Implied, 6),      op!("ADC", Adc, IndirectX, 6),    JAM,                                op!("RRA", Rra, IndirectX, 8),
    op!("NOP", Nop, ZeroPage, 3),     op!("ADC", Adc, ZeroPage, 3),     op!("ROR", Ror, ZeroPage, 5),       op!("RRA", Rra, ZeroPage, 5),
    op!("PLA", Pla, Implied, 4),      op!("ADC", Adc, Immediate, 2),    op!("ROR", Ror, Accumulator, 2),    op!("ARR", Unstable, Immediate, 2),
    op!("JMP", Jmp, Indirect, 5),     op!("ADC", Adc, Absolute, 4),     op!("ROR", Ror, Absolute, 6),       op!("RRA", Rra, Absolute, 6),
    // 0x70
    op!("BVS", Bvs, Relative, 2),     op!("ADC", Adc, IndirectY, 5, +), JAM,                                op!("RRA", Rra, IndirectY, 8),
    op!("NOP", Nop, ZeroPageX, 4),    op!("ADC", Adc, ZeroPageX, 4),    op!("ROR", Ror, ZeroPageX, 6),      op!("RRA", Rra, ZeroPageX, 6),
    op!("SEI", Sei, Implied, 2),      op!("ADC", Adc, AbsoluteY, 4, +), op!("NOP", Nop, Implied, 2),        op!("RRA", Rra, AbsoluteY, 7),
    op!("NOP", Nop, AbsoluteX, 4, +), op!("ADC", Adc, AbsoluteX, 4, +), op!("ROR", Ror, AbsoluteX, 7),      op!("RRA", Rra, AbsoluteX, 7),
    // 0x80
    op!("NOP", Nop, Immediate, 2),    op!("STA", Sta, IndirectX, 6),    op!("NOP", Nop, Immediate, 2),      op!("SAX", Sax, IndirectX, 6),
    op!("STY", Sty, ZeroPage, 3),     op!("STA", Sta, ZeroPage, 3),     op!("STX", Stx, ZeroPage, 3),       op!("SAX", Sax, ZeroPage, 3),
    op!("DEY", Dey, Implied, 2),      op!("NOP", Nop, Immediate, 2),    op!("TXA", Txa, Implied, 2),        op!("XAA", Unstable, Immediate, 2),
    op!("STY", Sty, Absolute, 4),     op!("STA", Sta, Absolute, 4),     op!("STX", Stx, Absolute, 4),       op!("SAX", Sax, Absolute, 4),
    // 0x90
    op!("BCC", Bcc, Relative, 2),     op!("STA", Sta, IndirectY, 6),    JAM,                                op!("AHX", Unstable, IndirectY, 6),
    op!("STY", Sty, ZeroPageX, 4),    op!("STA", Sta, ZeroPageX, 4),    op!("STX", Stx, ZeroPageY, 4),      op!("SAX", Sax, ZeroPageY, 4),
    op!("TYA", Tya, Implied, 2),      op!("STA", Sta, AbsoluteY, 5),    op!("TXS", Txs, Implied, 2),        op!("TAS", Unstable, AbsoluteY, 5),
    op!("SHY", Unstable, AbsoluteX, 5), op!("STA", Sta, AbsoluteX, 5),  op!("SHX", Unstable, AbsoluteY, 5), op!("AHX", Unstable, AbsoluteY, 5),
    // 0xA0
    op!("LDY", Ldy, Immediate, 2),    op!("LDA", Lda, IndirectX, 6),    op!("LDX", Ldx, Immediate, 2),      op!("LAX", Lax, IndirectX, 6),
    op!("LDY", Ldy, ZeroPage, 3),     op!("LDA", Lda, ZeroPage, 3),     op!("LDX", Ldx, ZeroPage, 3),       op!("LAX", Lax, ZeroPage, 3),
    op!("TAY", Tay, Implied, 2),      op!("LDA", Lda, Immediate, 2),    op!("TAX", Tax, Implied, 2),        op!("LXA", Unstable, Immediate, 2),
    op!("LDY", Ldy, Absolute, 4),     op!("LDA", Lda, Absolute, 4),     op!("LDX", Ldx, Absolute, 4),       op!("LAX", Lax, Absolute, 4),
    // 0xB0
    op!("BCS", Bcs, Relative, 2),     op!("LDA", Lda, IndirectY, 5, +), JAM,                                op!("LAX", Lax, IndirectY, 5, +),
    op!("LDY", Ldy, ZeroPageX, 4),    op!("LDA", Lda, ZeroPageX, 4),    op!("LDX", Ldx, ZeroPageY, 4),      op!("LAX", Lax, ZeroPageY, 4),
    op!("CLV", Clv, Implied, 2),      op!("LDA", Lda, AbsoluteY, 4, +), op!("TSX", Tsx, Implied, 2),        op!("LAS", Unstable, AbsoluteY, 4, +),
    op!("LDY", Ldy, AbsoluteX, 4, +), op!("LDA", Lda, AbsoluteX, 4, +), op!("LDX", Ldx, AbsoluteY, 4, +),   op!("LAX", Lax, AbsoluteY, 4, +),
    // 0xC0
    op!("CPY", Cpy, Immediate, 2),    op!("CMP", Cmp, IndirectX, 6),    op!("NOP", Nop, Immediate, 2),      op!("DCP", Dcp, IndirectX, 8),
    op!("CPY", Cpy, ZeroPage, 3),     op!("CMP", Cmp, ZeroPage, 3),     op!("DEC", Dec, ZeroPage, 5),       op!("DCP", Dcp, ZeroPage, 5),
    op!("INY", Iny, Implied, 2),      op!("CMP", Cmp, Immediate, 2),    op!("DEX", Dex, Implied, 2),        op!("AXS", Unstable, Immediate, 2),
    op!("CPY", Cpy, Absolute, 4),     op!("CMP", Cmp, Absolute, 4),     op!("DEC", Dec, Absolute, 6),       op!("DCP", Dcp, Absolute, 6),
    // 0xD0
    op!("BNE", Bne, Relative, 2),     op!("CMP", Cmp, IndirectY, 5, +), JAM,                                op!("DCP", Dcp, IndirectY, 8),
    op!("NOP", Nop, ZeroPageX, 4),    op!("CMP", Cmp, ZeroPageX, 4),    op!("DEC", Dec, ZeroPageX, 6),      op!("DCP", Dcp, ZeroPageX, 6),
    op!("CLD", Cld, Implied, 2),      op!("CMP", Cmp, AbsoluteY, 4, +), op!("NOP", Nop, Implied, 2),        op!("DCP", Dcp, AbsoluteY, 7),
    op!("NOP", Nop, AbsoluteX, 4, +), op!("CMP", Cmp, AbsoluteX, 4, +), op!("DEC", Dec, AbsoluteX, 7),      op!("DCP", Dcp, AbsoluteX, 7),
    // 0xE0
    op!("CPX", Cpx, Immediate, 2),    op!("SBC", Sbc, IndirectX, 6),    op!("NOP", Nop, Immediate, 2),      op!("ISC", Isc, IndirectX, 8),
    op!("CPX", Cpx, ZeroPage, 3),     op!("SBC", Sbc, ZeroPage, 3),     op!("INC", Inc, ZeroPage, 5),       op!("ISC", Isc, ZeroPage, 5),
    op!("INX", Inx, Implied, 2),      op!("SBC", Sbc, Immediate, 2),    op!("NOP", Nop, Implied, 2),        op!("SBC", Sbc, Immediate, 2),
    op!("CPX", Cpx, Absolute, 4),     op!("SBC", Sbc, Absolute, 4),     op!("INC", Inc, Absolute, 6),       op!("ISC", Isc, Absolute, 6),
    // 0xF0
    op!("BEQ", Beq, Relative, 2),     op!("SBC", Sbc, IndirectY, 5, +), JAM,                                op!("ISC", Isc, IndirectY, 8),
    op!("NOP", Nop, ZeroPageX, 4),    op!("SBC", Sbc, ZeroPageX, 4),    op!("INC", Inc, ZeroPageX, 6),      op!("ISC", Isc, ZeroPageX, 6),
    op!("SED", Sed, Implied, 2),      op!("SBC", Sbc, AbsoluteY, 4, +), op!("NOP", Nop, Implied, 2),        op!("ISC", Isc, AbsoluteY, 7),
    op!("NOP", Nop, AbsoluteX, 4, +), op!("SBC", Sbc, AbsoluteX, 4, +), op!("INC", Inc, AbsoluteX, 7),      op!("ISC", Isc, AbsoluteX, 7),
];

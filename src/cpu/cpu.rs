use log::{Level, log_enabled, trace};
use thiserror::Error;

use crate::{
    bus::Bus,
    cpu::{
        flags::{
            FLAG_BREAK, FLAG_CARRY, FLAG_DECIMAL, FLAG_INTERRUPT_DISABLE, FLAG_NEGATIVE,
            FLAG_OVERFLOW, FLAG_UNUSED, FLAG_ZERO,
        },
        opcodes::{AddressingMode, Instruction, OPCODES, Operation},
    },
};

pub const NMI_VECTOR: u16 = 0xFFFA;
pub const RESET_VECTOR: u16 = 0xFFFC;
pub const IRQ_VECTOR: u16 = 0xFFFE;

const STACK_BASE: u16 = 0x0100;
const INTERRUPT_CYCLES: u32 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CpuError {
    #[error("CPU jammed by opcode ${opcode:02X} at ${pc:04X}")]
    Jammed { opcode: u8, pc: u16 },
    #[error("unstable undocumented opcode ${opcode:02X} ({mnemonic}) at ${pc:04X}")]
    UnstableOpcode {
        opcode: u8,
        mnemonic: &'static str,
        pc: u16,
    },
}

pub struct CPU<B: Bus> {
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub sp: u8,
    pub pc: u16,
    pub status: u8,
    pub bus: B,
    cycles: u64,
    nmi_pending: bool,
    /// Idle cycles owed to OAM DMA, charged on the next step.
    stall: u32,
    /// Set once a trapped opcode halts the CPU; cleared by reset.
    halted: Option<CpuError>,
}

impl<B: Bus> CPU<B> {
    pub fn new(bus: B) -> Self {
        Self {
            a: 0,
            x: 0,
            y: 0,
            sp: 0xFD,
            pc: 0,
            status: FLAG_INTERRUPT_DISABLE | FLAG_UNUSED,
            bus,
            cycles: 0,
            nmi_pending: false,
            stall: 0,
            halted: None,
        }
    }

    pub fn reset(&mut self) {
        self.pc = self.read_word(RESET_VECTOR);

        self.sp = 0xFD; // three phantom pushes during the reset sequence
        self.status = FLAG_INTERRUPT_DISABLE | FLAG_UNUSED;

        self.a = 0;
        self.x = 0;
        self.y = 0;
        self.nmi_pending = false;
        self.stall = 0;
        self.halted = None;

        self.cycles = 7;
    }

    /// Running cycle total since reset.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Mark an NMI pending; serviced at the start of the next step.
    pub fn trigger_nmi(&mut self) {
        self.nmi_pending = true;
    }

    /// Charge `cycles` idle cycles to the next step.
    pub fn stall_for_dma(&mut self, cycles: u32) {
        self.stall += cycles;
    }

    /// Run one instruction, or service a pending NMI, and return the cycles consumed.
    pub fn step(&mut self) -> Result<u32, CpuError> {
        if let Some(err) = self.halted {
            return Err(err);
        }

        let stall = std::mem::take(&mut self.stall);
        let cost = if std::mem::take(&mut self.nmi_pending) {
            self.interrupt(NMI_VECTOR);
            INTERRUPT_CYCLES
        } else {
            match self.execute() {
                Ok(cost) => cost,
                Err(err) => {
                    self.halted = Some(err);
                    return Err(err);
                }
            }
        };

        let total = cost + stall;
        self.cycles += total as u64;
        Ok(total)
    }

    fn execute(&mut self) -> Result<u32, CpuError> {
        let pc = self.pc;
        let opcode = self.fetch_byte();
        let instr = OPCODES[opcode as usize];

        if log_enabled!(Level::Trace) {
            self.trace(pc, opcode, &instr);
        }

        let (addr, crossed) = self.fetch_operand_addr(instr.mode);
        let mut cycles = instr.cycles as u32;
        if crossed && instr.page_penalty {
            cycles += 1;
        }

        let mode = instr.mode;
        match instr.operation {
            Operation::Adc => {
                let value = self.bus.read(addr);
                self.add_with_carry(value);
            }
            Operation::Sbc => {
                let value = self.bus.read(addr);
                self.add_with_carry(!value);
            }
            Operation::And => {
                self.a &= self.bus.read(addr);
                self.set_zn(self.a);
            }
            Operation::Ora => {
                self.a |= self.bus.read(addr);
                self.set_zn(self.a);
            }
            Operation::Eor => {
                self.a ^= self.bus.read(addr);
                self.set_zn(self.a);
            }
            Operation::Asl => {
                self.read_modify_write(mode, addr, Self::asl);
            }
            Operation::Lsr => {
                self.read_modify_write(mode, addr, Self::lsr);
            }
            Operation::Rol => {
                self.read_modify_write(mode, addr, Self::rol);
            }
            Operation::Ror => {
                self.read_modify_write(mode, addr, Self::ror);
            }
            Operation::Bit => {
                let value = self.bus.read(addr);
                self.set_flag(FLAG_ZERO, self.a & value == 0);
                self.set_flag(FLAG_NEGATIVE, value & 0x80 != 0);
                self.set_flag(FLAG_OVERFLOW, value & 0x40 != 0);
            }
            Operation::Bcc => cycles += self.branch(self.status & FLAG_CARRY == 0, addr, crossed),
            Operation::Bcs => cycles += self.branch(self.status & FLAG_CARRY != 0, addr, crossed),
            Operation::Bne => cycles += self.branch(self.status & FLAG_ZERO == 0, addr, crossed),
            Operation::Beq => cycles += self.branch(self.status & FLAG_ZERO != 0, addr, crossed),
            Operation::Bpl => {
                cycles += self.branch(self.status & FLAG_NEGATIVE == 0, addr, crossed)
            }
            Operation::Bmi => {
                cycles += self.branch(self.status & FLAG_NEGATIVE != 0, addr, crossed)
            }
            Operation::Bvc => {
                cycles += self.branch(self.status & FLAG_OVERFLOW == 0, addr, crossed)
            }
            Operation::Bvs => {
                cycles += self.branch(self.status & FLAG_OVERFLOW != 0, addr, crossed)
            }
            Operation::Brk => {
                // Skip the padding byte after BRK
                self.pc = self.pc.wrapping_add(1);
                self.interrupt(IRQ_VECTOR);
            }
            Operation::Clc => self.set_flag(FLAG_CARRY, false),
            Operation::Cld => self.set_flag(FLAG_DECIMAL, false),
            Operation::Cli => self.set_flag(FLAG_INTERRUPT_DISABLE, false),
            Operation::Clv => self.set_flag(FLAG_OVERFLOW, false),
            Operation::Sec => self.set_flag(FLAG_CARRY, true),
            Operation::Sed => self.set_flag(FLAG_DECIMAL, true),
            Operation::Sei => self.set_flag(FLAG_INTERRUPT_DISABLE, true),
            Operation::Cmp => {
                let value = self.bus.read(addr);
                self.compare(self.a, value);
            }
            Operation::Cpx => {
                let value = self.bus.read(addr);
                self.compare(self.x, value);
            }
            Operation::Cpy => {
                let value = self.bus.read(addr);
                self.compare(self.y, value);
            }
            Operation::Dec => {
                self.read_modify_write(mode, addr, |cpu, v| {
                    let r = v.wrapping_sub(1);
                    cpu.set_zn(r);
                    r
                });
            }
            Operation::Inc => {
                self.read_modify_write(mode, addr, |cpu, v| {
                    let r = v.wrapping_add(1);
                    cpu.set_zn(r);
                    r
                });
            }
            Operation::Dex => {
                self.x = self.x.wrapping_sub(1);
                self.set_zn(self.x);
            }
            Operation::Dey => {
                self.y = self.y.wrapping_sub(1);
                self.set_zn(self.y);
            }
            Operation::Inx => {
                self.x = self.x.wrapping_add(1);
                self.set_zn(self.x);
            }
            Operation::Iny => {
                self.y = self.y.wrapping_add(1);
                self.set_zn(self.y);
            }
            Operation::Jmp => self.pc = addr,
            Operation::Jsr => {
                self.push_word(self.pc.wrapping_sub(1));
                self.pc = addr;
            }
            Operation::Rts => self.pc = self.pop_word().wrapping_add(1),
            Operation::Rti => {
                self.pull_status();
                self.pc = self.pop_word();
            }
            Operation::Lda => {
                self.a = self.bus.read(addr);
                self.set_zn(self.a);
            }
            Operation::Ldx => {
                self.x = self.bus.read(addr);
                self.set_zn(self.x);
            }
            Operation::Ldy => {
                self.y = self.bus.read(addr);
                self.set_zn(self.y);
            }
            Operation::Sta => self.bus.write(addr, self.a),
            Operation::Stx => self.bus.write(addr, self.x),
            Operation::Sty => self.bus.write(addr, self.y),
            Operation::Nop => {
                // Multi-byte NOPs still perform their read
                if mode != AddressingMode::Implied {
                    self.bus.read(addr);
                }
            }
            Operation::Pha => self.push(self.a),
            Operation::Php => self.push(self.status | FLAG_BREAK | FLAG_UNUSED),
            Operation::Pla => {
                self.a = self.pop();
                self.set_zn(self.a);
            }
            Operation::Plp => self.pull_status(),
            Operation::Tax => {
                self.x = self.a;
                self.set_zn(self.x);
            }
            Operation::Tay => {
                self.y = self.a;
                self.set_zn(self.y);
            }
            Operation::Tsx => {
                self.x = self.sp;
                self.set_zn(self.x);
            }
            Operation::Txa => {
                self.a = self.x;
                self.set_zn(self.a);
            }
            Operation::Txs => self.sp = self.x,
            Operation::Tya => {
                self.a = self.y;
                self.set_zn(self.a);
            }
            Operation::Lax => {
                self.a = self.bus.read(addr);
                self.x = self.a;
                self.set_zn(self.a);
            }
            Operation::Sax => self.bus.write(addr, self.a & self.x),
            Operation::Dcp => {
                let value = self.bus.read(addr).wrapping_sub(1);
                self.bus.write(addr, value);
                self.compare(self.a, value);
            }
            Operation::Isc => {
                let value = self.bus.read(addr).wrapping_add(1);
                self.bus.write(addr, value);
                self.add_with_carry(!value);
            }
            Operation::Slo => {
                let value = self.read_modify_write(mode, addr, Self::asl);
                self.a |= value;
                self.set_zn(self.a);
            }
            Operation::Rla => {
                let value = self.read_modify_write(mode, addr, Self::rol);
                self.a &= value;
                self.set_zn(self.a);
            }
            Operation::Sre => {
                let value = self.read_modify_write(mode, addr, Self::lsr);
                self.a ^= value;
                self.set_zn(self.a);
            }
            Operation::Rra => {
                let value = self.read_modify_write(mode, addr, Self::ror);
                self.add_with_carry(value);
            }
            Operation::Jam => {
                self.pc = pc;
                return Err(CpuError::Jammed { opcode, pc });
            }
            Operation::Unstable => {
                self.pc = pc;
                return Err(CpuError::UnstableOpcode {
                    opcode,
                    mnemonic: instr.mnemonic,
                    pc,
                });
            }
        }

        Ok(cycles)
    }

    fn trace(&mut self, pc: u16, opcode: u8, instr: &Instruction) {
        let operands: Vec<String> = (0..instr.mode.operand_len())
            .map(|i| format!("{:02X}", self.bus.read(pc.wrapping_add(1 + i))))
            .collect();
        trace!(
            "{:04X}  {:02X} {:<6} {:<4}A:{:02X} X:{:02X} Y:{:02X} P:{:02X} SP:{:02X} CYC:{}",
            pc,
            opcode,
            operands.join(" "),
            instr.mnemonic,
            self.a,
            self.x,
            self.y,
            self.status,
            self.sp,
            self.cycles
        );
    }

    fn fetch_byte(&mut self) -> u8 {
        let byte = self.bus.read(self.pc);
        self.pc = self.pc.wrapping_add(1);
        byte
    }

    fn fetch_word(&mut self) -> u16 {
        let lo = self.fetch_byte() as u16;
        let hi = self.fetch_byte() as u16;
        (hi << 8) | lo
    }

    fn read_word(&mut self, addr: u16) -> u16 {
        let lo = self.bus.read(addr) as u16;
        let hi = self.bus.read(addr.wrapping_add(1)) as u16;
        (hi << 8) | lo
    }

    /// Read a pointer from zero page; the high byte wraps within page 0.
    fn read_zero_page_word(&mut self, ptr: u8) -> u16 {
        let lo = self.bus.read(ptr as u16) as u16;
        let hi = self.bus.read(ptr.wrapping_add(1) as u16) as u16;
        (hi << 8) | lo
    }

    /// Resolve the operand address for `mode`, consuming operand bytes. The flag reports an
    /// indexed page crossing, or for branches, a target outside the next instruction's page.
    fn fetch_operand_addr(&mut self, mode: AddressingMode) -> (u16, bool) {
        match mode {
            AddressingMode::Implied | AddressingMode::Accumulator => (0, false),
            AddressingMode::Immediate => {
                let addr = self.pc;
                self.pc = self.pc.wrapping_add(1);
                (addr, false)
            }
            AddressingMode::ZeroPage => (self.fetch_byte() as u16, false),
            AddressingMode::ZeroPageX => (self.fetch_byte().wrapping_add(self.x) as u16, false),
            AddressingMode::ZeroPageY => (self.fetch_byte().wrapping_add(self.y) as u16, false),
            AddressingMode::Absolute => (self.fetch_word(), false),
            AddressingMode::AbsoluteX => {
                let base = self.fetch_word();
                Self::indexed(base, self.x)
            }
            AddressingMode::AbsoluteY => {
                let base = self.fetch_word();
                Self::indexed(base, self.y)
            }
            AddressingMode::Indirect => {
                let ptr = self.fetch_word();
                let lo = self.bus.read(ptr) as u16;
                // High byte comes from the same page when the pointer ends in $FF
                let hi = self.bus.read((ptr & 0xFF00) | (ptr as u8).wrapping_add(1) as u16) as u16;
                ((hi << 8) | lo, false)
            }
            AddressingMode::IndirectX => {
                let ptr = self.fetch_byte().wrapping_add(self.x);
                (self.read_zero_page_word(ptr), false)
            }
            AddressingMode::IndirectY => {
                let ptr = self.fetch_byte();
                let base = self.read_zero_page_word(ptr);
                Self::indexed(base, self.y)
            }
            AddressingMode::Relative => {
                let offset = self.fetch_byte() as i8;
                let target = self.pc.wrapping_add(offset as i16 as u16);
                (target, target & 0xFF00 != self.pc & 0xFF00)
            }
        }
    }

    fn indexed(base: u16, index: u8) -> (u16, bool) {
        let addr = base.wrapping_add(index as u16);
        (addr, addr & 0xFF00 != base & 0xFF00)
    }

    /// Take the branch when `taken`: +1 cycle, +1 more when the target is on another page.
    fn branch(&mut self, taken: bool, target: u16, crossed: bool) -> u32 {
        if !taken {
            return 0;
        }
        self.pc = target;
        1 + crossed as u32
    }

    /// Push PC and P, set I, and jump through `vector`. B is set in the pushed copy of P
    /// for BRK and NMI alike.
    fn interrupt(&mut self, vector: u16) {
        self.push_word(self.pc);
        self.push(self.status | FLAG_BREAK | FLAG_UNUSED);
        self.set_flag(FLAG_INTERRUPT_DISABLE, true);
        self.pc = self.read_word(vector);
    }

    /// Apply `f` to the accumulator or to memory at `addr`, storing and returning the result.
    fn read_modify_write(
        &mut self,
        mode: AddressingMode,
        addr: u16,
        f: impl FnOnce(&mut Self, u8) -> u8,
    ) -> u8 {
        if mode == AddressingMode::Accumulator {
            let value = self.a;
            let result = f(self, value);
            self.a = result;
            result
        } else {
            let value = self.bus.read(addr);
            let result = f(self, value);
            self.bus.write(addr, result);
            result
        }
    }

    fn asl(&mut self, value: u8) -> u8 {
        self.set_flag(FLAG_CARRY, value & 0x80 != 0);
        let result = value << 1;
        self.set_zn(result);
        result
    }

    fn lsr(&mut self, value: u8) -> u8 {
        self.set_flag(FLAG_CARRY, value & 0x01 != 0);
        let result = value >> 1;
        self.set_zn(result);
        result
    }

    fn rol(&mut self, value: u8) -> u8 {
        let carry_in = self.status & FLAG_CARRY;
        self.set_flag(FLAG_CARRY, value & 0x80 != 0);
        let result = (value << 1) | carry_in;
        self.set_zn(result);
        result
    }

    fn ror(&mut self, value: u8) -> u8 {
        let carry_in = (self.status & FLAG_CARRY) << 7;
        self.set_flag(FLAG_CARRY, value & 0x01 != 0);
        let result = (value >> 1) | carry_in;
        self.set_zn(result);
        result
    }

    /// Binary ADC; SBC passes the complemented operand. Decimal mode is ignored.
    fn add_with_carry(&mut self, value: u8) {
        let sum = self.a as u16 + value as u16 + (self.status & FLAG_CARRY) as u16;
        let result = sum as u8;
        self.set_flag(FLAG_CARRY, sum > 0xFF);
        self.set_flag(FLAG_OVERFLOW, (!(self.a ^ value) & (self.a ^ result) & 0x80) != 0);
        self.a = result;
        self.set_zn(result);
    }

    fn compare(&mut self, register: u8, value: u8) {
        self.set_flag(FLAG_CARRY, register >= value);
        self.set_zn(register.wrapping_sub(value));
    }

    /// PLP/RTI: B does not exist in P itself; bit 5 always reads 1.
    fn pull_status(&mut self) {
        self.status = (self.pop() & !FLAG_BREAK) | FLAG_UNUSED;
    }

    fn set_flag(&mut self, flag: u8, on: bool) {
        if on {
            self.status |= flag;
        } else {
            self.status &= !flag;
        }
    }

    fn set_zn(&mut self, value: u8) {
        self.set_flag(FLAG_ZERO, value == 0);
        self.set_flag(FLAG_NEGATIVE, value & 0x80 != 0);
    }

    fn push(&mut self, data: u8) {
        self.bus.write(STACK_BASE | self.sp as u16, data);
        self.sp = self.sp.wrapping_sub(1);
    }

    fn pop(&mut self) -> u8 {
        self.sp = self.sp.wrapping_add(1);
        self.bus.read(STACK_BASE | self.sp as u16)
    }

    fn push_word(&mut self, data: u16) {
        self.push((data >> 8) as u8);
        self.push(data as u8);
    }

    fn pop_word(&mut self) -> u16 {
        let lo = self.pop() as u16;
        let hi = self.pop() as u16;
        (hi << 8) | lo
    }
}

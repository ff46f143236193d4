/*!
Cycle-stepped 6502 core.

The CPU is driven one cycle at a time through `clock()`. Work is not
spread across cycles: the whole instruction executes on its first clock
and the remaining cycles just burn down, so timing is externally accurate
while the implementation stays a straightforward fetch/decode/execute.

The CPU does not hold a bus reference. Every entry point that touches
memory takes `&mut Bus`, which keeps ownership simple: the Bus owns the
CPU and temporarily takes it out of itself to tick it.
*/

mod disasm;
mod table;

use bitflags::bitflags;
use log::trace;

use crate::bus::Bus;

pub use table::{AddrMode, Instruction, Operation, LOOKUP};

bitflags! {
    /// The processor status register.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Status: u8 {
        /// Carry.
        const C = 0x01;
        /// Zero.
        const Z = 0x02;
        /// IRQ disable.
        const I = 0x04;
        /// Decimal mode (latched but has no effect on arithmetic).
        const D = 0x08;
        /// Break. Only meaningful in pushed copies of the register.
        const B = 0x10;
        /// Unused, reads as set.
        const U = 0x20;
        /// Overflow.
        const V = 0x40;
        /// Negative.
        const N = 0x80;
    }
}

const STACK_BASE: u16 = 0x0100;
const VECTOR_NMI: u16 = 0xFFFA;
const VECTOR_RESET: u16 = 0xFFFC;
const VECTOR_IRQ: u16 = 0xFFFE;

pub struct Cpu {
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub stkp: u8,
    pub pc: u16,
    pub status: Status,

    // Per-instruction working latches.
    fetched: u8,
    addr_abs: u16,
    addr_rel: u16,
    opcode: u8,
    cycles: u8,
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

impl Cpu {
    pub fn new() -> Self {
        Self {
            a: 0,
            x: 0,
            y: 0,
            stkp: 0,
            pc: 0,
            status: Status::empty(),
            fetched: 0,
            addr_abs: 0,
            addr_rel: 0,
            opcode: 0,
            cycles: 0,
        }
    }

    // -------------- External signals --------------

    /// Advance one CPU cycle. The instruction's effects all land on its
    /// first cycle; the rest only decrement the countdown.
    pub fn clock(&mut self, bus: &mut Bus) {
        if self.cycles == 0 {
            self.opcode = self.read(bus, self.pc);
            self.pc = self.pc.wrapping_add(1);

            // U is always observed set.
            self.status.insert(Status::U);

            let entry = LOOKUP[self.opcode as usize];
            self.cycles = entry.cycles;
            trace!(
                "executing {} (opcode {:#04X}) at pc {:#06X}",
                entry.name,
                self.opcode,
                self.pc.wrapping_sub(1)
            );

            let extra_mode = self.resolve_operand(bus, entry.mode);
            let extra_op = self.execute(bus, entry.op);

            // Only when both the mode and the operation report a potential
            // penalty cycle does one materialize.
            self.cycles += extra_mode & extra_op;

            self.status.insert(Status::U);
        }

        self.cycles -= 1;
    }

    /// Power-on / reset: registers cleared, stack pointer at $FD, PC loaded
    /// from the reset vector. Costs 8 cycles.
    pub fn reset(&mut self, bus: &mut Bus) {
        self.a = 0;
        self.x = 0;
        self.y = 0;
        self.stkp = 0xFD;
        self.status = Status::U;

        let lo = self.read(bus, VECTOR_RESET) as u16;
        let hi = self.read(bus, VECTOR_RESET.wrapping_add(1)) as u16;
        self.pc = (hi << 8) | lo;

        self.fetched = 0;
        self.addr_abs = 0;
        self.addr_rel = 0;

        self.cycles = 8;
    }

    /// Maskable interrupt request. Ignored while the I flag is set.
    /// Costs 7 cycles.
    pub fn irq(&mut self, bus: &mut Bus) {
        if self.status.contains(Status::I) {
            return;
        }
        self.interrupt(bus, VECTOR_IRQ);
        self.cycles = 7;
    }

    /// Non-maskable interrupt. Costs 8 cycles.
    pub fn nmi(&mut self, bus: &mut Bus) {
        self.interrupt(bus, VECTOR_NMI);
        self.cycles = 8;
    }

    fn interrupt(&mut self, bus: &mut Bus, vector: u16) {
        self.push(bus, (self.pc >> 8) as u8);
        self.push(bus, (self.pc & 0x00FF) as u8);

        self.status.remove(Status::B);
        self.status.insert(Status::U);
        self.status.insert(Status::I);
        self.push(bus, self.status.bits());

        let lo = self.read(bus, vector) as u16;
        let hi = self.read(bus, vector.wrapping_add(1)) as u16;
        self.pc = (hi << 8) | lo;
    }

    /// True between instructions; the next `clock()` fetches a new opcode.
    pub fn is_complete(&self) -> bool {
        self.cycles == 0
    }

    // -------------- Memory and stack helpers --------------

    fn read(&mut self, bus: &mut Bus, addr: u16) -> u8 {
        bus.read(addr)
    }

    fn write(&mut self, bus: &mut Bus, addr: u16, data: u8) {
        bus.write(addr, data);
    }

    fn push(&mut self, bus: &mut Bus, data: u8) {
        self.write(bus, STACK_BASE + self.stkp as u16, data);
        self.stkp = self.stkp.wrapping_sub(1);
    }

    fn pop(&mut self, bus: &mut Bus) -> u8 {
        self.stkp = self.stkp.wrapping_add(1);
        self.read(bus, STACK_BASE + self.stkp as u16)
    }

    /// Load the operand into `fetched`. Implied-mode instructions already
    /// staged the accumulator during operand resolution.
    fn fetch(&mut self, bus: &mut Bus) -> u8 {
        if LOOKUP[self.opcode as usize].mode != AddrMode::Imp {
            self.fetched = self.read(bus, self.addr_abs);
        }
        self.fetched
    }

    fn set_zn(&mut self, value: u8) {
        self.status.set(Status::Z, value == 0);
        self.status.set(Status::N, value & 0x80 != 0);
    }

    // -------------- Operand resolution --------------

    /// Compute `addr_abs`/`addr_rel`/`fetched` for the given mode. Returns 1
    /// if the mode may cost a penalty cycle (page boundary crossed).
    fn resolve_operand(&mut self, bus: &mut Bus, mode: AddrMode) -> u8 {
        match mode {
            AddrMode::Imp => {
                self.fetched = self.a;
                0
            }
            AddrMode::Imm => {
                self.addr_abs = self.pc;
                self.pc = self.pc.wrapping_add(1);
                0
            }
            AddrMode::Zp0 => {
                self.addr_abs = self.read(bus, self.pc) as u16;
                self.pc = self.pc.wrapping_add(1);
                0
            }
            AddrMode::Zpx => {
                let base = self.read(bus, self.pc);
                self.pc = self.pc.wrapping_add(1);
                self.addr_abs = base.wrapping_add(self.x) as u16;
                0
            }
            AddrMode::Zpy => {
                let base = self.read(bus, self.pc);
                self.pc = self.pc.wrapping_add(1);
                self.addr_abs = base.wrapping_add(self.y) as u16;
                0
            }
            AddrMode::Rel => {
                let mut rel = self.read(bus, self.pc) as u16;
                self.pc = self.pc.wrapping_add(1);
                if rel & 0x0080 != 0 {
                    rel |= 0xFF00;
                }
                self.addr_rel = rel;
                0
            }
            AddrMode::Abs => {
                self.addr_abs = self.read_addr_operand(bus);
                0
            }
            AddrMode::Abx => {
                let base = self.read_addr_operand(bus);
                self.addr_abs = base.wrapping_add(self.x as u16);
                self.page_cross_penalty(base)
            }
            AddrMode::Aby => {
                let base = self.read_addr_operand(bus);
                self.addr_abs = base.wrapping_add(self.y as u16);
                self.page_cross_penalty(base)
            }
            AddrMode::Ind => {
                let ptr = self.read_addr_operand(bus);
                let lo = self.read(bus, ptr) as u16;
                // Hardware quirk: the pointer's high byte is fetched from the
                // start of the same page when the pointer sits at $xxFF.
                let hi_addr = if ptr & 0x00FF == 0x00FF {
                    ptr & 0xFF00
                } else {
                    ptr.wrapping_add(1)
                };
                let hi = self.read(bus, hi_addr) as u16;
                self.addr_abs = (hi << 8) | lo;
                0
            }
            AddrMode::Izx => {
                let t = self.read(bus, self.pc);
                self.pc = self.pc.wrapping_add(1);
                let lo = self.read(bus, t.wrapping_add(self.x) as u16) as u16;
                let hi = self.read(bus, t.wrapping_add(self.x).wrapping_add(1) as u16) as u16;
                self.addr_abs = (hi << 8) | lo;
                0
            }
            AddrMode::Izy => {
                let t = self.read(bus, self.pc);
                self.pc = self.pc.wrapping_add(1);
                let lo = self.read(bus, t as u16) as u16;
                let hi = self.read(bus, t.wrapping_add(1) as u16) as u16;
                let base = (hi << 8) | lo;
                self.addr_abs = base.wrapping_add(self.y as u16);
                self.page_cross_penalty(base)
            }
        }
    }

    /// Read a 16-bit little-endian operand at PC, advancing PC by two.
    fn read_addr_operand(&mut self, bus: &mut Bus) -> u16 {
        let lo = self.read(bus, self.pc) as u16;
        self.pc = self.pc.wrapping_add(1);
        let hi = self.read(bus, self.pc) as u16;
        self.pc = self.pc.wrapping_add(1);
        (hi << 8) | lo
    }

    #[inline]
    fn page_cross_penalty(&self, base: u16) -> u8 {
        if self.addr_abs & 0xFF00 != base & 0xFF00 {
            1
        } else {
            0
        }
    }

    // -------------- Execution --------------

    /// Run the operation. Returns 1 if it may take a penalty cycle when the
    /// addressing mode also signalled one.
    fn execute(&mut self, bus: &mut Bus, op: Operation) -> u8 {
        use Operation::*;
        match op {
            Adc => self.op_adc(bus),
            Sbc => self.op_sbc(bus),
            And => {
                let value = self.fetch(bus);
                self.a &= value;
                self.set_zn(self.a);
                1
            }
            Ora => {
                let value = self.fetch(bus);
                self.a |= value;
                self.set_zn(self.a);
                1
            }
            Eor => {
                let value = self.fetch(bus);
                self.a ^= value;
                self.set_zn(self.a);
                1
            }
            Asl => self.rmw(bus, |cpu, v| {
                cpu.status.set(Status::C, v & 0x80 != 0);
                v << 1
            }),
            Lsr => self.rmw(bus, |cpu, v| {
                cpu.status.set(Status::C, v & 0x01 != 0);
                v >> 1
            }),
            Rol => self.rmw(bus, |cpu, v| {
                let carry_in = cpu.status.contains(Status::C) as u8;
                cpu.status.set(Status::C, v & 0x80 != 0);
                (v << 1) | carry_in
            }),
            Ror => self.rmw(bus, |cpu, v| {
                let carry_in = cpu.status.contains(Status::C) as u8;
                cpu.status.set(Status::C, v & 0x01 != 0);
                (carry_in << 7) | (v >> 1)
            }),
            Bit => {
                let value = self.fetch(bus);
                self.status.set(Status::Z, self.a & value == 0);
                self.status.set(Status::N, value & 0x80 != 0);
                self.status.set(Status::V, value & 0x40 != 0);
                0
            }
            Cmp => {
                let value = self.fetch(bus);
                self.compare(self.a, value);
                1
            }
            Cpx => {
                let value = self.fetch(bus);
                self.compare(self.x, value);
                0
            }
            Cpy => {
                let value = self.fetch(bus);
                self.compare(self.y, value);
                0
            }
            Inc => self.rmw(bus, |_, v| v.wrapping_add(1)),
            Dec => self.rmw(bus, |_, v| v.wrapping_sub(1)),
            Inx => {
                self.x = self.x.wrapping_add(1);
                self.set_zn(self.x);
                0
            }
            Iny => {
                self.y = self.y.wrapping_add(1);
                self.set_zn(self.y);
                0
            }
            Dex => {
                self.x = self.x.wrapping_sub(1);
                self.set_zn(self.x);
                0
            }
            Dey => {
                self.y = self.y.wrapping_sub(1);
                self.set_zn(self.y);
                0
            }
            Lda => {
                self.a = self.fetch(bus);
                self.set_zn(self.a);
                1
            }
            Ldx => {
                self.x = self.fetch(bus);
                self.set_zn(self.x);
                1
            }
            Ldy => {
                self.y = self.fetch(bus);
                self.set_zn(self.y);
                1
            }
            Sta => {
                self.write(bus, self.addr_abs, self.a);
                0
            }
            Stx => {
                self.write(bus, self.addr_abs, self.x);
                0
            }
            Sty => {
                self.write(bus, self.addr_abs, self.y);
                0
            }
            Tax => {
                self.x = self.a;
                self.set_zn(self.x);
                0
            }
            Tay => {
                self.y = self.a;
                self.set_zn(self.y);
                0
            }
            Txa => {
                self.a = self.x;
                self.set_zn(self.a);
                0
            }
            Tya => {
                self.a = self.y;
                self.set_zn(self.a);
                0
            }
            Tsx => {
                self.x = self.stkp;
                self.set_zn(self.x);
                0
            }
            Txs => {
                self.stkp = self.x;
                0
            }
            Pha => {
                self.push(bus, self.a);
                0
            }
            Php => {
                // Pushed copy carries B and U set; the live register does not
                // change.
                let pushed = self.status | Status::B | Status::U;
                self.push(bus, pushed.bits());
                0
            }
            Pla => {
                self.a = self.pop(bus);
                self.set_zn(self.a);
                0
            }
            Plp => {
                self.status = Status::from_bits_retain(self.pop(bus));
                self.status.insert(Status::U);
                0
            }
            Jmp => {
                self.pc = self.addr_abs;
                0
            }
            Jsr => {
                // Pushes the address of the last byte of the JSR operand.
                self.pc = self.pc.wrapping_sub(1);
                self.push(bus, (self.pc >> 8) as u8);
                self.push(bus, (self.pc & 0x00FF) as u8);
                self.pc = self.addr_abs;
                0
            }
            Rts => {
                let lo = self.pop(bus) as u16;
                let hi = self.pop(bus) as u16;
                self.pc = ((hi << 8) | lo).wrapping_add(1);
                0
            }
            Brk => {
                // BRK shares the IRQ vector. The immediate-mode resolver has
                // already consumed the padding byte; the extra increment
                // leaves the pushed return address at opcode+3.
                self.pc = self.pc.wrapping_add(1);
                self.status.insert(Status::I);
                self.push(bus, (self.pc >> 8) as u8);
                self.push(bus, (self.pc & 0x00FF) as u8);

                self.status.insert(Status::B);
                self.push(bus, self.status.bits());
                self.status.remove(Status::B);

                let lo = self.read(bus, VECTOR_IRQ) as u16;
                let hi = self.read(bus, VECTOR_IRQ.wrapping_add(1)) as u16;
                self.pc = (hi << 8) | lo;
                0
            }
            Rti => {
                self.status = Status::from_bits_retain(self.pop(bus));
                self.status.remove(Status::B);
                self.status.remove(Status::U);
                let lo = self.pop(bus) as u16;
                let hi = self.pop(bus) as u16;
                self.pc = (hi << 8) | lo;
                0
            }
            Bcc => self.branch_if(!self.status.contains(Status::C)),
            Bcs => self.branch_if(self.status.contains(Status::C)),
            Bne => self.branch_if(!self.status.contains(Status::Z)),
            Beq => self.branch_if(self.status.contains(Status::Z)),
            Bpl => self.branch_if(!self.status.contains(Status::N)),
            Bmi => self.branch_if(self.status.contains(Status::N)),
            Bvc => self.branch_if(!self.status.contains(Status::V)),
            Bvs => self.branch_if(self.status.contains(Status::V)),
            Clc => {
                self.status.remove(Status::C);
                0
            }
            Sec => {
                self.status.insert(Status::C);
                0
            }
            Cli => {
                self.status.remove(Status::I);
                0
            }
            Sei => {
                self.status.insert(Status::I);
                0
            }
            Cld => {
                self.status.remove(Status::D);
                0
            }
            Sed => {
                self.status.insert(Status::D);
                0
            }
            Clv => {
                self.status.remove(Status::V);
                0
            }
            Nop => match self.opcode {
                // These unofficial NOP variants signal the indexed-read
                // penalty, but their implied-mode table entries report no
                // page cross, so the AND rule keeps them at base cycles.
                0x1C | 0x3C | 0x5C | 0x7C | 0xDC | 0xFC => 1,
                _ => 0,
            },
            Xxx => 0,
        }
    }

    fn op_adc(&mut self, bus: &mut Bus) -> u8 {
        let value = self.fetch(bus) as u16;
        let acc = self.a as u16;
        let carry = self.status.contains(Status::C) as u16;
        let temp = acc + value + carry;

        self.status.set(Status::C, temp > 0x00FF);
        self.status.set(Status::Z, temp & 0x00FF == 0);
        self.status
            .set(Status::V, (!(acc ^ value) & (acc ^ temp)) & 0x0080 != 0);
        self.status.set(Status::N, temp & 0x0080 != 0);

        self.a = temp as u8;
        1
    }

    fn op_sbc(&mut self, bus: &mut Bus) -> u8 {
        // Subtraction is addition of the one's complement plus carry.
        let value = (self.fetch(bus) as u16) ^ 0x00FF;
        let acc = self.a as u16;
        let carry = self.status.contains(Status::C) as u16;
        let temp = acc + value + carry;

        self.status.set(Status::C, temp > 0x00FF);
        self.status.set(Status::Z, temp & 0x00FF == 0);
        self.status
            .set(Status::V, (temp ^ acc) & (temp ^ value) & 0x0080 != 0);
        self.status.set(Status::N, temp & 0x0080 != 0);

        self.a = temp as u8;
        1
    }

    fn compare(&mut self, reg: u8, value: u8) {
        let temp = (reg as u16).wrapping_sub(value as u16);
        self.status.set(Status::C, reg >= value);
        self.set_zn(temp as u8);
    }

    /// Read-modify-write helper: implied mode targets the accumulator,
    /// everything else writes back to memory.
    fn rmw(&mut self, bus: &mut Bus, f: impl FnOnce(&mut Self, u8) -> u8) -> u8 {
        let value = self.fetch(bus);
        let result = f(self, value);
        self.set_zn(result);
        if LOOKUP[self.opcode as usize].mode == AddrMode::Imp {
            self.a = result;
        } else {
            self.write(bus, self.addr_abs, result);
        }
        0
    }

    /// Taken branches cost one extra cycle, two when the destination lies
    /// on a different page.
    fn branch_if(&mut self, take: bool) -> u8 {
        if take {
            self.cycles += 1;
            self.addr_abs = self.pc.wrapping_add(self.addr_rel);
            if self.addr_abs & 0xFF00 != self.pc & 0xFF00 {
                self.cycles += 1;
            }
            self.pc = self.addr_abs;
        }
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{build_nrom_with_prg, step};
    use std::cell::RefCell;
    use std::rc::Rc;
    use crate::cartridge::Cartridge;

    /// Bus with an NROM cartridge whose PRG holds `program` at $8000 and a
    /// reset vector pointing there. The CPU is reset and its 8 reset cycles
    /// burned off, ready at the first instruction.
    fn bus_with_program(program: &[u8]) -> Bus {
        let mut prg = vec![0xEAu8; 0x8000];
        prg[..program.len()].copy_from_slice(program);
        let mut bus = Bus::new();
        bus.insert_cartridge(build_nrom_with_prg(&prg, 0x8000));
        bus.reset();
        let mut cpu = std::mem::take(bus.cpu_mut());
        while !cpu.is_complete() {
            cpu.clock(&mut bus);
        }
        *bus.cpu_mut() = cpu;
        bus
    }

    fn run(bus: &mut Bus, instructions: usize) {
        for _ in 0..instructions {
            step(bus);
        }
    }

    #[test]
    fn reset_loads_vector_and_initial_state() {
        let bus = bus_with_program(&[0xEA]);
        assert_eq!(bus.cpu().pc, 0x8000);
        assert_eq!(bus.cpu().stkp, 0xFD);
        assert!(bus.cpu().status.contains(Status::U));
        assert_eq!(bus.cpu().a, 0);
    }

    #[test]
    fn lda_immediate_sets_flags() {
        // LDA #$00; LDA #$80
        let mut bus = bus_with_program(&[0xA9, 0x00, 0xA9, 0x80]);
        step(&mut bus);
        assert!(bus.cpu().status.contains(Status::Z));
        assert!(!bus.cpu().status.contains(Status::N));
        step(&mut bus);
        assert_eq!(bus.cpu().a, 0x80);
        assert!(bus.cpu().status.contains(Status::N));
        assert!(!bus.cpu().status.contains(Status::Z));
    }

    #[test]
    fn adc_signed_overflow() {
        // LDA #$50; ADC #$50 -> $A0, V set, C clear, N set
        let mut bus = bus_with_program(&[0xA9, 0x50, 0x69, 0x50]);
        run(&mut bus, 2);
        let cpu = bus.cpu();
        assert_eq!(cpu.a, 0xA0);
        assert!(cpu.status.contains(Status::V));
        assert!(cpu.status.contains(Status::N));
        assert!(!cpu.status.contains(Status::C));
        assert!(!cpu.status.contains(Status::Z));
    }

    #[test]
    fn adc_carry_out() {
        // LDA #$FF; SEC; ADC #$00 -> $00, C set, Z set
        let mut bus = bus_with_program(&[0xA9, 0xFF, 0x38, 0x69, 0x00]);
        run(&mut bus, 3);
        let cpu = bus.cpu();
        assert_eq!(cpu.a, 0x00);
        assert!(cpu.status.contains(Status::C));
        assert!(cpu.status.contains(Status::Z));
    }

    #[test]
    fn sbc_borrow() {
        // SEC; LDA #$00; SBC #$01 -> $FF, C clear (borrow), N set
        let mut bus = bus_with_program(&[0x38, 0xA9, 0x00, 0xE9, 0x01]);
        run(&mut bus, 3);
        let cpu = bus.cpu();
        assert_eq!(cpu.a, 0xFF);
        assert!(!cpu.status.contains(Status::C));
        assert!(cpu.status.contains(Status::N));
    }

    #[test]
    fn sbc_no_borrow() {
        // SEC; LDA #$05; SBC #$03 -> $02, C set
        let mut bus = bus_with_program(&[0x38, 0xA9, 0x05, 0xE9, 0x03]);
        run(&mut bus, 3);
        assert_eq!(bus.cpu().a, 0x02);
        assert!(bus.cpu().status.contains(Status::C));
    }

    #[test]
    fn compare_sets_carry_zero() {
        // LDA #$40; CMP #$40 -> Z,C set. CMP #$50 -> C clear, N set.
        let mut bus = bus_with_program(&[0xA9, 0x40, 0xC9, 0x40, 0xC9, 0x50]);
        run(&mut bus, 2);
        assert!(bus.cpu().status.contains(Status::Z));
        assert!(bus.cpu().status.contains(Status::C));
        step(&mut bus);
        assert!(!bus.cpu().status.contains(Status::C));
        assert!(bus.cpu().status.contains(Status::N));
    }

    #[test]
    fn asl_accumulator_and_memory() {
        // LDA #$81; ASL A -> $02, C set. LDA #$40; STA $10; ASL $10.
        let mut bus = bus_with_program(&[
            0xA9, 0x81, 0x0A, // LDA/ASL A
            0xA9, 0x40, 0x85, 0x10, 0x06, 0x10, // LDA/STA/ASL zp
        ]);
        run(&mut bus, 2);
        assert_eq!(bus.cpu().a, 0x02);
        assert!(bus.cpu().status.contains(Status::C));
        run(&mut bus, 3);
        assert_eq!(bus.read(0x0010), 0x80);
        assert!(bus.cpu().status.contains(Status::N));
    }

    #[test]
    fn ror_through_carry() {
        // SEC; LDA #$02; ROR A -> $81 (carry rotates into bit 7)
        let mut bus = bus_with_program(&[0x38, 0xA9, 0x02, 0x6A]);
        run(&mut bus, 3);
        assert_eq!(bus.cpu().a, 0x81);
        assert!(!bus.cpu().status.contains(Status::C));
        assert!(bus.cpu().status.contains(Status::N));
    }

    #[test]
    fn bit_copies_v_and_n_from_operand() {
        // LDA #$C0; STA $20; LDA #$00; BIT $20 -> Z set, N set, V set
        let mut bus = bus_with_program(&[0xA9, 0xC0, 0x85, 0x20, 0xA9, 0x00, 0x24, 0x20]);
        run(&mut bus, 4);
        let cpu = bus.cpu();
        assert!(cpu.status.contains(Status::Z));
        assert!(cpu.status.contains(Status::N));
        assert!(cpu.status.contains(Status::V));
    }

    #[test]
    fn stack_push_pull_round_trip() {
        // LDA #$37; PHA; LDA #$00; PLA
        let mut bus = bus_with_program(&[0xA9, 0x37, 0x48, 0xA9, 0x00, 0x68]);
        run(&mut bus, 2);
        assert_eq!(bus.cpu().stkp, 0xFC);
        run(&mut bus, 2);
        assert_eq!(bus.cpu().a, 0x37);
        assert_eq!(bus.cpu().stkp, 0xFD);
    }

    #[test]
    fn php_pushes_status_with_break_set() {
        // SEC; PHP; CLC; PLP -> C restored, live B stays clear
        let mut bus = bus_with_program(&[0x38, 0x08, 0x18, 0x28]);
        run(&mut bus, 2);
        // Inspect the pushed byte directly.
        let pushed = bus.read(0x01FD);
        assert_eq!(pushed & Status::C.bits(), Status::C.bits());
        assert_eq!(pushed & Status::B.bits(), Status::B.bits());
        assert_eq!(pushed & Status::U.bits(), Status::U.bits());
        run(&mut bus, 2);
        assert!(bus.cpu().status.contains(Status::C));
    }

    #[test]
    fn jsr_rts_round_trip() {
        // JSR $8005; (dest: LDX #$7F; RTS); next instruction LDY #$01
        let mut bus = bus_with_program(&[
            0x20, 0x05, 0x80, // JSR $8005
            0xA0, 0x01, // LDY #$01 (return target)
            0xA2, 0x7F, // $8005: LDX #$7F
            0x60, // RTS
        ]);
        step(&mut bus);
        assert_eq!(bus.cpu().pc, 0x8005);
        run(&mut bus, 2); // LDX; RTS
        assert_eq!(bus.cpu().pc, 0x8003);
        assert_eq!(bus.cpu().x, 0x7F);
        step(&mut bus); // LDY
        assert_eq!(bus.cpu().y, 0x01);
    }

    #[test]
    fn branch_taken_and_not_taken_cycles() {
        // SEC (2) then BCS +2 taken, same page: 3 cycles.
        let mut bus = bus_with_program(&[0x38, 0xB0, 0x02, 0xEA, 0xEA, 0xEA]);
        step(&mut bus);
        let cycles = step(&mut bus);
        assert_eq!(cycles, 3);
        assert_eq!(bus.cpu().pc, 0x8005);

        // CLC then BCS not taken: 2 cycles.
        let mut bus = bus_with_program(&[0x18, 0xB0, 0x02]);
        step(&mut bus);
        let cycles = step(&mut bus);
        assert_eq!(cycles, 2);
        assert_eq!(bus.cpu().pc, 0x8003);
    }

    #[test]
    fn branch_page_cross_costs_four() {
        // Program at $8000: CLC; BCC -> target on previous page.
        // BCC operand $F0 (backwards) crosses from $80xx to $7Fxx.
        let mut bus = bus_with_program(&[0x18, 0x90, 0xF0]);
        step(&mut bus);
        let cycles = step(&mut bus);
        assert_eq!(cycles, 4);
        assert_eq!(bus.cpu().pc, 0x7FF3);
    }

    #[test]
    fn absolute_x_page_cross_penalty() {
        // LDX #$01; LDA $12FF,X -> crosses into $1300: 5 cycles.
        let mut bus = bus_with_program(&[0xA2, 0x01, 0xBD, 0xFF, 0x12]);
        bus.write(0x1300, 0x5E);
        step(&mut bus);
        let cycles = step(&mut bus);
        assert_eq!(cycles, 5);
        assert_eq!(bus.cpu().a, 0x5E);

        // LDX #$01; LDA $1200,X -> same page: 4 cycles.
        let mut bus = bus_with_program(&[0xA2, 0x01, 0xBD, 0x00, 0x12]);
        bus.write(0x1201, 0x11);
        step(&mut bus);
        let cycles = step(&mut bus);
        assert_eq!(cycles, 4);
        assert_eq!(bus.cpu().a, 0x11);
    }

    #[test]
    fn store_takes_no_page_cross_penalty() {
        // LDX #$01; STA $12FF,X -> always 5 cycles, no penalty interplay.
        let mut bus = bus_with_program(&[0xA2, 0x01, 0x9D, 0xFF, 0x12]);
        step(&mut bus);
        let cycles = step(&mut bus);
        assert_eq!(cycles, 5);
    }

    #[test]
    fn indirect_jmp_page_wrap_quirk() {
        // Pointer at $10FF: low byte from $10FF, high byte from $1000 (not
        // $1100).
        let mut bus = bus_with_program(&[0x6C, 0xFF, 0x10]);
        bus.write(0x10FF, 0x34);
        bus.write(0x1000, 0x12);
        bus.write(0x1100, 0x56);
        step(&mut bus);
        assert_eq!(bus.cpu().pc, 0x1234);
    }

    #[test]
    fn indexed_indirect_and_indirect_indexed() {
        // LDX #$04; LDA ($10,X) with pointer at $14 -> $0300
        let mut bus = bus_with_program(&[0xA2, 0x04, 0xA1, 0x10]);
        bus.write(0x0014, 0x00);
        bus.write(0x0015, 0x03);
        bus.write(0x0300, 0x77);
        run(&mut bus, 2);
        assert_eq!(bus.cpu().a, 0x77);

        // LDY #$10; LDA ($20),Y with pointer $0300 -> $0310
        let mut bus = bus_with_program(&[0xA0, 0x10, 0xB1, 0x20]);
        bus.write(0x0020, 0x00);
        bus.write(0x0021, 0x03);
        bus.write(0x0310, 0x88);
        run(&mut bus, 2);
        assert_eq!(bus.cpu().a, 0x88);
    }

    #[test]
    fn brk_pushes_state_and_vectors() {
        let mut bus = bus_with_program(&[0x00]);
        // The NOP fill leaves the IRQ vector reading as $EAEA; only the
        // pushed frame matters here.
        let sp_before = bus.cpu().stkp;
        step(&mut bus);
        let cpu = bus.cpu();
        assert_eq!(cpu.stkp, sp_before.wrapping_sub(3));
        assert!(cpu.status.contains(Status::I));
        // The immediate-mode operand fetch plus BRK's own increment leave
        // the pushed return address at opcode+3.
        assert_eq!(bus.read(0x01FD), 0x80); // PC high
        assert_eq!(bus.read(0x01FC), 0x03); // PC low
        let pushed_status = bus.read(0x01FB);
        assert_eq!(pushed_status & Status::B.bits(), Status::B.bits());
        // Live B is cleared again after the push.
        assert!(!bus.cpu().status.contains(Status::B));
    }

    #[test]
    fn irq_respects_interrupt_disable() {
        let mut bus = bus_with_program(&[0x78, 0xEA]); // SEI; NOP
        step(&mut bus);
        let sp_before = bus.cpu().stkp;

        let mut cpu = std::mem::take(bus.cpu_mut());
        cpu.irq(&mut bus);
        *bus.cpu_mut() = cpu;
        assert_eq!(bus.cpu().stkp, sp_before); // masked, nothing pushed

        // CLI then retry.
        let mut bus = bus_with_program(&[0x58, 0xEA]);
        step(&mut bus);
        let pc_before = bus.cpu().pc;
        let mut cpu = std::mem::take(bus.cpu_mut());
        cpu.irq(&mut bus);
        *bus.cpu_mut() = cpu;
        let cpu = bus.cpu();
        assert_eq!(cpu.stkp, 0xFD - 3);
        assert!(cpu.status.contains(Status::I));
        assert_ne!(cpu.pc, pc_before);
    }

    #[test]
    fn rti_restores_status_and_pc() {
        // SEC; BRK; ... handler at IRQ vector returns via RTI.
        // Simpler: push a frame by hand, then RTI.
        let mut bus = bus_with_program(&[0x40]); // RTI
        // Hand-build the stack frame: PC $9234, status with C set.
        bus.write(0x01FD, (Status::C | Status::U).bits());
        bus.write(0x01FE, 0x34);
        bus.write(0x01FF, 0x92);
        bus.cpu_mut().stkp = 0xFC;
        step(&mut bus);
        let cpu = bus.cpu();
        assert_eq!(cpu.pc, 0x9234);
        assert!(cpu.status.contains(Status::C));
        assert!(!cpu.status.contains(Status::B));
    }

    #[test]
    fn nmi_is_never_masked() {
        let mut bus = bus_with_program(&[0x78, 0xEA]); // SEI
        step(&mut bus);
        let mut cpu = std::mem::take(bus.cpu_mut());
        cpu.nmi(&mut bus);
        *bus.cpu_mut() = cpu;
        assert_eq!(bus.cpu().stkp, 0xFD - 3);
    }

    #[test]
    fn transfers_set_flags_except_txs() {
        // LDX #$00 via LDA/TAX path: LDA #$00; TAX -> Z set
        let mut bus = bus_with_program(&[0xA9, 0x00, 0xAA]);
        run(&mut bus, 2);
        assert!(bus.cpu().status.contains(Status::Z));

        // LDX #$80; TXS must not touch flags; TSX sets N from stkp.
        let mut bus = bus_with_program(&[0xA2, 0x80, 0x9A, 0xA9, 0x01, 0xBA]);
        run(&mut bus, 3); // LDX, TXS, LDA (clears Z/N)
        assert!(!bus.cpu().status.contains(Status::N));
        step(&mut bus); // TSX
        assert_eq!(bus.cpu().x, 0x80);
        assert!(bus.cpu().status.contains(Status::N));
    }

    #[test]
    fn decimal_flag_is_latched_but_inert() {
        // SED; LDA #$09; CLC; ADC #$01 -> binary $0A, not BCD $10
        let mut bus = bus_with_program(&[0xF8, 0xA9, 0x09, 0x18, 0x69, 0x01]);
        run(&mut bus, 4);
        assert_eq!(bus.cpu().a, 0x0A);
        assert!(bus.cpu().status.contains(Status::D));
    }

    #[test]
    fn unofficial_opcodes_do_not_panic() {
        let mut bus = bus_with_program(&[0x02, 0x03, 0x04, 0x80, 0xEB, 0x01]);
        for _ in 0..5 {
            step(&mut bus);
        }
        // $EB executes as an SBC alias.
        assert!(bus.cpu().is_complete());
    }

    #[test]
    fn undocumented_nops_take_base_cycles() {
        // $1C and $FC carry implied-mode table entries, so the penalty they
        // signal never materializes and they run in their base 4 cycles.
        let mut bus = bus_with_program(&[0x1C, 0xFC]);
        assert_eq!(step(&mut bus), 4);
        assert_eq!(step(&mut bus), 4);
    }

    #[test]
    fn invalid_cartridge_leaves_open_bus() {
        let cart = Cartridge::from_ines_bytes(&[0u8; 4]);
        assert!(!cart.is_valid_image());
        let mut bus = Bus::new();
        bus.insert_cartridge(Rc::new(RefCell::new(cart)));
        assert_eq!(bus.read(0x8000), 0x00);
    }
}

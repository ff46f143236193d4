//! Linear-sweep disassembler over the CPU-visible address space.
//!
//! Decodes each opcode through the same descriptor table the executor uses,
//! so operand widths always agree with execution. Output is keyed by
//! instruction address, which lets a front end find the line for the
//! current PC with a plain map lookup.

use std::collections::BTreeMap;

use crate::bus::Bus;
use crate::cpu::table::{AddrMode, LOOKUP};
use crate::cpu::Cpu;

impl Cpu {
    /// Disassemble `start..=stop`. Reads go through the bus, so the listing
    /// reflects whatever is currently mapped (including RAM).
    pub fn disassemble(bus: &mut Bus, start: u16, stop: u16) -> BTreeMap<u16, String> {
        let mut lines = BTreeMap::new();

        // A u32 cursor so a window ending at $FFFF terminates.
        let mut addr = start as u32;
        while addr <= stop as u32 {
            let line_addr = addr as u16;
            let opcode = bus.read(addr as u16);
            addr += 1;

            let entry = LOOKUP[opcode as usize];
            let mut text = format!("${line_addr:04X}: {} ", entry.name);

            match entry.mode {
                AddrMode::Imp => {
                    text.push_str("{IMP}");
                }
                AddrMode::Imm => {
                    let value = bus.read(addr as u16);
                    addr += 1;
                    text.push_str(&format!("#${value:02X} {{IMM}}"));
                }
                AddrMode::Zp0 => {
                    let lo = bus.read(addr as u16);
                    addr += 1;
                    text.push_str(&format!("${lo:02X} {{ZP0}}"));
                }
                AddrMode::Zpx => {
                    let lo = bus.read(addr as u16);
                    addr += 1;
                    text.push_str(&format!("${lo:02X}, X {{ZPX}}"));
                }
                AddrMode::Zpy => {
                    let lo = bus.read(addr as u16);
                    addr += 1;
                    text.push_str(&format!("${lo:02X}, Y {{ZPY}}"));
                }
                AddrMode::Rel => {
                    let offset = bus.read(addr as u16);
                    addr += 1;
                    let rel = offset as i8 as i32;
                    let target = (addr as i32 + rel) as u16;
                    text.push_str(&format!("${offset:02X} [${target:04X}] {{REL}}"));
                }
                AddrMode::Abs => {
                    let value = read_word(bus, &mut addr);
                    text.push_str(&format!("${value:04X} {{ABS}}"));
                }
                AddrMode::Abx => {
                    let value = read_word(bus, &mut addr);
                    text.push_str(&format!("${value:04X}, X {{ABX}}"));
                }
                AddrMode::Aby => {
                    let value = read_word(bus, &mut addr);
                    text.push_str(&format!("${value:04X}, Y {{ABY}}"));
                }
                AddrMode::Ind => {
                    let value = read_word(bus, &mut addr);
                    text.push_str(&format!("(${value:04X}) {{IND}}"));
                }
                AddrMode::Izx => {
                    let lo = bus.read(addr as u16);
                    addr += 1;
                    text.push_str(&format!("(${lo:02X}, X) {{IZX}}"));
                }
                AddrMode::Izy => {
                    let lo = bus.read(addr as u16);
                    addr += 1;
                    text.push_str(&format!("(${lo:02X}), Y {{IZY}}"));
                }
            }

            lines.insert(line_addr, text);
        }

        lines
    }
}

fn read_word(bus: &mut Bus, addr: &mut u32) -> u16 {
    let lo = bus.read(*addr as u16) as u16;
    *addr += 1;
    let hi = bus.read(*addr as u16) as u16;
    *addr += 1;
    (hi << 8) | lo
}

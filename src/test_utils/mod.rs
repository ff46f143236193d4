//! Shared helpers for unit tests: synthetic iNES images and a CPU step
//! driver. Compiled only for tests.

use std::cell::RefCell;
use std::rc::Rc;

use crate::bus::Bus;
use crate::cartridge::Cartridge;

/// Build a minimal iNES image. PRG bytes are filled with $AA, CHR with $CC,
/// so tests can tell the sections apart.
pub fn build_ines(
    prg_16k: u8,
    chr_8k: u8,
    flags6: u8,
    flags7: u8,
    trainer: Option<&[u8]>,
) -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(b"NES\x1A");
    data.push(prg_16k);
    data.push(chr_8k);
    data.push(flags6);
    data.push(flags7);
    data.extend_from_slice(&[0u8; 8]);

    if let Some(t) = trainer {
        assert_eq!(t.len(), 512);
        data.extend_from_slice(t);
    }

    data.extend(std::iter::repeat(0xAA).take(prg_16k as usize * 16 * 1024));
    data.extend(std::iter::repeat(0xCC).take(chr_8k as usize * 8 * 1024));
    data
}

/// Build an NROM cartridge whose PRG holds `prg` with the reset vector
/// patched to `reset_vector`. `prg` must be one or two 16 KiB banks.
pub fn build_nrom_with_prg(prg: &[u8], reset_vector: u16) -> Rc<RefCell<Cartridge>> {
    assert!(prg.len() == 0x4000 || prg.len() == 0x8000);
    let banks = (prg.len() / 0x4000) as u8;

    let mut prg = prg.to_vec();
    let vec_offset = prg.len() - 4; // $FFFC in the CPU window
    prg[vec_offset] = (reset_vector & 0x00FF) as u8;
    prg[vec_offset + 1] = (reset_vector >> 8) as u8;

    let data = {
        let mut d = Vec::new();
        d.extend_from_slice(b"NES\x1A");
        d.push(banks);
        d.push(0); // CHR RAM
        d.push(0);
        d.push(0);
        d.extend_from_slice(&[0u8; 8]);
        d.extend_from_slice(&prg);
        d
    };

    let cart = Cartridge::from_ines_bytes(&data);
    assert!(cart.is_valid_image());
    Rc::new(RefCell::new(cart))
}

/// Run the CPU through one full instruction and return how many CPU cycles
/// it took. The CPU must be between instructions on entry.
pub fn step(bus: &mut Bus) -> u32 {
    let mut cpu = std::mem::take(bus.cpu_mut());
    let mut cycles = 0u32;
    loop {
        cpu.clock(bus);
        cycles += 1;
        if cpu.is_complete() {
            break;
        }
    }
    *bus.cpu_mut() = cpu;
    cycles
}

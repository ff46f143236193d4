/*!
NROM (mapper 0): fixed banks, no switching.

Mapping rules:
- CPU $8000..=$FFFF: one 16 KiB PRG bank is mirrored across the whole
  32 KiB window (mask $3FFF); two banks map the window directly
  (mask $7FFF).
- PPU $0000..=$1FFF: CHR is addressed 1:1. Writes are only claimed when
  the cartridge reported zero CHR banks, i.e. CHR is RAM.
*/

use crate::mapper::Mapper;

pub struct Nrom {
    prg_banks: u8,
    chr_banks: u8,
}

impl Nrom {
    pub fn new(prg_banks: u8, chr_banks: u8) -> Self {
        Self {
            prg_banks,
            chr_banks,
        }
    }

    #[inline]
    fn prg_mask(&self) -> u16 {
        // NROM-256 (two banks) fills the window; NROM-128 mirrors one bank.
        if self.prg_banks > 1 { 0x7FFF } else { 0x3FFF }
    }
}

impl Mapper for Nrom {
    fn cpu_map_read(&self, addr: u16) -> Option<u32> {
        match addr {
            0x8000..=0xFFFF => Some((addr & self.prg_mask()) as u32),
            _ => None,
        }
    }

    fn cpu_map_write(&self, addr: u16) -> Option<u32> {
        match addr {
            0x8000..=0xFFFF => Some((addr & self.prg_mask()) as u32),
            _ => None,
        }
    }

    fn ppu_map_read(&self, addr: u16) -> Option<u32> {
        match addr {
            0x0000..=0x1FFF => Some(addr as u32),
            _ => None,
        }
    }

    fn ppu_map_write(&self, addr: u16) -> Option<u32> {
        match addr {
            // Only CHR RAM (zero CHR banks in the header) accepts writes.
            0x0000..=0x1FFF if self.chr_banks == 0 => Some(addr as u32),
            _ => None,
        }
    }
}

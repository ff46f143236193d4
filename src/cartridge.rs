/*!
Cartridge: iNES (v1) image parsing, PRG/CHR ownership, mapper delegation.

Features:
- Parse the 16-byte iNES header from bytes or a file path
- Skip the optional 512-byte trainer block
- Extract PRG ROM (16 KiB units) and CHR (8 KiB units; zero units means
  8 KiB of writable CHR RAM is allocated instead)
- Resolve the mapper id from the two flag bytes and construct the matching
  `Mapper` (NROM only for now)

A malformed or unsupported image never fails construction: the cartridge
comes back with `is_valid_image() == false` and declines every bus access,
so the Bus falls through to its open-bus policy. Only the file-loading
convenience surfaces an `io::Error`, since a missing file is a problem with
the environment rather than the image.
*/

use std::fs;
use std::io;
use std::path::Path;

use log::{info, warn};
use thiserror::Error;

use crate::mapper::Mapper;
use crate::mappers::Nrom;

const PRG_BANK_SIZE: usize = 16 * 1024;
const CHR_BANK_SIZE: usize = 8 * 1024;

#[derive(Debug, Error)]
pub enum CartridgeError {
    #[error("image truncated: need {needed} bytes, got {got}")]
    Truncated { needed: usize, got: usize },
    #[error("unsupported mapper id {0}")]
    UnsupportedMapper(u8),
}

/// The 16-byte iNES header, minus the 4-byte signature (which this core
/// does not validate) and the 5 reserved trailing bytes.
#[derive(Debug, Clone, Copy)]
struct InesHeader {
    prg_rom_chunks: u8,
    chr_rom_chunks: u8,
    mapper_1: u8,
    mapper_2: u8,
    #[allow(dead_code)]
    prg_ram_size: u8,
    #[allow(dead_code)]
    tv_system_1: u8,
    #[allow(dead_code)]
    tv_system_2: u8,
}

impl InesHeader {
    fn from_bytes(data: &[u8]) -> Self {
        Self {
            prg_rom_chunks: data[4],
            chr_rom_chunks: data[5],
            mapper_1: data[6],
            mapper_2: data[7],
            prg_ram_size: data[8],
            tv_system_1: data[9],
            tv_system_2: data[10],
        }
    }

    #[inline]
    fn has_trainer(&self) -> bool {
        self.mapper_1 & 0x04 != 0
    }

    #[inline]
    fn mapper_id(&self) -> u8 {
        ((self.mapper_2 >> 4) << 4) | (self.mapper_1 >> 4)
    }
}

pub struct Cartridge {
    prg_memory: Vec<u8>,
    chr_memory: Vec<u8>,
    mapper: Box<dyn Mapper>,

    mapper_id: u8,
    prg_banks: u8,
    chr_banks: u8,
    valid: bool,
}

impl Cartridge {
    // -------------- Construction --------------

    /// Build a cartridge from raw iNES bytes. Never fails: parse errors are
    /// logged and yield an invalid cartridge that declines every access.
    pub fn from_ines_bytes(data: &[u8]) -> Self {
        match Self::parse(data) {
            Ok(cart) => {
                info!(
                    "loaded cartridge: mapper {}, {} PRG bank(s), {} CHR bank(s)",
                    cart.mapper_id, cart.prg_banks, cart.chr_banks
                );
                cart
            }
            Err(err) => {
                warn!("rejected cartridge image: {err}");
                Self::invalid()
            }
        }
    }

    /// Load a cartridge from an iNES file (.nes).
    pub fn from_ines_file<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let bytes = fs::read(path)?;
        Ok(Self::from_ines_bytes(&bytes))
    }

    fn parse(data: &[u8]) -> Result<Self, CartridgeError> {
        if data.len() < 16 {
            return Err(CartridgeError::Truncated {
                needed: 16,
                got: data.len(),
            });
        }
        let header = InesHeader::from_bytes(data);

        let mut offset = 16usize;
        if header.has_trainer() {
            offset += 512;
        }

        let prg_banks = header.prg_rom_chunks;
        let prg_len = prg_banks as usize * PRG_BANK_SIZE;
        if data.len() < offset + prg_len {
            return Err(CartridgeError::Truncated {
                needed: offset + prg_len,
                got: data.len(),
            });
        }
        let prg_memory = data[offset..offset + prg_len].to_vec();
        offset += prg_len;

        // Zero CHR banks means the cartridge carries CHR RAM; give it a full
        // 8 KiB bank of writable storage.
        let chr_banks = header.chr_rom_chunks;
        let chr_memory = if chr_banks == 0 {
            vec![0u8; CHR_BANK_SIZE]
        } else {
            let chr_len = chr_banks as usize * CHR_BANK_SIZE;
            if data.len() < offset + chr_len {
                return Err(CartridgeError::Truncated {
                    needed: offset + chr_len,
                    got: data.len(),
                });
            }
            data[offset..offset + chr_len].to_vec()
        };

        let mapper_id = header.mapper_id();
        let mapper: Box<dyn Mapper> = match mapper_id {
            0 => Box::new(Nrom::new(prg_banks, chr_banks)),
            other => return Err(CartridgeError::UnsupportedMapper(other)),
        };

        Ok(Self {
            prg_memory,
            chr_memory,
            mapper,
            mapper_id,
            prg_banks,
            chr_banks,
            valid: true,
        })
    }

    fn invalid() -> Self {
        Self {
            prg_memory: Vec::new(),
            chr_memory: Vec::new(),
            mapper: Box::new(Nrom::new(0, 0)),
            mapper_id: 0,
            prg_banks: 0,
            chr_banks: 0,
            valid: false,
        }
    }

    // -------------- Bus-facing access --------------

    /// CPU read. `None` means the address is unclaimed and the Bus should
    /// route it elsewhere.
    pub fn read_cpu(&self, addr: u16) -> Option<u8> {
        if !self.valid {
            return None;
        }
        let offset = self.mapper.cpu_map_read(addr)? as usize;
        self.prg_memory.get(offset).copied()
    }

    /// CPU write. Returns true when the cartridge claimed the address.
    pub fn write_cpu(&mut self, addr: u16, data: u8) -> bool {
        if !self.valid {
            return false;
        }
        match self.mapper.cpu_map_write(addr) {
            Some(offset) => {
                if let Some(slot) = self.prg_memory.get_mut(offset as usize) {
                    *slot = data;
                }
                true
            }
            None => false,
        }
    }

    /// PPU read of pattern memory (CHR).
    pub fn read_ppu(&self, addr: u16) -> Option<u8> {
        if !self.valid {
            return None;
        }
        let offset = self.mapper.ppu_map_read(addr)? as usize;
        self.chr_memory.get(offset).copied()
    }

    /// PPU write of pattern memory; only claimed for CHR RAM.
    pub fn write_ppu(&mut self, addr: u16, data: u8) -> bool {
        if !self.valid {
            return false;
        }
        match self.mapper.ppu_map_write(addr) {
            Some(offset) => {
                if let Some(slot) = self.chr_memory.get_mut(offset as usize) {
                    *slot = data;
                }
                true
            }
            None => false,
        }
    }

    /// Reset mapper-side state (bank registers). PRG/CHR contents survive.
    pub fn reset(&mut self) {
        self.mapper.reset();
    }

    // -------------- Accessors --------------

    /// Whether the image parsed successfully. Callers must check this before
    /// installing the cartridge; an invalid cartridge declines every access.
    pub fn is_valid_image(&self) -> bool {
        self.valid
    }

    pub fn mapper_id(&self) -> u8 {
        self.mapper_id
    }

    pub fn prg_banks(&self) -> u8 {
        self.prg_banks
    }

    pub fn chr_banks(&self) -> u8 {
        self.chr_banks
    }
}

impl std::fmt::Debug for Cartridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cartridge")
            .field("mapper_id", &self.mapper_id)
            .field("prg_banks", &self.prg_banks)
            .field("chr_banks", &self.chr_banks)
            .field("valid", &self.valid)
            .finish()
    }
}

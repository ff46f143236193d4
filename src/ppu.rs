/*!
PPU timing skeleton.

This core models only what the CPU and Bus contract requires of the PPU:
its register window on the CPU bus, its own pattern-memory bus into the
cartridge, and NTSC dot/scanline timing with a frame-complete latch.
Rendering, VRAM, palettes and sprite evaluation are out of scope here.

Timing: 341 cycles per scanline, scanlines -1..=260 where -1 is the
pre-render line. Wrapping from 260 back to -1 raises the frame flag.
*/

use std::cell::RefCell;
use std::rc::Rc;

use crate::cartridge::Cartridge;

const CYCLES_PER_SCANLINE: i16 = 341;
const LAST_SCANLINE: i16 = 261;

#[derive(Default)]
pub struct Ppu {
    cartridge: Option<Rc<RefCell<Cartridge>>>,

    // The eight CPU-visible registers at $2000..=$2007. Plain latches for
    // now; side effects arrive with the rendering pipeline.
    registers: [u8; 8],

    cycle: i16,
    scanline: i16,
    frame_complete: bool,
}

impl Ppu {
    pub fn new() -> Self {
        Self {
            cartridge: None,
            registers: [0; 8],
            cycle: 0,
            scanline: 0,
            frame_complete: false,
        }
    }

    pub fn connect_cartridge(&mut self, cartridge: Rc<RefCell<Cartridge>>) {
        self.cartridge = Some(cartridge);
    }

    // -------------- CPU bus window ($2000..=$2007, mirrored) --------------

    /// Read one of the eight registers. The caller has already folded the
    /// $2000..=$3FFF mirror down to a 3-bit index.
    pub fn read_cpu(&mut self, addr: u16) -> u8 {
        self.registers[(addr & 0x0007) as usize]
    }

    pub fn write_cpu(&mut self, addr: u16, data: u8) {
        self.registers[(addr & 0x0007) as usize] = data;
    }

    // -------------- PPU bus (pattern memory) --------------

    pub fn read_ppu(&self, addr: u16) -> u8 {
        let addr = addr & 0x3FFF;
        if let Some(cart) = &self.cartridge {
            if let Some(data) = cart.borrow().read_ppu(addr) {
                return data;
            }
        }
        0x00
    }

    pub fn write_ppu(&mut self, addr: u16, data: u8) {
        let addr = addr & 0x3FFF;
        if let Some(cart) = &self.cartridge {
            cart.borrow_mut().write_ppu(addr, data);
        }
    }

    // -------------- Timing --------------

    /// Advance one PPU cycle (one dot).
    pub fn clock(&mut self) {
        self.cycle += 1;
        if self.cycle >= CYCLES_PER_SCANLINE {
            self.cycle = 0;
            self.scanline += 1;
            if self.scanline >= LAST_SCANLINE {
                self.scanline = -1;
                self.frame_complete = true;
            }
        }
    }

    pub fn reset(&mut self) {
        self.registers = [0; 8];
        self.cycle = 0;
        self.scanline = 0;
        self.frame_complete = false;
    }

    /// Poll and clear the frame flag. Returns true exactly once per frame.
    pub fn take_frame_complete(&mut self) -> bool {
        std::mem::take(&mut self.frame_complete)
    }

    pub fn scanline(&self) -> i16 {
        self.scanline
    }

    pub fn cycle(&self) -> i16 {
        self.cycle
    }
}

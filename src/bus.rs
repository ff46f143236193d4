/*!
System bus: owns CPU, PPU, system RAM and the cartridge slot, routes every
CPU read/write, and drives the master clock.

Routing order for CPU accesses:
1. The cartridge gets first claim on every address (mappers may shadow any
   region).
2. $0000..=$1FFF is the 2 KiB internal RAM, mirrored every $0800 bytes.
3. $2000..=$3FFF is the PPU register window, mirrored every 8 bytes.
4. Anything else is open bus: reads return $00, writes are dropped.

The master clock runs at PPU rate. The PPU ticks on every call; the CPU
ticks on every third call.
*/

use std::cell::RefCell;
use std::rc::Rc;

use log::debug;

use crate::cartridge::Cartridge;
use crate::cpu::Cpu;
use crate::ppu::Ppu;

const RAM_SIZE: usize = 2 * 1024;
const RAM_MIRROR_MASK: u16 = 0x07FF;
const PPU_MIRROR_MASK: u16 = 0x0007;

pub struct Bus {
    cpu: Cpu,
    ppu: Ppu,
    cartridge: Option<Rc<RefCell<Cartridge>>>,
    ram: [u8; RAM_SIZE],
    system_clock_counter: u32,
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus {
    pub fn new() -> Self {
        Self {
            cpu: Cpu::new(),
            ppu: Ppu::new(),
            cartridge: None,
            ram: [0; RAM_SIZE],
            system_clock_counter: 0,
        }
    }

    /// Install a cartridge and share it with the PPU for pattern fetches.
    pub fn insert_cartridge(&mut self, cartridge: Rc<RefCell<Cartridge>>) {
        self.ppu.connect_cartridge(Rc::clone(&cartridge));
        self.cartridge = Some(cartridge);
        debug!("cartridge inserted");
    }

    // -------------- CPU-visible address space --------------

    pub fn read(&mut self, addr: u16) -> u8 {
        if let Some(cart) = &self.cartridge {
            if let Some(data) = cart.borrow().read_cpu(addr) {
                return data;
            }
        }
        match addr {
            0x0000..=0x1FFF => self.ram[(addr & RAM_MIRROR_MASK) as usize],
            0x2000..=0x3FFF => self.ppu.read_cpu(addr & PPU_MIRROR_MASK),
            _ => 0x00,
        }
    }

    pub fn write(&mut self, addr: u16, data: u8) {
        if let Some(cart) = &self.cartridge {
            if cart.borrow_mut().write_cpu(addr, data) {
                return;
            }
        }
        match addr {
            0x0000..=0x1FFF => self.ram[(addr & RAM_MIRROR_MASK) as usize] = data,
            0x2000..=0x3FFF => self.ppu.write_cpu(addr & PPU_MIRROR_MASK, data),
            _ => {}
        }
    }

    // -------------- Clocking --------------

    /// Advance the whole system by one PPU cycle.
    pub fn clock(&mut self) {
        self.ppu.clock();

        if self.system_clock_counter % 3 == 0 {
            // The CPU needs &mut Bus while living inside it; take it out for
            // the duration of the tick.
            let mut cpu = std::mem::take(&mut self.cpu);
            cpu.clock(self);
            self.cpu = cpu;
        }

        self.system_clock_counter = self.system_clock_counter.wrapping_add(1);
    }

    /// Power-on / reset: cartridge mapper, CPU (reads the reset vector),
    /// PPU timing, and the clock divider all restart.
    pub fn reset(&mut self) {
        if let Some(cart) = &self.cartridge {
            cart.borrow_mut().reset();
        }

        let mut cpu = std::mem::take(&mut self.cpu);
        cpu.reset(self);
        self.cpu = cpu;

        self.ppu.reset();
        self.system_clock_counter = 0;
    }

    // -------------- Accessors --------------

    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut Cpu {
        &mut self.cpu
    }

    pub fn ppu(&self) -> &Ppu {
        &self.ppu
    }

    pub fn ppu_mut(&mut self) -> &mut Ppu {
        &mut self.ppu
    }

    pub fn clock_count(&self) -> u32 {
        self.system_clock_counter
    }
}

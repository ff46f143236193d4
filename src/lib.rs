/*!
A cycle-stepped NES system core: 6502 CPU, system bus with NTSC 3:1 clock
division, iNES cartridge loading and an extensible mapper family.

The `Bus` is the composition root. Construct one, insert a `Cartridge`,
call `reset()`, then drive everything through `Bus::clock()`:

```no_run
use std::cell::RefCell;
use std::rc::Rc;
use nessix::{Bus, Cartridge};

fn main() -> std::io::Result<()> {
    let cart = Cartridge::from_ines_file("game.nes")?;
    if !cart.is_valid_image() {
        return Ok(());
    }
    let mut bus = Bus::new();
    bus.insert_cartridge(Rc::new(RefCell::new(cart)));
    bus.reset();
    loop {
        bus.clock();
        if bus.ppu_mut().take_frame_complete() {
            break;
        }
    }
    Ok(())
}
```
*/

pub mod bus;
pub mod cartridge;
pub mod cpu;
pub mod mapper;
pub mod mappers;
pub mod ppu;

#[cfg(test)]
pub mod test_utils;

pub use bus::Bus;
pub use cartridge::{Cartridge, CartridgeError};
pub use cpu::{Cpu, Status};
pub use mapper::Mapper;
pub use ppu::Ppu;

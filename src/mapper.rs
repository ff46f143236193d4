/*!
Mapper subsystem: the address-translation trait all cartridge mappers implement.

Purpose:
- Decouple CPU/PPU address translation from the `Cartridge` so additional
  bank-switching schemes can be added without touching Cartridge or Bus.
- A mapper never owns PRG/CHR memory; it only turns a bus address into a
  physical offset into the cartridge's PRG (CPU side) or CHR (PPU side)
  storage, or declines the address entirely.

Integration:
- Cartridge parses the iNES header and instantiates a concrete mapper
  (e.g. `mappers::Nrom`) with its bank counts.
- Cartridge forwards every CPU/PPU access through `*_map_read`/`*_map_write`;
  a `None` answer means the address is unclaimed and the Bus falls through
  to the next region (RAM, PPU registers, or open bus).

This file intentionally avoids dependencies on other modules to keep the
trait minimal and portable.
*/

/// Common interface all cartridge mappers must implement.
///
/// Semantics:
/// - All methods take full, unmasked CPU or PPU bus addresses.
/// - `Some(offset)` claims the address and yields a physical offset into
///   PRG memory (CPU methods) or CHR memory (PPU methods).
/// - `None` declines the address; the caller routes it elsewhere.
/// - `reset()` allows bank registers and similar state to be reinitialized
///   on power/reset; translation-only mappers need not override it.
pub trait Mapper {
    /// Translate a CPU read address into a PRG memory offset.
    fn cpu_map_read(&self, addr: u16) -> Option<u32>;

    /// Translate a CPU write address into a PRG memory offset.
    fn cpu_map_write(&self, addr: u16) -> Option<u32>;

    /// Translate a PPU read address into a CHR memory offset.
    fn ppu_map_read(&self, addr: u16) -> Option<u32>;

    /// Translate a PPU write address into a CHR memory offset.
    fn ppu_map_write(&self, addr: u16) -> Option<u32>;

    /// Reset mapper state (bank registers, etc). No-op for fixed mappers.
    fn reset(&mut self) {}
}

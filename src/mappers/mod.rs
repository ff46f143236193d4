//! Concrete mapper implementations.
//!
//! Each supported iNES mapper id gets its own module implementing
//! `crate::mapper::Mapper`. Adding a mapper means adding a module here and
//! one arm to the factory match in `Cartridge`.

pub mod nrom;

pub use nrom::Nrom;

//! NES mappers for PRG/CHR memory mapping.
//!
//! Only Mapper0 (NROM) is provided; the bus talks to it through the `Mapper` trait.

pub mod mapper;

pub mod mapper0;

//! RiSC-16 target binding: register names, mnemonics, size keywords and
//! instruction widths for the asm-core front-end.

pub mod op;
pub mod reg;

use std::str::FromStr;

use asm_core::error::{Error, Result};
use asm_core::isa::{BlockSize, Isa, ModCode, OpCode, RegCode, ASCII_DATA, NO_DATA};

pub use op::{Mnemonic, W_MAX};

const SIZES: [&str; 3] = [".word", ".dword", ".qword"];

/// The basic addressable unit is the 16-bit word.
pub struct Risc16;

impl Isa for Risc16 {
    fn resolve_size(&self, name: &str) -> Result<BlockSize> {
        SIZES
            .iter()
            .position(|&s| s == name)
            .map(|at| (at + 2) as BlockSize)
            .ok_or_else(|| Error::InvalidSize(name.to_string()))
    }

    fn resolve_register(&self, name: &str) -> Result<RegCode> {
        reg::parse(name)
    }

    fn resolve_modifier(&self, name: &str) -> Result<ModCode> {
        Err(Error::InvalidModifier(name.to_string()))
    }

    // The target defines no instruction modifiers.
    fn is_modifier(&self, _name: &str) -> bool {
        false
    }

    fn resolve_opcode(&self, name: &str) -> Result<OpCode> {
        Mnemonic::from_str(name)
            .map(OpCode::from)
            .map_err(|_| Error::InvalidMnemonic(name.to_string()))
    }

    fn units_per_block(&self, size: BlockSize) -> usize {
        match size {
            NO_DATA => 0,
            ASCII_DATA => 1,
            2 => 1,
            3 => 2,
            4 => 4,
            _ => 0,
        }
    }

    fn units_per_instruction(&self, op: OpCode) -> usize {
        Mnemonic::try_from(op).map_or(0, Mnemonic::width)
    }

    fn size_name(&self, size: BlockSize) -> Option<&'static str> {
        match size {
            ASCII_DATA => Some(".ascii"),
            2..=4 => Some(SIZES[size as usize - 2]),
            _ => None,
        }
    }

    fn register_name(&self, code: RegCode) -> Option<&'static str> {
        reg::format(code)
    }

    fn mnemonic_name(&self, op: OpCode) -> Option<&'static str> {
        Mnemonic::try_from(op).ok().map(<&'static str>::from)
    }

    fn modifier_name(&self, _code: ModCode) -> Option<&'static str> {
        None
    }
}

// ----------------------------------------------------------------------------

//! Retargetable assembler front-end.
//!
//! The pipeline: a [`reader::LineReader`] feeds raw lines to a
//! [`parse::Tokenizer`], which is generic over an [`isa::Isa`] binding. In
//! pass 1 the [`addr::AddressResolver`] and [`symtab::SymbolTable`] track
//! offsets and collect symbols; in pass 2 references resolve to numeric
//! values and [`encode::InstructionWord`] packs them into machine words.

pub mod addr;
pub mod bits;
pub mod encode;
pub mod error;
pub mod isa;
pub mod parse;
pub mod reader;
pub mod scan;
pub mod symtab;

pub use error::{Error, Result};

// ----------------------------------------------------------------------------

/// A minimal ISA used by the unit tests: four one-unit mnemonics, four
/// registers, two modifiers, word/dword/qword sizes.
#[cfg(test)]
pub(crate) mod testing {
    use crate::error::{Error, Result};
    use crate::isa::{BlockSize, Isa, ModCode, OpCode, RegCode, ASCII_DATA, NO_DATA};
    use crate::scan;

    pub struct ToyIsa;

    const MNEMONICS: [&str; 4] = ["addi", "beq", "ld", "mv"];
    const MODIFIERS: [&str; 2] = ["hi", "lo"];
    const SIZES: [&str; 3] = [".word", ".dword", ".qword"];

    impl Isa for ToyIsa {
        fn resolve_size(&self, name: &str) -> Result<BlockSize> {
            SIZES
                .iter()
                .position(|&s| s == name)
                .map(|at| (at + 2) as BlockSize)
                .ok_or_else(|| Error::InvalidSize(name.to_string()))
        }

        fn resolve_register(&self, name: &str) -> Result<RegCode> {
            let code = name
                .strip_prefix('r')
                .filter(|rest| !rest.is_empty() && rest.bytes().all(scan::is_dec_digit))
                .map(|rest| scan::convert_decimal(rest))
                .ok_or_else(|| Error::InvalidRegister(name.to_string()))?;
            if code >= 4 {
                return Err(Error::InvalidRegister(name.to_string()));
            }
            Ok(code as RegCode)
        }

        fn resolve_modifier(&self, name: &str) -> Result<ModCode> {
            MODIFIERS
                .iter()
                .position(|&m| m == name)
                .map(|at| at as ModCode)
                .ok_or_else(|| Error::InvalidModifier(name.to_string()))
        }

        fn is_modifier(&self, name: &str) -> bool {
            MODIFIERS.contains(&name)
        }

        fn resolve_opcode(&self, name: &str) -> Result<OpCode> {
            MNEMONICS
                .iter()
                .position(|&m| m == name)
                .map(|at| at as OpCode)
                .ok_or_else(|| Error::InvalidMnemonic(name.to_string()))
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

        fn units_per_instruction(&self, _op: OpCode) -> usize {
            1
        }

        fn size_name(&self, size: BlockSize) -> Option<&'static str> {
            match size {
                ASCII_DATA => Some(".ascii"),
                2..=4 => Some(SIZES[size as usize - 2]),
                _ => None,
            }
        }

        fn register_name(&self, _code: RegCode) -> Option<&'static str> {
            None
        }

        fn mnemonic_name(&self, op: OpCode) -> Option<&'static str> {
            MNEMONICS.get(op as usize).copied()
        }

        fn modifier_name(&self, code: ModCode) -> Option<&'static str> {
            MODIFIERS.get(code as usize).copied()
        }
    }
}

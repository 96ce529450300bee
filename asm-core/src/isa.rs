//! Trait surface a target ISA must provide to drive the front-end.
//!
//! One concrete type per ISA implements [`Isa`]; the tokeniser, address
//! resolver and symbol table are generic over it. The numeric code types are
//! fixed-width aliases wide enough for any supported target.

use crate::error::Result;

/// Widest immediate or initialiser value the front-end carries.
pub type Value = u64;
/// Code or data address within a translation unit.
pub type Addr = u32;
/// Encoded data-width keyword (`.word`, `.dword`, ...).
pub type BlockSize = u8;
pub type RegCode = u8;
pub type ModCode = u8;
pub type OpCode = u16;
/// Identity of one translation unit within an assembly run.
pub type UnitId = u32;

/// Block size code for symbols that carry no data (jump labels).
pub const NO_DATA: BlockSize = 0;
/// Block size code for ascii data (8-bit characters).
pub const ASCII_DATA: BlockSize = 1;

pub trait Isa {
    /// Encode a size keyword (with its leading `.`).
    fn resolve_size(&self, name: &str) -> Result<BlockSize>;

    /// Encode a register name (without its `%` sigil).
    fn resolve_register(&self, name: &str) -> Result<RegCode>;

    /// Encode an instruction modifier keyword.
    fn resolve_modifier(&self, name: &str) -> Result<ModCode>;

    /// Whether the argument text is a modifier keyword.
    fn is_modifier(&self, name: &str) -> bool;

    /// Encode a mnemonic.
    fn resolve_opcode(&self, name: &str) -> Result<OpCode>;

    /// Basic addressable units occupied by one element of the given size.
    fn units_per_block(&self, size: BlockSize) -> usize;

    /// Basic addressable units occupied by one instruction of the opcode.
    fn units_per_instruction(&self, op: OpCode) -> usize;

    // Reverse lookups, for diagnostics.

    fn size_name(&self, size: BlockSize) -> Option<&'static str>;
    fn register_name(&self, code: RegCode) -> Option<&'static str>;
    fn mnemonic_name(&self, op: OpCode) -> Option<&'static str>;
    fn modifier_name(&self, code: ModCode) -> Option<&'static str>;
}

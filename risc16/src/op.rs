use num_enum::{IntoPrimitive, TryFromPrimitive};
use strum::{Display, EnumString, IntoStaticStr};

use asm_core::encode::Field;
use asm_core::error::{Error, Result};
use asm_core::isa::Value;

use crate::reg;

/// Widest instruction word the target can need.
pub const W_MAX: usize = 16;

// RiSC-16 instruction formats: RRR (add, nand), RRI (addi, lw, sw, beq,
// jalr) and RI (lui). 16-bit words, 3-bit opcode at the top.
pub const F_OPCODE: Field = Field { offset: 13, size: 3 };
pub const F_RA: Field = Field { offset: 10, size: 3 };
pub const F_RB: Field = Field { offset: 7, size: 3 };
pub const F_RC: Field = Field { offset: 0, size: 3 };
pub const F_IMM7: Field = Field { offset: 0, size: 7 };
pub const F_IMM10: Field = Field { offset: 0, size: 10 };

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumString,
    Display,
    IntoStaticStr,
    IntoPrimitive,
    TryFromPrimitive,
)]
#[repr(u16)]
#[strum(serialize_all = "lowercase")]
pub enum Mnemonic {
    Add,
    Addi,
    Nand,
    Lui,
    Lw,
    Sw,
    Beq,
    Jalr,

    // Pseudo-ops, lowered onto the base ISA at emission.
    Movi,
    Push,
    Pop,
    Call,
    Ret,
}

impl Mnemonic {
    pub fn is_pseudo(self) -> bool {
        use Mnemonic::*;
        matches!(self, Movi | Push | Pop | Call | Ret)
    }

    /// Field schedule of a real instruction: the opcode field followed by
    /// one field per operand. Empty for pseudo-ops.
    pub fn fields(self) -> &'static [Field] {
        use Mnemonic::*;
        match self {
            Add | Nand => &[F_OPCODE, F_RA, F_RB, F_RC],
            Addi | Lw | Sw | Beq => &[F_OPCODE, F_RA, F_RB, F_IMM7],
            Lui => &[F_OPCODE, F_RA, F_IMM10],
            Jalr => &[F_OPCODE, F_RA, F_RB],
            _ => &[],
        }
    }

    /// Operand count as written in source.
    pub fn operand_count(self) -> usize {
        use Mnemonic::*;
        match self {
            Add | Nand | Addi | Lw | Sw | Beq => 3,
            Lui | Jalr | Movi => 2,
            Push | Pop | Call => 1,
            Ret => 0,
        }
    }

    /// Machine words occupied, after pseudo-op expansion.
    pub fn width(self) -> usize {
        use Mnemonic::*;
        match self {
            Movi | Push | Pop => 2,
            Call => 3,
            _ => 1,
        }
    }
}

/// One expanded machine word: a real operation and its operand values in
/// schedule order, opcode excluded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineOp {
    pub op: Mnemonic,
    pub operands: Vec<Value>,
}

impl MachineOp {
    fn new(op: Mnemonic, operands: Vec<Value>) -> Self {
        Self { op, operands }
    }
}

/// Lower an operation into real machine words. `movi` splits its immediate
/// into the `lui` top and `addi` bottom; `push`/`pop` move the stack
/// pointer; `call` materialises the target in the scratch register and
/// links through `ra`; `ret` jumps through `ra`.
pub fn expand(op: Mnemonic, args: &[Value]) -> Result<Vec<MachineOp>> {
    use Mnemonic::*;

    if args.len() != op.operand_count() {
        return Err(Error::FieldArityMismatch {
            fields: op.operand_count(),
            values: args.len(),
        });
    }

    let sp = Value::from(reg::SP);
    let ra = Value::from(reg::RA);
    let tmp = Value::from(reg::TMP);

    let words = match op {
        Movi => {
            let (rd, imm) = (args[0], args[1]);
            vec![
                MachineOp::new(Lui, vec![rd, imm >> 6]),
                MachineOp::new(Addi, vec![rd, rd, imm & 0x3F]),
            ]
        }
        Push => vec![
            MachineOp::new(Sw, vec![args[0], sp, 0]),
            MachineOp::new(Addi, vec![sp, sp, 1u64.wrapping_neg()]),
        ],
        Pop => vec![
            MachineOp::new(Addi, vec![sp, sp, 1]),
            MachineOp::new(Lw, vec![args[0], sp, 0]),
        ],
        Call => {
            let target = args[0];
            vec![
                MachineOp::new(Lui, vec![tmp, target >> 6]),
                MachineOp::new(Addi, vec![tmp, tmp, target & 0x3F]),
                MachineOp::new(Jalr, vec![ra, tmp]),
            ]
        }
        Ret => vec![MachineOp::new(Jalr, vec![0, ra])],
        real => vec![MachineOp::new(real, args.to_vec())],
    };
    Ok(words)
}

// ----------------------------------------------------------------------------

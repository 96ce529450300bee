//! Two-pass assembly over translation units.
//!
//! Pass 1 walks every line, collects symbols into the shared table and
//! advances the per-unit address counters. Pass 2 replays the lines,
//! resolves symbol references to numeric values and packs each instruction
//! into machine words.

pub mod diag;

use asm_core::addr::AddressResolver;
use asm_core::encode::InstructionWord;
use asm_core::isa::{Addr, UnitId, Value};
use asm_core::parse::{InstructionToken, Token, Tokenizer};
use asm_core::reader::LineReader;
use asm_core::symtab::SymbolTable;
use asm_core::Error;

use risc16::{op, Mnemonic, Risc16};

use diag::Diagnostic;

// ----------------------------------------------------------------------------
// Translation units
// ----------------------------------------------------------------------------

/// One source file, read once and replayed by both passes.
pub struct Unit {
    pub id: UnitId,
    pub path: String,
    pub lines: Vec<String>,
}

impl Unit {
    /// Read a unit through the line reader (buffered, case-normalised).
    pub fn load(id: UnitId, path: &str) -> Result<Self, Diagnostic> {
        let mut reader = LineReader::open(path).map_err(|err| Diagnostic::file(path, err))?;
        let mut lines = Vec::new();
        while !reader.eof() {
            match reader.read() {
                Ok(line) => lines.push(line),
                Err(err) => return Err(Diagnostic::at(path, reader.id().1 + 1, "", err)),
            }
        }
        Ok(Self {
            id,
            path: path.to_string(),
            lines,
        })
    }

    /// Assemble from in-memory text. Lines are taken as the reader would
    /// deliver them (already case-normalised).
    pub fn from_text(id: UnitId, path: &str, text: &str) -> Self {
        Self {
            id,
            path: path.to_string(),
            lines: text.lines().map(str::to_string).collect(),
        }
    }
}

/// One encoded source line of a unit.
#[derive(Debug)]
pub struct EncodedLine {
    /// 1-based source line.
    pub line_no: usize,
    /// Code offset of the first word, within the unit.
    pub offset: Addr,
    pub words: Vec<u16>,
}

// ----------------------------------------------------------------------------
// Pass 1
// ----------------------------------------------------------------------------

/// Collect symbols from every unit into the table, in unit order. Exports
/// become visible to later units as they are added.
pub fn collect(units: &[Unit], table: &mut SymbolTable) -> Result<(), Diagnostic> {
    let tokenizer = Tokenizer::new(&Risc16);
    for unit in units {
        let mut resolver = AddressResolver::new(&Risc16);
        for (index, line) in unit.lines.iter().enumerate() {
            let located = |err| Diagnostic::at(&unit.path, index + 1, line, err);
            match tokenizer.tokenize(line, true).map_err(located)? {
                Token::Symbol(symbol) => {
                    table.add(unit.id, &symbol, &mut resolver).map_err(located)?;
                }
                Token::Instruction(instr) => resolver.update_instruction(&instr),
                Token::Blank => {}
            }
        }
    }
    Ok(())
}

// ----------------------------------------------------------------------------
// Pass 2
// ----------------------------------------------------------------------------

/// Encode every instruction of one unit against the filled symbol table.
pub fn emit(unit: &Unit, table: &SymbolTable) -> Result<Vec<EncodedLine>, Diagnostic> {
    let tokenizer = Tokenizer::new(&Risc16);
    let mut encoded = Vec::new();
    let mut offset: Addr = 0;

    for (index, line) in unit.lines.iter().enumerate() {
        let located = |err| Diagnostic::at(&unit.path, index + 1, line, err);
        let token = tokenizer.tokenize(line, false).map_err(located)?;
        let Some(instr) = token.instruction() else {
            continue;
        };

        let args = argument_values(instr, table, unit.id).map_err(located)?;
        let mnemonic = Mnemonic::try_from(instr.opcode)
            .map_err(|_| located(Error::InvalidMnemonic(format!("#{}", instr.opcode))))?;

        let mut words = Vec::new();
        for machine_op in op::expand(mnemonic, &args).map_err(located)? {
            let mut word = InstructionWord::new(op::W_MAX);
            let mut values = vec![Value::from(u16::from(machine_op.op))];
            values.extend(&machine_op.operands);
            word.load(machine_op.op.fields(), &values).map_err(located)?;
            words.push(word.value() as u16);
        }

        let width = words.len() as Addr;
        encoded.push(EncodedLine {
            line_no: index + 1,
            offset,
            words,
        });
        offset += width;
    }
    Ok(encoded)
}

/// Merge the classified argument lists back into source order, resolving
/// symbol references through the table.
fn argument_values(
    instr: &InstructionToken,
    table: &SymbolTable,
    unit: UnitId,
) -> asm_core::Result<Vec<Value>> {
    let count = instr
        .register_args
        .iter()
        .map(|(at, _)| at + 1)
        .chain(instr.immediate_args.iter().map(|(at, _)| at + 1))
        .chain(instr.modifier_args.iter().map(|(at, _)| at + 1))
        .chain(instr.symbol_args.iter().map(|(at, _)| at + 1))
        .max()
        .unwrap_or(0);

    let mut args = vec![0; count];
    for (at, code) in &instr.register_args {
        args[*at] = Value::from(*code);
    }
    for (at, value) in &instr.immediate_args {
        args[*at] = *value;
    }
    for (at, code) in &instr.modifier_args {
        args[*at] = Value::from(*code);
    }
    for (at, reference) in &instr.symbol_args {
        args[*at] = table.resolve(&Risc16, unit, reference)?;
    }
    Ok(args)
}

//! Running code- and data-offset counters, advanced once per token in
//! source order.

use crate::bits;
use crate::isa::{Addr, Isa};
use crate::parse::{InstructionToken, SymbolKind, SymbolToken};

pub struct AddressResolver<'i, I: Isa> {
    isa: &'i I,
    code_offset: Addr,
    data_offset: Addr,
}

impl<'i, I: Isa> AddressResolver<'i, I> {
    pub fn new(isa: &'i I) -> Self {
        Self {
            isa,
            code_offset: 0,
            data_offset: 0,
        }
    }

    pub fn code_offset(&self) -> Addr {
        self.code_offset
    }

    pub fn data_offset(&self) -> Addr {
        self.data_offset
    }

    /// Data symbols reserve `units_per_block * element_count` units. Jump
    /// and const symbols consume no space.
    pub fn update_symbol(&mut self, symbol: &SymbolToken) {
        if symbol.kind == SymbolKind::Data {
            let units = self.isa.units_per_block(symbol.block_size);
            let step = (units * symbol.initial_values.len()) as Addr;
            self.data_offset = advance(self.data_offset, step);
        }
    }

    pub fn update_instruction(&mut self, instr: &InstructionToken) {
        let step = self.isa.units_per_instruction(instr.opcode) as Addr;
        self.code_offset = advance(self.code_offset, step);
    }
}

// Counters never move backwards, even when the address space runs out.
fn advance(offset: Addr, step: Addr) -> Addr {
    if bits::add_would_overflow(u64::from(offset), u64::from(step), u64::from(Addr::MAX)) {
        Addr::MAX
    } else {
        offset + step
    }
}

// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::Tokenizer;
    use crate::testing::ToyIsa;

    #[test]
    fn instructions_advance_code() {
        let tokenizer = Tokenizer::new(&ToyIsa);
        let mut resolver = AddressResolver::new(&ToyIsa);

        for line in ["addi $1", "beq x", "ld %r0"] {
            let token = tokenizer.tokenize(line, true).unwrap();
            resolver.update_instruction(token.instruction().unwrap());
        }
        assert_eq!(resolver.code_offset(), 3);
        assert_eq!(resolver.data_offset(), 0);
    }

    #[test]
    fn data_symbols_advance_data() {
        let tokenizer = Tokenizer::new(&ToyIsa);
        let mut resolver = AddressResolver::new(&ToyIsa);

        // .word is one unit per element, .dword two.
        let token = tokenizer.tokenize("a: .data .word [4]", true).unwrap();
        resolver.update_symbol(token.symbol().unwrap());
        assert_eq!(resolver.data_offset(), 4);

        let token = tokenizer.tokenize("b: .data .dword [3]", true).unwrap();
        resolver.update_symbol(token.symbol().unwrap());
        assert_eq!(resolver.data_offset(), 10);
    }

    #[test]
    fn jump_and_const_reserve_nothing() {
        let tokenizer = Tokenizer::new(&ToyIsa);
        let mut resolver = AddressResolver::new(&ToyIsa);

        let token = tokenizer.tokenize("start:", true).unwrap();
        resolver.update_symbol(token.symbol().unwrap());
        let token = tokenizer.tokenize("k: .const .word [1] 5", true).unwrap();
        resolver.update_symbol(token.symbol().unwrap());

        assert_eq!(resolver.code_offset(), 0);
        assert_eq!(resolver.data_offset(), 0);
    }

    #[test]
    fn offsets_are_monotone_over_a_stream() {
        let tokenizer = Tokenizer::new(&ToyIsa);
        let mut resolver = AddressResolver::new(&ToyIsa);
        let mut last_code = 0;
        let mut last_data = 0;

        let source = [
            "start:",
            "addi $1",
            "buf: .data .word [2]",
            "beq start",
            "msg: .data .ascii \"hi\"",
            "ld %r1",
        ];
        for line in source {
            match tokenizer.tokenize(line, true).unwrap() {
                crate::parse::Token::Symbol(sym) => resolver.update_symbol(&sym),
                crate::parse::Token::Instruction(instr) => resolver.update_instruction(&instr),
                crate::parse::Token::Blank => {}
            }
            assert!(resolver.code_offset() >= last_code);
            assert!(resolver.data_offset() >= last_data);
            last_code = resolver.code_offset();
            last_data = resolver.data_offset();
        }
        assert_eq!(last_code, 3);
        assert_eq!(last_data, 5);
    }
}

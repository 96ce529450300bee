//! Per-line tokeniser: classifies a stripped line as blank, symbol
//! definition or instruction, and produces the typed token.

use crate::error::{Error, Result};
use crate::isa::{BlockSize, Isa, ModCode, OpCode, RegCode, Value, ASCII_DATA};
use crate::scan;
use crate::scan::TextScan;

const COMMENT_CHAR: char = ';';
const EXPORT_SWITCH: &str = ".export";
const DATA_SWITCH: &str = ".data";
const CONST_SWITCH: &str = ".const";
const ASCII_SWITCH: &str = ".ascii";

// ----------------------------------------------------------------------------
// Tokens
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SymbolKind {
    #[default]
    Jump,
    Data,
    Const,
}

/// A symbol definition parsed from one line.
#[derive(Debug, Clone, Default)]
pub struct SymbolToken {
    pub name: String,
    pub exported: bool,
    pub kind: SymbolKind,
    /// Zero for jump symbols.
    pub block_size: BlockSize,
    /// Empty for jump symbols; sized to the element count for data; holds
    /// the initialisers for const and ascii kinds.
    pub initial_values: Vec<Value>,
}

/// A subscripted symbol reference `name[p][s]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolRef {
    pub name: String,
    pub primary: usize,
    pub secondary: usize,
}

/// An instruction parsed from one line. Each list pairs the zero-based
/// position in the argument list with the classified value.
#[derive(Debug, Clone, Default)]
pub struct InstructionToken {
    pub opcode: OpCode,
    pub register_args: Vec<(usize, RegCode)>,
    pub immediate_args: Vec<(usize, Value)>,
    pub modifier_args: Vec<(usize, ModCode)>,
    pub symbol_args: Vec<(usize, SymbolRef)>,
}

#[derive(Debug, Clone)]
pub enum Token {
    Blank,
    Symbol(SymbolToken),
    Instruction(InstructionToken),
}

impl Token {
    pub fn is_blank(&self) -> bool {
        matches!(self, Token::Blank)
    }
    pub fn is_symbol(&self) -> bool {
        matches!(self, Token::Symbol(_))
    }
    pub fn is_instruction(&self) -> bool {
        matches!(self, Token::Instruction(_))
    }
    pub fn symbol(&self) -> Option<&SymbolToken> {
        match self {
            Token::Symbol(sym) => Some(sym),
            _ => None,
        }
    }
    pub fn instruction(&self) -> Option<&InstructionToken> {
        match self {
            Token::Instruction(instr) => Some(instr),
            _ => None,
        }
    }
}

// ----------------------------------------------------------------------------
// Tokeniser
// ----------------------------------------------------------------------------

pub struct Tokenizer<'i, I: Isa> {
    isa: &'i I,
}

impl<'i, I: Isa> Tokenizer<'i, I> {
    pub fn new(isa: &'i I) -> Self {
        Self { isa }
    }

    /// Tokenise one raw line. With `full_symbol` unset, a symbol definition
    /// is classified and named but its body is not parsed (pass 2 does not
    /// need it).
    pub fn tokenize(&self, line: &str, full_symbol: bool) -> Result<Token> {
        let stripped = scan::strip_comments_and_whitespace(line, COMMENT_CHAR);
        if stripped.is_empty() {
            return Ok(Token::Blank);
        }
        match find_symbol_separator(stripped)? {
            Some(colon) if full_symbol => Ok(Token::Symbol(self.parse_symbol(stripped, colon)?)),
            Some(colon) => {
                let name = scan::strip_whitespace(&stripped[..colon]).to_string();
                Ok(Token::Symbol(SymbolToken {
                    name,
                    ..SymbolToken::default()
                }))
            }
            None => Ok(Token::Instruction(self.parse_instruction(stripped)?)),
        }
    }

    // ------------------------------------------------------------------
    // Instructions
    // ------------------------------------------------------------------

    fn parse_instruction(&self, stripped: &str) -> Result<InstructionToken> {
        let pieces = scan::split_on_delimiters(stripped, &[' ', ',']);
        let mut token = InstructionToken {
            opcode: self.isa.resolve_opcode(pieces[0])?,
            ..InstructionToken::default()
        };

        for (index, piece) in pieces[1..].iter().enumerate() {
            let arg = scan::strip_whitespace(piece);
            if arg.is_empty() {
                return Err(Error::UnexpectedEnd("empty instruction argument"));
            }
            let bytes = arg.as_bytes();
            if bytes[0] == b'%' {
                token
                    .register_args
                    .push((index, self.isa.resolve_register(&arg[1..])?));
            } else if bytes[0] == b'$' {
                token
                    .immediate_args
                    .push((index, scan::convert_number(&arg[1..])?));
            } else if bytes[0] == b'\'' && bytes[bytes.len() - 1] == b'\'' && arg.len() > 2 {
                let value = if arg.len() == 3 {
                    bytes[1] as Value
                } else {
                    scan::convert_escape(&arg[1..arg.len() - 1])? as Value
                };
                token.immediate_args.push((index, value));
            } else if self.isa.is_modifier(arg) {
                token
                    .modifier_args
                    .push((index, self.isa.resolve_modifier(arg)?));
            } else {
                token.symbol_args.push((index, parse_symbol_ref(arg)?));
            }
        }
        Ok(token)
    }

    // ------------------------------------------------------------------
    // Symbol definitions
    // ------------------------------------------------------------------

    fn parse_symbol(&self, stripped: &str, colon: usize) -> Result<SymbolToken> {
        let name = scan::strip_whitespace(&stripped[..colon]);
        validate_symbol_name(name)?;

        let mut token = SymbolToken {
            name: name.to_string(),
            ..SymbolToken::default()
        };

        let mut cursor = scan::advance_over_whitespace(stripped, colon + 1);

        if exact_substr(stripped, EXPORT_SWITCH, cursor) {
            token.exported = true;
            cursor = scan::advance_over_whitespace(stripped, cursor + EXPORT_SWITCH.len());
        }

        if cursor >= stripped.len() {
            token.kind = SymbolKind::Jump;
            return Ok(token);
        }

        if exact_substr(stripped, DATA_SWITCH, cursor) {
            token.kind = SymbolKind::Data;
            cursor = scan::advance_over_whitespace(stripped, cursor + DATA_SWITCH.len());
        } else if exact_substr(stripped, CONST_SWITCH, cursor) {
            token.kind = SymbolKind::Const;
            cursor = scan::advance_over_whitespace(stripped, cursor + CONST_SWITCH.len());
        } else {
            return Err(Error::MalformedSymbolDefinition(
                "expected `.data` or `.const` after the symbol name",
            ));
        }

        if cursor >= stripped.len() {
            return Err(Error::MalformedSymbolDefinition(
                "data and const symbols need a size keyword",
            ));
        }

        if exact_substr(stripped, ASCII_SWITCH, cursor) {
            token.block_size = ASCII_DATA;
            cursor = scan::advance_over_whitespace(stripped, cursor + ASCII_SWITCH.len());
        } else if stripped.as_bytes()[cursor] == b'.' {
            let end = stripped[cursor..]
                .find(|c: char| c.is_ascii() && scan::WHITESPACE.contains(&(c as u8)))
                .map(|at| cursor + at)
                .unwrap_or(stripped.len());
            token.block_size = self.isa.resolve_size(&stripped[cursor..end])?;
            cursor = scan::advance_over_whitespace(stripped, end);
        } else {
            return Err(Error::MalformedSymbolDefinition(
                "size keyword must begin with `.`",
            ));
        }

        if token.block_size != ASCII_DATA {
            cursor = parse_element_count(stripped, cursor, &mut token)?;
        }

        if cursor >= stripped.len() {
            if token.kind == SymbolKind::Const {
                return Err(Error::MalformedSymbolDefinition(
                    "const symbols need initial values",
                ));
            }
            if token.block_size == ASCII_DATA {
                return Err(Error::MalformedSymbolDefinition(
                    "ascii data needs an initial string",
                ));
            }
            return Ok(token);
        }

        if token.block_size != ASCII_DATA {
            let pieces = scan::split_on_delimiters(&stripped[cursor..], &[',']);
            let filled = token.initial_values.len().min(pieces.len());
            for (slot, piece) in token.initial_values[..filled].iter_mut().zip(&pieces) {
                *slot = scan::convert_number(scan::strip_whitespace(piece))?;
            }
        } else {
            if stripped.as_bytes()[cursor] != b'"'
                || !stripped.ends_with('"')
                || cursor + 1 >= stripped.len()
            {
                return Err(Error::MalformedSymbolDefinition(
                    "ascii initialiser must be a double-quoted string",
                ));
            }
            let text = &stripped[cursor + 1..stripped.len() - 1];
            let mut chars = TextScan::new(text);
            while !chars.at_end() {
                let (ch, _) = chars.next_char()?;
                token.initial_values.push(ch as Value);
            }
            token.initial_values.push(0);
        }

        Ok(token)
    }
}

fn parse_element_count(stripped: &str, cursor: usize, token: &mut SymbolToken) -> Result<usize> {
    if cursor >= stripped.len() || stripped.as_bytes()[cursor] != b'[' {
        return Err(Error::MalformedSymbolDefinition(
            "element count must follow the size keyword inside `[]`",
        ));
    }
    let start = scan::advance_over_whitespace(stripped, cursor + 1);
    let end = stripped[start..]
        .find(']')
        .map(|at| start + at)
        .ok_or(Error::MalformedSymbolDefinition("expected `]`"))?;
    let count = scan::convert_number(&stripped[start..end])? as usize;
    token.initial_values = vec![0; count];
    Ok(scan::advance_over_whitespace(stripped, end + 1))
}

// ----------------------------------------------------------------------------
// Helpers
// ----------------------------------------------------------------------------

/// Position of the `:` that makes the line a symbol definition, found with a
/// quote-aware scan so separators inside string and character literals do
/// not count.
fn find_symbol_separator(stripped: &str) -> Result<Option<usize>> {
    let mut chars = TextScan::new(stripped);
    while !chars.at_end() {
        let before = chars.pos();
        match chars.next_skip_quoted()? {
            Some((b':', _)) => return Ok(Some(before)),
            Some(_) => {}
            None => return Ok(None),
        }
    }
    Ok(None)
}

/// First character must not be a decimal digit or `@`; every character must
/// be alphanumeric, `_` or `@`.
fn validate_symbol_name(name: &str) -> Result<()> {
    let invalid = || Error::InvalidSymbolName(name.to_string());
    let bytes = name.as_bytes();
    match bytes.first() {
        None => return Err(invalid()),
        Some(&first) if scan::is_dec_digit(first) || first == b'@' => return Err(invalid()),
        Some(_) => {}
    }
    if !bytes
        .iter()
        .all(|&b| b.is_ascii_alphanumeric() || b == b'_' || b == b'@')
    {
        return Err(invalid());
    }
    Ok(())
}

fn exact_substr(root: &str, check: &str, offset: usize) -> bool {
    if offset >= root.len() {
        return false;
    }
    root[offset..].starts_with(check)
}

/// Parse `name`, `name[p]` or `name[p][s]`. Missing indices default to 0.
fn parse_symbol_ref(arg: &str) -> Result<SymbolRef> {
    let Some(open) = arg.find('[') else {
        return Ok(SymbolRef {
            name: arg.to_string(),
            primary: 0,
            secondary: 0,
        });
    };

    let name = arg[..open].to_string();
    let close = arg[open + 1..]
        .find(']')
        .map(|at| open + 1 + at)
        .ok_or(Error::UnexpectedEnd("unterminated symbol subscript"))?;
    let primary = scan::convert_number(&arg[open + 1..close])? as usize;

    let mut secondary = 0;
    let after = scan::advance_over_whitespace(arg, close + 1);
    if after < arg.len() {
        if arg.as_bytes()[after] != b'[' || !arg.ends_with(']') {
            return Err(Error::InvalidSymbolName(arg.to_string()));
        }
        secondary = scan::convert_number(&arg[after + 1..arg.len() - 1])? as usize;
    }

    Ok(SymbolRef {
        name,
        primary,
        secondary,
    })
}

// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ToyIsa;

    fn tokenize(line: &str) -> Result<Token> {
        Tokenizer::new(&ToyIsa).tokenize(line, true)
    }

    #[test]
    fn blank_lines() {
        assert!(tokenize("").unwrap().is_blank());
        assert!(tokenize("   \t").unwrap().is_blank());
        assert!(tokenize("; comment only").unwrap().is_blank());
    }

    #[test]
    fn classifies_immediates() {
        let token = tokenize("addi $0xff, $0b1010, $-1").unwrap();
        let instr = token.instruction().unwrap();
        assert_eq!(
            instr.immediate_args,
            vec![(0, 255), (1, 10), (2, u64::MAX)]
        );
    }

    #[test]
    fn classifies_registers_and_modifiers() {
        let token = tokenize("addi %r1, hi, $2").unwrap();
        let instr = token.instruction().unwrap();
        assert_eq!(instr.register_args, vec![(0, 1)]);
        assert_eq!(instr.modifier_args, vec![(1, 0)]);
        assert_eq!(instr.immediate_args, vec![(2, 2)]);
    }

    #[test]
    fn classifies_character_literals() {
        let token = tokenize("addi 'a', '\\n', '\\65'").unwrap();
        let instr = token.instruction().unwrap();
        assert_eq!(
            instr.immediate_args,
            vec![(0, b'a' as u64), (1, b'\n' as u64), (2, 65)]
        );
    }

    #[test]
    fn classifies_symbol_references() {
        let token = tokenize("beq loop, buf[2], tbl[1][3]").unwrap();
        let instr = token.instruction().unwrap();
        assert_eq!(instr.symbol_args.len(), 3);
        assert_eq!(
            instr.symbol_args[0],
            (
                0,
                SymbolRef {
                    name: "loop".into(),
                    primary: 0,
                    secondary: 0
                }
            )
        );
        assert_eq!(instr.symbol_args[1].1.primary, 2);
        assert_eq!(instr.symbol_args[2].1.primary, 1);
        assert_eq!(instr.symbol_args[2].1.secondary, 3);
    }

    #[test]
    fn rejects_bad_symbol_references() {
        assert!(tokenize("beq buf[2").is_err());
        assert!(tokenize("beq buf[]").is_err());
        assert!(tokenize("beq buf[1]x").is_err());
        assert!(tokenize("beq buf[1][2]x").is_err());
    }

    #[test]
    fn rejects_unknown_pieces() {
        assert!(matches!(tokenize("frobnicate $1"), Err(Error::InvalidMnemonic(_))));
        assert!(matches!(tokenize("addi %r9"), Err(Error::InvalidRegister(_))));
        assert!(matches!(tokenize("addi $zz"), Err(Error::InvalidLiteral(_))));
        assert!(matches!(
            tokenize("addi $1, , $2"),
            Err(Error::UnexpectedEnd(_))
        ));
    }

    #[test]
    fn jump_symbols() {
        let token = tokenize("start:").unwrap();
        let sym = token.symbol().unwrap();
        assert_eq!(sym.name, "start");
        assert_eq!(sym.kind, SymbolKind::Jump);
        assert!(!sym.exported);
        assert!(sym.initial_values.is_empty());

        let token = tokenize("entry: .export").unwrap();
        let sym = token.symbol().unwrap();
        assert!(sym.exported);
        assert_eq!(sym.kind, SymbolKind::Jump);
    }

    #[test]
    fn separator_inside_quotes_is_ignored() {
        let token = tokenize("addi ':'").unwrap();
        assert!(token.is_instruction());

        let token = tokenize("msg: .data .ascii \"a:b\"").unwrap();
        assert!(token.is_symbol());
    }

    #[test]
    fn data_symbols_pad_and_truncate() {
        let token = tokenize("buf: .data .word [4] 1,2,3").unwrap();
        let sym = token.symbol().unwrap();
        assert_eq!(sym.kind, SymbolKind::Data);
        assert_eq!(sym.initial_values, vec![1, 2, 3, 0]);

        let token = tokenize("buf: .data .word [2] 1,2,3,4").unwrap();
        assert_eq!(token.symbol().unwrap().initial_values, vec![1, 2]);

        let token = tokenize("buf: .data .word [2]").unwrap();
        assert_eq!(token.symbol().unwrap().initial_values, vec![0, 0]);
    }

    #[test]
    fn ascii_symbols_decode_and_terminate() {
        let token = tokenize("msg: .data .ascii \"ab\\n\"").unwrap();
        let sym = token.symbol().unwrap();
        assert_eq!(sym.block_size, ASCII_DATA);
        assert_eq!(sym.initial_values, vec![0x61, 0x62, 0x0A, 0x00]);

        let token = tokenize("empty: .data .ascii \"\"").unwrap();
        assert_eq!(token.symbol().unwrap().initial_values, vec![0]);
    }

    #[test]
    fn const_symbols() {
        let token = tokenize("k: .const .dword [1] 0xAABBCCDD").unwrap();
        let sym = token.symbol().unwrap();
        assert_eq!(sym.kind, SymbolKind::Const);
        assert_eq!(sym.initial_values, vec![0xAABB_CCDD]);
    }

    #[test]
    fn exported_data() {
        let token = tokenize("tbl: .export .data .word [2] 7").unwrap();
        let sym = token.symbol().unwrap();
        assert!(sym.exported);
        assert_eq!(sym.initial_values, vec![7, 0]);
    }

    #[test]
    fn rejects_malformed_definitions() {
        assert!(matches!(
            tokenize("1bad:"),
            Err(Error::InvalidSymbolName(_))
        ));
        assert!(matches!(
            tokenize("@bad:"),
            Err(Error::InvalidSymbolName(_))
        ));
        assert!(matches!(
            tokenize("bad-name:"),
            Err(Error::InvalidSymbolName(_))
        ));
        assert!(matches!(
            tokenize("x: .bogus"),
            Err(Error::MalformedSymbolDefinition(_))
        ));
        assert!(matches!(
            tokenize("x: .data"),
            Err(Error::MalformedSymbolDefinition(_))
        ));
        assert!(matches!(
            tokenize("x: .data word"),
            Err(Error::MalformedSymbolDefinition(_))
        ));
        assert!(matches!(
            tokenize("x: .data .nosuch [1]"),
            Err(Error::InvalidSize(_))
        ));
        assert!(matches!(
            tokenize("x: .data .word 1,2"),
            Err(Error::MalformedSymbolDefinition(_))
        ));
        assert!(matches!(
            tokenize("x: .data .word [2"),
            Err(Error::MalformedSymbolDefinition(_))
        ));
        assert!(matches!(
            tokenize("x: .const .word [1]"),
            Err(Error::MalformedSymbolDefinition(_))
        ));
        assert!(matches!(
            tokenize("x: .data .ascii"),
            Err(Error::MalformedSymbolDefinition(_))
        ));
        assert!(matches!(
            tokenize("x: .data .ascii notquoted"),
            Err(Error::MalformedSymbolDefinition(_))
        ));
    }

    #[test]
    fn symbol_bodies_can_be_skipped() {
        let tokenizer = Tokenizer::new(&ToyIsa);
        // The body is malformed, but pass 2 only needs the classification.
        let token = tokenizer.tokenize("x: .data", false).unwrap();
        assert!(token.is_symbol());
        assert_eq!(token.symbol().unwrap().name, "x");
    }
}

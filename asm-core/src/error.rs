use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid number literal: `{0}`")]
    InvalidLiteral(String),

    #[error("Invalid escape sequence: `{0}`")]
    InvalidEscape(String),

    #[error("Unknown register: `{0}`")]
    InvalidRegister(String),

    #[error("Unknown mnemonic: `{0}`")]
    InvalidMnemonic(String),

    #[error("Unknown modifier: `{0}`")]
    InvalidModifier(String),

    #[error("Unknown size keyword: `{0}`")]
    InvalidSize(String),

    #[error("Invalid symbol name: `{0}`")]
    InvalidSymbolName(String),

    #[error("Malformed symbol definition: {0}")]
    MalformedSymbolDefinition(&'static str),

    #[error("Re-defined symbol: `{0}`")]
    SymbolRedefined(String),

    #[error("Exported symbol collides with existing name: `{0}`")]
    ExportCollision(String),

    #[error("Unknown symbol: `{0}`")]
    UnknownSymbol(String),

    #[error("Subscript {index} out of range for `{name}` (limit {limit})")]
    IndexOutOfRange {
        name: String,
        index: usize,
        limit: usize,
    },

    #[error("Jump symbol `{0}` may not have non-zero subscripts")]
    JumpSubscriptForbidden(String),

    #[error("Field count {fields} does not match value count {values}")]
    FieldArityMismatch { fields: usize, values: usize },

    #[error("Not a regular file: {0}")]
    NotAFile(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unexpected end of input: {0}")]
    UnexpectedEnd(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;

use bimap::BiMap;
use once_cell::sync::Lazy;

use asm_core::error::{Error, Result};
use asm_core::isa::RegCode;
use asm_core::scan;

/// Stack pointer by calling convention.
pub const SP: RegCode = 2;
/// Link register by calling convention.
pub const RA: RegCode = 3;
/// Scratch register used by pseudo-op expansion.
pub const TMP: RegCode = 7;

static REG_MAP: Lazy<BiMap<&'static str, RegCode>> = Lazy::new(|| {
    let mut map = BiMap::new();
    map.insert("r0", 0);
    map.insert("r1", 1);
    map.insert("r2", 2);
    map.insert("r3", 3);
    map.insert("r4", 4);
    map.insert("r5", 5);
    map.insert("r6", 6);
    map.insert("r7", 7);
    map
});

/// Calling-convention aliases onto the numbered registers.
const ALIASES: [(&str, RegCode); 5] = [
    ("bp", 1),
    ("sp", SP),
    ("ra", RA),
    ("fa1", 4),
    ("fa2", 5),
];

/// Accepts an alias, `rN`, or a plain numeric code.
pub fn parse(name: &str) -> Result<RegCode> {
    if let Some(&(_, code)) = ALIASES.iter().find(|(alias, _)| *alias == name) {
        return Ok(code);
    }
    if let Some(&code) = REG_MAP.get_by_left(name) {
        return Ok(code);
    }
    if let Some(rest) = name.strip_prefix('r') {
        if !rest.is_empty() && rest.bytes().all(scan::is_dec_digit) {
            return Ok(scan::convert_decimal(rest) as RegCode);
        }
        return Err(Error::InvalidRegister(name.to_string()));
    }
    scan::convert_number(name)
        .map(|value| value as RegCode)
        .map_err(|_| Error::InvalidRegister(name.to_string()))
}

pub fn format(code: RegCode) -> Option<&'static str> {
    REG_MAP.get_by_right(&code).copied()
}

// ----------------------------------------------------------------------------

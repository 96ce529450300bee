//! Symbol table: jump, data and const entries with per-translation-unit
//! visibility and subscripted resolution.

use indexmap::IndexMap;

use crate::addr::AddressResolver;
use crate::error::{Error, Result};
use crate::isa::{Addr, BlockSize, Isa, UnitId, Value};
use crate::parse::{SymbolKind, SymbolRef, SymbolToken};

#[derive(Debug, Clone)]
pub struct Symbol {
    pub unit: UnitId,
    pub name: String,
    pub exported: bool,
    pub place: Placement,
}

#[derive(Debug, Clone)]
pub enum Placement {
    Jump {
        code_offset: Addr,
    },
    Data {
        data_offset: Addr,
        block_size: BlockSize,
        element_count: usize,
    },
    Const {
        block_size: BlockSize,
        initial_values: Vec<Value>,
    },
}

/// Entries keyed by `(unit, name)`, iterated in insertion order.
pub struct SymbolTable {
    entries: IndexMap<(UnitId, String), Symbol>,
    code_base: usize,
    data_base: usize,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
            code_base: 0,
            data_base: 0,
        }
    }

    /// Where the code and data segments live at resolve time.
    pub fn set_base(&mut self, code_base: usize, data_base: usize) {
        self.code_base = code_base;
        self.data_base = data_base;
    }

    pub fn base(&self) -> (usize, usize) {
        (self.code_base, self.data_base)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.entries.values()
    }

    /// Create an entry from a symbol token. Jump and data entries capture
    /// the resolver's current offsets; data entries then advance the data
    /// counter.
    pub fn add<I: Isa>(
        &mut self,
        unit: UnitId,
        token: &SymbolToken,
        resolver: &mut AddressResolver<I>,
    ) -> Result<()> {
        self.check_collision(unit, &token.name, token.exported)?;

        let place = match token.kind {
            SymbolKind::Jump => Placement::Jump {
                code_offset: resolver.code_offset(),
            },
            SymbolKind::Data => {
                let place = Placement::Data {
                    data_offset: resolver.data_offset(),
                    block_size: token.block_size,
                    element_count: token.initial_values.len(),
                };
                resolver.update_symbol(token);
                place
            }
            SymbolKind::Const => Placement::Const {
                block_size: token.block_size,
                initial_values: token.initial_values.clone(),
            },
        };

        self.entries.insert(
            (unit, token.name.clone()),
            Symbol {
                unit,
                name: token.name.clone(),
                exported: token.exported,
                place,
            },
        );
        Ok(())
    }

    fn check_collision(&self, unit: UnitId, name: &str, exported: bool) -> Result<()> {
        for symbol in self.entries.values() {
            if symbol.name == name {
                if symbol.unit == unit {
                    return Err(Error::SymbolRedefined(name.to_string()));
                }
                if symbol.exported || exported {
                    return Err(Error::ExportCollision(name.to_string()));
                }
            }
        }
        Ok(())
    }

    /// A local entry shadows an exported entry of the same name.
    fn find(&self, unit: UnitId, name: &str) -> Option<&Symbol> {
        let mut exported = None;
        for symbol in self.entries.values() {
            if symbol.name == name {
                if symbol.unit == unit {
                    return Some(symbol);
                }
                if symbol.exported && exported.is_none() {
                    exported = Some(symbol);
                }
            }
        }
        exported
    }

    /// Resolve a subscripted reference visible to `unit` to its numeric
    /// value: the code offset for jump symbols, the absolute data address
    /// for data symbols, the addressed sub-unit of the initialiser for
    /// const symbols.
    pub fn resolve<I: Isa>(&self, isa: &I, unit: UnitId, reference: &SymbolRef) -> Result<Value> {
        let symbol = self
            .find(unit, &reference.name)
            .ok_or_else(|| Error::UnknownSymbol(reference.name.clone()))?;

        match &symbol.place {
            Placement::Jump { code_offset } => {
                if reference.primary != 0 || reference.secondary != 0 {
                    return Err(Error::JumpSubscriptForbidden(reference.name.clone()));
                }
                Ok(Value::from(*code_offset))
            }
            Placement::Data {
                data_offset,
                block_size,
                element_count,
            } => {
                let units = isa.units_per_block(*block_size);
                check_subscripts(reference, *element_count, units)?;
                let address = self.data_base
                    + *data_offset as usize
                    + units * reference.primary
                    + reference.secondary;
                Ok(address as Value)
            }
            Placement::Const {
                block_size,
                initial_values,
            } => {
                let units = isa.units_per_block(*block_size);
                check_subscripts(reference, initial_values.len(), units)?;
                let shift = (units * reference.secondary) as u32;
                Ok(initial_values[reference.primary]
                    .checked_shr(shift)
                    .unwrap_or(0))
            }
        }
    }
}

fn check_subscripts(reference: &SymbolRef, element_count: usize, units: usize) -> Result<()> {
    if reference.primary >= element_count {
        return Err(Error::IndexOutOfRange {
            name: reference.name.clone(),
            index: reference.primary,
            limit: element_count,
        });
    }
    if reference.secondary >= units {
        return Err(Error::IndexOutOfRange {
            name: reference.name.clone(),
            index: reference.secondary,
            limit: units,
        });
    }
    Ok(())
}

// ----------------------------------------------------------------------------

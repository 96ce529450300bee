use std::fs::File;
use std::io::Write;

use asm_core::bits;
use asm_core::isa::{Isa, UnitId};
use asm_core::symtab::{Placement, SymbolTable};
use clap::Parser;
use color_print::cprintln;

use rasm::diag::Diagnostic;
use rasm::{collect, emit, EncodedLine, Unit};
use risc16::Risc16;

const HELP_TEMPLATE: &str = "\
{before-help}{bin} {version}
  {author}
  {about}

{usage-heading}
{tab}{usage}

{all-args}{after-help}";

#[derive(Debug, clap::Parser)]
#[clap(author, version, about, help_template = HELP_TEMPLATE)]
/// Two-pass assembler for the RiSC-16 ISA
struct Args {
    /// Input files, one translation unit each
    #[clap(required = true)]
    input: Vec<String>,

    /// Output file
    #[clap(short, long, default_value = "out.bin")]
    output: String,

    /// Base address of the code segment
    #[clap(long, default_value_t = 0)]
    code_base: usize,

    /// Base address of the data segment
    #[clap(long, default_value_t = 0)]
    data_base: usize,

    /// Dump the listing and symbol table
    #[clap(short, long)]
    dump: bool,
}

fn main() {
    let args = Args::parse();
    if let Err(diagnostic) = run(&args) {
        diagnostic.print();
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Diagnostic> {
    println!("1. Read Files and Collect Symbols");
    let mut units = Vec::new();
    for (id, path) in args.input.iter().enumerate() {
        println!("  < {}", path);
        units.push(Unit::load(id as UnitId, path)?);
    }

    let mut table = SymbolTable::new();
    table.set_base(args.code_base, args.data_base);
    collect(&units, &mut table)?;
    println!("  - found #{} symbols", table.len());

    println!("2. Resolve Symbols and Encode");
    let mut image: Vec<u16> = Vec::new();
    let mut listings = Vec::new();
    for unit in &units {
        let encoded = emit(unit, &table)?;
        for line in &encoded {
            image.extend(&line.words);
        }
        listings.push(encoded);
    }

    println!("3. Write Binary");
    println!("  > {}", args.output);
    write_image(&args.output, &image)?;

    if args.dump {
        for (unit, encoded) in units.iter().zip(&listings) {
            dump_listing(unit, encoded);
        }
        dump_symbols(&table);
    }
    Ok(())
}

fn write_image(path: &str, image: &[u16]) -> Result<(), Diagnostic> {
    let mut file = File::create(path).map_err(|err| Diagnostic::file(path, err.into()))?;
    for word in image {
        file.write_all(&word.to_le_bytes())
            .map_err(|err| Diagnostic::file(path, err.into()))?;
    }
    Ok(())
}

fn dump_listing(unit: &Unit, encoded: &[EncodedLine]) {
    cprintln!("<bold>{}</>", unit.path);
    let top = encoded.last().map_or(0, |line| line.offset as u64);
    let digits = (bits::ceil_log2(top).max(1) as usize).div_ceil(4).max(4);
    let mut next = encoded.iter().peekable();
    for (index, line) in unit.lines.iter().enumerate() {
        if let Some(enc) = next.next_if(|enc| enc.line_no == index + 1) {
            let words = enc
                .words
                .iter()
                .map(|w| format!("{w:04x}"))
                .collect::<Vec<_>>()
                .join(" ");
            cprintln!(
                " <blue>{:0>digits$x}</> | <yellow>{:<14}</> | {}",
                enc.offset,
                words,
                line
            );
        } else {
            cprintln!(" {:>digits$} | {:<14} | {}", "", "", line);
        }
    }
}

fn dump_symbols(table: &SymbolTable) {
    cprintln!("<bold>symbols</>");
    for symbol in table.iter() {
        let export = if symbol.exported { ".export" } else { "" };
        match &symbol.place {
            Placement::Jump { code_offset } => {
                cprintln!(
                    "  <green>{:<16}</> jump  {:#06x} {}",
                    symbol.name,
                    code_offset,
                    export
                );
            }
            Placement::Data {
                data_offset,
                block_size,
                element_count,
            } => {
                let size = Risc16.size_name(*block_size).unwrap_or("?");
                cprintln!(
                    "  <cyan>{:<16}</> data  {:#06x} {} [{}] {}",
                    symbol.name,
                    data_offset,
                    size,
                    element_count,
                    export
                );
            }
            Placement::Const {
                block_size,
                initial_values,
            } => {
                let units = Risc16.units_per_block(*block_size);
                let chunks = initial_values
                    .iter()
                    .map(|&value| {
                        bits::split_units(value, 16)[..units.max(1)]
                            .iter()
                            .map(|unit| format!("{unit:04x}"))
                            .collect::<Vec<_>>()
                            .join(".")
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                cprintln!(
                    "  <yellow>{:<16}</> const {} {}",
                    symbol.name,
                    chunks,
                    export
                );
            }
        }
    }
}

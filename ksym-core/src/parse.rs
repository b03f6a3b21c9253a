//! Listing parser, section binder, and filter.

use crate::error::{Error, Result};
use crate::mode::Mode;
use crate::symbol::{RawSymbol, Section, Symbol};

/// Parse an `nm -n` style listing: one non-empty line per symbol, three
/// whitespace-separated fields `address_hex type_char name`.
pub fn parse_listing(text: &str) -> Result<Vec<RawSymbol>> {
    let mut out = Vec::new();

    for (line_no, line) in text.lines().enumerate() {
        if line.is_empty() {
            continue;
        }

        let mut fields = line.split_whitespace();
        let (Some(addr_hex), Some(type_str), Some(name), None) =
            (fields.next(), fields.next(), fields.next(), fields.next())
        else {
            return Err(Error::Listing {
                line_no: line_no + 1,
                line: line.to_string(),
            });
        };

        if type_str.len() != 1 {
            return Err(Error::Listing {
                line_no: line_no + 1,
                line: line.to_string(),
            });
        }

        let address = u64::from_str_radix(addr_hex, 16).map_err(|_| Error::Listing {
            line_no: line_no + 1,
            line: line.to_string(),
        })?;

        out.push(RawSymbol {
            address,
            type_char: type_str.as_bytes()[0],
            name: name.to_string(),
            index: 0, // assigned once early filtering decides what survives
            line_no: line_no + 1,
        });
    }

    Ok(out)
}

const MAPPING_SYMBOL_PREFIXES: [&str; 4] = ["$a.", "$t.", "$d.", "$x."];

fn is_dropped_type(type_char: u8) -> bool {
    matches!(type_char, b'U' | b'a' | b'A' | b'N')
}

/// Runs the per-line drops, binds `.text`/`.init.text` bounds from sentinel
/// symbols, then drops everything outside `.text` (per mode rules), and
/// returns the kept symbols in insertion order with provisional `index`
/// values.
pub fn filter_and_bind(raw: Vec<RawSymbol>, mode: Mode) -> Result<(Vec<Symbol>, Section)> {
    let text_sentinels = mode.text_sentinels();
    let init_text_sentinels = mode.init_text_sentinels();

    let mut text_begin: Option<u64> = None;
    let mut text_end: Option<u64> = None;
    let mut init_text_begin: Option<u64> = None;
    let mut init_text_end: Option<u64> = None;

    let mut kept: Vec<Symbol> = Vec::with_capacity(raw.len());

    for mut sym in raw {
        if is_dropped_type(sym.type_char) {
            continue;
        }

        if MAPPING_SYMBOL_PREFIXES
            .iter()
            .any(|p| sym.name.starts_with(p))
        {
            continue;
        }

        if sym.name.len() > mode.max_symbol_length() {
            let len = sym.name.len();
            return Err(Error::NameTooLong {
                name: sym.name,
                line_no: sym.line_no,
                len,
                max: mode.max_symbol_length(),
            });
        }

        sym.index = kept.len() as u32;

        if sym.name == text_sentinels.begin {
            text_begin = Some(sym.address);
        } else if sym.name == text_sentinels.end {
            text_end = Some(sym.address);
        } else if let Some(its) = init_text_sentinels {
            if sym.name == its.begin {
                init_text_begin = Some(sym.address);
            } else if sym.name == its.end {
                init_text_end = Some(sym.address);
            }
        }

        kept.push(Symbol::from_raw(sym));
    }

    let text = Section {
        begin: text_begin.ok_or(Error::MissingSection { which: ".text" })?,
        end: text_end.ok_or(Error::MissingSection { which: ".text" })?,
    };

    let init_text = init_text_sentinels.map(|its| {
        // Linux kernels always define both bounds together; absence means
        // no init section was present in the listing, which is valid (the
        // section then contains nothing).
        let _ = its;
        Section {
            begin: init_text_begin.unwrap_or(0),
            end: init_text_end.unwrap_or(0),
        }
    });

    kept.retain(|sym| !should_drop(sym, mode, &text, init_text));

    Ok((kept, text))
}

fn should_drop(symbol: &Symbol, mode: Mode, text: &Section, init_text: Option<Section>) -> bool {
    match mode {
        Mode::Default => {
            if mode.is_linker_symbol(&symbol.name) {
                return true;
            }
            !text.contains(symbol.address)
        }
        Mode::Linux => {
            if symbol.name.starts_with("__start_") || symbol.name.starts_with("__stop_") {
                return false;
            }

            if symbol.address == text.end && symbol.name != mode.text_sentinels().end {
                return true;
            }

            let init_text = init_text.expect("linux mode always has init_text bounds");

            if symbol.address == init_text.end
                && symbol.name
                    != mode
                        .init_text_sentinels()
                        .expect("linux mode defines init_text sentinels")
                        .end
            {
                return true;
            }

            if init_text.contains(symbol.address) {
                return false;
            }

            !text.contains(symbol.address)
        }
    }
}

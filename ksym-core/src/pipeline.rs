//! Assembly of the output: the eight-step final pass, independent of
//! which backend is driving the [`Emitter`].

use crate::emit::{array, Emitter, TableId, Value, ValueType};
use crate::error::{Error, Result};
use crate::mode::Mode;
use crate::sort;
use crate::symbol::{Section, Symbol};
use crate::token::TokenTable;
use crate::uleb128;

/// Runs the whole pipeline — address-sort, tokenize, and the eight table
/// emissions — against `emitter`. `symbols` must already have passed
/// `parse::filter_and_bind`; `text` is the bound `.text` section used to
/// compute `SYMBOL_BASE`.
pub fn generate(
    mut symbols: Vec<Symbol>,
    mode: Mode,
    text: Section,
    emitter: &mut dyn Emitter,
) -> Result<()> {
    sort::sort_by_address(&mut symbols, mode);

    let tokens = TokenTable::build(&symbols, mode);

    emitter.emit_scalar(TableId::SymbolCount, Value::U32(symbols.len() as u32));

    emit_symbol_names(&symbols, &tokens, mode, emitter)?;
    emit_token_table(&tokens, emitter)?;

    let first_address = symbols.first().map(|s| s.address).unwrap_or(0);
    emit_symbol_addresses(&symbols, first_address, mode, emitter);

    let base_offset = first_address.wrapping_sub(text.begin) as u32;
    emitter.emit_scalar(TableId::SymbolBase, Value::U32(base_offset));

    sort::sort_by_name(&mut symbols, mode);
    emit_symbol_indices(&symbols, mode, emitter);

    Ok(())
}

fn emit_symbol_names(
    symbols: &[Symbol],
    tokens: &TokenTable,
    mode: Mode,
    emitter: &mut dyn Emitter,
) -> Result<()> {
    let mut byte_offset: u32 = 0;
    let mut markers: Vec<u32> = Vec::new();

    {
        let mut arr = array(emitter, TableId::SymbolNames, ValueType::U8Array);

        for (idx, symbol) in symbols.iter().enumerate() {
            if idx % 256 == 0 {
                markers.push(byte_offset);
            }

            let stream = tokens.tokens(idx);
            if stream.is_empty() {
                return Err(Error::InternalConsistency(
                    "a kept symbol tokenized to an empty stream".to_string(),
                ));
            }

            let canonical = symbol.canonical_name(mode);
            let prefix = uleb128::encode_len_prefix(stream.len(), &canonical)?;

            let mut row = prefix;
            row.extend_from_slice(stream);
            byte_offset += row.len() as u32;

            arr.emit(Value::U8Array(row), Some(canonical.as_ref()));
        }
    }

    let mut arr = array(emitter, TableId::SymbolMarkers, ValueType::U32);
    for marker in markers {
        arr.emit(Value::U32(marker), None);
    }

    Ok(())
}

fn emit_token_table(tokens: &TokenTable, emitter: &mut dyn Emitter) -> Result<()> {
    let mut byte_offset: u32 = 0;
    let mut offsets: Vec<u32> = Vec::with_capacity(256);

    {
        let mut arr = array(emitter, TableId::TokenTable, ValueType::AsciiString);

        for slot in 0u16..256 {
            offsets.push(byte_offset);
            let expanded = tokens.expand(tokens.dict_entry(slot as u8));
            let s = String::from_utf8(expanded)
                .map_err(|_| Error::InternalConsistency("non-ASCII token expansion".to_string()))?;
            byte_offset += s.len() as u32 + 1; // + NUL terminator
            arr.emit(Value::AsciiString(s), None);
        }
    }

    let mut arr = array(emitter, TableId::TokenOffsets, ValueType::U16);
    for offset in offsets {
        let offset: u16 = offset.try_into().map_err(|_| {
            Error::InternalConsistency(format!("token table offset {offset} exceeds u16"))
        })?;
        arr.emit(Value::U16(offset), None);
    }

    Ok(())
}

fn emit_symbol_addresses(
    symbols: &[Symbol],
    first_address: u64,
    mode: Mode,
    emitter: &mut dyn Emitter,
) {
    let mut arr = array(emitter, TableId::SymbolAddresses, ValueType::U32);
    for symbol in symbols {
        let rel = symbol.address.wrapping_sub(first_address) as u32;
        let canonical = symbol.canonical_name(mode);
        arr.emit(Value::U32(rel), Some(canonical.as_ref()));
    }
}

fn emit_symbol_indices(symbols: &[Symbol], mode: Mode, emitter: &mut dyn Emitter) {
    let mut arr = array(emitter, TableId::SymbolIndices, ValueType::U8Array);
    for symbol in symbols {
        let idx = symbol.index;
        let bytes = vec![
            ((idx >> 16) & 0xff) as u8,
            ((idx >> 8) & 0xff) as u8,
            (idx & 0xff) as u8,
        ];
        let canonical = symbol.canonical_name(mode);
        arr.emit(Value::U8Array(bytes), Some(canonical.as_ref()));
    }
}

//! Assembler-directive backend, `kallsyms`-compatible. Byte-for-byte
//! determinism with the reference `kallsyms` pass depends on preserving
//! its exact directive choices and hex-formatting quirks.

use crate::emit::{Emitter, TableId, Value, ValueType};

pub struct GasBackend {
    buf: String,
    /// The table an in-progress array belongs to; the GAS directive prefix
    /// and the `SYMBOL_ADDRESSES` hex-format quirk both key off this, not
    /// just the element type.
    current_array_table: Option<TableId>,
}

impl Default for GasBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl GasBackend {
    pub fn new() -> Self {
        let mut buf = String::new();
        buf.push_str("#include <asm/bitsperlong.h>\n");
        buf.push_str("#if BITS_PER_LONG == 64\n");
        buf.push_str("#define PTR .quad\n");
        buf.push_str("#define ALGN .balign 8\n");
        buf.push_str("#else\n");
        buf.push_str("#define PTR .long\n");
        buf.push_str("#define ALGN .balign 4\n");
        buf.push_str("#endif\n");
        buf.push_str("\t.section .rodata, \"a\"\n");
        GasBackend {
            buf,
            current_array_table: None,
        }
    }

    pub fn finish(self) -> String {
        self.buf
    }

    fn label_name(table: TableId) -> &'static str {
        match table {
            TableId::SymbolCount => "kallsyms_num_syms",
            TableId::SymbolNames => "kallsyms_names",
            TableId::SymbolMarkers => "kallsyms_markers",
            TableId::SymbolAddresses => "kallsyms_offsets",
            TableId::SymbolBase => "kallsyms_relative_base",
            TableId::SymbolIndices => "kallsyms_seqs_of_names",
            TableId::TokenTable => "kallsyms_token_table",
            TableId::TokenOffsets => "kallsyms_token_index",
        }
    }

    fn emit_label(&mut self, table: TableId) {
        let name = Self::label_name(table);
        self.buf.push_str(&format!(".globl {name}\n"));
        self.buf.push_str("\tALGN\n");
        self.buf.push_str(&format!("{name}:\n"));
    }

    fn string_type(elem_type: ValueType) -> &'static str {
        match elem_type {
            ValueType::U8 | ValueType::U8Array => "byte",
            ValueType::U16 | ValueType::U16Array => "short",
            ValueType::U32 => "long",
            ValueType::AsciiString => "asciz",
        }
    }

    fn prologue(table: TableId, elem_type: ValueType) -> String {
        let prefix = match table {
            TableId::SymbolNames | TableId::SymbolIndices => " ",
            _ => "\t",
        };
        format!(".{}{}", Self::string_type(elem_type), prefix)
    }

    /// Matches the reference generator's `%#x` formatting, which special-cases
    /// zero as `0` rather than `0x0`.
    fn hex_fmt(value: u32) -> String {
        if value == 0 {
            "0".to_string()
        } else {
            format!("0x{value:x}")
        }
    }

    fn emit_comment_or_newline(&mut self, comment: Option<&str>) {
        if let Some(comment) = comment {
            self.buf.push_str(&format!("\t/* {comment} */\n"));
        } else {
            self.buf.push('\n');
        }
    }
}

impl Emitter for GasBackend {
    fn emit_scalar(&mut self, table: TableId, value: Value) {
        self.emit_label(table);

        if table == TableId::SymbolBase {
            let Value::U32(v) = value else {
                unreachable!("SYMBOL_BASE is always u32")
            };
            self.buf
                .push_str(&format!("\tPTR\t_text + {}\n\n", Self::hex_fmt(v)));
            return;
        }

        let prologue = Self::prologue(table, value.value_type());
        let data = match &value {
            Value::U8(v) => v.to_string(),
            Value::U16(v) => v.to_string(),
            Value::U32(v) => v.to_string(),
            _ => unreachable!("scalars are only emitted as U8/U16/U32"),
        };
        self.buf.push_str(&format!("\t{prologue}{data}\n\n"));
    }

    fn begin_array(&mut self, table: TableId, _elem_type: ValueType) {
        self.current_array_table = Some(table);
        self.emit_label(table);
    }

    fn emit_array_row(&mut self, elem_type: ValueType, value: &Value, comment: Option<&str>) {
        let table = self
            .current_array_table
            .expect("emit_array_row called outside an open array");
        let prologue = Self::prologue(table, elem_type);
        self.buf.push('\t');
        self.buf.push_str(&prologue);

        match value {
            Value::U8(v) => self.buf.push_str(&v.to_string()),
            Value::U16(v) => self.buf.push_str(&v.to_string()),
            Value::U32(v) => {
                let hex_format = table == TableId::SymbolAddresses;
                let data = if hex_format {
                    Self::hex_fmt(*v)
                } else {
                    v.to_string()
                };
                self.buf.push_str(&data);
            }
            Value::U8Array(items) => {
                let joined = items
                    .iter()
                    .map(|v| format!("0x{v:02x}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                self.buf.push_str(&joined);
            }
            Value::U16Array(items) => {
                let joined = items
                    .iter()
                    .map(|v| format!("0x{v:04x}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                self.buf.push_str(&joined);
            }
            Value::AsciiString(s) => {
                self.buf.push('"');
                self.buf.push_str(s);
                self.buf.push('"');
            }
        }

        self.emit_comment_or_newline(comment);
    }

    fn end_array(&mut self, _table: TableId) {
        self.current_array_table = None;
        self.buf.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit::array;

    #[test]
    fn scalar_count_uses_tab_prologue() {
        let mut backend = GasBackend::new();
        backend.emit_scalar(TableId::SymbolCount, Value::U32(3));
        let out = backend.finish();
        assert!(out.contains(".globl kallsyms_num_syms\n"));
        assert!(out.contains("\t.long\t3\n\n"));
    }

    #[test]
    fn symbol_base_uses_ptr_directive() {
        let mut backend = GasBackend::new();
        backend.emit_scalar(TableId::SymbolBase, Value::U32(0));
        assert!(backend.finish().contains("\tPTR\t_text + 0\n\n"));
    }

    #[test]
    fn symbol_addresses_row_is_hex() {
        let mut backend = GasBackend::new();
        {
            let mut arr = array(&mut backend, TableId::SymbolAddresses, ValueType::U32);
            arr.emit(Value::U32(0x10), Some("foo"));
        }
        let out = backend.finish();
        assert!(out.contains("\t.long\t0x10\t/* foo */\n"));
    }

    #[test]
    fn symbol_names_row_uses_space_prologue() {
        let mut backend = GasBackend::new();
        {
            let mut arr = array(&mut backend, TableId::SymbolNames, ValueType::U8Array);
            arr.emit(Value::U8Array(vec![3, 0x66, 0x6f, 0x6f]), Some("foo"));
        }
        let out = backend.finish();
        assert!(out.contains("\t.byte 0x03, 0x66, 0x6f, 0x6f\t/* foo */\n"));
    }
}

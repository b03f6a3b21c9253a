//! Structured-data backend: emits a header/struct-literal style C source
//! file.

use crate::emit::{Emitter, TableId, Value, ValueType};

pub struct CBackend {
    buf: String,
}

impl Default for CBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CBackend {
    pub fn new() -> Self {
        let mut buf = String::new();
        buf.push_str("#include <common/types.h>\n");
        buf.push_str("#include <symbols.h>\n\n");
        buf.push_str("#include <private/symbols.h>\n\n");
        CBackend { buf }
    }

    pub fn finish(self) -> String {
        self.buf
    }

    fn type_name(elem_type: ValueType) -> &'static str {
        match elem_type {
            ValueType::U8 | ValueType::U8Array => "u8",
            ValueType::U16 | ValueType::U16Array => "u16",
            ValueType::U32 => "u32",
            ValueType::AsciiString => "char",
        }
    }

    fn table_name(table: TableId) -> &'static str {
        match table {
            TableId::SymbolCount => "g_symbol_count",
            TableId::SymbolNames => "g_symbol_compressed_names",
            TableId::SymbolMarkers => "g_symbol_name_offsets",
            TableId::SymbolAddresses => "g_symbol_relative_addresses",
            TableId::SymbolBase => "g_symbol_base",
            TableId::SymbolIndices => "g_symbol_name_index_to_address_index",
            TableId::TokenTable => "g_symbol_token_table",
            TableId::TokenOffsets => "g_symbol_token_offsets",
        }
    }

    fn format_value(value: &Value) -> String {
        match value {
            Value::U8(v) => v.to_string(),
            Value::U16(v) => v.to_string(),
            Value::U32(v) => v.to_string(),
            Value::U8Array(items) => items
                .iter()
                .map(|v| format!("0x{v:02x}"))
                .collect::<Vec<_>>()
                .join(", "),
            Value::U16Array(items) => items
                .iter()
                .map(|v| format!("0x{v:04x}"))
                .collect::<Vec<_>>()
                .join(", "),
            Value::AsciiString(s) => {
                let mut chars: Vec<String> = s.chars().map(|c| format!("'{c}'")).collect();
                chars.push("'\\0'".to_string());
                chars.join(", ")
            }
        }
    }
}

impl Emitter for CBackend {
    fn emit_scalar(&mut self, table: TableId, value: Value) {
        if table == TableId::SymbolBase {
            self.buf.push_str("const ptr_t ");
            self.buf.push_str(Self::table_name(table));
            self.buf.push_str(" = ");
            self.buf.push_str(&Self::format_value(&value));
            self.buf.push_str(" + (ptr_t)g_linker_symbol_text_begin");
            self.buf.push_str(";\n\n");
            return;
        }

        self.buf.push_str("const ");
        self.buf.push_str(Self::type_name(value.value_type()));
        self.buf.push(' ');
        self.buf.push_str(Self::table_name(table));
        self.buf.push_str(" = ");
        self.buf.push_str(&Self::format_value(&value));
        self.buf.push_str(";\n\n");
    }

    fn begin_array(&mut self, table: TableId, elem_type: ValueType) {
        self.buf.push_str("const ");
        self.buf.push_str(Self::type_name(elem_type));
        self.buf.push(' ');
        self.buf.push_str(Self::table_name(table));
        self.buf.push_str("[] = {\n");
    }

    fn emit_array_row(&mut self, _elem_type: ValueType, value: &Value, comment: Option<&str>) {
        self.buf.push_str("    ");
        self.buf.push_str(&Self::format_value(value));
        self.buf.push(',');

        if let Some(comment) = comment {
            self.buf.push_str(" /* ");
            self.buf.push_str(comment);
            self.buf.push_str(" */\n");
        } else {
            self.buf.push('\n');
        }
    }

    fn end_array(&mut self, _table: TableId) {
        self.buf.push_str("};\n\n");
    }
}

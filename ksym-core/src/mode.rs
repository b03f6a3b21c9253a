//! The two operating modes, modeled as a small strategy enum rather than a
//! class hierarchy (see design notes: "Polymorphism over modes").

use std::borrow::Cow;

use crate::symbol::Symbol;

/// Sentinel symbol names that define a section's `[begin, end]` bounds.
#[derive(Debug, Clone, Copy)]
pub struct SectionNames {
    pub begin: &'static str,
    pub end: &'static str,
}

/// Default mode: structured-data backend, plain names, the simpler linker
/// prefix heuristic. Linux mode: assembler backend, type-prefixed canonical
/// names, and the `kallsyms`-compatible linker-symbol/filter heuristics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Default,
    Linux,
}

const LINKER_SYMBOL_PREFIX: &str = "g_linker_symbol_";

impl Mode {
    /// Maximum symbol name length accepted in this mode.
    pub fn max_symbol_length(self) -> usize {
        match self {
            Mode::Default => 127,
            Mode::Linux => 511,
        }
    }

    /// `.text` section sentinel names.
    pub fn text_sentinels(self) -> SectionNames {
        match self {
            Mode::Default => SectionNames {
                begin: "g_linker_symbol_text_begin",
                end: "g_linker_symbol_text_end",
            },
            Mode::Linux => SectionNames {
                begin: "_stext",
                end: "_etext",
            },
        }
    }

    /// `.init.text` sentinel names, only tracked in Linux mode.
    pub fn init_text_sentinels(self) -> Option<SectionNames> {
        match self {
            Mode::Default => None,
            Mode::Linux => Some(SectionNames {
                begin: "_sinittext",
                end: "_einittext",
            }),
        }
    }

    /// The canonical name under which a symbol is stored and searched.
    pub fn canonical_name<'a>(self, name: &'a str, type_char: u8) -> Cow<'a, str> {
        match self {
            Mode::Default => Cow::Borrowed(name),
            Mode::Linux => {
                let mut s = String::with_capacity(name.len() + 1);
                s.push(type_char as char);
                s.push_str(name);
                Cow::Owned(s)
            }
        }
    }

    /// The linker-symbol test, by name.
    pub fn is_linker_symbol(self, name: &str) -> bool {
        match self {
            Mode::Default => name.starts_with(LINKER_SYMBOL_PREFIX),
            Mode::Linux => {
                if name.len() < 8 || !name.starts_with("__") {
                    return false;
                }

                ["__start_", "__stop_", "__end_"]
                    .iter()
                    .any(|p| name.starts_with(p))
                    || ["_start", "_end"].iter().any(|s| name.ends_with(s))
            }
        }
    }

    pub fn is_linker(self, symbol: &Symbol) -> bool {
        self.is_linker_symbol(&symbol.name)
    }

    /// Which output backend this mode drives.
    pub fn backend(self) -> crate::backend::Backend {
        match self {
            Mode::Default => crate::backend::Backend::C,
            Mode::Linux => crate::backend::Backend::Gas,
        }
    }
}

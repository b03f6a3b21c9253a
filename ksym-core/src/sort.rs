//! Address sorter and name sorter.

use std::cmp::Ordering;

use crate::mode::Mode;
use crate::symbol::Symbol;

/// Stable sort by the 5-level address key, then overwrite each symbol's
/// `index` with its position in the sorted array.
pub fn sort_by_address(symbols: &mut [Symbol], mode: Mode) {
    symbols.sort_by(|lhs, rhs| address_key(lhs, rhs, mode));

    for (i, sym) in symbols.iter_mut().enumerate() {
        sym.index = i as u32;
    }
}

fn address_key(lhs: &Symbol, rhs: &Symbol, mode: Mode) -> Ordering {
    lhs.address
        .cmp(&rhs.address)
        // Non-weak before weak.
        .then_with(|| lhs.is_weak().cmp(&rhs.is_weak()))
        // Non-linker before linker.
        .then_with(|| mode.is_linker(lhs).cmp(&mode.is_linker(rhs)))
        // Fewer leading underscores before more.
        .then_with(|| lhs.leading_underscores().cmp(&rhs.leading_underscores()))
        // Original insertion order.
        .then_with(|| lhs.index.cmp(&rhs.index))
}

/// Stable sort by canonical name, tie-broken by address then original
/// insertion index. `index` at this point holds the address-sort position
/// from `sort_by_address`, which is exactly the value later written out as
/// `SYMBOL_INDICES`.
pub fn sort_by_name(symbols: &mut [Symbol], mode: Mode) {
    symbols.sort_by(|lhs, rhs| {
        lhs.canonical_name(mode)
            .cmp(&rhs.canonical_name(mode))
            .then_with(|| lhs.address.cmp(&rhs.address))
            .then_with(|| lhs.index.cmp(&rhs.index))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::RawSymbol;

    fn sym(name: &str, type_char: u8, address: u64, index: u32) -> Symbol {
        Symbol::from_raw(RawSymbol {
            address,
            type_char,
            name: name.to_string(),
            index,
            line_no: 1,
        })
    }

    #[test]
    fn weak_symbol_sorts_after_non_weak_at_same_address() {
        let mut symbols = vec![sym("__end_data", b'W', 0x2000, 0), sym("data_ok", b'T', 0x2000, 1)];
        sort_by_address(&mut symbols, Mode::Default);
        assert_eq!(symbols[0].name, "data_ok");
        assert_eq!(symbols[1].name, "__end_data");
    }

    #[test]
    fn name_sort_breaks_ties_by_address() {
        let mut symbols = vec![sym("dup", b'T', 0x200, 0), sym("dup", b'T', 0x100, 1)];
        sort_by_name(&mut symbols, Mode::Default);
        assert_eq!(symbols[0].address, 0x100);
        assert_eq!(symbols[1].address, 0x200);
    }
}

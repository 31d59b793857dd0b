//! Board registry for front-end discovery.
//!
//! Each board self-registers via [`inventory::submit!`] with a
//! [`BoardEntry`]: its CLI name, ROM set name and a factory. Front-ends look
//! boards up at runtime without a central list.

use nichi_core::core::machine::VideoBoard;

use crate::rom_loader::{RomLoadError, RomSet};

/// Factory building a board from its ROM set.
pub type BoardFactory = fn(&RomSet) -> Result<Box<dyn VideoBoard>, RomLoadError>;

pub struct BoardEntry {
    /// CLI name (e.g. "wiping").
    pub name: &'static str,
    /// ROM set name, used for `<name>.zip` lookup.
    pub rom_name: &'static str,
    /// One-line description shown by `--list`.
    pub description: &'static str,
    pub create: BoardFactory,
}

impl BoardEntry {
    pub const fn new(
        name: &'static str,
        rom_name: &'static str,
        description: &'static str,
        create: BoardFactory,
    ) -> Self {
        Self {
            name,
            rom_name,
            description,
            create,
        }
    }
}

inventory::collect!(BoardEntry);

/// All registered boards, sorted by name.
pub fn all() -> Vec<&'static BoardEntry> {
    let mut entries: Vec<_> = inventory::iter::<BoardEntry>.into_iter().collect();
    entries.sort_by_key(|e| e.name);
    entries
}

/// Look up a board by CLI name (case-insensitive).
pub fn find(name: &str) -> Option<&'static BoardEntry> {
    inventory::iter::<BoardEntry>
        .into_iter()
        .find(|e| e.name.eq_ignore_ascii_case(name))
}

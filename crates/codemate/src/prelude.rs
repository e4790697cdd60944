//! Imports shared by the command modules.

pub use crate::error::Error;

pub use anstream::eprintln;
pub use anstream::println;
pub use color_eyre::eyre::{eyre, OptionExt, Result};
pub use colored::Colorize;

/// Borderless table used for human-readable output.
pub fn new_table() -> prettytable::Table {
    let mut table = prettytable::Table::new();
    table.set_format(
        prettytable::format::FormatBuilder::new()
            .column_separator(' ')
            .padding(0, 2)
            .build(),
    );
    table
}

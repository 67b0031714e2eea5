pub mod import;
pub mod schema;
pub mod stats;

use comfy_table::{presets::UTF8_FULL, Table};

pub(crate) fn table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(header.to_vec());
    table
}

//! Header column resolution shared by the tabular readers.
//!
//! Source files come from several publishers, each with its own header
//! spelling. A [`ColumnSpec`] lists the accepted aliases for one logical
//! column; resolution is case-insensitive and ignores surrounding whitespace
//! and a leading byte-order mark.

use crate::error::{DataError, Result};
use csv::StringRecord;

/// Accepted header spellings for one logical column.
#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    /// Logical name reported in errors
    pub name: &'static str,
    /// Header spellings accepted for this column, in priority order
    pub aliases: &'static [&'static str],
}

impl ColumnSpec {
    /// Create a new column specification.
    pub const fn new(name: &'static str, aliases: &'static [&'static str]) -> Self {
        Self { name, aliases }
    }

    /// Index of the first header cell matching one of the aliases.
    ///
    /// Aliases are tried in order, so an earlier alias wins even when a later
    /// alias appears further left in the header.
    pub fn find(&self, header: &StringRecord) -> Option<usize> {
        self.aliases.iter().find_map(|alias| {
            header
                .iter()
                .position(|cell| normalize_header(cell) == alias.to_ascii_lowercase())
        })
    }
}

fn normalize_header(cell: &str) -> String {
    cell.trim_start_matches('\u{feff}').trim().to_ascii_lowercase()
}

/// Resolve every required column, failing with all missing names at once.
pub fn resolve_required(
    source_name: &str,
    header: &StringRecord,
    specs: &[ColumnSpec],
) -> Result<Vec<usize>> {
    let mut indices = Vec::with_capacity(specs.len());
    let mut missing = Vec::new();

    for spec in specs {
        match spec.find(header) {
            Some(idx) => indices.push(idx),
            None => missing.push(spec.name.to_string()),
        }
    }

    if missing.is_empty() {
        Ok(indices)
    } else {
        Err(DataError::MissingColumns {
            source_name: source_name.to_string(),
            missing,
            header: header.iter().map(str::to_string).collect(),
        })
    }
}

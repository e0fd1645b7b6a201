// Formatting helpers for table cells and headers

use crate::query::{RankedRow, RankedTable};

/// Cell text for a per-section value; blank where the player has no record
pub fn format_count(value: Option<u64>) -> String {
    match value {
        Some(n) => n.to_string(),
        None => "-".to_string(),
    }
}

/// Header cells: Tag, Name, one per section column, Total
pub fn header_cells(table: &RankedTable) -> Vec<String> {
    let mut cells = vec!["Tag".to_string(), "Name".to_string()];
    cells.extend(
        table
            .sections
            .iter()
            .map(|s| format!("{}_{}", s, table.metric.column_suffix())),
    );
    cells.push("Total".to_string());
    cells
}

pub fn row_cells(row: &RankedRow) -> Vec<String> {
    let mut cells = vec![row.tag.clone(), row.name.clone()];
    cells.extend(row.values.iter().map(|v| format_count(*v)));
    cells.push(row.total.to_string());
    cells
}

//! Text rendering for the banner and the tables.

mod banner;
mod table;
mod theme;

pub use banner::render_banner;
pub use theme::{Theme, Tone};

use table::{Cell, Column, Rules, Table};

use crate::error::RenderError;
use crate::report::DisplayRow;

/// Renders the "view all" rows.
pub type SummaryRenderer = fn(&Theme, &[DisplayRow]) -> Result<String, RenderError>;

/// The "view all" table: rules above and below the header and at the bottom.
pub fn summary_table(theme: &Theme, rows: &[DisplayRow]) -> Result<String, RenderError> {
    let table = build(
        [("CATEGORY", Tone::CategoryHeader), ("SPECIFICATION", Tone::ValueHeader)],
        rows,
    )?;
    Ok(table.render(
        theme,
        Rules {
            top: true,
            header: true,
            bottom: true,
        },
    ))
}

/// A detail view's table: only the outer rules.
pub fn detail_table(theme: &Theme, rows: &[DisplayRow]) -> Result<String, RenderError> {
    let table = build(
        [("PROPERTY", Tone::CategoryHeader), ("VALUE", Tone::ValueHeader)],
        rows,
    )?;
    Ok(table.render(
        theme,
        Rules {
            top: true,
            header: false,
            bottom: true,
        },
    ))
}

fn build(headers: [(&str, Tone); 2], rows: &[DisplayRow]) -> Result<Table, RenderError> {
    let mut table = Table::new(
        headers
            .into_iter()
            .map(|(name, tone)| Column::new(name, tone))
            .collect(),
    )?;
    for row in rows {
        let value_tone = if row.highlight { Tone::Highlight } else { Tone::Plain };
        table.push_row(vec![
            Cell::plain(row.category.clone()),
            Cell::toned(row.value.clone(), value_tone),
        ])?;
    }
    Ok(table)
}

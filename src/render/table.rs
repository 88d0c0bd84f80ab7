//! Box tables drawn by `comfy_table`.
//!
//! Cell text is painted line by line before it reaches the table. Widths are
//! measured with the escape codes stripped, so the same rows always produce
//! the same bytes.

use comfy_table::{Cell as TableCell, ContentArrangement, Table as Grid, TableComponent};

use super::theme::{Theme, Tone};
use crate::error::RenderError;

/// Double outer frame, single inner lines, nothing between body rows.
/// Component order follows `TableComponent::iter()`; a space removes the
/// component.
const FRAME: &str = "║║══╟─┼╢│    ╤╧╔╗╚╝";

const TOP_RULE: [TableComponent; 4] = [
    TableComponent::TopBorder,
    TableComponent::TopBorderIntersections,
    TableComponent::TopLeftCorner,
    TableComponent::TopRightCorner,
];
const HEADER_RULE: [TableComponent; 4] = [
    TableComponent::HeaderLines,
    TableComponent::LeftHeaderIntersection,
    TableComponent::MiddleHeaderIntersections,
    TableComponent::RightHeaderIntersection,
];
const BOTTOM_RULE: [TableComponent; 4] = [
    TableComponent::BottomBorder,
    TableComponent::BottomBorderIntersections,
    TableComponent::BottomLeftCorner,
    TableComponent::BottomRightCorner,
];

/// Which horizontal rules a table draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rules {
    pub top: bool,
    pub header: bool,
    pub bottom: bool,
}

impl Rules {
    fn removed(self) -> impl Iterator<Item = TableComponent> {
        [
            (!self.top).then_some(TOP_RULE),
            (!self.header).then_some(HEADER_RULE),
            (!self.bottom).then_some(BOTTOM_RULE),
        ]
        .into_iter()
        .flatten()
        .flatten()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub header: Tone,
}

impl Column {
    pub fn new(name: impl Into<String>, header: Tone) -> Self {
        Self {
            name: name.into(),
            header,
        }
    }
}

/// A cell's text may span several lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub text: String,
    pub tone: Tone,
}

impl Cell {
    pub fn plain(text: impl Into<String>) -> Self {
        Self::toned(text, Tone::Plain)
    }

    pub fn toned(text: impl Into<String>, tone: Tone) -> Self {
        Self {
            text: text.into(),
            tone,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Table {
    columns: Vec<Column>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Result<Self, RenderError> {
        if columns.is_empty() {
            return Err(RenderError::NoColumns);
        }
        Ok(Self {
            columns,
            rows: Vec::new(),
        })
    }

    pub fn push_row(&mut self, cells: Vec<Cell>) -> Result<(), RenderError> {
        if cells.len() != self.columns.len() {
            return Err(RenderError::ShapeMismatch {
                expected: self.columns.len(),
                found: cells.len(),
                row: self.rows.len(),
            });
        }
        self.rows.push(cells);
        Ok(())
    }

    /// Render without a trailing newline.
    pub fn render(&self, theme: &Theme, rules: Rules) -> String {
        let mut grid = Grid::new();
        grid.load_preset(FRAME)
            .set_content_arrangement(ContentArrangement::Disabled);
        for component in rules.removed() {
            grid.remove_style(component);
        }

        grid.set_header(
            self.columns
                .iter()
                .map(|c| painted(theme, &c.name, c.header))
                .collect::<Vec<_>>(),
        );
        for row in &self.rows {
            grid.add_row(
                row.iter()
                    .map(|cell| painted(theme, &cell.text, cell.tone))
                    .collect::<Vec<_>>(),
            );
        }
        grid.to_string()
    }
}

// Each line is painted on its own so no escape sequence spans a line break.
fn painted(theme: &Theme, text: &str, tone: Tone) -> TableCell {
    let lines: Vec<String> = text
        .lines()
        .map(|line| theme.paint(tone, line).to_string())
        .collect();
    TableCell::new(lines.join("\n"))
}

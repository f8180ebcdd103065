//! Report tables printed by the commands

use std::fmt::Display;

use prettytable::format::consts::FORMAT_NO_LINESEP_WITH_TITLE;
use prettytable::{Cell, Row, Table};

/// Bold-titled table whose rows are filled from any displayable values
pub struct ReportTable {
    table: Table,
    columns: usize,
}

impl ReportTable {
    pub fn new(headers: &[&str]) -> Self {
        let mut table = Table::new();
        table.set_format(*FORMAT_NO_LINESEP_WITH_TITLE);
        table.set_titles(Row::new(
            headers.iter().map(|h| Cell::new(h).style_spec("b")).collect(),
        ));
        Self {
            table,
            columns: headers.len(),
        }
    }

    /// Append a row, padding short rows with `-` up to the header width
    pub fn push<I>(&mut self, cells: I)
    where
        I: IntoIterator,
        I::Item: Display,
    {
        let mut row = Row::new(
            cells
                .into_iter()
                .map(|cell| Cell::new(&cell.to_string()))
                .collect(),
        );
        while row.len() < self.columns {
            row.add_cell(Cell::new("-"));
        }
        self.table.add_row(row);
    }

    pub fn print(&self) {
        self.table.printstd();
    }
}

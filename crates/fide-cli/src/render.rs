//! Console rendering of query results

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, modifiers::UTF8_ROUND_CORNERS, Table};
use fide_common::types::ProjectedRow;
use std::io::{self, IsTerminal};

pub const NO_RECORDS: &str = "No records found.";

/// Console output style
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Bordered table
    Table,
    /// Header line followed by one tab-separated line per row
    Plain,
}

impl OutputFormat {
    /// Explicit choice wins; otherwise a table on a terminal, plain when piped
    pub fn resolve(requested: Option<OutputFormat>) -> OutputFormat {
        requested.unwrap_or_else(|| {
            if io::stdout().is_terminal() {
                OutputFormat::Table
            } else {
                OutputFormat::Plain
            }
        })
    }

    pub fn renderer(self) -> Box<dyn Renderer> {
        match self {
            OutputFormat::Table => Box::new(TableRenderer),
            OutputFormat::Plain => Box::new(PlainRenderer),
        }
    }
}

pub trait Renderer {
    /// Render a non-empty result set
    fn render_rows(&self, header: &[&str], rows: &[ProjectedRow]) -> String;

    /// Full console text, including the empty-result message
    fn render(&self, header: &[&str], rows: &[ProjectedRow]) -> String {
        if rows.is_empty() {
            format!("{}\n", NO_RECORDS)
        } else {
            self.render_rows(header, rows)
        }
    }
}

pub struct TableRenderer;

impl Renderer for TableRenderer {
    fn render_rows(&self, header: &[&str], rows: &[ProjectedRow]) -> String {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_header(header.to_vec());

        for row in rows {
            table.add_row(row.iter().map(|value| value.to_string()).collect::<Vec<_>>());
        }

        format!("{}\n", table)
    }
}

pub struct PlainRenderer;

impl Renderer for PlainRenderer {
    fn render_rows(&self, header: &[&str], rows: &[ProjectedRow]) -> String {
        let mut output = header.join("\t");
        output.push('\n');

        for row in rows {
            let line: Vec<String> = row.iter().map(|value| value.to_string()).collect();
            output.push_str(&line.join("\t"));
            output.push('\n');
        }

        output
    }
}

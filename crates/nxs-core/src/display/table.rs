use crate::core::services::known_hosts::KnownHost;
use crate::core::services::types::DataSourceRow;
use crate::utils::text::truncate_text;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table, presets};
use crossterm::terminal;

const EMPTY_RECORD: &str = "-";

struct ColumnWidths {
    name: usize,
    record: usize,
}

pub struct TableDisplay {
    max_width: Option<usize>,
    use_colors: bool,
}

impl TableDisplay {
    pub fn new() -> Self {
        Self {
            max_width: Self::detect_terminal_width(),
            use_colors: atty::is(atty::Stream::Stdout),
        }
    }

    fn detect_terminal_width() -> Option<usize> {
        match terminal::size() {
            Ok((cols, _)) => Some((cols as usize).clamp(40, 200)),
            Err(_) => Some(80),
        }
    }

    pub fn with_max_width(mut self, width: usize) -> Self {
        self.max_width = Some(width);
        self
    }

    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    fn bold_header(&self, text: &str, color: Color) -> Cell {
        if self.use_colors {
            Cell::new(text).add_attribute(Attribute::Bold).fg(color)
        } else {
            Cell::new(text)
        }
    }

    fn colored_cell(&self, text: &str, color: Color) -> Cell {
        if self.use_colors {
            Cell::new(text).fg(color)
        } else {
            Cell::new(text)
        }
    }

    fn new_table(&self, headers: &[&str]) -> Table {
        let mut table = Table::new();
        if self.use_colors {
            table.load_preset(presets::UTF8_FULL);
        } else {
            table.load_preset(presets::ASCII_FULL);
        }
        table.set_content_arrangement(ContentArrangement::Dynamic);
        self.configure_table_width(&mut table);
        let cells: Vec<Cell> = headers
            .iter()
            .map(|h| self.bold_header(h, Color::Cyan))
            .collect();
        table.set_header(cells);
        table
    }

    fn configure_table_width(&self, table: &mut Table) {
        let width = self
            .max_width
            .map(|w| if w > 20 { w - 6 } else { w.max(40) })
            .unwrap_or(80);
        table.set_width(width as u16);
    }

    fn column_widths(&self) -> ColumnWidths {
        match self.max_width.unwrap_or(80) {
            0..=59 => ColumnWidths { name: 15, record: 12 },
            60..=119 => ColumnWidths { name: 25, record: 30 },
            _ => ColumnWidths { name: 40, record: 60 },
        }
    }

    /// `nxsconfig describe` output.
    pub fn render_datasources(&self, rows: &[DataSourceRow]) -> String {
        if rows.is_empty() {
            return "No datasources found.".to_string();
        }
        let with_component = rows.iter().any(|row| !row.component.is_empty());
        let headers: &[&str] = if with_component {
            &["Component", "DataSource", "Type", "Record"]
        } else {
            &["DataSource", "Type", "Record"]
        };
        let mut table = self.new_table(headers);
        let widths = self.column_widths();

        for row in rows {
            let record = if row.record.is_empty() {
                EMPTY_RECORD
            } else {
                row.record.as_str()
            };
            let mut cells = Vec::with_capacity(4);
            if with_component {
                cells.push(self.colored_cell(
                    &truncate_text(&row.component, widths.name),
                    Color::Green,
                ));
            }
            cells.push(Cell::new(truncate_text(&row.datasource, widths.name)));
            cells.push(self.colored_cell(&row.source_type, Color::Yellow));
            cells.push(Cell::new(truncate_text(record, widths.record)));
            table.add_row(cells);
        }
        table.to_string()
    }

    /// `nxsetup set --list-hosts` output.
    pub fn render_known_hosts(&self, hosts: &[KnownHost]) -> String {
        let mut table = self.new_table(&["Host", "Beamline", "Master host", "User", "Database"]);
        for host in hosts {
            table.add_row(vec![
                self.colored_cell(host.host, Color::Green),
                Cell::new(host.beamline),
                Cell::new(host.masterhost),
                Cell::new(host.user),
                Cell::new(host.dbname),
            ]);
        }
        table.to_string()
    }
}

impl Default for TableDisplay {
    fn default() -> Self {
        Self::new()
    }
}

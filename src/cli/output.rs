//! CLI output formatting
//!
//! Colored status lines and simple tables for the `check` report.

use colored::Colorize;

/// Output helper for consistent CLI formatting
pub struct Output;

impl Output {
    /// Print an error message
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Print a warning message
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Print an info message
    pub fn info(message: &str) {
        println!("{} {}", "ℹ".blue(), message);
    }

    /// Print a header
    pub fn header(message: &str) {
        println!("\n{}", message.bold());
    }

    /// Print a key-value pair
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", key.dimmed(), value);
    }

    /// Format an enabled/disabled flag
    pub fn toggle(enabled: bool) -> String {
        if enabled {
            "enabled".green().to_string()
        } else {
            "disabled".red().to_string()
        }
    }

    /// Format an optional value, dimming the placeholder when unset
    pub fn optional(value: Option<&str>) -> String {
        match value {
            Some(value) => value.to_string(),
            None => "(unset)".dimmed().to_string(),
        }
    }
}

/// Table builder for formatted output
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    column_widths: Vec<usize>,
}

impl Table {
    /// Create a new table with headers
    pub fn new(headers: Vec<&str>) -> Self {
        let headers: Vec<String> = headers.into_iter().map(|s| s.to_string()).collect();
        let column_widths = headers.iter().map(|h| h.len()).collect();
        Self {
            headers,
            rows: Vec::new(),
            column_widths,
        }
    }

    /// Add a row to the table
    pub fn add_row(&mut self, row: Vec<&str>) {
        let row: Vec<String> = row.into_iter().map(|s| s.to_string()).collect();
        for (i, cell) in row.iter().enumerate() {
            if i < self.column_widths.len() {
                self.column_widths[i] = self.column_widths[i].max(cell.len());
            }
        }
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render rows as aligned lines, without styling.
    pub fn lines(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .map(|(i, cell)| {
                        let width = self.column_widths.get(i).copied().unwrap_or(cell.len());
                        format!("{:width$}", cell, width = width)
                    })
                    .collect::<Vec<_>>()
                    .join("  ")
                    .trim_end()
                    .to_string()
            })
            .collect()
    }

    /// Print the table
    pub fn print(&self) {
        let header_line: String = self
            .headers
            .iter()
            .enumerate()
            .map(|(i, h)| format!("{:width$}", h, width = self.column_widths[i]))
            .collect::<Vec<_>>()
            .join("  ");
        println!("  {}", header_line.bold());

        let sep_line: String = self
            .column_widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  ");
        println!("  {}", sep_line.dimmed());

        for line in self.lines() {
            println!("  {}", line);
        }
    }
}

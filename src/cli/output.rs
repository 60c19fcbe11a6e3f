// Output formatting for CLI

use std::io::Write;

use serde_json::Value;

use crate::cli::config::OutputFormat;

/// Format and output data
pub struct OutputFormatter {
    format: OutputFormat,
    quiet: bool,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat, quiet: bool) -> Self {
        Self { format, quiet }
    }

    /// Output a report value
    pub fn output(&self, value: &Value, writer: &mut impl Write) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Pretty => writeln!(writer, "{}", serde_json::to_string_pretty(value)?)?,
            OutputFormat::Json => writeln!(writer, "{}", serde_json::to_string(value)?)?,
            OutputFormat::Table => match value {
                Value::Array(rows) => self.output_rows(rows, writer)?,
                _ => self.output_table(value, writer)?,
            },
        }
        Ok(())
    }

    /// Output an object as a two-column table
    fn output_table(&self, value: &Value, writer: &mut impl Write) -> anyhow::Result<()> {
        if let Some(obj) = value.as_object() {
            let max_key_len = obj.keys().map(|k| k.len()).max().unwrap_or(0);

            writeln!(writer, "{}", "=".repeat(max_key_len + 30))?;

            for (key, value) in obj {
                writeln!(writer, "{:<width$} {}", format!("{}:", key), format_value(value), width = max_key_len + 2)?;
            }

            writeln!(writer, "{}", "=".repeat(max_key_len + 30))?;
        }
        Ok(())
    }

    /// Output an array of objects as columns keyed by the first row
    fn output_rows(&self, rows: &[Value], writer: &mut impl Write) -> anyhow::Result<()> {
        let Some(first) = rows.first().and_then(Value::as_object) else {
            return Ok(());
        };
        let columns: Vec<&String> = first.keys().collect();
        let widths: Vec<usize> = columns
            .iter()
            .map(|column| {
                rows.iter()
                    .map(|row| format_value(&row[column.as_str()]).len())
                    .chain(std::iter::once(column.len()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let line = |cells: Vec<String>| {
            cells
                .iter()
                .zip(&widths)
                .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
                .collect::<Vec<_>>()
                .join("  ")
        };

        writeln!(writer, "{}", line(columns.iter().map(|c| c.to_string()).collect()).trim_end())?;
        writeln!(writer, "{}", "-".repeat(widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1)))?;
        for row in rows {
            let cells = columns.iter().map(|c| format_value(&row[c.as_str()])).collect();
            writeln!(writer, "{}", line(cells).trim_end())?;
        }
        Ok(())
    }

    /// Print success message
    pub fn print_success(&self, message: &str) {
        if !self.quiet {
            println!("✓ {}", message);
        }
    }

    /// Print error message
    pub fn print_error(&self, message: &str) {
        eprintln!("✗ {}", message);
    }

    /// Print info message
    pub fn print_info(&self, message: &str) {
        if !self.quiet {
            println!("  {}", message);
        }
    }
}

/// Format a JSON value for display
fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "(null)".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(arr) => {
            if arr.is_empty() {
                "[]".to_string()
            } else {
                format!("[{} items]", arr.len())
            }
        }
        Value::Object(obj) => obj
            .iter()
            .map(|(k, v)| format!("{}={}", k, format_value(v)))
            .collect::<Vec<_>>()
            .join(", "),
    }
}

//! Output formatting for CLI commands.
//!
//! Supports table (human-readable) and JSON output formats.

use std::io::Write;

use pool_proto::Pool;
use serde::Serialize;

use crate::cli::Format;
use crate::error::CliError;

/// Output formatter that handles both table and JSON output.
#[derive(Debug, Clone)]
pub struct OutputFormat {
    format: Format,
}

impl OutputFormat {
    /// Create a new output formatter.
    #[must_use]
    pub const fn new(format: Format) -> Self {
        Self { format }
    }

    /// Write a serializable value to the output.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write<W, T>(&self, writer: &mut W, value: &T) -> Result<(), CliError>
    where
        W: Write,
        T: Serialize + TableDisplay,
    {
        match self.format {
            Format::Json => {
                serde_json::to_writer_pretty(&mut *writer, value)
                    .map_err(|e| CliError::Format(format!("JSON serialization failed: {e}")))?;
                writeln!(writer)?;
            }
            Format::Table => {
                value.write_table(writer)?;
            }
        }
        Ok(())
    }
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::new(Format::Table)
    }
}

/// Trait for types that can be displayed as a table.
pub trait TableDisplay {
    /// Write the value as a human-readable table.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError>;
}

/// One pool as shown to users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolRow {
    /// Pool name.
    pub pool: String,
    /// Slot capacity.
    pub slots: u32,
    /// Description.
    pub description: String,
}

impl From<Pool> for PoolRow {
    fn from(pool: Pool) -> Self {
        Self {
            pool: pool.name,
            slots: pool.slots,
            description: pool.description,
        }
    }
}

/// Pools for display. Serializes as a bare JSON array.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct PoolTable {
    /// Rows in registry order.
    pub pools: Vec<PoolRow>,
}

impl PoolTable {
    /// Build a table from pools.
    #[must_use]
    pub fn new(pools: impl IntoIterator<Item = Pool>) -> Self {
        Self {
            pools: pools.into_iter().map(PoolRow::from).collect(),
        }
    }
}

impl TableDisplay for PoolTable {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        if self.pools.is_empty() {
            writeln!(writer, "No pools found")?;
            return Ok(());
        }

        let name_width = self
            .pools
            .iter()
            .map(|row| row.pool.chars().count())
            .max()
            .unwrap_or(0)
            .clamp(4, 32);

        writeln!(
            writer,
            "{:<name_width$}  {:>6}  {}",
            "POOL", "SLOTS", "DESCRIPTION"
        )?;
        writeln!(writer, "{}", "─".repeat(name_width + 2 + 6 + 2 + 24))?;

        for row in &self.pools {
            writeln!(
                writer,
                "{:<name_width$}  {:>6}  {}",
                truncate(&row.pool, name_width),
                row.slots,
                row.description
            )?;
        }

        writeln!(writer)?;
        writeln!(writer, "Total: {} pool(s)", self.pools.len())?;
        Ok(())
    }
}

/// A one-line command result.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    /// Message text.
    pub message: String,
}

impl Message {
    /// Create a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl TableDisplay for Message {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        writeln!(writer, "{}", self.message)?;
        Ok(())
    }
}

/// Shorten `s` to at most `max_len` characters, marking the cut with `...`.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len > 3 {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{head}...")
    } else {
        s.chars().take(max_len).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PoolTable {
        PoolTable::new([
            Pool::default_pool(),
            Pool::new("foo", 1, "test"),
        ])
    }

    fn render<T: Serialize + TableDisplay>(format: &OutputFormat, value: &T) -> String {
        let mut buf = Vec::new();
        format.write(&mut buf, value).expect("should format");
        String::from_utf8(buf).expect("utf-8")
    }

    #[test]
    fn output_format_default_is_table() {
        let output = render(&OutputFormat::default(), &Message::new("hi"));
        assert_eq!(output, "hi\n");
    }

    #[test]
    fn json_output_ends_with_newline() {
        let output = render(&OutputFormat::new(Format::Json), &Message::new("hi"));
        assert_eq!(output, "{\n  \"message\": \"hi\"\n}\n");
    }

    #[test]
    fn pool_table_output() {
        let fmt = OutputFormat::new(Format::Table);
        let output = render(&fmt, &sample());

        assert!(output.starts_with("POOL"));
        assert!(output.contains("default_pool     128  Default pool"));
        assert!(output.contains("foo"));
        assert!(output.contains("Total: 2 pool(s)"));
    }

    #[test]
    fn pool_table_empty() {
        let fmt = OutputFormat::new(Format::Table);
        let output = render(&fmt, &PoolTable::new([]));
        assert_eq!(output, "No pools found\n");
    }

    #[test]
    fn pool_table_json_is_array_of_rows() {
        let fmt = OutputFormat::new(Format::Json);
        let output = render(&fmt, &sample());

        let value: serde_json::Value = serde_json::from_str(&output).expect("valid json");
        assert_eq!(
            value,
            serde_json::json!([
                {"pool": "default_pool", "slots": 128, "description": "Default pool"},
                {"pool": "foo", "slots": 1, "description": "test"},
            ])
        );
    }

    #[test]
    fn long_pool_names_are_truncated_in_tables() {
        let table = PoolTable::new([Pool::new("p".repeat(40), 1, "")]);
        let output = render(&OutputFormat::default(), &table);
        assert!(output.contains(&format!("{}...", "p".repeat(29))));
    }

    #[test]
    fn message_table_and_json() {
        let msg = Message::new("Pool foo created");
        assert_eq!(render(&OutputFormat::default(), &msg), "Pool foo created\n");

        let json = render(&OutputFormat::new(Format::Json), &msg);
        assert!(json.contains("\"message\": \"Pool foo created\""));
    }

    #[test]
    fn truncate_is_char_aware() {
        assert_eq!(truncate("héllo-wörld", 8), "héllo...");
        assert_eq!(truncate("short", 8), "short");
        assert_eq!(truncate("abcdef", 2), "ab");
    }
}

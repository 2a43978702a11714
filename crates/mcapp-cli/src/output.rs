//! Output formatting for CLI commands.
//!
//! Supports table (human-readable) and JSON output formats.

use std::io::Write;

use mcapp_core::versions::{RevisionEntry, VersionEntry};
use serde::Serialize;

use crate::cli::Format;
use crate::error::CliError;

/// Marker shown in the CURRENT column.
const CURRENT_MARKER: &str = "*";

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
        writer.flush()?;
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

/// Column-aligned text table.
///
/// Every column is as wide as its widest cell; columns are separated by
/// two spaces and the last column is not padded.
#[derive(Debug, Clone, Default)]
pub struct Table {
    headers: Vec<&'static str>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Creates a table with the given headers.
    #[must_use]
    pub fn new(headers: &[&'static str]) -> Self {
        Self {
            headers: headers.to_vec(),
            rows: Vec::new(),
        }
    }

    /// Appends a row. Missing cells render empty.
    pub fn row(&mut self, cells: Vec<String>) {
        self.rows.push(cells);
    }

    /// Writes the header and every row.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        write_row(writer, &widths, &self.headers)?;
        for row in &self.rows {
            let cells: Vec<&str> = (0..widths.len())
                .map(|i| row.get(i).map_or("", String::as_str))
                .collect();
            write_row(writer, &widths, &cells)?;
        }
        Ok(())
    }
}

fn write_row<W: Write>(writer: &mut W, widths: &[usize], cells: &[&str]) -> Result<(), CliError> {
    let last = cells.len().saturating_sub(1);
    let mut line = String::new();
    for (i, (cell, width)) in cells.iter().zip(widths).enumerate() {
        if i == last {
            line.push_str(cell);
        } else {
            line.push_str(&format!("{cell:<width$}  "));
        }
    }
    writeln!(writer, "{}", line.trim_end())?;
    Ok(())
}

/// One multi-cluster app in a listing.
#[derive(Debug, Clone, Serialize)]
pub struct AppRow {
    /// App ID.
    pub id: String,
    /// App name.
    pub name: String,
    /// Server-reported state.
    pub state: String,
    /// Template version.
    pub version: String,
    /// Targets as `cluster:project` names where known.
    pub targets: Vec<String>,
}

/// Listing of multi-cluster apps.
#[derive(Debug, Clone, Serialize)]
pub struct AppList {
    /// Apps in server order.
    pub apps: Vec<AppRow>,
    /// Only print IDs.
    #[serde(skip)]
    pub quiet: bool,
}

impl TableDisplay for AppList {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        if self.quiet {
            for app in &self.apps {
                writeln!(writer, "{}", app.id)?;
            }
            return Ok(());
        }

        let mut table = Table::new(&["NAME", "STATE", "VERSION", "TARGET_PROJECTS"]);
        for app in &self.apps {
            table.row(vec![
                app.name.clone(),
                app.state.clone(),
                app.version.clone(),
                app.targets.join(","),
            ]);
        }
        table.write(writer)
    }
}

/// One template in a listing.
#[derive(Debug, Clone, Serialize)]
pub struct TemplateRow {
    /// Template ID.
    pub id: String,
    /// Template name.
    pub name: String,
    /// Categories, comma separated.
    pub category: String,
}

/// Listing of installable templates.
#[derive(Debug, Clone, Serialize)]
pub struct TemplateList {
    /// Templates in server order.
    pub templates: Vec<TemplateRow>,
}

impl TableDisplay for TemplateList {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        let mut table = Table::new(&["ID", "NAME", "CATEGORY"]);
        for template in &self.templates {
            table.row(vec![
                template.id.clone(),
                template.name.clone(),
                template.category.clone(),
            ]);
        }
        table.write(writer)
    }
}

fn marker(current: bool) -> String {
    if current {
        CURRENT_MARKER.to_string()
    } else {
        String::new()
    }
}

/// An app's revisions, oldest first.
#[derive(Debug, Clone, Serialize)]
pub struct RevisionList {
    /// Sorted revisions.
    pub revisions: Vec<RevisionEntry>,
}

impl TableDisplay for RevisionList {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        let mut table = Table::new(&["CURRENT", "REVISION", "CREATED"]);
        for revision in &self.revisions {
            table.row(vec![
                marker(revision.current),
                revision.name.clone(),
                revision.created_display(),
            ]);
        }
        table.write(writer)
    }
}

/// Template versions, lowest first.
#[derive(Debug, Clone, Serialize)]
pub struct VersionList {
    /// Sorted versions.
    pub versions: Vec<VersionEntry>,
}

impl TableDisplay for VersionList {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        let mut table = Table::new(&["CURRENT", "VERSION"]);
        for version in &self.versions {
            table.row(vec![marker(version.current), version.version.clone()]);
        }
        table.write(writer)
    }
}

/// Revisions and versions of one app.
#[derive(Debug, Clone, Serialize)]
pub struct AppOverview {
    /// Revisions, oldest first.
    #[serde(flatten)]
    pub revisions: RevisionList,
    /// Versions of the app's template.
    #[serde(flatten)]
    pub versions: VersionList,
}

impl TableDisplay for AppOverview {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        self.revisions.write_table(writer)?;
        writeln!(writer)?;
        self.versions.write_table(writer)
    }
}

/// Confirmation printed after a command changes something.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    /// Message text.
    pub message: String,
}

impl Message {
    /// Create a success message.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl TableDisplay for Message {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        writeln!(writer, "✓ {}", self.message)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn render<T: Serialize + TableDisplay>(format: Format, value: &T) -> String {
        let mut buf = Vec::new();
        OutputFormat::new(format).write(&mut buf, value).expect("write");
        String::from_utf8(buf).expect("utf8")
    }

    fn app(id: &str, name: &str, targets: &[&str]) -> AppRow {
        AppRow {
            id: id.into(),
            name: name.into(),
            state: "active".into(),
            version: "1.2.3".into(),
            targets: targets.iter().map(|t| (*t).to_string()).collect(),
        }
    }

    #[test]
    fn output_format_default_is_table() {
        let mut buf = Vec::new();
        OutputFormat::default()
            .write(&mut buf, &Message::success("Deleted cache"))
            .expect("write");
        assert_eq!(String::from_utf8(buf).expect("utf8"), "✓ Deleted cache\n");
    }

    #[test]
    fn table_aligns_columns() {
        let mut table = Table::new(&["ID", "NAME"]);
        table.row(vec!["a-long-id".into(), "x".into()]);
        table.row(vec!["b".into(), "y".into()]);
        let mut buf = Vec::new();
        table.write(&mut buf).expect("write");
        let output = String::from_utf8(buf).expect("utf8");
        assert_eq!(output, "ID         NAME\na-long-id  x\nb          y\n");
    }

    #[test]
    fn app_list_table_output() {
        let list = AppList {
            apps: vec![app("mcapp-1", "cache", &["prod:Default", "c-2:p-9"])],
            quiet: false,
        };
        let output = render(Format::Table, &list);
        assert!(output.starts_with("NAME"));
        assert!(output.contains("TARGET_PROJECTS"));
        assert!(output.contains("prod:Default,c-2:p-9"));
    }

    #[test]
    fn quiet_list_prints_ids_only() {
        let list = AppList {
            apps: vec![app("mcapp-1", "cache", &[]), app("mcapp-2", "web", &[])],
            quiet: true,
        };
        let output = render(Format::Table, &list);
        assert_eq!(output, "mcapp-1\nmcapp-2\n");
    }

    #[test]
    fn app_list_json() {
        let list = AppList {
            apps: vec![app("mcapp-1", "cache", &["prod:Default"])],
            quiet: true,
        };
        let output = render(Format::Json, &list);
        let parsed: serde_json::Value = serde_json::from_str(&output).expect("valid json");
        assert_eq!(parsed["apps"][0]["targets"][0], "prod:Default");
        assert!(parsed.get("quiet").is_none());
    }

    #[test]
    fn overview_separates_tables_with_blank_line() {
        let overview = AppOverview {
            revisions: RevisionList {
                revisions: vec![RevisionEntry {
                    name: "apprevision-1".into(),
                    created: Utc.with_ymd_and_hms(2006, 1, 2, 15, 4, 5).single().expect("time"),
                    current: true,
                }],
            },
            versions: VersionList {
                versions: vec![
                    VersionEntry {
                        version: "1.2.3".into(),
                        current: true,
                    },
                    VersionEntry {
                        version: "1.3.0".into(),
                        current: false,
                    },
                ],
            },
        };
        let output = render(Format::Table, &overview);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "CURRENT  REVISION       CREATED");
        assert_eq!(lines[1], "*        apprevision-1  02 Jan 2006 15:04:05 UTC");
        assert_eq!(lines[2], "");
        assert_eq!(lines[3], "CURRENT  VERSION");
        assert_eq!(lines[4], "*        1.2.3");
        assert_eq!(lines[5], "         1.3.0");
    }

    #[test]
    fn message_json_has_text_only() {
        let output = render(Format::Json, &Message::success("Deleted cache"));
        let parsed: serde_json::Value = serde_json::from_str(&output).expect("valid json");
        assert_eq!(parsed, serde_json::json!({"message": "Deleted cache"}));
    }
}

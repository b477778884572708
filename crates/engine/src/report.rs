use std::{fmt::Write, str::FromStr, time::SystemTime};

use fprop_fs::{StatSnapshot, format_permissions, format_size, format_timestamp};
use fprop_runtime::Configuration;
use serde_json::{Map, Value};

/// Rendered in place of fields the platform does not report.
pub const PLACEHOLDER: &str = "-";

const RULE_WIDTH: usize = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Text,
    Html,
    Json,
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(ReportFormat::Text),
            "html" => Ok(ReportFormat::Html),
            "json" => Ok(ReportFormat::Json),
            other => Err(format!(
                "unknown report format {other:?} (expected text, html or json)"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub label: &'static str,
    pub value: String,
}

/// Read-only table of every stat field for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub title: String,
    pub rows: Vec<ReportRow>,
}

fn opt<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| PLACEHOLDER.to_owned(), |v| v.to_string())
}

fn time(value: Option<SystemTime>, pattern: &str) -> String {
    value.map_or_else(
        || PLACEHOLDER.to_owned(),
        |t| format_timestamp(t, pattern),
    )
}

impl Report {
    pub fn from_snapshot(snap: &StatSnapshot, cfg: &Configuration) -> Self {
        let unit = cfg.size_unit;
        let fmt = cfg.time_format.as_str();
        let name = snap
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| snap.path.display().to_string());

        let rows = [
            ("Path", snap.path.display().to_string()),
            ("File Type", snap.file_type().to_string()),
            ("Device", opt(snap.dev)),
            ("Inode", opt(snap.ino)),
            ("Mode", format!("{:o}", snap.mode)),
            ("Permissions", format_permissions(snap.mode)),
            ("Hard Links", opt(snap.nlink)),
            ("User ID", opt(snap.uid)),
            ("Group ID", opt(snap.gid)),
            ("Represented Device", opt(snap.rdev)),
            ("Size", format_size(u128::from(snap.size), unit)),
            ("Size in Bytes", snap.size.to_string()),
            ("Blocks", opt(snap.blocks)),
            (
                "Allocated Size",
                opt(snap
                    .allocated_bytes()
                    .map(|b| format_size(u128::from(b), unit))),
            ),
            ("I/O Block Size", opt(snap.blksize)),
            ("Access Time", time(snap.atime, fmt)),
            ("Modify Time", time(snap.mtime, fmt)),
            ("Change Time", time(snap.ctime, fmt)),
            ("Birth Time", time(snap.birthtime, fmt)),
        ]
        .into_iter()
        .map(|(label, value)| ReportRow { label, value })
        .collect();

        Self {
            title: format!("File Properties: {name}"),
            rows,
        }
    }

    pub fn value(&self, label: &str) -> Option<&str> {
        self.rows
            .iter()
            .find(|row| row.label == label)
            .map(|row| row.value.as_str())
    }

    pub fn render(&self, format: ReportFormat) -> String {
        match format {
            ReportFormat::Text => self.render_text(),
            ReportFormat::Html => self.render_html(),
            ReportFormat::Json => self.render_json(),
        }
    }

    pub fn render_text(&self) -> String {
        let width = self.rows.iter().map(|r| r.label.len()).max().unwrap_or(0);
        let rule = "*".repeat(RULE_WIDTH);

        let mut out = String::new();
        let _ = writeln!(out, "{rule}");
        let _ = writeln!(out, "{}", self.title);
        let _ = writeln!(out, "{rule}");
        for row in &self.rows {
            let _ = writeln!(out, "{:<width$} : {}", row.label, row.value);
        }
        let _ = writeln!(out, "{rule}");
        out
    }

    /// Standalone page with a two-column table, suitable for a webview.
    pub fn render_html(&self) -> String {
        let mut body = String::new();
        for row in &self.rows {
            let _ = write!(
                body,
                "<tr><td>{}</td><td>{}</td></tr>",
                escape_html(row.label),
                escape_html(&row.value)
            );
        }

        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style type="text/css">
        .html-table {{
            border-collapse: collapse;
            width: 100%;
        }}
        .html-table th, .html-table td {{
            border: 2px double;
            padding: 8px;
            text-align: left;
        }}
    </style>
</head>
<body>
    <table class="html-table"><thead><tr><th>Property</th><th>Value</th></tr></thead><tbody>{body}</tbody></table>
</body>
</html>
"#,
            title = escape_html(&self.title),
        )
    }

    /// `{"title": ..., "properties": {label: value, ...}}`, labels in report order.
    pub fn render_json(&self) -> String {
        let properties: Map<String, Value> = self
            .rows
            .iter()
            .map(|row| (row.label.to_owned(), Value::String(row.value.clone())))
            .collect();

        let mut obj = Map::new();
        obj.insert("title".to_owned(), Value::String(self.title.clone()));
        obj.insert("properties".to_owned(), Value::Object(properties));

        let value = Value::Object(obj);
        serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string())
    }
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;

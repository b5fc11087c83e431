//! Header-first delimited tables.
//!
//! Reads the comma-separated files the pipeline consumes and renders the ones it
//! produces. Quoted fields (`"a, b"`, `"say ""hi"""`) are supported on a single
//! line; columns are found by header name so their order in a file is free.

use crate::error::{PipelineError, Result};
use log::warn;
use std::fs;
use std::path::Path;

/// A parsed input table. Rows keep their 1-based line number for error reporting.
#[derive(Debug, Clone)]
pub struct RawTable {
    pub name: String,
    pub header: Vec<String>,
    pub rows: Vec<RawRow>,
}

#[derive(Debug, Clone)]
pub struct RawRow {
    pub line: usize,
    pub fields: Vec<String>,
}

impl RawTable {
    /// Read and split a file. The first non-blank line is the header.
    pub fn read(name: &str, path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))?;
        Self::parse(name, &text)
    }

    pub fn parse(name: &str, text: &str) -> Result<Self> {
        // Spreadsheet exports often lead with a UTF-8 byte-order mark.
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let mut lines = text
            .lines()
            .enumerate()
            .map(|(idx, line)| (idx + 1, line.trim_end_matches('\r')));

        let header = loop {
            match lines.next() {
                Some((_, line)) if line.trim().is_empty() => continue,
                Some((line_no, line)) => {
                    break split_record(line)
                        .map_err(|msg| PipelineError::schema(name, line_no, msg))?
                        .into_iter()
                        .map(|h| h.trim().to_string())
                        .collect::<Vec<_>>()
                }
                None => return Err(PipelineError::schema(name, 0, "missing header row")),
            }
        };

        let mut rows = Vec::new();
        let mut blank = 0usize;
        for (line_no, line) in lines {
            if line.trim().is_empty() {
                blank += 1;
                continue;
            }
            let fields =
                split_record(line).map_err(|msg| PipelineError::schema(name, line_no, msg))?;
            if fields.len() < header.len() {
                return Err(PipelineError::schema(
                    name,
                    line_no,
                    format!("expected {} fields, found {}", header.len(), fields.len()),
                ));
            }
            rows.push(RawRow {
                line: line_no,
                fields,
            });
        }
        if blank > 0 {
            warn!("Skipped {blank} blank line(s) in {name}");
        }

        Ok(Self {
            name: name.to_string(),
            header,
            rows,
        })
    }

    /// Position of a required column.
    pub fn column(&self, column: &str) -> Result<usize> {
        self.header
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| {
                PipelineError::schema(
                    &self.name,
                    1,
                    format!("missing required column `{column}`"),
                )
            })
    }

    pub fn parse_int(&self, row: &RawRow, idx: usize, column: &str) -> Result<i64> {
        let raw = row.fields[idx].trim();
        raw.parse::<i64>().map_err(|_| {
            PipelineError::schema(
                &self.name,
                row.line,
                format!("{column} `{raw}` is not an integer"),
            )
        })
    }
}

/// Split one line into fields, honouring double quotes.
pub fn split_record(line: &str) -> std::result::Result<Vec<String>, String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut chars = line.chars().peekable();
    let mut quoted = false;

    while let Some(c) = chars.next() {
        match (quoted, c) {
            (true, '"') if chars.peek() == Some(&'"') => {
                chars.next();
                field.push('"');
            }
            (true, '"') => quoted = false,
            (true, c) => field.push(c),
            (false, '"') if field.trim().is_empty() => {
                field.clear();
                quoted = true;
            }
            (false, ',') => fields.push(std::mem::take(&mut field)),
            (false, c) => field.push(c),
        }
    }
    if quoted {
        return Err("unterminated quoted field".to_string());
    }
    fields.push(field);
    Ok(fields)
}

/// Quote a field if it would otherwise be split or misread.
#[must_use]
pub fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Render a header plus rows. The header is always present, even with no rows.
#[must_use]
pub fn render(header: &[&str], rows: &[Vec<String>]) -> String {
    let mut out = header.join(",");
    out.push('\n');
    for row in rows {
        let line: Vec<String> = row.iter().map(|f| escape_field(f)).collect();
        out.push_str(&line.join(","));
        out.push('\n');
    }
    out
}

/// Shortest round-trip form that always carries a decimal point (`75.0`).
#[must_use]
pub fn format_float(value: f64) -> String {
    format!("{value:?}")
}

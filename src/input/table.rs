use std::collections::HashMap;
use std::io::BufRead;

use crate::input::InputError;

/// Rectangular reference population: column name -> raw cells (`None` for absent cells).
#[derive(Debug, Clone, Default)]
pub struct ReferenceTable {
    columns: Vec<String>,
    index: HashMap<String, usize>,
    cells: Vec<Vec<Option<String>>>,
    n_rows: usize,
}

impl ReferenceTable {
    pub fn from_columns(columns: Vec<(String, Vec<Option<String>>)>) -> Self {
        let mut table = ReferenceTable::default();
        for (name, values) in columns {
            if table.index.contains_key(&name) {
                continue;
            }
            table.n_rows = table.n_rows.max(values.len());
            table.index.insert(name.clone(), table.columns.len());
            table.columns.push(name);
            table.cells.push(values);
        }
        let n_rows = table.n_rows;
        for col in &mut table.cells {
            col.resize(n_rows, None);
        }
        table
    }

    pub fn column(&self, name: &str) -> Option<&[Option<String>]> {
        self.index.get(name).map(|&idx| self.cells[idx].as_slice())
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }
}

pub fn parse_delimited<R: BufRead>(
    mut reader: R,
    delimiter: char,
) -> Result<ReferenceTable, InputError> {
    let mut buf = String::new();
    let mut line_no = 0usize;

    let Some(header) = read_record(&mut reader, &mut buf, delimiter, &mut line_no)? else {
        return Err(InputError::Parse("reference table is empty".to_string()));
    };
    if header.iter().all(|h| h.trim().is_empty()) {
        return Err(InputError::Parse("reference table header is empty".to_string()));
    }

    let mut names: Vec<String> = Vec::with_capacity(header.len());
    for name in &header {
        let name = name.trim().to_string();
        if names.contains(&name) {
            tracing::warn!(column = %name, "duplicate column in reference table; keeping first");
        }
        names.push(name);
    }

    let mut columns: Vec<Vec<Option<String>>> = vec![Vec::new(); header.len()];
    let mut truncated_rows = 0usize;

    while let Some(fields) = read_record(&mut reader, &mut buf, delimiter, &mut line_no)? {
        if fields.len() == 1 && fields[0].trim().is_empty() {
            continue;
        }
        if fields.len() > header.len() {
            truncated_rows += 1;
            tracing::debug!(line = line_no, "row wider than header; extra fields dropped");
        }
        for (idx, col) in columns.iter_mut().enumerate() {
            col.push(fields.get(idx).map(|s| s.trim().to_string()));
        }
    }

    if truncated_rows > 0 {
        tracing::warn!(
            rows = truncated_rows,
            "reference rows had more fields than the header; extra fields were dropped"
        );
    }

    Ok(ReferenceTable::from_columns(
        names.into_iter().zip(columns).collect(),
    ))
}

/// Reads one logical record. A quoted field stays open across line breaks until its closing
/// quote; input that ends inside a quoted field is a parse error naming the line it opened on.
fn read_record<R: BufRead>(
    reader: &mut R,
    buf: &mut String,
    delimiter: char,
    line_no: &mut usize,
) -> Result<Option<Vec<String>>, InputError> {
    buf.clear();
    if reader.read_line(buf)? == 0 {
        return Ok(None);
    }
    *line_no += 1;
    let start = *line_no;
    if start == 1 && buf.starts_with('\u{feff}') {
        buf.drain(..'\u{feff}'.len_utf8());
    }

    loop {
        let (fields, open) = split_record(buf.trim_end_matches(['\r', '\n']), delimiter);
        if !open {
            return Ok(Some(fields));
        }
        if reader.read_line(buf)? == 0 {
            return Err(InputError::Parse(format!(
                "unterminated quoted field starting at line {start}"
            )));
        }
        *line_no += 1;
    }
}

/// Splits a record on `delimiter`, honouring double-quoted fields with `""` escapes.
/// The flag is true when the text ends inside an open quoted field.
pub fn split_record(record: &str, delimiter: char) -> (Vec<String>, bool) {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = record.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            if ch == '"' {
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                current.push(ch);
            }
        } else if ch == '"' && current.trim().is_empty() {
            current.clear();
            in_quotes = true;
        } else if ch == delimiter {
            fields.push(std::mem::take(&mut current));
        } else {
            current.push(ch);
        }
    }
    fields.push(current);
    (fields, in_quotes)
}

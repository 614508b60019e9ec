use std::fmt::Display;
use std::io::{Cursor, Read, Seek};
use std::path::Path;

use calamine::{Data, Range, Reader, Xls, Xlsx};

use crate::input::cache::open_maybe_gz;
use crate::input::table::ReferenceTable;
use crate::input::{DatasetFormat, InputError};

/// Reads the first worksheet of an `.xlsx` or `.xls` workbook (optionally gzipped).
/// The first row of the sheet's used range is the header.
pub fn read_spreadsheet(path: &Path, format: DatasetFormat) -> Result<ReferenceTable, InputError> {
    let mut bytes = Vec::new();
    open_maybe_gz(path)?.read_to_end(&mut bytes)?;
    let cursor = Cursor::new(bytes);

    let range = match format {
        DatasetFormat::Xlsx => first_sheet(Xlsx::new(cursor).map_err(spreadsheet_error)?)?,
        DatasetFormat::Xls => first_sheet(Xls::new(cursor).map_err(spreadsheet_error)?)?,
        other => {
            return Err(InputError::InvalidInput(format!(
                "{other:?} is not a spreadsheet format"
            )));
        }
    };
    table_from_range(&range)
}

fn first_sheet<RS, R>(mut workbook: R) -> Result<Range<Data>, InputError>
where
    RS: Read + Seek,
    R: Reader<RS>,
    R::Error: Display,
{
    match workbook.worksheet_range_at(0) {
        Some(range) => range.map_err(spreadsheet_error),
        None => Err(InputError::Parse("workbook has no worksheets".to_string())),
    }
}

fn table_from_range(range: &Range<Data>) -> Result<ReferenceTable, InputError> {
    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Err(InputError::Parse("worksheet is empty".to_string()));
    };

    let mut names: Vec<String> = Vec::with_capacity(header.len());
    for cell in header {
        let name = cell_text(cell).unwrap_or_default();
        if !name.is_empty() && names.contains(&name) {
            tracing::warn!(column = %name, "duplicate column in worksheet; keeping first");
        }
        names.push(name);
    }
    if names.iter().all(String::is_empty) {
        return Err(InputError::Parse("worksheet header is empty".to_string()));
    }

    let mut columns: Vec<Vec<Option<String>>> = vec![Vec::new(); names.len()];
    for row in rows {
        if row.iter().all(|cell| cell_text(cell).is_none()) {
            continue;
        }
        for (idx, col) in columns.iter_mut().enumerate() {
            col.push(row.get(idx).and_then(cell_text));
        }
    }

    Ok(ReferenceTable::from_columns(
        names.into_iter().zip(columns).collect(),
    ))
}

/// Cell text as the delimited reader would see it; empty and error cells are absent.
fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) => Some(s.trim().to_string()),
        Data::Float(v) => Some(v.to_string()),
        Data::Int(v) => Some(v.to_string()),
        other => Some(other.to_string()),
    }
}

fn spreadsheet_error<E: Display>(err: E) -> InputError {
    InputError::Spreadsheet(err.to_string())
}

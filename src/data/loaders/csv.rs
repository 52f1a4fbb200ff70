// csv.rs - Delimited record files

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::data::record::{autocast, Dataset, Record, Value};
use crate::error::DataIoError;

/// One attribute of the parse spec: either a single column or a tuple of
/// columns producing a tuple-valued attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnSpec {
    Index(usize),
    Tuple(Vec<usize>),
}

/// How to parse a record file. With an empty `indexes` list every column is
/// kept in order; the first kept column is always the record id.
#[derive(Debug, Clone)]
pub struct ParseSpec {
    pub indexes: Vec<ColumnSpec>,
    /// Field delimiter, TAB by default.
    pub delimiter: u8,
    /// Read at most this many records.
    pub nbmax: Option<usize>,
    /// Skip the first line.
    pub skip_header: bool,
    /// Columns exempted from autocasting, kept as raw strings.
    pub raw_columns: Vec<usize>,
}

impl Default for ParseSpec {
    fn default() -> Self {
        ParseSpec {
            indexes: Vec::new(),
            delimiter: b'\t',
            nbmax: None,
            skip_header: false,
            raw_columns: Vec::new(),
        }
    }
}

fn cell_value(cells: &[String], index: usize, raw_columns: &[usize]) -> Result<Value, String> {
    let cell = cells
        .get(index)
        .ok_or_else(|| format!("column {} out of range ({} columns)", index, cells.len()))?;
    if cell.is_empty() {
        return Ok(Value::Empty);
    }
    if raw_columns.contains(&index) {
        return Ok(Value::Str(cell.clone()));
    }
    Ok(autocast(cell))
}

/// Build one record from its raw cells according to the parse spec. An
/// empty cell makes a single-valued attribute null; inside a tuple it makes
/// the whole tuple null.
pub(crate) fn record_from_cells(
    cells: &[String],
    spec: &ParseSpec,
) -> Result<Option<Record>, String> {
    if cells.is_empty() || cells.iter().all(|c| c.is_empty()) {
        return Ok(None);
    }
    let values = if spec.indexes.is_empty() {
        cells
            .iter()
            .enumerate()
            .map(|(i, _)| cell_value(cells, i, &spec.raw_columns))
            .collect::<Result<Vec<Value>, String>>()?
    } else {
        let mut values = Vec::with_capacity(spec.indexes.len());
        for column in &spec.indexes {
            match column {
                ColumnSpec::Index(i) => values.push(cell_value(cells, *i, &spec.raw_columns)?),
                ColumnSpec::Tuple(indexes) => {
                    let mut coords = Vec::with_capacity(indexes.len());
                    let mut null = false;
                    for &i in indexes {
                        match cell_value(cells, i, &[])? {
                            Value::Empty => {
                                null = true;
                                break;
                            }
                            v => match v.as_f64() {
                                Some(f) => coords.push(f),
                                None => {
                                    null = true;
                                    break;
                                }
                            },
                        }
                    }
                    values.push(if null { Value::Empty } else { Value::Coords(coords) });
                }
            }
        }
        values
    };
    Ok(Some(Record::new(values)))
}

/// Parse a delimited record file into a dataset: one row per record, cells
/// trimmed and autocast, columns selected by the parse spec.
pub fn parse_file(path: &Path, spec: &ParseSpec) -> Result<Dataset, DataIoError> {
    let file = File::open(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(spec.delimiter)
        .has_headers(spec.skip_header)
        .flexible(true)
        .from_reader(BufReader::new(file));

    let mut dataset = Vec::new();
    for (line, row) in reader.records().enumerate() {
        if let Some(nbmax) = spec.nbmax {
            if dataset.len() >= nbmax {
                break;
            }
        }
        let row = row.map_err(|e| DataIoError::Parse {
            line: line + 1,
            message: e.to_string(),
        })?;
        let cells: Vec<String> = row.iter().map(|c| c.trim().to_string()).collect();
        let record = record_from_cells(&cells, spec).map_err(|message| DataIoError::Parse {
            line: line + 1,
            message,
        })?;
        if let Some(record) = record {
            dataset.push(record);
        }
    }
    Ok(dataset)
}

/// Split a record file into pages of `size` lines inside `dir`, returning
/// the page paths in order.
pub fn split_file(path: &Path, dir: &Path, size: usize) -> Result<Vec<PathBuf>, std::io::Error> {
    let size = size.max(1);
    let reader = BufReader::new(File::open(path)?);
    let mut pages = Vec::new();
    let mut writer: Option<BufWriter<File>> = None;
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if index % size == 0 {
            let page_path = dir.join(format!("page_{:06}", pages.len()));
            writer = Some(BufWriter::new(File::create(&page_path)?));
            pages.push(page_path);
        }
        if let Some(w) = writer.as_mut() {
            writeln!(w, "{}", line)?;
        }
    }
    if let Some(mut w) = writer.take() {
        w.flush()?;
    }
    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Key;

    fn sample_file(dir: &Path) -> PathBuf {
        let path = dir.join("records.csv");
        let mut f = File::create(&path).unwrap();
        write!(
            f,
            "1,house,12,19,apple\n2,horse,21.9,19,stramberry\n3,flower,23,2.17,cherry\n"
        )
        .unwrap();
        path
    }

    #[test]
    fn test_parse_file_with_indexes() {
        let dir = tempfile::tempdir().unwrap();
        let path = sample_file(dir.path());
        let spec = ParseSpec {
            indexes: vec![
                ColumnSpec::Index(0),
                ColumnSpec::Tuple(vec![2, 3]),
                ColumnSpec::Index(4),
                ColumnSpec::Index(1),
            ],
            delimiter: b',',
            ..ParseSpec::default()
        };
        let dataset = parse_file(&path, &spec).unwrap();
        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset[0].id(), Key::Int(1));
        assert_eq!(dataset[0].value(1), &Value::Coords(vec![12.0, 19.0]));
        assert_eq!(dataset[0].value(2), &Value::from("apple"));
        assert_eq!(dataset[0].value(3), &Value::from("house"));
        assert_eq!(dataset[1].value(1), &Value::Coords(vec![21.9, 19.0]));
    }

    #[test]
    fn test_parse_file_all_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = sample_file(dir.path());
        let spec = ParseSpec {
            delimiter: b',',
            ..ParseSpec::default()
        };
        let dataset = parse_file(&path, &spec).unwrap();
        assert_eq!(dataset[1].value(2), &Value::Float(21.9));
        assert_eq!(dataset[2].value(4), &Value::from("cherry"));
    }

    #[test]
    fn test_empty_cells_are_null() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("holes.csv");
        let mut f = File::create(&path).unwrap();
        write!(f, "1;;12;19\n2;horse;;19\n").unwrap();
        let spec = ParseSpec {
            indexes: vec![
                ColumnSpec::Index(0),
                ColumnSpec::Index(1),
                ColumnSpec::Tuple(vec![2, 3]),
            ],
            delimiter: b';',
            ..ParseSpec::default()
        };
        let dataset = parse_file(&path, &spec).unwrap();
        assert_eq!(dataset[0].value(1), &Value::Empty);
        assert_eq!(dataset[0].value(2), &Value::Coords(vec![12.0, 19.0]));
        // one empty cell nullifies the whole tuple
        assert_eq!(dataset[1].value(2), &Value::Empty);
    }

    #[test]
    fn test_nbmax() {
        let dir = tempfile::tempdir().unwrap();
        let path = sample_file(dir.path());
        let spec = ParseSpec {
            delimiter: b',',
            nbmax: Some(2),
            ..ParseSpec::default()
        };
        assert_eq!(parse_file(&path, &spec).unwrap().len(), 2);
    }

    #[test]
    fn test_split_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = sample_file(dir.path());
        let pages_dir = tempfile::tempdir().unwrap();
        let pages = split_file(&path, pages_dir.path(), 2).unwrap();
        assert_eq!(pages.len(), 2);
        let first = std::fs::read_to_string(&pages[0]).unwrap();
        assert_eq!(first.lines().count(), 2);
        let second = std::fs::read_to_string(&pages[1]).unwrap();
        assert_eq!(second.lines().count(), 1);
    }
}

// rql.rs - RQL endpoint ingestion

use crate::data::loaders::csv::{record_from_cells, ColumnSpec, ParseSpec};
use crate::data::record::{Dataset, Value};
use crate::error::DataIoError;

/// An in-process RQL session handle, for sources running inside an
/// application instead of over HTTP.
pub trait RqlSession: Send + Sync {
    /// Execute the query with `word` bound and return the raw result rows.
    fn execute(&self, query: &str, word: &str) -> Result<Vec<Vec<Value>>, DataIoError>;
}

/// Run an RQL query against a host through its CSV-export view; the export's
/// header line is skipped. Failures surface as
/// [`DataIoError::EndpointFailure`].
pub fn rql_url_query(host: &str, rql: &str, indexes: &[ColumnSpec]) -> Result<Dataset, DataIoError> {
    let host = host.trim_end_matches('/');
    let client = reqwest::blocking::Client::new();
    let response = client
        .get(format!("{}/view", host))
        .query(&[("rql", rql), ("vid", "csvexport")])
        .send()
        .map_err(|e| DataIoError::EndpointFailure(e.to_string()))?;
    if !response.status().is_success() {
        return Err(DataIoError::EndpointFailure(format!(
            "endpoint returned {}",
            response.status()
        )));
    }
    let body = response
        .text()
        .map_err(|e| DataIoError::EndpointFailure(e.to_string()))?;
    parse_csv_export(&body, indexes)
}

/// Decode a CSV export body (semicolon-delimited, one header line).
pub(crate) fn parse_csv_export(body: &str, indexes: &[ColumnSpec]) -> Result<Dataset, DataIoError> {
    let spec = ParseSpec {
        indexes: indexes.to_vec(),
        delimiter: b';',
        ..ParseSpec::default()
    };
    let mut dataset = Vec::new();
    for (line, row) in body.lines().skip(1).enumerate() {
        let cells: Vec<String> = row
            .split(';')
            .map(|c| c.trim().to_string())
            .collect();
        let record = record_from_cells(&cells, &spec).map_err(|message| DataIoError::Parse {
            line: line + 2,
            message,
        })?;
        if let Some(record) = record {
            dataset.push(record);
        }
    }
    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Key;

    #[test]
    fn test_parse_csv_export() {
        let body = "eid;name\n1310453;apycot\n1310454;cubicweb\n";
        let dataset = parse_csv_export(body, &[]).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset[0].id(), Key::Int(1310453));
        assert_eq!(dataset[1].value(1), &Value::from("cubicweb"));
    }

    #[test]
    fn test_parse_csv_export_empty_body() {
        assert!(parse_csv_export("header only\n", &[]).unwrap().is_empty());
    }
}

// sparql.rs - SPARQL endpoint ingestion

use serde_json::Value as Json;

use crate::data::loaders::csv::{record_from_cells, ColumnSpec, ParseSpec};
use crate::data::record::Dataset;
use crate::error::DataIoError;

/// Run a SPARQL query against an endpoint and wrap the bindings as records,
/// autocast like the CSV path. With an empty `indexes` list the variables
/// are kept in declaration order. A failed query surfaces as
/// [`DataIoError::EndpointFailure`]; callers that must not abort (the NER
/// sources) degrade it to a warning and an empty result.
pub fn sparql_query(
    endpoint: &str,
    query: &str,
    indexes: &[ColumnSpec],
) -> Result<Dataset, DataIoError> {
    let client = reqwest::blocking::Client::new();
    let response = client
        .get(endpoint)
        .query(&[("query", query), ("format", "json")])
        .header("Accept", "application/sparql-results+json")
        .send()
        .map_err(|e| DataIoError::EndpointFailure(e.to_string()))?;
    if !response.status().is_success() {
        return Err(DataIoError::EndpointFailure(format!(
            "endpoint returned {}",
            response.status()
        )));
    }
    let body: Json = response
        .json()
        .map_err(|e| DataIoError::EndpointFailure(e.to_string()))?;
    parse_sparql_results(&body, indexes)
}

/// Decode the `application/sparql-results+json` shape into records.
pub(crate) fn parse_sparql_results(
    body: &Json,
    indexes: &[ColumnSpec],
) -> Result<Dataset, DataIoError> {
    let labels: Vec<&str> = body["head"]["vars"]
        .as_array()
        .map(|vars| vars.iter().filter_map(Json::as_str).collect())
        .unwrap_or_default();
    let bindings = body["results"]["bindings"].as_array();
    let spec = ParseSpec {
        indexes: indexes.to_vec(),
        ..ParseSpec::default()
    };

    let mut dataset = Vec::new();
    for (line, binding) in bindings.into_iter().flatten().enumerate() {
        let cells: Vec<String> = labels
            .iter()
            .map(|label| {
                binding[label]["value"]
                    .as_str()
                    .unwrap_or_default()
                    .trim()
                    .to_string()
            })
            .collect();
        let record = record_from_cells(&cells, &spec).map_err(|message| DataIoError::Parse {
            line: line + 1,
            message,
        })?;
        if let Some(record) = record {
            dataset.push(record);
        }
    }
    Ok(dataset)
}

/// The values of one result variable, for single-variable lookups (the NER
/// sources query one `?uri` per word).
pub fn sparql_values(endpoint: &str, query: &str, variable: &str) -> Result<Vec<String>, DataIoError> {
    let client = reqwest::blocking::Client::new();
    let response = client
        .get(endpoint)
        .query(&[("query", query), ("format", "json")])
        .header("Accept", "application/sparql-results+json")
        .send()
        .map_err(|e| DataIoError::EndpointFailure(e.to_string()))?;
    if !response.status().is_success() {
        return Err(DataIoError::EndpointFailure(format!(
            "endpoint returned {}",
            response.status()
        )));
    }
    let body: Json = response
        .json()
        .map_err(|e| DataIoError::EndpointFailure(e.to_string()))?;
    Ok(extract_variable(&body, variable))
}

pub(crate) fn extract_variable(body: &Json, variable: &str) -> Vec<String> {
    body["results"]["bindings"]
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|binding| binding[variable]["value"].as_str())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Key, Value};

    fn sample_body() -> Json {
        serde_json::json!({
            "head": {"vars": ["id", "label", "population"]},
            "results": {"bindings": [
                {"id": {"value": "12"}, "label": {"value": "Paris"},
                 "population": {"value": "2229621"}},
                {"id": {"value": "13"}, "label": {"value": "Lyon"},
                 "population": {"value": ""}},
            ]}
        })
    }

    #[test]
    fn test_parse_sparql_results() {
        let dataset = parse_sparql_results(&sample_body(), &[]).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset[0].id(), Key::Int(12));
        assert_eq!(dataset[0].value(1), &Value::from("Paris"));
        assert_eq!(dataset[0].value(2), &Value::Int(2229621));
        assert_eq!(dataset[1].value(2), &Value::Empty);
    }

    #[test]
    fn test_parse_sparql_results_with_indexes() {
        let spec = vec![ColumnSpec::Index(0), ColumnSpec::Index(2)];
        let dataset = parse_sparql_results(&sample_body(), &spec).unwrap();
        assert_eq!(dataset[0].value(1), &Value::Int(2229621));
    }

    #[test]
    fn test_extract_variable() {
        let body = serde_json::json!({
            "results": {"bindings": [
                {"uri": {"value": "http://example.com/a"}},
                {"uri": {"value": "http://example.com/b"}},
            ]}
        });
        assert_eq!(
            extract_variable(&body, "uri"),
            vec!["http://example.com/a", "http://example.com/b"]
        );
    }
}

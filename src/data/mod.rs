// mod.rs - Data model and record ingestion

pub mod loaders;
pub mod record;

pub use loaders::csv::{parse_file, split_file, ColumnSpec, ParseSpec};
pub use loaders::rql::{rql_url_query, RqlSession};
pub use loaders::sparql::{sparql_query, sparql_values};
pub use record::{autocast, Dataset, Key, Record, Value};

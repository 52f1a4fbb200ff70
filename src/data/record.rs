// record.rs - Attribute values, record identifiers and datasets

use std::fmt;

/// A single attribute value of a record.
///
/// Attributes are heterogeneous: numbers, strings, tuple-valued coordinates
/// or absent. `Empty` never reaches a metric; the distance-matrix engine
/// writes the default distance for cells with an empty side.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
    Coords(Vec<f64>),
    Empty,
}

impl Value {
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Empty => true,
            Value::Str(s) => s.is_empty(),
            _ => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view: integers and floats directly, strings through a float
    /// parse (comma accepted as decimal separator).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Str(s) => s.trim().replace(',', ".").parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Coordinate view: tuple attributes as-is, scalars wrapped as 1-tuples.
    pub fn as_coords(&self) -> Option<Vec<f64>> {
        match self {
            Value::Coords(c) => Some(c.clone()),
            Value::Int(i) => Some(vec![*i as f64]),
            Value::Float(f) => Some(vec![*f]),
            _ => None,
        }
    }

    /// Textual form used by key computations and the MinHash engine.
    pub fn to_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) => write!(f, "{}", s),
            Value::Coords(c) => {
                let parts: Vec<String> = c.iter().map(|v| v.to_string()).collect();
                write!(f, "({})", parts.join(", "))
            }
            Value::Empty => Ok(()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<(f64, f64)> for Value {
    fn from(p: (f64, f64)) -> Self {
        Value::Coords(vec![p.0, p.1])
    }
}

/// Record identifier. Ids are opaque; integers and strings cover the
/// ingestion paths, and the ordering (ints before strings) gives the
/// deterministic tie-break used by unique pair selection.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub enum Key {
    Int(i64),
    Str(String),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Int(i) => write!(f, "{}", i),
            Key::Str(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::Str(s.to_string())
    }
}

impl From<i64> for Key {
    fn from(i: i64) -> Self {
        Key::Int(i)
    }
}

impl From<&Value> for Key {
    fn from(v: &Value) -> Self {
        match v {
            Value::Int(i) => Key::Int(*i),
            other => Key::Str(other.to_string()),
        }
    }
}

/// An immutable data record: an ordered tuple whose first field is the
/// identifier and whose remaining fields are attributes. Attribute indexes
/// used by processings and blockings count the id as index 0.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    values: Vec<Value>,
}

impl Record {
    /// Build a record from its full value tuple (id first). Panics on an
    /// empty tuple; every ingestion path produces at least the id column.
    pub fn new(values: Vec<Value>) -> Self {
        assert!(!values.is_empty(), "a record needs at least an id column");
        Record { values }
    }

    pub fn from_id<K: Into<Key>>(id: K, attrs: Vec<Value>) -> Self {
        let id_value = match id.into() {
            Key::Int(i) => Value::Int(i),
            Key::Str(s) => Value::Str(s),
        };
        let mut values = Vec::with_capacity(attrs.len() + 1);
        values.push(id_value);
        values.extend(attrs);
        Record { values }
    }

    pub fn id(&self) -> Key {
        Key::from(&self.values[0])
    }

    /// Number of fields including the id column.
    pub fn arity(&self) -> usize {
        self.values.len()
    }

    pub fn value(&self, attr_index: usize) -> &Value {
        &self.values[attr_index]
    }

    pub(crate) fn set_value(&mut self, attr_index: usize, value: Value) {
        self.values[attr_index] = value;
    }
}

/// A dataset is a finite sequence of records sharing a schema; the position
/// in the sequence is the record's integer index.
pub type Dataset = Vec<Record>;

/// Try to convert a raw cell into a typed value: int first, then float with
/// either dot or comma as decimal separator, else the trimmed string.
pub fn autocast(data: &str) -> Value {
    let trimmed = data.trim();
    if let Ok(i) = trimmed.parse::<i64>() {
        return Value::Int(i);
    }
    if let Ok(f) = trimmed.replace(',', ".").parse::<f64>() {
        return Value::Float(f);
    }
    Value::Str(trimmed.to_string())
}

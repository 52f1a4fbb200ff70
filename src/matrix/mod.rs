// mod.rs - Distance-matrix engine, processings and threshold extraction

use std::collections::BTreeMap;

use rayon::prelude::*;

use crate::data::{Dataset, Value};
use crate::error::ProcessingError;
use crate::metrics::Metric;

/// Sentinel stored in sparse matrices in place of an exact zero distance, so
/// the sparsity structure still distinguishes "matched at distance 0" from
/// "never compared".
pub const ZERO_SENTINEL: f32 = 1e-10;

/// The order-preserving squash `d -> 1 - 1/(1+d)` from [0, inf) to [0, 1).
#[inline]
pub fn squash(d: f64) -> f64 {
    1.0 - 1.0 / (1.0 + d)
}

/// A dense, contiguous row-major matrix of 32-bit float distances.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    rows: usize,
    cols: usize,
    values: Vec<f32>,
}

impl DistanceMatrix {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        DistanceMatrix {
            rows,
            cols,
            values: vec![0.0; rows * cols],
        }
    }

    /// Build the |X|x|Y| matrix of `metric` distances between two attribute
    /// vectors. A cell with an empty value on either side gets
    /// `default_value` without calling the metric, as does a cell whose
    /// inputs the metric cannot coerce. With `normalized`, every computed
    /// distance is squashed into [0, 1).
    ///
    /// The row fill is parallel; the engine is re-entrant so the same
    /// processing can run over distinct index subsets within one alignment.
    pub fn compute(
        xs: &[&Value],
        ys: &[&Value],
        metric: &Metric,
        normalized: bool,
        default_value: f32,
    ) -> Self {
        let cols = ys.len();
        let rows: Vec<Vec<f32>> = xs
            .par_iter()
            .map(|x| {
                ys.iter()
                    .map(|y| {
                        if x.is_empty() || y.is_empty() {
                            return default_value;
                        }
                        match metric.distance(x, y) {
                            Ok(d) if normalized => squash(d) as f32,
                            Ok(d) => d as f32,
                            Err(_) => default_value,
                        }
                    })
                    .collect()
            })
            .collect();
        let values: Vec<f32> = rows.into_iter().flatten().collect();
        DistanceMatrix {
            rows: xs.len(),
            cols,
            values,
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.values[row * self.cols + col]
    }

    /// Add `weight * other` into this matrix. Shape mismatches are fatal for
    /// the current alignment.
    pub fn add_weighted(&mut self, other: &DistanceMatrix, weight: f32) -> Result<(), ProcessingError> {
        if self.rows != other.rows || self.cols != other.cols {
            return Err(ProcessingError::ShapeMismatch {
                expected_rows: self.rows,
                expected_cols: self.cols,
                found_rows: other.rows,
                found_cols: other.cols,
            });
        }
        for (cell, value) in self.values.iter_mut().zip(other.values.iter()) {
            *cell += weight * value;
        }
        Ok(())
    }

    /// Extract the matched map: for every cell at or under the threshold,
    /// row-major, append `(col, distance)` to the row's list. Row-major
    /// visiting makes per-row insertion order deterministic.
    pub fn matched(&self, threshold: f32) -> BTreeMap<usize, Vec<(usize, f32)>> {
        let mut matched: BTreeMap<usize, Vec<(usize, f32)>> = BTreeMap::new();
        for row in 0..self.rows {
            for col in 0..self.cols {
                let d = self.get(row, col);
                if d <= threshold {
                    matched.entry(row).or_default().push((col, d));
                }
            }
        }
        matched
    }

    pub fn max_value(&self) -> f32 {
        self.values.iter().cloned().fold(0.0, f32::max)
    }
}

/// A metric bound to attribute indices, a weight, the squash flag and the
/// default distance for empty or uncoercible cells.
#[derive(Debug, Clone)]
pub struct Processing {
    pub ref_attr_index: usize,
    pub target_attr_index: usize,
    pub metric: Metric,
    pub weight: f32,
    pub matrix_normalized: bool,
    pub default_value: f32,
}

impl Processing {
    pub fn new(ref_attr_index: usize, target_attr_index: usize, metric: Metric) -> Self {
        Processing {
            ref_attr_index,
            target_attr_index,
            metric,
            weight: 1.0,
            matrix_normalized: true,
            default_value: 1.0,
        }
    }

    pub fn with_weight(mut self, weight: f32) -> Self {
        self.weight = weight;
        self
    }

    /// Keep raw distances instead of squashing them into [0, 1).
    pub fn raw(mut self) -> Self {
        self.matrix_normalized = false;
        self
    }

    pub fn with_default(mut self, default_value: f32) -> Self {
        self.default_value = default_value;
        self
    }

    /// Check the attribute indices against the arity of both datasets; done
    /// once at registration.
    pub fn validate(&self, refset: &Dataset, targetset: &Dataset) -> Result<(), ProcessingError> {
        if let Some(record) = refset.first() {
            if self.ref_attr_index >= record.arity() {
                return Err(ProcessingError::AttributeOutOfBounds {
                    index: self.ref_attr_index,
                    arity: record.arity(),
                });
            }
        }
        if let Some(record) = targetset.first() {
            if self.target_attr_index >= record.arity() {
                return Err(ProcessingError::AttributeOutOfBounds {
                    index: self.target_attr_index,
                    arity: record.arity(),
                });
            }
        }
        Ok(())
    }

    /// Distance matrix for the given index subsets of both datasets.
    pub fn matrix(
        &self,
        refset: &Dataset,
        targetset: &Dataset,
        ref_indexes: &[usize],
        target_indexes: &[usize],
    ) -> DistanceMatrix {
        let xs: Vec<&Value> = ref_indexes
            .iter()
            .map(|&i| refset[i].value(self.ref_attr_index))
            .collect();
        let ys: Vec<&Value> = target_indexes
            .iter()
            .map(|&j| targetset[j].value(self.target_attr_index))
            .collect();
        DistanceMatrix::compute(
            &xs,
            &ys,
            &self.metric,
            self.matrix_normalized,
            self.default_value,
        )
    }
}

/// Weighted sum of the per-processing matrices over the given index subsets:
/// the composite alignment matrix for one block.
pub fn composite_matrix(
    processings: &[Processing],
    refset: &Dataset,
    targetset: &Dataset,
    ref_indexes: &[usize],
    target_indexes: &[usize],
) -> Result<DistanceMatrix, ProcessingError> {
    let mut composite = DistanceMatrix::zeros(ref_indexes.len(), target_indexes.len());
    for processing in processings {
        let local = processing.matrix(refset, targetset, ref_indexes, target_indexes);
        composite.add_weighted(&local, processing.weight)?;
    }
    Ok(composite)
}

/// Sparse |R|x|T| distance matrix: a mapping row -> [(col, value)], with
/// stored zero distances replaced by [`ZERO_SENTINEL`].
#[derive(Debug, Clone, Default)]
pub struct SparseMatrix {
    rows: usize,
    cols: usize,
    data: BTreeMap<usize, Vec<(usize, f32)>>,
}

impl SparseMatrix {
    pub fn new(rows: usize, cols: usize) -> Self {
        SparseMatrix {
            rows,
            cols,
            data: BTreeMap::new(),
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn set(&mut self, row: usize, col: usize, value: f32) {
        let stored = if value == 0.0 { ZERO_SENTINEL } else { value };
        let entries = self.data.entry(row).or_default();
        match entries.iter_mut().find(|(c, _)| *c == col) {
            Some(entry) => entry.1 = stored,
            None => entries.push((col, stored)),
        }
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        self.data
            .get(&row)
            .and_then(|entries| entries.iter().find(|(c, _)| *c == col).map(|(_, v)| *v))
    }

    pub fn stored_cells(&self) -> usize {
        self.data.values().map(Vec::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, f32)> + '_ {
        self.data
            .iter()
            .flat_map(|(&row, entries)| entries.iter().map(move |&(col, v)| (row, col, v)))
    }
}

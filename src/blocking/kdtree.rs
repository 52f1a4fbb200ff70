// kdtree.rs - K-d tree blocking

use super::{record_ids, Block, BlockIter, Blocking};
use crate::data::Dataset;
use crate::error::BlockingError;

/// A node of the k-d tree: the branching point plus the left/right subtrees,
/// with the split coordinate cycling through the dimensions by depth.
struct KdNode {
    point: Vec<f64>,
    index: usize,
    split: usize,
    left: Option<Box<KdNode>>,
    right: Option<Box<KdNode>>,
}

fn build_tree(mut points: Vec<(Vec<f64>, usize)>, depth: usize, dims: usize) -> Option<Box<KdNode>> {
    if points.is_empty() {
        return None;
    }
    let split = depth % dims;
    points.sort_by(|a, b| {
        a.0[split]
            .partial_cmp(&b.0[split])
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let median = points.len() / 2;
    let right_points = points.split_off(median + 1);
    let (point, index) = points.pop().unwrap();
    Some(Box::new(KdNode {
        point,
        index,
        split,
        left: build_tree(points, depth + 1, dims),
        right: build_tree(right_points, depth + 1, dims),
    }))
}

/// Collect the indexes of every point within `radius` (L2) of the query.
fn find_within(node: &KdNode, query: &[f64], radius_squared: f64, out: &mut Vec<usize>) {
    let d2: f64 = node
        .point
        .iter()
        .zip(query.iter())
        .map(|(a, b)| (a - b) * (a - b))
        .sum();
    if d2 <= radius_squared {
        out.push(node.index);
    }
    let plane_delta = query[node.split] - node.point[node.split];
    if let Some(left) = &node.left {
        if plane_delta <= 0.0 || plane_delta * plane_delta <= radius_squared {
            find_within(left, query, radius_squared, out);
        }
    }
    if let Some(right) = &node.right {
        if plane_delta >= 0.0 || plane_delta * plane_delta <= radius_squared {
            find_within(right, query, radius_squared, out);
        }
    }
}

/// Blocking through k-d trees built on both sides: each reference point
/// pairs with the target points within L2 distance `threshold`. Scalar
/// attributes are wrapped as 1-tuples.
pub struct KdTreeBlocking {
    ref_attr_index: usize,
    target_attr_index: usize,
    threshold: f64,
    blocks: Vec<Block>,
    fitted: bool,
}

impl KdTreeBlocking {
    pub fn new(ref_attr_index: usize, target_attr_index: usize, threshold: f64) -> Self {
        KdTreeBlocking {
            ref_attr_index,
            target_attr_index,
            threshold,
            blocks: Vec::new(),
            fitted: false,
        }
    }
}

impl Blocking for KdTreeBlocking {
    fn fit(&mut self, refset: &Dataset, targetset: &Dataset) {
        self.cleanup();
        if refset.is_empty() || targetset.is_empty() {
            self.fitted = true;
            return;
        }
        let dims = refset
            .iter()
            .find_map(|r| r.value(self.ref_attr_index).as_coords().map(|c| c.len()))
            .unwrap_or(1)
            .max(1);
        let zero = vec![0.0; dims];
        let ref_points: Vec<Vec<f64>> = refset
            .iter()
            .map(|r| {
                r.value(self.ref_attr_index)
                    .as_coords()
                    .unwrap_or_else(|| zero.clone())
            })
            .collect();
        let target_points: Vec<(Vec<f64>, usize)> = targetset
            .iter()
            .enumerate()
            .map(|(i, r)| {
                (
                    r.value(self.target_attr_index)
                        .as_coords()
                        .unwrap_or_else(|| zero.clone()),
                    i,
                )
            })
            .collect();

        let tree = build_tree(target_points, 0, dims);
        let refids = record_ids(refset);
        let targetids = record_ids(targetset);
        let radius_squared = self.threshold * self.threshold;

        for (ind, point) in ref_points.iter().enumerate() {
            let mut neighbours = Vec::new();
            if let Some(root) = &tree {
                find_within(root, point, radius_squared, &mut neighbours);
            }
            if neighbours.is_empty() {
                continue;
            }
            neighbours.sort_unstable();
            self.blocks.push(Block {
                refs: vec![refids[ind].clone()],
                targets: neighbours.iter().map(|&t| targetids[t].clone()).collect(),
            });
        }
        self.fitted = true;
    }

    fn is_fitted(&self) -> bool {
        self.fitted
    }

    fn iter_blocks(&self) -> Result<BlockIter<'_>, BlockingError> {
        if !self.fitted {
            return Err(BlockingError::NotFitted);
        }
        Ok(Box::new(self.blocks.iter().cloned()))
    }

    fn cleanup(&mut self) {
        self.blocks.clear();
        self.fitted = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocking::test_fixtures::*;
    use crate::data::Key;

    #[test]
    fn test_kdtree_blocking() {
        let mut blocking = KdTreeBlocking::new(2, 2, 0.3);
        blocking.fit(&city_refset(), &city_targetset());
        let blocks: Vec<(Vec<Key>, Vec<Key>)> = blocking.iter_id_blocks().unwrap().collect();
        assert_eq!(
            blocks,
            vec![
                (vec![Key::from("V1")], vec![Key::from("T1"), Key::from("T3")]),
                (vec![Key::from("V2")], vec![Key::from("T1"), Key::from("T3")]),
                (vec![Key::from("V3")], vec![Key::from("T2")]),
                (vec![Key::from("V4")], vec![Key::from("T2")]),
            ]
        );
    }

    #[test]
    fn test_kdtree_radius_is_inclusive_l2() {
        let mut blocking = KdTreeBlocking::new(2, 2, 0.0);
        blocking.fit(&city_refset(), &city_refset());
        // every record finds exactly itself at radius 0
        let blocks: Vec<Block> = blocking.iter_blocks().unwrap().collect();
        assert_eq!(blocks.len(), 4);
        for (i, block) in blocks.iter().enumerate() {
            assert_eq!(block.target_indexes(), vec![i]);
        }
    }

    #[test]
    fn test_kdtree_not_fitted() {
        let blocking = KdTreeBlocking::new(2, 2, 0.3);
        assert!(matches!(
            blocking.iter_blocks(),
            Err(BlockingError::NotFitted)
        ));
    }
}

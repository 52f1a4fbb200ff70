// kmeans.rs - Clustering-based blocking

use rand::rngs::SmallRng;
use rand::seq::index::sample;
use rand::SeedableRng;

use super::{record_ids, Block, BlockIter, Blocking};
use crate::data::{Dataset, Key};
use crate::error::BlockingError;

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Plain Lloyd's k-means over dense points. Returns the assignment labels
/// and the final centroids.
fn lloyd_kmeans(
    points: &[Vec<f64>],
    n_clusters: usize,
    seed: u64,
    max_iterations: usize,
) -> (Vec<usize>, Vec<Vec<f64>>) {
    let n_clusters = n_clusters.min(points.len()).max(1);
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut centroids: Vec<Vec<f64>> = sample(&mut rng, points.len(), n_clusters)
        .into_iter()
        .map(|i| points[i].clone())
        .collect();
    let mut labels = vec![0usize; points.len()];

    for _ in 0..max_iterations {
        let mut changed = false;
        for (i, point) in points.iter().enumerate() {
            let nearest = centroids
                .iter()
                .enumerate()
                .min_by(|(_, a), (_, b)| {
                    squared_distance(point, a)
                        .partial_cmp(&squared_distance(point, b))
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
                .map(|(c, _)| c)
                .unwrap_or(0);
            if labels[i] != nearest {
                labels[i] = nearest;
                changed = true;
            }
        }
        for (c, centroid) in centroids.iter_mut().enumerate() {
            let members: Vec<&Vec<f64>> = points
                .iter()
                .zip(labels.iter())
                .filter(|(_, &l)| l == c)
                .map(|(p, _)| p)
                .collect();
            if members.is_empty() {
                continue; // empty cluster keeps its previous centroid
            }
            for d in 0..centroid.len() {
                centroid[d] = members.iter().map(|p| p[d]).sum::<f64>() / members.len() as f64;
            }
        }
        if !changed {
            break;
        }
    }
    (labels, centroids)
}

fn nearest_centroid(point: &[f64], centroids: &[Vec<f64>]) -> usize {
    centroids
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            squared_distance(point, a)
                .partial_cmp(&squared_distance(point, b))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|(c, _)| c)
        .unwrap_or(0)
}

/// Blocking through k-means: the clustering is fit on the reference side,
/// target records are predicted onto the nearest centroid, and one block is
/// emitted per cluster populated on both sides. Missing values are replaced
/// by the 0-vector of the dataset's dimensionality.
pub struct KmeansBlocking {
    ref_attr_index: usize,
    target_attr_index: usize,
    n_clusters: Option<usize>,
    seed: u64,
    blocks: Vec<Block>,
    fitted: bool,
}

impl KmeansBlocking {
    pub fn new(ref_attr_index: usize, target_attr_index: usize, n_clusters: Option<usize>) -> Self {
        KmeansBlocking {
            ref_attr_index,
            target_attr_index,
            n_clusters,
            seed: 0,
            blocks: Vec::new(),
            fitted: false,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    fn points_of(dataset: &Dataset, attr_index: usize, dimensionality: usize) -> Vec<Vec<f64>> {
        dataset
            .iter()
            .map(|record| {
                let value = record.value(attr_index);
                value
                    .as_coords()
                    .unwrap_or_else(|| vec![0.0; dimensionality])
            })
            .collect()
    }

    fn dimensionality(dataset: &Dataset, attr_index: usize) -> usize {
        dataset
            .iter()
            .find_map(|r| r.value(attr_index).as_coords().map(|c| c.len()))
            .unwrap_or(1)
    }
}

impl Blocking for KmeansBlocking {
    fn fit(&mut self, refset: &Dataset, targetset: &Dataset) {
        self.cleanup();
        if refset.is_empty() || targetset.is_empty() {
            self.fitted = true;
            return;
        }
        let dimensionality = Self::dimensionality(refset, self.ref_attr_index);
        let ref_points = Self::points_of(refset, self.ref_attr_index, dimensionality);
        let target_points = Self::points_of(targetset, self.target_attr_index, dimensionality);

        let n_clusters = self.n_clusters.unwrap_or_else(|| {
            let tenth = refset.len() / 10;
            if tenth > 0 {
                tenth
            } else {
                (refset.len() / 2).max(1)
            }
        });

        let (labels, centroids) = lloyd_kmeans(&ref_points, n_clusters, self.seed, 300);
        let refids = record_ids(refset);
        let targetids = record_ids(targetset);

        let mut clusters: Vec<(Vec<(usize, Key)>, Vec<(usize, Key)>)> =
            vec![(Vec::new(), Vec::new()); centroids.len()];
        for (ind, point) in target_points.iter().enumerate() {
            clusters[nearest_centroid(point, &centroids)]
                .1
                .push(targetids[ind].clone());
        }
        for (ind, &label) in labels.iter().enumerate() {
            clusters[label].0.push(refids[ind].clone());
        }
        self.blocks = clusters
            .into_iter()
            .filter(|(refs, targets)| !refs.is_empty() && !targets.is_empty())
            .map(|(refs, targets)| Block { refs, targets })
            .collect();
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

    #[test]
    fn test_kmeans_blocking() {
        let mut blocking = KmeansBlocking::new(2, 2, None).with_seed(6);
        blocking.fit(&city_refset(), &city_targetset());
        let blocks: Vec<(Vec<usize>, Vec<usize>)> =
            blocking.iter_indice_blocks().unwrap().collect();
        assert_eq!(blocks.len(), 2);
        assert!(blocks.contains(&(vec![0, 1], vec![0, 2])));
        assert!(blocks.contains(&(vec![2, 3], vec![1])));

        let pairs: Vec<(usize, usize)> = blocking.iter_indice_pairs().unwrap().collect();
        assert_eq!(pairs.len(), 6);
        for pair in [(0, 0), (0, 2), (1, 0), (1, 2), (2, 1), (3, 1)] {
            assert!(pairs.contains(&pair));
        }
    }

    #[test]
    fn test_kmeans_cluster_count_default() {
        // 4 records: |R|/10 = 0, so |R|/2 = 2 clusters
        let mut blocking = KmeansBlocking::new(2, 2, None).with_seed(1);
        blocking.fit(&city_refset(), &city_targetset());
        assert!(blocking.iter_blocks().unwrap().count() <= 2);
    }

    #[test]
    fn test_kmeans_not_fitted() {
        let blocking = KmeansBlocking::new(2, 2, None);
        assert!(matches!(
            blocking.iter_blocks(),
            Err(BlockingError::NotFitted)
        ));
    }
}

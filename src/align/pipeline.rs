// pipeline.rs - Cascaded aligners

use std::collections::HashSet;

use super::aligner::{BaseAligner, MatchedMap};
use crate::data::{Dataset, Key};
use crate::error::AlignError;

/// A cascade of aligners with decreasing-cost intent: each later stage sees
/// only the reference records whose id was not matched by an earlier stage,
/// and the final matched map merges the contributions of every stage.
pub struct PipelineAligner {
    aligners: Vec<BaseAligner>,
}

impl PipelineAligner {
    pub fn new(aligners: Vec<BaseAligner>) -> Self {
        PipelineAligner { aligners }
    }

    pub fn align(
        &mut self,
        refset: &Dataset,
        targetset: &Dataset,
    ) -> Result<MatchedMap, AlignError> {
        let mut global_matched = MatchedMap::new();
        let mut remaining: Vec<usize> = (0..refset.len()).collect();

        for aligner in &mut self.aligners {
            if remaining.is_empty() {
                break;
            }
            let sub_refset: Dataset = remaining.iter().map(|&i| refset[i].clone()).collect();
            let (_, matched) = aligner.align(&sub_refset, targetset, false)?;

            let mut matched_ids: HashSet<Key> = HashSet::new();
            for ((sub_index, ref_id), entries) in matched {
                let orig_index = remaining[sub_index];
                matched_ids.insert(ref_id.clone());
                let global_entries = global_matched.entry((orig_index, ref_id)).or_default();
                for entry in entries {
                    if !global_entries.contains(&entry) {
                        global_entries.push(entry);
                    }
                }
            }
            remaining.retain(|&i| !matched_ids.contains(&refset[i].id()));
        }
        Ok(global_matched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Record, Value};
    use crate::matrix::Processing;
    use crate::metrics::Metric;

    fn name_record(id: &str, name: &str) -> Record {
        Record::from_id(id, vec![Value::from(name)])
    }

    fn lev_aligner(threshold: f32) -> BaseAligner {
        BaseAligner::new(
            threshold,
            vec![Processing::new(1, 1, Metric::Levenshtein).raw()],
        )
    }

    #[test]
    fn test_pipeline_aligner_cascade() {
        let refset = vec![
            name_record("r1", "victor"),
            name_record("r2", "hugor"),
            name_record("r3", "zzzzzz"),
        ];
        let targetset = vec![name_record("t1", "victor"), name_record("t2", "hugo")];

        // stage one: exact matches only; stage two: within distance 2
        let mut pipeline = PipelineAligner::new(vec![lev_aligner(0.0), lev_aligner(2.0)]);
        let matched = pipeline.align(&refset, &targetset).unwrap();

        // r1 matched exactly in stage one
        let r1 = &matched[&(0, Key::from("r1"))];
        assert_eq!(r1, &vec![((0, Key::from("t1")), 0.0)]);
        // r2 only matches in the looser second stage
        let r2 = &matched[&(1, Key::from("r2"))];
        assert!(r2.iter().any(|((_, id), d)| *id == Key::from("t2") && *d <= 2.0));
        // r3 never matches
        assert!(!matched.contains_key(&(2, Key::from("r3"))));
    }

    #[test]
    fn test_pipeline_aligner_stage_restriction() {
        let refset = vec![name_record("r1", "victor")];
        let targetset = vec![name_record("t1", "victor")];
        // the second stage would match too, but must not run on r1 again:
        // its contribution would double the entry count otherwise
        let mut pipeline = PipelineAligner::new(vec![lev_aligner(0.0), lev_aligner(5.0)]);
        let matched = pipeline.align(&refset, &targetset).unwrap();
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[&(0, Key::from("r1"))].len(), 1);
    }
}

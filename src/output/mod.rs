// mod.rs - Result file writing

use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::align::MatchedMap;
use crate::data::Key;

/// Write the matched pairs to a result file: one header line
/// `aligned;targetted;distance`, then one line per pair. When the file
/// already exists, pairs are appended and the header is not repeated.
pub fn write_results<P: AsRef<Path>>(matched: &MatchedMap, path: P) -> Result<(), String> {
    let path = path.as_ref();
    let exists = path.exists();
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| format!("Failed to open result file '{}': {}", path.display(), e))?;
    let mut writer = BufWriter::new(file);

    if !exists {
        writeln!(writer, "aligned;targetted;distance")
            .map_err(|e| format!("Write error: {}", e))?;
    }

    let mut refs: Vec<&(usize, Key)> = matched.keys().collect();
    refs.sort();
    for ref_addr in refs {
        for ((_, target_id), distance) in &matched[ref_addr] {
            writeln!(writer, "{};{};{}", ref_addr.1, target_id, distance)
                .map_err(|e| format!("Write error: {}", e))?;
        }
    }
    writer.flush().map_err(|e| format!("Flush error: {}", e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::MatchedMap;

    fn sample_matched() -> MatchedMap {
        let mut matched = MatchedMap::new();
        matched.insert(
            (0, Key::from("V1")),
            vec![((0, Key::from("T1")), 4.5), ((2, Key::from("T3")), 29.0)],
        );
        matched.insert((3, Key::from("V4")), vec![((1, Key::from("T2")), 15.5)]);
        matched
    }

    #[test]
    fn test_write_results() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.csv");
        write_results(&sample_matched(), &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "aligned;targetted;distance");
        assert_eq!(lines.len(), 4);
        assert!(lines.contains(&"V1;T1;4.5"));
        assert!(lines.contains(&"V4;T2;15.5"));
    }

    #[test]
    fn test_write_results_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.csv");
        write_results(&sample_matched(), &path).unwrap();
        write_results(&sample_matched(), &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        // a single header, pairs written twice
        assert_eq!(content.matches("aligned;targetted").count(), 1);
        assert_eq!(content.lines().count(), 7);
    }
}

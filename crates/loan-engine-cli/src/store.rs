use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;

use loan_engine_core::history::{CalculationId, CalculationStore, SavedCalculation, UserId};
use tracing::{debug, warn};

/// Calculation history kept as one JSON document per line.
#[derive(Debug, Clone)]
pub struct JsonLinesStore {
    path: PathBuf,
}

impl JsonLinesStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn append(&self, calculation: &SavedCalculation) -> io::Result<()> {
        let line = serde_json::to_string(calculation)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{line}")
    }

    /// File contents; a missing file is an empty history.
    fn read(&self) -> io::Result<String> {
        match fs::read_to_string(&self.path) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(String::new()),
            other => other,
        }
    }

    /// Rewrite the file without the matching record. Lines that do not parse
    /// are kept as they are.
    fn remove(&self, user_id: UserId, id: CalculationId) -> io::Result<bool> {
        let contents = self.read()?;
        let mut removed = false;
        let mut kept = String::with_capacity(contents.len());
        for line in contents.lines().filter(|l| !l.trim().is_empty()) {
            let matches = serde_json::from_str::<SavedCalculation>(line)
                .map(|r| r.user_id == user_id && r.id == id)
                .unwrap_or(false);
            if matches {
                removed = true;
            } else {
                kept.push_str(line);
                kept.push('\n');
            }
        }
        if removed {
            fs::write(&self.path, kept)?;
        }
        Ok(removed)
    }
}

impl CalculationStore for JsonLinesStore {
    fn save(&mut self, calculation: &SavedCalculation) -> bool {
        match self.append(calculation) {
            Ok(()) => {
                debug!(
                    path = %self.path.display(),
                    user_id = calculation.user_id,
                    id = calculation.id,
                    "saved calculation"
                );
                true
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to save calculation");
                false
            }
        }
    }

    fn history(&self, user_id: UserId) -> Vec<SavedCalculation> {
        let contents = match self.read() {
            Ok(contents) => contents,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to read history");
                return Vec::new();
            }
        };

        let mut records: Vec<SavedCalculation> = contents
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| match serde_json::from_str::<SavedCalculation>(line) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(error = %e, "skipping unreadable history line");
                    None
                }
            })
            .filter(|r| r.user_id == user_id)
            .collect();
        records.sort_by(|a, b| b.calculated_at.cmp(&a.calculated_at));
        records
    }

    fn delete(&mut self, user_id: UserId, id: CalculationId) -> bool {
        match self.remove(user_id, id) {
            Ok(removed) => {
                debug!(path = %self.path.display(), user_id, id, removed, "delete calculation");
                removed
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to delete calculation");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loan_engine_core::LoanInputs;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("loan-{name}-{}.jsonl", std::process::id()))
    }

    #[test]
    fn round_trips_history_through_file() {
        let path = temp_path("history");
        fs::remove_file(&path).ok();
        let mut store = JsonLinesStore::new(&path);

        let inputs = LoanInputs::new(250_000.0, 0.045, 360).unwrap();
        assert!(store.save(&SavedCalculation::new(1, inputs).unwrap()));
        assert!(store.save(&SavedCalculation::new(2, inputs).unwrap()));

        let history = store.history(1);
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].inputs, inputs);
        fs::remove_file(&path).ok();
    }

    #[test]
    fn missing_file_is_empty_history() {
        let store = JsonLinesStore::new("/definitely/not/here.jsonl");
        assert!(store.history(1).is_empty());
    }

    #[test]
    fn unreadable_path_is_empty_history() {
        // A directory exists but cannot be read as a file
        let store = JsonLinesStore::new(std::env::temp_dir());
        assert!(store.history(1).is_empty());
    }

    #[test]
    fn delete_rewrites_file_without_the_record() {
        let path = temp_path("delete");
        fs::remove_file(&path).ok();
        let mut store = JsonLinesStore::new(&path);

        let inputs = LoanInputs::new(40_000.0, 0.039, 60).unwrap();
        let kept = SavedCalculation::new(1, inputs).unwrap();
        let removed = SavedCalculation::new(1, inputs).unwrap();
        assert!(store.save(&kept));
        assert!(store.save(&removed));

        assert!(!store.delete(2, removed.id));
        assert!(store.delete(1, removed.id));
        assert!(!store.delete(1, removed.id));

        let ids: Vec<CalculationId> = store.history(1).iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![kept.id]);
        fs::remove_file(&path).ok();
    }

    #[test]
    fn delete_on_missing_file_is_false() {
        let mut store = JsonLinesStore::new(temp_path("absent"));
        assert!(!store.delete(1, 42));
    }
}

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use log::warn;

/// Client-local view counts, one per poll id.
///
/// A best-effort presentation metric: persisted in a JSON file under the
/// platform data directory, never synchronized across clients, and not
/// atomic across concurrent processes. Unreadable or corrupt state starts
/// the affected counts over at zero.
pub struct ViewCounter {
    path: PathBuf,
    counts: HashMap<String, u64>,
}

impl ViewCounter {
    pub fn default_path() -> PathBuf {
        let data_dir = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        data_dir.join("livepoll").join("views.json")
    }

    pub fn load_default() -> Self {
        Self::load(Self::default_path())
    }

    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let counts = match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(counts) => counts,
                Err(err) => {
                    warn!("discarding corrupt view counts at {}: {err}", path.display());
                    HashMap::new()
                }
            },
            Err(_) => HashMap::new(),
        };
        Self { path, counts }
    }

    /// Increments and persists the count for one view activation, returning
    /// the new value. Call once per activation.
    pub fn record_view(&mut self, poll_id: &str) -> u64 {
        let count = self.counts.entry(poll_id.to_string()).or_insert(0);
        *count += 1;
        let count = *count;
        self.persist();
        count
    }

    fn persist(&self) {
        if let Some(parent) = self.path.parent() {
            if let Err(err) = fs::create_dir_all(parent) {
                warn!("failed to create {}: {err}", parent.display());
                return;
            }
        }
        match serde_json::to_string_pretty(&self.counts) {
            Ok(content) => {
                if let Err(err) = fs::write(&self.path, content) {
                    warn!("failed to persist view counts to {}: {err}", self.path.display());
                }
            }
            Err(err) => warn!("failed to serialize view counts: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    fn counter_in(dir: &Path) -> ViewCounter {
        ViewCounter::load(dir.join("views.json"))
    }

    #[test]
    fn record_view_increments_per_poll() {
        let dir = tempfile::tempdir().unwrap();
        let mut counter = counter_in(dir.path());

        assert_eq!(counter.record_view("p1"), 1);
        assert_eq!(counter.record_view("p1"), 2);
        // Counts are independent per poll id.
        assert_eq!(counter.record_view("p2"), 1);
    }

    #[test]
    fn counts_survive_a_reload() {
        let dir = tempfile::tempdir().unwrap();

        let mut counter = counter_in(dir.path());
        counter.record_view("p1");
        counter.record_view("p1");

        let mut reloaded = counter_in(dir.path());
        assert_eq!(reloaded.record_view("p1"), 3);
    }

    #[test]
    fn corrupt_state_starts_over() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("views.json");
        fs::write(&path, "not json").unwrap();

        let mut counter = ViewCounter::load(&path);
        assert_eq!(counter.record_view("p1"), 1);
    }
}

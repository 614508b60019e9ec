use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::input::InputError;
use crate::input::cache::{Fingerprint, fingerprint_file};
use crate::input::load_reference_table;
use crate::model::baseline::BaselineSet;
use crate::pipeline::stage1_baseline::{Stage1Params, build_baselines};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BaselineKey {
    pub source: PathBuf,
    pub features: Vec<String>,
}

#[derive(Debug)]
struct CacheEntry {
    fingerprint: Fingerprint,
    baselines: Arc<BaselineSet>,
}

/// Session-scoped baseline cache keyed by (source path, feature list).
///
/// Each entry remembers the fingerprint of the file it was built from; a lookup whose fresh
/// fingerprint differs rebuilds the entry. Published baselines are shared read-only.
#[derive(Debug, Default)]
pub struct BaselineCache {
    entries: Mutex<HashMap<BaselineKey, CacheEntry>>,
    params: Stage1Params,
    builds: AtomicUsize,
}

impl BaselineCache {
    pub fn new(params: Stage1Params) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            params,
            builds: AtomicUsize::new(0),
        }
    }

    pub fn get_or_build(
        &self,
        source: &Path,
        features: &[String],
    ) -> Result<Arc<BaselineSet>, InputError> {
        if !source.exists() {
            return Err(InputError::MissingInput(format!(
                "reference dataset not found: {}",
                source.display()
            )));
        }
        let key = BaselineKey {
            source: canonical(source),
            features: features.to_vec(),
        };
        let fingerprint = fingerprint_file(&key.source)?;

        // held across the build so a pair is never built twice concurrently
        let mut entries = self.lock();
        if let Some(entry) = entries.get(&key) {
            if entry.fingerprint == fingerprint {
                tracing::debug!(source = %key.source.display(), "baseline cache hit");
                return Ok(Arc::clone(&entry.baselines));
            }
            tracing::info!(
                source = %key.source.display(),
                "reference dataset changed on disk; rebuilding baseline"
            );
            entries.remove(&key);
        }

        let table = load_reference_table(&key.source)?;
        let baselines = Arc::new(build_baselines(&table, features, &self.params));
        self.builds.fetch_add(1, Ordering::SeqCst);
        tracing::info!(
            features = features.len(),
            numeric = baselines.n_numeric(),
            present = baselines.present.len(),
            missing = baselines.missing.len(),
            unavailable = baselines.unavailable.len(),
            "built population baseline"
        );

        entries.insert(
            key,
            CacheEntry {
                fingerprint,
                baselines: Arc::clone(&baselines),
            },
        );
        Ok(baselines)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Number of baseline builds performed so far.
    pub fn builds(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<BaselineKey, CacheEntry>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn canonical(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/session.rs"]
mod tests;

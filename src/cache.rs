//! JSON cache of computed statistics, keyed by the input file's fingerprint.

use std::fs;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::xxh3_64;

use crate::codec::Algorithm;
use crate::error::{Error, Result};
use crate::stats::StatsSet;


const CACHE_VERSION: u32 = 1;


/// Identifies the bytes the statistics were computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fingerprint {
    pub len: u64,
    pub xxh3: u64,
}

impl Fingerprint {
    pub fn of(bytes: &[u8]) -> Self {
        Self {
            len: bytes.len() as u64,
            xxh3: xxh3_64(bytes),
        }
    }
}


#[derive(Debug, Serialize, Deserialize)]
struct CacheFile {
    version: u32,
    source: Fingerprint,
    algorithms: Vec<Algorithm>,
    stats: StatsSet,
}


/// Returns cached statistics when they were computed from the same input with the
/// same algorithms. A missing, unreadable or stale cache is a miss, not an error.
pub fn load(path: &Path, source: Fingerprint, algorithms: &[Algorithm]) -> Option<StatsSet> {

    let file = match fs::File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no stats cache");
            return None;
        },
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "could not open stats cache");
            return None;
        },
    };

    let cached: CacheFile = match serde_json::from_reader(BufReader::new(file)) {
        Ok(cached) => cached,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable stats cache");
            return None;
        },
    };

    if cached.version != CACHE_VERSION || cached.source != source || cached.algorithms != algorithms {
        tracing::info!(path = %path.display(), "stats cache is stale, recomputing");
        return None;
    }

    tracing::info!(path = %path.display(), "loaded pre-computed statistics");
    Some(cached.stats)
}


pub fn store(path: &Path, source: Fingerprint, algorithms: &[Algorithm], stats: &StatsSet) -> Result<()> {

    let file = fs::File::create(path).map_err(|source| Error::WriteOutput {
        path: path.to_path_buf(),
        source,
    })?;

    let mut writer = BufWriter::new(file);

    let cached = CacheFile {
        version: CACHE_VERSION,
        source,
        algorithms: algorithms.to_vec(),
        stats: stats.clone(),
    };

    serde_json::to_writer(&mut writer, &cached).map_err(|source| Error::Cache {
        path: path.to_path_buf(),
        source,
    })?;

    writer.flush().map_err(|source| Error::WriteOutput {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::debug!(path = %path.display(), "saved statistics");
    Ok(())
}


#[cfg(test)]
mod tests {

    use crate::bible::Bible;

    use super::*;


    fn sample() -> (Fingerprint, StatsSet) {
        let bytes = fs::read("test_data/sample.xml").unwrap();
        let bible = Bible::from_bytes(&bytes).unwrap();
        (Fingerprint::of(&bytes), StatsSet::compute(&bible, &Algorithm::STANDARD).unwrap())
    }


    #[test]
    fn round_trips_through_disk() {

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.json");
        let (fingerprint, stats) = sample();

        store(&path, fingerprint, &Algorithm::STANDARD, &stats).unwrap();

        assert_eq!(load(&path, fingerprint, &Algorithm::STANDARD), Some(stats));
    }


    #[test]
    fn stale_cache_is_a_miss() {

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.json");
        let (fingerprint, stats) = sample();

        store(&path, fingerprint, &Algorithm::STANDARD, &stats).unwrap();

        let other_input = Fingerprint::of(b"<XMLBIBLE/>");
        assert!(load(&path, other_input, &Algorithm::STANDARD).is_none());
        assert!(load(&path, fingerprint, &Algorithm::ALL).is_none());
    }


    #[test]
    fn missing_or_corrupt_cache_is_a_miss() {

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.json");
        let fingerprint = Fingerprint::of(b"x");

        assert!(load(&path, fingerprint, &Algorithm::STANDARD).is_none());

        fs::write(&path, "{ not json").unwrap();
        assert!(load(&path, fingerprint, &Algorithm::STANDARD).is_none());
    }


    #[test]
    fn unwritable_path_fails() {

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing_dir").join("stats.json");
        let (fingerprint, stats) = sample();

        let err = store(&path, fingerprint, &Algorithm::STANDARD, &stats).unwrap_err();
        assert!(matches!(err, Error::WriteOutput { .. }), "{err:?}");
    }

}

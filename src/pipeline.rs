use std::fs;
use std::io::Write;
use std::path::PathBuf;

use crate::bible::Bible;
use crate::cache::{self, Fingerprint};
use crate::chart;
use crate::config::{OutputKind, Settings};
use crate::error::{Error, Result};
use crate::report;
use crate::stats::StatsSet;


/// Reads the input and returns its statistics, from the cache when it is still valid.
pub fn load_or_compute(settings: &Settings) -> Result<StatsSet> {

    let bytes = fs::read(&settings.input).map_err(|source| Error::ReadInput {
        path: settings.input.clone(),
        source,
    })?;

    let fingerprint = Fingerprint::of(&bytes);

    if let Some(path) = &settings.cache {
        if let Some(stats) = cache::load(path, fingerprint, &settings.algorithms) {
            return Ok(stats);
        }
    }

    tracing::info!(input = %settings.input.display(), "parsing bible");
    let bible = Bible::from_bytes(&bytes)?;

    tracing::info!(algorithms = ?settings.algorithms, "calculating compression statistics");
    let stats = StatsSet::compute(&bible, &settings.algorithms)?;

    if let Some(path) = &settings.cache {
        // A cache that cannot be written only costs the next run time.
        if let Err(e) = cache::store(path, fingerprint, &settings.algorithms, &stats) {
            tracing::warn!(error = %e, "could not save statistics");
        }
    }

    Ok(stats)
}


/// Writes the selected table in the requested form. Terminal output goes to `out`.
/// Returns the path of the written file, if any.
pub fn emit(settings: &Settings, stats: &StatsSet, out: &mut impl Write) -> Result<Option<PathBuf>> {

    let table = stats.table(settings.granularity);
    let rows = table.extremes(settings.top_bottom);
    let title = settings.title();

    let path = match (settings.output, settings.output_path()) {
        (OutputKind::Plot, Some(path)) => {
            create_out_dir(settings)?;
            chart::render_png(&path, &title, &table.algorithms, &rows)?;
            path
        },
        (OutputKind::Text, Some(path)) => {
            create_out_dir(settings)?;
            report::write_text(&path, &table.algorithms, &rows)?;
            path
        },
        (OutputKind::Csv, Some(path)) => {
            create_out_dir(settings)?;
            report::write_csv(&path, &table.algorithms, &rows)?;
            path
        },
        _ => {
            report::print_table(out, &title, &table.algorithms, &rows)?;
            return Ok(None);
        },
    };

    tracing::info!(path = %path.display(), rows = rows.len(), "saved {}", settings.output);
    Ok(Some(path))
}


fn create_out_dir(settings: &Settings) -> Result<()> {

    if settings.out_dir.as_os_str().is_empty() {
        return Ok(());
    }

    fs::create_dir_all(&settings.out_dir).map_err(|source| Error::WriteOutput {
        path: settings.out_dir.clone(),
        source,
    })
}

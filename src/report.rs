//! Tabular outputs: terminal table, plain text file and CSV.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::codec::Algorithm;
use crate::error::{Error, Result};
use crate::stats::UnitStats;


const ITEM_WIDTH: usize = 30;
const VALUE_WIDTH: usize = 10;


pub fn print_table(out: &mut impl Write, title: &str, algorithms: &[Algorithm], rows: &[&UnitStats]) -> io::Result<()> {

    let rule = "-".repeat(ITEM_WIDTH + (VALUE_WIDTH + 1) * (algorithms.len() + 1));

    writeln!(out, "\n{title}")?;
    writeln!(out, "{rule}")?;

    write!(out, "{:<ITEM_WIDTH$}", "Item")?;
    for algorithm in algorithms {
        write!(out, " {:>VALUE_WIDTH$}", algorithm.name())?;
    }
    writeln!(out, " {:>VALUE_WIDTH$}", "Average")?;
    writeln!(out, "{rule}")?;

    write_rows(out, algorithms, rows)?;

    writeln!(out, "\nNote: Compression ratio is the size of the compressed text divided by the size of the original text.")?;
    writeln!(out, "A lower ratio indicates better compression efficiency.")
}


fn write_rows(out: &mut impl Write, algorithms: &[Algorithm], rows: &[&UnitStats]) -> io::Result<()> {

    for row in rows {
        write!(out, "{:<ITEM_WIDTH$}", row.label)?;
        for &algorithm in algorithms {
            match row.ratio(algorithm) {
                Some(ratio) => write!(out, " {ratio:>VALUE_WIDTH$.2}")?,
                None => write!(out, " {:>VALUE_WIDTH$}", "-")?,
            }
        }
        writeln!(out, " {:>VALUE_WIDTH$.2}", row.average())?;
    }

    Ok(())
}


/// Same rows as [`print_table`], without header or notes.
pub fn write_text(path: &Path, algorithms: &[Algorithm], rows: &[&UnitStats]) -> Result<()> {

    let write_error = |source| Error::WriteOutput { path: path.to_path_buf(), source };

    let mut out = BufWriter::new(File::create(path).map_err(write_error)?);

    write_rows(&mut out, algorithms, rows).map_err(write_error)?;
    out.flush().map_err(write_error)
}


pub fn write_csv(path: &Path, algorithms: &[Algorithm], rows: &[&UnitStats]) -> Result<()> {

    let file = File::create(path).map_err(|source| Error::WriteOutput {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = csv::Writer::from_writer(file);

    let header = std::iter::once("Item")
        .chain(algorithms.iter().map(|a| a.name()))
        .chain(std::iter::once("Average"));
    writer.write_record(header)?;

    for row in rows {
        let ratios = algorithms.iter()
            .map(|&algorithm| row.ratio(algorithm).map(|r| r.to_string()).unwrap_or_default());

        let record = std::iter::once(row.label.clone())
            .chain(ratios)
            .chain(std::iter::once(row.average().to_string()));

        writer.write_record(record)?;
    }

    writer.flush()?;
    Ok(())
}

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::codec::Algorithm;


pub type Result<T, E = Error> = std::result::Result<T, E>;


#[derive(Debug, Error)]
pub enum Error {

    #[error("could not read {}: {source}", path.display())]
    ReadInput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed XML at byte {position}: {source}")]
    Xml {
        position: u64,
        #[source]
        source: quick_xml::Error,
    },

    #[error("malformed bible text at byte {position}: {message}")]
    Malformed { position: u64, message: String },

    #[error("<{element}> at byte {position} is missing the `{attribute}` attribute")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
        position: u64,
    },

    #[error("no <BIBLEBOOK> elements found")]
    NoBooks,

    #[error("{algorithm} compression failed: {source}")]
    Compress {
        algorithm: Algorithm,
        #[source]
        source: io::Error,
    },

    #[error("stats cache {}: {source}", path.display())]
    Cache {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("chart rendering failed: {0}")]
    Chart(String),

    #[error("nothing to plot: the selected table has no rows")]
    NothingToPlot,

    #[error("prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error(transparent)]
    UnknownChoice(#[from] UnknownChoice),

    #[error("could not write {}: {source}", path.display())]
    WriteOutput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("io error: {0}")]
    Io(#[from] io::Error),

}


/// A command-line or prompt value that names no known option.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown {kind} `{value}` (expected one of: {expected})")]
pub struct UnknownChoice {
    pub kind: &'static str,
    pub value: String,
    pub expected: &'static str,
}

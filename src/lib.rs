//! Measures how well general-purpose compressors shrink the text of a bible,
//! per book, chapter or verse.

mod bitvec;
pub mod bible;
pub mod cache;
pub mod chart;
pub mod codec;
pub mod config;
pub mod error;
pub mod ftree;
pub mod logging;
pub mod pipeline;
pub mod prompt;
pub mod report;
pub mod stats;

pub use bible::{Bible, Book, Chapter, Granularity, Unit, Verse};
pub use codec::Algorithm;
pub use config::{Choices, OutputKind, Settings};
pub use error::{Error, Result};
pub use stats::{StatsSet, StatsTable, UnitStats};

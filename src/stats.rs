use std::collections::BTreeMap;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::bible::{Bible, Granularity, Unit};
use crate::codec::Algorithm;
use crate::error::Result;


/// Raw and compressed sizes of one text unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitStats {
    pub label: String,
    pub raw_len: usize,
    pub compressed: BTreeMap<Algorithm, usize>,
}

impl UnitStats {

    /// `compressed / raw` for one algorithm; lower is better.
    pub fn ratio(&self, algorithm: Algorithm) -> Option<f64> {
        self.compressed.get(&algorithm)
            .map(|&len| len as f64 / self.raw_len as f64)
    }


    /// Mean ratio over every measured algorithm.
    pub fn average(&self) -> f64 {
        let sum: f64 = self.compressed.keys()
            .filter_map(|&algorithm| self.ratio(algorithm))
            .sum();
        sum / self.compressed.len() as f64
    }

}


/// Measures one unit. Empty units have no defined ratio and yield `None`.
pub fn measure(unit: &Unit, algorithms: &[Algorithm]) -> Result<Option<UnitStats>> {

    let raw = unit.text.as_bytes();

    if raw.is_empty() {
        tracing::warn!(unit = %unit.label(), "skipping empty unit");
        return Ok(None);
    }

    let compressed: BTreeMap<Algorithm, usize> = algorithms.iter()
        .map(|&algorithm| Ok((algorithm, algorithm.compressed_len(raw)?)))
        .collect::<Result<_>>()?;

    Ok(Some(UnitStats {
        label: unit.label(),
        raw_len: raw.len(),
        compressed,
    }))
}


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsTable {
    pub granularity: Granularity,
    pub algorithms: Vec<Algorithm>,
    /// Document order.
    pub rows: Vec<UnitStats>,
}

impl StatsTable {

    pub fn compute(units: &[Unit], granularity: Granularity, algorithms: &[Algorithm]) -> Result<Self> {

        let mut rows = Vec::with_capacity(units.len());
        for unit in units {
            if let Some(stats) = measure(unit, algorithms)? {
                rows.push(stats);
            }
        }

        Ok(Self {
            granularity,
            algorithms: algorithms.to_vec(),
            rows,
        })
    }


    /// Rows by ascending average ratio. Ties keep document order.
    pub fn sorted_by_average(&self) -> Vec<&UnitStats> {
        let mut sorted: Vec<&UnitStats> = self.rows.iter().collect();
        sorted.sort_by(|a, b| a.average().total_cmp(&b.average()));
        sorted
    }


    /// The `n` best and `n` worst rows, best first. `n == 0` selects everything.
    pub fn extremes(&self, n: usize) -> Vec<&UnitStats> {

        let mut sorted = self.sorted_by_average();

        if n == 0 || n.saturating_mul(2) >= sorted.len() {
            return sorted;
        }

        let tail = sorted.split_off(sorted.len() - n);
        sorted.truncate(n);
        sorted.extend(tail);
        sorted
    }

}


/// Tables for every granularity, computed in one pass over the bible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsSet {
    pub books: StatsTable,
    pub chapters: StatsTable,
    pub verses: StatsTable,
}

impl StatsSet {

    pub fn compute(bible: &Bible, algorithms: &[Algorithm]) -> Result<Self> {

        let start = Instant::now();

        let table = |granularity| StatsTable::compute(&bible.units(granularity), granularity, algorithms);

        let set = Self {
            books: table(Granularity::Books)?,
            chapters: table(Granularity::Chapters)?,
            verses: table(Granularity::Verses)?,
        };

        tracing::info!(
            books = set.books.rows.len(),
            chapters = set.chapters.rows.len(),
            verses = set.verses.rows.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "computed compression statistics"
        );

        Ok(set)
    }


    pub fn table(&self, granularity: Granularity) -> &StatsTable {
        match granularity {
            Granularity::Books => &self.books,
            Granularity::Chapters => &self.chapters,
            Granularity::Verses => &self.verses,
        }
    }

}


#[cfg(test)]
mod tests {

    use proptest::prelude::*;

    use super::*;


    fn unit(book: &str, text: &str) -> Unit {
        Unit {
            book: book.to_string(),
            chapter: None,
            verse: None,
            text: text.to_string(),
        }
    }


    fn row(label: &str, raw_len: usize, sizes: &[usize]) -> UnitStats {
        UnitStats {
            label: label.to_string(),
            raw_len,
            compressed: Algorithm::STANDARD.into_iter().zip(sizes.iter().copied()).collect(),
        }
    }


    fn table(rows: Vec<UnitStats>) -> StatsTable {
        StatsTable {
            granularity: Granularity::Books,
            algorithms: Algorithm::STANDARD.to_vec(),
            rows,
        }
    }


    #[test]
    fn book_ratios_are_within_bounds() {

        let bible = Bible::from_path("test_data/sample.xml").unwrap();

        let books = StatsTable::compute(&bible.units(Granularity::Books), Granularity::Books, &Algorithm::STANDARD).unwrap();

        assert_eq!(books.rows.len(), 3);
        for row in &books.rows {
            for algorithm in Algorithm::STANDARD {
                let ratio = row.ratio(algorithm).unwrap();
                assert!(ratio > 0.0 && ratio <= 1.0, "{} {algorithm}: {ratio}", row.label);
            }
        }
    }


    #[test]
    fn computing_twice_gives_identical_results() {

        let bible = Bible::from_path("test_data/sample.xml").unwrap();

        let first = StatsSet::compute(&bible, &Algorithm::ALL).unwrap();
        let second = StatsSet::compute(&bible, &Algorithm::ALL).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.verses.rows.len(), bible.verse_count());
    }


    #[test]
    fn empty_units_are_skipped() {

        assert!(measure(&unit("Empty", ""), &Algorithm::STANDARD).unwrap().is_none());

        let units = [unit("A", "some text to compress"), unit("B", "")];
        let table = StatsTable::compute(&units, Granularity::Books, &Algorithm::STANDARD).unwrap();

        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].label, "A");
    }


    #[test]
    fn average_and_ratio() {

        let r = row("A", 100, &[10, 20, 30, 40]);

        assert_eq!(r.ratio(Algorithm::Gzip), Some(0.1));
        assert_eq!(r.ratio(Algorithm::FrequencyTree), None);
        assert!((r.average() - 0.25).abs() < 1e-12);
    }


    #[test]
    fn sorting_is_stable() {

        let t = table(vec![
            row("worst", 100, &[90, 90, 90, 90]),
            row("tie-1", 100, &[50, 50, 50, 50]),
            row("best", 100, &[10, 10, 10, 10]),
            row("tie-2", 100, &[50, 50, 50, 50]),
        ]);

        let labels: Vec<_> = t.sorted_by_average().iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, ["best", "tie-1", "tie-2", "worst"]);
    }


    #[test]
    fn extremes_selection() {

        let t = table((0..10).map(|i| row(&i.to_string(), 100, &[i * 5 + 1; 4])).collect());

        let labels = |n| t.extremes(n).iter().map(|r| r.label.clone()).collect::<Vec<_>>();

        assert_eq!(labels(2), ["0", "1", "8", "9"]);
        assert_eq!(labels(0).len(), 10);
        // overlapping halves select everything once
        assert_eq!(labels(5).len(), 10);
        assert_eq!(labels(7).len(), 10);
    }


    proptest! {

        #[test]
        fn ratios_are_positive(text in "[a-zA-Z ,.;:]{1,400}") {
            let stats = measure(&unit("P", &text), &Algorithm::ALL).unwrap().unwrap();
            for algorithm in Algorithm::ALL {
                prop_assert!(stats.ratio(algorithm).unwrap() > 0.0);
            }
        }


        #[test]
        fn realistic_text_never_grows(words in proptest::collection::vec("[a-z]{2,8}", 400..800)) {
            let text = words.join(" ");
            let stats = measure(&unit("P", &text), &Algorithm::STANDARD).unwrap().unwrap();
            for algorithm in Algorithm::STANDARD {
                prop_assert!(stats.ratio(algorithm).unwrap() <= 1.0);
            }
        }

    }

}

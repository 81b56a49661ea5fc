//! Run settings, resolved from flags first, then prompts, then defaults.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::bible::Granularity;
use crate::codec::Algorithm;
use crate::error::{Result, UnknownChoice};
use crate::prompt::Prompt;


pub const DEFAULT_INPUT: &str = "bible.xml";
pub const DEFAULT_CACHE: &str = "bible_compression_stats.json";


impl Granularity {

    pub const ALL: [Granularity; 3] = [Granularity::Books, Granularity::Chapters, Granularity::Verses];


    pub const fn label(self) -> &'static str {
        match self {
            Granularity::Books => "Books",
            Granularity::Chapters => "Chapters",
            Granularity::Verses => "Verses",
        }
    }


    pub const fn title(self) -> &'static str {
        match self {
            Granularity::Books => "Book Compression Ratios",
            Granularity::Chapters => "Chapter Compression Ratios",
            Granularity::Verses => "Verse Compression Ratios",
        }
    }


    pub const fn file_stem(self) -> &'static str {
        match self {
            Granularity::Books => "book_compression",
            Granularity::Chapters => "chapter_compression",
            Granularity::Verses => "verse_compression",
        }
    }

}

impl FromStr for Granularity {
    type Err = UnknownChoice;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Granularity::ALL.into_iter()
            .find(|g| g.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownChoice {
                kind: "granularity",
                value: s.to_string(),
                expected: "books, chapters, verses",
            })
    }
}


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    Print,
    Plot,
    Text,
    Csv,
}

impl OutputKind {

    pub const ALL: [OutputKind; 4] = [OutputKind::Print, OutputKind::Plot, OutputKind::Text, OutputKind::Csv];


    pub const fn label(self) -> &'static str {
        match self {
            OutputKind::Print => "Print",
            OutputKind::Plot => "Plot",
            OutputKind::Text => "Save as Text",
            OutputKind::Csv => "Save as CSV",
        }
    }


    const fn flag(self) -> &'static str {
        match self {
            OutputKind::Print => "print",
            OutputKind::Plot => "plot",
            OutputKind::Text => "text",
            OutputKind::Csv => "csv",
        }
    }


    /// File name suffix, `None` for terminal output.
    pub const fn file_suffix(self) -> Option<&'static str> {
        match self {
            OutputKind::Print => None,
            OutputKind::Plot => Some("_ratios.png"),
            OutputKind::Text => Some("_stats.txt"),
            OutputKind::Csv => Some("_stats.csv"),
        }
    }

}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.flag())
    }
}

impl FromStr for OutputKind {
    type Err = UnknownChoice;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        OutputKind::ALL.into_iter()
            .find(|kind| kind.flag().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownChoice {
                kind: "output",
                value: s.to_string(),
                expected: "print, plot, text, csv",
            })
    }
}


/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub input: PathBuf,
    pub granularity: Granularity,
    pub output: OutputKind,
    /// Best and worst units to show; 0 shows all.
    pub top_bottom: usize,
    pub out_dir: PathBuf,
    pub algorithms: Vec<Algorithm>,
    /// `None` disables the stats cache.
    pub cache: Option<PathBuf>,
}

impl Settings {

    pub fn title(&self) -> String {
        match self.top_bottom {
            0 => self.granularity.title().to_string(),
            n => format!("{} (Top and Bottom {n})", self.granularity.title()),
        }
    }


    pub fn file_stem(&self) -> String {
        match self.top_bottom {
            0 => self.granularity.file_stem().to_string(),
            n => format!("{}_top_bottom_{n}", self.granularity.file_stem()),
        }
    }


    pub fn output_path(&self) -> Option<PathBuf> {
        self.output.file_suffix()
            .map(|suffix| self.out_dir.join(format!("{}{suffix}", self.file_stem())))
    }

}


/// Settings given up front; anything left `None` is asked for or defaulted.
#[derive(Debug, Clone, Default)]
pub struct Choices {
    pub input: Option<PathBuf>,
    pub granularity: Option<Granularity>,
    pub output: Option<OutputKind>,
    pub top_bottom: Option<usize>,
    pub out_dir: Option<PathBuf>,
    pub algorithms: Option<Vec<Algorithm>>,
    pub cache: Option<PathBuf>,
    pub no_cache: bool,
}

impl Choices {

    /// Fills the gaps. Without a prompt every gap takes its default.
    /// `xml_candidates` are offered when asking for the input file.
    pub fn resolve(self, mut prompt: Option<&mut dyn Prompt>, xml_candidates: &[PathBuf]) -> Result<Settings> {

        let input = match (self.input, prompt.as_deref_mut()) {
            (Some(input), _) => input,
            (None, Some(prompt)) => ask_input(prompt, xml_candidates)?,
            (None, None) => PathBuf::from(DEFAULT_INPUT),
        };

        let granularity = match (self.granularity, prompt.as_deref_mut()) {
            (Some(granularity), _) => granularity,
            (None, Some(prompt)) => {
                let labels = Granularity::ALL.map(Granularity::label);
                let i = prompt.select("What type of analysis would you like to perform?", &labels, 0)?;
                Granularity::ALL[i]
            },
            (None, None) => Granularity::Books,
        };

        let output = match (self.output, prompt.as_deref_mut()) {
            (Some(output), _) => output,
            (None, Some(prompt)) => {
                let labels = OutputKind::ALL.map(OutputKind::label);
                let i = prompt.select("How would you like to output the results?", &labels, 1)?;
                OutputKind::ALL[i]
            },
            (None, None) => OutputKind::Plot,
        };

        let top_bottom = match (self.top_bottom, prompt.as_deref_mut()) {
            (Some(n), _) => n,
            (None, Some(prompt)) => {
                let answer = prompt.text(
                    "How many top and bottom items to show? (Enter 0 for all)",
                    "0",
                    &validate_count,
                )?;
                // validated above
                answer.trim().parse().unwrap_or(0)
            },
            (None, None) => 0,
        };

        let out_dir = match (self.out_dir, prompt.as_deref_mut()) {
            (Some(dir), _) => dir,
            (None, Some(prompt)) if output.file_suffix().is_some() => {
                PathBuf::from(prompt.text("Output directory", ".", &|_| Ok(()))?)
            },
            (None, _) => PathBuf::from("."),
        };

        let cache = match (self.no_cache, self.cache) {
            (true, _) => None,
            (false, cache) => Some(cache.unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE))),
        };

        Ok(Settings {
            input,
            granularity,
            output,
            top_bottom,
            out_dir,
            algorithms: self.algorithms
                .filter(|algorithms| !algorithms.is_empty())
                .unwrap_or_else(|| Algorithm::STANDARD.to_vec()),
            cache,
        })
    }

}


fn ask_input(prompt: &mut dyn Prompt, candidates: &[PathBuf]) -> Result<PathBuf> {

    if candidates.is_empty() {
        let answer = prompt.text("Path to the bible XML file", DEFAULT_INPUT, &|s| {
            if s.trim().is_empty() { Err("enter a file path".to_string()) } else { Ok(()) }
        })?;
        return Ok(PathBuf::from(answer.trim()));
    }

    let labels: Vec<String> = candidates.iter().map(|p| p.display().to_string()).collect();
    let items: Vec<&str> = labels.iter().map(String::as_str).collect();
    let default = candidates.iter()
        .position(|p| p.file_name().is_some_and(|name| name == DEFAULT_INPUT))
        .unwrap_or(0);

    let i = prompt.select("Which translation file should be analysed?", &items, default)?;
    Ok(candidates[i].clone())
}


fn validate_count(input: &str) -> Result<(), String> {
    let input = input.trim();
    if !input.is_empty() && input.bytes().all(|b| b.is_ascii_digit()) && input.parse::<usize>().is_ok() {
        Ok(())
    } else {
        Err("enter a whole number".to_string())
    }
}


/// `*.xml` files directly inside `dir`, sorted by name.
pub fn xml_candidates(dir: &Path) -> io::Result<Vec<PathBuf>> {

    let mut found = Vec::new();

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_xml = path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("xml"));
        if is_xml && path.is_file() {
            found.push(path);
        }
    }

    found.sort();
    Ok(found)
}


#[cfg(test)]
mod tests {

    use std::collections::VecDeque;

    use super::*;


    enum Answer {
        Select(usize),
        Text(&'static str),
    }


    /// Replays answers in order and records the questions asked.
    #[derive(Default)]
    struct Scripted {
        answers: VecDeque<Answer>,
        asked: Vec<String>,
    }

    impl Scripted {
        fn new(answers: impl IntoIterator<Item = Answer>) -> Self {
            Self {
                answers: answers.into_iter().collect(),
                asked: Vec::new(),
            }
        }
    }

    impl Prompt for Scripted {

        fn select(&mut self, message: &str, items: &[&str], _default: usize) -> Result<usize> {
            self.asked.push(message.to_string());
            match self.answers.pop_front() {
                Some(Answer::Select(i)) if i < items.len() => Ok(i),
                _ => panic!("unexpected select: {message}"),
            }
        }

        fn text(&mut self, message: &str, _default: &str, validate: &dyn Fn(&str) -> Result<(), String>) -> Result<String> {
            self.asked.push(message.to_string());
            match self.answers.pop_front() {
                Some(Answer::Text(text)) => {
                    validate(text).unwrap_or_else(|e| panic!("{message}: {text} rejected: {e}"));
                    Ok(text.to_string())
                },
                _ => panic!("unexpected text prompt: {message}"),
            }
        }

    }


    #[test]
    fn defaults_without_prompt() {

        let settings = Choices::default().resolve(None, &[]).unwrap();

        assert_eq!(settings.input, PathBuf::from("bible.xml"));
        assert_eq!(settings.granularity, Granularity::Books);
        assert_eq!(settings.output, OutputKind::Plot);
        assert_eq!(settings.top_bottom, 0);
        assert_eq!(settings.algorithms, Algorithm::STANDARD);
        assert_eq!(settings.cache, Some(PathBuf::from(DEFAULT_CACHE)));
        assert_eq!(settings.output_path(), Some(PathBuf::from("./book_compression_ratios.png")));
    }


    #[test]
    fn prompts_fill_the_gaps() {

        let candidates = [PathBuf::from("./asv.xml"), PathBuf::from("./bible.xml")];
        let mut prompt = Scripted::new([
            Answer::Select(0),
            Answer::Select(1),
            Answer::Select(3),
            Answer::Text("5"),
            Answer::Text("out"),
        ]);

        let settings = Choices::default().resolve(Some(&mut prompt), &candidates).unwrap();

        assert_eq!(prompt.asked.len(), 5);
        assert_eq!(settings.input, PathBuf::from("./asv.xml"));
        assert_eq!(settings.granularity, Granularity::Chapters);
        assert_eq!(settings.output, OutputKind::Csv);
        assert_eq!(settings.title(), "Chapter Compression Ratios (Top and Bottom 5)");
        assert_eq!(
            settings.output_path(),
            Some(PathBuf::from("out/chapter_compression_top_bottom_5_stats.csv"))
        );
    }


    #[test]
    fn flags_skip_prompts() {

        let choices = Choices {
            input: Some(PathBuf::from("kjv.xml")),
            granularity: Some(Granularity::Verses),
            output: Some(OutputKind::Print),
            top_bottom: Some(3),
            no_cache: true,
            ..Choices::default()
        };
        let mut prompt = Scripted::default();

        let settings = choices.resolve(Some(&mut prompt), &[]).unwrap();

        assert!(prompt.asked.is_empty());
        assert_eq!(settings.cache, None);
        assert_eq!(settings.output_path(), None);
        assert_eq!(settings.file_stem(), "verse_compression_top_bottom_3");
    }


    #[test]
    fn asks_for_a_path_without_candidates() {

        let choices = Choices {
            granularity: Some(Granularity::Books),
            output: Some(OutputKind::Print),
            top_bottom: Some(0),
            ..Choices::default()
        };
        let mut prompt = Scripted::new([Answer::Text(" my bible.xml ")]);

        let settings = choices.resolve(Some(&mut prompt), &[]).unwrap();

        assert_eq!(settings.input, PathBuf::from("my bible.xml"));
    }


    #[test]
    fn count_validation() {
        assert!(validate_count("0").is_ok());
        assert!(validate_count(" 12 ").is_ok());
        assert!(validate_count("").is_err());
        assert!(validate_count("-1").is_err());
        assert!(validate_count("ten").is_err());
    }


    #[test]
    fn parses_flag_values() {
        assert_eq!("chapters".parse::<Granularity>().unwrap(), Granularity::Chapters);
        assert_eq!("CSV".parse::<OutputKind>().unwrap(), OutputKind::Csv);
        assert!("pie".parse::<OutputKind>().is_err());
    }


    #[test]
    fn finds_xml_files() {

        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.xml"), "").unwrap();
        fs::write(dir.path().join("a.XML"), "").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();
        fs::create_dir(dir.path().join("dir.xml")).unwrap();

        let found = xml_candidates(dir.path()).unwrap();

        let names: Vec<_> = found.iter().map(|p| p.file_name().unwrap().to_str().unwrap()).collect();
        assert_eq!(names, ["a.XML", "b.xml"]);
    }

}

//! Zefania XML bible loader.
//!
//! Only the three structural elements matter:
//!
//! ```xml
//! <BIBLEBOOK bnumber="1" bname="Genesis">
//!   <CHAPTER cnumber="1">
//!     <VERS vnumber="1">In the beginning God created the heaven and the earth.</VERS>
//! ```
//!
//! They may sit at any depth. Inline markup inside a verse contributes its text,
//! `<NOTE>` contents are dropped.

use std::fs;
use std::io::BufRead;
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};


#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bible {
    pub books: Vec<Book>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub name: String,
    pub chapters: Vec<Chapter>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    pub number: String,
    pub verses: Vec<Verse>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verse {
    pub number: String,
    pub text: String,
}


/// What one text unit covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Books,
    Chapters,
    Verses,
}


/// One compression input: a book, a chapter or a verse worth of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit {
    pub book: String,
    pub chapter: Option<String>,
    pub verse: Option<String>,
    pub text: String,
}

impl Unit {

    /// `Genesis`, `Genesis 1` or `Genesis 1:1`.
    pub fn label(&self) -> String {
        match (&self.chapter, &self.verse) {
            (Some(chapter), Some(verse)) => format!("{} {}:{}", self.book, chapter, verse),
            (Some(chapter), None) => format!("{} {}", self.book, chapter),
            _ => self.book.clone(),
        }
    }

}


impl Bible {

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| Error::ReadInput {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(&bytes)
    }


    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_reader(bytes)
    }


    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {

        let bible = Parser::new(Reader::from_reader(reader)).run()?;

        tracing::debug!(
            books = bible.books.len(),
            chapters = bible.chapter_count(),
            verses = bible.verse_count(),
            "parsed bible"
        );

        Ok(bible)
    }


    pub fn chapter_count(&self) -> usize {
        self.books.iter().map(|b| b.chapters.len()).sum()
    }


    pub fn verse_count(&self) -> usize {
        self.books.iter()
            .flat_map(|b| &b.chapters)
            .map(|c| c.verses.len())
            .sum()
    }


    /// Text units of one granularity, in document order.
    pub fn units(&self, granularity: Granularity) -> Vec<Unit> {
        match granularity {

            Granularity::Books => self.books.iter()
                .map(|book| Unit {
                    book: book.name.clone(),
                    chapter: None,
                    verse: None,
                    text: join_verses(book.chapters.iter().flat_map(|c| &c.verses)),
                })
                .collect(),

            Granularity::Chapters => self.books.iter()
                .flat_map(|book| book.chapters.iter().map(move |chapter| Unit {
                    book: book.name.clone(),
                    chapter: Some(chapter.number.clone()),
                    verse: None,
                    text: join_verses(&chapter.verses),
                }))
                .collect(),

            Granularity::Verses => self.books.iter()
                .flat_map(|book| book.chapters.iter().map(move |chapter| (book, chapter)))
                .flat_map(|(book, chapter)| chapter.verses.iter().map(move |verse| Unit {
                    book: book.name.clone(),
                    chapter: Some(chapter.number.clone()),
                    verse: Some(verse.number.clone()),
                    text: verse.text.clone(),
                }))
                .collect(),
        }
    }

}


fn join_verses<'a>(verses: impl IntoIterator<Item = &'a Verse>) -> String {
    verses.into_iter()
        .map(|v| v.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}


struct Parser<R> {
    reader: Reader<R>,
    books: Vec<Book>,
    book: Option<Book>,
    chapter: Option<Chapter>,
    verse: Option<Verse>,
    /// Open `<NOTE>` elements inside the current verse.
    note_depth: usize,
}

impl<R: BufRead> Parser<R> {

    fn new(reader: Reader<R>) -> Self {
        Self {
            reader,
            books: Vec::new(),
            book: None,
            chapter: None,
            verse: None,
            note_depth: 0,
        }
    }


    fn run(mut self) -> Result<Bible> {

        let mut buf = Vec::new();

        loop {
            let event = self.reader.read_event_into(&mut buf).map_err(|source| Error::Xml {
                position: self.reader.error_position() as u64,
                source,
            })?;

            match event {
                Event::Start(ref e) => self.open(e)?,
                Event::Empty(ref e) => {
                    self.open(e)?;
                    self.close(e.name().as_ref())?;
                },
                Event::End(ref e) => self.close(e.name().as_ref())?,
                Event::Text(ref e) if self.collecting() => {
                    let text = e.unescape().map_err(|source| Error::Xml {
                        position: self.reader.buffer_position() as u64,
                        source,
                    })?;
                    self.push_text(&text);
                },
                Event::CData(ref e) if self.collecting() => {
                    let text = self.reader.decoder().decode(e).map_err(|source| Error::Xml {
                        position: self.reader.buffer_position() as u64,
                        source: source.into(),
                    })?;
                    self.push_text(&text);
                },
                Event::Eof => break,
                _ => {}
            }

            buf.clear();
        }

        let open = [
            (self.verse.is_some(), "VERS"),
            (self.chapter.is_some(), "CHAPTER"),
            (self.book.is_some(), "BIBLEBOOK"),
        ];
        if let Some((_, element)) = open.into_iter().find(|(is_open, _)| *is_open) {
            return Err(self.malformed(format!("unexpected end of file inside <{element}>")));
        }

        if self.books.is_empty() {
            return Err(Error::NoBooks);
        }

        Ok(Bible { books: self.books })
    }


    fn collecting(&self) -> bool {
        self.verse.is_some() && self.note_depth == 0
    }


    fn push_text(&mut self, text: &str) {
        if let Some(verse) = self.verse.as_mut() {
            verse.text.push_str(text);
        }
    }


    fn open(&mut self, e: &BytesStart) -> Result<()> {
        match e.name().as_ref() {

            b"BIBLEBOOK" => {
                if self.book.is_some() {
                    return Err(self.malformed("nested <BIBLEBOOK>".into()));
                }
                self.book = Some(Book {
                    name: self.required_attr(e, "BIBLEBOOK", "bname")?,
                    chapters: Vec::new(),
                });
            },

            b"CHAPTER" => {
                if self.book.is_none() || self.chapter.is_some() {
                    return Err(self.malformed("<CHAPTER> must sit inside a <BIBLEBOOK> and not inside another <CHAPTER>".into()));
                }
                self.chapter = Some(Chapter {
                    number: self.required_attr(e, "CHAPTER", "cnumber")?,
                    verses: Vec::new(),
                });
            },

            b"VERS" => {
                if self.chapter.is_none() || self.verse.is_some() {
                    return Err(self.malformed("<VERS> must sit inside a <CHAPTER> and not inside another <VERS>".into()));
                }
                self.verse = Some(Verse {
                    number: self.required_attr(e, "VERS", "vnumber")?,
                    text: String::new(),
                });
            },

            b"NOTE" if self.verse.is_some() => self.note_depth += 1,

            _ => {}
        }

        Ok(())
    }


    fn close(&mut self, name: &[u8]) -> Result<()> {
        match name {

            b"VERS" => {
                if let (Some(mut verse), Some(chapter)) = (self.verse.take(), self.chapter.as_mut()) {
                    let trimmed = verse.text.trim();
                    if trimmed.len() != verse.text.len() {
                        verse.text = trimmed.to_string();
                    }
                    chapter.verses.push(verse);
                }
                self.note_depth = 0;
            },

            b"CHAPTER" => {
                if let (Some(chapter), Some(book)) = (self.chapter.take(), self.book.as_mut()) {
                    book.chapters.push(chapter);
                }
            },

            b"BIBLEBOOK" => {
                if let Some(book) = self.book.take() {
                    self.books.push(book);
                }
            },

            b"NOTE" if self.verse.is_some() => self.note_depth = self.note_depth.saturating_sub(1),

            _ => {}
        }

        Ok(())
    }


    fn required_attr(&self, e: &BytesStart, element: &'static str, attribute: &'static str) -> Result<String> {

        let position = self.reader.buffer_position() as u64;
        let xml_error = |source: quick_xml::Error| Error::Xml { position, source };

        let attr = e.try_get_attribute(attribute)
            .map_err(|e| xml_error(e.into()))?
            .ok_or(Error::MissingAttribute { element, attribute, position })?;

        let value = attr.unescape_value().map_err(xml_error)?;

        Ok(value.trim().to_string())
    }


    fn malformed(&self, message: String) -> Error {
        Error::Malformed {
            position: self.reader.buffer_position() as u64,
            message,
        }
    }

}

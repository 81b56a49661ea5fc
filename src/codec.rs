use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;

use flate2::write::{GzEncoder, ZlibEncoder};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result, UnknownChoice};
use crate::ftree;


/// Compression routines a text unit can be measured with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {

    /// Deflate in a gzip container, level 9.
    Gzip,
    /// Level 9 (900k blocks).
    Bzip2,
    /// xz container, preset 6.
    Lzma,
    /// Deflate in a zlib container, level 6.
    Zlib,
    /// The crate's own frequency-tree coder.
    #[serde(rename = "ftree")]
    FrequencyTree,

}

impl Algorithm {

    /// Measured when no algorithms are requested explicitly.
    pub const STANDARD: [Algorithm; 4] = [Algorithm::Gzip, Algorithm::Bzip2, Algorithm::Lzma, Algorithm::Zlib];

    pub const ALL: [Algorithm; 5] = [
        Algorithm::Gzip,
        Algorithm::Bzip2,
        Algorithm::Lzma,
        Algorithm::Zlib,
        Algorithm::FrequencyTree,
    ];


    pub const fn name(self) -> &'static str {
        match self {
            Algorithm::Gzip => "gzip",
            Algorithm::Bzip2 => "bzip2",
            Algorithm::Lzma => "lzma",
            Algorithm::Zlib => "zlib",
            Algorithm::FrequencyTree => "ftree",
        }
    }


    pub fn compress(self, data: &[u8]) -> Result<Vec<u8>> {
        self.compress_io(data)
            .map_err(|source| Error::Compress { algorithm: self, source })
    }


    pub fn compressed_len(self, data: &[u8]) -> Result<usize> {
        self.compress(data).map(|compressed| compressed.len())
    }


    fn compress_io(self, data: &[u8]) -> io::Result<Vec<u8>> {
        match self {

            Algorithm::Gzip => {
                let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::best());
                encoder.write_all(data)?;
                encoder.finish()
            },

            Algorithm::Bzip2 => {
                let mut encoder = bzip2::write::BzEncoder::new(Vec::new(), bzip2::Compression::best());
                encoder.write_all(data)?;
                encoder.finish()
            },

            Algorithm::Lzma => {
                let mut encoder = xz2::write::XzEncoder::new(Vec::new(), 6);
                encoder.write_all(data)?;
                encoder.finish()
            },

            Algorithm::Zlib => {
                let mut encoder = ZlibEncoder::new(Vec::new(), flate2::Compression::default());
                encoder.write_all(data)?;
                encoder.finish()
            },

            Algorithm::FrequencyTree => ftree::compress(data)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e)),
        }
    }

}


impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}


impl FromStr for Algorithm {
    type Err = UnknownChoice;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Algorithm::ALL.into_iter()
            .find(|algorithm| algorithm.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownChoice {
                kind: "algorithm",
                value: s.to_string(),
                expected: "gzip, bzip2, lzma, zlib, ftree",
            })
    }
}


#[cfg(test)]
mod tests {

    use std::io::Read;

    use super::*;


    #[test]
    fn fixed_string_shrinks() {

        let text = "aaaaaaaaaa".repeat(10);

        for algorithm in Algorithm::ALL {
            let compressed = algorithm.compressed_len(text.as_bytes()).unwrap();
            assert!(compressed < text.len(), "{algorithm}: {compressed} >= {}", text.len());
        }
    }


    #[test]
    fn output_is_deterministic() {

        let text = b"In the beginning God created the heaven and the earth.";

        for algorithm in Algorithm::ALL {
            assert_eq!(algorithm.compress(text).unwrap(), algorithm.compress(text).unwrap());
        }
    }


    #[test]
    fn gzip_output_is_standard() {

        let text = b"And the earth was without form, and void.";

        let compressed = Algorithm::Gzip.compress(text).unwrap();

        let mut decoded = Vec::new();
        flate2::read::GzDecoder::new(compressed.as_slice())
            .read_to_end(&mut decoded)
            .unwrap();

        assert_eq!(decoded, text);
    }


    #[test]
    fn containers_have_expected_magic() {

        let text = b"Let there be light";

        assert_eq!(&Algorithm::Gzip.compress(text).unwrap()[..2], &[0x1f, 0x8b]);
        assert_eq!(&Algorithm::Bzip2.compress(text).unwrap()[..3], b"BZh");
        assert_eq!(&Algorithm::Lzma.compress(text).unwrap()[..6], &[0xfd, b'7', b'z', b'X', b'Z', 0x00]);
        assert_eq!(Algorithm::Zlib.compress(text).unwrap()[0], 0x78);
    }


    #[test]
    fn parses_names() {

        assert_eq!("gzip".parse::<Algorithm>().unwrap(), Algorithm::Gzip);
        assert_eq!(" LZMA ".parse::<Algorithm>().unwrap(), Algorithm::Lzma);
        assert_eq!("ftree".parse::<Algorithm>().unwrap(), Algorithm::FrequencyTree);

        let err = "zstd".parse::<Algorithm>().unwrap_err();
        assert_eq!(err.value, "zstd");
    }


    #[test]
    fn serde_names_match_display() {
        for algorithm in Algorithm::ALL {
            let json = serde_json::to_string(&algorithm).unwrap();
            assert_eq!(json, format!("\"{algorithm}\""));
        }
    }

}

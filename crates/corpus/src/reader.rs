use bzip2::read::MultiBzDecoder;
use flate2::read::MultiGzDecoder;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

const READ_BUFFER_BYTES: usize = 256 * 1024;

/// Compression codec of an input file, detected from its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Compression {
    None,
    Bzip2,
    Gzip,
}

impl Compression {
    pub fn from_path(path: &Path) -> Self {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return Self::None;
        };
        if name.ends_with(".bz2") {
            Self::Bzip2
        } else if name.ends_with(".gz") {
            Self::Gzip
        } else {
            Self::None
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Bzip2 => "bzip2",
            Self::Gzip => "gzip",
        }
    }
}

/// Open `path` as a buffered line stream, decompressing according to its suffix.
///
/// Concatenated streams are decoded in full, so multistream dumps read to the end.
pub fn open_lines(path: &Path) -> std::io::Result<(Compression, Box<dyn BufRead>)> {
    let compression = Compression::from_path(path);
    let file = File::open(path)?;
    let reader: Box<dyn BufRead> = match compression {
        Compression::None => Box::new(BufReader::with_capacity(READ_BUFFER_BYTES, file)),
        Compression::Bzip2 => Box::new(BufReader::with_capacity(
            READ_BUFFER_BYTES,
            MultiBzDecoder::new(file),
        )),
        Compression::Gzip => Box::new(BufReader::with_capacity(
            READ_BUFFER_BYTES,
            MultiGzDecoder::new(file),
        )),
    };
    Ok((compression, reader))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn detects_compression_from_suffix() {
        assert_eq!(Compression::from_path(Path::new("AA/wiki_00.bz2")), Compression::Bzip2);
        assert_eq!(Compression::from_path(Path::new("AA/wiki_00.gz")), Compression::Gzip);
        assert_eq!(Compression::from_path(Path::new("AA/wiki_00")), Compression::None);
        assert_eq!(Compression::from_path(Path::new("wiki.bz2.txt")), Compression::None);
    }

    #[test]
    fn reads_concatenated_bzip2_streams() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("multi.bz2");
        let mut bytes = Vec::new();
        for chunk in ["first\n", "second\n"] {
            let mut encoder =
                bzip2::write::BzEncoder::new(Vec::new(), bzip2::Compression::default());
            encoder.write_all(chunk.as_bytes()).unwrap();
            bytes.extend(encoder.finish().unwrap());
        }
        std::fs::write(&path, bytes).unwrap();

        let (compression, reader) = open_lines(&path).unwrap();
        assert_eq!(compression, Compression::Bzip2);
        let lines: Vec<String> = reader.lines().map(|l| l.unwrap()).collect();
        assert_eq!(lines, vec!["first", "second"]);
    }

    #[test]
    fn reads_gzip() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("shard.gz");
        let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(b"one\ntwo\n").unwrap();
        std::fs::write(&path, encoder.finish().unwrap()).unwrap();

        let (_, reader) = open_lines(&path).unwrap();
        assert_eq!(reader.lines().count(), 2);
    }
}

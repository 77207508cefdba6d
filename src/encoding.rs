//! Source text decoding

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Character encodings accepted for project sources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    #[default]
    Utf8,
    Latin1,
}

#[derive(Debug, Error)]
pub enum SourceReadError {
    #[error("could not read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{} is not valid {encoding} (invalid byte at offset {offset})", path.display())]
    Decode {
        path: PathBuf,
        encoding: Encoding,
        offset: usize,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unsupported encoding '{0}'")]
pub struct UnsupportedEncoding(pub String);

impl FromStr for Encoding {
    type Err = UnsupportedEncoding;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "utf-8" | "utf8" => Ok(Self::Utf8),
            "iso-8859-1" | "iso8859-1" | "latin1" | "latin-1" => Ok(Self::Latin1),
            _ => Err(UnsupportedEncoding(s.to_string())),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Utf8 => f.write_str("UTF-8"),
            Self::Latin1 => f.write_str("ISO-8859-1"),
        }
    }
}

impl Encoding {
    /// Decode raw file bytes. A UTF-8 byte order mark is dropped.
    pub fn decode(self, bytes: Vec<u8>) -> Result<String, usize> {
        match self {
            Self::Utf8 => {
                let text = String::from_utf8(bytes).map_err(|e| e.utf8_error().valid_up_to())?;
                if text.starts_with('\u{feff}') {
                    Ok(text['\u{feff}'.len_utf8()..].to_string())
                } else {
                    Ok(text)
                }
            }
            Self::Latin1 => Ok(bytes.into_iter().map(char::from).collect()),
        }
    }
}

/// Read a whole file as text in the given encoding.
pub fn read_source(path: &Path, encoding: Encoding) -> Result<String, SourceReadError> {
    let bytes = std::fs::read(path).map_err(|source| SourceReadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    encoding.decode(bytes).map_err(|offset| SourceReadError::Decode {
        path: path.to_path_buf(),
        encoding,
        offset,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoding_from_str() {
        assert_eq!("UTF-8".parse::<Encoding>(), Ok(Encoding::Utf8));
        assert_eq!("utf8".parse::<Encoding>(), Ok(Encoding::Utf8));
        assert_eq!("ISO-8859-1".parse::<Encoding>(), Ok(Encoding::Latin1));
        assert_eq!("latin1".parse::<Encoding>(), Ok(Encoding::Latin1));
        assert!("EBCDIC".parse::<Encoding>().is_err());
    }

    #[test]
    fn test_encoding_display_round_trips() {
        for enc in [Encoding::Utf8, Encoding::Latin1] {
            assert_eq!(enc.to_string().parse::<Encoding>(), Ok(enc));
        }
    }

    #[test]
    fn test_decode_utf8_strips_bom() {
        let bytes = b"\xEF\xBB\xBFobject A".to_vec();
        assert_eq!(Encoding::Utf8.decode(bytes).unwrap(), "object A");
    }

    #[test]
    fn test_decode_utf8_invalid_reports_offset() {
        let bytes = b"ab\xFFcd".to_vec();
        assert_eq!(Encoding::Utf8.decode(bytes), Err(2));
    }

    #[test]
    fn test_decode_latin1_never_fails() {
        let bytes = b"caf\xE9".to_vec();
        assert_eq!(Encoding::Latin1.decode(bytes).unwrap(), "café");
    }

    #[test]
    fn test_read_source_missing_file() {
        let err = read_source(Path::new("/nonexistent/A.scala"), Encoding::Utf8).unwrap_err();
        assert!(matches!(err, SourceReadError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/A.scala"));
    }

    #[test]
    fn test_read_source_undecodable_file() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), b"object \xFF").unwrap();
        let err = read_source(tmp.path(), Encoding::Utf8).unwrap_err();
        assert!(matches!(err, SourceReadError::Decode { offset: 7, .. }));
    }
}

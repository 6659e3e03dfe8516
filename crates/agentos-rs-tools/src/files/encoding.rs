//! Text encodings accepted by the file tools.

use std::fmt;
use std::str::FromStr;

use super::FileError;

/// Supported text encodings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextEncoding {
    #[default]
    Utf8,
    Ascii,
    Latin1,
}

impl TextEncoding {
    /// Canonical label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::Ascii => "ascii",
            Self::Latin1 => "latin-1",
        }
    }

    /// Parse an optional label, defaulting to UTF-8.
    pub fn from_label(label: Option<&str>) -> Result<Self, FileError> {
        match label {
            Some(label) => label.parse(),
            None => Ok(Self::default()),
        }
    }

    /// Encode text into bytes.
    pub fn encode(self, text: &str) -> Result<Vec<u8>, FileError> {
        match self {
            Self::Utf8 => Ok(text.as_bytes().to_vec()),
            Self::Ascii => text
                .chars()
                .map(|ch| {
                    if ch.is_ascii() {
                        Ok(ch as u8)
                    } else {
                        Err(self.encode_error(ch))
                    }
                })
                .collect(),
            Self::Latin1 => text
                .chars()
                .map(|ch| u8::try_from(u32::from(ch)).map_err(|_| self.encode_error(ch)))
                .collect(),
        }
    }

    /// Decode bytes into text.
    pub fn decode(self, bytes: &[u8]) -> Result<String, FileError> {
        match self {
            Self::Utf8 => String::from_utf8(bytes.to_vec()).map_err(|err| FileError::Decode {
                encoding: self.label(),
                detail: err.to_string(),
            }),
            Self::Ascii => match bytes.iter().position(|byte| !byte.is_ascii()) {
                Some(offset) => Err(FileError::Decode {
                    encoding: self.label(),
                    detail: format!("byte 0x{:02x} at offset {offset}", bytes[offset]),
                }),
                None => Ok(bytes.iter().map(|byte| char::from(*byte)).collect()),
            },
            Self::Latin1 => Ok(bytes.iter().map(|byte| char::from(*byte)).collect()),
        }
    }

    fn encode_error(self, ch: char) -> FileError {
        FileError::Encode {
            encoding: self.label(),
            detail: format!("character {ch:?} is out of range"),
        }
    }
}

impl FromStr for TextEncoding {
    type Err = FileError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_lowercase().replace('_', "-");
        match normalized.as_str() {
            "utf-8" | "utf8" => Ok(Self::Utf8),
            "ascii" | "us-ascii" => Ok(Self::Ascii),
            "latin-1" | "latin1" | "iso-8859-1" => Ok(Self::Latin1),
            _ => Err(FileError::UnsupportedEncoding(raw.to_string())),
        }
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::{HashWriterError, Result};

/// Text encodings a digest can be exported in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestEncoding {
    #[default]
    Hex,
    Base64,
}

impl DigestEncoding {
    pub fn list() -> Vec<&'static str> {
        vec!["hex", "base64"]
    }
}

impl FromStr for DigestEncoding {
    type Err = HashWriterError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "hex" => Ok(DigestEncoding::Hex),
            "base64" | "b64" => Ok(DigestEncoding::Base64),
            other => Err(HashWriterError::InvalidConfiguration(format!(
                "unknown digest encoding '{}' (expected {})",
                other,
                DigestEncoding::list().join("|")
            ))),
        }
    }
}

/// A finalized digest.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Digest(Vec<u8>);

impl Digest {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Lowercase hexadecimal.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// Standard alphabet, padded.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.0)
    }

    pub fn encode(&self, encoding: DigestEncoding) -> String {
        match encoding {
            DigestEncoding::Hex => self.to_hex(),
            DigestEncoding::Base64 => self.to_base64(),
        }
    }

    pub fn from_hex(s: &str) -> Result<Self> {
        hex::decode(s.trim())
            .map(Self)
            .map_err(|e| HashWriterError::Decode(format!("hex: {}", e)))
    }

    pub fn from_base64(s: &str) -> Result<Self> {
        STANDARD
            .decode(s.trim())
            .map(Self)
            .map_err(|e| HashWriterError::Decode(format!("base64: {}", e)))
    }

    pub fn decode(s: &str, encoding: DigestEncoding) -> Result<Self> {
        match encoding {
            DigestEncoding::Hex => Self::from_hex(s),
            DigestEncoding::Base64 => Self::from_base64(s),
        }
    }
}

impl AsRef<[u8]> for Digest {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for Digest {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl PartialEq<[u8]> for Digest {
    fn eq(&self, other: &[u8]) -> bool {
        self.0 == other
    }
}

impl PartialEq<&[u8]> for Digest {
    fn eq(&self, other: &&[u8]) -> bool {
        self.0 == *other
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_is_lowercase() {
        let d = Digest::new(vec![0xAB, 0xCD, 0x01]);
        assert_eq!(d.to_hex(), "abcd01");
        assert_eq!(d.to_string(), "abcd01");
    }

    #[test]
    fn base64_uses_standard_padded_alphabet() {
        let d = Digest::new(vec![0xfb, 0xff]);
        assert_eq!(d.to_base64(), "+/8=");
        assert_eq!(Digest::from_base64("+/8=").unwrap(), d);
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(matches!(
            Digest::from_hex("zz"),
            Err(HashWriterError::Decode(_))
        ));
        assert!(matches!(
            Digest::from_base64("!!!"),
            Err(HashWriterError::Decode(_))
        ));
    }

    #[test]
    fn unknown_encoding_lists_choices() {
        let err = "base32".parse::<DigestEncoding>().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("'base32'"), "{}", msg);
        assert!(msg.contains("hex|base64"), "{}", msg);
    }

    #[test]
    fn parses_encoding_names() {
        assert_eq!("HEX".parse::<DigestEncoding>().unwrap(), DigestEncoding::Hex);
        assert_eq!(
            " base64 ".parse::<DigestEncoding>().unwrap(),
            DigestEncoding::Base64
        );
        assert!("base32".parse::<DigestEncoding>().is_err());
    }
}

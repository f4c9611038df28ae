//! Text encoding of the wire.
//!
//! IRC has no negotiated charset. Lines are decoded with whatever the user
//! configured for the network; `Default` means UTF-8 with a Latin-1
//! fallback for lines that are not valid UTF-8.

use std::borrow::Cow;

use encoding::{UTF_16LE, UTF_8, WINDOWS_1252};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    #[default]
    Default,
    Ascii,
    Utf8,
    Utf16,
    Latin1,
}

impl Encoding {
    /// Decode one received line. Never fails; undecodable bytes are
    /// replaced.
    pub fn decode<'a>(self, bytes: &'a [u8]) -> Cow<'a, str> {
        match self {
            Self::Default => match std::str::from_utf8(bytes) {
                Ok(s) => Cow::Borrowed(s),
                Err(_) => WINDOWS_1252.decode_without_bom_handling(bytes).0,
            },
            Self::Ascii => {
                if bytes.is_ascii() {
                    // ASCII is valid UTF-8.
                    UTF_8.decode_without_bom_handling(bytes).0
                } else {
                    Cow::Owned(
                        bytes
                            .iter()
                            .map(|&b| if b.is_ascii() { b as char } else { '?' })
                            .collect(),
                    )
                }
            }
            Self::Utf8 => UTF_8.decode_without_bom_handling(bytes).0,
            Self::Utf16 => UTF_16LE.decode_without_bom_handling(bytes).0,
            Self::Latin1 => WINDOWS_1252.decode_without_bom_handling(bytes).0,
        }
    }

    /// Encode one outgoing line.
    pub fn encode(self, text: &str) -> Vec<u8> {
        match self {
            Self::Default | Self::Utf8 => text.as_bytes().to_vec(),
            Self::Ascii => text.chars().map(|c| if c.is_ascii() { c as u8 } else { b'?' }).collect(),
            // encoding_rs has no UTF-16 encoder.
            Self::Utf16 => text.encode_utf16().flat_map(u16::to_le_bytes).collect(),
            Self::Latin1 => WINDOWS_1252.encode(text).0.into_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_falls_back_to_latin1() {
        assert_eq!(Encoding::Default.decode("héllo".as_bytes()), "héllo");
        assert_eq!(Encoding::Default.decode(b"h\xe9llo"), "héllo");
    }

    #[test]
    fn test_ascii_replaces() {
        assert_eq!(Encoding::Ascii.decode(b"a\xffb"), "a?b");
        assert_eq!(Encoding::Ascii.encode("aéb"), b"a?b");
    }

    #[test]
    fn test_latin1_and_utf16() {
        assert_eq!(Encoding::Latin1.encode("é"), vec![0xe9]);
        let wide = Encoding::Utf16.encode("hi");
        assert_eq!(wide, vec![b'h', 0, b'i', 0]);
        assert_eq!(Encoding::Utf16.decode(&wide), "hi");
    }
}

//! Attribute values and their conversion from and to strings.

use bcder::{decode, Mode, Tag};
use bcder::decode::{Content, DecodeError};
use bcder::encode::PrimitiveContent;
use bytes::Bytes;
use crate::error::Error;
use crate::x509::{DerData, Octets};


//------------ AttributeValue ------------------------------------------------

/// The value of an attribute in a distinguished name.
///
/// The value is of type ANY, so it is kept in its encoded form including
/// tag and length. Most values are one of the string types. For those,
/// [`to_text`][Self::to_text] provides the string.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct AttributeValue(DerData);

impl AttributeValue {
    /// Creates a value from its complete encoding.
    ///
    /// Fails if the data isn’t exactly one encoded value.
    pub fn from_der(data: Bytes) -> Result<Self, Error> {
        Mode::Ber.decode(data.as_ref(), |cons| {
            match cons.skip_one()? {
                Some(()) => Ok(()),
                None => Err(cons.content_err("missing attribute value"))
            }
        })?;
        Ok(AttributeValue(DerData::new(data)))
    }

    /// Creates a string value with the given tag.
    ///
    /// The content is not checked against the character set of the tag.
    pub fn string(tag: Tag, content: &[u8]) -> Self {
        AttributeValue(DerData::from_values(Octets(content).encode_as(tag)))
    }

    /// Creates a PrintableString value.
    pub fn printable(text: &str) -> Result<Self, Error> {
        if is_printable(text) {
            Ok(Self::string(Tag::PRINTABLE_STRING, text.as_bytes()))
        }
        else {
            Err(Error::invalid_value(
                format!("'{text}' is not a printable string")
            ))
        }
    }

    /// Creates an IA5String value.
    pub fn ia5(text: &str) -> Result<Self, Error> {
        if text.is_ascii() {
            Ok(Self::string(Tag::IA5_STRING, text.as_bytes()))
        }
        else {
            Err(Error::invalid_value(
                format!("'{text}' is not an IA5 string")
            ))
        }
    }

    /// Creates a UTF8String value.
    pub fn utf8(text: &str) -> Self {
        Self::string(Tag::UTF8_STRING, text.as_bytes())
    }

    /// Creates a DirectoryString value using the narrowest string type.
    ///
    /// This is a PrintableString if possible, a TeletexString if all
    /// characters are from Latin-1, and a UTF8String otherwise.
    pub fn directory_string(text: &str) -> Self {
        if is_printable(text) {
            Self::string(Tag::PRINTABLE_STRING, text.as_bytes())
        }
        else if text.chars().all(|ch| u32::from(ch) < 0x100) {
            let latin1: Vec<u8> = text.chars().map(|ch| ch as u8).collect();
            Self::string(Tag::TELETEX_STRING, &latin1)
        }
        else {
            Self::utf8(text)
        }
    }

    /// Returns the encoded value.
    pub fn as_slice(&self) -> &[u8] {
        self.0.as_slice()
    }

    /// Returns the value as a string if it is one of the string types.
    pub fn to_text(&self) -> Option<String> {
        let (tag, content) = Mode::Ber.decode(self.0.as_slice(), |cons| {
            cons.take_value(|tag, content| {
                match content {
                    Content::Primitive(prim) => {
                        Ok(Some((tag, prim.take_all()?)))
                    }
                    Content::Constructed(cons) => {
                        cons.skip_all()?;
                        Ok(None)
                    }
                }
            })
        }).ok()??;
        decode_string(tag, content.as_ref())
    }

    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        DerData::take_from(cons).map(AttributeValue)
    }

    pub fn encode_ref(&self) -> &DerData {
        &self.0
    }
}


//------------ ValueConverter ------------------------------------------------

/// The rules for turning the string form of an attribute into a value.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ValueConverter {
    /// The value must be a PrintableString.
    Printable,

    /// The value is a DirectoryString of the narrowest possible type.
    DirectoryString,

    /// The value must be an IA5String.
    Ia5,

    /// The value is always a UTF8String.
    Utf8,
}

impl ValueConverter {
    /// Converts a string into an attribute value.
    pub fn to_value(self, text: &str) -> Result<AttributeValue, Error> {
        match self {
            ValueConverter::Printable => AttributeValue::printable(text),
            ValueConverter::DirectoryString => {
                Ok(AttributeValue::directory_string(text))
            }
            ValueConverter::Ia5 => AttributeValue::ia5(text),
            ValueConverter::Utf8 => Ok(AttributeValue::utf8(text)),
        }
    }
}


//------------ Helper Functions ----------------------------------------------

/// Returns whether all characters are allowed in a PrintableString.
pub fn is_printable(text: &str) -> bool {
    text.bytes().all(|ch| {
        ch.is_ascii_alphanumeric() || matches!(
            ch,
            b' ' | b'\'' | b'(' | b')' | b'+' | b',' | b'-' | b'.' | b'/'
            | b':' | b'=' | b'?'
        )
    })
}

/// Decodes the content of one of the string types.
pub fn decode_string(tag: Tag, content: &[u8]) -> Option<String> {
    match tag {
        Tag::PRINTABLE_STRING | Tag::IA5_STRING | Tag::VISIBLE_STRING
        | Tag::NUMERIC_STRING => {
            if content.is_ascii() {
                String::from_utf8(content.into()).ok()
            }
            else {
                None
            }
        }
        Tag::UTF8_STRING => String::from_utf8(content.into()).ok(),
        Tag::TELETEX_STRING => {
            Some(content.iter().map(|&ch| char::from(ch)).collect())
        }
        Tag::BMP_STRING => {
            if content.len() % 2 != 0 {
                return None
            }
            let units: Vec<u16> = content.chunks(2).map(|chunk| {
                u16::from_be_bytes([chunk[0], chunk[1]])
            }).collect();
            String::from_utf16(&units).ok()
        }
        Tag::UNIVERSAL_STRING => {
            if content.len() % 4 != 0 {
                return None
            }
            content.chunks(4).map(|chunk| {
                char::from_u32(u32::from_be_bytes(
                    [chunk[0], chunk[1], chunk[2], chunk[3]]
                ))
            }).collect()
        }
        _ => None
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn directory_string_picks_narrowest() {
        assert_eq!(
            AttributeValue::directory_string("Example Inc.").as_slice(),
            b"\x13\x0cExample Inc."
        );
        assert_eq!(
            AttributeValue::directory_string("M\u{fc}ller").as_slice(),
            b"\x14\x06M\xfcller"
        );
        assert_eq!(
            AttributeValue::directory_string("a@b").as_slice(),
            b"\x0c\x03a@b"
        );
        assert_eq!(
            AttributeValue::directory_string("\u{65e5}").as_slice(),
            b"\x0c\x03\xe6\x97\xa5"
        );
    }

    #[test]
    fn converters() {
        assert!(ValueConverter::Printable.to_value("US").is_ok());
        assert!(ValueConverter::Printable.to_value("a@b").is_err());
        assert!(ValueConverter::Ia5.to_value("a@b").is_ok());
        assert!(ValueConverter::Ia5.to_value("M\u{fc}ller").is_err());
        assert_eq!(
            ValueConverter::Utf8.to_value("US").unwrap().as_slice(),
            b"\x0c\x02US"
        );
    }

    #[test]
    fn to_text() {
        for text in ["Example", "M\u{fc}ller", "\u{65e5}\u{672c}", ""] {
            assert_eq!(
                AttributeValue::directory_string(text).to_text().unwrap(),
                text
            );
        }
        assert_eq!(
            AttributeValue::string(Tag::BMP_STRING, b"\x00A\x00B")
                .to_text().unwrap(),
            "AB"
        );
        assert_eq!(
            AttributeValue::string(Tag::UNIVERSAL_STRING, b"\x00\x00\x00A")
                .to_text().unwrap(),
            "A"
        );
        assert!(
            AttributeValue::from_der(Bytes::from_static(b"\x02\x01\x05"))
                .unwrap().to_text().is_none()
        );
    }

    #[test]
    fn from_der() {
        assert!(
            AttributeValue::from_der(Bytes::from_static(b"\x0c\x01a")).is_ok()
        );
        assert!(
            AttributeValue::from_der(Bytes::from_static(b"\x0c\x02a"))
                .is_err()
        );
        assert!(
            AttributeValue::from_der(Bytes::from_static(b"\x0c\x01ab"))
                .is_err()
        );
        assert!(AttributeValue::from_der(Bytes::new()).is_err());
    }
}

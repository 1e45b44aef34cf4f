//! The string form of distinguished names.
//!
//! The syntax is the one of RFC 4514 with the RFC 1779 extensions that are
//! still common: semicolons as RDN separators, quoted values, and
//! `OID.`-prefixed dotted keywords. The string lists the RDNs in reverse,
//! i.e., the most specific one first.

use std::{fmt, mem};
use std::str::FromStr;
use bcder::Oid;
use bytes::Bytes;
use log::debug;
use crate::error::Error;
use crate::registry::Registry;
use crate::util::hex;
use super::{DistinguishedName, Rdn};
use super::ava::Ava;
use super::value::{AttributeValue, ValueConverter};


//------------ parse ---------------------------------------------------------

/// Parses the string form of a distinguished name.
pub fn parse(
    s: &str, registry: &Registry
) -> Result<DistinguishedName, Error> {
    Parser { chars: s.chars().collect(), pos: 0, registry }.parse_name()
}

struct Parser<'a> {
    chars: Vec<char>,
    pos: usize,
    registry: &'a Registry,
}

impl Parser<'_> {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn next_char(&mut self) -> Option<char> {
        let res = self.peek();
        if res.is_some() {
            self.pos += 1;
        }
        res
    }

    fn skip_space(&mut self) {
        while self.peek().map(char::is_whitespace).unwrap_or(false) {
            self.pos += 1
        }
    }

    fn parse_name(mut self) -> Result<DistinguishedName, Error> {
        let mut rdns = Vec::new();
        self.skip_space();
        if self.peek().is_none() {
            return Ok(DistinguishedName::new())
        }
        let mut avas = Vec::new();
        loop {
            avas.push(self.parse_ava()?);
            match self.next_char() {
                None => {
                    rdns.push(Rdn::from_avas(avas)?);
                    break
                }
                Some('+') => { }
                Some(',') | Some(';') => {
                    rdns.push(Rdn::from_avas(mem::take(&mut avas))?);
                }
                Some(ch) => {
                    return Err(Error::malformed(
                        format!("unexpected '{ch}' in distinguished name")
                    ))
                }
            }
        }
        rdns.reverse();
        Ok(DistinguishedName::from_rdns(rdns))
    }

    fn parse_ava(&mut self) -> Result<Ava, Error> {
        self.skip_space();
        let mut keyword = String::new();
        loop {
            match self.next_char() {
                Some('=') => break,
                Some(ch) => keyword.push(ch),
                None => {
                    return Err(Error::malformed(
                        "missing '=' in distinguished name"
                    ))
                }
            }
        }
        let oid = self.resolve_keyword(keyword.trim())?;
        self.skip_space();
        let value = match self.peek() {
            Some('#') => {
                self.pos += 1;
                self.parse_hex()?
            }
            Some('"') => {
                self.pos += 1;
                let text = self.parse_quoted()?;
                self.skip_space();
                self.convert(&oid, &text)?
            }
            _ => {
                let text = self.parse_unquoted()?;
                self.convert(&oid, &text)?
            }
        };
        Ok(Ava::new(oid, value))
    }

    fn resolve_keyword(
        &self, keyword: &str
    ) -> Result<Oid, Error> {
        if keyword.is_empty() {
            return Err(Error::malformed("empty attribute keyword"))
        }
        let dotted = keyword.strip_prefix("OID.")
            .or_else(|| keyword.strip_prefix("oid."))
            .unwrap_or(keyword);
        if dotted.starts_with(|ch: char| ch.is_ascii_digit()) {
            return Oid::from_str(dotted).map_err(|_| {
                Error::malformed(format!("invalid attribute OID '{dotted}'"))
            })
        }
        self.registry.attribute_oid(keyword).cloned().ok_or_else(|| {
            Error::unknown_attribute(keyword)
        })
    }

    fn convert(
        &self, oid: &Oid, text: &str
    ) -> Result<AttributeValue, Error> {
        self.registry.attribute_converter(oid).unwrap_or(
            ValueConverter::DirectoryString
        ).to_value(text)
    }

    fn parse_hex(&mut self) -> Result<AttributeValue, Error> {
        let mut digits = String::new();
        while let Some(ch) = self.peek() {
            if matches!(ch, ',' | ';' | '+') || ch.is_whitespace() {
                break
            }
            digits.push(ch);
            self.pos += 1;
        }
        self.skip_space();
        let der = hex::decode(&digits).ok_or_else(|| {
            Error::malformed("invalid hex attribute value")
        })?;
        AttributeValue::from_der(Bytes::from(der))
    }

    fn parse_quoted(&mut self) -> Result<String, Error> {
        let mut buf = Vec::new();
        loop {
            match self.next_char() {
                Some('"') => break,
                Some('\\') => self.parse_escape(&mut buf)?,
                Some(ch) => push_char(&mut buf, ch),
                None => {
                    return Err(Error::malformed(
                        "unterminated quoted attribute value"
                    ))
                }
            }
        }
        into_string(buf)
    }

    fn parse_unquoted(&mut self) -> Result<String, Error> {
        let mut buf = Vec::new();

        // Length of `buf` without unescaped trailing white space.
        let mut keep = 0;

        loop {
            match self.peek() {
                None | Some(',') | Some(';') | Some('+') => break,
                Some('\\') => {
                    self.pos += 1;
                    self.parse_escape(&mut buf)?;
                    keep = buf.len();
                }
                Some(ch) => {
                    self.pos += 1;
                    push_char(&mut buf, ch);
                    if !ch.is_whitespace() {
                        keep = buf.len();
                    }
                }
            }
        }
        buf.truncate(keep);
        into_string(buf)
    }

    /// Parses what follows a backslash.
    ///
    /// Two hex digits are an escaped octet, anything else is taken
    /// literally.
    fn parse_escape(&mut self, buf: &mut Vec<u8>) -> Result<(), Error> {
        let first = match self.next_char() {
            Some(ch) => ch,
            None => {
                return Err(Error::malformed(
                    "trailing backslash in distinguished name"
                ))
            }
        };
        let second = self.peek();
        if let (Some(high), Some(low)) = (
            first.to_digit(16), second.and_then(|ch| ch.to_digit(16))
        ) {
            self.pos += 1;
            buf.push((high << 4 | low) as u8);
        }
        else {
            push_char(buf, first)
        }
        Ok(())
    }
}

fn push_char(buf: &mut Vec<u8>, ch: char) {
    let mut tmp = [0u8; 4];
    buf.extend_from_slice(ch.encode_utf8(&mut tmp).as_bytes());
}

fn into_string(buf: Vec<u8>) -> Result<String, Error> {
    String::from_utf8(buf).map_err(|_| {
        Error::malformed("escaped octets in attribute value are not UTF-8")
    })
}


//------------ write ---------------------------------------------------------

/// Writes the string form of a distinguished name.
pub fn write<W: fmt::Write>(
    name: &DistinguishedName, registry: &Registry, target: &mut W
) -> fmt::Result {
    for (idx, rdn) in name.rdns().iter().rev().enumerate() {
        if idx > 0 {
            target.write_char(',')?;
        }
        for (idx, ava) in rdn.iter().enumerate() {
            if idx > 0 {
                target.write_char('+')?;
            }
            write_ava(ava, registry, target)?;
        }
    }
    Ok(())
}

fn write_ava<W: fmt::Write>(
    ava: &Ava, registry: &Registry, target: &mut W
) -> fmt::Result {
    let keyword = registry.attribute_keyword(ava.oid());
    if let (Some(keyword), Some(text)) = (keyword, ava.to_text()) {
        target.write_str(keyword)?;
        target.write_char('=')?;
        return write_escaped(&text, target)
    }
    match keyword {
        Some(keyword) => target.write_str(keyword)?,
        None => {
            debug!("No keyword for attribute {}, using OID.", ava.oid());
            write!(target, "{}", ava.oid())?
        }
    }
    target.write_str("=#")?;
    hex::write(ava.value().as_slice(), target)
}

fn write_escaped<W: fmt::Write>(text: &str, target: &mut W) -> fmt::Result {
    let last = text.chars().count().saturating_sub(1);
    for (idx, ch) in text.chars().enumerate() {
        let special = match ch {
            ',' | '+' | '"' | '\\' | '<' | '>' | ';' => true,
            '#' => idx == 0,
            ' ' => idx == 0 || idx == last,
            _ => false
        };
        if special {
            target.write_char('\\')?;
            target.write_char(ch)?;
        }
        else if ch.is_control() {
            let mut tmp = [0u8; 4];
            for &octet in ch.encode_utf8(&mut tmp).as_bytes() {
                let [high, low] = hex::encode_u8(octet);
                target.write_char('\\')?;
                target.write_char(char::from(high))?;
                target.write_char(char::from(low))?;
            }
        }
        else {
            target.write_char(ch)?;
        }
    }
    Ok(())
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use bcder::Tag;
    use crate::error::ErrorKind;
    use crate::oid;

    fn parse_std(s: &str) -> Result<DistinguishedName, Error> {
        parse(s, &Registry::standard())
    }

    fn write_std(name: &DistinguishedName) -> String {
        let mut res = String::new();
        write(name, &Registry::standard(), &mut res).unwrap();
        res
    }

    #[test]
    fn parse_simple() {
        let name = parse_std(
            "CN=Otis Smith,E=otis@example.com,OU=Eng,O=Example,C=US"
        ).unwrap();
        assert_eq!(name.rdns().len(), 5);
        // The last string component comes first.
        let first = name.rdns()[0].iter().next().unwrap();
        assert_eq!(first.oid(), &oid::AT_COUNTRY_NAME);
        assert_eq!(first.value().as_slice(), b"\x13\x02US");
        let email = name.rdns()[3].iter().next().unwrap();
        assert_eq!(email.value().as_slice(), b"\x16\x10otis@example.com");
        assert_eq!(
            write_std(&name),
            "CN=Otis Smith,E=otis@example.com,OU=Eng,O=Example,C=US"
        );
    }

    #[test]
    fn parse_whitespace_and_separators() {
        let name = parse_std(
            "  cn = Otis Smith ; o=Example +  OU=Eng  "
        ).unwrap();
        assert_eq!(name.rdns().len(), 2);
        assert_eq!(name.rdns()[0].len(), 2);
        assert_eq!(name.common_name().unwrap(), "Otis Smith");
        assert_eq!(name.organizational_unit().unwrap(), "Eng");
        assert_eq!(write_std(&name), "CN=Otis Smith,O=Example+OU=Eng");
    }

    #[test]
    fn parse_escapes() {
        let name = parse_std(
            r#"CN=Smith\, Otis,O="Example, Inc.",L=\ Space\ ,ST=M\C3\BCnchen"#
        ).unwrap();
        assert_eq!(name.common_name().unwrap(), "Smith, Otis");
        assert_eq!(name.organization().unwrap(), "Example, Inc.");
        assert_eq!(name.locality().unwrap(), " Space ");
        assert_eq!(name.state_or_province().unwrap(), "M\u{fc}nchen");
        assert_eq!(
            write_std(&name),
            "CN=Smith\\, Otis,O=Example\\, Inc.,L=\\ Space\\ ,ST=M\u{fc}nchen"
        );
    }

    #[test]
    fn parse_oids_and_hex() {
        let name = parse_std(
            "2.5.4.3=Test,OID.2.5.4.10=Org,1.2.3.4=#0C0161"
        ).unwrap();
        assert_eq!(name.common_name().unwrap(), "Test");
        assert_eq!(name.organization().unwrap(), "Org");
        let unknown = Oid::<Bytes>::from_str("1.2.3.4").unwrap();
        assert_eq!(name.find_text(&unknown).unwrap(), "a");
        assert_eq!(write_std(&name), "CN=Test,O=Org,1.2.3.4=#0C0161");
    }

    #[test]
    fn parse_errors() {
        assert_eq!(
            parse_std("FOO=bar").unwrap_err().kind(),
            ErrorKind::UnknownAttributeName
        );
        assert_eq!(
            parse_std("CN=a,C=USA\u{e4}").unwrap_err().kind(),
            ErrorKind::InvalidValue
        );
        for bad in [
            "CN", "CN=a,", "=a", "CN=\"a", "CN=a\\", "CN=#0C02", "CN=#zz",
            "CN=\"a\"b",
        ] {
            assert_eq!(
                parse_std(bad).unwrap_err().kind(), ErrorKind::Malformed,
                "{bad}"
            );
        }
    }

    #[test]
    fn empty_name() {
        let name = parse_std("  ").unwrap();
        assert!(name.is_empty());
        assert_eq!(write_std(&name), "");
    }

    #[test]
    fn write_special_values() {
        let mut name = DistinguishedName::new();
        name.push_ava(
            oid::to_owned(&oid::AT_COMMON_NAME),
            AttributeValue::string(Tag::UTF8_STRING, b"#a+b<c>\x01 ")
        );
        assert_eq!(write_std(&name), "CN=\\#a\\+b\\<c\\>\\01\\ ");
        assert_eq!(
            parse_std(&write_std(&name)).unwrap().common_name().unwrap(),
            "#a+b<c>\u{1} "
        );
    }
}

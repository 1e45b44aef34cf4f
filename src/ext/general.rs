//! General names.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;
use bcder::{decode, encode, Oid, Tag};
use bcder::decode::DecodeError;
use bcder::encode::PrimitiveContent;
use bytes::Bytes;
use crate::error::Error;
use crate::name::DistinguishedName;
use crate::x509::{DerData, Octets};


//------------ GeneralName ---------------------------------------------------

/// A name in one of several forms.
///
/// ```text
/// GeneralName ::= CHOICE {
///      otherName                       [0]     OtherName,
///      rfc822Name                      [1]     IA5String,
///      dNSName                         [2]     IA5String,
///      x400Address                     [3]     ORAddress,
///      directoryName                   [4]     Name,
///      ediPartyName                    [5]     EDIPartyName,
///      uniformResourceIdentifier       [6]     IA5String,
///      iPAddress                       [7]     OCTET STRING,
///      registeredID                    [8]     OBJECT IDENTIFIER }
///
/// OtherName ::= SEQUENCE {
///      type-id    OBJECT IDENTIFIER,
///      value      [0] EXPLICIT ANY DEFINED BY type-id }
/// ```
///
/// The module uses implicit tagging, so `directoryName` is the only
/// explicitly tagged choice. X.400 addresses and EDI party names are kept
/// as the encoded content of their sequences.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum GeneralName {
    OtherName {
        type_id: Oid,
        value: DerData,
    },
    Rfc822Name(String),
    DnsName(String),
    X400Address(DerData),
    DirectoryName(DistinguishedName),
    EdiPartyName(DerData),
    Uri(String),

    /// An IP address or, in name constraints, an address and mask.
    ///
    /// This is four or sixteen octets for a single address and eight or
    /// thirty-two octets for an address followed by its mask.
    IpAddress(Bytes),
    RegisteredId(Oid),
}

impl GeneralName {
    /// Creates an IP address name from its textual form.
    pub fn ip_address(s: &str) -> Result<Self, Error> {
        let addr = IpAddr::from_str(s).map_err(|_| {
            Error::invalid_value(format!("invalid IP address '{s}'"))
        })?;
        Ok(GeneralName::IpAddress(match addr {
            IpAddr::V4(addr) => Bytes::copy_from_slice(&addr.octets()),
            IpAddr::V6(addr) => Bytes::copy_from_slice(&addr.octets()),
        }))
    }

    /// Creates an IP subnet name for name constraints from a CIDR string.
    ///
    /// The address bits beyond the prefix length are cleared.
    pub fn ip_subnet(s: &str) -> Result<Self, Error> {
        let err = || Error::invalid_value(format!("invalid IP prefix '{s}'"));
        let (addr, len) = s.split_once('/').ok_or_else(err)?;
        let addr = IpAddr::from_str(addr).map_err(|_| err())?;
        let len = u32::from_str(len).map_err(|_| err())?;
        let mut res = match addr {
            IpAddr::V4(addr) => addr.octets().to_vec(),
            IpAddr::V6(addr) => addr.octets().to_vec(),
        };
        let bits = u32::try_from(res.len() * 8).map_err(|_| err())?;
        if len > bits {
            return Err(err())
        }
        let mask: Vec<u8> = (0..res.len()).map(|idx| {
            let start = u32::try_from(idx * 8).unwrap_or(u32::MAX);
            match len.saturating_sub(start) {
                0 => 0,
                n if n >= 8 => 0xFF,
                n => 0xFFu8 << (8 - n)
            }
        }).collect();
        for (octet, mask) in res.iter_mut().zip(mask.iter()) {
            *octet &= mask
        }
        res.extend_from_slice(&mask);
        Ok(GeneralName::IpAddress(res.into()))
    }

    /// Returns the IP address if this is a single address.
    pub fn to_ip_addr(&self) -> Option<IpAddr> {
        match self {
            GeneralName::IpAddress(octets) => ip_from_slice(octets),
            _ => None
        }
    }
}


/// # Decoding and Encoding
///
impl GeneralName {
    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        match Self::take_opt_from(cons)? {
            Some(res) => Ok(res),
            None => Err(cons.content_err("missing general name"))
        }
    }

    pub fn take_opt_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Option<Self>, DecodeError<S::Error>> {
        cons.take_opt_value(|tag, content| {
            if tag == Tag::CTX_0 {
                let cons = content.as_constructed()?;
                let type_id = Oid::take_from(cons)?;
                let value = cons.take_constructed_if(
                    Tag::CTX_0, DerData::take_from
                )?;
                Ok(GeneralName::OtherName { type_id, value })
            }
            else if tag == Tag::CTX_1 {
                ia5_from_content(content).map(GeneralName::Rfc822Name)
            }
            else if tag == Tag::CTX_2 {
                ia5_from_content(content).map(GeneralName::DnsName)
            }
            else if tag == Tag::CTX_3 {
                DerData::take_all_from(
                    content.as_constructed()?
                ).map(GeneralName::X400Address)
            }
            else if tag == Tag::CTX_4 {
                DistinguishedName::take_from(
                    content.as_constructed()?
                ).map(GeneralName::DirectoryName)
            }
            else if tag == Tag::CTX_5 {
                DerData::take_all_from(
                    content.as_constructed()?
                ).map(GeneralName::EdiPartyName)
            }
            else if tag == Tag::CTX_6 {
                ia5_from_content(content).map(GeneralName::Uri)
            }
            else if tag == Tag::ctx(7) {
                let prim = content.as_primitive()?;
                let octets = prim.take_all()?;
                if matches!(octets.len(), 4 | 8 | 16 | 32) {
                    Ok(GeneralName::IpAddress(octets))
                }
                else {
                    Err(prim.content_err("invalid IP address length"))
                }
            }
            else if tag == Tag::ctx(8) {
                Oid::from_primitive(
                    content.as_primitive()?
                ).map(GeneralName::RegisteredId)
            }
            else {
                Err(content.content_err("invalid general name"))
            }
        })
    }

    pub fn encode_ref(&self) -> impl encode::Values + '_ {
        match self {
            GeneralName::OtherName { type_id, value } => {
                encode::Choice2::One(encode::Choice3::One(
                    encode::sequence_as(Tag::CTX_0, (
                        type_id.encode_ref(),
                        encode::sequence_as(Tag::CTX_0, value),
                    ))
                ))
            }
            GeneralName::Rfc822Name(name) => {
                encode::Choice2::One(encode::Choice3::Two(
                    Octets(name.as_bytes()).encode_as(Tag::CTX_1)
                ))
            }
            GeneralName::DnsName(name) => {
                encode::Choice2::One(encode::Choice3::Two(
                    Octets(name.as_bytes()).encode_as(Tag::CTX_2)
                ))
            }
            GeneralName::X400Address(data) => {
                encode::Choice2::One(encode::Choice3::Three(
                    encode::sequence_as(Tag::CTX_3, data)
                ))
            }
            GeneralName::DirectoryName(name) => {
                encode::Choice2::Two(encode::Choice2::One(
                    encode::sequence_as(Tag::CTX_4, name.encode_ref())
                ))
            }
            GeneralName::EdiPartyName(data) => {
                encode::Choice2::One(encode::Choice3::Three(
                    encode::sequence_as(Tag::CTX_5, data)
                ))
            }
            GeneralName::Uri(uri) => {
                encode::Choice2::One(encode::Choice3::Two(
                    Octets(uri.as_bytes()).encode_as(Tag::CTX_6)
                ))
            }
            GeneralName::IpAddress(addr) => {
                encode::Choice2::One(encode::Choice3::Two(
                    Octets(addr.as_ref()).encode_as(Tag::ctx(7))
                ))
            }
            GeneralName::RegisteredId(oid) => {
                encode::Choice2::Two(encode::Choice2::Two(
                    oid.encode_ref_as(Tag::ctx(8))
                ))
            }
        }
    }
}


//--- Display

impl fmt::Display for GeneralName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GeneralName::OtherName { type_id, .. } => {
                write!(f, "othername:{type_id}")
            }
            GeneralName::Rfc822Name(name) => write!(f, "email:{name}"),
            GeneralName::DnsName(name) => write!(f, "DNS:{name}"),
            GeneralName::X400Address(_) => f.write_str("X400Name"),
            GeneralName::DirectoryName(name) => write!(f, "DirName:{name}"),
            GeneralName::EdiPartyName(_) => f.write_str("EdiPartyName"),
            GeneralName::Uri(uri) => write!(f, "URI:{uri}"),
            GeneralName::IpAddress(octets) => {
                let half = octets.len() / 2;
                match (ip_from_slice(octets), octets.len()) {
                    (Some(addr), _) => write!(f, "IP:{addr}"),
                    (None, 8) | (None, 32) => {
                        match (
                            ip_from_slice(&octets[..half]),
                            ip_from_slice(&octets[half..])
                        ) {
                            (Some(addr), Some(mask)) => {
                                write!(f, "IP:{addr}/{mask}")
                            }
                            _ => f.write_str("IP:<invalid>")
                        }
                    }
                    _ => f.write_str("IP:<invalid>")
                }
            }
            GeneralName::RegisteredId(oid) => write!(f, "RID:{oid}"),
        }
    }
}


//------------ GeneralNames --------------------------------------------------

/// A non-empty sequence of general names.
///
/// ```text
/// GeneralNames ::= SEQUENCE SIZE (1..MAX) OF GeneralName
/// ```
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct GeneralNames(Vec<GeneralName>);

impl GeneralNames {
    /// Creates a value from a list of names.
    ///
    /// Fails if the list is empty.
    pub fn new(names: Vec<GeneralName>) -> Result<Self, Error> {
        if names.is_empty() {
            Err(Error::invalid_value("empty general names"))
        }
        else {
            Ok(GeneralNames(names))
        }
    }

    pub fn push(&mut self, name: GeneralName) {
        self.0.push(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &GeneralName> + '_ {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[GeneralName] {
        self.0.as_slice()
    }

    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_sequence(Self::from_constructed)
    }

    /// Decodes the content of the sequence.
    pub fn from_constructed<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        let mut res = Vec::new();
        while let Some(name) = GeneralName::take_opt_from(cons)? {
            res.push(name)
        }
        if res.is_empty() {
            return Err(cons.content_err("empty general names"))
        }
        Ok(GeneralNames(res))
    }

    pub fn encode_ref(&self) -> impl encode::Values + '_ {
        encode::sequence(
            encode::iter(self.0.iter().map(GeneralName::encode_ref))
        )
    }

    pub fn encode_ref_as(&self, tag: Tag) -> impl encode::Values + '_ {
        encode::sequence_as(tag,
            encode::iter(self.0.iter().map(GeneralName::encode_ref))
        )
    }
}

impl From<GeneralName> for GeneralNames {
    fn from(name: GeneralName) -> Self {
        GeneralNames(vec![name])
    }
}

impl fmt::Display for GeneralNames {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (idx, name) in self.0.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}")?;
        }
        Ok(())
    }
}


//------------ Helper Functions ----------------------------------------------

fn ia5_from_content<S: decode::Source>(
    content: &mut decode::Content<S>
) -> Result<String, DecodeError<S::Error>> {
    let prim = content.as_primitive()?;
    let octets = prim.take_all()?;
    if !octets.is_ascii() {
        return Err(prim.content_err("invalid characters in IA5String"))
    }
    String::from_utf8(octets.to_vec()).map_err(|_| {
        prim.content_err("invalid characters in IA5String")
    })
}

fn ip_from_slice(octets: &[u8]) -> Option<IpAddr> {
    if let Ok(octets) = <[u8; 4]>::try_from(octets) {
        Some(Ipv4Addr::from(octets).into())
    }
    else if let Ok(octets) = <[u8; 16]>::try_from(octets) {
        Some(Ipv6Addr::from(octets).into())
    }
    else {
        None
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use bcder::Mode;
    use bcder::encode::Values;

    fn encode(name: &GeneralName) -> Bytes {
        name.encode_ref().to_captured(Mode::Der).into_bytes()
    }

    fn decode(data: &[u8]) -> GeneralName {
        Mode::Der.decode(data, GeneralName::take_from).unwrap()
    }

    #[test]
    fn ip_addresses() {
        let v4 = GeneralName::ip_address("127.0.0.1").unwrap();
        assert_eq!(encode(&v4).as_ref(), b"\x87\x04\x7f\x00\x00\x01");
        let v6 = GeneralName::ip_address("::1").unwrap();
        assert_eq!(encode(&v6).len(), 18);
        assert_eq!(v6.to_ip_addr().unwrap(), IpAddr::from_str("::1").unwrap());
        assert_eq!(
            GeneralName::ip_subnet("10.1.0.0/8").unwrap(),
            GeneralName::IpAddress(
                Bytes::from_static(b"\x0a\x00\x00\x00\xff\x00\x00\x00")
            )
        );
        assert_eq!(
            GeneralName::ip_subnet("192.168.0.0/20").unwrap().to_string(),
            "IP:192.168.0.0/255.255.240.0"
        );
        match GeneralName::ip_subnet("2001:db8::/32").unwrap() {
            GeneralName::IpAddress(octets) => assert_eq!(octets.len(), 32),
            _ => panic!("not an IP address")
        }
        assert!(GeneralName::ip_address("localhost").is_err());
        assert!(GeneralName::ip_subnet("10.0.0.0/33").is_err());
        assert!(GeneralName::ip_subnet("10.0.0.0").is_err());
    }

    #[test]
    fn encode_decode() {
        let names = [
            GeneralName::Rfc822Name("otis@example.com".into()),
            GeneralName::DnsName("example.com".into()),
            GeneralName::Uri("https://example.com/".into()),
            GeneralName::ip_address("192.0.2.1").unwrap(),
            GeneralName::RegisteredId(
                crate::oid::to_owned(&crate::oid::KP_SERVER_AUTH)
            ),
            GeneralName::DirectoryName(
                DistinguishedName::from_str("CN=Test,C=US").unwrap()
            ),
            GeneralName::OtherName {
                type_id: Oid::from_str("1.2.3.4").unwrap(),
                value: DerData::new(Bytes::from_static(b"\x0c\x01a")),
            },
            GeneralName::X400Address(
                DerData::new(Bytes::from_static(b"\x04\x00"))
            ),
        ];
        for name in &names {
            assert_eq!(&decode(&encode(name)), name);
        }
        assert_eq!(
            encode(&names[1]).as_ref(), b"\x82\x0bexample.com"
        );
        assert_eq!(
            encode(&names[4]).as_ref(),
            b"\x88\x08\x2b\x06\x01\x05\x05\x07\x03\x01"
        );
        assert_eq!(
            encode(&names[6]).as_ref(),
            b"\xa0\x0a\x06\x03\x2a\x03\x04\xa0\x03\x0c\x01a"
        );
    }

    #[test]
    fn decode_errors() {
        // IP address of wrong length.
        assert!(
            Mode::Der.decode(
                b"\x87\x03\x7f\x00\x00".as_ref(), GeneralName::take_from
            ).is_err()
        );
        // Unknown tag.
        assert!(
            Mode::Der.decode(
                b"\x89\x01\x00".as_ref(), GeneralName::take_from
            ).is_err()
        );
        // Empty sequence of names.
        assert!(
            Mode::Der.decode(
                b"\x30\x00".as_ref(), GeneralNames::take_from
            ).is_err()
        );
    }

    #[test]
    fn display() {
        let names = GeneralNames::new(vec![
            GeneralName::DnsName("example.com".into()),
            GeneralName::ip_address("::1").unwrap(),
        ]).unwrap();
        assert_eq!(names.to_string(), "DNS:example.com, IP:::1");
    }
}

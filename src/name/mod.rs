//! Distinguished names.
//!
//! A [`DistinguishedName`] is a sequence of relative distinguished names,
//! or [`Rdn`]s, each of which is a non-empty set of attribute type and
//! value pairs, or [`Ava`]s. The sequence starts with the least specific
//! RDN, i.e., usually the country.
//!
//! Names can be converted from and to their string form. Because this
//! needs to know the keywords used for the attribute types, this is done
//! via a [`Registry`]. The `Display` and `FromStr` impls use the standard
//! registry.

pub use self::ava::Ava;
pub use self::value::{AttributeValue, ValueConverter};

use std::fmt;
use std::convert::Infallible;
use std::str::FromStr;
use bcder::{decode, encode, Mode, Oid};
use bcder::decode::{DecodeError, IntoSource, Source};
use bcder::encode::Values;
use bytes::Bytes;
use crate::oid;
use crate::error::Error;
use crate::registry::{standard_registry, Registry};
use crate::x509::DerData;

mod ava;
mod text;
mod value;


//------------ Rdn -----------------------------------------------------------

/// A relative distinguished name.
///
/// ```text
/// RelativeDistinguishedName ::=
///     SET SIZE (1..MAX) OF AttributeTypeAndValue
/// ```
///
/// The AVAs are kept in the order they were added or decoded in. When
/// encoding, they are sorted as required for a DER SET OF.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Rdn(Vec<Ava>);

impl Rdn {
    /// Creates an RDN with a single AVA.
    pub fn new(ava: Ava) -> Self {
        Rdn(vec![ava])
    }

    /// Creates an RDN from a list of AVAs.
    ///
    /// Fails if the list is empty.
    pub fn from_avas(avas: Vec<Ava>) -> Result<Self, Error> {
        if avas.is_empty() {
            Err(Error::invalid_value("empty relative distinguished name"))
        }
        else {
            Ok(Rdn(avas))
        }
    }

    /// Adds another AVA.
    pub fn push(&mut self, ava: Ava) {
        self.0.push(ava)
    }

    /// Returns the number of AVAs.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns an iterator over the AVAs.
    pub fn iter(&self) -> impl Iterator<Item = &Ava> + '_ {
        self.0.iter()
    }

    /// Returns the first AVA with the given type.
    pub fn find<T: AsRef<[u8]>>(&self, oid: &Oid<T>) -> Option<&Ava> {
        self.0.iter().find(|ava| ava.oid() == oid)
    }

    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_set(Self::from_constructed)
    }

    /// Decodes the content of the SET.
    pub fn from_constructed<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        let mut avas = Vec::new();
        while let Some(ava) = Ava::take_opt_from(cons)? {
            avas.push(ava)
        }
        if avas.is_empty() {
            return Err(cons.content_err("empty relative distinguished name"))
        }
        Ok(Rdn(avas))
    }

    pub fn encode_ref(&self) -> impl encode::Values {
        encode::set(encode::iter(self.sorted().into_iter()))
    }

    /// Encodes the RDN as the content of an implicitly tagged value.
    pub fn encode_ref_as(&self, tag: bcder::Tag) -> impl encode::Values {
        encode::set_as(tag, encode::iter(self.sorted().into_iter()))
    }

    fn sorted(&self) -> Vec<DerData> {
        let mut avas: Vec<Bytes> = self.0.iter().map(Ava::to_der).collect();
        avas.sort();
        avas.into_iter().map(DerData::new).collect()
    }
}


//------------ DistinguishedName ---------------------------------------------

/// An X.500 distinguished name.
///
/// ```text
/// Name ::= CHOICE { -- only one possibility for now --
///     rdnSequence  RDNSequence }
///
/// RDNSequence ::= SEQUENCE OF RelativeDistinguishedName
/// ```
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct DistinguishedName(Vec<Rdn>);

impl DistinguishedName {
    /// Creates a new, empty name.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a name from a sequence of RDNs, least specific first.
    pub fn from_rdns(rdns: Vec<Rdn>) -> Self {
        DistinguishedName(rdns)
    }

    /// Parses the string form of a name.
    pub fn parse(s: &str, registry: &Registry) -> Result<Self, Error> {
        text::parse(s, registry)
    }

    /// Returns the string form of the name.
    pub fn to_string_with(&self, registry: &Registry) -> String {
        let mut res = String::new();
        // Writing into a string never fails.
        let _ = text::write(self, registry, &mut res);
        res
    }

    /// Appends an RDN as the new most specific one.
    pub fn push(&mut self, rdn: Rdn) {
        self.0.push(rdn)
    }

    /// Appends an RDN with a single AVA.
    pub fn push_ava(&mut self, oid: Oid, value: AttributeValue) {
        self.0.push(Rdn::new(Ava::new(oid, value)))
    }

    pub fn rdns(&self) -> &[Rdn] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the first AVA of the given type.
    ///
    /// RDNs are searched starting with the least specific one.
    pub fn find<T: AsRef<[u8]>>(&self, oid: &Oid<T>) -> Option<&Ava> {
        self.0.iter().find_map(|rdn| rdn.find(oid))
    }

    /// Returns the text of the first AVA of the given type.
    ///
    /// Returns `None` if there is no such AVA or if its value isn’t a
    /// string.
    pub fn find_text<T: AsRef<[u8]>>(
        &self, oid: &Oid<T>
    ) -> Option<String> {
        self.find(oid).and_then(Ava::to_text)
    }

    pub fn common_name(&self) -> Option<String> {
        self.find_text(&oid::AT_COMMON_NAME)
    }

    pub fn surname(&self) -> Option<String> {
        self.find_text(&oid::AT_SURNAME)
    }

    pub fn given_name(&self) -> Option<String> {
        self.find_text(&oid::AT_GIVEN_NAME)
    }

    pub fn serial_number(&self) -> Option<String> {
        self.find_text(&oid::AT_SERIAL_NUMBER)
    }

    pub fn country(&self) -> Option<String> {
        self.find_text(&oid::AT_COUNTRY_NAME)
    }

    pub fn locality(&self) -> Option<String> {
        self.find_text(&oid::AT_LOCALITY_NAME)
    }

    pub fn state_or_province(&self) -> Option<String> {
        self.find_text(&oid::AT_STATE_OR_PROVINCE_NAME)
    }

    pub fn street_address(&self) -> Option<String> {
        self.find_text(&oid::AT_STREET_ADDRESS)
    }

    pub fn organization(&self) -> Option<String> {
        self.find_text(&oid::AT_ORGANIZATION_NAME)
    }

    pub fn organizational_unit(&self) -> Option<String> {
        self.find_text(&oid::AT_ORGANIZATIONAL_UNIT_NAME)
    }

    pub fn title(&self) -> Option<String> {
        self.find_text(&oid::AT_TITLE)
    }

    pub fn domain_component(&self) -> Option<String> {
        self.find_text(&oid::AT_DOMAIN_COMPONENT)
    }

    pub fn email_address(&self) -> Option<String> {
        self.find_text(&oid::PKCS9_EMAIL_ADDRESS)
    }
}


/// # Decoding and Encoding
///
impl DistinguishedName {
    /// Decodes a name from its DER encoding.
    pub fn decode<S>(source: S) -> Result<Self, Error>
    where S: IntoSource, S::Source: Source<Error = Infallible> {
        Mode::Ber.decode(source, Self::take_from).map_err(Into::into)
    }

    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_sequence(Self::from_constructed)
    }

    pub fn from_constructed<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        let mut rdns = Vec::new();
        while let Some(rdn) = cons.take_opt_set(Rdn::from_constructed)? {
            rdns.push(rdn)
        }
        Ok(DistinguishedName(rdns))
    }

    pub fn encode_ref(&self) -> impl encode::Values + '_ {
        encode::sequence(
            encode::iter(self.0.iter().map(Rdn::encode_ref))
        )
    }

    /// Returns the DER encoding of the name.
    pub fn to_bytes(&self) -> Bytes {
        self.encode_ref().to_captured(Mode::Der).into_bytes()
    }
}


//--- FromStr and Display

impl FromStr for DistinguishedName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s, standard_registry())
    }
}

impl fmt::Display for DistinguishedName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        text::write(self, standard_registry(), f)
    }
}


//--- Deserialize and Serialize

#[cfg(feature = "serde")]
impl serde::Serialize for DistinguishedName {
    fn serialize<S: serde::Serializer>(
        &self, serializer: S
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for DistinguishedName {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D
    ) -> Result<Self, D::Error> {
        use serde::de;

        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(de::Error::custom)
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use bcder::Tag;

    #[test]
    fn extract_fields() {
        let name = DistinguishedName::from_str(
            "CN=Otis Smith,E=otis@example.com,OU=Eng,O=Example,C=US"
        ).unwrap();
        assert_eq!(name.common_name().unwrap(), "Otis Smith");
        assert_eq!(name.country().unwrap(), "US");
        assert_eq!(name.organizational_unit().unwrap(), "Eng");
        assert_eq!(name.organization().unwrap(), "Example");
        assert_eq!(name.email_address().unwrap(), "otis@example.com");
        assert!(name.locality().is_none());
    }

    #[test]
    fn first_match_wins() {
        let name = DistinguishedName::from_str(
            "OU=Inner,OU=Outer,O=Example"
        ).unwrap();
        assert_eq!(name.organizational_unit().unwrap(), "Outer");
    }

    #[test]
    fn encode_decode() {
        let name = DistinguishedName::from_str("CN=Test,C=US").unwrap();
        let der = name.to_bytes();
        assert_eq!(
            der.as_ref(),
            b"\x30\x1c\
              \x31\x0b\x30\x09\x06\x03\x55\x04\x06\x13\x02US\
              \x31\x0d\x30\x0b\x06\x03\x55\x04\x03\x13\x04Test"
        );
        assert_eq!(DistinguishedName::decode(der.as_ref()).unwrap(), name);
        assert_eq!(name.to_string(), "CN=Test,C=US");

        let empty = DistinguishedName::new();
        assert_eq!(empty.to_bytes().as_ref(), b"\x30\x00");
        assert!(DistinguishedName::decode(b"\x30\x00".as_ref()).unwrap()
            .is_empty());
    }

    #[test]
    fn decode_ber() {
        let name = DistinguishedName::from_str("CN=Test,C=US").unwrap();

        // Indefinite length for the outer SEQUENCE.
        let indefinite = b"\x30\x80\
              \x31\x0b\x30\x09\x06\x03\x55\x04\x06\x13\x02US\
              \x31\x0d\x30\x0b\x06\x03\x55\x04\x03\x13\x04Test\
              \x00\x00";
        let decoded = DistinguishedName::decode(
            indefinite.as_ref()
        ).unwrap();
        assert_eq!(decoded, name);
        assert_eq!(decoded.to_bytes(), name.to_bytes());

        // Non-minimal long form lengths.
        let long = b"\x30\x81\x1d\
              \x31\x81\x0b\x30\x09\x06\x03\x55\x04\x06\x13\x02US\
              \x31\x0d\x30\x0b\x06\x03\x55\x04\x03\x13\x04Test";
        assert_eq!(
            DistinguishedName::decode(long.as_ref()).unwrap(), name
        );
    }

    #[test]
    fn rdn_sorted_on_encode() {
        let mut rdn = Rdn::new(Ava::new(
            oid::to_owned(&oid::AT_ORGANIZATIONAL_UNIT_NAME),
            AttributeValue::string(Tag::PRINTABLE_STRING, b"B")
        ));
        rdn.push(Ava::new(
            oid::to_owned(&oid::AT_COMMON_NAME),
            AttributeValue::string(Tag::PRINTABLE_STRING, b"A")
        ));
        let der = rdn.encode_ref().to_captured(Mode::Der);
        assert_eq!(
            der.as_slice(),
            b"\x31\x14\
              \x30\x08\x06\x03\x55\x04\x03\x13\x01A\
              \x30\x08\x06\x03\x55\x04\x0b\x13\x01B"
        );

        // Insertion order is kept in memory.
        assert_eq!(
            rdn.iter().next().unwrap().oid(),
            &oid::AT_ORGANIZATIONAL_UNIT_NAME
        );
    }

    #[test]
    fn reject_empty_rdn() {
        assert!(Rdn::from_avas(Vec::new()).is_err());
        assert!(
            DistinguishedName::decode(b"\x30\x02\x31\x00".as_ref()).is_err()
        );
    }

    #[test]
    #[cfg(feature = "serde")]
    fn serde_name() {
        let name = DistinguishedName::from_str("CN=Test,C=US").unwrap();
        let json = serde_json::to_string(&name).unwrap();
        assert_eq!(json, "\"CN=Test,C=US\"");
        assert_eq!(
            serde_json::from_str::<DistinguishedName>(&json).unwrap(), name
        );
    }
}

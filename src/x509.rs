//! Types common to all things X.509.

use std::{error, fmt, io, ops};
use std::str::FromStr;
use bcder::{decode, encode};
use bcder::{Captured, Mode, Tag};
use bcder::decode::{ContentError, DecodeError, Source};
use bcder::encode::PrimitiveContent;
use bytes::Bytes;
use chrono::{Datelike, DateTime, LocalResult, Timelike, TimeZone, Utc};
use crate::crypto::{AlgorithmIdentifier, PublicKey, Verifier};


//------------ Serial --------------------------------------------------------

/// A certificate serial number.
///
/// Serial numbers are non-negative integers of at most 20 octets. They are
/// also used for CRL numbers which have the same limits.
//
//  We encode the serial number in 20 octets left padded.
#[derive(Clone, Copy, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Serial([u8; 20]);

impl Serial {
    /// Creates a serial number from an octet slice.
    ///
    /// The slice contains the big-endian unsigned value.
    pub fn from_slice(s: &[u8]) -> Result<Self, SerialSliceError> {
        // Empty slice is malformed.
        if s.is_empty() {
            return Err(SerialSliceError::empty())
        }
        // We do not support more than 20 octets.
        if s.len() > 20 {
            return Err(SerialSliceError::long())
        }
        let mut res = <[u8; 20]>::default();
        res[20 - s.len()..].copy_from_slice(s);
        // The left-most bit must be 0 to indicate an unsigned integer.
        if res[0] & 0x80 != 0 {
            return Err(SerialSliceError::long())
        }
        Ok(Self(res))
    }

    /// Creates a serial number from the content octets of an INTEGER.
    pub fn from_der_content(content: &[u8]) -> Result<Self, SerialSliceError> {
        match content.first() {
            None => return Err(SerialSliceError::empty()),
            Some(first) if first & 0x80 != 0 => {
                return Err(SerialSliceError::negative())
            }
            _ => { }
        }
        let start = content.iter().position(|&octet| octet != 0)
            .unwrap_or(content.len() - 1);
        Self::from_slice(&content[start..])
    }

    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_primitive_if(Tag::INTEGER, Self::from_primitive)
    }

    /// Decodes a serial number from the content of a primitive value.
    pub fn from_primitive<S: decode::Source>(
        prim: &mut decode::Primitive<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        let content = prim.take_all()?;
        Self::from_der_content(&content).map_err(|err| prim.content_err(err))
    }

    /// Returns the index of the first octet to encode.
    fn start(self) -> usize {
        let start = self.0.iter().enumerate().find_map(|(idx, &val)| {
            if val == 0 { None }
            else { Some(idx) }
        }).unwrap_or(19);
        if self.0[start] & 0x80 != 0 {
            start - 1
        }
        else {
            start
        }
    }

    /// Returns `self * 10 + digit` or `None` if that overflows.
    fn push_digit(self, digit: u8) -> Option<Self> {
        let mut res = self.0;
        let mut carry = u16::from(digit);
        for octet in res.iter_mut().rev() {
            let value = u16::from(*octet) * 10 + carry;
            *octet = (value & 0xFF) as u8;
            carry = value >> 8;
        }
        if carry != 0 || res[0] & 0x80 != 0 {
            return None
        }
        Some(Serial(res))
    }

    /// Returns the decimal representation.
    fn to_decimal(self) -> String {
        let mut value = self.0;
        let mut digits = Vec::new();
        loop {
            let mut rem = 0u16;
            for octet in value.iter_mut() {
                let cur = (rem << 8) | u16::from(*octet);
                *octet = (cur / 10) as u8;
                rem = cur % 10;
            }
            digits.push(b'0' + rem as u8);
            if value.iter().all(|&octet| octet == 0) {
                break
            }
        }
        digits.iter().rev().map(|&ch| char::from(ch)).collect()
    }
}


//--- From and FromStr

impl From<u64> for Serial {
    fn from(value: u64) -> Self {
        let mut res = <[u8; 20]>::default();
        res[12..].copy_from_slice(&value.to_be_bytes());
        Serial(res)
    }
}

impl From<Serial> for String {
    fn from(serial: Serial) -> String {
        serial.to_decimal()
    }
}

impl FromStr for Serial {
    type Err = RepresentationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.is_empty() {
            return Err(RepresentationError)
        }
        value.bytes().try_fold(Serial::default(), |res, ch| {
            if !ch.is_ascii_digit() {
                return None
            }
            res.push_digit(ch - b'0')
        }).ok_or(RepresentationError)
    }
}


//--- Display and Debug

impl fmt::Display for Serial {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.to_decimal())
    }
}

impl fmt::Debug for Serial {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Serial({self})")
    }
}


//--- PrimitiveContent

impl PrimitiveContent for Serial {
    const TAG: Tag = Tag::INTEGER;

    fn encoded_len(&self, _mode: Mode) -> usize {
        20 - self.start()
    }

    fn write_encoded<W: io::Write>(
        &self,
        _mode: Mode,
        target: &mut W
    ) -> Result<(), io::Error> {
        target.write_all(&self.0[self.start()..])
    }
}


//--- Deserialize and Serialize

#[cfg(feature = "serde")]
impl serde::Serialize for Serial {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_decimal())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Serial {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D
    ) -> Result<Self, D::Error> {
        struct SerialVisitor;

        impl serde::de::Visitor<'_> for SerialVisitor {
            type Value = Serial;

            fn expecting(
                &self, formatter: &mut fmt::Formatter
            ) -> fmt::Result {
                write!(formatter, "a string containing a serial number")
            }

            fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
            where E: serde::de::Error {
                Serial::from_str(s).map_err(serde::de::Error::custom)
            }
        }

        deserializer.deserialize_str(SerialVisitor)
    }
}


//------------ Bits ----------------------------------------------------------

/// The content of a BIT STRING.
///
/// This is used for all the places where certificates and CRLs carry bit
/// strings: signature values, public keys, unique identifiers, and the
/// named bit lists of a few extensions.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Bits {
    /// The number of unused bits in the last octet.
    unused: u8,

    /// The octets.
    octets: Bytes,
}

impl Bits {
    /// Creates a bit string from its parts.
    ///
    /// Returns `None` if `unused` is greater than seven or non-zero for an
    /// empty octet sequence.
    pub fn new(unused: u8, octets: Bytes) -> Option<Self> {
        if unused > 7 || (unused > 0 && octets.is_empty()) {
            None
        }
        else {
            Some(Bits { unused, octets })
        }
    }

    /// Creates a bit string containing all bits of the given octets.
    pub fn from_octets(octets: Bytes) -> Self {
        Bits { unused: 0, octets }
    }

    /// Creates a bit string from a list of named bits.
    ///
    /// Trailing bits that are not set are dropped as DER requires for
    /// named bit lists.
    pub fn from_flags(flags: &[bool]) -> Self {
        let len = flags.iter().rposition(|&bit| bit).map(|pos| pos + 1)
            .unwrap_or(0);
        let mut octets = vec![0u8; (len + 7) / 8];
        for (idx, _) in flags[..len].iter().enumerate().filter(|x| *x.1) {
            octets[idx / 8] |= 0x80 >> (idx % 8);
        }
        Bits {
            unused: ((8 - len % 8) % 8) as u8,
            octets: octets.into(),
        }
    }

    /// Returns the number of bits.
    pub fn bit_len(&self) -> usize {
        self.octets.len() * 8 - usize::from(self.unused)
    }

    /// Returns the bit with the given index.
    ///
    /// Bits beyond the end of the string are not set.
    pub fn bit(&self, idx: usize) -> bool {
        if idx >= self.bit_len() {
            return false
        }
        self.octets[idx / 8] & (0x80 >> (idx % 8)) != 0
    }

    /// Returns all bits as a list of flags.
    pub fn to_flags(&self) -> Vec<bool> {
        (0..self.bit_len()).map(|idx| self.bit(idx)).collect()
    }

    /// Returns the number of unused bits.
    pub fn unused(&self) -> u8 {
        self.unused
    }

    /// Returns the octets of the bit string.
    pub fn octets(&self) -> &Bytes {
        &self.octets
    }

    /// Returns the octets if there are no unused bits.
    pub fn octet_bytes(&self) -> Option<Bytes> {
        if self.unused == 0 {
            Some(self.octets.clone())
        }
        else {
            None
        }
    }

    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_primitive_if(Tag::BIT_STRING, Self::from_primitive)
    }

    /// Decodes a bit string from the content of a primitive value.
    pub fn from_primitive<S: decode::Source>(
        prim: &mut decode::Primitive<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        let unused = prim.take_u8()?;
        let octets = prim.take_all()?;
        match Self::new(unused, octets) {
            Some(res) => Ok(res),
            None => Err(prim.content_err("invalid bit string"))
        }
    }
}

impl PrimitiveContent for Bits {
    const TAG: Tag = Tag::BIT_STRING;

    fn encoded_len(&self, _: Mode) -> usize {
        self.octets.len() + 1
    }

    fn write_encoded<W: io::Write>(
        &self,
        _: Mode,
        target: &mut W
    ) -> Result<(), io::Error> {
        target.write_all(&[self.unused])?;
        target.write_all(self.octets.as_ref())
    }
}


//------------ Octets --------------------------------------------------------

/// Raw octets as the content of a primitive value.
///
/// The default tag is OCTET STRING. Use `encode_as` for all the string
/// types and implicitly tagged values.
#[derive(Clone, Copy, Debug)]
pub struct Octets<'a>(pub &'a [u8]);

impl PrimitiveContent for Octets<'_> {
    const TAG: Tag = Tag::OCTET_STRING;

    fn encoded_len(&self, _: Mode) -> usize {
        self.0.len()
    }

    fn write_encoded<W: io::Write>(
        &self,
        _: Mode,
        target: &mut W
    ) -> Result<(), io::Error> {
        target.write_all(self.0)
    }
}


//------------ DerData -------------------------------------------------------

/// One or more complete values in their encoded form.
///
/// This is used wherever a value of type ANY is kept without interpreting
/// it, e.g., attribute values or policy qualifiers.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct DerData(Bytes);

impl DerData {
    pub fn new(data: Bytes) -> Self {
        DerData(data)
    }

    /// Creates a value from anything that can be encoded.
    pub fn from_values<V: encode::Values>(values: V) -> Self {
        DerData(Captured::from_values(Mode::Der, values).into_bytes())
    }

    /// Takes a single value from a constructed value.
    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.capture_one().map(|captured| DerData(captured.into_bytes()))
    }

    /// Takes a single value if there is one left.
    pub fn take_opt_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Option<Self>, DecodeError<S::Error>> {
        let captured = cons.capture(|cons| {
            cons.take_opt_value(|_, content| match content {
                decode::Content::Primitive(prim) => prim.skip_all(),
                decode::Content::Constructed(cons) => cons.skip_all(),
            })?;
            Ok(())
        })?.into_bytes();
        if captured.is_empty() {
            Ok(None)
        }
        else {
            Ok(Some(DerData(captured)))
        }
    }

    /// Takes everything left in a constructed value.
    pub fn take_all_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.capture(|cons| cons.skip_all()).map(|captured| {
            DerData(captured.into_bytes())
        })
    }

    pub fn as_slice(&self) -> &[u8] {
        self.0.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_bytes(self) -> Bytes {
        self.0
    }
}

impl AsRef<[u8]> for DerData {
    fn as_ref(&self) -> &[u8] {
        self.0.as_ref()
    }
}

impl encode::Values for DerData {
    fn encoded_len(&self, _mode: Mode) -> usize {
        self.0.len()
    }

    fn write_encoded<W: io::Write>(
        &self,
        _mode: Mode,
        target: &mut W
    ) -> Result<(), io::Error> {
        target.write_all(&self.0)
    }
}


//------------ SignedData ----------------------------------------------------

/// The signed envelope of a certificate or CRL.
///
/// This keeps the to-be-signed data exactly as it was encoded, so the very
/// same octets are handed to signature verification. This is true even if
/// the data was BER rather than DER encoded.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SignedData {
    data: DerData,
    algorithm: AlgorithmIdentifier,
    signature: Bits,
}

impl SignedData {
    pub fn new(
        data: Bytes, algorithm: AlgorithmIdentifier, signature: Bits
    ) -> Self {
        Self { data: DerData::new(data), algorithm, signature }
    }

    /// Returns the to-be-signed data.
    pub fn data(&self) -> &DerData {
        &self.data
    }

    /// Returns the signature algorithm of the envelope.
    pub fn algorithm(&self) -> &AlgorithmIdentifier {
        &self.algorithm
    }

    /// Returns the signature value.
    pub fn signature(&self) -> &Bits {
        &self.signature
    }

    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_sequence(Self::from_constructed)
    }

    pub fn from_constructed<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        Ok(SignedData {
            data: DerData::take_from(cons)?,
            algorithm: AlgorithmIdentifier::take_from(cons)?,
            signature: Bits::take_from(cons)?,
        })
    }

    pub fn encode_ref(&self) -> impl encode::Values + '_ {
        encode::sequence((
            &self.data,
            self.algorithm.encode_ref(),
            self.signature.encode_ref(),
        ))
    }

    /// Verifies the signature with the given verifier and public key.
    pub fn verify_signature<V: Verifier>(
        &self,
        verifier: &V,
        public_key: &PublicKey,
    ) -> Result<bool, V::Error> {
        verifier.verify(
            public_key, &self.algorithm, self.data.as_slice(),
            self.signature.octets().as_ref()
        )
    }
}


//------------ Time ----------------------------------------------------------

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Time(DateTime<Utc>);

impl Time {
    /// Creates a time value from its parts.
    ///
    /// Returns `None` if the parts don’t form a valid time.
    pub fn utc(
        year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32
    ) -> Option<Self> {
        Utc.with_ymd_and_hms(year, month, day, hour, min, sec)
            .single().map(Time)
    }

    /// Takes a time in either UTCTime or GeneralizedTime form.
    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_primitive(|tag, prim| {
            match tag {
                Tag::UTC_TIME => Self::from_utc_primitive(prim),
                Tag::GENERALIZED_TIME => {
                    Self::from_generalized_primitive(prim)
                }
                _ => {
                    Err(prim.content_err(
                        "malformed time value"
                    ))
                }
            }
        })
    }

    pub fn take_opt_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Option<Self>, DecodeError<S::Error>> {
        let res = cons.take_opt_primitive_if(
            Tag::UTC_TIME, Self::from_utc_primitive
        )?;
        if let Some(res) = res {
            return Ok(Some(res))
        }
        cons.take_opt_primitive_if(
            Tag::GENERALIZED_TIME, Self::from_generalized_primitive
        )
    }

    /// Takes a time that has to be in GeneralizedTime form.
    pub fn take_generalized_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_primitive_if(
            Tag::GENERALIZED_TIME, Self::from_generalized_primitive
        )
    }

    /// Decodes the content of a UTCTime.
    pub fn from_utc_primitive<S: decode::Source>(
        prim: &mut decode::Primitive<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        // RFC 5280 requires the format YYMMDDHHMMSSZ
        let year = read_number(prim, 2)? as i32;
        let year = if year >= 50 { year + 1900 } else { year + 2000 };
        let res = (
            year,
            read_number(prim, 2)?,
            read_number(prim, 2)?,
            read_number(prim, 2)?,
            read_number(prim, 2)?,
            read_number(prim, 2)?,
        );
        if prim.take_u8()? != b'Z' {
            return Err(prim.content_err(
                "malformed time value"
            ))
        }
        Self::from_parts(res).map_err(|err| prim.content_err(err))
    }

    /// Decodes the content of a GeneralizedTime.
    pub fn from_generalized_primitive<S: decode::Source>(
        prim: &mut decode::Primitive<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        // RFC 5280 requires the format YYYYMMDDHHMMSSZ
        let res = (
            read_number(prim, 4)? as i32,
            read_number(prim, 2)?,
            read_number(prim, 2)?,
            read_number(prim, 2)?,
            read_number(prim, 2)?,
            read_number(prim, 2)?,
        );
        if prim.take_u8()? != b'Z' {
            return Err(prim.content_err(
                "malformed time value"
            ))
        }
        Self::from_parts(res).map_err(|err| prim.content_err(err))
    }

    fn from_parts(
        parts: (i32, u32, u32, u32, u32, u32)
    ) -> Result<Self, ContentError> {
        match Utc.with_ymd_and_hms(
            parts.0, parts.1, parts.2, parts.3, parts.4, parts.5
        ) {
            LocalResult::Single(dt) => Ok(Time(dt)),
            _ => Err(ContentError::from_static("malformed time value"))
        }
    }

    /// Encodes the time the way RFC 5280 wants it in validity periods.
    ///
    /// Times between 1950 and 2049 are encoded as UTCTime, all others as
    /// GeneralizedTime.
    pub fn encode_varied(self) -> impl encode::Values {
        if self.year() < 1950 || self.year() > 2049 {
            (None, Some(GeneralizedTime(self).encode()))
        }
        else {
            (Some(UtcTime(self).encode()), None)
        }
    }
}


//--- Deref

impl ops::Deref for Time {
    type Target = DateTime<Utc>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}


/// Reads a decimal number with exactly `len` digits.
fn read_number<S: decode::Source>(
    prim: &mut decode::Primitive<S>, len: usize
) -> Result<u32, DecodeError<S::Error>> {
    let mut res = 0;
    for _ in 0..len {
        let ch = prim.take_u8()?;
        if !ch.is_ascii_digit() {
            return Err(prim.content_err("malformed time value"))
        }
        res = res * 10 + u32::from(ch - b'0');
    }
    Ok(res)
}


//------------ UtcTime -------------------------------------------------------

struct UtcTime(Time);

impl PrimitiveContent for UtcTime {
    const TAG: Tag = Tag::UTC_TIME;

    fn encoded_len(&self, _: Mode) -> usize {
        13 // yyMMddhhmmssZ
    }

    fn write_encoded<W: io::Write>(
        &self, _: Mode, target: &mut W
    ) -> Result<(), io::Error> {
        write!(
            target, "{:02}{:02}{:02}{:02}{:02}{:02}Z",
            self.0.year() % 100, self.0.month(), self.0.day(),
            self.0.hour(), self.0.minute(), self.0.second()
        )
    }
}


//------------ GeneralizedTime -----------------------------------------------

pub struct GeneralizedTime(pub Time);

impl PrimitiveContent for GeneralizedTime {
    const TAG: Tag = Tag::GENERALIZED_TIME;

    fn encoded_len(&self, _: Mode) -> usize {
        15 // yyyyMMddhhmmssZ
    }

    fn write_encoded<W: io::Write>(
        &self, _: Mode, target: &mut W
    ) -> Result<(), io::Error> {
        write!(
            target, "{:04}{:02}{:02}{:02}{:02}{:02}Z",
            self.0.year(), self.0.month(), self.0.day(),
            self.0.hour(), self.0.minute(), self.0.second()
        )
    }
}


//------------ Validity ------------------------------------------------------

#[derive(Clone, Debug, Copy, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Validity {
    not_before: Time,
    not_after: Time,
}

impl Validity {
    pub fn new(not_before: Time, not_after: Time) -> Self {
        Validity { not_before, not_after }
    }

    pub fn not_before(self) -> Time {
        self.not_before
    }

    pub fn not_after(self) -> Time {
        self.not_after
    }

    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_sequence(|cons| {
            Ok(Validity::new(
                Time::take_from(cons)?,
                Time::take_from(cons)?,
            ))
        })
    }

    pub fn encode(self) -> impl encode::Values {
        encode::sequence((
            self.not_before.encode_varied(),
            self.not_after.encode_varied(),
        ))
    }
}


//------------ SerialSliceError ----------------------------------------------

/// A serial number’s slice is invalid.
#[derive(Clone, Copy, Debug)]
pub struct SerialSliceError(SerialSliceErrorKind);

#[derive(Clone, Copy, Debug)]
enum SerialSliceErrorKind {
    Empty,
    Long,
    Negative,
}

impl SerialSliceError {
    fn empty() -> Self {
        SerialSliceError(SerialSliceErrorKind::Empty)
    }

    fn long() -> Self {
        SerialSliceError(SerialSliceErrorKind::Long)
    }

    fn negative() -> Self {
        SerialSliceError(SerialSliceErrorKind::Negative)
    }

    fn as_str(self) -> &'static str {
        match self.0 {
            SerialSliceErrorKind::Empty => "empty serial number",
            SerialSliceErrorKind::Long => "serial number longer than 20 bytes",
            SerialSliceErrorKind::Negative => "negative serial number",
        }
    }
}

impl From<SerialSliceError> for ContentError {
    fn from(err: SerialSliceError) -> Self {
        ContentError::from_static(err.as_str())
    }
}

impl fmt::Display for SerialSliceError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl error::Error for SerialSliceError { }


//------------ RepresentationError -------------------------------------------

/// A source value is not correctly formated for converting into a value.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RepresentationError;

impl fmt::Display for RepresentationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("wrong representation format")
    }
}

impl error::Error for RepresentationError { }


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use bcder::decode::Constructed;
    use bcder::encode::Values;

    #[test]
    fn serial_from_slice() {
        assert_eq!(
            Serial::from_slice(b"\x01\x02\x03").unwrap(),
            Serial([0,0,0,0,0,0,0,0,0,0, 0,0,0,0,0,0,0,1,2,3])
        );
        assert_eq!(
            Serial::from(0x10203u64),
            Serial([0,0,0,0,0,0,0,0,0,0, 0,0,0,0,0,0,0,1,2,3])
        );
    }

    #[test]
    fn serial_take_from() {
        assert_eq!(
            Constructed::decode(
                b"\x02\x03\x01\x02\x03".as_ref(),
                Mode::Der,
                Serial::take_from
            ).unwrap(),
            Serial([0,0,0,0,0,0,0,0,0,0, 0,0,0,0,0,0,0,1,2,3])
        );
        assert_eq!(
            Constructed::decode(
                b"\x02\x04\x00\x81\x02\x03".as_ref(),
                Mode::Der,
                Serial::take_from
            ).unwrap(),
            Serial([0,0,0,0,0,0,0,0,0,0, 0,0,0,0,0,0,0,0x81,2,3])
        );
        assert!(
            Constructed::decode(
                b"\x02\x03\x81\x02\x03".as_ref(),
                Mode::Der,
                Serial::take_from
            ).is_err()
        );
    }

    #[test]
    fn serial_from_str() {
        assert_eq!(
            Serial::from_str("383822").unwrap(),
            Serial::from_slice(b"\x05\xdb\x4e").unwrap()
        );
        assert_eq!(
            Serial::from_str("000000383822").unwrap(),
            Serial::from_slice(b"\x05\xdb\x4e").unwrap()
        );
        assert_eq!(Serial::from_str("0").unwrap(), Serial::default());
        assert!(Serial::from_str("hello").is_err());
        assert!(Serial::from_str("").is_err());
        assert!(
            Serial::from_str(
                "730750818665451459101842416358141509827966271488"
            ).is_err()
        );
    }

    #[test]
    fn serial_display() {
        assert_eq!(
            String::from(Serial::from_slice(b"\x05\xdb\x4e").unwrap()),
            String::from("383822"),
        );
        assert_eq!(Serial::default().to_string(), "0");
        assert_eq!(Serial::from(42u64).to_string(), "42");
    }

    #[test]
    fn serial_encode() {
        let mut target = Vec::new();
        Serial([0,0,0,0,0,0,0,0,0,0, 0,0,0,0,0,0,0,1,2,3])
            .encode().write_encoded(Mode::Der, &mut target).unwrap();
        assert_eq!(
            target,
            b"\x02\x03\x01\x02\x03"
        );

        let mut target = Vec::new();
        Serial([0,0,0,0,0,0,0,0,0,0, 0,0,0,0,0,0,0,0x81,2,3])
            .encode().write_encoded(Mode::Der, &mut target).unwrap();
        assert_eq!(
            target,
            b"\x02\x04\x00\x81\x02\x03"
        );

        let mut target = Vec::new();
        Serial::default()
            .encode().write_encoded(Mode::Der, &mut target).unwrap();
        assert_eq!(target, b"\x02\x01\x00");
    }

    #[test]
    fn bits_from_flags() {
        let bits = Bits::from_flags(&[true, false, true, false, false]);
        assert_eq!(bits.unused(), 5);
        assert_eq!(bits.octets().as_ref(), b"\xa0");
        assert!(bits.bit(0));
        assert!(!bits.bit(1));
        assert!(bits.bit(2));
        assert!(!bits.bit(12));

        let bits = Bits::from_flags(&[false; 9]);
        assert_eq!(bits.unused(), 0);
        assert!(bits.octets().is_empty());

        let mut flags = [false; 9];
        flags[8] = true;
        let bits = Bits::from_flags(&flags);
        assert_eq!(bits.unused(), 7);
        assert_eq!(bits.octets().as_ref(), b"\x00\x80");
        assert_eq!(bits.to_flags(), flags);
    }

    #[test]
    fn bits_take_from() {
        let bits = Mode::Der.decode(
            b"\x03\x02\x07\x80".as_ref(), Bits::take_from
        ).unwrap();
        assert_eq!(bits.bit_len(), 1);
        assert!(bits.bit(0));
        assert!(
            Mode::Der.decode(b"\x03\x01\x07".as_ref(), Bits::take_from)
                .is_err()
        );
    }

    #[test]
    fn time_encode_varied() {
        let mut target = Vec::new();
        Time::utc(2024, 3, 1, 12, 0, 5).unwrap().encode_varied()
            .write_encoded(Mode::Der, &mut target).unwrap();
        assert_eq!(target, b"\x17\x0d240301120005Z");

        let mut target = Vec::new();
        Time::utc(2050, 1, 1, 0, 0, 0).unwrap().encode_varied()
            .write_encoded(Mode::Der, &mut target).unwrap();
        assert_eq!(target, b"\x18\x0f20500101000000Z");
    }

    #[test]
    fn time_take_from() {
        assert_eq!(
            Mode::Der.decode(
                b"\x17\x0d491231235959Z".as_ref(), Time::take_from
            ).unwrap(),
            Time::utc(2049, 12, 31, 23, 59, 59).unwrap()
        );
        assert_eq!(
            Mode::Der.decode(
                b"\x17\x0d500101000000Z".as_ref(), Time::take_from
            ).unwrap(),
            Time::utc(1950, 1, 1, 0, 0, 0).unwrap()
        );
        assert!(
            Mode::Der.decode(
                b"\x17\x0d501301000000Z".as_ref(), Time::take_from
            ).is_err()
        );
        assert!(
            Mode::Der.decode(
                b"\x17\x0d5001010000+0Z".as_ref(), Time::take_from
            ).is_err()
        );
    }
}

//! Algorithm identifiers and public keys.

use std::{error, fmt, io, str};
use std::str::FromStr;
use bcder::{decode, encode, ConstOid, Oid};
use bcder::{Mode, Tag};
use bcder::decode::{DecodeError, IntoSource, Source};
use bcder::encode::{PrimitiveContent, Values};
use bytes::Bytes;
use ring::digest;
use crate::oid;
use crate::x509::{Bits, DerData, RepresentationError};


//------------ AlgorithmIdentifier -------------------------------------------

/// An algorithm identifier.
///
/// ```txt
/// AlgorithmIdentifier  ::=  SEQUENCE  {
///      algorithm               OBJECT IDENTIFIER,
///      parameters              ANY DEFINED BY algorithm OPTIONAL  }
/// ```
///
/// The parameters are kept in their encoded form. This crate doesn’t need
/// to understand them.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct AlgorithmIdentifier {
    algorithm: Oid,
    parameters: Option<DerData>,
}

impl AlgorithmIdentifier {
    pub fn new(algorithm: Oid, parameters: Option<DerData>) -> Self {
        AlgorithmIdentifier { algorithm, parameters }
    }

    /// Creates the identifier for a signature algorithm given by its name.
    ///
    /// The names are those commonly used in Java, e.g., `SHA256withRSA`,
    /// or `Ed25519`. They are compared ignoring case. The RSA algorithms
    /// get an explicit NULL parameter, all the others none.
    pub fn from_name(name: &str) -> Result<Self, UnknownAlgorithm> {
        signature_algorithms().into_iter().find(|item| {
            item.0.eq_ignore_ascii_case(name)
        }).map(|(_, algorithm, null)| {
            AlgorithmIdentifier {
                algorithm: oid::to_owned(&algorithm),
                parameters: if null {
                    Some(DerData::from_values(().encode()))
                }
                else {
                    None
                }
            }
        }).ok_or(UnknownAlgorithm)
    }

    /// Returns the name of the signature algorithm if it is known.
    pub fn name(&self) -> Option<&'static str> {
        signature_algorithms().into_iter().find(|item| {
            item.1 == self.algorithm
        }).map(|item| item.0)
    }

    pub fn algorithm(&self) -> &Oid {
        &self.algorithm
    }

    pub fn parameters(&self) -> Option<&DerData> {
        self.parameters.as_ref()
    }

    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_sequence(|cons| {
            let algorithm = Oid::take_from(cons)?;
            let parameters = DerData::take_all_from(cons)?;
            Ok(AlgorithmIdentifier {
                algorithm,
                parameters: if parameters.is_empty() {
                    None
                }
                else {
                    Some(parameters)
                }
            })
        })
    }

    pub fn encode_ref(&self) -> impl encode::Values + '_ {
        encode::sequence((
            self.algorithm.encode_ref(),
            self.parameters.as_ref(),
        ))
    }
}

impl FromStr for AlgorithmIdentifier {
    type Err = UnknownAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

/// The table of signature algorithm names.
///
/// Each entry has the name, the OID, and whether the parameters are NULL.
fn signature_algorithms() -> [(&'static str, ConstOid, bool); 17] {
    [
        ("SHA1withRSA", oid::SHA1_WITH_RSA_ENCRYPTION, true),
        ("SHA224withRSA", oid::SHA224_WITH_RSA_ENCRYPTION, true),
        ("SHA256withRSA", oid::SHA256_WITH_RSA_ENCRYPTION, true),
        ("SHA384withRSA", oid::SHA384_WITH_RSA_ENCRYPTION, true),
        ("SHA512withRSA", oid::SHA512_WITH_RSA_ENCRYPTION, true),
        ("SHA1withECDSA", oid::ECDSA_WITH_SHA1, false),
        ("SHA224withECDSA", oid::ECDSA_WITH_SHA224, false),
        ("SHA256withECDSA", oid::ECDSA_WITH_SHA256, false),
        ("SHA384withECDSA", oid::ECDSA_WITH_SHA384, false),
        ("SHA512withECDSA", oid::ECDSA_WITH_SHA512, false),
        ("SHA1withDSA", oid::DSA_WITH_SHA1, false),
        ("SHA256withDSA", oid::DSA_WITH_SHA256, false),
        ("Ed25519", oid::ED25519, false),
        ("Ed448", oid::ED448, false),
        ("RSA", oid::RSA_ENCRYPTION, true),
        ("EC", oid::EC_PUBLIC_KEY, false),
        ("EdDSA", oid::ED25519, false),
    ]
}


//------------ PublicKey -----------------------------------------------------

/// A public key.
///
/// This is the `SubjectPublicKeyInfo` of a certificate:
///
/// ```txt
/// SubjectPublicKeyInfo  ::=  SEQUENCE  {
///      algorithm            AlgorithmIdentifier,
///      subjectPublicKey     BIT STRING  }
/// ```
///
/// The key itself is kept as raw octets.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct PublicKey {
    algorithm: AlgorithmIdentifier,
    bits: Bytes,
}

impl PublicKey {
    pub fn new(algorithm: AlgorithmIdentifier, bits: Bytes) -> Self {
        PublicKey { algorithm, bits }
    }

    pub fn algorithm(&self) -> &AlgorithmIdentifier {
        &self.algorithm
    }

    pub fn bits(&self) -> &[u8] {
        self.bits.as_ref()
    }

    /// Returns the key identifier for the key.
    ///
    /// This is the SHA-1 hash over the key bits as described by method (1)
    /// in section 4.2.1.2 of RFC 5280.
    pub fn key_identifier(&self) -> KeyIdentifier {
        let digest = digest::digest(
            &digest::SHA1_FOR_LEGACY_USE_ONLY, self.bits.as_ref()
        );
        let mut res = [0u8; 20];
        res.copy_from_slice(digest.as_ref());
        KeyIdentifier(res)
    }
}


/// # As `SubjectPublicKeyInfo`
///
/// Public keys are included in X.509 certificates as `SubjectPublicKeyInfo`
/// structures. As these are contain the same information as `PublicKey`,
/// it can be decoded from and encoded to such sequences.
impl PublicKey {
    pub fn decode<S: IntoSource>(
        source: S
    ) -> Result<Self, DecodeError<<S::Source as Source>::Error>> {
        Mode::Ber.decode(source, Self::take_from)
    }

    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_sequence(|cons| {
            let algorithm = AlgorithmIdentifier::take_from(cons)?;
            let bits = Bits::take_from(cons)?;
            match bits.octet_bytes() {
                Some(bits) => Ok(PublicKey { algorithm, bits }),
                None => Err(cons.content_err("invalid public key bits"))
            }
        })
    }

    pub fn encode_ref(&self) -> impl encode::Values + '_ {
        encode::sequence((
            self.algorithm.encode_ref(),
            KeyBits(self).encode(),
        ))
    }

    pub fn to_info_bytes(&self) -> Bytes {
        self.encode_ref().to_captured(Mode::Der).into_bytes()
    }
}


//------------ KeyBits -------------------------------------------------------

/// The content of the public key’s BIT STRING.
#[derive(Clone, Copy, Debug)]
struct KeyBits<'a>(&'a PublicKey);

impl PrimitiveContent for KeyBits<'_> {
    const TAG: Tag = Tag::BIT_STRING;

    fn encoded_len(&self, _: Mode) -> usize {
        self.0.bits.len() + 1
    }

    fn write_encoded<W: io::Write>(
        &self,
        _: Mode,
        target: &mut W
    ) -> Result<(), io::Error> {
        target.write_all(&[0u8])?;
        target.write_all(self.0.bits.as_ref())
    }
}


//------------ KeyIdentifier -------------------------------------------------

/// A key identifier.
///
/// This is the SHA-1 hash over the public key’s bits.
#[derive(Clone, Copy, Eq, Hash, PartialEq)]
pub struct KeyIdentifier([u8; 20]);

impl KeyIdentifier {
    /// Returns an octet slice of the key identifer’s value.
    pub fn as_slice(&self) -> &[u8] {
        self.0.as_ref()
    }

    /// Returns the identifier as a bytes value.
    pub fn to_bytes(&self) -> Bytes {
        Bytes::copy_from_slice(self.as_slice())
    }
}


//--- TryFrom and FromStr

impl<'a> TryFrom<&'a [u8]> for KeyIdentifier {
    type Error = RepresentationError;

    fn try_from(value: &'a [u8]) -> Result<Self, Self::Error> {
        value.try_into().map(KeyIdentifier).map_err(|_| RepresentationError)
    }
}

impl FromStr for KeyIdentifier {
    type Err = RepresentationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.len() != 40 || !value.is_ascii() {
            return Err(RepresentationError)
        }
        let mut res = KeyIdentifier(Default::default());
        for (pos, ch) in value.as_bytes().chunks(2).enumerate() {
            let ch = str::from_utf8(ch).map_err(|_| RepresentationError)?;
            res.0[pos] = u8::from_str_radix(ch, 16)
                            .map_err(|_| RepresentationError)?;
        }
        Ok(res)
    }
}


//--- AsRef

impl AsRef<[u8]> for KeyIdentifier {
    fn as_ref(&self) -> &[u8] {
        self.0.as_ref()
    }
}


//--- Display and Debug

impl fmt::Display for KeyIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for ch in self.0.iter() {
            write!(f, "{ch:02X}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for KeyIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "KeyIdentifier({self})")
    }
}


//------------ UnknownAlgorithm ----------------------------------------------

/// An algorithm name was not recognized.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct UnknownAlgorithm;

impl fmt::Display for UnknownAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("unknown algorithm")
    }
}

impl error::Error for UnknownAlgorithm { }


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn algorithm_from_name() {
        let alg = AlgorithmIdentifier::from_name("sha256withrsa").unwrap();
        assert_eq!(alg.algorithm(), &oid::SHA256_WITH_RSA_ENCRYPTION);
        assert_eq!(alg.parameters().unwrap().as_slice(), b"\x05\x00");
        assert_eq!(alg.name(), Some("SHA256withRSA"));

        let alg = AlgorithmIdentifier::from_name("SHA384withECDSA").unwrap();
        assert_eq!(alg.algorithm(), &oid::ECDSA_WITH_SHA384);
        assert!(alg.parameters().is_none());

        assert_eq!(
            AlgorithmIdentifier::from_name("ROT13withRSA"),
            Err(UnknownAlgorithm)
        );
    }

    #[test]
    fn algorithm_encode_decode() {
        let alg = AlgorithmIdentifier::from_name("SHA256withRSA").unwrap();
        let encoded = alg.encode_ref().to_captured(Mode::Der);
        assert_eq!(
            encoded.as_slice(),
            b"\x30\x0d\x06\x09\x2a\x86\x48\x86\xf7\x0d\x01\x01\x0b\x05\x00"
        );
        let decoded = Mode::Der.decode(
            encoded.as_slice(), AlgorithmIdentifier::take_from
        ).unwrap();
        assert_eq!(alg, decoded);

        let alg = AlgorithmIdentifier::from_name("Ed25519").unwrap();
        let encoded = alg.encode_ref().to_captured(Mode::Der);
        assert_eq!(encoded.as_slice(), b"\x30\x05\x06\x03\x2b\x65\x70");
    }

    #[test]
    fn public_key_round_trip() {
        let key = PublicKey::new(
            AlgorithmIdentifier::from_name("Ed25519").unwrap(),
            Bytes::from_static(&[7u8; 32])
        );
        let bytes = key.to_info_bytes();
        assert_eq!(PublicKey::decode(bytes.as_ref()).unwrap(), key);
    }

    #[test]
    fn key_identifier() {
        let key = PublicKey::new(
            AlgorithmIdentifier::from_name("Ed25519").unwrap(),
            Bytes::from_static(b"abc")
        );
        assert_eq!(
            key.key_identifier().to_string(),
            "A9993E364706816ABA3E25717850C26C9CD0D89D"
        );
        assert_eq!(
            KeyIdentifier::from_str(
                "A9993E364706816ABA3E25717850C26C9CD0D89D"
            ).unwrap(),
            key.key_identifier()
        );
    }
}

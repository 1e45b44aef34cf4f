//! Certificates.
//!
//! A certificate consists of the to-be-signed part, [`TbsCert`], wrapped
//! into the signed envelope, giving a [`Cert`]. A new certificate is built
//! by creating and filling in a [`TbsCert`] and then signing it via
//! [`TbsCert::into_cert`]. Existing certificates are decoded via
//! [`Cert::decode`] or [`Cert::decode_with`] if a registry other than the
//! standard one should be used for the extensions.

use std::{borrow, fmt, ops};
use std::convert::Infallible;
use std::str::FromStr;
use bcder::{decode, encode};
use bcder::{Captured, Mode, Tag};
use bcder::decode::{DecodeError, IntoSource, Source};
use bcder::encode::PrimitiveContent;
use bytes::Bytes;
use log::debug;
use crate::crypto::{AlgorithmIdentifier, PublicKey, Signer, Verifier};
use crate::error::{Error, SigningError};
use crate::ext::{Extensions, GenericExtension};
use crate::name::DistinguishedName;
use crate::registry::{standard_registry, Registry};
use crate::x509::{Bits, Serial, SignedData, Validity};


//------------ Cert ----------------------------------------------------------

/// A signed certificate.
///
/// ```text
/// Certificate  ::=  SEQUENCE  {
///      tbsCertificate       TBSCertificate,
///      signatureAlgorithm   AlgorithmIdentifier,
///      signatureValue       BIT STRING  }
/// ```
///
/// Values of this type are immutable. They keep the to-be-signed part
/// exactly as it was signed or decoded, so encoding a certificate always
/// reproduces the original octets. The content of the certificate is
/// available through the `Deref` impl to [`TbsCert`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Cert {
    /// The outer structure of the certificate.
    signed_data: SignedData,

    /// The actual data of the certificate.
    tbs: TbsCert,
}

/// # Decoding and Encoding
///
impl Cert {
    /// Decodes a certificate using the standard registry.
    pub fn decode<S>(source: S) -> Result<Self, Error>
    where
        S: IntoSource,
        S::Source: Source<Error = Infallible>,
    {
        Self::decode_with(source, standard_registry())
    }

    /// Decodes a certificate using the given registry for extensions.
    pub fn decode_with<S>(
        source: S, registry: &Registry
    ) -> Result<Self, Error>
    where
        S: IntoSource,
        S::Source: Source<Error = Infallible>,
    {
        let signed_data = Mode::Ber.decode(source, SignedData::take_from)?;
        let tbs = TbsCert::decode(
            signed_data.data().clone().into_bytes(), registry
        )?;
        if tbs.signature() != signed_data.algorithm() {
            return Err(Error::malformed(
                "signature algorithm differs from the one in the body"
            ))
        }
        Ok(Cert { signed_data, tbs })
    }

    /// Returns a value encoder for a reference to the certificate.
    pub fn encode_ref(&self) -> impl encode::Values + '_ {
        self.signed_data.encode_ref()
    }

    /// Returns a captured encoding of the certificate.
    pub fn to_captured(&self) -> Captured {
        Captured::from_values(Mode::Der, self.encode_ref())
    }
}

/// # Data Access
///
impl Cert {
    /// Returns the encoded to-be-signed part.
    pub fn tbs_bytes(&self) -> &[u8] {
        self.signed_data.data().as_slice()
    }

    /// Returns the signature algorithm of the envelope.
    pub fn signature_algorithm(&self) -> &AlgorithmIdentifier {
        self.signed_data.algorithm()
    }

    /// Returns the signature value.
    pub fn signature_value(&self) -> &Bits {
        self.signed_data.signature()
    }

    /// Converts the certificate back into its content.
    ///
    /// This drops the signature. The content can be changed and then
    /// signed again.
    pub fn into_tbs(self) -> TbsCert {
        self.tbs
    }
}

/// # Verification
///
impl Cert {
    /// Verifies the signature with the given public key.
    ///
    /// The verifier receives the to-be-signed octets exactly as they
    /// appeared in the encoded certificate.
    pub fn verify_signature<V: Verifier>(
        &self, verifier: &V, public_key: &PublicKey
    ) -> Result<bool, V::Error> {
        self.signed_data.verify_signature(verifier, public_key)
    }

    /// Verifies the signature with the public key of the issuer.
    pub fn verify_issued_by<V: Verifier>(
        &self, verifier: &V, issuer: &Cert
    ) -> Result<bool, V::Error> {
        self.verify_signature(verifier, issuer.subject_public_key_info())
    }
}


//--- Deref, AsRef, and Borrow

impl ops::Deref for Cert {
    type Target = TbsCert;

    fn deref(&self) -> &Self::Target {
        &self.tbs
    }
}

impl AsRef<TbsCert> for Cert {
    fn as_ref(&self) -> &TbsCert {
        &self.tbs
    }
}

impl borrow::Borrow<TbsCert> for Cert {
    fn borrow(&self) -> &TbsCert {
        &self.tbs
    }
}


//--- Deserialize and Serialize

#[cfg(feature = "serde")]
impl serde::Serialize for Cert {
    fn serialize<S: serde::Serializer>(
        &self, serializer: S
    ) -> Result<S::Ok, S::Error> {
        crate::util::base64::Serde.serialize(
            &self.to_captured().into_bytes(), serializer
        )
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Cert {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D
    ) -> Result<Self, D::Error> {
        use serde::de;

        let bytes = crate::util::base64::Serde.deserialize(deserializer)?;
        Cert::decode(Bytes::from(bytes)).map_err(de::Error::custom)
    }
}


//------------ TbsCert -------------------------------------------------------

/// The content of a certificate.
///
/// ```text
/// TBSCertificate  ::=  SEQUENCE  {
///      version         [0]  EXPLICIT Version DEFAULT v1,
///      serialNumber         CertificateSerialNumber,
///      signature            AlgorithmIdentifier,
///      issuer               Name,
///      validity             Validity,
///      subject              Name,
///      subjectPublicKeyInfo SubjectPublicKeyInfo,
///      issuerUniqueID  [1]  IMPLICIT UniqueIdentifier OPTIONAL,
///                           -- If present, version MUST be v2 or v3
///      subjectUniqueID [2]  IMPLICIT UniqueIdentifier OPTIONAL,
///                           -- If present, version MUST be v2 or v3
///      extensions      [3]  EXPLICIT Extensions OPTIONAL
///                           -- If present, version MUST be v3
///      }
/// ```
///
/// This type also serves as the builder for new certificates. The version
/// given via [`set_version`][Self::set_version] is a minimum. When
/// encoding, it is raised to what the fields present require.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TbsCert {
    /// The version.
    ///
    /// For decoded values this is the version as encoded.
    version: Version,

    /// The serial number.
    serial_number: Serial,

    /// The algorithm used for signing the certificate.
    signature: AlgorithmIdentifier,

    /// The name of the issuer.
    issuer: DistinguishedName,

    /// The validity of the certificate.
    validity: Validity,

    /// The name of the subject.
    subject: DistinguishedName,

    /// The public key of the subject.
    subject_public_key_info: PublicKey,

    issuer_unique_id: Option<Bits>,
    subject_unique_id: Option<Bits>,

    /// The extensions.
    extensions: Extensions,
}

/// # Creation and Conversion
///
impl TbsCert {
    /// Creates a new value from the necessary data.
    ///
    /// The certificate will have no extensions and no unique identifiers.
    pub fn new(
        serial_number: Serial,
        signature: AlgorithmIdentifier,
        issuer: DistinguishedName,
        validity: Validity,
        subject: DistinguishedName,
        subject_public_key_info: PublicKey,
    ) -> Self {
        TbsCert {
            version: Version::V1,
            serial_number,
            signature,
            issuer,
            validity,
            subject,
            subject_public_key_info,
            issuer_unique_id: None,
            subject_unique_id: None,
            extensions: Extensions::new(),
        }
    }

    /// Converts the value into a signed certificate.
    ///
    /// The data is signed with the algorithm given as the signature
    /// algorithm.
    pub fn into_cert<S: Signer>(
        self,
        signer: &S,
        key: &S::KeyId,
    ) -> Result<Cert, SigningError<S::Error>> {
        let data = self.to_captured()?;
        let signature = signer.sign(
            key, &self.signature, data.as_slice()
        ).map_err(SigningError::Signer)?;
        Ok(Cert {
            signed_data: SignedData::new(
                data.into_bytes(), self.signature.clone(),
                Bits::from_octets(signature)
            ),
            tbs: self
        })
    }
}

/// # Data Access
///
impl TbsCert {
    /// Returns the version.
    ///
    /// This is the version as decoded or requested. The version actually
    /// encoded may be higher, see
    /// [`effective_version`][Self::effective_version].
    pub fn version(&self) -> Version {
        self.version
    }

    /// Sets the minimum version.
    pub fn set_version(&mut self, version: Version) {
        self.version = version
    }

    /// Returns the version the value will be encoded with.
    pub fn effective_version(&self) -> Version {
        let required = if !self.extensions.is_empty() {
            Version::V3
        }
        else if self.issuer_unique_id.is_some()
            || self.subject_unique_id.is_some()
        {
            Version::V2
        }
        else {
            Version::V1
        };
        self.version.max(required)
    }

    pub fn serial_number(&self) -> Serial {
        self.serial_number
    }

    pub fn set_serial_number<S: Into<Serial>>(&mut self, serial: S) {
        self.serial_number = serial.into()
    }

    /// Returns the signature algorithm given in the body.
    pub fn signature(&self) -> &AlgorithmIdentifier {
        &self.signature
    }

    pub fn set_signature(&mut self, signature: AlgorithmIdentifier) {
        self.signature = signature
    }

    pub fn issuer(&self) -> &DistinguishedName {
        &self.issuer
    }

    pub fn set_issuer(&mut self, name: DistinguishedName) {
        self.issuer = name
    }

    pub fn validity(&self) -> Validity {
        self.validity
    }

    pub fn set_validity(&mut self, validity: Validity) {
        self.validity = validity
    }

    pub fn subject(&self) -> &DistinguishedName {
        &self.subject
    }

    pub fn set_subject(&mut self, name: DistinguishedName) {
        self.subject = name
    }

    pub fn subject_public_key_info(&self) -> &PublicKey {
        &self.subject_public_key_info
    }

    pub fn set_subject_public_key(&mut self, key: PublicKey) {
        self.subject_public_key_info = key
    }

    pub fn issuer_unique_id(&self) -> Option<&Bits> {
        self.issuer_unique_id.as_ref()
    }

    pub fn set_issuer_unique_id(&mut self, id: Option<Bits>) {
        self.issuer_unique_id = id
    }

    pub fn subject_unique_id(&self) -> Option<&Bits> {
        self.subject_unique_id.as_ref()
    }

    pub fn set_subject_unique_id(&mut self, id: Option<Bits>) {
        self.subject_unique_id = id
    }

    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    pub fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.extensions
    }

    pub fn set_extensions(&mut self, extensions: Extensions) {
        self.extensions = extensions
    }

    /// Returns whether the certificate is issued by its subject.
    pub fn is_self_issued(&self) -> bool {
        self.issuer == self.subject
    }
}

/// # Decoding and Encoding
///
impl TbsCert {
    /// Decodes the to-be-signed part of a certificate.
    pub fn decode<S>(source: S, registry: &Registry) -> Result<Self, Error>
    where
        S: IntoSource,
        S::Source: Source<Error = Infallible>,
    {
        Mode::Ber.decode(source, RawTbsCert::take_from)?.resolve(registry)
    }

    /// Returns the DER encoding.
    ///
    /// This fails if an extension can’t be encoded.
    pub fn to_captured(&self) -> Result<Captured, Error> {
        let extensions = self.extensions.to_captured()?;
        let version = self.effective_version();
        if version != self.version {
            debug!(
                "Encoding certificate as {} instead of {}.",
                version, self.version
            );
        }
        Ok(Captured::from_values(Mode::Der, encode::sequence((
            version.encode_explicit(),
            self.serial_number.encode(),
            self.signature.encode_ref(),
            self.issuer.encode_ref(),
            self.validity.encode(),
            self.subject.encode_ref(),
            self.subject_public_key_info.encode_ref(),
            self.issuer_unique_id.as_ref().map(|id| {
                id.encode_ref_as(Tag::CTX_1)
            }),
            self.subject_unique_id.as_ref().map(|id| {
                id.encode_ref_as(Tag::CTX_2)
            }),
            extensions.as_ref().map(|ext| {
                encode::sequence_as(Tag::CTX_3, ext)
            }),
        ))))
    }

    /// Returns the DER encoding as bytes.
    pub fn to_bytes(&self) -> Result<Bytes, Error> {
        self.to_captured().map(Captured::into_bytes)
    }
}


//------------ RawTbsCert ----------------------------------------------------

/// The structurally decoded content of a certificate.
///
/// Checking the version and resolving the extensions happens in a second
/// step so the errors of these checks can be reported properly.
struct RawTbsCert {
    version: Option<u8>,
    serial_number: Serial,
    signature: AlgorithmIdentifier,
    issuer: DistinguishedName,
    validity: Validity,
    subject: DistinguishedName,
    subject_public_key_info: PublicKey,
    issuer_unique_id: Option<Bits>,
    subject_unique_id: Option<Bits>,
    extensions: Option<Vec<GenericExtension>>,
}

impl RawTbsCert {
    fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_sequence(|cons| {
            Ok(RawTbsCert {
                version: Version::take_opt_explicit_from(cons)?,
                serial_number: Serial::take_from(cons)?,
                signature: AlgorithmIdentifier::take_from(cons)?,
                issuer: DistinguishedName::take_from(cons)?,
                validity: Validity::take_from(cons)?,
                subject: DistinguishedName::take_from(cons)?,
                subject_public_key_info: PublicKey::take_from(cons)?,
                issuer_unique_id: cons.take_opt_primitive_if(
                    Tag::CTX_1, Bits::from_primitive
                )?,
                subject_unique_id: cons.take_opt_primitive_if(
                    Tag::CTX_2, Bits::from_primitive
                )?,
                extensions: cons.take_opt_constructed_if(
                    Tag::CTX_3, GenericExtension::take_list_from
                )?,
            })
        })
    }

    fn resolve(self, registry: &Registry) -> Result<TbsCert, Error> {
        let version = match self.version {
            Some(value) => Version::from_value(value)?,
            None => Version::V1,
        };
        if self.issuer_unique_id.is_some()
            || self.subject_unique_id.is_some()
        {
            if self.version.is_none() {
                return Err(Error::version(
                    "unique identifier without version"
                ))
            }
            if version < Version::V2 {
                return Err(Error::version(
                    "unique identifier requires version 2 or 3"
                ))
            }
        }
        let extensions = match self.extensions {
            Some(list) => {
                if self.version.is_none() {
                    return Err(Error::version("extensions without version"))
                }
                if version < Version::V3 {
                    return Err(Error::version(
                        "extensions require version 3"
                    ))
                }
                Extensions::from_generic(list, registry)?
            }
            None => Extensions::new(),
        };
        Ok(TbsCert {
            version,
            serial_number: self.serial_number,
            signature: self.signature,
            issuer: self.issuer,
            validity: self.validity,
            subject: self.subject,
            subject_public_key_info: self.subject_public_key_info,
            issuer_unique_id: self.issuer_unique_id,
            subject_unique_id: self.subject_unique_id,
            extensions,
        })
    }
}


//------------ Version -------------------------------------------------------

/// The version of a certificate or CRL.
///
/// ```text
/// Version  ::=  INTEGER  {  v1(0), v2(1), v3(2)  }
/// ```
///
/// CRLs only know versions 1 and 2.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Version {
    V1,
    V2,
    V3,
}

impl Version {
    /// Returns the version for its encoded value.
    pub fn from_value(value: u8) -> Result<Self, Error> {
        match value {
            0 => Ok(Version::V1),
            1 => Ok(Version::V2),
            2 => Ok(Version::V3),
            _ => Err(Error::malformed(format!("unknown version {value}")))
        }
    }

    /// Returns the encoded value of the version.
    pub fn to_value(self) -> u8 {
        match self {
            Version::V1 => 0,
            Version::V2 => 1,
            Version::V3 => 2,
        }
    }

    /// Takes the version integer if present.
    pub(crate) fn take_opt_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Option<u8>, DecodeError<S::Error>> {
        cons.take_opt_primitive_if(Tag::INTEGER, |prim| prim.to_u8())
    }

    /// Takes the version wrapped into an explicit `[0]` if present.
    fn take_opt_explicit_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Option<u8>, DecodeError<S::Error>> {
        cons.take_opt_constructed_if(Tag::CTX_0, |cons| {
            cons.take_primitive_if(Tag::INTEGER, |prim| prim.to_u8())
        })
    }

    /// Returns the encoding of the version.
    ///
    /// Version 1 is the default and not encoded.
    pub(crate) fn encode(self) -> impl encode::Values {
        match self {
            Version::V1 => None,
            _ => Some(self.to_value().encode())
        }
    }

    /// Returns the encoding wrapped into an explicit `[0]`.
    fn encode_explicit(self) -> impl encode::Values {
        match self {
            Version::V1 => None,
            _ => Some(encode::sequence_as(
                Tag::CTX_0, self.to_value().encode()
            ))
        }
    }
}

impl Default for Version {
    fn default() -> Self {
        Version::V1
    }
}

impl FromStr for Version {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1" | "v1" | "V1" => Ok(Version::V1),
            "2" | "v2" | "V2" => Ok(Version::V2),
            "3" | "v3" | "V3" => Ok(Version::V3),
            _ => Err(Error::invalid_value(format!("invalid version '{s}'")))
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Version::V1 => f.write_str("v1"),
            Version::V2 => f.write_str("v2"),
            Version::V3 => f.write_str("v3"),
        }
    }
}


//============ Tests =========================================================

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use crate::error::ErrorKind;
    use crate::ext::{BasicConstraints, KeyUsage, SubjectKeyIdentifier};
    use crate::oid;
    use crate::x509::Time;

    /// A signer that “signs” by returning the length of the data.
    pub struct TestSigner;

    impl Signer for TestSigner {
        type KeyId = ();
        type Error = Infallible;

        fn sign(
            &self, _key: &(), _algorithm: &AlgorithmIdentifier, data: &[u8]
        ) -> Result<Bytes, Self::Error> {
            Ok(Bytes::from((data.len() as u32).to_be_bytes().to_vec()))
        }
    }

    impl Verifier for TestSigner {
        type Error = Infallible;

        fn verify(
            &self,
            _public_key: &PublicKey,
            _algorithm: &AlgorithmIdentifier,
            data: &[u8],
            signature: &[u8],
        ) -> Result<bool, Self::Error> {
            Ok(signature == (data.len() as u32).to_be_bytes())
        }
    }

    pub fn test_key() -> PublicKey {
        PublicKey::new(
            AlgorithmIdentifier::new(oid::to_owned(&oid::ED25519), None),
            Bytes::from_static(&[7; 32])
        )
    }

    fn tbs() -> TbsCert {
        TbsCert::new(
            Serial::from(12u64),
            AlgorithmIdentifier::from_name("Ed25519").unwrap(),
            "CN=Test CA,O=Example,C=US".parse().unwrap(),
            Validity::new(
                Time::utc(2024, 1, 1, 0, 0, 0).unwrap(),
                Time::utc(2034, 1, 1, 0, 0, 0).unwrap(),
            ),
            "CN=Test EE,O=Example,C=US".parse().unwrap(),
            test_key(),
        )
    }

    #[test]
    fn v1_round_trip() {
        let cert = tbs().into_cert(&TestSigner, &()).unwrap();
        assert_eq!(cert.effective_version(), Version::V1);
        // No version field: serial number follows the sequence header.
        assert_eq!(cert.tbs_bytes()[3], 0x02);
        let decoded = Cert::decode(cert.to_captured().into_bytes()).unwrap();
        assert_eq!(decoded, cert);
        assert_eq!(decoded.version(), Version::V1);
        assert_eq!(decoded.serial_number(), Serial::from(12u64));
        assert_eq!(decoded.subject().common_name().unwrap(), "Test EE");
        assert!(decoded.verify_signature(&TestSigner, &test_key()).unwrap());
    }

    #[test]
    fn v3_with_extensions() {
        let mut tbs = tbs();
        tbs.extensions_mut().insert_payload(
            true, BasicConstraints::new(true, Some(0))
        );
        tbs.extensions_mut().insert_payload(
            false, SubjectKeyIdentifier::from_public_key(&test_key())
        );
        let mut ku = KeyUsage::new();
        ku.set_key_cert_sign(true);
        ku.set_crl_sign(true);
        tbs.extensions_mut().insert_payload(true, ku);
        assert_eq!(tbs.version(), Version::V1);
        assert_eq!(tbs.effective_version(), Version::V3);

        let cert = tbs.into_cert(&TestSigner, &()).unwrap();
        let decoded = Cert::decode(cert.to_captured().into_bytes()).unwrap();
        assert_eq!(decoded.version(), Version::V3);
        assert_eq!(decoded.extensions().len(), 3);
        let bc = decoded.extensions().find::<BasicConstraints>().unwrap();
        assert!(bc.is_ca());
        assert_eq!(bc.path_len(), Some(0));
        assert!(
            decoded.extensions().find::<KeyUsage>().unwrap().crl_sign()
        );
        assert_eq!(decoded.tbs_bytes(), cert.tbs_bytes());
    }

    #[test]
    fn decode_ber_envelope() {
        let cert = tbs().into_cert(&TestSigner, &()).unwrap();
        let der = cert.to_captured().into_bytes();
        let header = match der[1] {
            0x81 => 3,
            0x82 => 4,
            _ => 2,
        };
        let mut ber = b"\x30\x80".to_vec();
        ber.extend_from_slice(&der[header..]);
        ber.extend_from_slice(b"\x00\x00");

        let decoded = Cert::decode(Bytes::from(ber)).unwrap();
        assert_eq!(decoded, cert);
        assert!(decoded.verify_signature(&TestSigner, &test_key()).unwrap());
        assert_eq!(decoded.to_captured().into_bytes(), der);
    }

    #[test]
    fn requested_version_is_minimum() {
        let mut tbs = tbs();
        tbs.set_version(Version::V3);
        let cert = tbs.into_cert(&TestSigner, &()).unwrap();
        assert_eq!(&cert.tbs_bytes()[3..8], b"\xa0\x03\x02\x01\x02");
        let decoded = Cert::decode(cert.to_captured().into_bytes()).unwrap();
        assert_eq!(decoded.version(), Version::V3);
        assert!(decoded.extensions().is_empty());
    }

    #[test]
    fn unique_ids() {
        let mut tbs = tbs();
        tbs.set_subject_unique_id(Some(Bits::from_flags(&[true, false])));
        assert_eq!(tbs.effective_version(), Version::V2);
        let cert = tbs.into_cert(&TestSigner, &()).unwrap();
        let decoded = Cert::decode(cert.to_captured().into_bytes()).unwrap();
        assert_eq!(decoded.version(), Version::V2);
        assert_eq!(
            decoded.subject_unique_id(),
            Some(&Bits::from_flags(&[true]))
        );
        assert!(decoded.issuer_unique_id().is_none());
    }

    /// Re-encodes a certificate with the body changed by `op`.
    fn tamper(op: impl FnOnce(&[u8]) -> Vec<u8>) -> Bytes {
        let cert = tbs().into_cert(&TestSigner, &()).unwrap();
        let body = op(cert.tbs_bytes());
        Captured::from_values(Mode::Der, encode::sequence((
            encode::sequence(crate::x509::DerData::new(Bytes::from(body))),
            cert.signature_algorithm().encode_ref(),
            cert.signature_value().encode_ref(),
        ))).into_bytes()
    }

    /// Returns the content of the body sequence.
    fn content(tbs: &[u8]) -> &[u8] {
        // All test bodies are between 128 and 255 octets.
        assert_eq!(tbs[1], 0x81);
        &tbs[3..]
    }

    #[test]
    fn version_gating() {
        // Extensions in a v1 certificate.
        let der = tamper(|tbs| {
            let mut res = content(tbs).to_vec();
            res.extend_from_slice(
                b"\xa3\x10\x30\x0e\x30\x0c\x06\x03\x55\x1d\x13\x01\x01\xff\
                  \x04\x02\x30\x00"
            );
            res
        });
        assert_eq!(
            Cert::decode(der).unwrap_err().kind(),
            ErrorKind::VersionConstraintViolation
        );

        // Unique identifier with explicit version 1.
        let der = tamper(|tbs| {
            let mut res = b"\xa0\x03\x02\x01\x00".to_vec();
            res.extend_from_slice(content(tbs));
            res.extend_from_slice(b"\x82\x02\x00\xff");
            res
        });
        assert_eq!(
            Cert::decode(der).unwrap_err().kind(),
            ErrorKind::VersionConstraintViolation
        );

        // Unknown version.
        let der = tamper(|tbs| {
            let mut res = b"\xa0\x03\x02\x01\x05".to_vec();
            res.extend_from_slice(content(tbs));
            res
        });
        assert_eq!(
            Cert::decode(der).unwrap_err().kind(), ErrorKind::Malformed
        );

        // Trailing data.
        let der = tamper(|tbs| {
            let mut res = content(tbs).to_vec();
            res.extend_from_slice(b"\x05\x00");
            res
        });
        assert_eq!(
            Cert::decode(der).unwrap_err().kind(), ErrorKind::Malformed
        );
    }

    #[test]
    fn incomplete_extension() {
        let mut tbs = tbs();
        tbs.extensions_mut().insert_payload(
            false, crate::ext::ExtendedKeyUsage::default()
        );
        match tbs.into_cert(&TestSigner, &()) {
            Err(SigningError::Encoding(err)) => {
                assert_eq!(err.kind(), ErrorKind::IncompleteExtension)
            }
            _ => panic!("expected encoding error")
        }
    }

    #[test]
    fn version_values() {
        assert_eq!(Version::from_value(2).unwrap(), Version::V3);
        assert!(Version::from_value(3).is_err());
        assert_eq!(Version::V2.to_value(), 1);
        assert_eq!("v3".parse::<Version>().unwrap(), Version::V3);
        assert_eq!(Version::V2.to_string(), "v2");
        assert!(Version::V1 < Version::V3);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_cert() {
        let cert = tbs().into_cert(&TestSigner, &()).unwrap();
        let json = serde_json::to_string(&cert).unwrap();
        let back: Cert = serde_json::from_str(&json).unwrap();
        assert_eq!(cert, back);
    }
}

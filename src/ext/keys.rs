//! Extensions describing keys and their use.

use bcder::{decode, encode, Oid, Tag};
use bcder::decode::DecodeError;
use bcder::encode::PrimitiveContent;
use bytes::Bytes;
use crate::crypto::{KeyIdentifier, PublicKey};
use crate::error::Error;
use crate::x509::{Bits, GeneralizedTime, Octets, Serial, Time};
use super::capture;
use super::general::GeneralNames;


//------------ KeyUsage ------------------------------------------------------

/// The key usage extension.
///
/// ```text
/// KeyUsage ::= BIT STRING {
///      digitalSignature        (0),
///      nonRepudiation          (1), -- recent editions of X.509 have
///                           -- renamed this bit to contentCommitment
///      keyEncipherment         (2),
///      dataEncipherment        (3),
///      keyAgreement            (4),
///      keyCertSign             (5),
///      cRLSign                 (6),
///      encipherOnly            (7),
///      decipherOnly            (8) }
/// ```
///
/// Bits beyond the named ones are kept so they survive re-encoding.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct KeyUsage {
    /// The bits without any trailing unset bits.
    flags: Vec<bool>,
}

impl KeyUsage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the value from a list of bits.
    pub fn from_flags(mut flags: Vec<bool>) -> Self {
        while flags.last() == Some(&false) {
            flags.pop();
        }
        KeyUsage { flags }
    }

    /// Returns the bit with the given number.
    ///
    /// Bits not present in the encoding are not set.
    pub fn get(&self, bit: usize) -> bool {
        self.flags.get(bit).copied().unwrap_or(false)
    }

    /// Sets or clears the bit with the given number.
    pub fn set(&mut self, bit: usize, value: bool) {
        if bit >= self.flags.len() {
            if !value {
                return
            }
            self.flags.resize(bit + 1, false);
        }
        self.flags[bit] = value;
        while self.flags.last() == Some(&false) {
            self.flags.pop();
        }
    }

    /// Returns the number of bits up to and including the last set one.
    pub fn bit_len(&self) -> usize {
        self.flags.len()
    }

    named_bits! {
        0 => (digital_signature, set_digital_signature),
        1 => (non_repudiation, set_non_repudiation),
        2 => (key_encipherment, set_key_encipherment),
        3 => (data_encipherment, set_data_encipherment),
        4 => (key_agreement, set_key_agreement),
        5 => (key_cert_sign, set_key_cert_sign),
        6 => (crl_sign, set_crl_sign),
        7 => (encipher_only, set_encipher_only),
        8 => (decipher_only, set_decipher_only),
    }

    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        Bits::take_from(cons).map(|bits| Self::from_flags(bits.to_flags()))
    }

    pub fn to_bits(&self) -> Bits {
        Bits::from_flags(&self.flags)
    }

    pub fn encode_value(&self) -> Result<Bytes, Error> {
        Ok(capture(self.to_bits().encode()))
    }
}


//------------ ExtendedKeyUsage ----------------------------------------------

/// The extended key usage extension.
///
/// ```text
/// ExtKeyUsageSyntax ::= SEQUENCE SIZE (1..MAX) OF KeyPurposeId
///
/// KeyPurposeId ::= OBJECT IDENTIFIER
/// ```
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct ExtendedKeyUsage(Vec<Oid>);

impl ExtendedKeyUsage {
    pub fn new(purposes: Vec<Oid>) -> Self {
        ExtendedKeyUsage(purposes)
    }

    pub fn push(&mut self, purpose: Oid) {
        self.0.push(purpose)
    }

    pub fn contains<T: AsRef<[u8]>>(&self, purpose: &Oid<T>) -> bool {
        self.0.iter().any(|item| item == purpose)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Oid> + '_ {
        self.0.iter()
    }

    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_sequence(|cons| {
            let mut res = Vec::new();
            while let Some(oid) = Oid::take_opt_from(cons)? {
                res.push(oid)
            }
            if res.is_empty() {
                return Err(cons.content_err("empty extended key usage"))
            }
            Ok(ExtendedKeyUsage(res))
        })
    }

    pub fn encode_ref(&self) -> impl encode::Values + '_ {
        encode::sequence(
            encode::iter(self.0.iter().map(|oid| oid.encode_ref()))
        )
    }

    pub fn encode_value(&self) -> Result<Bytes, Error> {
        if self.0.is_empty() {
            return Err(Error::incomplete("ExtendedKeyUsage", "keyPurposeId"))
        }
        Ok(capture(self.encode_ref()))
    }
}


//------------ SubjectKeyIdentifier ------------------------------------------

/// The subject key identifier extension.
///
/// ```text
/// SubjectKeyIdentifier ::= KeyIdentifier
///
/// KeyIdentifier ::= OCTET STRING
/// ```
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct SubjectKeyIdentifier(Bytes);

impl SubjectKeyIdentifier {
    pub fn new(key_id: Bytes) -> Self {
        SubjectKeyIdentifier(key_id)
    }

    /// Creates the identifier for a public key.
    pub fn from_public_key(key: &PublicKey) -> Self {
        key.key_identifier().into()
    }

    pub fn key_id(&self) -> &Bytes {
        &self.0
    }

    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_primitive_if(Tag::OCTET_STRING, |prim| {
            prim.take_all()
        }).map(SubjectKeyIdentifier)
    }

    pub fn encode_value(&self) -> Result<Bytes, Error> {
        Ok(capture(Octets(self.0.as_ref()).encode()))
    }
}

impl From<KeyIdentifier> for SubjectKeyIdentifier {
    fn from(key_id: KeyIdentifier) -> Self {
        SubjectKeyIdentifier(key_id.to_bytes())
    }
}


//------------ AuthorityKeyIdentifier ----------------------------------------

/// The authority key identifier extension.
///
/// ```text
/// AuthorityKeyIdentifier ::= SEQUENCE {
///   keyIdentifier             [0] KeyIdentifier           OPTIONAL,
///   authorityCertIssuer       [1] GeneralNames            OPTIONAL,
///   authorityCertSerialNumber [2] CertificateSerialNumber OPTIONAL  }
/// ```
///
/// The issuer and serial number have to be present together.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AuthorityKeyIdentifier {
    key_id: Option<Bytes>,
    issuer: Option<GeneralNames>,
    serial: Option<Serial>,
}

impl AuthorityKeyIdentifier {
    /// Creates a value with only a key identifier.
    pub fn new(key_id: Bytes) -> Self {
        AuthorityKeyIdentifier {
            key_id: Some(key_id), issuer: None, serial: None
        }
    }

    /// Creates the identifier for an issuer’s public key.
    pub fn from_public_key(key: &PublicKey) -> Self {
        key.key_identifier().into()
    }

    pub fn key_id(&self) -> Option<&Bytes> {
        self.key_id.as_ref()
    }

    pub fn set_key_id(&mut self, key_id: Option<Bytes>) {
        self.key_id = key_id
    }

    pub fn issuer(&self) -> Option<&GeneralNames> {
        self.issuer.as_ref()
    }

    pub fn set_issuer(&mut self, issuer: Option<GeneralNames>) {
        self.issuer = issuer
    }

    pub fn serial(&self) -> Option<Serial> {
        self.serial
    }

    pub fn set_serial(&mut self, serial: Option<Serial>) {
        self.serial = serial
    }

    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_sequence(|cons| {
            let key_id = cons.take_opt_primitive_if(
                Tag::CTX_0, |prim| prim.take_all()
            )?;
            let issuer = cons.take_opt_constructed_if(
                Tag::CTX_1, GeneralNames::from_constructed
            )?;
            let serial = cons.take_opt_primitive_if(
                Tag::CTX_2, Serial::from_primitive
            )?;
            if issuer.is_some() != serial.is_some() {
                return Err(cons.content_err(
                    "authority certificate issuer without serial number"
                ))
            }
            Ok(AuthorityKeyIdentifier { key_id, issuer, serial })
        })
    }

    pub fn encode_ref(&self) -> impl encode::Values + '_ {
        encode::sequence((
            self.key_id.as_ref().map(|key_id| {
                Octets(key_id.as_ref()).encode_as(Tag::CTX_0)
            }),
            self.issuer.as_ref().map(|issuer| {
                issuer.encode_ref_as(Tag::CTX_1)
            }),
            self.serial.as_ref().map(|serial| {
                serial.encode_ref_as(Tag::CTX_2)
            }),
        ))
    }

    pub fn encode_value(&self) -> Result<Bytes, Error> {
        if self.issuer.is_some() && self.serial.is_none() {
            return Err(Error::incomplete(
                "AuthorityKeyIdentifier", "authorityCertSerialNumber"
            ))
        }
        if self.issuer.is_none() && self.serial.is_some() {
            return Err(Error::incomplete(
                "AuthorityKeyIdentifier", "authorityCertIssuer"
            ))
        }
        Ok(capture(self.encode_ref()))
    }
}

impl From<KeyIdentifier> for AuthorityKeyIdentifier {
    fn from(key_id: KeyIdentifier) -> Self {
        Self::new(key_id.to_bytes())
    }
}


//------------ PrivateKeyUsagePeriod -----------------------------------------

/// The private key usage period extension.
///
/// ```text
/// PrivateKeyUsagePeriod ::= SEQUENCE {
///      notBefore       [0]     GeneralizedTime OPTIONAL,
///      notAfter        [1]     GeneralizedTime OPTIONAL }
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PrivateKeyUsagePeriod {
    not_before: Option<Time>,
    not_after: Option<Time>,
}

impl PrivateKeyUsagePeriod {
    /// Creates a new value.
    ///
    /// Fails if neither time is given.
    pub fn new(
        not_before: Option<Time>, not_after: Option<Time>
    ) -> Result<Self, Error> {
        if not_before.is_none() && not_after.is_none() {
            return Err(Error::invalid_value(
                "private key usage period needs at least one time"
            ))
        }
        Ok(PrivateKeyUsagePeriod { not_before, not_after })
    }

    pub fn not_before(&self) -> Option<Time> {
        self.not_before
    }

    pub fn set_not_before(&mut self, time: Option<Time>) {
        self.not_before = time
    }

    pub fn not_after(&self) -> Option<Time> {
        self.not_after
    }

    pub fn set_not_after(&mut self, time: Option<Time>) {
        self.not_after = time
    }

    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_sequence(|cons| {
            let not_before = cons.take_opt_primitive_if(
                Tag::CTX_0, Time::from_generalized_primitive
            )?;
            let not_after = cons.take_opt_primitive_if(
                Tag::CTX_1, Time::from_generalized_primitive
            )?;
            if not_before.is_none() && not_after.is_none() {
                return Err(cons.content_err(
                    "empty private key usage period"
                ))
            }
            Ok(PrivateKeyUsagePeriod { not_before, not_after })
        })
    }

    pub fn encode_ref(&self) -> impl encode::Values {
        encode::sequence((
            self.not_before.map(|time| {
                GeneralizedTime(time).encode_as(Tag::CTX_0)
            }),
            self.not_after.map(|time| {
                GeneralizedTime(time).encode_as(Tag::CTX_1)
            }),
        ))
    }

    pub fn encode_value(&self) -> Result<Bytes, Error> {
        if self.not_before.is_none() && self.not_after.is_none() {
            return Err(Error::incomplete(
                "PrivateKeyUsagePeriod", "notBefore or notAfter"
            ))
        }
        Ok(capture(self.encode_ref()))
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use bcder::Mode;
    use crate::error::ErrorKind;
    use crate::ext::GeneralName;
    use crate::oid;

    #[test]
    fn key_usage() {
        let ku = Mode::Der.decode(
            b"\x03\x02\x01\x86".as_ref(), KeyUsage::take_from
        ).unwrap();
        assert!(ku.digital_signature());
        assert!(ku.key_cert_sign());
        assert!(ku.crl_sign());
        assert!(!ku.non_repudiation());
        assert!(!ku.decipher_only());
        assert_eq!(ku.encode_value().unwrap().as_ref(), b"\x03\x02\x01\x86");

        let mut ku = KeyUsage::new();
        ku.set_decipher_only(true);
        assert_eq!(
            ku.encode_value().unwrap().as_ref(), b"\x03\x03\x07\x00\x80"
        );
        ku.set_decipher_only(false);
        ku.set_digital_signature(true);
        assert_eq!(ku.encode_value().unwrap().as_ref(), b"\x03\x02\x07\x80");
    }

    #[test]
    fn key_usage_extra_bits() {
        // Bit 10 is set beyond the named ones.
        let ku = Mode::Der.decode(
            b"\x03\x03\x05\x80\x20".as_ref(), KeyUsage::take_from
        ).unwrap();
        assert!(ku.digital_signature());
        assert!(ku.get(10));
        assert_eq!(
            ku.encode_value().unwrap().as_ref(), b"\x03\x03\x05\x80\x20"
        );
    }

    #[test]
    fn extended_key_usage() {
        let eku = ExtendedKeyUsage::new(vec![
            oid::to_owned(&oid::KP_SERVER_AUTH),
            oid::to_owned(&oid::KP_CLIENT_AUTH),
        ]);
        let der = eku.encode_value().unwrap();
        let decoded = Mode::Der.decode(
            der.as_ref(), ExtendedKeyUsage::take_from
        ).unwrap();
        assert_eq!(decoded, eku);
        assert!(decoded.contains(&oid::KP_CLIENT_AUTH));
        assert!(!decoded.contains(&oid::KP_CODE_SIGNING));
        assert_eq!(
            ExtendedKeyUsage::default().encode_value().unwrap_err().kind(),
            ErrorKind::IncompleteExtension
        );
        assert!(
            Mode::Der.decode(
                b"\x30\x00".as_ref(), ExtendedKeyUsage::take_from
            ).is_err()
        );
    }

    #[test]
    fn authority_key_identifier() {
        let aki = AuthorityKeyIdentifier::new(
            Bytes::from_static(b"\x01\x02")
        );
        assert_eq!(
            aki.encode_value().unwrap().as_ref(),
            b"\x30\x04\x80\x02\x01\x02"
        );

        let mut aki = aki;
        aki.set_issuer(Some(
            GeneralName::DnsName("ca.example.com".into()).into()
        ));
        assert_eq!(
            aki.encode_value().unwrap_err().kind(),
            ErrorKind::IncompleteExtension
        );
        aki.set_serial(Some(Serial::from(5u64)));
        let der = aki.encode_value().unwrap();
        assert_eq!(
            Mode::Der.decode(
                der.as_ref(), AuthorityKeyIdentifier::take_from
            ).unwrap(),
            aki
        );

        // Duplicate keyIdentifier.
        assert!(
            Mode::Der.decode(
                b"\x30\x08\x80\x02\x01\x02\x80\x02\x01\x02".as_ref(),
                AuthorityKeyIdentifier::take_from
            ).is_err()
        );
        // Serial without issuer.
        assert!(
            Mode::Der.decode(
                b"\x30\x03\x82\x01\x05".as_ref(),
                AuthorityKeyIdentifier::take_from
            ).is_err()
        );
    }

    #[test]
    fn private_key_usage_period() {
        let time = Time::utc(2030, 1, 2, 3, 4, 5).unwrap();
        let period = PrivateKeyUsagePeriod::new(None, Some(time)).unwrap();
        let der = period.encode_value().unwrap();
        assert_eq!(der.as_ref(), b"\x30\x11\x81\x0f20300102030405Z");
        assert_eq!(
            Mode::Der.decode(
                der.as_ref(), PrivateKeyUsagePeriod::take_from
            ).unwrap(),
            period
        );
        assert!(PrivateKeyUsagePeriod::new(None, None).is_err());
    }
}

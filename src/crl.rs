//! Certificate revocation lists.
//!
//! Like certificates, CRLs consist of a to-be-signed part, [`TbsCertList`],
//! that is wrapped into the signed envelope to form a [`Crl`]. The
//! to-be-signed part doubles as the builder for new CRLs.

use std::{borrow, ops};
use std::collections::HashMap;
use std::convert::Infallible;
use bcder::{decode, encode};
use bcder::{Captured, Mode, Tag};
use bcder::decode::{DecodeError, IntoSource, Source};
use bcder::encode::PrimitiveContent;
use bytes::Bytes;
use log::debug;
use crate::cert::Version;
use crate::crypto::{AlgorithmIdentifier, PublicKey, Signer, Verifier};
use crate::error::{Error, SigningError};
use crate::ext::{
    CertificateIssuer, CrlNumber, CrlReason, Extensions, GenericExtension,
    InvalidityDate,
};
use crate::name::DistinguishedName;
use crate::registry::{standard_registry, Registry};
use crate::x509::{Bits, Serial, SignedData, Time};


//------------ Crl -----------------------------------------------------------

/// A signed certificate revocation list.
///
/// ```text
/// CertificateList  ::=  SEQUENCE  {
///      tbsCertList          TBSCertList,
///      signatureAlgorithm   AlgorithmIdentifier,
///      signatureValue       BIT STRING  }
/// ```
///
/// The content is available through the `Deref` impl to [`TbsCertList`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Crl {
    /// The outer structure of the CRL.
    signed_data: SignedData,

    /// The content of the CRL.
    tbs: TbsCertList,
}

/// # Decoding and Encoding
///
impl Crl {
    /// Decodes a CRL using the standard registry.
    pub fn decode<S>(source: S) -> Result<Self, Error>
    where
        S: IntoSource,
        S::Source: Source<Error = Infallible>,
    {
        Self::decode_with(source, standard_registry())
    }

    /// Decodes a CRL using the given registry for extensions.
    pub fn decode_with<S>(
        source: S, registry: &Registry
    ) -> Result<Self, Error>
    where
        S: IntoSource,
        S::Source: Source<Error = Infallible>,
    {
        let signed_data = Mode::Ber.decode(source, SignedData::take_from)?;
        let tbs = TbsCertList::decode(
            signed_data.data().clone().into_bytes(), registry
        )?;
        if tbs.signature() != signed_data.algorithm() {
            return Err(Error::malformed(
                "signature algorithm differs from the one in the body"
            ))
        }
        Ok(Crl { signed_data, tbs })
    }

    pub fn encode_ref(&self) -> impl encode::Values + '_ {
        self.signed_data.encode_ref()
    }

    pub fn to_captured(&self) -> Captured {
        Captured::from_values(Mode::Der, self.encode_ref())
    }
}

/// # Data Access and Verification
///
impl Crl {
    /// Returns the encoded to-be-signed part.
    pub fn tbs_bytes(&self) -> &[u8] {
        self.signed_data.data().as_slice()
    }

    pub fn signature_algorithm(&self) -> &AlgorithmIdentifier {
        self.signed_data.algorithm()
    }

    pub fn signature_value(&self) -> &Bits {
        self.signed_data.signature()
    }

    /// Converts the CRL back into its content, dropping the signature.
    pub fn into_tbs(self) -> TbsCertList {
        self.tbs
    }

    /// Verifies the signature with the public key of the CRL issuer.
    pub fn verify_signature<V: Verifier>(
        &self, verifier: &V, public_key: &PublicKey
    ) -> Result<bool, V::Error> {
        self.signed_data.verify_signature(verifier, public_key)
    }
}


//--- Deref, AsRef, and Borrow

impl ops::Deref for Crl {
    type Target = TbsCertList;

    fn deref(&self) -> &Self::Target {
        &self.tbs
    }
}

impl AsRef<TbsCertList> for Crl {
    fn as_ref(&self) -> &TbsCertList {
        &self.tbs
    }
}

impl borrow::Borrow<TbsCertList> for Crl {
    fn borrow(&self) -> &TbsCertList {
        &self.tbs
    }
}


//--- Deserialize and Serialize

#[cfg(feature = "serde")]
impl serde::Serialize for Crl {
    fn serialize<S: serde::Serializer>(
        &self, serializer: S
    ) -> Result<S::Ok, S::Error> {
        crate::util::base64::Serde.serialize(
            &self.to_captured().into_bytes(), serializer
        )
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Crl {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D
    ) -> Result<Self, D::Error> {
        use serde::de;

        let bytes = crate::util::base64::Serde.deserialize(deserializer)?;
        Crl::decode(Bytes::from(bytes)).map_err(de::Error::custom)
    }
}


//------------ TbsCertList ---------------------------------------------------

/// The content of a CRL.
///
/// ```text
/// TBSCertList  ::=  SEQUENCE  {
///      version                 Version OPTIONAL,
///                                   -- if present, MUST be v2
///      signature               AlgorithmIdentifier,
///      issuer                  Name,
///      thisUpdate              Time,
///      nextUpdate              Time OPTIONAL,
///      revokedCertificates     SEQUENCE OF SEQUENCE  {
///           userCertificate         CertificateSerialNumber,
///           revocationDate          Time,
///           crlEntryExtensions      Extensions OPTIONAL
///                                    -- if present, version MUST be v2
///                                }  OPTIONAL,
///      crlExtensions           [0]  EXPLICIT Extensions OPTIONAL
///                                    -- if present, version MUST be v2
///                                }
/// ```
///
/// The revoked entries are kept in the order they were added. An index
/// allows quick lookup by serial number. If there are several entries for
/// the same serial number in a decoded CRL, lookups find the first one.
#[derive(Clone, Debug)]
pub struct TbsCertList {
    /// The version as decoded or the requested minimum version.
    version: Version,

    signature: AlgorithmIdentifier,
    issuer: DistinguishedName,
    this_update: Time,
    next_update: Option<Time>,

    /// The revoked certificates in order.
    revoked: Vec<CrlEntry>,

    /// The index into `revoked` by serial number.
    serials: HashMap<Serial, usize>,

    /// The CRL extensions.
    extensions: Extensions,
}

/// # Creation and Conversion
///
impl TbsCertList {
    /// Creates a new CRL without any entries or extensions.
    pub fn new(
        signature: AlgorithmIdentifier,
        issuer: DistinguishedName,
        this_update: Time,
        next_update: Option<Time>,
    ) -> Self {
        TbsCertList {
            version: Version::V1,
            signature,
            issuer,
            this_update,
            next_update,
            revoked: Vec::new(),
            serials: HashMap::new(),
            extensions: Extensions::new(),
        }
    }

    /// Converts the value into a signed CRL.
    pub fn into_crl<S: Signer>(
        self,
        signer: &S,
        key: &S::KeyId,
    ) -> Result<Crl, SigningError<S::Error>> {
        let data = self.to_captured()?;
        let signature = signer.sign(
            key, &self.signature, data.as_slice()
        ).map_err(SigningError::Signer)?;
        Ok(Crl {
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
impl TbsCertList {
    pub fn version(&self) -> Version {
        self.version
    }

    /// Sets the minimum version.
    ///
    /// CRLs only know versions 1 and 2.
    pub fn set_version(&mut self, version: Version) -> Result<(), Error> {
        if version > Version::V2 {
            return Err(Error::invalid_value("CRLs only have versions 1 and 2"))
        }
        self.version = version;
        Ok(())
    }

    /// Returns the version the value will be encoded with.
    ///
    /// Extensions of the CRL or any entry require version 2.
    pub fn effective_version(&self) -> Version {
        if !self.extensions.is_empty()
            || self.revoked.iter().any(|entry| !entry.extensions.is_empty())
        {
            Version::V2
        }
        else {
            self.version
        }
    }

    pub fn signature(&self) -> &AlgorithmIdentifier {
        &self.signature
    }

    pub fn set_signature(&mut self, signature: AlgorithmIdentifier) {
        self.signature = signature
    }

    pub fn issuer(&self) -> &DistinguishedName {
        &self.issuer
    }

    pub fn set_issuer(&mut self, issuer: DistinguishedName) {
        self.issuer = issuer
    }

    pub fn this_update(&self) -> Time {
        self.this_update
    }

    pub fn set_this_update(&mut self, time: Time) {
        self.this_update = time
    }

    pub fn next_update(&self) -> Option<Time> {
        self.next_update
    }

    pub fn set_next_update(&mut self, time: Option<Time>) {
        self.next_update = time
    }

    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    pub fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.extensions
    }

    /// Returns the CRL number if present.
    pub fn crl_number(&self) -> Option<CrlNumber> {
        self.extensions.find::<CrlNumber>().copied()
    }
}

/// # Revoked Certificates
///
impl TbsCertList {
    /// Returns whether the certificate with the given serial is revoked.
    pub fn is_revoked(&self, serial: Serial) -> bool {
        self.serials.contains_key(&serial)
    }

    /// Returns the entry for the given serial number.
    pub fn revoked_entry(&self, serial: Serial) -> Option<&CrlEntry> {
        self.serials.get(&serial).map(|&idx| &self.revoked[idx])
    }

    pub fn number_of_revoked_certificates(&self) -> usize {
        self.revoked.len()
    }

    /// Returns an iterator over the entries in order.
    pub fn revoked_entries(&self) -> impl Iterator<Item = &CrlEntry> + '_ {
        self.revoked.iter()
    }

    /// Adds an entry.
    ///
    /// If there already is an entry for the serial number, it is replaced
    /// in place and returned.
    pub fn add_revoked(&mut self, entry: CrlEntry) -> Option<CrlEntry> {
        match self.serials.get(&entry.serial) {
            Some(&idx) => {
                Some(std::mem::replace(&mut self.revoked[idx], entry))
            }
            None => {
                self.serials.insert(entry.serial, self.revoked.len());
                self.revoked.push(entry);
                None
            }
        }
    }

    /// Adds an entry without extensions.
    pub fn revoke(
        &mut self, serial: Serial, revocation_date: Time
    ) -> Option<CrlEntry> {
        self.add_revoked(CrlEntry::new(serial, revocation_date))
    }

    /// Removes the entry for a serial number.
    pub fn remove_revoked(&mut self, serial: Serial) -> Option<CrlEntry> {
        let idx = self.serials.get(&serial).copied()?;
        let res = self.revoked.remove(idx);
        self.reindex();
        Some(res)
    }

    fn reindex(&mut self) {
        self.serials.clear();
        for (idx, entry) in self.revoked.iter().enumerate() {
            self.serials.entry(entry.serial).or_insert(idx);
        }
    }
}

/// # Decoding and Encoding
///
impl TbsCertList {
    /// Decodes the to-be-signed part of a CRL.
    pub fn decode<S>(source: S, registry: &Registry) -> Result<Self, Error>
    where
        S: IntoSource,
        S::Source: Source<Error = Infallible>,
    {
        Mode::Ber.decode(
            source, RawTbsCertList::take_from
        )?.resolve(registry)
    }

    /// Returns the DER encoding.
    pub fn to_captured(&self) -> Result<Captured, Error> {
        let extensions = self.extensions.to_captured()?;
        let entries = self.revoked.iter().map(|entry| {
            entry.to_captured()
        }).collect::<Result<Vec<_>, _>>()?;
        let version = self.effective_version();
        if version != self.version {
            debug!(
                "Encoding CRL as {} instead of {}.", version, self.version
            );
        }
        Ok(Captured::from_values(Mode::Der, encode::sequence((
            version.encode(),
            self.signature.encode_ref(),
            self.issuer.encode_ref(),
            self.this_update.encode_varied(),
            self.next_update.map(Time::encode_varied),
            if entries.is_empty() {
                None
            }
            else {
                Some(encode::sequence(encode::iter(entries.iter())))
            },
            extensions.as_ref().map(|ext| {
                encode::sequence_as(Tag::CTX_0, ext)
            }),
        ))))
    }

    pub fn to_bytes(&self) -> Result<Bytes, Error> {
        self.to_captured().map(Captured::into_bytes)
    }
}


//--- PartialEq and Eq

impl PartialEq for TbsCertList {
    fn eq(&self, other: &Self) -> bool {
        self.version == other.version
            && self.signature == other.signature
            && self.issuer == other.issuer
            && self.this_update == other.this_update
            && self.next_update == other.next_update
            && self.revoked == other.revoked
            && self.extensions == other.extensions
    }
}

impl Eq for TbsCertList { }


//------------ CrlEntry ------------------------------------------------------

/// An entry in the list of revoked certificates.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CrlEntry {
    /// The serial number of the revoked certificate.
    serial: Serial,

    /// The time of revocation.
    revocation_date: Time,

    /// The entry extensions.
    extensions: Extensions,
}

impl CrlEntry {
    pub fn new(serial: Serial, revocation_date: Time) -> Self {
        CrlEntry { serial, revocation_date, extensions: Extensions::new() }
    }

    pub fn serial(&self) -> Serial {
        self.serial
    }

    pub fn revocation_date(&self) -> Time {
        self.revocation_date
    }

    pub fn set_revocation_date(&mut self, date: Time) {
        self.revocation_date = date
    }

    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    pub fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.extensions
    }

    /// Returns the revocation reason if given.
    pub fn reason(&self) -> Option<CrlReason> {
        self.extensions.find::<CrlReason>().copied()
    }

    /// Sets or removes the revocation reason.
    pub fn set_reason(&mut self, reason: Option<CrlReason>) {
        match reason {
            Some(reason) => {
                self.extensions.insert_payload(false, reason);
            }
            None => {
                self.extensions.remove(&crate::oid::CE_CRL_REASON);
            }
        }
    }

    /// Returns the invalidity date if given.
    pub fn invalidity_date(&self) -> Option<Time> {
        self.extensions.find::<InvalidityDate>().map(|date| date.time())
    }

    /// Returns the certificate issuer for entries of indirect CRLs.
    pub fn certificate_issuer(&self) -> Option<&CertificateIssuer> {
        self.extensions.find::<CertificateIssuer>()
    }

    fn to_captured(&self) -> Result<Captured, Error> {
        let extensions = self.extensions.to_captured()?;
        Ok(Captured::from_values(Mode::Der, encode::sequence((
            self.serial.encode(),
            self.revocation_date.encode_varied(),
            extensions,
        ))))
    }
}


//------------ RawTbsCertList ------------------------------------------------

/// The structurally decoded content of a CRL.
struct RawTbsCertList {
    version: Option<u8>,
    signature: AlgorithmIdentifier,
    issuer: DistinguishedName,
    this_update: Time,
    next_update: Option<Time>,
    revoked: Vec<RawCrlEntry>,
    extensions: Option<Vec<GenericExtension>>,
}

struct RawCrlEntry {
    serial: Serial,
    revocation_date: Time,
    extensions: Option<Vec<GenericExtension>>,
}

impl RawTbsCertList {
    fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_sequence(|cons| {
            Ok(RawTbsCertList {
                version: Version::take_opt_from(cons)?,
                signature: AlgorithmIdentifier::take_from(cons)?,
                issuer: DistinguishedName::take_from(cons)?,
                this_update: Time::take_from(cons)?,
                next_update: Time::take_opt_from(cons)?,
                revoked: cons.take_opt_sequence(|cons| {
                    let mut res = Vec::new();
                    while let Some(entry) = RawCrlEntry::take_opt_from(
                        cons
                    )? {
                        res.push(entry)
                    }
                    Ok(res)
                })?.unwrap_or_default(),
                extensions: cons.take_opt_constructed_if(
                    Tag::CTX_0, GenericExtension::take_list_from
                )?,
            })
        })
    }

    fn resolve(self, registry: &Registry) -> Result<TbsCertList, Error> {
        let version = match self.version {
            Some(value) => {
                let version = Version::from_value(value)?;
                if version > Version::V2 {
                    return Err(Error::malformed(
                        format!("unknown CRL version {value}")
                    ))
                }
                version
            }
            None => Version::V1
        };
        let needs_v2 = self.extensions.is_some()
            || self.revoked.iter().any(|entry| entry.extensions.is_some());
        if needs_v2 && version < Version::V2 {
            return Err(Error::version(
                "CRL and entry extensions require version 2"
            ))
        }

        let mut res = TbsCertList::new(
            self.signature, self.issuer, self.this_update, self.next_update
        );
        res.version = version;
        for entry in self.revoked {
            let idx = res.revoked.len();
            if res.serials.insert(entry.serial, idx).is_some() {
                return Err(Error::malformed(format!(
                    "duplicate revoked serial {}", entry.serial
                )))
            }
            res.revoked.push(CrlEntry {
                serial: entry.serial,
                revocation_date: entry.revocation_date,
                extensions: match entry.extensions {
                    Some(list) => Extensions::from_generic(list, registry)?,
                    None => Extensions::new()
                }
            });
        }
        if let Some(list) = self.extensions {
            res.extensions = Extensions::from_generic(list, registry)?;
        }
        Ok(res)
    }
}

impl RawCrlEntry {
    fn take_opt_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Option<Self>, DecodeError<S::Error>> {
        cons.take_opt_sequence(|cons| {
            Ok(RawCrlEntry {
                serial: Serial::take_from(cons)?,
                revocation_date: Time::take_from(cons)?,
                extensions: GenericExtension::take_opt_list_from(cons)?,
            })
        })
    }
}


//============ Tests =========================================================

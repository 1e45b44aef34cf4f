//! Certificate and CRL extensions.
//!
//! Extensions are transmitted as a triple of an OID, a critical flag, and
//! the encoded value. This generic form is available as
//! [`GenericExtension`]. The [`Extension`] type instead carries a typed
//! [`ExtensionValue`], chosen by looking up the OID in a
//! [`Registry`][crate::registry::Registry]. Each kind of extension this
//! crate knows about has its own payload type in this module, the
//! [`ExtensionKind`] enum lists them all.
//!
//! Complete lists of extensions as they appear in certificates, CRLs, and
//! CRL entries are handled by [`Extensions`].

pub use self::constraints::{
    BasicConstraints, GeneralSubtree, GeneralSubtrees, InhibitAnyPolicy,
    NameConstraints, PolicyConstraints,
};
pub use self::crl::{
    CrlDistributionPoints, CrlNumber, CrlReason, DeltaCrlIndicator,
    DistributionPoint, DistributionPointName, FreshestCrl, InvalidityDate,
    ReasonFlags,
};
pub use self::general::{GeneralName, GeneralNames};
pub use self::generic::GenericExtension;
pub use self::keys::{
    AuthorityKeyIdentifier, ExtendedKeyUsage, KeyUsage,
    PrivateKeyUsagePeriod, SubjectKeyIdentifier,
};
pub use self::names::{
    Attribute, CertificateIssuer, IssuerAltName, SubjectAltName,
    SubjectDirectoryAttributes,
};
pub use self::policy::{
    CertificatePolicies, PolicyInformation, PolicyMapping, PolicyMappings,
};
pub use self::set::Extensions;

use std::convert::Infallible;
use bcder::{Mode, Oid};
use bcder::decode::DecodeError;
use bcder::encode::Values;
use bytes::Bytes;
use log::debug;
use crate::oid;
use crate::error::Error;
use crate::registry::Registry;


//------------ Macros --------------------------------------------------------

/// Defines getters and setters for named bits.
macro_rules! named_bits {
    ( $( $bit:expr => ($get:ident, $set:ident), )* ) => {
        $(
            pub fn $get(&self) -> bool {
                self.get($bit)
            }

            pub fn $set(&mut self, value: bool) {
                self.set($bit, value)
            }
        )*
    }
}


//------------ Modules -------------------------------------------------------

mod constraints;
mod crl;
mod general;
mod generic;
mod keys;
mod names;
mod policy;
mod set;


//------------ ExtensionPayload ----------------------------------------------

/// A type that is the payload of an extension.
///
/// This is implemented by all payload types listed in [`ExtensionKind`].
pub trait ExtensionPayload: Sized + Into<ExtensionValue> {
    /// The kind of extension this payload belongs to.
    const KIND: ExtensionKind;

    /// Returns a reference to the payload if the value is of this kind.
    fn from_value(value: &ExtensionValue) -> Option<&Self>;

    /// Returns a mutable reference if the value is of this kind.
    fn from_value_mut(value: &mut ExtensionValue) -> Option<&mut Self>;
}


//------------ ExtensionKind and ExtensionValue ------------------------------

macro_rules! extension_kinds {
    (
        $(
            $( #[$attr:meta] )*
            $variant:ident($ty:ty) => ($oid:expr, $name:expr),
        )*
    ) => {
        /// The kinds of extensions with a typed payload.
        ///
        /// The registry maps OIDs to these kinds. Each kind knows the OID
        /// and name it is registered under in the standard registry.
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        pub enum ExtensionKind {
            $(
                $( #[$attr] )*
                $variant,
            )*
        }

        impl ExtensionKind {
            /// All kinds.
            pub const ALL: &'static [ExtensionKind] = &[
                $( ExtensionKind::$variant, )*
            ];

            /// Returns the OID assigned to the extension kind.
            pub fn standard_oid(self) -> Oid {
                match self {
                    $( ExtensionKind::$variant => oid::to_owned(&$oid), )*
                }
            }

            /// Returns the name of the kind in the standard registry.
            pub fn standard_name(self) -> &'static str {
                match self {
                    $( ExtensionKind::$variant => $name, )*
                }
            }

            /// Decodes an encoded extension value.
            pub fn decode(
                self, value: &[u8]
            ) -> Result<ExtensionValue, DecodeError<Infallible>> {
                match self {
                    $(
                        ExtensionKind::$variant => {
                            Mode::Ber.decode(value, <$ty>::take_from)
                                .map(ExtensionValue::$variant)
                        }
                    )*
                }
            }
        }

        /// The typed value of an extension.
        #[derive(Clone, Debug, Eq, PartialEq)]
        pub enum ExtensionValue {
            $(
                $( #[$attr] )*
                $variant($ty),
            )*

            /// The encoded value of an extension not known to the registry.
            Opaque(Bytes),
        }

        impl ExtensionValue {
            /// Returns the kind of the value.
            ///
            /// Returns `None` for opaque values.
            pub fn kind(&self) -> Option<ExtensionKind> {
                match self {
                    $(
                        ExtensionValue::$variant(_) => {
                            Some(ExtensionKind::$variant)
                        }
                    )*
                    ExtensionValue::Opaque(_) => None,
                }
            }

            /// Returns the DER encoding of the value.
            ///
            /// This fails if a payload misses a required field.
            pub fn to_bytes(&self) -> Result<Bytes, Error> {
                match self {
                    $(
                        ExtensionValue::$variant(inner) => {
                            inner.encode_value()
                        }
                    )*
                    ExtensionValue::Opaque(bytes) => Ok(bytes.clone()),
                }
            }
        }

        $(
            impl From<$ty> for ExtensionValue {
                fn from(src: $ty) -> Self {
                    ExtensionValue::$variant(src)
                }
            }

            impl ExtensionPayload for $ty {
                const KIND: ExtensionKind = ExtensionKind::$variant;

                fn from_value(value: &ExtensionValue) -> Option<&Self> {
                    match value {
                        ExtensionValue::$variant(inner) => Some(inner),
                        _ => None
                    }
                }

                fn from_value_mut(
                    value: &mut ExtensionValue
                ) -> Option<&mut Self> {
                    match value {
                        ExtensionValue::$variant(inner) => Some(inner),
                        _ => None
                    }
                }
            }
        )*
    }
}

extension_kinds! {
    SubjectDirectoryAttributes(SubjectDirectoryAttributes) => (
        oid::CE_SUBJECT_DIRECTORY_ATTRIBUTES, "SubjectDirectoryAttributes"
    ),
    SubjectKeyIdentifier(SubjectKeyIdentifier) => (
        oid::CE_SUBJECT_KEY_IDENTIFIER, "SubjectKeyIdentifier"
    ),
    KeyUsage(KeyUsage) => (oid::CE_KEY_USAGE, "KeyUsage"),
    PrivateKeyUsagePeriod(PrivateKeyUsagePeriod) => (
        oid::CE_PRIVATE_KEY_USAGE_PERIOD, "PrivateKeyUsage"
    ),
    SubjectAltName(SubjectAltName) => (
        oid::CE_SUBJECT_ALT_NAME, "SubjectAlternativeName"
    ),
    IssuerAltName(IssuerAltName) => (
        oid::CE_ISSUER_ALT_NAME, "IssuerAlternativeName"
    ),
    BasicConstraints(BasicConstraints) => (
        oid::CE_BASIC_CONSTRAINTS, "BasicConstraints"
    ),
    CrlNumber(CrlNumber) => (oid::CE_CRL_NUMBER, "CRLNumber"),
    CrlReason(CrlReason) => (oid::CE_CRL_REASON, "CRLReasonCode"),
    InvalidityDate(InvalidityDate) => (
        oid::CE_INVALIDITY_DATE, "InvalidityDate"
    ),
    DeltaCrlIndicator(DeltaCrlIndicator) => (
        oid::CE_DELTA_CRL_INDICATOR, "DeltaCRLIndicator"
    ),
    CertificateIssuer(CertificateIssuer) => (
        oid::CE_CERTIFICATE_ISSUER, "CertificateIssuer"
    ),
    NameConstraints(NameConstraints) => (
        oid::CE_NAME_CONSTRAINTS, "NameConstraints"
    ),
    CrlDistributionPoints(CrlDistributionPoints) => (
        oid::CE_CRL_DISTRIBUTION_POINTS, "CRLDistributionPoints"
    ),
    CertificatePolicies(CertificatePolicies) => (
        oid::CE_CERTIFICATE_POLICIES, "CertificatePolicies"
    ),
    PolicyMappings(PolicyMappings) => (
        oid::CE_POLICY_MAPPINGS, "PolicyMappings"
    ),
    AuthorityKeyIdentifier(AuthorityKeyIdentifier) => (
        oid::CE_AUTHORITY_KEY_IDENTIFIER, "AuthorityKeyIdentifier"
    ),
    PolicyConstraints(PolicyConstraints) => (
        oid::CE_POLICY_CONSTRAINTS, "PolicyConstraints"
    ),
    ExtendedKeyUsage(ExtendedKeyUsage) => (
        oid::CE_EXTENDED_KEY_USAGE, "ExtendedKeyUsage"
    ),
    FreshestCrl(FreshestCrl) => (oid::CE_FRESHEST_CRL, "FreshestCRL"),
    InhibitAnyPolicy(InhibitAnyPolicy) => (
        oid::CE_INHIBIT_ANY_POLICY, "InhibitAnyPolicy"
    ),
}


//------------ Extension -----------------------------------------------------

/// An extension with a typed value.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Extension {
    /// The OID of the extension.
    oid: Oid,

    /// The name of the extension.
    ///
    /// For extensions unknown to the registry, this is the dotted OID.
    name: String,

    /// Is the extension critical?
    critical: bool,

    /// The value.
    value: ExtensionValue,
}

impl Extension {
    /// Creates an extension with the standard OID of the payload’s kind.
    pub fn new<T: ExtensionPayload>(critical: bool, payload: T) -> Self {
        Extension {
            oid: T::KIND.standard_oid(),
            name: T::KIND.standard_name().into(),
            critical,
            value: payload.into(),
        }
    }

    /// Creates an extension with the OID a registry has for the kind.
    ///
    /// Fails if the registry doesn’t know the payload’s kind.
    pub fn with_registry<T: ExtensionPayload>(
        registry: &Registry, critical: bool, payload: T
    ) -> Result<Self, Error> {
        let (name, oid) = registry.extension_by_kind(T::KIND).ok_or_else(|| {
            Error::invalid_value(format!(
                "extension kind {:?} is not registered", T::KIND
            ))
        })?;
        Ok(Extension {
            oid: oid.clone(),
            name: name.into(),
            critical,
            value: payload.into(),
        })
    }

    /// Creates an extension with an opaque value.
    pub fn opaque(oid: Oid, critical: bool, value: Bytes) -> Self {
        Extension {
            name: oid.to_string(),
            oid,
            critical,
            value: ExtensionValue::Opaque(value),
        }
    }

    /// Converts a generic extension into a typed one.
    ///
    /// Extensions not known to the registry are kept opaque unless they
    /// are critical in which case the conversion fails.
    pub fn from_generic(
        ext: GenericExtension, registry: &Registry
    ) -> Result<Self, Error> {
        let (oid, critical, value) = ext.into_parts();
        match registry.extension_kind(&oid) {
            Some(kind) => {
                let value = kind.decode(value.as_ref()).map_err(|err| {
                    Error::extension(oid.clone(), err)
                })?;
                Ok(Extension {
                    name: registry.extension_name(&oid).unwrap_or(
                        kind.standard_name()
                    ).into(),
                    oid,
                    critical,
                    value,
                })
            }
            None if critical => Err(Error::unsupported_critical(oid)),
            None => {
                debug!("Keeping unknown extension {oid} as opaque value.");
                Ok(Self::opaque(oid, critical, value))
            }
        }
    }

    /// Converts the extension into its generic form.
    pub fn to_generic(&self) -> Result<GenericExtension, Error> {
        Ok(GenericExtension::new(
            self.oid.clone(), self.critical, self.value.to_bytes()?
        ))
    }

    pub fn oid(&self) -> &Oid {
        &self.oid
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_critical(&self) -> bool {
        self.critical
    }

    pub fn set_critical(&mut self, critical: bool) {
        self.critical = critical
    }

    pub fn value(&self) -> &ExtensionValue {
        &self.value
    }

    pub fn value_mut(&mut self) -> &mut ExtensionValue {
        &mut self.value
    }

    /// Returns the payload if it is of the requested type.
    pub fn payload<T: ExtensionPayload>(&self) -> Option<&T> {
        T::from_value(&self.value)
    }

    /// Returns the payload for changing if it is of the requested type.
    pub fn payload_mut<T: ExtensionPayload>(&mut self) -> Option<&mut T> {
        T::from_value_mut(&mut self.value)
    }
}


//------------ Helper Functions ----------------------------------------------

/// Returns the DER encoding of a value.
fn capture<V: Values>(values: V) -> Bytes {
    values.to_captured(Mode::Der).into_bytes()
}


//============ Tests =========================================================

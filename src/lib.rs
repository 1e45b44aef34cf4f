//! Encoding and decoding of X.509 certificates and CRLs.
//!
//! This crate contains types for the to-be-signed parts of X.509
//! certificates and certificate revocation lists as defined in RFC 5280,
//! the standard extensions that appear in them, and the distinguished
//! names used for subjects and issuers.
//!
//! The central types are [`TbsCert`][cert::TbsCert] and
//! [`TbsCertList`][crl::TbsCertList]. Both can be decoded from their DER
//! encoding and serve as builders for new objects. Once complete, they are
//! turned into a signed [`Cert`][cert::Cert] or [`Crl`][crl::Crl] via a
//! [`Signer`][crypto::Signer]. Signing itself is left to the user of the
//! crate.
//!
//! Extensions are dispatched by OID through a [`Registry`][registry::Registry]
//! which also maps the attribute keywords used in the string
//! representation of distinguished names. Unless told otherwise, all
//! functions use the [standard registry][registry::standard_registry].
//!
//! # Feature Flags
//!
//! * `serde`: Enables serialization of certificates and CRLs as Base 64
//!   encoded DER as well as serialization of some of the basic types.

pub use self::error::{Error, ErrorKind, SigningError};

pub mod cert;
pub mod crl;
pub mod crypto;
pub mod error;
pub mod ext;
pub mod name;
pub mod oid;
pub mod registry;
pub mod x509;

mod util {
    #[cfg(feature = "serde")]
    pub mod base64;
    pub mod hex;
}

//! The object identifiers used in this crate.
//!
//! This module collects all the object identifiers used at various places
//! in this crate in one central place. They are public so you can refer to
//! them should that ever become necessary.
//!
//! Identifiers are kept as [`bcder::Oid`] values in their encoded form. The
//! constants here are [`ConstOid`]s. Where an owned identifier is needed, it
//! can be created via [`to_owned`].

use bcder::{ConstOid, Oid};
use bytes::Bytes;


/// Converts a constant object identifier into an owned one.
pub fn to_owned(oid: &ConstOid) -> Oid {
    Oid(Bytes::from_static(oid.0))
}


//------------ Attribute Types -----------------------------------------------

/// [RFC 4519](https://tools.ietf.org/html/rfc4519) `cn`
pub const AT_COMMON_NAME: ConstOid = Oid(&[85, 4, 3]);
/// [RFC 4519](https://tools.ietf.org/html/rfc4519) `sn`
pub const AT_SURNAME: ConstOid = Oid(&[85, 4, 4]);
/// [RFC 4519](https://tools.ietf.org/html/rfc4519) `serialNumber`
pub const AT_SERIAL_NUMBER: ConstOid = Oid(&[85, 4, 5]);
/// [RFC 4519](https://tools.ietf.org/html/rfc4519) `c`
pub const AT_COUNTRY_NAME: ConstOid = Oid(&[85, 4, 6]);
/// [RFC 4519](https://tools.ietf.org/html/rfc4519) `l`
pub const AT_LOCALITY_NAME: ConstOid = Oid(&[85, 4, 7]);
/// [RFC 4519](https://tools.ietf.org/html/rfc4519) `st`
pub const AT_STATE_OR_PROVINCE_NAME: ConstOid = Oid(&[85, 4, 8]);
/// [RFC 4519](https://tools.ietf.org/html/rfc4519) `street`
pub const AT_STREET_ADDRESS: ConstOid = Oid(&[85, 4, 9]);
/// [RFC 4519](https://tools.ietf.org/html/rfc4519) `o`
pub const AT_ORGANIZATION_NAME: ConstOid = Oid(&[85, 4, 10]);
/// [RFC 4519](https://tools.ietf.org/html/rfc4519) `ou`
pub const AT_ORGANIZATIONAL_UNIT_NAME: ConstOid = Oid(&[85, 4, 11]);
/// [RFC 4519](https://tools.ietf.org/html/rfc4519) `title`
pub const AT_TITLE: ConstOid = Oid(&[85, 4, 12]);
/// [RFC 4519](https://tools.ietf.org/html/rfc4519) `givenName`
pub const AT_GIVEN_NAME: ConstOid = Oid(&[85, 4, 42]);
/// [RFC 4519](https://tools.ietf.org/html/rfc4519) `initials`
pub const AT_INITIALS: ConstOid = Oid(&[85, 4, 43]);
/// [RFC 4519](https://tools.ietf.org/html/rfc4519) `generationQualifier`
pub const AT_GENERATION_QUALIFIER: ConstOid = Oid(&[85, 4, 44]);
/// [RFC 4519](https://tools.ietf.org/html/rfc4519) `dnQualifier`
pub const AT_DN_QUALIFIER: ConstOid = Oid(&[85, 4, 46]);
/// [RFC 4519](https://tools.ietf.org/html/rfc4519) `uid`
pub const AT_USER_ID: ConstOid
    = Oid(&[9, 146, 38, 137, 147, 242, 44, 100, 1, 1]);
/// [RFC 1274](https://tools.ietf.org/html/rfc1274) `rfc822Mailbox`
pub const AT_MAIL: ConstOid
    = Oid(&[9, 146, 38, 137, 147, 242, 44, 100, 1, 3]);
/// [RFC 4519](https://tools.ietf.org/html/rfc4519) `dc`
pub const AT_DOMAIN_COMPONENT: ConstOid
    = Oid(&[9, 146, 38, 137, 147, 242, 44, 100, 1, 25]);
/// [RFC 2985](https://tools.ietf.org/html/rfc2985) `emailAddress`
pub const PKCS9_EMAIL_ADDRESS: ConstOid
    = Oid(&[42, 134, 72, 134, 247, 13, 1, 9, 1]);


//------------ Certificate and CRL Extensions --------------------------------

pub const CE_SUBJECT_DIRECTORY_ATTRIBUTES: ConstOid = Oid(&[85, 29, 9]);
pub const CE_SUBJECT_KEY_IDENTIFIER: ConstOid = Oid(&[85, 29, 14]);
pub const CE_KEY_USAGE: ConstOid = Oid(&[85, 29, 15]);
pub const CE_PRIVATE_KEY_USAGE_PERIOD: ConstOid = Oid(&[85, 29, 16]);
pub const CE_SUBJECT_ALT_NAME: ConstOid = Oid(&[85, 29, 17]);
pub const CE_ISSUER_ALT_NAME: ConstOid = Oid(&[85, 29, 18]);
pub const CE_BASIC_CONSTRAINTS: ConstOid = Oid(&[85, 29, 19]);
pub const CE_CRL_NUMBER: ConstOid = Oid(&[85, 29, 20]);
pub const CE_CRL_REASON: ConstOid = Oid(&[85, 29, 21]);
pub const CE_INVALIDITY_DATE: ConstOid = Oid(&[85, 29, 24]);
pub const CE_DELTA_CRL_INDICATOR: ConstOid = Oid(&[85, 29, 27]);
pub const CE_CERTIFICATE_ISSUER: ConstOid = Oid(&[85, 29, 29]);
pub const CE_NAME_CONSTRAINTS: ConstOid = Oid(&[85, 29, 30]);
pub const CE_CRL_DISTRIBUTION_POINTS: ConstOid = Oid(&[85, 29, 31]);
pub const CE_CERTIFICATE_POLICIES: ConstOid = Oid(&[85, 29, 32]);
pub const CE_POLICY_MAPPINGS: ConstOid = Oid(&[85, 29, 33]);
pub const CE_AUTHORITY_KEY_IDENTIFIER: ConstOid = Oid(&[85, 29, 35]);
pub const CE_POLICY_CONSTRAINTS: ConstOid = Oid(&[85, 29, 36]);
pub const CE_EXTENDED_KEY_USAGE: ConstOid = Oid(&[85, 29, 37]);
pub const CE_FRESHEST_CRL: ConstOid = Oid(&[85, 29, 46]);
pub const CE_INHIBIT_ANY_POLICY: ConstOid = Oid(&[85, 29, 54]);


//------------ Extended Key Usages -------------------------------------------

/// [RFC 5280](https://tools.ietf.org/html/rfc5280) `anyExtendedKeyUsage`
pub const ANY_EXTENDED_KEY_USAGE: ConstOid = Oid(&[85, 29, 37, 0]);
pub const KP_SERVER_AUTH: ConstOid = Oid(&[43, 6, 1, 5, 5, 7, 3, 1]);
pub const KP_CLIENT_AUTH: ConstOid = Oid(&[43, 6, 1, 5, 5, 7, 3, 2]);
pub const KP_CODE_SIGNING: ConstOid = Oid(&[43, 6, 1, 5, 5, 7, 3, 3]);
pub const KP_EMAIL_PROTECTION: ConstOid = Oid(&[43, 6, 1, 5, 5, 7, 3, 4]);
pub const KP_TIME_STAMPING: ConstOid = Oid(&[43, 6, 1, 5, 5, 7, 3, 8]);
pub const KP_OCSP_SIGNING: ConstOid = Oid(&[43, 6, 1, 5, 5, 7, 3, 9]);

/// [RFC 5280](https://tools.ietf.org/html/rfc5280) `anyPolicy`
pub const ANY_POLICY: ConstOid = Oid(&[85, 29, 32, 0]);


//------------ Algorithms ----------------------------------------------------

/// [RFC 4055](https://tools.ietf.org/html/rfc4055) `rsaEncryption`
///
/// Identifies an RSA public key with no limitation to either RSASSA-PSS or
/// RSAES-OEAP.
pub const RSA_ENCRYPTION: ConstOid
    = Oid(&[42, 134, 72, 134, 247, 13, 1, 1, 1]);

/// [RFC 5480](https://tools.ietf.org/html/rfc5480) `id-ecPublicKey`
pub const EC_PUBLIC_KEY: ConstOid = Oid(&[42, 134, 72, 206, 61, 2, 1]);

pub const SHA1_WITH_RSA_ENCRYPTION: ConstOid
    = Oid(&[42, 134, 72, 134, 247, 13, 1, 1, 5]);
pub const SHA224_WITH_RSA_ENCRYPTION: ConstOid
    = Oid(&[42, 134, 72, 134, 247, 13, 1, 1, 14]);

/// [RFC 4055](https://tools.ietf.org/html/rfc4055) `sha256WithRSAEncryption`
///
/// Identifies the PKCS #1 version 1.5 signature algorithm with SHA-256.
pub const SHA256_WITH_RSA_ENCRYPTION: ConstOid
    = Oid(&[42, 134, 72, 134, 247, 13, 1, 1, 11]);
pub const SHA384_WITH_RSA_ENCRYPTION: ConstOid
    = Oid(&[42, 134, 72, 134, 247, 13, 1, 1, 12]);
pub const SHA512_WITH_RSA_ENCRYPTION: ConstOid
    = Oid(&[42, 134, 72, 134, 247, 13, 1, 1, 13]);

pub const ECDSA_WITH_SHA1: ConstOid = Oid(&[42, 134, 72, 206, 61, 4, 1]);
pub const ECDSA_WITH_SHA224: ConstOid = Oid(&[42, 134, 72, 206, 61, 4, 3, 1]);
pub const ECDSA_WITH_SHA256: ConstOid = Oid(&[42, 134, 72, 206, 61, 4, 3, 2]);
pub const ECDSA_WITH_SHA384: ConstOid = Oid(&[42, 134, 72, 206, 61, 4, 3, 3]);
pub const ECDSA_WITH_SHA512: ConstOid = Oid(&[42, 134, 72, 206, 61, 4, 3, 4]);

pub const DSA_WITH_SHA1: ConstOid = Oid(&[42, 134, 72, 206, 56, 4, 3]);
pub const DSA_WITH_SHA256: ConstOid = Oid(&[96, 134, 72, 1, 101, 3, 4, 3, 2]);

/// [RFC 8410](https://tools.ietf.org/html/rfc8410) `id-Ed25519`
pub const ED25519: ConstOid = Oid(&[43, 101, 112]);
/// [RFC 8410](https://tools.ietf.org/html/rfc8410) `id-Ed448`
pub const ED448: ConstOid = Oid(&[43, 101, 113]);


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn constants_are_well_formed() {
        assert_eq!(AT_COMMON_NAME.to_string(), "2.5.4.3");
        assert_eq!(AT_USER_ID.to_string(), "0.9.2342.19200300.100.1.1");
        assert_eq!(PKCS9_EMAIL_ADDRESS.to_string(), "1.2.840.113549.1.9.1");
        assert_eq!(CE_BASIC_CONSTRAINTS.to_string(), "2.5.29.19");
        assert_eq!(ANY_POLICY.to_string(), "2.5.29.32.0");
        assert_eq!(KP_OCSP_SIGNING.to_string(), "1.3.6.1.5.5.7.3.9");
        assert_eq!(ECDSA_WITH_SHA384.to_string(), "1.2.840.10045.4.3.3");
        assert_eq!(DSA_WITH_SHA256.to_string(), "2.16.840.1.101.3.4.3.2");
        assert_eq!(ED448.to_string(), "1.3.101.113");
    }

    #[test]
    fn owned_equals_constant() {
        let parsed = Oid::<Bytes>::from_str("2.5.29.15").unwrap();
        assert_eq!(parsed, CE_KEY_USAGE);
        assert_eq!(to_owned(&CE_KEY_USAGE), parsed);
        assert_ne!(parsed, CE_BASIC_CONSTRAINTS);
    }
}

//! A generic interface to a signer.

use std::fmt;
use bytes::Bytes;
use super::keys::{AlgorithmIdentifier, PublicKey};


//------------ Signer --------------------------------------------------------

/// A type that allow creating signatures.
///
/// The signer owns the private keys. Callers only ever refer to them via
/// the signer’s key identifier type.
pub trait Signer {
    /// The type used for identifying keys.
    type KeyId;

    /// An operational error happened in the signer.
    type Error: fmt::Debug + fmt::Display;

    /// Signs data.
    ///
    /// Returns the signature value, i.e., the octets that go into the
    /// signature BIT STRING.
    fn sign(
        &self,
        key: &Self::KeyId,
        algorithm: &AlgorithmIdentifier,
        data: &[u8]
    ) -> Result<Bytes, Self::Error>;
}


//------------ Verifier ------------------------------------------------------

/// A type that allows checking signatures.
pub trait Verifier {
    /// An operational error happened in the verifier.
    ///
    /// A signature that doesn’t verify is not an error but reported as
    /// `Ok(false)`.
    type Error: fmt::Debug + fmt::Display;

    /// Verifies a signature over some data.
    fn verify(
        &self,
        public_key: &PublicKey,
        algorithm: &AlgorithmIdentifier,
        data: &[u8],
        signature: &[u8],
    ) -> Result<bool, Self::Error>;
}

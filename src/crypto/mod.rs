//! Algorithms, public keys, and the interface to signing.
//!
//! This crate does not perform any cryptography itself. Creating and
//! checking signatures is left to implementations of the [`Signer`] and
//! [`Verifier`] traits. The types here only describe keys and algorithms
//! the way they appear in certificates and CRLs.

pub use self::keys::{
    AlgorithmIdentifier, KeyIdentifier, PublicKey, UnknownAlgorithm,
};
pub use self::signer::{Signer, Verifier};

pub mod keys;
pub mod signer;

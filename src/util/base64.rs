//! Handling of Base 64-encoded data.
//!
//! Different applications use slightly different dialects of Base 64. The
//! module provides a struct for each flavor so the details don’t need to be
//! remembered at the place of use. Currently, there is only the flavor used
//! when serializing certificates and CRLs.

use base64::Engine;
use base64::engine::general_purpose::{GeneralPurpose, STANDARD};

pub use base64::DecodeError;


//------------ Serde --------------------------------------------------------

/// The flavor used for serialization of objects in this crate.
///
/// It uses the standard alphabet with padding and no white space allowed.
#[derive(Clone, Copy, Debug)]
pub struct Serde;

impl Serde {
    const ENGINE: GeneralPurpose = STANDARD;

    pub fn decode(self, input: &str) -> Result<Vec<u8>, DecodeError> {
        Self::ENGINE.decode(input)
    }

    pub fn encode(self, data: &[u8]) -> String {
        Self::ENGINE.encode(data)
    }

    /// Serializes binary data as a Base 64 string.
    #[cfg(feature = "serde")]
    pub fn serialize<S: serde::Serializer>(
        self, data: &[u8], serializer: S
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encode(data))
    }

    /// Deserializes binary data from a Base 64 string.
    #[cfg(feature = "serde")]
    pub fn deserialize<'de, D: serde::Deserializer<'de>>(
        self, deserializer: D
    ) -> Result<Vec<u8>, D::Error> {
        use serde::Deserialize;
        use serde::de;

        let string = String::deserialize(deserializer)?;
        self.decode(&string).map_err(de::Error::custom)
    }
}


//============ Tests =========================================================

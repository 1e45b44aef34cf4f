//! Error handling.
//!
//! All fallible operations of the crate report an [`Error`]. Its
//! [`kind`][Error::kind] tells what category of problem occurred, the
//! `Display` impl gives the details.
//!
//! Signing additionally reports errors of the signer which is why
//! [`SigningError`] is generic over those.

use std::{error, fmt};
use std::borrow::Cow;
use std::convert::Infallible;
use bcder::Oid;
use bcder::decode::DecodeError;


//------------ ErrorKind -----------------------------------------------------

/// The category of an error.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ErrorKind {
    /// The encoded data was malformed.
    ///
    /// This covers wrong tags, truncated data, unparseable numbers or
    /// times, trailing data, and extension values that cannot be decoded.
    Malformed,

    /// An extension marked critical was not recognized.
    UnsupportedCriticalExtension,

    /// A distinguished name string used an unknown attribute keyword.
    UnknownAttributeName,

    /// A registration clashed with an existing registry entry.
    RegistrationConflict,

    /// A version-gated field did not match the version.
    VersionConstraintViolation,

    /// An extension lacked a required field when encoding.
    IncompleteExtension,

    /// A value given to a constructor violated its invariants.
    InvalidValue,
}


//------------ Error ---------------------------------------------------------

/// An error happened while decoding, encoding, or building a value.
#[derive(Debug)]
pub struct Error {
    inner: ErrorInner,
}

#[derive(Debug)]
enum ErrorInner {
    Decode(DecodeError<Infallible>),
    Malformed(Cow<'static, str>),
    Extension {
        oid: Oid,
        err: DecodeError<Infallible>,
    },
    UnsupportedCritical(Oid),
    UnknownAttribute(String),
    Conflict(String),
    Version(&'static str),
    Incomplete {
        extension: &'static str,
        field: &'static str,
    },
    InvalidValue(Cow<'static, str>),
}

impl Error {
    /// Returns the category of the error.
    pub fn kind(&self) -> ErrorKind {
        match self.inner {
            ErrorInner::Decode(_) => ErrorKind::Malformed,
            ErrorInner::Malformed(_) => ErrorKind::Malformed,
            ErrorInner::Extension { .. } => ErrorKind::Malformed,
            ErrorInner::UnsupportedCritical(_) => {
                ErrorKind::UnsupportedCriticalExtension
            }
            ErrorInner::UnknownAttribute(_) => {
                ErrorKind::UnknownAttributeName
            }
            ErrorInner::Conflict(_) => ErrorKind::RegistrationConflict,
            ErrorInner::Version(_) => ErrorKind::VersionConstraintViolation,
            ErrorInner::Incomplete { .. } => ErrorKind::IncompleteExtension,
            ErrorInner::InvalidValue(_) => ErrorKind::InvalidValue,
        }
    }

    /// Returns the extension OID the error refers to, if any.
    pub fn extension_oid(&self) -> Option<&Oid> {
        match self.inner {
            ErrorInner::Extension { ref oid, .. } => Some(oid),
            ErrorInner::UnsupportedCritical(ref oid) => Some(oid),
            _ => None
        }
    }

    pub(crate) fn malformed(msg: impl Into<Cow<'static, str>>) -> Self {
        Error { inner: ErrorInner::Malformed(msg.into()) }
    }

    pub(crate) fn extension(
        oid: Oid, err: DecodeError<Infallible>
    ) -> Self {
        Error { inner: ErrorInner::Extension { oid, err } }
    }

    pub(crate) fn unsupported_critical(oid: Oid) -> Self {
        Error { inner: ErrorInner::UnsupportedCritical(oid) }
    }

    pub(crate) fn unknown_attribute(name: impl Into<String>) -> Self {
        Error { inner: ErrorInner::UnknownAttribute(name.into()) }
    }

    pub(crate) fn conflict(what: impl Into<String>) -> Self {
        Error { inner: ErrorInner::Conflict(what.into()) }
    }

    pub(crate) fn version(msg: &'static str) -> Self {
        Error { inner: ErrorInner::Version(msg) }
    }

    pub(crate) fn incomplete(
        extension: &'static str, field: &'static str
    ) -> Self {
        Error { inner: ErrorInner::Incomplete { extension, field } }
    }

    pub(crate) fn invalid_value(msg: impl Into<Cow<'static, str>>) -> Self {
        Error { inner: ErrorInner::InvalidValue(msg.into()) }
    }
}

impl From<DecodeError<Infallible>> for Error {
    fn from(err: DecodeError<Infallible>) -> Self {
        Error { inner: ErrorInner::Decode(err) }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.inner {
            ErrorInner::Decode(ref err) => err.fmt(f),
            ErrorInner::Malformed(ref msg) => f.write_str(msg),
            ErrorInner::Extension { ref oid, ref err } => {
                write!(f, "malformed extension {oid}: {err}")
            }
            ErrorInner::UnsupportedCritical(ref oid) => {
                write!(f, "unsupported critical extension {oid}")
            }
            ErrorInner::UnknownAttribute(ref name) => {
                write!(f, "unknown attribute name '{name}'")
            }
            ErrorInner::Conflict(ref what) => {
                write!(f, "{what} is already registered")
            }
            ErrorInner::Version(msg) => f.write_str(msg),
            ErrorInner::Incomplete { extension, field } => {
                write!(f, "{extension} extension is missing {field}")
            }
            ErrorInner::InvalidValue(ref msg) => f.write_str(msg),
        }
    }
}

impl error::Error for Error { }


//------------ SigningError --------------------------------------------------

/// An error happened while producing a signed certificate or CRL.
#[derive(Debug)]
pub enum SigningError<S> {
    /// The to-be-signed data could not be encoded.
    Encoding(Error),

    /// The signer failed.
    Signer(S),
}

impl<S> From<Error> for SigningError<S> {
    fn from(err: Error) -> Self {
        SigningError::Encoding(err)
    }
}

impl<S: fmt::Display> fmt::Display for SigningError<S> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            SigningError::Encoding(ref err) => err.fmt(f),
            SigningError::Signer(ref err) => {
                write!(f, "signing failed: {err}")
            }
        }
    }
}

impl<S: fmt::Debug + fmt::Display> error::Error for SigningError<S> { }


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::oid;

    #[test]
    fn kinds() {
        assert_eq!(
            Error::unsupported_critical(
                oid::to_owned(&oid::CE_KEY_USAGE)
            ).kind(),
            ErrorKind::UnsupportedCriticalExtension
        );
        assert_eq!(
            Error::incomplete("NameConstraints", "subtrees").kind(),
            ErrorKind::IncompleteExtension
        );
        assert_eq!(
            Error::malformed("duplicate extension").kind(),
            ErrorKind::Malformed
        );
        let err = Error::unsupported_critical(
            oid::to_owned(&oid::CE_KEY_USAGE)
        );
        assert_eq!(err.extension_oid().unwrap(), &oid::CE_KEY_USAGE);
    }

    #[test]
    fn display() {
        assert_eq!(
            Error::unsupported_critical(
                oid::to_owned(&oid::CE_KEY_USAGE)
            ).to_string(),
            "unsupported critical extension 2.5.29.15"
        );
        assert_eq!(
            Error::unknown_attribute("FOO").to_string(),
            "unknown attribute name 'FOO'"
        );
    }
}

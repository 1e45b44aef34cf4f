//! Lists of extensions.

use std::convert::Infallible;
use bcder::{encode, Captured, Mode, Oid};
use bcder::decode::{IntoSource, Source};
use log::warn;
use crate::error::Error;
use crate::registry::Registry;
use super::{Extension, ExtensionPayload, GenericExtension};


//------------ Extensions ----------------------------------------------------

/// The extensions of a certificate, CRL, or CRL entry.
///
/// ```text
/// Extensions  ::=  SEQUENCE SIZE (1..MAX) OF Extension
/// ```
///
/// The extensions are kept in order. They can be looked up by OID, by
/// the name they are registered under, or by payload type. There can only
/// be one extension for each OID.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Extensions {
    list: Vec<Extension>,
}

impl Extensions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Extension> + '_ {
        self.list.iter()
    }

    /// Returns the extension with the given name.
    ///
    /// Extensions not known to the registry used for decoding are named
    /// by their dotted OID.
    pub fn get(&self, name: &str) -> Option<&Extension> {
        self.list.iter().find(|ext| ext.name() == name)
    }

    pub fn get_by_oid<T: AsRef<[u8]>>(
        &self, oid: &Oid<T>
    ) -> Option<&Extension> {
        self.list.iter().find(|ext| ext.oid() == oid)
    }

    /// Returns the payload of the given type if present.
    pub fn find<T: ExtensionPayload>(&self) -> Option<&T> {
        self.list.iter().find_map(|ext| ext.payload())
    }

    /// Returns the payload of the given type for changing.
    pub fn find_mut<T: ExtensionPayload>(&mut self) -> Option<&mut T> {
        self.list.iter_mut().find_map(|ext| ext.payload_mut())
    }

    /// Returns whether the payload of the given type is critical.
    pub fn is_critical<T: ExtensionPayload>(&self) -> Option<bool> {
        self.list.iter().find(|ext| {
            ext.value().kind() == Some(T::KIND)
        }).map(Extension::is_critical)
    }

    /// Adds an extension.
    ///
    /// If there already is an extension with the same OID, it is replaced
    /// in place and returned.
    pub fn insert(&mut self, ext: Extension) -> Option<Extension> {
        match self.list.iter_mut().find(|item| item.oid() == ext.oid()) {
            Some(item) => {
                warn!(
                    "Replacing existing extension {} ({}).",
                    item.name(), item.oid()
                );
                Some(std::mem::replace(item, ext))
            }
            None => {
                self.list.push(ext);
                None
            }
        }
    }

    /// Adds an extension with the standard OID of its payload.
    pub fn insert_payload<T: ExtensionPayload>(
        &mut self, critical: bool, payload: T
    ) -> Option<Extension> {
        self.insert(Extension::new(critical, payload))
    }

    /// Removes the extension with the given OID.
    pub fn remove<T: AsRef<[u8]>>(
        &mut self, oid: &Oid<T>
    ) -> Option<Extension> {
        let idx = self.list.iter().position(|ext| ext.oid() == oid)?;
        Some(self.list.remove(idx))
    }
}

/// # Decoding and Encoding
///
impl Extensions {
    /// Decodes a `SEQUENCE OF Extension`.
    pub fn decode<S>(source: S, registry: &Registry) -> Result<Self, Error>
    where
        S: IntoSource,
        S::Source: Source<Error = Infallible>,
    {
        Self::from_generic(
            Mode::Ber.decode(source, GenericExtension::take_list_from)?,
            registry
        )
    }

    /// Creates the extensions from their generic form.
    ///
    /// This fails as a whole if any of the extensions fails to convert or
    /// if an OID appears more than once.
    pub fn from_generic(
        list: Vec<GenericExtension>, registry: &Registry
    ) -> Result<Self, Error> {
        let mut res = Self::new();
        for ext in list {
            if res.get_by_oid(ext.oid()).is_some() {
                return Err(Error::malformed(format!(
                    "duplicate extension {}", ext.oid()
                )))
            }
            res.list.push(Extension::from_generic(ext, registry)?);
        }
        Ok(res)
    }

    /// Converts the extensions into their generic form.
    pub fn to_generic(&self) -> Result<Vec<GenericExtension>, Error> {
        self.list.iter().map(Extension::to_generic).collect()
    }

    /// Returns the encoded `SEQUENCE OF Extension`.
    ///
    /// Returns `None` if there are no extensions since an empty list is
    /// left out entirely rather than encoded.
    pub fn to_captured(&self) -> Result<Option<Captured>, Error> {
        if self.list.is_empty() {
            return Ok(None)
        }
        let list = self.to_generic()?;
        Ok(Some(Captured::from_values(
            Mode::Der,
            encode::sequence(
                encode::iter(list.iter().map(GenericExtension::encode_ref))
            )
        )))
    }
}

impl FromIterator<Extension> for Extensions {
    fn from_iter<I: IntoIterator<Item = Extension>>(iter: I) -> Self {
        let mut res = Self::new();
        for ext in iter {
            res.insert(ext);
        }
        res
    }
}


//============ Tests =========================================================

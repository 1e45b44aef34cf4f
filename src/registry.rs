//! The registry of known extensions and attribute types.
//!
//! A [`Registry`] maps between object identifiers, their friendly names,
//! and the way their values are handled. It knows about two things:
//! certificate and CRL extensions, which map an OID and name to the
//! [`ExtensionKind`] that decodes them, and naming attributes, which map an
//! OID and a keyword used in the string form of distinguished names to the
//! [`ValueConverter`] that turns strings into attribute values.
//!
//! Registries are built once and then shared immutably, either by
//! reference or through an `Arc`. [`Registry::standard`] creates one that
//! knows about all the extensions and attributes supported by this crate.
//! Additional entries can be added before sharing with the various
//! `register_*` methods. Registration never replaces an existing entry.

use std::collections::HashMap;
use std::sync::OnceLock;
use bcder::{ConstOid, Oid};
use bytes::Bytes;
use log::debug;
use crate::oid;
use crate::error::Error;
use crate::ext::ExtensionKind;
use crate::name::ValueConverter;


//------------ Registry ------------------------------------------------------

#[derive(Clone, Debug, Default)]
pub struct Registry {
    /// The registered extensions.
    extensions: Vec<ExtensionEntry>,

    /// The index into `extensions` by encoded OID.
    extension_oids: HashMap<Bytes, usize>,

    /// The index into `extensions` by name.
    extension_names: HashMap<String, usize>,

    /// The registered attribute types.
    attributes: Vec<AttributeEntry>,

    /// The index into `attributes` by encoded OID.
    attribute_oids: HashMap<Bytes, usize>,

    /// The index into `attributes` by upper case keyword.
    ///
    /// This includes aliases.
    attribute_keywords: HashMap<String, usize>,
}

#[derive(Clone, Debug)]
struct ExtensionEntry {
    oid: Oid,
    name: String,
    kind: ExtensionKind,
}

#[derive(Clone, Debug)]
struct AttributeEntry {
    oid: Oid,
    keyword: String,
    converter: ValueConverter,
}

impl Registry {
    /// Creates a new, empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with all the standard entries.
    pub fn standard() -> Self {
        let mut res = Self::new();
        for kind in ExtensionKind::ALL {
            res.extensions.push(ExtensionEntry {
                oid: kind.standard_oid(),
                name: kind.standard_name().into(),
                kind: *kind,
            });
            let idx = res.extensions.len() - 1;
            res.extension_oids.insert(kind.standard_oid().0, idx);
            res.extension_names.insert(kind.standard_name().into(), idx);
        }
        for (keyword, oid, converter) in standard_attributes() {
            res.insert_attribute(keyword, oid::to_owned(&oid), converter);
        }
        for (alias, oid) in standard_aliases() {
            if let Some(&idx) = res.attribute_oids.get(oid.as_ref()) {
                res.attribute_keywords.insert(alias.into(), idx);
            }
        }
        res
    }


    //--- Extensions

    /// Registers an extension.
    ///
    /// Fails if either the OID, the name, or the kind are already
    /// registered. In this case, the registry is left unchanged.
    pub fn register_extension(
        &mut self,
        name: &str,
        oid: Oid,
        kind: ExtensionKind,
    ) -> Result<(), Error> {
        if self.extension_oids.contains_key(oid.as_ref()) {
            return Err(Error::conflict(format!("extension OID {oid}")))
        }
        if self.extension_names.contains_key(name) {
            return Err(Error::conflict(format!("extension name '{name}'")))
        }
        if self.extensions.iter().any(|entry| entry.kind == kind) {
            return Err(Error::conflict(format!("extension kind {kind:?}")))
        }
        debug!("Registering extension {name} as {oid}.");
        self.extensions.push(ExtensionEntry {
            oid: oid.clone(), name: name.into(), kind
        });
        let idx = self.extensions.len() - 1;
        self.extension_oids.insert(oid.0, idx);
        self.extension_names.insert(name.into(), idx);
        Ok(())
    }

    /// Returns the name of the extension with the given OID.
    pub fn extension_name<T: AsRef<[u8]>>(
        &self, oid: &Oid<T>
    ) -> Option<&str> {
        self.extension_oids.get(oid.as_ref()).map(|&idx| {
            self.extensions[idx].name.as_str()
        })
    }

    /// Returns the OID of the extension with the given name.
    pub fn extension_oid(&self, name: &str) -> Option<&Oid> {
        self.extension_names.get(name).map(|&idx| &self.extensions[idx].oid)
    }

    /// Returns the decoder for the extension with the given OID.
    pub fn extension_kind<T: AsRef<[u8]>>(
        &self, oid: &Oid<T>
    ) -> Option<ExtensionKind> {
        self.extension_oids.get(oid.as_ref()).map(|&idx| {
            self.extensions[idx].kind
        })
    }

    /// Returns the decoder for the extension with the given name.
    pub fn extension_kind_by_name(
        &self, name: &str
    ) -> Option<ExtensionKind> {
        self.extension_names.get(name).map(|&idx| {
            self.extensions[idx].kind
        })
    }

    /// Returns the name and OID a kind is registered under.
    pub fn extension_by_kind(
        &self, kind: ExtensionKind
    ) -> Option<(&str, &Oid)> {
        self.extensions.iter().find(|entry| entry.kind == kind).map(|entry| {
            (entry.name.as_str(), &entry.oid)
        })
    }

    /// Returns an iterator over all registered extensions.
    pub fn extensions(
        &self
    ) -> impl Iterator<Item = (&str, &Oid, ExtensionKind)> {
        self.extensions.iter().map(|entry| {
            (entry.name.as_str(), &entry.oid, entry.kind)
        })
    }


    //--- Attribute Types

    /// Registers an attribute type.
    ///
    /// Keywords are case-insensitive. Fails if the keyword or the OID are
    /// already registered. In this case, the registry is left unchanged.
    pub fn register_attribute(
        &mut self,
        keyword: &str,
        oid: Oid,
        converter: ValueConverter,
    ) -> Result<(), Error> {
        if self.attribute_oids.contains_key(oid.as_ref()) {
            return Err(Error::conflict(format!("attribute OID {oid}")))
        }
        if self.attribute_keywords.contains_key(&keyword.to_uppercase()) {
            return Err(Error::conflict(
                format!("attribute keyword '{keyword}'")
            ))
        }
        debug!("Registering attribute {keyword} as {oid}.");
        self.insert_attribute(keyword, oid, converter);
        Ok(())
    }

    /// Registers an additional keyword for an attribute type.
    ///
    /// The alias is accepted when parsing names but the primary keyword is
    /// used when rendering them.
    pub fn register_attribute_alias<T: AsRef<[u8]>>(
        &mut self,
        alias: &str,
        oid: &Oid<T>,
    ) -> Result<(), Error> {
        let idx = match self.attribute_oids.get(oid.as_ref()) {
            Some(idx) => *idx,
            None => {
                return Err(Error::invalid_value(
                    format!("attribute {oid} is not registered")
                ))
            }
        };
        let alias = alias.to_uppercase();
        if self.attribute_keywords.contains_key(&alias) {
            return Err(Error::conflict(
                format!("attribute keyword '{alias}'")
            ))
        }
        self.attribute_keywords.insert(alias, idx);
        Ok(())
    }

    fn insert_attribute(
        &mut self,
        keyword: &str,
        oid: Oid,
        converter: ValueConverter,
    ) {
        self.attributes.push(AttributeEntry {
            oid: oid.clone(), keyword: keyword.into(), converter
        });
        let idx = self.attributes.len() - 1;
        self.attribute_oids.insert(oid.0, idx);
        self.attribute_keywords.insert(keyword.to_uppercase(), idx);
    }

    /// Returns the OID for an attribute keyword.
    ///
    /// The keyword is matched ignoring case.
    pub fn attribute_oid(&self, keyword: &str) -> Option<&Oid> {
        self.attribute_keywords.get(&keyword.to_uppercase()).map(|&idx| {
            &self.attributes[idx].oid
        })
    }

    /// Returns the primary keyword for an attribute type.
    pub fn attribute_keyword<T: AsRef<[u8]>>(
        &self, oid: &Oid<T>
    ) -> Option<&str> {
        self.attribute_oids.get(oid.as_ref()).map(|&idx| {
            self.attributes[idx].keyword.as_str()
        })
    }

    /// Returns the value converter for an attribute type.
    pub fn attribute_converter<T: AsRef<[u8]>>(
        &self, oid: &Oid<T>
    ) -> Option<ValueConverter> {
        self.attribute_oids.get(oid.as_ref()).map(|&idx| {
            self.attributes[idx].converter
        })
    }
}


//------------ standard_registry ---------------------------------------------

/// Returns a shared standard registry.
///
/// This is used by the conversions that don’t take a registry, such as
/// `Display` and `FromStr` for distinguished names.
pub fn standard_registry() -> &'static Registry {
    static REGISTRY: OnceLock<Registry> = OnceLock::new();
    REGISTRY.get_or_init(Registry::standard)
}


//------------ Standard Attributes -------------------------------------------

fn standard_attributes(
) -> [(&'static str, ConstOid, ValueConverter); 18] {
    use self::ValueConverter::*;

    [
        ("CN", oid::AT_COMMON_NAME, DirectoryString),
        ("SN", oid::AT_SURNAME, DirectoryString),
        ("SERIALNUMBER", oid::AT_SERIAL_NUMBER, Printable),
        ("C", oid::AT_COUNTRY_NAME, Printable),
        ("L", oid::AT_LOCALITY_NAME, DirectoryString),
        ("ST", oid::AT_STATE_OR_PROVINCE_NAME, DirectoryString),
        ("STREET", oid::AT_STREET_ADDRESS, DirectoryString),
        ("O", oid::AT_ORGANIZATION_NAME, DirectoryString),
        ("OU", oid::AT_ORGANIZATIONAL_UNIT_NAME, DirectoryString),
        ("TITLE", oid::AT_TITLE, DirectoryString),
        ("GIVENNAME", oid::AT_GIVEN_NAME, DirectoryString),
        ("INITIALS", oid::AT_INITIALS, DirectoryString),
        ("GENERATION", oid::AT_GENERATION_QUALIFIER, DirectoryString),
        ("DNQUALIFIER", oid::AT_DN_QUALIFIER, Printable),
        ("UID", oid::AT_USER_ID, DirectoryString),
        ("MAIL", oid::AT_MAIL, Ia5),
        ("DC", oid::AT_DOMAIN_COMPONENT, Ia5),
        ("E", oid::PKCS9_EMAIL_ADDRESS, Ia5),
    ]
}

fn standard_aliases() -> [(&'static str, ConstOid); 7] {
    [
        ("S", oid::AT_STATE_OR_PROVINCE_NAME),
        ("T", oid::AT_TITLE),
        ("SURNAME", oid::AT_SURNAME),
        ("DNQ", oid::AT_DN_QUALIFIER),
        ("EMAIL", oid::PKCS9_EMAIL_ADDRESS),
        ("EMAILADDRESS", oid::PKCS9_EMAIL_ADDRESS),
        ("USERID", oid::AT_USER_ID),
    ]
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use std::str::FromStr;
    use crate::error::ErrorKind;
    use crate::oid::to_owned;

    #[test]
    fn extension_lookups_are_inverse() {
        let registry = Registry::standard();
        for (name, oid, kind) in registry.extensions() {
            assert_eq!(registry.extension_oid(name), Some(oid));
            assert_eq!(registry.extension_name(oid), Some(name));
            assert_eq!(registry.extension_kind(oid), Some(kind));
            assert_eq!(registry.extension_kind_by_name(name), Some(kind));
        }
        assert_eq!(
            registry.extension_name(&oid::CE_BASIC_CONSTRAINTS),
            Some("BasicConstraints")
        );
    }

    #[test]
    fn register_extension_conflicts() {
        let mut registry = Registry::new();
        registry.register_extension(
            "MyKeyUsage", to_owned(&oid::CE_KEY_USAGE),
            ExtensionKind::KeyUsage
        ).unwrap();
        let err = registry.register_extension(
            "Other", to_owned(&oid::CE_KEY_USAGE),
            ExtensionKind::BasicConstraints
        ).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RegistrationConflict);
        let err = registry.register_extension(
            "MyKeyUsage", to_owned(&oid::CE_BASIC_CONSTRAINTS),
            ExtensionKind::BasicConstraints
        ).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RegistrationConflict);
        let err = registry.register_extension(
            "Other", Oid::from_str("1.2.3.4").unwrap(),
            ExtensionKind::KeyUsage
        ).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RegistrationConflict);

        // Nothing of the failed attempts made it in.
        assert_eq!(registry.extensions().count(), 1);
        assert!(registry.extension_oid("Other").is_none());
    }

    #[test]
    fn attributes() {
        let registry = Registry::standard();
        assert_eq!(
            registry.attribute_oid("cn").unwrap(), &oid::AT_COMMON_NAME
        );
        assert_eq!(
            registry.attribute_oid("EmailAddress").unwrap(),
            &oid::PKCS9_EMAIL_ADDRESS
        );
        assert_eq!(
            registry.attribute_keyword(&oid::PKCS9_EMAIL_ADDRESS), Some("E")
        );
        assert_eq!(
            registry.attribute_converter(&oid::AT_COUNTRY_NAME),
            Some(ValueConverter::Printable)
        );
        assert!(registry.attribute_oid("FOO").is_none());
    }

    #[test]
    fn register_attribute() {
        let mut registry = Registry::standard();
        let oid = Oid::<Bytes>::from_str("1.3.6.1.4.1.99999.1").unwrap();
        registry.register_attribute(
            "Team", oid.clone(), ValueConverter::Utf8
        ).unwrap();
        assert_eq!(registry.attribute_oid("TEAM"), Some(&oid));
        assert_eq!(
            registry.register_attribute(
                "cn", oid.clone(), ValueConverter::Utf8
            ).unwrap_err().kind(),
            ErrorKind::RegistrationConflict
        );
        registry.register_attribute_alias("SQUAD", &oid).unwrap();
        assert_eq!(registry.attribute_oid("squad"), Some(&oid));
        assert_eq!(registry.attribute_keyword(&oid), Some("Team"));
        assert_eq!(
            registry.register_attribute_alias("CN", &oid).unwrap_err().kind(),
            ErrorKind::RegistrationConflict
        );
    }
}

//! Extensions carrying names and attributes.

use std::ops;
use bcder::{decode, encode, Oid};
use bcder::decode::DecodeError;
use bcder::encode::PrimitiveContent;
use bytes::Bytes;
use crate::error::Error;
use crate::x509::DerData;
use super::capture;
use super::general::{GeneralName, GeneralNames};


//------------ Alternative Names ---------------------------------------------

/// Defines an extension that consists of a list of general names.
macro_rules! general_names_extension {
    ( $( $( #[$attr:meta] )* $name:ident, )* ) => {
        $(
            $( #[$attr] )*
            #[derive(Clone, Debug, Eq, PartialEq)]
            pub struct $name(GeneralNames);

            impl $name {
                pub fn new(names: GeneralNames) -> Self {
                    $name(names)
                }

                pub fn names(&self) -> &GeneralNames {
                    &self.0
                }

                pub fn names_mut(&mut self) -> &mut GeneralNames {
                    &mut self.0
                }

                pub fn into_names(self) -> GeneralNames {
                    self.0
                }

                pub fn take_from<S: decode::Source>(
                    cons: &mut decode::Constructed<S>
                ) -> Result<Self, DecodeError<S::Error>> {
                    GeneralNames::take_from(cons).map($name)
                }

                pub fn encode_value(&self) -> Result<Bytes, Error> {
                    Ok(capture(self.0.encode_ref()))
                }
            }

            impl From<GeneralNames> for $name {
                fn from(names: GeneralNames) -> Self {
                    $name(names)
                }
            }

            impl From<GeneralName> for $name {
                fn from(name: GeneralName) -> Self {
                    $name(name.into())
                }
            }

            impl ops::Deref for $name {
                type Target = GeneralNames;

                fn deref(&self) -> &GeneralNames {
                    &self.0
                }
            }
        )*
    }
}

general_names_extension! {
    /// The subject alternative name extension.
    ///
    /// ```text
    /// SubjectAltName ::= GeneralNames
    /// ```
    SubjectAltName,

    /// The issuer alternative name extension.
    ///
    /// ```text
    /// IssuerAltName ::= GeneralNames
    /// ```
    IssuerAltName,

    /// The certificate issuer CRL entry extension.
    ///
    /// This names the issuer of the revoked certificate for indirect CRLs.
    ///
    /// ```text
    /// certificateIssuer ::=     GeneralNames
    /// ```
    CertificateIssuer,
}


//------------ SubjectDirectoryAttributes ------------------------------------

/// The subject directory attributes extension.
///
/// ```text
/// SubjectDirectoryAttributes ::= SEQUENCE SIZE (1..MAX) OF Attribute
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SubjectDirectoryAttributes(Vec<Attribute>);

impl SubjectDirectoryAttributes {
    pub fn new(attrs: Vec<Attribute>) -> Self {
        SubjectDirectoryAttributes(attrs)
    }

    pub fn push(&mut self, attr: Attribute) {
        self.0.push(attr)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attribute> + '_ {
        self.0.iter()
    }

    /// Returns the first attribute of the given type.
    pub fn get<T: AsRef<[u8]>>(&self, oid: &Oid<T>) -> Option<&Attribute> {
        self.0.iter().find(|attr| attr.oid() == oid)
    }

    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_sequence(|cons| {
            let mut res = Vec::new();
            while let Some(attr) = Attribute::take_opt_from(cons)? {
                res.push(attr)
            }
            if res.is_empty() {
                return Err(cons.content_err("empty directory attributes"))
            }
            Ok(SubjectDirectoryAttributes(res))
        })
    }

    pub fn encode_ref(&self) -> impl encode::Values + '_ {
        encode::sequence(
            encode::iter(self.0.iter().map(Attribute::encode_ref))
        )
    }

    pub fn encode_value(&self) -> Result<Bytes, Error> {
        if self.0.is_empty() {
            return Err(Error::incomplete(
                "SubjectDirectoryAttributes", "Attribute"
            ))
        }
        Ok(capture(self.encode_ref()))
    }
}


//------------ Attribute -----------------------------------------------------

/// A directory attribute with all its values.
///
/// ```text
/// Attribute ::= SEQUENCE {
///       type             AttributeType,
///       values    SET OF AttributeValue }
/// ```
///
/// The values are kept encoded.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Attribute {
    oid: Oid,
    values: Vec<DerData>,
}

impl Attribute {
    pub fn new(oid: Oid, values: Vec<DerData>) -> Self {
        Attribute { oid, values }
    }

    pub fn oid(&self) -> &Oid {
        &self.oid
    }

    pub fn values(&self) -> &[DerData] {
        &self.values
    }

    pub fn take_opt_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Option<Self>, DecodeError<S::Error>> {
        cons.take_opt_sequence(|cons| {
            let oid = Oid::take_from(cons)?;
            let values = cons.take_set(|cons| {
                let mut values = Vec::new();
                while let Some(value) = DerData::take_opt_from(cons)? {
                    values.push(value)
                }
                if values.is_empty() {
                    return Err(cons.content_err("attribute without values"))
                }
                Ok(values)
            })?;
            Ok(Attribute { oid, values })
        })
    }

    pub fn encode_ref(&self) -> impl encode::Values + '_ {
        encode::sequence((
            self.oid.encode_ref(),
            encode::set(encode::iter(self.values.iter())),
        ))
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use bcder::Mode;
    use crate::oid;

    #[test]
    fn subject_alt_name() {
        let mut san = SubjectAltName::from(
            GeneralName::DnsName("www.example.com".into())
        );
        san.names_mut().push(GeneralName::ip_address("192.0.2.1").unwrap());
        let der = san.encode_value().unwrap();
        let decoded = Mode::Der.decode(
            der.as_ref(), SubjectAltName::take_from
        ).unwrap();
        assert_eq!(decoded, san);
        assert_eq!(decoded.as_slice().len(), 2);
        assert!(
            Mode::Der.decode(
                b"\x30\x00".as_ref(), IssuerAltName::take_from
            ).is_err()
        );
    }

    #[test]
    fn directory_attributes() {
        // countryOfCitizenship = "DEU"
        let der = b"\x30\x13\x30\x11\x06\x08\x2b\x06\x01\x05\x05\x07\x09\x04\
                    \x31\x05\x13\x03DEU";
        let attrs = Mode::Der.decode(
            der.as_ref(), SubjectDirectoryAttributes::take_from
        ).unwrap();
        let attr = attrs.iter().next().unwrap();
        assert_eq!(attr.oid().to_string(), "1.3.6.1.5.5.7.9.4");
        assert_eq!(attr.values().len(), 1);
        assert_eq!(attr.values()[0].as_slice(), b"\x13\x03DEU");
        assert_eq!(attrs.encode_value().unwrap().as_ref(), der.as_ref());
        assert!(attrs.get(&oid::AT_COMMON_NAME).is_none());
    }
}

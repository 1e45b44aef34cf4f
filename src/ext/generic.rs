//! Extensions in their generic form.

use bcder::{decode, encode, OctetString, Oid};
use bcder::decode::DecodeError;
use bcder::encode::PrimitiveContent;
use bytes::Bytes;
use crate::x509::Octets;


//------------ GenericExtension ----------------------------------------------

/// An extension with its value still encoded.
///
/// ```text
/// Extension  ::=  SEQUENCE  {
///      extnID      OBJECT IDENTIFIER,
///      critical    BOOLEAN DEFAULT FALSE,
///      extnValue   OCTET STRING
///                  -- contains the DER encoding of an ASN.1 value
///                  -- corresponding to the extension type identified
///                  -- by extnID
///      }
/// ```
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct GenericExtension {
    oid: Oid,
    critical: bool,
    value: Bytes,
}

impl GenericExtension {
    pub fn new(oid: Oid, critical: bool, value: Bytes) -> Self {
        GenericExtension { oid, critical, value }
    }

    pub fn oid(&self) -> &Oid {
        &self.oid
    }

    pub fn is_critical(&self) -> bool {
        self.critical
    }

    /// Returns the content of the `extnValue` octet string.
    pub fn value(&self) -> &Bytes {
        &self.value
    }

    pub fn into_parts(self) -> (Oid, bool, Bytes) {
        (self.oid, self.critical, self.value)
    }

    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_sequence(Self::from_constructed)
    }

    pub fn take_opt_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Option<Self>, DecodeError<S::Error>> {
        cons.take_opt_sequence(Self::from_constructed)
    }

    fn from_constructed<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        Ok(GenericExtension {
            oid: Oid::take_from(cons)?,
            critical: cons.take_opt_bool()?.unwrap_or(false),
            value: OctetString::take_from(cons)?.into_bytes(),
        })
    }

    /// Takes a `SEQUENCE OF Extension`.
    pub fn take_list_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Vec<Self>, DecodeError<S::Error>> {
        cons.take_sequence(Self::list_from_constructed)
    }

    /// Takes an optional `SEQUENCE OF Extension`.
    pub fn take_opt_list_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Option<Vec<Self>>, DecodeError<S::Error>> {
        cons.take_opt_sequence(Self::list_from_constructed)
    }

    fn list_from_constructed<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Vec<Self>, DecodeError<S::Error>> {
        let mut res = Vec::new();
        while let Some(ext) = Self::take_opt_from(cons)? {
            res.push(ext)
        }
        Ok(res)
    }

    pub fn encode_ref(&self) -> impl encode::Values + '_ {
        encode::sequence((
            self.oid.encode_ref(),
            if self.critical { Some(true.encode()) } else { None },
            Octets(self.value.as_ref()).encode(),
        ))
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use bcder::Mode;
    use bcder::encode::Values;
    use crate::oid;

    #[test]
    fn encode_decode() {
        let ext = GenericExtension::new(
            oid::to_owned(&oid::CE_BASIC_CONSTRAINTS), true,
            Bytes::from_static(b"\x30\x03\x01\x01\xff")
        );
        let der = ext.encode_ref().to_captured(Mode::Der);
        assert_eq!(
            der.as_slice(),
            b"\x30\x0f\x06\x03\x55\x1d\x13\x01\x01\xff\
              \x04\x05\x30\x03\x01\x01\xff"
        );
        assert_eq!(
            Mode::Der.decode(der.as_slice(), GenericExtension::take_from)
                .unwrap(),
            ext
        );

        let ext = GenericExtension::new(
            oid::to_owned(&oid::CE_SUBJECT_KEY_IDENTIFIER), false,
            Bytes::from_static(b"\x04\x01\x00")
        );
        let der = ext.encode_ref().to_captured(Mode::Der);
        assert_eq!(
            der.as_slice(),
            b"\x30\x0a\x06\x03\x55\x1d\x0e\x04\x03\x04\x01\x00"
        );
        let decoded = Mode::Der.decode(
            der.as_slice(), GenericExtension::take_from
        ).unwrap();
        assert!(!decoded.is_critical());
    }

    #[test]
    fn take_ber_forms() {
        // Indefinite length sequence, explicit FALSE, and a constructed
        // octet string are all fine in BER.
        let data = b"\x30\x80\x06\x03\x55\x1d\x0e\x01\x01\x00\
                     \x24\x80\x04\x01\x04\x04\x02\x01\x00\x00\x00\
                     \x00\x00";
        let ext = Mode::Ber.decode(
            data.as_ref(), GenericExtension::take_from
        ).unwrap();
        assert_eq!(ext.oid(), &oid::CE_SUBJECT_KEY_IDENTIFIER);
        assert!(!ext.is_critical());
        assert_eq!(ext.value().as_ref(), b"\x04\x01\x00");
    }

    #[test]
    fn take_list() {
        let data = b"\x30\x0c\x30\x0a\x06\x03\x55\x1d\x0e\x04\x03\x04\x01\x00";
        let list = Mode::Der.decode(
            data.as_ref(), GenericExtension::take_list_from
        ).unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].oid(), &oid::CE_SUBJECT_KEY_IDENTIFIER);
        assert!(
            Mode::Der.decode(
                b"\x30\x02\x02\x00".as_ref(), GenericExtension::take_list_from
            ).is_err()
        );
    }
}

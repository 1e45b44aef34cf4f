//! Attribute value assertions.

use bcder::{decode, encode, Oid};
use bcder::decode::DecodeError;
use bcder::encode::{PrimitiveContent, Values};
use super::value::AttributeValue;


//------------ Ava -----------------------------------------------------------

/// A single attribute type and value pair.
///
/// ```text
/// AttributeTypeAndValue ::= SEQUENCE {
///     type     AttributeType,
///     value    AttributeValue }
/// ```
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Ava {
    oid: Oid,
    value: AttributeValue,
}

impl Ava {
    pub fn new(oid: Oid, value: AttributeValue) -> Self {
        Ava { oid, value }
    }

    /// Returns the attribute type.
    pub fn oid(&self) -> &Oid {
        &self.oid
    }

    /// Returns the attribute value.
    pub fn value(&self) -> &AttributeValue {
        &self.value
    }

    /// Returns the value as a string if it is of a string type.
    pub fn to_text(&self) -> Option<String> {
        self.value.to_text()
    }

    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_sequence(|cons| {
            Ok(Ava {
                oid: Oid::take_from(cons)?,
                value: AttributeValue::take_from(cons)?,
            })
        })
    }

    pub fn take_opt_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Option<Self>, DecodeError<S::Error>> {
        cons.take_opt_sequence(|cons| {
            Ok(Ava {
                oid: Oid::take_from(cons)?,
                value: AttributeValue::take_from(cons)?,
            })
        })
    }

    pub fn encode_ref(&self) -> impl encode::Values + '_ {
        encode::sequence((
            self.oid.encode_ref(),
            self.value.encode_ref(),
        ))
    }

    /// Returns the DER encoding of the AVA.
    pub(crate) fn to_der(&self) -> bytes::Bytes {
        self.encode_ref().to_captured(bcder::Mode::Der).into_bytes()
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use bcder::Mode;
    use crate::oid;

    #[test]
    fn encode_decode() {
        let ava = Ava::new(
            oid::to_owned(&oid::AT_COUNTRY_NAME),
            AttributeValue::printable("US").unwrap()
        );
        let der = ava.to_der();
        assert_eq!(
            der.as_ref(),
            b"\x30\x09\x06\x03\x55\x04\x06\x13\x02US"
        );
        let decoded = Mode::Der.decode(der.as_ref(), Ava::take_from).unwrap();
        assert_eq!(decoded, ava);
        assert_eq!(decoded.to_text().unwrap(), "US");
    }
}

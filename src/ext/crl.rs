//! Extensions of CRLs and CRL entries.

use std::fmt;
use bcder::{decode, encode, Tag};
use bcder::decode::DecodeError;
use bcder::encode::PrimitiveContent;
use bytes::Bytes;
use crate::error::Error;
use crate::name::Rdn;
use crate::x509::{Bits, GeneralizedTime, Serial, Time};
use super::capture;
use super::general::GeneralNames;


//------------ CrlNumber and DeltaCrlIndicator -------------------------------

/// The CRL number extension.
///
/// ```text
/// CRLNumber ::= INTEGER (0..MAX)
/// ```
///
/// Conforming CRL issuers use at most 20 octets which is what [`Serial`]
/// provides.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct CrlNumber(Serial);

/// The delta CRL indicator extension.
///
/// ```text
/// BaseCRLNumber ::= CRLNumber
/// ```
///
/// The value is the number of the complete CRL the delta CRL updates.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct DeltaCrlIndicator(Serial);

macro_rules! crl_number {
    ( $name:ident ) => {
        impl $name {
            pub fn new(number: Serial) -> Self {
                $name(number)
            }

            pub fn number(self) -> Serial {
                self.0
            }

            pub fn take_from<S: decode::Source>(
                cons: &mut decode::Constructed<S>
            ) -> Result<Self, DecodeError<S::Error>> {
                Serial::take_from(cons).map($name)
            }

            pub fn encode_value(&self) -> Result<Bytes, Error> {
                Ok(capture(self.0.encode()))
            }
        }

        impl From<Serial> for $name {
            fn from(number: Serial) -> Self {
                $name(number)
            }
        }

        impl From<u64> for $name {
            fn from(number: u64) -> Self {
                $name(number.into())
            }
        }
    }
}

crl_number!(CrlNumber);
crl_number!(DeltaCrlIndicator);


//------------ CrlReason -----------------------------------------------------

/// The reason code CRL entry extension.
///
/// ```text
/// CRLReason ::= ENUMERATED {
///      unspecified             (0),
///      keyCompromise           (1),
///      cACompromise            (2),
///      affiliationChanged      (3),
///      superseded              (4),
///      cessationOfOperation    (5),
///      certificateHold         (6),
///           -- value 7 is not used
///      removeFromCRL           (8),
///      privilegeWithdrawn      (9),
///      aACompromise           (10) }
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum CrlReason {
    Unspecified,
    KeyCompromise,
    CaCompromise,
    AffiliationChanged,
    Superseded,
    CessationOfOperation,
    CertificateHold,
    RemoveFromCrl,
    PrivilegeWithdrawn,
    AaCompromise,
}

impl CrlReason {
    /// Returns the reason for an encoded value.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(CrlReason::Unspecified),
            1 => Some(CrlReason::KeyCompromise),
            2 => Some(CrlReason::CaCompromise),
            3 => Some(CrlReason::AffiliationChanged),
            4 => Some(CrlReason::Superseded),
            5 => Some(CrlReason::CessationOfOperation),
            6 => Some(CrlReason::CertificateHold),
            8 => Some(CrlReason::RemoveFromCrl),
            9 => Some(CrlReason::PrivilegeWithdrawn),
            10 => Some(CrlReason::AaCompromise),
            _ => None
        }
    }

    pub fn code(self) -> u8 {
        match self {
            CrlReason::Unspecified => 0,
            CrlReason::KeyCompromise => 1,
            CrlReason::CaCompromise => 2,
            CrlReason::AffiliationChanged => 3,
            CrlReason::Superseded => 4,
            CrlReason::CessationOfOperation => 5,
            CrlReason::CertificateHold => 6,
            CrlReason::RemoveFromCrl => 8,
            CrlReason::PrivilegeWithdrawn => 9,
            CrlReason::AaCompromise => 10,
        }
    }

    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_primitive_if(Tag::ENUMERATED, |prim| {
            let code = prim.to_u8()?;
            Self::from_code(code).ok_or_else(|| {
                prim.content_err("invalid CRL reason code")
            })
        })
    }

    pub fn encode_value(&self) -> Result<Bytes, Error> {
        Ok(capture(self.code().encode_as(Tag::ENUMERATED)))
    }
}

impl fmt::Display for CrlReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            CrlReason::Unspecified => "unspecified",
            CrlReason::KeyCompromise => "keyCompromise",
            CrlReason::CaCompromise => "cACompromise",
            CrlReason::AffiliationChanged => "affiliationChanged",
            CrlReason::Superseded => "superseded",
            CrlReason::CessationOfOperation => "cessationOfOperation",
            CrlReason::CertificateHold => "certificateHold",
            CrlReason::RemoveFromCrl => "removeFromCRL",
            CrlReason::PrivilegeWithdrawn => "privilegeWithdrawn",
            CrlReason::AaCompromise => "aACompromise",
        })
    }
}


//------------ InvalidityDate ------------------------------------------------

/// The invalidity date CRL entry extension.
///
/// ```text
/// InvalidityDate ::=  GeneralizedTime
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct InvalidityDate(Time);

impl InvalidityDate {
    pub fn new(time: Time) -> Self {
        InvalidityDate(time)
    }

    pub fn time(self) -> Time {
        self.0
    }

    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        Time::take_generalized_from(cons).map(InvalidityDate)
    }

    pub fn encode_value(&self) -> Result<Bytes, Error> {
        Ok(capture(GeneralizedTime(self.0).encode()))
    }
}

impl From<Time> for InvalidityDate {
    fn from(time: Time) -> Self {
        InvalidityDate(time)
    }
}


//------------ CrlDistributionPoints and FreshestCrl -------------------------

/// The CRL distribution points extension.
///
/// ```text
/// CRLDistributionPoints ::= SEQUENCE SIZE (1..MAX) OF DistributionPoint
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CrlDistributionPoints(Vec<DistributionPoint>);

/// The freshest CRL extension.
///
/// This points to where delta CRLs can be found.
///
/// ```text
/// FreshestCRL ::= CRLDistributionPoints
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FreshestCrl(Vec<DistributionPoint>);

macro_rules! distribution_points {
    ( $name:ident, $ext:expr ) => {
        impl $name {
            pub fn new(points: Vec<DistributionPoint>) -> Self {
                $name(points)
            }

            pub fn push(&mut self, point: DistributionPoint) {
                self.0.push(point)
            }

            pub fn iter(
                &self
            ) -> impl Iterator<Item = &DistributionPoint> + '_ {
                self.0.iter()
            }

            pub fn take_from<S: decode::Source>(
                cons: &mut decode::Constructed<S>
            ) -> Result<Self, DecodeError<S::Error>> {
                cons.take_sequence(|cons| {
                    let mut res = Vec::new();
                    while let Some(point) = DistributionPoint::take_opt_from(
                        cons
                    )? {
                        res.push(point)
                    }
                    if res.is_empty() {
                        return Err(cons.content_err(
                            "empty distribution points"
                        ))
                    }
                    Ok($name(res))
                })
            }

            pub fn encode_ref(&self) -> impl encode::Values + '_ {
                encode::sequence(
                    encode::iter(self.0.iter().map(|p| p.encode_ref()))
                )
            }

            pub fn encode_value(&self) -> Result<Bytes, Error> {
                if self.0.is_empty() {
                    return Err(Error::incomplete($ext, "DistributionPoint"))
                }
                for point in &self.0 {
                    point.check($ext)?;
                }
                Ok(capture(self.encode_ref()))
            }
        }

        impl From<DistributionPoint> for $name {
            fn from(point: DistributionPoint) -> Self {
                $name(vec![point])
            }
        }
    }
}

distribution_points!(CrlDistributionPoints, "CRLDistributionPoints");
distribution_points!(FreshestCrl, "FreshestCRL");


//------------ DistributionPoint ---------------------------------------------

/// A place to get a CRL from.
///
/// ```text
/// DistributionPoint ::= SEQUENCE {
///      distributionPoint       [0]     DistributionPointName OPTIONAL,
///      reasons                 [1]     ReasonFlags OPTIONAL,
///      cRLIssuer               [2]     GeneralNames OPTIONAL }
/// ```
///
/// Either the name or the CRL issuer has to be present.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DistributionPoint {
    name: Option<DistributionPointName>,
    reasons: Option<ReasonFlags>,
    crl_issuer: Option<GeneralNames>,
}

impl DistributionPoint {
    /// Creates a distribution point with only a name.
    pub fn new(name: DistributionPointName) -> Self {
        DistributionPoint {
            name: Some(name), reasons: None, crl_issuer: None
        }
    }

    pub fn name(&self) -> Option<&DistributionPointName> {
        self.name.as_ref()
    }

    pub fn set_name(&mut self, name: Option<DistributionPointName>) {
        self.name = name
    }

    pub fn reasons(&self) -> Option<&ReasonFlags> {
        self.reasons.as_ref()
    }

    pub fn set_reasons(&mut self, reasons: Option<ReasonFlags>) {
        self.reasons = reasons
    }

    pub fn crl_issuer(&self) -> Option<&GeneralNames> {
        self.crl_issuer.as_ref()
    }

    pub fn set_crl_issuer(&mut self, issuer: Option<GeneralNames>) {
        self.crl_issuer = issuer
    }

    pub fn take_opt_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Option<Self>, DecodeError<S::Error>> {
        cons.take_opt_sequence(|cons| {
            let name = cons.take_opt_constructed_if(
                Tag::CTX_0, DistributionPointName::take_from
            )?;
            let reasons = cons.take_opt_primitive_if(
                Tag::CTX_1, ReasonFlags::from_primitive
            )?;
            let crl_issuer = cons.take_opt_constructed_if(
                Tag::CTX_2, GeneralNames::from_constructed
            )?;
            if name.is_none() && crl_issuer.is_none() {
                return Err(cons.content_err(
                    "distribution point without name or CRL issuer"
                ))
            }
            Ok(DistributionPoint { name, reasons, crl_issuer })
        })
    }

    pub fn encode_ref(&self) -> impl encode::Values + '_ {
        encode::sequence((
            self.name.as_ref().map(|name| {
                encode::sequence_as(Tag::CTX_0, name.encode_ref())
            }),
            self.reasons.as_ref().map(|reasons| {
                reasons.to_bits().encode_as(Tag::CTX_1)
            }),
            self.crl_issuer.as_ref().map(|issuer| {
                issuer.encode_ref_as(Tag::CTX_2)
            }),
        ))
    }

    fn check(&self, ext: &'static str) -> Result<(), Error> {
        if self.name.is_none() && self.crl_issuer.is_none() {
            Err(Error::incomplete(ext, "distributionPoint or cRLIssuer"))
        }
        else {
            Ok(())
        }
    }
}


//------------ DistributionPointName -----------------------------------------

/// The name of a distribution point.
///
/// ```text
/// DistributionPointName ::= CHOICE {
///      fullName                [0]     GeneralNames,
///      nameRelativeToCRLIssuer [1]     RelativeDistinguishedName }
/// ```
///
/// Being a choice, the name is explicitly tagged inside a distribution
/// point while both choices are implicitly tagged.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DistributionPointName {
    FullName(GeneralNames),
    RelativeToIssuer(Rdn),
}

impl DistributionPointName {
    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_value(|tag, content| {
            if tag == Tag::CTX_0 {
                GeneralNames::from_constructed(
                    content.as_constructed()?
                ).map(DistributionPointName::FullName)
            }
            else if tag == Tag::CTX_1 {
                Rdn::from_constructed(
                    content.as_constructed()?
                ).map(DistributionPointName::RelativeToIssuer)
            }
            else {
                Err(content.content_err("invalid distribution point name"))
            }
        })
    }

    pub fn encode_ref(&self) -> impl encode::Values + '_ {
        match self {
            DistributionPointName::FullName(names) => {
                encode::Choice2::One(names.encode_ref_as(Tag::CTX_0))
            }
            DistributionPointName::RelativeToIssuer(rdn) => {
                encode::Choice2::Two(rdn.encode_ref_as(Tag::CTX_1))
            }
        }
    }
}

impl From<GeneralNames> for DistributionPointName {
    fn from(names: GeneralNames) -> Self {
        DistributionPointName::FullName(names)
    }
}


//------------ ReasonFlags ---------------------------------------------------

/// The reasons covered by a distribution point.
///
/// ```text
/// ReasonFlags ::= BIT STRING {
///      unused                  (0),
///      keyCompromise           (1),
///      cACompromise            (2),
///      affiliationChanged      (3),
///      superseded              (4),
///      cessationOfOperation    (5),
///      certificateHold         (6),
///      privilegeWithdrawn      (7),
///      aACompromise            (8) }
/// ```
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct ReasonFlags {
    flags: Vec<bool>,
}

impl ReasonFlags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_flags(mut flags: Vec<bool>) -> Self {
        while flags.last() == Some(&false) {
            flags.pop();
        }
        ReasonFlags { flags }
    }

    pub fn get(&self, bit: usize) -> bool {
        self.flags.get(bit).copied().unwrap_or(false)
    }

    pub fn set(&mut self, bit: usize, value: bool) {
        if bit >= self.flags.len() {
            if !value {
                return
            }
            self.flags.resize(bit + 1, false);
        }
        self.flags[bit] = value;
        while self.flags.last() == Some(&false) {
            self.flags.pop();
        }
    }

    named_bits! {
        1 => (key_compromise, set_key_compromise),
        2 => (ca_compromise, set_ca_compromise),
        3 => (affiliation_changed, set_affiliation_changed),
        4 => (superseded, set_superseded),
        5 => (cessation_of_operation, set_cessation_of_operation),
        6 => (certificate_hold, set_certificate_hold),
        7 => (privilege_withdrawn, set_privilege_withdrawn),
        8 => (aa_compromise, set_aa_compromise),
    }

    pub fn from_primitive<S: decode::Source>(
        prim: &mut decode::Primitive<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        Bits::from_primitive(prim).map(|bits| {
            Self::from_flags(bits.to_flags())
        })
    }

    pub fn to_bits(&self) -> Bits {
        Bits::from_flags(&self.flags)
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use bcder::Mode;
    use crate::ext::GeneralName;
    use crate::name::{AttributeValue, Ava};
    use crate::oid;

    #[test]
    fn crl_number() {
        let number = CrlNumber::from(300u64);
        let der = number.encode_value().unwrap();
        assert_eq!(der.as_ref(), b"\x02\x02\x01\x2c");
        assert_eq!(
            Mode::Der.decode(der.as_ref(), CrlNumber::take_from).unwrap(),
            number
        );
        assert!(
            Mode::Der.decode(
                b"\x02\x01\xff".as_ref(), DeltaCrlIndicator::take_from
            ).is_err()
        );
    }

    #[test]
    fn crl_reason() {
        for code in 0..11u8 {
            let data = [0x0a, 0x01, code];
            let res = Mode::Der.decode(
                data.as_ref(), CrlReason::take_from
            );
            if code == 7 {
                assert!(res.is_err());
            }
            else {
                let reason = res.unwrap();
                assert_eq!(reason.code(), code);
                assert_eq!(
                    reason.encode_value().unwrap().as_ref(), data.as_ref()
                );
            }
        }
        assert!(
            Mode::Der.decode(
                b"\x0a\x01\x0b".as_ref(), CrlReason::take_from
            ).is_err()
        );
        assert!(
            Mode::Der.decode(
                b"\x02\x01\x01".as_ref(), CrlReason::take_from
            ).is_err()
        );
        assert_eq!(CrlReason::KeyCompromise.to_string(), "keyCompromise");
    }

    #[test]
    fn invalidity_date() {
        let date = InvalidityDate::new(
            Time::utc(2021, 6, 30, 12, 0, 0).unwrap()
        );
        let der = date.encode_value().unwrap();
        assert_eq!(der.as_ref(), b"\x18\x0f20210630120000Z");
        assert_eq!(
            Mode::Der.decode(der.as_ref(), InvalidityDate::take_from)
                .unwrap(),
            date
        );
    }

    #[test]
    fn distribution_points() {
        let full = DistributionPoint::new(
            GeneralNames::from(
                GeneralName::Uri("http://crl.example.com/ca.crl".into())
            ).into()
        );
        let mut relative = DistributionPoint::new(
            DistributionPointName::RelativeToIssuer(Rdn::new(Ava::new(
                oid::to_owned(&oid::AT_COMMON_NAME),
                AttributeValue::printable("CRL1").unwrap()
            )))
        );
        let mut reasons = ReasonFlags::new();
        reasons.set_key_compromise(true);
        reasons.set_ca_compromise(true);
        relative.set_reasons(Some(reasons));

        let points = CrlDistributionPoints::new(vec![full, relative]);
        let der = points.encode_value().unwrap();
        let decoded = Mode::Der.decode(
            der.as_ref(), CrlDistributionPoints::take_from
        ).unwrap();
        assert_eq!(decoded, points);

        let mut iter = decoded.iter();
        assert!(matches!(
            iter.next().unwrap().name(),
            Some(DistributionPointName::FullName(_))
        ));
        let second = iter.next().unwrap();
        assert!(matches!(
            second.name(),
            Some(DistributionPointName::RelativeToIssuer(_))
        ));
        let reasons = second.reasons().unwrap();
        assert!(reasons.key_compromise());
        assert!(reasons.ca_compromise());
        assert!(!reasons.superseded());
    }

    #[test]
    fn distribution_point_encoding() {
        let point = DistributionPoint::new(
            GeneralNames::from(GeneralName::Uri("http://x".into())).into()
        );
        let der = CrlDistributionPoints::from(point).encode_value().unwrap();
        assert_eq!(
            der.as_ref(),
            b"\x30\x10\x30\x0e\xa0\x0c\xa0\x0a\x86\x08http://x"
        );
    }

    #[test]
    fn reject_empty_point() {
        assert!(
            Mode::Der.decode(
                b"\x30\x02\x30\x00".as_ref(),
                CrlDistributionPoints::take_from
            ).is_err()
        );
        assert!(
            CrlDistributionPoints::from(
                DistributionPoint::default()
            ).encode_value().is_err()
        );
        // Unknown choice inside the explicit tag.
        assert!(
            Mode::Der.decode(
                b"\x30\x08\x30\x06\xa0\x04\xa2\x02\x30\x00".as_ref(),
                CrlDistributionPoints::take_from
            ).is_err()
        );
    }
}

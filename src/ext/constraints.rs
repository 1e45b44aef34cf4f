//! Extensions constraining the use of certificates.

use bcder::{decode, encode, Tag};
use bcder::decode::DecodeError;
use bcder::encode::PrimitiveContent;
use bytes::Bytes;
use crate::error::Error;
use super::capture;
use super::general::GeneralName;


//------------ BasicConstraints ----------------------------------------------

/// The basic constraints extension.
///
/// ```text
/// BasicConstraints ::= SEQUENCE {
///      cA                      BOOLEAN DEFAULT FALSE,
///      pathLenConstraint       INTEGER (0..MAX) OPTIONAL }
/// ```
///
/// A path length only has meaning for CA certificates. If the extension
/// isn’t for a CA, an encoded path length is accepted but ignored and
/// none is encoded.
#[derive(Clone, Copy, Debug)]
pub struct BasicConstraints {
    ca: bool,
    path_len: Option<u64>,
}

impl BasicConstraints {
    pub fn new(ca: bool, path_len: Option<u64>) -> Self {
        BasicConstraints { ca, path_len }
    }

    pub fn is_ca(&self) -> bool {
        self.ca
    }

    pub fn set_ca(&mut self, ca: bool) {
        self.ca = ca
    }

    /// Returns the path length constraint.
    ///
    /// This is always `None` if the extension is not for a CA.
    pub fn path_len(&self) -> Option<u64> {
        if self.ca {
            self.path_len
        }
        else {
            None
        }
    }

    pub fn set_path_len(&mut self, path_len: Option<u64>) {
        self.path_len = path_len
    }

    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_sequence(|cons| {
            Ok(BasicConstraints {
                ca: cons.take_opt_bool()?.unwrap_or(false),
                path_len: cons.take_opt_u64()?,
            })
        })
    }

    pub fn encode_ref(&self) -> impl encode::Values {
        encode::sequence((
            if self.ca { Some(true.encode()) } else { None },
            self.path_len().map(|len| len.encode()),
        ))
    }

    pub fn encode_value(&self) -> Result<Bytes, Error> {
        Ok(capture(self.encode_ref()))
    }
}

impl PartialEq for BasicConstraints {
    fn eq(&self, other: &Self) -> bool {
        self.ca == other.ca && self.path_len() == other.path_len()
    }
}

impl Eq for BasicConstraints { }


//------------ NameConstraints -----------------------------------------------

/// The name constraints extension.
///
/// ```text
/// NameConstraints ::= SEQUENCE {
///      permittedSubtrees       [0]     GeneralSubtrees OPTIONAL,
///      excludedSubtrees        [1]     GeneralSubtrees OPTIONAL }
/// ```
///
/// At least one of the two subtree lists needs to be present. An empty
/// list is treated as absent when encoding.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NameConstraints {
    permitted: Option<GeneralSubtrees>,
    excluded: Option<GeneralSubtrees>,
}

impl NameConstraints {
    /// Creates a new value.
    ///
    /// Fails if both lists are `None`.
    pub fn new(
        permitted: Option<GeneralSubtrees>,
        excluded: Option<GeneralSubtrees>,
    ) -> Result<Self, Error> {
        if permitted.is_none() && excluded.is_none() {
            return Err(Error::invalid_value(
                "name constraints need permitted or excluded subtrees"
            ))
        }
        Ok(NameConstraints { permitted, excluded })
    }

    pub fn permitted(&self) -> Option<&GeneralSubtrees> {
        self.permitted.as_ref()
    }

    pub fn set_permitted(&mut self, permitted: Option<GeneralSubtrees>) {
        self.permitted = permitted
    }

    pub fn excluded(&self) -> Option<&GeneralSubtrees> {
        self.excluded.as_ref()
    }

    pub fn set_excluded(&mut self, excluded: Option<GeneralSubtrees>) {
        self.excluded = excluded
    }

    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_sequence(|cons| {
            let permitted = cons.take_opt_constructed_if(
                Tag::CTX_0, GeneralSubtrees::from_constructed
            )?;
            let excluded = cons.take_opt_constructed_if(
                Tag::CTX_1, GeneralSubtrees::from_constructed
            )?;
            if permitted.is_none() && excluded.is_none() {
                return Err(cons.content_err("empty name constraints"))
            }
            Ok(NameConstraints { permitted, excluded })
        })
    }

    pub fn encode_ref(&self) -> impl encode::Values + '_ {
        encode::sequence((
            Self::present(&self.permitted).map(|subtrees| {
                subtrees.encode_ref_as(Tag::CTX_0)
            }),
            Self::present(&self.excluded).map(|subtrees| {
                subtrees.encode_ref_as(Tag::CTX_1)
            }),
        ))
    }

    pub fn encode_value(&self) -> Result<Bytes, Error> {
        if Self::present(&self.permitted).is_none()
            && Self::present(&self.excluded).is_none()
        {
            return Err(Error::incomplete(
                "NameConstraints", "permittedSubtrees or excludedSubtrees"
            ))
        }
        Ok(capture(self.encode_ref()))
    }

    fn present(
        subtrees: &Option<GeneralSubtrees>
    ) -> Option<&GeneralSubtrees> {
        subtrees.as_ref().filter(|subtrees| !subtrees.is_empty())
    }
}


//------------ GeneralSubtrees -----------------------------------------------

/// A list of subtrees for name constraints.
///
/// ```text
/// GeneralSubtrees ::= SEQUENCE SIZE (1..MAX) OF GeneralSubtree
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct GeneralSubtrees(Vec<GeneralSubtree>);

impl GeneralSubtrees {
    pub fn new(subtrees: Vec<GeneralSubtree>) -> Self {
        GeneralSubtrees(subtrees)
    }

    pub fn push(&mut self, subtree: GeneralSubtree) {
        self.0.push(subtree)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GeneralSubtree> + '_ {
        self.0.iter()
    }

    /// Decodes the content of the sequence.
    ///
    /// The sequence must contain at least one subtree.
    pub fn from_constructed<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        let mut res = Vec::new();
        while let Some(subtree) = GeneralSubtree::take_opt_from(cons)? {
            res.push(subtree)
        }
        if res.is_empty() {
            return Err(cons.content_err("empty general subtrees"))
        }
        Ok(GeneralSubtrees(res))
    }

    pub fn encode_ref_as(&self, tag: Tag) -> impl encode::Values + '_ {
        encode::sequence_as(tag,
            encode::iter(self.0.iter().map(GeneralSubtree::encode_ref))
        )
    }
}

impl From<Vec<GeneralSubtree>> for GeneralSubtrees {
    fn from(subtrees: Vec<GeneralSubtree>) -> Self {
        Self::new(subtrees)
    }
}


//------------ GeneralSubtree ------------------------------------------------

/// A single subtree for name constraints.
///
/// ```text
/// GeneralSubtree ::= SEQUENCE {
///      base                    GeneralName,
///      minimum         [0]     BaseDistance DEFAULT 0,
///      maximum         [1]     BaseDistance OPTIONAL }
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GeneralSubtree {
    base: GeneralName,
    minimum: u64,
    maximum: Option<u64>,
}

impl GeneralSubtree {
    pub fn new(base: GeneralName) -> Self {
        GeneralSubtree { base, minimum: 0, maximum: None }
    }

    pub fn with_distance(
        base: GeneralName, minimum: u64, maximum: Option<u64>
    ) -> Self {
        GeneralSubtree { base, minimum, maximum }
    }

    pub fn base(&self) -> &GeneralName {
        &self.base
    }

    pub fn minimum(&self) -> u64 {
        self.minimum
    }

    pub fn maximum(&self) -> Option<u64> {
        self.maximum
    }

    pub fn take_opt_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Option<Self>, DecodeError<S::Error>> {
        cons.take_opt_sequence(|cons| {
            Ok(GeneralSubtree {
                base: GeneralName::take_from(cons)?,
                minimum: cons.take_opt_primitive_if(
                    Tag::CTX_0, |prim| prim.to_u64()
                )?.unwrap_or(0),
                maximum: cons.take_opt_primitive_if(
                    Tag::CTX_1, |prim| prim.to_u64()
                )?,
            })
        })
    }

    pub fn encode_ref(&self) -> impl encode::Values + '_ {
        encode::sequence((
            self.base.encode_ref(),
            if self.minimum != 0 {
                Some(self.minimum.encode_as(Tag::CTX_0))
            }
            else {
                None
            },
            self.maximum.map(|max| max.encode_as(Tag::CTX_1)),
        ))
    }
}

impl From<GeneralName> for GeneralSubtree {
    fn from(base: GeneralName) -> Self {
        Self::new(base)
    }
}


//------------ PolicyConstraints ---------------------------------------------

/// The policy constraints extension.
///
/// ```text
/// PolicyConstraints ::= SEQUENCE {
///      requireExplicitPolicy           [0] SkipCerts OPTIONAL,
///      inhibitPolicyMapping            [1] SkipCerts OPTIONAL }
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PolicyConstraints {
    require_explicit_policy: Option<u64>,
    inhibit_policy_mapping: Option<u64>,
}

impl PolicyConstraints {
    /// Creates a new value.
    ///
    /// Fails if both values are `None`.
    pub fn new(
        require_explicit_policy: Option<u64>,
        inhibit_policy_mapping: Option<u64>,
    ) -> Result<Self, Error> {
        if require_explicit_policy.is_none()
            && inhibit_policy_mapping.is_none()
        {
            return Err(Error::invalid_value(
                "policy constraints need at least one field"
            ))
        }
        Ok(PolicyConstraints {
            require_explicit_policy, inhibit_policy_mapping
        })
    }

    pub fn require_explicit_policy(&self) -> Option<u64> {
        self.require_explicit_policy
    }

    pub fn set_require_explicit_policy(&mut self, skip: Option<u64>) {
        self.require_explicit_policy = skip
    }

    pub fn inhibit_policy_mapping(&self) -> Option<u64> {
        self.inhibit_policy_mapping
    }

    pub fn set_inhibit_policy_mapping(&mut self, skip: Option<u64>) {
        self.inhibit_policy_mapping = skip
    }

    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_sequence(|cons| {
            let require_explicit_policy = cons.take_opt_primitive_if(
                Tag::CTX_0, |prim| prim.to_u64()
            )?;
            let inhibit_policy_mapping = cons.take_opt_primitive_if(
                Tag::CTX_1, |prim| prim.to_u64()
            )?;
            if require_explicit_policy.is_none()
                && inhibit_policy_mapping.is_none()
            {
                return Err(cons.content_err("empty policy constraints"))
            }
            Ok(PolicyConstraints {
                require_explicit_policy, inhibit_policy_mapping
            })
        })
    }

    pub fn encode_ref(&self) -> impl encode::Values {
        encode::sequence((
            self.require_explicit_policy.map(|skip| {
                skip.encode_as(Tag::CTX_0)
            }),
            self.inhibit_policy_mapping.map(|skip| {
                skip.encode_as(Tag::CTX_1)
            }),
        ))
    }

    pub fn encode_value(&self) -> Result<Bytes, Error> {
        if self.require_explicit_policy.is_none()
            && self.inhibit_policy_mapping.is_none()
        {
            return Err(Error::incomplete(
                "PolicyConstraints",
                "requireExplicitPolicy or inhibitPolicyMapping"
            ))
        }
        Ok(capture(self.encode_ref()))
    }
}


//------------ InhibitAnyPolicy ----------------------------------------------

/// The inhibit any-policy extension.
///
/// ```text
/// InhibitAnyPolicy ::= SkipCerts
///
/// SkipCerts ::= INTEGER (0..MAX)
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct InhibitAnyPolicy(u64);

impl InhibitAnyPolicy {
    pub fn new(skip_certs: u64) -> Self {
        InhibitAnyPolicy(skip_certs)
    }

    pub fn skip_certs(self) -> u64 {
        self.0
    }

    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_u64().map(InhibitAnyPolicy)
    }

    pub fn encode_value(&self) -> Result<Bytes, Error> {
        Ok(capture(self.0.encode()))
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use bcder::Mode;
    use crate::error::ErrorKind;

    fn decode_bc(data: &[u8]) -> BasicConstraints {
        Mode::Der.decode(data, BasicConstraints::take_from).unwrap()
    }

    #[test]
    fn basic_constraints() {
        let bc = decode_bc(b"\x30\x00");
        assert!(!bc.is_ca());
        assert_eq!(bc.path_len(), None);

        let bc = decode_bc(b"\x30\x06\x01\x01\xff\x02\x01\x05");
        assert!(bc.is_ca());
        assert_eq!(bc.path_len(), Some(5));
        assert_eq!(
            bc.encode_value().unwrap().as_ref(),
            b"\x30\x06\x01\x01\xff\x02\x01\x05"
        );

        // A path length without cA is ignored.
        let bc = decode_bc(b"\x30\x03\x02\x01\x05");
        assert!(!bc.is_ca());
        assert_eq!(bc.path_len(), None);
        assert_eq!(bc.encode_value().unwrap().as_ref(), b"\x30\x00");

        let bc = BasicConstraints::new(false, Some(5));
        assert_eq!(bc.path_len(), None);
        assert_eq!(bc, BasicConstraints::new(false, None));
        assert_eq!(bc.encode_value().unwrap().as_ref(), b"\x30\x00");

        let bc = BasicConstraints::new(true, None);
        assert_eq!(
            bc.encode_value().unwrap().as_ref(), b"\x30\x03\x01\x01\xff"
        );
    }

    #[test]
    fn name_constraints() {
        assert_eq!(
            NameConstraints::new(None, None).unwrap_err().kind(),
            ErrorKind::InvalidValue
        );

        let nc = NameConstraints::new(
            Some(vec![
                GeneralName::DnsName(".example.com".into()).into(),
                GeneralSubtree::with_distance(
                    GeneralName::ip_subnet("10.0.0.0/8").unwrap(), 1, Some(2)
                ),
            ].into()),
            Some(GeneralSubtrees::default()),
        ).unwrap();
        let der = nc.encode_value().unwrap();
        assert_eq!(
            der.as_ref(),
            b"\x30\x24\xa0\x22\
              \x30\x0e\x82\x0c.example.com\
              \x30\x10\x87\x08\x0a\x00\x00\x00\xff\x00\x00\x00\
                      \x80\x01\x01\x81\x01\x02"
        );
        let decoded = Mode::Der.decode(
            der.as_ref(), NameConstraints::take_from
        ).unwrap();
        assert_eq!(decoded.permitted(), nc.permitted());
        assert!(decoded.excluded().is_none());

        let mut nc = nc;
        nc.set_permitted(Some(GeneralSubtrees::default()));
        assert_eq!(
            nc.encode_value().unwrap_err().kind(),
            ErrorKind::IncompleteExtension
        );

        assert!(
            Mode::Der.decode(
                b"\x30\x00".as_ref(), NameConstraints::take_from
            ).is_err()
        );
    }

    #[test]
    fn name_constraints_empty_subtrees() {
        // An empty permittedSubtrees list.
        assert!(
            Mode::Der.decode(
                b"\x30\x02\xa0\x00".as_ref(), NameConstraints::take_from
            ).is_err()
        );
        // An empty excludedSubtrees next to a valid permittedSubtrees.
        assert!(
            Mode::Der.decode(
                b"\x30\x13\xa0\x0f\x30\x0d\x82\x0bexample.com\xa1\x00"
                    .as_ref(),
                NameConstraints::take_from
            ).is_err()
        );
    }

    #[test]
    fn policy_constraints() {
        let pc = PolicyConstraints::new(Some(0), None).unwrap();
        assert_eq!(
            pc.encode_value().unwrap().as_ref(), b"\x30\x03\x80\x01\x00"
        );
        assert_eq!(
            Mode::Der.decode(
                b"\x30\x03\x81\x01\x02".as_ref(), PolicyConstraints::take_from
            ).unwrap().inhibit_policy_mapping(),
            Some(2)
        );
        assert!(PolicyConstraints::new(None, None).is_err());
        let mut pc = pc;
        pc.set_require_explicit_policy(None);
        assert_eq!(
            pc.encode_value().unwrap_err().kind(),
            ErrorKind::IncompleteExtension
        );
    }

    #[test]
    fn inhibit_any_policy() {
        let iap = Mode::Der.decode(
            b"\x02\x01\x03".as_ref(), InhibitAnyPolicy::take_from
        ).unwrap();
        assert_eq!(iap.skip_certs(), 3);
        assert_eq!(iap.encode_value().unwrap().as_ref(), b"\x02\x01\x03");
    }
}

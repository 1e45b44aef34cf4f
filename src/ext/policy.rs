//! Certificate policy extensions.

use bcder::{decode, encode, Oid};
use bcder::decode::DecodeError;
use bcder::encode::PrimitiveContent;
use bytes::Bytes;
use crate::error::Error;
use crate::x509::DerData;
use super::capture;


//------------ CertificatePolicies -------------------------------------------

/// The certificate policies extension.
///
/// ```text
/// certificatePolicies ::= SEQUENCE SIZE (1..MAX) OF PolicyInformation
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CertificatePolicies(Vec<PolicyInformation>);

impl CertificatePolicies {
    pub fn new(policies: Vec<PolicyInformation>) -> Self {
        CertificatePolicies(policies)
    }

    pub fn push(&mut self, policy: PolicyInformation) {
        self.0.push(policy)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PolicyInformation> + '_ {
        self.0.iter()
    }

    /// Returns the information for the given policy if present.
    pub fn get<T: AsRef<[u8]>>(
        &self, policy_id: &Oid<T>
    ) -> Option<&PolicyInformation> {
        self.0.iter().find(|item| item.policy_id() == policy_id)
    }

    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_sequence(|cons| {
            let mut res = Vec::new();
            while let Some(item) = PolicyInformation::take_opt_from(cons)? {
                res.push(item)
            }
            if res.is_empty() {
                return Err(cons.content_err("empty certificate policies"))
            }
            Ok(CertificatePolicies(res))
        })
    }

    pub fn encode_ref(&self) -> impl encode::Values + '_ {
        encode::sequence(
            encode::iter(self.0.iter().map(PolicyInformation::encode_ref))
        )
    }

    pub fn encode_value(&self) -> Result<Bytes, Error> {
        if self.0.is_empty() {
            return Err(Error::incomplete(
                "CertificatePolicies", "PolicyInformation"
            ))
        }
        Ok(capture(self.encode_ref()))
    }
}


//------------ PolicyInformation ---------------------------------------------

/// A single policy.
///
/// ```text
/// PolicyInformation ::= SEQUENCE {
///      policyIdentifier   CertPolicyId,
///      policyQualifiers   SEQUENCE SIZE (1..MAX) OF
///                              PolicyQualifierInfo OPTIONAL }
/// ```
///
/// The qualifiers are kept in encoded form. If present, they are the
/// complete encoding of the `SEQUENCE OF` value.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PolicyInformation {
    policy_id: Oid,
    qualifiers: Option<DerData>,
}

impl PolicyInformation {
    pub fn new(policy_id: Oid) -> Self {
        PolicyInformation { policy_id, qualifiers: None }
    }

    pub fn with_qualifiers(
        policy_id: Oid, qualifiers: DerData
    ) -> Self {
        PolicyInformation { policy_id, qualifiers: Some(qualifiers) }
    }

    pub fn policy_id(&self) -> &Oid {
        &self.policy_id
    }

    pub fn qualifiers(&self) -> Option<&DerData> {
        self.qualifiers.as_ref()
    }

    pub fn take_opt_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Option<Self>, DecodeError<S::Error>> {
        cons.take_opt_sequence(|cons| {
            let policy_id = Oid::take_from(cons)?;
            let qualifiers = cons.capture(|cons| {
                cons.take_opt_sequence(|cons| cons.skip_all())?;
                Ok(())
            })?.into_bytes();
            Ok(PolicyInformation {
                policy_id,
                qualifiers: if qualifiers.is_empty() {
                    None
                }
                else {
                    Some(DerData::new(qualifiers))
                }
            })
        })
    }

    pub fn encode_ref(&self) -> impl encode::Values + '_ {
        encode::sequence((
            self.policy_id.encode_ref(),
            self.qualifiers.as_ref(),
        ))
    }
}


//------------ PolicyMappings ------------------------------------------------

/// The policy mappings extension.
///
/// ```text
/// PolicyMappings ::= SEQUENCE SIZE (1..MAX) OF SEQUENCE {
///      issuerDomainPolicy      CertPolicyId,
///      subjectDomainPolicy     CertPolicyId }
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PolicyMappings(Vec<PolicyMapping>);

impl PolicyMappings {
    pub fn new(mappings: Vec<PolicyMapping>) -> Self {
        PolicyMappings(mappings)
    }

    pub fn push(&mut self, mapping: PolicyMapping) {
        self.0.push(mapping)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PolicyMapping> + '_ {
        self.0.iter()
    }

    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_sequence(|cons| {
            let mut res = Vec::new();
            while let Some(item) = PolicyMapping::take_opt_from(cons)? {
                res.push(item)
            }
            if res.is_empty() {
                return Err(cons.content_err("empty policy mappings"))
            }
            Ok(PolicyMappings(res))
        })
    }

    pub fn encode_ref(&self) -> impl encode::Values + '_ {
        encode::sequence(
            encode::iter(self.0.iter().map(PolicyMapping::encode_ref))
        )
    }

    pub fn encode_value(&self) -> Result<Bytes, Error> {
        if self.0.is_empty() {
            return Err(Error::incomplete("PolicyMappings", "mapping"))
        }
        Ok(capture(self.encode_ref()))
    }
}


//------------ PolicyMapping -------------------------------------------------

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct PolicyMapping {
    issuer_domain: Oid,
    subject_domain: Oid,
}

impl PolicyMapping {
    pub fn new(
        issuer_domain: Oid, subject_domain: Oid
    ) -> Self {
        PolicyMapping { issuer_domain, subject_domain }
    }

    pub fn issuer_domain(&self) -> &Oid {
        &self.issuer_domain
    }

    pub fn subject_domain(&self) -> &Oid {
        &self.subject_domain
    }

    pub fn take_opt_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Option<Self>, DecodeError<S::Error>> {
        cons.take_opt_sequence(|cons| {
            Ok(PolicyMapping {
                issuer_domain: Oid::take_from(cons)?,
                subject_domain: Oid::take_from(cons)?,
            })
        })
    }

    pub fn encode_ref(&self) -> impl encode::Values + '_ {
        encode::sequence((
            self.issuer_domain.encode_ref(),
            self.subject_domain.encode_ref(),
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
    fn certificate_policies() {
        // anyPolicy with a CPS pointer qualifier.
        let qualifiers = Bytes::from_static(
            b"\x30\x17\x30\x15\x06\x08\x2b\x06\x01\x05\x05\x07\x02\x01\
              \x16\x09https://x"
        );
        let policies = CertificatePolicies::new(vec![
            PolicyInformation::with_qualifiers(
                oid::to_owned(&oid::ANY_POLICY),
                DerData::new(qualifiers.clone())
            ),
            PolicyInformation::new("1.2.3.4".parse().unwrap()),
        ]);
        let der = policies.encode_value().unwrap();
        let decoded = Mode::Der.decode(
            der.as_ref(), CertificatePolicies::take_from
        ).unwrap();
        assert_eq!(decoded, policies);
        let any = decoded.get(&oid::ANY_POLICY).unwrap();
        assert_eq!(any.qualifiers().unwrap().as_slice(), qualifiers.as_ref());
        assert!(
            decoded.get(&"1.2.3.4".parse::<Oid>().unwrap()).unwrap()
                .qualifiers().is_none()
        );
    }

    #[test]
    fn empty_policies() {
        assert!(
            Mode::Der.decode(
                b"\x30\x00".as_ref(), CertificatePolicies::take_from
            ).is_err()
        );
        assert!(CertificatePolicies::default().encode_value().is_err());
    }

    #[test]
    fn policy_mappings() {
        let mappings = PolicyMappings::new(vec![
            PolicyMapping::new(
                "1.2.3".parse().unwrap(), "1.2.4".parse().unwrap()
            )
        ]);
        let der = mappings.encode_value().unwrap();
        assert_eq!(
            der.as_ref(),
            b"\x30\x0c\x30\x0a\x06\x02\x2a\x03\x06\x02\x2a\x04"
        );
        assert_eq!(
            Mode::Der.decode(der.as_ref(), PolicyMappings::take_from)
                .unwrap(),
            mappings
        );
    }
}

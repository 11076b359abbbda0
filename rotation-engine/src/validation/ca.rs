use crate::model::{CaField, ClusterMember, LeafField, Role};
use crate::providers::PathChecker;

use super::{missing_path, Diagnostic, Finding, PropagationGap};

/// Checks that a rotated CA comes with a new leaf certificate on every
/// member, unless forced.
pub struct CaValidator<'a, P: ?Sized> {
    checker: &'a P,
    force: bool,
}

impl<'a, P: PathChecker + ?Sized> CaValidator<'a, P> {
    pub fn new(checker: &'a P, force: bool) -> Self {
        Self { checker, force }
    }

    /// `members` is usually the role's own member list. The database CA is
    /// also checked against the manager members' postgresql client certs.
    pub fn validate<M: ClusterMember>(
        &self,
        ca_path: &str,
        role: Role,
        ca_field: CaField,
        leaf_field: LeafField,
        members: &[M],
    ) -> Vec<Finding> {
        if ca_path.is_empty() {
            return Vec::new();
        }
        if let Some(diagnostic) = missing_path(self.checker, ca_path) {
            return vec![Finding::Blocking(diagnostic)];
        }

        let propagated = members.iter().all(|member| !member.leaf(leaf_field).is_empty());
        if propagated {
            return Vec::new();
        }

        let gap = PropagationGap {
            role,
            ca_field,
            leaf_field,
        };
        vec![propagation_finding(gap, self.force)]
    }
}

/// Force policy for the propagation rule.
pub fn propagation_finding(gap: PropagationGap, force: bool) -> Finding {
    if force {
        Finding::Informational(gap)
    } else {
        Finding::Blocking(Diagnostic::CaNotPropagated(gap))
    }
}

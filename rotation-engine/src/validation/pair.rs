use crate::model::{ClusterMember, LeafField};
use crate::providers::PathChecker;

use super::{missing_path, Diagnostic};

/// Checks one cert/key slot of a node: both-or-neither, and every set path
/// must exist.
pub struct PairValidator<'a, P: ?Sized> {
    checker: &'a P,
}

impl<'a, P: PathChecker + ?Sized> PairValidator<'a, P> {
    pub fn new(checker: &'a P) -> Self {
        Self { checker }
    }

    /// The pairing rule and both existence checks always run; findings are
    /// returned in that order.
    pub fn validate<M: ClusterMember + ?Sized>(
        &self,
        node: &M,
        cert_field: LeafField,
        key_field: LeafField,
    ) -> Vec<Diagnostic> {
        let cert_path = node.leaf(cert_field);
        let key_path = node.leaf(key_field);
        let mut diagnostics = Vec::new();

        if cert_path.is_empty() != key_path.is_empty() {
            diagnostics.push(Diagnostic::UnpairedCertificate {
                host_ip: node.host_ip().to_string(),
                cert_field,
                key_field,
            });
        }
        diagnostics.extend(missing_path(self.checker, cert_path));
        diagnostics.extend(missing_path(self.checker, key_path));
        diagnostics
    }
}

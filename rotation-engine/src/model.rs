//! Typed certificate-rotation configuration
//!
//! The document has three role sections. Each section lists one entry per
//! cluster node plus the CA fields of that role. Every leaf value is a local
//! filesystem path, and the empty string means "unset".

use std::fmt;

use serde::{Deserialize, Serialize};

/// Cluster role of a configuration section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Manager,
    Database,
    Broker,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Manager, Role::Database, Role::Broker];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Manager => "manager",
            Role::Database => "database",
            Role::Broker => "broker",
        }
    }

    /// Section name used by configuration files written before the role rename
    pub fn legacy_name(&self) -> Option<&'static str> {
        match self {
            Role::Manager => None,
            Role::Database => Some("postgresql_server"),
            Role::Broker => Some("rabbitmq"),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Per-node certificate or key field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeafField {
    Cert,
    Key,
    InternalCert,
    InternalKey,
    ExternalCert,
    ExternalKey,
    PostgresqlClientCert,
    PostgresqlClientKey,
}

impl LeafField {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeafField::Cert => "new_cert",
            LeafField::Key => "new_key",
            LeafField::InternalCert => "new_internal_cert",
            LeafField::InternalKey => "new_internal_key",
            LeafField::ExternalCert => "new_external_cert",
            LeafField::ExternalKey => "new_external_key",
            LeafField::PostgresqlClientCert => "new_postgresql_client_cert",
            LeafField::PostgresqlClientKey => "new_postgresql_client_key",
        }
    }
}

impl fmt::Display for LeafField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role-level CA certificate field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaField {
    CaCert,
    ExternalCaCert,
    LdapCaCert,
}

impl CaField {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaField::CaCert => "new_ca_cert",
            CaField::ExternalCaCert => "new_external_ca_cert",
            CaField::LdapCaCert => "new_ldap_ca_cert",
        }
    }
}

impl fmt::Display for CaField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A certificate field and the key field it must be paired with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CertKeyPair {
    pub cert: LeafField,
    pub key: LeafField,
}

impl CertKeyPair {
    pub const fn new(cert: LeafField, key: LeafField) -> Self {
        Self { cert, key }
    }
}

/// A node entry of some role section.
pub trait ClusterMember {
    /// Cert/key slots carried by this kind of node, in validation order.
    const PAIRS: &'static [CertKeyPair];

    fn host_ip(&self) -> &str;

    /// Value of `field`; fields this node kind does not carry read as unset.
    fn leaf(&self, field: LeafField) -> &str;
}

/// Node of the database or broker tier
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceNode {
    #[serde(default, deserialize_with = "de::scalar_string")]
    pub host_ip: String,
    #[serde(default, deserialize_with = "de::scalar_string")]
    pub new_cert: String,
    #[serde(default, deserialize_with = "de::scalar_string")]
    pub new_key: String,
}

impl ServiceNode {
    pub fn empty(host_ip: impl Into<String>) -> Self {
        Self {
            host_ip: host_ip.into(),
            ..Self::default()
        }
    }
}

impl ClusterMember for ServiceNode {
    const PAIRS: &'static [CertKeyPair] = &[CertKeyPair::new(LeafField::Cert, LeafField::Key)];

    fn host_ip(&self) -> &str {
        &self.host_ip
    }

    fn leaf(&self, field: LeafField) -> &str {
        match field {
            LeafField::Cert => &self.new_cert,
            LeafField::Key => &self.new_key,
            _ => "",
        }
    }
}

/// Node of the management tier
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerNode {
    #[serde(default, deserialize_with = "de::scalar_string")]
    pub host_ip: String,
    #[serde(default, deserialize_with = "de::scalar_string")]
    pub new_internal_cert: String,
    #[serde(default, deserialize_with = "de::scalar_string")]
    pub new_internal_key: String,
    #[serde(default, deserialize_with = "de::scalar_string")]
    pub new_external_cert: String,
    #[serde(default, deserialize_with = "de::scalar_string")]
    pub new_external_key: String,
    #[serde(default, deserialize_with = "de::scalar_string")]
    pub new_postgresql_client_cert: String,
    #[serde(default, deserialize_with = "de::scalar_string")]
    pub new_postgresql_client_key: String,
}

impl ManagerNode {
    pub fn empty(host_ip: impl Into<String>) -> Self {
        Self {
            host_ip: host_ip.into(),
            ..Self::default()
        }
    }
}

impl ClusterMember for ManagerNode {
    const PAIRS: &'static [CertKeyPair] = &[
        CertKeyPair::new(LeafField::InternalCert, LeafField::InternalKey),
        CertKeyPair::new(LeafField::ExternalCert, LeafField::ExternalKey),
        CertKeyPair::new(LeafField::PostgresqlClientCert, LeafField::PostgresqlClientKey),
    ];

    fn host_ip(&self) -> &str {
        &self.host_ip
    }

    fn leaf(&self, field: LeafField) -> &str {
        match field {
            LeafField::InternalCert => &self.new_internal_cert,
            LeafField::InternalKey => &self.new_internal_key,
            LeafField::ExternalCert => &self.new_external_cert,
            LeafField::ExternalKey => &self.new_external_key,
            LeafField::PostgresqlClientCert => &self.new_postgresql_client_cert,
            LeafField::PostgresqlClientKey => &self.new_postgresql_client_key,
            LeafField::Cert | LeafField::Key => "",
        }
    }
}

/// `database` or `broker` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRole {
    #[serde(default, alias = "cluster_members", deserialize_with = "de::seq_or_empty")]
    pub members: Vec<ServiceNode>,
    #[serde(default, deserialize_with = "de::scalar_string")]
    pub new_ca_cert: String,
}

impl ServiceRole {
    pub fn ca(&self, field: CaField) -> &str {
        match field {
            CaField::CaCert => &self.new_ca_cert,
            CaField::ExternalCaCert | CaField::LdapCaCert => "",
        }
    }
}

/// `manager` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerRole {
    #[serde(default, alias = "cluster_members", deserialize_with = "de::seq_or_empty")]
    pub members: Vec<ManagerNode>,
    #[serde(default, deserialize_with = "de::scalar_string")]
    pub new_ca_cert: String,
    #[serde(default, deserialize_with = "de::scalar_string")]
    pub new_external_ca_cert: String,
    #[serde(default, deserialize_with = "de::scalar_string")]
    pub new_ldap_ca_cert: String,
}

impl ManagerRole {
    pub fn ca(&self, field: CaField) -> &str {
        match field {
            CaField::CaCert => &self.new_ca_cert,
            CaField::ExternalCaCert => &self.new_external_ca_cert,
            CaField::LdapCaCert => &self.new_ldap_ca_cert,
        }
    }
}

/// Root of the certificate replacement configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterRotationConfig {
    pub manager: ManagerRole,
    #[serde(alias = "postgresql_server")]
    pub database: ServiceRole,
    #[serde(alias = "rabbitmq")]
    pub broker: ServiceRole,
}

impl ClusterRotationConfig {
    pub fn member_count(&self, role: Role) -> usize {
        match role {
            Role::Manager => self.manager.members.len(),
            Role::Database => self.database.members.len(),
            Role::Broker => self.broker.members.len(),
        }
    }

    /// Every non-empty CA path, with the role and field it belongs to
    pub fn ca_paths(&self) -> Vec<(Role, CaField, &str)> {
        let candidates = [
            (Role::Manager, CaField::CaCert, self.manager.ca(CaField::CaCert)),
            (Role::Manager, CaField::ExternalCaCert, self.manager.ca(CaField::ExternalCaCert)),
            (Role::Manager, CaField::LdapCaCert, self.manager.ca(CaField::LdapCaCert)),
            (Role::Database, CaField::CaCert, self.database.ca(CaField::CaCert)),
            (Role::Broker, CaField::CaCert, self.broker.ca(CaField::CaCert)),
        ];
        candidates
            .into_iter()
            .filter(|(_, _, path)| !path.is_empty())
            .collect()
    }
}

/// Lenient field decoding: `null` and missing values read as unset, and
/// numeric or boolean scalars are stringified.
mod de {
    use serde::de::{Deserialize, Deserializer, Error};
    use serde_yaml::Value;

    pub(super) fn scalar_string<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<Value>::deserialize(deserializer)? {
            None | Some(Value::Null) => Ok(String::new()),
            Some(Value::String(value)) => Ok(value),
            Some(Value::Number(value)) => Ok(value.to_string()),
            Some(Value::Bool(value)) => Ok(value.to_string()),
            Some(other) => Err(D::Error::custom(format!(
                "expected a string value, found {other:?}"
            ))),
        }
    }

    pub(super) fn seq_or_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
    }
}

//! Minimal kubeconfig document model.
//!
//! Only the fields this tool emits or reads are modeled; field names follow
//! the kubeconfig wire format exactly, so the output loads in kubectl and
//! the bootstrap stub in the cluster-info ConfigMap parses back in.

use pkg_constants::names::KUBECONFIG_CONTEXT;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Kubeconfig {
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    pub kind: String,
    #[serde(default)]
    pub clusters: Vec<NamedCluster>,
    #[serde(default)]
    pub users: Vec<NamedUser>,
    #[serde(default)]
    pub contexts: Vec<NamedContext>,
    #[serde(rename = "current-context", default)]
    pub current_context: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedCluster {
    pub name: String,
    pub cluster: ClusterEntry,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterEntry {
    pub server: String,
    #[serde(
        rename = "certificate-authority-data",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub certificate_authority_data: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedUser {
    pub name: String,
    pub user: AuthInfo,
}

/// One auth entry: either a client certificate pair or a bearer token.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthInfo {
    #[serde(
        rename = "client-certificate-data",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub client_certificate_data: Option<String>,
    #[serde(
        rename = "client-key-data",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub client_key_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedContext {
    pub name: String,
    pub context: ContextEntry,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextEntry {
    pub cluster: String,
    pub user: String,
}

impl Kubeconfig {
    /// The minimal valid shape a client tool needs: one cluster, one auth
    /// entry keyed by the principal identity, one context set as current.
    fn minimal(server: &str, ca_data: &str, identity: &str, user: AuthInfo) -> Self {
        Kubeconfig {
            api_version: "v1".to_string(),
            kind: "Config".to_string(),
            clusters: vec![NamedCluster {
                name: KUBECONFIG_CONTEXT.to_string(),
                cluster: ClusterEntry {
                    server: server.to_string(),
                    certificate_authority_data: Some(ca_data.to_string()),
                },
            }],
            users: vec![NamedUser {
                name: identity.to_string(),
                user,
            }],
            contexts: vec![NamedContext {
                name: KUBECONFIG_CONTEXT.to_string(),
                context: ContextEntry {
                    cluster: KUBECONFIG_CONTEXT.to_string(),
                    user: identity.to_string(),
                },
            }],
            current_context: KUBECONFIG_CONTEXT.to_string(),
        }
    }

    /// Kubeconfig authenticating with an embedded client certificate pair.
    /// All `*_data` arguments are already base64-encoded.
    pub fn with_client_cert(
        server: &str,
        ca_data: &str,
        identity: &str,
        cert_data: String,
        key_data: String,
    ) -> Self {
        Self::minimal(
            server,
            ca_data,
            identity,
            AuthInfo {
                client_certificate_data: Some(cert_data),
                client_key_data: Some(key_data),
                token: None,
            },
        )
    }

    /// Kubeconfig authenticating with a bearer token.
    pub fn with_bearer_token(server: &str, ca_data: &str, identity: &str, token: String) -> Self {
        Self::minimal(
            server,
            ca_data,
            identity,
            AuthInfo {
                client_certificate_data: None,
                client_key_data: None,
                token: Some(token),
            },
        )
    }

    /// Server endpoint of the first cluster entry, if any.
    pub fn server(&self) -> Option<&str> {
        self.clusters.first().map(|c| c.cluster.server.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_cert_config_shape() {
        let config = Kubeconfig::with_client_cert(
            "https://10.0.0.1:6443",
            "Q0E=",
            "alice",
            "Q0VSVA==".to_string(),
            "S0VZ".to_string(),
        );
        assert_eq!(config.clusters.len(), 1);
        assert_eq!(config.users.len(), 1);
        assert_eq!(config.contexts.len(), 1);
        assert_eq!(config.current_context, "kubernetes");
        assert_eq!(config.contexts[0].context.user, "alice");
        assert_eq!(config.users[0].name, "alice");
        assert!(config.users[0].user.token.is_none());
        assert_eq!(config.server(), Some("https://10.0.0.1:6443"));
    }

    #[test]
    fn bearer_token_config_has_no_cert_material() {
        let config =
            Kubeconfig::with_bearer_token("https://10.0.0.1:6443", "Q0E=", "robot", "tok".into());
        let user = &config.users[0].user;
        assert_eq!(user.token.as_deref(), Some("tok"));
        assert!(user.client_certificate_data.is_none());
        assert!(user.client_key_data.is_none());
    }

    #[test]
    fn serializes_wire_field_names() {
        let config = Kubeconfig::with_client_cert(
            "https://example:6443",
            "Q0E=",
            "alice",
            "Q0VSVA==".to_string(),
            "S0VZ".to_string(),
        );
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(yaml.contains("apiVersion: v1"));
        assert!(yaml.contains("kind: Config"));
        assert!(yaml.contains("current-context: kubernetes"));
        assert!(yaml.contains("certificate-authority-data: Q0E="));
        assert!(yaml.contains("client-certificate-data: Q0VSVA=="));
        assert!(yaml.contains("client-key-data: S0VZ"));
        // Absent auth fields must not appear at all.
        assert!(!yaml.contains("token"));
    }

    #[test]
    fn parses_cluster_info_stub() {
        // Shape written by cluster bootstrap into kube-public/cluster-info.
        let stub = r#"
apiVersion: v1
kind: Config
clusters:
- name: ""
  cluster:
    server: https://192.168.1.10:6443
    certificate-authority-data: Q0E=
users: []
contexts: []
current-context: ""
preferences: {}
"#;
        let parsed: Kubeconfig = serde_yaml::from_str(stub).unwrap();
        assert_eq!(parsed.server(), Some("https://192.168.1.10:6443"));
        assert!(parsed.users.is_empty());
    }
}

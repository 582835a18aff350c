use pkg_cluster::admin::AdminContext;
use pkg_cluster::api::ClusterApi;
use pkg_constants::names::SYSTEM_NAMESPACE;
use pkg_types::descriptor::PrincipalDescriptor;
use pkg_types::kubeconfig::Kubeconfig;
use tracing::info;

use crate::error::CredentialError;
use crate::{encode, root_ca};

/// Certificate-based kubeconfig for a user principal: the cluster root CA
/// from kube-system, the API server endpoint from the administrator's
/// resolved context, and the client certificate pair embedded in the
/// descriptor.
pub(crate) async fn assemble_user(
    cluster: &dyn ClusterApi,
    desc: &PrincipalDescriptor,
    admin: &AdminContext,
) -> Result<Kubeconfig, CredentialError> {
    let (cert, key) = desc
        .credential_seed()
        .ok_or_else(|| CredentialError::MissingCredentialSeed(desc.name.clone()))?;

    let ca = root_ca(cluster, SYSTEM_NAMESPACE).await?;

    info!(
        "Assembling client-certificate kubeconfig for user {}",
        desc.name
    );
    Ok(Kubeconfig::with_client_cert(
        &admin.server,
        &encode(ca.as_bytes()),
        &desc.name,
        encode(cert.as_bytes()),
        encode(key.as_bytes()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pkg_cluster::fake::FakeCluster;
    use pkg_types::descriptor::PrincipalKind;

    fn admin() -> AdminContext {
        AdminContext {
            context_name: "kubernetes-admin@kubernetes".to_string(),
            server: "https://10.0.0.1:6443".to_string(),
        }
    }

    fn bob() -> PrincipalDescriptor {
        PrincipalDescriptor {
            name: "bob".to_string(),
            kind: PrincipalKind::User,
            namespaces: vec!["ns1".to_string()],
            roles: vec!["editor".to_string()],
            clusterroles: vec![],
            existing: false,
            clientcert: Some("CERTPEM".to_string()),
            clientkey: Some("KEYPEM".to_string()),
        }
    }

    #[tokio::test]
    async fn assembles_complete_user_kubeconfig() {
        let cluster = FakeCluster::new();
        cluster.add_config_map("kube-system", "kube-root-ca.crt", &[("ca.crt", "CAPEM")]);

        let config = assemble_user(&cluster, &bob(), &admin()).await.unwrap();

        assert_eq!(config.server(), Some("https://10.0.0.1:6443"));
        assert_eq!(
            config.clusters[0].cluster.certificate_authority_data.as_deref(),
            Some(encode(b"CAPEM").as_str())
        );
        assert_eq!(config.users[0].name, "bob");
        let user = &config.users[0].user;
        assert_eq!(
            user.client_certificate_data.as_deref(),
            Some(encode(b"CERTPEM").as_str())
        );
        assert_eq!(
            user.client_key_data.as_deref(),
            Some(encode(b"KEYPEM").as_str())
        );
        assert!(user.token.is_none(), "user auth must not carry a token");
        assert_eq!(config.current_context, "kubernetes");
    }

    #[tokio::test]
    async fn fails_without_root_ca_configmap() {
        let cluster = FakeCluster::new();
        let err = assemble_user(&cluster, &bob(), &admin()).await.unwrap_err();
        assert!(matches!(err, CredentialError::MissingConfigMap { .. }));
    }

    #[tokio::test]
    async fn fails_when_ca_key_is_absent() {
        let cluster = FakeCluster::new();
        cluster.add_config_map("kube-system", "kube-root-ca.crt", &[("other", "x")]);
        let err = assemble_user(&cluster, &bob(), &admin()).await.unwrap_err();
        assert!(matches!(err, CredentialError::MissingConfigMapKey { .. }));
    }

    #[tokio::test]
    async fn fails_without_credential_seed() {
        let cluster = FakeCluster::new();
        cluster.add_config_map("kube-system", "kube-root-ca.crt", &[("ca.crt", "CAPEM")]);
        let desc = PrincipalDescriptor {
            clientcert: None,
            clientkey: None,
            ..bob()
        };
        let err = assemble_user(&cluster, &desc, &admin()).await.unwrap_err();
        assert!(matches!(err, CredentialError::MissingCredentialSeed(_)));
    }
}

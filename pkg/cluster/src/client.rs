use std::path::Path;

use anyhow::Context as _;
use async_trait::async_trait;
use k8s_openapi::api::authentication::v1::{TokenRequest, TokenRequestSpec};
use k8s_openapi::api::core::v1::{ConfigMap, Namespace, Secret, ServiceAccount};
use k8s_openapi::api::rbac::v1::{ClusterRole, ClusterRoleBinding, Role, RoleBinding};
use kube::api::{Api, PostParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use tracing::info;

use crate::api::ClusterApi;
use crate::error::ClusterError;

/// Live cluster connection backed by a `kube` client built from the
/// administrator's kubeconfig.
#[derive(Clone)]
pub struct KubeCluster {
    client: Client,
}

impl KubeCluster {
    /// Connect using the administrator's kubeconfig file.
    pub async fn connect(path: &Path) -> anyhow::Result<Self> {
        let kubeconfig = Kubeconfig::read_from(path)
            .with_context(|| format!("error loading kubeconfig file {}", path.display()))?;
        let config = Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
            .await
            .context("kubeconfig has no usable context")?;
        let client =
            Client::try_from(config).context("unable to build the kubernetes client")?;
        info!("Connected using kubeconfig {}", path.display());
        Ok(Self { client })
    }
}

#[async_trait]
impl ClusterApi for KubeCluster {
    async fn get_namespace(&self, name: &str) -> Result<Option<Namespace>, ClusterError> {
        let api: Api<Namespace> = Api::all(self.client.clone());
        api.get_opt(name).await.map_err(Into::into)
    }

    async fn create_namespace(&self, namespace: &Namespace) -> Result<(), ClusterError> {
        let api: Api<Namespace> = Api::all(self.client.clone());
        api.create(&PostParams::default(), namespace)
            .await
            .map(|_| ())
            .map_err(Into::into)
    }

    async fn get_service_account(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<ServiceAccount>, ClusterError> {
        let api: Api<ServiceAccount> = Api::namespaced(self.client.clone(), namespace);
        api.get_opt(name).await.map_err(Into::into)
    }

    async fn create_service_account(
        &self,
        namespace: &str,
        account: &ServiceAccount,
    ) -> Result<(), ClusterError> {
        let api: Api<ServiceAccount> = Api::namespaced(self.client.clone(), namespace);
        api.create(&PostParams::default(), account)
            .await
            .map(|_| ())
            .map_err(Into::into)
    }

    async fn get_role(&self, namespace: &str, name: &str) -> Result<Option<Role>, ClusterError> {
        let api: Api<Role> = Api::namespaced(self.client.clone(), namespace);
        api.get_opt(name).await.map_err(Into::into)
    }

    async fn create_role(&self, namespace: &str, role: &Role) -> Result<(), ClusterError> {
        let api: Api<Role> = Api::namespaced(self.client.clone(), namespace);
        api.create(&PostParams::default(), role)
            .await
            .map(|_| ())
            .map_err(Into::into)
    }

    async fn get_role_binding(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<RoleBinding>, ClusterError> {
        let api: Api<RoleBinding> = Api::namespaced(self.client.clone(), namespace);
        api.get_opt(name).await.map_err(Into::into)
    }

    async fn create_role_binding(
        &self,
        namespace: &str,
        binding: &RoleBinding,
    ) -> Result<(), ClusterError> {
        let api: Api<RoleBinding> = Api::namespaced(self.client.clone(), namespace);
        api.create(&PostParams::default(), binding)
            .await
            .map(|_| ())
            .map_err(Into::into)
    }

    async fn get_cluster_role(&self, name: &str) -> Result<Option<ClusterRole>, ClusterError> {
        let api: Api<ClusterRole> = Api::all(self.client.clone());
        api.get_opt(name).await.map_err(Into::into)
    }

    async fn create_cluster_role(&self, role: &ClusterRole) -> Result<(), ClusterError> {
        let api: Api<ClusterRole> = Api::all(self.client.clone());
        api.create(&PostParams::default(), role)
            .await
            .map(|_| ())
            .map_err(Into::into)
    }

    async fn get_cluster_role_binding(
        &self,
        name: &str,
    ) -> Result<Option<ClusterRoleBinding>, ClusterError> {
        let api: Api<ClusterRoleBinding> = Api::all(self.client.clone());
        api.get_opt(name).await.map_err(Into::into)
    }

    async fn create_cluster_role_binding(
        &self,
        binding: &ClusterRoleBinding,
    ) -> Result<(), ClusterError> {
        let api: Api<ClusterRoleBinding> = Api::all(self.client.clone());
        api.create(&PostParams::default(), binding)
            .await
            .map(|_| ())
            .map_err(Into::into)
    }

    async fn get_secret(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<Secret>, ClusterError> {
        let api: Api<Secret> = Api::namespaced(self.client.clone(), namespace);
        api.get_opt(name).await.map_err(Into::into)
    }

    async fn get_config_map(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<ConfigMap>, ClusterError> {
        let api: Api<ConfigMap> = Api::namespaced(self.client.clone(), namespace);
        api.get_opt(name).await.map_err(Into::into)
    }

    async fn issue_token(
        &self,
        namespace: &str,
        name: &str,
        ttl_seconds: i64,
    ) -> Result<String, ClusterError> {
        let api: Api<ServiceAccount> = Api::namespaced(self.client.clone(), namespace);
        let request = TokenRequest {
            spec: TokenRequestSpec {
                expiration_seconds: Some(ttl_seconds),
                ..Default::default()
            },
            ..Default::default()
        };
        let issued = api
            .create_token_request(name, &PostParams::default(), &request)
            .await
            .map_err(ClusterError::from)?;
        Ok(issued.status.map(|status| status.token).unwrap_or_default())
    }
}

use async_trait::async_trait;
use k8s_openapi::api::core::v1::{ConfigMap, Namespace, Secret, ServiceAccount};
use k8s_openapi::api::rbac::v1::{ClusterRole, ClusterRoleBinding, Role, RoleBinding};

use crate::error::ClusterError;

/// Typed CRUD surface against one cluster.
///
/// Every read returns `Ok(None)` when the object does not exist — absence is
/// a signal, not an error. Implemented by [`KubeCluster`](crate::KubeCluster)
/// for live clusters and by the in-memory fake for tests.
#[async_trait]
pub trait ClusterApi: Send + Sync {
    async fn get_namespace(&self, name: &str) -> Result<Option<Namespace>, ClusterError>;
    async fn create_namespace(&self, namespace: &Namespace) -> Result<(), ClusterError>;

    async fn get_service_account(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<ServiceAccount>, ClusterError>;
    async fn create_service_account(
        &self,
        namespace: &str,
        account: &ServiceAccount,
    ) -> Result<(), ClusterError>;

    async fn get_role(&self, namespace: &str, name: &str) -> Result<Option<Role>, ClusterError>;
    async fn create_role(&self, namespace: &str, role: &Role) -> Result<(), ClusterError>;

    async fn get_role_binding(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<RoleBinding>, ClusterError>;
    async fn create_role_binding(
        &self,
        namespace: &str,
        binding: &RoleBinding,
    ) -> Result<(), ClusterError>;

    async fn get_cluster_role(&self, name: &str) -> Result<Option<ClusterRole>, ClusterError>;
    async fn create_cluster_role(&self, role: &ClusterRole) -> Result<(), ClusterError>;

    async fn get_cluster_role_binding(
        &self,
        name: &str,
    ) -> Result<Option<ClusterRoleBinding>, ClusterError>;
    async fn create_cluster_role_binding(
        &self,
        binding: &ClusterRoleBinding,
    ) -> Result<(), ClusterError>;

    async fn get_secret(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<Secret>, ClusterError>;
    async fn get_config_map(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<ConfigMap>, ClusterError>;

    /// Request a bounded-lifetime bearer token for a service account via the
    /// TokenRequest subresource. Returns an empty string when the API server
    /// answers without a token status.
    async fn issue_token(
        &self,
        namespace: &str,
        name: &str,
        ttl_seconds: i64,
    ) -> Result<String, ClusterError>;
}

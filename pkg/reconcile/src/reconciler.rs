use std::fmt;
use std::future::Future;

use pkg_cluster::api::ClusterApi;
use pkg_cluster::error::ClusterError;
use pkg_types::descriptor::{PrincipalDescriptor, PrincipalKind};
use tracing::{info, warn};

use crate::objects;

/// Per-object outcome counts from one reconcile pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileReport {
    pub created: usize,
    pub existing: usize,
    pub failed: usize,
}

impl ReconcileReport {
    fn tally(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Created => self.created += 1,
            Outcome::Existing => self.existing += 1,
            Outcome::Failed => self.failed += 1,
        }
    }
}

impl fmt::Display for ReconcileReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} created, {} already present, {} failed",
            self.created, self.existing, self.failed
        )
    }
}

enum Outcome {
    Created,
    Existing,
    Failed,
}

/// Drives the cluster's RBAC state toward a superset of what the descriptor
/// declares. Best-effort and re-runnable: a second pass over the same state
/// converges instead of erroring.
pub struct Reconciler<'a> {
    cluster: &'a dyn ClusterApi,
}

impl<'a> Reconciler<'a> {
    pub fn new(cluster: &'a dyn ClusterApi) -> Self {
        Self { cluster }
    }

    /// One pass over every declared object, per kind in dependency order:
    /// namespaces, service accounts, roles, role bindings, cluster roles,
    /// cluster role bindings. Per-object failures are logged and counted but
    /// never abort the pass.
    pub async fn run(&self, desc: &PrincipalDescriptor) -> ReconcileReport {
        let mut report = ReconcileReport::default();

        for ns in &desc.namespaces {
            let object = objects::namespace(ns);
            let outcome = self
                .ensure(
                    &format!("namespace {}", ns),
                    self.cluster.get_namespace(ns),
                    self.cluster.create_namespace(&object),
                )
                .await;
            report.tally(outcome);
        }

        if desc.kind == PrincipalKind::ServiceAccount {
            for ns in &desc.namespaces {
                let object = objects::service_account(ns, &desc.name);
                let outcome = self
                    .ensure(
                        &format!("serviceaccount {}/{}", ns, desc.name),
                        self.cluster.get_service_account(ns, &desc.name),
                        self.cluster.create_service_account(ns, &object),
                    )
                    .await;
                report.tally(outcome);
            }
        }

        for ns in &desc.namespaces {
            for role in &desc.roles {
                let object = objects::role(ns, role);
                let outcome = self
                    .ensure(
                        &format!("role {}/{}", ns, role),
                        self.cluster.get_role(ns, role),
                        self.cluster.create_role(ns, &object),
                    )
                    .await;
                report.tally(outcome);
            }
        }

        for ns in &desc.namespaces {
            for role in &desc.roles {
                let name = objects::role_binding_name(role);
                let object = objects::role_binding(ns, role, desc);
                let outcome = self
                    .ensure(
                        &format!("rolebinding {}/{}", ns, name),
                        self.cluster.get_role_binding(ns, &name),
                        self.cluster.create_role_binding(ns, &object),
                    )
                    .await;
                report.tally(outcome);
            }
        }

        for cluster_role in &desc.clusterroles {
            let object = objects::cluster_role(cluster_role);
            let outcome = self
                .ensure(
                    &format!("clusterrole {}", cluster_role),
                    self.cluster.get_cluster_role(cluster_role),
                    self.cluster.create_cluster_role(&object),
                )
                .await;
            report.tally(outcome);
        }

        for cluster_role in &desc.clusterroles {
            let name = objects::cluster_role_binding_name(cluster_role);
            let object = objects::cluster_role_binding(cluster_role, desc);
            let outcome = self
                .ensure(
                    &format!("clusterrolebinding {}", name),
                    self.cluster.get_cluster_role_binding(&name),
                    self.cluster.create_cluster_role_binding(&object),
                )
                .await;
            report.tally(outcome);
        }

        info!("Reconcile complete for {}: {}", desc.name, report);
        report
    }

    /// The check/create/log triplet shared by every object kind. Not-found
    /// on the read is the create trigger; any other read error is a failure
    /// and the create is NOT attempted. A create conflict means another
    /// writer got there first and counts as already present.
    async fn ensure<T>(
        &self,
        what: &str,
        get: impl Future<Output = Result<Option<T>, ClusterError>>,
        create: impl Future<Output = Result<(), ClusterError>>,
    ) -> Outcome {
        match get.await {
            Ok(Some(_)) => {
                info!("{} already present, skipping", what);
                Outcome::Existing
            }
            Ok(None) => match create.await {
                Ok(()) => {
                    info!("Created {}", what);
                    Outcome::Created
                }
                Err(err) if err.is_conflict() => {
                    info!("{} already present, skipping", what);
                    Outcome::Existing
                }
                Err(err) => {
                    warn!("Failed to create {}: {}", what, err);
                    Outcome::Failed
                }
            },
            Err(err) => {
                warn!("Failed to read {}: {}", what, err);
                Outcome::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pkg_cluster::fake::FakeCluster;

    fn user(name: &str, namespaces: &[&str], roles: &[&str], clusterroles: &[&str]) -> PrincipalDescriptor {
        PrincipalDescriptor {
            name: name.to_string(),
            kind: PrincipalKind::User,
            namespaces: namespaces.iter().map(|s| s.to_string()).collect(),
            roles: roles.iter().map(|s| s.to_string()).collect(),
            clusterroles: clusterroles.iter().map(|s| s.to_string()).collect(),
            existing: false,
            clientcert: Some("CERT".into()),
            clientkey: Some("KEY".into()),
        }
    }

    fn service_account(name: &str, namespaces: &[&str]) -> PrincipalDescriptor {
        PrincipalDescriptor {
            kind: PrincipalKind::ServiceAccount,
            clientcert: None,
            clientkey: None,
            ..user(name, namespaces, &[], &[])
        }
    }

    #[tokio::test]
    async fn creates_everything_for_new_user() {
        let cluster = FakeCluster::new();
        let desc = user("bob", &["ns1"], &["editor"], &[]);

        let report = Reconciler::new(&cluster).run(&desc).await;

        assert_eq!(report.created, 3, "namespace, role, rolebinding");
        assert_eq!(report.failed, 0);
        assert!(cluster.namespace_exists("ns1"));
        assert!(cluster.role_exists("ns1", "editor"));
        let binding = cluster.role_binding("ns1", "editor-rolebinding").unwrap();
        assert_eq!(binding.subjects.as_ref().unwrap()[0].name, "bob");
    }

    #[tokio::test]
    async fn second_run_is_idempotent() {
        let cluster = FakeCluster::new();
        let desc = user("bob", &["ns1", "ns2"], &["editor"], &["auditor"]);

        let first = Reconciler::new(&cluster).run(&desc).await;
        assert_eq!(first.failed, 0);
        let created = cluster.created_total();

        let second = Reconciler::new(&cluster).run(&desc).await;
        assert_eq!(second.created, 0);
        assert_eq!(second.failed, 0);
        assert_eq!(second.existing, first.created);
        assert_eq!(cluster.created_total(), created, "no duplicate objects");
    }

    #[tokio::test]
    async fn namespace_failure_does_not_block_others() {
        let cluster = FakeCluster::new();
        cluster.fail_creates_of("team-a");
        let desc = user("carol", &["team-a", "team-b"], &["viewer"], &[]);

        let report = Reconciler::new(&cluster).run(&desc).await;

        assert!(report.failed >= 1);
        assert!(!cluster.namespace_exists("team-a"));
        assert!(cluster.namespace_exists("team-b"));
        assert!(cluster.role_exists("team-b", "viewer"));
        assert!(cluster.role_binding("team-b", "viewer-rolebinding").is_some());
    }

    #[tokio::test]
    async fn role_binding_subject_is_kind_appropriate() {
        let cluster = FakeCluster::new();
        let desc = user("alice", &["team-x"], &["viewer"], &[]);

        Reconciler::new(&cluster).run(&desc).await;

        let binding = cluster.role_binding("team-x", "viewer-rolebinding").unwrap();
        let subject = &binding.subjects.as_ref().unwrap()[0];
        assert_eq!(subject.kind, "User");
        assert_eq!(subject.name, "alice");
        assert_eq!(subject.namespace.as_deref(), Some("team-x"));
        assert_eq!(binding.role_ref.kind, "Role");
        assert_eq!(binding.role_ref.name, "viewer");
    }

    #[tokio::test]
    async fn existing_cluster_role_binding_is_not_recreated() {
        let cluster = FakeCluster::new();
        cluster.add_cluster_role_binding("ops-clusterrolebinding");
        let desc = user("dave", &["ns1"], &[], &["ops"]);

        let report = Reconciler::new(&cluster).run(&desc).await;

        assert_eq!(report.failed, 0);
        assert!(
            !cluster
                .create_attempts()
                .contains(&"clusterrolebinding/ops-clusterrolebinding".to_string()),
            "existing binding must not even be attempted"
        );
    }

    #[tokio::test]
    async fn service_account_created_in_every_namespace() {
        let cluster = FakeCluster::new();
        let desc = service_account("robot", &["build", "deploy"]);

        let report = Reconciler::new(&cluster).run(&desc).await;

        assert_eq!(report.failed, 0);
        assert!(cluster.service_account_exists("build", "robot"));
        assert!(cluster.service_account_exists("deploy", "robot"));
    }

    #[tokio::test]
    async fn cluster_role_binding_carries_home_namespace_for_service_account() {
        let cluster = FakeCluster::new();
        let desc = PrincipalDescriptor {
            clusterroles: vec!["auditor".into()],
            ..service_account("robot", &["build"])
        };

        Reconciler::new(&cluster).run(&desc).await;

        assert!(cluster.cluster_role_exists("auditor"));
        let binding = cluster
            .cluster_role_binding("auditor-clusterrolebinding")
            .unwrap();
        let subject = &binding.subjects.as_ref().unwrap()[0];
        assert_eq!(subject.kind, "ServiceAccount");
        assert_eq!(subject.namespace.as_deref(), Some("build"));
        assert_eq!(binding.role_ref.kind, "ClusterRole");
    }

    #[tokio::test]
    async fn existing_namespace_short_circuits_create() {
        let cluster = FakeCluster::new();
        cluster.add_namespace("ns1");
        let desc = user("erin", &["ns1"], &[], &[]);

        let report = Reconciler::new(&cluster).run(&desc).await;
        assert_eq!(report.existing, 1);
        assert_eq!(report.created, 0);
        assert!(cluster.create_attempts().is_empty());
    }
}

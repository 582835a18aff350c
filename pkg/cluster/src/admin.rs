use std::path::Path;

use anyhow::{Context as _, Result, bail};
use kube::config::Kubeconfig;

/// The administrator's resolved cluster context — the only source of truth
/// this process has for where the API server is.
#[derive(Debug, Clone)]
pub struct AdminContext {
    pub context_name: String,
    pub server: String,
}

impl AdminContext {
    /// Load the admin kubeconfig from disk and resolve its context.
    pub fn load(path: &Path) -> Result<Self> {
        let config = Kubeconfig::read_from(path)
            .with_context(|| format!("failed to load kubeconfig file {}", path.display()))?;
        Self::resolve(&config)
    }

    /// Resolve the current context's cluster endpoint, falling back to the
    /// first cluster entry when no current context is set.
    pub fn resolve(config: &Kubeconfig) -> Result<Self> {
        if let Some(current) = config
            .current_context
            .as_deref()
            .filter(|name| !name.is_empty())
        {
            let cluster_name = config
                .contexts
                .iter()
                .find(|c| c.name == current)
                .and_then(|c| c.context.as_ref())
                .map(|c| c.cluster.clone())
                .with_context(|| format!("context {} not found in kubeconfig", current))?;
            let server = config
                .clusters
                .iter()
                .find(|c| c.name == cluster_name)
                .and_then(|c| c.cluster.as_ref())
                .and_then(|c| c.server.clone())
                .with_context(|| {
                    format!("cluster {} not found in kubeconfig", cluster_name)
                })?;
            return Ok(Self {
                context_name: current.to_string(),
                server,
            });
        }

        // No current context set: take the first cluster that names a server.
        let Some((name, server)) = config.clusters.iter().find_map(|c| {
            let server = c.cluster.as_ref()?.server.clone()?;
            Some((c.name.clone(), server))
        }) else {
            bail!("kubeconfig has no cluster entry");
        };
        Ok(Self {
            context_name: name,
            server,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> Kubeconfig {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn resolves_current_context() {
        let config = parse(
            r#"
apiVersion: v1
kind: Config
current-context: prod
clusters:
- name: staging
  cluster:
    server: https://staging:6443
- name: prod
  cluster:
    server: https://prod:6443
contexts:
- name: staging
  context:
    cluster: staging
    user: admin
- name: prod
  context:
    cluster: prod
    user: admin
users:
- name: admin
  user: {}
"#,
        );
        let admin = AdminContext::resolve(&config).unwrap();
        assert_eq!(admin.context_name, "prod");
        assert_eq!(admin.server, "https://prod:6443");
    }

    #[test]
    fn falls_back_to_first_cluster() {
        let config = parse(
            r#"
apiVersion: v1
kind: Config
clusters:
- name: only
  cluster:
    server: https://only:6443
"#,
        );
        let admin = AdminContext::resolve(&config).unwrap();
        assert_eq!(admin.context_name, "only");
        assert_eq!(admin.server, "https://only:6443");
    }

    #[test]
    fn errors_without_clusters() {
        let config = parse("apiVersion: v1\nkind: Config\n");
        assert!(AdminContext::resolve(&config).is_err());
    }

    #[test]
    fn errors_on_dangling_context() {
        let config = parse(
            r#"
apiVersion: v1
kind: Config
current-context: gone
clusters:
- name: other
  cluster:
    server: https://other:6443
contexts: []
"#,
        );
        assert!(AdminContext::resolve(&config).is_err());
    }
}

mod prompt;

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use pkg_cluster::admin::AdminContext;
use pkg_cluster::client::KubeCluster;
use pkg_cluster::probe::probe_server;
use pkg_constants::paths::{ADMIN_KUBECONFIG, KUBE_DIR};
use pkg_reconcile::Reconciler;
use pkg_types::descriptor::PrincipalDescriptor;
use tracing::{info, warn};

#[derive(Parser)]
#[command(
    name = "kubegrant",
    about = "Provision scoped cluster identities and generate their kubeconfigs"
)]
struct Cli {
    /// Path to a principal descriptor YAML file; prompts interactively when
    /// omitted
    descriptor: Option<PathBuf>,

    /// Administrator kubeconfig used to reach the cluster
    #[arg(long)]
    kubeconfig: Option<PathBuf>,

    /// Directory the generated kubeconfig is written to
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Skip the interactive cluster confirmation
    #[arg(long, short)]
    yes: bool,
}

fn kube_dir() -> anyhow::Result<PathBuf> {
    let home = dirs::home_dir().context("could not determine home directory")?;
    Ok(home.join(KUBE_DIR))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let kube_dir = kube_dir()?;
    let admin_path = cli
        .kubeconfig
        .unwrap_or_else(|| kube_dir.join(ADMIN_KUBECONFIG));
    let output_dir = cli.output_dir.unwrap_or(kube_dir);

    // Give the operator a chance to stop before any changes are made.
    let admin = AdminContext::load(&admin_path)?;
    if !cli.yes && !prompt::confirm_cluster(&admin.context_name, &admin.server)? {
        println!("No changes will be made.");
        return Ok(());
    }

    probe_server(&admin.server)
        .await
        .context("kubernetes API server appears to be offline")?;

    let cluster = KubeCluster::connect(&admin_path)
        .await
        .context("unable to build a cluster client from the admin kubeconfig")?;

    let descriptor = match &cli.descriptor {
        Some(path) => PrincipalDescriptor::load(path)?,
        None => match prompt::interactive_descriptor()? {
            Some(descriptor) => descriptor,
            None => {
                println!("Bye!");
                return Ok(());
            }
        },
    };

    if descriptor.existing {
        info!(
            "Descriptor marks {} as existing, skipping reconciliation",
            descriptor.name
        );
    } else {
        let report = Reconciler::new(&cluster).run(&descriptor).await;
        if report.failed > 0 {
            warn!(
                "Reconcile finished with failures ({}); continuing to credential assembly",
                report
            );
        }
    }

    let kubeconfig = pkg_credentials::assemble(&cluster, &descriptor, &admin)
        .await
        .with_context(|| format!("failed to generate kubeconfig for {}", descriptor.name))?;

    let yaml = serde_yaml::to_string(&kubeconfig).context("failed to serialize kubeconfig")?;
    let out_path = output_dir.join(format!("{}-kubeconfig.yaml", descriptor.name));
    std::fs::write(&out_path, yaml)
        .with_context(|| format!("failed to write {}", out_path.display()))?;

    info!(
        "Successfully wrote kubeconfig for {} to {}",
        descriptor.name,
        out_path.display()
    );
    Ok(())
}

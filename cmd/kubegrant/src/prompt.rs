//! Interactive stdin prompts for running without a descriptor file.

use std::io::{self, Write as _};
use std::path::Path;

use anyhow::{Context as _, Result};
use pkg_types::descriptor::{PrincipalDescriptor, PrincipalKind};

fn ask(question: &str) -> Result<String> {
    print!("{} ", question);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin()
        .read_line(&mut line)
        .context("failed to read from stdin")?;
    Ok(line.trim().to_string())
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.to_lowercase().as_str(), "y" | "yes")
}

/// Show the operator which cluster is about to be touched and let them back
/// out before any change is made.
pub fn confirm_cluster(context: &str, server: &str) -> Result<bool> {
    println!(
        "The current kubeconfig context is {} with a server of {}",
        context, server
    );
    Ok(is_yes(&ask("Is this OK? (y/N)")?))
}

/// Interactive fallback when no descriptor path was given: either point at
/// a descriptor file, or fetch credentials for an already-provisioned
/// service account. Returns `None` when the operator declines both.
pub fn interactive_descriptor() -> Result<Option<PrincipalDescriptor>> {
    if is_yes(&ask("Create a new principal from a descriptor file? (yes/no):")?) {
        let path = ask("Path to the descriptor file:")?;
        return PrincipalDescriptor::load(Path::new(&path)).map(Some);
    }

    if !is_yes(&ask(
        "Generate a kubeconfig for an existing service account? (yes/no):",
    )?) {
        return Ok(None);
    }

    let name = ask("Service account name:")?;
    let namespace = ask("Namespace of the service account:")?;
    let descriptor = PrincipalDescriptor {
        name,
        kind: PrincipalKind::ServiceAccount,
        namespaces: vec![namespace],
        roles: Vec::new(),
        clusterroles: Vec::new(),
        existing: true,
        clientcert: None,
        clientkey: None,
    };
    descriptor.validate()?;
    Ok(Some(descriptor))
}

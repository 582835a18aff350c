pub mod descriptor;
pub mod kubeconfig;

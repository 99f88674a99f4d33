use anyhow::{Context, Result};
use k8s_openapi::api::core::v1::Namespace;
use kube::api::ListParams;
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Api, Client, Config, ResourceExt};
use regex::Regex;
use tokio::time::{Duration, timeout};

const NAMESPACE_LIST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct ClusterState {
    pub context: String,
    pub namespace: String,
}

/// Current context name and its namespace from the local kubeconfig.
/// A context without an explicit namespace falls back to "default".
pub fn current_state() -> Result<ClusterState> {
    let kubeconfig = Kubeconfig::read().context("could not load kubeconfig")?;

    let context = kubeconfig
        .current_context
        .clone()
        .filter(|name| !name.is_empty())
        .context("no current-context set in kubeconfig")?;

    let namespace = kubeconfig
        .contexts
        .iter()
        .find(|named| named.name == context)
        .and_then(|named| named.context.as_ref())
        .and_then(|ctx| ctx.namespace.clone())
        .unwrap_or_else(|| "default".to_string());

    Ok(ClusterState { context, namespace })
}

/// First kubeconfig context whose name matches the pattern, in kubeconfig
/// file order. An empty pattern never matches.
pub fn find_context_by_regex(pattern: &str) -> Result<Option<String>> {
    if pattern.is_empty() {
        return Ok(None);
    }

    let regex = Regex::new(pattern)
        .with_context(|| format!("invalid context regex '{pattern}'"))?;
    let kubeconfig = Kubeconfig::read().context("could not load kubeconfig")?;

    Ok(kubeconfig
        .contexts
        .iter()
        .map(|named| named.name.clone())
        .find(|name| regex.is_match(name)))
}

pub async fn list_namespaces(context: &str) -> Result<Vec<String>> {
    let kubeconfig = Kubeconfig::read().context("could not load kubeconfig")?;
    let options = KubeConfigOptions {
        context: Some(context.to_string()),
        cluster: None,
        user: None,
    };
    let config = Config::from_custom_kubeconfig(kubeconfig, &options)
        .await
        .with_context(|| format!("failed to build configuration for context '{context}'"))?;
    let client = Client::try_from(config).context("failed to initialize Kubernetes client")?;

    let namespaces: Api<Namespace> = Api::all(client);
    let list = timeout(NAMESPACE_LIST_TIMEOUT, namespaces.list(&ListParams::default()))
        .await
        .with_context(|| format!("timed out listing namespaces for context '{context}'"))?
        .with_context(|| format!("failed to list namespaces for context '{context}'"))?;

    let mut names = list
        .into_iter()
        .map(|namespace| namespace.name_any())
        .collect::<Vec<_>>();
    names.sort();
    Ok(names)
}

use tracing::warn;
use url::form_urlencoded;

use crate::config::{Config, Environment};

/// Deterministic dashboard URL; the query parameter order is part of the
/// contract and mirrors the dashboard's template variables.
pub fn dashboard_url(
    base_url: &str,
    dashboard: &str,
    prometheus_uid: &str,
    namespace: &str,
) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("orgId", "1")
        .append_pair("refresh", "30s")
        .append_pair("var-DS_PROMETHEUS", prometheus_uid)
        .append_pair("var-namespace", namespace)
        .append_pair("var-deployment", "All")
        .append_pair("var-pod", "All")
        .append_pair("var-container", "All")
        .finish();

    format!("{}/d/{}?{}", base_url.trim_end_matches('/'), dashboard, query)
}

pub fn launch(config: &Config, env: &Environment, namespace: &str) {
    let dashboard = config.dashboard_for(env);
    let url = dashboard_url(
        &env.base_url,
        dashboard,
        config.prometheus_uid_for(env),
        namespace,
    );

    copy_password(env);

    println!("🚀 Opening {} [{}]...", env.name, namespace);
    if let Err(error) = open::that(&url) {
        warn!("failed to open browser: {error}");
        println!("   Link: {url}");
    }
}

// Missing clipboard support (headless hosts, no xclip/xsel) only costs the
// convenience copy, never the launch.
fn copy_password(env: &Environment) {
    if env.password.is_empty() {
        return;
    }

    let copied = arboard::Clipboard::new().and_then(|mut clipboard| {
        clipboard.set_text(env.password.clone())
    });
    match copied {
        Ok(()) => println!("📋 Password copied to clipboard"),
        Err(error) => warn!("clipboard unavailable: {error}"),
    }
}

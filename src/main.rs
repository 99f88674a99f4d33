mod cli;
mod config;
mod kube;
mod launcher;
mod resolve;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{CliArgs, Command, CompletionTarget, ConfigAction, LaunchArgs, SelectionMode};
use config::{Config, Environment};
use dialoguer::{Confirm, Input, Password};
use regex::Regex;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_tracing(&args.log_filter)?;

    match args.command {
        Some(Command::List { namespace }) => run_list(namespace),
        Some(Command::Config {
            action: ConfigAction::Get,
        }) => run_config_get(),
        Some(Command::Config {
            action: ConfigAction::Update,
        }) => run_config_update(),
        Some(Command::Completions {
            target: CompletionTarget::Aliases,
        }) => run_complete_aliases(),
        Some(Command::Completions {
            target: CompletionTarget::Namespaces,
        }) => run_complete_namespaces().await,
        None => run_launch(args.launch).await,
    }
}

fn init_tracing(level_filter: &str) -> Result<()> {
    let filter = EnvFilter::try_new(level_filter)
        .or_else(|_| EnvFilter::try_new("info"))
        .context("failed to initialize tracing filter")?;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .with_writer(std::io::stderr)
        .try_init();

    Ok(())
}

async fn run_launch(args: LaunchArgs) -> Result<()> {
    let config = Config::load()?;
    if config.environments.is_empty() {
        anyhow::bail!("no environments configured; run 'grafana-connect config update' first");
    }

    let (env, resolved_namespace): (&Environment, String) = match args.selection_mode() {
        SelectionMode::Alias(alias) => {
            let env = resolve::find_by_alias(&alias, &config.environments)
                .with_context(|| format!("no environment with alias '{alias}'"))?;
            (env, "default".to_string())
        }
        SelectionMode::Interactive => {
            let Some(env) = ui::select_environment(&config.environments)? else {
                return Ok(());
            };
            let namespace = match kube::find_context_by_regex(&env.context_match)? {
                Some(context) => {
                    let namespaces = kube::list_namespaces(&context).await?;
                    let Some(namespace) = ui::select_string("Namespace", &namespaces)? else {
                        return Ok(());
                    };
                    namespace
                }
                None => "default".to_string(),
            };
            (env, namespace)
        }
        SelectionMode::InteractiveNamespace => {
            let state = kube::current_state()?;
            let env = resolve::resolve_environment(&state.context, &config.environments)?;
            let namespaces = kube::list_namespaces(&state.context).await?;
            let Some(namespace) = ui::select_string("Namespace", &namespaces)? else {
                return Ok(());
            };
            (env, namespace)
        }
        SelectionMode::Auto => {
            let state = kube::current_state()?;
            let env = resolve::resolve_environment(&state.context, &config.environments)?;
            (env, state.namespace)
        }
    };

    let namespace = args.apply_namespace_override(resolved_namespace);
    launcher::launch(&config, env, &namespace);
    Ok(())
}

fn run_list(namespace_override: Option<String>) -> Result<()> {
    let config = Config::load()?;
    if config.environments.is_empty() {
        println!("no environments configured; run 'grafana-connect config update' first");
        return Ok(());
    }

    let Some(env) = ui::select_environment(&config.environments)? else {
        return Ok(());
    };

    let namespace = namespace_override.unwrap_or_else(|| "default".to_string());
    launcher::launch(&config, env, &namespace);
    Ok(())
}

fn run_config_get() -> Result<()> {
    let config = Config::load()?;
    let rendered =
        serde_yaml::to_string(&config.masked()).context("failed to render config")?;

    println!("# current configuration (passwords masked)");
    print!("{rendered}");
    Ok(())
}

fn run_config_update() -> Result<()> {
    let path = config::config_path().context("could not determine the user config directory")?;
    let mut config = if path.exists() {
        println!("📂 Loading config from {}", path.display());
        Config::load_from(&path)?
    } else {
        Config::default()
    };

    loop {
        let another = Confirm::new()
            .with_prompt("Add or update an environment?")
            .default(true)
            .interact()?;
        if !another {
            break;
        }

        let base_url = prompt_text("Grafana base URL", "")?;
        let base_url = base_url.trim_end_matches('/').to_string();
        if base_url.is_empty() {
            println!("a base URL is required, skipping entry");
            continue;
        }

        let existing = config.environment_by_base_url(&base_url).cloned();
        if existing.is_some() {
            println!("updating existing entry for {base_url}");
        }
        let defaults = existing.unwrap_or_default();

        let name = prompt_text("Name (e.g. acme-prod)", &defaults.name)?;
        let alias = prompt_text("Alias (shortcode, e.g. prod)", &defaults.alias)?;

        let suggested_match = if defaults.context_match.is_empty() && !name.is_empty() {
            format!(".*{name}.*")
        } else {
            defaults.context_match.clone()
        };
        let context_match = prompt_text("Context regex", &suggested_match)?;
        if !context_match.is_empty() && Regex::new(&context_match).is_err() {
            warn!("pattern '{context_match}' does not compile; resolution will fail for this entry");
        }

        let dashboard_default = if defaults.dashboard.is_empty() {
            config::DEFAULT_DASHBOARD
        } else {
            &defaults.dashboard
        };
        let dashboard = prompt_text("Dashboard path (slug)", dashboard_default)?;
        let prometheus_uid = prompt_text("Prometheus UID", &defaults.prometheus_uid)?;
        let username = prompt_text("Username", &defaults.username)?;

        let entered = Password::new()
            .with_prompt("Password (leave blank to keep current)")
            .allow_empty_password(true)
            .interact()?;
        // None means "keep whatever was stored", not "clear it"
        let new_password = (!entered.is_empty()).then_some(entered);
        let password = new_password.unwrap_or(defaults.password);

        config.upsert_environment(Environment {
            name,
            alias,
            context_match,
            base_url,
            dashboard,
            prometheus_uid,
            username,
            password,
        });
        println!("✅ Saved environment");
    }

    config.save_to(&path)?;
    println!("🎉 Config saved to {}", path.display());
    Ok(())
}

fn run_complete_aliases() -> Result<()> {
    let config = Config::load()?;
    for env in &config.environments {
        if !env.alias.is_empty() {
            println!("{}", env.alias);
        }
    }
    Ok(())
}

async fn run_complete_namespaces() -> Result<()> {
    let state = kube::current_state()?;
    for namespace in kube::list_namespaces(&state.context).await? {
        println!("{namespace}");
    }
    Ok(())
}

fn prompt_text(label: &str, default: &str) -> Result<String> {
    let value = Input::<String>::new()
        .with_prompt(label)
        .allow_empty(true)
        .default(default.to_string())
        .show_default(!default.is_empty())
        .interact_text()?;
    Ok(value.trim().to_string())
}

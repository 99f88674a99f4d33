use anyhow::{Context, Result};
use regex::Regex;

use crate::config::Environment;

/// First environment whose context_match regex matches the context name.
/// Entries without a pattern are skipped; the scan is in config file order.
pub fn resolve_environment<'a>(
    context: &str,
    environments: &'a [Environment],
) -> Result<&'a Environment> {
    for env in environments {
        if env.context_match.is_empty() {
            continue;
        }

        let pattern = Regex::new(&env.context_match).with_context(|| {
            format!(
                "invalid context_match regex in environment '{}': {}",
                env.name, env.context_match
            )
        })?;

        if pattern.is_match(context) {
            return Ok(env);
        }
    }

    anyhow::bail!("no environment matches context '{context}'");
}

pub fn find_by_alias<'a>(alias: &str, environments: &'a [Environment]) -> Option<&'a Environment> {
    environments
        .iter()
        .find(|env| !env.alias.is_empty() && env.alias == alias)
}

use anyhow::Result;
use dialoguer::FuzzySelect;

use crate::config::Environment;

/// Fuzzy environment picker. Ok(None) means the user cancelled.
pub fn select_environment<'a>(environments: &'a [Environment]) -> Result<Option<&'a Environment>> {
    let labels = environments
        .iter()
        .map(environment_label)
        .collect::<Vec<_>>();

    let picked = FuzzySelect::new()
        .with_prompt("Environment")
        .items(&labels)
        .default(0)
        .interact_opt()?;

    Ok(picked.map(|index| &environments[index]))
}

pub fn select_string(prompt: &str, items: &[String]) -> Result<Option<String>> {
    let picked = FuzzySelect::new()
        .with_prompt(prompt)
        .items(items)
        .default(0)
        .interact_opt()?;

    Ok(picked.map(|index| items[index].clone()))
}

fn environment_label(env: &Environment) -> String {
    if env.alias.is_empty() {
        format!("{} ({})", env.name, env.base_url)
    } else {
        format!("{} [{}] ({})", env.name, env.alias, env.base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::environment_label;
    use crate::config::Environment;

    #[test]
    fn label_includes_alias_when_present() {
        let mut env = Environment {
            name: "prod".to_string(),
            base_url: "https://g.example.com".to_string(),
            ..Environment::default()
        };
        assert_eq!(environment_label(&env), "prod (https://g.example.com)");

        env.alias = "p".to_string();
        assert_eq!(environment_label(&env), "prod [p] (https://g.example.com)");
    }
}

use std::path::Path;

use sw_domain::config::{Config, ConfigSeverity};

/// Print the config's validation issues. Returns `false` when any issue is
/// an error.
pub fn validate(config: &Config, config_path: &Path) -> bool {
    let issues = config.validate();

    if issues.is_empty() {
        println!("Config OK ({})", config_path.display());
        return true;
    }

    let error_count = issues
        .iter()
        .filter(|e| e.severity == ConfigSeverity::Error)
        .count();
    let warning_count = issues.len() - error_count;

    for issue in &issues {
        println!("{issue}");
    }

    println!(
        "\n{} error(s), {} warning(s) in {}",
        error_count,
        warning_count,
        config_path.display(),
    );

    error_count == 0
}

/// Render the resolved config (with all defaults filled in) as TOML.
pub fn show(config: &Config) -> anyhow::Result<String> {
    Ok(toml::to_string_pretty(config)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn show_round_trips_through_toml() {
        let mut config = Config::default();
        config.plugins.interpreter = Some("python3".into());
        let rendered = show(&config).unwrap();
        assert!(rendered.contains("[sessions]"));
        assert!(rendered.contains("interpreter = \"python3\""));

        let parsed: Config = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed.plugins.interpreter.as_deref(), Some("python3"));
    }

    #[test]
    fn validate_flags_errors() {
        assert!(validate(&Config::default(), Path::new("stepwise.toml")));

        let mut config = Config::default();
        config.sessions.handoffs_dir = config.sessions.dir.clone();
        assert!(!validate(&config, Path::new("stepwise.toml")));
    }
}

use crate::errors::ConfigError;
use crate::model::EvalConfig;
use std::path::Path;

pub mod env;
pub mod path_resolver;

pub const SUPPORTED_CONFIG_VERSION: u32 = 1;

pub fn load_config(path: &Path) -> Result<EvalConfig, ConfigError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| ConfigError(format!("failed to read config {}: {}", path.display(), e)))?;

    let mut ignored_keys = std::collections::BTreeSet::new();
    let deserializer = serde_yaml::Deserializer::from_str(&raw);

    // serde_ignored wrapper to capture unknown fields
    let mut cfg: EvalConfig = serde_ignored::deserialize(deserializer, |path| {
        ignored_keys.insert(path.to_string());
    })
    .map_err(|e| ConfigError(format!("failed to parse YAML: {}", e)))?;

    if !ignored_keys.is_empty() {
        tracing::warn!(
            event = "config.unknown_fields",
            file = %path.display(),
            fields = ?ignored_keys
        );
    }

    if cfg.version != SUPPORTED_CONFIG_VERSION {
        return Err(ConfigError(format!(
            "unsupported config version {} (supported: {})",
            cfg.version, SUPPORTED_CONFIG_VERSION
        )));
    }

    if !cfg.queries.is_empty() {
        crate::registry::validate(&cfg.queries)?;
    }

    normalize_paths(&mut cfg, path);
    Ok(cfg)
}

/// Loads `path` if it exists, otherwise the defaults. An explicitly requested
/// file that is missing is an error.
pub fn load_or_default(path: &Path, explicit: bool) -> Result<EvalConfig, ConfigError> {
    if path.exists() {
        load_config(path)
    } else if explicit {
        Err(ConfigError(format!("config file {} not found", path.display())))
    } else {
        Ok(EvalConfig::default())
    }
}

fn normalize_paths(cfg: &mut EvalConfig, config_path: &Path) {
    cfg.settings.trace_file = cfg
        .settings
        .trace_file
        .as_deref()
        .and_then(|raw| path_resolver::relative_to_config(config_path, raw))
        .map(|p| p.to_string_lossy().into_owned());
}

pub fn write_sample_config(path: &Path) -> Result<(), ConfigError> {
    std::fs::write(
        path,
        r#"version: 1
suite: tpch
settings:
  # baseline | enhanced | few_shot
  prompt_strategy: enhanced
  error_truncate_chars: 100
  heuristics: true
  extra_equivalences:
    - ai_pattern: "LIMIT"
      gt_pattern: "ROWNUM"
      claim: "LIMIT n and ROWNUM <= n both limit the result"
  # trace_file: traces/generations.jsonl
# Leave `queries` out to use the built-in 22 TPC-H questions.
queries:
  - id: 2
    question: "How many customers are there?"
    ground_truth_sql: "SELECT COUNT(*) FROM CUSTOMER"
    complexity: simple
  - id: 10
    question: "Find orders placed by Customer#1."
    ground_truth_sql: "SELECT * FROM ORDERS WHERE O_CUSTKEY = 1"
    complexity: medium
"#,
    )
    .map_err(|e| ConfigError(format!("failed to write sample config: {}", e)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::PromptStrategy;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn sample_config_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sqlgauge.yaml");
        write_sample_config(&path).unwrap();
        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.suite, "tpch");
        assert_eq!(cfg.settings.prompt_strategy, Some(PromptStrategy::Enhanced));
        assert_eq!(cfg.queries.len(), 2);
        assert_eq!(cfg.settings.extra_equivalences.len(), 1);
    }

    #[test]
    fn unsupported_version_is_rejected() {
        let mut tmp = NamedTempFile::new().unwrap();
        writeln!(tmp, "version: 7\nsuite: x").unwrap();
        let err = load_config(tmp.path()).unwrap_err();
        assert!(err.to_string().contains("unsupported config version 7"));
    }

    #[test]
    fn duplicate_query_ids_are_rejected() {
        let mut tmp = NamedTempFile::new().unwrap();
        writeln!(
            tmp,
            "version: 1\nsuite: x\nqueries:\n  - {{id: 1, question: a, ground_truth_sql: 'SELECT 1', complexity: simple}}\n  - {{id: 1, question: b, ground_truth_sql: 'SELECT 2', complexity: medium}}"
        )
        .unwrap();
        assert!(load_config(tmp.path()).is_err());
    }

    #[test]
    fn trace_file_resolves_relative_to_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sqlgauge.yaml");
        std::fs::write(&path, "version: 1\nsuite: x\nsettings:\n  trace_file: traces/t.jsonl\n").unwrap();
        let cfg = load_config(&path).unwrap();
        let resolved = cfg.settings.trace_file.unwrap();
        assert!(resolved.starts_with(dir.path().to_str().unwrap()));
        assert!(resolved.ends_with("traces/t.jsonl"));
    }

    #[test]
    fn missing_default_config_falls_back() {
        let cfg = load_or_default(Path::new("/nonexistent/sqlgauge.yaml"), false).unwrap();
        assert!(cfg.queries.is_empty());
        assert!(load_or_default(Path::new("/nonexistent/sqlgauge.yaml"), true).is_err());
    }
}

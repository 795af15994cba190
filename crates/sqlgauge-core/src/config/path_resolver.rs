use std::path::{Component, Path, PathBuf};

/// Anchors a path named inside a config file at that file's directory.
/// Blank values resolve to `None`; absolute paths are returned unchanged.
pub fn relative_to_config(config_path: &Path, raw: &str) -> Option<PathBuf> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let p = Path::new(raw);
    if p.is_absolute() {
        return Some(p.to_path_buf());
    }
    let base = config_path.parent().unwrap_or(Path::new("."));
    Some(lexical_clean(&base.join(p)))
}

// `.` segments vanish and `..` pops, without touching the filesystem.
fn lexical_clean(path: &Path) -> PathBuf {
    path.components().fold(PathBuf::new(), |mut out, c| {
        match c {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
        out
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trace_path_follows_the_config_dir() {
        let got = relative_to_config(Path::new("/work/evals/sqlgauge.yaml"), "../traces/./run.jsonl");
        assert_eq!(got, Some(PathBuf::from("/work/traces/run.jsonl")));
    }

    #[test]
    fn absolute_and_blank_values() {
        let cfg = Path::new("/work/sqlgauge.yaml");
        assert_eq!(relative_to_config(cfg, "/tmp/t.jsonl"), Some(PathBuf::from("/tmp/t.jsonl")));
        assert_eq!(relative_to_config(cfg, "   "), None);
    }
}

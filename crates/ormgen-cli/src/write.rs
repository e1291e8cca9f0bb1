use crate::codegen::GeneratedFile;
use std::path::{Path, PathBuf};

#[derive(Debug, Default)]
pub struct WriteSummary {
    pub written: Vec<PathBuf>,
    pub unchanged: Vec<PathBuf>,
}

/// Write files whose content differs from what is on disk.
pub fn apply_generated_files(files: &[GeneratedFile]) -> anyhow::Result<WriteSummary> {
    let mut files: Vec<&GeneratedFile> = files.iter().collect();
    files.sort_by(|a, b| a.path.cmp(&b.path));

    let mut summary = WriteSummary::default();

    for f in files {
        let existing = std::fs::read_to_string(&f.path).ok();
        if existing.as_deref() == Some(f.content.as_str()) {
            tracing::debug!(path = %f.path.display(), "unchanged");
            summary.unchanged.push(f.path.clone());
            continue;
        }
        write_atomic(&f.path, &f.content)?;
        summary.written.push(f.path.clone());
    }

    if summary.written.is_empty() {
        println!("up to date");
    }
    for p in &summary.written {
        println!("wrote {}", p.display());
    }

    Ok(summary)
}

fn write_atomic(path: &Path, content: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| anyhow::anyhow!("failed to create directory {}: {e}", parent.display()))?;
    }

    let tmp = tmp_path(path);
    std::fs::write(&tmp, content)
        .map_err(|e| anyhow::anyhow!("failed to write {}: {e}", tmp.display()))?;
    std::fs::rename(&tmp, path).map_err(|e| {
        anyhow::anyhow!(
            "failed to rename {} -> {}: {e}",
            tmp.display(),
            path.display()
        )
    })?;
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => path.with_extension(format!("{ext}.tmp")),
        None => path.with_extension("tmp"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn writes_only_changed_files() {
        let tmp = TempDir::new().unwrap();
        let a = tmp.path().join("model/a.rs");
        let b = tmp.path().join("query/b.rs");
        let files = vec![
            GeneratedFile {
                path: b.clone(),
                content: "b".to_string(),
            },
            GeneratedFile {
                path: a.clone(),
                content: "a".to_string(),
            },
        ];

        let first = apply_generated_files(&files).unwrap();
        assert_eq!(first.written, vec![a.clone(), b.clone()]);
        assert_eq!(std::fs::read_to_string(&a).unwrap(), "a");
        assert!(!a.with_extension("rs.tmp").exists());

        let second = apply_generated_files(&files).unwrap();
        assert!(second.written.is_empty());
        assert_eq!(second.unchanged.len(), 2);

        std::fs::write(&b, "stale").unwrap();
        let third = apply_generated_files(&files).unwrap();
        assert_eq!(third.written, vec![b.clone()]);
        assert_eq!(std::fs::read_to_string(&b).unwrap(), "b");
    }
}

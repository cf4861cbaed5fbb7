use std::path::{Path, PathBuf};

/// Resolve the project root that holds `.flowctl/`.
///
/// Priority:
/// 1. `--root` flag / `FLOWCTL_ROOT` env var (passed in as `explicit`)
/// 2. Nearest ancestor of `cwd` containing a marker, `.flowctl/` first, then `.git/`
/// 3. Fall back to `cwd`
pub fn resolve_root(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    find_marker(&cwd, ".flowctl")
        .or_else(|| find_marker(&cwd, ".git"))
        .unwrap_or(cwd)
}

fn find_marker(start: &Path, marker: &str) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(marker).is_dir())
        .map(Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn explicit_root_wins() {
        let dir = TempDir::new().unwrap();
        let result = resolve_root(Some(dir.path()));
        assert_eq!(result, dir.path());
    }

    #[test]
    fn finds_flowctl_dir_from_subdirectory() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".flowctl")).unwrap();
        let subdir = dir.path().join("jobs/nightly");
        std::fs::create_dir_all(&subdir).unwrap();

        assert_eq!(find_marker(&subdir, ".flowctl").unwrap(), dir.path());
    }

    #[test]
    fn flowctl_marker_beats_enclosing_git_repo() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".git")).unwrap();
        let project = dir.path().join("orchestrator");
        std::fs::create_dir_all(project.join(".flowctl")).unwrap();

        assert_eq!(find_marker(&project, ".flowctl").unwrap(), project);
        assert_eq!(find_marker(&project, ".git").unwrap(), dir.path());
    }

    #[test]
    fn missing_marker_is_none() {
        let dir = TempDir::new().unwrap();
        assert!(find_marker(dir.path(), ".flowctl-never-created").is_none());
    }
}

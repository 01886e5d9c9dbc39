//! Working directory preflight check.

use super::CheckResult;
use crate::utils::fs::ensure_directory;
use std::path::Path;

/// Check that the catalog working directory exists (creating it) and is writable.
pub fn check(working_dir: &Path) -> CheckResult {
    if let Err(e) = std::fs::create_dir_all(working_dir)
        .map_err(crate::Error::from)
        .and_then(|_| ensure_directory(working_dir))
    {
        return CheckResult::fail(
            "Working directory",
            &e.to_string(),
            "Set working_directory in config.toml to a writable folder",
        );
    }

    let probe = working_dir.join(".write_probe");
    match std::fs::write(&probe, b"ok") {
        Ok(()) => {
            let _ = std::fs::remove_file(&probe);
            CheckResult::ok("Working directory", &working_dir.display().to_string())
        }
        Err(e) => CheckResult::fail(
            "Working directory",
            &format!("{} is not writable: {}", working_dir.display(), e),
            "Check folder permissions",
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creates_missing_directory() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let dir = temp_dir.path().join("cache").join("tvdb");
        let result = check(&dir);
        assert!(result.success);
        assert!(dir.is_dir());
        assert!(!dir.join(".write_probe").exists());
    }
}

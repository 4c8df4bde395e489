use std::{
    env, fs,
    path::{Path, PathBuf},
};

/// Errors for resolving the application home directory
#[derive(Debug, thiserror::Error)]
pub enum HomeDirError {
    #[error("HOME environment variable is not set")]
    HomeMissing,
    #[error("APPDATA environment variable is not set")]
    AppDataMissing,
    #[error("home_dir must be an absolute path (after ~ expansion): {0}")]
    AbsoluteRequired(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Resolve the application home directory.
///
/// A configured path may start with `~`, which expands to the user profile;
/// the result must be absolute. Without a configured path the platform
/// default is used: `%APPDATA%\<default_subdir>` on Windows,
/// `$HOME/<default_subdir>` elsewhere. With `create` set, the directory is
/// created if missing.
pub fn resolve_home_dir(
    config_home: Option<String>,
    default_subdir: &str,
    create: bool,
) -> Result<PathBuf, HomeDirError> {
    let path = match config_home {
        Some(raw) => {
            let expanded = expand_tilde(&raw)?;
            if !expanded.is_absolute() {
                return Err(HomeDirError::AbsoluteRequired(
                    expanded.to_string_lossy().into(),
                ));
            }
            expanded
        }
        None => platform_base_dir()?.join(default_subdir),
    };

    if create {
        fs::create_dir_all(&path)?;
    }
    Ok(path)
}

fn expand_tilde(raw: &str) -> Result<PathBuf, HomeDirError> {
    if raw == "~" {
        return user_profile_dir();
    }
    if let Some(rest) = raw.strip_prefix("~/").or_else(|| raw.strip_prefix("~\\")) {
        return Ok(user_profile_dir()?.join(rest));
    }
    Ok(PathBuf::from(raw))
}

#[cfg(target_os = "windows")]
fn user_profile_dir() -> Result<PathBuf, HomeDirError> {
    env::var("USERPROFILE")
        .or_else(|_| env::var("HOME"))
        .map(PathBuf::from)
        .map_err(|_| HomeDirError::HomeMissing)
}

#[cfg(not(target_os = "windows"))]
fn user_profile_dir() -> Result<PathBuf, HomeDirError> {
    env::var("HOME")
        .map(PathBuf::from)
        .map_err(|_| HomeDirError::HomeMissing)
}

#[cfg(target_os = "windows")]
fn platform_base_dir() -> Result<PathBuf, HomeDirError> {
    env::var("APPDATA")
        .map(PathBuf::from)
        .map_err(|_| HomeDirError::AppDataMissing)
}

#[cfg(not(target_os = "windows"))]
fn platform_base_dir() -> Result<PathBuf, HomeDirError> {
    env::var("HOME")
        .map(PathBuf::from)
        .map_err(|_| HomeDirError::HomeMissing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use tempfile::tempdir;

    #[cfg(not(target_os = "windows"))]
    fn is_normalized(path: &Path) -> bool {
        path.is_absolute() && !path.to_string_lossy().starts_with('~')
    }

    #[test]
    #[cfg(not(target_os = "windows"))]
    fn resolves_tilde_against_home() {
        let tmp = tempdir().unwrap();
        env::set_var("HOME", tmp.path());

        let result = resolve_home_dir(Some("~/myapp".into()), ".unitkit", false).unwrap();

        assert!(is_normalized(&result));
        assert!(result.ends_with("myapp"));
    }

    #[test]
    #[cfg(not(target_os = "windows"))]
    fn defaults_to_home_subdir() {
        let tmp = tempdir().unwrap();
        env::set_var("HOME", tmp.path());

        let result = resolve_home_dir(None, ".unitkit", false).unwrap();

        assert!(is_normalized(&result));
        assert!(result.ends_with(".unitkit"));
    }

    #[test]
    #[cfg(not(target_os = "windows"))]
    fn rejects_relative_paths() {
        let err = resolve_home_dir(Some("relative/path".into()), ".unitkit", false).unwrap_err();
        match err {
            HomeDirError::AbsoluteRequired(_) => {}
            _ => panic!("Expected AbsoluteRequired, got {:?}", err),
        }
    }

    #[test]
    #[cfg(not(target_os = "windows"))]
    fn accepts_absolute_path_unchanged() {
        let tmp = tempdir().unwrap();
        let abs_path = tmp.path().join("custom_dir");

        let result = resolve_home_dir(
            Some(abs_path.to_string_lossy().to_string()),
            ".unitkit",
            false,
        )
        .unwrap();

        assert_eq!(result, abs_path);
    }

    #[test]
    #[cfg(not(target_os = "windows"))]
    fn creates_directory_when_asked() {
        let tmp = tempdir().unwrap();
        env::set_var("HOME", tmp.path());

        let result = resolve_home_dir(None, ".unitkit", true).unwrap();
        assert!(result.exists());
        assert!(result.ends_with(".unitkit"));
    }

    #[test]
    #[cfg(target_os = "windows")]
    fn windows_default_uses_appdata() {
        let tmp = tempdir().unwrap();
        env::set_var("APPDATA", tmp.path());

        let result = resolve_home_dir(None, ".unitkit", false).unwrap();

        assert!(result.is_absolute());
        assert!(result.ends_with(".unitkit"));
        assert!(result.starts_with(tmp.path()));
    }
}

use std::path::PathBuf;

const DATA_DIR_NAME: &str = "codepruner";

/// CLI flag, then config, then `$HOME/.local/share/codepruner`.
pub fn resolve_data_dir(
    cli_override: Option<&str>,
    configured: Option<&str>,
) -> Result<PathBuf, String> {
    if let Some(dir) = cli_override.or(configured).filter(|dir| !dir.trim().is_empty()) {
        return Ok(expand_home_path(dir));
    }
    let home = std::env::var("HOME").map_err(|err| format!("resolve HOME: {}", err))?;
    Ok(PathBuf::from(home)
        .join(".local")
        .join("share")
        .join(DATA_DIR_NAME))
}

pub fn expand_home_path(path: &str) -> PathBuf {
    if path == "~"
        && let Ok(home) = std::env::var("HOME")
    {
        return PathBuf::from(home);
    }
    if let Some(rest) = path.strip_prefix("~/")
        && let Ok(home) = std::env::var("HOME")
    {
        return PathBuf::from(home).join(rest);
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_flag_beats_config() {
        let dir = resolve_data_dir(Some("/tmp/flag"), Some("/tmp/config")).expect("dir");
        assert_eq!(dir, PathBuf::from("/tmp/flag"));
        let dir = resolve_data_dir(None, Some("/tmp/config")).expect("dir");
        assert_eq!(dir, PathBuf::from("/tmp/config"));
    }

    #[test]
    fn leaves_plain_paths_alone() {
        assert_eq!(expand_home_path("/srv/data"), PathBuf::from("/srv/data"));
    }
}

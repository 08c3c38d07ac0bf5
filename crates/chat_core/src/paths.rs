use std::path::PathBuf;

/// The Zufan data directory (~/.zufan)
pub fn zufan_dir() -> PathBuf {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(std::env::temp_dir)
        .join(".zufan")
}

/// Path of config.json
pub fn config_json_path() -> PathBuf {
    zufan_dir().join("config.json")
}

/// Directory holding the locally persisted conversation state
pub fn state_dir() -> PathBuf {
    zufan_dir().join("state")
}

/// Ensure the zufan directory exists
pub fn ensure_zufan_dir() -> std::io::Result<PathBuf> {
    let dir = zufan_dir();
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

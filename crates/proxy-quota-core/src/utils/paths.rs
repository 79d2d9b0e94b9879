use std::fs;
use std::path::PathBuf;

use crate::error::{CoreError, CoreResult};

const DATA_DIR: &str = "proxy-quota";

/// Get data directory path.
///
/// Priority:
/// 1. `PROXY_QUOTA_DATA_DIR` environment variable (for container deployments)
/// 2. `<config dir>/proxy-quota` (default for desktop usage)
pub fn get_data_dir() -> CoreResult<PathBuf> {
    let data_dir = if let Ok(custom_dir) = std::env::var("PROXY_QUOTA_DATA_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let base = dirs::config_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| CoreError::Unknown("Cannot determine user config directory".into()))?;
        base.join(DATA_DIR)
    };

    if !data_dir.exists() {
        fs::create_dir_all(&data_dir)?;
    }

    Ok(data_dir)
}

use crate::config::{config_path, AppConfig};
use crate::error::Result;

/// Write the default config file unless one already exists.
pub async fn run_init() -> Result<()> {
    let path = config_path();
    if path.exists() {
        eprintln!("clipwise: {} already exists", path.display());
        return Ok(());
    }

    AppConfig::default().save_to(&path)?;
    eprintln!("clipwise: wrote default config to {}", path.display());
    Ok(())
}

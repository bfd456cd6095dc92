//! JSON persistence for [`Inventory`]

use crate::core::Inventory;
use crate::error::{StockError, StockResult};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Load the store, or an empty inventory when the file does not exist yet
pub fn load(path: &Path) -> StockResult<Inventory> {
    if !path.exists() {
        debug!("no store at {}, starting empty", path.display());
        return Ok(Inventory::default());
    }
    let content = fs::read_to_string(path).map_err(|source| StockError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let inventory: Inventory = serde_json::from_str(&content)?;
    debug!(
        buildings = inventory.data.len(),
        products = inventory.products.len(),
        "loaded store {}",
        path.display()
    );
    Ok(inventory)
}

/// Write the store. The previous file is only replaced once the new content
/// is fully on disk.
pub fn save(path: &Path, inventory: &Inventory) -> StockResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(inventory)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, content)?;
    fs::rename(&tmp, path)?;
    debug!("saved store {}", path.display());
    Ok(())
}

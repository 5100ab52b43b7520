use std::env;
use std::path::Path;
use std::path::PathBuf;

use crate::exception;
use crate::exception::CoreRsResult;

/// Resolves `path` against `ASSET_DIR` when set, otherwise next to the executable.
/// Debug builds started by cargo also look in the package source folder.
pub fn asset_path(path: &str) -> CoreRsResult<PathBuf> {
    let asset_path = match env::var_os("ASSET_DIR") {
        Some(dir) => PathBuf::from(dir).join(path),
        None => find_asset_path(&env::current_exe()?, path),
    };
    if asset_path.exists() {
        Ok(asset_path)
    } else {
        Err(exception!(
            message = format!("asset not found, asset={}", asset_path.to_string_lossy())
        ))
    }
}

#[cfg(debug_assertions)]
fn find_asset_path(exe_path: &Path, path: &str) -> PathBuf {
    let asset_path = exe_path.with_file_name(path);
    if asset_path.exists() {
        return asset_path;
    }
    if let Some(manifest_dir) = env::var_os("CARGO_MANIFEST_DIR") {
        let source_path = PathBuf::from(manifest_dir).join(path);
        if source_path.exists() {
            tracing::info!("load asset from source folder, asset={}", source_path.to_string_lossy());
            return source_path;
        }
    }
    asset_path
}

#[cfg(not(debug_assertions))]
fn find_asset_path(exe_path: &Path, path: &str) -> PathBuf {
    exe_path.with_file_name(path)
}

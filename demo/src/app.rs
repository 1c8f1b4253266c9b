use std::path::{Path, PathBuf};

/// Services shared by every resource manager in the demo. Loading policies receive this as their
/// context.
#[derive(Debug)]
pub struct App {
    asset_dir: PathBuf,
}

impl App {
    pub fn new<T: Into<PathBuf>>(asset_dir: T) -> Self {
        App {
            asset_dir: asset_dir.into(),
        }
    }

    pub fn asset_dir(&self) -> &Path {
        &self.asset_dir
    }

    /// Path of an asset on disk, given its path relative to the asset directory
    pub fn resolve_asset_path(
        &self,
        relative_path: &str,
    ) -> PathBuf {
        self.asset_dir.join(relative_path)
    }
}

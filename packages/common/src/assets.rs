use crate::error::CommonError;
use crate::result::CommonResult;
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

/// Loads asset markup (SVG sources) by the `src` a block refers to
pub trait AssetLoader {
    fn load(&self, src: &str) -> CommonResult<String>;
}

/// Reads assets from a directory on disk.
///
/// URLs under `base_url` map onto `root`; other absolute URLs are not fetched.
pub struct FileAssetLoader {
    root: PathBuf,
    base_url: Option<String>,
}

impl FileAssetLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            base_url: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into().trim_end_matches('/').to_string());
        self
    }

    fn resolve(&self, src: &str) -> CommonResult<PathBuf> {
        let relative = match &self.base_url {
            Some(base) if src.starts_with(base.as_str()) => &src[base.len()..],
            _ if src.starts_with("http://") || src.starts_with("https://") => {
                return Err(CommonError::asset(src, "remote assets are not fetched"));
            }
            _ => src,
        };

        let relative = Path::new(relative.trim_start_matches('/'));
        if relative
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)))
        {
            return Err(CommonError::asset(src, "path escapes the asset root"));
        }

        Ok(self.root.join(relative))
    }
}

impl AssetLoader for FileAssetLoader {
    fn load(&self, src: &str) -> CommonResult<String> {
        let path = self.resolve(src)?;
        Ok(std::fs::read_to_string(path)?)
    }
}

/// In-memory asset loader for testing
pub struct MemoryAssetLoader {
    pub assets: HashMap<String, String>,
}

impl MemoryAssetLoader {
    pub fn new() -> Self {
        Self {
            assets: HashMap::new(),
        }
    }

    pub fn add_asset(&mut self, src: impl Into<String>, markup: impl Into<String>) {
        self.assets.insert(src.into(), markup.into());
    }
}

impl Default for MemoryAssetLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetLoader for MemoryAssetLoader {
    fn load(&self, src: &str) -> CommonResult<String> {
        self.assets
            .get(src)
            .cloned()
            .ok_or_else(|| CommonError::asset(src, "not found"))
    }
}

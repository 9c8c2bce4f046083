//! Asset probes used to preload a route

use anyhow::{anyhow, Result};
use std::future::Future;
use std::path::{Component, Path, PathBuf};

/// Loads one font or image. Implementations must be cheap to call
/// concurrently.
pub trait AssetProbe: Send + Sync + 'static {
    fn load(&self, asset: &str) -> impl Future<Output = Result<()>> + Send;
}

/// Resolves assets against the generated public directory
pub struct FsAssetProbe {
    public_dir: PathBuf,
}

impl FsAssetProbe {
    pub fn new<P: AsRef<Path>>(public_dir: P) -> Self {
        Self {
            public_dir: public_dir.as_ref().to_path_buf(),
        }
    }

    /// File path for a site path, refusing to leave the public dir
    fn resolve(&self, asset: &str) -> Result<PathBuf> {
        let relative = Path::new(asset.trim_start_matches('/'));
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(anyhow!("refusing to load {}", asset));
        }
        Ok(self.public_dir.join(relative))
    }
}

impl AssetProbe for FsAssetProbe {
    fn load(&self, asset: &str) -> impl Future<Output = Result<()>> + Send {
        let is_remote = asset.starts_with("http://")
            || asset.starts_with("https://")
            || asset.starts_with("//");
        let resolved = if is_remote {
            None
        } else {
            Some(self.resolve(asset))
        };
        let asset = asset.to_string();

        async move {
            let Some(path) = resolved else {
                // Remote assets are the browser's business
                tracing::trace!("Not probing remote asset {}", asset);
                return Ok(());
            };
            let path = path?;
            let metadata = tokio::fs::metadata(&path)
                .await
                .map_err(|e| anyhow!("{}: {}", path.display(), e))?;
            if !metadata.is_file() || metadata.len() == 0 {
                return Err(anyhow!("{} is not a usable file", path.display()));
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[tokio::test]
    async fn test_fs_probe() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("images")).unwrap();
        fs::write(dir.path().join("images/ok.jpg"), b"jpeg").unwrap();
        fs::write(dir.path().join("images/empty.jpg"), b"").unwrap();

        let probe = FsAssetProbe::new(dir.path());
        assert!(probe.load("/images/ok.jpg").await.is_ok());
        assert!(probe.load("/images/empty.jpg").await.is_err());
        assert!(probe.load("/images/missing.jpg").await.is_err());
        assert!(probe.load("/images").await.is_err());
        assert!(probe.load("/../etc/passwd").await.is_err());
        assert!(probe.load("https://cdn.example.com/x.png").await.is_ok());
    }
}

use rafx_resource_cache::{ResourceCacheConfig, ResourceLoadError, ResourceLoadResult};
use serde::Deserialize;
use std::path::Path;

/// Cache settings for each resource manager, read from a RON file like:
///
/// ```ron
/// (
///     shaders: (reload_loop: true, reload_interval: Some((secs: 0, nanos: 250000000))),
///     textures: (reload_loop: false),
/// )
/// ```
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DemoCacheConfig {
    pub shaders: ResourceCacheConfig,
    pub textures: ResourceCacheConfig,
}

impl DemoCacheConfig {
    pub fn from_ron_str(ron_str: &str) -> ResourceLoadResult<Self> {
        ron::de::from_str(ron_str).map_err(|e| {
            ResourceLoadError::parse()
                .with_resource_id("cache config")
                .with_description(e.to_string())
        })
    }

    pub fn load(path: &Path) -> ResourceLoadResult<Self> {
        let ron_str = std::fs::read_to_string(path).map_err(|e| {
            ResourceLoadError::from(e).with_source_locator(path.display().to_string())
        })?;

        Self::from_ron_str(&ron_str)
            .map_err(|e| e.with_source_locator(path.display().to_string()))
    }

    /// Turns on the reload loop for every manager
    pub fn force_reload_loop(&mut self) {
        self.shaders.reload_loop = true;
        self.textures.reload_loop = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rafx_resource_cache::ResourceLoadErrorKind;
    use std::time::Duration;

    #[test]
    fn test_parse_partial_config() {
        let config = DemoCacheConfig::from_ron_str(
            "(shaders: (reload_loop: true, reload_interval: Some((secs: 1, nanos: 0))))",
        )
        .unwrap();

        assert!(config.shaders.reload_loop);
        assert_eq!(config.shaders.reload_interval, Some(Duration::from_secs(1)));
        assert_eq!(config.textures, ResourceCacheConfig::default());
    }

    #[test]
    fn test_parse_error() {
        let error = DemoCacheConfig::from_ron_str("(shaders: ").unwrap_err();
        assert_eq!(*error.kind(), ResourceLoadErrorKind::Parse);
    }

    #[test]
    fn test_force_reload_loop() {
        let mut config = DemoCacheConfig::default();
        config.force_reload_loop();
        assert!(config.shaders.reload_loop);
        assert!(config.textures.reload_loop);
        assert_eq!(config.textures.reload_interval, None);
    }
}

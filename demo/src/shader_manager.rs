use crate::App;
use rafx_resource_cache::{
    KeyTranslation, LoadingPolicy, ResourceArc, ResourceCache, ResourceCacheConfig,
    ResourceCacheMetrics, ResourceLoadError, ResourceLoadResult,
};
use std::sync::Arc;

/// Shader source with its defines already applied
#[derive(Debug)]
pub struct Shader {
    pub path: String,
    pub defines: Vec<String>,
    pub source: String,
}

// A shader key is a path followed by any number of defines: "shaders/mesh.frag,USE_FOG,PBR"
struct ShaderKey<'a> {
    path: &'a str,
    defines: Vec<&'a str>,
}

impl<'a> ShaderKey<'a> {
    fn parse(key: &'a str) -> Self {
        let mut parts = key.split(',').map(str::trim);
        let path = parts.next().unwrap_or_default();
        let mut defines: Vec<&str> = parts.filter(|define| !define.is_empty()).collect();
        defines.sort_unstable();
        defines.dedup();

        ShaderKey { path, defines }
    }

    fn to_canonical_string(&self) -> String {
        let mut canonical = self.path.to_string();
        for define in &self.defines {
            canonical.push(',');
            canonical.push_str(define);
        }
        canonical
    }
}

/// Normalizes "path, B,A,A" to "path,A,B" before the key reaches the loader
#[derive(Debug, Default, Copy, Clone)]
pub struct ShaderKeyTranslation;

impl KeyTranslation<String> for ShaderKeyTranslation {
    fn translate_creation_parameters(
        &self,
        key: &String,
    ) -> String {
        ShaderKey::parse(key).to_canonical_string()
    }
}

#[derive(Debug, Default, Copy, Clone)]
pub struct ShaderLoadingPolicy;

impl LoadingPolicy<String, Shader> for ShaderLoadingPolicy {
    type Context = App;

    fn create(
        &self,
        parameter: &String,
        app: &App,
    ) -> ResourceLoadResult<Shader> {
        let key = ShaderKey::parse(parameter);
        let file_path = app.resolve_asset_path(key.path);
        log::debug!("compiling shader {:?} from {:?}", parameter, file_path);

        let file_source = std::fs::read_to_string(&file_path).map_err(|e| {
            ResourceLoadError::from(e)
                .with_resource_id(parameter.as_str())
                .with_source_locator(file_path.display().to_string())
        })?;

        if file_source.trim().is_empty() {
            return Err(ResourceLoadError::parse()
                .with_resource_id(parameter.as_str())
                .with_source_locator(file_path.display().to_string())
                .with_description("shader source is empty"));
        }

        let mut source = String::new();
        for define in &key.defines {
            source.push_str("#define ");
            source.push_str(define);
            source.push('\n');
        }
        source.push_str(&file_source);

        Ok(Shader {
            path: key.path.to_string(),
            defines: key.defines.iter().map(|define| define.to_string()).collect(),
            source,
        })
    }
}

pub type ShaderCache = ResourceCache<String, Shader, ShaderLoadingPolicy, ShaderKeyTranslation>;

pub struct ShaderManager {
    cache: ShaderCache,
}

impl ShaderManager {
    pub fn new(
        app: Arc<App>,
        config: ResourceCacheConfig,
    ) -> Self {
        let cache: ShaderCache =
            ResourceCache::with_translation(app, ShaderLoadingPolicy, ShaderKeyTranslation)
                .with_config(config);

        ShaderManager { cache }
    }

    pub fn get_shader(
        &mut self,
        key: &str,
    ) -> ResourceLoadResult<ResourceArc<Shader>> {
        self.cache.get_resource(key)
    }

    pub fn has_shader(
        &self,
        key: &str,
    ) -> bool {
        self.cache.has_resource(key)
    }

    pub fn cache(&self) -> &ShaderCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut ShaderCache {
        &mut self.cache
    }

    pub fn metrics(&self) -> ResourceCacheMetrics {
        self.cache.metrics()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rafx_resource_cache::ResourceLoadErrorKind;

    #[test]
    fn test_translation_sorts_and_dedups_defines() {
        let translate =
            |key: &str| ShaderKeyTranslation.translate_creation_parameters(&key.to_string());
        assert_eq!(translate("shaders/mesh.frag"), "shaders/mesh.frag");
        assert_eq!(
            translate("shaders/mesh.frag, USE_FOG,PBR,,USE_FOG"),
            "shaders/mesh.frag,PBR,USE_FOG"
        );
    }

    #[test]
    fn test_load_shader_with_defines() {
        let asset_dir = tempfile::tempdir().unwrap();
        std::fs::write(asset_dir.path().join("mesh.frag"), "void main() {}\n").unwrap();

        let mut manager =
            ShaderManager::new(Arc::new(App::new(asset_dir.path())), Default::default());
        let shader = manager.get_shader("mesh.frag,USE_FOG,PBR").unwrap();
        assert_eq!(shader.path, "mesh.frag");
        assert_eq!(shader.defines, vec!["PBR", "USE_FOG"]);
        assert_eq!(
            shader.source,
            "#define PBR\n#define USE_FOG\nvoid main() {}\n"
        );

        // Different lookup keys are different entries, even if they translate to the same thing
        let same_key = manager.get_shader("mesh.frag,USE_FOG,PBR").unwrap();
        let reordered = manager.get_shader("mesh.frag,PBR,USE_FOG").unwrap();
        assert!(shader.ptr_eq(&same_key));
        assert!(!shader.ptr_eq(&reordered));
        assert_eq!(shader.source, reordered.source);
        assert_eq!(manager.metrics().load_count, 2);
        assert!(manager.has_shader("mesh.frag,USE_FOG,PBR"));
        assert!(!manager.has_shader("mesh.frag,PBR,USE_FOG,"));
    }

    #[test]
    fn test_missing_and_empty_shaders() {
        let asset_dir = tempfile::tempdir().unwrap();
        std::fs::write(asset_dir.path().join("empty.vert"), "   \n").unwrap();

        let mut manager =
            ShaderManager::new(Arc::new(App::new(asset_dir.path())), Default::default());

        let error = manager.get_shader("missing.vert").unwrap_err();
        assert_eq!(*error.kind(), ResourceLoadErrorKind::NotFound);
        assert_eq!(error.resource_id(), Some("missing.vert"));

        let error = manager.get_shader("empty.vert,A").unwrap_err();
        assert_eq!(*error.kind(), ResourceLoadErrorKind::Parse);
        assert_eq!(error.resource_id(), Some("empty.vert,A"));
        assert!(!manager.has_shader("empty.vert,A"));
    }
}

use crate::App;
use rafx_resource_cache::{
    LoadingPolicy, ResourceArc, ResourceCache, ResourceCacheConfig, ResourceCacheMetrics,
    ResourceLoadError, ResourceLoadResult,
};
use std::sync::Arc;

pub const WHITE_TEXTURE: &str = "builtin/white";
pub const CHECKER_TEXTURE: &str = "builtin/checker";

const CHECKER_SIZE: u32 = 8;

/// Decoded RGBA8 image data
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl Texture {
    pub fn solid(
        width: u32,
        height: u32,
        color: [u8; 4],
    ) -> Self {
        let pixel_count = width as usize * height as usize;
        Texture {
            width,
            height,
            rgba: color.repeat(pixel_count),
        }
    }

    pub fn checker(
        size: u32,
        color_a: [u8; 4],
        color_b: [u8; 4],
    ) -> Self {
        let mut rgba = Vec::with_capacity(size as usize * size as usize * 4);
        for y in 0..size {
            for x in 0..size {
                if (x + y) % 2 == 0 {
                    rgba.extend_from_slice(&color_a);
                } else {
                    rgba.extend_from_slice(&color_b);
                }
            }
        }

        Texture {
            width: size,
            height: size,
            rgba,
        }
    }

    /// Returns None if the coordinates are outside the texture
    pub fn pixel(
        &self,
        x: u32,
        y: u32,
    ) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }

        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let pixel = self.rgba.get(offset..offset + 4)?;
        Some([pixel[0], pixel[1], pixel[2], pixel[3]])
    }
}

#[derive(Debug, Default, Copy, Clone)]
pub struct TextureLoadingPolicy;

impl LoadingPolicy<String, Texture> for TextureLoadingPolicy {
    type Context = App;

    fn create(
        &self,
        parameter: &String,
        app: &App,
    ) -> ResourceLoadResult<Texture> {
        profiling::scope!("TextureLoadingPolicy::create");
        let file_path = app.resolve_asset_path(parameter);
        let source_locator = file_path.display().to_string();

        let bytes = std::fs::read(&file_path).map_err(|e| {
            ResourceLoadError::from(e)
                .with_resource_id(parameter.as_str())
                .with_source_locator(source_locator.as_str())
        })?;

        let decoded = image::load_from_memory(&bytes).map_err(|e| {
            ResourceLoadError::parse()
                .with_resource_id(parameter.as_str())
                .with_source_locator(source_locator.as_str())
                .with_description(e.to_string())
        })?;

        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();
        if width == 0 || height == 0 {
            return Err(ResourceLoadError::from("texture has no pixels")
                .with_resource_id(parameter.as_str())
                .with_source_locator(source_locator));
        }

        log::debug!("decoded texture {:?} {}x{}", parameter, width, height);
        Ok(Texture {
            width,
            height,
            rgba: rgba.into_raw(),
        })
    }
}

pub type TextureCache = ResourceCache<String, Texture, TextureLoadingPolicy>;

pub struct TextureManager {
    cache: TextureCache,
    // The cache doesn't keep anything alive, so built-in textures are held here
    builtin_textures: Vec<ResourceArc<Texture>>,
    placeholder: ResourceArc<Texture>,
}

impl TextureManager {
    pub fn new(
        app: Arc<App>,
        config: ResourceCacheConfig,
    ) -> Self {
        let mut cache: TextureCache =
            ResourceCache::new(app, TextureLoadingPolicy).with_config(config);

        let white = cache.set_resource(
            WHITE_TEXTURE.to_string(),
            Texture::solid(1, 1, [255, 255, 255, 255]),
        );
        let placeholder = cache.set_resource(
            CHECKER_TEXTURE.to_string(),
            Texture::checker(CHECKER_SIZE, [255, 0, 255, 255], [0, 0, 0, 255]),
        );

        TextureManager {
            cache,
            builtin_textures: vec![white, placeholder.clone()],
            placeholder,
        }
    }

    pub fn get_texture(
        &mut self,
        key: &str,
    ) -> ResourceLoadResult<ResourceArc<Texture>> {
        self.cache.get_resource(key)
    }

    /// Returns the checkerboard placeholder if the texture can't be loaded
    pub fn get_texture_or_placeholder(
        &mut self,
        key: &str,
    ) -> ResourceArc<Texture> {
        match self.cache.get_resource(key) {
            Ok(texture) => texture,
            Err(e) => {
                log::warn!("Using placeholder for texture {}: {}", key, e);
                self.placeholder.clone()
            }
        }
    }

    /// Adds a texture that wasn't loaded from disk. The manager keeps it alive until it is
    /// replaced or the manager is dropped.
    pub fn register_texture(
        &mut self,
        key: &str,
        texture: Texture,
    ) -> ResourceArc<Texture> {
        let texture = self.cache.set_resource(key.to_string(), texture);
        self.builtin_textures.push(texture.clone());
        texture
    }

    /// Textures the manager is keeping alive itself
    pub fn builtin_textures(&self) -> &[ResourceArc<Texture>] {
        &self.builtin_textures
    }

    pub fn placeholder(&self) -> &ResourceArc<Texture> {
        &self.placeholder
    }

    pub fn cache(&self) -> &TextureCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut TextureCache {
        &mut self.cache
    }

    pub fn metrics(&self) -> ResourceCacheMetrics {
        self.cache.metrics()
    }
}

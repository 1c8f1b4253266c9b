use rafx_resource_cache::{ReloadCancelToken, ResourceLoadResult};
use std::sync::Arc;
use std::time::Duration;

mod app;
pub use app::App;

mod cache_config;
pub use cache_config::DemoCacheConfig;

mod demo_args;
pub use demo_args::DemoArgs;

mod shader_manager;
pub use shader_manager::{
    Shader, ShaderCache, ShaderKeyTranslation, ShaderLoadingPolicy, ShaderManager,
};

mod texture_manager;
pub use texture_manager::{
    Texture, TextureCache, TextureLoadingPolicy, TextureManager, CHECKER_TEXTURE, WHITE_TEXTURE,
};

pub fn run(args: &DemoArgs) -> ResourceLoadResult<()> {
    let mut config = match &args.config {
        Some(path) => DemoCacheConfig::load(path)?,
        None => DemoCacheConfig::default(),
    };

    if args.reload_loop {
        config.force_reload_loop();
    }

    log::info!(
        "Loading assets from {:?} with {:?}",
        args.asset_dir,
        config
    );

    let app = Arc::new(App::new(&args.asset_dir));
    let mut shader_manager = ShaderManager::new(app.clone(), config.shaders.clone());
    let mut texture_manager = TextureManager::new(app, config.textures.clone());

    if let Some(reload_timeout_secs) = args.reload_timeout_secs {
        let cancel_token = ReloadCancelToken::new();
        shader_manager
            .cache_mut()
            .set_reload_cancel_token(Some(cancel_token.clone()));
        texture_manager
            .cache_mut()
            .set_reload_cancel_token(Some(cancel_token.clone()));

        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_secs(reload_timeout_secs));
            cancel_token.cancel();
        });
    }

    let mut shaders = Vec::with_capacity(args.shaders.len());
    for key in &args.shaders {
        let shader = shader_manager.get_shader(key)?;
        log::info!(
            "Shader {} -> {} ({} defines, {} bytes)",
            key,
            shader.path,
            shader.defines.len(),
            shader.source.len()
        );
        shaders.push(shader);
    }

    let mut textures = Vec::with_capacity(args.textures.len());
    for key in &args.textures {
        let texture = texture_manager.get_texture_or_placeholder(key);
        log::info!("Texture {} -> {}x{}", key, texture.width, texture.height);
        textures.push(texture);
    }

    // Everything requested is held, so a second round is served from the cache
    for key in &args.shaders {
        shader_manager.get_shader(key)?;
    }

    log::info!("Shader cache: {:?}", shader_manager.metrics());
    log::info!("Texture cache: {:?}", texture_manager.metrics());

    drop(shaders);
    drop(textures);

    let live_shaders = shader_manager.metrics().live_count;
    log::info!(
        "After release: {} shader keys known, {} live",
        shader_manager.cache().len(),
        live_shaders
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_loads_requested_assets() {
        let asset_dir = tempfile::tempdir().unwrap();
        std::fs::write(asset_dir.path().join("quad.vert"), "void main() {}\n").unwrap();

        let args = DemoArgs {
            asset_dir: asset_dir.path().to_path_buf(),
            config: None,
            reload_loop: false,
            reload_timeout_secs: None,
            shaders: vec!["quad.vert,A".to_string(), "quad.vert".to_string()],
            textures: vec!["missing.png".to_string()],
        };
        run(&args).unwrap();

        let args = DemoArgs {
            shaders: vec!["missing.vert".to_string()],
            ..args
        };
        assert!(run(&args).is_err());
    }
}

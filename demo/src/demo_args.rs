use std::path::PathBuf;
use structopt::StructOpt;

/// Loads shaders and textures through the resource caches and reports what the caches did.
///
/// # Examples
///
/// ```bash
/// demo --asset-dir assets --shader "shaders/mesh.frag,USE_FOG" --texture textures/albedo.png
/// ```
#[derive(StructOpt, Debug, Clone)]
pub struct DemoArgs {
    /// Directory that shader and texture keys are relative to
    #[structopt(name = "asset-dir", long, parse(from_os_str), default_value = "assets")]
    pub asset_dir: PathBuf,

    /// RON file with per-manager cache settings
    #[structopt(name = "config", long, parse(from_os_str))]
    pub config: Option<PathBuf>,

    /// Keep retrying failed loads until they succeed (blocks on missing files)
    #[structopt(name = "reload-loop", long)]
    pub reload_loop: bool,

    /// Give up on a reload loop after this many seconds
    #[structopt(name = "reload-timeout", long)]
    pub reload_timeout_secs: Option<u64>,

    /// Shader to load, as a path optionally followed by defines: "shaders/mesh.frag,USE_FOG"
    #[structopt(name = "shader", long)]
    pub shaders: Vec<String>,

    /// Texture to load, relative to the asset directory
    #[structopt(name = "texture", long)]
    pub textures: Vec<String>,
}

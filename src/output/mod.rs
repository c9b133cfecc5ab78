//! Output emitters
//!
//! `emit_scene` writes the tile-engine triple plus the atlas image;
//! `emit_tiled` writes the Tiled document in both encodings plus the
//! texture images.

pub mod images;
pub mod scene;
pub mod stage_config;
pub mod tile_config;
pub mod tmx;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::ConversionConfig;
use crate::convert::Conversion;
use crate::error::Result;

pub use scene::Scene;
pub use stage_config::StageConfig;
pub use tile_config::TileConfig;
pub use tmx::TileMap;

/// The three tile-engine files, built but not yet written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneBundle {
    pub scene: Scene,
    pub stage_config: StageConfig,
    pub tile_config: TileConfig,
}

impl SceneBundle {
    pub fn from_conversion(conversion: &Conversion) -> Result<Self> {
        let (scene, class_names) = Scene::from_conversion(conversion)?;
        Ok(Self {
            scene,
            stage_config: StageConfig::new(class_names, &conversion.palette),
            tile_config: TileConfig::with_solids(&conversion.solid_tiles),
        })
    }
}

pub fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    out.write_all(bytes)?;
    out.flush()?;
    Ok(())
}

fn prepare_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    Ok(())
}

pub fn emit_scene(dir: &Path, conversion: &Conversion) -> Result<Vec<PathBuf>> {
    prepare_dir(dir)?;
    let bundle = SceneBundle::from_conversion(conversion)?;

    let files = [
        (scene::FILE_NAME, bundle.scene.to_bytes()?),
        (stage_config::FILE_NAME, bundle.stage_config.to_bytes()?),
        (tile_config::FILE_NAME, bundle.tile_config.to_bytes()?),
    ];
    let mut written = Vec::with_capacity(files.len() + 1);
    for (name, bytes) in &files {
        let path = dir.join(name);
        write_file(&path, bytes)?;
        info!(path = %path.display(), bytes = bytes.len(), "wrote");
        written.push(path);
    }

    let atlas = dir.join(images::ATLAS_FILE_NAME);
    images::write_atlas(&atlas, conversion)?;
    written.push(atlas);
    Ok(written)
}

pub fn emit_tiled(dir: &Path, conversion: &Conversion, config: &ConversionConfig) -> Result<Vec<PathBuf>> {
    prepare_dir(dir)?;
    let map = TileMap::from_conversion(conversion, config);

    let tmx = dir.join(format!("{}.tmx", config.map_name));
    write_file(&tmx, map.to_xml().as_bytes())?;
    info!(path = %tmx.display(), layers = map.layers.len(), "wrote");

    let tmj = dir.join(format!("{}.tmj", config.map_name));
    write_file(&tmj, map.to_json()?.as_bytes())?;
    info!(path = %tmj.display(), "wrote");

    let mut written = vec![tmx, tmj];
    written.extend(images::write_textures(dir, conversion, config)?);
    Ok(written)
}

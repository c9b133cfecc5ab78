use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use level_convert::codec::BinaryReader;
use level_convert::output::{scene, stage_config, tile_config};
use level_convert::{
    output, Conversion, ConversionConfig, Converter, NameCatalogue, ObjectContainer, Scene, StageConfig,
    TileConfig, TileContainer,
};

#[derive(Parser)]
#[command(name = "level-convert")]
#[command(about = "Convert compiled .ltb/.lvb levels into scene binaries or Tiled maps")]
struct Cli {
    /// JSON file overriding the built-in conversion tables
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write Scene1.bin, StageConfig.bin, TileConfig.bin and the tile atlas
    Scene {
        ltb: PathBuf,
        lvb: PathBuf,
        #[arg(long, default_value = "Scene")]
        out: PathBuf,
    },
    /// Write a Tiled map (.tmx and .tmj) and the embedded textures
    Tiled {
        ltb: PathBuf,
        lvb: PathBuf,
        #[arg(long, default_value = "Tiled")]
        out: PathBuf,
    },
    /// Summarize containers or previously written scene files
    Dump { files: Vec<PathBuf> },
}

fn convert(ltb: &Path, lvb: &Path, config: &ConversionConfig) -> level_convert::Result<Conversion> {
    let tiles = TileContainer::open(ltb)?;
    let objects = ObjectContainer::open(lvb)?;
    Converter::new(&tiles, &objects, config, NameCatalogue::builtin()).run()
}

fn dump_tiles(tiles: &TileContainer) {
    let h = &tiles.header;
    println!("tile size {}, chunk {}x{}", h.tile_size, h.chunk_width, h.chunk_height());
    println!("layers: {}", tiles.layers.len());
    for layer in &tiles.layers {
        let b = layer.bounds;
        println!(
            "  {:<20} ({},{})..({},{}) cam {:.3}/{:.3} vb {} {}",
            layer.name,
            b.start_x,
            b.start_y,
            b.end_x,
            b.end_y,
            layer.camera_mult_x,
            layer.camera_mult_y,
            layer.vertex_buffer_index,
            if layer.uses_static_buffer {
                "static".to_string()
            } else {
                format!("chunks {}x{} from {}", layer.chunk_columns, layer.chunk_rows, layer.first_chunk)
            }
        );
    }
    println!("textures: {}", tiles.textures.len());
    for (i, texture) in tiles.textures.iter().enumerate() {
        println!(
            "  #{i} {}x{} {} bytes{}",
            texture.width,
            texture.height,
            texture.size,
            if texture.compressed { " (wflz)" } else { "" }
        );
    }
    println!(
        "chunks: {}, tile cells: {}, uv points: {}, static quads: {}",
        tiles.chunk_starts.len(),
        tiles.tile_buffer.len(),
        tiles.uvs.len(),
        tiles.static_vertices.len() / 4
    );
}

fn dump_objects(objects: &ObjectContainer, config: &ConversionConfig) {
    let names = NameCatalogue::builtin();
    println!("objects: {}", objects.objects.len());
    for object in &objects.objects {
        let type_id = object.type_id();
        println!(
            "  #{:<5} {:<24} ({:.2}, {:.2}) {} properties",
            object.group_id,
            config.object_name(type_id).map_or_else(|| type_id.to_string(), str::to_string),
            object.x,
            object.y,
            object.property_count
        );
        for property in objects.properties_of(object) {
            let value = objects.strings.get(property.string_offset).unwrap_or_default();
            println!("      {} = {value}", names.resolve(property.name_hash));
        }
    }
    println!(
        "rect batches: {}, rects: {}, regions: {}, strings: {} bytes",
        objects.rect_batches.len(),
        objects.rects.len(),
        objects.regions.len(),
        objects.strings.len()
    );
}

fn dump_written(bytes: &[u8]) -> level_convert::Result<()> {
    let magic = BinaryReader::new(bytes).read_u32_le()?;
    let mut reader = BinaryReader::new(bytes);
    match magic {
        scene::SCENE_MAGIC => {
            let scene = Scene::read(&mut reader)?;
            println!("scene: {} layers, {} classes", scene.layers.len(), scene.classes.len());
            for layer in &scene.layers {
                let used = layer.tiles.iter().filter(|&&t| t != scene::EMPTY_TILE).count();
                println!("  {:<20} {}x{} {used} tiles", layer.name, layer.width, layer.height);
            }
            for class in &scene.classes {
                println!("  class {:02x?} {} entities", &class.hash[..4], class.entities.len());
            }
        }
        stage_config::STAGE_CONFIG_MAGIC => {
            let config = StageConfig::read(&mut reader)?;
            println!("stage config: {} classes, {} sounds", config.class_names.len(), config.sounds.len());
            for name in &config.class_names {
                println!("  {name}");
            }
        }
        tile_config::TILE_CONFIG_MAGIC => {
            let config = TileConfig::read(&mut reader)?;
            let solid = config.plane_a.iter().filter(|m| m.is_solid()).count();
            println!("tile config: {solid} solid tiles");
        }
        other => println!("unrecognized magic {other:#010x}"),
    }
    Ok(())
}

fn dump(path: &Path, config: &ConversionConfig) -> level_convert::Result<()> {
    println!("== {}", path.display());
    let extension = path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("ltb") => dump_tiles(&TileContainer::open(path)?),
        Some("lvb") => dump_objects(&ObjectContainer::open(path)?, config),
        _ => dump_written(&std::fs::read(path)?)?,
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => ConversionConfig::load(path)?,
        None => ConversionConfig::default(),
    };

    match cli.command {
        Commands::Scene { ltb, lvb, out } => {
            let conversion = convert(&ltb, &lvb, &config)?;
            for path in output::emit_scene(&out, &conversion)? {
                println!("{}", path.display());
            }
        }
        Commands::Tiled { ltb, lvb, out } => {
            let conversion = convert(&ltb, &lvb, &config)?;
            for path in output::emit_tiled(&out, &conversion, &config)? {
                println!("{}", path.display());
            }
        }
        Commands::Dump { files } => {
            for path in &files {
                dump(path, &config)?;
            }
        }
    }
    Ok(())
}

mod common;

use std::path::PathBuf;

use level_convert::codec::BinaryReader;
use level_convert::container::{TileCell, TileFlags};
use level_convert::convert::{layers, LayerTiles, StaticGrid};
use level_convert::output::{self, scene, tmx::MapLayer};
use level_convert::{
    Conversion, Converter, Error, NameCatalogue, ObjectContainer, PropertyType, PropertyValue, Scene, SceneBundle,
    StageConfig, TileConfig, TileContainer, TileMap,
};

fn convert() -> Conversion {
    let tiles = TileContainer::parse(common::tile_container()).unwrap();
    let objects = ObjectContainer::parse(&common::object_container()).unwrap();
    let config = common::config();
    Converter::new(&tiles, &objects, &config, NameCatalogue::builtin()).run().unwrap()
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("level-convert-{}-{name}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

#[test]
fn test_fixture_containers_parse() {
    let tiles = TileContainer::parse(common::tile_container()).unwrap();
    assert_eq!(tiles.layers.len(), 4);
    assert_eq!(tiles.layers[0].name, "PF");
    assert_eq!(tiles.header.chunk_height(), 16);
    assert_eq!(tiles.texture_payload(0).unwrap().len(), 18 * 18 * 4);

    let objects = ObjectContainer::parse(&common::object_container()).unwrap();
    assert_eq!(objects.objects.len(), 2);
    assert_eq!(objects.strings.get(0).unwrap(), "3");
    assert!(objects.regions.is_empty());
}

#[test]
fn test_solid_chunk_cell_marks_only_its_tile() {
    let conversion = convert();
    // raw id 2 with an atlas start of 0 lands on tile 1
    assert_eq!(conversion.solid_tiles.iter().copied().collect::<Vec<_>>(), vec![1]);

    let pf = conversion.slots[1].as_ref().unwrap();
    let (x, y) = common::SOLID_AT;
    assert_eq!(pf.get(x, y), Some(TileCell { id: 1, flags: TileFlags::SOLID }));

    let tile_config = TileConfig::with_solids(&conversion.solid_tiles);
    let solid: Vec<usize> = (0..tile_config.plane_a.len()).filter(|&i| tile_config.plane_a[i].is_solid()).collect();
    assert_eq!(solid, vec![1]);
    assert!(tile_config.plane_b[1].is_solid());
}

#[test]
fn test_origin_quad_lands_on_static_grid() {
    let conversion = convert();
    assert_eq!(conversion.static_grid.get(15, 10), 1);
    assert_eq!(conversion.static_grid.width(), 16);
    assert_eq!(conversion.static_grid.height(), 11);

    let bg = conversion.layers.iter().find(|l| l.name == "BG").unwrap();
    let LayerTiles::Static { cells } = &bg.tiles else {
        panic!("BG should be a static layer");
    };
    // bottom-up read: grid row 10 is layer row 0
    assert_eq!(cells[15], 1);
    assert_eq!(cells.iter().filter(|&&c| c != 0).count(), 1);

    let slot = conversion.slots[0].as_ref().unwrap();
    assert_eq!(slot.get(15, 0).map(|c| c.id), Some(0));
}

#[test]
fn test_variant_and_degenerate_layers_skipped() {
    let conversion = convert();
    let names: Vec<&str> = conversion.layers.iter().map(|l| l.name.as_str()).collect();
    assert_eq!(names, vec!["PF", "BG"]);
}

#[test]
fn test_palette_and_atlas() {
    let conversion = convert();
    assert_eq!(conversion.discovered_colors, 1);
    assert_eq!(conversion.palette[0], 0xFFFF_00FF);
    assert_eq!(conversion.palette[1], common::config().padding_abgr);
    assert_eq!(conversion.atlas.tile_count(), 1);
    assert!(conversion.atlas.tile(0).unwrap().iter().all(|&p| p == 0));
}

#[test]
fn test_objects_resolved() {
    let conversion = convert();
    assert_eq!(conversion.objects.len(), 2);
    let player = &conversion.objects[0];
    assert_eq!(player.class_name.as_deref(), Some("Player"));
    assert_eq!(player.properties[0].name, "HEALTH");
    assert!(player.properties[0].known);
    assert_eq!(player.properties[0].value, PropertyValue::Int32(3));

    let unknown = &conversion.objects[1];
    assert_eq!(unknown.class_name, None);
    assert_eq!(unknown.label(), "999");
}

#[test]
fn test_scene_bundle() {
    let conversion = convert();
    let bundle = SceneBundle::from_conversion(&conversion).unwrap();

    assert_eq!(bundle.scene.layers.len(), 2);
    assert_eq!(bundle.scene.layers[1].name, "PF");
    let (x, y) = common::SOLID_AT;
    let encoded = bundle.scene.layers[1].tile(x as u16, y as u16).unwrap();
    assert_eq!(encoded, scene::encode_cell(Some(TileCell { id: 1, flags: TileFlags::SOLID })));

    // unknown object types stay out of the scene
    assert_eq!(bundle.scene.classes.len(), 1);
    let player = bundle.scene.class("Player").unwrap();
    assert_eq!(player.properties.len(), 2);
    assert_eq!(player.properties[0].ty, PropertyType::UInt8);
    assert_eq!(player.properties[1].ty, PropertyType::Int32);
    assert_eq!(player.entities[0].x, 10 << 16);
    assert_eq!(player.entities[0].values, vec![PropertyValue::UInt8(0), PropertyValue::Int32(3)]);

    assert_eq!(bundle.stage_config.class_names, vec!["Player".to_string()]);
}

#[test]
fn test_conversion_is_deterministic() {
    let first = SceneBundle::from_conversion(&convert()).unwrap();
    let second = SceneBundle::from_conversion(&convert()).unwrap();
    assert_eq!(first.scene.to_bytes().unwrap(), second.scene.to_bytes().unwrap());
    assert_eq!(first.stage_config.to_bytes().unwrap(), second.stage_config.to_bytes().unwrap());
    assert_eq!(first.tile_config.to_bytes().unwrap(), second.tile_config.to_bytes().unwrap());

    let config = common::config();
    let a = TileMap::from_conversion(&convert(), &config);
    let b = TileMap::from_conversion(&convert(), &config);
    assert_eq!(a.to_xml(), b.to_xml());
    assert_eq!(a.to_json().unwrap(), b.to_json().unwrap());
}

#[test]
fn test_tiled_document() {
    let config = common::config();
    let map = TileMap::from_conversion(&convert(), &config);
    assert!(map.infinite);
    assert_eq!((map.width, map.height), (16, 16));
    assert_eq!(map.tilesets[0].source, "Fixture.tsx");

    let names: Vec<&str> = map.layers.iter().map(MapLayer::name).collect();
    assert_eq!(names, vec!["PF", "BG", "Player", "999"]);

    let MapLayer::Tiles(pf) = &map.layers[0] else {
        panic!("PF should be a tile layer");
    };
    let chunk = &pf.chunks.as_ref().unwrap()[0];
    let (x, y) = common::SOLID_AT;
    assert_eq!(chunk.data[y * 16 + x], 2);

    // static layers are chunked too once the map is infinite
    let MapLayer::Tiles(bg) = &map.layers[1] else {
        panic!("BG should be a tile layer");
    };
    assert!(bg.data.is_none());
    let chunks = bg.chunks.as_ref().unwrap();
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].data[15], 1);

    let json: serde_json::Value = serde_json::from_str(&map.to_json().unwrap()).unwrap();
    assert_eq!(json["type"], "map");
    assert_eq!(json["layers"][2]["objects"][0]["id"], 5);

    let xml = map.to_xml();
    assert!(xml.starts_with("<?xml"));
    assert!(xml.contains("<tileset firstgid=\"1\" source=\"Fixture.tsx\"/>"));
}

#[test]
fn test_scene_files_read_back() {
    let dir = scratch_dir("scene");
    let conversion = convert();
    let written = output::emit_scene(&dir, &conversion).unwrap();
    assert_eq!(written.len(), 4);

    let bytes = std::fs::read(dir.join(scene::FILE_NAME)).unwrap();
    let read = Scene::read(&mut BinaryReader::new(&bytes)).unwrap();
    assert_eq!(read, SceneBundle::from_conversion(&conversion).unwrap().scene);

    let bytes = std::fs::read(dir.join(output::stage_config::FILE_NAME)).unwrap();
    let stage = StageConfig::read(&mut BinaryReader::new(&bytes)).unwrap();
    assert_eq!(stage.class_names, vec!["Player".to_string()]);

    let bytes = std::fs::read(dir.join(output::tile_config::FILE_NAME)).unwrap();
    let tiles = TileConfig::read(&mut BinaryReader::new(&bytes)).unwrap();
    assert!(tiles.plane_a[1].is_solid());
    assert!(!tiles.plane_a[0].is_solid());

    assert!(dir.join(output::images::ATLAS_FILE_NAME).exists());
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_tiled_files_written() {
    let dir = scratch_dir("tiled");
    let config = common::config();
    let written = output::emit_tiled(&dir, &convert(), &config).unwrap();
    assert!(written.contains(&dir.join("Fixture.tmx")));
    assert!(written.contains(&dir.join("Fixture.tmj")));
    assert!(dir.join(output::images::texture_file_name(0)).exists());
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_bad_table_offset_is_a_bounds_error() {
    let mut bytes = common::tile_container();
    // offset field of the layer table entry
    let at = 0x10 + 0x10 + 8;
    bytes[at..at + 8].copy_from_slice(&0x10_0000u64.to_le_bytes());
    match TileContainer::parse(bytes) {
        Err(Error::Bounds { table, .. }) => assert_eq!(table, "layers"),
        other => panic!("expected bounds error, got {:?}", other.map(|t| t.layers.len())),
    }
}

#[test]
fn test_truncated_header() {
    let bytes = common::tile_container()[..0x40].to_vec();
    assert!(matches!(TileContainer::parse(bytes), Err(Error::Bounds { table: "geometry header", .. })));

    let bytes = common::object_container()[..0x20].to_vec();
    assert!(matches!(ObjectContainer::parse(&bytes), Err(Error::Bounds { table: "object header", .. })));
}

#[test]
fn test_huge_chunk_grid_is_an_index_error() {
    let mut tiles = TileContainer::parse(common::tile_container()).unwrap();
    tiles.layers[0].chunk_columns = u32::MAX;
    tiles.layers[0].chunk_rows = u32::MAX;
    tiles.layers[0].first_chunk = u32::MAX;
    let config = common::config();
    let result = layers::convert_layers(&tiles, &StaticGrid::default(), &[0], &config);
    assert!(matches!(result, Err(Error::IndexOutOfRange { table: "chunk starts", .. })));
}

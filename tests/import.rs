//! End-to-end imports of the editor files under `tests/fixtures`, through
//! the real filesystem.

use std::fs;
use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tempfile::tempdir;

use tiledport::atlas::CollisionPolygon;
use tiledport::minimap::Border;
use tiledport::{
    import_resource, FileHost, ImportContext, ImportOptions, ImportStatus, MinimapRecord,
    SourceKind, TilesetResource,
};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn room_options() -> ImportOptions {
    ImportOptions {
        room_width_in_tiles: 4,
        room_height_in_tiles: 3,
        ..ImportOptions::default()
    }
}

#[test]
fn tileset_columns_come_from_the_image() {
    let dir = tempdir().unwrap();
    let resource = dir.path().join("tilesets.json");

    let status = import_resource(&fixture("walls.tsx"), &resource, &ImportOptions::default());
    assert_eq!(status, ImportStatus::Ok);

    let resource = TilesetResource::load(&FileHost, &resource).unwrap();
    let atlas = resource.atlas("walls").unwrap();
    assert_eq!((atlas.columns, atlas.rows), (4, 2));
    assert_eq!(atlas.tile_size, (16, 16));
    assert_eq!(atlas.tiles.len(), 8);

    let wall = atlas.tile((0, 0)).unwrap();
    assert_eq!(wall.tile_type.as_deref(), Some("Wall"));
    assert_eq!(
        wall.collision,
        vec![CollisionPolygon {
            physics_layer: 0,
            points: vec![(-8.0, -8.0), (8.0, -8.0), (8.0, 8.0), (-8.0, 8.0)],
        }]
    );

    let slope = atlas.tile((1, 1)).unwrap();
    assert_eq!(slope.collision[0].physics_layer, 1);
    assert_eq!(slope.collision[0].points, vec![(-8.0, 8.0), (8.0, -8.0), (8.0, 8.0)]);

    let torch = atlas.tile((2, 1)).unwrap();
    let frames: Vec<_> = torch.animation.iter().map(|f| (f.coords, f.duration_ms)).collect();
    assert_eq!(frames, vec![((2, 1), 120), ((3, 1), 120)]);
}

#[test]
fn reimporting_an_unchanged_tileset_writes_nothing() {
    let dir = tempdir().unwrap();
    let resource = dir.path().join("tilesets.json");
    let options = ImportOptions::default();
    let context = ImportContext::new(&FileHost, &options);

    let first = context.import(&fixture("walls.tsx"), &resource).unwrap();
    assert_eq!(first.kind, SourceKind::Tileset);
    assert_eq!(first.written, vec![resource.clone()]);

    let before = fs::read(&resource).unwrap();
    let second = context.import(&fixture("walls.tsx"), &resource).unwrap();
    assert!(second.written.is_empty());
    assert_eq!(fs::read(&resource).unwrap(), before);
}

#[test]
fn map_import_writes_scene_and_atlas() {
    let dir = tempdir().unwrap();
    let scene_path = dir.path().join("rooms/entry.json");
    let resource_path = dir.path().join("tilesets.json");

    let mut options = ImportOptions::from_pairs([("prefab.chest", "res://props/chest.scn")]).unwrap();
    options.tileset_resource = Some(resource_path.clone());

    let report = ImportContext::new(&FileHost, &options)
        .import(&fixture("entry.tmx"), &scene_path)
        .unwrap();
    assert_eq!(report.written, vec![resource_path.clone(), scene_path.clone()]);
    assert!(!report.diagnostics.has_errors());

    let scene = read_json(&scene_path);
    assert_eq!(scene["name"], "entry");
    assert_eq!(scene["size"], json!([8, 3]));
    assert_eq!(scene["nodes"][0]["kind"], "tile_layer");
    assert_eq!(scene["nodes"][0]["tiles"].as_array().unwrap().len(), 17);

    let decor = &scene["nodes"][1];
    assert_eq!(decor["info"]["modulate"], json!([1.0, 1.0, 1.0, 0.5]));
    assert_eq!(decor["tiles"][0]["cell"], json!([1, 1]));
    assert_eq!(decor["tiles"][0]["tile"]["coords"], json!([2, 1]));
    assert_eq!(decor["tiles"][1]["tile"]["local_id"], 5);
    assert_eq!(decor["tiles"][1]["tile"]["flip_h"], true);

    let objects = scene["nodes"][2]["objects"].as_array().unwrap();
    let kinds: Vec<_> = objects.iter().map(|o| o["kind"].as_str().unwrap()).collect();
    assert_eq!(kinds, vec!["prefab", "marker", "body"]);
    assert_eq!(objects[0]["scene"], "res://props/chest.scn");
    assert_eq!(objects[2]["body"], "area");

    let resource = TilesetResource::load(&FileHost, &resource_path).unwrap();
    assert!(resource.atlas("walls").is_some());
}

#[test]
fn world_import_writes_rooms_and_minimap() {
    let dir = tempdir().unwrap();
    let save_path = dir.path().join("caves.json");
    let mut options = room_options();
    options.target_directory = Some(dir.path().join("rooms"));
    options.map_data_output = Some(dir.path().join("minimap"));

    let status = import_resource(&fixture("caves.world"), &save_path, &options);
    assert_eq!(status, ImportStatus::Ok);

    assert!(dir.path().join("rooms/entry.json").is_file());
    assert!(dir.path().join("rooms/hall.json").is_file());

    let world = read_json(&save_path);
    assert_eq!(world["name"], "caves");
    assert_eq!(world["rooms"][1]["position"], json!([128, 0]));
    assert_eq!(world["rooms"][1]["size"], json!([64, 48]));

    let records: Vec<MinimapRecord> = serde_json::from_str(
        &fs::read_to_string(dir.path().join("minimap/caves.json")).unwrap(),
    )
    .unwrap();
    use Border::{Empty, Wall};
    assert_eq!(
        records,
        vec![
            MinimapRecord { x: 0, y: 0, z: 0, borders: [Empty, Wall, Wall, Wall] },
            MinimapRecord { x: 1, y: 0, z: 0, borders: [Empty, Wall, Empty, Wall] },
            MinimapRecord { x: 2, y: 0, z: 0, borders: [Wall, Wall, Empty, Wall] },
        ]
    );
}

#[test]
fn failed_world_import_leaves_no_files() {
    let dir = tempdir().unwrap();
    let world = dir.path().join("broken.world");
    fs::write(
        &world,
        r#"{"maps":[{"fileName":"missing.tmx","x":0,"y":0}],"type":"world"}"#,
    )
    .unwrap();

    let out = dir.path().join("out/broken.json");
    let status = import_resource(&world, &out, &room_options());
    assert_eq!(status, ImportStatus::FileCantRead);
    assert!(!dir.path().join("out").exists());
}

#[test]
fn unknown_extension_is_unsupported() {
    let dir = tempdir().unwrap();
    let status = import_resource(
        &fixture("walls.png"),
        &dir.path().join("walls.json"),
        &ImportOptions::default(),
    );
    assert_eq!(status, ImportStatus::Unsupported);
    assert_eq!(status.code(), 2);
}

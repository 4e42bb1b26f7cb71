//! Turns a decoded map into a [`SceneDescription`].

use crate::error::Result;
use crate::host::PrefabCatalog;
use crate::schema::{
    Group, ImageLayer, Layer, LayerNode, MapObject, ObjectGroup, ObjectShape, Placement, TileMap,
};
use crate::session::ImportSession;

use super::{
    flatten_properties, BodyKind, CollisionShape, GroupNode, ImageNode, LayerInfo, ObjectInfo,
    ObjectLayerNode, ObjectNode, SceneDescription, SceneNode, TileLayerNode, TilePlacement,
};

/// Assemble a map. Any failing layer aborts the whole scene.
pub fn assemble(
    map: &TileMap,
    name: &str,
    session: &ImportSession,
    prefabs: &PrefabCatalog,
) -> Result<SceneDescription> {
    map.ensure_supported()?;

    let assembler = Assembler { session, prefabs };
    Ok(SceneDescription {
        name: name.to_string(),
        size: (map.width, map.height),
        tile_size: (map.tile_width, map.tile_height),
        background: map.background,
        nodes: assembler.nodes(&map.layers)?,
        properties: flatten_properties(&map.properties),
    })
}

struct Assembler<'a> {
    session: &'a ImportSession,
    prefabs: &'a PrefabCatalog,
}

impl Assembler<'_> {
    fn nodes(&self, layers: &[LayerNode]) -> Result<Vec<SceneNode>> {
        layers.iter().map(|node| self.node(node)).collect()
    }

    fn node(&self, node: &LayerNode) -> Result<SceneNode> {
        Ok(match node {
            LayerNode::Tiles(layer) => SceneNode::TileLayer(self.tile_layer(layer)?),
            LayerNode::Group(group) => SceneNode::Group(self.group(group)?),
            LayerNode::Objects(group) => SceneNode::Objects(self.object_layer(group)?),
            LayerNode::Image(layer) => SceneNode::Image(image_layer(layer)),
        })
    }

    fn tile_layer(&self, layer: &Layer) -> Result<TileLayerNode> {
        let cells = layer.cells()?;
        let width = layer.width.max(1);

        let mut tiles = Vec::new();
        for (index, raw) in cells.into_iter().enumerate() {
            let Some(tile) = self
                .session
                .resolve(raw)
                .map_err(|e| e.in_layer(&layer.name))?
            else {
                continue;
            };
            let index = index as u32;
            tiles.push(TilePlacement {
                cell: (index % width, index / width),
                tile,
            });
        }

        Ok(TileLayerNode {
            info: layer_info(&layer.name, &layer.placement),
            tiles,
        })
    }

    fn group(&self, group: &Group) -> Result<GroupNode> {
        Ok(GroupNode {
            info: layer_info(&group.name, &group.placement),
            children: self.nodes(&group.layers)?,
        })
    }

    fn object_layer(&self, group: &ObjectGroup) -> Result<ObjectLayerNode> {
        let objects = group
            .objects
            .iter()
            .map(|object| self.object(object))
            .collect::<Result<Vec<_>>>()
            .map_err(|e| e.in_layer(&group.name))?;
        Ok(ObjectLayerNode {
            info: layer_info(&group.name, &group.placement),
            objects,
        })
    }

    fn object(&self, object: &MapObject) -> Result<ObjectNode> {
        let info = object_info(object);
        let size = (object.width, object.height);

        if let ObjectShape::Text(text) = &object.shape {
            return Ok(ObjectNode::Label {
                info,
                text: text.text.clone(),
                wrap: text.wrap,
                size,
            });
        }

        if let Some(raw) = object.gid {
            if let Some(tile) = self.session.resolve(raw)? {
                return Ok(ObjectNode::Tile { info, size, tile });
            }
        }

        if let Some(scene) = self.prefabs.lookup(&object.object_type) {
            return Ok(ObjectNode::Prefab {
                info,
                scene: scene.to_string(),
            });
        }

        if object.is_degenerate() {
            return Ok(ObjectNode::Marker { info });
        }

        let collision = match &object.shape {
            ObjectShape::Ellipse => CollisionShape::Ellipse {
                width: object.width,
                height: object.height,
            },
            ObjectShape::Polygon(points) => CollisionShape::Polygon {
                points: points.clone(),
            },
            ObjectShape::Polyline(points) => CollisionShape::Polyline {
                points: points.clone(),
            },
            _ => CollisionShape::Rectangle {
                width: object.width,
                height: object.height,
            },
        };

        Ok(ObjectNode::Body {
            body: BodyKind::classify(&object.object_type),
            info,
            collision,
        })
    }
}

fn image_layer(layer: &ImageLayer) -> ImageNode {
    ImageNode {
        info: layer_info(&layer.name, &layer.placement),
        texture: layer.image.as_ref().and_then(|i| i.source.clone()),
        repeat: (layer.repeat_x, layer.repeat_y),
    }
}

fn layer_info(name: &str, placement: &Placement) -> LayerInfo {
    LayerInfo {
        name: name.to_string(),
        offset: (placement.offset_x, placement.offset_y),
        visible: placement.visible,
        modulate: placement.modulate(),
        parallax: (placement.parallax_x, placement.parallax_y),
    }
}

fn object_info(object: &MapObject) -> ObjectInfo {
    ObjectInfo {
        id: object.id,
        name: object.name.clone(),
        object_type: object.object_type.clone(),
        position: (object.x, object.y),
        rotation: object.rotation,
        visible: object.visible,
        properties: flatten_properties(&object.properties),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::error::ImportError;
    use crate::schema::decode_str;
    use pretty_assertions::assert_eq;

    const ROOM: &str = r#"<map version="1.10" orientation="orthogonal" width="3" height="2" tilewidth="16" tileheight="16">
  <tileset firstgid="1" source="walls.tsx"/>
  <layer id="1" name="ground" width="3" height="2" opacity="0.5">
    <data encoding="csv">1,0,2147483653,
0,0,3</data>
  </layer>
  <group id="2" name="things" offsetx="8">
    <objectgroup id="3" name="objects">
      <object id="1" name="door" type="DoorTrigger" x="0" y="0" width="16" height="32"/>
      <object id="2" type="Platform" x="16" y="16"><polygon points="0,0 32,0 32,8"/></object>
      <object id="3" type="Spawn" x="4" y="4"><point/></object>
      <object id="4" type="chest" x="40" y="8" width="16" height="16"/>
      <object id="5" gid="2" x="0" y="32" width="16" height="16"/>
      <object id="6" x="0" y="0" width="64" height="16"><text wrap="1">Welcome</text></object>
    </objectgroup>
  </group>
</map>"#;

    fn fixtures() -> (TileMap, ImportSession, PrefabCatalog) {
        let map: TileMap = decode_str(ROOM).unwrap();
        let mut session = ImportSession::new(&map.tilesets);
        session.register_atlas("walls", 4);
        let entries = BTreeMap::from([("Chest".to_string(), "prefabs/chest.scene".to_string())]);
        (map, session, PrefabCatalog::new(&entries))
    }

    #[test]
    fn test_tile_layer_skips_empty_cells() {
        let (map, session, prefabs) = fixtures();
        let scene = assemble(&map, "room", &session, &prefabs).unwrap();

        assert_eq!(scene.size, (3, 2));
        let SceneNode::TileLayer(layer) = &scene.nodes[0] else {
            panic!("expected tile layer");
        };
        assert_eq!(layer.info.modulate, [1.0, 1.0, 1.0, 0.5]);

        let cells: Vec<_> = layer
            .tiles
            .iter()
            .map(|t| (t.cell, t.tile.coords, t.tile.flip_h))
            .collect();
        assert_eq!(
            cells,
            vec![((0, 0), (0, 0), false), ((2, 0), (0, 1), true), ((2, 1), (2, 0), false)]
        );
    }

    #[test]
    fn test_objects_are_classified() {
        let (map, session, prefabs) = fixtures();
        let scene = assemble(&map, "room", &session, &prefabs).unwrap();

        let SceneNode::Group(group) = &scene.nodes[1] else {
            panic!("expected group");
        };
        assert_eq!(group.info.offset, (8.0, 0.0));
        let SceneNode::Objects(layer) = &group.children[0] else {
            panic!("expected object layer");
        };

        let kinds: Vec<&str> = layer
            .objects
            .iter()
            .map(|o| match o {
                ObjectNode::Body { body: BodyKind::Area, .. } => "area",
                ObjectNode::Body { body: BodyKind::StaticBody, .. } => "static",
                ObjectNode::Marker { .. } => "marker",
                ObjectNode::Prefab { .. } => "prefab",
                ObjectNode::Tile { .. } => "tile",
                ObjectNode::Label { .. } => "label",
            })
            .collect();
        assert_eq!(kinds, vec!["area", "static", "marker", "prefab", "tile", "label"]);

        match &layer.objects[3] {
            ObjectNode::Prefab { scene, info } => {
                assert_eq!(scene, "prefabs/chest.scene");
                assert_eq!(info.position, (40.0, 8.0));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_unresolvable_tile_aborts() {
        let (map, _, prefabs) = fixtures();
        let session = ImportSession::new(&map.tilesets);
        let err = assemble(&map, "room", &session, &prefabs).unwrap_err();
        assert!(matches!(
            &err,
            ImportError::TilesetNotFound { name, layer: Some(layer) }
                if name == "walls" && layer == "ground"
        ));
        assert_eq!(err.to_string(), "Tileset not found: walls (layer 'ground')");
    }

    #[test]
    fn test_unowned_object_gid_names_its_layer() {
        let map: TileMap = decode_str(
            r#"<map version="1.10" width="1" height="1" tilewidth="16" tileheight="16">
  <tileset firstgid="10" source="walls.tsx"/>
  <objectgroup id="1" name="props">
    <object id="1" gid="3" x="0" y="16" width="16" height="16"/>
  </objectgroup>
</map>"#,
        )
        .unwrap();
        let mut session = ImportSession::new(&map.tilesets);
        session.register_atlas("walls", 4);

        let err = assemble(&map, "room", &session, &PrefabCatalog::default()).unwrap_err();
        assert!(matches!(
            &err,
            ImportError::NoTileForGid { gid: 3, layer: Some(layer) } if layer == "props"
        ));
        assert_eq!(err.status(), crate::import::ImportStatus::InvalidData);
    }

    #[test]
    fn test_non_csv_layer_aborts() {
        let map: TileMap = decode_str(
            r#"<map version="1.10" width="1" height="1" tilewidth="16" tileheight="16">
  <layer name="ground" width="1" height="1"><data encoding="base64" compression="zlib">eJw=</data></layer>
</map>"#,
        )
        .unwrap();
        let session = ImportSession::new(&map.tilesets);
        assert!(matches!(
            assemble(&map, "room", &session, &PrefabCatalog::default()),
            Err(ImportError::LayerData { layer, .. }) if layer == "ground"
        ));
    }

    #[test]
    fn test_infinite_map_rejected() {
        let map: TileMap = decode_str(r#"<map version="1.10" infinite="1"/>"#).unwrap();
        let session = ImportSession::new(&map.tilesets);
        assert!(matches!(
            assemble(&map, "room", &session, &PrefabCatalog::default()),
            Err(ImportError::InfiniteMap)
        ));
    }
}

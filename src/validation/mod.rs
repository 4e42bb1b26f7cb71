//! Non-fatal checks over decoded maps and tilesets.
//!
//! Importing stops at the first hard error; validation instead walks the
//! whole file and reports everything it finds. Used by `tiledport validate`
//! and `tiledport build --validate`.

mod checks;
mod diagnostic;

pub use diagnostic::{Diagnostic, Severity, ValidationResult};

use crate::output::Printer;
use crate::schema::{TileMap, TileSet};

/// Run every map check.
pub fn validate_map(map: &TileMap) -> ValidationResult {
    let mut result = ValidationResult::new();

    result.extend(checks::check_map_settings(map));
    result.extend(checks::check_first_gids(map));
    result.extend(checks::check_layer_data(map));
    result.extend(checks::check_tile_references(map));
    for tileset in map.tilesets.iter().filter_map(|r| r.inline.as_ref()) {
        result.extend(validate_tileset(tileset));
    }

    result
}

/// Run every tileset check.
pub fn validate_tileset(tileset: &TileSet) -> ValidationResult {
    let mut result = ValidationResult::new();

    result.extend(checks::check_tileset_image(tileset));
    result.extend(checks::check_collision_shapes(tileset));

    result
}

/// Print each diagnostic for one file.
pub fn print_diagnostics(printer: &Printer, file: &str, result: &ValidationResult) {
    for diagnostic in result.iter() {
        printer.diagnostic(file, diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::decode_str;
    use pretty_assertions::assert_eq;

    fn map(body: &str) -> TileMap {
        decode_str(&format!(
            r#"<map version="1.10" orientation="orthogonal" width="2" height="2" tilewidth="8" tileheight="8">{}</map>"#,
            body
        ))
        .unwrap()
    }

    const WALLS: &str = r#"<tileset firstgid="1" name="walls" tilewidth="8" tileheight="8" tilecount="4" columns="2"><image source="walls.png" width="16" height="16"/></tileset>"#;

    #[test]
    fn test_clean_map() {
        let map = map(&format!(
            r#"{}<layer name="ground" width="2" height="2"><data encoding="csv">1,2,3,0</data></layer>"#,
            WALLS
        ));
        let result = validate_map(&map);
        assert!(result.is_ok(), "{:?}", result);
    }

    #[test]
    fn test_duplicate_and_unsorted_firstgid() {
        let map = map(
            r#"<tileset firstgid="5" source="b.tsx"/><tileset firstgid="1" source="a.tsx"/><tileset firstgid="5" source="c.tsx"/>"#,
        );
        let result = validate_map(&map);
        assert!(!result.has_errors());
        assert_eq!(
            result.codes(),
            vec![
                "tiledport::validate::unsorted-firstgid",
                "tiledport::validate::duplicate-firstgid",
            ]
        );
    }

    #[test]
    fn test_layer_size_mismatch() {
        let map = map(&format!(
            r#"{}<layer name="ground" width="2" height="2"><data encoding="csv">1,2,3</data></layer>"#,
            WALLS
        ));
        let result = validate_map(&map);
        assert_eq!(result.codes(), vec!["tiledport::validate::layer-data"]);
        let d = result.iter().next().unwrap();
        assert_eq!(d.subject.as_deref(), Some("ground"));
        assert_eq!(d.message, "expected 4 cells (2x2), found 3");
    }

    #[test]
    fn test_unowned_gids() {
        let map = map(&format!(
            r#"{}<layer name="ground" width="2" height="2"><data encoding="csv">1,9,9,0</data></layer>
<objectgroup name="things"><object id="3" gid="12" x="0" y="0" width="8" height="8"/></objectgroup>"#,
            WALLS
        ));
        let result = validate_map(&map);
        assert_eq!(result.error_count(), 2);
        assert!(result
            .iter()
            .all(|d| d.code == "tiledport::validate::unowned-gid"));
    }

    #[test]
    fn test_tileset_without_image() {
        let tileset: TileSet =
            decode_str(r#"<tileset name="props" tilewidth="0" tileheight="16"/>"#).unwrap();
        let result = validate_tileset(&tileset);
        assert_eq!(
            result.codes(),
            vec![
                "tiledport::validate::missing-image",
                "tiledport::validate::zero-tile-size",
            ]
        );
    }

    #[test]
    fn test_point_collision_is_warned() {
        let tileset: TileSet = decode_str(
            r#"<tileset name="walls" tilewidth="8" tileheight="8" columns="1">
  <image source="walls.png" width="8" height="8"/>
  <tile id="0"><objectgroup><object id="1" x="4" y="4"><point/></object></objectgroup></tile>
</tileset>"#,
        )
        .unwrap();
        let result = validate_tileset(&tileset);
        assert_eq!(result.codes(), vec!["tiledport::validate::ignored-collision"]);
    }

    #[test]
    fn test_infinite_map_is_an_error() {
        let map: TileMap = decode_str(
            r#"<map version="1.10" width="2" height="2" tilewidth="8" tileheight="8" infinite="1"/>"#,
        )
        .unwrap();
        assert_eq!(
            validate_map(&map).codes(),
            vec!["tiledport::validate::unsupported-map"]
        );
    }
}

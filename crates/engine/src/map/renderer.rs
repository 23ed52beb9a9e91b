use tracing::info;

use crate::assets::TileSheet;
use crate::sprite::{source_region, Rect, TILE_SIZE_PX};
use crate::surface::{DrawError, DrawSurface};

use super::{
    parse_tile_map, EmptyTilePolicy, MapFormatError, MapMetadata, TileGrid, TileMapDocument,
};

/// Converts stored 1-based tile indices to 0-based sheet indices.
const MAP_INDEX_OFFSET: i64 = -1;

/// Blits every cell of `grid` from `sheet` onto `surface`, one tile cell per
/// grid cell starting at the surface origin.
pub fn render_tile_map(
    grid: &TileGrid,
    metadata: &MapMetadata,
    sheet: &TileSheet,
    surface: &mut dyn DrawSurface,
    empty_tiles: EmptyTilePolicy,
) -> Result<(), DrawError> {
    let tile = TILE_SIZE_PX as f32;
    for row in 0..metadata.height {
        for col in 0..metadata.width {
            let Some(stored) = grid.get(row, col) else {
                continue;
            };
            if stored == 0 && empty_tiles == EmptyTilePolicy::Skip {
                continue;
            }
            let tile_id = i32::try_from(stored as i64 + MAP_INDEX_OFFSET).unwrap_or(i32::MAX);
            let source = source_region(tile_id);
            let dest = Rect::tile(col as f32 * tile, row as f32 * tile);
            surface.draw_image(sheet, source, dest)?;
        }
    }
    Ok(())
}

/// Holds the currently loaded map and redraws it in full on every call.
#[derive(Debug, Clone, Default)]
pub struct MapRenderer {
    map: Option<TileMapDocument>,
    empty_tiles: EmptyTilePolicy,
}

impl MapRenderer {
    pub fn new(empty_tiles: EmptyTilePolicy) -> Self {
        Self {
            map: None,
            empty_tiles,
        }
    }

    /// Parses `xml` and replaces the loaded map. On error the previously
    /// loaded map stays installed.
    pub fn load_tile_map_xml(&mut self, xml: &str) -> Result<(), MapFormatError> {
        let document = parse_tile_map(xml)?;
        info!(
            width = document.metadata.width,
            height = document.metadata.height,
            tile_width = document.metadata.tile_width,
            tile_height = document.metadata.tile_height,
            "map_loaded"
        );
        self.map = Some(document);
        Ok(())
    }

    pub fn metadata(&self) -> Option<&MapMetadata> {
        self.map.as_ref().map(|map| &map.metadata)
    }

    pub fn grid(&self) -> Option<&TileGrid> {
        self.map.as_ref().map(|map| &map.grid)
    }

    pub fn empty_tiles(&self) -> EmptyTilePolicy {
        self.empty_tiles
    }

    /// Draws the loaded map; does nothing before the first successful load.
    pub fn render(&self, sheet: &TileSheet, surface: &mut dyn DrawSurface) -> Result<(), DrawError> {
        let Some(map) = &self.map else {
            return Ok(());
        };
        render_tile_map(&map.grid, &map.metadata, sheet, surface, self.empty_tiles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{DrawCall, PixelSurface, RecordingSurface};

    const TWO_TILE_MAP: &str = r#"<map width="2" height="1" tilewidth="32" tileheight="32">
 <layer><data encoding="csv">1,2,</data></layer>
</map>"#;

    fn sheet() -> TileSheet {
        TileSheet::from_rgba(1, 1, vec![255; 4]).expect("sheet")
    }

    #[test]
    fn renders_each_cell_from_source_to_destination() {
        let mut renderer = MapRenderer::default();
        renderer.load_tile_map_xml(TWO_TILE_MAP).expect("load");
        assert_eq!(renderer.grid().expect("grid").to_rows(), vec![vec![1, 2]]);

        let mut surface = RecordingSurface::default();
        renderer.render(&sheet(), &mut surface).expect("render");

        assert_eq!(
            surface.blits(),
            vec![
                (Rect::tile(0.0, 0.0), Rect::tile(0.0, 0.0)),
                (Rect::tile(32.0, 0.0), Rect::tile(32.0, 0.0)),
            ]
        );
    }

    #[test]
    fn rows_map_to_destination_rows() {
        let grid = TileGrid::new(2, 2, vec![9, 1, 1, 10]).expect("grid");
        let metadata = MapMetadata {
            width: 2,
            height: 2,
            tile_width: 32,
            tile_height: 32,
        };
        let mut surface = RecordingSurface::default();

        render_tile_map(&grid, &metadata, &sheet(), &mut surface, EmptyTilePolicy::Skip)
            .expect("render");

        let blits = surface.blits();
        assert_eq!(blits[0], (Rect::tile(0.0, 32.0), Rect::tile(0.0, 0.0)));
        assert_eq!(blits[3], (Rect::tile(32.0, 32.0), Rect::tile(32.0, 32.0)));
    }

    #[test]
    fn empty_cells_are_skipped_by_default() {
        let grid = TileGrid::new(2, 1, vec![0, 3]).expect("grid");
        let metadata = MapMetadata {
            width: 2,
            height: 1,
            tile_width: 32,
            tile_height: 32,
        };
        let mut surface = RecordingSurface::default();

        render_tile_map(&grid, &metadata, &sheet(), &mut surface, EmptyTilePolicy::Skip)
            .expect("render");

        assert_eq!(
            surface.blits(),
            vec![(Rect::tile(64.0, 0.0), Rect::tile(32.0, 0.0))]
        );
    }

    #[test]
    fn blit_policy_draws_empty_cell_out_of_sheet() {
        let grid = TileGrid::new(1, 1, vec![0]).expect("grid");
        let metadata = MapMetadata {
            width: 1,
            height: 1,
            tile_width: 32,
            tile_height: 32,
        };
        let mut surface = RecordingSurface::default();

        render_tile_map(&grid, &metadata, &sheet(), &mut surface, EmptyTilePolicy::Blit)
            .expect("render");

        assert_eq!(
            surface.blits(),
            vec![(Rect::tile(-32.0, -32.0), Rect::tile(0.0, 0.0))]
        );
    }

    #[test]
    fn flipped_gid_renders_off_sheet_without_panicking() {
        let xml = r#"<map width="2" height="1" tilewidth="32" tileheight="32">
 <layer><data encoding="csv">2147483650,4294967295</data></layer>
</map>"#;
        let mut renderer = MapRenderer::default();
        renderer.load_tile_map_xml(xml).expect("load");

        let mut surface = RecordingSurface::default();
        renderer.render(&sheet(), &mut surface).expect("render");
        let blits = surface.blits();
        assert_eq!(blits.len(), 2);
        assert!(blits.iter().all(|(src, _)| src.y > 256.0));

        let mut buffer = vec![0; 64 * 32 * 4];
        let mut canvas = PixelSurface::new(&mut buffer, 64, 32);
        renderer.render(&sheet(), &mut canvas).expect("pixel render");
        assert!(buffer.iter().all(|byte| *byte == 0));
    }

    #[test]
    fn render_is_idempotent() {
        let mut renderer = MapRenderer::default();
        renderer.load_tile_map_xml(TWO_TILE_MAP).expect("load");
        let mut surface = RecordingSurface::default();

        renderer.render(&sheet(), &mut surface).expect("first");
        let first = surface.take_calls();
        renderer.render(&sheet(), &mut surface).expect("second");

        assert_eq!(first, surface.take_calls());
    }

    #[test]
    fn failed_reload_keeps_previous_map() {
        let mut renderer = MapRenderer::default();
        renderer.load_tile_map_xml(TWO_TILE_MAP).expect("load");

        let err = renderer
            .load_tile_map_xml("<map width=\"1\" height=\"1\" tilewidth=\"32\" tileheight=\"32\"/>")
            .expect_err("err");

        assert_eq!(err, MapFormatError::MissingLayer);
        assert_eq!(renderer.grid().expect("grid").to_rows(), vec![vec![1, 2]]);
    }

    #[test]
    fn render_without_map_draws_nothing() {
        let renderer = MapRenderer::default();
        let mut surface = RecordingSurface::default();
        renderer.render(&sheet(), &mut surface).expect("render");
        assert!(surface.calls().is_empty());
    }

    #[test]
    fn draw_error_stops_render() {
        let mut renderer = MapRenderer::default();
        renderer.load_tile_map_xml(TWO_TILE_MAP).expect("load");
        let mut surface = RecordingSurface::default();
        surface.fail_draws_with(DrawError::EmptySheet);

        let result = renderer.render(&sheet(), &mut surface);

        assert_eq!(result, Err(DrawError::EmptySheet));
        assert_eq!(surface.calls().len(), 1);
        assert!(matches!(surface.calls()[0], DrawCall::DrawImage { .. }));
    }
}

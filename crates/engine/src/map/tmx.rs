use roxmltree::{Document, Node};
use tracing::debug;

use super::{MapFormatError, MapMetadata, TileGrid, TileMapDocument};

/// Parses a Tiled XML export into map metadata and a tile grid.
///
/// Only the first `<layer>` is read. Its `<data>` blob holds one row per line
/// with comma separated 1-based tile indices; a trailing comma on a row is
/// allowed, blank lines are skipped.
pub fn parse_tile_map(raw: &str) -> Result<TileMapDocument, MapFormatError> {
    let doc = Document::parse(raw).map_err(|error| MapFormatError::Malformed {
        message: error.to_string(),
        line: error.pos().row,
        column: error.pos().col,
    })?;

    let root = doc.root_element();
    if root.tag_name().name() != "map" {
        return Err(MapFormatError::InvalidRoot {
            found: root.tag_name().name().to_string(),
        });
    }

    let metadata = MapMetadata {
        width: positive_attribute(root, "width")?,
        height: positive_attribute(root, "height")?,
        tile_width: positive_attribute(root, "tilewidth")?,
        tile_height: positive_attribute(root, "tileheight")?,
    };

    let mut layers = root.children().filter(|node| node.has_tag_name("layer"));
    let layer = layers.next().ok_or(MapFormatError::MissingLayer)?;
    let ignored_layers = layers.count();
    if ignored_layers > 0 {
        debug!(ignored_layers, "tile_map_extra_layers_ignored");
    }

    let data = layer
        .children()
        .find(|node| node.has_tag_name("data"))
        .ok_or(MapFormatError::MissingData)?;
    if let Some(encoding) = data.attribute("encoding") {
        if encoding != "csv" {
            return Err(MapFormatError::UnsupportedEncoding {
                encoding: encoding.to_string(),
            });
        }
    }

    let tiles = parse_csv_rows(data.text().unwrap_or_default(), &metadata)?;
    let grid = TileGrid::new(metadata.width, metadata.height, tiles)?;
    Ok(TileMapDocument { metadata, grid })
}

fn positive_attribute(node: Node<'_, '_>, name: &'static str) -> Result<u32, MapFormatError> {
    let value = node
        .attribute(name)
        .ok_or(MapFormatError::MissingAttribute { name })?;
    match value.trim().parse::<u32>() {
        Ok(parsed) if parsed > 0 => Ok(parsed),
        _ => Err(MapFormatError::InvalidAttribute {
            name,
            value: value.to_string(),
        }),
    }
}

fn parse_csv_rows(blob: &str, metadata: &MapMetadata) -> Result<Vec<u32>, MapFormatError> {
    let expected_width = metadata.width as usize;
    let mut tiles = Vec::with_capacity(expected_width * metadata.height as usize);
    let mut row_count = 0usize;

    for (row, line) in blob
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .enumerate()
    {
        let line = line.strip_suffix(',').unwrap_or(line);
        let mut row_width = 0usize;
        for (column, token) in line.split(',').enumerate() {
            let token = token.trim();
            let tile = token
                .parse::<u32>()
                .map_err(|_| MapFormatError::InvalidTile {
                    row,
                    column,
                    token: token.to_string(),
                })?;
            tiles.push(tile);
            row_width += 1;
        }
        if row_width != expected_width {
            return Err(MapFormatError::RowLengthMismatch {
                row,
                expected: expected_width,
                actual: row_width,
            });
        }
        row_count += 1;
    }

    let expected_rows = metadata.height as usize;
    if row_count != expected_rows {
        return Err(MapFormatError::RowCountMismatch {
            expected: expected_rows,
            actual: row_count,
        });
    }
    Ok(tiles)
}

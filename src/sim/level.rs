//! Level layout parsing
//!
//! A layout is a grid of single-character type codes, one row per line,
//! tokens separated by whitespace; `_` marks an empty cell. The grid maps
//! row/column to brick center positions. An empty layout is valid and
//! yields zero bricks (a degenerate but legal level).

use glam::Vec2;

use super::factory::{self, SpawnError};
use super::state::Brick;
use crate::consts::*;

/// Center position of the brick at the given grid cell
pub fn cell_center(row: usize, col: usize) -> Vec2 {
    Vec2::new(
        BRICK_GRID_LEFT + col as f32 * BRICK_WIDTH + BRICK_WIDTH / 2.0,
        BRICK_GRID_TOP + row as f32 * BRICK_HEIGHT + BRICK_HEIGHT / 2.0,
    )
}

/// Parse a layout document into bricks (IDs unassigned).
/// Unknown codes abort the whole load; empty cells are skipped.
pub fn parse_layout(text: &str) -> Result<Vec<Brick>, SpawnError> {
    let mut bricks = Vec::new();
    for (row, line) in text.lines().enumerate() {
        for (col, token) in line.split_whitespace().enumerate() {
            // Tokens are single characters; longer tokens are malformed codes
            let code = match token.chars().next() {
                Some(c) if token.chars().count() == 1 => c,
                _ => {
                    return Err(SpawnError::UnknownBrickCode {
                        code: token.chars().next().unwrap_or('?'),
                    });
                }
            };
            if code == '_' {
                continue;
            }
            match factory::brick_from_code(code, cell_center(row, col)) {
                Ok(brick) => bricks.push(brick),
                Err(err) => {
                    log::error!("layout row {row} col {col}: {err}");
                    return Err(err);
                }
            }
        }
    }
    Ok(bricks)
}

/// A built-in layout used by the demo runner and tests:
/// five rows, ten columns, mixed brick kinds.
pub const DEMO_LAYOUT: &str = "\
H H H H H H H H H H
N N E N N N N E N N
N G N N U U N N G N
N N N N N N N N N N
N N N N N N N N N N
";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::BrickKind;

    #[test]
    fn test_empty_layout_is_valid() {
        assert!(parse_layout("").unwrap().is_empty());
        assert!(parse_layout("_ _ _\n_ _ _").unwrap().is_empty());
    }

    #[test]
    fn test_grid_positions_follow_rows_and_columns() {
        let bricks = parse_layout("N N\n_ N").unwrap();
        assert_eq!(bricks.len(), 3);
        assert_eq!(bricks[0].body.pos, cell_center(0, 0));
        assert_eq!(bricks[1].body.pos, cell_center(0, 1));
        assert_eq!(bricks[2].body.pos, cell_center(1, 1));
    }

    #[test]
    fn test_kinds_parsed_per_code() {
        let bricks = parse_layout("N H E G U").unwrap();
        let kinds: Vec<_> = bricks.iter().map(|b| b.kind).collect();
        assert_eq!(
            kinds,
            vec![
                BrickKind::Normal,
                BrickKind::Hard,
                BrickKind::Explosive,
                BrickKind::Healing,
                BrickKind::Unbreakable,
            ]
        );
    }

    #[test]
    fn test_unknown_code_aborts_load() {
        let err = parse_layout("N N\nN Z").unwrap_err();
        assert_eq!(err, SpawnError::UnknownBrickCode { code: 'Z' });
        // Multi-character tokens are rejected too
        assert!(parse_layout("NN").is_err());
    }

    #[test]
    fn test_demo_layout_loads() {
        let bricks = parse_layout(DEMO_LAYOUT).unwrap();
        assert_eq!(bricks.len(), 50);
        assert!(bricks.iter().any(|b| b.kind == BrickKind::Unbreakable));
    }
}

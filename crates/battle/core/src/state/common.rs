use core::fmt;

/// Identifier of a battle row.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct BattleId(pub u64);

impl fmt::Display for BattleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "battle#{}", self.0)
    }
}

/// Identifier of a combatant. Effects and actions refer to users only by id.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct UserId(pub u32);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct JutsuId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ItemId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct VillageId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct BloodlineId(pub u32);

/// Hex tile on the battlefield in odd-row offset coordinates.
///
/// `col` is the longitude and `row` the latitude of the tile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub col: i32,
    pub row: i32,
}

impl Position {
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    /// Cube coordinates of this tile; odd rows are shifted half a tile right.
    fn cube(self) -> (i32, i32, i32) {
        let x = self.col - (self.row - (self.row & 1)) / 2;
        let z = self.row;
        (x, -x - z, z)
    }

    /// Number of hex steps between two tiles.
    pub fn distance(self, other: Position) -> u32 {
        let (ax, ay, az) = self.cube();
        let (bx, by, bz) = other.cube();
        let dx = (ax - bx).unsigned_abs();
        let dy = (ay - by).unsigned_abs();
        let dz = (az - bz).unsigned_abs();
        dx.max(dy).max(dz)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.row, self.col)
    }
}

/// Dimensions of the hex battlefield.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridSize {
    pub cols: i32,
    pub rows: i32,
}

impl GridSize {
    pub const fn new(cols: i32, rows: i32) -> Self {
        Self { cols, rows }
    }

    pub fn contains(&self, position: Position) -> bool {
        (0..self.cols).contains(&position.col) && (0..self.rows).contains(&position.row)
    }

    /// Tiles within `range` steps of `origin`, in row-major order.
    pub fn tiles_within(&self, origin: Position, range: u32) -> impl Iterator<Item = Position> + '_ {
        // Nothing lies further away than the board is wide or tall.
        let reach = range.min(self.cols.max(self.rows).max(0).unsigned_abs()) as i32;
        let rows = origin.row.saturating_sub(reach).max(0)
            ..origin.row.saturating_add(reach + 1).min(self.rows);
        rows.flat_map(move |row| {
            let cols = origin.col.saturating_sub(reach + 1).max(0)
                ..origin.col.saturating_add(reach + 2).min(self.cols);
            cols.map(move |col| Position::new(col, row))
        })
        .filter(move |tile| origin.distance(*tile) <= range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neighbours_are_one_step_away() {
        let even = Position::new(3, 2);
        // Even row: neighbours lean left.
        for tile in [
            Position::new(2, 2),
            Position::new(4, 2),
            Position::new(2, 1),
            Position::new(3, 1),
            Position::new(2, 3),
            Position::new(3, 3),
        ] {
            assert_eq!(even.distance(tile), 1, "{tile}");
        }

        let odd = Position::new(3, 1);
        // Odd row: neighbours lean right.
        for tile in [Position::new(3, 0), Position::new(4, 0), Position::new(4, 2)] {
            assert_eq!(odd.distance(tile), 1, "{tile}");
        }
    }

    #[test]
    fn distance_is_symmetric() {
        let a = Position::new(0, 0);
        let b = Position::new(5, 3);
        assert_eq!(a.distance(b), b.distance(a));
        assert_eq!(a.distance(a), 0);
    }

    #[test]
    fn tiles_within_respects_grid_bounds() {
        let grid = GridSize::new(13, 5);
        let tiles: Vec<_> = grid.tiles_within(Position::new(0, 0), 1).collect();
        // Origin plus its right and lower neighbour.
        assert_eq!(
            tiles,
            vec![Position::new(0, 0), Position::new(1, 0), Position::new(0, 1)]
        );
        assert!(tiles.iter().all(|t| grid.contains(*t)));
    }

    #[test]
    fn unbounded_range_covers_the_whole_grid() {
        let grid = GridSize::new(13, 5);
        let tiles: Vec<_> = grid.tiles_within(Position::new(12, 4), u32::MAX).collect();
        assert_eq!(tiles.len(), 13 * 5);
    }
}

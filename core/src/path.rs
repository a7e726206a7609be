//! Conversion between hex-grid cells and *position paths*. A position path
//! identifies a cell by an anchor (its ancestor at a chosen base resolution)
//! followed by one digit per finer resolution. Each digit says which child of
//! the previous ancestor the next ancestor is.
//!
//! ```rust
//! use hexpath_core::{
//!     grid::{H3Grid, HexGrid},
//!     path::{decode, encode},
//! };
//!
//! let grid = H3Grid::new();
//! let root = grid.base_cell_root(36).unwrap();
//! let cell = grid.child_at_position(root, 4711, 6).unwrap().unwrap();
//!
//! let path = encode(&grid, cell, 6, 2).unwrap();
//! assert_eq!(path.base_cell(), 36);
//! assert_eq!(path.depth(), 4);
//! assert_eq!(decode(&grid, &path, 6).unwrap(), cell);
//! ```
use std::fmt::{Display, Formatter};

use itertools::Itertools;

use crate::{
    error::CodecError,
    grid::{check_resolution, CellId, HexGrid, MAX_RESOLUTION},
};

/// The largest digit value. Hexagons have seven children (positions `0..=6`).
pub const MAX_DIGIT: u8 = 6;

/// A cell expressed as an anchor cell plus a sequence of child positions
#[derive(Clone, PartialEq, Eq, Debug, Hash)]
pub struct PositionPath {
    base_cell: u8,
    anchor: CellId,
    base_resolution: u8,
    digits: Vec<u8>,
}

impl PositionPath {
    /// Creates a path from an anchor cell and a digit sequence. Digits are
    /// only checked for their range here. Whether they can be realized
    /// below the anchor is checked by [`decode`].
    pub fn new<G: HexGrid + ?Sized>(
        grid: &G,
        anchor: CellId,
        digits: Vec<u8>,
    ) -> Result<Self, CodecError> {
        let base_resolution = grid.resolution(anchor)?;
        let base_cell = grid.base_cell(anchor)?;
        check_digits(&digits)?;
        if base_resolution as usize + digits.len() > MAX_RESOLUTION as usize {
            return Err(CodecError::malformed(format!(
                "{} digits below resolution {base_resolution} exceed the finest resolution",
                digits.len()
            )));
        }
        Ok(Self {
            base_cell,
            anchor,
            base_resolution,
            digits,
        })
    }

    /// Creates a path anchored at the resolution-0 cell of `base_cell`
    pub fn from_base_cell<G: HexGrid + ?Sized>(
        grid: &G,
        base_cell: u8,
        digits: Vec<u8>,
    ) -> Result<Self, CodecError> {
        let root = grid.base_cell_root(base_cell)?;
        Self::new(grid, root, digits)
    }

    /// The number of the base cell the path descends from
    pub fn base_cell(&self) -> u8 {
        self.base_cell
    }

    /// The ancestor at the base resolution
    pub fn anchor(&self) -> CellId {
        self.anchor
    }

    pub fn base_resolution(&self) -> u8 {
        self.base_resolution
    }

    pub fn digits(&self) -> &[u8] {
        &self.digits
    }

    /// The number of digits (i.e. resolution levels below the anchor)
    pub fn depth(&self) -> usize {
        self.digits.len()
    }

    /// The resolution of the cell the path points to
    pub fn resolution(&self) -> u8 {
        self.base_resolution + self.digits.len() as u8
    }

    /// Returns the same path anchored at the resolution-0 base cell
    pub fn to_root<G: HexGrid + ?Sized>(&self, grid: &G) -> Result<Self, CodecError> {
        if self.base_resolution == 0 {
            return Ok(self.clone());
        }

        let mut digits = Vec::with_capacity(self.resolution() as usize);
        for r in 1..=self.base_resolution {
            digits.push(digit_at(grid, self.anchor, r)?);
        }
        digits.extend_from_slice(&self.digits);

        Ok(Self {
            base_cell: self.base_cell,
            anchor: grid.base_cell_root(self.base_cell)?,
            base_resolution: 0,
            digits,
        })
    }
}

impl Display for PositionPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}/{}",
            self.base_cell,
            self.anchor,
            self.digits.iter().join("")
        )
    }
}

fn check_digits(digits: &[u8]) -> Result<(), CodecError> {
    if let Some((i, d)) = digits.iter().find_position(|d| **d > MAX_DIGIT) {
        return Err(CodecError::malformed(format!(
            "digit {d} at index {i} is out of range [0, {MAX_DIGIT}]"
        )));
    }
    Ok(())
}

/// Position of the ancestor of `cell` at `resolution` below the ancestor at
/// `resolution - 1`
pub(crate) fn digit_at<G: HexGrid + ?Sized>(
    grid: &G,
    cell: CellId,
    resolution: u8,
) -> Result<u8, CodecError> {
    // resolution 0 has no parent level to take a position in
    let Some(parent_resolution) = resolution.checked_sub(1) else {
        return Err(CodecError::InvalidResolutionOrder {
            base: 1,
            target: resolution,
        });
    };
    let ancestor = grid.parent(cell, resolution)?;
    let pos = grid.child_position(ancestor, parent_resolution)?;
    u8::try_from(pos)
        .ok()
        .filter(|d| *d <= MAX_DIGIT)
        .ok_or_else(|| {
            CodecError::malformed(format!(
                "child position {pos} of `{ancestor}' does not fit into a single digit"
            ))
        })
}

/// Converts `cell` (at `target_res`) into a position path anchored at its
/// ancestor at `base_res`
pub fn encode<G: HexGrid + ?Sized>(
    grid: &G,
    cell: CellId,
    target_res: u8,
    base_res: u8,
) -> Result<PositionPath, CodecError> {
    check_resolution(target_res)?;
    if base_res > target_res {
        return Err(CodecError::InvalidResolutionOrder {
            base: base_res,
            target: target_res,
        });
    }
    if !grid.is_valid(cell, target_res) {
        return Err(CodecError::InvalidCell { cell });
    }

    let anchor = grid.parent(cell, base_res)?;
    let digits = (base_res + 1..=target_res)
        .map(|r| digit_at(grid, cell, r))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(PositionPath {
        base_cell: grid.base_cell(anchor)?,
        anchor,
        base_resolution: base_res,
        digits,
    })
}

/// Converts a position path back into the cell at `target_res`. If
/// `target_res` is coarser than the path's base resolution, the anchor's
/// ancestor at `target_res` is returned and the digits are ignored.
pub fn decode<G: HexGrid + ?Sized>(
    grid: &G,
    path: &PositionPath,
    target_res: u8,
) -> Result<CellId, CodecError> {
    check_resolution(target_res)?;
    if !grid.is_valid(path.anchor, path.base_resolution) {
        return Err(CodecError::InvalidCell { cell: path.anchor });
    }

    if target_res < path.base_resolution {
        return grid.parent(path.anchor, target_res);
    }

    let expected = (target_res - path.base_resolution) as usize;
    if path.digits.len() != expected {
        return Err(CodecError::malformed(format!(
            "expected {expected} digits for resolution {target_res} below resolution {}, got {}",
            path.base_resolution,
            path.digits.len()
        )));
    }
    check_digits(&path.digits)?;

    let mut cell = path.anchor;
    for (resolution, digit) in (path.base_resolution + 1..=target_res).zip(&path.digits) {
        cell = grid
            .child_at_position(cell, *digit as u64, resolution)?
            .ok_or(CodecError::UnrealizableDigit {
                parent: cell,
                digit: *digit,
                resolution,
            })?;
    }

    if !grid.is_valid(cell, target_res) {
        return Err(CodecError::InvalidCell { cell });
    }
    Ok(cell)
}

#[cfg(test)]
mod tests {
    use assertor::{assert_that, EqualityAssertion};
    use h3o::{CellIndex, LatLng, Resolution};
    use rand::Rng;

    use crate::{
        error::CodecError,
        grid::{CellId, H3Grid, HexGrid},
    };

    use super::{decode, encode, PositionPath};

    fn leaf_below_base_cell_36(grid: &H3Grid) -> CellId {
        let root = grid.base_cell_root(36).unwrap();
        grid.child_at_position(root, 1_234_567_890, 12)
            .unwrap()
            .unwrap()
    }

    #[test]
    fn encode_below_base_cell_36() {
        let grid = H3Grid::new();
        let cell = leaf_below_base_cell_36(&grid);

        let path = encode(&grid, cell, 12, 6).unwrap();
        assert_that!(path.base_cell()).is_equal_to(36);
        assert_that!(path.base_resolution()).is_equal_to(6);
        assert_that!(path.depth()).is_equal_to(6);
        assert_that!(path.anchor()).is_equal_to(grid.parent(cell, 6).unwrap());

        assert_that!(decode(&grid, &path, 12).unwrap()).is_equal_to(cell);
    }

    #[test]
    fn round_trip_all_resolution_pairs() {
        let grid = H3Grid::new();
        let mut rng = rand::thread_rng();
        for _ in 0..50 {
            let ll = LatLng::new(rng.gen_range(-90.0..90.0), rng.gen_range(-180.0..180.0)).unwrap();
            for target in 0..=15u8 {
                let cell = CellId::from(ll.to_cell(Resolution::try_from(target).unwrap()));
                for base in 0..=target {
                    let path = encode(&grid, cell, target, base).unwrap();
                    assert_that!(path.depth()).is_equal_to((target - base) as usize);
                    assert_that!(decode(&grid, &path, target).unwrap()).is_equal_to(cell);
                }
            }
        }
    }

    #[test]
    fn round_trip_below_pentagons() {
        let grid = H3Grid::new();
        for pentagon in CellIndex::base_cells().filter(|c| c.is_pentagon()) {
            for child in pentagon.children(Resolution::Three) {
                let cell = CellId::from(child);
                let path = encode(&grid, cell, 3, 0).unwrap();
                assert_that!(decode(&grid, &path, 3).unwrap()).is_equal_to(cell);
            }
        }
    }

    #[test]
    fn to_root_extends_digits() {
        let grid = H3Grid::new();
        let cell = leaf_below_base_cell_36(&grid);
        let path = encode(&grid, cell, 12, 6).unwrap();
        let root = path.to_root(&grid).unwrap();
        assert_that!(root).is_equal_to(encode(&grid, cell, 12, 0).unwrap());
        assert_that!(root.resolution()).is_equal_to(12);
    }

    #[test]
    fn decode_upwards_ignores_digits() {
        let grid = H3Grid::new();
        let cell = leaf_below_base_cell_36(&grid);
        let path = encode(&grid, cell, 12, 6).unwrap();
        assert_that!(decode(&grid, &path, 4).unwrap()).is_equal_to(grid.parent(cell, 4).unwrap());
    }

    #[test]
    fn invalid_resolution_order() {
        let grid = H3Grid::new();
        let cell = leaf_below_base_cell_36(&grid);
        assert_that!(encode(&grid, cell, 12, 13)).is_equal_to(Err(
            CodecError::InvalidResolutionOrder {
                base: 13,
                target: 12,
            },
        ));
        assert!(matches!(
            encode(&grid, cell, 16, 0),
            Err(CodecError::InvalidResolutionOrder { .. })
        ));
    }

    #[test]
    fn invalid_cell() {
        let grid = H3Grid::new();
        let cell = leaf_below_base_cell_36(&grid);
        assert_that!(encode(&grid, cell, 11, 6)).is_equal_to(Err(CodecError::InvalidCell { cell }));
        assert_that!(encode(&grid, CellId(7), 0, 0))
            .is_equal_to(Err(CodecError::InvalidCell { cell: CellId(7) }));
    }

    #[test]
    fn malformed_paths() {
        let grid = H3Grid::new();
        assert!(matches!(
            PositionPath::from_base_cell(&grid, 36, vec![1, 7]),
            Err(CodecError::MalformedPath { .. })
        ));

        let path = PositionPath::from_base_cell(&grid, 36, vec![1, 2, 3]).unwrap();
        assert!(matches!(
            decode(&grid, &path, 4),
            Err(CodecError::MalformedPath { .. })
        ));
    }

    #[test]
    fn unrealizable_digit_below_pentagon() {
        let grid = H3Grid::new();
        let pentagon = grid.base_cell_root(4).unwrap();
        let path = PositionPath::new(&grid, pentagon, vec![6, 0]).unwrap();
        assert_that!(decode(&grid, &path, 2)).is_equal_to(Err(CodecError::UnrealizableDigit {
            parent: pentagon,
            digit: 6,
            resolution: 1,
        }));
    }

    #[test]
    fn display() {
        let grid = H3Grid::new();
        let path = PositionPath::from_base_cell(&grid, 36, vec![0, 1, 6]).unwrap();
        let root = grid.base_cell_root(36).unwrap();
        assert_that!(path.to_string()).is_equal_to(format!("36:{root}/016"));
    }
}

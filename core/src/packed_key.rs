//! Fixed-width, sortable integer keys for position paths.
//!
//! A key is the decimal rendering of a root-anchored path: the base cell
//! number followed by exactly one character (`'0'`-`'6'`) per resolution
//! level, with the digit section right-padded with `'0'` to `max_depth`
//! positions. Since the digit section always has the same width, keys of
//! paths below the same base cell compare like their digit sequences, and
//! keys of different base cells compare like the base cell numbers.
//!
//! Padding is indistinguishable from a genuine `0` digit. A key therefore
//! only has a meaning together with the depth it was packed at, and keys
//! of different depths must never be compared without also comparing the
//! depth.
use crate::{
    error::CodecError,
    grid::{HexGrid, MAX_RESOLUTION},
    path::{PositionPath, MAX_DIGIT},
};

/// The default (and largest) width of the digit section
pub const DEFAULT_MAX_DEPTH: u8 = MAX_RESOLUTION;

/// Packs and unpacks position paths using a fixed digit section width
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyPacker {
    max_depth: u8,
}

impl Default for KeyPacker {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl KeyPacker {
    /// Creates a packer whose digit section is `max_depth` characters wide
    pub fn new(max_depth: u8) -> Result<Self, CodecError> {
        if max_depth > MAX_RESOLUTION {
            return Err(CodecError::InvalidResolutionOrder {
                base: max_depth,
                target: MAX_RESOLUTION,
            });
        }
        Ok(Self { max_depth })
    }

    pub fn max_depth(&self) -> u8 {
        self.max_depth
    }

    /// Renders the root-anchored form of `path`, padding the digit section
    /// with `pad` characters
    fn render<G: HexGrid + ?Sized>(
        &self,
        grid: &G,
        path: &PositionPath,
        pad: char,
    ) -> Result<String, CodecError> {
        let root = path.to_root(grid)?;
        if root.depth() > self.max_depth as usize {
            return Err(CodecError::InvalidResolutionOrder {
                base: self.max_depth,
                target: root.resolution(),
            });
        }

        let mut text = root.base_cell().to_string();
        text.extend(root.digits().iter().map(|d| char::from(b'0' + d)));
        text.extend(std::iter::repeat(pad).take(self.max_depth as usize - root.depth()));
        Ok(text)
    }

    /// Packs `path` into a key. Paths anchored below resolution 0 are first
    /// extended up to their base cell, so the key depth equals the path's
    /// resolution.
    pub fn pack<G: HexGrid + ?Sized>(
        &self,
        grid: &G,
        path: &PositionPath,
    ) -> Result<u64, CodecError> {
        let text = self.render(grid, path, '0')?;
        text.parse::<u64>()
            .map_err(|e| CodecError::malformed(format!("unable to pack `{text}': {e}")))
    }

    /// Unpacks a key into a path of `depth` digits anchored at its base
    /// cell. Digits past `depth` are discarded.
    pub fn unpack<G: HexGrid + ?Sized>(
        &self,
        grid: &G,
        key: u64,
        depth: u8,
    ) -> Result<PositionPath, CodecError> {
        if depth > self.max_depth {
            return Err(CodecError::InvalidResolutionOrder {
                base: self.max_depth,
                target: depth,
            });
        }

        let width = self.max_depth as usize;
        let text = format!("{key:0width$}");
        let (base, digit_section) = text.split_at(text.len() - width);

        let base_cell = if base.is_empty() {
            0
        } else {
            base.parse::<u8>().map_err(|_| {
                CodecError::malformed(format!("key {key} names unknown base cell `{base}'"))
            })?
        };

        let digits = digit_section
            .bytes()
            .take(depth as usize)
            .enumerate()
            .map(|(i, c)| match c.wrapping_sub(b'0') {
                d if d <= MAX_DIGIT => Ok(d),
                _ => Err(CodecError::malformed(format!(
                    "key {key} has invalid digit `{}' at level {}",
                    c as char,
                    i + 1
                ))),
            })
            .collect::<Result<Vec<_>, _>>()?;

        PositionPath::from_base_cell(grid, base_cell, digits)
    }

    /// Returns the inclusive key interval covering `path` and all of its
    /// descendants
    pub fn range<G: HexGrid + ?Sized>(
        &self,
        grid: &G,
        path: &PositionPath,
    ) -> Result<KeyRange, CodecError> {
        let lo = self.pack(grid, path)?;
        let text = self.render(grid, path, char::from(b'0' + MAX_DIGIT))?;
        let hi = text
            .parse::<u64>()
            .map_err(|e| CodecError::malformed(format!("unable to pack `{text}': {e}")))?;
        Ok(KeyRange { lo, hi })
    }
}

/// An inclusive interval of packed keys
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyRange {
    pub lo: u64,
    pub hi: u64,
}

impl KeyRange {
    pub fn contains(&self, key: u64) -> bool {
        self.lo <= key && key <= self.hi
    }
}

/// Packs `path` with the default digit section width
pub fn pack<G: HexGrid + ?Sized>(grid: &G, path: &PositionPath) -> Result<u64, CodecError> {
    KeyPacker::default().pack(grid, path)
}

/// Unpacks `key` with the default digit section width
pub fn unpack<G: HexGrid + ?Sized>(
    grid: &G,
    key: u64,
    depth: u8,
) -> Result<PositionPath, CodecError> {
    KeyPacker::default().unpack(grid, key, depth)
}

#[cfg(test)]
mod tests {
    use std::cmp::Ordering;

    use assertor::{assert_that, BooleanAssertion, EqualityAssertion};
    use h3o::{LatLng, Resolution};
    use pretty_assertions::assert_eq;
    use rand::Rng;

    use crate::{
        error::CodecError,
        grid::{CellId, H3Grid, HexGrid},
        path::{decode, encode, PositionPath},
    };

    use super::{pack, unpack, KeyPacker};

    #[test]
    fn all_zero_digits() {
        let grid = H3Grid::new();
        let path = PositionPath::from_base_cell(&grid, 36, vec![0; 6]).unwrap();
        let key = pack(&grid, &path).unwrap();
        assert_eq!(key.to_string(), "36000000000000000");

        let unpacked = unpack(&grid, key, 6).unwrap();
        assert_eq!(unpacked, path);
        assert_eq!(unpacked.base_cell(), 36);
        assert_eq!(unpacked.digits(), &[0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn base_cell_zero() {
        let grid = H3Grid::new();
        let path = PositionPath::from_base_cell(&grid, 0, vec![0, 3, 6]).unwrap();
        let key = pack(&grid, &path).unwrap();
        assert_eq!(key, 36_000_000_000_000);
        assert_eq!(unpack(&grid, key, 3).unwrap(), path);
    }

    #[test]
    fn round_trip_random_cells() {
        let grid = H3Grid::new();
        let mut rng = rand::thread_rng();
        for _ in 0..200 {
            let ll = LatLng::new(rng.gen_range(-90.0..90.0), rng.gen_range(-180.0..180.0)).unwrap();
            let res: u8 = rng.gen_range(0..=15);
            let cell = CellId::from(ll.to_cell(Resolution::try_from(res).unwrap()));
            let path = encode(&grid, cell, res, 0).unwrap();

            let key = pack(&grid, &path).unwrap();
            let unpacked = unpack(&grid, key, res).unwrap();
            assert_eq!(unpacked, path);
            assert_eq!(decode(&grid, &unpacked, res).unwrap(), cell);
        }
    }

    #[test]
    fn anchored_paths_pack_from_the_root() {
        let grid = H3Grid::new();
        let root = grid.base_cell_root(36).unwrap();
        let cell = grid.child_at_position(root, 98_765, 9).unwrap().unwrap();
        let anchored = encode(&grid, cell, 9, 6).unwrap();
        let key = pack(&grid, &anchored).unwrap();
        assert_eq!(key, pack(&grid, &encode(&grid, cell, 9, 0).unwrap()).unwrap());
        assert_eq!(unpack(&grid, key, 9).unwrap(), anchored.to_root(&grid).unwrap());
    }

    #[test]
    fn sort_order_matches_digit_order() {
        let grid = H3Grid::new();
        let mut rng = rand::thread_rng();
        for _ in 0..500 {
            let depth = rng.gen_range(1..=15usize);
            let a: Vec<u8> = (0..depth).map(|_| rng.gen_range(0..=6)).collect();
            let b: Vec<u8> = (0..depth).map(|_| rng.gen_range(0..=6)).collect();
            let pa = PositionPath::from_base_cell(&grid, 36, a.clone()).unwrap();
            let pb = PositionPath::from_base_cell(&grid, 36, b.clone()).unwrap();
            let ka = pack(&grid, &pa).unwrap();
            let kb = pack(&grid, &pb).unwrap();
            assert_eq!(ka.cmp(&kb), a.cmp(&b));
        }
    }

    #[test]
    fn base_cells_sort_before_digits() {
        let grid = H3Grid::new();
        let a = PositionPath::from_base_cell(&grid, 5, vec![6, 6, 6]).unwrap();
        let b = PositionPath::from_base_cell(&grid, 36, vec![0, 0, 0]).unwrap();
        assert_that!(pack(&grid, &a).unwrap().cmp(&pack(&grid, &b).unwrap()))
            .is_equal_to(Ordering::Less);
    }

    #[test]
    fn range_covers_descendants() {
        let grid = H3Grid::new();
        let packer = KeyPacker::default();
        let parent = PositionPath::from_base_cell(&grid, 36, vec![2, 5]).unwrap();
        let range = packer.range(&grid, &parent).unwrap();

        let child = PositionPath::from_base_cell(&grid, 36, vec![2, 5, 6, 1]).unwrap();
        let sibling = PositionPath::from_base_cell(&grid, 36, vec![2, 6, 0, 0]).unwrap();
        assert_that!(range.contains(packer.pack(&grid, &child).unwrap())).is_true();
        assert_that!(range.contains(packer.pack(&grid, &sibling).unwrap())).is_false();
    }

    #[test]
    fn depth_checks() {
        let grid = H3Grid::new();
        assert!(matches!(
            KeyPacker::new(16),
            Err(CodecError::InvalidResolutionOrder { .. })
        ));

        let packer = KeyPacker::new(4).unwrap();
        let deep = PositionPath::from_base_cell(&grid, 36, vec![1; 5]).unwrap();
        assert!(matches!(
            packer.pack(&grid, &deep),
            Err(CodecError::InvalidResolutionOrder { .. })
        ));
        assert!(matches!(
            packer.unpack(&grid, 360000, 5),
            Err(CodecError::InvalidResolutionOrder { .. })
        ));
    }

    #[test]
    fn invalid_keys() {
        let grid = H3Grid::new();
        // digit 7 at level 1
        assert!(matches!(
            unpack(&grid, 36_700_000_000_000_000, 1),
            Err(CodecError::MalformedPath { .. })
        ));
        // base cell 122 does not exist
        assert!(matches!(
            unpack(&grid, 122_000_000_000_000_000, 1),
            Err(CodecError::MalformedPath { .. })
        ));
    }
}

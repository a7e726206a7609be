//! Columnar encoding and decoding of many cells at once.
//!
//! A [`BatchCodec`] is configured once with a base and a target resolution.
//! Building it validates the resolutions and produces a plan with one
//! [`LevelStep`] per resolution below the base. Encoding a batch runs every
//! step over the whole input and yields a [`PositionTable`] with an `anchor`
//! column and one `pos_<res>` digit column per level.
//!
//! ```rust
//! use hexpath_core::{
//!     batch::BatchCodec,
//!     grid::{H3Grid, HexGrid},
//! };
//!
//! let grid = H3Grid::new();
//! let root = grid.base_cell_root(36).unwrap();
//! let cells = grid.children(root, 3).unwrap();
//!
//! let codec = BatchCodec::builder(grid)
//!     .base_resolution(1)
//!     .target_resolution(3)
//!     .build()
//!     .unwrap();
//! let table = codec.encode_batch(&cells).unwrap();
//! assert_eq!(table.column("pos_3").unwrap().len(), cells.len());
//! assert_eq!(codec.decode_batch(&table).unwrap(), cells);
//! ```
use thiserror::Error;
use tracing::debug;

use crate::{
    error::CodecError,
    grid::{check_resolution, CellId, HexGrid, MAX_RESOLUTION},
    packed_key::KeyPacker,
    path::{decode, digit_at, PositionPath},
};

/// A row of a batch that could not be converted
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("row {row}: {source}")]
pub struct BatchError {
    pub row: usize,
    pub source: CodecError,
}

/// Computes the digit of one resolution level
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LevelStep {
    pub resolution: u8,
}

impl LevelStep {
    /// The name of the column this step produces
    pub fn column_name(&self) -> String {
        format!("pos_{}", self.resolution)
    }

    /// Returns the position of the ancestor of `cell` at this step's
    /// resolution below its own parent
    pub fn digit<G: HexGrid + ?Sized>(&self, grid: &G, cell: CellId) -> Result<u8, CodecError> {
        digit_at(grid, cell, self.resolution)
    }
}

/// A digit column produced by a [`LevelStep`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelColumn {
    pub resolution: u8,
    pub digits: Vec<u8>,
}

/// The result of [`BatchCodec::encode_batch`]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PositionTable {
    pub anchor: Vec<CellId>,
    pub levels: Vec<LevelColumn>,

    /// Packed keys, only present if the codec was built with
    /// [`BatchCodecBuilder::with_packed_keys`]
    pub packed: Option<Vec<u64>>,
}

impl PositionTable {
    pub fn len(&self) -> usize {
        self.anchor.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchor.is_empty()
    }

    /// Looks up a digit column by its name (e.g. `pos_7`)
    pub fn column(&self, name: &str) -> Option<&[u8]> {
        let resolution = name.strip_prefix("pos_")?.parse::<u8>().ok()?;
        self.levels
            .iter()
            .find(|c| c.resolution == resolution)
            .map(|c| c.digits.as_slice())
    }

    /// The digits of one row in level order
    pub fn row_digits(&self, row: usize) -> Option<Vec<u8>> {
        self.levels
            .iter()
            .map(|c| c.digits.get(row).copied())
            .collect()
    }
}

/// Builder for [`BatchCodec`]
pub struct BatchCodecBuilder<G> {
    grid: G,
    base_resolution: u8,
    target_resolution: u8,
    max_depth: Option<u8>,
}

impl<G: HexGrid> BatchCodecBuilder<G> {
    pub fn base_resolution(mut self, resolution: u8) -> Self {
        self.base_resolution = resolution;
        self
    }

    pub fn target_resolution(mut self, resolution: u8) -> Self {
        self.target_resolution = resolution;
        self
    }

    /// Also produce a `packed` column with keys of the given digit section
    /// width
    pub fn with_packed_keys(mut self, max_depth: u8) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    pub fn build(self) -> Result<BatchCodec<G>, CodecError> {
        check_resolution(self.target_resolution)?;
        if self.base_resolution > self.target_resolution {
            return Err(CodecError::InvalidResolutionOrder {
                base: self.base_resolution,
                target: self.target_resolution,
            });
        }

        let packer = self.max_depth.map(KeyPacker::new).transpose()?;
        if let Some(p) = &packer {
            if p.max_depth() < self.target_resolution {
                return Err(CodecError::InvalidResolutionOrder {
                    base: p.max_depth(),
                    target: self.target_resolution,
                });
            }
        }

        let steps = (self.base_resolution + 1..=self.target_resolution)
            .map(|resolution| LevelStep { resolution })
            .collect();

        Ok(BatchCodec {
            grid: self.grid,
            base_resolution: self.base_resolution,
            target_resolution: self.target_resolution,
            steps,
            packer,
        })
    }
}

/// Converts whole columns of cells into position tables and back
pub struct BatchCodec<G> {
    grid: G,
    base_resolution: u8,
    target_resolution: u8,
    steps: Vec<LevelStep>,
    packer: Option<KeyPacker>,
}

impl<G: HexGrid> BatchCodec<G> {
    /// Starts building a codec. Both resolutions default to the finest
    /// resolution.
    pub fn builder(grid: G) -> BatchCodecBuilder<G> {
        BatchCodecBuilder {
            grid,
            base_resolution: MAX_RESOLUTION,
            target_resolution: MAX_RESOLUTION,
            max_depth: None,
        }
    }

    /// The per-level steps in resolution order
    pub fn plan(&self) -> &[LevelStep] {
        &self.steps
    }

    pub fn base_resolution(&self) -> u8 {
        self.base_resolution
    }

    pub fn target_resolution(&self) -> u8 {
        self.target_resolution
    }

    /// Encodes all `cells`. Stops at the first row that fails.
    pub fn encode_batch(&self, cells: &[CellId]) -> Result<PositionTable, BatchError> {
        let mut anchor = Vec::with_capacity(cells.len());
        for (row, cell) in cells.iter().enumerate() {
            if !self.grid.is_valid(*cell, self.target_resolution) {
                return Err(BatchError {
                    row,
                    source: CodecError::InvalidCell { cell: *cell },
                });
            }
            let a = self
                .grid
                .parent(*cell, self.base_resolution)
                .map_err(|source| BatchError { row, source })?;
            anchor.push(a);
        }

        let mut levels = Vec::with_capacity(self.steps.len());
        for step in &self.steps {
            let digits = cells
                .iter()
                .enumerate()
                .map(|(row, cell)| {
                    step.digit(&self.grid, *cell)
                        .map_err(|source| BatchError { row, source })
                })
                .collect::<Result<Vec<_>, _>>()?;
            levels.push(LevelColumn {
                resolution: step.resolution,
                digits,
            });
        }

        let mut table = PositionTable {
            anchor,
            levels,
            packed: None,
        };

        if let Some(packer) = &self.packer {
            let packed = (0..table.len())
                .map(|row| {
                    self.row_path(&table, row)
                        .and_then(|p| packer.pack(&self.grid, &p))
                        .map_err(|source| BatchError { row, source })
                })
                .collect::<Result<Vec<_>, _>>()?;
            table.packed = Some(packed);
        }

        debug!(
            rows = table.len(),
            levels = self.steps.len(),
            "encoded batch"
        );
        Ok(table)
    }

    /// Reconstructs the cells of `table`. Stops at the first row that fails.
    pub fn decode_batch(&self, table: &PositionTable) -> Result<Vec<CellId>, BatchError> {
        let result = (0..table.len())
            .map(|row| {
                self.row_path(table, row)
                    .and_then(|p| decode(&self.grid, &p, self.target_resolution))
                    .map_err(|source| BatchError { row, source })
            })
            .collect::<Result<Vec<_>, _>>()?;
        debug!(rows = result.len(), "decoded batch");
        Ok(result)
    }

    fn row_path(&self, table: &PositionTable, row: usize) -> Result<PositionPath, CodecError> {
        if table.levels.len() != self.steps.len() {
            return Err(CodecError::malformed(format!(
                "expected {} digit columns, got {}",
                self.steps.len(),
                table.levels.len()
            )));
        }
        if let Some((step, column)) = self
            .steps
            .iter()
            .zip(&table.levels)
            .find(|(s, c)| s.resolution != c.resolution)
        {
            return Err(CodecError::malformed(format!(
                "expected column {}, got pos_{}",
                step.column_name(),
                column.resolution
            )));
        }

        let digits = table
            .row_digits(row)
            .ok_or_else(|| CodecError::malformed("digit columns are shorter than anchor column"))?;
        let anchor = table.anchor[row];
        if !self.grid.is_valid(anchor, self.base_resolution) {
            return Err(CodecError::InvalidCell { cell: anchor });
        }
        PositionPath::new(&self.grid, anchor, digits)
    }
}

#[cfg(test)]
mod tests {
    use assertor::{assert_that, EqualityAssertion};
    use h3o::{LatLng, Resolution};
    use pretty_assertions::assert_eq;
    use rand::Rng;

    use crate::{
        error::CodecError,
        grid::{CellId, H3Grid, HexGrid},
        packed_key::pack,
        path::encode,
    };

    use super::{BatchCodec, BatchError, LevelStep};

    fn random_cells(n: usize, res: Resolution) -> Vec<CellId> {
        let mut rng = rand::thread_rng();
        (0..n)
            .map(|_| {
                LatLng::new(rng.gen_range(-90.0..90.0), rng.gen_range(-180.0..180.0))
                    .unwrap()
                    .to_cell(res)
                    .into()
            })
            .collect()
    }

    #[test]
    fn plan_has_one_step_per_level() {
        let codec = BatchCodec::builder(H3Grid::new())
            .base_resolution(6)
            .target_resolution(9)
            .build()
            .unwrap();
        assert_eq!(
            codec.plan(),
            &[
                LevelStep { resolution: 7 },
                LevelStep { resolution: 8 },
                LevelStep { resolution: 9 },
            ]
        );
        assert_that!(codec.plan()[0].column_name()).is_equal_to("pos_7".to_string());
    }

    #[test]
    fn step_at_resolution_zero() {
        let grid = H3Grid::new();
        let root = grid.base_cell_root(36).unwrap();
        let step = LevelStep { resolution: 0 };
        assert_that!(step.digit(&grid, root)).is_equal_to(Err(
            CodecError::InvalidResolutionOrder {
                base: 1,
                target: 0,
            },
        ));

        let child = grid.child_at_position(root, 4, 1).unwrap().unwrap();
        assert_that!(LevelStep { resolution: 1 }.digit(&grid, child)).is_equal_to(Ok(4));
    }

    #[test]
    fn invalid_plan() {
        let result = BatchCodec::builder(H3Grid::new())
            .base_resolution(10)
            .target_resolution(9)
            .build();
        assert!(matches!(
            result,
            Err(CodecError::InvalidResolutionOrder {
                base: 10,
                target: 9
            })
        ));

        let result = BatchCodec::builder(H3Grid::new())
            .base_resolution(0)
            .target_resolution(9)
            .with_packed_keys(8)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn columns_match_single_encode() {
        let grid = H3Grid::new();
        let cells = random_cells(100, Resolution::Ten);
        let codec = BatchCodec::builder(grid)
            .base_resolution(4)
            .target_resolution(10)
            .build()
            .unwrap();
        let table = codec.encode_batch(&cells).unwrap();

        assert_that!(table.len()).is_equal_to(100);
        assert_that!(table.packed).is_equal_to(None);
        for (row, cell) in cells.iter().enumerate() {
            let path = encode(&grid, *cell, 10, 4).unwrap();
            assert_that!(table.anchor[row]).is_equal_to(path.anchor());
            assert_that!(table.row_digits(row).unwrap()).is_equal_to(path.digits().to_vec());
            assert_that!(table.column("pos_5").unwrap()[row]).is_equal_to(path.digits()[0]);
        }
        assert_that!(codec.decode_batch(&table).unwrap()).is_equal_to(cells);
    }

    #[test]
    fn packed_column() {
        let grid = H3Grid::new();
        let cells = random_cells(50, Resolution::Eight);
        let codec = BatchCodec::builder(grid)
            .base_resolution(3)
            .target_resolution(8)
            .with_packed_keys(15)
            .build()
            .unwrap();
        let table = codec.encode_batch(&cells).unwrap();
        let expected = cells
            .iter()
            .map(|c| pack(&grid, &encode(&grid, *c, 8, 0).unwrap()).unwrap())
            .collect::<Vec<_>>();
        assert_that!(table.packed).is_equal_to(Some(expected));
    }

    #[test]
    fn fails_with_row_index() {
        let grid = H3Grid::new();
        let mut cells = random_cells(10, Resolution::Seven);
        cells[6] = CellId(42);
        let codec = BatchCodec::builder(grid)
            .base_resolution(2)
            .target_resolution(7)
            .build()
            .unwrap();
        assert_that!(codec.encode_batch(&cells)).is_equal_to(Err(BatchError {
            row: 6,
            source: CodecError::InvalidCell { cell: CellId(42) },
        }));
    }

    #[test]
    fn decode_detects_unrealizable_digits() {
        let grid = H3Grid::new();
        let pentagon = grid.base_cell_root(4).unwrap();
        let cells = grid.children(pentagon, 2).unwrap();
        let codec = BatchCodec::builder(grid)
            .base_resolution(0)
            .target_resolution(2)
            .build()
            .unwrap();
        let mut table = codec.encode_batch(&cells).unwrap();
        table.levels[0].digits[3] = 6;

        let err = codec.decode_batch(&table).unwrap_err();
        assert_that!(err.row).is_equal_to(3);
        assert!(matches!(err.source, CodecError::UnrealizableDigit { .. }));
    }

    #[test]
    fn decode_rejects_foreign_tables() {
        let grid = H3Grid::new();
        let cells = random_cells(3, Resolution::Six);
        let a = BatchCodec::builder(grid)
            .base_resolution(2)
            .target_resolution(6)
            .build()
            .unwrap();
        let b = BatchCodec::builder(grid)
            .base_resolution(3)
            .target_resolution(6)
            .build()
            .unwrap();
        let table = a.encode_batch(&cells).unwrap();
        assert!(matches!(
            b.decode_batch(&table),
            Err(BatchError {
                row: 0,
                source: CodecError::MalformedPath { .. }
            })
        ));
    }

    #[test]
    fn empty_batch() {
        let codec = BatchCodec::builder(H3Grid::new())
            .base_resolution(0)
            .target_resolution(5)
            .build()
            .unwrap();
        let table = codec.encode_batch(&[]).unwrap();
        assert_that!(table.is_empty()).is_equal_to(true);
        assert_that!(table.levels.len()).is_equal_to(5);
        assert_that!(codec.decode_batch(&table).unwrap()).is_equal_to(vec![]);
    }
}

use h3o::{BaseCell, CellIndex, LatLng as H3LatLng, Resolution};

use crate::error::CodecError;

use super::{check_resolution, CellId, HexGrid, LatLng};

/// An implementation of the [`HexGrid`] trait backed by the H3 hexagonal
/// hierarchical geospatial indexing system (<https://h3geo.org/>)
#[derive(Clone, Copy, Debug, Default)]
pub struct H3Grid;

impl H3Grid {
    pub fn new() -> Self {
        Self
    }

    fn cell(cell: CellId) -> Result<CellIndex, CodecError> {
        CellIndex::try_from(cell.0).map_err(|_| CodecError::InvalidCell { cell })
    }

    fn res(resolution: u8) -> Result<Resolution, CodecError> {
        check_resolution(resolution)?;
        Resolution::try_from(resolution).map_err(|_| CodecError::InvalidResolutionOrder {
            base: resolution,
            target: resolution,
        })
    }
}

impl From<CellIndex> for CellId {
    fn from(value: CellIndex) -> Self {
        CellId(u64::from(value))
    }
}

impl From<H3LatLng> for LatLng {
    fn from(value: H3LatLng) -> Self {
        LatLng {
            lat: value.lat(),
            lng: value.lng(),
        }
    }
}

impl HexGrid for H3Grid {
    fn is_valid(&self, cell: CellId, resolution: u8) -> bool {
        CellIndex::try_from(cell.0).is_ok_and(|c| u8::from(c.resolution()) == resolution)
    }

    fn resolution(&self, cell: CellId) -> Result<u8, CodecError> {
        Ok(u8::from(Self::cell(cell)?.resolution()))
    }

    fn base_cell(&self, cell: CellId) -> Result<u8, CodecError> {
        Ok(u8::from(Self::cell(cell)?.base_cell()))
    }

    fn base_cell_root(&self, base_cell: u8) -> Result<CellId, CodecError> {
        let bc = BaseCell::try_from(base_cell).map_err(|_| {
            CodecError::malformed(format!("base cell {base_cell} does not exist"))
        })?;
        CellIndex::base_cells()
            .find(|c| c.base_cell() == bc)
            .map(CellId::from)
            .ok_or_else(|| CodecError::malformed(format!("base cell {base_cell} does not exist")))
    }

    fn parent(&self, cell: CellId, resolution: u8) -> Result<CellId, CodecError> {
        let c = Self::cell(cell)?;
        let r = Self::res(resolution)?;
        c.parent(r)
            .map(CellId::from)
            .ok_or(CodecError::InvalidResolutionOrder {
                base: resolution,
                target: u8::from(c.resolution()),
            })
    }

    fn children(&self, cell: CellId, resolution: u8) -> Result<Vec<CellId>, CodecError> {
        let c = Self::cell(cell)?;
        let r = Self::res(resolution)?;
        if r < c.resolution() {
            return Err(CodecError::InvalidResolutionOrder {
                base: u8::from(c.resolution()),
                target: resolution,
            });
        }
        Ok(c.children(r).map(CellId::from).collect())
    }

    fn child_position(&self, child: CellId, parent_resolution: u8) -> Result<u64, CodecError> {
        let c = Self::cell(child)?;
        let r = Self::res(parent_resolution)?;
        c.child_position(r)
            .ok_or(CodecError::InvalidResolutionOrder {
                base: parent_resolution,
                target: u8::from(c.resolution()),
            })
    }

    fn child_at_position(
        &self,
        parent: CellId,
        position: u64,
        child_resolution: u8,
    ) -> Result<Option<CellId>, CodecError> {
        let c = Self::cell(parent)?;
        let r = Self::res(child_resolution)?;
        if r < c.resolution() {
            return Err(CodecError::InvalidResolutionOrder {
                base: u8::from(c.resolution()),
                target: child_resolution,
            });
        }
        Ok(c.child_at(position, r).map(CellId::from))
    }

    fn grid_disk(&self, cell: CellId, k: u32) -> Result<Vec<CellId>, CodecError> {
        let c = Self::cell(cell)?;
        Ok(c.grid_disk::<Vec<_>>(k)
            .into_iter()
            .map(CellId::from)
            .collect())
    }

    fn cell_to_latlng(&self, cell: CellId) -> Result<LatLng, CodecError> {
        Ok(H3LatLng::from(Self::cell(cell)?).into())
    }

    fn cell_to_boundary(&self, cell: CellId) -> Result<Vec<LatLng>, CodecError> {
        Ok(Self::cell(cell)?
            .boundary()
            .iter()
            .map(|ll| LatLng::from(*ll))
            .collect())
    }

    fn is_pentagon(&self, cell: CellId) -> Result<bool, CodecError> {
        Ok(Self::cell(cell)?.is_pentagon())
    }
}

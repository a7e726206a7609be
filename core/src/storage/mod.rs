use anyhow::Result;
use geo::{Intersects, Rect};

use crate::{chunk::ChunkBound, util::extend_rect::ExtendRect};

pub mod rocksdb;

/// A sidecar store for chunk bounds, keyed by file and chunk ID
pub trait BoundsStore {
    /// Add a record to the store, replacing an existing record for the same
    /// chunk. Depending on the actual implementation, this operation might
    /// be asynchronous. Call [`commit`](Self::commit) to wait for all
    /// operations to finish.
    fn add(&mut self, bound: &ChunkBound) -> Result<()>;

    /// Delete the record of the given chunk
    fn delete(&mut self, file_id: &str, chunk_id: u64) -> Result<()>;

    /// Call this method after adding or deleting one or more records
    fn commit(&mut self) -> Result<()>;

    /// Retrieve the record of a chunk
    fn get(&self, file_id: &str, chunk_id: u64) -> Result<Option<ChunkBound>>;

    /// Iterate over the records of one file in chunk order
    fn file(&self, file_id: &str) -> Result<impl Iterator<Item = Result<ChunkBound>> + '_>;

    /// Iterate over all records ordered by file and chunk
    fn iter(&self) -> Result<impl Iterator<Item = Result<ChunkBound>> + '_>;
}

/// Returns all records whose box intersects `query`. This is a coarse
/// filter: the chunks returned *may* contain data within `query`.
pub fn intersecting<S: BoundsStore>(store: &S, query: &Rect) -> Result<Vec<ChunkBound>> {
    let mut result = Vec::new();
    for bound in store.iter()? {
        let bound = bound?;
        if bound.rect().intersects(query) {
            result.push(bound);
        }
    }
    Ok(result)
}

/// Returns the union of all chunk boxes of a file or `None` if the store
/// does not know the file
pub fn file_bounds<S: BoundsStore>(store: &S, file_id: &str) -> Result<Option<Rect>> {
    let mut result: Option<Rect> = None;
    for bound in store.file(file_id)? {
        let rect = bound?.rect();
        match result {
            Some(ref mut r) => r.extend_rect(&rect),
            None => result = Some(rect),
        }
    }
    Ok(result)
}

use anyhow::{bail, Context, Result};
use rocksdb::{DBCompressionType, IteratorMode, Options, DB};

use crate::chunk::ChunkBound;

use super::BoundsStore;

/// An implementation of the [`BoundsStore`] trait backed by RocksDB
pub struct RocksDBStore {
    db: DB,
}

impl RocksDBStore {
    /// Creates a new RocksDB store at the given location
    pub fn new(path: &str) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.set_compression_type(DBCompressionType::Lz4);

        Ok(Self {
            db: DB::open(&opts, path)
                .with_context(|| format!("Unable to open bounds store at `{path}'"))?,
        })
    }
}

/// Keys are the file ID, a NUL separator, and the big-endian chunk ID. This
/// keeps the records of one file together and in chunk order.
fn file_prefix(file_id: &str) -> Result<Vec<u8>> {
    if file_id.as_bytes().contains(&0) {
        bail!("File ID `{}' must not contain NUL characters", file_id.escape_debug());
    }
    let mut key = Vec::with_capacity(file_id.len() + 9);
    key.extend_from_slice(file_id.as_bytes());
    key.push(0);
    Ok(key)
}

fn make_key(file_id: &str, chunk_id: u64) -> Result<Vec<u8>> {
    let mut key = file_prefix(file_id)?;
    // important! use `to_be_bytes()` to maintain sort order!
    key.extend_from_slice(&chunk_id.to_be_bytes());
    Ok(key)
}

fn decode(value: &[u8]) -> Result<ChunkBound> {
    let (bound, _) = bincode::decode_from_slice(value, bincode::config::standard())
        .context("Unable to decode chunk bounds")?;
    Ok(bound)
}

impl BoundsStore for RocksDBStore {
    fn add(&mut self, bound: &ChunkBound) -> Result<()> {
        let value = bincode::encode_to_vec(bound, bincode::config::standard())?;
        self.db
            .put(make_key(&bound.file_id, bound.chunk_id)?, value)?;
        Ok(())
    }

    fn delete(&mut self, file_id: &str, chunk_id: u64) -> Result<()> {
        self.db.delete(make_key(file_id, chunk_id)?)?;
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        self.db.flush()?;
        Ok(())
    }

    fn get(&self, file_id: &str, chunk_id: u64) -> Result<Option<ChunkBound>> {
        self.db
            .get(make_key(file_id, chunk_id)?)?
            .map(|v| decode(&v))
            .transpose()
    }

    fn file(&self, file_id: &str) -> Result<impl Iterator<Item = Result<ChunkBound>> + '_> {
        let prefix = file_prefix(file_id)?;
        Ok(self
            .db
            .prefix_iterator(prefix.clone())
            .take_while(move |kv| kv.as_ref().map_or(true, |(k, _)| k.starts_with(&prefix)))
            .map(|kv| decode(&kv?.1)))
    }

    fn iter(&self) -> Result<impl Iterator<Item = Result<ChunkBound>> + '_> {
        Ok(self
            .db
            .iterator(IteratorMode::Start)
            .map(|kv| decode(&kv?.1)))
    }
}

pub mod batch;
pub mod chunk;
pub mod envelope;
pub mod error;
pub mod grid;
pub mod packed_key;
pub mod path;
pub mod storage;
pub mod util;

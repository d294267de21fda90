use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::Arc;

use sha2::{Digest, Sha256};

use super::loader::load_bytes;
use super::model::Table;
use crate::error::LoadError;

// ---------------------------------------------------------------------------
// ContentHash – identity of an uploaded byte stream
// ---------------------------------------------------------------------------

/// SHA-256 of an upload's bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    pub fn of(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        ContentHash(hasher.finalize().into())
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0 {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// TableCache – parsed uploads keyed by content hash
// ---------------------------------------------------------------------------

/// Memoizes [`load_bytes`] so re-uploading the same content does not
/// re-parse it. Holds at most `capacity` tables, evicting the least recently
/// used one. Failed loads are never cached.
#[derive(Debug)]
pub struct TableCache {
    capacity: usize,
    entries: HashMap<ContentHash, Arc<Table>>,
    /// Most recently used at the back.
    order: VecDeque<ContentHash>,
}

impl TableCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    /// Return the cached table for `bytes`, parsing it on a miss.
    pub fn get_or_load(
        &mut self,
        name: Option<&str>,
        bytes: &[u8],
    ) -> Result<(ContentHash, Arc<Table>), LoadError> {
        let hash = ContentHash::of(bytes);
        if let Some(table) = self.get(&hash) {
            log::debug!("Table cache hit for {hash}");
            return Ok((hash, table));
        }

        let table = Arc::new(load_bytes(name, bytes)?);
        self.insert(hash, Arc::clone(&table));
        Ok((hash, table))
    }

    pub fn get(&mut self, hash: &ContentHash) -> Option<Arc<Table>> {
        let table = self.entries.get(hash).cloned()?;
        self.touch(hash);
        Some(table)
    }

    fn insert(&mut self, hash: ContentHash, table: Arc<Table>) {
        self.entries.insert(hash, table);
        self.touch(&hash);
        while self.order.len() > self.capacity {
            if let Some(evicted) = self.order.pop_front() {
                log::debug!("Evicting cached table {evicted}");
                self.entries.remove(&evicted);
            }
        }
    }

    fn touch(&mut self, hash: &ContentHash) {
        self.order.retain(|h| h != hash);
        self.order.push_back(*hash);
    }

    /// Drop one entry. Returns whether it was cached.
    pub fn invalidate(&mut self, hash: &ContentHash) -> bool {
        self.order.retain(|h| h != hash);
        self.entries.remove(hash).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

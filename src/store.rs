//! The replica's durable key-value store: an in-memory map that is always a projection of its
//! WAL. Writers hold `write_lock` across both the WAL append and the matching map mutation
//! (WAL-then-map, as one critical section); readers only ever touch the map.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{Mutex, RwLock};

use crate::errors::StoreError;
use crate::wal::{Op, Wal};

pub struct Store {
    wal: Wal,
    map: RwLock<HashMap<String, String>>,
    /// Held across `wal.append` and the matching map mutation, so the two steps form one nested
    /// critical section and the order writers apply to the map equals WAL order. Without this,
    /// `wal.append` (which takes and releases the WAL's own internal lock) and the map write are
    /// two separate critical sections that concurrent writers could interleave out of order.
    write_lock: Mutex<()>,
    recovered: AtomicBool,
}

impl Store {
    /// Constructs a store in the "recovering" state: the map is empty and reads/writes are not
    /// yet meaningful until [`Store::recover`] has run.
    pub fn new(wal: Wal) -> Self {
        Self {
            wal,
            map: RwLock::new(HashMap::new()),
            write_lock: Mutex::new(()),
            recovered: AtomicBool::new(false),
        }
    }

    /// Replays the WAL into the (initially empty) map, later records overriding earlier ones and
    /// `delete` removing the key. Returns the number of live keys after replay. Must be called
    /// exactly once, before request handlers observe this store.
    pub fn recover(&self) -> Result<usize, StoreError> {
        if self.recovered.swap(true, Ordering::SeqCst) {
            return Err(StoreError::AlreadyRecovered);
        }

        let records = self.wal.read_all()?;
        let mut map = self.map.write();
        for record in records {
            match record.op {
                Op::Set => {
                    map.insert(record.key, record.value);
                }
                Op::Delete => {
                    map.remove(&record.key);
                }
            }
        }
        Ok(map.len())
    }

    /// Appends a `set` record, then applies it to the map. The map is untouched if the append
    /// fails. The append and the map write happen under one held `write_lock`, so concurrent
    /// writers apply to the map in the same order they committed to the WAL.
    pub fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock();
        self.wal.append(Op::Set, key, value)?;
        self.map.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<String, StoreError> {
        self.map
            .read()
            .get(key)
            .cloned()
            .ok_or(StoreError::KeyNotFound)
    }

    /// Appends a `delete` record, then removes the key if present. Idempotent at the map level —
    /// deleting an absent key is not an error — but the record is still logged so recovery
    /// reproduces the final state. Same held-lock discipline as [`Store::set`].
    pub fn delete(&self, key: &str) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock();
        self.wal.append(Op::Delete, key, "")?;
        self.map.write().remove(key);
        Ok(())
    }

    pub fn close(&self) -> Result<(), StoreError> {
        self.wal.close()
    }
}

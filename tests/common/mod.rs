#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Mutex;

use once_cell::sync::Lazy;
use site_ledger::ledger::LedgerStore;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// A fresh directory that outlives the calling test.
pub fn temp_dir() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let path = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    path
}

/// A CSV-backed store in its own data directory, rewriting healed tables.
pub fn setup_store() -> (LedgerStore, PathBuf) {
    let dir = temp_dir();
    let store = LedgerStore::open(&dir, b',', true).expect("open store");
    (store, dir)
}

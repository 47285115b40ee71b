#![doc(test(attr(deny(warnings))))]

//! Site Ledger keeps the books of a small farm or construction site: cash
//! movements, the day-labor roster with attendance, the vehicle fleet, and the
//! contract being executed, all in plain delimited-text tables.

pub mod cli;
pub mod config;
pub mod core;
pub mod currency;
pub mod domain;
pub mod errors;
pub mod ledger;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Site Ledger tracing initialized.");
    });
}

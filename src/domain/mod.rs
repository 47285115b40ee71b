pub mod attendance;
pub mod common;
pub mod entry;
pub mod vehicle;
pub mod worker;

pub use attendance::AttendanceRecord;
pub use common::{
    EntityRef, Identifiable, PaymentMethod, GENERAL_ENTITY,
};
pub use entry::{categories, LedgerEntry};
pub use vehicle::{ContractConfig, Vehicle};
pub use worker::{PaymentDetails, Worker};

pub mod accumulator;
pub mod store;

pub use accumulator::AlertAccumulator;
pub use store::{AlertStore, FileAlertStore, MemoryAlertStore, ALERT_STORE_KEY};

pub mod service;
pub mod state;

pub use service::MonitorService;
pub use state::MapSession;

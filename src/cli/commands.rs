pub mod initdb;
pub mod serve;
pub mod simulate;

pub use initdb::init_database;
pub use serve::serve;
pub use simulate::{SimulateOptions, simulate};

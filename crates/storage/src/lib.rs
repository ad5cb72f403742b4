#![warn(clippy::pedantic)]

#[allow(clippy::module_name_repetitions)]
pub mod local_storage;
pub mod log;
pub mod memory;

pub use local_storage::LocalStorage;
pub use memory::MemoryStorage;

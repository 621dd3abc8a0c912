pub mod batch;
pub mod device;
pub mod loader;

pub use batch::{Batch, BatchSource};
pub use device::{Cpu, Device};
pub use loader::DataLoader;

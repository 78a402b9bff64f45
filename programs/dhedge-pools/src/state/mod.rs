pub mod factory;
pub mod pool;
pub mod pool_manager;

pub use factory::*;
pub use pool::*;
pub use pool_manager::*;

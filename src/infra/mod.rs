pub mod store;
pub mod utils;

pub mod filter;
pub mod session;

pub mod catalog;
pub mod scanner;
pub mod session;
pub mod synthesizer;

// Library exports for expense-tracker
// This allows the modules to be imported in tests and external code

pub mod cache;
pub mod config;
pub mod gate;
pub mod net;
pub mod parse;
pub mod persistence;
pub mod server;

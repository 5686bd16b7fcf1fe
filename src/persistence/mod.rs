//! Transaction persistence (SQLite)

mod db;
mod models;

pub use db::TransactionStore;
pub use models::{CategoryTotal, Transaction};

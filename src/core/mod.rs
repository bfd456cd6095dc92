//! Inventory state and the operations staff perform on it

mod catalog;
mod inventory;

pub use inventory::Inventory;

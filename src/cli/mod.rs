//! CLI command handlers

pub mod commands;

pub use commands::{
    area_add, area_rename, buildings, export, import, item_add, item_count, product_add,
    product_delete, product_edit, product_list, show, today, ProductEdit, Workspace,
};

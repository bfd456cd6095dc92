//! Master catalog operations

use super::Inventory;
use crate::error::{StockError, StockResult};
use crate::types::{NewProduct, Product};
use tracing::info;

impl Inventory {
    pub fn product(&self, id: &str) -> StockResult<&Product> {
        self.products
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| StockError::NotFound(format!("product '{}'", id)))
    }

    pub fn product_by_sku(&self, sku: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.sku == sku)
    }

    /// Add a product to the catalog and return its new id
    pub fn add_product(&mut self, new: NewProduct) -> StockResult<String> {
        if new.name.trim().is_empty() {
            return Err(StockError::Validation("product name cannot be empty".to_string()));
        }
        if new.sku.trim().is_empty() {
            return Err(StockError::Validation("SKU cannot be empty".to_string()));
        }
        if let Some(existing) = self.product_by_sku(new.sku.trim()) {
            return Err(StockError::Validation(format!(
                "SKU '{}' already belongs to '{}'",
                existing.sku, existing.name
            )));
        }

        let product = Product::from_new(NewProduct {
            sku: new.sku.trim().to_string(),
            ..new
        });
        let id = product.id.clone();
        info!("added product '{}' ({})", product.name, product.sku);
        self.products.push(product);
        Ok(id)
    }

    /// Replace a catalog product and refresh every line item that counts it.
    /// Counts and count units are kept.
    pub fn update_product(&mut self, updated: Product) -> StockResult<()> {
        let slot = self
            .products
            .iter_mut()
            .find(|p| p.id == updated.id)
            .ok_or_else(|| StockError::NotFound(format!("product '{}'", updated.id)))?;
        *slot = updated.clone();

        let mut refreshed = 0usize;
        for item in self.line_items_mut().filter(|i| i.product.id == updated.id) {
            item.product = updated.clone();
            refreshed += 1;
        }
        info!(
            "updated product '{}' and {} line items",
            updated.name, refreshed
        );
        Ok(())
    }

    /// Remove a product from the catalog and from every area of every
    /// snapshot. Returns the removed product.
    pub fn delete_product(&mut self, id: &str) -> StockResult<Product> {
        let idx = self
            .products
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| StockError::NotFound(format!("product '{}'", id)))?;
        let removed = self.products.remove(idx);

        let before = self.line_items().count();
        self.retain_areas_items(|item| item.product.id != id);
        let dropped = before - self.line_items().count();

        info!(
            "deleted product '{}' and {} line items",
            removed.name, dropped
        );
        Ok(removed)
    }

    /// Catalog products matching `term` over name, SKU, brand and supplier
    pub fn search_products(&self, term: &str) -> Vec<&Product> {
        self.products
            .iter()
            .filter(|p| p.matches_search(term))
            .collect()
    }
}

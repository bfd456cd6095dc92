//! Inventory state: snapshots per building and date, plus the master catalog

use crate::error::{StockError, StockResult};
use crate::excel::ImportOutcome;
use crate::types::{Area, CountUnit, InventoryData, LineItem, Product};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Characters Excel refuses in sheet names
const SHEET_NAME_FORBIDDEN: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];

/// Trimmed area name, rejected when blank or unusable as a sheet name
fn area_name(name: &str) -> StockResult<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(StockError::Validation("area name cannot be empty".to_string()));
    }
    if let Some(c) = name.chars().find(|c| SHEET_NAME_FORBIDDEN.contains(c)) {
        return Err(StockError::Validation(format!(
            "area name '{}' cannot contain '{}'",
            name, c
        )));
    }
    Ok(name)
}

/// Everything the application persists
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    #[serde(rename = "inventoryData", default)]
    pub data: InventoryData,
    #[serde(rename = "masterProductList", default)]
    pub products: Vec<Product>,
}

impl Inventory {
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            data: InventoryData::new(),
            products,
        }
    }

    /// Areas of one building on one date (empty when none recorded)
    pub fn snapshot(&self, building: &str, date: NaiveDate) -> &[Area] {
        self.data
            .get(building)
            .and_then(|dates| dates.get(&date))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Start a date from the building's most recent snapshot with every count
    /// reset to zero. Nothing happens when the date already has a snapshot or
    /// the building has no history. Returns whether a snapshot was created.
    pub fn ensure_snapshot(&mut self, building: &str, date: NaiveDate) -> bool {
        let Some(dates) = self.data.get_mut(building) else {
            return false;
        };
        if dates.contains_key(&date) {
            return false;
        }
        let Some((&template_date, template)) = dates.iter().next_back() else {
            return false;
        };

        let areas: Vec<Area> = template
            .iter()
            .map(|area| Area {
                items: area
                    .items
                    .iter()
                    .map(|item| LineItem {
                        count: 0.0,
                        ..item.clone()
                    })
                    .collect(),
                ..area.clone()
            })
            .collect();

        debug!(
            "carrying {} areas forward from {} to {} for {}",
            areas.len(),
            template_date,
            date,
            building
        );
        dates.insert(date, areas);
        true
    }

    fn snapshot_mut(&mut self, building: &str, date: NaiveDate) -> &mut Vec<Area> {
        self.data
            .entry(building.to_string())
            .or_default()
            .entry(date)
            .or_default()
    }

    fn area_mut(&mut self, building: &str, date: NaiveDate, area_id: &str) -> StockResult<&mut Area> {
        self.data
            .get_mut(building)
            .and_then(|dates| dates.get_mut(&date))
            .and_then(|areas| areas.iter_mut().find(|a| a.id == area_id))
            .ok_or_else(|| {
                StockError::NotFound(format!(
                    "area '{}' for building '{}' on {}",
                    area_id, building, date
                ))
            })
    }

    /// Append a new, empty area and return its id
    pub fn add_area(&mut self, building: &str, date: NaiveDate, name: &str) -> StockResult<String> {
        let name = area_name(name)?;
        let area = Area::new(name);
        let id = area.id.clone();
        self.snapshot_mut(building, date).push(area);
        Ok(id)
    }

    pub fn rename_area(
        &mut self,
        building: &str,
        date: NaiveDate,
        area_id: &str,
        name: &str,
    ) -> StockResult<()> {
        let name = area_name(name)?;
        self.area_mut(building, date, area_id)?.name = name.to_string();
        Ok(())
    }

    /// Put a catalog product into an area, counted as 0 cases. Returns false
    /// when the area already lists the product.
    pub fn add_item(
        &mut self,
        building: &str,
        date: NaiveDate,
        area_id: &str,
        product_id: &str,
    ) -> StockResult<bool> {
        let product = self.product(product_id)?.clone();
        let area = self.area_mut(building, date, area_id)?;
        if area.item(product_id).is_some() {
            return Ok(false);
        }
        area.items.push(LineItem::new(product));
        Ok(true)
    }

    /// Record a count for a product in an area
    pub fn update_item(
        &mut self,
        building: &str,
        date: NaiveDate,
        area_id: &str,
        product_id: &str,
        count: f64,
        unit: CountUnit,
    ) -> StockResult<()> {
        if !count.is_finite() || count < 0.0 {
            return Err(StockError::Validation(format!(
                "count must be a non-negative number, got {}",
                count
            )));
        }
        let area = self.area_mut(building, date, area_id)?;
        let item = area
            .items
            .iter_mut()
            .find(|item| item.product.id == product_id)
            .ok_or_else(|| {
                StockError::NotFound(format!("product '{}' in area '{}'", product_id, area_id))
            })?;
        item.count = count;
        item.count_unit = unit;
        Ok(())
    }

    /// Replace a snapshot and the catalog with an import result. Returns the id
    /// of the first imported area, which becomes the active one.
    pub fn apply_import(
        &mut self,
        building: &str,
        date: NaiveDate,
        outcome: ImportOutcome,
    ) -> Option<String> {
        let first = outcome.areas.first().map(|a| a.id.clone());
        info!(
            "replacing {} areas for {} on {} with {} imported areas",
            self.snapshot(building, date).len(),
            building,
            date,
            outcome.areas.len()
        );
        *self.snapshot_mut(building, date) = outcome.areas;
        self.products = outcome.products;
        first
    }

    /// Every line item across all buildings and dates
    pub fn line_items(&self) -> impl Iterator<Item = &LineItem> {
        self.data
            .values()
            .flat_map(|dates| dates.values())
            .flat_map(|areas| areas.iter())
            .flat_map(|area| area.items.iter())
    }

    pub(crate) fn line_items_mut(&mut self) -> impl Iterator<Item = &mut LineItem> {
        self.data
            .values_mut()
            .flat_map(|dates| dates.values_mut())
            .flat_map(|areas| areas.iter_mut())
            .flat_map(|area| area.items.iter_mut())
    }

    pub(crate) fn retain_areas_items<F>(&mut self, mut keep: F)
    where
        F: FnMut(&LineItem) -> bool,
    {
        for area in self
            .data
            .values_mut()
            .flat_map(|dates| dates.values_mut())
            .flat_map(|areas| areas.iter_mut())
        {
            area.items.retain(|item| keep(item));
        }
    }
}

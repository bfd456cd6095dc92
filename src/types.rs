use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

//==============================================================================
// Catalog Types
//==============================================================================

/// A master-catalog entry.
///
/// `id` is assigned internally and never re-derived from `sku`; `sku` is the
/// business key used to match products across imported workbooks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    #[serde(default)]
    pub supplier: String,
    #[serde(default)]
    pub brand: String,
    #[serde(rename = "productName")]
    pub name: String,
    pub sku: String,
    #[serde(default)]
    pub package_size: String,
    #[serde(rename = "productsPerCase", default = "default_units_per_case")]
    pub units_per_case: u32,
    #[serde(default)]
    pub case_weight: f64,
    #[serde(default)]
    pub case_price: f64,
    #[serde(default)]
    pub each_price: f64,
}

fn default_units_per_case() -> u32 {
    1
}

/// Product fields supplied by a user when adding to the catalog.
///
/// `each_price` is derived from the case price when left out.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewProduct {
    pub supplier: String,
    pub brand: String,
    pub name: String,
    pub sku: String,
    pub package_size: String,
    pub units_per_case: u32,
    pub case_weight: f64,
    pub case_price: f64,
    pub each_price: Option<f64>,
}

impl Product {
    /// Build a catalog product with a fresh identifier
    pub fn from_new(new: NewProduct) -> Self {
        let units_per_case = new.units_per_case.max(1);
        let each_price = match new.each_price {
            Some(price) if price != 0.0 => price,
            _ => derive_each_price(new.case_price, units_per_case),
        };
        Self {
            id: new_product_id(),
            supplier: new.supplier,
            brand: new.brand,
            name: new.name,
            sku: new.sku,
            package_size: new.package_size,
            units_per_case,
            case_weight: new.case_weight,
            case_price: new.case_price,
            each_price,
        }
    }

    /// Case-insensitive substring match over name, SKU, brand and supplier
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        [&self.name, &self.sku, &self.brand, &self.supplier]
            .iter()
            .any(|field| field.to_lowercase().contains(&term))
    }
}

/// Per-unit price from a case price. Zero when the case quantity is zero.
pub fn derive_each_price(case_price: f64, units_per_case: u32) -> f64 {
    if units_per_case == 0 {
        return 0.0;
    }
    let each = case_price / units_per_case as f64;
    if each.is_finite() {
        each
    } else {
        0.0
    }
}

pub fn new_product_id() -> String {
    format!("prod-{}", Uuid::new_v4().simple())
}

pub fn new_area_id() -> String {
    format!("area-{}", Uuid::new_v4().simple())
}

//==============================================================================
// Inventory Types
//==============================================================================

/// Unit a line item is counted in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountUnit {
    #[default]
    Case,
    Each,
}

impl CountUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            CountUnit::Case => "case",
            CountUnit::Each => "each",
        }
    }

    /// `each` (any case, surrounding whitespace ignored) is EACH, anything else CASE
    pub fn from_cell(text: &str) -> Self {
        if text.trim().eq_ignore_ascii_case("each") {
            CountUnit::Each
        } else {
            CountUnit::Case
        }
    }
}

impl std::fmt::Display for CountUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A product counted in one area
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    #[serde(flatten)]
    pub product: Product,
    #[serde(default)]
    pub count: f64,
    #[serde(default)]
    pub count_unit: CountUnit,
}

impl LineItem {
    /// A fresh line item: count 0, counted by the case
    pub fn new(product: Product) -> Self {
        Self {
            product,
            count: 0.0,
            count_unit: CountUnit::Case,
        }
    }

    pub fn total_value(&self) -> f64 {
        match self.count_unit {
            CountUnit::Case => self.count * self.product.case_price,
            CountUnit::Each => self.count * self.product.each_price,
        }
    }
}

/// A storage area and its ordered line items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Area {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub items: Vec<LineItem>,
}

impl Area {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: new_area_id(),
            name: name.into(),
            items: Vec::new(),
        }
    }

    pub fn total_value(&self) -> f64 {
        self.items.iter().map(LineItem::total_value).sum()
    }

    pub fn item(&self, product_id: &str) -> Option<&LineItem> {
        self.items.iter().find(|item| item.product.id == product_id)
    }
}

/// Total value across every area of a snapshot
pub fn snapshot_total(areas: &[Area]) -> f64 {
    areas.iter().map(Area::total_value).sum()
}

/// A physical building where inventory is tracked
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Building {
    pub id: String,
    pub name: String,
}

/// All snapshots: building id → date → ordered areas
pub type InventoryData = BTreeMap<String, BTreeMap<NaiveDate, Vec<Area>>>;

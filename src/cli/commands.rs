use crate::config::Config;
use crate::core::Inventory;
use crate::error::{StockError, StockResult};
use crate::excel::{ExportOptions, InventoryExporter, InventoryImporter};
use crate::mail::MailDraft;
use crate::store;
use crate::types::{snapshot_total, Area, Building, CountUnit, NewProduct, Product};
use chrono::NaiveDate;
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};

/// Format a currency amount for display
fn format_money(n: f64) -> String {
    format!("${:.2}", n)
}

/// Today's date in local time, used when `--date` is omitted
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Loaded configuration plus the inventory store it points at
pub struct Workspace {
    pub config: Config,
    pub store_path: PathBuf,
    pub inventory: Inventory,
}

impl Workspace {
    /// Load the config file and the store. `store_override` wins over the
    /// config's `store_path`.
    pub fn open(config_path: &Path, store_override: Option<PathBuf>) -> StockResult<Self> {
        let config = Config::load(config_path)?;
        let store_path = store_override.unwrap_or_else(|| config.store_path.clone());
        let inventory = store::load(&store_path)?;
        Ok(Self {
            config,
            store_path,
            inventory,
        })
    }

    pub fn save(&self) -> StockResult<()> {
        store::save(&self.store_path, &self.inventory)
    }

    fn building(&self, key: &str) -> StockResult<Building> {
        self.config.building(key).cloned()
    }

    /// Apply carry-forward for the date and persist if a snapshot was created
    fn prepare_snapshot(&mut self, building: &Building, date: NaiveDate) -> StockResult<()> {
        if self.inventory.ensure_snapshot(&building.id, date) {
            println!(
                "   {} {}",
                "↪ Started from the previous count for".dimmed(),
                building.name.dimmed()
            );
            self.save()?;
        }
        Ok(())
    }

    /// Find an area by id, or by name ignoring case
    fn area_id(&self, building: &Building, date: NaiveDate, key: &str) -> StockResult<String> {
        let areas = self.inventory.snapshot(&building.id, date);
        areas
            .iter()
            .find(|a| a.id == key)
            .or_else(|| areas.iter().find(|a| a.name.eq_ignore_ascii_case(key.trim())))
            .map(|a| a.id.clone())
            .ok_or_else(|| {
                StockError::NotFound(format!(
                    "area '{}' for {} on {}",
                    key, building.name, date
                ))
            })
    }

    /// Find a catalog product by id or SKU
    fn product_id(&self, key: &str) -> StockResult<String> {
        let key = key.trim();
        match self.inventory.product(key) {
            Ok(p) => Ok(p.id.clone()),
            Err(_) => self
                .inventory
                .product_by_sku(key)
                .map(|p| p.id.clone())
                .ok_or_else(|| StockError::NotFound(format!("product '{}'", key))),
        }
    }
}

//==============================================================================
// Import / Export
//==============================================================================

/// Execute the import command
pub fn import(
    ws: &mut Workspace,
    file: PathBuf,
    building: String,
    date: NaiveDate,
    verbose: bool,
) -> StockResult<()> {
    let building = ws.building(&building)?;

    println!("{}", "📦 Stockbook - Excel Import".bold().green());
    println!("   File:     {}", file.display());
    println!("   Building: {}", building.name.bright_blue());
    println!("   Date:     {}\n", date);

    let importer = InventoryImporter::new(&ws.inventory.products);
    let outcome = importer.import_file(&file)?;

    for warning in &outcome.warnings {
        println!("   {} {}", "⚠️ ".yellow(), warning.to_string().yellow());
    }
    if verbose {
        for area in &outcome.areas {
            println!(
                "   📋 {}: {} items",
                area.name.bright_blue(),
                area.items.len()
            );
        }
    }

    let areas = outcome.areas.len();
    let items = outcome.item_count();
    let new_products = outcome.new_products;
    ws.inventory.apply_import(&building.id, date, outcome);
    ws.save()?;

    println!("\n{}", "✅ Import Complete!".bold().green());
    println!("   {} areas, {} items", areas, items);
    if new_products > 0 {
        println!(
            "   {} new products added to the catalog",
            new_products.to_string().bright_yellow()
        );
    }
    Ok(())
}

/// Execute the export command
pub fn export(
    ws: &mut Workspace,
    building: String,
    date: NaiveDate,
    out_dir: Option<PathBuf>,
    with_totals: bool,
    email: Option<String>,
) -> StockResult<()> {
    let building = ws.building(&building)?;
    let out_dir = out_dir.unwrap_or_else(|| ws.config.export_dir.clone());

    println!("{}", "📦 Stockbook - Excel Export".bold().green());
    println!("   Building: {}", building.name.bright_blue());
    println!("   Date:     {}\n", date);

    ws.prepare_snapshot(&building, date)?;
    let exporter = InventoryExporter::with_options(ExportOptions { with_totals });
    let workbook = exporter.export(
        ws.inventory.snapshot(&building.id, date),
        &building.name,
        date,
    )?;

    fs::create_dir_all(&out_dir)?;
    let path = workbook.save_to(&out_dir)?;

    println!("{}", "✅ Export Complete!".bold().green());
    println!("   Excel file: {}", path.display());

    if let Some(recipient) = email {
        let draft = MailDraft::new(&recipient, &building.name, date, &workbook.filename);
        println!("\n{}", "✉️  Email draft".bold().cyan());
        println!("   {}", draft.mailto_url());
    }
    println!();
    Ok(())
}

//==============================================================================
// Browsing
//==============================================================================

/// Execute the show command
pub fn show(ws: &mut Workspace, building: String, date: NaiveDate) -> StockResult<()> {
    let building = ws.building(&building)?;
    ws.prepare_snapshot(&building, date)?;

    println!(
        "{}",
        format!("📋 {} - {}", building.name, date).bold().green()
    );

    let areas = ws.inventory.snapshot(&building.id, date);
    if areas.is_empty() {
        println!("   {}", "No inventory recorded.".dimmed());
        return Ok(());
    }

    for area in areas {
        print_area(area);
    }
    println!("{}", "─".repeat(72));
    println!(
        "{:<58}{:>14}",
        "Ending Inventory".bold(),
        format_money(snapshot_total(areas)).bold().green()
    );
    Ok(())
}

fn print_area(area: &Area) {
    println!("\n{} {}", area.name.bold().cyan(), area.id.dimmed());
    for item in &area.items {
        println!(
            "   {:<36}{:<12}{:>6} {:<5}{:>12}",
            item.product.name,
            item.product.sku.bright_blue(),
            item.count,
            item.count_unit.as_str(),
            format_money(item.total_value()).green()
        );
    }
    println!("   {:<59}{:>12}", "Total:", format_money(area.total_value()));
}

/// List configured buildings
pub fn buildings(config: &Config) -> StockResult<()> {
    println!("{}", "🏢 Buildings".bold().green());
    for b in &config.buildings {
        println!("   {:<10} {}", b.id.bright_blue(), b.name);
    }
    Ok(())
}

//==============================================================================
// Areas and counts
//==============================================================================

pub fn area_add(
    ws: &mut Workspace,
    building: String,
    date: NaiveDate,
    name: String,
) -> StockResult<()> {
    let building = ws.building(&building)?;
    ws.prepare_snapshot(&building, date)?;
    let id = ws.inventory.add_area(&building.id, date, &name)?;
    ws.save()?;
    println!("✅ Added area {} ({})", name.trim().bold(), id.dimmed());
    Ok(())
}

pub fn area_rename(
    ws: &mut Workspace,
    building: String,
    date: NaiveDate,
    area: String,
    name: String,
) -> StockResult<()> {
    let building = ws.building(&building)?;
    ws.prepare_snapshot(&building, date)?;
    let id = ws.area_id(&building, date, &area)?;
    ws.inventory.rename_area(&building.id, date, &id, &name)?;
    ws.save()?;
    println!("✅ Renamed area to {}", name.trim().bold());
    Ok(())
}

pub fn item_add(
    ws: &mut Workspace,
    building: String,
    date: NaiveDate,
    area: String,
    product: String,
) -> StockResult<()> {
    let building = ws.building(&building)?;
    ws.prepare_snapshot(&building, date)?;
    let area_id = ws.area_id(&building, date, &area)?;
    let product_id = ws.product_id(&product)?;

    if ws
        .inventory
        .add_item(&building.id, date, &area_id, &product_id)?
    {
        ws.save()?;
        println!("✅ Added {} to {}", product.bold(), area.bold());
    } else {
        println!("{} {} is already in {}", "⚠️ ".yellow(), product, area);
    }
    Ok(())
}

pub fn item_count(
    ws: &mut Workspace,
    building: String,
    date: NaiveDate,
    area: String,
    product: String,
    count: f64,
    unit: CountUnit,
) -> StockResult<()> {
    let building = ws.building(&building)?;
    ws.prepare_snapshot(&building, date)?;
    let area_id = ws.area_id(&building, date, &area)?;
    let product_id = ws.product_id(&product)?;
    ws.inventory
        .update_item(&building.id, date, &area_id, &product_id, count, unit)?;
    ws.save()?;
    println!("✅ Counted {} {} of {}", count, unit, product.bold());
    Ok(())
}

//==============================================================================
// Catalog
//==============================================================================

/// Optional field changes for `product edit`
#[derive(Debug, Default, Clone)]
pub struct ProductEdit {
    pub supplier: Option<String>,
    pub brand: Option<String>,
    pub name: Option<String>,
    pub sku: Option<String>,
    pub package_size: Option<String>,
    pub units_per_case: Option<u32>,
    pub case_weight: Option<f64>,
    pub case_price: Option<f64>,
    pub each_price: Option<f64>,
}

impl ProductEdit {
    /// Apply the changes. The each price is re-derived when the case price or
    /// case quantity changes and no each price is given.
    fn apply(self, mut product: Product) -> Product {
        let repriced = self.case_price.is_some() || self.units_per_case.is_some();
        if let Some(v) = self.supplier {
            product.supplier = v;
        }
        if let Some(v) = self.brand {
            product.brand = v;
        }
        if let Some(v) = self.name {
            product.name = v;
        }
        if let Some(v) = self.sku {
            product.sku = v.trim().to_string();
        }
        if let Some(v) = self.package_size {
            product.package_size = v;
        }
        if let Some(v) = self.units_per_case {
            product.units_per_case = v.max(1);
        }
        if let Some(v) = self.case_weight {
            product.case_weight = v;
        }
        if let Some(v) = self.case_price {
            product.case_price = v;
        }
        match self.each_price {
            Some(v) => product.each_price = v,
            None if repriced => {
                product.each_price =
                    crate::types::derive_each_price(product.case_price, product.units_per_case)
            }
            None => {}
        }
        product
    }
}

pub fn product_list(ws: &Workspace, query: Option<String>) -> StockResult<()> {
    let products = ws.inventory.search_products(query.as_deref().unwrap_or(""));
    println!(
        "{}",
        format!("📚 Catalog ({} products)", products.len())
            .bold()
            .green()
    );
    for p in products {
        println!(
            "   {:<12}{:<36}{:<16}{:>10}{:>10}  {}",
            p.sku.bright_blue(),
            p.name,
            p.brand,
            format_money(p.case_price),
            format_money(p.each_price),
            p.id.dimmed()
        );
    }
    Ok(())
}

pub fn product_add(ws: &mut Workspace, new: NewProduct) -> StockResult<()> {
    let name = new.name.clone();
    let id = ws.inventory.add_product(new)?;
    ws.save()?;
    println!("✅ Added product {} ({})", name.bold(), id.dimmed());
    Ok(())
}

pub fn product_edit(ws: &mut Workspace, product: String, edit: ProductEdit) -> StockResult<()> {
    let id = ws.product_id(&product)?;
    let current = ws.inventory.product(&id)?.clone();
    let updated = edit.apply(current);

    if updated.name.trim().is_empty() || updated.sku.is_empty() {
        return Err(StockError::Validation(
            "product name and SKU cannot be empty".to_string(),
        ));
    }
    if let Some(other) = ws.inventory.product_by_sku(&updated.sku) {
        if other.id != id {
            return Err(StockError::Validation(format!(
                "SKU '{}' already belongs to '{}'",
                other.sku, other.name
            )));
        }
    }

    let name = updated.name.clone();
    ws.inventory.update_product(updated)?;
    ws.save()?;
    println!("✅ Updated product {}", name.bold());
    Ok(())
}

pub fn product_delete(ws: &mut Workspace, product: String) -> StockResult<()> {
    let id = ws.product_id(&product)?;
    let removed = ws.inventory.delete_product(&id)?;
    ws.save()?;
    println!(
        "✅ Deleted product {} and removed it from every inventory",
        removed.name.bold()
    );
    Ok(())
}

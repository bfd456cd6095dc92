use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use stockbook::cli::{self, ProductEdit, Workspace};
use stockbook::config::DEFAULT_CONFIG_FILE;
use stockbook::error::StockResult;
use stockbook::types::{CountUnit, NewProduct};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "stockbook")]
#[command(about = "Food-service inventory counts with Excel import and export.")]
#[command(long_about = "Stockbook - Food-service inventory counts
Count storage areas per building and date, reconcile spreadsheets against
the master product catalog, and export reports to Excel.

COMMANDS:
  import     - Load a count workbook into a building/date
  export     - Write a building/date to an .xlsx report
  show       - Print the areas, counts and values for a building/date
  buildings  - List configured buildings
  area       - Add or rename storage areas
  item       - Add products to areas and record counts
  product    - Manage the master product catalog

EXAMPLES:
  stockbook import counts.xlsx --building bldg-1 --date 2025-03-01
  stockbook export --building Pavilion --with-totals --email chef@example.com
  stockbook item count --building bldg-1 --area \"Walk-In Cooler\" --product SKU-4567 --count 3

CONFIG:
  stockbook.yaml lists buildings, the store file and the export directory.
  A missing config file means built-in defaults.")]
#[command(version)]
struct Cli {
    /// Config file (YAML)
    #[arg(long, global = true, env = "STOCKBOOK_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Store file (JSON), overrides the config's store_path
    #[arg(long, global = true, env = "STOCKBOOK_STORE")]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(long_about = "Import an inventory workbook.

The workbook needs a sheet whose name contains 'total' with an
'Inventories | Totals' header row listing the areas in order. Each other
sheet names its area in one of its first 5 rows, followed by a 'Company'
header row and one row per item.

Products are matched to the catalog by SKU (Item #). Unknown SKUs are
added to the catalog. The imported areas replace whatever was recorded
for the building and date.")]
    /// Import an inventory workbook for a building and date
    Import {
        /// Workbook file (.xlsx, .xls, .xlsb, .ods)
        file: PathBuf,

        /// Building id or name
        #[arg(short, long)]
        building: String,

        /// Count date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<NaiveDate>,

        /// List imported areas
        #[arg(short, long)]
        verbose: bool,
    },

    #[command(long_about = "Export a building's inventory to Excel.

One worksheet per area with company, brand, description, item number,
case quantity, package, prices, count and total cost.

--with-totals adds a leading 'Totals' sheet and area title rows so the
report can be imported again.

--email prints a mailto: link with a ready-made message; attach the
exported file by hand.")]
    /// Export a building's inventory to .xlsx
    Export {
        /// Building id or name
        #[arg(short, long)]
        building: String,

        /// Count date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<NaiveDate>,

        /// Output directory, defaults to the config's export_dir
        #[arg(short, long)]
        out_dir: Option<PathBuf>,

        /// Add a Totals sheet so the workbook can be re-imported
        #[arg(long)]
        with_totals: bool,

        /// Print an email draft for this recipient
        #[arg(long)]
        email: Option<String>,
    },

    /// Show areas, counts and values for a building and date
    Show {
        /// Building id or name
        #[arg(short, long)]
        building: String,

        /// Count date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },

    /// List configured buildings
    Buildings,

    /// Manage storage areas
    #[command(subcommand)]
    Area(AreaCommands),

    /// Add products to areas and record counts
    #[command(subcommand)]
    Item(ItemCommands),

    /// Manage the master product catalog
    #[command(subcommand)]
    Product(ProductCommands),
}

#[derive(Subcommand)]
enum AreaCommands {
    /// Add an empty area
    Add {
        #[arg(short, long)]
        building: String,
        #[arg(short, long)]
        date: Option<NaiveDate>,
        /// Area name
        name: String,
    },
    /// Rename an area
    Rename {
        #[arg(short, long)]
        building: String,
        #[arg(short, long)]
        date: Option<NaiveDate>,
        /// Area id or current name
        area: String,
        /// New name
        name: String,
    },
}

#[derive(Subcommand)]
enum ItemCommands {
    /// Add a catalog product to an area (counted as 0 cases)
    Add {
        #[arg(short, long)]
        building: String,
        #[arg(short, long)]
        date: Option<NaiveDate>,
        /// Area id or name
        #[arg(short, long)]
        area: String,
        /// Product id or SKU
        #[arg(short, long)]
        product: String,
    },
    /// Record a count
    Count {
        #[arg(short, long)]
        building: String,
        #[arg(short, long)]
        date: Option<NaiveDate>,
        /// Area id or name
        #[arg(short, long)]
        area: String,
        /// Product id or SKU
        #[arg(short, long)]
        product: String,
        #[arg(short, long)]
        count: f64,
        #[arg(short, long, value_enum, default_value_t = UnitArg::Case)]
        unit: UnitArg,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum UnitArg {
    Case,
    Each,
}

impl From<UnitArg> for CountUnit {
    fn from(unit: UnitArg) -> Self {
        match unit {
            UnitArg::Case => CountUnit::Case,
            UnitArg::Each => CountUnit::Each,
        }
    }
}

#[derive(Subcommand)]
enum ProductCommands {
    /// List catalog products, optionally filtered
    List {
        /// Match name, SKU, brand or supplier
        query: Option<String>,
    },
    /// Add a product to the catalog
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        sku: String,
        #[arg(long, default_value = "")]
        supplier: String,
        #[arg(long, default_value = "")]
        brand: String,
        #[arg(long, default_value = "")]
        package_size: String,
        #[arg(long, default_value_t = 1)]
        units_per_case: u32,
        #[arg(long, default_value_t = 0.0)]
        case_weight: f64,
        #[arg(long, default_value_t = 0.0)]
        case_price: f64,
        /// Derived from case price and units per case when omitted
        #[arg(long)]
        each_price: Option<f64>,
    },
    /// Edit a product; every inventory counting it is updated
    Edit {
        /// Product id or SKU
        product: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        sku: Option<String>,
        #[arg(long)]
        supplier: Option<String>,
        #[arg(long)]
        brand: Option<String>,
        #[arg(long)]
        package_size: Option<String>,
        #[arg(long)]
        units_per_case: Option<u32>,
        #[arg(long)]
        case_weight: Option<f64>,
        #[arg(long)]
        case_price: Option<f64>,
        #[arg(long)]
        each_price: Option<f64>,
    },
    /// Delete a product from the catalog and from every inventory
    Delete {
        /// Product id or SKU
        product: String,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {}", "❌ Error:".bold().red(), e);
        std::process::exit(1);
    }
}

fn run() -> StockResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("stockbook=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Cli::parse();
    let day = |date: Option<NaiveDate>| date.unwrap_or_else(cli::today);

    if let Commands::Buildings = args.command {
        let config = stockbook::config::Config::load(&args.config)?;
        return cli::buildings(&config);
    }

    let mut ws = Workspace::open(&args.config, args.store)?;

    match args.command {
        Commands::Import {
            file,
            building,
            date,
            verbose,
        } => cli::import(&mut ws, file, building, day(date), verbose),

        Commands::Export {
            building,
            date,
            out_dir,
            with_totals,
            email,
        } => cli::export(&mut ws, building, day(date), out_dir, with_totals, email),

        Commands::Show { building, date } => cli::show(&mut ws, building, day(date)),

        Commands::Buildings => cli::buildings(&ws.config),

        Commands::Area(AreaCommands::Add {
            building,
            date,
            name,
        }) => cli::area_add(&mut ws, building, day(date), name),

        Commands::Area(AreaCommands::Rename {
            building,
            date,
            area,
            name,
        }) => cli::area_rename(&mut ws, building, day(date), area, name),

        Commands::Item(ItemCommands::Add {
            building,
            date,
            area,
            product,
        }) => cli::item_add(&mut ws, building, day(date), area, product),

        Commands::Item(ItemCommands::Count {
            building,
            date,
            area,
            product,
            count,
            unit,
        }) => cli::item_count(&mut ws, building, day(date), area, product, count, unit.into()),

        Commands::Product(ProductCommands::List { query }) => cli::product_list(&ws, query),

        Commands::Product(ProductCommands::Add {
            name,
            sku,
            supplier,
            brand,
            package_size,
            units_per_case,
            case_weight,
            case_price,
            each_price,
        }) => cli::product_add(
            &mut ws,
            NewProduct {
                supplier,
                brand,
                name,
                sku,
                package_size,
                units_per_case,
                case_weight,
                case_price,
                each_price,
            },
        ),

        Commands::Product(ProductCommands::Edit {
            product,
            name,
            sku,
            supplier,
            brand,
            package_size,
            units_per_case,
            case_weight,
            case_price,
            each_price,
        }) => cli::product_edit(
            &mut ws,
            product,
            ProductEdit {
                supplier,
                brand,
                name,
                sku,
                package_size,
                units_per_case,
                case_weight,
                case_price,
                each_price,
            },
        ),

        Commands::Product(ProductCommands::Delete { product }) => {
            cli::product_delete(&mut ws, product)
        }
    }
}

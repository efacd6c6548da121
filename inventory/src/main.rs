#![cfg_attr(test, allow(clippy::disallowed_methods))]
// Forbid unwrap() in production code to prevent panics from corrupt data.
// Test code is allowed to use unwrap() for convenience.
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use inventory::{
    config::StoreConfig,
    storage::{DirectoryStorage, InventoryStore, StoreError},
    types::{ItemId, Record},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Persistent inventory record store.
///
/// Records print to stdout as JSON lines; logs go to stderr.
#[derive(Debug, Parser)]
#[command(name = "inventory", version)]
struct Cli {
    /// Directory holding the category files (overrides INVENTORY_DATA_DIRECTORY).
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Add a record under the next free id.
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        category: String,
        #[arg(long)]
        quantity: u32,
        #[arg(long)]
        price: f64,
        #[arg(long)]
        supplier: String,
    },
    /// Print the record with the given id.
    Read { id: u64 },
    /// Change fields of an existing record; omitted fields keep their value.
    Update {
        id: u64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        quantity: Option<u32>,
        #[arg(long)]
        price: Option<f64>,
        #[arg(long)]
        supplier: Option<String>,
    },
    /// Remove the record with the given id.
    Delete { id: u64 },
    /// Print every record ordered by category, then name.
    List,
    /// Print the first record whose name matches, ignoring case.
    Find { name: String },
    /// Print the id the next created record would get.
    NextId,
    /// Print the category names.
    Categories,
}

/// How a successful command ended.
enum Status {
    Done,
    NotFound(String),
}

#[derive(Debug)]
enum CommandError {
    Store(StoreError),
    Json(serde_json::Error),
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(e) => write!(f, "{e}"),
            Self::Json(e) => write!(f, "failed to encode output: {e}"),
        }
    }
}

impl std::error::Error for CommandError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Store(e) => Some(e),
            Self::Json(e) => Some(e),
        }
    }
}

impl From<StoreError> for CommandError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

impl From<serde_json::Error> for CommandError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "inventory=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    // Load configuration from environment variables
    let mut config = match StoreConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {e}");
            return ExitCode::from(2);
        }
    };
    if let Some(data_dir) = cli.data_dir {
        config.data_directory = data_dir;
    }

    tracing::debug!(
        "Loaded configuration: data_directory={}, enforce_unique_names={}",
        config.data_directory.display(),
        config.enforce_unique_names
    );

    let mut store = match InventoryStore::open(&config) {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("Failed to open inventory: {e}");
            return ExitCode::from(2);
        }
    };

    match run(&mut store, cli.command) {
        Ok(Status::Done) => ExitCode::SUCCESS,
        Ok(Status::NotFound(message)) => {
            eprintln!("{message}");
            ExitCode::from(1)
        }
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::from(2)
        }
    }
}

fn run(
    store: &mut InventoryStore<DirectoryStorage>,
    command: Command,
) -> Result<Status, CommandError> {
    match command {
        Command::Create {
            name,
            category,
            quantity,
            price,
            supplier,
        } => {
            let id = store.next_available_id()?;
            let record = Record::new(id, name, category, quantity, price, supplier);
            store.create(record.clone())?;
            print_record(&record)?;
        }
        Command::Read { id } => match store.read(ItemId(id))? {
            Some(record) => print_record(&record)?,
            None => return Ok(not_found(id)),
        },
        Command::Update {
            id,
            name,
            category,
            quantity,
            price,
            supplier,
        } => {
            let id = ItemId(id);
            let Some(mut record) = store.read(id)? else {
                return Ok(not_found(id.get()));
            };
            if let Some(name) = name {
                record.name = name;
            }
            if let Some(category) = category {
                record.category = category;
            }
            if let Some(quantity) = quantity {
                record.quantity = quantity;
            }
            if let Some(price) = price {
                record.price = price;
            }
            if let Some(supplier) = supplier {
                record.supplier = supplier;
            }
            if !store.update(id, record.clone())? {
                return Ok(not_found(id.get()));
            }
            print_record(&record)?;
        }
        Command::Delete { id } => {
            if !store.delete(ItemId(id))? {
                return Ok(not_found(id));
            }
            println!("{}", serde_json::json!({ "deleted": id }));
        }
        Command::List => {
            for record in &store.list_all()? {
                print_record(record)?;
            }
        }
        Command::Find { name } => match store.find_by_name(&name)? {
            Some(record) => print_record(&record)?,
            None => return Ok(Status::NotFound(format!("no item named '{name}'"))),
        },
        Command::NextId => println!("{}", store.next_available_id()?),
        Command::Categories => {
            for category in store.categories()? {
                println!("{category}");
            }
        }
    }
    Ok(Status::Done)
}

fn not_found(id: u64) -> Status {
    Status::NotFound(format!("no item with id {id}"))
}

fn print_record(record: &Record) -> Result<(), CommandError> {
    println!("{}", serde_json::to_string(record)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_create() {
        let cli = Cli::try_parse_from([
            "inventory",
            "--data-dir",
            "/tmp/inv",
            "create",
            "--name",
            "Widget",
            "--category",
            "Tools",
            "--quantity",
            "5",
            "--price",
            "2.5",
            "--supplier",
            "Acme",
        ])
        .expect("parse");

        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/inv")));
        assert!(matches!(
            cli.command,
            Command::Create { ref name, quantity: 5, .. } if name == "Widget"
        ));
    }

    #[test]
    fn test_parse_partial_update() {
        let cli = Cli::try_parse_from(["inventory", "update", "3", "--quantity", "9"])
            .expect("parse");
        assert!(matches!(
            cli.command,
            Command::Update {
                id: 3,
                quantity: Some(9),
                name: None,
                category: None,
                price: None,
                supplier: None,
            }
        ));
    }

    #[test]
    fn test_rejects_missing_fields() {
        assert!(Cli::try_parse_from(["inventory", "create", "--name", "Widget"]).is_err());
        assert!(Cli::try_parse_from(["inventory", "read", "abc"]).is_err());
    }

    #[test]
    fn test_run_against_temp_dir() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let mut store = InventoryStore::open(&StoreConfig::with_data_directory(dir.path()))
            .expect("open");

        let create = Command::Create {
            name: "Widget".to_string(),
            category: "Tools".to_string(),
            quantity: 5,
            price: 2.5,
            supplier: "Acme".to_string(),
        };
        assert!(matches!(run(&mut store, create), Ok(Status::Done)));

        let update = Command::Update {
            id: 1,
            name: None,
            category: Some("Garden".to_string()),
            quantity: None,
            price: None,
            supplier: None,
        };
        assert!(matches!(run(&mut store, update), Ok(Status::Done)));
        assert_eq!(
            store.read(ItemId(1)).expect("read").map(|r| r.category),
            Some("Garden".to_string())
        );

        assert!(matches!(
            run(&mut store, Command::Read { id: 2 }),
            Ok(Status::NotFound(_))
        ));
        assert!(matches!(
            run(&mut store, Command::Delete { id: 1 }),
            Ok(Status::Done)
        ));
        assert!(matches!(
            run(&mut store, Command::Delete { id: 1 }),
            Ok(Status::NotFound(_))
        ));
    }
}

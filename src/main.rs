use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use vpay::cli::{self, Cli, Commands};
use vpay::config::VpayConfig;
use vpay::error::LedgerError;
use vpay::ledger::Ledger;
use vpay::storage::SledStorage;

fn filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

fn main() {
    let args = Cli::parse();

    // The log level lives in the config, so loading it runs under a
    // temporary subscriber.
    let bootstrap = tracing_subscriber::fmt()
        .with_env_filter(filter("info"))
        .with_writer(std::io::stderr)
        .finish();
    let loaded = tracing::subscriber::with_default(bootstrap, || VpayConfig::load_or_create(&args.config));
    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter(&config.log_level))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(args.command, &config) {
        error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(command: Commands, config: &VpayConfig) -> Result<(), LedgerError> {
    let storage = SledStorage::open(&config.storage.db_path)?;
    let ledger = Ledger::with_seed(storage, config.seed.clone());

    // Default accounts exist from the very first start
    let seeded = ledger.seed()?;

    match command {
        Commands::Seed => {
            if seeded {
                println!("Default accounts created.");
            } else {
                println!("Accounts already present, nothing to do.");
            }
            Ok(())
        }
        Commands::Login { username, password, role } => {
            cli::session::handle_login(&ledger, &username, &password, &role)
        }
        Commands::Logout => cli::session::handle_logout(&ledger),
        Commands::Whoami => cli::session::handle_whoami(&ledger),
        Commands::Route { path } => cli::session::handle_route(&ledger, &path),
        Commands::SetPin { pin, confirm } => cli::session::handle_set_pin(&ledger, pin, confirm),
        Commands::Pay { vendor, amount, pin } => {
            cli::wallet::handle_pay(&ledger, &vendor, &amount, &pin)
        }
        Commands::History => cli::wallet::handle_history(&ledger),
        Commands::Vendors => {
            cli::wallet::handle_vendors(&config.vendors);
            Ok(())
        }
        Commands::Credit { student, amount } => {
            cli::ops::handle_credit_command(&ledger, &student, &amount)
        }
        Commands::Students => cli::ops::handle_students_command(&ledger),
        Commands::Feed => cli::ops::handle_feed_command(&ledger),
    }
}

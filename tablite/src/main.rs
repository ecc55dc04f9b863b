///
/// tablite CLI.
///
/// Opens (or creates) a tablite database file. Exits non-zero only if
/// the storage engine refuses to open the file.
///

use clap::Parser;

use tablite::Database;

#[derive(Parser)]
#[command(name = "tablite")]
#[command(author, version, about = "Typed table mapping over embedded SQLite", long_about = None)]
struct Cli {
    /// Database file to open
    #[arg(long, default_value = "test.sqlite")]
    name: String,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let cli = Cli::parse();

    match Database::open(&cli.name) {
        Ok(_) => {
            println!("opened database {}", cli.name);
        }
        Err(e) => {
            eprintln!("Error opening {}: {}", cli.name, e);
            std::process::exit(1);
        }
    }
}

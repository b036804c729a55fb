use reelscout::app::ledger::SqliteLedger;
use reelscout::config;
use std::env;
use std::path::PathBuf;

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.iter().any(|a| a == "-h" || a == "--help") {
        eprintln!("Usage: cargo run --bin ledger_explorer [limit] [--db path]");
        return;
    }

    let limit: usize = match args.get(1).filter(|a| !a.starts_with("--")) {
        Some(raw) => raw.parse().unwrap_or(10),
        None => 10,
    };

    let cfg = config::config();
    let db_path: PathBuf = args
        .iter()
        .position(|a| a == "--db")
        .and_then(|i| args.get(i + 1))
        .map(PathBuf::from)
        .unwrap_or_else(|| cfg.ledger_db_path.clone());

    if !db_path.exists() {
        eprintln!("No ledger at {}", db_path.display());
        std::process::exit(1);
    }
    let ledger = SqliteLedger::open_read_only(db_path, cfg.image_base_url.clone());
    println!("Opening popularity ledger: {}", ledger.path().display());

    match ledger.try_list_top_records(limit) {
        Ok(records) if records.is_empty() => println!("(no searches recorded yet)"),
        Ok(records) => {
            println!("{:>4}  {:>6}  {:<28}  {:<32}  poster", "rank", "count", "search_term", "title");
            for (i, r) in records.iter().enumerate() {
                println!(
                    "{:>4}  {:>6}  {:<28}  {:<32}  {}",
                    i + 1,
                    r.count,
                    r.search_term,
                    r.title,
                    r.poster_url.as_deref().unwrap_or("-")
                );
            }
        }
        Err(err) => {
            eprintln!("Failed to read ledger: {err}");
            std::process::exit(1);
        }
    }
}

use clap::Parser;
use colored::Colorize;
use env_logger::Env;
use log::error;
use std::path::PathBuf;

mod cli;
mod libtango;

use crate::libtango::deck::DeckStore;
use crate::libtango::Error;

#[derive(Parser, Debug)]
#[command(name = "単語カード (Tangokādo)")]
#[command(version, about, long_about = None)]
struct Args {
    #[arg(short, long, value_name = "FILE", default_value = "cards.json")]
    file: Option<PathBuf>,
    #[arg(short, long, default_value = "error")]
    log_level: String,
}

fn main() -> Result<(), Error> {
    let args = Args::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or(args.log_level)).init();

    let deck_path = args.file.unwrap_or(PathBuf::from("cards.json"));
    let mut store = match DeckStore::open(&deck_path) {
        Ok(store) => store,
        Err(err @ Error::CorruptData(_)) => {
            error!("[Deck] {}", err);
            println!(
                "{}",
                format!("{:?} is corrupt, starting with an empty deck.", deck_path).red()
            );
            DeckStore::empty(&deck_path)
        }
        Err(err) => {
            error!("[Deck] {}", err);
            return Err(err);
        }
    };

    cli::run_loop(&mut store);
    Ok(())
}

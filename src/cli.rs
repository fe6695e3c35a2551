use colored::Colorize;
#[cfg(feature = "kittygfx")]
use kitty_image::{Action, Command, WrappedCommand};
use log::{debug, error};
use text_io::read;

use crate::libtango::card::{Card, Face};
use crate::libtango::deck::DeckStore;
use crate::libtango::nyuushutsu::{export_deck, import_deck};
use crate::libtango::render::fit_preview;
use crate::libtango::Error;

// same card box as the original viewer
const CARD_WIDTH: u32 = 400;
const CARD_HEIGHT: u32 = 300;

pub fn run_loop(store: &mut DeckStore) {
    loop {
        show_current(store);
        print!("{} ", "Command (n/p/f/j <n>, a/m/d, e/i <zip>, q):".cyan());
        let line: String = read!("{}\n");
        let mut parts = line.split_whitespace();
        match parts.next() {
            Some("n") => {
                if !recover(store.next()).unwrap_or(true) {
                    println!("{}", "Already at the last card.".yellow());
                }
            }
            Some("p") => {
                if !recover(store.prev()).unwrap_or(true) {
                    println!("{}", "Already at the first card.".yellow());
                }
            }
            Some("f") => {
                recover(store.flip());
            }
            Some("j") => match parts.next().and_then(|raw| raw.parse::<usize>().ok()) {
                Some(position) => {
                    recover(store.jump_to(position));
                }
                None => println!("{}", "Please give a card number, e.g. `j 3`.".red()),
            },
            Some("a") => add_card(store),
            Some("m") => modify_card(store),
            Some("d") => delete_card(store),
            Some("e") => export(store),
            Some("i") => import(store, parts.next()),
            Some("q") => {
                println!("{}", "またね！".cyan());
                return;
            }
            _ => {}
        }
    }
}

fn show_current(store: &DeckStore) {
    let Some(card) = store.current_card() else {
        println!("{}", "No cards yet. `a` adds one.".yellow());
        return;
    };
    println!(
        "{}",
        format!("{}/{}", store.cursor() + 1, store.len()).cyan()
    );
    match store.face() {
        Face::Front => show_front(card),
        Face::Back => println!("{}", card.back_text().black().bold().on_white()),
    }
}

/// A card whose image has gone missing or stopped decoding is reported and
/// kept; deleting it stays the user's call.
fn show_front(card: &Card) {
    let preview = match fit_preview(&card.image, CARD_WIDTH, CARD_HEIGHT) {
        Ok(preview) => preview,
        Err(err) => {
            report(&err);
            return;
        }
    };
    debug!("fitted to {}x{}", preview.width(), preview.height());

    #[cfg(feature = "kittygfx")]
    {
        let action = Action::TransmitAndDisplay(
            kitty_image::ActionTransmission {
                format: kitty_image::Format::Png,
                medium: kitty_image::Medium::File,
                width: preview.width(),
                height: preview.height(),
                ..Default::default()
            },
            kitty_image::ActionPut::default(),
        );
        let command = WrappedCommand::new(Command::with_payload_from_path(action, &card.image));
        println!("{command}");
        print!("{}", "\n".repeat(preview.height() as usize / 20));
    }
    #[cfg(not(feature = "kittygfx"))]
    println!(
        "{}",
        format!(
            "[{} @ {}x{}]",
            card.image.display(),
            preview.width(),
            preview.height()
        )
        .bold()
    );
}

fn add_card(store: &mut DeckStore) {
    let (image, word, meaning) = prompt_fields(None);
    if let Some(card) = recover(store.add_card(&image, &word, &meaning)) {
        println!("{}", format!("Added {:?}.", card.word).green());
    }
}

fn modify_card(store: &mut DeckStore) {
    let Some(current) = store.current_card().cloned() else {
        println!("{}", "No cards to modify.".yellow());
        return;
    };
    let (image, word, meaning) = prompt_fields(Some(&current));
    let cursor = store.cursor();
    if recover(store.modify_card(cursor, &image, &word, &meaning)).is_some() {
        println!("{}", "Card updated.".green());
    }
}

fn prompt_fields(current: Option<&Card>) -> (String, String, String) {
    if let Some(card) = current {
        println!(
            "{}",
            format!(
                "Editing {:?} / {:?} ({}). Empty input keeps the old value.",
                card.word,
                card.meaning,
                card.image.display()
            )
            .cyan()
        );
    }
    print!("{} ", "Image path:".cyan());
    let image: String = read!("{}\n");
    print!("{} ", "Word:".cyan());
    let word: String = read!("{}\n");
    print!("{} ", "Meaning:".cyan());
    let meaning: String = read!("{}\n");

    match current {
        Some(card) => (
            if image.is_empty() {
                card.image.display().to_string()
            } else {
                image
            },
            if word.is_empty() { card.word.clone() } else { word },
            if meaning.is_empty() {
                card.meaning.clone()
            } else {
                meaning
            },
        ),
        None => (image, word, meaning),
    }
}

fn delete_card(store: &mut DeckStore) {
    if store.is_empty() {
        println!("{}", "No cards to delete.".yellow());
        return;
    }
    print!("{} ", "Delete the current card? (y/n):".cyan());
    let answer: String = read!("{}\n");
    if answer == "y" {
        let cursor = store.cursor();
        if recover(store.delete_card(cursor)).is_some() {
            println!("{}", "Card deleted.".green());
        }
    }
}

fn export(store: &DeckStore) {
    if let Some(archive) = recover(export_deck(store.cards(), store.data_dir())) {
        println!("{}", format!("Exported to {:?}.", archive).green());
    }
}

fn import(store: &mut DeckStore, arg: Option<&str>) {
    let archive: String = match arg {
        Some(path) => path.to_string(),
        None => {
            print!("{} ", "Archive path:".cyan());
            read!("{}\n")
        }
    };
    if archive.is_empty() {
        return;
    }
    let Some(imported) = recover(import_deck(archive.as_ref(), store.data_dir())) else {
        return;
    };
    if !imported.missing_images.is_empty() {
        println!(
            "{}",
            format!(
                "Images not found in the archive: {}",
                imported.missing_images.join(", ")
            )
            .yellow()
        );
    }
    if let Some(count) = recover(store.merge_imported(imported.cards)) {
        println!("{}", format!("Imported {} cards.", count).green());
    }
}

/// Every data error is recovered here: reported, then the session keeps
/// going.
fn recover<T>(result: Result<T, Error>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            report(&err);
            None
        }
    }
}

fn report(err: &Error) {
    error!("{}", err);
    println!("{}", format!("{}", err).red());
}

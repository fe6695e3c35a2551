use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::libtango::card::{Card, Face};
use crate::libtango::Error;

/// Owns the ordered card list, the cursor, the face state and the backing
/// `cards.json` file. Every mutating operation writes the whole file back.
#[derive(Debug)]
pub struct DeckStore {
    path: PathBuf,
    cards: Vec<Card>,
    cursor: usize,
    face: Face,
}

impl DeckStore {
    /// Reads the persisted card list. A missing file yields an empty deck;
    /// unparsable JSON surfaces `CorruptData` and the caller decides how to
    /// recover (typically with [`DeckStore::empty`]).
    pub fn open(path: impl AsRef<Path>) -> Result<DeckStore, Error> {
        let path = path.as_ref().to_path_buf();
        let cards = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw)?,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!("[Deck] No deck file at {:?}, starting empty", path);
                Vec::new()
            }
            Err(err) => return Err(err.into()),
        };
        debug!("[Deck] Loaded {} cards from {:?}", cards.len(), path);
        Ok(DeckStore {
            path,
            cards,
            cursor: 0,
            face: Face::Front,
        })
    }

    pub fn empty(path: impl AsRef<Path>) -> DeckStore {
        DeckStore {
            path: path.as_ref().to_path_buf(),
            cards: Vec::new(),
            cursor: 0,
            face: Face::Front,
        }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn face(&self) -> Face {
        self.face
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn current_card(&self) -> Option<&Card> {
        self.cards.get(self.cursor)
    }

    /// Directory the deck file lives in; export archives and import staging
    /// directories are rooted here.
    pub fn data_dir(&self) -> &Path {
        self.path.parent().unwrap_or(Path::new(""))
    }

    fn autosave(&self) -> Result<(), Error> {
        let raw = serde_json::to_string(&self.cards)?;
        fs::write(&self.path, raw)?;
        debug!("[Deck] Saved {} cards to {:?}", self.cards.len(), self.path);
        Ok(())
    }

    /// Validates and appends a card, moves the cursor onto it and shows the
    /// front. Leaves the deck untouched when validation fails.
    pub fn add_card(
        &mut self,
        image: impl AsRef<Path>,
        word: &str,
        meaning: &str,
    ) -> Result<Card, Error> {
        let card = Card::new(image, word, meaning)?;
        debug!("[Deck] Adding card {:?}", card.word);
        self.cards.push(card.clone());
        self.cursor = self.cards.len() - 1;
        self.face = Face::Front;
        self.autosave()?;
        Ok(card)
    }

    /// Same validation as [`DeckStore::add_card`], replacing in place.
    /// Cursor and face stay where they are.
    pub fn modify_card(
        &mut self,
        index: usize,
        image: impl AsRef<Path>,
        word: &str,
        meaning: &str,
    ) -> Result<Card, Error> {
        if index >= self.cards.len() {
            return Err(Error::OutOfRange {
                requested: index,
                len: self.cards.len(),
            });
        }
        let card = Card::new(image, word, meaning)?;
        debug!("[Deck] Replacing card at {}", index);
        self.cards[index] = card.clone();
        self.autosave()?;
        Ok(card)
    }

    pub fn delete_card(&mut self, index: usize) -> Result<(), Error> {
        if self.cards.is_empty() {
            return Err(Error::EmptyDeck);
        }
        if index >= self.cards.len() {
            return Err(Error::OutOfRange {
                requested: index,
                len: self.cards.len(),
            });
        }
        let removed = self.cards.remove(index);
        debug!("[Deck] Deleted card {:?} at {}", removed.word, index);
        self.cursor = if self.cards.is_empty() {
            0
        } else {
            index.min(self.cards.len() - 1)
        };
        self.autosave()
    }

    /// Moves forward one card. Returns whether the cursor moved; the last
    /// card (and the empty deck) is a complete no-op, no save either.
    pub fn next(&mut self) -> Result<bool, Error> {
        if self.cursor + 1 >= self.cards.len() {
            return Ok(false);
        }
        self.cursor += 1;
        self.face = Face::Front;
        self.autosave()?;
        Ok(true)
    }

    pub fn prev(&mut self) -> Result<bool, Error> {
        if self.cursor == 0 {
            return Ok(false);
        }
        self.cursor -= 1;
        self.face = Face::Front;
        self.autosave()?;
        Ok(true)
    }

    /// Jumps to a 1-based position. Out-of-range leaves cursor and face
    /// untouched.
    pub fn jump_to(&mut self, one_based: usize) -> Result<(), Error> {
        if one_based == 0 || one_based > self.cards.len() {
            return Err(Error::OutOfRange {
                requested: one_based,
                len: self.cards.len(),
            });
        }
        self.cursor = one_based - 1;
        self.face = Face::Front;
        self.autosave()
    }

    /// Toggles the face. The deck file is rewritten for uniformity even
    /// though face itself is never part of the persisted format.
    pub fn flip(&mut self) -> Result<Face, Error> {
        self.face = self.face.flipped();
        self.autosave()?;
        Ok(self.face)
    }

    /// Appends imported cards and rewinds to the first card, front up.
    pub fn merge_imported(&mut self, cards: Vec<Card>) -> Result<usize, Error> {
        let count = cards.len();
        if count == 0 {
            warn!("[Deck] Import contained no cards");
        }
        self.cards.extend(cards);
        self.cursor = 0;
        self.face = Face::Front;
        self.autosave()?;
        Ok(count)
    }
}

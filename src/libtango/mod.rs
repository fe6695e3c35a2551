use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub mod card;
pub mod deck;
pub mod nyuushutsu;
pub mod render;

#[derive(Debug, Error)]
pub enum Error {
    #[error("missing required field `{0}`")]
    InvalidInput(&'static str),
    #[error("invalid image file {path:?}")]
    InvalidImage {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("index {requested} is out of range (deck has {len} cards)")]
    OutOfRange { requested: usize, len: usize },
    #[error("card data is corrupt")]
    CorruptData(#[from] serde_json::Error),
    #[error("archive has no cards.json")]
    MissingManifest,
    #[error("cannot parse cards.json in archive")]
    CorruptManifest(#[source] serde_json::Error),
    #[error("the deck is empty")]
    EmptyDeck,
    #[error("image {0:?} no longer exists")]
    ImageLoad(PathBuf),
    #[error("cannot decode image {path:?}")]
    ImageDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("cannot access file")]
    Io(#[from] io::Error),
    #[error("cannot read archive")]
    Zip(#[from] zip::result::ZipError),
}

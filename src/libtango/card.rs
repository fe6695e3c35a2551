use std::path::{self, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::libtango::Error;

/// One flashcard: an image on the front, word and meaning on the back.
/// Serializes to the `cards.json` schema `{image, word, meaning}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub image: PathBuf,
    pub word: String,
    pub meaning: String,
}

/// Which side of the current card is showing. Session-only, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Face {
    #[default]
    Front,
    Back,
}

impl Face {
    pub fn flipped(self) -> Face {
        match self {
            Face::Front => Face::Back,
            Face::Back => Face::Front,
        }
    }
}

impl Card {
    /// Validates all three fields eagerly: word and meaning must be
    /// non-empty, and `image` must decode as an image header. The stored
    /// path is resolved to absolute.
    pub fn new(image: impl AsRef<Path>, word: &str, meaning: &str) -> Result<Card, Error> {
        let image = image.as_ref();
        if image.as_os_str().is_empty() {
            return Err(Error::InvalidInput("image"));
        }
        if word.is_empty() {
            return Err(Error::InvalidInput("word"));
        }
        if meaning.is_empty() {
            return Err(Error::InvalidInput("meaning"));
        }

        image::image_dimensions(image).map_err(|err| Error::InvalidImage {
            path: image.to_path_buf(),
            source: err,
        })?;

        Ok(Card {
            image: path::absolute(image)?,
            word: word.to_string(),
            meaning: meaning.to_string(),
        })
    }

    /// Text shown on the back face.
    pub fn back_text(&self) -> String {
        format!("{}\n\n{}", self.word, self.meaning)
    }

    /// Basename the image is packed under in an export archive.
    pub fn image_basename(&self) -> String {
        self.image
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_png(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        image::RgbaImage::new(1, 1).save(&path).unwrap();
        path
    }

    #[test]
    fn valid_card_resolves_absolute_path() {
        let dir = tempdir().unwrap();
        let png = write_png(dir.path(), "neko.png");

        let card = Card::new(&png, "猫", "cat").unwrap();
        assert!(card.image.is_absolute());
        assert_eq!(card.word, "猫");
        assert_eq!(card.meaning, "cat");
        assert_eq!(card.image_basename(), "neko.png");
    }

    #[test]
    fn empty_fields_are_rejected() {
        let dir = tempdir().unwrap();
        let png = write_png(dir.path(), "a.png");

        assert!(matches!(
            Card::new("", "word", "meaning"),
            Err(Error::InvalidInput("image"))
        ));
        assert!(matches!(
            Card::new(&png, "", "meaning"),
            Err(Error::InvalidInput("word"))
        ));
        assert!(matches!(
            Card::new(&png, "word", ""),
            Err(Error::InvalidInput("meaning"))
        ));
    }

    #[test]
    fn non_image_file_is_rejected() {
        let dir = tempdir().unwrap();
        let bogus = dir.path().join("notes.txt");
        std::fs::write(&bogus, "not an image").unwrap();

        assert!(matches!(
            Card::new(&bogus, "word", "meaning"),
            Err(Error::InvalidImage { .. })
        ));
        assert!(matches!(
            Card::new(dir.path().join("gone.png"), "word", "meaning"),
            Err(Error::InvalidImage { .. })
        ));
    }

    #[test]
    fn back_text_joins_word_and_meaning() {
        let dir = tempdir().unwrap();
        let png = write_png(dir.path(), "a.png");
        let card = Card::new(&png, "猫", "cat").unwrap();
        assert_eq!(card.back_text(), "猫\n\ncat");
    }

    #[test]
    fn face_flips_and_defaults_to_front() {
        assert_eq!(Face::default(), Face::Front);
        assert_eq!(Face::Front.flipped(), Face::Back);
        assert_eq!(Face::Back.flipped(), Face::Front);
    }
}

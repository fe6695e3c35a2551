use std::collections::HashSet;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use log::{debug, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::libtango::card::Card;
use crate::libtango::Error;

/// Fixed manifest name inside every archive.
pub const MANIFEST_NAME: &str = "cards.json";

/// What came out of an archive: the parsed cards (image paths rewritten to
/// the extraction directory where resolvable) and the basenames that were
/// referenced but not packed.
#[derive(Debug)]
pub struct ImportReport {
    pub cards: Vec<Card>,
    pub missing_images: Vec<String>,
    pub extracted_dir: PathBuf,
}

/// Packs the deck into `flashcards_<YYYYMMDD_HHMMSS>.zip` under `out_dir`:
/// a flat `cards.json` plus one copy of each referenced image under its
/// basename. When two cards reference distinct files with the same basename
/// only the first is packed; images missing on disk are skipped with a
/// warning. Returns the archive path.
pub fn export_deck(cards: &[Card], out_dir: &Path) -> Result<PathBuf, Error> {
    if cards.is_empty() {
        return Err(Error::EmptyDeck);
    }

    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    let archive_path = out_dir.join(format!("flashcards_{}.zip", stamp));
    debug!("[Archive] Exporting {} cards to {:?}", cards.len(), archive_path);

    let file = File::create(&archive_path)?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    zip.start_file(MANIFEST_NAME, options)?;
    zip.write_all(serde_json::to_string(cards)?.as_bytes())?;

    let mut packed: HashSet<OsString> = HashSet::new();
    for card in cards {
        let Some(basename) = card.image.file_name() else {
            warn!("[Archive] Card {:?} has no image basename, skipping", card.word);
            continue;
        };
        if !card.image.exists() {
            warn!("[Archive] Image {:?} is gone, skipping", card.image);
            continue;
        }
        if !packed.insert(basename.to_os_string()) {
            // basename collision: first copy wins
            continue;
        }
        zip.start_file(basename.to_string_lossy().into_owned(), options)?;
        let mut content = Vec::new();
        File::open(&card.image)?.read_to_end(&mut content)?;
        zip.write_all(&content)?;
    }

    zip.finish()?;
    Ok(archive_path)
}

/// Unpacks `archive_path` flat into a fresh `imported_<YYYYMMDD_HHMMSS>`
/// directory under `dest_root` and parses the manifest. The extraction
/// directory is removed on any failure; on success it stays, since the
/// returned cards' image paths point into it.
pub fn import_deck(archive_path: &Path, dest_root: &Path) -> Result<ImportReport, Error> {
    let file = File::open(archive_path)?;
    let mut zip = ZipArchive::new(file)?;

    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    let staging = dest_root.join(format!("imported_{}", stamp));
    fs::create_dir_all(&staging)?;
    debug!("[Archive] Extracting {:?} into {:?}", archive_path, staging);

    let report = unpack(&mut zip, &staging);
    if report.is_err() {
        let _ = fs::remove_dir_all(&staging);
    }
    report
}

fn unpack(zip: &mut ZipArchive<File>, staging: &Path) -> Result<ImportReport, Error> {
    for i in 0..zip.len() {
        let mut entry = zip.by_index(i)?;
        if entry.is_dir() {
            continue;
        }
        // archives are flat; nested entries land under their basename and
        // hostile paths are dropped
        let Some(basename) = entry
            .enclosed_name()
            .and_then(|name| name.file_name().map(OsString::from))
        else {
            warn!("[Archive] Skipping unsafe entry {:?}", entry.name());
            continue;
        };
        let mut out = File::create(staging.join(&basename))?;
        io::copy(&mut entry, &mut out)?;
    }

    let manifest = staging.join(MANIFEST_NAME);
    if !manifest.exists() {
        return Err(Error::MissingManifest);
    }
    let raw = fs::read_to_string(&manifest)?;
    let mut cards: Vec<Card> = serde_json::from_str(&raw).map_err(Error::CorruptManifest)?;

    let mut missing_images = Vec::new();
    for card in &mut cards {
        let basename = card.image_basename();
        let local = staging.join(&basename);
        if local.is_file() {
            card.image = local;
        } else {
            warn!("[Archive] Image {:?} not in archive", basename);
            missing_images.push(basename);
        }
    }

    debug!(
        "[Archive] Imported {} cards ({} images missing)",
        cards.len(),
        missing_images.len()
    );
    Ok(ImportReport {
        cards,
        missing_images,
        extracted_dir: staging.to_path_buf(),
    })
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

    fn sample_cards(dir: &Path) -> Vec<Card> {
        let neko = write_png(dir, "neko.png");
        let inu = write_png(dir, "inu.png");
        vec![
            Card::new(&neko, "猫", "cat").unwrap(),
            Card::new(&inu, "犬", "dog").unwrap(),
        ]
    }

    #[test]
    fn export_of_empty_deck_is_refused() {
        let dir = tempdir().unwrap();
        assert!(matches!(export_deck(&[], dir.path()), Err(Error::EmptyDeck)));
    }

    #[test]
    fn export_then_import_reproduces_the_deck() {
        let src = tempdir().unwrap();
        let dest = tempdir().unwrap();
        let cards = sample_cards(src.path());

        let archive = export_deck(&cards, src.path()).unwrap();
        let name = archive.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("flashcards_") && name.ends_with(".zip"));

        let report = import_deck(&archive, dest.path()).unwrap();
        assert_eq!(report.cards.len(), 2);
        assert!(report.missing_images.is_empty());
        for (imported, original) in report.cards.iter().zip(&cards) {
            assert_eq!(imported.word, original.word);
            assert_eq!(imported.meaning, original.meaning);
            // image resolved by basename at the new location
            assert_eq!(imported.image_basename(), original.image_basename());
            assert!(imported.image.starts_with(&report.extracted_dir));
            assert!(imported.image.is_file());
        }
        assert!(report.extracted_dir.is_dir());
    }

    #[test]
    fn basename_collision_packs_first_copy_only() {
        let dir = tempdir().unwrap();
        let sub_a = dir.path().join("a");
        let sub_b = dir.path().join("b");
        fs::create_dir_all(&sub_a).unwrap();
        fs::create_dir_all(&sub_b).unwrap();
        let first = write_png(&sub_a, "same.png");
        let second = write_png(&sub_b, "same.png");
        let cards = vec![
            Card::new(&first, "一", "one").unwrap(),
            Card::new(&second, "二", "two").unwrap(),
        ];

        let archive = export_deck(&cards, dir.path()).unwrap();
        let zip = ZipArchive::new(File::open(&archive).unwrap()).unwrap();
        let names: Vec<_> = zip.file_names().collect();
        assert_eq!(names.iter().filter(|n| **n == "same.png").count(), 1);
    }

    #[test]
    fn export_skips_images_gone_from_disk() {
        let dir = tempdir().unwrap();
        let mut cards = sample_cards(dir.path());
        fs::remove_file(&cards[1].image).unwrap();

        let archive = export_deck(&cards, dir.path()).unwrap();
        let dest = tempdir().unwrap();
        let report = import_deck(&archive, dest.path()).unwrap();
        assert_eq!(report.cards.len(), 2);
        assert_eq!(report.missing_images, vec!["inu.png".to_string()]);
        // the unresolved card keeps its original (absolute) path
        assert_eq!(report.cards[1].image, cards.remove(1).image);
    }

    #[test]
    fn archive_without_manifest_is_rejected_and_cleaned_up() {
        let dir = tempdir().unwrap();
        let archive_path = dir.path().join("bogus.zip");
        let mut zip = ZipWriter::new(File::create(&archive_path).unwrap());
        zip.start_file("stray.png", SimpleFileOptions::default()).unwrap();
        zip.write_all(b"png bytes").unwrap();
        zip.finish().unwrap();

        let dest = tempdir().unwrap();
        assert!(matches!(
            import_deck(&archive_path, dest.path()),
            Err(Error::MissingManifest)
        ));
        assert_eq!(fs::read_dir(dest.path()).unwrap().count(), 0);
    }

    #[test]
    fn unparsable_manifest_is_rejected_and_cleaned_up() {
        let dir = tempdir().unwrap();
        let archive_path = dir.path().join("bogus.zip");
        let mut zip = ZipWriter::new(File::create(&archive_path).unwrap());
        zip.start_file(MANIFEST_NAME, SimpleFileOptions::default()).unwrap();
        zip.write_all(b"{ not json").unwrap();
        zip.finish().unwrap();

        let dest = tempdir().unwrap();
        assert!(matches!(
            import_deck(&archive_path, dest.path()),
            Err(Error::CorruptManifest(_))
        ));
        assert_eq!(fs::read_dir(dest.path()).unwrap().count(), 0);
    }
}

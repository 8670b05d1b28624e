//! File-backed persistence for the item table

use std::{
    ffi::OsString,
    fs::{self, File},
    io::{BufReader, BufWriter},
    path::{Path, PathBuf},
};

use tracing::{debug, info, warn};

use crate::{
    errors::{Error, ParseWarning},
    io,
    types::{Item, ItemCollection},
};

/// The CSV file holding every item.
///
/// # Limitations
/// The whole table is read and rewritten on every operation. There is no locking,
/// so two processes saving at once will overwrite each other; the last save wins.
#[derive(Debug, Clone)]
pub struct RecordStore {
    /// Location of the CSV file
    path: PathBuf,
}

impl RecordStore {
    /// Creates a store for the file at `path`. Nothing is touched on disk.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the location of the backing file
    #[must_use]
    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates an empty table (header only) if no file exists yet.
    ///
    /// Never overwrites an existing file. Returns whether a file was created.
    pub fn initialize(&self) -> Result<bool, Error> {
        let exists = self
            .path
            .try_exists()
            .map_err(|err| Error::storage(&self.path, err))?;
        if exists {
            debug!(path = %self.path.display(), "Item table already exists");
            return Ok(false);
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| Error::storage(parent, err))?;
        }
        self.save(&ItemCollection::new())?;
        info!(path = %self.path.display(), "Created empty item table");
        Ok(true)
    }

    /// Reads every item. Unparseable fields are logged and degraded; see
    /// [`RecordStore::load_with_warnings`].
    pub fn load(&self) -> Result<ItemCollection, Error> {
        let (items, warnings) = self.load_with_warnings()?;
        for warning in &warnings {
            warn!(path = %self.path.display(), "{warning}");
        }
        Ok(items)
    }

    /// Reads every item, returning the field-level problems found along the way.
    pub fn load_with_warnings(&self) -> Result<(ItemCollection, Vec<ParseWarning>), Error> {
        let file = File::open(&self.path).map_err(|err| Error::storage(&self.path, err))?;
        let mut reader = BufReader::new(file);
        let (items, warnings) = io::read_items_from_csv(&mut reader)?;
        debug!(
            path = %self.path.display(),
            items = items.len(),
            warnings = warnings.len(),
            "Loaded item table"
        );
        Ok((items, warnings))
    }

    /// Rewrites the whole table.
    ///
    /// The items go to a temporary file next to the table, which then replaces it,
    /// so a reader sees either the old table or the new one.
    pub fn save(&self, items: &ItemCollection) -> Result<(), Error> {
        let temp_path = self.temp_path();
        let file = File::create(&temp_path).map_err(|err| Error::storage(&temp_path, err))?;
        let mut writer = BufWriter::new(file);
        if let Err(err) = io::write_items_to_csv(&mut writer, items) {
            discard(&temp_path);
            return Err(err);
        }
        let synced = writer
            .into_inner()
            .map_err(|err| err.into_error())
            .and_then(|file| file.sync_all());
        if let Err(err) = synced {
            discard(&temp_path);
            return Err(Error::storage(&temp_path, err));
        }
        fs::rename(&temp_path, &self.path).map_err(|err| {
            discard(&temp_path);
            Error::storage(&self.path, err)
        })?;
        debug!(path = %self.path.display(), items = items.len(), "Saved item table");
        Ok(())
    }

    /// Appends `item` to the stored table and returns the table as saved.
    pub fn add(&self, item: Item) -> Result<ItemCollection, Error> {
        let items = self.load()?.append(item);
        self.save(&items)?;
        info!(path = %self.path.display(), items = items.len(), "Added item");
        Ok(items)
    }

    /// `inventory.csv` becomes `inventory.csv.tmp`
    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

fn discard(temp_path: &Path) {
    if let Err(err) = fs::remove_file(temp_path) {
        debug!(path = %temp_path.display(), %err, "Could not remove temporary file");
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    use crate::types::COLUMNS;

    use super::*;

    fn setup_store() -> (RecordStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = RecordStore::new(temp_dir.path().join("inventory.csv"));
        (store, temp_dir)
    }

    fn sold_item() -> Item {
        Item::new(
            Some("shoes".to_string()),
            "trainers",
            dec!(10),
            dec!(18),
            NaiveDate::from_ymd_opt(2024, 3, 1),
        )
        .with_costs(dec!(1), dec!(0))
        .with_sale(dec!(20), NaiveDate::from_ymd_opt(2024, 3, 5))
    }

    #[test]
    fn test_initialize_creates_header_only_table() {
        let (store, _temp_dir) = setup_store();
        assert!(store.initialize().unwrap());
        let contents = fs::read_to_string(store.path()).unwrap();
        assert_eq!(contents.trim_end(), COLUMNS.join(","));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_initialize_never_overwrites() {
        let (store, _temp_dir) = setup_store();
        store.initialize().unwrap();
        store.add(sold_item()).unwrap();
        assert!(!store.initialize().unwrap());
        assert_eq!(store.load().unwrap().len(), 1);
    }

    #[test]
    fn test_initialize_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let store = RecordStore::new(temp_dir.path().join("data").join("inventory.csv"));
        assert!(store.initialize().unwrap());
        assert!(store.path().exists());
    }

    #[test]
    fn test_load_missing_file_is_storage_error() {
        let (store, _temp_dir) = setup_store();
        match store.load() {
            Err(Error::Storage { path, .. }) => assert_eq!(path, store.path()),
            other => panic!("Expected storage error, got {other:?}"),
        }
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let (store, _temp_dir) = setup_store();
        let items = ItemCollection::new()
            .append(sold_item())
            .append(Item::new(None, "parka, green", dec!(5), dec!(12), None))
            .append(sold_item());
        store.save(&items).unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded, items);
        store.save(&loaded).unwrap();
        assert_eq!(store.load().unwrap(), loaded);
    }

    #[test]
    fn test_save_leaves_no_temporary_file() {
        let (store, temp_dir) = setup_store();
        store.save(&ItemCollection::new().append(sold_item())).unwrap();
        let names: Vec<_> = fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![OsString::from("inventory.csv")]);
    }

    #[test]
    fn test_save_into_missing_directory_fails() {
        let temp_dir = TempDir::new().unwrap();
        let store = RecordStore::new(temp_dir.path().join("missing").join("inventory.csv"));
        assert!(matches!(
            store.save(&ItemCollection::new()),
            Err(Error::Storage { .. })
        ));
    }

    #[test]
    fn test_add_appends_at_end() {
        let (store, _temp_dir) = setup_store();
        store.initialize().unwrap();
        store.add(sold_item()).unwrap();
        let parka = Item::new(Some("coats".to_string()), "parka", dec!(5), dec!(12), None);
        let items = store.add(parka.clone()).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items.last(), Some(&parka));
        assert_eq!(store.load().unwrap(), items);
    }

    #[test]
    fn test_added_item_reloads_unchanged() {
        let (store, _temp_dir) = setup_store();
        store.initialize().unwrap();
        let padded = Item::new(Some(" coats ".to_string()), " parka  ", dec!(5), dec!(12), None);
        let items = store.add(padded).unwrap();
        assert_eq!(store.load().unwrap(), items);
        assert_eq!(items.last().unwrap().description, "parka");
    }

    #[test]
    fn test_load_reports_warnings() {
        let (store, _temp_dir) = setup_store();
        fs::write(
            store.path(),
            format!("{}\nhats,cap,1,2,,soon,,,,\n", COLUMNS.join(",")),
        )
        .unwrap();
        let (items, warnings) = store.load_with_warnings().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].column, "listed_date");
        assert_eq!(store.load().unwrap(), items);
    }
}

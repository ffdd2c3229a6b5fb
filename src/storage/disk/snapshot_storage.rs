// Snapshot Storage
//
// Stores each keyspace as a directory under the root and each column family
// as one file inside it. A column family file holds the bincode encoding of
// its rows ordered by key. Directory and file names are the hex encoding of
// the keyspace and column family names.

use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, info, warn};
use parking_lot::Mutex;

use crate::catalog::{ColumnFamily, KeySpace, PendingDeletions, Registry, RowRecord};
use crate::storage::{Storage, StorageError, StorageResult, StorageStats};

const COLUMN_FAMILY_EXTENSION: &str = "cf";
const TEMP_EXTENSION: &str = "tmp";

/// Directory-per-keyspace, file-per-column-family storage
#[derive(Debug, Default)]
pub struct SnapshotStorage {
    write_lock: Mutex<()>,
}

impl SnapshotStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory holding the files of `key_space`
    pub fn key_space_dir(root: &Path, key_space: &str) -> PathBuf {
        root.join(hex::encode(key_space))
    }

    /// File holding the rows of `column_family`
    pub fn column_family_file(root: &Path, key_space: &str, column_family: &str) -> PathBuf {
        Self::key_space_dir(root, key_space)
            .join(hex::encode(column_family))
            .with_extension(COLUMN_FAMILY_EXTENSION)
    }

    fn load_key_space(dir: &Path, name: String) -> StorageResult<(KeySpace, usize)> {
        let space = KeySpace::new(name)?;
        let mut families = 0;

        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension() != Some(OsStr::new(COLUMN_FAMILY_EXTENSION)) {
                continue;
            }
            let Some(cf_name) = path.file_stem().and_then(decode_name) else {
                warn!("Skipping column family file with undecodable name: {}", path.display());
                continue;
            };

            let records: Vec<RowRecord> = bincode::deserialize_from(BufReader::new(File::open(&path)?))?;
            let family = ColumnFamily::from_records(records)
                .map_err(|e| StorageError::Corrupt(format!("{}: {}", path.display(), e)))?;
            debug!("Loaded column family {}.{} with {} rows", space.name(), cf_name, family.row_count());
            space.add_column_family(cf_name, family)?;
            families += 1;
        }

        space.mark_clean();
        Ok((space, families))
    }

    fn write_column_family(path: &Path, family: &ColumnFamily) -> StorageResult<()> {
        let records = family.snapshot();
        let temp = path.with_extension(TEMP_EXTENSION);
        {
            let mut writer = BufWriter::new(File::create(&temp)?);
            bincode::serialize_into(&mut writer, &records)?;
            writer.flush()?;
        }
        fs::rename(&temp, path)?;
        Ok(())
    }

    /// Remove everything dropped since the last flush. On failure the
    /// entries not yet removed go back to the registry for the next flush.
    fn delete_pending(root: &Path, registry: &Registry) -> StorageResult<usize> {
        let mut pending = registry.take_pending_deletions();
        let mut deleted = 0;
        let result = Self::remove_pending(root, &mut pending, &mut deleted);
        if result.is_err() {
            warn!("Deletion failed, keeping the remaining paths for the next flush");
            registry.requeue_pending_deletions(pending);
        }
        result.map(|_| deleted)
    }

    /// Remove pending paths in order. On error `pending` holds the failed
    /// entry and every entry after it.
    fn remove_pending(root: &Path, pending: &mut PendingDeletions, deleted: &mut usize) -> StorageResult<()> {
        let mut key_spaces = std::mem::take(&mut pending.key_spaces).into_iter();
        while let Some(key_space) = key_spaces.next() {
            match remove_ignoring_missing(fs::remove_dir_all(Self::key_space_dir(root, &key_space))) {
                Ok(removed) => *deleted += usize::from(removed),
                Err(e) => {
                    pending.key_spaces = std::iter::once(key_space).chain(key_spaces).collect();
                    return Err(e);
                }
            }
        }

        let mut families_by_space = std::mem::take(&mut pending.column_families).into_iter();
        while let Some((key_space, families)) = families_by_space.next() {
            let mut families = families.into_iter();
            while let Some(family) = families.next() {
                let path = Self::column_family_file(root, &key_space, &family);
                match remove_ignoring_missing(fs::remove_file(path)) {
                    Ok(removed) => *deleted += usize::from(removed),
                    Err(e) => {
                        pending.column_families = families_by_space.collect();
                        pending
                            .column_families
                            .insert(key_space, std::iter::once(family).chain(families).collect());
                        return Err(e);
                    }
                }
            }
        }
        Ok(())
    }

    fn flush_key_space(root: &Path, name: &str, space: &Arc<KeySpace>, stats: &mut StorageStats) -> StorageResult<()> {
        let dir = Self::key_space_dir(root, name);
        if space.take_dirty() {
            if let Err(e) = fs::create_dir_all(&dir) {
                space.mark_dirty();
                return Err(e.into());
            }
            stats.key_spaces += 1;
        }

        for (cf_name, family) in space.column_families() {
            if !family.take_dirty() {
                continue;
            }
            let path = Self::column_family_file(root, name, &cf_name);
            let result = fs::create_dir_all(&dir)
                .map_err(StorageError::from)
                .and_then(|_| Self::write_column_family(&path, &family));
            if let Err(e) = result {
                family.mark_dirty();
                return Err(e);
            }
            stats.column_families += 1;
        }
        Ok(())
    }
}

impl Storage for SnapshotStorage {
    fn read(&self, root: &Path, registry: &Registry) -> StorageResult<StorageStats> {
        let mut stats = StorageStats::default();
        if !root.exists() {
            return Ok(stats);
        }

        for entry in fs::read_dir(root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let Some(name) = decode_name(&entry.file_name()) else {
                warn!("Skipping keyspace directory with undecodable name: {}", entry.path().display());
                continue;
            };

            let (space, families) = Self::load_key_space(&entry.path(), name)?;
            registry.add_key_space(space)?;
            stats.key_spaces += 1;
            stats.column_families += families;
        }

        info!(
            "Loaded {} keyspaces with {} column families from {}",
            stats.key_spaces,
            stats.column_families,
            root.display()
        );
        Ok(stats)
    }

    fn write(&self, root: &Path, registry: &Registry) -> StorageResult<StorageStats> {
        let _guard = self.write_lock.lock();
        fs::create_dir_all(root)?;

        let mut stats = StorageStats {
            deleted: Self::delete_pending(root, registry)?,
            ..StorageStats::default()
        };

        for (name, space) in registry.key_spaces() {
            Self::flush_key_space(root, &name, &space, &mut stats)?;
        }

        if stats != StorageStats::default() {
            info!(
                "Flushed {} keyspaces and {} column families, deleted {} paths",
                stats.key_spaces, stats.column_families, stats.deleted
            );
        }
        Ok(stats)
    }
}

fn decode_name(encoded: &OsStr) -> Option<String> {
    let bytes = hex::decode(encoded.to_str()?).ok()?;
    String::from_utf8(bytes).ok().filter(|name| !name.is_empty())
}

/// `Ok(true)` when something was removed, `Ok(false)` when it was already gone
fn remove_ignoring_missing(result: io::Result<()>) -> StorageResult<bool> {
    match result {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

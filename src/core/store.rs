// File-backed record store: append for adds, full copy-rewrite for updates and deletes.
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::core::error::{Error, ErrorKind, io_error_kind};
use crate::core::format::{RecordReader, encode_record};
use crate::core::record::{Record, RecordUpdate};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Durability {
    /// Rely on the OS to flush buffers.
    #[default]
    Fast,
    /// fsync appends and rewritten files before reporting success.
    Flush,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct StoreOptions {
    pub durability: Durability,
}

impl StoreOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_durability(mut self, durability: Durability) -> Self {
        self.durability = durability;
        self
    }
}

/// Handle to one record file. Holds no open file between calls.
#[derive(Clone, Debug)]
pub struct RecordStore {
    path: PathBuf,
    options: StoreOptions,
}

/// Lazy, finite iterator over the records of one `list_all` call.
pub type Records = RecordReader<BufReader<File>>;

enum Rewrite {
    Update(RecordUpdate),
    Delete,
}

impl RecordStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self::with_options(path, StoreOptions::default())
    }

    pub fn with_options(path: impl Into<PathBuf>, options: StoreOptions) -> Self {
        Self {
            path: path.into(),
            options,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Appends `record` and returns it as stored (phone trimmed).
    pub fn add(&self, record: &Record) -> Result<Record, Error> {
        let record = record.clone().normalized();
        record.validate()?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|err| {
                // The file itself is created on demand, so NotFound means its directory is gone.
                let kind = match io_error_kind(&err) {
                    ErrorKind::StoreMissing => ErrorKind::Io,
                    kind => kind,
                };
                Error::new(kind)
                    .with_message("failed to open store for writing")
                    .with_path(&self.path)
                    .with_source(err)
            })?;
        let mut writer = BufWriter::new(file);
        encode_record(&record, &mut writer)
            .and_then(|()| writer.flush())
            .map_err(|err| Error::io(&self.path, err).with_message("failed to append record"))?;
        if self.options.durability == Durability::Flush {
            writer
                .get_ref()
                .sync_all()
                .map_err(|err| Error::io(&self.path, err).with_message("failed to sync store"))?;
        }
        debug!(id = %record.id, path = %self.path.display(), "appended record");
        Ok(record)
    }

    /// Opens the store and returns a fresh reader positioned at the first record.
    /// A missing file is a `StoreMissing` error; callers decide whether that
    /// means "no data".
    pub fn list_all(&self) -> Result<Records, Error> {
        let file = File::open(&self.path).map_err(|err| {
            let err = Error::io(&self.path, err);
            if err.kind() == ErrorKind::StoreMissing {
                err.with_message("no records stored yet")
            } else {
                err.with_message("failed to open store")
            }
        })?;
        Ok(RecordReader::new(BufReader::new(file)))
    }

    pub fn find_by_id(&self, id: &str) -> Result<Record, Error> {
        for record in self.records_or_empty()?.into_iter().flatten() {
            let record = record.map_err(|err| self.annotate(err))?;
            if record.id == id {
                return Ok(record);
            }
        }
        Err(record_not_found(id))
    }

    pub fn contains_id(&self, id: &str) -> Result<bool, Error> {
        match self.find_by_id(id) {
            Ok(_) => Ok(true),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err),
        }
    }

    pub fn count(&self) -> Result<usize, Error> {
        let mut count = 0;
        for record in self.records_or_empty()?.into_iter().flatten() {
            record.map_err(|err| self.annotate(err))?;
            count += 1;
        }
        Ok(count)
    }

    /// Applies `update` to the first record with `id` and rewrites the file.
    pub fn update(&self, id: &str, update: &RecordUpdate) -> Result<Record, Error> {
        update.validate()?;
        self.rewrite(id, Rewrite::Update(update.clone()))
    }

    /// Removes the first record with `id` and rewrites the file.
    pub fn delete(&self, id: &str) -> Result<Record, Error> {
        self.rewrite(id, Rewrite::Delete)
    }

    fn records_or_empty(&self) -> Result<Option<Records>, Error> {
        match self.list_all() {
            Ok(records) => Ok(Some(records)),
            Err(err) if err.kind() == ErrorKind::StoreMissing => Ok(None),
            Err(err) => Err(err),
        }
    }

    // Every record is copied into a temp file beside the store; the temp file
    // replaces the store only when a match was found, so a miss leaves the
    // existing bytes untouched. The temp file takes the store's permissions
    // before the rename.
    fn rewrite(&self, id: &str, action: Rewrite) -> Result<Record, Error> {
        let Some(records) = self.records_or_empty()? else {
            return Err(record_not_found(id));
        };

        let dir = self.parent_dir();
        let temp = NamedTempFile::new_in(dir).map_err(|err| {
            Error::io(dir, err).with_message("failed to create temporary file")
        })?;
        let mut writer = BufWriter::new(temp);
        let mut matched = None;

        for record in records {
            let mut record = record.map_err(|err| self.annotate(err))?;
            if matched.is_none() && record.id == id {
                match &action {
                    Rewrite::Update(update) => {
                        record.apply(update);
                        matched = Some(record.clone());
                    }
                    Rewrite::Delete => {
                        matched = Some(record);
                        continue;
                    }
                }
            }
            encode_record(&record, &mut writer).map_err(|err| {
                Error::io(&self.path, err).with_message("failed to write temporary file")
            })?;
        }

        let Some(matched) = matched else {
            debug!(id, path = %self.path.display(), "no record to rewrite");
            return Err(record_not_found(id));
        };

        let temp = writer.into_inner().map_err(|err| {
            Error::io(&self.path, err.into_error()).with_message("failed to flush temporary file")
        })?;
        let permissions = fs::metadata(&self.path)
            .map_err(|err| Error::io(&self.path, err).with_message("failed to read store metadata"))?
            .permissions();
        temp.as_file().set_permissions(permissions).map_err(|err| {
            Error::io(temp.path(), err).with_message("failed to copy store permissions")
        })?;
        if self.options.durability == Durability::Flush {
            temp.as_file().sync_all().map_err(|err| {
                Error::io(temp.path(), err).with_message("failed to sync temporary file")
            })?;
        }
        temp.persist(&self.path).map_err(|err| {
            Error::io(&self.path, err.error).with_message("failed to replace store file")
        })?;

        let op = match action {
            Rewrite::Update(_) => "update",
            Rewrite::Delete => "delete",
        };
        info!(op, id, path = %self.path.display(), "rewrote store");
        Ok(matched)
    }

    fn parent_dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    fn annotate(&self, err: Error) -> Error {
        if err.path().is_some() {
            return err;
        }
        err.with_path(&self.path)
    }
}

fn record_not_found(id: &str) -> Error {
    Error::new(ErrorKind::NotFound)
        .with_message("record not found")
        .with_id(id)
}

use std::{
    fs::File,
    io::{ErrorKind, Read, Seek, Write},
    path::{Path, PathBuf},
};

use anyhow::Result;
use fs4::fs_std::FileExt;
use tracing::{debug, instrument};

use super::entities::{ActivityRecord, LOG_COLUMNS};

/// Default name of the activity log inside the application directory.
pub const DEFAULT_LOG_FILE_NAME: &str = "time_logs.csv";

/// Flat CSV table of [ActivityRecord] rows.
#[derive(Debug, Clone)]
pub struct CsvLogStore {
    path: PathBuf,
}

impl CsvLogStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends `records` to the table, creating it with the header if it doesn't exist yet.
    /// The existing rows are loaded and the whole table is written back.
    #[instrument(skip(self, records), fields(path = ?self.path, count = records.len()))]
    pub fn append(&self, records: &[ActivityRecord]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|v| !v.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = File::options()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)?;

        // Semi-safe acquire-release for a file
        file.lock_exclusive()?;
        let result = Self::append_with_file(&mut file, records);
        file.unlock()?;
        result
    }

    fn append_with_file(file: &mut File, records: &[ActivityRecord]) -> Result<()> {
        file.rewind()?;
        let mut rows = read_rows(&mut *file)?;
        debug!("Loaded {} existing rows", rows.len());
        rows.extend_from_slice(records);

        file.rewind()?;
        file.set_len(0)?;
        write_rows(&mut *file, &rows)?;
        file.flush()?;
        Ok(())
    }

    /// Async variant of [CsvLogStore::append] for use inside the runtime.
    pub async fn append_async(&self, records: Vec<ActivityRecord>) -> Result<()> {
        let store = self.clone();
        tokio::task::spawn_blocking(move || store.append(&records)).await?
    }

    /// Reads every row. Returns `None` if the table was never created.
    #[instrument(skip(self), fields(path = ?self.path))]
    pub fn load(&self) -> Result<Option<Vec<ActivityRecord>>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        file.lock_shared()?;
        let rows = read_rows(&file);
        file.unlock()?;
        Ok(Some(rows?))
    }
}

fn read_rows(source: impl Read) -> Result<Vec<ActivityRecord>> {
    let mut reader = csv::Reader::from_reader(source);
    let mut rows = vec![];
    for row in reader.deserialize::<ActivityRecord>() {
        rows.push(row?);
    }
    Ok(rows)
}

fn write_rows(sink: impl Write, rows: &[ActivityRecord]) -> Result<()> {
    // The header is written by hand so that an empty table still carries it.
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(sink);
    writer.write_record(LOG_COLUMNS)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
    use tempfile::tempdir;

    use crate::storage::entities::{ActivityRecord, Category};

    use super::CsvLogStore;

    const TEST_START_DATE: NaiveDateTime =
        NaiveDateTime::new(NaiveDate::from_ymd_opt(2018, 7, 4).unwrap(), NaiveTime::MIN);

    fn test_records(count: i64, offset: i64) -> Vec<ActivityRecord> {
        (0..count)
            .map(|i| {
                let start = TEST_START_DATE + Duration::seconds((offset + i) * 10);
                ActivityRecord::new(
                    format!("window {}", offset + i).into(),
                    if i % 2 == 0 {
                        Category::Browser
                    } else {
                        Category::Application
                    },
                    "example.com".into(),
                    start,
                    start + Duration::seconds(10),
                )
            })
            .collect()
    }

    #[test]
    fn test_append_creates_table() -> Result<()> {
        let dir = tempdir()?;
        let store = CsvLogStore::new(dir.path().join("time_logs.csv"));
        store.append(&test_records(3, 0))?;

        let contents = std::fs::read_to_string(store.path())?;
        let mut lines = contents.lines();
        assert_eq!(
            lines.next(),
            Some("Application,Category,Detail,Start Time,End Time,Duration (seconds)")
        );
        assert_eq!(
            lines.next(),
            Some("window 0,Browser,example.com,2018-07-04 00:00:00,2018-07-04 00:00:10,10.0")
        );
        assert_eq!(contents.lines().count(), 4);
        Ok(())
    }

    #[test]
    fn test_append_is_cumulative() -> Result<()> {
        let dir = tempdir()?;
        let store = CsvLogStore::new(dir.path().join("time_logs.csv"));
        let first = test_records(3, 0);
        let second = test_records(2, 3);
        store.append(&first)?;
        store.append(&second)?;

        let stored = store.load()?.unwrap();
        assert_eq!(stored.len(), 5);
        assert_eq!(&stored[..3], &first[..]);
        assert_eq!(&stored[3..], &second[..]);

        let contents = std::fs::read_to_string(store.path())?;
        assert_eq!(contents.lines().count(), 6);
        Ok(())
    }

    #[test]
    fn test_empty_append_writes_header() -> Result<()> {
        let dir = tempdir()?;
        let store = CsvLogStore::new(dir.path().join("nested").join("time_logs.csv"));
        store.append(&[])?;

        assert_eq!(store.load()?, Some(vec![]));
        let contents = std::fs::read_to_string(store.path())?;
        assert_eq!(contents.lines().count(), 1);
        Ok(())
    }

    #[test]
    fn test_load_missing_table() -> Result<()> {
        let dir = tempdir()?;
        let store = CsvLogStore::new(dir.path().join("time_logs.csv"));
        assert!(store.load()?.is_none());
        Ok(())
    }

    #[test]
    fn test_titles_with_commas_survive() -> Result<()> {
        let dir = tempdir()?;
        let store = CsvLogStore::new(dir.path().join("time_logs.csv"));
        let record = ActivityRecord::new(
            "main.rs, \"focuslog\" - Editor".into(),
            Category::Application,
            "N/A".into(),
            TEST_START_DATE,
            TEST_START_DATE + Duration::seconds(2),
        );
        store.append(&[record.clone()])?;
        assert_eq!(store.load()?, Some(vec![record]));
        Ok(())
    }

    #[tokio::test]
    async fn test_append_async() -> Result<()> {
        let dir = tempdir()?;
        let store = CsvLogStore::new(dir.path().join("time_logs.csv"));
        store.append_async(test_records(2, 0)).await?;
        assert_eq!(store.load()?.map(|v| v.len()), Some(2));
        Ok(())
    }
}

//! Local news store.
//!
//! Articles are kept in one JSON file, grouped by publication day:
//! ```text
//! [
//!   { "20240305": [article, article] },
//!   { "20240306": [article] }
//! ]
//! ```
//! Groups are ascending by day and articles inside a group by their date.

use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::article::ArticleRecord;
use crate::error::{ReaderError, Result};

/// Key format of a day group.
pub const GROUP_KEY_FORMAT: &str = "%Y%m%d";

type DayGroups = BTreeMap<String, Vec<ArticleRecord>>;

#[derive(Debug, Clone)]
pub struct NewsStore {
    path: PathBuf,
}

impl NewsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Merges `records` into the file. A stored article with the same link
    /// and title is replaced.
    pub fn save(&self, records: &[ArticleRecord]) -> Result<()> {
        let mut groups = if self.path.exists() {
            self.read_groups()?
        } else {
            DayGroups::new()
        };

        for record in records {
            let key = group_key(record)?;
            let group = groups.entry(key).or_default();
            match group
                .iter_mut()
                .find(|stored| stored.link == record.link && stored.title == record.title)
            {
                Some(stored) => *stored = record.clone(),
                None => group.push(record.clone()),
            }
        }

        for group in groups.values_mut() {
            group.sort_by(|a, b| a.date.cmp(&b.date));
        }

        let layout: Vec<BTreeMap<&str, &Vec<ArticleRecord>>> = groups
            .iter()
            .map(|(key, group)| BTreeMap::from([(key.as_str(), group)]))
            .collect();

        fs::write(&self.path, serde_json::to_string_pretty(&layout)?)?;
        info!(path = %self.path.display(), saved = records.len(), days = groups.len(), "news stored");
        Ok(())
    }

    /// Articles of one day, or of every day when `date` is `None`, cut to `limit`.
    pub fn load(&self, date: Option<NaiveDate>, limit: Option<usize>) -> Result<Vec<ArticleRecord>> {
        if !self.path.exists() {
            return Err(ReaderError::StorageMissing);
        }
        let mut groups = self.read_groups()?;

        let mut records = match date {
            Some(date) => {
                let key = date.format(GROUP_KEY_FORMAT).to_string();
                match groups.remove(&key) {
                    Some(group) if !group.is_empty() => group,
                    _ => return Err(ReaderError::NoNewsForDate(date)),
                }
            }
            None => groups.into_values().flatten().collect(),
        };

        if let Some(limit) = limit {
            if limit > records.len() {
                debug!(limit, available = records.len(), "limit exceeds stored news");
            }
            records.truncate(limit);
        }
        Ok(records)
    }

    fn read_groups(&self) -> Result<DayGroups> {
        let raw = fs::read_to_string(&self.path)?;
        let layout: Vec<DayGroups> = serde_json::from_str(&raw)?;

        let mut groups = DayGroups::new();
        for day in layout {
            for (key, records) in day {
                groups.entry(key).or_default().extend(records);
            }
        }
        Ok(groups)
    }
}

fn group_key(record: &ArticleRecord) -> Result<String> {
    record
        .published_on()
        .map(|day| day.format(GROUP_KEY_FORMAT).to_string())
        .ok_or_else(|| ReaderError::InvalidDate(record.date.clone()))
}

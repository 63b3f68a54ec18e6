//! Per-client daily word quota.
//!
//! Each client key has one record holding the words used and the date the
//! counter was last reset. A record from an earlier day counts as zero.
//! Reads never write; only a recorded charge persists, and saving drops every
//! record left over from an earlier day.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{debug, info};

pub const DAILY_WORD_LIMIT: u32 = 2500;

/// Client key used when the caller does not identify itself
pub const ANONYMOUS_CLIENT: &str = "anonymous";

#[derive(Debug, Error)]
pub enum UsageError {
    #[error("daily limit of {limit} words reached ({used} used, {requested} requested)")]
    LimitReached { used: u32, requested: u32, limit: u32 },

    #[error("usage store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("usage store is corrupt: {0}")]
    Format(#[from] serde_json::Error),

    #[error("usage store lock poisoned")]
    Poisoned,
}

/// Stored counter for one client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageRecord {
    pub words_used: u32,
    pub last_reset_date: NaiveDate,
}

/// Usage snapshot returned to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyUsage {
    pub words_used: u32,
    pub last_reset_date: NaiveDate,
    pub is_limit_reached: bool,
    pub remaining_words: u32,
}

impl DailyUsage {
    fn from_record(record: UsageRecord, limit: u32) -> Self {
        Self {
            words_used: record.words_used,
            last_reset_date: record.last_reset_date,
            is_limit_reached: record.words_used >= limit,
            remaining_words: limit.saturating_sub(record.words_used),
        }
    }
}

pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Local calendar date
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

pub trait UsageStore: Send {
    fn load(&self, key: &str) -> Result<Option<UsageRecord>, UsageError>;

    /// Store `record` under `key` and drop records dated before it
    fn save(&mut self, key: &str, record: UsageRecord) -> Result<(), UsageError>;
}

fn prune_stale(records: &mut HashMap<String, UsageRecord>, today: NaiveDate) {
    let before = records.len();
    records.retain(|_, record| record.last_reset_date >= today);
    let pruned = before - records.len();
    if pruned > 0 {
        info!(pruned, %today, "dropped stale usage records");
    }
}

#[derive(Debug, Default)]
pub struct MemoryUsageStore {
    records: HashMap<String, UsageRecord>,
}

impl UsageStore for MemoryUsageStore {
    fn load(&self, key: &str) -> Result<Option<UsageRecord>, UsageError> {
        Ok(self.records.get(key).copied())
    }

    fn save(&mut self, key: &str, record: UsageRecord) -> Result<(), UsageError> {
        prune_stale(&mut self.records, record.last_reset_date);
        self.records.insert(key.to_string(), record);
        Ok(())
    }
}

impl MemoryUsageStore {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// All records in one JSON object on disk, keyed by client
#[derive(Debug)]
pub struct JsonFileUsageStore {
    path: PathBuf,
}

impl JsonFileUsageStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<HashMap<String, UsageRecord>, UsageError> {
        match fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(HashMap::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_all(&self, records: &HashMap<String, UsageRecord>) -> Result<(), UsageError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        // Write next to the target and rename so readers never see a partial file
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, serde_json::to_vec_pretty(records)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl UsageStore for JsonFileUsageStore {
    fn load(&self, key: &str) -> Result<Option<UsageRecord>, UsageError> {
        Ok(self.read_all()?.get(key).copied())
    }

    fn save(&mut self, key: &str, record: UsageRecord) -> Result<(), UsageError> {
        let mut records = self.read_all()?;
        prune_stale(&mut records, record.last_reset_date);
        records.insert(key.to_string(), record);
        self.write_all(&records)
    }
}

/// Daily quota shared by all request handlers
pub struct DailyQuota {
    store: Mutex<Box<dyn UsageStore>>,
    clock: Arc<dyn Clock>,
    limit: u32,
}

impl DailyQuota {
    pub fn new(store: Box<dyn UsageStore>, clock: Arc<dyn Clock>, limit: u32) -> Self {
        Self {
            store: Mutex::new(store),
            clock,
            limit,
        }
    }

    /// In-memory quota on the system clock
    pub fn in_memory(limit: u32) -> Self {
        Self::new(
            Box::new(MemoryUsageStore::default()),
            Arc::new(SystemClock),
            limit,
        )
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Current usage for `client`; a missing or stale record reads as zero
    pub fn usage(&self, client: &str) -> Result<DailyUsage, UsageError> {
        let store = self.store.lock().map_err(|_| UsageError::Poisoned)?;
        let record = self.current_record(&**store, client)?;
        Ok(DailyUsage::from_record(record, self.limit))
    }

    pub fn can_consume(&self, client: &str, words: u32) -> Result<bool, UsageError> {
        let usage = self.usage(client)?;
        Ok(usage.words_used.saturating_add(words) <= self.limit)
    }

    /// Add `words` to today's counter.
    ///
    /// Fails with [`UsageError::LimitReached`] and leaves the record untouched
    /// when the total would exceed the limit.
    pub fn record(&self, client: &str, words: u32) -> Result<DailyUsage, UsageError> {
        let mut store = self.store.lock().map_err(|_| UsageError::Poisoned)?;
        let mut record = self.current_record(&**store, client)?;

        let total = record.words_used.saturating_add(words);
        if total > self.limit {
            return Err(UsageError::LimitReached {
                used: record.words_used,
                requested: words,
                limit: self.limit,
            });
        }

        record.words_used = total;
        store.save(client, record)?;
        debug!(client, words, total, "recorded usage");

        Ok(DailyUsage::from_record(record, self.limit))
    }

    /// Add `words` to today's counter without checking the limit.
    ///
    /// Used after a [`can_consume`](Self::can_consume) gate on an estimate,
    /// when the charged amount is only known once the work is done.
    pub fn charge(&self, client: &str, words: u32) -> Result<DailyUsage, UsageError> {
        let mut store = self.store.lock().map_err(|_| UsageError::Poisoned)?;
        let mut record = self.current_record(&**store, client)?;

        record.words_used = record.words_used.saturating_add(words);
        store.save(client, record)?;
        debug!(client, words, total = record.words_used, "charged usage");

        Ok(DailyUsage::from_record(record, self.limit))
    }

    fn current_record(
        &self,
        store: &dyn UsageStore,
        client: &str,
    ) -> Result<UsageRecord, UsageError> {
        let today = self.clock.today();

        match store.load(client)? {
            Some(record) if record.last_reset_date == today => Ok(record),
            stale => {
                if stale.is_some() {
                    debug!(client, %today, "stale usage record reads as zero");
                }
                Ok(UsageRecord {
                    words_used: 0,
                    last_reset_date: today,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct FixedClock(Mutex<NaiveDate>);

    impl FixedClock {
        fn new(date: NaiveDate) -> Arc<Self> {
            Arc::new(Self(Mutex::new(date)))
        }

        fn set(&self, date: NaiveDate) {
            *self.0.lock().unwrap() = date;
        }
    }

    impl Clock for FixedClock {
        fn today(&self) -> NaiveDate {
            *self.0.lock().unwrap()
        }
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, day).unwrap()
    }

    fn quota_with(clock: Arc<FixedClock>, limit: u32) -> DailyQuota {
        DailyQuota::new(Box::new(MemoryUsageStore::default()), clock, limit)
    }

    #[test]
    fn test_new_client_starts_empty() {
        let quota = quota_with(FixedClock::new(date(1)), DAILY_WORD_LIMIT);
        let usage = quota.usage("alice").unwrap();

        assert_eq!(usage.words_used, 0);
        assert_eq!(usage.last_reset_date, date(1));
        assert_eq!(usage.remaining_words, DAILY_WORD_LIMIT);
        assert!(!usage.is_limit_reached);
    }

    #[test]
    fn test_record_accumulates_per_client() {
        let quota = quota_with(FixedClock::new(date(1)), 100);

        quota.record("alice", 30).unwrap();
        let usage = quota.record("alice", 20).unwrap();
        assert_eq!(usage.words_used, 50);
        assert_eq!(usage.remaining_words, 50);

        assert_eq!(quota.usage("bob").unwrap().words_used, 0);
    }

    #[test]
    fn test_limit_rejects_overflow() {
        let quota = quota_with(FixedClock::new(date(1)), 100);
        quota.record("alice", 90).unwrap();

        assert!(quota.can_consume("alice", 10).unwrap());
        assert!(!quota.can_consume("alice", 11).unwrap());

        let err = quota.record("alice", 11).unwrap_err();
        assert!(matches!(
            err,
            UsageError::LimitReached { used: 90, requested: 11, limit: 100 }
        ));
        assert_eq!(quota.usage("alice").unwrap().words_used, 90);

        let full = quota.record("alice", 10).unwrap();
        assert!(full.is_limit_reached);
        assert_eq!(full.remaining_words, 0);
    }

    #[test]
    fn test_new_day_resets_counter() {
        let clock = FixedClock::new(date(1));
        let quota = quota_with(clock.clone(), 100);
        quota.record("alice", 100).unwrap();
        assert!(quota.usage("alice").unwrap().is_limit_reached);

        clock.set(date(2));
        let usage = quota.usage("alice").unwrap();
        assert_eq!(usage.words_used, 0);
        assert_eq!(usage.last_reset_date, date(2));
        assert!(quota.can_consume("alice", 100).unwrap());
    }

    #[test]
    fn test_file_store_persists_across_instances() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("usage").join("quota.json");
        let clock = FixedClock::new(date(5));

        let first = DailyQuota::new(Box::new(JsonFileUsageStore::new(&path)), clock.clone(), 100);
        first.record("alice", 40).unwrap();
        drop(first);

        let second = DailyQuota::new(Box::new(JsonFileUsageStore::new(&path)), clock, 100);
        assert_eq!(second.usage("alice").unwrap().words_used, 40);

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["alice"]["wordsUsed"], 40);
        assert_eq!(raw["alice"]["lastResetDate"], "2025-03-05");
    }

    #[test]
    fn test_reads_do_not_persist() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("quota.json");
        let quota = DailyQuota::new(
            Box::new(JsonFileUsageStore::new(&path)),
            FixedClock::new(date(1)),
            100,
        );

        for i in 0..1000 {
            quota.usage(&format!("client-{i}")).unwrap();
            quota.can_consume(&format!("client-{i}"), 5).unwrap();
        }

        assert!(!path.exists());
    }

    #[test]
    fn test_save_drops_stale_records() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("quota.json");
        let clock = FixedClock::new(date(1));
        let quota = DailyQuota::new(Box::new(JsonFileUsageStore::new(&path)), clock.clone(), 100);

        quota.record("alice", 10).unwrap();
        quota.record("bob", 20).unwrap();

        clock.set(date(2));
        assert_eq!(quota.usage("bob").unwrap().words_used, 0);
        quota.record("carol", 5).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        let keys: Vec<&String> = raw.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["carol"]);
    }

    #[test]
    fn test_memory_store_drops_stale_records() {
        let mut store = MemoryUsageStore::default();
        let old = UsageRecord {
            words_used: 3,
            last_reset_date: date(1),
        };
        store.save("alice", old).unwrap();
        store.save("bob", old).unwrap();
        assert_eq!(store.len(), 2);

        store
            .save(
                "alice",
                UsageRecord {
                    words_used: 1,
                    last_reset_date: date(2),
                },
            )
            .unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.load("bob").unwrap(), None);
    }

    #[test]
    fn test_charge_ignores_limit() {
        let quota = quota_with(FixedClock::new(date(1)), 100);
        quota.record("alice", 90).unwrap();

        let usage = quota.charge("alice", 25).unwrap();
        assert_eq!(usage.words_used, 115);
        assert!(usage.is_limit_reached);
        assert_eq!(usage.remaining_words, 0);
    }

    #[test]
    fn test_file_store_reports_corruption() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("quota.json");
        fs::write(&path, "{not json").unwrap();

        let store = JsonFileUsageStore::new(&path);
        assert!(matches!(store.load("alice"), Err(UsageError::Format(_))));
    }

    #[test]
    fn test_snapshot_serializes_camel_case() {
        let usage = DailyUsage::from_record(
            UsageRecord {
                words_used: 2600,
                last_reset_date: date(9),
            },
            DAILY_WORD_LIMIT,
        );
        let value = serde_json::to_value(usage).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "wordsUsed": 2600,
                "lastResetDate": "2025-03-09",
                "isLimitReached": true,
                "remainingWords": 0
            })
        );
    }
}

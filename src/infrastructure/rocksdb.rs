use crate::domain::flag::BeaconFlag;
use crate::domain::payment::PaymentId;
use crate::domain::ports::{AuditLog, FlagStore};
use crate::error::{BeaconError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, Options};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Column Family for per-payment flags.
pub const CF_FLAGS: &str = "flags";
/// Column Family for payment notes.
pub const CF_NOTES: &str = "notes";

const FLAG_SET: &[u8] = b"true";

/// A persistent flag and note store backed by RocksDB.
///
/// Flags live under `payment_id \0 meta_key`; notes are a JSON array per
/// payment. Read-modify-write sequences are serialized by `write_lock`.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    write_lock: Arc<Mutex<()>>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// # Arguments
    ///
    /// * `path` - The filesystem path where the database will be stored.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_flags = ColumnFamilyDescriptor::new(CF_FLAGS, Options::default());
        let cf_notes = ColumnFamilyDescriptor::new(CF_NOTES, Options::default());

        let db = DB::open_cf_descriptors(&opts, path, vec![cf_flags, cf_notes])?;

        Ok(Self {
            db: Arc::new(db),
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db.cf_handle(name).ok_or_else(|| {
            BeaconError::StorageError(Box::new(std::io::Error::other(format!(
                "{name} column family not found"
            ))))
        })
    }

    fn flag_key(payment_id: &PaymentId, flag: BeaconFlag) -> Vec<u8> {
        let mut key = payment_id.as_str().as_bytes().to_vec();
        key.push(0);
        key.extend_from_slice(flag.meta_key().as_bytes());
        key
    }

    fn read_notes(&self, payment_id: &PaymentId) -> Result<Vec<String>> {
        let cf = self.cf(CF_NOTES)?;
        match self.db.get_cf(cf, payment_id.as_str().as_bytes())? {
            Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
            None => Ok(Vec::new()),
        }
    }
}

#[async_trait]
impl FlagStore for RocksDBStore {
    async fn get_flag(&self, payment_id: &PaymentId, flag: BeaconFlag) -> Result<bool> {
        let cf = self.cf(CF_FLAGS)?;
        let value = self.db.get_pinned_cf(cf, Self::flag_key(payment_id, flag))?;
        Ok(value.is_some())
    }

    async fn set_flag(&self, payment_id: &PaymentId, flag: BeaconFlag, value: bool) -> Result<()> {
        let cf = self.cf(CF_FLAGS)?;
        let key = Self::flag_key(payment_id, flag);
        if value {
            self.db.put_cf(cf, key, FLAG_SET)?;
        } else {
            self.db.delete_cf(cf, key)?;
        }
        Ok(())
    }

    async fn set_flag_if_absent(&self, payment_id: &PaymentId, flag: BeaconFlag) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let cf = self.cf(CF_FLAGS)?;
        let key = Self::flag_key(payment_id, flag);
        if self.db.get_pinned_cf(cf, &key)?.is_some() {
            return Ok(false);
        }
        self.db.put_cf(cf, key, FLAG_SET)?;
        Ok(true)
    }
}

#[async_trait]
impl AuditLog for RocksDBStore {
    async fn write_note(&self, payment_id: &PaymentId, message: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut notes = self.read_notes(payment_id)?;
        notes.push(message.to_string());
        let cf = self.cf(CF_NOTES)?;
        self.db
            .put_cf(cf, payment_id.as_str().as_bytes(), serde_json::to_vec(&notes)?)?;
        Ok(())
    }

    async fn notes(&self, payment_id: &PaymentId) -> Result<Vec<String>> {
        self.read_notes(payment_id)
    }
}

//! Persistence seam for the ingestion pipeline.
//!
//! [`UplinkStore`] is the narrow contract the pipeline needs: look up a
//! device and atomically append a reading. [`PgUplinkStore`] fulfils it
//! with the `aquaalert-db` repositories.

use std::future::Future;

use aquaalert_db::models::device::Device;
use aquaalert_db::models::reading::{CreateReading, Reading};
use aquaalert_db::repositories::{DeviceRepo, ReadingRepo};
use aquaalert_db::DbPool;

pub trait UplinkStore: Send + Sync + 'static {
    /// Find a registered device by normalized EUI.
    fn get_device(
        &self,
        eui: &str,
    ) -> impl Future<Output = Result<Option<Device>, sqlx::Error>> + Send;

    /// Insert the reading and set the device's `last_seen` to its time.
    ///
    /// Both changes commit together or not at all.
    fn insert_reading_and_touch_device(
        &self,
        reading: &CreateReading,
    ) -> impl Future<Output = Result<Reading, sqlx::Error>> + Send;
}

/// Postgres-backed [`UplinkStore`].
#[derive(Clone)]
pub struct PgUplinkStore {
    pool: DbPool,
}

impl PgUplinkStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl UplinkStore for PgUplinkStore {
    async fn get_device(&self, eui: &str) -> Result<Option<Device>, sqlx::Error> {
        DeviceRepo::find_by_eui(&self.pool, eui).await
    }

    async fn insert_reading_and_touch_device(
        &self,
        reading: &CreateReading,
    ) -> Result<Reading, sqlx::Error> {
        ReadingRepo::insert_and_touch_device(&self.pool, reading).await
    }
}

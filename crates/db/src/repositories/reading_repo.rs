//! Repository for the `sensor_readings` table (append-only time series).

use aquaalert_core::device::normalize_eui;
use aquaalert_core::types::Timestamp;
use sqlx::{PgConnection, PgPool};

use crate::models::reading::{CreateReading, Reading};
use crate::repositories::DeviceRepo;

/// Column list for `sensor_readings` queries.
const COLUMNS: &str = "\
    id, time, device_eui, distance_cm, water_level_cm, fill_pct, \
    battery_mv, battery_pct, rssi, snr, alert_level";

/// Provides query operations for sensor readings.
pub struct ReadingRepo;

impl ReadingRepo {
    /// Insert a reading on an open connection or transaction.
    pub async fn insert(
        conn: &mut PgConnection,
        input: &CreateReading,
    ) -> Result<Reading, sqlx::Error> {
        let query = format!(
            "INSERT INTO sensor_readings ({COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Reading>(&query)
            .bind(input.id)
            .bind(input.time)
            .bind(&input.device_eui)
            .bind(input.distance_cm)
            .bind(input.water_level_cm)
            .bind(input.fill_pct)
            .bind(input.battery_mv)
            .bind(input.battery_pct)
            .bind(input.rssi)
            .bind(input.snr)
            .bind(input.alert_level.as_str())
            .fetch_one(conn)
            .await
    }

    /// Insert a reading and advance the device's `last_seen` in one
    /// transaction. Neither change is visible if either fails.
    pub async fn insert_and_touch_device(
        pool: &PgPool,
        input: &CreateReading,
    ) -> Result<Reading, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let reading = Self::insert(&mut *tx, input).await?;
        if !DeviceRepo::touch_last_seen(&mut *tx, &input.device_eui, input.time).await? {
            // Device vanished between lookup and write; rolls back on drop.
            return Err(sqlx::Error::RowNotFound);
        }

        tx.commit().await?;
        Ok(reading)
    }

    /// Readings for a device since `since`, newest first.
    pub async fn list_for_device(
        pool: &PgPool,
        eui: &str,
        since: Timestamp,
        limit: i64,
    ) -> Result<Vec<Reading>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM sensor_readings \
             WHERE device_eui = $1 AND time >= $2 \
             ORDER BY time DESC \
             LIMIT $3"
        );
        sqlx::query_as::<_, Reading>(&query)
            .bind(normalize_eui(eui))
            .bind(since)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Most recent reading for a device, if any.
    pub async fn latest_for_device(
        pool: &PgPool,
        eui: &str,
    ) -> Result<Option<Reading>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM sensor_readings \
             WHERE device_eui = $1 \
             ORDER BY time DESC \
             LIMIT 1"
        );
        sqlx::query_as::<_, Reading>(&query)
            .bind(normalize_eui(eui))
            .fetch_optional(pool)
            .await
    }

    /// Count readings for a device.
    pub async fn count_for_device(pool: &PgPool, eui: &str) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM sensor_readings WHERE device_eui = $1")
                .bind(normalize_eui(eui))
                .fetch_one(pool)
                .await?;
        Ok(count)
    }
}

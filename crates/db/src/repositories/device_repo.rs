//! Repository for the `devices` table.

use aquaalert_core::device::normalize_eui;
use aquaalert_core::types::Timestamp;
use sqlx::{PgConnection, PgPool};

use crate::models::device::{CreateDevice, Device, UpdateDevice};

/// Column list for `devices` queries.
const COLUMNS: &str = "\
    device_eui, name, description, location_name, latitude, longitude, \
    bridge_height_cm, threshold_watch_pct, threshold_warning_pct, threshold_critical_pct, \
    is_active, last_seen, created_at, updated_at";

/// Provides query operations for registered devices.
pub struct DeviceRepo;

impl DeviceRepo {
    /// Insert a new device. The EUI is stored uppercase.
    ///
    /// Omitted calibration fields take the column defaults; apply
    /// [`CreateDevice::with_defaults`] first to use configured defaults.
    pub async fn create(pool: &PgPool, input: &CreateDevice) -> Result<Device, sqlx::Error> {
        let query = format!(
            "INSERT INTO devices \
                (device_eui, name, description, location_name, latitude, longitude, \
                 bridge_height_cm, threshold_watch_pct, threshold_warning_pct, threshold_critical_pct) \
             VALUES ($1, $2, $3, $4, $5, $6, \
                 COALESCE($7, 300.0), COALESCE($8, 50.0), COALESCE($9, 70.0), COALESCE($10, 85.0)) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Device>(&query)
            .bind(normalize_eui(&input.device_eui))
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.location_name)
            .bind(input.latitude)
            .bind(input.longitude)
            .bind(input.bridge_height_cm)
            .bind(input.threshold_watch_pct)
            .bind(input.threshold_warning_pct)
            .bind(input.threshold_critical_pct)
            .fetch_one(pool)
            .await
    }

    /// Find a device by EUI (case-insensitive on input).
    pub async fn find_by_eui(pool: &PgPool, eui: &str) -> Result<Option<Device>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM devices WHERE device_eui = $1");
        sqlx::query_as::<_, Device>(&query)
            .bind(normalize_eui(eui))
            .fetch_optional(pool)
            .await
    }

    /// List all devices ordered by EUI, including inactive ones.
    pub async fn list(pool: &PgPool) -> Result<Vec<Device>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM devices ORDER BY device_eui ASC");
        sqlx::query_as::<_, Device>(&query).fetch_all(pool).await
    }

    /// List active devices ordered by EUI.
    pub async fn list_active(pool: &PgPool) -> Result<Vec<Device>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM devices WHERE is_active = true ORDER BY device_eui ASC");
        sqlx::query_as::<_, Device>(&query).fetch_all(pool).await
    }

    /// Patch a device. Returns `None` if no such device exists.
    pub async fn update(
        pool: &PgPool,
        eui: &str,
        input: &UpdateDevice,
    ) -> Result<Option<Device>, sqlx::Error> {
        let query = format!(
            "UPDATE devices SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                location_name = COALESCE($4, location_name),
                latitude = COALESCE($5, latitude),
                longitude = COALESCE($6, longitude),
                bridge_height_cm = COALESCE($7, bridge_height_cm),
                threshold_watch_pct = COALESCE($8, threshold_watch_pct),
                threshold_warning_pct = COALESCE($9, threshold_warning_pct),
                threshold_critical_pct = COALESCE($10, threshold_critical_pct),
                is_active = COALESCE($11, is_active),
                updated_at = NOW()
             WHERE device_eui = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Device>(&query)
            .bind(normalize_eui(eui))
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.location_name)
            .bind(input.latitude)
            .bind(input.longitude)
            .bind(input.bridge_height_cm)
            .bind(input.threshold_watch_pct)
            .bind(input.threshold_warning_pct)
            .bind(input.threshold_critical_pct)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete a device. Returns `true` if a row was updated.
    pub async fn deactivate(pool: &PgPool, eui: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE devices SET is_active = false, updated_at = NOW() \
             WHERE device_eui = $1 AND is_active = true",
        )
        .bind(normalize_eui(eui))
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Set `last_seen` on an open connection or transaction.
    ///
    /// Returns `true` if the device exists.
    pub async fn touch_last_seen(
        conn: &mut PgConnection,
        eui: &str,
        seen_at: Timestamp,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE devices SET last_seen = $2 WHERE device_eui = $1")
            .bind(normalize_eui(eui))
            .bind(seen_at)
            .execute(conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

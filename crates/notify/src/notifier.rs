use std::future::Future;

use aquaalert_db::models::device::Device;
use aquaalert_db::models::reading::Reading;

/// Delivers an alert for a persisted reading.
///
/// Implementations never fail: the result only says whether a message
/// went out.
pub trait AlertNotifier: Send + Sync + 'static {
    fn notify(&self, device: &Device, reading: &Reading) -> impl Future<Output = bool> + Send;
}

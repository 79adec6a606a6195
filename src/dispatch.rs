use anyhow::Result;
use async_trait::async_trait;

use crate::types::Announcement;

/// Sends announcements to their destination.
///
/// A failed send is not retried; the poller logs it and moves on.
#[async_trait]
pub trait Dispatcher: Send + Sync {
    async fn send(&self, announcement: &Announcement) -> Result<()>;
}

/// Dry-run dispatcher: one JSON line per announcement on stdout.
pub struct StdoutDispatcher;

#[async_trait]
impl Dispatcher for StdoutDispatcher {
    async fn send(&self, announcement: &Announcement) -> Result<()> {
        let json = serde_json::to_string(announcement)?;
        println!("{json}");
        Ok(())
    }
}

//! `booking-config.json` backed schedule.
//!
//! Every update rewrites the whole file through a temporary sibling and a
//! rename, so a crash mid-write leaves either the old or the new content.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::schedule::model::{DesiredBooking, ScheduleFile};
use crate::schedule::repository::ScheduleRepository;

pub struct JsonScheduleStore {
    path: PathBuf,
}

impl JsonScheduleStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<ScheduleFile> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("reading schedule {}", self.path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("parsing schedule {}", self.path.display()))
    }

    async fn write(&self, file: &ScheduleFile) -> Result<()> {
        let mut body = serde_json::to_string_pretty(file).context("serializing schedule")?;
        body.push('\n');

        let tmp = self.tmp_path();
        tokio::fs::write(&tmp, body)
            .await
            .with_context(|| format!("writing {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("replacing {}", self.path.display()))?;
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "schedule.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl ScheduleRepository for JsonScheduleStore {
    async fn load_all(&self) -> Result<Vec<DesiredBooking>> {
        Ok(self.read().await?.bookings)
    }

    #[instrument(skip(self, booking), target = "schedule", fields(booking_id = %booking.id))]
    async fn update(&self, booking: &DesiredBooking) -> Result<()> {
        let mut file = self.read().await?;
        let slot = file
            .bookings
            .iter_mut()
            .find(|b| b.id == booking.id)
            .ok_or_else(|| anyhow!("no booking with id {} in {}", booking.id, self.path.display()))?;
        *slot = booking.clone();

        self.write(&file).await?;
        debug!("schedule record written");
        Ok(())
    }
}

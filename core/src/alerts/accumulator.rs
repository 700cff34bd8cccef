use crate::alerts::store::AlertStore;
use crate::model::{AlertRecord, Location, TimeSeriesFrame};
use crate::prelude::StoreResult;
use crate::telemetry::{LogManager, MetricsRecorder};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Append-only list of alert markers, mirrored to an [`AlertStore`].
pub struct AlertAccumulator {
    records: Vec<AlertRecord>,
    store: Arc<dyn AlertStore>,
    metrics: Arc<MetricsRecorder>,
    logger: LogManager,
}

impl AlertAccumulator {
    /// Seeds the list from the store once. An unreadable store starts empty.
    pub fn new(store: Arc<dyn AlertStore>) -> Self {
        let logger = LogManager::new("alerts");
        let records = match store.load() {
            Ok(records) => {
                if !records.is_empty() {
                    logger.record(&format!("restored {} alert markers", records.len()));
                }
                records
            }
            Err(err) => {
                logger.warn(&format!("could not restore alert markers: {}", err));
                Vec::new()
            }
        };

        Self {
            records,
            store,
            metrics: Arc::new(MetricsRecorder::new()),
            logger,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsRecorder>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn records(&self) -> &[AlertRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Appends one record per alerting patch in `frame`. Returns how many.
    pub fn accumulate(&mut self, frame: &TimeSeriesFrame, origin: &Location) -> usize {
        self.accumulate_at(frame, origin, Utc::now())
    }

    pub fn accumulate_at(
        &mut self,
        frame: &TimeSeriesFrame,
        origin: &Location,
        detected_at: DateTime<Utc>,
    ) -> usize {
        let before = self.records.len();
        self.records.extend(
            frame
                .alert_patches()
                .map(|patch| AlertRecord::from_patch(patch, &frame.timestamp, origin, detected_at)),
        );
        let added = self.records.len() - before;
        if added == 0 {
            return 0;
        }

        self.metrics.record_alerts(added);
        self.logger.record(&format!(
            "{} new alerts at {} ({} total)",
            added,
            frame.timestamp,
            self.records.len()
        ));
        if let Err(err) = self.store.save(&self.records) {
            self.metrics.record_persist_error();
            self.logger
                .warn(&format!("failed to persist alert markers: {}", err));
        }
        added
    }

    /// Empties both the persisted mirror and the list. If the store cannot be
    /// cleared the list is left untouched.
    pub fn reset(&mut self) -> StoreResult<()> {
        self.store.clear()?;
        self.records.clear();
        self.logger.record("alert markers cleared");
        Ok(())
    }
}

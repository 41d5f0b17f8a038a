//! Survey store service
//!
//! Owns the store and serializes every read-modify-write sequence on it, so
//! concurrent submissions cannot overwrite each other's appends.

use crate::state::{PersistenceError, SurveyStore};
use crate::survey::{Answers, SurveyRecord};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

/// Survey store service
pub struct SurveyService {
    store: Arc<dyn SurveyStore>,
    write_lock: Mutex<()>,
}

impl SurveyService {
    /// Wrap a store
    pub fn new(store: Arc<dyn SurveyStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    /// Build a record from validated answers and append it to the store
    ///
    /// # Returns
    /// * `Ok(SurveyRecord)` - The stored record
    /// * `Err(PersistenceError)` - The store could not be written; nothing was appended
    pub async fn submit(&self, answers: Answers) -> Result<SurveyRecord, PersistenceError> {
        let _guard = self.write_lock.lock().await;
        // Stamped under the lock so store order matches timestamp order
        let record = SurveyRecord::new(answers, Utc::now());
        let mut records = self.store.load_all().await;
        records.push(record.clone());
        self.store.save_all(&records).await?;

        info!(
            total = records.len(),
            overall = record.scores().overall(),
            "Survey response stored"
        );
        Ok(record)
    }

    /// All records in insertion order
    pub async fn records(&self) -> Vec<SurveyRecord> {
        self.store.load_all().await
    }

    /// Remove every record
    pub async fn clear(&self) -> Result<(), PersistenceError> {
        let _guard = self.write_lock.lock().await;
        let removed = self.store.load_all().await.len();
        self.store.save_all(&[]).await?;

        info!(removed, "Survey store cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::MemoryStore;
    use crate::survey::test_support::record_with;

    fn create_test_service() -> SurveyService {
        SurveyService::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn test_submit_appends_in_order() {
        let service = create_test_service();
        for value in 1..=3 {
            let answers = *record_with(value).answers();
            service.submit(answers).await.unwrap();
        }

        let records = service.records().await;
        assert_eq!(records.len(), 3);
        assert_eq!(records[2].answers().get("OK1"), Some(3.0));
    }

    #[tokio::test]
    async fn test_concurrent_submits_are_not_lost() {
        let service = Arc::new(create_test_service());
        let handles: Vec<_> = (0..32)
            .map(|i| {
                let service = Arc::clone(&service);
                tokio::spawn(async move {
                    let answers = *record_with(i % 5 + 1).answers();
                    service.submit(answers).await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let records = service.records().await;
        assert_eq!(records.len(), 32);
        assert!(records
            .windows(2)
            .all(|pair| pair[0].timestamp() <= pair[1].timestamp()));
    }

    #[tokio::test]
    async fn test_clear_empties_store() {
        let store = Arc::new(MemoryStore::with_records(vec![record_with(2), record_with(4)]));
        let service = SurveyService::new(store);

        service.clear().await.unwrap();
        assert!(service.records().await.is_empty());
    }
}

//! GetRecordHandler - Query handler for single-record reads.
//!
//! Cache-aside over the record repository: a hit serves straight from the
//! cache, a miss reads the store and caches the result for five minutes.
//! Visibility is enforced on both paths, so a cached copy answers exactly
//! like a fresh read.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::foundation::{DomainError, ErrorCode, RecordId, Role, UserId};
use crate::domain::record::DataRecord;
use crate::ports::{data_key, Cache, RecordRepository};

/// How long a record stays cached after a read.
const RECORD_CACHE_TTL_SECS: i64 = 300;

/// Query for one record on behalf of an authenticated account.
#[derive(Debug, Clone)]
pub struct GetRecordQuery {
    pub record_id: RecordId,
    pub user_id: UserId,
    pub role: Role,
}

/// Result of a record read.
#[derive(Debug, Clone)]
pub struct GetRecordResult {
    pub record: DataRecord,
    /// True when the cache answered instead of the store.
    pub from_cache: bool,
}

/// Handler for reading a single record.
pub struct GetRecordHandler {
    records: Arc<dyn RecordRepository>,
    cache: Arc<dyn Cache>,
}

impl GetRecordHandler {
    pub fn new(records: Arc<dyn RecordRepository>, cache: Arc<dyn Cache>) -> Self {
        Self { records, cache }
    }

    pub async fn handle(&self, query: GetRecordQuery) -> Result<GetRecordResult, DomainError> {
        let key = data_key(query.record_id);

        // 1. Try the cache; a decodable hit skips the store entirely
        if let Some(value) = self.cache.get(&key).await {
            match serde_json::from_value::<DataRecord>(value) {
                Ok(record) => {
                    if !record.is_visible_to(query.user_id, query.role) {
                        return Err(access_denied());
                    }
                    debug!(record_id = %query.record_id, "Cache hit for data");
                    return Ok(GetRecordResult {
                        record,
                        from_cache: true,
                    });
                }
                Err(err) => {
                    // Corrupt entries fall through to the store
                    warn!(
                        record_id = %query.record_id,
                        error = %err,
                        "Discarding undecodable cache entry"
                    );
                    self.cache.delete(&key).await;
                }
            }
        }

        // 2. Read from the store
        let Some(record) = self.records.find_by_id(query.record_id).await? else {
            return Err(DomainError::new(ErrorCode::RecordNotFound, "Data not found"));
        };

        // 3. Enforce visibility
        if !record.is_visible_to(query.user_id, query.role) {
            return Err(access_denied());
        }

        // 4. Cache for the next read. Serialization of a plain record does
        //    not fail; the cache itself is best-effort either way.
        if let Ok(value) = serde_json::to_value(&record) {
            self.cache.set(&key, &value, RECORD_CACHE_TTL_SECS).await;
            debug!(record_id = %query.record_id, "Data cached");
        }

        Ok(GetRecordResult {
            record,
            from_cache: false,
        })
    }
}

fn access_denied() -> DomainError {
    DomainError::new(ErrorCode::Forbidden, "Access denied")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::cache::InMemoryCache;
    use crate::domain::foundation::Timestamp;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockRecordRepository {
        record: Option<DataRecord>,
        reads: AtomicUsize,
    }

    impl MockRecordRepository {
        fn with_record(record: DataRecord) -> Self {
            Self {
                record: Some(record),
                reads: AtomicUsize::new(0),
            }
        }

        fn empty() -> Self {
            Self {
                record: None,
                reads: AtomicUsize::new(0),
            }
        }

        fn reads(&self) -> usize {
            self.reads.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RecordRepository for MockRecordRepository {
        async fn save(&self, _record: &DataRecord) -> Result<(), DomainError> {
            Ok(())
        }

        async fn find_by_id(&self, id: RecordId) -> Result<Option<DataRecord>, DomainError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            Ok(self.record.as_ref().filter(|r| r.id() == id).cloned())
        }

        async fn list_visible_to(
            &self,
            _user_id: UserId,
            _role: Role,
        ) -> Result<Vec<DataRecord>, DomainError> {
            Ok(vec![])
        }
    }

    fn record(is_public: bool, owner: UserId) -> DataRecord {
        DataRecord::create(
            "sensor-1".to_string(),
            serde_json::json!(42),
            is_public,
            owner,
            Timestamp::from_unix_secs(1704326400),
        )
        .unwrap()
    }

    fn query_for(record: &DataRecord, user_id: UserId, role: Role) -> GetRecordQuery {
        GetRecordQuery {
            record_id: record.id(),
            user_id,
            role,
        }
    }

    #[tokio::test]
    async fn first_read_misses_then_second_read_hits_the_cache() {
        let owner = UserId::new();
        let stored = record(true, owner);
        let repo = Arc::new(MockRecordRepository::with_record(stored.clone()));
        let cache = Arc::new(InMemoryCache::new());
        let handler = GetRecordHandler::new(repo.clone(), cache);

        let first = handler
            .handle(query_for(&stored, owner, Role::User))
            .await
            .unwrap();
        let second = handler
            .handle(query_for(&stored, owner, Role::User))
            .await
            .unwrap();

        assert!(!first.from_cache);
        assert!(second.from_cache);
        assert_eq!(second.record, stored);
        assert_eq!(repo.reads(), 1);
    }

    #[tokio::test]
    async fn missing_record_is_not_found() {
        let repo = Arc::new(MockRecordRepository::empty());
        let cache = Arc::new(InMemoryCache::new());
        let handler = GetRecordHandler::new(repo, cache);

        let err = handler
            .handle(GetRecordQuery {
                record_id: RecordId::new(),
                user_id: UserId::new(),
                role: Role::User,
            })
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::RecordNotFound);
    }

    #[tokio::test]
    async fn private_record_is_denied_to_non_owner() {
        let stored = record(false, UserId::new());
        let repo = Arc::new(MockRecordRepository::with_record(stored.clone()));
        let cache = Arc::new(InMemoryCache::new());
        let handler = GetRecordHandler::new(repo, cache.clone());

        let err = handler
            .handle(query_for(&stored, UserId::new(), Role::User))
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::Forbidden);
        // A denied read must not prime the cache for anyone
        assert!(cache.get(&data_key(stored.id())).await.is_none());
    }

    #[tokio::test]
    async fn cached_copy_still_enforces_visibility() {
        let owner = UserId::new();
        let stored = record(false, owner);
        let repo = Arc::new(MockRecordRepository::with_record(stored.clone()));
        let cache = Arc::new(InMemoryCache::new());
        let handler = GetRecordHandler::new(repo, cache);

        // Owner primes the cache
        handler
            .handle(query_for(&stored, owner, Role::User))
            .await
            .unwrap();

        // A different account hits the cached copy and is still denied
        let err = handler
            .handle(query_for(&stored, UserId::new(), Role::User))
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn admin_reads_any_private_record() {
        let stored = record(false, UserId::new());
        let repo = Arc::new(MockRecordRepository::with_record(stored.clone()));
        let cache = Arc::new(InMemoryCache::new());
        let handler = GetRecordHandler::new(repo, cache);

        let result = handler
            .handle(query_for(&stored, UserId::new(), Role::Admin))
            .await
            .unwrap();

        assert_eq!(result.record, stored);
    }

    #[tokio::test]
    async fn undecodable_cache_entry_falls_back_to_the_store() {
        let owner = UserId::new();
        let stored = record(true, owner);
        let repo = Arc::new(MockRecordRepository::with_record(stored.clone()));
        let cache = Arc::new(InMemoryCache::new());
        cache
            .set(
                &data_key(stored.id()),
                &serde_json::json!({"not": "a record"}),
                300,
            )
            .await;
        let handler = GetRecordHandler::new(repo.clone(), cache.clone());

        let result = handler
            .handle(query_for(&stored, owner, Role::User))
            .await
            .unwrap();

        assert!(!result.from_cache);
        assert_eq!(result.record, stored);
        assert_eq!(repo.reads(), 1);
        // The bad entry was replaced by the fresh copy
        let cached = cache.get(&data_key(stored.id())).await.unwrap();
        assert_eq!(serde_json::from_value::<DataRecord>(cached).unwrap(), stored);
    }
}

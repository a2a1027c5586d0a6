// SPDX-FileCopyrightText: 2026 Chainscope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tiered cache store over SQLite.
//!
//! Lookups walk hot, warm, then cold. Expired rows are deleted when a lookup
//! meets them. A warm or cold hit for a hot-eligible query type also writes a
//! hot copy that keeps the original fetch time.

use std::collections::HashSet;
use std::str::FromStr;

use chainscope_config::model::CacheConfig;
use chainscope_core::{CacheKey, CacheTier, ChainscopeError, QueryType};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{OptionalExtension, Row, params, types::Type};
use tracing::debug;

use crate::database::{Database, map_tr_err};
use crate::entry::{CacheEntry, TierTtls};

/// Durable three-tier cache.
#[derive(Clone)]
pub struct CacheStore {
    db: Database,
    ttls: TierTtls,
    hot_eligible: HashSet<QueryType>,
}

/// What a lookup did besides returning a value.
struct Lookup {
    entry: Option<CacheEntry>,
    evicted: usize,
    promoted: bool,
}

impl CacheStore {
    /// Opens the store at `path`.
    ///
    /// Query types whose volatility default is the hot tier are hot-eligible
    /// until [`CacheStore::with_hot_eligible`] says otherwise.
    pub async fn open(path: &str, ttls: TierTtls) -> Result<Self, ChainscopeError> {
        let db = Database::open(path).await?;
        let hot_eligible = QueryType::ALL
            .into_iter()
            .filter(|qt| qt.default_tier() == CacheTier::Hot)
            .collect();
        Ok(Self {
            db,
            ttls,
            hot_eligible,
        })
    }

    /// Opens the store described by the `[cache]` section.
    ///
    /// Hot eligibility follows the configured write-through tier, so a tier
    /// override also changes which types are promoted.
    pub async fn from_config(config: &CacheConfig) -> Result<Self, ChainscopeError> {
        let store = Self::open(&config.path, TierTtls::from_config(config)).await?;
        let eligible = QueryType::ALL
            .into_iter()
            .filter(|qt| config.tier_for(*qt) == CacheTier::Hot);
        Ok(store.with_hot_eligible(eligible))
    }

    pub fn with_hot_eligible(mut self, types: impl IntoIterator<Item = QueryType>) -> Self {
        self.hot_eligible = types.into_iter().collect();
        self
    }

    pub fn ttls(&self) -> &TierTtls {
        &self.ttls
    }

    pub fn is_hot_eligible(&self, query_type: QueryType) -> bool {
        self.hot_eligible.contains(&query_type)
    }

    /// Returns the freshest valid entry for `key`, checking hot, warm, then cold.
    pub async fn get(&self, key: &CacheKey) -> Result<Option<CacheEntry>, ChainscopeError> {
        let canonical = key.as_str().to_string();
        let promote = self.is_hot_eligible(key.query_type());
        let ttls = self.ttls;
        let now = Utc::now();

        let lookup = self
            .db
            .connection()
            .call(move |conn| {
                let tx = conn.transaction()?;
                let rows = {
                    let mut stmt = tx.prepare(
                        "SELECT cache_key, tier, query_type, value, source, fetched_at, expires_at
                         FROM cache_entries WHERE cache_key = ?1",
                    )?;
                    let mapped = stmt.query_map(params![canonical], row_to_entry)?;
                    mapped.collect::<Result<Vec<_>, _>>()?
                };

                let mut lookup = Lookup {
                    entry: None,
                    evicted: 0,
                    promoted: false,
                };

                for tier in CacheTier::LOOKUP_ORDER {
                    let Some(entry) = rows.iter().find(|e| e.tier == tier) else {
                        continue;
                    };
                    if !entry.is_valid_at(now) {
                        tx.execute(
                            "DELETE FROM cache_entries WHERE cache_key = ?1 AND tier = ?2",
                            params![canonical, tier.to_string()],
                        )?;
                        lookup.evicted += 1;
                        continue;
                    }
                    if tier != CacheTier::Hot && promote {
                        // Written even when already past the hot TTL: the copy
                        // keeps the origin fetch time and the next read evicts it.
                        upsert(&tx, &entry.promoted(&ttls))?;
                        lookup.promoted = true;
                    }
                    lookup.entry = Some(entry.clone());
                    break;
                }

                tx.commit()?;
                Ok(lookup)
            })
            .await
            .map_err(map_tr_err)?;

        match &lookup.entry {
            Some(entry) => debug!(
                key = %key,
                tier = %entry.tier,
                promoted = lookup.promoted,
                evicted = lookup.evicted,
                "cache hit"
            ),
            None => debug!(key = %key, evicted = lookup.evicted, "cache miss"),
        }
        Ok(lookup.entry)
    }

    /// Stores `value` under `key` in `tier`, fetched now.
    ///
    /// Replaces every existing row for the key, whatever its tier.
    pub async fn put(
        &self,
        key: &CacheKey,
        value: serde_json::Value,
        tier: CacheTier,
        source: &str,
    ) -> Result<CacheEntry, ChainscopeError> {
        let entry = CacheEntry::new(key.clone(), value, tier, source, Utc::now(), &self.ttls);
        self.put_entry(&entry).await?;
        Ok(entry)
    }

    /// Stores a fully specified entry, replacing every existing row for its key.
    pub async fn put_entry(&self, entry: &CacheEntry) -> Result<(), ChainscopeError> {
        let row = entry.clone();
        self.db
            .connection()
            .call(move |conn| {
                let tx = conn.transaction()?;
                tx.execute(
                    "DELETE FROM cache_entries WHERE cache_key = ?1",
                    params![row.key.as_str()],
                )?;
                upsert(&tx, &row)?;
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;

        debug!(key = %entry.key, tier = %entry.tier, source = %entry.source, "cache put");
        Ok(())
    }

    /// Reads the row stored for `key` in one tier, expired or not, without side effects.
    pub async fn peek(
        &self,
        key: &CacheKey,
        tier: CacheTier,
    ) -> Result<Option<CacheEntry>, ChainscopeError> {
        let canonical = key.as_str().to_string();
        self.db
            .connection()
            .call(move |conn| {
                conn.query_row(
                    "SELECT cache_key, tier, query_type, value, source, fetched_at, expires_at
                     FROM cache_entries WHERE cache_key = ?1 AND tier = ?2",
                    params![canonical, tier.to_string()],
                    row_to_entry,
                )
                .optional()
            })
            .await
            .map_err(map_tr_err)
    }

    /// Removes every tier row for `key`. Returns whether anything was removed.
    pub async fn invalidate(&self, key: &CacheKey) -> Result<bool, ChainscopeError> {
        let canonical = key.as_str().to_string();
        let removed = self
            .db
            .connection()
            .call(move |conn| {
                let n = conn.execute(
                    "DELETE FROM cache_entries WHERE cache_key = ?1",
                    params![canonical],
                )?;
                Ok(n)
            })
            .await
            .map_err(map_tr_err)?;
        debug!(key = %key, removed, "cache invalidate");
        Ok(removed > 0)
    }

    /// Removes every entry.
    pub async fn clear(&self) -> Result<(), ChainscopeError> {
        self.db
            .connection()
            .call(|conn| {
                conn.execute("DELETE FROM cache_entries", [])?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!("cache cleared");
        Ok(())
    }

    /// Number of distinct keys with at least one stored row (expired rows included).
    pub async fn len(&self) -> Result<u64, ChainscopeError> {
        self.db
            .connection()
            .call(|conn| {
                let n: i64 = conn.query_row(
                    "SELECT COUNT(DISTINCT cache_key) FROM cache_entries",
                    [],
                    |row| row.get(0),
                )?;
                Ok(n)
            })
            .await
            .map_err(map_tr_err)
            .map(|n| u64::try_from(n).unwrap_or_default())
    }

    pub async fn is_empty(&self) -> Result<bool, ChainscopeError> {
        Ok(self.len().await? == 0)
    }

    /// Flushes the WAL into the main database file.
    pub async fn close(&self) -> Result<(), ChainscopeError> {
        self.db.checkpoint().await
    }
}

fn format_ts(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn conversion_err(
    idx: usize,
    e: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
}

fn parse_ts(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_err(idx, e))
}

fn row_to_entry(row: &Row<'_>) -> rusqlite::Result<CacheEntry> {
    let canonical: String = row.get(0)?;
    let tier: String = row.get(1)?;
    let query_type: String = row.get(2)?;
    let value: String = row.get(3)?;
    let fetched_at: String = row.get(5)?;
    let expires_at: String = row.get(6)?;

    Ok(CacheEntry {
        key: CacheKey::from_parts(
            QueryType::from_str(&query_type).map_err(|e| conversion_err(2, e))?,
            canonical,
        ),
        tier: CacheTier::from_str(&tier).map_err(|e| conversion_err(1, e))?,
        value: serde_json::from_str(&value).map_err(|e| conversion_err(3, e))?,
        source: row.get(4)?,
        fetched_at: parse_ts(5, &fetched_at)?,
        expires_at: parse_ts(6, &expires_at)?,
    })
}

fn upsert(conn: &rusqlite::Connection, entry: &CacheEntry) -> rusqlite::Result<()> {
    let value = serde_json::to_string(&entry.value)
        .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
    conn.execute(
        "INSERT INTO cache_entries
             (cache_key, tier, query_type, value, source, fetched_at, expires_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT (cache_key, tier) DO UPDATE SET
             query_type = excluded.query_type,
             value = excluded.value,
             source = excluded.source,
             fetched_at = excluded.fetched_at,
             expires_at = excluded.expires_at",
        params![
            entry.key.as_str(),
            entry.tier.to_string(),
            entry.key.query_type().to_string(),
            value,
            entry.source,
            format_ts(&entry.fetched_at),
            format_ts(&entry.expires_at),
        ],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainscope_core::QueryRequest;
    use chrono::TimeDelta;

    async fn setup() -> (CacheStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.db");
        let store = CacheStore::open(path.to_str().unwrap(), TierTtls::default())
            .await
            .unwrap();
        (store, dir)
    }

    fn price_key() -> CacheKey {
        QueryRequest::new(QueryType::TokenPrice)
            .with_param("ids", vec!["bitcoin"])
            .cache_key()
    }

    #[tokio::test]
    async fn hot_put_reads_back_unchanged() {
        let (store, _dir) = setup().await;
        let key = price_key();
        let value = serde_json::json!({"bitcoin": {"usd": 64000.5}});
        let written = store
            .put(&key, value.clone(), CacheTier::Hot, "coingecko")
            .await
            .unwrap();

        let read = store.get(&key).await.unwrap().expect("hit");
        assert_eq!(read, written);
        assert_eq!(read.value, value);
    }

    #[tokio::test]
    async fn expired_entry_is_a_miss_and_evicted() {
        let (store, _dir) = setup().await;
        let key = price_key();
        let stale = CacheEntry::new(
            key.clone(),
            serde_json::json!(1),
            CacheTier::Hot,
            "coingecko",
            Utc::now() - TimeDelta::seconds(61),
            store.ttls(),
        );
        store.put_entry(&stale).await.unwrap();
        assert_eq!(store.len().await.unwrap(), 1);

        assert!(store.get(&key).await.unwrap().is_none());
        assert_eq!(store.len().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn warm_hit_promotes_with_original_fetch_time() {
        let (store, _dir) = setup().await;
        let key = price_key();
        let fetched = Utc::now() - TimeDelta::seconds(20);
        let warm = CacheEntry::new(
            key.clone(),
            serde_json::json!({"v": 1}),
            CacheTier::Warm,
            "defillama",
            fetched,
            store.ttls(),
        );
        store.put_entry(&warm).await.unwrap();

        let hit = store.get(&key).await.unwrap().expect("hit");
        assert_eq!(hit.tier, CacheTier::Warm);

        let hot = store.peek(&key, CacheTier::Hot).await.unwrap().expect("promoted");
        assert_eq!(hot.fetched_at, fetched);
        assert_eq!(hot.expires_at, fetched + TimeDelta::seconds(60));
        // The warm row is kept, so promotion never shortens the data's lifetime.
        assert!(store.peek(&key, CacheTier::Warm).await.unwrap().is_some());

        let again = store.get(&key).await.unwrap().expect("hit");
        assert_eq!(again.tier, CacheTier::Hot);
    }

    #[tokio::test]
    async fn late_promotion_keeps_origin_fetch_time() {
        let (store, _dir) = setup().await;
        let key = price_key();
        let fetched = Utc::now() - TimeDelta::seconds(200);
        let warm = CacheEntry::new(
            key.clone(),
            serde_json::json!({"v": 1}),
            CacheTier::Warm,
            "defillama",
            fetched,
            store.ttls(),
        );
        store.put_entry(&warm).await.unwrap();

        let hit = store.get(&key).await.unwrap().expect("warm entry still valid");
        assert_eq!(hit.tier, CacheTier::Warm);
        assert_eq!(hit.fetched_at, fetched);

        let hot = store.peek(&key, CacheTier::Hot).await.unwrap().expect("promoted");
        assert_eq!(hot.fetched_at, fetched);
        assert_eq!(hot.expires_at, fetched + TimeDelta::seconds(60));

        // The stale hot copy is evicted and the warm row still answers.
        let again = store.get(&key).await.unwrap().expect("hit");
        assert_eq!(again.tier, CacheTier::Warm);
        assert_eq!(again.fetched_at, fetched);
    }

    #[tokio::test]
    async fn non_eligible_types_are_not_promoted() {
        let (store, _dir) = setup().await;
        let key = QueryRequest::new(QueryType::ProtocolTvl)
            .with_param("protocol", "aave")
            .cache_key();
        store
            .put(&key, serde_json::json!({"tvl": 1}), CacheTier::Warm, "defillama")
            .await
            .unwrap();
        store.get(&key).await.unwrap().expect("hit");
        assert!(store.peek(&key, CacheTier::Hot).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn put_replaces_rows_in_every_tier() {
        let (store, _dir) = setup().await;
        let key = price_key();
        store
            .put(&key, serde_json::json!(1), CacheTier::Cold, "a")
            .await
            .unwrap();
        store
            .put(&key, serde_json::json!(2), CacheTier::Hot, "b")
            .await
            .unwrap();

        assert!(store.peek(&key, CacheTier::Cold).await.unwrap().is_none());
        let hit = store.get(&key).await.unwrap().unwrap();
        assert_eq!(hit.value, serde_json::json!(2));
        assert_eq!(hit.source, "b");
    }

    #[tokio::test]
    async fn invalidate_and_clear() {
        let (store, _dir) = setup().await;
        let key = price_key();
        store
            .put(&key, serde_json::json!(1), CacheTier::Hot, "a")
            .await
            .unwrap();
        assert!(store.invalidate(&key).await.unwrap());
        assert!(!store.invalidate(&key).await.unwrap());
        assert!(store.get(&key).await.unwrap().is_none());

        store
            .put(&key, serde_json::json!(1), CacheTier::Hot, "a")
            .await
            .unwrap();
        store.clear().await.unwrap();
        assert!(store.is_empty().await.unwrap());
    }

    #[tokio::test]
    async fn concurrent_puts_leave_one_complete_row() {
        let (store, _dir) = setup().await;
        let key = price_key();
        let mut handles = Vec::new();
        for i in 0..16 {
            let store = store.clone();
            let key = key.clone();
            handles.push(tokio::spawn(async move {
                store
                    .put(&key, serde_json::json!({"writer": i}), CacheTier::Hot, "p")
                    .await
                    .unwrap();
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        let hit = store.get(&key).await.unwrap().unwrap();
        assert!(hit.value["writer"].is_number());
        assert_eq!(store.len().await.unwrap(), 1);
    }
}

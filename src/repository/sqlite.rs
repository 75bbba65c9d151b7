//! SQLite-backed repositories.
//!
//! One store owns both logical collections: petitions keyed by number and
//! subscribers keyed by their delivery-channel id. Every write that matters
//! for correctness is a single statement, so per-record atomicity comes from
//! SQLite itself and overlapping runs converge instead of corrupting state.

use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tokio::sync::Mutex;

use crate::error::StoreError;
use crate::models::{Petition, PetitionDetail, PetitionListing, Subscriber};
use crate::repository::{PetitionRepository, SubscriberRepository};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS petitions (
    number       TEXT PRIMARY KEY,
    tag          TEXT NOT NULL DEFAULT '',
    title        TEXT NOT NULL DEFAULT '',
    status       TEXT NOT NULL DEFAULT '',
    vote_count   TEXT NOT NULL DEFAULT '',
    link         TEXT NOT NULL DEFAULT '',
    published_at TEXT NOT NULL DEFAULT '',
    answered_at  TEXT,
    countdown    TEXT,
    creator      TEXT,
    body_text    TEXT,
    created_at   TEXT NOT NULL,
    updated_at   TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_petitions_status ON petitions(status);

CREATE TABLE IF NOT EXISTS subscribers (
    id        INTEGER PRIMARY KEY,
    petitions TEXT NOT NULL DEFAULT '[]',
    is_admin  INTEGER NOT NULL DEFAULT 0
);
";

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        Self::from_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Seed a subscriber. Subscribers are normally created by the bot
    /// layer; this exists for tooling and tests.
    pub async fn add_subscriber(&self, subscriber: &Subscriber) -> Result<(), StoreError> {
        let favorites = serde_json::to_string(&subscriber.petitions)
            .map_err(|err| StoreError::Corrupt(err.to_string()))?;
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT OR REPLACE INTO subscribers (id, petitions, is_admin) VALUES (?1, ?2, ?3)",
            params![subscriber.id, favorites, subscriber.is_admin],
        )?;
        Ok(())
    }
}

fn parse_timestamp(row: &Row<'_>, index: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(index)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|err| {
            rusqlite::Error::FromSqlConversionFailure(
                index,
                rusqlite::types::Type::Text,
                Box::new(err),
            )
        })
}

fn row_to_petition(row: &Row<'_>) -> rusqlite::Result<Petition> {
    Ok(Petition {
        number: row.get(0)?,
        tag: row.get(1)?,
        title: row.get(2)?,
        status: row.get(3)?,
        vote_count: row.get(4)?,
        link: row.get(5)?,
        published_at: row.get(6)?,
        answered_at: row.get(7)?,
        countdown: row.get(8)?,
        creator: row.get(9)?,
        body_text: row.get(10)?,
        created_at: parse_timestamp(row, 11)?,
        updated_at: parse_timestamp(row, 12)?,
    })
}

const PETITION_COLUMNS: &str = "number, tag, title, status, vote_count, link, published_at, \
                                answered_at, countdown, creator, body_text, created_at, updated_at";

#[async_trait]
impl PetitionRepository for SqliteStore {
    async fn upsert_batch(&self, records: &[PetitionListing]) -> Result<Vec<String>, StoreError> {
        let conn = self.conn.lock().await;
        let mut created = Vec::new();

        for listing in records {
            let now = Utc::now().to_rfc3339();

            // The insert itself decides whether the record is new: on a
            // number collision it changes nothing and reports zero rows,
            // and the listing fields are refreshed by the follow-up update.
            let inserted = conn.execute(
                "INSERT INTO petitions (number, tag, title, status, vote_count, link, \
                 published_at, answered_at, countdown, created_at, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10) \
                 ON CONFLICT(number) DO NOTHING",
                params![
                    listing.number,
                    listing.tag,
                    listing.title,
                    listing.status,
                    listing.vote_count,
                    listing.link,
                    listing.published_at,
                    listing.answered_at,
                    listing.countdown,
                    now,
                ],
            )?;

            if inserted > 0 {
                created.push(listing.number.clone());
            } else {
                conn.execute(
                    "UPDATE petitions SET tag = ?2, title = ?3, status = ?4, vote_count = ?5, \
                     link = ?6, published_at = ?7, answered_at = ?8, countdown = ?9, \
                     updated_at = ?10 WHERE number = ?1",
                    params![
                        listing.number,
                        listing.tag,
                        listing.title,
                        listing.status,
                        listing.vote_count,
                        listing.link,
                        listing.published_at,
                        listing.answered_at,
                        listing.countdown,
                        now,
                    ],
                )?;
            }
        }

        Ok(created)
    }

    async fn merge_details(
        &self,
        number: &str,
        detail: &PetitionDetail,
    ) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        // Additive merge in one statement: empty incoming fields keep the
        // stored value.
        conn.execute(
            "UPDATE petitions SET \
             creator   = CASE WHEN ?2 = '' THEN creator   ELSE ?2 END, \
             body_text = CASE WHEN ?3 = '' THEN body_text ELSE ?3 END, \
             updated_at = ?4 \
             WHERE number = ?1",
            params![
                number,
                detail.creator,
                detail.body_text,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    async fn get(&self, number: &str) -> Result<Option<Petition>, StoreError> {
        let conn = self.conn.lock().await;
        let petition = conn
            .query_row(
                &format!("SELECT {PETITION_COLUMNS} FROM petitions WHERE number = ?1"),
                params![number],
                row_to_petition,
            )
            .optional()?;
        Ok(petition)
    }

    async fn missing_details(&self, status_label: &str) -> Result<Vec<Petition>, StoreError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(&format!(
            "SELECT {PETITION_COLUMNS} FROM petitions \
             WHERE status = ?1 AND (creator IS NULL OR creator = '' \
             OR body_text IS NULL OR body_text = '') \
             ORDER BY number"
        ))?;
        let petitions = stmt
            .query_map(params![status_label], row_to_petition)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(petitions)
    }
}

#[async_trait]
impl SubscriberRepository for SqliteStore {
    async fn list(&self) -> Result<Vec<Subscriber>, StoreError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare("SELECT id, petitions, is_admin FROM subscribers ORDER BY id")?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, bool>(2)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter()
            .map(|(id, favorites, is_admin)| {
                let petitions = serde_json::from_str(&favorites)
                    .map_err(|err| StoreError::Corrupt(err.to_string()))?;
                Ok(Subscriber {
                    id,
                    petitions,
                    is_admin,
                })
            })
            .collect()
    }

    async fn remove(&self, id: i64) -> Result<bool, StoreError> {
        let conn = self.conn.lock().await;
        let deleted = conn.execute("DELETE FROM subscribers WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(number: &str, title: &str) -> PetitionListing {
        PetitionListing {
            number: number.to_string(),
            tag: "ecology".to_string(),
            title: title.to_string(),
            status: "collecting".to_string(),
            vote_count: "100".to_string(),
            link: format!("https://example.test/petition/{number}"),
            published_at: "01.01.2024".to_string(),
            answered_at: None,
            countdown: Some("30 days left".to_string()),
        }
    }

    #[tokio::test]
    async fn test_upsert_batch_reports_only_inserts() {
        let store = SqliteStore::open_in_memory().unwrap();

        let created = store
            .upsert_batch(&[listing("001", "A"), listing("002", "B")])
            .await
            .unwrap();
        assert_eq!(created, vec!["001", "002"]);

        let created = store
            .upsert_batch(&[listing("001", "A"), listing("003", "C")])
            .await
            .unwrap();
        assert_eq!(created, vec!["003"]);
    }

    #[tokio::test]
    async fn test_rescrape_keeps_created_at_and_details() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.upsert_batch(&[listing("001", "A")]).await.unwrap();
        store
            .merge_details(
                "001",
                &PetitionDetail {
                    creator: "Someone".to_string(),
                    body_text: "Body".to_string(),
                },
            )
            .await
            .unwrap();
        let before = store.get("001").await.unwrap().unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        store.upsert_batch(&[listing("001", "B")]).await.unwrap();

        let after = store.get("001").await.unwrap().unwrap();
        assert_eq!(after.title, "B");
        assert_eq!(after.creator.as_deref(), Some("Someone"));
        assert_eq!(after.body_text.as_deref(), Some("Body"));
        assert_eq!(after.created_at, before.created_at);
        assert!(after.updated_at > before.updated_at);
    }

    #[tokio::test]
    async fn test_merge_details_is_additive() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.upsert_batch(&[listing("001", "A")]).await.unwrap();
        store
            .merge_details(
                "001",
                &PetitionDetail {
                    creator: "Someone".to_string(),
                    body_text: "Body".to_string(),
                },
            )
            .await
            .unwrap();

        store
            .merge_details(
                "001",
                &PetitionDetail {
                    creator: String::new(),
                    body_text: "Updated body".to_string(),
                },
            )
            .await
            .unwrap();

        let petition = store.get("001").await.unwrap().unwrap();
        assert_eq!(petition.creator.as_deref(), Some("Someone"));
        assert_eq!(petition.body_text.as_deref(), Some("Updated body"));
    }

    #[tokio::test]
    async fn test_missing_details_predicate() {
        let store = SqliteStore::open_in_memory().unwrap();
        let mut answered = listing("002", "B");
        answered.status = "answered".to_string();
        store
            .upsert_batch(&[listing("001", "A"), answered, listing("003", "C")])
            .await
            .unwrap();
        store
            .merge_details(
                "003",
                &PetitionDetail {
                    creator: "Someone".to_string(),
                    body_text: "Body".to_string(),
                },
            )
            .await
            .unwrap();

        let pending = store.missing_details("collecting").await.unwrap();
        let numbers: Vec<&str> = pending.iter().map(|p| p.number.as_str()).collect();
        assert_eq!(numbers, vec!["001"]);
    }

    #[tokio::test]
    async fn test_subscribers_round_trip() {
        let store = SqliteStore::open_in_memory().unwrap();
        let mut subscriber = Subscriber::new(10);
        subscriber.petitions.insert("22/001".to_string());
        subscriber.is_admin = true;
        store.add_subscriber(&subscriber).await.unwrap();
        store.add_subscriber(&Subscriber::new(20)).await.unwrap();

        let listed = store.list().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0], subscriber);

        assert!(store.remove(10).await.unwrap());
        assert!(!store.remove(10).await.unwrap());
        assert_eq!(store.list().await.unwrap().len(), 1);
    }
}

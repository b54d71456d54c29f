//! libSQL database for the onboarding backend — users table plus the page
//! configuration rows.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use libsql::{Connection, Database as LibSqlDatabase, params};
use tracing::info;
use uuid::Uuid;

use crate::error::StoreError;
use crate::onboarding::model::{PageConfiguration, UpdateRequest, UserRecord};

/// libSQL backend for the REST server.
///
/// A single connection is reused for all operations; `libsql::Connection`
/// is `Send + Sync` and safe for concurrent async use.
pub struct ServerDb {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl ServerDb {
    /// Open (or create) a local database file, run the schema, and seed the
    /// default page configuration when none exists.
    pub async fn new_local(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| StoreError::Query(format!("Failed to open database: {e}")))?;
        let conn = db
            .connect()
            .map_err(|e| StoreError::Query(format!("Failed to create connection: {e}")))?;

        let backend = Self {
            db: Arc::new(db),
            conn,
        };
        backend.init_schema().await?;
        info!(path = %path.display(), "Database opened");
        Ok(backend)
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory() -> Result<Self, StoreError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| StoreError::Query(format!("Failed to create in-memory database: {e}")))?;
        let conn = db
            .connect()
            .map_err(|e| StoreError::Query(format!("Failed to create connection: {e}")))?;

        let backend = Self {
            db: Arc::new(db),
            conn,
        };
        backend.init_schema().await?;
        Ok(backend)
    }

    fn conn(&self) -> &Connection {
        &self.conn
    }

    async fn init_schema(&self) -> Result<(), StoreError> {
        self.conn()
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS users (
                    id TEXT PRIMARY KEY,
                    email TEXT NOT NULL UNIQUE,
                    password TEXT,
                    current_step INTEGER NOT NULL DEFAULT 1,
                    about_me TEXT,
                    street_address TEXT,
                    city TEXT,
                    state TEXT,
                    zip TEXT,
                    birthdate TEXT,
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS page_components (
                    page INTEGER NOT NULL,
                    component TEXT NOT NULL,
                    position INTEGER NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_page_components_page ON page_components(page);",
            )
            .await
            .map_err(|e| StoreError::Query(format!("Schema init failed: {e}")))?;

        self.seed_default_configuration().await
    }

    /// First start gets the default document: about_me and birthdate on
    /// page 2, address on page 3.
    async fn seed_default_configuration(&self) -> Result<(), StoreError> {
        let mut rows = self
            .conn()
            .query("SELECT COUNT(*) FROM page_components", ())
            .await
            .map_err(query_err)?;
        let count: i64 = match rows.next().await.map_err(query_err)? {
            Some(row) => row.get(0).map_err(query_err)?,
            None => 0,
        };
        if count == 0 {
            self.write_configuration(&PageConfiguration::default())
                .await?;
            info!("Seeded default page configuration");
        }
        Ok(())
    }

    // ── Users ───────────────────────────────────────────────────────

    /// Register a new user. Fails with `Conflict` when the email is taken.
    pub async fn insert_user(&self, email: &str, password: &str) -> Result<UserRecord, StoreError> {
        if self.get_user(email).await?.is_some() {
            return Err(StoreError::Conflict {
                email: email.to_string(),
            });
        }

        let now = Utc::now();
        let user = UserRecord {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            password: Some(password.to_string()),
            current_step: 2,
            about_me: None,
            street_address: None,
            city: None,
            state: None,
            zip: None,
            birthdate: None,
            created_at: now,
            updated_at: now,
        };

        self.conn()
            .execute(
                "INSERT INTO users (id, email, password, current_step, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    user.id.clone(),
                    user.email.clone(),
                    password,
                    user.current_step as i64,
                    now.to_rfc3339(),
                    now.to_rfc3339(),
                ],
            )
            .await
            .map_err(query_err)?;
        Ok(user)
    }

    pub async fn get_user(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT id, email, password, current_step, about_me, street_address,
                        city, state, zip, birthdate, created_at, updated_at
                 FROM users WHERE email = ?1",
                params![email],
            )
            .await
            .map_err(query_err)?;
        match rows.next().await.map_err(query_err)? {
            Some(row) => Ok(Some(row_to_user(&row).map_err(query_err)?)),
            None => Ok(None),
        }
    }

    /// Merge-update: only fields present in the request are overwritten.
    /// Free-text fields are sanitized before they are stored.
    pub async fn update_user(
        &self,
        email: &str,
        update: &UpdateRequest,
    ) -> Result<UserRecord, StoreError> {
        let mut user = self
            .get_user(email)
            .await?
            .ok_or_else(|| StoreError::NotFound {
                email: email.to_string(),
            })?;

        let mut profile = update.profile.clone();
        profile.about_me = profile.about_me.map(|v| sanitize(&v));
        profile.street_address = profile.street_address.map(|v| sanitize(&v));
        profile.city = profile.city.map(|v| sanitize(&v));
        profile.state = profile.state.map(|v| sanitize(&v));
        user.apply(&profile);
        if let Some(step) = update.current_step {
            user.current_step = step;
        }

        self.conn()
            .execute(
                "UPDATE users SET current_step = ?1, about_me = ?2, street_address = ?3,
                        city = ?4, state = ?5, zip = ?6, birthdate = ?7, updated_at = ?8
                 WHERE email = ?9",
                params![
                    user.current_step as i64,
                    opt_text(user.about_me.as_deref()),
                    opt_text(user.street_address.as_deref()),
                    opt_text(user.city.as_deref()),
                    opt_text(user.state.as_deref()),
                    opt_text(user.zip.as_deref()),
                    opt_text(
                        user.birthdate
                            .map(|d| d.format("%Y-%m-%d").to_string())
                            .as_deref()
                    ),
                    user.updated_at.to_rfc3339(),
                    email,
                ],
            )
            .await
            .map_err(query_err)?;
        Ok(user)
    }

    pub async fn list_users(&self) -> Result<Vec<UserRecord>, StoreError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT id, email, password, current_step, about_me, street_address,
                        city, state, zip, birthdate, created_at, updated_at
                 FROM users ORDER BY created_at",
                (),
            )
            .await
            .map_err(query_err)?;
        let mut users = Vec::new();
        while let Some(row) = rows.next().await.map_err(query_err)? {
            users.push(row_to_user(&row).map_err(query_err)?);
        }
        Ok(users)
    }

    // ── Page configuration ──────────────────────────────────────────

    pub async fn get_configuration(&self) -> Result<PageConfiguration, StoreError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT page, component FROM page_components ORDER BY page, position",
                (),
            )
            .await
            .map_err(query_err)?;
        let mut config = PageConfiguration {
            page2_components: Vec::new(),
            page3_components: Vec::new(),
        };
        while let Some(row) = rows.next().await.map_err(query_err)? {
            let page: i64 = row.get(0).map_err(query_err)?;
            let component: String = row.get(1).map_err(query_err)?;
            match page {
                2 => config.page2_components.push(component),
                3 => config.page3_components.push(component),
                _ => {}
            }
        }
        Ok(config)
    }

    /// Replace the whole configuration document.
    pub async fn write_configuration(
        &self,
        config: &PageConfiguration,
    ) -> Result<(), StoreError> {
        let conn = self.conn();
        conn.execute("DELETE FROM page_components", ())
            .await
            .map_err(query_err)?;
        for (position, component) in config.page2_components.iter().enumerate() {
            conn.execute(
                "INSERT INTO page_components (page, component, position) VALUES (2, ?1, ?2)",
                params![component.as_str(), position as i64],
            )
            .await
            .map_err(query_err)?;
        }
        for (position, component) in config.page3_components.iter().enumerate() {
            conn.execute(
                "INSERT INTO page_components (page, component, position) VALUES (3, ?1, ?2)",
                params![component.as_str(), position as i64],
            )
            .await
            .map_err(query_err)?;
        }
        Ok(())
    }
}

fn query_err(e: impl std::fmt::Display) -> StoreError {
    StoreError::Query(e.to_string())
}

/// Convert `Option<&str>` to a libsql value.
fn opt_text(s: Option<&str>) -> libsql::Value {
    match s {
        Some(s) => libsql::Value::Text(s.to_string()),
        None => libsql::Value::Null,
    }
}

/// Trim and strip markup-significant characters from free-text input.
fn sanitize(input: &str) -> String {
    input
        .trim()
        .chars()
        .filter(|c| !matches!(c, '<' | '>' | '"' | '\'' | '&'))
        .collect()
}

/// Parse an RFC 3339 datetime string (our canonical write format).
fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Map a row to a UserRecord.
///
/// Column order: 0:id, 1:email, 2:password, 3:current_step, 4:about_me,
/// 5:street_address, 6:city, 7:state, 8:zip, 9:birthdate, 10:created_at,
/// 11:updated_at.
fn row_to_user(row: &libsql::Row) -> Result<UserRecord, libsql::Error> {
    let current_step: i64 = row.get(3)?;
    let birthdate_str: Option<String> = row.get(9).ok();
    let created_str: String = row.get(10)?;
    let updated_str: String = row.get(11)?;

    Ok(UserRecord {
        id: row.get(0)?,
        email: row.get(1)?,
        password: row.get(2).ok(),
        current_step: current_step as u8,
        about_me: row.get(4).ok(),
        street_address: row.get(5).ok(),
        city: row.get(6).ok(),
        state: row.get(7).ok(),
        zip: row.get(8).ok(),
        birthdate: birthdate_str
            .and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()),
        created_at: parse_datetime(&created_str),
        updated_at: parse_datetime(&updated_str),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::onboarding::model::ProfileUpdate;

    #[tokio::test]
    async fn register_then_lookup() {
        let db = ServerDb::new_memory().await.unwrap();
        let created = db.insert_user("a@b.com", "secret1").await.unwrap();
        assert_eq!(created.current_step, 2);

        let found = db.get_user("a@b.com").await.unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert_eq!(found.password.as_deref(), Some("secret1"));
        assert!(db.get_user("missing@b.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let db = ServerDb::new_memory().await.unwrap();
        db.insert_user("a@b.com", "secret1").await.unwrap();
        let err = db.insert_user("a@b.com", "other").await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }));
    }

    #[tokio::test]
    async fn update_merges_and_sanitizes() {
        let db = ServerDb::new_memory().await.unwrap();
        db.insert_user("a@b.com", "secret1").await.unwrap();

        let update = UpdateRequest {
            profile: ProfileUpdate {
                about_me: Some("  <b>hi</b> ".to_string()),
                zip: Some("12345".to_string()),
                ..Default::default()
            },
            current_step: Some(3),
        };
        let updated = db.update_user("a@b.com", &update).await.unwrap();
        assert_eq!(updated.about_me.as_deref(), Some("bhi/b"));
        assert_eq!(updated.zip.as_deref(), Some("12345"));
        assert_eq!(updated.current_step, 3);

        // Second update leaves untouched fields in place
        let update = UpdateRequest {
            profile: ProfileUpdate {
                city: Some("Springfield".to_string()),
                ..Default::default()
            },
            current_step: Some(4),
        };
        let updated = db.update_user("a@b.com", &update).await.unwrap();
        assert_eq!(updated.zip.as_deref(), Some("12345"));
        assert_eq!(updated.city.as_deref(), Some("Springfield"));
        assert_eq!(updated.current_step, 4);
    }

    #[tokio::test]
    async fn update_unknown_user_is_not_found() {
        let db = ServerDb::new_memory().await.unwrap();
        let err = db
            .update_user("missing@b.com", &UpdateRequest {
                profile: ProfileUpdate::default(),
                current_step: Some(3),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn configuration_is_seeded_and_replaceable() {
        let db = ServerDb::new_memory().await.unwrap();
        let config = db.get_configuration().await.unwrap();
        assert_eq!(config, PageConfiguration::default());

        let replacement = PageConfiguration {
            page2_components: vec!["address".to_string()],
            page3_components: vec!["about_me".to_string(), "birthdate".to_string()],
        };
        db.write_configuration(&replacement).await.unwrap();
        assert_eq!(db.get_configuration().await.unwrap(), replacement);
    }

    #[test]
    fn sanitize_strips_markup_characters() {
        assert_eq!(sanitize("  plain text  "), "plain text");
        assert_eq!(sanitize("<script>\"x\" & 'y'</script>"), "scriptx  y/script");
    }
}

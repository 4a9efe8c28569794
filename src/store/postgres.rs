use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use sqlx::{FromRow, PgPool, types::Json};

use super::{ProfileStore, StoreError, StoredProfile};
use crate::models::profile::UserProfile;

const CREATE_COLLECTION: &str = r#"
    CREATE TABLE IF NOT EXISTS user_profiles (
        username TEXT PRIMARY KEY,
        document JSONB NOT NULL,
        version BIGINT NOT NULL DEFAULT 1,
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
"#;

#[derive(Debug, FromRow)]
struct ProfileRow {
    document: Json<Value>,
    version: i64,
}

impl ProfileRow {
    /// Documents that no longer match [`UserProfile`] are salvaged so the
    /// next update can rewrite them; only non-object documents fail.
    fn decode(self, username: &str) -> Result<StoredProfile, StoreError> {
        let profile = match UserProfile::deserialize(&self.document.0) {
            Ok(profile) => profile,
            Err(source) => match self.document.0 {
                Value::Object(document) => {
                    tracing::warn!(
                        "Stored profile {} is malformed ({}), salvaging readable fields",
                        username,
                        source
                    );
                    UserProfile::salvage(username, document)
                }
                _ => {
                    return Err(StoreError::Decode {
                        username: username.to_string(),
                        source,
                    });
                }
            },
        };

        Ok(StoredProfile {
            profile,
            version: self.version,
        })
    }
}

/// Profile documents stored as JSONB rows in Postgres
#[derive(Clone)]
pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the backing table if it is missing.
    pub async fn ensure_collection(&self) -> Result<(), StoreError> {
        sqlx::query(CREATE_COLLECTION).execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn get(&self, username: &str) -> Result<Option<StoredProfile>, StoreError> {
        let row = sqlx::query_as::<_, ProfileRow>(
            "SELECT document, version FROM user_profiles WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| row.decode(username)).transpose()
    }

    async fn create(&self, profile: &UserProfile) -> Result<StoredProfile, StoreError> {
        let version = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO user_profiles (username, document)
            VALUES ($1, $2)
            ON CONFLICT (username) DO NOTHING
            RETURNING version
            "#,
        )
        .bind(&profile.username)
        .bind(Json(profile))
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::AlreadyExists(profile.username.clone()))?;

        Ok(StoredProfile {
            profile: profile.clone(),
            version,
        })
    }

    async fn replace(
        &self,
        profile: &UserProfile,
        expected_version: i64,
    ) -> Result<StoredProfile, StoreError> {
        let version = sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE user_profiles
            SET document = $2, version = version + 1, updated_at = NOW()
            WHERE username = $1 AND version = $3
            RETURNING version
            "#,
        )
        .bind(&profile.username)
        .bind(Json(profile))
        .bind(expected_version)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(version) = version {
            return Ok(StoredProfile {
                profile: profile.clone(),
                version,
            });
        }

        // Nothing matched: either the row is gone or someone else wrote first.
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM user_profiles WHERE username = $1)",
        )
        .bind(&profile.username)
        .fetch_one(&self.pool)
        .await?;

        if exists {
            Err(StoreError::VersionConflict {
                username: profile.username.clone(),
                expected: expected_version,
            })
        } else {
            Err(StoreError::NotFound(profile.username.clone()))
        }
    }

    async fn delete(&self, username: &str) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM user_profiles WHERE username = $1")
            .bind(username)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(username.to_string()));
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

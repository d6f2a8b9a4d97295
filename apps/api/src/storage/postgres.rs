use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::{Resume, ResumeRow, UserDetails};
use crate::storage::{ResumeStore, StoreError};

/// The user-details table holds one row with this id.
const USER_DETAILS_ID: i32 = 1;

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the tables if they do not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS resumes (
                id                UUID PRIMARY KEY,
                content           TEXT NOT NULL,
                title             TEXT NOT NULL DEFAULT '',
                position          TEXT,
                is_tailored       BOOLEAN NOT NULL DEFAULT FALSE,
                job_description   TEXT,
                tailored_response JSONB,
                created_at        TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS user_details (
                id        INTEGER PRIMARY KEY,
                name      TEXT NOT NULL DEFAULT '',
                address   TEXT NOT NULL DEFAULT '',
                phone     TEXT NOT NULL DEFAULT '',
                email     TEXT NOT NULL DEFAULT '',
                linkedin  TEXT NOT NULL DEFAULT '',
                portfolio TEXT NOT NULL DEFAULT ''
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        info!("Database schema ensured");
        Ok(())
    }
}

#[async_trait]
impl ResumeStore for PgStore {
    async fn save(&self, resume: Resume) -> Result<Uuid, StoreError> {
        let tailored = resume
            .tailored_response
            .as_ref()
            .map(serde_json::to_value)
            .transpose()?;

        sqlx::query(
            r#"
            INSERT INTO resumes
                (id, content, title, position, is_tailored, job_description, tailored_response, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(resume.id)
        .bind(&resume.content)
        .bind(&resume.title)
        .bind(&resume.position)
        .bind(resume.is_tailored)
        .bind(&resume.job_description)
        .bind(tailored)
        .bind(resume.created_at)
        .execute(&self.pool)
        .await?;

        Ok(resume.id)
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Resume>, StoreError> {
        let row = sqlx::query_as::<_, ResumeRow>("SELECT * FROM resumes WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Resume::try_from).transpose()?)
    }

    async fn get_all(&self) -> Result<Vec<Resume>, StoreError> {
        let rows = sqlx::query_as::<_, ResumeRow>("SELECT * FROM resumes ORDER BY created_at ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .into_iter()
            .map(Resume::try_from)
            .collect::<Result<Vec<_>, _>>()?)
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM resumes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn update_title(&self, id: Uuid, title: &str) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE resumes SET title = $2 WHERE id = $1")
            .bind(id)
            .bind(title)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    async fn save_user_details(&self, details: UserDetails) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO user_details (id, name, address, phone, email, linkedin, portfolio)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                address = EXCLUDED.address,
                phone = EXCLUDED.phone,
                email = EXCLUDED.email,
                linkedin = EXCLUDED.linkedin,
                portfolio = EXCLUDED.portfolio
            "#,
        )
        .bind(USER_DETAILS_ID)
        .bind(&details.name)
        .bind(&details.address)
        .bind(&details.phone)
        .bind(&details.email)
        .bind(&details.linkedin)
        .bind(&details.portfolio)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_user_details(&self) -> Result<Option<UserDetails>, StoreError> {
        Ok(sqlx::query_as::<_, UserDetails>(
            "SELECT name, address, phone, email, linkedin, portfolio FROM user_details WHERE id = $1",
        )
        .bind(USER_DETAILS_ID)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn is_empty(&self) -> Result<bool, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM resumes")
            .fetch_one(&self.pool)
            .await?;
        Ok(count == 0)
    }
}

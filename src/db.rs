//! Admin-curated tournament rows. Separate lifecycle from the live pipeline:
//! created, edited, and deleted by admin actions against the
//! `curated_tournaments` table (id, name, organizer, format, prize,
//! participants, start_date, end_date, bracket_url, registration_url,
//! discord_url, featured).

use {
    sqlx::PgPool,
    crate::prelude::*,
};

const COLUMNS: &str = "id, name, organizer, format, prize, participants, start_date, end_date, bracket_url, registration_url, discord_url, featured";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, sqlx::FromRow)]
pub(crate) struct CuratedTournament {
    pub(crate) id: i64,
    pub(crate) name: String,
    pub(crate) organizer: String,
    pub(crate) format: String,
    pub(crate) prize: Option<String>,
    pub(crate) participants: i32,
    pub(crate) start_date: NaiveDate,
    pub(crate) end_date: NaiveDate,
    pub(crate) bracket_url: Option<String>,
    pub(crate) registration_url: Option<String>,
    pub(crate) discord_url: Option<String>,
    pub(crate) featured: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct NewCuratedTournament {
    pub(crate) name: String,
    pub(crate) organizer: String,
    pub(crate) format: String,
    pub(crate) prize: Option<String>,
    pub(crate) participants: i32,
    pub(crate) start_date: NaiveDate,
    pub(crate) end_date: NaiveDate,
    pub(crate) bracket_url: Option<String>,
    pub(crate) registration_url: Option<String>,
    pub(crate) discord_url: Option<String>,
    pub(crate) featured: bool,
}

impl CuratedTournament {
    pub(crate) async fn all(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!("SELECT {COLUMNS} FROM curated_tournaments ORDER BY start_date DESC"))
            .fetch_all(pool)
            .await
    }

    pub(crate) async fn from_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!("SELECT {COLUMNS} FROM curated_tournaments WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub(crate) async fn create(pool: &PgPool, new: &NewCuratedTournament) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!("
            INSERT INTO curated_tournaments (name, organizer, format, prize, participants, start_date, end_date, bracket_url, registration_url, discord_url, featured)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {COLUMNS}
        "))
            .bind(&new.name)
            .bind(&new.organizer)
            .bind(&new.format)
            .bind(&new.prize)
            .bind(new.participants)
            .bind(new.start_date)
            .bind(new.end_date)
            .bind(&new.bracket_url)
            .bind(&new.registration_url)
            .bind(&new.discord_url)
            .bind(new.featured)
            .fetch_one(pool)
            .await
    }

    pub(crate) async fn update(pool: &PgPool, id: i64, new: &NewCuratedTournament) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!("
            UPDATE curated_tournaments SET
                name = $2,
                organizer = $3,
                format = $4,
                prize = $5,
                participants = $6,
                start_date = $7,
                end_date = $8,
                bracket_url = $9,
                registration_url = $10,
                discord_url = $11,
                featured = $12
            WHERE id = $1
            RETURNING {COLUMNS}
        "))
            .bind(id)
            .bind(&new.name)
            .bind(&new.organizer)
            .bind(&new.format)
            .bind(&new.prize)
            .bind(new.participants)
            .bind(new.start_date)
            .bind(new.end_date)
            .bind(&new.bracket_url)
            .bind(&new.registration_url)
            .bind(&new.discord_url)
            .bind(new.featured)
            .fetch_optional(pool)
            .await
    }

    pub(crate) async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM curated_tournaments WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

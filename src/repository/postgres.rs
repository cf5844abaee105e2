use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{FromRow, PgPool, types::Json};
use uuid::Uuid;

use super::{Repository, StoreError, StoreResult};
use crate::models::{Account, EnrolledEntry, Poll, Progress, Roadmap, Section, Upcoming, VoteCount};

const ROADMAP_COLUMNS: &str = "id, title, description, image, section_ids, draft";
const SECTION_COLUMNS: &str = "id, title, description, learning_objectives, modules, images";

/// Raw `accounts` row; progress is attached separately.
#[derive(FromRow)]
struct AccountRow {
    id: Uuid,
    username: String,
    password_hash: String,
    is_admin: bool,
    points: i32,
}

#[derive(FromRow)]
struct ProgressRow {
    account_id: Uuid,
    roadmap_id: Uuid,
}

#[derive(FromRow)]
struct CompletionRow {
    account_id: Uuid,
    roadmap_id: Uuid,
    section_id: Uuid,
}

#[derive(FromRow)]
struct PollRow {
    id: Uuid,
    options: Vec<Uuid>,
}

#[derive(FromRow)]
struct PollVoteRow {
    poll_id: Uuid,
    option_id: Uuid,
    count: i64,
}

/// Maps Postgres failures onto the store taxonomy.
///
/// - `23505` (unique violation) becomes `Conflict` carrying the constraint name.
/// - `23503` (foreign key violation) becomes `NotFound`.
/// - Everything else is a `Backend` failure.
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            match db_err.code().as_deref() {
                Some("23505") => {
                    return StoreError::Conflict(db_err.constraint().unwrap_or("unknown").to_string());
                }
                Some("23503") => return StoreError::NotFound,
                _ => {}
            }
        }
        tracing::error!(error = %err, "Postgres error");
        StoreError::Backend(err.to_string())
    }
}

/// Keeps the caller's ordering for `WHERE id = ANY($1)` lookups.
fn order_by_ids<T>(ids: &[Uuid], rows: Vec<T>, id_of: impl Fn(&T) -> Uuid) -> Vec<T> {
    let mut by_id: HashMap<Uuid, T> = rows.into_iter().map(|row| (id_of(&row), row)).collect();
    ids.iter().filter_map(|id| by_id.remove(id)).collect()
}

/// PostgresRepository
///
/// `Repository` backed by PostgreSQL. Uniqueness rules live in the schema
/// (`migrations/`), so concurrent requests cannot slip past the engine-level checks.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Loads progress and completions for `rows` with two queries and stitches them
    /// onto the accounts, keeping enrollment and completion order.
    async fn attach_progress(&self, rows: Vec<AccountRow>) -> StoreResult<Vec<Account>> {
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();

        let progress = sqlx::query_as::<_, ProgressRow>(
            "SELECT account_id, roadmap_id FROM progress WHERE account_id = ANY($1) ORDER BY seq",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let completions = sqlx::query_as::<_, CompletionRow>(
            "SELECT account_id, roadmap_id, section_id FROM completed_sections WHERE account_id = ANY($1) ORDER BY seq",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut accounts: Vec<Account> = rows
            .into_iter()
            .map(|row| Account {
                id: row.id,
                username: row.username,
                password_hash: row.password_hash,
                is_admin: row.is_admin,
                points: row.points,
                progress: vec![],
            })
            .collect();

        for p in progress {
            if let Some(account) = accounts.iter_mut().find(|a| a.id == p.account_id) {
                account.progress.push(Progress {
                    roadmap_id: p.roadmap_id,
                    completed_sections: vec![],
                });
            }
        }
        for c in completions {
            let entry = accounts
                .iter_mut()
                .find(|a| a.id == c.account_id)
                .and_then(|a| a.progress.iter_mut().find(|p| p.roadmap_id == c.roadmap_id));
            if let Some(entry) = entry {
                entry.completed_sections.push(c.section_id);
            }
        }

        Ok(accounts)
    }

    async fn fetch_account_where(&self, clause: &str, bind: AccountKey<'_>) -> StoreResult<Option<Account>> {
        let sql = format!(
            "SELECT id, username, password_hash, is_admin, points FROM accounts WHERE {clause}"
        );
        let query = sqlx::query_as::<_, AccountRow>(&sql);
        let row = match bind {
            AccountKey::Id(id) => query.bind(id).fetch_optional(&self.pool).await?,
            AccountKey::Username(name) => query.bind(name).fetch_optional(&self.pool).await?,
        };
        match row {
            Some(row) => Ok(self.attach_progress(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    /// Joins `polls` rows with their vote tallies.
    async fn attach_votes(&self, rows: Vec<PollRow>) -> StoreResult<Vec<Poll>> {
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let votes = sqlx::query_as::<_, PollVoteRow>(
            "SELECT poll_id, option_id, count FROM poll_votes WHERE poll_id = ANY($1) ORDER BY seq",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut polls: Vec<Poll> = rows
            .into_iter()
            .map(|row| Poll {
                id: row.id,
                options: row.options,
                votes: vec![],
            })
            .collect();
        for vote in votes {
            if let Some(poll) = polls.iter_mut().find(|p| p.id == vote.poll_id) {
                poll.votes.push(VoteCount {
                    option_id: vote.option_id,
                    count: vote.count,
                });
            }
        }
        Ok(polls)
    }
}

enum AccountKey<'a> {
    Id(Uuid),
    Username(&'a str),
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn get_account(&self, id: Uuid) -> StoreResult<Option<Account>> {
        self.fetch_account_where("id = $1", AccountKey::Id(id)).await
    }

    async fn get_account_by_username(&self, username: &str) -> StoreResult<Option<Account>> {
        self.fetch_account_where("username = $1", AccountKey::Username(username))
            .await
    }

    async fn list_accounts(&self) -> StoreResult<Vec<Account>> {
        let rows = sqlx::query_as::<_, AccountRow>(
            "SELECT id, username, password_hash, is_admin, points FROM accounts ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await?;
        self.attach_progress(rows).await
    }

    /// create_account
    ///
    /// The `uq_accounts_username` index turns a concurrent duplicate registration into
    /// a `Conflict`.
    async fn create_account(&self, account: Account) -> StoreResult<Account> {
        sqlx::query(
            "INSERT INTO accounts (id, username, password_hash, is_admin, points) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(account.id)
        .bind(&account.username)
        .bind(&account.password_hash)
        .bind(account.is_admin)
        .bind(account.points)
        .execute(&self.pool)
        .await?;
        Ok(account)
    }

    async fn add_progress(&self, account_id: Uuid, roadmap_id: Uuid) -> StoreResult<()> {
        sqlx::query("INSERT INTO progress (account_id, roadmap_id) VALUES ($1, $2)")
            .bind(account_id)
            .bind(roadmap_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// complete_section
    ///
    /// Inserts the completion and credits the points inside one transaction. The
    /// completion's unique index rejects a concurrent duplicate before any points move.
    async fn complete_section(
        &self,
        account_id: Uuid,
        roadmap_id: Uuid,
        section_id: Uuid,
        reward: i32,
    ) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO completed_sections (account_id, roadmap_id, section_id) VALUES ($1, $2, $3)",
        )
        .bind(account_id)
        .bind(roadmap_id)
        .bind(section_id)
        .execute(&mut *tx)
        .await?;

        let updated = sqlx::query("UPDATE accounts SET points = points + $1 WHERE id = $2")
            .bind(reward)
            .bind(account_id)
            .execute(&mut *tx)
            .await?;
        if updated.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        tx.commit().await?;
        Ok(())
    }

    /// create_roadmap
    ///
    /// Sections first, then the roadmap, in one transaction: if any insert fails the
    /// transaction is dropped and rolled back, leaving no orphan sections behind.
    async fn create_roadmap(&self, roadmap: Roadmap, sections: Vec<Section>) -> StoreResult<Roadmap> {
        let mut tx = self.pool.begin().await?;

        for section in &sections {
            sqlx::query(
                "INSERT INTO sections (id, title, description, learning_objectives, modules, images) VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(section.id)
            .bind(&section.title)
            .bind(&section.description)
            .bind(&section.learning_objectives)
            .bind(Json(&section.modules))
            .bind(&section.images)
            .execute(&mut *tx)
            .await?;
        }

        let sql = format!(
            "INSERT INTO roadmaps (id, title, description, image, section_ids, draft) VALUES ($1, $2, $3, $4, $5, $6) RETURNING {ROADMAP_COLUMNS}"
        );
        let created = sqlx::query_as::<_, Roadmap>(&sql)
            .bind(roadmap.id)
            .bind(&roadmap.title)
            .bind(&roadmap.description)
            .bind(&roadmap.image)
            .bind(&roadmap.sections)
            .bind(roadmap.draft)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(created)
    }

    async fn get_roadmap(&self, id: Uuid) -> StoreResult<Option<Roadmap>> {
        let sql = format!("SELECT {ROADMAP_COLUMNS} FROM roadmaps WHERE id = $1");
        Ok(sqlx::query_as::<_, Roadmap>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_roadmaps(&self, include_drafts: bool) -> StoreResult<Vec<Roadmap>> {
        let sql = format!(
            "SELECT {ROADMAP_COLUMNS} FROM roadmaps WHERE ($1 OR draft = false) ORDER BY created_at"
        );
        Ok(sqlx::query_as::<_, Roadmap>(&sql)
            .bind(include_drafts)
            .fetch_all(&self.pool)
            .await?)
    }

    /// publish_roadmap
    ///
    /// Conditional update: only a row still in draft is touched, so of two concurrent
    /// publishes exactly one gets the row back.
    async fn publish_roadmap(&self, id: Uuid) -> StoreResult<Option<Roadmap>> {
        let sql = format!(
            "UPDATE roadmaps SET draft = false WHERE id = $1 AND draft = true RETURNING {ROADMAP_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Roadmap>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn get_sections(&self, ids: &[Uuid]) -> StoreResult<Vec<Section>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let sql = format!("SELECT {SECTION_COLUMNS} FROM sections WHERE id = ANY($1)");
        let rows = sqlx::query_as::<_, Section>(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(order_by_ids(ids, rows, |s| s.id))
    }

    async fn create_upcoming(&self, upcoming: Upcoming) -> StoreResult<Upcoming> {
        Ok(sqlx::query_as::<_, Upcoming>(
            "INSERT INTO upcoming (id, title, description, image) VALUES ($1, $2, $3, $4) RETURNING id, title, description, image",
        )
        .bind(upcoming.id)
        .bind(&upcoming.title)
        .bind(&upcoming.description)
        .bind(&upcoming.image)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn list_upcoming(&self) -> StoreResult<Vec<Upcoming>> {
        Ok(sqlx::query_as::<_, Upcoming>(
            "SELECT id, title, description, image FROM upcoming ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn get_upcoming_many(&self, ids: &[Uuid]) -> StoreResult<Vec<Upcoming>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let rows = sqlx::query_as::<_, Upcoming>(
            "SELECT id, title, description, image FROM upcoming WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(order_by_ids(ids, rows, |u| u.id))
    }

    /// create_poll
    ///
    /// The poll row and its zero-count seed entries are written in one transaction.
    async fn create_poll(&self, poll: Poll) -> StoreResult<Poll> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO polls (id, options) VALUES ($1, $2)")
            .bind(poll.id)
            .bind(&poll.options)
            .execute(&mut *tx)
            .await?;

        for vote in &poll.votes {
            sqlx::query("INSERT INTO poll_votes (poll_id, option_id, count) VALUES ($1, $2, $3)")
                .bind(poll.id)
                .bind(vote.option_id)
                .bind(vote.count)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(poll)
    }

    async fn get_poll(&self, id: Uuid) -> StoreResult<Option<Poll>> {
        let row = sqlx::query_as::<_, PollRow>("SELECT id, options FROM polls WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(row) => Ok(self.attach_votes(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn list_polls(&self) -> StoreResult<Vec<Poll>> {
        let rows = sqlx::query_as::<_, PollRow>("SELECT id, options FROM polls ORDER BY created_at")
            .fetch_all(&self.pool)
            .await?;
        self.attach_votes(rows).await
    }

    /// increment_vote
    ///
    /// Single-statement upsert: the database serialises concurrent votes on the same
    /// row, so no increment is lost. Inserts nothing when the poll does not exist.
    async fn increment_vote(&self, poll_id: Uuid, option_id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO poll_votes (poll_id, option_id, count)
            SELECT $1, $2, 1 WHERE EXISTS (SELECT 1 FROM polls WHERE id = $1)
            ON CONFLICT (poll_id, option_id) DO UPDATE SET count = poll_votes.count + 1
            "#,
        )
        .bind(poll_id)
        .bind(option_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn add_enrolled(&self, entry: EnrolledEntry) -> StoreResult<EnrolledEntry> {
        Ok(sqlx::query_as::<_, EnrolledEntry>(
            "INSERT INTO enrolled (id, name) VALUES ($1, $2) RETURNING id, name",
        )
        .bind(entry.id)
        .bind(&entry.name)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn get_enrolled(&self, name: &str) -> StoreResult<Option<EnrolledEntry>> {
        Ok(sqlx::query_as::<_, EnrolledEntry>("SELECT id, name FROM enrolled WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_enrolled(&self) -> StoreResult<Vec<EnrolledEntry>> {
        Ok(sqlx::query_as::<_, EnrolledEntry>("SELECT id, name FROM enrolled ORDER BY created_at")
            .fetch_all(&self.pool)
            .await?)
    }
}

//! Borrow ledger repository for database operations

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        book::BookSummary,
        borrow::{BorrowHistoryEntry, BorrowRecord},
        report::{ActiveMember, MostBorrowedBook},
    },
};

use super::{BorrowLedger, LoanOpening};

#[derive(Clone)]
pub struct BorrowsRepository {
    pool: Pool<Postgres>,
}

impl BorrowsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BorrowLedger for BorrowsRepository {
    async fn open(&self, user_id: Uuid, book_id: Uuid) -> AppResult<LoanOpening> {
        let mut tx = self.pool.begin().await?;

        // Conditional decrement: concurrent borrows of the last copy serialize on the row lock
        let taken = sqlx::query("UPDATE books SET copies = copies - 1 WHERE id = $1 AND copies > 0")
            .bind(book_id)
            .execute(&mut *tx)
            .await?;

        if taken.rows_affected() == 0 {
            let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE id = $1)")
                .bind(book_id)
                .fetch_one(&mut *tx)
                .await?;
            tx.rollback().await?;
            return Ok(if exists { LoanOpening::NoCopies } else { LoanOpening::NoSuchBook });
        }

        let record = BorrowRecord::open(user_id, book_id);
        sqlx::query(
            r#"
            INSERT INTO borrow_records (id, user_id, book_id, borrowed_at, returned_at)
            VALUES ($1, $2, $3, $4, NULL)
            "#,
        )
        .bind(record.id)
        .bind(record.user_id)
        .bind(record.book_id)
        .bind(record.borrowed_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(LoanOpening::Opened(record))
    }

    async fn close_latest(&self, user_id: Uuid, book_id: Uuid) -> AppResult<Option<BorrowRecord>> {
        let mut tx = self.pool.begin().await?;

        let record = sqlx::query_as::<_, BorrowRecord>(
            r#"
            UPDATE borrow_records SET returned_at = $3
            WHERE id = (
                SELECT id FROM borrow_records
                WHERE user_id = $1 AND book_id = $2 AND returned_at IS NULL
                ORDER BY borrowed_at DESC
                LIMIT 1
                FOR UPDATE
            )
            RETURNING id, user_id, book_id, borrowed_at, returned_at
            "#,
        )
        .bind(user_id)
        .bind(book_id)
        .bind(Utc::now())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(record) = record else {
            tx.rollback().await?;
            return Ok(None);
        };

        let restored = sqlx::query("UPDATE books SET copies = copies + 1 WHERE id = $1")
            .bind(book_id)
            .execute(&mut *tx)
            .await?;

        if restored.rows_affected() == 0 {
            tracing::warn!(%book_id, borrow_id = %record.id, "Returned a loan whose book no longer exists");
        }

        tx.commit().await?;

        Ok(Some(record))
    }

    async fn history(&self, user_id: Uuid) -> AppResult<Vec<BorrowHistoryEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT r.id, r.book_id, r.borrowed_at, r.returned_at,
                   b.title, b.author
            FROM borrow_records r
            LEFT JOIN books b ON b.id = r.book_id
            WHERE r.user_id = $1
            ORDER BY r.borrowed_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut result = Vec::with_capacity(rows.len());
        for row in rows {
            let book_id: Uuid = row.get("book_id");
            let title: Option<String> = row.get("title");
            let author: Option<String> = row.get("author");

            result.push(BorrowHistoryEntry {
                id: row.get("id"),
                book_id,
                book: title.zip(author).map(|(title, author)| BookSummary {
                    id: book_id,
                    title,
                    author,
                }),
                borrowed_at: row.get::<DateTime<Utc>, _>("borrowed_at"),
                returned_at: row.get::<Option<DateTime<Utc>>, _>("returned_at"),
            });
        }

        Ok(result)
    }

    async fn most_borrowed(&self, limit: i64) -> AppResult<Vec<MostBorrowedBook>> {
        // Rank first, then join: rows for deleted books are dropped after the limit
        let rows = sqlx::query_as::<_, MostBorrowedBook>(
            r#"
            WITH ranked AS (
                SELECT book_id, COUNT(*) AS count
                FROM borrow_records
                GROUP BY book_id
                ORDER BY count DESC, book_id
                LIMIT $1
            )
            SELECT b.title, b.author, ranked.count
            FROM ranked
            JOIN books b ON b.id = ranked.book_id
            ORDER BY ranked.count DESC, ranked.book_id
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn most_active_members(&self, limit: i64) -> AppResult<Vec<ActiveMember>> {
        let rows = sqlx::query_as::<_, ActiveMember>(
            r#"
            WITH ranked AS (
                SELECT user_id, COUNT(*) AS total_borrows
                FROM borrow_records
                GROUP BY user_id
                ORDER BY total_borrows DESC, user_id
                LIMIT $1
            )
            SELECT u.name, u.email, ranked.total_borrows
            FROM ranked
            JOIN users u ON u.id = ranked.user_id
            ORDER BY ranked.total_borrows DESC, ranked.user_id
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn count_open(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM borrow_records WHERE returned_at IS NULL")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

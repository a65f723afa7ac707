//! Books repository for database operations

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::book::{Book, BookFilter, CreateBook, UpdateBook, DEFAULT_COPIES},
};

use super::BookStore;

const BOOK_COLUMNS: &str = "id, title, author, isbn, publication_date, genre, copies, created_at";

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    fn push_filter<'a>(builder: &mut QueryBuilder<'a, Postgres>, filter: &'a BookFilter) {
        builder.push(" WHERE 1=1");
        if let Some(ref author) = filter.author {
            builder.push(" AND author = ").push_bind(author);
        }
        if let Some(ref genre) = filter.genre {
            builder.push(" AND genre = ").push_bind(genre);
        }
    }
}

#[async_trait]
impl BookStore for BooksRepository {
    async fn create(&self, book: &CreateBook) -> AppResult<Book> {
        let created = sqlx::query_as::<_, Book>(&format!(
            r#"
            INSERT INTO books (id, title, author, isbn, publication_date, genre, copies, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            BOOK_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.isbn)
        .bind(book.publication_date)
        .bind(&book.genre)
        .bind(book.copies.unwrap_or(DEFAULT_COPIES))
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Book>> {
        let book = sqlx::query_as::<_, Book>(&format!("SELECT {} FROM books WHERE id = $1", BOOK_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(book)
    }

    async fn update(&self, id: Uuid, changes: &UpdateBook) -> AppResult<Option<Book>> {
        let book = sqlx::query_as::<_, Book>(&format!(
            r#"
            UPDATE books SET
                title = COALESCE($2, title),
                author = COALESCE($3, author),
                isbn = COALESCE($4, isbn),
                publication_date = CASE WHEN $8 THEN $5 ELSE publication_date END,
                genre = CASE WHEN $9 THEN $6 ELSE genre END,
                copies = COALESCE($7, copies)
            WHERE id = $1
            RETURNING {}
            "#,
            BOOK_COLUMNS
        ))
        .bind(id)
        .bind(&changes.title)
        .bind(&changes.author)
        .bind(&changes.isbn)
        .bind(changes.publication_date.flatten())
        .bind(changes.genre.clone().flatten())
        .bind(changes.copies)
        .bind(changes.publication_date.is_some())
        .bind(changes.genre.is_some())
        .fetch_optional(&self.pool)
        .await?;

        Ok(book)
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(&self, filter: &BookFilter, offset: i64, limit: i64) -> AppResult<(Vec<Book>, i64)> {
        let mut count_query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM books");
        Self::push_filter(&mut count_query, filter);
        let total: i64 = count_query.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        let mut list_query = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM books", BOOK_COLUMNS));
        Self::push_filter(&mut list_query, filter);
        list_query
            .push(" ORDER BY created_at, id LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let books = list_query.build_query_as::<Book>().fetch_all(&self.pool).await?;

        Ok((books, total))
    }

    async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

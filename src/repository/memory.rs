//! In-memory store.
//!
//! Implements every store trait over one mutex-guarded state, so each call
//! (including the borrow/return check-and-mutate) is atomic.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Book, BookFilter, BookSummary, CreateBook, UpdateBook, DEFAULT_COPIES},
        borrow::{BorrowHistoryEntry, BorrowRecord},
        report::{ActiveMember, MostBorrowedBook},
        user::{NewUser, User},
    },
};

use super::{BookStore, BorrowLedger, LoanOpening, UserStore};

#[derive(Default)]
struct State {
    // Vectors keep insertion order, which is the listing order
    books: Vec<Book>,
    users: Vec<User>,
    borrows: Vec<BorrowRecord>,
}

impl State {
    fn book_mut(&mut self, id: Uuid) -> Option<&mut Book> {
        self.books.iter_mut().find(|b| b.id == id)
    }

    fn book(&self, id: Uuid) -> Option<&Book> {
        self.books.iter().find(|b| b.id == id)
    }

    fn user(&self, id: Uuid) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    fn lock(&self) -> AppResult<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| AppError::Internal("Memory store lock poisoned".to_string()))
    }
}

/// Count occurrences per key and keep the `limit` largest, ties in first-seen order
fn rank<K: Copy + Eq + std::hash::Hash>(keys: impl Iterator<Item = K>, limit: i64) -> Vec<(K, i64)> {
    let mut counts: HashMap<K, i64> = HashMap::new();
    let mut order: Vec<K> = Vec::new();
    for key in keys {
        let count = counts.entry(key).or_insert(0);
        if *count == 0 {
            order.push(key);
        }
        *count += 1;
    }

    let mut ranked: Vec<(K, i64)> = order.into_iter().map(|k| (k, counts[&k])).collect();
    // Stable sort keeps first-seen order among equal counts
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(limit.max(0) as usize);
    ranked
}

#[async_trait]
impl BookStore for MemoryStore {
    async fn create(&self, book: &CreateBook) -> AppResult<Book> {
        let created = Book {
            id: Uuid::new_v4(),
            title: book.title.clone(),
            author: book.author.clone(),
            isbn: book.isbn.clone(),
            publication_date: book.publication_date,
            genre: book.genre.clone(),
            copies: book.copies.unwrap_or(DEFAULT_COPIES),
            created_at: Utc::now(),
        };
        self.lock()?.books.push(created.clone());
        Ok(created)
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Book>> {
        Ok(self.lock()?.book(id).cloned())
    }

    async fn update(&self, id: Uuid, changes: &UpdateBook) -> AppResult<Option<Book>> {
        let mut state = self.lock()?;
        Ok(state.book_mut(id).map(|book| {
            changes.apply_to(book);
            book.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let mut state = self.lock()?;
        let before = state.books.len();
        state.books.retain(|b| b.id != id);
        Ok(state.books.len() < before)
    }

    async fn list(&self, filter: &BookFilter, offset: i64, limit: i64) -> AppResult<(Vec<Book>, i64)> {
        let state = self.lock()?;
        let matching: Vec<&Book> = state.books.iter().filter(|b| filter.matches(b)).collect();
        let total = matching.len() as i64;
        let page = matching
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect();
        Ok((page, total))
    }

    async fn count(&self) -> AppResult<i64> {
        Ok(self.lock()?.books.len() as i64)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create(&self, user: &NewUser) -> AppResult<User> {
        let mut state = self.lock()?;
        let email = user.email.to_lowercase();
        if state.users.iter().any(|u| u.email == email) {
            return Err(AppError::InvalidState("User already exists".to_string()));
        }

        let created = User {
            id: Uuid::new_v4(),
            name: user.name.clone(),
            email,
            password_hash: user.password_hash.clone(),
            role: user.role,
            created_at: Utc::now(),
        };
        state.users.push(created.clone());
        Ok(created)
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.lock()?.user(id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let email = email.to_lowercase();
        Ok(self.lock()?.users.iter().find(|u| u.email == email).cloned())
    }
}

#[async_trait]
impl BorrowLedger for MemoryStore {
    async fn open(&self, user_id: Uuid, book_id: Uuid) -> AppResult<LoanOpening> {
        let mut state = self.lock()?;
        match state.book_mut(book_id) {
            Some(book) if book.copies > 0 => book.copies -= 1,
            Some(_) => return Ok(LoanOpening::NoCopies),
            None => return Ok(LoanOpening::NoSuchBook),
        }

        let record = BorrowRecord::open(user_id, book_id);
        state.borrows.push(record.clone());
        Ok(LoanOpening::Opened(record))
    }

    async fn close_latest(&self, user_id: Uuid, book_id: Uuid) -> AppResult<Option<BorrowRecord>> {
        let mut state = self.lock()?;
        let Some(record) = state
            .borrows
            .iter_mut()
            .filter(|r| r.user_id == user_id && r.book_id == book_id && r.is_open())
            .max_by_key(|r| r.borrowed_at)
        else {
            return Ok(None);
        };

        record.returned_at = Some(Utc::now());
        let record = record.clone();

        match state.book_mut(book_id) {
            Some(book) => book.copies += 1,
            None => {
                tracing::warn!(%book_id, borrow_id = %record.id, "Returned a loan whose book no longer exists")
            }
        }

        Ok(Some(record))
    }

    async fn history(&self, user_id: Uuid) -> AppResult<Vec<BorrowHistoryEntry>> {
        let state = self.lock()?;
        let mut entries: Vec<BorrowHistoryEntry> = state
            .borrows
            .iter()
            .filter(|r| r.user_id == user_id)
            .map(|r| BorrowHistoryEntry {
                id: r.id,
                book_id: r.book_id,
                book: state.book(r.book_id).map(|b| BookSummary {
                    id: b.id,
                    title: b.title.clone(),
                    author: b.author.clone(),
                }),
                borrowed_at: r.borrowed_at,
                returned_at: r.returned_at,
            })
            .collect();
        entries.sort_by(|a, b| b.borrowed_at.cmp(&a.borrowed_at));
        Ok(entries)
    }

    async fn most_borrowed(&self, limit: i64) -> AppResult<Vec<MostBorrowedBook>> {
        let state = self.lock()?;
        Ok(rank(state.borrows.iter().map(|r| r.book_id), limit)
            .into_iter()
            .filter_map(|(book_id, count)| {
                state.book(book_id).map(|b| MostBorrowedBook {
                    title: b.title.clone(),
                    author: b.author.clone(),
                    count,
                })
            })
            .collect())
    }

    async fn most_active_members(&self, limit: i64) -> AppResult<Vec<ActiveMember>> {
        let state = self.lock()?;
        Ok(rank(state.borrows.iter().map(|r| r.user_id), limit)
            .into_iter()
            .filter_map(|(user_id, total_borrows)| {
                state.user(user_id).map(|u| ActiveMember {
                    name: u.name.clone(),
                    email: u.email.clone(),
                    total_borrows,
                })
            })
            .collect())
    }

    async fn count_open(&self) -> AppResult<i64> {
        Ok(self.lock()?.borrows.iter().filter(|r| r.is_open()).count() as i64)
    }
}

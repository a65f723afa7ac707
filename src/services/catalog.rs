//! Catalog management service

use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Book, BookFilter, BookPage, BookQuery, CreateBook, UpdateBook},
        Identity,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List books with equality filters and pagination
    pub async fn list_books(&self, identity: &Identity, query: &BookQuery) -> AppResult<BookPage> {
        identity.require_user()?;
        query.validate()?;
        let offset = query.offset()?;

        let (books, total) = self
            .repository
            .books
            .list(&BookFilter::from(query), offset, query.limit())
            .await?;

        Ok(BookPage {
            total,
            page: query.page(),
            books,
        })
    }

    /// Get book by ID
    pub async fn get_book(&self, identity: &Identity, id: Uuid) -> AppResult<Book> {
        identity.require_user()?;
        self.repository
            .books
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Book not found".to_string()))
    }

    pub async fn add_book(&self, identity: &Identity, book: CreateBook) -> AppResult<Book> {
        identity.require_admin()?;
        book.validate()?;

        let created = self.repository.books.create(&book).await?;
        tracing::info!(book_id = %created.id, title = %created.title, copies = created.copies, "Book added");
        Ok(created)
    }

    pub async fn update_book(&self, identity: &Identity, id: Uuid, changes: UpdateBook) -> AppResult<Book> {
        identity.require_admin()?;
        changes.validate()?;

        let updated = self
            .repository
            .books
            .update(id, &changes)
            .await?
            .ok_or_else(|| AppError::NotFound("Book not found".to_string()))?;
        tracing::info!(book_id = %id, "Book updated");
        Ok(updated)
    }

    pub async fn delete_book(&self, identity: &Identity, id: Uuid) -> AppResult<()> {
        identity.require_admin()?;

        if !self.repository.books.delete(id).await? {
            return Err(AppError::NotFound("Book not found".to_string()));
        }
        tracing::info!(book_id = %id, "Book deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{models::user::Role, services::test_support};

    fn create_request(title: &str, copies: Option<i32>) -> CreateBook {
        CreateBook {
            title: title.to_string(),
            author: "Frank Herbert".to_string(),
            isbn: "9780441013593".to_string(),
            publication_date: None,
            genre: Some("Science Fiction".to_string()),
            copies,
        }
    }

    #[tokio::test]
    async fn test_add_book_defaults_to_one_copy() {
        let (services, repository) = test_support::services();
        let admin = test_support::user(&repository, "Root", Role::Admin).await;

        let book = services.catalog.add_book(&admin, create_request("Dune", None)).await.unwrap();
        assert_eq!(book.copies, 1);
    }

    #[tokio::test]
    async fn test_add_book_rejects_blank_title_and_negative_copies() {
        let (services, repository) = test_support::services();
        let admin = test_support::user(&repository, "Root", Role::Admin).await;

        let result = services.catalog.add_book(&admin, create_request("", None)).await;
        assert!(matches!(result, Err(AppError::Validation(_))));

        let result = services.catalog.add_book(&admin, create_request("Dune", Some(-1))).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_member_is_forbidden_regardless_of_payload() {
        let (services, repository) = test_support::services();
        let member = test_support::user(&repository, "Bob", Role::Member).await;
        let book = test_support::book(&repository, "Dune", 1).await;

        let invalid = create_request("", Some(-5));
        assert!(matches!(
            services.catalog.add_book(&member, invalid).await,
            Err(AppError::Authorization(_))
        ));
        assert!(matches!(
            services.catalog.update_book(&member, book.id, UpdateBook::default()).await,
            Err(AppError::Authorization(_))
        ));
        assert!(matches!(
            services.catalog.delete_book(&member, book.id).await,
            Err(AppError::Authorization(_))
        ));
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_book() {
        let (services, repository) = test_support::services();
        let admin = test_support::user(&repository, "Root", Role::Admin).await;

        assert!(matches!(
            services.catalog.update_book(&admin, Uuid::new_v4(), UpdateBook::default()).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            services.catalog.delete_book(&admin, Uuid::new_v4()).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_partial_update() {
        let (services, repository) = test_support::services();
        let admin = test_support::user(&repository, "Root", Role::Admin).await;
        let book = services.catalog.add_book(&admin, create_request("Dune", Some(3))).await.unwrap();

        let updated = services
            .catalog
            .update_book(&admin, book.id, UpdateBook { title: Some("Dune Messiah".to_string()), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(updated.title, "Dune Messiah");
        assert_eq!(updated.author, "Frank Herbert");
        assert_eq!(updated.copies, 3);
    }

    #[tokio::test]
    async fn test_second_page_of_twelve() {
        let (services, repository) = test_support::services();
        let member = test_support::user(&repository, "Bob", Role::Member).await;
        for i in 1..=12 {
            test_support::book(&repository, &format!("Book {}", i), 1).await;
        }

        let page = services
            .catalog
            .list_books(&member, &BookQuery { page: Some(2), limit: Some(5), ..Default::default() })
            .await
            .unwrap();

        assert_eq!(page.total, 12);
        assert_eq!(page.page, 2);
        let titles: Vec<&str> = page.books.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["Book 6", "Book 7", "Book 8", "Book 9", "Book 10"]);
    }

    #[tokio::test]
    async fn test_list_filters_and_requires_authentication() {
        let (services, repository) = test_support::services();
        let admin = test_support::user(&repository, "Root", Role::Admin).await;
        services.catalog.add_book(&admin, create_request("Dune", None)).await.unwrap();
        test_support::book(&repository, "Other", 1).await;

        let query = BookQuery { author: Some("Frank Herbert".to_string()), ..Default::default() };
        let page = services.catalog.list_books(&admin, &query).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.books[0].title, "Dune");

        assert!(matches!(
            services.catalog.list_books(&Identity::Anonymous, &query).await,
            Err(AppError::Authentication(_))
        ));
    }
}

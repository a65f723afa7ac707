//! Shared helpers for the integration tests

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use nalanda_server::{
    api,
    config::AppConfig,
    models::{
        book::{Book, CreateBook},
        user::{NewUser, Role},
    },
    repository::Repository,
    AppState,
};

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub repository: Repository,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    pub fn with_config(config: AppConfig) -> Self {
        let repository = Repository::in_memory();
        let state = AppState::new(config, repository.clone());
        Self {
            router: api::create_router(state.clone()),
            state,
            repository,
        }
    }

    /// Insert a user directly and mint a token for it
    pub async fn user(&self, name: &str, role: Role) -> (Uuid, String) {
        let user = self
            .repository
            .users
            .create(&NewUser {
                name: name.to_string(),
                email: format!("{}@example.com", name.to_lowercase()),
                password_hash: String::new(),
                role,
            })
            .await
            .unwrap();
        let token = self.state.services.auth.issue_token(user.id, role).unwrap();
        (user.id, token)
    }

    pub async fn book(&self, title: &str, copies: i32) -> Book {
        self.repository
            .books
            .create(&CreateBook {
                title: title.to_string(),
                author: "Author".to_string(),
                isbn: format!("isbn-{}", title),
                publication_date: None,
                genre: None,
                copies: Some(copies),
            })
            .await
            .unwrap()
    }

    pub async fn copies(&self, book_id: Uuid) -> i32 {
        self.repository.books.get_by_id(book_id).await.unwrap().unwrap().copies
    }

    /// Send a request and return the status with the decoded JSON body
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let body = body.map(|b| b.to_string());
        self.send_raw(method, uri, token, body).await
    }

    pub async fn send_raw(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<String>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }
}

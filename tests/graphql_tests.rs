//! GraphQL integration tests

mod common;

use async_graphql::{Request, Variables};
use axum::http::{Method, StatusCode};
use serde_json::{json, Value};

use common::TestApp;
use nalanda_server::models::{user::Role, Identity};

async fn execute(app: &TestApp, token: Option<&str>, query: &str, variables: Value) -> async_graphql::Response {
    let identity = match token {
        Some(token) => app.state.services.auth.authenticate(token).await.unwrap(),
        None => Identity::Anonymous,
    };
    let request = Request::new(query)
        .variables(Variables::from_json(variables))
        .data(identity);
    app.state.schema.execute(request).await
}

fn first_error(response: &async_graphql::Response) -> &str {
    response.errors.first().map(|e| e.message.as_str()).unwrap_or_default()
}

#[tokio::test]
async fn test_borrow_and_return_through_graphql() {
    let app = TestApp::new();
    let (_, alice) = app.user("Alice", Role::Member).await;
    let book = app.book("Dune", 1).await;

    let response = execute(
        &app,
        Some(&alice),
        r#"mutation($id: UUID!) {
            borrowBook(bookId: $id) { id returnedAt user { name } book { title copies } }
        }"#,
        json!({ "id": book.id }),
    )
    .await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    let data = response.data.into_json().unwrap();
    assert_eq!(data["borrowBook"]["user"]["name"], "Alice");
    assert_eq!(data["borrowBook"]["book"]["copies"], 0);
    assert!(data["borrowBook"]["returnedAt"].is_null());

    let response = execute(
        &app,
        Some(&alice),
        r#"mutation($id: UUID!) { returnBook(bookId: $id) { returnedAt } }"#,
        json!({ "id": book.id }),
    )
    .await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    assert_eq!(app.copies(book.id).await, 1);

    let response = execute(
        &app,
        Some(&alice),
        "{ borrowHistory { bookId returnedAt book { title } } }",
        json!({}),
    )
    .await;
    let data = response.data.into_json().unwrap();
    assert_eq!(data["borrowHistory"][0]["book"]["title"], "Dune");
    assert!(data["borrowHistory"][0]["returnedAt"].is_string());
}

#[tokio::test]
async fn test_errors_carry_service_messages() {
    let app = TestApp::new();
    let (_, member) = app.user("Bob", Role::Member).await;
    let book = app.book("Dune", 0).await;

    let response = execute(&app, None, "{ me { name } }", json!({})).await;
    assert_eq!(first_error(&response), "Not authenticated");

    let response = execute(
        &app,
        Some(&member),
        r#"mutation($id: UUID!) { borrowBook(bookId: $id) { id } }"#,
        json!({ "id": book.id }),
    )
    .await;
    assert_eq!(first_error(&response), "No copies available");

    let response = execute(
        &app,
        Some(&member),
        r#"mutation { addBook(title: "", author: "", ISBN: "") { id } }"#,
        json!({}),
    )
    .await;
    assert_eq!(first_error(&response), "Admin access required");

    let response = execute(&app, Some(&member), "{ bookAvailability { totalBooks } }", json!({})).await;
    assert_eq!(first_error(&response), "Admin access required");
}

#[tokio::test]
async fn test_admin_book_management() {
    let app = TestApp::new();
    let (_, admin) = app.user("Root", Role::Admin).await;

    let response = execute(
        &app,
        Some(&admin),
        r#"mutation {
            addBook(title: "Emma", author: "Jane Austen", ISBN: "9780141439587", genre: "Classic", publicationDate: "1815-12-23") {
                id ISBN copies publicationDate
            }
        }"#,
        json!({}),
    )
    .await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    let data = response.data.into_json().unwrap();
    assert_eq!(data["addBook"]["ISBN"], "9780141439587");
    assert_eq!(data["addBook"]["copies"], 1);
    assert_eq!(data["addBook"]["publicationDate"], "1815-12-23");
    let id = data["addBook"]["id"].as_str().unwrap().to_string();

    let response = execute(
        &app,
        Some(&admin),
        r#"mutation($id: UUID!) { updateBook(id: $id, copies: 4) { title copies } }"#,
        json!({ "id": id }),
    )
    .await;
    let data = response.data.into_json().unwrap();
    assert_eq!(data["updateBook"]["title"], "Emma");
    assert_eq!(data["updateBook"]["copies"], 4);

    let response = execute(
        &app,
        Some(&admin),
        r#"{ listBooks(genre: "Classic") { total page books { title } } }"#,
        json!({}),
    )
    .await;
    let data = response.data.into_json().unwrap();
    assert_eq!(data["listBooks"]["total"], 1);
    assert_eq!(data["listBooks"]["page"], 1);

    let response = execute(
        &app,
        Some(&admin),
        r#"mutation($id: UUID!) { updateBook(id: $id, publicationDate: null) { genre publicationDate } }"#,
        json!({ "id": id }),
    )
    .await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    let data = response.data.into_json().unwrap();
    assert_eq!(data["updateBook"]["genre"], "Classic");
    assert!(data["updateBook"]["publicationDate"].is_null());

    let response = execute(
        &app,
        Some(&admin),
        r#"mutation($id: UUID!) { deleteBook(id: $id) }"#,
        json!({ "id": id }),
    )
    .await;
    let data = response.data.into_json().unwrap();
    assert_eq!(data["deleteBook"], "Book deleted successfully");

    let response = execute(
        &app,
        Some(&admin),
        r#"mutation($id: UUID!) { deleteBook(id: $id) }"#,
        json!({ "id": id }),
    )
    .await;
    assert_eq!(first_error(&response), "Book not found");
}

#[tokio::test]
async fn test_register_and_login_mutations() {
    let app = TestApp::new();

    let response = execute(
        &app,
        None,
        r#"mutation { registerUser(name: "Ada", email: "ada@example.com", password: "secret1") { role token } }"#,
        json!({}),
    )
    .await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    let data = response.data.into_json().unwrap();
    assert_eq!(data["registerUser"]["role"], "Member");

    let response = execute(
        &app,
        None,
        r#"mutation { loginUser(email: "ada@example.com", password: "secret1") { name token } }"#,
        json!({}),
    )
    .await;
    let data = response.data.into_json().unwrap();
    let token = data["loginUser"]["token"].as_str().unwrap().to_string();

    let response = execute(&app, Some(&token), "{ me { name email role } }", json!({})).await;
    let data = response.data.into_json().unwrap();
    assert_eq!(data["me"]["email"], "ada@example.com");

    let response = execute(
        &app,
        None,
        r#"mutation { registerUser(name: "Ada", email: "ADA@example.com", password: "secret1") { token } }"#,
        json!({}),
    )
    .await;
    assert_eq!(first_error(&response), "User already exists");
}

#[tokio::test]
async fn test_reports_query() {
    let app = TestApp::new();
    let (_, admin) = app.user("Root", Role::Admin).await;
    let (_, reader) = app.user("Reader", Role::Member).await;
    let book = app.book("Dune", 2).await;

    execute(
        &app,
        Some(&reader),
        r#"mutation($id: UUID!) { borrowBook(bookId: $id) { id } }"#,
        json!({ "id": book.id }),
    )
    .await;

    let response = execute(
        &app,
        Some(&admin),
        r#"{
            mostBorrowedBooks { title count }
            activeMembers { name totalBorrows }
            bookAvailability { totalBooks totalBorrowed availableBooks }
        }"#,
        json!({}),
    )
    .await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    let data = response.data.into_json().unwrap();
    assert_eq!(data["mostBorrowedBooks"][0]["count"], 1);
    assert_eq!(data["activeMembers"][0]["name"], "Reader");
    assert_eq!(data["bookAvailability"]["availableBooks"], 0);
}

#[tokio::test]
async fn test_http_endpoint_resolves_bearer_token() {
    let app = TestApp::new();
    let (_, member) = app.user("Bob", Role::Member).await;

    let query = json!({ "query": "{ me { name } }" });

    let (status, body) = app
        .send(Method::POST, "/graphql", Some(&member), Some(query.clone()))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["me"]["name"], "Bob");

    // A bad token degrades to anonymous instead of failing the request
    let (status, body) = app
        .send(Method::POST, "/graphql", Some("garbage"), Some(query))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["errors"][0]["message"], "Not authenticated");
}

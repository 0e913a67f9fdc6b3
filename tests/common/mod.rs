//! Common test utilities
//!
//! Test servers run on the in-memory store. Any validly signed bearer token
//! is accepted as its user.

#![allow(dead_code)]

use axum_test::{TestRequest, TestServer};
use uuid::Uuid;
use xfteam::backend::auth::create_token;
use xfteam::backend::routes::create_router;
use xfteam::backend::server::AppState;
use xfteam::shared::workspace::IdResponse;

/// A user known only by a token
pub struct TestUser {
    pub id: Uuid,
    pub token: String,
}

impl TestUser {
    pub fn new() -> Self {
        let id = Uuid::new_v4();
        let token = create_token(id).expect("Failed to generate test token");
        Self { id, token }
    }
}

/// Create authorization header value
pub fn auth_header(token: &str) -> String {
    format!("Bearer {}", token)
}

/// Attach the user's bearer token to a request
pub fn as_user(request: TestRequest, user: &TestUser) -> TestRequest {
    request.add_header("Authorization", auth_header(&user.token))
}

/// Server over a fresh in-memory state, plus that state for direct checks
pub fn create_test_server() -> (TestServer, AppState) {
    let state = AppState::in_memory();
    let server =
        TestServer::new(create_router(state.clone())).expect("Failed to start test server");
    (server, state)
}

/// Create a workspace through the API and return its ID
pub async fn create_workspace(server: &TestServer, owner: &TestUser, name: &str) -> Uuid {
    let response = as_user(server.post("/api/workspaces"), owner)
        .json(&serde_json::json!({ "name": name }))
        .await;
    response.assert_status_ok();
    response.json::<IdResponse>().id
}

/// Fetch the workspace's current join code as its owner
pub async fn join_code(server: &TestServer, owner: &TestUser, workspace_id: Uuid) -> String {
    let response = as_user(server.get(&format!("/api/workspaces/{workspace_id}")), owner).await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    body["join_code"]
        .as_str()
        .expect("workspace has a join code")
        .to_string()
}

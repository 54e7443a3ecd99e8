/// End-to-end tests for the Taskboard API
///
/// Drive the complete router (auth layer, handlers, error mapping) over an
/// in-memory store.

mod common;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use common::{edit_profile_request, Part, TestContext, TestUser};
use serde_json::json;

#[tokio::test]
async fn test_health_check() {
    let ctx = TestContext::new();

    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = ctx.send(request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");
}

#[tokio::test]
async fn test_register_hides_password_hash() {
    let ctx = TestContext::new();

    let (status, body) = ctx.register("alice", "p1").await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["username"], "alice");
    assert_eq!(body["email"], "alice@example.com");
    assert_eq!(body["is_active"], true);
    assert!(body.get("password_hash").is_none());
    assert!(body.get("password").is_none());
}

#[tokio::test]
async fn test_register_duplicate_username_conflicts() {
    let ctx = TestContext::new();
    ctx.register("alice", "p1").await;

    let (status, body) = ctx
        .json(
            Method::POST,
            "/auth/register-user",
            None,
            Some(json!({ "username": "alice", "email": "other@example.com", "password": "p2" })),
        )
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");
}

#[tokio::test]
async fn test_register_rejects_invalid_email() {
    let ctx = TestContext::new();

    let (status, body) = ctx
        .json(
            Method::POST,
            "/auth/register-user",
            None,
            Some(json!({ "username": "alice", "email": "not-an-email", "password": "p1" })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
    assert_eq!(body["details"][0]["field"], "email");
}

#[tokio::test]
async fn test_register_rejects_malformed_json() {
    let ctx = TestContext::new();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/auth/register-user")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"username\": "))
        .unwrap();
    let (status, body) = ctx.send(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn test_login_returns_token_pair() {
    let ctx = TestContext::new();
    ctx.register("alice", "p1").await;

    let (status, body) = ctx.login("alice", "p1").await;

    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["token_type"], "bearer");
    assert_eq!(body["user"]["username"], "alice");
    assert!(body["access_token"].as_str().is_some_and(|t| !t.is_empty()));
    assert_ne!(body["access_token"], body["refresh_token"]);
}

#[tokio::test]
async fn test_login_failures_are_not_found() {
    let ctx = TestContext::new();
    ctx.register("alice", "p1").await;

    let (wrong_password, body) = ctx.login("alice", "nope").await;
    assert_eq!(wrong_password, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Invalid credentials");

    let (unknown_user, body) = ctx.login("mallory", "p1").await;
    assert_eq!(unknown_user, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Invalid credentials");
}

#[tokio::test]
async fn test_protected_routes_require_access_token() {
    let ctx = TestContext::new();
    let alice = ctx.signup("alice").await;

    let (missing, _) = ctx.json(Method::GET, "/tasks/", None, None).await;
    assert_eq!(missing, StatusCode::UNAUTHORIZED);

    let bogus = TestUser {
        access_token: "not.a.token".to_string(),
        ..alice
    };
    let (invalid, body) = ctx.get("/project/", &bogus).await;
    assert_eq!(invalid, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");

    let refresh_only = TestUser {
        access_token: bogus.refresh_token.clone(),
        ..bogus
    };
    let (wrong_scope, _) = ctx.get("/user/me", &refresh_only).await;
    assert_eq!(wrong_scope, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_alice_scenario() {
    let ctx = TestContext::new();
    let alice = ctx.signup("alice").await;

    let project_id = ctx.create_project(&alice, "P").await;
    let task_id = ctx.create_task(&alice, "T", project_id).await;

    let (status, body) = ctx.get("/tasks/", &alice).await;
    assert_eq!(status, StatusCode::OK);

    let tasks = body.as_array().unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["id"], task_id);
    assert_eq!(tasks[0]["title"], "T");
    assert_eq!(tasks[0]["user_id"], alice.id);
    assert_eq!(tasks[0]["status"], "todo");
    assert_eq!(tasks[0]["priority"], "low");
}

#[tokio::test]
async fn test_bob_cannot_touch_alices_records() {
    let ctx = TestContext::new();
    let alice = ctx.signup("alice").await;
    let bob = ctx.signup("bob").await;

    let project_id = ctx.create_project(&alice, "P").await;
    let task_id = ctx.create_task(&alice, "T", project_id).await;
    let comment_id = ctx.create_comment(&alice, "hi", task_id).await;

    let (status, body) = ctx.get(&format!("/project/{}", project_id), &bob).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Project not found");

    let (status, _) = ctx
        .put(&format!("/project/edit-project/{}", project_id), &bob, json!({ "name": "X" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = ctx.delete(&format!("/tasks/delete-task/{}", task_id), &bob).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = ctx.get(&format!("/comment/detail/{}", comment_id), &bob).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Alice's records are untouched
    let (status, body) = ctx.get(&format!("/project/{}", project_id), &alice).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "P");
}

#[tokio::test]
async fn test_cross_user_reads() {
    let ctx = TestContext::new();
    let alice = ctx.signup("alice").await;
    let bob = ctx.signup("bob").await;

    let project_id = ctx.create_project(&alice, "P").await;
    ctx.create_task(&alice, "T", project_id).await;

    let (status, body) = ctx.get(&format!("/project/user/{}", alice.id), &bob).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = ctx.get(&format!("/project/{}/tasks", project_id), &bob).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["title"], "T");

    // The per-user task listing stays scoped to the caller
    let (status, body) = ctx.get(&format!("/tasks/user/{}", alice.id), &bob).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());

    let (_, body) = ctx.get(&format!("/tasks/user/{}", alice.id), &alice).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (_, body) = ctx.get("/project/user/", &bob).await;
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_task_validation_and_partial_update() {
    let ctx = TestContext::new();
    let alice = ctx.signup("alice").await;
    let project_id = ctx.create_project(&alice, "P").await;

    let (status, body) = ctx
        .post(
            "/tasks/create-task",
            &alice,
            json!({
                "title": "T",
                "status": "archived",
                "deadline": "2030-01-01T00:00:00Z",
                "project_id": project_id,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"][0]["field"], "status");

    let (status, created) = ctx
        .post(
            "/tasks/create-task",
            &alice,
            json!({
                "title": "T",
                "status": "in_progress",
                "priority": "high",
                "deadline": "2030-01-01T00:00:00Z",
                "project_id": project_id,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let task_id = created["id"].as_i64().unwrap();

    let (status, updated) = ctx
        .put(&format!("/tasks/update-task/{}", task_id), &alice, json!({ "title": "x" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "x");
    assert_eq!(updated["status"], "in_progress");
    assert_eq!(updated["priority"], "high");
    assert_eq!(updated["deadline"], created["deadline"]);
    assert_eq!(updated["project_id"], project_id);

    let (status, _) = ctx
        .put(&format!("/tasks/update-task/{}", task_id), &alice, json!({ "priority": "urgent" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_dangling_parent_is_internal_error() {
    let ctx = TestContext::new();
    let alice = ctx.signup("alice").await;

    let (status, body) = ctx
        .post(
            "/tasks/create-task",
            &alice,
            json!({ "title": "T", "deadline": "2030-01-01T00:00:00Z", "project_id": 9999 }),
        )
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "internal_error");

    let (status, _) = ctx
        .post("/comment/creat-comment/", &alice, json!({ "content": "c", "task_id": 9999 }))
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_comment_lifecycle() {
    let ctx = TestContext::new();
    let alice = ctx.signup("alice").await;
    let project_id = ctx.create_project(&alice, "P").await;
    let task_id = ctx.create_task(&alice, "T", project_id).await;

    let comment_id = ctx.create_comment(&alice, "first", task_id).await;
    ctx.create_comment(&alice, "second", task_id).await;

    let (status, body) = ctx.get(&format!("/comment/{}", task_id), &alice).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (status, body) = ctx
        .put(
            &format!("/comment/edit-comment/{}", comment_id),
            &alice,
            json!({ "content": "edited" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"], "edited");

    let (status, body) = ctx
        .delete(&format!("/comment/delete-comment/{}", comment_id), &alice)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], comment_id);

    let (status, _) = ctx.get(&format!("/comment/detail/{}", comment_id), &alice).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_project_delete_cascades() {
    let ctx = TestContext::new();
    let alice = ctx.signup("alice").await;
    let project_id = ctx.create_project(&alice, "P").await;
    let task_id = ctx.create_task(&alice, "T", project_id).await;
    let comment_id = ctx.create_comment(&alice, "c", task_id).await;

    let (status, body) = ctx
        .delete(&format!("/project/delete-project/{}", project_id), &alice)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "P");

    let (status, _) = ctx.get(&format!("/tasks/{}", task_id), &alice).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = ctx.get(&format!("/comment/detail/{}", comment_id), &alice).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_account_delete_cascades_and_revokes_access() {
    let ctx = TestContext::new();
    let alice = ctx.signup("alice").await;
    let bob = ctx.signup("bob").await;
    let project_id = ctx.create_project(&alice, "P").await;
    ctx.create_task(&alice, "T", project_id).await;

    let (status, body) = ctx.delete("/user/delete/", &alice).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "alice");

    let (_, body) = ctx.get(&format!("/project/user/{}", alice.id), &bob).await;
    assert!(body.as_array().unwrap().is_empty());

    // The token still validates but no account stands behind it
    let (status, _) = ctx.get("/user/me", &alice).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = ctx.login("alice", "p1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_me_returns_current_user() {
    let ctx = TestContext::new();
    let alice = ctx.signup("alice").await;

    let (status, body) = ctx.get("/user/me", &alice).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], alice.id);
    assert_eq!(body["username"], alice.username);
}

#[tokio::test]
async fn test_edit_profile_with_image() {
    let ctx = TestContext::new();
    let alice = ctx.signup("alice").await;

    let request = edit_profile_request(
        &alice,
        &[
            Part::Text("username", "alice2"),
            Part::Text("email", "alice2@example.com"),
            Part::File {
                name: "profile_image",
                filename: "avatar.png",
                content_type: "image/png",
                bytes: b"\x89PNG fake image bytes",
            },
        ],
    );
    let (status, body) = ctx.send(request).await;

    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["username"], "alice2");
    assert_eq!(body["email"], "alice2@example.com");

    let path = body["profile_image"].as_str().unwrap();
    assert!(path.ends_with(&format!("{}_avatar.png", alice.id)));
    assert!(std::path::Path::new(path).starts_with(ctx.images.path()));
    assert!(std::path::Path::new(path).exists());
}

#[tokio::test]
async fn test_edit_profile_rejects_non_image() {
    let ctx = TestContext::new();
    let alice = ctx.signup("alice").await;

    let request = edit_profile_request(
        &alice,
        &[
            Part::Text("username", "alice"),
            Part::Text("email", "alice@example.com"),
            Part::File {
                name: "profile_image",
                filename: "notes.txt",
                content_type: "text/plain",
                bytes: b"hello",
            },
        ],
    );
    let (status, body) = ctx.send(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"][0]["field"], "profile_image");
    assert_eq!(body["details"][0]["message"], "File must be an image");
}

#[tokio::test]
async fn test_edit_profile_without_image_keeps_existing() {
    let ctx = TestContext::new();
    let alice = ctx.signup("alice").await;

    let request = edit_profile_request(
        &alice,
        &[
            Part::Text("username", "alice"),
            Part::Text("email", "new@example.com"),
        ],
    );
    let (status, body) = ctx.send(request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "new@example.com");
    assert!(body["profile_image"].is_null());
}

#[tokio::test]
async fn test_edit_profile_requires_username_and_email() {
    let ctx = TestContext::new();
    let alice = ctx.signup("alice").await;

    let request = edit_profile_request(&alice, &[Part::Text("username", "alice")]);
    let (status, body) = ctx.send(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"][0]["field"], "email");
}

#[tokio::test]
async fn test_edit_profile_username_taken() {
    let ctx = TestContext::new();
    let alice = ctx.signup("alice").await;
    ctx.signup("bob").await;

    let request = edit_profile_request(
        &alice,
        &[
            Part::Text("username", "bob"),
            Part::Text("email", "alice@example.com"),
        ],
    );
    let (status, _) = ctx.send(request).await;

    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_edit_profile_conflict_keeps_current_image() {
    let ctx = TestContext::new();
    let alice = ctx.signup("alice").await;
    ctx.signup("bob").await;

    let avatar = |bytes: &'static [u8]| Part::File {
        name: "profile_image",
        filename: "avatar.png",
        content_type: "image/png",
        bytes,
    };

    let request = edit_profile_request(
        &alice,
        &[
            Part::Text("username", "alice"),
            Part::Text("email", "alice@example.com"),
            avatar(b"\x89PNG first"),
        ],
    );
    let (status, body) = ctx.send(request).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    let saved = body["profile_image"].as_str().unwrap().to_string();

    let request = edit_profile_request(
        &alice,
        &[
            Part::Text("username", "bob"),
            Part::Text("email", "alice@example.com"),
            avatar(b"\x89PNG second"),
        ],
    );
    let (status, _) = ctx.send(request).await;
    assert_eq!(status, StatusCode::CONFLICT);

    assert_eq!(std::fs::read(&saved).unwrap(), b"\x89PNG first");
    let dir = std::path::Path::new(&saved).parent().unwrap();
    assert_eq!(std::fs::read_dir(dir).unwrap().count(), 1);

    let (_, me) = ctx.get("/user/me", &alice).await;
    assert_eq!(me["username"], "alice");
    assert_eq!(me["profile_image"], saved.as_str());
}

#[tokio::test]
async fn test_edit_profile_rejects_unusable_file_name() {
    let ctx = TestContext::new();
    let alice = ctx.signup("alice").await;

    let request = edit_profile_request(
        &alice,
        &[
            Part::Text("username", "alice"),
            Part::Text("email", "alice@example.com"),
            Part::File {
                name: "profile_image",
                filename: "..",
                content_type: "image/png",
                bytes: b"\x89PNG",
            },
        ],
    );
    let (status, body) = ctx.send(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);
    assert_eq!(body["details"][0]["field"], "profile_image");
    assert!(!ctx.images.path().join("profiles").exists());
}

#[tokio::test]
async fn test_malformed_path_ids_are_bad_requests() {
    let ctx = TestContext::new();
    let alice = ctx.signup("alice").await;

    for uri in ["/project/abc", "/tasks/abc", "/comment/detail/abc"] {
        let (status, body) = ctx.get(uri, &alice).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body["error"], "bad_request", "{}", uri);
    }

    let (status, body) = ctx.delete("/tasks/delete-task/1.5", &alice).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
}

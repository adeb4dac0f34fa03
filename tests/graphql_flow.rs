//! End-to-end flow against a real Postgres database.
//!
//! Run with `DATABASE_URL` set and `cargo test -- --ignored`.

use actix_web::{rt, web, App, HttpServer};
use async_graphql::EmptySubscription;
use dotenv::dotenv;
use serde_json::{json, Value};
use std::net::TcpListener;
use taskgraph::graphql::mutation::MutationRoot;
use taskgraph::graphql::query::QueryRoot;
use taskgraph::graphql::{build_schema, SchemaOptions};
use taskgraph::routes::{self, GraphqlSettings};
use taskgraph::Database;
use uuid::Uuid;

async fn connect() -> Database {
    dotenv().ok();
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");
    let pool = sqlx::PgPool::connect(&database_url)
        .await
        .expect("Failed to connect to test DB");
    let db = Database::from_pool(pool);
    db.migrate().await.expect("Failed to run migrations");
    db
}

async fn insert_user(db: &Database, name: &str, is_admin: bool) -> i32 {
    let suffix = Uuid::new_v4().simple().to_string();
    let username = format!("{}_{}", name, &suffix[..8]);
    sqlx::query_scalar::<_, i32>(
        "INSERT INTO users (username, email, is_admin) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(&username)
    .bind(format!("{}@example.com", username))
    .bind(is_admin)
    .fetch_one(db.pool())
    .await
    .expect("Failed to insert user")
}

async fn cleanup_users(db: &Database, ids: &[i32]) {
    let _ = sqlx::query("DELETE FROM users WHERE id = ANY($1)")
        .bind(ids)
        .execute(db.pool())
        .await;
}

struct TestServer {
    url: String,
    handle: rt::task::JoinHandle<std::io::Result<()>>,
}

async fn spawn_server(db: Database) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let handle = rt::spawn(async move {
        let schema = web::Data::new(build_schema(db.clone(), SchemaOptions::default()));
        let db = web::Data::new(db);
        let settings = web::Data::new(GraphqlSettings::default());
        HttpServer::new(move || {
            App::new()
                .app_data(schema.clone())
                .app_data(db.clone())
                .app_data(settings.clone())
                .configure(routes::config::<QueryRoot, MutationRoot, EmptySubscription>)
        })
        .bind(("127.0.0.1", port))
        .unwrap_or_else(|_| panic!("Failed to bind to port {}", port))
        .run()
        .await
    });

    tokio::time::sleep(tokio::time::Duration::from_millis(200)).await;

    TestServer {
        url: format!("http://127.0.0.1:{}/graphql", port),
        handle,
    }
}

async fn post(
    client: &reqwest::Client,
    server: &TestServer,
    user_id: i32,
    is_admin: bool,
    query: &str,
    variables: Value,
) -> Value {
    client
        .post(&server.url)
        .header("x-user-id", user_id.to_string())
        .header("x-is-admin", if is_admin { "true" } else { "false" })
        .json(&json!({ "query": query, "variables": variables }))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Response is not JSON")
}

fn error_code(body: &Value) -> &str {
    body["errors"][0]["extensions"]["code"].as_str().unwrap_or_default()
}

fn edge_titles(connection: &Value) -> Vec<String> {
    connection["edges"]
        .as_array()
        .map(|edges| {
            edges
                .iter()
                .filter_map(|edge| edge["node"]["title"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

fn sorted_titles(tasks: &Value) -> Vec<String> {
    let mut titles: Vec<String> = tasks
        .as_array()
        .map(|tasks| {
            tasks
                .iter()
                .filter_map(|task| task["title"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default();
    titles.sort();
    titles
}

const CREATE_TASK: &str = r#"
    mutation ($input: CreateTaskInput!) {
        createTask(input: $input) { id title status userId user { id } }
    }
"#;

#[actix_rt::test]
#[ignore]
async fn test_task_ownership_flow() {
    let db = connect().await;
    let alice = insert_user(&db, "alice", false).await;
    let bob = insert_user(&db, "bob", false).await;
    let admin = insert_user(&db, "admin", true).await;
    let server = spawn_server(db.clone()).await;
    let client = reqwest::Client::new();

    // Alice creates two tasks, one assigned to Bob.
    let first = post(
        &client,
        &server,
        alice,
        false,
        CREATE_TASK,
        json!({ "input": { "title": "Write report", "priority": "HIGH" } }),
    )
    .await;
    assert!(first["errors"].is_null(), "{}", first);
    assert_eq!(first["data"]["createTask"]["status"], "TODO");
    assert_eq!(first["data"]["createTask"]["userId"], alice);
    assert_eq!(first["data"]["createTask"]["user"]["id"], alice);
    let first_id = first["data"]["createTask"]["id"].as_str().unwrap().to_string();

    let second = post(
        &client,
        &server,
        alice,
        false,
        CREATE_TASK,
        json!({ "input": { "title": "Review report", "assignedTo": bob } }),
    )
    .await;
    assert!(second["errors"].is_null(), "{}", second);

    // Bob sees none of Alice's tasks and cannot touch them.
    let bob_tasks = post(&client, &server, bob, false, "{ tasks { id } }", json!({})).await;
    assert_eq!(bob_tasks["data"]["tasks"], json!([]));

    let update = r#"
        mutation ($id: UUID!, $input: UpdateTaskInput!) {
            updateTask(id: $id, input: $input) { id status title }
        }
    "#;
    let denied = post(
        &client,
        &server,
        bob,
        false,
        update,
        json!({ "id": first_id, "input": { "status": "DONE" } }),
    )
    .await;
    assert_eq!(error_code(&denied), "NOT_FOUND");

    // Alice updates her task; untouched fields keep their value.
    let updated = post(
        &client,
        &server,
        alice,
        false,
        update,
        json!({ "id": first_id, "input": { "status": "IN_PROGRESS" } }),
    )
    .await;
    assert_eq!(updated["data"]["updateTask"]["status"], "IN_PROGRESS");
    assert_eq!(updated["data"]["updateTask"]["title"], "Write report");

    // The admin sees relations and batched counts for everyone.
    let overview = post(
        &client,
        &server,
        admin,
        true,
        r#"
            query ($ids: [Int!]) {
                users(where: { id: { in: $ids } }, orderBy: [{ field: ID, direction: ASC }]) {
                    id
                    taskCount
                    tasks(first: 1) { totalCount pageInfo { hasNextPage } edges { node { title } } }
                }
            }
        "#,
        json!({ "ids": [alice, bob] }),
    )
    .await;
    assert!(overview["errors"].is_null(), "{}", overview);
    let users = overview["data"]["users"].as_array().unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users[0]["taskCount"], 2);
    assert_eq!(users[0]["tasks"]["totalCount"], 2);
    assert_eq!(users[0]["tasks"]["pageInfo"]["hasNextPage"], true);
    assert_eq!(users[0]["tasks"]["edges"][0]["node"]["title"], "Review report");
    assert_eq!(users[1]["taskCount"], 0);

    // Paging forward with the returned cursor reaches the older task.
    let page = post(
        &client,
        &server,
        alice,
        false,
        "{ tasksConnection(first: 1) { edges { cursor } } }",
        json!({}),
    )
    .await;
    let cursor = page["data"]["tasksConnection"]["edges"][0]["cursor"]
        .as_str()
        .unwrap()
        .to_string();
    let next = post(
        &client,
        &server,
        alice,
        false,
        r#"
            query ($after: String) {
                tasksConnection(first: 1, after: $after) {
                    pageInfo { hasPreviousPage hasNextPage }
                    edges { node { title assignee { id } } }
                }
            }
        "#,
        json!({ "after": cursor }),
    )
    .await;
    let connection = &next["data"]["tasksConnection"];
    assert_eq!(connection["pageInfo"]["hasPreviousPage"], true);
    assert_eq!(connection["pageInfo"]["hasNextPage"], false);
    assert_eq!(connection["edges"][0]["node"]["title"], "Write report");
    assert!(connection["edges"][0]["node"]["assignee"].is_null());

    // Following `assignee` into Bob's tasks shows Alice nothing of his.
    let own = post(
        &client,
        &server,
        bob,
        false,
        CREATE_TASK,
        json!({ "input": { "title": "Bob private plan" } }),
    )
    .await;
    assert!(own["errors"].is_null(), "{}", own);

    let through_assignee = post(
        &client,
        &server,
        alice,
        false,
        r#"
            query ($bob: Int) {
                tasks(where: { assignedTo: { equals: $bob } }) {
                    title
                    assignee {
                        id
                        taskCount
                        tasks { totalCount edges { node { title } } }
                    }
                }
            }
        "#,
        json!({ "bob": bob }),
    )
    .await;
    assert!(through_assignee["errors"].is_null(), "{}", through_assignee);
    let assigned = &through_assignee["data"]["tasks"][0];
    assert_eq!(assigned["title"], "Review report");
    assert_eq!(assigned["assignee"]["id"], bob);
    assert_eq!(assigned["assignee"]["taskCount"], 0);
    assert_eq!(assigned["assignee"]["tasks"]["totalCount"], 0);
    assert_eq!(assigned["assignee"]["tasks"]["edges"], json!([]));

    let bob_view = post(
        &client,
        &server,
        bob,
        false,
        "{ me { taskCount tasks { edges { node { title } } } } }",
        json!({}),
    )
    .await;
    assert_eq!(bob_view["data"]["me"]["taskCount"], 1);
    assert_eq!(
        bob_view["data"]["me"]["tasks"]["edges"][0]["node"]["title"],
        "Bob private plan"
    );

    // Backward paging returns pages newest first and walks towards newer tasks.
    let both = post(
        &client,
        &server,
        alice,
        false,
        "{ tasksConnection(last: 2) { edges { node { title } } } }",
        json!({}),
    )
    .await;
    assert_eq!(
        edge_titles(&both["data"]["tasksConnection"]),
        vec!["Review report", "Write report"]
    );

    let oldest = post(
        &client,
        &server,
        alice,
        false,
        r#"
            {
                tasksConnection(last: 1) {
                    pageInfo { hasPreviousPage hasNextPage }
                    edges { cursor node { title } }
                }
            }
        "#,
        json!({}),
    )
    .await;
    let connection = &oldest["data"]["tasksConnection"];
    assert_eq!(edge_titles(connection), vec!["Write report"]);
    assert_eq!(connection["pageInfo"]["hasPreviousPage"], true);
    assert_eq!(connection["pageInfo"]["hasNextPage"], false);
    let before = connection["edges"][0]["cursor"].as_str().unwrap().to_string();

    let newer = post(
        &client,
        &server,
        alice,
        false,
        r#"
            query ($before: String) {
                tasksConnection(last: 1, before: $before) {
                    pageInfo { hasPreviousPage hasNextPage }
                    edges { node { title } }
                }
            }
        "#,
        json!({ "before": before }),
    )
    .await;
    let connection = &newer["data"]["tasksConnection"];
    assert_eq!(edge_titles(connection), vec!["Review report"]);
    assert_eq!(connection["pageInfo"]["hasPreviousPage"], false);
    assert_eq!(connection["pageInfo"]["hasNextPage"], true);

    // Filter operators against stored rows.
    for title in [
        "100% done",
        "100 percent done",
        "snake_case",
        "snakeXcase",
        "MiXeD Case",
    ] {
        let created = post(
            &client,
            &server,
            alice,
            false,
            CREATE_TASK,
            json!({ "input": { "title": title } }),
        )
        .await;
        assert!(created["errors"].is_null(), "{}", created);
    }

    let cases = [
        (r#"{ title: { contains: "100%" } }"#, vec!["100% done"]),
        (r#"{ title: { contains: "_case" } }"#, vec!["snake_case"]),
        (
            r#"{ title: { equals: "mixed case", mode: INSENSITIVE } }"#,
            vec!["MiXeD Case"],
        ),
        (
            r#"{ title: { in: ["MIXED CASE", "SNAKE_CASE"], mode: INSENSITIVE } }"#,
            vec!["MiXeD Case", "snake_case"],
        ),
        (r#"{ title: { in: [] } }"#, vec![]),
        (r#"{ OR: [] }"#, vec![]),
        (
            r#"{ NOT: [{ title: { contains: "report" } }] }"#,
            vec![
                "100 percent done",
                "100% done",
                "MiXeD Case",
                "snakeXcase",
                "snake_case",
            ],
        ),
    ];
    for (filter, expected) in cases {
        let query = format!("{{ tasks(where: {}) {{ title }} }}", filter);
        let body = post(&client, &server, alice, false, &query, json!({})).await;
        assert!(body["errors"].is_null(), "{}: {}", filter, body);
        assert_eq!(sorted_titles(&body["data"]["tasks"]), expected, "{}", filter);
    }

    server.handle.abort();
    cleanup_users(&db, &[alice, bob, admin]).await;
}

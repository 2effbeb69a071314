use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectOptions, Database, EntityTrait, PaginatorTrait,
    QueryFilter, Set,
};
use tower::ServiceExt;

use cinelog::{
    AppState, auth,
    config::Config,
    entities::{movie, movie_info, review, user},
};
use migration::{Migrator, MigratorTrait};

async fn test_state() -> Arc<AppState> {
    let mut options = ConnectOptions::new("sqlite::memory:".to_string());
    options.max_connections(1);
    let db = Database::connect(options).await.unwrap();
    cinelog::db::configure(&db).await.unwrap();
    Migrator::up(&db, None).await.unwrap();

    let config = Config {
        addr: "127.0.0.1:0".parse().unwrap(),
        database_url: "sqlite::memory:".to_string(),
        session_ttl_days: 14,
        admin_username: None,
        admin_password: None,
    };
    Arc::new(AppState { config: Arc::new(config), db })
}

/// Minimal browser: drives the router and carries cookies across requests.
struct TestClient {
    app: Router,
    jar: Vec<(String, String)>,
}

impl TestClient {
    fn new(state: &Arc<AppState>) -> Self {
        Self { app: cinelog::router(state.clone()), jar: Vec::new() }
    }

    async fn get(&mut self, path: &str) -> Response {
        self.send("GET", path, None).await
    }

    async fn post(&mut self, path: &str, body: &str) -> Response {
        self.send("POST", path, Some(body)).await
    }

    async fn send(&mut self, method: &str, path: &str, body: Option<&str>) -> Response {
        let mut builder = Request::builder().method(method).uri(path);
        if !self.jar.is_empty() {
            let cookies = self
                .jar
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join("; ");
            builder = builder.header(header::COOKIE, cookies);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        for value in response.headers().get_all(header::SET_COOKIE) {
            let raw = value.to_str().unwrap();
            let pair = raw.split(';').next().unwrap();
            let (name, value) = pair.split_once('=').unwrap();
            self.jar.retain(|(n, _)| n != name);
            if !value.is_empty() {
                self.jar.push((name.to_string(), value.to_string()));
            }
        }
        response
    }
}

async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn location(response: &Response) -> &str {
    response.headers().get(header::LOCATION).unwrap().to_str().unwrap()
}

async fn seed_movie(state: &Arc<AppState>, title: &str) -> movie::Model {
    movie::ActiveModel {
        id: Default::default(),
        title: Set(title.to_string()),
        description: Set(format!("{title} description")),
        poster: Set(None),
    }
    .insert(&state.db)
    .await
    .unwrap()
}

async fn signup(client: &mut TestClient, username: &str) {
    let body = format!("username={username}&password1=correct-horse&password2=correct-horse");
    let response = client.post("/signup/", &body).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER, "signup for {username} failed");
}

#[tokio::test]
async fn home_lists_movies_newest_first() {
    let state = test_state().await;
    let mut client = TestClient::new(&state);

    let response = client.get("/").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("No movies in the catalog yet."));
    assert!(body.contains("<dt>Movies</dt><dd>0</dd>"));

    seed_movie(&state, "Inception").await;
    seed_movie(&state, "Heat").await;

    let body = body_text(client.get("/").await).await;
    assert!(!body.contains("No movies in the catalog yet."));
    assert!(body.contains("<dt>Movies</dt><dd>2</dd>"));
    let inception = body.find("Inception").unwrap();
    let heat = body.find("Heat").unwrap();
    assert!(heat < inception, "newest movie should be listed first");
}

#[tokio::test]
async fn detail_page_treats_missing_info_as_normal() {
    let state = test_state().await;
    let mut client = TestClient::new(&state);
    let entry = seed_movie(&state, "Alien").await;

    let response = client.get(&format!("/movie/{}/", entry.id)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("No details available yet."));
    assert!(body.contains("No reviews yet."));

    let response = client.get("/movie/9999/").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn anonymous_review_post_redirects_to_login_without_mutating() {
    let state = test_state().await;
    let mut client = TestClient::new(&state);
    let entry = seed_movie(&state, "Dune").await;

    let response =
        client.post(&format!("/movie/{}/review/add/", entry.id), "rating=5").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(location(&response).starts_with("/login/?next="));

    assert_eq!(review::Entity::find().count(&state.db).await.unwrap(), 0);
}

#[tokio::test]
async fn add_review_then_duplicate_is_rejected() {
    let state = test_state().await;
    let mut client = TestClient::new(&state);
    let entry = seed_movie(&state, "Dune").await;
    signup(&mut client, "alice").await;

    let response = client
        .post(&format!("/movie/{}/review/add/", entry.id), "rating=5&review_text=stunning")
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), format!("/movie/{}/", entry.id));

    let body = body_text(client.get(&format!("/movie/{}/", entry.id)).await).await;
    assert!(body.contains("has been added successfully"));
    assert!(body.contains("Average rating: 5.0"));
    assert!(body.contains("Reviews (1)"));

    // A second submission must not change anything.
    let response =
        client.post(&format!("/movie/{}/review/add/", entry.id), "rating=2").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let body = body_text(client.get(&format!("/movie/{}/", entry.id)).await).await;
    assert!(body.contains("You have already reviewed this movie."));

    let rows = review::Entity::find().all(&state.db).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].rating, 5);
}

#[tokio::test]
async fn invalid_rating_is_a_notice_not_a_review() {
    let state = test_state().await;
    let mut client = TestClient::new(&state);
    let entry = seed_movie(&state, "Tenet").await;
    signup(&mut client, "alice").await;

    let response =
        client.post(&format!("/movie/{}/review/add/", entry.id), "rating=6").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let body = body_text(client.get(&format!("/movie/{}/", entry.id)).await).await;
    assert!(body.contains("Select a rating between 1 and 5."));
    assert_eq!(review::Entity::find().count(&state.db).await.unwrap(), 0);
}

#[tokio::test]
async fn average_rating_spans_reviewers() {
    let state = test_state().await;
    let entry = seed_movie(&state, "Arrival").await;

    let mut alice = TestClient::new(&state);
    signup(&mut alice, "alice").await;
    alice.post(&format!("/movie/{}/review/add/", entry.id), "rating=4").await;

    let mut bob = TestClient::new(&state);
    signup(&mut bob, "bob").await;
    bob.post(&format!("/movie/{}/review/add/", entry.id), "rating=5").await;

    let body = body_text(alice.get(&format!("/movie/{}/", entry.id)).await).await;
    assert!(body.contains("Average rating: 4.5"));
    assert!(body.contains("Reviews (2)"));
}

#[tokio::test]
async fn edit_overwrites_in_place_and_keeps_created_at() {
    let state = test_state().await;
    let mut client = TestClient::new(&state);
    let entry = seed_movie(&state, "Solaris").await;
    signup(&mut client, "alice").await;

    client.post(&format!("/movie/{}/review/add/", entry.id), "rating=4").await;
    let original = review::Entity::find().one(&state.db).await.unwrap().unwrap();

    // Age the row so the refreshed updated_at is observable.
    let mut aged: review::ActiveModel = original.clone().into();
    aged.created_at = Set(original.created_at - 1000);
    aged.updated_at = Set(original.updated_at - 1000);
    aged.update(&state.db).await.unwrap();

    let response = client
        .post(&format!("/movie/{}/review/edit/", entry.id), "rating=2&review_text=rewatched")
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let edited = review::Entity::find().one(&state.db).await.unwrap().unwrap();
    assert_eq!(edited.id, original.id);
    assert_eq!(edited.rating, 2);
    assert_eq!(edited.review_text, "rewatched");
    assert_eq!(edited.created_at, original.created_at - 1000);
    assert!(edited.updated_at > edited.created_at);
}

#[tokio::test]
async fn delete_then_add_has_no_lingering_conflict() {
    let state = test_state().await;
    let mut client = TestClient::new(&state);
    let entry = seed_movie(&state, "Brazil").await;
    signup(&mut client, "alice").await;

    client.post(&format!("/movie/{}/review/add/", entry.id), "rating=1").await;
    let response =
        client.post(&format!("/movie/{}/review/delete/", entry.id), "").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(review::Entity::find().count(&state.db).await.unwrap(), 0);

    let response =
        client.post(&format!("/movie/{}/review/add/", entry.id), "rating=3").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let rows = review::Entity::find().all(&state.db).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].rating, 3);
}

#[tokio::test]
async fn editing_or_deleting_a_missing_review_is_not_found() {
    let state = test_state().await;
    let mut client = TestClient::new(&state);
    let entry = seed_movie(&state, "Fargo").await;
    signup(&mut client, "alice").await;

    let response =
        client.post(&format!("/movie/{}/review/edit/", entry.id), "rating=3").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response =
        client.post(&format!("/movie/{}/review/delete/", entry.id), "").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn signup_rejects_taken_usernames() {
    let state = test_state().await;
    let mut client = TestClient::new(&state);
    signup(&mut client, "alice").await;

    let mut second = TestClient::new(&state);
    let response = second
        .post("/signup/", "username=alice&password1=correct-horse&password2=correct-horse")
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("This username is already taken."));

    assert_eq!(user::Entity::find().count(&state.db).await.unwrap(), 1);
}

#[tokio::test]
async fn login_rejects_bad_credentials_and_honors_remember_me() {
    let state = test_state().await;
    let mut client = TestClient::new(&state);
    signup(&mut client, "carol").await;

    // Signed-in visitors skip the form; the redirect is still non-cacheable.
    let response = client.get("/login/").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(header::CACHE_CONTROL).unwrap(), "no-store");

    client.get("/logout/").await;

    let response =
        client.post("/login/", "username=carol&password=wrong-horse").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get(header::CACHE_CONTROL).unwrap(), "no-store");
    let body = body_text(response).await;
    assert!(body.contains("Please enter a correct username and password."));

    // Browser-session cookie without remember-me.
    let response =
        client.post("/login/", "username=carol&password=correct-horse").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let set_cookie = response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect::<Vec<_>>()
        .join("\n");
    assert!(set_cookie.contains("cinelog_session="));
    assert!(!set_cookie.contains("Max-Age"));

    client.get("/logout/").await;
    let response = client
        .post("/login/", "username=carol&password=correct-horse&remember_me=on")
        .await;
    let set_cookie = response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect::<Vec<_>>()
        .join("\n");
    assert!(set_cookie.contains("Max-Age"));
}

#[tokio::test]
async fn login_redirects_to_next_path() {
    let state = test_state().await;
    let entry = seed_movie(&state, "Ran").await;
    let mut client = TestClient::new(&state);
    signup(&mut client, "carol").await;
    client.get("/logout/").await;

    let next = format!("/movie/{}/", entry.id);
    let response = client
        .post(
            &format!("/login/?next={}", urlencoding::encode(&next)),
            "username=carol&password=correct-horse",
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), next);
}

#[tokio::test]
async fn logout_is_idempotent() {
    let state = test_state().await;
    let mut client = TestClient::new(&state);

    let response = client.get("/logout/").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");

    // Again, still fine.
    let response = client.get("/logout/").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn console_is_invisible_to_non_operators() {
    let state = test_state().await;
    let mut client = TestClient::new(&state);

    let response = client.get("/admin/").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    signup(&mut client, "dave").await;
    let response = client.get("/admin/movies/").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

async fn operator_client(state: &Arc<AppState>) -> TestClient {
    auth::ensure_operator(&state.db, "root", "super-secret-1").await.unwrap();
    let mut client = TestClient::new(state);
    let response =
        client.post("/login/", "username=root&password=super-secret-1").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    client
}

#[tokio::test]
async fn console_movie_crud_with_duplicate_title_notice() {
    let state = test_state().await;
    let mut operator = operator_client(&state).await;

    let response = operator
        .post("/admin/movies/new/", "title=Heat&description=Crime+saga")
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin/movies/");

    // Unique title caught at the database boundary, shown as a form error.
    let response = operator
        .post("/admin/movies/new/", "title=Heat&description=Again")
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("A movie with this title already exists."));
    assert_eq!(movie::Entity::find().count(&state.db).await.unwrap(), 1);

    let entry = movie::Entity::find().one(&state.db).await.unwrap().unwrap();
    let response = operator
        .post(
            &format!("/admin/movies/{}/edit/", entry.id),
            "title=Heat+(1995)&description=Crime+saga",
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let updated = movie::Entity::find_by_id(entry.id).one(&state.db).await.unwrap().unwrap();
    assert_eq!(updated.title, "Heat (1995)");
}

#[tokio::test]
async fn console_movie_delete_cascades() {
    let state = test_state().await;
    let mut operator = operator_client(&state).await;
    let entry = seed_movie(&state, "Se7en").await;

    let response = operator
        .post(
            "/admin/movie-info/new/",
            &format!(
                "movie={}&director=Fincher&actor1=Pitt&actor2=Freeman&actor3=Paltrow&actor4=Spacey&year=1995",
                entry.id
            ),
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let mut reviewer = TestClient::new(&state);
    signup(&mut reviewer, "alice").await;
    reviewer.post(&format!("/movie/{}/review/add/", entry.id), "rating=5").await;

    let response =
        operator.post(&format!("/admin/movies/{}/delete/", entry.id), "").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    assert!(movie::Entity::find_by_id(entry.id).one(&state.db).await.unwrap().is_none());
    assert_eq!(movie_info::Entity::find().count(&state.db).await.unwrap(), 0);
    assert_eq!(review::Entity::find().count(&state.db).await.unwrap(), 0);
}

#[tokio::test]
async fn console_lists_filter_and_search() {
    let state = test_state().await;
    let mut operator = operator_client(&state).await;

    let heat = seed_movie(&state, "Heat").await;
    let alien = seed_movie(&state, "Alien").await;
    operator
        .post(
            "/admin/movie-info/new/",
            &format!(
                "movie={}&director=Mann&actor1=Pacino&actor2=De+Niro&actor3=Kilmer&actor4=Judd&year=1995",
                heat.id
            ),
        )
        .await;

    let body = body_text(operator.get("/admin/movies/?year=1995").await).await;
    assert!(body.contains("Heat"));
    assert!(!body.contains("Alien"));

    let body = body_text(operator.get("/admin/movies/?q=alien").await).await;
    assert!(body.contains("Alien"));
    assert!(!body.contains("Heat"));

    let body = body_text(operator.get("/admin/movie-info/?q=Pacino").await).await;
    assert!(body.contains("Mann"));

    let mut reviewer = TestClient::new(&state);
    signup(&mut reviewer, "alice").await;
    reviewer.post(&format!("/movie/{}/review/add/", alien.id), "rating=5").await;

    let body = body_text(operator.get("/admin/reviews/?rating=5").await).await;
    assert!(body.contains("alice"));
    assert!(body.contains("5/5"));
    let body = body_text(operator.get("/admin/reviews/?rating=2").await).await;
    assert!(body.contains("No reviews matched."));
    let body = body_text(operator.get("/admin/reviews/?q=alice").await).await;
    assert!(body.contains("5/5"));
    let body = body_text(operator.get("/admin/reviews/?q=nobody").await).await;
    assert!(body.contains("No reviews matched."));
}

#[tokio::test]
async fn description_preview_truncates_in_movie_list() {
    let state = test_state().await;
    let mut operator = operator_client(&state).await;

    movie::ActiveModel {
        id: Default::default(),
        title: Set("Long".to_string()),
        description: Set("d".repeat(80)),
        poster: Set(None),
    }
    .insert(&state.db)
    .await
    .unwrap();

    let body = body_text(operator.get("/admin/movies/").await).await;
    assert!(body.contains(&format!("{}...", "d".repeat(50))));
    assert!(!body.contains(&"d".repeat(51)));
}

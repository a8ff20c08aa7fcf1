use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode};
use core_types::ObjectId;
use database::InMemoryStore;
use serde_json::{Value, json};
use tower::ServiceExt;
use web_server::{AppState, router};

struct Harness {
    store: Arc<InMemoryStore>,
}

impl Harness {
    fn new() -> Self {
        Self {
            store: Arc::new(InMemoryStore::new()),
        }
    }

    fn app(&self) -> Router {
        router(AppState::new(self.store.clone()))
    }

    async fn call(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                request = request.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let response = self
            .app()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    async fn create_movie(&self, title: &str) -> String {
        let (status, body) = self
            .call(
                Method::POST,
                "/api/admin/movieseries",
                Some(json!({ "title": title, "releaseYear": 1999 })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        body["data"]["_id"].as_str().unwrap().to_string()
    }
}

#[tokio::test]
async fn created_movie_is_readable_through_detail_route() {
    let harness = Harness::new();
    let id = harness.create_movie("The Matrix").await;

    let (status, body) = harness
        .call(Method::GET, &format!("/api/movieseries/{id}"), None)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "The Matrix");
    assert_eq!(body["data"]["releaseYear"], 1999);
    assert_eq!(body["data"]["createdDate"], body["data"]["updatedDate"]);
}

#[tokio::test]
async fn blank_title_is_rejected() {
    let harness = Harness::new();

    let (status, body) = harness
        .call(
            Method::POST,
            "/api/admin/movieseries",
            Some(json!({ "title": "  " })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn update_keeps_ratings_and_creation_date() {
    let harness = Harness::new();
    let id = harness.create_movie("Heat").await;

    let (status, rated) = harness
        .call(
            Method::POST,
            &format!("/api/admin/movieseries/{id}/ratings"),
            Some(json!({ "source": "critics", "score": 8.0 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rated["data"]["averageRating"], 8.0);

    let (status, updated) = harness
        .call(
            Method::PUT,
            &format!("/api/admin/movieseries/{id}"),
            Some(json!({ "title": "Heat (1995)", "description": "Crime epic" })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["data"]["title"], "Heat (1995)");
    assert_eq!(updated["data"]["ratings"].as_array().unwrap().len(), 1);
    assert_eq!(updated["data"]["createdDate"], rated["data"]["createdDate"]);
}

#[tokio::test]
async fn out_of_range_rating_is_rejected() {
    let harness = Harness::new();
    let id = harness.create_movie("Alien").await;

    let (status, _) = harness
        .call(
            Method::POST,
            &format!("/api/admin/movieseries/{id}/ratings"),
            Some(json!({ "source": "critics", "score": 42.0 })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delete_is_a_soft_delete() {
    let harness = Harness::new();
    let id = harness.create_movie("Jaws").await;

    let (status, body) = harness
        .call(Method::DELETE, &format!("/api/admin/movieseries/{id}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "Inactive");

    let (_, detail) = harness
        .call(Method::GET, &format!("/api/movieseries/{id}"), None)
        .await;
    assert_eq!(detail["data"]["status"], "Inactive");

    let (_, active) = harness
        .call(Method::GET, "/api/admin/movieseries?status=active", None)
        .await;
    assert!(active["data"].as_array().unwrap().is_empty());

    let (_, inactive) = harness
        .call(Method::GET, "/api/admin/movieseries?status=Inactive", None)
        .await;
    assert_eq!(inactive["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn deleting_unknown_documents_is_not_found() {
    let harness = Harness::new();
    let unknown = ObjectId::new().to_hex();

    for uri in [
        format!("/api/admin/movieseries/{unknown}"),
        format!("/api/admin/cast/{unknown}"),
        format!("/api/admin/earnings/countries/{unknown}"),
        format!("/api/admin/earnings/actors/{unknown}"),
        "/api/admin/cast/garbage".to_string(),
    ] {
        let (status, body) = harness.call(Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(body["success"], false);
    }
}

#[tokio::test]
async fn cast_lifecycle() {
    let harness = Harness::new();

    let (status, created) = harness
        .call(
            Method::POST,
            "/api/admin/cast",
            Some(json!({
                "castName": "Keanu Reeves",
                "castType": "Actor",
                "expectedEarning": 1000000,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["data"]["status"], "Active");
    let id = created["data"]["_id"].as_str().unwrap().to_string();

    let (status, updated) = harness
        .call(
            Method::PUT,
            &format!("/api/admin/cast/{id}"),
            Some(json!({
                "castName": "Keanu Reeves",
                "castType": "Lead",
                "imageUrl": "https://img.example/keanu.jpg",
                "expectedEarning": 1250000.5,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["data"]["castType"], "Lead");
    assert_eq!(updated["data"]["expectedEarning"], 1250000.5);
    assert_eq!(updated["data"]["createdDate"], created["data"]["createdDate"]);

    let (status, _) = harness
        .call(
            Method::POST,
            "/api/admin/cast",
            Some(json!({
                "castName": "Nobody",
                "castType": "Extra",
                "expectedEarning": -5,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn updating_deactivated_cast_without_status_keeps_it_inactive() {
    let harness = Harness::new();
    let (_, created) = harness
        .call(
            Method::POST,
            "/api/admin/cast",
            Some(json!({ "castName": "Keanu", "castType": "Actor", "expectedEarning": 10 })),
        )
        .await;
    let id = created["data"]["_id"].as_str().unwrap().to_string();

    let (status, _) = harness
        .call(Method::DELETE, &format!("/api/admin/cast/{id}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, updated) = harness
        .call(
            Method::PUT,
            &format!("/api/admin/cast/{id}"),
            Some(json!({ "castName": "K2", "castType": "Actor", "expectedEarning": 12 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["data"]["castName"], "K2");
    assert_eq!(updated["data"]["status"], "Inactive");

    let (status, reactivated) = harness
        .call(
            Method::PUT,
            &format!("/api/admin/cast/{id}"),
            Some(json!({
                "castName": "K2",
                "castType": "Actor",
                "expectedEarning": 12,
                "status": "Active",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reactivated["data"]["status"], "Active");
}

#[tokio::test]
async fn updating_unknown_cast_is_not_found() {
    let harness = Harness::new();
    let (status, _) = harness
        .call(
            Method::PUT,
            &format!("/api/admin/cast/{}", ObjectId::new().to_hex()),
            Some(json!({ "castName": "Ghost", "castType": "Actor", "expectedEarning": 1 })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn earnings_must_reference_an_existing_movie() {
    let harness = Harness::new();

    let (status, _) = harness
        .call(
            Method::POST,
            "/api/admin/earnings/countries",
            Some(json!({
                "movieId": ObjectId::new().to_hex(),
                "countryId": "US",
                "payment": 10,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = harness
        .call(
            Method::POST,
            "/api/admin/earnings/actors",
            Some(json!({ "movieId": "nope", "actorId": "a1", "payment": 10 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn earnings_summary_totals_active_country_earnings() {
    let harness = Harness::new();
    let movie_id = harness.create_movie("Titanic").await;

    let mut last_id = String::new();
    for (country, payment) in [("US", 600), ("CN", 250), ("US", 50), ("FR", 90)] {
        let (status, body) = harness
            .call(
                Method::POST,
                "/api/admin/earnings/countries",
                Some(json!({ "movieId": movie_id, "countryId": country, "payment": payment })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        last_id = body["data"]["_id"].as_str().unwrap().to_string();
    }
    harness
        .call(
            Method::DELETE,
            &format!("/api/admin/earnings/countries/{last_id}"),
            None,
        )
        .await;

    let (status, body) = harness
        .call(
            Method::GET,
            &format!("/api/admin/movieseries/{movie_id}/earnings"),
            None,
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["movieId"], movie_id);
    assert_eq!(body["data"]["total"], 900.0);
    let countries = body["data"]["countries"].as_array().unwrap();
    assert_eq!(countries.len(), 2);
    assert_eq!(countries[0]["countryId"], "US");
    assert_eq!(countries[0]["total"], 650.0);
    assert_eq!(countries[1]["countryId"], "CN");

    let (_, listed) = harness
        .call(
            Method::GET,
            &format!("/api/admin/earnings/countries?movieId={movie_id}"),
            None,
        )
        .await;
    assert_eq!(listed["data"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn actor_earnings_are_listed_highest_first() {
    let harness = Harness::new();
    let movie_id = harness.create_movie("Speed").await;
    for (actor, payment) in [("sandra", 500), ("keanu", 900), ("dennis", 300)] {
        harness
            .call(
                Method::POST,
                "/api/admin/earnings/actors",
                Some(json!({ "movieId": movie_id, "actorId": actor, "payment": payment })),
            )
            .await;
    }

    let (status, body) = harness
        .call(
            Method::GET,
            &format!("/api/admin/earnings/actors?movieId={movie_id}&limit=2"),
            None,
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    let actors: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["actorId"].as_str().unwrap())
        .collect();
    assert_eq!(actors, vec!["keanu", "sandra"]);
}

#[tokio::test]
async fn created_users_appear_on_leaderboard() {
    let harness = Harness::new();
    for (name, xp) in [("neo", 10), ("trinity", 30)] {
        let (status, body) = harness
            .call(
                Method::POST,
                "/api/admin/users",
                Some(json!({ "username": name, "monthlyXP": xp })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["username"], name);
    }

    let (_, body) = harness
        .call(Method::GET, "/api/users/leaderboard", None)
        .await;

    assert_eq!(
        body["data"],
        json!([
            { "username": "trinity", "monthlyXP": 30 },
            { "username": "neo", "monthlyXP": 10 },
        ])
    );
}

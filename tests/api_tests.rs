use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use cookbook::config::Config;
use cookbook::db::Store;
use cookbook::models::catalog::{NewIngredient, default_tags};
use cookbook::state::SharedState;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

struct TestApp {
    router: Router,
    breakfast: i64,
    lunch: i64,
    dinner: i64,
    flour: i64,
    salt: i64,
    sugar: i64,
}

async fn spawn_app() -> TestApp {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();

    let store = Store::new(&config.general.database_path)
        .await
        .expect("Failed to open store");

    store.seed_tags(default_tags()).await.unwrap();
    store
        .import_ingredients(vec![
            NewIngredient {
                name: "Flour".to_string(),
                measurement_unit: "g".to_string(),
            },
            NewIngredient {
                name: "Salt".to_string(),
                measurement_unit: "g".to_string(),
            },
            NewIngredient {
                name: "Sugar".to_string(),
                measurement_unit: "g".to_string(),
            },
        ])
        .await
        .unwrap();

    let tags = store.list_tags().await.unwrap();
    let tag = |slug: &str| i64::from(tags.iter().find(|t| t.slug == slug).unwrap().id.value());
    let ingredients = store.list_ingredients(None).await.unwrap();
    let ingredient =
        |name: &str| i64::from(ingredients.iter().find(|i| i.name == name).unwrap().id.value());

    let shared = Arc::new(SharedState::with_store(config, store.clone()));
    let state = cookbook::api::create_app_state(shared, None);

    TestApp {
        router: cookbook::api::router(state).await,
        breakfast: tag("breakfast"),
        lunch: tag("lunch"),
        dinner: tag("dinner"),
        flour: ingredient("Flour"),
        salt: ingredient("Salt"),
        sugar: ingredient("Sugar"),
    }
}

impl TestApp {
    async fn call(
        &self,
        method: &str,
        uri: &str,
        api_key: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(key) = api_key {
            builder = builder.header("X-Api-Key", key);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    /// Registers a user and returns (id, api key).
    async fn register(&self, username: &str) -> (i64, String) {
        let (status, body) = self
            .call(
                "POST",
                "/api/users",
                None,
                Some(json!({
                    "email": format!("{username}@example.com"),
                    "username": username,
                    "first_name": "Test",
                    "last_name": "User",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        (
            body["data"]["id"].as_i64().unwrap(),
            body["data"]["api_key"].as_str().unwrap().to_string(),
        )
    }

    async fn create_recipe(&self, key: &str, name: &str, tags: &[i64], lines: Value) -> i64 {
        let (status, body) = self
            .call(
                "POST",
                "/api/recipes",
                Some(key),
                Some(json!({
                    "name": name,
                    "text": "Mix and bake.",
                    "cooking_time": 30,
                    "image": "images/recipe.png",
                    "tags": tags,
                    "ingredients": lines,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["data"]["id"].as_i64().unwrap()
    }
}

#[tokio::test]
async fn test_auth_resolution() {
    let app = spawn_app().await;
    let (_, key) = app.register("alice").await;

    let (status, _) = app.call("GET", "/api/recipes", None, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .call("GET", "/api/recipes", Some("wrong-key"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], json!(false));

    let (status, _) = app.call("GET", "/api/users/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/users/me")
                .header("Authorization", format!("Token {key}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["data"]["username"], json!("alice"));
}

#[tokio::test]
async fn test_register_rejects_duplicates() {
    let app = spawn_app().await;
    app.register("alice").await;

    let (status, body) = app
        .call(
            "POST",
            "/api/users",
            None,
            Some(json!({
                "email": "alice@example.com",
                "username": "someone-else",
                "first_name": "A",
                "last_name": "B",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
}

#[tokio::test]
async fn test_recipe_lifecycle() {
    let app = spawn_app().await;
    let (alice_id, alice) = app.register("alice").await;
    let (_, bob) = app.register("bob").await;

    let id = app
        .create_recipe(
            &alice,
            "Bread",
            &[app.breakfast, app.lunch],
            json!([
                { "id": app.flour, "amount": 500 },
                { "id": app.salt, "amount": "5" },
            ]),
        )
        .await;

    let (status, body) = app
        .call("GET", &format!("/api/recipes/{id}"), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let recipe = &body["data"];
    assert_eq!(recipe["author"]["id"], json!(alice_id));
    assert_eq!(recipe["tags"].as_array().unwrap().len(), 2);
    assert_eq!(recipe["ingredients"].as_array().unwrap().len(), 2);
    assert_eq!(recipe["is_favorited"], json!(false));

    // Someone else cannot edit it.
    let (status, _) = app
        .call(
            "PATCH",
            &format!("/api/recipes/{id}"),
            Some(&bob),
            Some(json!({ "name": "Stolen" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .call(
            "PATCH",
            &format!("/api/recipes/{id}"),
            Some(&alice),
            Some(json!({
                "name": "Sweet bread",
                "ingredients": [{ "id": app.sugar, "amount": 20 }],
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["name"], json!("Sweet bread"));
    let ingredients = body["data"]["ingredients"].as_array().unwrap();
    assert_eq!(ingredients.len(), 1);
    assert_eq!(ingredients[0]["name"], json!("Sugar"));
    assert_eq!(ingredients[0]["amount"], json!(20));
    // Tags were not supplied and stay as they were.
    assert_eq!(body["data"]["tags"].as_array().unwrap().len(), 2);

    let (status, _) = app
        .call("DELETE", &format!("/api/recipes/{id}"), Some(&bob), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .call("DELETE", &format!("/api/recipes/{id}"), Some(&alice), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app
        .call("GET", &format!("/api/recipes/{id}"), None, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_recipe_writes_nothing() {
    let app = spawn_app().await;
    let (_, alice) = app.register("alice").await;

    let cases = [
        json!([]),
        json!([
            { "id": app.flour, "amount": 1 },
            { "id": app.flour, "amount": 2 },
        ]),
        json!([{ "id": app.flour, "amount": 0 }]),
        json!([{ "id": 9999, "amount": 1 }]),
    ];

    for ingredients in cases {
        let (status, body) = app
            .call(
                "POST",
                "/api/recipes",
                Some(&alice),
                Some(json!({
                    "name": "Broken",
                    "text": "-",
                    "cooking_time": 10,
                    "image": "",
                    "tags": [app.lunch],
                    "ingredients": ingredients,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    }

    let (_, body) = app.call("GET", "/api/recipes", None, None).await;
    assert_eq!(body["data"]["count"], json!(0));
}

#[tokio::test]
async fn test_favorite_toggle_and_filter() {
    let app = spawn_app().await;
    let (_, alice) = app.register("alice").await;
    let (_, bob) = app.register("bob").await;

    let lines = json!([{ "id": app.flour, "amount": 100 }]);
    let first = app
        .create_recipe(&alice, "First", &[app.lunch], lines.clone())
        .await;
    app.create_recipe(&alice, "Second", &[app.dinner], lines)
        .await;

    let uri = format!("/api/recipes/{first}/favorite");

    let (status, body) = app.call("POST", &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["name"], json!("First"));

    let (status, body) = app.call("POST", &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("recipe is already in favorites"));

    let (_, body) = app
        .call("GET", "/api/recipes?is_favorited=1", Some(&bob), None)
        .await;
    assert_eq!(body["data"]["count"], json!(1));
    assert_eq!(body["data"]["results"][0]["is_favorited"], json!(true));

    // Anonymous viewers get the unfiltered catalog.
    let (status, body) = app
        .call("GET", "/api/recipes?is_favorited=1", None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["count"], json!(2));

    let (status, _) = app.call("DELETE", &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = app.call("DELETE", &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("recipe is not in favorites"));

    let (status, _) = app
        .call("POST", "/api/recipes/9999/favorite", Some(&bob), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.call("POST", &uri, None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_tag_filter_and_pagination() {
    let app = spawn_app().await;
    let (_, alice) = app.register("alice").await;

    let lines = json!([{ "id": app.salt, "amount": 1 }]);
    app.create_recipe(&alice, "Porridge", &[app.breakfast], lines.clone())
        .await;
    app.create_recipe(&alice, "Soup", &[app.lunch, app.dinner], lines.clone())
        .await;
    app.create_recipe(&alice, "Stew", &[app.dinner], lines).await;

    let (_, body) = app
        .call("GET", "/api/recipes?tags=lunch&tags=dinner", None, None)
        .await;
    let names: Vec<_> = body["data"]["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["Stew", "Soup"]);

    let (_, body) = app
        .call("GET", "/api/recipes?limit=2", None, None)
        .await;
    assert_eq!(body["data"]["count"], json!(3));
    assert_eq!(body["data"]["next"], json!(2));
    assert_eq!(body["data"]["previous"], Value::Null);
    assert_eq!(body["data"]["results"].as_array().unwrap().len(), 2);

    let (_, body) = app
        .call("GET", "/api/recipes?limit=2&page=2", None, None)
        .await;
    assert_eq!(body["data"]["next"], Value::Null);
    assert_eq!(body["data"]["previous"], json!(1));
    assert_eq!(body["data"]["results"][0]["name"], json!("Porridge"));

    let (status, _) = app
        .call("GET", "/api/recipes?page=0", None, None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .call("GET", "/api/recipes?page=18446744073709551615", None, None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");

    let (status, body) = app
        .call(
            "GET",
            "/api/users/subscriptions?page=18446744073709551615&limit=100",
            Some(&alice),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");

    let (status, body) = app
        .call("GET", "/api/recipes?page=1000", None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["results"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_subscriptions() {
    let app = spawn_app().await;
    let (alice_id, alice) = app.register("alice").await;
    let (bob_id, bob) = app.register("bob").await;

    let lines = json!([{ "id": app.flour, "amount": 1 }]);
    app.create_recipe(&alice, "One", &[app.lunch], lines.clone())
        .await;
    app.create_recipe(&alice, "Two", &[app.lunch], lines).await;

    let (status, body) = app
        .call("POST", &format!("/api/users/{bob_id}/subscribe"), Some(&bob), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("self-subscription"));

    let uri = format!("/api/users/{alice_id}/subscribe");
    let (status, body) = app
        .call("POST", &format!("{uri}?recipes_limit=1"), Some(&bob), None)
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["recipes_count"], json!(2));
    assert_eq!(body["data"]["recipes"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"]["is_subscribed"], json!(true));

    let (status, _) = app.call("POST", &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = app
        .call("GET", &format!("/api/users/{alice_id}"), Some(&bob), None)
        .await;
    assert_eq!(body["data"]["is_subscribed"], json!(true));

    let (_, body) = app
        .call("GET", "/api/users/subscriptions", Some(&bob), None)
        .await;
    assert_eq!(body["data"]["count"], json!(1));
    assert_eq!(body["data"]["results"][0]["username"], json!("alice"));

    let (status, _) = app.call("DELETE", &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.call("DELETE", &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .call("POST", "/api/users/9999/subscribe", Some(&bob), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_download_shopping_cart() {
    let app = spawn_app().await;
    let (_, alice) = app.register("alice").await;

    let a = app
        .create_recipe(
            &alice,
            "A",
            &[app.lunch],
            json!([
                { "id": app.flour, "amount": 200 },
                { "id": app.salt, "amount": 5 },
            ]),
        )
        .await;
    let b = app
        .create_recipe(
            &alice,
            "B",
            &[app.lunch],
            json!([{ "id": app.flour, "amount": 300 }]),
        )
        .await;

    for id in [a, b] {
        let (status, _) = app
            .call(
                "POST",
                &format!("/api/recipes/{id}/shopping_cart"),
                Some(&alice),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/recipes/download_shopping_cart")
                .header("X-Api-Key", &alice)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    let content_type: mime::Mime = headers[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert_eq!(content_type.essence_str(), mime::TEXT_PLAIN.essence_str());
    assert_eq!(
        headers[header::CONTENT_DISPOSITION],
        "attachment; filename=\"shopping_list.txt\""
    );

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert_eq!(text, "Shopping list\n\n- Flour (g) — 500\n- Salt (g) — 5\n");

    let (status, _) = app
        .call("GET", "/api/recipes/download_shopping_cart", None, None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_catalog_lookups() {
    let app = spawn_app().await;

    let (status, body) = app.call("GET", "/api/tags", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 3);

    let (status, body) = app
        .call("GET", &format!("/api/tags/{}", app.breakfast), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["slug"], json!("breakfast"));

    let (status, _) = app.call("GET", "/api/tags/9999", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = app
        .call("GET", "/api/ingredients?name=s", None, None)
        .await;
    let names: Vec<_> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["Salt", "Sugar"]);

    for wildcard in ["%25", "_a", "%5C"] {
        let (status, body) = app
            .call("GET", &format!("/api/ingredients?name={wildcard}"), None, None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], json!([]), "name={wildcard}");
    }

    let (status, body) = app
        .call("GET", &format!("/api/ingredients/{}", app.flour), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["measurement_unit"], json!("g"));
}

#[cfg(test)]
mod tests {
    use crate::build_app;
    use crate::config::AppConfig;
    use crate::db::{Farm, Fertilizer};
    use crate::middleware::auth::Claims;
    use crate::ml::stub::StubMl;
    use crate::state::AppState;
    use crate::store::memory::MemoryStore;
    use crate::store::{AgriStore, NewRecommendation};
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::Router;
    use chrono::{Duration, NaiveDate, Utc};
    use http_body_util::BodyExt;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use rust_decimal::Decimal;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;
    use uuid::Uuid;

    const FARMER: i32 = 7;

    fn token(farmer_id: i32, secret: &str) -> String {
        let claims = Claims {
            sub: "9876543210".to_string(),
            farmer_id,
            phone: Some("9876543210".to_string()),
            exp: (Utc::now().timestamp() + 3600) as usize,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn fertilizer(name: &str, kind: &str, price: i64) -> Fertilizer {
        Fertilizer {
            fertilizer_id: Uuid::new_v4(),
            fertilizer_name: name.to_string(),
            fertilizer_type: kind.to_string(),
            npk_ratio: None,
            nitrogen_percent: None,
            phosphorus_percent: None,
            potassium_percent: None,
            application_method: None,
            suitable_crops: vec!["All crops".to_string()],
            price_per_kg: Some(Decimal::new(price, 0)),
            manufacturer: None,
            image_url: None,
        }
    }

    fn seeded_store() -> MemoryStore {
        let store = MemoryStore::new().with_fertilizers(vec![
            fertilizer("DAP", "chemical", 27),
            fertilizer("Vermicompost", "organic", 8),
            fertilizer("Neem Cake", "Organic", 20),
        ]);
        store.add_farm(Farm {
            id: 1,
            farmer_id: FARMER,
            land_size: 2.0,
            soil_type: "Black".to_string(),
            irrigation_source: "Well".to_string(),
            district: "Nashik".to_string(),
            created_at: Utc::now(),
        });
        store
    }

    fn app() -> Router {
        app_with(seeded_store())
    }

    fn app_with(store: MemoryStore) -> Router {
        let state = AppState::new(
            AppConfig::for_tests(),
            Arc::new(store),
            Arc::new(StubMl::offline()),
        )
        .unwrap();
        build_app(state)
    }

    async fn call(app: Router, req: Request<Body>) -> (StatusCode, Value) {
        let res = app.oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn get(uri: &str, bearer: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(t) = bearer {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", t));
        }
        builder.body(Body::empty()).unwrap()
    }

    fn post(uri: &str, bearer: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", bearer))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn health_is_public() {
        let (status, body) = call(app(), get("/api/health", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn news_feed_is_public_and_static_without_key() {
        let (status, body) = call(app(), get("/api/online/news", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["news"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn weather_without_key_is_the_fallback() {
        let (status, body) = call(app(), get("/api/online/weather?lat=18.5&lon=73.8", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], false);
        assert_eq!(body["city"], "Nashik");
        assert_eq!(body["wind"].as_f64(), Some(12.0));
    }

    #[tokio::test]
    async fn protected_routes_need_a_valid_token() {
        let (status, body) = call(app(), get("/api/farms", None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);

        let forged = token(FARMER, "someone-else");
        let (status, _) = call(app(), get("/api/farms", Some(&forged))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = call(app(), get("/api/farms", Some(&token(FARMER, "test-secret")))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["farms"][0]["district"], "Nashik");
    }

    #[tokio::test]
    async fn farm_registration_returns_created() {
        let t = token(FARMER, "test-secret");
        let (status, body) = call(
            app(),
            post(
                "/api/farms",
                &t,
                json!({"landSize": 3.5, "soilType": "Red", "district": "Satara"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["farm"]["irrigation_source"], "Rainfed");

        let (status, body) = call(
            app(),
            post(
                "/api/farms",
                &t,
                json!({"landSize": -1.0, "soilType": "Red", "district": "Satara"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn fertilizer_for_unknown_farm_is_404() {
        let t = token(FARMER, "test-secret");
        let (status, body) = call(
            app(),
            post(
                "/api/fertilizer/recommendations",
                &t,
                json!({"farmId": 42, "cropId": 1, "growthStage": "Basal"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"success": false, "error": "Farm not found"}));
    }

    #[tokio::test]
    async fn crop_recommendation_survives_service_outage() {
        let t = token(FARMER, "test-secret");
        let (status, body) = call(
            app(),
            post("/api/recommend", &t, json!({"farmId": 1, "rainfall": 650})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["source"], "fallback");
        // The in-memory catalog has no crops.
        assert_eq!(body["recommendations"], json!([]));
    }

    #[tokio::test]
    async fn organic_search_ignores_type_case() {
        let t = token(FARMER, "test-secret");
        let (status, body) = call(
            app(),
            get("/api/fertilizer/search?organic_only=true&crop=Wheat", Some(&t)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 2);
        assert_eq!(body["fertilizers"][0]["fertilizer_name"], "Vermicompost");
        assert_eq!(body["fertilizers"][1]["fertilizer_name"], "Neem Cake");
    }

    #[tokio::test]
    async fn explicit_type_search_is_exact() {
        let t = token(FARMER, "test-secret");
        let (status, body) = call(app(), get("/api/fertilizer/search?type=organic", Some(&t))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 1);
        assert_eq!(body["fertilizers"][0]["fertilizer_name"], "Vermicompost");
    }

    #[tokio::test]
    async fn soil_test_upload_interprets_readings() {
        let t = token(FARMER, "test-secret");
        let (status, body) = call(
            app(),
            post(
                "/api/fertilizer/soil-test/1",
                &t,
                json!({"nitrogen": 200, "phosphorus": 30, "potassium": 100, "ph": 6.8}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["soil_test"]["soil_health_score"], 60);
        assert_eq!(body["interpretation"]["overall_health"], "Good");
        assert!(body["interpretation"]["phosphorus"]
            .as_str()
            .unwrap()
            .starts_with("High"));
    }

    #[tokio::test]
    async fn history_routes_filter_by_caller_and_farm() {
        let store = seeded_store();
        let base = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
        for (i, (farmer_id, farm_id)) in [(FARMER, 1), (FARMER, 2), (FARMER, 1), (9, 5)]
            .into_iter()
            .cycle()
            .take(28)
            .enumerate()
        {
            store
                .insert_recommendation(NewRecommendation {
                    farmer_id,
                    farm_id,
                    crop_id: 1,
                    growth_stage: "Basal".to_string(),
                    soil_test_id: None,
                    recommendation_date: base + Duration::days(i as i64),
                    fertilizer_plan: json!([]),
                    total_cost: None,
                    expected_yield_increase: None,
                })
                .await
                .unwrap();
        }
        let app = app_with(store);
        let t = token(FARMER, "test-secret");

        let (status, body) = call(
            app.clone(),
            get("/api/fertilizer/recommendations/history", Some(&t)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let recs = body["recommendations"].as_array().unwrap();
        // 21 belong to the caller; the newest 20 come back.
        assert_eq!(recs.len(), 20);
        assert!(recs.iter().all(|r| r["farmer_id"] == FARMER));
        assert_eq!(recs[0]["recommendation_date"], "2025-02-27");
        let dates: Vec<&str> = recs
            .iter()
            .map(|r| r["recommendation_date"].as_str().unwrap())
            .collect();
        assert!(dates.windows(2).all(|w| w[0] > w[1]));

        let (status, body) = call(
            app.clone(),
            get("/api/fertilizer/recommendations/history/2", Some(&t)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let recs = body["recommendations"].as_array().unwrap();
        assert_eq!(recs.len(), 7);
        assert!(recs.iter().all(|r| r["farm_id"] == 2));

        let (_, body) = call(
            app,
            get("/api/fertilizer/recommendations/history", Some(&token(9, "test-secret"))),
        )
        .await;
        assert_eq!(body["recommendations"].as_array().unwrap().len(), 7);
    }
}

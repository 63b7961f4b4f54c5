use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{multipart, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use time::Date;
use tracing::{debug, info, instrument, warn};

use super::NutritionApi;
use crate::auth::{AuthResponse, LoginRequest, RegisterRequest};
use crate::config::AppConfig;
use crate::error::ApiError;
use crate::foods::{BarcodeResponse, Food, NewFood};
use crate::images::{parse_candidates, ImageUpload, RecognizedFoodCandidate};
use crate::meals::dto::{format_date, CreatedMeal};
use crate::meals::{CreateMealRequest, Meal, MealId};
use crate::storage::CredentialStore;
use crate::users::{ProfileUpdate, UserProfile};

/// `reqwest`-backed facade. The bearer token is read from the injected store
/// on every request.
pub struct HttpApi {
    base_url: String,
    http: reqwest::Client,
    credentials: Arc<dyn CredentialStore>,
}

impl HttpApi {
    pub fn new(config: &AppConfig, credentials: Arc<dyn CredentialStore>) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("nutritrack/", env!("CARGO_PKG_VERSION")))
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            base_url: config.api_base_url.clone(),
            http,
            credentials,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, rb: RequestBuilder) -> RequestBuilder {
        match self.credentials.token() {
            Some(token) => rb.bearer_auth(token),
            None => rb,
        }
    }

    async fn send(&self, rb: RequestBuilder) -> Result<reqwest::Response, ApiError> {
        let resp = self.authorized(rb).send().await?;
        check_response(resp).await
    }

    async fn fetch_json<T: DeserializeOwned>(
        &self,
        rb: RequestBuilder,
        what: &'static str,
    ) -> Result<T, ApiError> {
        let text = self.send(rb).await?.text().await?;
        decode(&text, what)
    }
}

/// Maps non-success statuses: 401/403 to [`ApiError::Unauthorized`], the rest
/// to [`ApiError::Status`].
async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    let message = error_message(&body);
    warn!(status = status.as_u16(), %message, "backend returned error");
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(ApiError::Unauthorized {
            status: status.as_u16(),
            message,
        });
    }
    Err(ApiError::Status {
        status: status.as_u16(),
        message,
    })
}

/// `message` from the backend's JSON error body, else the raw text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

fn decode<T: DeserializeOwned>(text: &str, what: &'static str) -> Result<T, ApiError> {
    serde_json::from_str(text).map_err(|e| {
        warn!(what, error = %e, "response decode failed");
        ApiError::Parse(format!("{what}: {e}"))
    })
}

#[async_trait]
impl NutritionApi for HttpApi {
    #[instrument(skip_all, fields(username = %request.username))]
    async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        let rb = self.http.post(self.url("/auth/register")).json(request);
        self.fetch_json(rb, "auth response").await
    }

    #[instrument(skip_all, fields(username = %request.username))]
    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ApiError> {
        // sent without the stored token
        let resp = self
            .http
            .post(self.url("/auth/login"))
            .json(request)
            .send()
            .await?;
        let text = check_response(resp).await?.text().await?;
        decode(&text, "auth response")
    }

    #[instrument(skip(self))]
    async fn profile(&self) -> Result<UserProfile, ApiError> {
        let rb = self.http.get(self.url("/users/profile"));
        self.fetch_json(rb, "user profile").await
    }

    #[instrument(skip(self))]
    async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserProfile, ApiError> {
        let rb = self.http.put(self.url("/users/profile")).json(update);
        self.fetch_json(rb, "user profile").await
    }

    #[instrument(skip(self))]
    async fn recommended_calories(&self) -> Result<Option<i32>, ApiError> {
        let rb = self.http.get(self.url("/users/recommended-calories"));
        let text = self.send(rb).await?.text().await?;
        if text.trim().is_empty() {
            return Ok(None);
        }
        decode(&text, "recommended calories")
    }

    #[instrument(skip(self))]
    async fn search_foods(&self, name: &str) -> Result<Vec<Food>, ApiError> {
        let rb = self
            .http
            .get(self.url("/foods/search"))
            .query(&[("name", name)]);
        let foods: Vec<Food> = self.fetch_json(rb, "food list").await?;
        debug!(results = foods.len(), "food search done");
        Ok(foods)
    }

    #[instrument(skip(self))]
    async fn food(&self, id: i64) -> Result<Food, ApiError> {
        let rb = self.http.get(self.url(&format!("/foods/{id}")));
        self.fetch_json(rb, "food").await
    }

    #[instrument(skip_all, fields(name = %food.name))]
    async fn create_food(&self, food: &NewFood) -> Result<Food, ApiError> {
        let rb = self.http.post(self.url("/foods")).json(food);
        let created: Food = self.fetch_json(rb, "created food").await?;
        info!(food_id = created.id, "food created");
        Ok(created)
    }

    #[instrument(skip(self))]
    async fn food_by_barcode(&self, barcode: &str) -> Result<Option<Food>, ApiError> {
        let rb = self
            .http
            .get(self.url(&format!("/barcode/{}", barcode.trim())));
        let resp = self.authorized(rb).send().await?;
        if resp.status() == StatusCode::NOT_FOUND {
            debug!("barcode not found");
            return Ok(None);
        }
        let text = check_response(resp).await?.text().await?;
        let body: BarcodeResponse = decode(&text, "barcode response")?;
        Ok(body.into_food())
    }

    #[instrument(skip_all, fields(file = %image.file_name, bytes = image.body.len()))]
    async fn analyze_image(
        &self,
        image: &ImageUpload,
    ) -> Result<Vec<RecognizedFoodCandidate>, ApiError> {
        let part = multipart::Part::bytes(image.body.to_vec())
            .file_name(image.file_name.clone())
            .mime_str(image.content_type)?;
        let form = multipart::Form::new().part("file", part);
        let rb = self.http.post(self.url("/image/analyze")).multipart(form);
        let text = self.send(rb).await?.text().await?;
        let candidates = parse_candidates(&text)?;
        debug!(candidates = candidates.len(), "image analyzed");
        Ok(candidates)
    }

    #[instrument(skip_all, fields(meal_type = ?request.meal_type, foods = request.foods.len()))]
    async fn create_meal(&self, request: &CreateMealRequest) -> Result<MealId, ApiError> {
        let rb = self.http.post(self.url("/meals")).json(request);
        let created: CreatedMeal = self.fetch_json(rb, "created meal").await?;
        Ok(created.id)
    }

    #[instrument(skip(self))]
    async fn meal(&self, id: MealId) -> Result<Meal, ApiError> {
        let rb = self.http.get(self.url(&format!("/meals/{id}")));
        self.fetch_json(rb, "meal").await
    }

    #[instrument(skip(self), fields(date = %format_date(date)))]
    async fn meals_by_date(&self, date: Date) -> Result<Vec<Meal>, ApiError> {
        let rb = self
            .http
            .get(self.url(&format!("/meals/date/{}", format_date(date))));
        self.fetch_json(rb, "meal list").await
    }

    #[instrument(skip(self))]
    async fn meals_in_range(&self, start: Date, end: Date) -> Result<Vec<Meal>, ApiError> {
        let rb = self.http.get(self.url("/meals/range")).query(&[
            ("startDate", format_date(start)),
            ("endDate", format_date(end)),
        ]);
        self.fetch_json(rb, "meal list").await
    }

    #[instrument(skip(self))]
    async fn delete_meal(&self, id: MealId) -> Result<(), ApiError> {
        let rb = self.http.delete(self.url(&format!("/meals/{id}")));
        self.send(rb).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use axum::{
        extract::{Path, Query},
        http::{HeaderMap, StatusCode as AxumStatus},
        response::IntoResponse,
        routing::{get, post},
        Json, Router,
    };
    use bytes::Bytes;
    use serde_json::json;
    use time::macros::date;

    use super::*;
    use crate::meals::{MealDraft, MealType};
    use crate::storage::MemoryCredentials;

    const TOKEN: &str = "tok-123";

    fn has_token(headers: &HeaderMap) -> bool {
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            == Some(&format!("Bearer {TOKEN}")[..])
    }

    fn unauthorized() -> axum::response::Response {
        (
            AxumStatus::UNAUTHORIZED,
            Json(json!({"status": 401, "message": "Full authentication is required"})),
        )
            .into_response()
    }

    fn backend() -> Router {
        let api = Router::new()
            .route(
                "/auth/login",
                post(|Json(body): Json<serde_json::Value>| async move {
                    if body["password"] == "pw" {
                        Json(json!({"token": TOKEN, "id": 1, "username": body["username"], "email": "ana@example.com"}))
                            .into_response()
                    } else {
                        unauthorized()
                    }
                }),
            )
            .route(
                "/foods/search",
                get(|headers: HeaderMap, Query(q): Query<HashMap<String, String>>| async move {
                    if !has_token(&headers) {
                        return unauthorized();
                    }
                    let name = q.get("name").cloned().unwrap_or_default();
                    if name == "nothing" {
                        return Json(json!([])).into_response();
                    }
                    Json(json!([
                        {"id": 5, "name": name, "calories": 130.0, "protein": "2.7"},
                        {"id": 6, "name": "Brown rice", "calories": null}
                    ]))
                    .into_response()
                }),
            )
            .route(
                "/barcode/:code",
                get(|Path(code): Path<String>| async move {
                    if code == "00000000" {
                        (
                            AxumStatus::NOT_FOUND,
                            Json(json!({"found": false, "barcode": code, "message": "Product not found in database"})),
                        )
                            .into_response()
                    } else {
                        Json(json!({"found": true, "barcode": code, "food": {"id": 9, "name": "Hazelnut spread", "calories": 539}}))
                            .into_response()
                    }
                }),
            )
            .route(
                "/image/analyze",
                post(|body: Bytes| async move {
                    if body.windows(4).any(|w| w == b"JUNK") {
                        return "The image shows a sandwich.".into_response();
                    }
                    "```json\n[{\"foodName\": \"Rice\", \"estimatedPortion\": 180, \"portionUnit\": \"g\"}]\n```"
                        .into_response()
                }),
            )
            .route(
                "/meals",
                post(|Json(body): Json<serde_json::Value>| async move {
                    Json(json!({"id": 42, "mealType": body["mealType"], "mealDate": body["mealDate"], "mealFoods": []}))
                }),
            )
            .route(
                "/meals/date/:date",
                get(|Path(date): Path<String>| async move {
                    Json(json!([{
                        "id": 1, "mealType": "BREAKFAST", "mealDate": date,
                        "mealFoods": [
                            {"id": 10, "food": {"id": 5, "name": "Oats", "calories": 380}, "quantity": 50, "servings": 0.5},
                            {"id": 11, "food": {"id": 6}, "quantity": 100, "servings": 1}
                        ]
                    }]))
                }),
            )
            .route(
                "/meals/range",
                get(|Query(q): Query<HashMap<String, String>>| async move {
                    Json(json!([
                        {"id": 1, "mealType": "LUNCH", "mealDate": q["startDate"], "mealFoods": []},
                        {"id": 2, "mealType": "DINNER", "mealDate": q["endDate"], "mealFoods": []}
                    ]))
                }),
            )
            .route(
                "/meals/:id",
                get(|Path(id): Path<i64>| async move {
                    if id != 7 {
                        return (
                            AxumStatus::INTERNAL_SERVER_ERROR,
                            Json(json!({"status": 500, "message": "Meal not found"})),
                        )
                            .into_response();
                    }
                    Json(json!({
                        "id": 7, "mealType": "SNACK", "mealDate": "2024-03-09", "notes": "afternoon",
                        "mealFoods": [{"id": 70, "food": {"id": 5, "name": "Apple", "calories": 52}, "quantity": 150, "servings": 1.5}]
                    }))
                    .into_response()
                })
                .delete(|| async { AxumStatus::NO_CONTENT }),
            )
            .route(
                "/foods",
                post(|Json(body): Json<serde_json::Value>| async move {
                    let mut stored = body.clone();
                    stored["id"] = json!(77);
                    Json(stored)
                }),
            )
            .route(
                "/foods/:id",
                get(|Path(id): Path<i64>| async move {
                    Json(json!({"id": id, "name": "Rolled oats", "calories": 379, "source": "USDA"}))
                }),
            )
            .route(
                "/users/profile",
                get(|| async {
                    (
                        AxumStatus::FORBIDDEN,
                        Json(json!({"status": 403, "message": "Access Denied"})),
                    )
                }),
            )
            .route(
                "/users/recommended-calories",
                get(|| async { Json(json!(2150)) }),
            );
        Router::new().nest("/api", api)
    }

    async fn spawn() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, backend()).await.unwrap();
        });
        format!("http://{addr}/api")
    }

    async fn client(token: Option<&str>) -> HttpApi {
        let base = spawn().await;
        let creds: Arc<dyn CredentialStore> = match token {
            Some(t) => Arc::new(MemoryCredentials::with_token(t)),
            None => Arc::new(MemoryCredentials::default()),
        };
        HttpApi::new(&AppConfig::with_base_url(base), creds).unwrap()
    }

    #[tokio::test]
    async fn login_success_and_bad_credentials() {
        let api = client(None).await;
        let ok = api
            .login(&LoginRequest {
                username: "ana".into(),
                password: "pw".into(),
            })
            .await
            .unwrap();
        assert_eq!(ok.token, TOKEN);
        assert_eq!(ok.username, "ana");

        let err = api
            .login(&LoginRequest {
                username: "ana".into(),
                password: "nope".into(),
            })
            .await
            .unwrap_err();
        assert!(err.is_auth_failure());
        assert_eq!(err.server_message(), Some("Full authentication is required"));
    }

    #[tokio::test]
    async fn search_attaches_bearer_and_decodes_leniently() {
        let api = client(Some(TOKEN)).await;
        let foods = api.search_foods("White rice").await.unwrap();
        assert_eq!(foods.len(), 2);
        assert_eq!(foods[0].name, "White rice");
        assert_eq!(foods[0].protein, Some(2.7));
        assert_eq!(foods[1].calories, None);

        assert!(api.search_foods("nothing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_token_is_unauthorized() {
        let api = client(None).await;
        let err = api.search_foods("rice").await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized { status: 401, .. }));
    }

    #[tokio::test]
    async fn forbidden_is_unauthorized_too() {
        let api = client(Some(TOKEN)).await;
        let err = api.profile().await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized { status: 403, .. }));
        assert_eq!(err.server_message(), Some("Access Denied"));
    }

    #[tokio::test]
    async fn barcode_found_and_not_found() {
        let api = client(Some(TOKEN)).await;
        let food = api.food_by_barcode("3017620422003").await.unwrap();
        assert_eq!(food.map(|f| f.id), Some(9));
        assert!(api.food_by_barcode("00000000").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn analyze_strips_fence_and_flags_prose() {
        let api = client(Some(TOKEN)).await;
        let image = ImageUpload {
            body: Bytes::from_static(b"\xff\xd8\xff\xe0 jpeg"),
            file_name: "plate.jpg".into(),
            content_type: "image/jpeg",
        };
        let found = api.analyze_image(&image).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].portion_grams(), Some(180.0));

        let junk = ImageUpload {
            body: Bytes::from_static(b"JUNK"),
            ..image
        };
        let err = api.analyze_image(&junk).await.unwrap_err();
        assert!(matches!(err, ApiError::Parse(_)));
    }

    #[tokio::test]
    async fn meals_roundtrip_through_backend() {
        let api = client(Some(TOKEN)).await;
        let day = date!(2024 - 03 - 09);

        let meals = api.meals_by_date(day).await.unwrap();
        assert_eq!(meals.len(), 1);
        assert_eq!(meals[0].meal_date, day);
        // second line's food is an id-only stub: name missing, nutrients missing
        let totals = crate::meals::aggregate(&meals);
        assert_eq!(totals.day.calories, 190.0);

        let range = api
            .meals_in_range(day, date!(2024 - 03 - 15))
            .await
            .unwrap();
        assert_eq!(range.len(), 2);
        assert_eq!(range[1].meal_date, date!(2024 - 03 - 15));

        let mut draft = MealDraft::new(MealType::Lunch, day);
        draft.foods.add(&Food::named(5, "Oats"), None).unwrap();
        assert_eq!(draft.submit(&api).await.unwrap(), 42);

        api.delete_meal(42).await.unwrap();
    }

    #[tokio::test]
    async fn create_food_posts_user_food() {
        let api = client(Some(TOKEN)).await;
        let new = NewFood {
            protein: Some(4.0),
            ..NewFood::new("Grandma's stew", 95.0)
        };
        let created = api.create_food(&new).await.unwrap();
        assert_eq!(created.id, 77);
        assert_eq!(created.name, "Grandma's stew");
        assert_eq!(created.protein, Some(4.0));
        assert_eq!(created.source, Some(crate::foods::FoodSource::UserCreated));
    }

    #[tokio::test]
    async fn single_food_and_meal_by_id() {
        let api = client(Some(TOKEN)).await;
        let food = api.food(12).await.unwrap();
        assert_eq!((food.id, food.calories), (12, Some(379.0)));

        let meal = api.meal(7).await.unwrap();
        assert_eq!(meal.meal_type, MealType::Snack);
        assert_eq!(meal.notes.as_deref(), Some("afternoon"));
        assert_eq!(crate::meals::aggregate(&[meal]).day.calories, 78.0);

        let err = api.meal(8).await.unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert_eq!(err.server_message(), Some("Meal not found"));
    }

    #[tokio::test]
    async fn recommended_calories_number() {
        let api = client(Some(TOKEN)).await;
        assert_eq!(api.recommended_calories().await.unwrap(), Some(2150));
    }

    #[test]
    fn error_message_prefers_json_message() {
        assert_eq!(
            error_message(r#"{"status":400,"message":"Username already exists","errors":null}"#),
            "Username already exists"
        );
        assert_eq!(
            error_message("OpenAI API rate limit exceeded. Please try again later.\n"),
            "OpenAI API rate limit exceeded. Please try again later."
        );
        assert_eq!(error_message(r#"{"error":"x"}"#), r#"{"error":"x"}"#);
    }
}

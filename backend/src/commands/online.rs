use crate::error::{KrishiError, KrishiResult};
use crate::state::AppState;
use axum::extract::{Json, Query, State as AxumState};
use serde::{Deserialize, Serialize};

const WEATHER_URL: &str = "https://api.openweathermap.org/data/2.5/weather";
const NEWS_URL: &str = "https://newsapi.org/v2/everything";
const DEFAULT_LAT: f64 = 19.9975;
const DEFAULT_LON: f64 = 73.7898;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WeatherParams {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherReport {
    pub success: bool,
    pub city: String,
    pub temp: i64,
    pub description: String,
    pub icon: String,
    pub humidity: i64,
    pub wind: f64,
}

impl WeatherReport {
    /// Shown whenever live weather is unavailable.
    pub fn fallback() -> Self {
        WeatherReport {
            success: false,
            city: "Nashik".to_string(),
            temp: 28,
            description: "Clear Sky".to_string(),
            icon: "01d".to_string(),
            humidity: 45,
            wind: 12.0,
        }
    }
}

#[derive(Deserialize)]
struct OwmResponse {
    name: String,
    main: OwmMain,
    weather: Vec<OwmCondition>,
    wind: OwmWind,
}

#[derive(Deserialize)]
struct OwmMain {
    temp: f64,
    humidity: i64,
}

#[derive(Deserialize)]
struct OwmCondition {
    description: String,
    icon: String,
}

#[derive(Deserialize)]
struct OwmWind {
    speed: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewsItem {
    pub title: String,
    pub source: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub img: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewsFeed {
    pub success: bool,
    pub news: Vec<NewsItem>,
}

#[derive(Deserialize)]
struct NewsApiResponse {
    articles: Vec<NewsApiArticle>,
}

#[derive(Deserialize)]
struct NewsApiArticle {
    title: String,
    source: NewsApiSource,
    url: String,
    #[serde(rename = "urlToImage")]
    url_to_image: Option<String>,
}

#[derive(Deserialize)]
struct NewsApiSource {
    name: String,
}

pub fn static_headlines() -> Vec<NewsItem> {
    [
        ("New high-yield soybean variety released for Maharashtra", "AgriNews"),
        ("Monsoon expected to be normal this year, says IMD", "Times of India"),
        ("Mandi prices for Cotton surge in Vidarbha region", "Market Watch"),
    ]
    .into_iter()
    .map(|(title, source)| NewsItem {
        title: title.to_string(),
        source: source.to_string(),
        url: "#".to_string(),
        img: None,
    })
    .collect()
}

async fn fetch_weather(
    http: &reqwest::Client,
    api_key: &str,
    lat: f64,
    lon: f64,
) -> KrishiResult<WeatherReport> {
    let res = http
        .get(WEATHER_URL)
        .query(&[
            ("lat", lat.to_string()),
            ("lon", lon.to_string()),
            ("appid", api_key.to_string()),
            ("units", "metric".to_string()),
        ])
        .send()
        .await?
        .error_for_status()?;
    let data: OwmResponse = res.json().await?;
    weather_report(data)
}

fn weather_report(data: OwmResponse) -> KrishiResult<WeatherReport> {
    let condition = data
        .weather
        .into_iter()
        .next()
        .ok_or_else(|| KrishiError::Internal("Weather feed reported no conditions".to_string()))?;

    Ok(WeatherReport {
        success: true,
        city: data.name,
        temp: data.main.temp.round() as i64,
        description: condition.description,
        icon: condition.icon,
        humidity: data.main.humidity,
        wind: data.wind.speed,
    })
}

async fn fetch_news(http: &reqwest::Client, api_key: &str) -> KrishiResult<Vec<NewsItem>> {
    let res = http
        .get(NEWS_URL)
        .query(&[
            ("q", "agriculture india"),
            ("sortBy", "publishedAt"),
            ("pageSize", "5"),
            ("apiKey", api_key),
        ])
        .send()
        .await?
        .error_for_status()?;
    let data: NewsApiResponse = res.json().await?;

    Ok(data
        .articles
        .into_iter()
        .map(|a| NewsItem {
            title: a.title,
            source: a.source.name,
            url: a.url,
            img: a.url_to_image,
        })
        .collect())
}

/// Live weather when a key is configured; the static Nashik report otherwise.
pub async fn live_weather(
    http: &reqwest::Client,
    api_key: Option<&str>,
    params: &WeatherParams,
) -> WeatherReport {
    let Some(key) = api_key else {
        return WeatherReport::fallback();
    };
    let lat = params.lat.unwrap_or(DEFAULT_LAT);
    let lon = params.lon.unwrap_or(DEFAULT_LON);

    match fetch_weather(http, key, lat, lon).await {
        Ok(report) => report,
        Err(e) => {
            tracing::warn!("Weather API error, serving fallback: {}", e);
            WeatherReport::fallback()
        }
    }
}

pub async fn agri_news(http: &reqwest::Client, api_key: Option<&str>) -> Vec<NewsItem> {
    let Some(key) = api_key else {
        return static_headlines();
    };
    match fetch_news(http, key).await {
        Ok(news) => news,
        Err(e) => {
            tracing::warn!("News API error, serving static headlines: {}", e);
            static_headlines()
        }
    }
}

pub async fn get_weather_axum(
    AxumState(state): AxumState<AppState>,
    Query(params): Query<WeatherParams>,
) -> Json<WeatherReport> {
    Json(live_weather(&state.http, state.config.weather_api_key.as_deref(), &params).await)
}

pub async fn get_news_axum(AxumState(state): AxumState<AppState>) -> Json<NewsFeed> {
    let news = agri_news(&state.http, state.config.news_api_key.as_deref()).await;
    Json(NewsFeed { success: true, news })
}

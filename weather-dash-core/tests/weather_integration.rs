//! Integration tests for the weather fallback chain using wiremock.
//!
//! One-call, basic and sample data must be tried in that order, and every
//! snapshot must say which of them produced it.

use weather_dash_core::{
    Config, Endpoints, GeoPoint, Provenance, WeatherRequest, WeatherService, Zone,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const KEY: &str = "test-key";

fn config_for(server: &MockServer) -> Config {
    Config {
        api_key: Some(KEY.to_string()),
        endpoints: Endpoints::rooted_at(&server.uri()),
        ..Config::default()
    }
}

fn tehran() -> WeatherRequest {
    WeatherRequest::named(GeoPoint::new(35.6892, 51.389), "Tehran, Tehran")
}

fn condition() -> serde_json::Value {
    serde_json::json!([{ "id": 800, "main": "Clear", "description": "clear sky", "icon": "01d" }])
}

fn onecall_body() -> serde_json::Value {
    let hourly: Vec<_> = (0..48)
        .map(|i| {
            serde_json::json!({
                "dt": 1_767_225_600 + i * 3600,
                "temp": 12.0, "feels_like": 11.0, "humidity": 40, "pressure": 1018,
                "clouds": 0, "wind_speed": 1.5, "wind_deg": 270, "uvi": 1.0,
                "weather": condition()
            })
        })
        .collect();
    let daily: Vec<_> = (0..8)
        .map(|i| {
            serde_json::json!({
                "dt": 1_767_254_400 + i * 86_400,
                "temp": { "min": 4.0, "max": 14.0, "morn": 6.0, "eve": 11.0, "night": 5.0 },
                "humidity": 40, "pressure": 1018, "clouds": 0, "wind_speed": 2.0,
                "wind_deg": 270, "uvi": 3.0, "moon_phase": 0.25,
                "sunrise": 1_767_238_000, "sunset": 1_767_274_000,
                "weather": condition()
            })
        })
        .collect();

    serde_json::json!({
        "lat": 35.6892, "lon": 51.389, "timezone": "Asia/Tehran", "timezone_offset": 12600,
        "current": {
            "dt": 1_767_225_600, "temp": 12.4, "feels_like": 11.2, "humidity": 38,
            "pressure": 1019, "dew_point": -1.5, "uvi": 2.1, "clouds": 0, "visibility": 10000,
            "wind_speed": 2.0, "wind_deg": 300, "sunrise": 1_767_238_000, "sunset": 1_767_274_000,
            "weather": condition()
        },
        "hourly": hourly,
        "daily": daily
    })
}

fn current_body() -> serde_json::Value {
    serde_json::json!({
        "coord": { "lat": 35.6892, "lon": 51.389 },
        "weather": condition(),
        "main": { "temp": 13.0, "feels_like": 12.0, "humidity": 35, "pressure": 1017 },
        "visibility": 8000,
        "wind": { "speed": 3.0, "deg": 180 },
        "clouds": { "all": 5 },
        "sys": { "sunrise": 1_767_238_000, "sunset": 1_767_274_000 },
        "timezone": 12600,
        "name": "Tehran"
    })
}

fn forecast_body() -> serde_json::Value {
    let list: Vec<_> = (0..40)
        .map(|i| {
            serde_json::json!({
                "dt": 1_767_225_600 + i * 10_800,
                "main": { "temp": 10.0 + (i % 8) as f64, "feels_like": 9.0, "humidity": 50, "pressure": 1015 },
                "weather": condition(),
                "wind": { "speed": 2.0, "deg": 90 },
                "clouds": { "all": 10 }
            })
        })
        .collect();
    serde_json::json!({ "cod": "200", "cnt": 40, "list": list })
}

async fn mount_basic(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("appid", KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_body()))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .and(query_param("appid", KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_onecall_success_is_used_first() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/3.0/onecall"))
        .and(query_param("appid", KEY))
        .and(query_param("units", "metric"))
        .and(query_param("lang", "en"))
        .respond_with(ResponseTemplate::new(200).set_body_json(onecall_body()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_body()))
        .expect(0)
        .mount(&server)
        .await;

    let service = WeatherService::from_config(&config_for(&server));
    let snapshot = service.fetch(&tehran()).await;

    assert_eq!(snapshot.provenance, Provenance::OneCall);
    assert_eq!(snapshot.location_name, "Tehran, Tehran");
    assert_eq!(snapshot.hourly.len(), 48);
    assert_eq!(snapshot.daily.len(), 7);
    assert_eq!(snapshot.timezone, Some(Zone::Named("Asia/Tehran".into())));
    assert_eq!(snapshot.current.wind_kmh, 7.2);
    assert_eq!(snapshot.current.dew_point_c, Some(-1.5));
}

#[tokio::test]
async fn test_onecall_unauthorized_falls_back_to_basic() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/3.0/onecall"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "cod": 401,
            "message": "Please note that using One Call 3.0 requires a separate subscription"
        })))
        .expect(1)
        .mount(&server)
        .await;
    mount_basic(&server).await;

    let service = WeatherService::from_config(&config_for(&server));
    let snapshot = service.fetch(&tehran()).await;

    assert_eq!(snapshot.provenance, Provenance::Basic);
    assert_eq!(snapshot.hourly.len(), 8);
    assert!(snapshot.daily.len() <= 5);
    assert_eq!(snapshot.timezone, Some(Zone::OffsetSeconds(12600)));
    assert_eq!(snapshot.current.visibility_km, 8.0);
    assert_eq!(snapshot.current.uv_index, 0.0);
}

#[tokio::test]
async fn test_malformed_onecall_payload_falls_back_to_basic() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/3.0/onecall"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;
    mount_basic(&server).await;

    let snapshot = WeatherService::from_config(&config_for(&server))
        .fetch(&tehran())
        .await;
    assert_eq!(snapshot.provenance, Provenance::Basic);
}

#[tokio::test]
async fn test_basic_needs_both_calls() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/3.0/onecall"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_body()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let snapshot = WeatherService::from_config(&config_for(&server))
        .fetch(&tehran())
        .await;
    assert_eq!(snapshot.provenance, Provenance::Sample);
    assert_eq!(snapshot.location_name, "Tehran, Tehran");
}

#[tokio::test]
async fn test_invalid_key_yields_sample() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "cod": 401,
            "message": "Invalid API key. Please see https://openweathermap.org/faq#error401 for more info."
        })))
        .mount(&server)
        .await;

    let snapshot = WeatherService::from_config(&config_for(&server))
        .fetch(&WeatherRequest::at(GeoPoint::new(35.70, 51.40)))
        .await;

    assert_eq!(snapshot.provenance, Provenance::Sample);
    assert_eq!(snapshot.location_name, "Sample Location");
    assert_eq!(snapshot.hourly.len(), 48);
    assert_eq!(snapshot.daily.len(), 7);
}

#[tokio::test]
async fn test_placeholder_key_never_calls_upstream() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let config = Config {
        api_key: Some("YOUR_API_KEY_HERE".to_string()),
        endpoints: Endpoints::rooted_at(&server.uri()),
        ..Config::default()
    };
    let service = WeatherService::from_config(&config);
    assert!(!service.is_configured());

    let snapshot = service.fetch(&tehran()).await;
    assert_eq!(snapshot.provenance, Provenance::Sample);
}

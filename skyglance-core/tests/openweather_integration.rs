//! Integration tests for the OpenWeather provider and the session on top of it,
//! run against a wiremock server.

use std::{collections::HashMap, time::Duration};

use serde_json::json;
use skyglance_core::{
    Coordinates, DisplayPreferences, LocationQuery, OpenWeatherProvider, RenderTarget, Slot,
    WeatherError, WeatherProvider, WeatherSession,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const KEY: &str = "TEST_KEY";

fn provider(server: &MockServer) -> OpenWeatherProvider {
    OpenWeatherProvider::with_base_url(KEY.to_string(), &server.uri(), Duration::from_secs(5))
        .expect("client should build")
}

fn bangkok_current() -> serde_json::Value {
    json!({
        "coord": { "lon": 100.5167, "lat": 13.75 },
        "weather": [{ "id": 801, "main": "Clouds", "description": "few clouds", "icon": "02d" }],
        "main": { "temp": 31.4, "feels_like": 36.2, "temp_min": 30.0, "temp_max": 32.0, "pressure": 1008, "humidity": 62 },
        "visibility": 10000,
        "wind": { "speed": 3.6, "deg": 200 },
        "dt": 1760860800,
        "sys": { "country": "TH", "sunrise": 1760828400, "sunset": 1760871000 },
        "timezone": 25200,
        "name": "Bangkok",
        "cod": 200
    })
}

fn bangkok_forecast() -> serde_json::Value {
    json!({
        "cod": "200",
        "cnt": 3,
        "list": [
            { "dt": 1760864400, "main": { "temp": 30.1 }, "dt_txt": "2026-10-19 09:00:00" },
            { "dt": 1760875200, "main": { "temp": 28.4 }, "dt_txt": "2026-10-19 12:00:00" },
            { "dt": 1760886000, "main": { "temp": 27.0 }, "dt_txt": "2026-10-19 15:00:00" }
        ],
        "city": { "name": "Bangkok", "country": "TH" }
    })
}

async fn mount_bangkok(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("q", "Bangkok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(bangkok_current()))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .and(query_param("q", "Bangkok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(bangkok_forecast()))
        .mount(server)
        .await;
}

#[derive(Debug, Default)]
struct Card {
    texts: HashMap<Slot, String>,
    alerts: Vec<String>,
}

impl RenderTarget for Card {
    fn set_text(&mut self, slot: Slot, text: &str) {
        self.texts.insert(slot, text.to_string());
    }

    fn set_image(&mut self, slot: Slot, url: &str, _alt: &str) {
        self.texts.insert(slot, url.to_string());
    }

    fn alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }
}

#[tokio::test]
async fn test_current_weather_by_city() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("q", "Bangkok"))
        .and(query_param("appid", KEY))
        .and(query_param("units", "metric"))
        .respond_with(ResponseTemplate::new(200).set_body_json(bangkok_current()))
        .expect(1)
        .mount(&server)
        .await;

    let snapshot = provider(&server).current(&LocationQuery::city("Bangkok")).await.unwrap();

    assert_eq!(snapshot.location_label(), "Bangkok, TH");
    assert_eq!(snapshot.temperature_c, 31.4);
    assert_eq!(snapshot.feels_like_c, 36.2);
    assert_eq!(snapshot.humidity_pct, 62);
    assert_eq!(snapshot.wind_speed_mps, 3.6);
    assert_eq!(snapshot.visibility_m, Some(10000));
    assert_eq!(snapshot.condition, "few clouds");
    assert_eq!(snapshot.icon, "02d");
    assert_eq!(snapshot.coordinates, Coordinates::new(13.75, 100.5167));
    assert_eq!(snapshot.sunrise.timestamp(), 1760828400);
}

#[tokio::test]
async fn test_current_weather_by_coordinates() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("lat", "13.75"))
        .and(query_param("lon", "100.5167"))
        .respond_with(ResponseTemplate::new(200).set_body_json(bangkok_current()))
        .expect(1)
        .mount(&server)
        .await;

    let query = LocationQuery::Coordinates(Coordinates::new(13.75, 100.5167));
    let snapshot = provider(&server).current(&query).await.unwrap();

    assert_eq!(snapshot.city, "Bangkok");
}

#[tokio::test]
async fn test_current_weather_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(json!({ "cod": "404", "message": "city not found" })),
        )
        .mount(&server)
        .await;

    let err = provider(&server).current(&LocationQuery::city("Atlantis")).await.unwrap_err();

    assert!(err.is_not_found(), "expected NotFound, got {err}");
    assert_eq!(err.user_message(), "City not found");
}

#[tokio::test]
async fn test_current_weather_error_body_with_ok_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "cod": "404", "message": "city not found" })),
        )
        .mount(&server)
        .await;

    let err = provider(&server).current(&LocationQuery::city("Atlantis")).await.unwrap_err();

    assert!(err.is_not_found(), "expected NotFound, got {err}");
    assert_eq!(err.user_message(), "City not found");
}

#[tokio::test]
async fn test_current_weather_rejected_status_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({ "cod": "400", "message": "Nothing to geocode" })),
        )
        .mount(&server)
        .await;

    let err = provider(&server).current(&LocationQuery::city("!!")).await.unwrap_err();

    assert!(err.is_not_found(), "expected NotFound, got {err}");
    assert_eq!(err.user_message(), "City not found");
}

#[tokio::test]
async fn test_forecast_unauthorized_is_fetch_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "cod": 401, "message": "Invalid API key" })),
        )
        .mount(&server)
        .await;

    let err = provider(&server).forecast(&LocationQuery::city("Bangkok")).await.unwrap_err();

    assert!(matches!(err, WeatherError::Status { .. }), "got {err}");
    assert!(err.to_string().contains("401"));
    assert_eq!(err.user_message(), "Failed to fetch weather.");
}

#[tokio::test]
async fn test_malformed_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = provider(&server).forecast(&LocationQuery::city("Bangkok")).await.unwrap_err();

    assert!(matches!(err, WeatherError::Malformed { .. }), "got {err}");
    assert_eq!(err.user_message(), "Failed to fetch weather.");
}

#[tokio::test]
async fn test_forecast_samples() {
    let server = MockServer::start().await;
    mount_bangkok(&server).await;

    let series = provider(&server).forecast(&LocationQuery::city("Bangkok")).await.unwrap();

    assert_eq!(series.samples.len(), 3);
    assert_eq!(series.samples[0].temperature_c, 30.1);
    assert_eq!(series.samples[0].time.timestamp(), 1760864400);
    assert_eq!(series.samples[2].temperature_c, 27.0);
}

#[tokio::test]
async fn test_geocode_suggestions() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/geo/1.0/direct"))
        .and(query_param("q", "Lon"))
        .and(query_param("limit", "5"))
        .and(query_param("appid", KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "name": "London", "country": "GB", "state": "England", "lat": 51.5073, "lon": -0.1276 },
            { "name": "London", "country": "CA", "state": "Ontario", "lat": 42.9832, "lon": -81.2433 }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let items = provider(&server).geocode("Lon", 5).await.unwrap();

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].label(), "London, GB");
    assert_eq!(items[1].to_string(), "London, CA (Ontario)");
}

#[tokio::test]
async fn test_uv_index() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/uvi"))
        .and(query_param("lat", "13.75"))
        .and(query_param("lon", "100.5167"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "lat": 13.75, "lon": 100.5167, "date_iso": "2026-10-19T12:00:00Z", "date": 1760875200, "value": 9.87
        })))
        .mount(&server)
        .await;

    let value = provider(&server).uv_index(Coordinates::new(13.75, 100.5167)).await.unwrap();

    assert_eq!(value, 9.87);
}

#[tokio::test]
async fn test_session_search_renders_card() {
    let server = MockServer::start().await;
    mount_bangkok(&server).await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/uvi"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": 9.87 })))
        .mount(&server)
        .await;

    let session = WeatherSession::new(provider(&server), Card::default(), DisplayPreferences::default());

    let outcome = session.search("Bangkok").await.unwrap();

    assert!(!outcome.is_superseded());
    let card = session.target();
    assert_eq!(card.texts.get(&Slot::Location).map(String::as_str), Some("Bangkok, TH"));
    assert_eq!(card.texts.get(&Slot::Condition).map(String::as_str), Some("Few Clouds"));
    assert_eq!(card.texts.get(&Slot::CurrentTemperature).map(String::as_str), Some("31°C"));
    assert_eq!(card.texts.get(&Slot::Humidity).map(String::as_str), Some("62%"));
    assert_eq!(card.texts.get(&Slot::Visibility).map(String::as_str), Some("10.0 km"));
    assert_eq!(card.texts.get(&Slot::UvIndex).map(String::as_str), Some("9.87"));
    assert_eq!(card.texts.get(&Slot::UvStatus).map(String::as_str), Some("High"));
    assert_eq!(
        card.texts.get(&Slot::WeatherIcon).map(String::as_str),
        Some("https://openweathermap.org/img/wn/02d@2x.png")
    );
    assert!(card.alerts.is_empty());
}

#[tokio::test]
async fn test_session_uv_failure_shows_placeholders() {
    let server = MockServer::start().await;
    mount_bangkok(&server).await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/uvi"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let session = WeatherSession::new(provider(&server), Card::default(), DisplayPreferences::default());

    session.search("Bangkok").await.unwrap();

    let card = session.target();
    assert_eq!(card.texts.get(&Slot::Location).map(String::as_str), Some("Bangkok, TH"));
    assert_eq!(card.texts.get(&Slot::UvIndex).map(String::as_str), Some("--"));
    assert_eq!(card.texts.get(&Slot::UvStatus).map(String::as_str), Some("--"));
    assert!(card.alerts.is_empty());
}

#[tokio::test]
async fn test_session_forecast_failure_keeps_previous_state() {
    let server = MockServer::start().await;
    mount_bangkok(&server).await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("q", "Oslo"))
        .respond_with(ResponseTemplate::new(200).set_body_json({
            let mut body = bangkok_current();
            body["name"] = json!("Oslo");
            body["sys"]["country"] = json!("NO");
            body
        }))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .and(query_param("q", "Oslo"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/uvi"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": 2.0 })))
        .mount(&server)
        .await;

    let session = WeatherSession::new(provider(&server), Card::default(), DisplayPreferences::default());
    session.search("Bangkok").await.unwrap();

    let err = session.search("Oslo").await.unwrap_err();

    assert!(!err.is_not_found());
    let state = session.state();
    assert_eq!(state.weather.as_ref().map(|b| b.snapshot.city.as_str()), Some("Bangkok"));
    drop(state);
    let card = session.target();
    assert_eq!(card.texts.get(&Slot::Location).map(String::as_str), Some("Bangkok, TH"));
    assert_eq!(card.alerts, vec!["Failed to fetch weather.".to_string()]);
}

#[tokio::test]
async fn test_short_suggestion_input_makes_no_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/geo/1.0/direct"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let session = WeatherSession::new(provider(&server), Card::default(), DisplayPreferences::default());

    let list = session.suggest("L").await.applied().unwrap();

    assert!(list.is_empty());
    assert_eq!(session.target().texts.get(&Slot::Suggestions).map(String::as_str), Some(""));
}

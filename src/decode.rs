//! Shape decoding
//!
//! Turns a response body into a typed record according to the shape its
//! source was classified as. Unknown shapes are never parsed; their body is
//! returned as raw text.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::classifier::Shape;
use crate::error::FetchError;
use crate::types::{FetchOutcome, Payload};

/// Offset between Kelvin and Celsius
pub const KELVIN_OFFSET: f64 = 273.15;

/// Current weather for one city, temperatures in °C
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct WeatherReport {
    /// City name
    pub city: String,
    /// City location
    pub coordinates: Coordinates,
    /// Main condition (e.g. "Clouds")
    pub description: String,
    /// Current temperature
    pub temperature: f64,
    /// Minimum temperature
    pub temp_min: f64,
    /// Maximum temperature
    pub temp_max: f64,
    /// Atmospheric pressure in hPa
    pub pressure: i32,
    /// Humidity in percent
    pub humidity: i32,
    /// Wind speed in m/s
    pub wind_speed: f64,
}

/// Geographic coordinates
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Coordinates {
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
}

/// A single post
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Author id
    pub user_id: i64,
    /// Post id
    pub id: i64,
    /// Title
    pub title: String,
    /// Body text
    pub body: String,
}

/// Posts returned by one source
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PostList {
    /// Posts in upstream order (or sorted, after post-processing)
    pub posts: Vec<Post>,
}

/// A single user
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct User {
    /// User id
    pub id: i64,
    /// Email address
    pub email: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Avatar URL
    #[serde(default)]
    pub avatar: Option<String>,
}

/// One page of users, with pagination metadata
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserPage {
    /// Page number (1-based)
    pub page: u32,
    /// Page size
    pub per_page: u32,
    /// Total number of users
    pub total: u32,
    /// Total number of pages
    pub total_pages: u32,
    /// Users on this page
    pub data: Vec<User>,
}

// Upstream OpenWeather current-weather body, reduced to the fields we keep
#[derive(Deserialize)]
struct OpenWeatherBody {
    name: String,
    coord: OpenWeatherCoord,
    weather: Vec<OpenWeatherCondition>,
    main: OpenWeatherMain,
    wind: OpenWeatherWind,
}

#[derive(Deserialize)]
struct OpenWeatherCoord {
    lat: f64,
    lon: f64,
}

#[derive(Deserialize)]
struct OpenWeatherCondition {
    main: String,
}

#[derive(Deserialize)]
struct OpenWeatherMain {
    temp: f64,
    temp_min: f64,
    temp_max: f64,
    pressure: i32,
    humidity: i32,
}

#[derive(Deserialize)]
struct OpenWeatherWind {
    speed: f64,
}

impl TryFrom<OpenWeatherBody> for WeatherReport {
    type Error = serde_json::Error;

    fn try_from(body: OpenWeatherBody) -> Result<Self, Self::Error> {
        let condition = body
            .weather
            .into_iter()
            .next()
            .ok_or_else(|| <serde_json::Error as serde::de::Error>::custom("empty weather array"))?;

        Ok(WeatherReport {
            city: body.name,
            coordinates: Coordinates {
                latitude: body.coord.lat,
                longitude: body.coord.lon,
            },
            description: condition.main,
            temperature: kelvin_to_celsius(body.main.temp),
            temp_min: kelvin_to_celsius(body.main.temp_min),
            temp_max: kelvin_to_celsius(body.main.temp_max),
            pressure: body.main.pressure,
            humidity: body.main.humidity,
            wind_speed: body.wind.speed,
        })
    }
}

/// Convert a Kelvin reading to Celsius
pub fn kelvin_to_celsius(kelvin: f64) -> f64 {
    kelvin - KELVIN_OFFSET
}

/// Decode a response body according to its shape
///
/// [`Shape::Unknown`] always yields [`FetchOutcome::RawText`]. For known shapes a
/// missing or mistyped required field is a [`FetchError::Decode`]; no partially
/// populated record is ever produced.
pub fn decode(shape: Shape, body: &[u8]) -> Result<FetchOutcome, FetchError> {
    let payload = match shape {
        Shape::Unknown => {
            return Ok(FetchOutcome::raw_text(String::from_utf8_lossy(body)));
        }
        Shape::Weather => serde_json::from_slice::<OpenWeatherBody>(body)
            .and_then(WeatherReport::try_from)
            .map(Payload::Weather),
        Shape::PostList => serde_json::from_slice::<Vec<Post>>(body)
            .map(|posts| Payload::PostList(PostList { posts })),
        Shape::UserPage => serde_json::from_slice::<UserPage>(body).map(Payload::UserPage),
    };

    payload
        .map(FetchOutcome::Structured)
        .map_err(|source| FetchError::Decode { shape, source })
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    const ATHENS_JSON: &str = r#"{
        "name": "Athens",
        "coord": { "lat": 37.9795, "lon": 23.7162 },
        "weather": [{ "id": 803, "main": "Clouds", "description": "broken clouds" }],
        "main": { "temp": 285.65, "temp_min": 284.15, "temp_max": 287.15, "pressure": 1031, "humidity": 50 },
        "wind": { "speed": 4.92, "deg": 40 }
    }"#;

    fn structured(outcome: FetchOutcome) -> Payload {
        match outcome {
            FetchOutcome::Structured(payload) => payload,
            other => panic!("expected structured outcome, got {other:?}"),
        }
    }

    #[test]
    fn test_weather_converts_kelvin() {
        let outcome = decode(Shape::Weather, ATHENS_JSON.as_bytes()).unwrap();
        let Payload::Weather(report) = structured(outcome) else {
            panic!("expected weather payload");
        };

        assert_eq!(report.city, "Athens");
        assert_eq!(report.description, "Clouds");
        assert!((report.temperature - 12.5).abs() < 1e-9);
        assert!((report.temp_min - 11.0).abs() < 1e-9);
        assert!((report.temp_max - 14.0).abs() < 1e-9);
        assert_eq!(report.pressure, 1031);
        assert_eq!(report.humidity, 50);
        assert!((report.coordinates.latitude - 37.9795).abs() < 1e-9);
        assert!((report.wind_speed - 4.92).abs() < 1e-9);
    }

    #[test]
    fn test_weather_missing_field_is_decode_error() {
        let body = r#"{"name": "Athens", "coord": {"lat": 1.0, "lon": 2.0}, "weather": [{"main": "Clear"}], "wind": {"speed": 1.0}}"#;
        let err = decode(Shape::Weather, body.as_bytes()).unwrap_err();
        assert!(matches!(err, FetchError::Decode { shape: Shape::Weather, .. }));
    }

    #[test]
    fn test_weather_empty_conditions_is_decode_error() {
        let body = ATHENS_JSON.replace(
            r#"[{ "id": 803, "main": "Clouds", "description": "broken clouds" }]"#,
            "[]",
        );
        let err = decode(Shape::Weather, body.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("empty weather array"), "{err}");
    }

    #[test]
    fn test_weather_fractional_pressure_is_rejected() {
        let body = ATHENS_JSON.replace("1031", "1031.5");
        assert!(decode(Shape::Weather, body.as_bytes()).is_err());
    }

    #[test]
    fn test_post_list_from_array() {
        let body = r#"[
            {"userId": 1, "id": 1, "title": "Zeta", "body": "last"},
            {"userId": 1, "id": 2, "title": "Alpha", "body": "first"}
        ]"#;
        let Payload::PostList(list) = structured(decode(Shape::PostList, body.as_bytes()).unwrap())
        else {
            panic!("expected post list");
        };
        assert_eq!(list.posts.len(), 2);
        assert_eq!(list.posts[0].title, "Zeta");
    }

    #[test]
    fn test_post_list_rejects_object() {
        let err = decode(Shape::PostList, br#"{"posts": []}"#).unwrap_err();
        assert!(matches!(err, FetchError::Decode { shape: Shape::PostList, .. }));
    }

    #[test]
    fn test_user_page_keeps_pagination() {
        let body = r#"{
            "page": 2, "per_page": 6, "total": 12, "total_pages": 2,
            "data": [
                {"id": 7, "email": "michael.lawson@reqres.in", "first_name": "Michael", "last_name": "Lawson", "avatar": "https://reqres.in/img/faces/7-image.jpg"},
                {"id": 8, "email": "lindsay.ferguson@reqres.in", "first_name": "Lindsay", "last_name": "Ferguson"}
            ],
            "support": {"url": "https://reqres.in/#support-heading", "text": "thanks"}
        }"#;
        let Payload::UserPage(page) = structured(decode(Shape::UserPage, body.as_bytes()).unwrap())
        else {
            panic!("expected user page");
        };
        assert_eq!(page.page, 2);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.data[0].first_name, "Michael");
        assert_eq!(page.data[1].avatar, None);
    }

    #[test]
    fn test_unknown_is_raw_text_even_when_not_json() {
        let outcome = decode(Shape::Unknown, b"<html>not json</html>").unwrap();
        assert_eq!(outcome, FetchOutcome::raw_text("<html>not json</html>"));
    }
}

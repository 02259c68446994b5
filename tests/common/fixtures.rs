//! Upstream response bodies served by the mock server

/// OpenWeather current-weather body for Athens (285.65 K is 12.5 °C)
pub const ATHENS_WEATHER: &str = r#"{
  "coord": { "lon": 23.7162, "lat": 37.9795 },
  "weather": [{ "id": 803, "main": "Clouds", "description": "broken clouds", "icon": "04d" }],
  "base": "stations",
  "main": {
    "temp": 285.65,
    "feels_like": 284.6,
    "temp_min": 284.15,
    "temp_max": 287.15,
    "pressure": 1031,
    "humidity": 50
  },
  "visibility": 10000,
  "wind": { "speed": 4.92, "deg": 40 },
  "name": "Athens",
  "cod": 200
}"#;

/// JSONPlaceholder-style post list, intentionally out of title order
pub const POSTS: &str = r#"[
  { "userId": 2, "id": 3, "title": "Zeta", "body": "last letter" },
  { "userId": 1, "id": 1, "title": "Alpha", "body": "first letter" },
  { "userId": 1, "id": 2, "title": "Mu", "body": "middle letter" }
]"#;

/// reqres-style user page
pub const USERS_PAGE_2: &str = r#"{
  "page": 2,
  "per_page": 3,
  "total": 12,
  "total_pages": 4,
  "data": [
    { "id": 8, "email": "lindsay.ferguson@reqres.in", "first_name": "Lindsay", "last_name": "Ferguson", "avatar": "https://reqres.in/img/faces/8-image.jpg" },
    { "id": 7, "email": "michael.lawson@reqres.in", "first_name": "Michael", "last_name": "Lawson" },
    { "id": 9, "email": "tobias.funke@reqres.in", "first_name": "Tobias", "last_name": "Funke" }
  ]
}"#;

/// A weather body with the `main` block missing
pub const TRUNCATED_WEATHER: &str = r#"{
  "coord": { "lon": 23.7162, "lat": 37.9795 },
  "weather": [{ "main": "Clouds" }],
  "wind": { "speed": 4.92 },
  "name": "Athens"
}"#;

//! Router client and dataset fixtures shared by the integration tests.
#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use diabetes_portal::{build_router, AppState, Config, CredentialDatabase, PasswordScheme};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tower::ServiceExt;

pub const ALICE_SIGNUP: &str = "username=alice&full_name=Alice+A&place=Springfield\
    &mobile_number=5551234567&email=alice%40example.com\
    &password=Secret1%21&confirm_password=Secret1%21";

pub const EXAMPLE_PATIENT: &str = "pregnancies=2&glucose=130&blood_pressure=80&skin_thickness=23\
    &insulin=94&bmi=28.5&diabetes_pedigree=0.4&age=45";

pub fn synthetic_csv(rows: usize) -> String {
    let mut rng = StdRng::seed_from_u64(5);
    let mut body = String::new();
    for _ in 0..rows {
        let glucose: u32 = rng.gen_range(60..200);
        let bmi: f64 = rng.gen_range(18.0..50.0);
        let risk = (f64::from(glucose) - 125.0) / 25.0 + (bmi - 32.0) / 8.0;
        let outcome = u8::from(risk + rng.gen_range(-0.8..0.8) > 0.0);
        body.push_str(&format!(
            "{},{},{},{},{},{:.1},{:.3},{},{}\n",
            rng.gen_range(0..12),
            glucose,
            rng.gen_range(40..110),
            rng.gen_range(0..60),
            rng.gen_range(0..300),
            bmi,
            rng.gen_range(0.05..2.0),
            rng.gen_range(21..80),
            outcome
        ));
    }
    body
}

/// Browser stand-in that keeps the session cookie between requests.
pub struct Client {
    app: Router,
    pub cookie: Option<String>,
}

pub struct Page {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: String,
}

impl Client {
    pub fn new(dataset_url: String) -> Self {
        let database = Arc::new(CredentialDatabase::new_in_memory().unwrap());
        Self::with_database(dataset_url, database)
    }

    /// Client over an on-disk database, for tests that tamper with the file.
    pub fn on_disk(dataset_url: String, path: &Path) -> Self {
        let database = Arc::new(CredentialDatabase::new(path, 2).unwrap());
        Self::with_database(dataset_url, database)
    }

    pub fn with_database(dataset_url: String, database: Arc<CredentialDatabase>) -> Self {
        let config = Config {
            dataset_url,
            password_scheme: PasswordScheme::Sha256,
            ..Config::default()
        };
        Self {
            app: build_router(AppState::new(config, database)),
            cookie: None,
        }
    }

    pub async fn send(&mut self, method: Method, uri: &str, form: Option<&str>) -> Page {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(cookie) = &self.cookie {
            request = request.header(header::COOKIE, cookie);
        }
        let request = match form {
            Some(form) => request
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(form.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();

        let response = self.app.clone().oneshot(request).await.unwrap();
        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let pair = set_cookie.to_str().unwrap().split(';').next().unwrap();
            self.cookie = Some(pair.to_string());
        }

        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        Page {
            status,
            location,
            body: String::from_utf8(bytes.to_vec()).unwrap(),
        }
    }

    pub async fn get(&mut self, uri: &str) -> Page {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post(&mut self, uri: &str, form: &str) -> Page {
        self.send(Method::POST, uri, Some(form)).await
    }

    pub async fn sign_up_alice(&mut self) {
        assert_eq!(self.get("/signup").await.status, StatusCode::SEE_OTHER);
        let page = self.post("/signup", ALICE_SIGNUP).await;
        assert_eq!(page.status, StatusCode::SEE_OTHER);
    }
}

pub async fn dataset_server() -> (mockito::ServerGuard, mockito::Mock) {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/pima.csv")
        .with_status(200)
        .with_body(synthetic_csv(250))
        .expect_at_most(1)
        .create_async()
        .await;
    (server, mock)
}

use actix_web::{get, web, Responder};
use serde::Serialize;

use crate::error::Error;

#[get("/version")]
async fn index() -> Result<impl Responder, Error> {
    Ok(web::Json(Version {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    }))
}

#[derive(Debug, Serialize)]
pub struct Version {
    pub name: &'static str,
    pub version: &'static str,
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test, App};
    use serde_json::Value;

    use super::*;

    #[actix_web::test]
    async fn test_version_reports_crate_version() {
        let app = test::init_service(
            App::new().service(web::scope("/api").service(index)),
        )
        .await;

        let request = test::TestRequest::get().uri("/api/version").to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body: Value = test::read_body_json(response).await;
        assert_eq!(
            body,
            serde_json::json!({
                "name": "balance-etl",
                "version": env!("CARGO_PKG_VERSION")
            })
        );
    }
}

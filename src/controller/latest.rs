use actix_web::{get, web, HttpResponse};

use crate::{
    configuration::{AppState, State},
    error::Error,
    model::ErrorResponse,
};

#[get("/latest")]
async fn index(state: web::Data<AppState<State>>) -> Result<HttpResponse, Error> {
    let data = state.database.defi_snapshot.get_latest().await?;

    match data {
        Some(snapshot) => Ok(HttpResponse::Ok().json(snapshot)),
        None => Ok(HttpResponse::NotFound().json(ErrorResponse {
            error: String::from("No data yet"),
        })),
    }
}

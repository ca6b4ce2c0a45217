use actix_web::{get, web, HttpResponse};

use crate::{
    configuration::{AppState, State},
    error::Error,
    model::ErrorResponse,
};

const STATS_WINDOW: u32 = 1000;

#[get("/stats")]
async fn index(state: web::Data<AppState<State>>) -> Result<HttpResponse, Error> {
    let data = state.database.defi_snapshot.get_stats(STATS_WINDOW).await?;

    match data {
        Some(stats) => Ok(HttpResponse::Ok().json(stats)),
        None => Ok(HttpResponse::NotFound().json(ErrorResponse {
            error: String::from("Not enough data"),
        })),
    }
}

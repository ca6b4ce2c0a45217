use actix_web::{get, web, Responder};

use crate::{
    configuration::{AppState, State},
    error::Error,
};

const HISTORY_LIMIT: u32 = 50;

#[get("/history")]
async fn index(
    state: web::Data<AppState<State>>,
) -> Result<impl Responder, Error> {
    let data = state.database.defi_snapshot.get_recent(HISTORY_LIMIT).await?;
    Ok(web::Json(data))
}

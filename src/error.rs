use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use alloy::sol_types::Error as ABI_ERROR;
use anyhow::Error as ANYHOW_ERROR;
use hex::FromHexError as HEX_ERROR;
use reqwest::Error as REQWEST_ERROR;
use serde_json::Error as JSON_ERROR;
use sqlx::error::Error as SQL_ERROR;
use std::{
    env::VarError, io::Error as IO_ERROR, num::ParseFloatError,
    num::ParseIntError,
};
use thiserror::Error;
use tokio::task::JoinError;
use tracing::error;
use tracing::subscriber::SetGlobalDefaultError as TRACING_GLOBAL_DEFAULT_ERROR;
use url::ParseError as URL_ERROR;

use crate::model::ErrorResponse;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Io(#[from] IO_ERROR),

    #[error("{0}")]
    URL(#[from] URL_ERROR),

    #[error("{0}")]
    INT(#[from] ParseIntError),

    #[error("{0}")]
    FLOAT(#[from] ParseFloatError),

    #[error("{0}")]
    SQL(#[from] SQL_ERROR),

    #[error("{0}")]
    VAR(#[from] VarError),

    #[error("{0}")]
    TokioJoinError(#[from] JoinError),

    #[error("{0}")]
    Reqwest(#[from] REQWEST_ERROR),

    #[error("{0}")]
    JsonError(#[from] JSON_ERROR),

    #[error("Invalid hex: {0}")]
    Hex(#[from] HEX_ERROR),

    #[error("ABI decode error: {0}")]
    Abi(#[from] ABI_ERROR),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("All RPC endpoints failed {attempts} consecutive times")]
    EndpointsExhausted { attempts: u64 },

    #[error("Tracing error: {0}")]
    SetGlobalDefaultError(#[from] TRACING_GLOBAL_DEFAULT_ERROR),

    #[error("{0}")]
    AnyHowError(#[from] ANYHOW_ERROR),
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn error_response(&self) -> HttpResponse {
        error!("Request failed: {}", self);
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: String::from("Internal server error"),
        })
    }
}

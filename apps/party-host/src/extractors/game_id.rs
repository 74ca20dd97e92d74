use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};
use lazy_regex::regex_is_match;

use crate::error::AppError;
use crate::errors::ErrorCode;

/// Minigame id from the `{game_id}` path segment.
///
/// Only the shape is checked here; whether a manifest declares the id is
/// the dispatcher's call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameId(pub String);

impl GameId {
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        if regex_is_match!(r"^[A-Za-z0-9][A-Za-z0-9_.-]{0,63}$", raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(AppError::bad_request(
                ErrorCode::InvalidGameId,
                format!("Invalid game id: {raw}"),
            ))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromRequest for GameId {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(match req.match_info().get("game_id") {
            Some(raw) => Self::parse(raw),
            None => Err(AppError::bad_request(
                ErrorCode::InvalidGameId,
                "Missing game_id parameter",
            )),
        })
    }
}

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use game_types::{
    Category, ErrorBody, MatchState, MonthlyScoreView, RemoteError, RoomId, RoomView,
    RoundPayload, SubmitWordRequest, ValidationResult,
};

use super::MatchAuthority;

/// `MatchAuthority` over the authority's JSON HTTP API.
pub struct HttpMatchAuthority {
    client: Client,
    base_url: String,
    session_token: Option<String>,
}

impl HttpMatchAuthority {
    pub fn new(base_url: impl Into<String>, session_token: Option<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: Client::new(),
            base_url,
            session_token,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn token(&self) -> Result<&str, RemoteError> {
        self.session_token
            .as_deref()
            .ok_or(RemoteError::SessionRequired)
    }

    fn get(&self, path: &str) -> Result<RequestBuilder, RemoteError> {
        let token = self.token()?;
        debug!("GET {}", path);
        Ok(self.client.get(self.url(path)).bearer_auth(token))
    }

    fn post(&self, path: &str) -> Result<RequestBuilder, RemoteError> {
        let token = self.token()?;
        debug!("POST {}", path);
        Ok(self.client.post(self.url(path)).bearer_auth(token))
    }

    async fn fetch<T: DeserializeOwned>(&self, path: &str) -> Result<T, RemoteError> {
        let response = send(self.get(path)?).await?;
        response.json::<T>().await.map_err(decode_error)
    }
}

#[async_trait]
impl MatchAuthority for HttpMatchAuthority {
    fn has_session(&self) -> bool {
        self.session_token.is_some()
    }

    async fn get_room(&self, room_id: RoomId) -> Result<RoomView, RemoteError> {
        self.fetch(&format!("/rooms/{}", room_id)).await
    }

    async fn get_available_rooms(&self) -> Result<Vec<RoomView>, RemoteError> {
        self.fetch("/rooms").await
    }

    async fn get_current_match_state(&self, room_id: RoomId) -> Result<MatchState, RemoteError> {
        self.fetch(&format!("/rooms/{}/match", room_id)).await
    }

    async fn get_validation_results(
        &self,
        room_id: RoomId,
    ) -> Result<Vec<ValidationResult>, RemoteError> {
        self.fetch(&format!("/rooms/{}/validations", room_id)).await
    }

    async fn get_current_month_leaderboard(&self) -> Result<Vec<MonthlyScoreView>, RemoteError> {
        self.fetch("/leaderboard/monthly/current").await
    }

    async fn get_current_top1(&self) -> Result<Option<MonthlyScoreView>, RemoteError> {
        self.fetch("/leaderboard/monthly/current/top1").await
    }

    async fn start_round(&self, room_id: RoomId) -> Result<RoundPayload, RemoteError> {
        let response = send(self.post(&format!("/rooms/{}/rounds", room_id))?).await?;
        response.json::<RoundPayload>().await.map_err(decode_error)
    }

    async fn stop_current_round(&self, room_id: RoomId) -> Result<String, RemoteError> {
        let response = send(self.post(&format!("/rooms/{}/rounds/stop", room_id))?).await?;
        response.text().await.map_err(decode_error)
    }

    async fn submit_word(
        &self,
        room_id: RoomId,
        category: &Category,
        word: &str,
    ) -> Result<(), RemoteError> {
        let body = SubmitWordRequest {
            category: category.clone(),
            word: word.to_string(),
        };
        let request = self
            .post(&format!("/rooms/{}/submissions", room_id))?
            .json(&body);
        send(request).await?;
        Ok(())
    }
}

/// Send a request and turn non-success statuses into `RemoteError::Rejected`.
async fn send(request: RequestBuilder) -> Result<Response, RemoteError> {
    let response = request.send().await.map_err(|e| RemoteError::Transport {
        message: e.to_string(),
    })?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = match response.json::<ErrorBody>().await {
        Ok(body) => body.message,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string(),
    };
    Err(RemoteError::Rejected {
        status: status.as_u16(),
        message,
    })
}

fn decode_error(e: reqwest::Error) -> RemoteError {
    RemoteError::Decode {
        message: e.to_string(),
    }
}

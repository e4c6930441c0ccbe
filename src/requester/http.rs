use super::RecommendationApi;
use crate::config::Config;
use crate::error::RequestError;
use crate::types::{Item, MoodLabel, RecommendationKind, RecommendationRequest, RecommendationResponse, RecommendationResult, Review};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, StatusCode};

/// `RecommendationApi` over HTTP with `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpRecommendationApi {
    client: Client,
    config: Config,
}

impl HttpRecommendationApi {
    pub fn new(config: &Config) -> Result<Self, RequestError> {
        let mut headers = HeaderMap::new();
        if let Some((name, value)) = config.tunnel_header() {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| RequestError::Failed(format!("Invalid header name {name:?}: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| RequestError::Failed(format!("Invalid header value {value:?}: {e}")))?;
            headers.insert(name, value);
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout())
            .build()
            .map_err(transport)?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }
}

fn transport(e: reqwest::Error) -> RequestError {
    RequestError::Failed(e.to_string())
}

#[async_trait]
impl RecommendationApi for HttpRecommendationApi {
    async fn recommend(&self, request: &RecommendationRequest) -> Result<RecommendationResult, RequestError> {
        let url = self.config.http_url(request.kind().path());
        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(transport)?;
        let status = response.status();
        let body = response.text().await.map_err(transport)?;
        decode_response(request.kind(), status, &body)
    }

    async fn reviews(&self, movie_id: u64) -> Result<Vec<Review>, RequestError> {
        let url = self.config.http_url(&format!("/movie/{movie_id}/reviews"));
        let response = self.client.get(&url).send().await.map_err(transport)?;
        let status = response.status();
        let body = response.text().await.map_err(transport)?;
        decode_reviews(status, &body)
    }
}

/// Interprets a recommendation response.
///
/// An `error` field fails the request whatever the status code says.
pub fn decode_response(
    kind: RecommendationKind,
    status: StatusCode,
    body: &str,
) -> Result<RecommendationResult, RequestError> {
    let response: RecommendationResponse = match serde_json::from_str(body) {
        Ok(response) => response,
        Err(_) if !status.is_success() => return Err(server_error(status)),
        Err(e) => return Err(RequestError::MalformedResponse(e.to_string())),
    };

    if let Some(error) = response.error {
        return Err(RequestError::Failed(error));
    }
    if !status.is_success() {
        return Err(server_error(status));
    }

    let mood = response
        .mood
        .ok_or_else(|| RequestError::MalformedResponse("missing `mood`".to_string()))?;
    let detected_mood = mood
        .parse::<MoodLabel>()
        .map_err(|e| RequestError::MalformedResponse(e.to_string()))?;

    let items = response
        .recommendations
        .unwrap_or_default()
        .into_iter()
        .map(|value| Item::from_value(kind, value))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| RequestError::MalformedResponse(format!("bad {kind} entry: {e}")))?;

    Ok(RecommendationResult::new(detected_mood, items))
}

#[derive(serde::Deserialize)]
#[serde(untagged)]
enum ReviewsBody {
    List(Vec<Review>),
    Error { error: String },
}

/// Interprets a review lookup: a bare list, or an object with an `error`.
pub fn decode_reviews(status: StatusCode, body: &str) -> Result<Vec<Review>, RequestError> {
    match serde_json::from_str::<ReviewsBody>(body) {
        Ok(ReviewsBody::Error { error }) => Err(RequestError::Failed(error)),
        Ok(ReviewsBody::List(_)) | Err(_) if !status.is_success() => Err(server_error(status)),
        Ok(ReviewsBody::List(reviews)) => Ok(reviews),
        Err(e) => Err(RequestError::MalformedResponse(e.to_string())),
    }
}

fn server_error(status: StatusCode) -> RequestError {
    RequestError::Failed(format!("Server error: {status}"))
}

use std::{collections::BTreeMap, sync::LazyLock};

use regex::Regex;
use reqwest::{
    StatusCode,
    header::{ACCEPT, USER_AGENT},
};
use serde::Serialize;
use serde_json::Value;

use crate::domain::error::RelayError;

const GITHUB_API_VERSION_HEADER: &str = "X-GitHub-Api-Version";
const GITHUB_API_VERSION: &str = "2022-11-28";
const GITHUB_ACCEPT: &str = "application/vnd.github+json";

static GIST_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/([\da-f]+)/raw/").expect("gist id pattern is valid"));

/// Pulls the gist id out of a raw gist URL such as
/// `https://gist.githubusercontent.com/<user>/<id>/raw/<file>`.
#[must_use]
pub fn extract_gist_id(url: &str) -> Option<&str> {
    GIST_ID_PATTERN
        .captures(url)
        .and_then(|captures| captures.get(1))
        .map(|id| id.as_str())
}

/// Turns the raw gist body into the supporter list. An empty body or a
/// JSON falsy value counts as an empty list.
pub fn decode_supporter_list(body: &str) -> Result<Vec<Value>, RelayError> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }

    let value: Value = serde_json::from_str(body).map_err(|_| RelayError::GistNotAList)?;
    match value {
        Value::Array(items) => Ok(items),
        other if is_falsy(&other) => Ok(Vec::new()),
        _ => Err(RelayError::GistNotAList),
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n == 0.0),
        Value::String(text) => text.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

#[derive(Debug, Serialize)]
struct GistFile {
    content: String,
}

#[derive(Debug, Serialize)]
struct GistUpdateBody<'a> {
    description: &'a str,
    files: BTreeMap<&'a str, GistFile>,
}

/// The supporter list kept in a single file of a GitHub Gist.
pub struct GistStore<'a> {
    http: &'a reqwest::Client,
    api_base_url: &'a str,
    token: &'a str,
}

impl<'a> GistStore<'a> {
    #[must_use]
    pub fn new(http: &'a reqwest::Client, api_base_url: &'a str, token: &'a str) -> Self {
        Self {
            http,
            api_base_url: api_base_url.trim_end_matches('/'),
            token,
        }
    }

    pub async fn fetch_supporters(&self, list_url: &str) -> Result<Vec<Value>, RelayError> {
        let response = self
            .http
            .get(list_url)
            .send()
            .await
            .map_err(|error| RelayError::GistFetch(error.to_string()))?;

        match response.status() {
            StatusCode::OK => {}
            StatusCode::NOT_FOUND => return Err(RelayError::GistNotFound),
            status => {
                return Err(RelayError::GistFetch(format!(
                    "unexpected status {}",
                    status.as_u16()
                )));
            }
        }

        let body = response
            .text()
            .await
            .map_err(|error| RelayError::GistFetch(error.to_string()))?;
        decode_supporter_list(&body)
    }

    pub async fn write_supporters(
        &self,
        gist_id: &str,
        filename: &str,
        description: &str,
        supporters: &[Value],
    ) -> Result<(), RelayError> {
        let content = serde_json::to_string(supporters)
            .map_err(|error| RelayError::GistUpdate(error.to_string()))?;
        let body = GistUpdateBody {
            description,
            files: BTreeMap::from([(filename, GistFile { content })]),
        };

        let response = self
            .http
            .patch(format!("{}/gists/{gist_id}", self.api_base_url))
            .bearer_auth(self.token)
            .header(ACCEPT, GITHUB_ACCEPT)
            .header(GITHUB_API_VERSION_HEADER, GITHUB_API_VERSION)
            .header(
                USER_AGENT,
                concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")),
            )
            .json(&body)
            .send()
            .await
            .map_err(|error| RelayError::GistUpdate(error.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(RelayError::GistUpdate(status.as_u16().to_string()));
        }

        Ok(())
    }
}

use std::time::Duration;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde_json::Value;
use tracing::debug;
use ureq::{Agent, AgentBuilder};

use crate::{
    art_object::{ArtObjectDetail, ArtObjectDetailResponse, CollectionList},
    config::{ApiConfig, ConfigError},
    error::{Error, Result},
    schema,
};

const API_KEY_PARAM: &'static str = "key";

/// Characters that can't appear verbatim in a single path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    /// The requested URL, minus the API key.
    pub url: String,
    pub body: Value,
}

pub fn build_agent(timeout: Duration) -> Agent {
    AgentBuilder::new().timeout(timeout).build()
}

/// Issues a GET with exactly the given query parameters. Nothing is added,
/// so this is also how we talk to the API without credentials.
pub fn raw_get(agent: &Agent, url: &str, params: &[(&str, &str)]) -> Result<ApiResponse> {
    let logged_url = describe_request(url, params);
    debug!(url = %logged_url, "GET");
    let mut request = agent.get(url);
    for (name, value) in params {
        request = request.query(name, value);
    }
    match request.call() {
        Ok(response) => {
            let status = response.status();
            let body = read_json(response, &logged_url)?;
            Ok(ApiResponse {
                status,
                url: logged_url,
                body,
            })
        }
        Err(ureq::Error::Status(status, response)) => {
            debug!(url = %logged_url, status, "got error status");
            let error = read_json(response, &logged_url)
                .ok()
                .and_then(|body| schema::error_response().validate_as(body).ok());
            Err(Error::Status {
                status,
                url: logged_url,
                error,
            })
        }
        Err(ureq::Error::Transport(transport)) => Err(transport_error(transport, logged_url)),
    }
}

fn read_json(response: ureq::Response, url: &str) -> Result<Value> {
    let body = response.into_string().map_err(|err| {
        if is_timeout(&err) {
            Error::Timeout {
                url: url.to_owned(),
            }
        } else {
            Error::Transport {
                url: url.to_owned(),
                message: err.to_string(),
            }
        }
    })?;
    serde_json::from_str(&body).map_err(|err| Error::Decode {
        url: url.to_owned(),
        message: err.to_string(),
    })
}

fn is_timeout(err: &std::io::Error) -> bool {
    matches!(
        err.kind(),
        std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock
    )
}

fn transport_error(transport: ureq::Transport, url: String) -> Error {
    let message = transport.to_string();
    let io_timeout = std::error::Error::source(&transport)
        .and_then(|source| source.downcast_ref::<std::io::Error>())
        .map_or(false, is_timeout);
    if transport.kind() == ureq::ErrorKind::Io && (io_timeout || message.contains("timed out")) {
        Error::Timeout { url }
    } else {
        Error::Transport { url, message }
    }
}

fn describe_request(url: &str, params: &[(&str, &str)]) -> String {
    let visible: Vec<String> = params
        .iter()
        .filter(|(name, _)| *name != API_KEY_PARAM)
        .map(|(name, value)| format!("{name}={value}"))
        .collect();
    if visible.is_empty() {
        url.to_owned()
    } else {
        format!("{url}?{}", visible.join("&"))
    }
}

/// Query parameters understood by `GET /{lang}/collection`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectionQuery {
    search: Option<String>,
    page_size: Option<u32>,
    page: Option<u32>,
    images_only: Option<bool>,
    place: Option<String>,
}

impl CollectionQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search<T: Into<String>>(mut self, q: T) -> Self {
        self.search = Some(q.into());
        self
    }

    pub fn page_size(mut self, ps: u32) -> Self {
        self.page_size = Some(ps);
        self
    }

    pub fn page(mut self, p: u32) -> Self {
        self.page = Some(p);
        self
    }

    pub fn images_only(mut self, imgonly: bool) -> Self {
        self.images_only = Some(imgonly);
        self
    }

    pub fn place<T: Into<String>>(mut self, place: T) -> Self {
        self.place = Some(place.into());
        self
    }

    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![];
        if let Some(q) = &self.search {
            params.push(("q", q.clone()));
        }
        if let Some(ps) = self.page_size {
            params.push(("ps", ps.to_string()));
        }
        if let Some(p) = self.page {
            params.push(("p", p.to_string()));
        }
        if let Some(imgonly) = self.images_only {
            params.push(("imgonly", imgonly.to_string()));
        }
        if let Some(place) = &self.place {
            params.push(("place", place.clone()));
        }
        params
    }
}

/// A client bound to one language of the collection API. Every request goes
/// to `{base_url}/{lang}/...` and carries the API key.
pub struct CollectionClient {
    root_url: String,
    lang: String,
    api_key: String,
    agent: Agent,
}

impl CollectionClient {
    pub fn new<T: AsRef<str>>(config: &ApiConfig, lang: T) -> Result<Self> {
        let lang = lang.as_ref().trim();
        if lang.is_empty() {
            return Err(ConfigError::EmptyLanguage.into());
        }
        Ok(Self {
            root_url: format!("{}/{}", config.base_url(), lang),
            lang: lang.to_owned(),
            api_key: config.api_key().to_owned(),
            agent: build_agent(config.timeout()),
        })
    }

    pub fn lang(&self) -> &str {
        &self.lang
    }

    pub fn url_for<T: AsRef<str>>(&self, path: T) -> String {
        format!("{}/{}", self.root_url, path.as_ref().trim_start_matches('/'))
    }

    /// GETs `path` with `params` plus the API key. A `key` in `params` wins
    /// over the configured one.
    pub fn get<T: AsRef<str>>(&self, path: T, params: &[(&str, &str)]) -> Result<ApiResponse> {
        let mut all_params: Vec<(&str, &str)> = Vec::with_capacity(params.len() + 1);
        if !params.iter().any(|(name, _)| *name == API_KEY_PARAM) {
            all_params.push((API_KEY_PARAM, self.api_key.as_str()));
        }
        all_params.extend_from_slice(params);
        raw_get(&self.agent, &self.url_for(path), &all_params)
    }

    /// `GET /collection` without schema validation, so callers can look at
    /// the status first.
    pub fn list_response(&self, query: &CollectionQuery) -> Result<ApiResponse> {
        let params = query.to_params();
        let params: Vec<(&str, &str)> = params
            .iter()
            .map(|(name, value)| (*name, value.as_str()))
            .collect();
        self.get("/collection", &params)
    }

    pub fn detail_response<T: AsRef<str>>(&self, object_number: T) -> Result<ApiResponse> {
        self.get(detail_path(object_number.as_ref()), &[])
    }

    pub fn collection(&self, query: &CollectionQuery) -> Result<CollectionList> {
        let response = self.list_response(query)?;
        Ok(schema::collection_list().validate_as(response.body)?)
    }

    pub fn detail<T: AsRef<str>>(&self, object_number: T) -> Result<ArtObjectDetail> {
        let response = self.detail_response(object_number)?;
        let detail: ArtObjectDetailResponse =
            schema::art_object_detail().validate_as(response.body)?;
        Ok(detail.art_object)
    }
}

fn detail_path(object_number: &str) -> String {
    format!(
        "/collection/{}",
        utf8_percent_encode(object_number, PATH_SEGMENT)
    )
}

#[cfg(test)]
mod tests {
    use crate::{config::ApiConfig, error::Error};

    use super::{describe_request, detail_path, CollectionClient, CollectionQuery};

    fn config() -> ApiConfig {
        ApiConfig::new("https://www.rijksmuseum.nl/api/", "secret").unwrap()
    }

    #[test]
    fn test_url_for_joins_base_url_and_language() {
        let client = CollectionClient::new(&config(), "nl").unwrap();
        assert_eq!(client.lang(), "nl");
        assert_eq!(
            client.url_for("/collection"),
            "https://www.rijksmuseum.nl/api/nl/collection"
        );
        assert_eq!(
            client.url_for("collection/SK-C-5"),
            "https://www.rijksmuseum.nl/api/nl/collection/SK-C-5"
        );
    }

    #[test]
    fn test_empty_language_is_a_config_error() {
        let err = CollectionClient::new(&config(), "  ").err().unwrap();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_query_params_skip_unset_values() {
        assert!(CollectionQuery::new().to_params().is_empty());
        assert_eq!(
            CollectionQuery::new()
                .place("Amsterdam")
                .page(2)
                .page_size(5)
                .images_only(true)
                .search("Van Gogh")
                .to_params(),
            vec![
                ("q", "Van Gogh".to_owned()),
                ("ps", "5".to_owned()),
                ("p", "2".to_owned()),
                ("imgonly", "true".to_owned()),
                ("place", "Amsterdam".to_owned()),
            ]
        );
    }

    #[test]
    fn test_describe_request_hides_api_key() {
        assert_eq!(
            describe_request("http://x/en/collection", &[("key", "secret"), ("q", "Vermeer")]),
            "http://x/en/collection?q=Vermeer"
        );
        assert_eq!(
            describe_request("http://x/en/collection", &[("key", "secret")]),
            "http://x/en/collection"
        );
    }

    #[test]
    fn test_detail_path_encodes_object_number() {
        assert_eq!(detail_path("SK-C-5"), "/collection/SK-C-5");
        assert_eq!(detail_path("RP-P-1 2/3"), "/collection/RP-P-1%202%2F3");
    }
}

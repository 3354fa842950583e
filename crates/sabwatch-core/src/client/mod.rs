//! Control API client for the download service.
//!
//! `QueueClient` is the narrow seam the watchdog depends on; its methods never
//! fail. `SabnzbdClient` implements it over HTTP and keeps the detailed
//! `ClientError` for logging.

mod error;
mod http;
mod parse;

use std::time::Duration;

use url::Url;

use crate::config::WatchdogConfig;
use crate::snapshot::QueueSnapshot;

pub use error::ClientError;

/// Read and write operations against the download queue.
pub trait QueueClient {
    /// Current queue state, or `QueueSnapshot::fetch_failed()` on any error.
    fn fetch_snapshot(&self) -> QueueSnapshot;
    /// Resume a paused queue. True on success.
    fn resume(&self) -> bool;
    /// Delete one job by id. True on success.
    fn delete_job(&self, id: &str) -> bool;
    /// Reset the service's queue bookkeeping. True on success.
    fn reset_queue(&self) -> bool;
}

impl<T: QueueClient + ?Sized> QueueClient for &T {
    fn fetch_snapshot(&self) -> QueueSnapshot {
        (**self).fetch_snapshot()
    }

    fn resume(&self) -> bool {
        (**self).resume()
    }

    fn delete_job(&self, id: &str) -> bool {
        (**self).delete_job(id)
    }

    fn reset_queue(&self) -> bool {
        (**self).reset_queue()
    }
}

/// HTTP client for the SABnzbd JSON API.
#[derive(Clone)]
pub struct SabnzbdClient {
    endpoint: Url,
    api_key: String,
    timeout: Duration,
    history_limit: Option<u32>,
}

impl std::fmt::Debug for SabnzbdClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SabnzbdClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("timeout", &self.timeout)
            .field("history_limit", &self.history_limit)
            .finish_non_exhaustive()
    }
}

impl SabnzbdClient {
    pub fn new(cfg: &WatchdogConfig) -> Result<Self, ClientError> {
        let mut endpoint = Url::parse(&cfg.service_url)
            .map_err(|_| ClientError::InvalidUrl(cfg.service_url.clone()))?;
        endpoint
            .path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(cfg.service_url.clone()))?
            .pop_if_empty()
            .push("api");
        endpoint.set_query(None);

        Ok(Self {
            endpoint,
            api_key: cfg.api_key.clone(),
            timeout: Duration::from_secs(cfg.api_timeout_secs.max(1)),
            history_limit: cfg.check_history.then_some(cfg.history_limit.max(1)),
        })
    }

    /// API endpoint without credentials, for logs.
    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }

    fn api_url(&self, params: &[(&str, &str)]) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut query = url.query_pairs_mut();
            for (k, v) in params {
                query.append_pair(k, v);
            }
            query.append_pair("output", "json");
            query.append_pair("apikey", &self.api_key);
        }
        url
    }

    fn call(&self, params: &[(&str, &str)]) -> Result<Vec<u8>, ClientError> {
        http::get(self.api_url(params).as_str(), self.timeout)
    }

    /// Fetch the queue, plus recent history when enabled.
    ///
    /// A failed history request is logged and ignored: the queue alone still
    /// yields a usable snapshot.
    pub fn try_fetch_snapshot(&self) -> Result<QueueSnapshot, ClientError> {
        let body = self.call(&[("mode", "queue")])?;
        let mut snapshot = parse::parse_queue(&body)?;

        if let (Some(limit), false) = (self.history_limit, snapshot.post_processing_active) {
            match self.try_history_post_processing(limit) {
                Ok(active) => snapshot.post_processing_active = active,
                Err(e) => tracing::warn!("could not read history, using queue only: {e}"),
            }
        }
        Ok(snapshot)
    }

    fn try_history_post_processing(&self, limit: u32) -> Result<bool, ClientError> {
        let limit = limit.to_string();
        let body = self.call(&[("mode", "history"), ("limit", &limit)])?;
        parse::parse_history_post_processing(&body)
    }

    pub fn try_resume(&self) -> Result<(), ClientError> {
        parse::parse_action(&self.call(&[("mode", "resume")])?)
    }

    pub fn try_delete_job(&self, id: &str) -> Result<(), ClientError> {
        parse::parse_action(&self.call(&[("mode", "queue"), ("name", "delete"), ("value", id)])?)
    }

    /// Ask the service to rebuild its queue index (`restart_repair`).
    pub fn try_reset_queue(&self) -> Result<(), ClientError> {
        parse::parse_action(&self.call(&[("mode", "restart_repair")])?)
    }
}

impl QueueClient for SabnzbdClient {
    fn fetch_snapshot(&self) -> QueueSnapshot {
        match self.try_fetch_snapshot() {
            Ok(snapshot) => snapshot,
            Err(e @ ClientError::Parse(_)) => {
                tracing::warn!("error parsing queue info: {e}");
                QueueSnapshot::fetch_failed()
            }
            Err(e) if e.is_timeout() => {
                tracing::warn!("queue request timed out after {:?}", self.timeout);
                QueueSnapshot::fetch_failed()
            }
            Err(e) => {
                tracing::warn!("error fetching queue info: {e}");
                QueueSnapshot::fetch_failed()
            }
        }
    }

    fn resume(&self) -> bool {
        report("resume", self.try_resume())
    }

    fn delete_job(&self, id: &str) -> bool {
        report("delete job", self.try_delete_job(id))
    }

    fn reset_queue(&self) -> bool {
        report("reset queue", self.try_reset_queue())
    }
}

fn report(what: &str, result: Result<(), ClientError>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("{what} request failed: {e}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(url: &str) -> WatchdogConfig {
        WatchdogConfig {
            api_key: "k3y".to_string(),
            service_url: url.to_string(),
            ..WatchdogConfig::default()
        }
    }

    #[test]
    fn endpoint_appends_api_segment() {
        let c = SabnzbdClient::new(&cfg("http://sabnzbd:8080")).unwrap();
        assert_eq!(c.endpoint(), "http://sabnzbd:8080/api");
        let c = SabnzbdClient::new(&cfg("http://host/sabnzbd/")).unwrap();
        assert_eq!(c.endpoint(), "http://host/sabnzbd/api");
    }

    #[test]
    fn api_url_encodes_params_and_key() {
        let c = SabnzbdClient::new(&cfg("http://sabnzbd:8080")).unwrap();
        let url = c.api_url(&[("mode", "queue"), ("name", "delete"), ("value", "a b&c")]);
        assert_eq!(
            url.as_str(),
            "http://sabnzbd:8080/api?mode=queue&name=delete&value=a+b%26c&output=json&apikey=k3y"
        );
    }

    #[test]
    fn invalid_url_is_rejected() {
        assert!(matches!(
            SabnzbdClient::new(&cfg("not a url")),
            Err(ClientError::InvalidUrl(_))
        ));
        assert!(matches!(
            SabnzbdClient::new(&cfg("mailto:x@y")),
            Err(ClientError::InvalidUrl(_))
        ));
    }

    #[test]
    fn debug_hides_api_key() {
        let c = SabnzbdClient::new(&cfg("http://sabnzbd:8080")).unwrap();
        assert!(!format!("{c:?}").contains("k3y"));
    }

    #[test]
    fn history_check_follows_config() {
        let mut config = cfg("http://sabnzbd:8080");
        config.check_history = false;
        assert_eq!(SabnzbdClient::new(&config).unwrap().history_limit, None);
        config.check_history = true;
        config.history_limit = 0;
        assert_eq!(SabnzbdClient::new(&config).unwrap().history_limit, Some(1));
    }
}

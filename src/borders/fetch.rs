use super::loader::{FetchOutcome, FetchRequest};
use super::{BorderLayer, LoadError};
use crossbeam_channel::{unbounded, Receiver, Sender};
use log::warn;
use std::sync::Arc;
use std::thread;

/// Something that can return the raw bytes behind a borders URL
pub trait BorderSource: Send + Sync + 'static {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, LoadError>;
}

/// Plain HTTP GET; no retries, transport-default timeouts
pub struct HttpSource {
    client: reqwest::blocking::Client,
}

impl HttpSource {
    pub fn new() -> Result<Self, LoadError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| LoadError::Transport(e.to_string()))?;
        Ok(Self { client })
    }
}

impl BorderSource for HttpSource {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, LoadError> {
        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| LoadError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(LoadError::Status(status.as_u16()));
        }

        resp.bytes()
            .map(|b| b.to_vec())
            .map_err(|e| LoadError::Transport(e.to_string()))
    }
}

/// Runs each fetch, and the parse of its body, on its own thread and hands
/// finished layers back to the UI loop. Fetches overlap, so completions can
/// arrive in any order.
pub struct FetchWorker {
    source: Arc<dyn BorderSource>,
    done_tx: Sender<FetchOutcome>,
    done_rx: Receiver<FetchOutcome>,
}

impl FetchWorker {
    pub fn new(source: Arc<dyn BorderSource>) -> Self {
        let (done_tx, done_rx) = unbounded();
        Self {
            source,
            done_tx,
            done_rx,
        }
    }

    pub fn submit(&self, request: FetchRequest) {
        let source = Arc::clone(&self.source);
        let done_tx = self.done_tx.clone();
        let name = format!("fetch-{}", request.generation);
        let fallback = request.clone();

        let spawned = thread::Builder::new().name(name).spawn(move || {
            let layer = source
                .fetch(&request.url)
                .and_then(|mut body| BorderLayer::parse(request.year, request.generation, &mut body));
            // Receiver only disappears on shutdown
            let _ = done_tx.send(FetchOutcome { request, layer });
        });

        // Report it as a failed fetch so the loader does not wait forever
        if let Err(e) = spawned {
            warn!("could not start fetch thread: {}", e);
            let _ = self.done_tx.send(FetchOutcome {
                request: fallback,
                layer: Err(LoadError::Transport(e.to_string())),
            });
        }
    }

    /// Next finished fetch, if any, without blocking
    pub fn try_recv(&self) -> Option<FetchOutcome> {
        self.done_rx.try_recv().ok()
    }

    #[cfg(test)]
    pub fn recv_timeout(&self, timeout: std::time::Duration) -> Option<FetchOutcome> {
        self.done_rx.recv_timeout(timeout).ok()
    }
}


#[cfg(test)]
mod tests {
    use super::testing::CannedSource;
    use super::*;
    use crate::borders::fixtures::TWO_REGIONS;
    use crate::years::Year;
    use std::time::Duration;

    fn submit_all(worker: &FetchWorker, years: &[i32]) -> Vec<FetchOutcome> {
        for (i, &year) in years.iter().enumerate() {
            worker.submit(FetchRequest {
                year: Year(year),
                generation: i as u64 + 1,
                url: format!("x/world_{year}.geojson"),
            });
        }
        let mut outcomes: Vec<_> = years
            .iter()
            .filter_map(|_| worker.recv_timeout(Duration::from_secs(5)))
            .collect();
        outcomes.sort_by_key(|o| o.request.generation);
        outcomes
    }

    #[test]
    fn test_worker_reports_each_request() {
        let source = CannedSource::default()
            .with("world_100.geojson", Ok(TWO_REGIONS))
            .with("world_300.geojson", Ok("not json"));
        let worker = FetchWorker::new(Arc::new(source));

        let outcomes = submit_all(&worker, &[100, 200, 300]);
        assert_eq!(outcomes.len(), 3);

        // Bodies arrive parsed and stamped with their request
        let layer = outcomes[0].layer.as_ref().unwrap();
        assert_eq!((layer.year, layer.generation), (Year(100), 1));
        assert_eq!(layer.regions.len(), 2);

        assert_eq!(outcomes[1].layer.as_ref().err(), Some(&LoadError::Status(404)));
        assert!(matches!(outcomes[2].layer, Err(LoadError::Parse(_))));
        assert!(worker.try_recv().is_none());
    }

    #[test]
    fn test_large_body_arrives_as_layer() {
        let features: Vec<String> = (0..2000)
            .map(|i| {
                let x = (i % 36) as f64 * 10.0 - 180.0;
                let y = (i / 36 % 17) as f64 * 10.0 - 85.0;
                format!(
                    r#"{{"type":"Feature","properties":{{"NAME":"R{i}"}},"geometry":{{"type":"Polygon","coordinates":[[[{x},{y}],[{x1},{y}],[{x1},{y1}],[{x},{y}]]]}}}}"#,
                    x1 = x + 10.0,
                    y1 = y + 10.0,
                )
            })
            .collect();
        let body = format!(r#"{{"type":"FeatureCollection","features":[{}]}}"#, features.join(","));
        let source = CannedSource::default().with("world_100.geojson", Ok(body.as_str()));
        let worker = FetchWorker::new(Arc::new(source));

        let outcomes = submit_all(&worker, &[100]);
        let layer = outcomes[0].layer.as_ref().unwrap();
        assert_eq!(layer.regions.len(), 2000);
    }
}

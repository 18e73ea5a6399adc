//! StatsD metrics for the simulator
use crate::config::Config;
use cadence::{BufferedUdpMetricSink, Counted, CountedExt, Gauged, QueuingMetricSink, StatsdClient};
use once_cell::sync::OnceCell;
use std::net::UdpSocket;
use std::sync::Arc;
use tracing::{info, warn};

/// Wrapper for StatsdClient with tag handling and soft failure
pub struct StatsdClientWrapper {
    client: Arc<StatsdClient>,
    use_tags: bool,
}

impl Clone for StatsdClientWrapper {
    fn clone(&self) -> Self {
        Self { client: self.client.clone(), use_tags: self.use_tags }
    }
}

impl StatsdClientWrapper {
    pub fn new(client: StatsdClient, use_tags: bool) -> Self {
        Self { client: Arc::new(client), use_tags }
    }

    pub fn count(&self, key: &str, value: u64) {
        if self.use_tags {
            self.client.count_with_tags(key, value as i64).send();
        } else if let Err(e) = self.client.count(key, value as i64) {
            warn!("Failed to send metric {}: {}", key, e);
        }
    }

    pub fn incr(&self, key: &str) {
        if self.use_tags {
            self.client.incr_with_tags(key).send();
        } else if let Err(e) = self.client.incr(key) {
            warn!("Failed to send metric {}: {}", key, e);
        }
    }

    pub fn gauge(&self, key: &str, value: impl Into<f64>) {
        let value = value.into();
        if self.use_tags {
            self.client.gauge_with_tags(key, value).send();
        } else if let Err(e) = self.client.gauge(key, value) {
            warn!("Failed to send metric {}: {}", key, e);
        }
    }
}

// Static client storage; None when metrics are disabled
static METRICS_CLIENT: OnceCell<Option<StatsdClientWrapper>> = OnceCell::new();

/// Initialize the StatsD client from configuration.
///
/// Disabled or failed setup leaves the process running with metrics off;
/// the simulator never refuses to start over observability.
pub fn setup_metrics(config: &Config) {
    let client = if config.statsd.enabled {
        match build_client(config) {
            Ok(client) => {
                info!("StatsD metrics enabled, sending to {}", config.statsd.addr);
                Some(StatsdClientWrapper::new(client, config.statsd.use_tags))
            },
            Err(e) => {
                warn!("Failed to set up StatsD metrics: {}", e);
                None
            },
        }
    } else {
        None
    };

    let _ = METRICS_CLIENT.set(client);
}

fn build_client(config: &Config) -> std::io::Result<StatsdClient> {
    let socket = UdpSocket::bind("0.0.0.0:0")?;
    socket.set_nonblocking(true)?;

    let sink = BufferedUdpMetricSink::from(config.statsd.addr.as_str(), socket)
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    let queuing_sink = QueuingMetricSink::from(sink);

    Ok(StatsdClient::from_sink(&config.statsd.prefix, queuing_sink))
}

fn client() -> Option<&'static StatsdClientWrapper> {
    METRICS_CLIENT.get().and_then(|c| c.as_ref())
}

/// Count merged messages
pub fn count_messages_merged(value: u64) {
    if let Some(client) = client() {
        client.count("messages.merged", value);
    }
}

/// Count appended hub events
pub fn count_events_appended(value: u64) {
    if let Some(client) = client() {
        client.count("events.appended", value);
    }
}

/// Count generated identities
pub fn incr_identities_generated() {
    if let Some(client) = client() {
        client.incr("generator.identities");
    }
}

/// Report generation progress as a gauge (0-100)
pub fn gauge_generation_progress(percent: f64) {
    if let Some(client) = client() {
        client.gauge("generator.progress", percent);
    }
}

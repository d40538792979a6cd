//! Counter clients: statsd via cadence and a tracing fallback.

use std::net::UdpSocket;

use cadence::prelude::*;
use cadence::{QueuingMetricSink, UdpMetricSink};

use super::{CounterClient, MetricsError};

/// Fire-and-forget statsd counter client.
///
/// Samples are queued and flushed from cadence's background thread, so an
/// increment never waits on the network. A full queue drops the sample.
pub struct StatsdClient {
    client: cadence::StatsdClient,
}

impl StatsdClient {
    /// Bind an ephemeral non-blocking UDP socket and point it at `addr`.
    ///
    /// `prefix` is joined to every metric with a `.`; an empty prefix adds nothing.
    pub fn connect(addr: &str, prefix: &str) -> Result<Self, MetricsError> {
        let socket = UdpSocket::bind("0.0.0.0:0")?;
        socket.set_nonblocking(true)?;

        let udp_sink = UdpMetricSink::from(addr, socket)?;
        let sink = QueuingMetricSink::from(udp_sink);

        tracing::info!(target = %addr, prefix = %prefix, "Statsd client connected");

        Ok(Self {
            client: cadence::StatsdClient::from_sink(prefix, sink),
        })
    }
}

impl CounterClient for StatsdClient {
    fn increment(&self, metric: &str) {
        if let Err(e) = self.client.incr(metric) {
            tracing::debug!(error = %e, metric = %metric, "Dropped statsd sample");
        }
    }
}

/// Counter client that writes increments to the log.
pub struct LogClient {
    prefix: String,
}

impl LogClient {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
        }
    }
}

impl CounterClient for LogClient {
    fn increment(&self, metric: &str) {
        if self.prefix.is_empty() {
            tracing::debug!(metric = %metric, "counter +1");
        } else {
            tracing::debug!(metric = %format!("{}.{}", self.prefix, metric), "counter +1");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn recv_line(server: &UdpSocket) -> String {
        let mut buf = [0u8; 256];
        let n = server.recv(&mut buf).unwrap();
        String::from_utf8(buf[..n].to_vec()).unwrap()
    }

    fn listener() -> (UdpSocket, String) {
        let server = UdpSocket::bind("127.0.0.1:0").unwrap();
        server
            .set_read_timeout(Some(Duration::from_secs(5)))
            .unwrap();
        let addr = server.local_addr().unwrap().to_string();
        (server, addr)
    }

    #[test]
    fn test_statsd_sends_prefixed_counter() {
        let (server, addr) = listener();

        let client = StatsdClient::connect(&addr, "gw").unwrap();
        client.increment("external_service.success");

        assert_eq!(recv_line(&server), "gw.external_service.success:1|c");
    }

    #[test]
    fn test_statsd_without_prefix() {
        let (server, addr) = listener();

        let client = StatsdClient::connect(&addr, "").unwrap();
        client.increment("external_service.fail");

        assert_eq!(recv_line(&server), "external_service.fail:1|c");
    }

    #[test]
    fn test_statsd_rejects_unresolvable_address() {
        let result = StatsdClient::connect("not-an-address", "");
        assert!(matches!(result, Err(MetricsError::Sink(_))));
    }

    #[test]
    fn test_log_client_does_not_panic() {
        LogClient::new("").increment("external_service.fail");
        LogClient::new("gw").increment("external_service.success");
    }
}

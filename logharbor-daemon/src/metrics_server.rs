//! Prometheus metrics HTTP server.
//!
//! Uses the built-in HTTP listener from `metrics-exporter-prometheus`
//! to expose the counters and gauges named in `logharbor_core::metrics`.

use std::net::SocketAddr;

use anyhow::Result;
use logharbor_core::config::MetricsConfig;
use metrics_exporter_prometheus::PrometheusBuilder;

/// Resolve the listen address for the metrics endpoint.
///
/// Only the `/metrics` path is served by the exporter's listener.
pub fn listen_addr(config: &MetricsConfig) -> Result<SocketAddr> {
    if config.endpoint != "/metrics" {
        return Err(anyhow::anyhow!(
            "unsupported metrics endpoint '{}': only '/metrics' is served",
            config.endpoint
        ));
    }

    format!("{}:{}", config.listen_addr, config.port)
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid metrics listen address: {e}"))
}

/// Install the global metrics recorder and start the HTTP listener.
///
/// Call once per process, before the pipeline starts recording.
pub fn install_metrics_recorder(config: &MetricsConfig) -> Result<()> {
    let addr = listen_addr(config)?;

    if addr.ip().is_unspecified() {
        tracing::warn!(
            listen_addr = %addr,
            "metrics endpoint is exposed on all interfaces"
        );
    }

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| anyhow::anyhow!("failed to install metrics recorder: {e}"))?;

    logharbor_core::metrics::describe_all();

    tracing::info!(listen_addr = %addr, "Prometheus metrics endpoint active");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_resolves_to_loopback() {
        let addr = listen_addr(&MetricsConfig::default()).unwrap();
        assert_eq!(addr, "127.0.0.1:9100".parse::<SocketAddr>().unwrap());
    }

    #[test]
    fn custom_endpoint_is_rejected() {
        let config = MetricsConfig {
            endpoint: "/stats".to_owned(),
            ..Default::default()
        };
        assert!(listen_addr(&config).is_err());
    }

    #[test]
    fn bad_host_is_rejected() {
        let config = MetricsConfig {
            listen_addr: "not an ip".to_owned(),
            ..Default::default()
        };
        assert!(listen_addr(&config).is_err());
    }
}

//! Prometheus text exposition of one scrape's observations.
//!
//! A fresh [`Registry`] is built per scrape, so label sets that were not
//! observed this time (e.g. games no longer owned) disappear from the
//! output instead of lingering with their last value.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use prometheus::{Encoder, GaugeVec, Opts, Registry, TextEncoder};
use steam_exporter_core::observation::ObservationSet;

/// Register one gauge family per metric family present in `feed` and set
/// every observed sample. A repeated label set keeps the last value.
pub fn registry_for(feed: &ObservationSet) -> Result<Registry, prometheus::Error> {
    let registry = Registry::new();
    let mut gauges: HashMap<&'static str, GaugeVec> = HashMap::new();

    for observation in feed {
        let family = observation.family;
        let gauge = match gauges.entry(family.name) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let gauge = GaugeVec::new(Opts::new(family.name, family.help), family.labels)?;
                registry.register(Box::new(gauge.clone()))?;
                entry.insert(gauge)
            }
        };
        let labels: Vec<&str> = observation.labels.iter().map(String::as_str).collect();
        gauge
            .get_metric_with_label_values(&labels)?
            .set(observation.value);
    }

    Ok(registry)
}

/// Add the standard `process_*` families for this process.
#[cfg(target_os = "linux")]
pub fn register_process_metrics(registry: &Registry) -> Result<(), prometheus::Error> {
    registry.register(Box::new(
        prometheus::process_collector::ProcessCollector::for_self(),
    ))
}

#[cfg(not(target_os = "linux"))]
pub fn register_process_metrics(_registry: &Registry) -> Result<(), prometheus::Error> {
    Ok(())
}

/// Encode everything in `registry` in the text format.
///
/// Returns the body together with its content type.
pub fn encode(registry: &Registry) -> Result<(String, Vec<u8>), prometheus::Error> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&registry.gather(), &mut buffer)?;
    Ok((encoder.format_type().to_string(), buffer))
}

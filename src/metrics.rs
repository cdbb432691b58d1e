//! Prometheus gauge families for the exporter.
//!
//! The registry is an explicitly owned instance created once at startup,
//! with no default process collectors attached. All gauges are rewritten
//! every cycle so a disappearing status or phase reads as zero instead of
//! sticking at its last value.

use prometheus::{Encoder, GaugeVec, IntGauge, IntGaugeVec, Opts, Registry, TextEncoder};

#[derive(Clone)]
pub struct ExporterMetrics {
    registry: Registry,
    /// 1 after a successful subgraph response, 0 after a failed one
    pub api_health: IntGauge,
    pub bids_amount_min: GaugeVec,
    pub bids_amount_max: GaugeVec,
    pub winning_bids: IntGaugeVec,
    pub active_bids: IntGaugeVec,
    pub cancelled_bids: IntGaugeVec,
    pub validators_phase: IntGaugeVec,
}

impl ExporterMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let api_health = IntGauge::new("etherfi_bids_api_health", "API status of etherFi bids")?;
        let bids_amount_min = GaugeVec::new(
            Opts::new("etherfi_bids_amount_min", "Minimum amount of bids"),
            &["bidder_address", "status"],
        )?;
        let bids_amount_max = GaugeVec::new(
            Opts::new("etherfi_bids_amount_max", "Maximum amount of bids"),
            &["bidder_address", "status"],
        )?;
        let winning_bids = IntGaugeVec::new(
            Opts::new("etherfi_bids_winning", "Number of winning etherfi bids"),
            &["bidder_address"],
        )?;
        let active_bids = IntGaugeVec::new(
            Opts::new("etherfi_bids_active", "Number of active etherfi bids"),
            &["bidder_address"],
        )?;
        let cancelled_bids = IntGaugeVec::new(
            Opts::new("etherfi_bids_cancelled", "Number of cancelled etherfi bids"),
            &["bidder_address"],
        )?;
        let validators_phase = IntGaugeVec::new(
            Opts::new(
                "etherfi_bids_validators_phase",
                "Number of validators enabled by bids per phase",
            ),
            &["phase"],
        )?;

        registry.register(Box::new(api_health.clone()))?;
        registry.register(Box::new(bids_amount_min.clone()))?;
        registry.register(Box::new(bids_amount_max.clone()))?;
        registry.register(Box::new(winning_bids.clone()))?;
        registry.register(Box::new(active_bids.clone()))?;
        registry.register(Box::new(cancelled_bids.clone()))?;
        registry.register(Box::new(validators_phase.clone()))?;

        Ok(Self {
            registry,
            api_health,
            bids_amount_min,
            bids_amount_max,
            winning_bids,
            active_bids,
            cancelled_bids,
            validators_phase,
        })
    }

    /// Encode the registry in the Prometheus text exposition format
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub actions_total: IntCounterVec,
    pub action_latency_seconds: HistogramVec,
    pub transitions_total: IntCounterVec,
    pub simulator_ticks_total: IntCounter,
    pub notifications_total: IntCounter,
    pub roster_size: IntGauge,
    pub active_orders: IntGauge,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let actions_total = IntCounterVec::new(
            Opts::new("actions_total", "User actions by name and outcome"),
            &["action", "outcome"],
        )?;

        let action_latency_seconds = HistogramVec::new(
            HistogramOpts::new(
                "action_latency_seconds",
                "Time spent applying a user action in seconds",
            ),
            &["outcome"],
        )?;

        let transitions_total = IntCounterVec::new(
            Opts::new("order_transitions_total", "Order lifecycle transitions by target status"),
            &["status"],
        )?;

        let simulator_ticks_total =
            IntCounter::new("simulator_ticks_total", "Motion simulator ticks applied")?;

        let notifications_total =
            IntCounter::new("notifications_total", "Notifications shown to the session")?;

        let roster_size = IntGauge::new("roster_size", "Registered profiles, all roles")?;

        let active_orders = IntGauge::new("active_orders", "Orders currently open (0 or 1)")?;

        registry.register(Box::new(actions_total.clone()))?;
        registry.register(Box::new(action_latency_seconds.clone()))?;
        registry.register(Box::new(transitions_total.clone()))?;
        registry.register(Box::new(simulator_ticks_total.clone()))?;
        registry.register(Box::new(notifications_total.clone()))?;
        registry.register(Box::new(roster_size.clone()))?;
        registry.register(Box::new(active_orders.clone()))?;

        Ok(Self {
            registry,
            actions_total,
            action_latency_seconds,
            transitions_total,
            simulator_ticks_total,
            notifications_total,
            roster_size,
            active_orders,
        })
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}

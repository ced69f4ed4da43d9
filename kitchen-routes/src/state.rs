use crate::error::MetricsSetupError;
use crate::metrics;
use crate::service::KitchenService;
use axum::extract::FromRef;
use error_stack::Report;
use kitchen_core::KitchenEngine;
use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub struct KitchenAppState<T: KitchenEngine> {
    pub service: KitchenService<T>,
    /// `None` when metrics are disabled.
    pub metrics: Option<PrometheusHandle>,
}

impl<T: KitchenEngine> KitchenAppState<T> {
    /// Installs the process-wide Prometheus recorder, so only call this once.
    pub fn new_with_metrics(engine: T) -> Result<Self, Report<MetricsSetupError>> {
        Ok(Self {
            service: KitchenService::new(engine),
            metrics: Some(metrics::setup_recorder()?),
        })
    }

    pub fn new_without_metrics(engine: T) -> Self {
        Self {
            service: KitchenService::new(engine),
            metrics: None,
        }
    }
}

impl<T: KitchenEngine> FromRef<KitchenAppState<T>> for KitchenService<T> {
    fn from_ref(input: &KitchenAppState<T>) -> Self {
        input.service.clone()
    }
}

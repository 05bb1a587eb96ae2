use crate::domain::hit::HitParameters;
use crate::domain::payment::PaymentId;
use std::sync::Arc;

/// Extension point receiving the hit parameters before they are encoded.
pub trait HitExtension: Send + Sync {
    fn extend(&self, params: HitParameters, payment_id: &PaymentId) -> HitParameters;
}

impl<F> HitExtension for F
where
    F: Fn(HitParameters, &PaymentId) -> HitParameters + Send + Sync,
{
    fn extend(&self, params: HitParameters, payment_id: &PaymentId) -> HitParameters {
        self(params, payment_id)
    }
}

/// Extension point that can veto (or force) the front-end eligibility check.
pub trait SendFilter: Send + Sync {
    fn filter(&self, allowed: bool, payment_id: &PaymentId) -> bool;
}

impl<F> SendFilter for F
where
    F: Fn(bool, &PaymentId) -> bool + Send + Sync,
{
    fn filter(&self, allowed: bool, payment_id: &PaymentId) -> bool {
        self(allowed, payment_id)
    }
}

/// Registered extensions, applied in registration order.
#[derive(Default, Clone)]
pub struct Hooks {
    hit_extensions: Vec<Arc<dyn HitExtension>>,
    send_filters: Vec<Arc<dyn SendFilter>>,
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_hit_extension(&mut self, extension: impl HitExtension + 'static) -> &mut Self {
        self.hit_extensions.push(Arc::new(extension));
        self
    }

    pub fn add_send_filter(&mut self, filter: impl SendFilter + 'static) -> &mut Self {
        self.send_filters.push(Arc::new(filter));
        self
    }

    pub fn extend_hit_parameters(
        &self,
        params: HitParameters,
        payment_id: &PaymentId,
    ) -> HitParameters {
        self.hit_extensions
            .iter()
            .fold(params, |params, ext| ext.extend(params, payment_id))
    }

    pub fn filter_should_send(&self, allowed: bool, payment_id: &PaymentId) -> bool {
        self.send_filters
            .iter()
            .fold(allowed, |allowed, filter| filter.filter(allowed, payment_id))
    }
}

use super::payment::{FormId, PaymentId};
use crate::config::TrackingConfig;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use rust_decimal::Decimal;

/// RFC 3986 unreserved characters stay literal, everything else is escaped.
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

pub const EVENT_CATEGORY: &str = "Fundraising";
pub const EVENT_ACTION: &str = "Donation Success";
pub const PRODUCT_BRAND: &str = "Fundraising";
pub const PRODUCT_ACTION: &str = "purchase";

/// What the dispatcher reads from the donation platform to describe one donation.
#[derive(Debug, Clone, PartialEq)]
pub struct DonationDetails {
    pub payment_id: PaymentId,
    pub form_id: FormId,
    pub form_title: String,
    pub total: Decimal,
}

/// Flat, ordered set of Measurement Protocol parameters for one hit.
///
/// Setting an existing key replaces its value in place, so extensions can
/// override defaults without reordering the query string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HitParameters {
    params: Vec<(String, String)>,
}

impl HitParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the ecommerce event hit sent when a donation completes.
    pub fn completed_donation(config: &TrackingConfig, donation: &DonationDetails) -> Self {
        let mut hit = Self::new();
        hit.set("v", "1");
        hit.set("tid", config.tracking_id().unwrap_or_default());
        hit.set("cid", &config.client_id);
        hit.set("t", "event");
        hit.set("ec", EVENT_CATEGORY);
        hit.set("ea", EVENT_ACTION);
        hit.set("el", &donation.form_title);
        hit.set("ti", donation.payment_id.as_str());
        hit.set("tr", donation.total.to_string());
        hit.set("ta", config.affiliation.as_deref().unwrap_or_default());
        hit.set("pal", config.list.as_deref().unwrap_or_default());
        hit.set("pa", PRODUCT_ACTION);
        hit.set("pr1id", donation.form_id.as_str());
        hit.set("pr1nm", &donation.form_title);
        hit.set("pr1ca", config.category_or_default());
        hit.set("pr1br", PRODUCT_BRAND);
        hit.set("pr1qt", "1");
        hit
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.params.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.params.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        let index = self.params.iter().position(|(k, _)| k == key)?;
        Some(self.params.remove(index).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Percent-encodes every key and value and joins them as a query string.
    pub fn to_query_string(&self) -> String {
        self.params
            .iter()
            .map(|(k, v)| {
                format!(
                    "{}={}",
                    utf8_percent_encode(k, QUERY_VALUE),
                    utf8_percent_encode(v, QUERY_VALUE)
                )
            })
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Full GET URL for the collection endpoint.
    pub fn collect_url(&self, endpoint: &str) -> String {
        if self.params.is_empty() {
            return endpoint.to_string();
        }
        let separator = if endpoint.contains('?') { '&' } else { '?' };
        format!("{endpoint}{separator}{}", self.to_query_string())
    }
}

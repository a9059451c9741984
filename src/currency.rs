/// Display currency for every price returned by this service.
pub const EUR: &str = "EUR";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Currency {
    Usd,
    Eur,
}

/// Conversion rates injected from config rather than hardcoded at call
/// sites, so the rate can be updated (or mocked in tests) without touching
/// adapter code. Static by design: no live FX lookup.
#[derive(Debug, Clone, Copy)]
pub struct FxRates {
    usd_to_eur: f64,
}

impl FxRates {
    pub fn new(usd_to_eur: f64) -> Self {
        Self { usd_to_eur }
    }

    /// Convert a provider-native amount to EUR, rounded to 2 decimals.
    pub fn to_eur(&self, amount: f64, currency: Currency) -> f64 {
        match currency {
            Currency::Eur => round2(amount),
            Currency::Usd => round2(amount * self.usd_to_eur),
        }
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

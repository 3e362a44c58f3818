use chrono::Duration;

/// Tunables of the donation intake rules.
#[derive(Debug, Clone, PartialEq)]
pub struct IntakeConfig {
    /// Delay after which a merged donation is stripped from an unpaid
    /// sponsorship invoice.
    pub rollback_delay: Duration,
    /// Currency shown in donor notifications.
    pub currency: String,
    /// Source reported when the app does not send one.
    pub default_source: String,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            rollback_delay: Duration::minutes(15),
            currency: "CHF".to_string(),
            default_source: "iOS".to_string(),
        }
    }
}

impl IntakeConfig {
    pub fn with_rollback_minutes(mut self, minutes: i64) -> Self {
        self.rollback_delay = Duration::minutes(minutes);
        self
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }
}

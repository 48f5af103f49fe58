//! Maps `Box<dyn Error>` from trait boundaries to typed `AirmonError`.
//!
//! The traits in `airmon_traits` use `Box<dyn Error + Send + Sync>` for maximum
//! flexibility; this module converts those to our typed error enum, with an
//! optional feature-gated path for `airmon_hardware::HwError` downcasting.

use crate::error::AirmonError;

/// Map a trait-boundary error to a typed `AirmonError`.
///
/// Attempts to downcast known hardware error types first, then falls back
/// to string-based heuristics.
pub fn map_hw_error(e: &(dyn std::error::Error + 'static)) -> AirmonError {
    // Feature-gated: try to downcast to HwError for precise mapping
    #[cfg(feature = "hardware-errors")]
    {
        use airmon_hardware::error::HwError;
        if let Some(hw) = e.downcast_ref::<HwError>() {
            return match hw {
                HwError::Timeout => AirmonError::Timeout,
                HwError::LinkDown => AirmonError::LinkDown,
                HwError::NotConnected => AirmonError::BrokerUnavailable(hw.to_string()),
                HwError::Http(msg) => AirmonError::Upload(msg.clone()),
                HwError::Mqtt(msg) => AirmonError::Publish(msg.clone()),
                other => AirmonError::HardwareFault(other.to_string()),
            };
        }
    }

    // Fallback: string-based detection
    let s = e.to_string();
    if s.to_lowercase().contains("timeout") {
        AirmonError::Timeout
    } else {
        AirmonError::Hardware(s)
    }
}

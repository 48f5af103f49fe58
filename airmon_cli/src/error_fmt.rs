//! Human-readable error descriptions and structured JSON error formatting.

use airmon_core::error::{AirmonError, BuildError};

/// Exit code for a failed run that fits no narrower category.
pub const EXIT_GENERIC: i32 = 1;
/// A start-up device (renderer, ADC, GPIO) could not be brought up.
pub const EXIT_INIT: i32 = 2;
/// The configuration file is missing, unparsable, or invalid.
pub const EXIT_CONFIG: i32 = 3;

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingAcquisition | BuildError::MissingRenderer | BuildError::MissingTransport => format!(
                "What happened: The monitor could not be assembled ({be}).\nLikely causes: A collaborator failed to initialize before the loop was built.\nHow to fix: Re-run with --log-level=debug and check the start-up messages."
            ),
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun `airmon health`."
            ),
        };
    }

    if let Some(ae) = err.downcast_ref::<AirmonError>() {
        return match ae {
            AirmonError::Config(msg) => format!(
                "What happened: Configuration is invalid or unreadable.\nDetails: {msg}\nHow to fix: Edit the TOML config and run `airmon health` until it prints ok."
            ),
            AirmonError::Init(msg) => format!(
                "What happened: A start-up device failed ({msg}).\nLikely causes: Display or bus not connected, or no permission to open it.\nHow to fix: Check wiring and permissions, then start again."
            ),
            AirmonError::Timeout => "What happened: A sensor read timed out.\nLikely causes: DHT11 not wired to the configured pin, or missing pull-up.\nHow to fix: Verify [pins] dht and the sensor's power.".to_string(),
            AirmonError::HardwareFault(msg) | AirmonError::Hardware(msg) => format!(
                "What happened: Hardware access failed ({msg}).\nLikely causes: SPI/GPIO not enabled, wrong pin numbers, or insufficient permissions.\nHow to fix: Enable SPI, fix [pins]/[channels], and make sure the user can access /dev/gpiomem and /dev/spidev*."
            ),
            other => format!(
                "What happened: {other}.\nLikely causes: See logs.\nHow to fix: Re-run with --log-level=debug or set RUST_LOG for more detail."
            ),
        };
    }

    // String-based heuristics for errors coming from hardware or transport init
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.contains("requires the") && lower.contains("feature") {
        return format!(
            "What happened: {msg}.\nHow to fix: Rebuild with the named cargo feature, or set [transport] mode = \"sim\"."
        );
    }

    if lower.contains("open adc") || lower.contains("open dht") {
        return "What happened: Failed to initialize sensor hardware.\nLikely causes: SPI disabled, incorrect pin numbers, or insufficient GPIO permissions.\nHow to fix: Enable SPI, fix the [pins] values in the config, and check device permissions.".to_string();
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes: 3 config, 2 init, 1 anything else.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if err.downcast_ref::<BuildError>().is_some() {
        return EXIT_CONFIG;
    }
    match err.downcast_ref::<AirmonError>() {
        Some(AirmonError::Config(_)) => EXIT_CONFIG,
        Some(AirmonError::Init(_) | AirmonError::Hardware(_) | AirmonError::HardwareFault(_)) => {
            EXIT_INIT
        }
        _ => EXIT_GENERIC,
    }
}

fn reason_name(err: &eyre::Report) -> &'static str {
    match exit_code_for_error(err) {
        EXIT_CONFIG => "ConfigInvalid",
        EXIT_INIT => "InitFailed",
        _ => "Error",
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;
    json!({
        "reason": reason_name(err),
        "exit_code": exit_code_for_error(err),
        "message": humanize(err),
    })
    .to_string()
}

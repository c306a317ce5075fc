use crate::logging::LogLevel;

const DEFAULT_HEADER_OFFSET: f64 = 80.0;
const DEFAULT_HEADER_HIDE_AFTER: f64 = 100.0;
const DEFAULT_HEADER_TINT_AFTER: f64 = 50.0;
const DEFAULT_SECTION_OFFSET: f64 = 100.0;
const DEFAULT_MOBILE_BREAKPOINT: f64 = 768.0;
const DEFAULT_RESIZE_QUIET_MS: u32 = 250;
const DEFAULT_COUNTER_DURATION_MS: u32 = 2_000;
const DEFAULT_COUNTER_TICK_MS: u32 = 16;
const DEFAULT_PARALLAX_SPEED: f64 = 0.5;
const DEFAULT_TOOLTIP_GAP: f64 = 10.0;
const DEFAULT_PRELOADER_DELAY_MS: u32 = 500;
const DEFAULT_SUCCESS_MESSAGE_MS: u32 = 3_000;
const DEFAULT_REVEAL_THRESHOLD: f64 = 0.1;
const DEFAULT_REVEAL_BOTTOM_MARGIN: f64 = -50.0;
const DEFAULT_HIGHLIGHT_THROTTLE_MS: u32 = 0;
const DEFAULT_LOG_LEVEL: LogLevel = LogLevel::Info;

const HEADER_OFFSET_BOUNDS: (f64, f64) = (0.0, 400.0);
const HEADER_THRESHOLD_BOUNDS: (f64, f64) = (0.0, 2_000.0);
const SECTION_OFFSET_BOUNDS: (f64, f64) = (0.0, 1_000.0);
const MOBILE_BREAKPOINT_BOUNDS: (f64, f64) = (320.0, 4_096.0);
const RESIZE_QUIET_MS_BOUNDS: (u32, u32) = (0, 5_000);
const COUNTER_DURATION_MS_BOUNDS: (u32, u32) = (16, 60_000);
const COUNTER_TICK_MS_BOUNDS: (u32, u32) = (1, 1_000);
const PARALLAX_SPEED_BOUNDS: (f64, f64) = (-10.0, 10.0);
const TOOLTIP_GAP_BOUNDS: (f64, f64) = (0.0, 200.0);
const PRELOADER_DELAY_MS_BOUNDS: (u32, u32) = (0, 10_000);
const SUCCESS_MESSAGE_MS_BOUNDS: (u32, u32) = (0, 60_000);
const REVEAL_THRESHOLD_BOUNDS: (f64, f64) = (0.0, 1.0);
const REVEAL_BOTTOM_MARGIN_BOUNDS: (f64, f64) = (-1_000.0, 1_000.0);
const HIGHLIGHT_THROTTLE_MS_BOUNDS: (u32, u32) = (0, 1_000);
const TYPEWRITER_SPEED_MS_BOUNDS: (u32, u32) = (1, 2_000);

// Missing, unparsable or out-of-range attributes fall back to the default.
#[derive(Clone, Debug, PartialEq)]
pub struct SiteConfig {
    pub header_offset: f64,
    pub header_hide_after: f64,
    pub header_tint_after: f64,
    pub section_offset: f64,
    pub mobile_breakpoint: f64,
    pub resize_quiet_ms: u32,
    pub counter_duration_ms: u32,
    pub counter_tick_ms: u32,
    pub parallax_speed: f64,
    pub tooltip_gap: f64,
    pub preloader_delay_ms: u32,
    pub success_message_ms: u32,
    pub reveal_threshold: f64,
    pub reveal_bottom_margin: f64,
    pub highlight_throttle_ms: u32,
    pub typewriter_speed_ms: Option<u32>,
    pub log_level: LogLevel,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            header_offset: DEFAULT_HEADER_OFFSET,
            header_hide_after: DEFAULT_HEADER_HIDE_AFTER,
            header_tint_after: DEFAULT_HEADER_TINT_AFTER,
            section_offset: DEFAULT_SECTION_OFFSET,
            mobile_breakpoint: DEFAULT_MOBILE_BREAKPOINT,
            resize_quiet_ms: DEFAULT_RESIZE_QUIET_MS,
            counter_duration_ms: DEFAULT_COUNTER_DURATION_MS,
            counter_tick_ms: DEFAULT_COUNTER_TICK_MS,
            parallax_speed: DEFAULT_PARALLAX_SPEED,
            tooltip_gap: DEFAULT_TOOLTIP_GAP,
            preloader_delay_ms: DEFAULT_PRELOADER_DELAY_MS,
            success_message_ms: DEFAULT_SUCCESS_MESSAGE_MS,
            reveal_threshold: DEFAULT_REVEAL_THRESHOLD,
            reveal_bottom_margin: DEFAULT_REVEAL_BOTTOM_MARGIN,
            highlight_throttle_ms: DEFAULT_HIGHLIGHT_THROTTLE_MS,
            typewriter_speed_ms: None,
            log_level: DEFAULT_LOG_LEVEL,
        }
    }
}

impl SiteConfig {
    // `lookup` takes the attribute name without `data-`.
    pub fn from_dataset(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let lookup = &lookup;
        Self {
            header_offset: parse_f64_with_bounds(
                lookup,
                "header-offset",
                DEFAULT_HEADER_OFFSET,
                HEADER_OFFSET_BOUNDS,
            ),
            header_hide_after: parse_f64_with_bounds(
                lookup,
                "header-hide-after",
                DEFAULT_HEADER_HIDE_AFTER,
                HEADER_THRESHOLD_BOUNDS,
            ),
            header_tint_after: parse_f64_with_bounds(
                lookup,
                "header-tint-after",
                DEFAULT_HEADER_TINT_AFTER,
                HEADER_THRESHOLD_BOUNDS,
            ),
            section_offset: parse_f64_with_bounds(
                lookup,
                "section-offset",
                DEFAULT_SECTION_OFFSET,
                SECTION_OFFSET_BOUNDS,
            ),
            mobile_breakpoint: parse_f64_with_bounds(
                lookup,
                "mobile-breakpoint",
                DEFAULT_MOBILE_BREAKPOINT,
                MOBILE_BREAKPOINT_BOUNDS,
            ),
            resize_quiet_ms: parse_u32_with_bounds(
                lookup,
                "resize-quiet-ms",
                DEFAULT_RESIZE_QUIET_MS,
                RESIZE_QUIET_MS_BOUNDS,
            ),
            counter_duration_ms: parse_u32_with_bounds(
                lookup,
                "counter-duration-ms",
                DEFAULT_COUNTER_DURATION_MS,
                COUNTER_DURATION_MS_BOUNDS,
            ),
            counter_tick_ms: parse_u32_with_bounds(
                lookup,
                "counter-tick-ms",
                DEFAULT_COUNTER_TICK_MS,
                COUNTER_TICK_MS_BOUNDS,
            ),
            parallax_speed: parse_f64_with_bounds(
                lookup,
                "parallax-speed",
                DEFAULT_PARALLAX_SPEED,
                PARALLAX_SPEED_BOUNDS,
            ),
            tooltip_gap: parse_f64_with_bounds(
                lookup,
                "tooltip-gap",
                DEFAULT_TOOLTIP_GAP,
                TOOLTIP_GAP_BOUNDS,
            ),
            preloader_delay_ms: parse_u32_with_bounds(
                lookup,
                "preloader-delay-ms",
                DEFAULT_PRELOADER_DELAY_MS,
                PRELOADER_DELAY_MS_BOUNDS,
            ),
            success_message_ms: parse_u32_with_bounds(
                lookup,
                "success-message-ms",
                DEFAULT_SUCCESS_MESSAGE_MS,
                SUCCESS_MESSAGE_MS_BOUNDS,
            ),
            reveal_threshold: parse_f64_with_bounds(
                lookup,
                "reveal-threshold",
                DEFAULT_REVEAL_THRESHOLD,
                REVEAL_THRESHOLD_BOUNDS,
            ),
            reveal_bottom_margin: parse_f64_with_bounds(
                lookup,
                "reveal-bottom-margin",
                DEFAULT_REVEAL_BOTTOM_MARGIN,
                REVEAL_BOTTOM_MARGIN_BOUNDS,
            ),
            highlight_throttle_ms: parse_u32_with_bounds(
                lookup,
                "highlight-throttle-ms",
                DEFAULT_HIGHLIGHT_THROTTLE_MS,
                HIGHLIGHT_THROTTLE_MS_BOUNDS,
            ),
            typewriter_speed_ms: parse_optional_u32_with_bounds(
                lookup,
                "typewriter-speed",
                TYPEWRITER_SPEED_MS_BOUNDS,
            ),
            log_level: parse_non_empty_string(lookup, "log-level")
                .and_then(|value| LogLevel::parse(&value))
                .unwrap_or(DEFAULT_LOG_LEVEL),
        }
    }
}

fn parse_non_empty_string(lookup: &dyn Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_f64_with_bounds(
    lookup: &dyn Fn(&str) -> Option<String>,
    name: &str,
    default: f64,
    bounds: (f64, f64),
) -> f64 {
    parse_non_empty_string(lookup, name)
        .and_then(|value| value.parse::<f64>().ok())
        .filter(|value| (bounds.0..=bounds.1).contains(value))
        .unwrap_or(default)
}

fn parse_u32_with_bounds(
    lookup: &dyn Fn(&str) -> Option<String>,
    name: &str,
    default: u32,
    bounds: (u32, u32),
) -> u32 {
    parse_optional_u32_with_bounds(lookup, name, bounds).unwrap_or(default)
}

fn parse_optional_u32_with_bounds(
    lookup: &dyn Fn(&str) -> Option<String>,
    name: &str,
    bounds: (u32, u32),
) -> Option<u32> {
    parse_non_empty_string(lookup, name)
        .and_then(|value| value.parse::<u32>().ok())
        .filter(|value| (bounds.0..=bounds.1).contains(value))
}

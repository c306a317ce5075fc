use serde_json::{json, Value};

const BANNER_TITLE: &str = "🎯 Cocon - 主役は、あなただ";
const BANNER_TITLE_STYLE: &str = "font-size: 20px; font-weight: bold; color: #139a98;";
const BANNER_TAGLINE: &str = "人生は行動だ - あなたの新しいスタートを応援します！";
const BANNER_TAGLINE_STYLE: &str = "font-size: 14px; color: #5a6c7d;";

// Declaration order is severity order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            _ => None,
        }
    }
}

pub fn log_event(threshold: LogLevel, level: LogLevel, event: &str, fields: Value) {
    if level < threshold {
        return;
    }
    emit(&format_event(level, event, fields));
}

// Event fields come after `ts`, `level` and `event` and cannot replace them.
fn format_event(level: LogLevel, event: &str, fields: Value) -> String {
    let mut line = json!({
        "ts": now_unix_millis(),
        "level": level.as_str(),
        "event": event,
    });
    if let (Some(line), Value::Object(fields)) = (line.as_object_mut(), fields) {
        for (key, value) in fields {
            line.entry(key).or_insert(value);
        }
    }
    line.to_string()
}

#[cfg(target_arch = "wasm32")]
fn emit(line: &str) {
    web_sys::console::log_1(&wasm_bindgen::JsValue::from_str(line));
}

#[cfg(not(target_arch = "wasm32"))]
fn emit(line: &str) {
    println!("{line}");
}

#[cfg(target_arch = "wasm32")]
fn now_unix_millis() -> u64 {
    js_sys::Date::now() as u64
}

#[cfg(not(target_arch = "wasm32"))]
fn now_unix_millis() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|value| value.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(target_arch = "wasm32")]
pub fn print_banner() {
    use wasm_bindgen::JsValue;

    for (text, style) in [
        (BANNER_TITLE, BANNER_TITLE_STYLE),
        (BANNER_TAGLINE, BANNER_TAGLINE_STYLE),
    ] {
        web_sys::console::log_2(
            &JsValue::from_str(&format!("%c{text}")),
            &JsValue::from_str(style),
        );
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn print_banner() {
    println!("{BANNER_TITLE}");
    println!("{BANNER_TAGLINE}");
}

//! Lightweight i18n translation registry.
//!
//! A static translation map keyed by `(locale, message_key)`, used for the
//! default alert sentence, operator wording and dimension labels.
//! Supported locales: `zh-CN`, `en`.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Default locale when none is configured.
pub const DEFAULT_LOCALE: &str = "zh-CN";

/// Supported locales.
pub const SUPPORTED_LOCALES: &[&str] = &["zh-CN", "en"];

/// Central translation registry.
pub struct Translations {
    map: HashMap<(&'static str, &'static str), &'static str>,
}

impl Translations {
    /// Get a translated string for the given locale and key.
    /// Falls back to `en` if the locale is not found, then to the provided default.
    pub fn get<'a>(&self, locale: &str, key: &str, default: &'a str) -> &'a str {
        if let Some(&val) = self.map.get(&(locale, key)) {
            return val;
        }
        if locale != "en" {
            if let Some(&val) = self.map.get(&("en", key)) {
                return val;
            }
        }
        default
    }
}

/// Global translation singleton.
pub static TRANSLATIONS: LazyLock<Translations> = LazyLock::new(|| {
    let mut map = HashMap::new();

    macro_rules! t {
        ($locale:expr, $key:expr, $val:expr) => {
            map.insert(($locale, $key), $val);
        };
    }

    // ---- Default alert sentence (rule without a message template) ----
    t!(
        "en",
        "alert.default",
        "Host {ip}: {field_name} is {current_value}, {op} threshold {threshold_value}"
    );
    t!(
        "zh-CN",
        "alert.default",
        "主机 {ip} 的 {field_name} 当前值 {current_value}，{op}阈值 {threshold_value}"
    );

    // ---- Operator wording ----
    t!("en", "op.gt", "above");
    t!("zh-CN", "op.gt", "高于");
    t!("en", "op.lt", "below");
    t!("zh-CN", "op.lt", "低于");
    t!("en", "op.ge", "at or above");
    t!("zh-CN", "op.ge", "大于等于");
    t!("en", "op.le", "at or below");
    t!("zh-CN", "op.le", "小于等于");
    t!("en", "op.eq", "equal to");
    t!("zh-CN", "op.eq", "等于");
    t!("en", "op.ne", "not equal to");
    t!("zh-CN", "op.ne", "不等于");

    // ---- Scoring dimensions ----
    t!("en", "dimension.cpu", "CPU");
    t!("zh-CN", "dimension.cpu", "CPU");
    t!("en", "dimension.memory", "Memory");
    t!("zh-CN", "dimension.memory", "内存");
    t!("en", "dimension.disk", "Disk");
    t!("zh-CN", "dimension.disk", "磁盘");
    t!("en", "dimension.network", "Network");
    t!("zh-CN", "dimension.network", "网络");
    t!("en", "dimension.swap", "Swap");
    t!("zh-CN", "dimension.swap", "Swap");

    Translations { map }
});

/// Check if a locale string is supported.
pub fn is_supported_locale(locale: &str) -> bool {
    SUPPORTED_LOCALES.contains(&locale)
}

/// Normalize locale: return the locale if supported, otherwise return the default.
pub fn normalize_locale(locale: &str) -> &str {
    if is_supported_locale(locale) {
        locale
    } else {
        DEFAULT_LOCALE
    }
}

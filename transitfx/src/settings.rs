//! User settings as stored in `chrome.storage.sync`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Storage key of the settings object.
pub const SETTINGS_KEY: &str = "transitfx-settings";

const LEGACY_THEME_KEY: &str = "selectedTheme";
const LEGACY_TINT_FILTER: &str = "theme-tint";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speed {
    Fast,
    #[default]
    Normal,
    Slow,
}

impl Speed {
    pub fn multiplier(self) -> f64 {
        match self {
            Speed::Fast => 0.6,
            Speed::Normal => 1.0,
            Speed::Slow => 1.5,
        }
    }
}

/// Which sites the transition runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SiteMode {
    #[default]
    All,
    Allowlist,
    Blocklist,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PageFilter {
    #[default]
    Off,
    GreenTerminal,
    BlueTerminal,
    PinkTerminal,
    YellowTerminal,
    Crt,
}

impl PageFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            PageFilter::Off => "off",
            PageFilter::GreenTerminal => "green-terminal",
            PageFilter::BlueTerminal => "blue-terminal",
            PageFilter::PinkTerminal => "pink-terminal",
            PageFilter::YellowTerminal => "yellow-terminal",
            PageFilter::Crt => "crt",
        }
    }

    /// One of the four single-hue terminal filters.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            PageFilter::GreenTerminal
                | PageFilter::BlueTerminal
                | PageFilter::PinkTerminal
                | PageFilter::YellowTerminal
        )
    }

    pub fn has_scanlines(self) -> bool {
        self.is_terminal() || self == PageFilter::Crt
    }
}

/// Everything the content script and background worker read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub enabled: bool,
    /// `"random"`, `"random:<pack>"` or an effect id.
    pub selected_effect: String,
    pub speed: Speed,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_duration: Option<f64>,
    pub site_mode: SiteMode,
    pub site_list: Vec<String>,
    pub page_filter: PageFilter,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled: true,
            selected_effect: "random".to_owned(),
            speed: Speed::Normal,
            custom_duration: None,
            site_mode: SiteMode::All,
            site_list: Vec::new(),
            page_filter: PageFilter::Off,
        }
    }
}

impl Settings {
    /// Decode a stored settings object, tolerating missing and invalid fields.
    ///
    /// Returns the settings and whether a legacy key was migrated, in which
    /// case the caller should write the result back. Fields with unknown
    /// values fall back to their defaults without counting as a migration.
    pub fn from_stored(stored: Option<&Value>) -> (Settings, bool) {
        let mut settings = Settings::default();
        let Some(Value::Object(fields)) = stored else {
            return (settings, false);
        };

        let mut migrated = fields.contains_key(LEGACY_THEME_KEY);

        read_field(fields, "enabled", &mut settings.enabled);
        read_field(fields, "selectedEffect", &mut settings.selected_effect);
        read_field(fields, "speed", &mut settings.speed);
        read_field(fields, "siteMode", &mut settings.site_mode);
        read_field(fields, "siteList", &mut settings.site_list);

        settings.custom_duration = fields.get("customDuration").and_then(Value::as_f64);

        match fields.get("pageFilter") {
            Some(Value::String(filter)) if filter == LEGACY_TINT_FILTER => {
                settings.page_filter = PageFilter::Off;
                migrated = true;
            }
            _ => read_field(fields, "pageFilter", &mut settings.page_filter),
        }

        (settings, migrated)
    }

    /// Deadline for an effect whose nominal length is `base_ms`.
    ///
    /// A positive `customDuration` wins; otherwise the base duration is scaled
    /// by the speed multiplier and rounded to whole milliseconds.
    pub fn effective_duration(&self, base_ms: u32) -> u32 {
        match self.custom_duration.filter(|ms| ms.is_finite() && *ms > 0.0) {
            Some(custom) => custom.round().min(f64::from(u32::MAX)) as u32,
            None => (f64::from(base_ms) * self.speed.multiplier()).round() as u32,
        }
    }

    /// Whether the site list admits `hostname` under the current site mode.
    pub fn applies_to_host(&self, hostname: &str) -> bool {
        let listed = || {
            self.site_list
                .iter()
                .map(|entry| entry.trim())
                .filter(|entry| !entry.is_empty())
                .any(|entry| hostname.contains(entry))
        };

        match self.site_mode {
            SiteMode::All => true,
            SiteMode::Allowlist => listed(),
            SiteMode::Blocklist => !listed(),
        }
    }

    pub fn apply(&mut self, patch: SettingsPatch) {
        let SettingsPatch {
            enabled,
            selected_effect,
            speed,
            custom_duration,
            site_mode,
            site_list,
            page_filter,
        } = patch;

        if let Some(enabled) = enabled {
            self.enabled = enabled;
        }
        if let Some(selected_effect) = selected_effect {
            self.selected_effect = selected_effect;
        }
        if let Some(speed) = speed {
            self.speed = speed;
        }
        if let Some(custom_duration) = custom_duration {
            self.custom_duration = custom_duration;
        }
        if let Some(site_mode) = site_mode {
            self.site_mode = site_mode;
        }
        if let Some(site_list) = site_list {
            self.site_list = site_list;
        }
        if let Some(page_filter) = page_filter {
            self.page_filter = page_filter;
        }
    }
}

/// Partial update sent by the popup and options pages.
///
/// `customDuration: null` clears the override; an absent key leaves it alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_effect: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<Speed>,
    #[allow(clippy::option_option)]
    #[serde(
        deserialize_with = "present_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub custom_duration: Option<Option<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_mode: Option<SiteMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_list: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_filter: Option<PageFilter>,
}

fn read_field<T: DeserializeOwned>(fields: &Map<String, Value>, key: &str, slot: &mut T) {
    if let Some(value) = fields.get(key) {
        match serde_json::from_value(value.clone()) {
            Ok(parsed) => *slot = parsed,
            Err(err) => tracing::warn!(field = key, %err, "ignoring invalid stored setting"),
        }
    }
}

// Distinguishes `"customDuration": null` (clear) from a missing key (keep).
fn present_or_null<'de, D>(deserializer: D) -> Result<Option<Option<f64>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<f64>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn missing_object_yields_defaults() {
        let (settings, migrated) = Settings::from_stored(None);

        assert_eq!(settings, Settings::default());
        assert!(settings.enabled);
        assert_eq!(settings.selected_effect, "random");
        assert!(!migrated);
    }

    #[test]
    fn legacy_keys_are_migrated() {
        let stored = json!({
            "enabled": false,
            "selectedTheme": "cyberpunk",
            "pageFilter": "theme-tint",
            "siteMode": "blocklist",
            "siteList": ["example.com"],
        });

        let (settings, migrated) = Settings::from_stored(Some(&stored));

        assert!(migrated);
        assert!(!settings.enabled);
        assert_eq!(settings.page_filter, PageFilter::Off);
        assert_eq!(settings.site_mode, SiteMode::Blocklist);

        let written = serde_json::to_value(&settings).unwrap();
        assert!(written.get("selectedTheme").is_none());
        assert_eq!(written["pageFilter"], "off");
    }

    #[test]
    fn unknown_values_fall_back_without_migration() {
        let stored = json!({ "speed": "ludicrous", "pageFilter": "sepia", "siteList": "nope" });

        let (settings, migrated) = Settings::from_stored(Some(&stored));

        assert_eq!(settings.speed, Speed::Normal);
        assert_eq!(settings.page_filter, PageFilter::Off);
        assert!(settings.site_list.is_empty());
        assert!(!migrated);
    }

    #[test]
    fn duration_law() {
        let mut settings = Settings::default();
        assert_eq!(settings.effective_duration(1800), 1800);

        settings.speed = Speed::Fast;
        assert_eq!(settings.effective_duration(1800), 1080);
        assert_eq!(settings.effective_duration(1500), 900);

        settings.speed = Speed::Slow;
        assert_eq!(settings.effective_duration(1400), 2100);
        assert_eq!(settings.effective_duration(1), 2);

        settings.custom_duration = Some(750.4);
        assert_eq!(settings.effective_duration(1400), 750);

        settings.custom_duration = Some(0.0);
        assert_eq!(settings.effective_duration(1400), 2100);
        settings.custom_duration = Some(-20.0);
        assert_eq!(settings.effective_duration(1000), 1500);
    }

    #[test]
    fn site_lists_match_by_substring() {
        let mut settings = Settings {
            site_mode: SiteMode::Allowlist,
            site_list: vec!["example.com".to_owned(), "  ".to_owned()],
            ..Settings::default()
        };

        assert!(settings.applies_to_host("docs.example.com"));
        assert!(!settings.applies_to_host("rust-lang.org"));

        settings.site_mode = SiteMode::Blocklist;
        assert!(!settings.applies_to_host("docs.example.com"));
        assert!(settings.applies_to_host("rust-lang.org"));

        settings.site_mode = SiteMode::All;
        assert!(settings.applies_to_host("docs.example.com"));
    }

    #[test]
    fn blank_entries_never_match() {
        let settings = Settings {
            site_mode: SiteMode::Allowlist,
            site_list: vec![String::new()],
            ..Settings::default()
        };

        assert!(!settings.applies_to_host("anything.test"));
    }

    #[test]
    fn patch_merges_only_present_fields() {
        let mut settings = Settings {
            custom_duration: Some(900.0),
            ..Settings::default()
        };

        let patch: SettingsPatch =
            serde_json::from_value(json!({ "enabled": false, "speed": "slow" })).unwrap();
        settings.apply(patch);

        assert!(!settings.enabled);
        assert_eq!(settings.speed, Speed::Slow);
        assert_eq!(settings.custom_duration, Some(900.0));

        let clear: SettingsPatch =
            serde_json::from_value(json!({ "customDuration": null })).unwrap();
        settings.apply(clear);
        assert_eq!(settings.custom_duration, None);
    }

    #[test]
    fn settings_serialize_in_camel_case() {
        let value = serde_json::to_value(Settings::default()).unwrap();

        assert_eq!(
            value,
            json!({
                "enabled": true,
                "selectedEffect": "random",
                "speed": "normal",
                "siteMode": "all",
                "siteList": [],
                "pageFilter": "off",
            })
        );
    }

    #[test]
    fn filter_groups() {
        assert!(PageFilter::PinkTerminal.is_terminal());
        assert!(!PageFilter::Crt.is_terminal());
        assert!(PageFilter::Crt.has_scanlines());
        assert!(!PageFilter::Off.has_scanlines());
        assert_eq!(PageFilter::YellowTerminal.as_str(), "yellow-terminal");
    }
}

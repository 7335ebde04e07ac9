//! Endpoint address and query assembly.
//!
//! A request URL is materialized per load call: for each attribute whose
//! [`QueryOptions`] toggle is enabled, the value is read from the current
//! [`DeviceSnapshot`] and attached under a fixed parameter name. Two attribute
//! groups are additionally gated on [`Capabilities`]; a missing capability is
//! silent omission, never an error.

use url::Url;

use crate::device::{Capabilities, DeviceSnapshot};

/// Which device attributes are reported to the endpoint.
///
/// One independent toggle per attribute. Every toggle starts enabled; disable
/// what the endpoint does not vary on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOptions {
    pub(crate) font_scale: bool,
    pub(crate) hard_keyboard_hidden: bool,
    pub(crate) keyboard: bool,
    pub(crate) keyboard_hidden: bool,
    pub(crate) locale: bool,
    pub(crate) mcc: bool,
    pub(crate) mnc: bool,
    pub(crate) navigation: bool,
    pub(crate) navigation_hidden: bool,
    pub(crate) orientation: bool,
    pub(crate) screen_layout: bool,
    pub(crate) touchscreen: bool,
    pub(crate) ui_mode: bool,
    pub(crate) density_dpi: bool,
    pub(crate) screen_width_dp: bool,
    pub(crate) screen_height_dp: bool,
    pub(crate) smallest_screen_width_dp: bool,
}

impl QueryOptions {
    /// Every attribute enabled.
    pub fn all() -> Self {
        Self {
            font_scale: true,
            hard_keyboard_hidden: true,
            keyboard: true,
            keyboard_hidden: true,
            locale: true,
            mcc: true,
            mnc: true,
            navigation: true,
            navigation_hidden: true,
            orientation: true,
            screen_layout: true,
            touchscreen: true,
            ui_mode: true,
            density_dpi: true,
            screen_width_dp: true,
            screen_height_dp: true,
            smallest_screen_width_dp: true,
        }
    }

    /// No attribute enabled; opt in per toggle.
    pub fn none() -> Self {
        Self {
            font_scale: false,
            hard_keyboard_hidden: false,
            keyboard: false,
            keyboard_hidden: false,
            locale: false,
            mcc: false,
            mnc: false,
            navigation: false,
            navigation_hidden: false,
            orientation: false,
            screen_layout: false,
            touchscreen: false,
            ui_mode: false,
            density_dpi: false,
            screen_width_dp: false,
            screen_height_dp: false,
            smallest_screen_width_dp: false,
        }
    }

    pub fn font_scale(mut self, enabled: bool) -> Self {
        self.font_scale = enabled;
        self
    }

    pub fn hard_keyboard_hidden(mut self, enabled: bool) -> Self {
        self.hard_keyboard_hidden = enabled;
        self
    }

    pub fn keyboard(mut self, enabled: bool) -> Self {
        self.keyboard = enabled;
        self
    }

    pub fn keyboard_hidden(mut self, enabled: bool) -> Self {
        self.keyboard_hidden = enabled;
        self
    }

    pub fn locale(mut self, enabled: bool) -> Self {
        self.locale = enabled;
        self
    }

    pub fn mcc(mut self, enabled: bool) -> Self {
        self.mcc = enabled;
        self
    }

    pub fn mnc(mut self, enabled: bool) -> Self {
        self.mnc = enabled;
        self
    }

    pub fn navigation(mut self, enabled: bool) -> Self {
        self.navigation = enabled;
        self
    }

    pub fn navigation_hidden(mut self, enabled: bool) -> Self {
        self.navigation_hidden = enabled;
        self
    }

    pub fn orientation(mut self, enabled: bool) -> Self {
        self.orientation = enabled;
        self
    }

    pub fn screen_layout(mut self, enabled: bool) -> Self {
        self.screen_layout = enabled;
        self
    }

    pub fn touchscreen(mut self, enabled: bool) -> Self {
        self.touchscreen = enabled;
        self
    }

    pub fn ui_mode(mut self, enabled: bool) -> Self {
        self.ui_mode = enabled;
        self
    }

    pub fn density_dpi(mut self, enabled: bool) -> Self {
        self.density_dpi = enabled;
        self
    }

    pub fn screen_width_dp(mut self, enabled: bool) -> Self {
        self.screen_width_dp = enabled;
        self
    }

    pub fn screen_height_dp(mut self, enabled: bool) -> Self {
        self.screen_height_dp = enabled;
        self
    }

    pub fn smallest_screen_width_dp(mut self, enabled: bool) -> Self {
        self.smallest_screen_width_dp = enabled;
        self
    }
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self::all()
    }
}

/// Base address of the resource endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    base: Url,
}

impl Endpoint {
    pub fn parse(input: &str) -> Result<Self, url::ParseError> {
        Ok(Self {
            base: Url::parse(input)?,
        })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Materialize the request URL for one load call.
    ///
    /// Each parameter name appears at most once; absence means the attribute
    /// was not requested by configuration (or is not reportable here).
    pub(crate) fn materialize(
        &self,
        snapshot: &DeviceSnapshot,
        options: &QueryOptions,
        capabilities: Capabilities,
    ) -> Url {
        let mut url = self.base.clone();
        {
            let mut query = url.query_pairs_mut();

            if options.font_scale {
                query.append_pair("fontScale", &snapshot.font_scale.to_string());
            }
            if options.hard_keyboard_hidden {
                query.append_pair(
                    "hardKeyboardHidden",
                    &snapshot.hard_keyboard_hidden.to_string(),
                );
            }
            if options.keyboard {
                query.append_pair("keyboard", &snapshot.keyboard.to_string());
            }
            if options.keyboard_hidden {
                query.append_pair("keyboardHidden", &snapshot.keyboard_hidden.to_string());
            }
            if options.locale {
                query.append_pair("locale", &snapshot.locale);
            }
            if options.mcc {
                query.append_pair("mcc", &snapshot.mcc.to_string());
            }
            if options.mnc {
                query.append_pair("mnc", &snapshot.mnc.to_string());
            }
            if options.navigation {
                query.append_pair("navigation", &snapshot.navigation.to_string());
            }
            if options.navigation_hidden {
                query.append_pair("navigationHidden", &snapshot.navigation_hidden.to_string());
            }
            if options.orientation {
                query.append_pair("orientation", &snapshot.orientation.to_string());
            }
            if options.screen_layout {
                query.append_pair("screenLayout", &snapshot.screen_layout.to_string());
            }
            if options.touchscreen {
                query.append_pair("touchscreen", &snapshot.touchscreen.to_string());
            }
            if options.ui_mode {
                query.append_pair("uiMode", &snapshot.ui_mode.to_string());
            }

            if options.density_dpi && capabilities.density_dpi {
                query.append_pair("densityDpi", &snapshot.density_dpi.to_string());
            }

            if capabilities.dp_metrics {
                if options.screen_width_dp {
                    query.append_pair("screenWidthDp", &snapshot.screen_width_dp.to_string());
                }
                if options.screen_height_dp {
                    query.append_pair("screenHeightDp", &snapshot.screen_height_dp.to_string());
                }
                if options.smallest_screen_width_dp {
                    query.append_pair(
                        "smallestScreenWidthDp",
                        &snapshot.smallest_screen_width_dp.to_string(),
                    );
                }
            }
        }
        // query_pairs_mut leaves a dangling `?` when nothing was appended.
        if url.query() == Some("") {
            url.set_query(None);
        }
        url
    }
}

impl From<Url> for Endpoint {
    fn from(base: Url) -> Self {
        Self { base }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> DeviceSnapshot {
        DeviceSnapshot {
            locale: "fr_FR".into(),
            density_dpi: 320,
            screen_width_dp: 411,
            screen_height_dp: 731,
            smallest_screen_width_dp: 411,
            ..DeviceSnapshot::default()
        }
    }

    fn params(url: &Url) -> Vec<(String, String)> {
        url.query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    #[test]
    fn disabled_toggles_are_omitted() {
        let endpoint = Endpoint::parse("https://example.test/config").unwrap();
        let options = QueryOptions::none().locale(true);
        let url = endpoint.materialize(&snapshot(), &options, Capabilities::ALL);

        assert_eq!(url.as_str(), "https://example.test/config?locale=fr_FR");
    }

    #[test]
    fn every_toggle_contributes_exactly_one_parameter() {
        let endpoint = Endpoint::parse("https://example.test/config").unwrap();
        let url = endpoint.materialize(&snapshot(), &QueryOptions::all(), Capabilities::ALL);

        let pairs = params(&url);
        assert_eq!(pairs.len(), 17);
        let mut names: Vec<&str> = pairs.iter().map(|(k, _)| k.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 17, "parameter names must be unique");
    }

    #[test]
    fn capability_gate_silently_omits_density_dpi() {
        let endpoint = Endpoint::parse("https://example.test/config").unwrap();
        let caps = Capabilities {
            density_dpi: false,
            dp_metrics: true,
        };
        let url = endpoint.materialize(&snapshot(), &QueryOptions::all(), caps);

        let pairs = params(&url);
        assert!(pairs.iter().all(|(k, _)| k != "densityDpi"));
        assert!(pairs.iter().any(|(k, _)| k == "screenWidthDp"));
    }

    #[test]
    fn capability_gate_silently_omits_dp_metrics() {
        let endpoint = Endpoint::parse("https://example.test/config").unwrap();
        let url = endpoint.materialize(&snapshot(), &QueryOptions::all(), Capabilities::NONE);

        let pairs = params(&url);
        for gated in [
            "densityDpi",
            "screenWidthDp",
            "screenHeightDp",
            "smallestScreenWidthDp",
        ] {
            assert!(pairs.iter().all(|(k, _)| k != gated), "{gated} must be absent");
        }
        assert_eq!(pairs.len(), 13);
    }

    #[test]
    fn no_toggles_yield_the_bare_endpoint() {
        let endpoint = Endpoint::parse("https://example.test/config").unwrap();
        let url = endpoint.materialize(&snapshot(), &QueryOptions::none(), Capabilities::ALL);
        assert_eq!(url.as_str(), "https://example.test/config");
    }

    #[test]
    fn base_query_parameters_survive_materialization() {
        let endpoint = Endpoint::parse("https://example.test/config?app=demo").unwrap();
        let options = QueryOptions::none().mcc(true);
        let mut snap = snapshot();
        snap.mcc = 208;
        let url = endpoint.materialize(&snap, &options, Capabilities::ALL);

        assert_eq!(url.as_str(), "https://example.test/config?app=demo&mcc=208");
    }
}

//! Device state collaborators.
//!
//! The orchestrator never inspects the platform directly; it asks a
//! [`DeviceStateProvider`] for an immutable [`DeviceSnapshot`] at the moment a
//! request is prepared, plus a [`Capabilities`] descriptor saying which
//! optional attributes the platform can report at all. Gating on an explicit
//! descriptor keeps the query assembly independent of any platform versioning
//! scheme.

/// Immutable read of the calling device's attributes at request time.
///
/// Attribute encodings are owned by the provider; the integer-coded fields are
/// forwarded to the endpoint verbatim, without interpretation.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceSnapshot {
    pub font_scale: f32,
    pub hard_keyboard_hidden: i32,
    pub keyboard: i32,
    pub keyboard_hidden: i32,
    /// Locale tag, e.g. `fr_FR`.
    pub locale: String,
    /// Mobile country code, 0 when unknown.
    pub mcc: u16,
    /// Mobile network code, 0 when unknown.
    pub mnc: u16,
    pub navigation: i32,
    pub navigation_hidden: i32,
    pub orientation: i32,
    pub screen_layout: i32,
    pub touchscreen: i32,
    pub ui_mode: i32,
    pub density_dpi: u32,
    pub screen_width_dp: u32,
    pub screen_height_dp: u32,
    pub smallest_screen_width_dp: u32,
}

impl Default for DeviceSnapshot {
    fn default() -> Self {
        Self {
            font_scale: 1.0,
            hard_keyboard_hidden: 0,
            keyboard: 0,
            keyboard_hidden: 0,
            locale: String::from("en_US"),
            mcc: 0,
            mnc: 0,
            navigation: 0,
            navigation_hidden: 0,
            orientation: 0,
            screen_layout: 0,
            touchscreen: 0,
            ui_mode: 0,
            density_dpi: 0,
            screen_width_dp: 0,
            screen_height_dp: 0,
            smallest_screen_width_dp: 0,
        }
    }
}

/// Which capability-gated attributes the platform can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// The platform reports a density DPI value.
    pub density_dpi: bool,
    /// The platform reports width/height/smallest-width in dp.
    pub dp_metrics: bool,
}

impl Capabilities {
    pub const ALL: Capabilities = Capabilities {
        density_dpi: true,
        dp_metrics: true,
    };

    pub const NONE: Capabilities = Capabilities {
        density_dpi: false,
        dp_metrics: false,
    };
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::ALL
    }
}

/// Source of device state, read fresh on every load call.
pub trait DeviceStateProvider: Send + Sync {
    fn snapshot(&self) -> DeviceSnapshot;
    fn capabilities(&self) -> Capabilities;
}

/// Provider returning a fixed snapshot.
///
/// Suits hosts whose attributes do not change at runtime, and tests.
#[derive(Debug, Clone)]
pub struct StaticProvider {
    snapshot: DeviceSnapshot,
    capabilities: Capabilities,
}

impl StaticProvider {
    pub fn new(snapshot: DeviceSnapshot, capabilities: Capabilities) -> Self {
        Self {
            snapshot,
            capabilities,
        }
    }
}

impl Default for StaticProvider {
    fn default() -> Self {
        Self::new(DeviceSnapshot::default(), Capabilities::ALL)
    }
}

impl DeviceStateProvider for StaticProvider {
    fn snapshot(&self) -> DeviceSnapshot {
        self.snapshot.clone()
    }

    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }
}

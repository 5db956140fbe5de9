//! User-facing emulator preferences.
//!
//! [`Settings`] is the flat record every setting screen reads and mutates.
//! All mutation from UI code goes through [`Settings::adjust`], which wraps
//! cyclic values and clamps numeric ones, and [`Settings::display`] renders the
//! current value for the option row or editor that shows it.

use serde::{Deserialize, Serialize};

/// Longest folder path accepted from the on-screen keyboard
pub const MAX_FOLDER_LEN: usize = 255;

/// Zoom range in fractional scale units
pub const ZOOM_RANGE: (f32, f32) = (0.50, 2.00);

/// Zoom change per arrow click
pub const ZOOM_STEP: f32 = 0.01;

/// Screen offset range in pixels
pub const SHIFT_RANGE: (i32, i32) = (-100, 100);

/// Number of emulated pad buttons that can be remapped
pub const MAPPABLE_BUTTONS: usize = 10;

/// Wrap `index + delta` into `0..len`.
///
/// Returns 0 for an empty list.
pub fn cycle_index(index: usize, delta: i32, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    (index as i64 + delta as i64).rem_euclid(len as i64) as usize
}

/// A setting whose values form a closed, ordered cycle.
pub trait Cyclic: Copy + PartialEq + 'static {
    /// Values reachable by cycling, in display order
    const CYCLE: &'static [Self];

    fn label(self) -> &'static str;

    /// Step through [`Self::CYCLE`], wrapping at both ends.
    ///
    /// A value outside the cycle (loaded from an older preferences file) is
    /// treated as sitting just before the first entry.
    fn cycled(self, delta: i32) -> Self {
        match Self::CYCLE.iter().position(|v| *v == self) {
            Some(idx) => Self::CYCLE[cycle_index(idx, delta, Self::CYCLE.len())],
            None if delta >= 0 => Self::CYCLE[cycle_index(0, delta - 1, Self::CYCLE.len())],
            None => Self::CYCLE[cycle_index(0, delta, Self::CYCLE.len())],
        }
    }
}

macro_rules! cyclic_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl Cyclic for $name {
            const CYCLE: &'static [Self] = &[$($name::$variant),+];

            fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }
    };
}

cyclic_enum!(
    /// What happens when the user leaves the front-end for good
    ExitAction {
        ReturnToLoader => "Return to Loader",
        Shutdown => "Shutdown",
    }
);

cyclic_enum!(
    RenderMode {
        Original => "Original",
        Filtered => "Filtered",
        Unfiltered => "Unfiltered",
    }
);

cyclic_enum!(
    VideoMode {
        Automatic => "Automatic (Recommended)",
        Ntsc => "NTSC (480i)",
        Progressive => "Progressive (480p)",
        Pal50 => "PAL (50Hz)",
        Pal60 => "PAL (60Hz)",
    }
);

cyclic_enum!(
    AutoLoad {
        Off => "Off",
        Sram => "SRAM",
        Snapshot => "Snapshot",
    }
);

cyclic_enum!(
    /// Policy applied the first time the game menu opens over a running game
    AutoSave {
        Off => "Off",
        Sram => "SRAM",
        Snapshot => "Snapshot",
        Both => "Both",
    }
);

cyclic_enum!(
    CpuMode {
        Interpreter => "Interpreter",
        Dynarec => "Dynarec",
    }
);

cyclic_enum!(
    GpuPlugin {
        Software => "Software",
        Hardware => "Hardware",
    }
);

cyclic_enum!(
    ControllerKind {
        Mouse => "Mouse",
        Pad1 => "Pad 1",
        Pad2 => "Pad 2",
        Pad3 => "Pad 3",
        Pad4 => "Pad 4",
    }
);

cyclic_enum!(
    /// Physical button on the host controller
    PadButton {
        A => "A",
        B => "B",
        X => "X",
        Y => "Y",
        Lb => "LB",
        Rb => "RB",
        Lt => "LT",
        Rt => "RT",
        Start => "Start",
        Back => "Back",
    }
);

/// Menu language.
///
/// The CJK languages can be loaded from a preferences file but are skipped
/// when cycling, since the menu font cannot render them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    Japanese,
    English,
    German,
    French,
    Spanish,
    Italian,
    Dutch,
    SimplifiedChinese,
    TraditionalChinese,
    Korean,
    Portuguese,
    BrazilianPortuguese,
    Catalan,
    Turkish,
}

impl Cyclic for Language {
    const CYCLE: &'static [Self] = &[
        Language::English,
        Language::German,
        Language::French,
        Language::Spanish,
        Language::Italian,
        Language::Dutch,
        Language::Portuguese,
        Language::BrazilianPortuguese,
        Language::Catalan,
        Language::Turkish,
    ];

    fn label(self) -> &'static str {
        match self {
            Language::Japanese => "Japanese",
            Language::English => "English",
            Language::German => "German",
            Language::French => "French",
            Language::Spanish => "Spanish",
            Language::Italian => "Italian",
            Language::Dutch => "Dutch",
            Language::SimplifiedChinese => "Chinese (Simplified)",
            Language::TraditionalChinese => "Chinese (Traditional)",
            Language::Korean => "Korean",
            Language::Portuguese => "Portuguese",
            Language::BrazilianPortuguese => "Brazilian Portuguese",
            Language::Catalan => "Catalan",
            Language::Turkish => "Turkish",
        }
    }
}

/// Emulated pad buttons in mapping-screen order
pub const EMULATED_BUTTONS: [&str; MAPPABLE_BUTTONS] = [
    "Cross", "Circle", "Square", "Triangle", "L1", "R1", "L2", "R2", "Start", "Select",
];

/// Signed adjustment produced by a click or an arrow button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Delta {
    pub dx: i32,
    pub dy: i32,
}

impl Delta {
    pub const NEXT: Delta = Delta { dx: 1, dy: 0 };

    pub fn x(dx: i32) -> Self {
        Self { dx, dy: 0 }
    }

    pub fn y(dy: i32) -> Self {
        Self { dx: 0, dy }
    }
}

/// Runtime bounds that come from collaborators rather than from the record
#[derive(Debug, Clone, Default)]
pub struct SettingLimits {
    /// Storage devices the save store can reach
    pub devices: Vec<String>,
    /// Video filters the renderer offers
    pub filters: Vec<String>,
}

/// Every editable field, addressed uniformly by option screens and editors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingField {
    Render,
    Widescreen,
    FilterMethod,
    ScreenZoom,
    ScreenPosition,
    Crosshair,
    VideoMode,
    SaveDevice,
    SaveFolder,
    CheatFolder,
    AutoLoad,
    AutoSave,
    Language,
    ExitAction,
    Cpu,
    Gpu,
    FrameLimit,
    HwFilter,
    SwFilter,
    Controller,
    Mapping(usize),
}

/// Emulator preferences, persisted as YAML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub render: RenderMode,
    pub widescreen: bool,
    pub filter_method: usize,
    pub zoom_horizontal: f32,
    pub zoom_vertical: f32,
    pub x_shift: i32,
    pub y_shift: i32,
    pub crosshair: bool,
    pub video_mode: VideoMode,

    pub save_device: usize,
    pub save_folder: String,
    pub cheat_folder: String,
    pub auto_load: AutoLoad,
    pub auto_save: AutoSave,

    pub language: Language,
    pub exit_action: ExitAction,
    pub cpu: CpuMode,
    pub gpu: GpuPlugin,
    pub frame_limit: bool,
    pub hw_filter: bool,
    pub sw_filter: bool,

    pub controller: ControllerKind,
    pub mappings: [PadButton; MAPPABLE_BUTTONS],
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            render: RenderMode::Filtered,
            widescreen: false,
            filter_method: 0,
            zoom_horizontal: 1.0,
            zoom_vertical: 1.0,
            x_shift: 0,
            y_shift: 0,
            crosshair: true,
            video_mode: VideoMode::Automatic,
            save_device: 0,
            save_folder: "emumenu/saves".to_string(),
            cheat_folder: "emumenu/cheats".to_string(),
            auto_load: AutoLoad::Sram,
            auto_save: AutoSave::Off,
            language: Language::English,
            exit_action: ExitAction::ReturnToLoader,
            cpu: CpuMode::Dynarec,
            gpu: GpuPlugin::Hardware,
            frame_limit: true,
            hw_filter: false,
            sw_filter: false,
            controller: ControllerKind::Pad1,
            mappings: [
                PadButton::A,
                PadButton::B,
                PadButton::X,
                PadButton::Y,
                PadButton::Lb,
                PadButton::Rb,
                PadButton::Lt,
                PadButton::Rt,
                PadButton::Start,
                PadButton::Back,
            ],
        }
    }
}

fn step_zoom(value: f32, steps: i32) -> f32 {
    let next = value + steps as f32 * ZOOM_STEP;
    ((next * 100.0).round() / 100.0).clamp(ZOOM_RANGE.0, ZOOM_RANGE.1)
}

fn on_off(value: bool, on: &str, off: &str) -> String {
    let text = if value { on } else { off };
    text.to_string()
}

impl Settings {
    /// Apply a signed delta to one field.
    ///
    /// Cyclic fields wrap, numeric ranges clamp, free-text fields are left
    /// alone (they are edited through the keyboard instead).
    pub fn adjust(&mut self, field: SettingField, delta: Delta, limits: &SettingLimits) {
        let d = delta.dx;
        match field {
            SettingField::Render => self.render = self.render.cycled(d),
            SettingField::Widescreen => {
                if d % 2 != 0 {
                    self.widescreen = !self.widescreen;
                }
            }
            SettingField::FilterMethod => {
                self.filter_method = cycle_index(self.filter_method, d, limits.filters.len().max(1));
            }
            SettingField::ScreenZoom => {
                self.zoom_horizontal = step_zoom(self.zoom_horizontal, delta.dx);
                self.zoom_vertical = step_zoom(self.zoom_vertical, delta.dy);
            }
            SettingField::ScreenPosition => {
                self.x_shift = self.x_shift.saturating_add(delta.dx).clamp(SHIFT_RANGE.0, SHIFT_RANGE.1);
                self.y_shift = self.y_shift.saturating_add(delta.dy).clamp(SHIFT_RANGE.0, SHIFT_RANGE.1);
            }
            SettingField::Crosshair => {
                if d % 2 != 0 {
                    self.crosshair = !self.crosshair;
                }
            }
            SettingField::VideoMode => self.video_mode = self.video_mode.cycled(d),
            SettingField::SaveDevice => {
                let count = limits.devices.len();
                let next = self.save_device as i64 + d as i64;
                // out of range in either direction goes back to the first device
                self.save_device = if next < 0 || next as usize >= count {
                    0
                } else {
                    next as usize
                };
            }
            SettingField::SaveFolder | SettingField::CheatFolder => {}
            SettingField::AutoLoad => self.auto_load = self.auto_load.cycled(d),
            SettingField::AutoSave => self.auto_save = self.auto_save.cycled(d),
            SettingField::Language => self.language = self.language.cycled(d),
            SettingField::ExitAction => self.exit_action = self.exit_action.cycled(d),
            SettingField::Cpu => self.cpu = self.cpu.cycled(d),
            SettingField::Gpu => self.gpu = self.gpu.cycled(d),
            SettingField::FrameLimit => {
                if d % 2 != 0 {
                    self.frame_limit = !self.frame_limit;
                }
            }
            SettingField::HwFilter => {
                if d % 2 != 0 {
                    self.hw_filter = !self.hw_filter;
                }
            }
            SettingField::SwFilter => {
                if d % 2 != 0 {
                    self.sw_filter = !self.sw_filter;
                }
            }
            SettingField::Controller => self.controller = self.controller.cycled(d),
            SettingField::Mapping(idx) => {
                if let Some(button) = self.mappings.get_mut(idx) {
                    *button = button.cycled(d);
                }
            }
        }
    }

    /// Text shown next to the field's label
    pub fn display(&self, field: SettingField, limits: &SettingLimits) -> String {
        match field {
            SettingField::Render => self.render.label().to_string(),
            SettingField::Widescreen => on_off(self.widescreen, "16:9 Correction", "Default"),
            SettingField::FilterMethod => limits
                .filters
                .get(self.filter_method)
                .cloned()
                .unwrap_or_else(|| format!("Filter {}", self.filter_method)),
            SettingField::ScreenZoom => format!(
                "{:.2}%, {:.2}%",
                self.zoom_horizontal * 100.0,
                self.zoom_vertical * 100.0
            ),
            SettingField::ScreenPosition => format!("{}, {}", self.x_shift, self.y_shift),
            SettingField::Crosshair => on_off(self.crosshair, "On", "Off"),
            SettingField::VideoMode => self.video_mode.label().to_string(),
            SettingField::SaveDevice => limits
                .devices
                .get(self.save_device)
                .cloned()
                .unwrap_or_else(|| "None".to_string()),
            SettingField::SaveFolder => self.save_folder.clone(),
            SettingField::CheatFolder => self.cheat_folder.clone(),
            SettingField::AutoLoad => self.auto_load.label().to_string(),
            SettingField::AutoSave => self.auto_save.label().to_string(),
            SettingField::Language => self.language.label().to_string(),
            SettingField::ExitAction => self.exit_action.label().to_string(),
            SettingField::Cpu => self.cpu.label().to_string(),
            SettingField::Gpu => self.gpu.label().to_string(),
            SettingField::FrameLimit => on_off(self.frame_limit, "Enabled", "Disabled"),
            SettingField::HwFilter => on_off(self.hw_filter, "2xSai", "Disabled"),
            SettingField::SwFilter => on_off(self.sw_filter, "Xbr", "Disabled"),
            SettingField::Controller => self.controller.label().to_string(),
            SettingField::Mapping(idx) => self
                .mappings
                .get(idx)
                .map(|b| b.label().to_string())
                .unwrap_or_default(),
        }
    }

    /// Mutable access to a free-text field, if `field` is one
    pub fn text_field_mut(&mut self, field: SettingField) -> Option<&mut String> {
        match field {
            SettingField::SaveFolder => Some(&mut self.save_folder),
            SettingField::CheatFolder => Some(&mut self.cheat_folder),
            _ => None,
        }
    }
}

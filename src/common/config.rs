use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};
use serde_with::{DurationMilliSeconds, serde_as};

pub const DEFAULT_CONFIG: &str = include_str!("../../notch-dock.default.toml");

const MAX_POLL_HZ: f64 = 240.0;

pub fn config_file() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config").join("notch-dock").join("config.toml"))
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub docking: DockingSettings,
    #[serde(default)]
    pub windows: WindowSettings,
    #[serde(default)]
    pub layout: LayoutSettings,
    #[serde(default)]
    pub notch: NotchSettings,
    #[serde(default)]
    pub hover: HoverSettings,
}

/// What happens to the terminal session when its window closes.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy, Default, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CloseMode {
    #[default]
    WindowOnly,
    TerminateAndClose,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "snake_case")]
pub enum HapticPattern {
    Generic,
    #[default]
    Alignment,
    LevelChange,
}

#[serde_as]
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default = "yes")]
    pub animate: bool,
    /// Reload this file when it changes on disk.
    #[serde(default = "yes")]
    pub hot_reload: bool,
    #[serde(default)]
    pub default_close_mode: CloseMode,
    /// Delay between a restore finishing and the terminal being asked to
    /// re-layout its contents.
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(default = "default_refresh_delay", rename = "refresh_delay_ms")]
    pub refresh_delay: Duration,
    #[serde(default)]
    pub animation: AnimationSettings,
}

#[serde_as]
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Copy)]
#[serde(deny_unknown_fields)]
pub struct AnimationSettings {
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(default = "default_dock_duration", rename = "minimize_ms")]
    pub minimize: Duration,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(default = "default_dock_duration", rename = "restore_ms")]
    pub restore: Duration,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(default = "default_preview_duration", rename = "preview_ms")]
    pub preview: Duration,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(default = "default_resize_duration", rename = "compact_ms")]
    pub compact: Duration,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(default = "default_resize_duration", rename = "maximize_ms")]
    pub maximize: Duration,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(default = "default_resize_duration", rename = "reorganize_ms")]
    pub reorganize: Duration,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Copy)]
#[serde(deny_unknown_fields)]
pub struct DockingSettings {
    /// Horizontal inflation applied to a notch target when testing proximity.
    #[serde(default = "default_sensitivity")]
    pub sensitivity: f64,
    /// Vertical inflation as a fraction of `sensitivity`.
    #[serde(default = "default_vertical_ratio")]
    pub vertical_ratio: f64,
    /// Scale applied to a window while it hovers a dock target.
    #[serde(default = "default_preview_scale")]
    pub preview_scale: f64,
    #[serde(default = "default_dock_square_size")]
    pub dock_square_size: f64,
    /// Minimum distance between a restored window and the notch.
    #[serde(default = "default_restore_gap")]
    pub restore_gap: f64,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Copy)]
#[serde(deny_unknown_fields)]
pub struct WindowSettings {
    #[serde(default = "default_window_width")]
    pub default_width: f64,
    #[serde(default = "default_window_height")]
    pub default_height: f64,
    #[serde(default = "default_compact_width")]
    pub compact_width: f64,
    #[serde(default = "default_compact_height")]
    pub compact_height: f64,
    /// Distance between the notch and a newly created window.
    #[serde(default = "default_top_offset")]
    pub top_offset: f64,
    /// Offset applied per existing window so new windows do not stack exactly.
    #[serde(default = "default_cascade_step")]
    pub cascade_step: f64,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Copy)]
#[serde(deny_unknown_fields)]
pub struct LayoutSettings {
    #[serde(default = "default_margin")]
    pub margin: f64,
    #[serde(default = "default_spacing")]
    pub spacing: f64,
    #[serde(default = "default_overflow_columns")]
    pub overflow_columns: usize,
    #[serde(default = "default_overflow_step")]
    pub overflow_step: f64,
    #[serde(default = "default_overflow_column_spacing")]
    pub overflow_column_spacing: f64,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Copy)]
#[serde(deny_unknown_fields)]
pub struct NotchSettings {
    /// Size of the drawn notch on displays without a camera housing.
    #[serde(default = "default_virtual_width")]
    pub virtual_width: f64,
    #[serde(default = "default_virtual_height")]
    pub virtual_height: f64,
    #[serde(default = "default_expanded_height")]
    pub expanded_height: f64,
    #[serde(default = "default_min_expanded_width")]
    pub min_expanded_width: f64,
    /// Horizontal padding added around the measured content width.
    #[serde(default = "default_expanded_padding")]
    pub expanded_padding: f64,
}

#[serde_as]
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Copy)]
#[serde(deny_unknown_fields)]
pub struct HoverSettings {
    #[serde(default = "yes")]
    pub auto_expand_on_hover: bool,
    #[serde(default = "no")]
    pub prevent_close_on_leave: bool,
    #[serde(default = "yes")]
    pub typing_lock_enabled: bool,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(default = "default_typing_lock", rename = "typing_lock_ms")]
    pub typing_lock: Duration,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(default = "default_collapse_delay", rename = "collapse_delay_ms")]
    pub collapse_delay: Duration,
    /// Used instead of `collapse_delay` once a preview has been shown this
    /// session.
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(default = "default_previewed_collapse_delay", rename = "previewed_collapse_delay_ms")]
    pub previewed_collapse_delay: Duration,
    #[serde(default = "default_poll_hz")]
    pub poll_hz: f64,
    /// Cursor movement below this distance skips re-evaluation.
    #[serde(default = "default_move_threshold")]
    pub move_threshold: f64,
    #[serde(default = "default_collapsed_inflate")]
    pub collapsed_inflate: f64,
    #[serde(default = "default_expanded_inflate")]
    pub expanded_inflate: f64,
    /// Beyond this distance from the activation rect a latched item hover is
    /// cleared.
    #[serde(default = "default_far_away_distance")]
    pub far_away_distance: f64,
    #[serde(default = "yes")]
    pub haptics: bool,
    #[serde(default)]
    pub haptic_pattern: HapticPattern,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            animate: true,
            hot_reload: true,
            default_close_mode: CloseMode::default(),
            refresh_delay: default_refresh_delay(),
            animation: AnimationSettings::default(),
        }
    }
}

impl Default for AnimationSettings {
    fn default() -> Self {
        AnimationSettings {
            minimize: default_dock_duration(),
            restore: default_dock_duration(),
            preview: default_preview_duration(),
            compact: default_resize_duration(),
            maximize: default_resize_duration(),
            reorganize: default_resize_duration(),
        }
    }
}

impl Default for DockingSettings {
    fn default() -> Self {
        DockingSettings {
            sensitivity: default_sensitivity(),
            vertical_ratio: default_vertical_ratio(),
            preview_scale: default_preview_scale(),
            dock_square_size: default_dock_square_size(),
            restore_gap: default_restore_gap(),
        }
    }
}

impl Default for WindowSettings {
    fn default() -> Self {
        WindowSettings {
            default_width: default_window_width(),
            default_height: default_window_height(),
            compact_width: default_compact_width(),
            compact_height: default_compact_height(),
            top_offset: default_top_offset(),
            cascade_step: default_cascade_step(),
        }
    }
}

impl Default for LayoutSettings {
    fn default() -> Self {
        LayoutSettings {
            margin: default_margin(),
            spacing: default_spacing(),
            overflow_columns: default_overflow_columns(),
            overflow_step: default_overflow_step(),
            overflow_column_spacing: default_overflow_column_spacing(),
        }
    }
}

impl Default for NotchSettings {
    fn default() -> Self {
        NotchSettings {
            virtual_width: default_virtual_width(),
            virtual_height: default_virtual_height(),
            expanded_height: default_expanded_height(),
            min_expanded_width: default_min_expanded_width(),
            expanded_padding: default_expanded_padding(),
        }
    }
}

impl Default for HoverSettings {
    fn default() -> Self {
        HoverSettings {
            auto_expand_on_hover: true,
            prevent_close_on_leave: false,
            typing_lock_enabled: true,
            typing_lock: default_typing_lock(),
            collapse_delay: default_collapse_delay(),
            previewed_collapse_delay: default_previewed_collapse_delay(),
            poll_hz: default_poll_hz(),
            move_threshold: default_move_threshold(),
            collapsed_inflate: default_collapsed_inflate(),
            expanded_inflate: default_expanded_inflate(),
            far_away_distance: default_far_away_distance(),
            haptics: true,
            haptic_pattern: HapticPattern::default(),
        }
    }
}

impl DockingSettings {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if self.sensitivity <= 0.0 {
            issues.push(format!("docking.sensitivity must be positive, got {}", self.sensitivity));
        }
        if !(self.vertical_ratio > 0.0 && self.vertical_ratio <= 2.0) {
            issues.push(format!(
                "docking.vertical_ratio must be in (0, 2], got {}",
                self.vertical_ratio
            ));
        }
        if !(self.preview_scale > 0.0 && self.preview_scale <= 1.0) {
            issues.push(format!(
                "docking.preview_scale must be in (0, 1], got {}",
                self.preview_scale
            ));
        }
        if self.dock_square_size <= 0.0 {
            issues.push(format!(
                "docking.dock_square_size must be positive, got {}",
                self.dock_square_size
            ));
        }
        if self.restore_gap < 0.0 {
            issues.push(format!(
                "docking.restore_gap must be non-negative, got {}",
                self.restore_gap
            ));
        }
        issues
    }
}

impl WindowSettings {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        for (name, value) in [
            ("default_width", self.default_width),
            ("default_height", self.default_height),
            ("compact_width", self.compact_width),
            ("compact_height", self.compact_height),
        ] {
            if value <= 0.0 {
                issues.push(format!("windows.{name} must be positive, got {value}"));
            }
        }
        if self.compact_width > self.default_width || self.compact_height > self.default_height {
            issues.push("windows compact size should not exceed the default size".to_string());
        }
        issues
    }
}

impl LayoutSettings {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if self.margin < 0.0 || self.spacing < 0.0 {
            issues.push(format!(
                "layout.margin and layout.spacing must be non-negative, got {} and {}",
                self.margin, self.spacing
            ));
        }
        if self.overflow_columns == 0 {
            issues.push("layout.overflow_columns must be at least 1".to_string());
        }
        if self.overflow_step < 0.0 || self.overflow_column_spacing < 0.0 {
            issues.push("layout overflow offsets must be non-negative".to_string());
        }
        issues
    }
}

impl NotchSettings {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if self.virtual_width <= 0.0 || self.virtual_height <= 0.0 {
            issues.push("notch virtual size must be positive".to_string());
        }
        if self.min_expanded_width < self.virtual_width {
            issues.push(format!(
                "notch.min_expanded_width ({}) is narrower than the notch itself ({})",
                self.min_expanded_width, self.virtual_width
            ));
        }
        issues
    }
}

impl HoverSettings {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if !(self.poll_hz > 0.0 && self.poll_hz <= MAX_POLL_HZ) {
            issues.push(format!(
                "hover.poll_hz must be in (0, {MAX_POLL_HZ}], got {}",
                self.poll_hz
            ));
        }
        if self.move_threshold < 0.0 {
            issues.push(format!(
                "hover.move_threshold must be non-negative, got {}",
                self.move_threshold
            ));
        }
        if self.far_away_distance <= self.expanded_inflate {
            issues.push(format!(
                "hover.far_away_distance ({}) should be larger than hover.expanded_inflate ({})",
                self.far_away_distance, self.expanded_inflate
            ));
        }
        if self.previewed_collapse_delay < self.collapse_delay {
            issues.push(
                "hover.previewed_collapse_delay_ms is shorter than hover.collapse_delay_ms"
                    .to_string(),
            );
        }
        issues
    }

    /// The poller period. Out-of-range rates are clamped and non-finite ones
    /// fall back to the default.
    pub fn poll_interval(&self) -> Duration {
        let hz = if self.poll_hz.is_finite() { self.poll_hz } else { default_poll_hz() };
        Duration::from_secs_f64(1.0 / hz.clamp(1.0, MAX_POLL_HZ))
    }
}

fn yes() -> bool { true }
fn no() -> bool { false }

fn default_refresh_delay() -> Duration { Duration::from_millis(50) }
fn default_dock_duration() -> Duration { Duration::from_millis(320) }
fn default_preview_duration() -> Duration { Duration::from_millis(150) }
fn default_resize_duration() -> Duration { Duration::from_millis(220) }

fn default_sensitivity() -> f64 { 80.0 }
fn default_vertical_ratio() -> f64 { 0.75 }
fn default_preview_scale() -> f64 { 0.74 }
fn default_dock_square_size() -> f64 { 28.0 }
fn default_restore_gap() -> f64 { 16.0 }

fn default_window_width() -> f64 { 640.0 }
fn default_window_height() -> f64 { 400.0 }
fn default_compact_width() -> f64 { 320.0 }
fn default_compact_height() -> f64 { 180.0 }
fn default_top_offset() -> f64 { 24.0 }
fn default_cascade_step() -> f64 { 24.0 }

fn default_margin() -> f64 { 16.0 }
fn default_spacing() -> f64 { 12.0 }
fn default_overflow_columns() -> usize { 3 }
fn default_overflow_step() -> f64 { 24.0 }
fn default_overflow_column_spacing() -> f64 { 160.0 }

fn default_virtual_width() -> f64 { 200.0 }
fn default_virtual_height() -> f64 { 32.0 }
fn default_expanded_height() -> f64 { 180.0 }
fn default_min_expanded_width() -> f64 { 360.0 }
fn default_expanded_padding() -> f64 { 24.0 }

fn default_typing_lock() -> Duration { Duration::from_millis(1500) }
fn default_collapse_delay() -> Duration { Duration::from_millis(150) }
fn default_previewed_collapse_delay() -> Duration { Duration::from_millis(600) }
fn default_poll_hz() -> f64 { 60.0 }
fn default_move_threshold() -> f64 { 0.5 }
fn default_collapsed_inflate() -> f64 { 10.0 }
fn default_expanded_inflate() -> f64 { 40.0 }
fn default_far_away_distance() -> f64 { 180.0 }

impl Config {
    pub fn read(path: &Path) -> anyhow::Result<Config> {
        let buf = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::parse(&buf)
    }

    /// Validates the entire configuration and returns a list of issues found.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        issues.extend(self.docking.validate());
        issues.extend(self.windows.validate());
        issues.extend(self.layout.validate());
        issues.extend(self.notch.validate());
        issues.extend(self.hover.validate());
        issues
    }

    pub fn parse(buf: &str) -> anyhow::Result<Config> {
        match toml::from_str::<Config>(buf) {
            Ok(config) => Ok(config),
            Err(e) => {
                let msg = e.to_string();
                match Self::extract_unknown_variant(&msg)
                    .and_then(|(unknown, candidates)| Self::suggest(&unknown, &candidates))
                {
                    Some(suggestion) => bail!("{msg}\nDid you mean `{suggestion}`?"),
                    None => bail!("{msg}"),
                }
            }
        }
    }

    /// no need to pull in a dep for just this
    fn levenshtein(a: &str, b: &str) -> usize {
        let a_chars: Vec<char> = a.chars().collect();
        let b_chars: Vec<char> = b.chars().collect();
        let mut d = vec![vec![0usize; b_chars.len() + 1]; a_chars.len() + 1];
        for (i, row) in d.iter_mut().enumerate() {
            row[0] = i;
        }
        for j in 0..=b_chars.len() {
            d[0][j] = j;
        }
        for i in 1..=a_chars.len() {
            for j in 1..=b_chars.len() {
                let cost = if a_chars[i - 1] == b_chars[j - 1] { 0 } else { 1 };
                d[i][j] = std::cmp::min(
                    std::cmp::min(d[i - 1][j] + 1, d[i][j - 1] + 1),
                    d[i - 1][j - 1] + cost,
                );
            }
        }
        d[a_chars.len()][b_chars.len()]
    }

    // Pulls the unknown token and the backtick-quoted expected variants out of
    // a serde "unknown variant" error.
    fn extract_unknown_variant(err: &str) -> Option<(String, Vec<String>)> {
        let needle = "unknown variant `";
        let start = err.find(needle)?;
        let rest = &err[start + needle.len()..];
        let end = rest.find('`')?;
        let unknown = rest[..end].to_string();

        let mut candidates = Vec::new();
        let mut tail = &rest[end + 1..];
        while let Some(open) = tail.find('`') {
            let after = &tail[open + 1..];
            let Some(close) = after.find('`') else { break };
            let token = &after[..close];
            if token != unknown && !candidates.iter().any(|c| c == token) {
                candidates.push(token.to_string());
            }
            tail = &after[close + 1..];
        }
        Some((unknown, candidates))
    }

    fn suggest(unknown: &str, candidates: &[String]) -> Option<String> {
        let threshold = (unknown.len() / 2).max(2);
        candidates
            .iter()
            .map(|c| (Self::levenshtein(unknown, c), c))
            .filter(|(d, _)| *d <= threshold)
            .min_by_key(|(d, _)| *d)
            .map(|(_, c)| c.clone())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn bundled_default_matches_builtin_defaults() {
        let parsed = Config::parse(DEFAULT_CONFIG).unwrap();
        assert_eq!(parsed, Config::default());
        assert!(parsed.validate().is_empty(), "{:?}", parsed.validate());
    }

    #[test]
    fn empty_config_uses_defaults() {
        assert_eq!(Config::parse("").unwrap(), Config::default());
    }

    #[test]
    fn parses_millisecond_durations_and_modes() {
        let config = Config::parse(
            r#"
            [settings]
            default_close_mode = "terminate_and_close"
            [settings.animation]
            minimize_ms = 100
            [hover]
            collapse_delay_ms = 80
            previewed_collapse_delay_ms = 900
            haptic_pattern = "level_change"
            "#,
        )
        .unwrap();
        assert_eq!(config.settings.default_close_mode, CloseMode::TerminateAndClose);
        assert_eq!(config.settings.animation.minimize, Duration::from_millis(100));
        assert_eq!(config.settings.animation.restore, default_dock_duration());
        assert_eq!(config.hover.collapse_delay, Duration::from_millis(80));
        assert_eq!(config.hover.previewed_collapse_delay, Duration::from_millis(900));
        assert_eq!(config.hover.haptic_pattern, HapticPattern::LevelChange);
    }

    #[test]
    fn rejects_unknown_fields() {
        assert!(Config::parse("[docking]\nsensitivty = 10.0\n").is_err());
    }

    #[test]
    fn suggests_close_mode_spelling() {
        let err = Config::parse("[settings]\ndefault_close_mode = \"window_onyl\"\n")
            .unwrap_err()
            .to_string();
        assert!(err.contains("Did you mean `window_only`?"), "{err}");
    }

    #[test]
    fn extracts_unknown_variant_candidates() {
        let err = "unknown variant `alignmnt`, expected one of `generic`, `alignment`, `level_change`";
        let (unknown, candidates) = Config::extract_unknown_variant(err).unwrap();
        assert_eq!(unknown, "alignmnt");
        assert_eq!(candidates, vec!["generic", "alignment", "level_change"]);
        assert_eq!(Config::suggest(&unknown, &candidates).as_deref(), Some("alignment"));
    }

    #[test]
    fn validation_reports_bad_values() {
        let mut config = Config::default();
        config.docking.preview_scale = 1.5;
        config.layout.overflow_columns = 0;
        config.hover.poll_hz = 0.0;
        config.hover.far_away_distance = 10.0;
        let issues = config.validate();
        assert_eq!(issues.len(), 4, "{issues:?}");
    }

    #[test]
    fn poll_interval_follows_rate() {
        let hover = HoverSettings::default();
        assert_eq!(hover.poll_interval(), Duration::from_secs_f64(1.0 / 60.0));
    }

    #[test]
    fn non_finite_poll_rate_uses_the_default() {
        let config = Config::parse("[hover]\npoll_hz = nan\n").unwrap();
        assert!(!config.validate().is_empty());
        assert_eq!(config.hover.poll_interval(), Duration::from_secs_f64(1.0 / 60.0));

        let hover = HoverSettings { poll_hz: f64::INFINITY, ..HoverSettings::default() };
        assert_eq!(hover.poll_interval(), Duration::from_secs_f64(1.0 / 60.0));
    }
}

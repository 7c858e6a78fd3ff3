//! Label text and color for every widget row
//!
//! Builds a [`RenderModel`] from one snapshot. Renderers only lay the rows
//! out; all thresholds and wording live here.

use crate::window::WindowMode;
use deskmon_types::{Color, HardwareReadings};

pub const GOOD: Color = Color::from_hex(0x4ade80);
pub const WARN: Color = Color::from_hex(0xfacc15);
pub const HOT: Color = Color::from_hex(0xf87171);
pub const UNKNOWN: Color = Color::from_hex(0x888888);
pub const MUTED: Color = Color::from_hex(0x555577);

pub const CPU_ACCENT: Color = Color::from_hex(0x6ea8fe);
pub const GPU_ACCENT: Color = Color::from_hex(0xc084fc);
pub const RAM_ACCENT: Color = Color::from_hex(0x67e8f9);
pub const DISK_ACCENT: Color = Color::from_hex(0xfdba74);

fn tiered(value: Option<i32>, warn_from: i32, hot_from: i32) -> Color {
    match value {
        None => UNKNOWN,
        Some(v) if v < warn_from => GOOD,
        Some(v) if v < hot_from => WARN,
        Some(_) => HOT,
    }
}

pub fn temp_color(temp: Option<i32>) -> Color {
    tiered(temp, 55, 75)
}

pub fn load_color(load: Option<i32>) -> Color {
    tiered(load, 50, 80)
}

pub fn disk_usage_color(pct: Option<i32>) -> Color {
    tiered(pct, 70, 85)
}

/// One colored value cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueText {
    pub text: String,
    pub color: Color,
}

impl ValueText {
    pub fn new(text: impl Into<String>, color: Color) -> Self {
        Self {
            text: text.into(),
            color,
        }
    }

    fn placeholder() -> Self {
        Self::new("--", UNKNOWN)
    }

    fn blank() -> Self {
        Self::new("", UNKNOWN)
    }
}

fn temp_text(temp: Option<i32>) -> ValueText {
    match temp {
        Some(t) => ValueText::new(format!("{}°C", t), temp_color(temp)),
        None => ValueText::placeholder(),
    }
}

fn percent_text(pct: Option<i32>, color: fn(Option<i32>) -> Color, missing: ValueText) -> ValueText {
    match pct {
        Some(p) => ValueText::new(format!("{}%", p), color(pct)),
        None => missing,
    }
}

/// Fan duty estimated from RPM against a calibrated maximum
pub fn estimate_fan_percent(rpm: i32, ceiling_rpm: u32) -> i32 {
    if ceiling_rpm == 0 {
        return 100;
    }
    let pct = (rpm.max(0) as f64 / ceiling_rpm as f64 * 100.0).round();
    pct.min(100.0) as i32
}

/// Duty percent when known, else an `~`-marked estimate from RPM
pub fn fan_text(pct: Option<i32>, rpm: Option<i32>, ceiling_rpm: u32) -> ValueText {
    match (pct, rpm) {
        (Some(0), _) => ValueText::new("OFF", GOOD),
        (Some(p), _) => ValueText::new(format!("{}%", p), load_color(Some(p))),
        (None, Some(0)) => ValueText::new("OFF", GOOD),
        (None, Some(r)) => {
            let est = estimate_fan_percent(r, ceiling_rpm);
            ValueText::new(format!("~{}%", est), load_color(Some(est)))
        }
        (None, None) => ValueText::placeholder(),
    }
}

/// Maximum fan speeds used for RPM-based estimates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FanCeilings {
    pub cpu_rpm: u32,
    pub gpu_rpm: u32,
}

/// Labelled row of value cells, left to right
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub label: String,
    pub accent: Color,
    pub values: Vec<ValueText>,
}

impl Row {
    fn new(label: impl Into<String>, accent: Color, values: Vec<ValueText>) -> Self {
        Self {
            label: label.into(),
            accent,
            values,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderModel {
    pub rows: Vec<Row>,
}

impl RenderModel {
    pub fn from_readings(data: &HardwareReadings, ceilings: FanCeilings) -> Self {
        let mut rows = vec![
            Row::new(
                "CPU",
                CPU_ACCENT,
                vec![
                    percent_text(data.cpu_load, load_color, ValueText::blank()),
                    temp_text(data.cpu_temp),
                ],
            ),
            Row::new(
                "C.FAN",
                CPU_ACCENT,
                vec![fan_text(data.cpu_fan_pct, data.cpu_fan_rpm, ceilings.cpu_rpm)],
            ),
            Row::new(
                "GPU",
                GPU_ACCENT,
                vec![
                    percent_text(data.gpu_load, load_color, ValueText::blank()),
                    temp_text(data.gpu_temp),
                ],
            ),
            Row::new(
                "VRAM",
                GPU_ACCENT,
                vec![percent_text(data.gpu_vram_pct, load_color, ValueText::placeholder())],
            ),
            Row::new(
                "G.FAN",
                GPU_ACCENT,
                vec![fan_text(data.gpu_fan_pct, data.gpu_fan_rpm, ceilings.gpu_rpm)],
            ),
            Row::new(
                "RAM",
                RAM_ACCENT,
                vec![percent_text(data.ram_pct, load_color, ValueText::placeholder())],
            ),
        ];

        for disk in &data.disks {
            rows.push(Row::new(
                disk.name.as_str(),
                DISK_ACCENT,
                vec![
                    temp_text(disk.temp),
                    percent_text(disk.used_pct, disk_usage_color, ValueText::blank()),
                ],
            ));
        }

        Self { rows }
    }

    pub fn row(&self, label: &str) -> Option<&Row> {
        self.rows.iter().find(|r| r.label == label)
    }
}

/// Bottom status line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub text: String,
    pub color: Color,
}

impl StatusLine {
    pub fn starting() -> Self {
        Self {
            text: "Starting...".to_string(),
            color: MUTED,
        }
    }

    /// Placement status: where the widget currently lives
    pub fn for_mode(mode: WindowMode, embedded: bool) -> Self {
        let (text, color) = match mode {
            WindowMode::Embedded if embedded => ("Desktop", GOOD),
            WindowMode::Peeking => ("Peeking", CPU_ACCENT),
            _ => ("Floating", WARN),
        };
        Self {
            text: text.to_string(),
            color,
        }
    }

    pub fn error(message: &str) -> Self {
        Self {
            text: format!("Error: {}", message),
            color: HOT,
        }
    }

    pub fn alert(hits: &[String]) -> Self {
        Self {
            text: format!("⚠ {}", hits.join(", ")),
            color: HOT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deskmon_types::DiskReading;

    const CEILINGS: FanCeilings = FanCeilings {
        cpu_rpm: 1800,
        gpu_rpm: 2200,
    };

    #[test]
    fn test_color_thresholds() {
        assert_eq!(temp_color(None), UNKNOWN);
        assert_eq!(temp_color(Some(54)), GOOD);
        assert_eq!(temp_color(Some(55)), WARN);
        assert_eq!(temp_color(Some(75)), HOT);
        assert_eq!(load_color(Some(49)), GOOD);
        assert_eq!(load_color(Some(80)), HOT);
        assert_eq!(disk_usage_color(Some(84)), WARN);
        assert_eq!(disk_usage_color(Some(85)), HOT);
    }

    #[test]
    fn test_fan_text_prefers_control_percent() {
        assert_eq!(fan_text(Some(42), Some(900), 1800), ValueText::new("42%", GOOD));
        assert_eq!(fan_text(Some(0), Some(900), 1800), ValueText::new("OFF", GOOD));
    }

    #[test]
    fn test_fan_text_estimates_from_rpm() {
        assert_eq!(fan_text(None, Some(900), 1800).text, "~50%");
        assert_eq!(fan_text(None, Some(4000), 1800).text, "~100%");
        assert_eq!(fan_text(None, Some(0), 1800).text, "OFF");
        assert_eq!(fan_text(None, None, 1800), ValueText::new("--", UNKNOWN));
    }

    #[test]
    fn test_estimate_rounds_and_caps() {
        assert_eq!(estimate_fan_percent(1100, 2200), 50);
        assert_eq!(estimate_fan_percent(1122, 2200), 51);
        assert_eq!(estimate_fan_percent(2500, 2200), 100);
    }

    #[test]
    fn test_render_model_rows() {
        let data = HardwareReadings {
            cpu_temp: Some(61),
            cpu_load: Some(12),
            gpu_fan_rpm: Some(1100),
            ram_pct: Some(83),
            disks: vec![DiskReading {
                name: "990 PRO".to_string(),
                temp: Some(41),
                used_pct: Some(90),
            }],
            ..Default::default()
        };
        let model = RenderModel::from_readings(&data, CEILINGS);

        let cpu = model.row("CPU").unwrap();
        assert_eq!(cpu.values[0], ValueText::new("12%", GOOD));
        assert_eq!(cpu.values[1], ValueText::new("61°C", WARN));

        let gpu = model.row("GPU").unwrap();
        assert_eq!(gpu.values[0].text, "");
        assert_eq!(gpu.values[1].text, "--");

        assert_eq!(model.row("G.FAN").unwrap().values[0].text, "~50%");
        assert_eq!(model.row("VRAM").unwrap().values[0].text, "--");
        assert_eq!(model.row("RAM").unwrap().values[0].color, HOT);

        let disk = model.row("990 PRO").unwrap();
        assert_eq!(disk.accent, DISK_ACCENT);
        assert_eq!(disk.values[1], ValueText::new("90%", HOT));
        assert_eq!(model.rows.len(), 7);
    }

    #[test]
    fn test_status_lines() {
        assert_eq!(StatusLine::for_mode(WindowMode::Embedded, true).text, "Desktop");
        assert_eq!(StatusLine::for_mode(WindowMode::Embedded, false).text, "Floating");
        assert_eq!(StatusLine::for_mode(WindowMode::Floating, false).text, "Floating");
        assert_eq!(StatusLine::for_mode(WindowMode::Peeking, false).text, "Peeking");
        assert_eq!(StatusLine::error("timeout").text, "Error: timeout");
        let hits = vec!["CPU 91°C".to_string(), "RAM 97%".to_string()];
        assert_eq!(StatusLine::alert(&hits).text, "⚠ CPU 91°C, RAM 97%");
    }
}

use std::io::{self, Write};

use airmon_core::{AirQuality, Renderer, Snapshot};
use airmon_ui::{JsonLines, PANEL_TITLE, TextPanel, panel_lines};
use rstest::rstest;

fn snap(air_raw: u16) -> Snapshot {
    Snapshot {
        temperature_c: 23.44,
        humidity_pct: 45.0,
        air_raw,
        air_quality: AirQuality::classify(air_raw),
        dust_ug_m3: 12.34,
    }
}

#[test]
fn panel_layout_matches_oled() {
    let lines = panel_lines(&snap(150));
    assert_eq!(
        lines,
        [
            PANEL_TITLE.to_string(),
            "-".repeat(21),
            "Temp: 23.4 C".to_string(),
            "Hum:  45.0 %".to_string(),
            "Dust: 12.3 ug/m3".to_string(),
            "Air:  150".to_string(),
            "Good".to_string(),
        ]
    );
}

#[rstest]
#[case(450, "Very Poor")]
#[case(700, "Hazardous")]
fn panel_last_line_is_label(#[case] raw: u16, #[case] label: &str) {
    assert_eq!(panel_lines(&snap(raw))[6], label);
}

#[test]
fn text_panel_writes_frames() {
    let mut panel = TextPanel::new(Vec::new());
    panel.init().unwrap();
    panel.notice("WiFi Connected!").unwrap();
    panel.render(&snap(150)).unwrap();
    assert_eq!(panel.frames(), 1);

    let out = String::from_utf8(panel.into_inner()).unwrap();
    assert!(out.starts_with("Air Quality Monitor\nInitializing...\n\nWiFi Connected!\n\n"));
    assert!(out.contains("Temp: 23.4 C\n"));
    assert!(out.ends_with("Good\n\n"));
}

#[test]
fn json_lines_one_object_per_frame() {
    let mut r = JsonLines::new(Vec::new());
    r.init().unwrap();
    r.notice("WiFi Failed!").unwrap();
    r.render(&snap(450)).unwrap();

    let out = String::from_utf8(r.into_inner()).unwrap();
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 2);

    let notice: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(notice["kind"], "notice");
    assert_eq!(notice["message"], "WiFi Failed!");

    let reading: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
    assert_eq!(reading["kind"], "reading");
    assert_eq!(reading["air_raw"], 450);
    assert_eq!(reading["air_quality"], "VeryPoor");
    assert_eq!(reading["label"], "Very Poor");
}

struct Broken;

impl Write for Broken {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "no display"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "no display"))
    }
}

#[test]
fn broken_output_fails_init() {
    assert!(TextPanel::new(Broken).init().is_err());
    assert!(JsonLines::new(Broken).init().is_err());
}

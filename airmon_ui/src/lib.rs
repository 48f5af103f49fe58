#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Render collaborators for the monitor loop.
//!
//! `TextPanel` mirrors the 128×64 OLED: 21 columns, a title, a rule, and one
//! line per reading. `JsonLines` emits one JSON object per frame for
//! machine consumption.

use std::io::Write;

use airmon_core::{RenderError, Renderer, Snapshot};
use serde::Serialize;

/// Character columns of a 128 px wide panel with a 6 px font.
pub const PANEL_COLUMNS: usize = 21;
pub const PANEL_TITLE: &str = "Air Quality Monitor";

/// The seven lines shown for one snapshot.
pub fn panel_lines(s: &Snapshot) -> [String; 7] {
    [
        PANEL_TITLE.to_string(),
        "-".repeat(PANEL_COLUMNS),
        format!("Temp: {:.1} C", s.temperature_c),
        format!("Hum:  {:.1} %", s.humidity_pct),
        format!("Dust: {:.1} ug/m3", s.dust_ug_m3),
        format!("Air:  {}", s.air_raw),
        s.air_quality.label().to_string(),
    ]
}

fn clip(line: &str) -> &str {
    match line.char_indices().nth(PANEL_COLUMNS) {
        Some((i, _)) => &line[..i],
        None => line,
    }
}

/// Text rendition of the OLED panel.
pub struct TextPanel<W: Write> {
    out: W,
    frames: u64,
}

impl<W: Write> TextPanel<W> {
    pub fn new(out: W) -> Self {
        Self { out, frames: 0 }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn frame(&mut self, lines: &[&str]) -> Result<(), RenderError> {
        for l in lines {
            writeln!(self.out, "{}", clip(l))?;
        }
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(())
    }
}

impl<W: Write> Renderer for TextPanel<W> {
    fn init(&mut self) -> Result<(), RenderError> {
        self.frame(&[PANEL_TITLE, "Initializing..."])
    }

    fn render(&mut self, snapshot: &Snapshot) -> Result<(), RenderError> {
        let lines = panel_lines(snapshot);
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        self.frame(&refs)?;
        self.frames += 1;
        Ok(())
    }

    fn notice(&mut self, message: &str) -> Result<(), RenderError> {
        self.frame(&[message])
    }
}

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Record<'a> {
    Reading {
        #[serde(flatten)]
        snapshot: &'a Snapshot,
        label: &'static str,
    },
    Notice {
        message: &'a str,
    },
}

/// One JSON object per line.
pub struct JsonLines<W: Write> {
    out: W,
}

impl<W: Write> JsonLines<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, rec: &Record<'_>) -> Result<(), RenderError> {
        serde_json::to_writer(&mut self.out, rec)?;
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(())
    }
}

impl<W: Write> Renderer for JsonLines<W> {
    fn init(&mut self) -> Result<(), RenderError> {
        self.out.flush()?;
        Ok(())
    }

    fn render(&mut self, snapshot: &Snapshot) -> Result<(), RenderError> {
        self.emit(&Record::Reading {
            snapshot,
            label: snapshot.air_quality.label(),
        })
    }

    fn notice(&mut self, message: &str) -> Result<(), RenderError> {
        self.emit(&Record::Notice { message })
    }
}

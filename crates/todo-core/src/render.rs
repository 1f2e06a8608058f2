use std::io::{self, IsTerminal, Write};

use anyhow::anyhow;
use todo_shared::TaskItem;
use unicode_width::UnicodeWidthStr;

use crate::config::Config;

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(cfg: &Config) -> anyhow::Result<Self> {
        let color_cfg = cfg.get("color").unwrap_or_else(|| "on".to_string());
        let color = match color_cfg.to_ascii_lowercase().as_str() {
            "on" | "yes" | "true" | "1" => true,
            "off" | "no" | "false" | "0" => false,
            other => return Err(anyhow!("invalid color setting: {other}")),
        };

        Ok(Self { color })
    }

    /// Numbered table, top of the list first. Numbers are the positions
    /// other commands take.
    #[tracing::instrument(skip(self, items))]
    pub fn print_task_table(&mut self, items: &[TaskItem]) -> anyhow::Result<()> {
        let out = io::stdout().lock();
        self.write_task_table(out, items)
    }

    pub fn write_task_table<W: Write>(&self, writer: W, items: &[TaskItem]) -> anyhow::Result<()> {
        let headers = vec!["#".to_string(), "Task".to_string()];

        let rows = items
            .iter()
            .enumerate()
            .map(|(idx, item)| {
                let position = self.paint(&(idx + 1).to_string(), "33");
                vec![position, display_text(&item.text)]
            })
            .collect();

        write_table(writer, headers, rows)
    }

    pub fn print_empty_state(&mut self, message: &str) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        writeln!(out, "{}", self.paint(message, "90"))?;
        Ok(())
    }

    #[tracing::instrument(skip(self, item))]
    pub fn print_task_info(&mut self, position: usize, item: &TaskItem) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();

        writeln!(out, "position  {position}")?;
        writeln!(out, "text      {}", display_text(&item.text))?;
        writeln!(out, "length    {}", item.text.chars().count())?;

        Ok(())
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color || !io::stdout().is_terminal() {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

// Edited text may hold newlines or surrounding blanks; keep table rows on
// one line and make the blanks visible.
fn display_text(text: &str) -> String {
    let single_line = text.replace(['\r', '\n'], " ");
    if single_line.trim().len() != single_line.len() || single_line.is_empty() {
        format!("\"{single_line}\"")
    } else {
        single_line
    }
}

fn write_table<W: Write>(
    mut writer: W,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
) -> anyhow::Result<()> {
    let column_count = headers.len();
    let mut widths = vec![0usize; column_count];

    for (idx, header) in headers.iter().enumerate() {
        widths[idx] = widths[idx].max(UnicodeWidthStr::width(header.as_str()));
    }

    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(UnicodeWidthStr::width(strip_ansi(cell).as_str()));
        }
    }

    for idx in 0..column_count {
        write!(writer, "{:width$} ", headers[idx], width = widths[idx])?;
    }
    writeln!(writer)?;

    for idx in 0..column_count {
        write!(writer, "{:-<width$} ", "", width = widths[idx])?;
    }
    writeln!(writer)?;

    for row in rows {
        for idx in 0..column_count {
            let cell = &row[idx];
            let visible_width = UnicodeWidthStr::width(strip_ansi(cell).as_str());
            let padding = widths[idx].saturating_sub(visible_width);
            write!(writer, "{}{} ", cell, " ".repeat(padding))?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut escaped = false;

    for ch in s.chars() {
        if escaped {
            if ch == 'm' {
                escaped = false;
            }
            continue;
        }

        if ch == '\x1b' {
            escaped = true;
            continue;
        }

        out.push(ch);
    }

    out
}

//! Terminal prompts and table rendering

use app_core::{display_size, MenuItem, Prompter, Row};
use app_store::TransferSummary;
use directories::BaseDirs;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::{Path, PathBuf};

/// Answers dispatcher questions on the terminal
pub struct LinePrompter<'a> {
    editor: &'a mut DefaultEditor,
}

impl<'a> LinePrompter<'a> {
    pub fn new(editor: &'a mut DefaultEditor) -> Self {
        Self { editor }
    }

    fn read(&mut self, prompt: &str, initial: &str) -> Option<String> {
        match self.editor.readline_with_initial(prompt, (initial, "")) {
            Ok(line) => Some(line),
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => None,
            Err(e) => {
                tracing::warn!("Prompt failed: {}", e);
                None
            }
        }
    }
}

impl Prompter for LinePrompter<'_> {
    fn ask_text(&mut self, title: &str, label: &str, default: &str) -> Option<String> {
        println!("{}", title);
        self.read(&format!("{} ", label), default)
    }

    fn confirm(&mut self, title: &str, message: &str) -> bool {
        println!("{}", title);
        println!("{}", message);
        self.read("[y/N] ", "")
            .map(|answer| matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
            .unwrap_or(false)
    }

    fn pick_directory(&mut self, title: &str) -> Option<PathBuf> {
        let cwd = std::env::current_dir()
            .map(|dir| format!("{}/", dir.display()))
            .unwrap_or_default();
        let answer = self.read(&format!("{}: ", title), &cwd)?;
        let answer = answer.trim();
        if answer.is_empty() {
            return None;
        }
        let home = BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf());
        Some(expand_home(answer, home.as_deref()))
    }
}

/// Expand a leading `~` to the home directory
pub fn expand_home(input: &str, home: Option<&Path>) -> PathBuf {
    match (input, home) {
        ("~", Some(home)) => home.to_path_buf(),
        (_, Some(home)) if input.starts_with("~/") => home.join(&input[2..]),
        _ => PathBuf::from(input),
    }
}

/// Rows as an aligned table under a header line
pub fn format_table(rows: &[Row]) -> String {
    let mut widths = Row::HEADERS.map(|header| header.chars().count());
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row.cells()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: [&str; 4]| -> String {
        let padded: Vec<String> = cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = width))
            .collect();
        padded.join("  ").trim_end().to_string()
    };

    let mut out = line(Row::HEADERS);
    for row in rows {
        out.push('\n');
        out.push_str(&line(row.cells()));
    }
    out
}

pub fn format_menu(items: &[MenuItem]) -> String {
    items
        .iter()
        .map(|item| match item {
            MenuItem::Action { label, .. } => format!("  {}", label),
            MenuItem::Separator => "  ----".to_string(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_transfer(summary: &TransferSummary) -> String {
    let noun = if summary.files == 1 { "file" } else { "files" };
    format!(
        "Transferred {} {} ({})",
        summary.files,
        noun,
        display_size(Some(summary.bytes))
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use app_core::{context_menu, Entry};
    use app_store::RawEntry;

    #[test]
    fn test_expand_home() {
        let home = Path::new("/home/me");
        assert_eq!(expand_home("~", Some(home)), PathBuf::from("/home/me"));
        assert_eq!(expand_home("~/photos", Some(home)), PathBuf::from("/home/me/photos"));
        assert_eq!(expand_home("/tmp/x", Some(home)), PathBuf::from("/tmp/x"));
        assert_eq!(expand_home("~/photos", None), PathBuf::from("~/photos"));
    }

    #[test]
    fn test_format_table_aligns_columns() {
        let rows = vec![
            Entry::parent().row(),
            Entry::classify(RawEntry::file("readme.md", Some(1000), None)).row(),
        ];
        let table = format_table(&rows);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "Name       Size    Type  Last modified");
        assert_eq!(lines[1], "..         --      --    --");
        assert_eq!(lines[2], "readme.md  1.0 kB  file  --");
    }

    #[test]
    fn test_format_menu() {
        let dir = Entry::classify(RawEntry::directory("docs"));
        let menu = format_menu(&context_menu(Some(&dir)));
        assert!(menu.starts_with("  Open\n  Rename"));
        assert!(menu.contains("  ----\n  Upload"));
    }

    #[test]
    fn test_format_transfer() {
        let summary = TransferSummary { files: 1, bytes: 1500 };
        assert_eq!(format_transfer(&summary), "Transferred 1 file (1.5 kB)");
    }
}

//! Optional transcript file mirroring what was shown on screen.
//!
//! The transcript is write-only: it is never read back into a session.

use std::fs::OpenOptions;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::core::message::Message;

#[derive(Debug, Default)]
pub struct TranscriptLog {
    file_path: Option<PathBuf>,
    is_active: bool,
}

impl TranscriptLog {
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Open a transcript, starting it immediately when a path is given.
    pub fn new(log_file: Option<PathBuf>) -> io::Result<Self> {
        let mut log = Self::disabled();
        if let Some(path) = log_file {
            log.set_log_file(path)?;
        }
        Ok(log)
    }

    pub fn set_log_file(&mut self, path: PathBuf) -> io::Result<String> {
        // Fail early if the file cannot be created.
        OpenOptions::new().create(true).append(true).open(&path)?;

        self.file_path = Some(path.clone());
        self.is_active = true;
        self.write_lines(&format!(
            "## Session started {}",
            Local::now().format("%Y-%m-%d %H:%M:%S")
        ))?;

        Ok(format!("Logging enabled to: {}", path.display()))
    }

    pub fn toggle(&mut self) -> Result<String, String> {
        let Some(path) = self.file_path.clone() else {
            return Err("No log file specified. Use /log <filename> to enable logging first.".into());
        };

        if self.is_active {
            self.write_lines("## Logging paused")
                .map_err(|err| err.to_string())?;
            self.is_active = false;
            Ok(format!("Logging paused (file: {})", path.display()))
        } else {
            self.is_active = true;
            Ok(format!("Logging resumed to: {}", path.display()))
        }
    }

    pub fn log_message(&self, message: &Message) -> io::Result<()> {
        if !self.is_active {
            return Ok(());
        }

        let mut content = format!("{}: {}", message.sender.display_name(), message.text);
        if let Some(image) = &message.image {
            let mime = image
                .strip_prefix("data:")
                .and_then(|rest| rest.split(';').next())
                .unwrap_or("image");
            content.push_str(&format!("\n[attached {mime}]"));
        }
        self.write_lines(&content)
    }

    pub fn status_string(&self) -> String {
        match (&self.file_path, self.is_active) {
            (None, _) => "disabled".to_string(),
            (Some(path), true) => format!("active ({})", file_name(path)),
            (Some(path), false) => format!("paused ({})", file_name(path)),
        }
    }

    fn write_lines(&self, content: &str) -> io::Result<()> {
        let Some(path) = &self.file_path else {
            return Ok(());
        };

        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let mut writer = BufWriter::new(file);
        for line in content.lines() {
            writeln!(writer, "{line}")?;
        }
        // Blank line between entries, matching the screen layout.
        writeln!(writer)?;
        writer.flush()
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .into_owned()
}

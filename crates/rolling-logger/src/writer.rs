//! Size-rotated log file that also mirrors recent lines into a ring buffer.

use std::collections::VecDeque;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Recent log lines, oldest first
pub type LineBuffer = Arc<Mutex<VecDeque<String>>>;

pub struct RollingWriter {
    dir: PathBuf,
    app_name: String,
    max_bytes: u64,
    max_files: usize,
    file: File,
    written: u64,
    buffer: LineBuffer,
    buffer_lines: usize,
    partial: String,
}

impl RollingWriter {
    pub fn open(
        dir: &Path,
        app_name: &str,
        max_bytes: u64,
        max_files: usize,
        buffer_lines: usize,
    ) -> io::Result<Self> {
        fs::create_dir_all(dir)?;
        let path = active_path(dir, app_name);
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let written = file.metadata()?.len();
        let mut writer = Self {
            dir: dir.to_path_buf(),
            app_name: app_name.to_string(),
            max_bytes,
            max_files,
            file,
            written,
            buffer: Arc::new(Mutex::new(VecDeque::with_capacity(buffer_lines))),
            buffer_lines,
            partial: String::new(),
        };
        writer.write_header()?;
        Ok(writer)
    }

    pub fn buffer(&self) -> LineBuffer {
        self.buffer.clone()
    }

    fn write_header(&mut self) -> io::Result<()> {
        let header = format!(
            "=== {} log opened {} ===\n",
            self.app_name,
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f")
        );
        self.file.write_all(header.as_bytes())?;
        self.written += header.len() as u64;
        Ok(())
    }

    /// `<app>.log` → `<app>.1.log` → … → `<app>.<max_files>.log`, oldest dropped
    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;
        if self.max_files == 0 {
            self.file = File::create(active_path(&self.dir, &self.app_name))?;
        } else {
            let oldest = rotated_path(&self.dir, &self.app_name, self.max_files);
            if oldest.exists() {
                fs::remove_file(&oldest)?;
            }
            for n in (1..self.max_files).rev() {
                let from = rotated_path(&self.dir, &self.app_name, n);
                if from.exists() {
                    fs::rename(&from, rotated_path(&self.dir, &self.app_name, n + 1))?;
                }
            }
            let active = active_path(&self.dir, &self.app_name);
            fs::rename(&active, rotated_path(&self.dir, &self.app_name, 1))?;
            self.file = OpenOptions::new().create(true).append(true).open(&active)?;
        }
        self.written = 0;
        self.write_header()
    }

    fn remember(&mut self, bytes: &[u8]) {
        self.partial.push_str(&String::from_utf8_lossy(bytes));
        let Ok(mut buffer) = self.buffer.lock() else {
            return;
        };
        while let Some(pos) = self.partial.find('\n') {
            let line: String = self.partial.drain(..=pos).collect();
            if self.buffer_lines == 0 {
                continue;
            }
            if buffer.len() == self.buffer_lines {
                buffer.pop_front();
            }
            buffer.push_back(line.trim_end().to_string());
        }
    }
}

impl Write for RollingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.written > 0 && self.written + buf.len() as u64 > self.max_bytes {
            self.rotate()?;
        }
        self.file.write_all(buf)?;
        self.written += buf.len() as u64;
        self.remember(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

pub fn active_path(dir: &Path, app_name: &str) -> PathBuf {
    dir.join(format!("{}.log", app_name))
}

pub fn rotated_path(dir: &Path, app_name: &str, n: usize) -> PathBuf {
    dir.join(format!("{}.{}.log", app_name, n))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_keeps_max_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut w = RollingWriter::open(dir.path(), "App", 200, 2, 10).unwrap();
        for i in 0..40 {
            w.write_all(format!("line number {:04} padded out a little\n", i).as_bytes()).unwrap();
        }
        w.flush().unwrap();

        assert!(active_path(dir.path(), "App").exists());
        assert!(rotated_path(dir.path(), "App", 1).exists());
        assert!(rotated_path(dir.path(), "App", 2).exists());
        assert!(!rotated_path(dir.path(), "App", 3).exists());
        let active = fs::read_to_string(active_path(dir.path(), "App")).unwrap();
        assert!(active.starts_with("=== App log opened"));
        assert!(active.contains("line number 0039"));
    }

    #[test]
    fn test_ring_buffer_keeps_latest_lines() {
        let dir = tempfile::tempdir().unwrap();
        let mut w = RollingWriter::open(dir.path(), "App", 1 << 20, 1, 3).unwrap();
        let buffer = w.buffer();
        w.write_all(b"one\ntwo\nthr").unwrap();
        w.write_all(b"ee\nfour\n").unwrap();

        let lines: Vec<String> = buffer.lock().unwrap().iter().cloned().collect();
        assert_eq!(lines, vec!["two", "three", "four"]);
    }
}

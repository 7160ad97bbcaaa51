use std::io::Write;
use std::path::PathBuf;

/// Line-oriented sink for listener messages. Implementations deal with
/// their own failures; nothing propagates back into the engine.
pub trait Output: Send {
    fn write(&mut self, message: &str);
}

/// One line per call on stdout.
pub struct Console;

impl Output for Console {
    fn write(&mut self, message: &str) {
        println!("{}", message);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileMode {
    /// always append
    Append,
    /// truncate on the first write, append thereafter
    Overwrite,
}

/// File sink. The file is opened per write so long runs never hold a
/// descriptor across placements.
pub struct FileOutput {
    path: PathBuf,
    mode: FileMode,
    first_write: bool,
}

impl FileOutput {
    pub fn new(path: impl Into<PathBuf>, mode: FileMode) -> Self {
        Self {
            path: path.into(),
            mode,
            first_write: true,
        }
    }

    fn append(&self, message: &str) -> std::io::Result<()> {
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", message)
    }

    fn truncate(&self, message: &str) -> std::io::Result<()> {
        let mut file = std::fs::File::create(&self.path)?;
        writeln!(file, "{}", message)
    }
}

impl Output for FileOutput {
    fn write(&mut self, message: &str) {
        let result = match (self.mode, self.first_write) {
            (FileMode::Overwrite, true) => self.truncate(message),
            _ => self.append(message),
        };
        self.first_write = false;
        if let Err(e) = result {
            log::error!("output sink {} failed: {}", self.path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_mode_accumulates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("append.txt");
        std::fs::write(&path, "old\n").unwrap();
        let mut out = FileOutput::new(&path, FileMode::Append);
        out.write("one");
        out.write("two");
        assert!(std::fs::read_to_string(&path).unwrap() == "old\none\ntwo\n");
    }

    #[test]
    fn overwrite_mode_truncates_only_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("overwrite.txt");
        std::fs::write(&path, "stale\n").unwrap();
        let mut out = FileOutput::new(&path, FileMode::Overwrite);
        out.write("one");
        out.write("two");
        assert!(std::fs::read_to_string(&path).unwrap() == "one\ntwo\n");
    }
}

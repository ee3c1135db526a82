//! Multi-file loader: resolves `INSERT-FILE` includes into a single merged
//! AST, honoring source order and detecting cycles (§4.2).

use crate::ast::Ast;
use crate::reader;
use log::{debug, warn};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

pub struct Loader {
    base_dir: PathBuf,
    /// Canonical paths that have already contributed their forms once
    /// (diamond inclusion is silently idempotent, per §4.2).
    loaded: HashSet<PathBuf>,
    /// Paths currently being loaded, for cycle detection.
    stack: Vec<PathBuf>,
}

impl Loader {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Loader {
            base_dir: base_dir.into(),
            loaded: HashSet::new(),
            stack: Vec::new(),
        }
    }

    /// Loads `entry` and every file it transitively includes, returning one
    /// merged, source-ordered AST.
    pub fn load(&mut self, entry: &str) -> Result<Vec<Ast>, String> {
        let path = self.resolve(entry)?;
        self.load_path(&path)
    }

    fn resolve(&self, name: &str) -> Result<PathBuf, String> {
        let candidates = [
            self.base_dir.join(name),
            self.base_dir.join(format!("{name}.zil")),
            self.base_dir.join(format!("{}.zil", name.to_lowercase())),
            self.base_dir.join(name.to_lowercase()),
        ];
        for c in &candidates {
            if c.is_file() {
                return Ok(c.canonicalize().unwrap_or_else(|_| c.clone()));
            }
        }
        // Last resort: case-insensitive directory scan.
        if let Ok(entries) = fs::read_dir(&self.base_dir) {
            for entry in entries.flatten() {
                let fname = entry.file_name();
                let fname = fname.to_string_lossy();
                if fname.eq_ignore_ascii_case(name)
                    || fname.eq_ignore_ascii_case(&format!("{name}.zil"))
                {
                    return entry
                        .path()
                        .canonicalize()
                        .map_err(|e| format!("file-not-found: {name} ({e})"));
                }
            }
        }
        Err(format!("file-not-found: {name}"))
    }

    fn load_path(&mut self, path: &Path) -> Result<Vec<Ast>, String> {
        if self.loaded.contains(path) {
            debug!("diamond include of {} skipped", path.display());
            return Ok(Vec::new());
        }
        if self.stack.contains(&path.to_path_buf()) {
            let mut cycle: Vec<String> = self
                .stack
                .iter()
                .map(|p| p.display().to_string())
                .collect();
            cycle.push(path.display().to_string());
            return Err(format!("circular-dependency: {}", cycle.join(" -> ")));
        }

        let source = fs::read_to_string(path).map_err(|e| format!("read-error: {}: {e}", path.display()))?;
        self.stack.push(path.to_path_buf());
        let forms = reader::read(&source).map_err(|e| format!("parse-error: {}: {e}", path.display()))?;

        let mut merged = Vec::with_capacity(forms.len());
        for form in forms {
            if let Ast::IncludeRef(name) = &form {
                let included_path = self.resolve(name)?;
                let included_forms = self.load_path(&included_path)?;
                merged.extend(included_forms);
            } else {
                merged.push(form);
            }
        }

        self.stack.pop();
        self.loaded.insert(path.to_path_buf());
        Ok(merged)
    }
}

/// Convenience entry point used by the CLI: load `entry` relative to its own
/// parent directory.
pub fn load_game(entry: &str) -> Result<Vec<Ast>, String> {
    let path = Path::new(entry);
    let base_dir = path.parent().filter(|p| !p.as_os_str().is_empty());
    let base_dir = match base_dir {
        Some(p) => p.to_path_buf(),
        None => PathBuf::from("."),
    };
    let file_name = path.file_name().map(|f| f.to_string_lossy().into_owned());
    let Some(file_name) = file_name else {
        warn!("load_game called with no file name component: {entry}");
        return Err(format!("file-not-found: {entry}"));
    };
    Loader::new(base_dir).load(&file_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_tmp(dir: &Path, name: &str, contents: &str) {
        let mut f = fs::File::create(dir.join(name)).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
    }

    #[test]
    fn merges_includes_preserving_order() {
        let dir = std::env::temp_dir().join(format!("zilrun-loader-test-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        write_tmp(&dir, "child.zil", "<GLOBAL B 2>");
        write_tmp(
            &dir,
            "main.zil",
            "<GLOBAL A 1> <INSERT-FILE \"child\" T> <GLOBAL C 3>",
        );
        let forms = Loader::new(&dir).load("main.zil").unwrap();
        let names: Vec<String> = forms
            .iter()
            .map(|f| match f {
                Ast::Global { name, .. } => name.name(),
                _ => panic!("expected global"),
            })
            .collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn detects_cycles() {
        let dir = std::env::temp_dir().join(format!("zilrun-loader-cycle-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        write_tmp(&dir, "a.zil", "<INSERT-FILE \"b\" T>");
        write_tmp(&dir, "b.zil", "<INSERT-FILE \"a\" T>");
        let err = Loader::new(&dir).load("a.zil").unwrap_err();
        assert!(err.starts_with("circular-dependency"));
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn diamond_inclusion_is_idempotent() {
        let dir = std::env::temp_dir().join(format!("zilrun-loader-diamond-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        write_tmp(&dir, "leaf.zil", "<GLOBAL X 1>");
        write_tmp(&dir, "left.zil", "<INSERT-FILE \"leaf\" T>");
        write_tmp(&dir, "right.zil", "<INSERT-FILE \"leaf\" T>");
        write_tmp(
            &dir,
            "main.zil",
            "<INSERT-FILE \"left\" T> <INSERT-FILE \"right\" T>",
        );
        let forms = Loader::new(&dir).load("main.zil").unwrap();
        assert_eq!(forms.len(), 1);
        fs::remove_dir_all(&dir).ok();
    }
}

//! Source discovery and the per-file analysis drivers.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use rayon::prelude::*;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::parser::PythonParser;
use crate::walk::{walk_module, ModuleAnalysis};

const PYTHON_EXTENSIONS: &[&str] = &["py", "pyw"];

fn has_python_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| PYTHON_EXTENSIONS.contains(&ext))
}

fn is_hidden(entry: &walkdir::DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.'))
}

/// Collect the Python sources under `root`, sorted by path for stable
/// output. Hidden directories are skipped entirely. A `root` that is itself
/// a file is taken as-is, letting callers point at any single file.
pub fn collect_python_files(root: &Path) -> Result<Vec<PathBuf>> {
    if root.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| !is_hidden(e))
    {
        let entry = entry.with_context(|| format!("failed to read directory {}", root.display()))?;
        if entry.file_type().is_file() && has_python_extension(entry.path()) {
            files.push(entry.into_path());
        }
    }
    files.sort();
    debug!(root = %root.display(), count = files.len(), "collected sources");
    Ok(files)
}

/// Parse and walk a single file.
pub fn analyze_file(parser: &mut PythonParser, path: &Path) -> Result<ModuleAnalysis> {
    let source =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let nodes = parser
        .parse(&source)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    let analysis = walk_module(&path.to_string_lossy(), &nodes)
        .with_context(|| format!("walk failed for {}", path.display()))?;
    Ok(analysis)
}

/// Analyze `files` one after another with a shared parser. A file that fails
/// is logged and skipped; the batch keeps going.
pub fn analyze_files(files: &[PathBuf]) -> Result<Vec<ModuleAnalysis>> {
    let mut parser = PythonParser::new()?;
    let mut results = Vec::with_capacity(files.len());
    for path in files {
        match analyze_file(&mut parser, path) {
            Ok(analysis) => results.push(analysis),
            Err(err) => warn!(path = %path.display(), error = %err, "skipping file"),
        }
    }
    Ok(results)
}

/// Analyze `files` across the rayon pool. Each worker item builds its own
/// parser since the grammar handle is not shared across threads. Results
/// come back in input order, so sorted input stays sorted.
pub fn analyze_files_parallel(files: &[PathBuf]) -> Result<Vec<ModuleAnalysis>> {
    let results: Vec<ModuleAnalysis> = files
        .par_iter()
        .filter_map(|path| {
            let mut parser = match PythonParser::new() {
                Ok(parser) => parser,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "skipping file");
                    return None;
                }
            };
            match analyze_file(&mut parser, path) {
                Ok(analysis) => Some(analysis),
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "skipping file");
                    None
                }
            }
        })
        .collect();
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(root: &Path, rel: &str, contents: &str) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_collection_is_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "b.py", "b = 1\n");
        write(dir.path(), "a.py", "a = 1\n");
        write(dir.path(), "sub/c.pyw", "c = 1\n");
        write(dir.path(), "notes.txt", "not python\n");
        write(dir.path(), ".hidden/d.py", "d = 1\n");

        let files = collect_python_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.py", "b.py", "sub/c.pyw"]);
    }

    #[test]
    fn test_single_file_root() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "only.py", "x = 1\n");
        let file = dir.path().join("only.py");
        assert_eq!(collect_python_files(&file).unwrap(), vec![file]);
    }

    #[test]
    fn test_sequential_driver_skips_unreadable_files() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "good.py", "a = 2\n");
        let files = vec![dir.path().join("missing.py"), dir.path().join("good.py")];

        let results = analyze_files(&files).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].stats.assignments.len(), 1);
    }

    #[test]
    fn test_parallel_driver_matches_sequential() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.py", "a = 1\n");
        write(dir.path(), "b.py", "b = fn(1, 2)\n");

        let files = collect_python_files(dir.path()).unwrap();
        let sequential = analyze_files(&files).unwrap();
        let parallel = analyze_files_parallel(&files).unwrap();

        assert_eq!(sequential.len(), parallel.len());
        for (s, p) in sequential.iter().zip(&parallel) {
            assert_eq!(s.stats.path, p.stats.path);
            assert_eq!(s.stats.entity_count(), p.stats.entity_count());
            assert_eq!(s.stats.line_kinds, p.stats.line_kinds);
        }
    }
}

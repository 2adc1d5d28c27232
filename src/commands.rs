// Chunk: docs/chunks/cli - mdview command-line front end
//!
//! Implementations of the `mdview` subcommands.
//!
//! Each command writes to a caller-supplied writer so it can be driven from
//! tests as well as from `main`.

use std::io::Write;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use mdview_index::{rank_with_limit, try_scan_with, RankedResult};
use serde::Serialize;
use tracing::info;

use crate::config::ViewerConfig;
use crate::viewer::ViewerSession;

/// How long `open --follow` blocks between checks for new changes.
const FOLLOW_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// `mdview scan <DIR>`
pub fn scan(dir: &Path, json: bool, out: &mut impl Write) -> Result<()> {
    let config = ViewerConfig::load(dir);
    let candidates = try_scan_with(dir, &config.scan_options())
        .with_context(|| format!("failed to scan {}", dir.display()))?;
    info!("found {} markdown file(s) under {}", candidates.len(), dir.display());

    if json {
        serde_json::to_writer_pretty(&mut *out, &candidates)?;
        writeln!(out)?;
    } else {
        for candidate in &candidates {
            writeln!(out, "{}", candidate.relative_path)?;
        }
    }
    Ok(())
}

/// `mdview find <DIR> <QUERY>`
pub fn find(
    dir: &Path,
    query: &str,
    limit: Option<usize>,
    json: bool,
    out: &mut impl Write,
) -> Result<()> {
    let config = ViewerConfig::load(dir);
    let candidates = try_scan_with(dir, &config.scan_options())
        .with_context(|| format!("failed to scan {}", dir.display()))?;
    let limit = limit.unwrap_or_else(|| config.max_results()).max(1);
    let results = rank_with_limit(&candidates, query, limit);

    if json {
        serde_json::to_writer_pretty(&mut *out, &results)?;
        writeln!(out)?;
    } else {
        write_results(&results, None, out)?;
    }
    Ok(())
}

/// Options for [`open`].
#[derive(Debug, Clone, Default)]
pub struct OpenOptions {
    pub query: Option<String>,
    pub follow: bool,
    pub max_reloads: Option<usize>,
}

/// Summary of an open file, printed on open and after every reload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentSummary {
    pub title: String,
    pub lines: usize,
    pub bytes: usize,
    /// First heading line, if any.
    pub heading: Option<String>,
}

impl ContentSummary {
    pub fn of(session: &ViewerSession) -> Self {
        let content = session.content();
        Self {
            title: session.title().to_string(),
            lines: content.lines().count(),
            bytes: content.len(),
            heading: content
                .lines()
                .map(str::trim)
                .find(|line| line.starts_with('#'))
                .map(str::to_string),
        }
    }
}

impl std::fmt::Display for ContentSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {} line(s), {} byte(s)", self.title, self.lines, self.bytes)?;
        if let Some(heading) = &self.heading {
            write!(f, " [{heading}]")?;
        }
        Ok(())
    }
}

/// `mdview open <PATH>`
///
/// Returns the number of reloads observed while following.
pub fn open(path: &Path, options: &OpenOptions, out: &mut impl Write) -> Result<usize> {
    let mut session = ViewerSession::new();
    session
        .open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    if let Some(query) = &options.query {
        session.set_query(query);
    }

    if session.file().is_some() {
        writeln!(out, "{}", ContentSummary::of(&session))?;
    }
    if let Some(dir) = session.directory() {
        writeln!(
            out,
            "{} markdown file(s) in {}",
            session.candidates().len(),
            dir.display()
        )?;
    }
    if session.file().is_none() || options.query.is_some() {
        let selected = session.quick_open().selected_index();
        write_results(session.results(), Some(selected), out)?;
    }
    out.flush()?;

    let follow = options.follow || options.max_reloads.is_some();
    if !follow || session.file().is_none() {
        return Ok(0);
    }

    let mut reloads = 0;
    while options.max_reloads.map_or(true, |max| reloads < max) {
        let Some(change) = session.wait_for_change(FOLLOW_POLL_INTERVAL) else {
            continue;
        };
        reloads += 1;
        writeln!(
            out,
            "reloaded ({}): {}",
            describe_kinds(&change.kinds),
            ContentSummary::of(&session)
        )?;
        out.flush()?;
    }
    Ok(reloads)
}

fn write_results(
    results: &[RankedResult],
    selected: Option<usize>,
    out: &mut impl Write,
) -> Result<()> {
    for (idx, result) in results.iter().enumerate() {
        let marker = if selected == Some(idx) { ">" } else { " " };
        writeln!(
            out,
            "{marker} {:>4}  {}",
            result.score, result.candidate.relative_path
        )?;
    }
    Ok(())
}

fn describe_kinds(kinds: &mdview_watcher::ChangeKinds) -> String {
    let mut names = Vec::new();
    if kinds.write {
        names.push("write");
    }
    if kinds.delete {
        names.push("delete");
    }
    if kinds.rename {
        names.push("rename");
    }
    if kinds.revoke {
        names.push("revoke");
    }
    names.join("+")
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdview_watcher::ChangeKinds;
    use std::fs;
    use tempfile::TempDir;

    fn tree() -> TempDir {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("guides")).unwrap();
        fs::write(temp.path().join("README.md"), "# Readme\n\nHello\n").unwrap();
        fs::write(temp.path().join("guides/install.md"), "# Install\n").unwrap();
        fs::write(temp.path().join("notes.txt"), "ignored").unwrap();
        temp
    }

    fn run<F>(f: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> Result<()>,
    {
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_scan_lists_relative_paths() {
        let temp = tree();
        let text = run(|out| scan(temp.path(), false, out));
        assert_eq!(text, "guides/install.md\nREADME.md\n");
    }

    #[test]
    fn test_scan_json() {
        let temp = tree();
        let text = run(|out| scan(temp.path(), true, out));
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 2);
        assert_eq!(parsed[1]["relative_path"], "README.md");
    }

    #[test]
    fn test_scan_missing_directory_fails() {
        let temp = TempDir::new().unwrap();
        let mut out = Vec::new();
        assert!(scan(&temp.path().join("nope"), false, &mut out).is_err());
    }

    #[test]
    fn test_find_ranks_and_limits() {
        let temp = tree();
        let text = run(|out| find(temp.path(), "inst", None, false, out));
        assert!(text.contains("guides/install.md"));
        assert!(!text.contains("README.md"));

        let text = run(|out| find(temp.path(), "", Some(1), false, out));
        assert_eq!(text.lines().count(), 1);
    }

    #[test]
    fn test_find_json_has_scores() {
        let temp = tree();
        let text = run(|out| find(temp.path(), "readme", None, true, out));
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed[0]["candidate"]["relative_path"], "README.md");
        assert!(parsed[0]["score"].as_u64().unwrap() > 0);
    }

    #[test]
    fn test_open_file_prints_summary() {
        let temp = tree();
        let mut out = Vec::new();
        let reloads = open(&temp.path().join("README.md"), &OpenOptions::default(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(reloads, 0);
        assert!(text.starts_with("README.md: 3 line(s), 16 byte(s) [# Readme]"));
        assert!(text.contains("2 markdown file(s)"));
    }

    #[test]
    fn test_open_directory_lists_quick_open() {
        let temp = tree();
        let options = OpenOptions {
            query: Some("gui".to_string()),
            ..OpenOptions::default()
        };
        let mut out = Vec::new();
        open(temp.path(), &options, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains(">"));
        assert!(text.contains("guides/install.md"));
    }

    #[test]
    fn test_open_missing_path_fails() {
        let temp = TempDir::new().unwrap();
        let mut out = Vec::new();
        assert!(open(&temp.path().join("nope.md"), &OpenOptions::default(), &mut out).is_err());
    }

    #[test]
    fn test_describe_kinds() {
        let mut kinds = ChangeKinds::write();
        kinds.merge(ChangeKinds::rename());
        assert_eq!(describe_kinds(&kinds), "write+rename");
    }
}

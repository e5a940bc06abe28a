//! README test-results section.
//!
//! Renders the run summary as a markdown section and swaps it into a README,
//! replacing the previous section or appending one when none exists.

use crate::report::RunSummary;
use chrono::{DateTime, Local};
use std::fs;
use std::io;
use std::path::Path;
use tracing::{info, warn};

/// Heading that opens the section.
pub const SECTION_HEADING: &str = "## Test Execution Results";

/// Run facts shown alongside the counts.
#[derive(Debug, Clone, Copy)]
pub struct RunFacts {
    /// Parallel workers
    pub workers: usize,
    /// Retries per test
    pub retries: u32,
}

/// Render the results section.
#[must_use]
pub fn render_section(summary: &RunSummary, facts: RunFacts, at: DateTime<Local>) -> String {
    let timestamp = at.format("%Y-%m-%d %H:%M:%S");
    let status = if summary.is_success() { "passing" } else { "failing" };
    format!(
        "{SECTION_HEADING}\n\
         \n\
         ### Latest Test Run ({timestamp})\n\
         ```\n\
         collected {total} items\n\
         \n\
         {headline}\n\
         ```\n\
         \n\
         - **Status**: {status}\n\
         - **Total Tests**: {total}\n\
         - **Passed**: {passed}\n\
         - **Failed**: {failed}\n\
         - **XFailed**: {xfailed} (known bugs documented)\n\
         - **XPassed**: {xpassed}\n\
         - **Execution Time**: {secs:.2} seconds\n\
         - **Parallel Workers**: {workers}\n\
         - **Retry Attempts**: up to {retries} per test\n\
         - **Last Updated**: {timestamp}\n",
        total = summary.total,
        headline = summary.headline(),
        passed = summary.passed,
        failed = summary.failed,
        xfailed = summary.xfailed,
        xpassed = summary.xpassed,
        secs = summary.duration.as_secs_f64(),
        workers = facts.workers,
        retries = facts.retries,
    )
}

/// Replace the results section in `content`, or append it when missing.
///
/// The section runs from its heading to the next level-two heading or the end
/// of the document.
#[must_use]
pub fn replace_section(content: &str, section: &str) -> String {
    let Some(start) = find_heading(content) else {
        let mut updated = content.trim_end().to_string();
        if !updated.is_empty() {
            updated.push_str("\n\n");
        }
        updated.push_str(section);
        return updated;
    };

    let body_start = start + SECTION_HEADING.len();
    let end = content[body_start..]
        .find("\n## ")
        .map_or(content.len(), |offset| body_start + offset + 1);

    let mut updated = String::with_capacity(content.len() + section.len());
    updated.push_str(&content[..start]);
    updated.push_str(section);
    if end < content.len() {
        if !section.ends_with('\n') {
            updated.push('\n');
        }
        updated.push('\n');
        updated.push_str(&content[end..]);
    }
    updated
}

fn find_heading(content: &str) -> Option<usize> {
    let mut offset = 0;
    for line in content.split_inclusive('\n') {
        if line.trim_end() == SECTION_HEADING {
            return Some(offset);
        }
        offset += line.len();
    }
    None
}

/// Rewrite the results section of the README at `path`.
///
/// # Errors
///
/// Returns the I/O error when the README cannot be read or written.
pub fn update_file(path: &Path, summary: &RunSummary, facts: RunFacts) -> io::Result<()> {
    let content = fs::read_to_string(path)?;
    let section = render_section(summary, facts, Local::now());
    fs::write(path, replace_section(&content, &section))?;
    info!(path = %path.display(), "{}", summary.headline());
    Ok(())
}

/// Like [`update_file`], logging instead of failing.
pub fn update_file_logged(path: &Path, summary: &RunSummary, facts: RunFacts) {
    if let Err(e) = update_file(path, summary, facts) {
        warn!(path = %path.display(), error = %e, "Failed to update README results section");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Outcome;
    use chrono::TimeZone;
    use std::time::Duration;

    fn summary() -> RunSummary {
        let mut summary = RunSummary {
            duration: Duration::from_millis(4200),
            ..RunSummary::default()
        };
        summary.record(Outcome::Passed);
        summary.record(Outcome::XFailed);
        summary
    }

    fn facts() -> RunFacts {
        RunFacts {
            workers: 4,
            retries: 2,
        }
    }

    fn at() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap()
    }

    #[test]
    fn test_render_section() {
        let section = render_section(&summary(), facts(), at());
        assert!(section.starts_with(SECTION_HEADING));
        assert!(section.contains("### Latest Test Run (2025-01-02 03:04:05)"));
        assert!(section.contains("1 passed, 1 xfailed in 4.20s"));
        assert!(section.contains("- **Parallel Workers**: 4"));
        assert!(section.contains("- **Status**: passing"));
    }

    #[test]
    fn test_replace_existing_section() {
        let readme = "# Project\n\nIntro.\n\n## Test Execution Results\n\nold stats\n\n## License\n\nMIT\n";
        let updated = replace_section(readme, "## Test Execution Results\n\nnew stats\n");
        assert_eq!(
            updated,
            "# Project\n\nIntro.\n\n## Test Execution Results\n\nnew stats\n\n## License\n\nMIT\n"
        );
    }

    #[test]
    fn test_replace_section_at_end() {
        let readme = "# Project\n\n## Test Execution Results\n\nold stats\n";
        let updated = replace_section(readme, "## Test Execution Results\n\nnew stats\n");
        assert_eq!(updated, "# Project\n\n## Test Execution Results\n\nnew stats\n");
    }

    #[test]
    fn test_append_when_missing() {
        let updated = replace_section("# Project\n\nIntro.\n", "## Test Execution Results\n\nstats\n");
        assert_eq!(
            updated,
            "# Project\n\nIntro.\n\n## Test Execution Results\n\nstats\n"
        );
    }

    #[test]
    fn test_missing_readme_is_an_error() {
        let path = std::env::temp_dir().join("signup-suite-missing-readme.md");
        assert!(update_file(&path, &summary(), facts()).is_err());
    }
}

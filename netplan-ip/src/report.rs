use colored::Colorize;

use crate::pipeline::Progress;

/// `[+]` line for completed steps.
pub fn success(message: &str) -> String {
    format!("{} {message}", "[+]".green())
}

/// `[*]` line for neutral notes.
pub fn note(message: &str) -> String {
    format!("{} {message}", "[*]".cyan())
}

/// `[-]` line for problems.
pub fn failure(message: &str) -> String {
    format!("{} {message}", "[-]".red())
}

/// `[!]` line for things the user should double-check.
pub fn warning(message: &str) -> String {
    format!("{} {message}", "[!]".yellow())
}

/// Render one pipeline step for the terminal; may span several lines.
pub fn render_progress(event: &Progress<'_>) -> String {
    match event {
        Progress::Overlap(overlap) => warning(&format!(
            "{} also defines {}; netplan merges both files",
            overlap.file.display(),
            overlap.interfaces.join(", ")
        )),
        Progress::BackedUp(set) => {
            let mut out = Vec::new();
            let total = set.copied.len() + set.skipped.len();
            if total == 0 {
                out.push(note(&format!(
                    "No YAML files to back up; created empty {}",
                    set.dir.display()
                )));
            } else if set.skipped.is_empty() {
                out.push(success(&format!(
                    "Backed up {} file(s) to {}",
                    set.copied.len(),
                    set.dir.display()
                )));
            } else {
                out.push(warning(&format!(
                    "Backed up {} of {total} file(s) to {}",
                    set.copied.len(),
                    set.dir.display()
                )));
            }
            for skipped in &set.skipped {
                out.push(failure(&format!(
                    "Could not back up {}: {}",
                    skipped.path.display(),
                    skipped.reason
                )));
            }
            out.join("\n")
        }
        Progress::NothingToBackUp(dir) => note(&format!(
            "{} does not exist yet, nothing to back up",
            dir.display()
        )),
        Progress::BackupDisabled => note("Skipping backup as requested (--no-backup)"),
        Progress::Written(path) => success(&format!("Wrote new config to {}", path.display())),
        Progress::Applying => success("Applying configuration (this may drop SSH sessions)"),
        Progress::Applied(0) => success("Configuration applied"),
        Progress::Applied(code) => failure(&format!("Apply command exited with code {code}")),
    }
}

/// Hint printed when the file was written but not applied.
pub fn render_apply_hint(apply_command: &[String]) -> String {
    note(&format!(
        "Not applied. To apply manually run: sudo {}",
        apply_command.join(" ")
    ))
}

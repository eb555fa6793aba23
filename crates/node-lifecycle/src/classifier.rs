//! Install output classification
//!
//! npm does not give a usable exit status through an attached exec, so the
//! outcome is read from its text. Rules, first match wins:
//!
//! 1. Any failure marker (`npm ERR`, `404 Not Found`, `E404`) means failure.
//!    The message is npm's `npm error` block, else stderr, else stdout.
//! 2. `added 0 packages` / `up to date` / `already up to date` means the
//!    package was already present.
//! 3. Anything else is a fresh install.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::constants::markers;

static ALREADY_INSTALLED: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    markers::ALREADY_INSTALLED
        .iter()
        .map(|p| Regex::new(p).expect("already-installed pattern is valid"))
        .collect()
});

static ERROR_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(markers::ERROR_BLOCK).expect("error block pattern is valid"));

/// Outcome read from install output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "camelCase")]
pub enum InstallClassification {
    #[serde(rename_all = "camelCase")]
    Succeeded { already_installed: bool },
    Failed { error: String },
}

impl InstallClassification {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }
}

/// Classify the output of `npm install`.
pub fn classify_install_output(stdout: &str, stderr: &str) -> InstallClassification {
    let combined = format!("{}{}", stdout, stderr);

    if markers::FAILURE.iter().any(|m| combined.contains(m)) {
        return InstallClassification::Failed {
            error: failure_message(&combined, stdout, stderr),
        };
    }

    let already_installed = ALREADY_INSTALLED.iter().any(|re| re.is_match(&combined));
    InstallClassification::Succeeded { already_installed }
}

fn failure_message(combined: &str, stdout: &str, stderr: &str) -> String {
    if let Some(block) = ERROR_BLOCK.find(combined) {
        return block.as_str().trim().to_string();
    }
    if !stderr.trim().is_empty() {
        return stderr.trim().to_string();
    }
    stdout.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failed_message(c: InstallClassification) -> String {
        match c {
            InstallClassification::Failed { error } => error,
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_not_found_is_failure_mentioning_404() {
        let inputs = [
            ("", "npm ERR! 404 Not Found - GET https://registry.npmjs.org/n8n-nodes-nope"),
            ("npm ERR! 404 Not Found", ""),
            ("progress...\n", "npm ERR! code E404\nnpm ERR! 404 Not Found - GET x"),
        ];
        for (stdout, stderr) in inputs {
            let error = failed_message(classify_install_output(stdout, stderr));
            assert!(error.contains("404"), "message {:?} lacks 404", error);
        }
    }

    #[test]
    fn test_npm_error_block_is_preferred() {
        let stderr = "npm warn deprecated foo\nnpm error code E404\nnpm error 404 Not Found - GET https://registry.npmjs.org/x\n";
        let error = failed_message(classify_install_output("", stderr));
        assert!(error.starts_with("npm error code E404"));
        assert!(error.contains("404 Not Found"));
        assert!(!error.contains("deprecated"));
    }

    #[test]
    fn test_failure_falls_back_to_stdout() {
        let error = failed_message(classify_install_output("E404 from mirror", "   "));
        assert_eq!(error, "E404 from mirror");
    }

    #[test]
    fn test_up_to_date_is_already_installed() {
        assert_eq!(
            classify_install_output("up to date, audited 1 package in 400ms", ""),
            InstallClassification::Succeeded {
                already_installed: true
            }
        );
        assert_eq!(
            classify_install_output("", "ADDED 0 PACKAGES"),
            InstallClassification::Succeeded {
                already_installed: true
            }
        );
    }

    #[test]
    fn test_added_packages_is_fresh_install() {
        assert_eq!(
            classify_install_output("added 3 packages in 2s", ""),
            InstallClassification::Succeeded {
                already_installed: false
            }
        );
        assert!(classify_install_output("", "").is_success());
    }

    #[test]
    fn test_failure_wins_over_up_to_date() {
        let c = classify_install_output("up to date", "npm ERR! network");
        assert!(!c.is_success());
    }
}

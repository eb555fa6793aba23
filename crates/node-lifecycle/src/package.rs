//! Package name validation
//!
//! Names end up in commands executed inside the engine container, so only the
//! conservative npm subset is accepted: lowercase letters, digits and dashes,
//! with an optional `@scope/` (or `scope/`) prefix.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::InstallError;

static PACKAGE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(@?[a-z0-9-]+/)?[a-z0-9-]+$").expect("package name pattern is valid")
});

pub fn is_valid_package_name(name: &str) -> bool {
    PACKAGE_NAME.is_match(name)
}

pub fn validate_package_name(name: &str) -> Result<(), InstallError> {
    if is_valid_package_name(name) {
        Ok(())
    } else {
        Err(InstallError::InvalidPackageName(name.to_string()))
    }
}

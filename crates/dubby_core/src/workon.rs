//! `.workon` startup script placed in each local project directory.

use log::debug;
use std::path::Path;

pub const WORKON_SCRIPT_NAME: &str = ".workon";

const WORKON_SCRIPT: &str = r#"#! /usr/bin/bash

PROJECT_DIR=$(cd $(dirname "${BASH_SOURCE[0]}") && pwd)
xdg-open $PROJECT_DIR
cd $PROJECT_DIR
"#;

/// Writes the script unless one exists. Returns whether it was written.
pub fn ensure_workon_script(local_path: &Path) -> std::io::Result<bool> {
    let path = local_path.join(WORKON_SCRIPT_NAME);
    if path.is_file() {
        return Ok(false);
    }
    std::fs::write(&path, WORKON_SCRIPT)?;
    debug!(
        "event=workon_create module=workon status=ok path={}",
        path.display()
    );
    Ok(true)
}

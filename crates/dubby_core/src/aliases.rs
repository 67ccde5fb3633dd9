//! Generated shell alias file.
//!
//! Everything above the sentinel line is operator-owned and preserved verbatim;
//! everything below it is rewritten on each sync.

use crate::model::project::Project;
use crate::workon::WORKON_SCRIPT_NAME;
use log::info;
use std::path::Path;

pub const ALIAS_SENTINEL: &str = "# ~~ AUTO-GENERATED ALIASES BELOW ~~";

/// Rewrites `alias_file`, keeping the manual section and regenerating aliases
/// for the tool and every local project in `projects`.
pub fn sync_aliases(
    alias_file: &Path,
    tool_command: &str,
    projects: &[Project],
) -> std::io::Result<usize> {
    let existing = match std::fs::read_to_string(alias_file) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(err) => return Err(err),
    };

    let local: Vec<&Project> = projects.iter().filter(|project| project.is_local()).collect();
    let mut content = manual_section(&existing);
    if !content.is_empty() && !content.ends_with('\n') {
        content.push('\n');
    }
    content.push_str(ALIAS_SENTINEL);
    content.push('\n');
    content.push_str(&render_aliases(tool_command, &local));

    if let Some(parent) = alias_file.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(alias_file, content)?;
    info!(
        "event=aliases_sync module=aliases status=ok projects={}",
        local.len()
    );
    Ok(local.len())
}

/// Lines before the sentinel, each keeping its newline.
fn manual_section(existing: &str) -> String {
    existing
        .split_inclusive('\n')
        .take_while(|line| !line.starts_with(ALIAS_SENTINEL))
        .collect()
}

fn render_aliases(tool_command: &str, projects: &[&Project]) -> String {
    let mut out = format!("alias dubby='{tool_command}'\n");
    for project in projects {
        let workon = project.local_path.join(WORKON_SCRIPT_NAME);
        let name = alias_name(&project.name);
        out.push_str(&format!(
            "alias workon-{name}='source \"{}\"'\n",
            workon.display()
        ));
        out.push_str(&format!(
            "alias edit-workon-{name}='nano \"{}\"'\n",
            workon.display()
        ));
    }
    out
}

fn alias_name(project_name: &str) -> String {
    project_name.replace(' ', "-").replace('\'', "")
}

//! Page naming grammar for the external notes store.
//!
//! ```text
//! page   := "projects" SEP name [ SEP suffix ] ".md"
//! SEP    := "___"
//! suffix := any text, may itself contain SEP
//! ```
//!
//! The first two segments are reserved. A page without a suffix maps to the
//! local link `main.md`; otherwise the local link is `suffix.md`, keeping any
//! embedded separators (`projects___acme___a___b.md` -> `a___b.md`).

/// Reserved segment separator in page file names.
pub const SEGMENT_SEPARATOR: &str = "___";
/// First reserved segment of every project page.
pub const PROJECT_NAMESPACE: &str = "projects";
pub const PAGE_EXTENSION: &str = ".md";
/// Local link name for a project's primary page.
pub const MAIN_LINK_NAME: &str = "main.md";

/// `projects___<name>`: every page of the project starts with this.
pub fn page_prefix(project_name: &str) -> String {
    format!("{PROJECT_NAMESPACE}{SEGMENT_SEPARATOR}{project_name}")
}

/// File name of the project's primary page, `projects___<name>.md`.
pub fn primary_page_file_name(project_name: &str) -> String {
    format!("{}{PAGE_EXTENSION}", page_prefix(project_name))
}

/// Local link name for an external page, or `None` when the page does not
/// belong to `project_name` under the grammar.
///
/// A bare prefix match is not enough: `projects___acme__site.md` belongs to
/// `acme__site`, not to `acme`.
pub fn local_link_name(file_name: &str, project_name: &str) -> Option<String> {
    let rest = file_name.strip_prefix(&page_prefix(project_name))?;
    if rest == PAGE_EXTENSION {
        return Some(MAIN_LINK_NAME.to_string());
    }

    let suffix = rest.strip_prefix(SEGMENT_SEPARATOR)?;
    let stem = suffix.strip_suffix(PAGE_EXTENSION)?;
    if stem.is_empty() {
        return None;
    }
    Some(suffix.to_string())
}

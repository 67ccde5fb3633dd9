#![cfg(unix)]

mod common;

use common::Fixture;
use dubby_core::aliases::ALIAS_SENTINEL;
use dubby_core::notes::NOTES_DIR_NAME;
use dubby_core::projection::MIRROR_LINK_NAME;
use dubby_core::workon::WORKON_SCRIPT_NAME;
use dubby_core::{
    AutoConfirm, Confirmer, CreateProjectRequest, ManifestRepository, ProjectFilter,
    ProjectStatus, RegistryError, StepOutcome,
};

/// Answers prompts in order, defaulting to "no" once exhausted.
struct Scripted(Vec<bool>);

impl Confirmer for Scripted {
    fn confirm(&mut self, _prompt: &str, _default_yes: bool) -> bool {
        if self.0.is_empty() {
            false
        } else {
            self.0.remove(0)
        }
    }
}

#[test]
fn create_materializes_the_full_local_presence() {
    let fx = Fixture::new();
    let registry = fx.registry();

    let (project, report) = registry.create(CreateProjectRequest::new("acme__site")).unwrap();
    assert_eq!(project.org(), Some("acme"));
    assert!(report.local_dir_created);
    assert!(report.workon_created);
    assert!(report.notes.page_created);

    let manifest = project.to_manifest();
    assert_eq!(manifest.org.as_deref(), Some("acme"));
    assert_eq!(manifest.status, ProjectStatus::Active);
    assert!(manifest.tags.is_empty());
    assert_eq!(registry.get("acme__site").unwrap(), project);

    let local = fx.config.local_path("acme__site");
    assert!(local.is_dir());
    assert_eq!(
        std::fs::read_link(local.join(NOTES_DIR_NAME).join("main.md")).unwrap(),
        fx.page("projects___acme__site.md")
    );
    assert!(local.join(WORKON_SCRIPT_NAME).is_file());
    assert_eq!(
        std::fs::read_link(fx.bucket_link(ProjectStatus::Active, "acme__site")).unwrap(),
        local
    );
    assert_eq!(fx.buckets_holding("acme__site"), vec![ProjectStatus::Active]);
    assert_eq!(
        std::fs::read_link(local.join(MIRROR_LINK_NAME)).unwrap(),
        fx.config.mirror_folder("acme__site")
    );

    let aliases = std::fs::read_to_string(&fx.config.aliases_file).unwrap();
    assert!(aliases.contains("alias workon-acme__site='source"));
}

#[test]
fn create_refuses_existing_names_without_mutation() {
    let fx = Fixture::new();
    let registry = fx.registry();
    let mut request = CreateProjectRequest::new("acme");
    request.tags = vec!["first".to_string()];
    registry.create(request).unwrap();

    let mut again = CreateProjectRequest::new("acme");
    again.status = ProjectStatus::Archived;
    let err = registry.create(again).unwrap_err();
    assert!(matches!(err, RegistryError::AlreadyExists(name) if name == "acme"));

    let stored = registry.get("acme").unwrap();
    assert_eq!(stored.status, ProjectStatus::Active);
    assert!(stored.tags.contains("first"));
    assert!(fx.buckets_holding("acme") == vec![ProjectStatus::Active]);
}

#[test]
fn create_completes_when_a_page_references_a_nested_asset() {
    let fx = Fixture::new();
    fx.write_page("projects___acme.md", "- ![x](../assets/sub/x.png)\n");

    let (project, report) = fx.registry().create(CreateProjectRequest::new("acme")).unwrap();
    assert!(!report.notes.page_created);
    assert!(report.notes.assets_linked.is_empty());
    assert!(project.local_path.join(WORKON_SCRIPT_NAME).is_file());
    assert_eq!(fx.buckets_holding("acme"), vec![ProjectStatus::Active]);
}

#[test]
fn create_rejects_path_like_names() {
    let fx = Fixture::new();
    let err = fx.registry().create(CreateProjectRequest::new("../escape")).unwrap_err();
    assert!(matches!(err, RegistryError::InvalidName(_)));
}

#[test]
fn materialize_completes_a_partial_initialization() {
    let fx = Fixture::new();
    let registry = fx.registry();
    let (project, _) = registry.create(CreateProjectRequest::new("acme")).unwrap();

    std::fs::remove_file(project.local_path.join(WORKON_SCRIPT_NAME)).unwrap();
    std::fs::remove_file(fx.bucket_link(ProjectStatus::Active, "acme")).unwrap();

    let report = registry.materialize(&project).unwrap();
    assert!(!report.local_dir_created);
    assert!(report.workon_created);
    assert_eq!(report.symlinks.created, vec![fx.bucket_link(ProjectStatus::Active, "acme")]);

    let idle = registry.materialize(&project).unwrap();
    assert!(!idle.workon_created);
    assert!(idle.symlinks.is_unchanged());
    assert!(idle.notes.linked.is_empty());
}

#[test]
fn set_archived_moves_the_bucket_link_once() {
    let fx = Fixture::new();
    let registry = fx.registry();
    let (mut project, _) = registry.create(CreateProjectRequest::new("acme")).unwrap();

    let first = registry.set_status(&mut project, ProjectStatus::Archived).unwrap();
    assert_eq!(first.created, vec![fx.bucket_link(ProjectStatus::Archived, "acme")]);
    assert_eq!(first.removed, vec![fx.bucket_link(ProjectStatus::Active, "acme")]);
    assert_eq!(fx.buckets_holding("acme"), vec![ProjectStatus::Archived]);
    assert_eq!(registry.get("acme").unwrap().status, ProjectStatus::Archived);

    let second = registry.set_status(&mut project, ProjectStatus::Archived).unwrap();
    assert!(second.is_unchanged());
    assert_eq!(fx.buckets_holding("acme"), vec![ProjectStatus::Archived]);
}

#[test]
fn invalid_status_string_changes_nothing() {
    let fx = Fixture::new();
    let registry = fx.registry();
    let (mut project, _) = registry.create(CreateProjectRequest::new("acme")).unwrap();

    let outcome = registry.set_status_str(&mut project, "archive").unwrap();
    assert!(outcome.is_none());
    assert_eq!(project.status, ProjectStatus::Active);
    assert_eq!(registry.get("acme").unwrap().status, ProjectStatus::Active);
    assert_eq!(fx.buckets_holding("acme"), vec![ProjectStatus::Active]);

    let applied = registry.set_status_str(&mut project, "inactive").unwrap();
    assert!(applied.is_some());
    assert_eq!(fx.buckets_holding("acme"), vec![ProjectStatus::Inactive]);
}

#[test]
fn status_change_of_a_non_local_project_only_touches_the_manifest() {
    let fx = Fixture::new();
    let registry = fx.registry();
    let (mut project, _) = registry.create(CreateProjectRequest::new("acme")).unwrap();
    registry.delete("acme", &mut Scripted(vec![false, true, true, false])).unwrap();
    assert!(!project.is_local());

    let report = registry.set_status(&mut project, ProjectStatus::Inactive).unwrap();
    assert!(report.is_unchanged());
    assert!(fx.buckets_holding("acme").is_empty());
    assert_eq!(registry.get("acme").unwrap().status, ProjectStatus::Inactive);
}

#[test]
fn tag_and_text_setters_persist() {
    let fx = Fixture::new();
    let registry = fx.registry();
    let (mut project, _) = registry.create(CreateProjectRequest::new("acme")).unwrap();

    registry
        .add_tags(&mut project, &["b".to_string(), "a".to_string()])
        .unwrap();
    registry.add_tags(&mut project, &["a".to_string()]).unwrap();
    registry.remove_tags(&mut project, &["b".to_string()]).unwrap();
    registry
        .set_description(&mut project, Some("A longer description".to_string()))
        .unwrap();
    registry
        .set_tagline(&mut project, Some("short".to_string()))
        .unwrap();

    let stored = registry.get("acme").unwrap();
    assert_eq!(stored.tags.iter().collect::<Vec<_>>(), ["a"]);
    assert_eq!(stored.description.as_deref(), Some("A longer description"));
    assert_eq!(stored.tagline.as_deref(), Some("short"));

    registry.set_tagline(&mut project, None).unwrap();
    assert!(registry.get("acme").unwrap().tagline.is_none());
}

#[test]
fn list_filters_orgs_and_tags() {
    let fx = Fixture::new();
    let registry = fx.registry();
    let mut a = CreateProjectRequest::new("acme__site");
    a.tags = vec!["web".to_string()];
    registry.create(a).unwrap();
    let mut b = CreateProjectRequest::new("acme__api");
    b.tags = vec!["rust".to_string()];
    b.status = ProjectStatus::Inactive;
    registry.create(b).unwrap();
    let mut c = CreateProjectRequest::new("Hobby");
    c.tags = vec!["web".to_string(), "fun".to_string()];
    registry.create(c).unwrap();
    std::fs::remove_dir_all(fx.config.local_path("Hobby")).unwrap();

    let names = |filter: &ProjectFilter| -> Vec<String> {
        registry.list(filter).unwrap().into_iter().map(|p| p.name).collect()
    };

    assert_eq!(names(&ProjectFilter::default()), ["acme__api", "acme__site", "Hobby"]);
    assert_eq!(
        names(&ProjectFilter {
            tags: vec!["web".to_string()],
            ..ProjectFilter::default()
        }),
        ["acme__site", "Hobby"]
    );
    assert_eq!(
        names(&ProjectFilter {
            tags: vec!["web".to_string()],
            local: true,
            ..ProjectFilter::default()
        }),
        ["acme__site"]
    );
    assert_eq!(
        names(&ProjectFilter {
            status: Some(ProjectStatus::Inactive),
            org: Some("acme".to_string()),
            ..ProjectFilter::default()
        }),
        ["acme__api"]
    );

    assert_eq!(registry.list_orgs(&ProjectFilter::default()).unwrap(), ["acme"]);
    assert_eq!(
        registry.list_tags(&ProjectFilter::default()).unwrap(),
        ["fun", "rust", "web"]
    );
}

#[test]
fn delete_with_everything_confirmed_removes_all_artifacts() {
    let fx = Fixture::new();
    let registry = fx.registry();
    registry.create(CreateProjectRequest::new("acme")).unwrap();
    fx.write_page("projects___acme___todo.md", "- a\n");
    fx.write_page("projects___acme__site.md", "- someone else\n");

    let report = registry.delete("acme", &mut AutoConfirm::yes()).unwrap();
    assert_eq!(report.notes, StepOutcome::Removed);
    assert_eq!(report.local_dir, StepOutcome::Removed);
    assert_eq!(report.symlinks.mirror_folder, Some(StepOutcome::Removed));
    assert_eq!(report.manifest, StepOutcome::Removed);

    assert!(!fx.page("projects___acme.md").exists());
    assert!(!fx.page("projects___acme___todo.md").exists());
    assert!(fx.page("projects___acme__site.md").exists());
    assert!(!fx.config.local_path("acme").exists());
    assert!(fx.buckets_holding("acme").is_empty());
    assert!(!fx.config.mirror_folder("acme").exists());
    assert!(matches!(registry.get("acme"), Err(RegistryError::NotFound(_))));
}

#[test]
fn declined_steps_are_retained_but_symlinks_always_go() {
    let fx = Fixture::new();
    let registry = fx.registry();
    registry.create(CreateProjectRequest::new("acme")).unwrap();

    let report = registry.delete("acme", &mut AutoConfirm::no()).unwrap();
    assert_eq!(report.notes, StepOutcome::Retained);
    assert_eq!(report.local_dir, StepOutcome::Retained);
    assert_eq!(report.symlinks.mirror_folder, Some(StepOutcome::Retained));
    assert_eq!(report.manifest, StepOutcome::Retained);

    assert!(fx.page("projects___acme.md").exists());
    assert!(fx.config.local_path("acme").is_dir());
    assert!(fx.buckets_holding("acme").is_empty());
    assert!(!fx.config.local_path("acme").join(MIRROR_LINK_NAME).is_symlink());
    assert!(registry.get("acme").is_ok());
}

#[test]
fn delete_on_a_machine_without_the_checkout_keeps_the_mirror_folder() {
    let fx = Fixture::new();
    let registry = fx.registry();
    registry.create(CreateProjectRequest::new("acme")).unwrap();
    std::fs::remove_dir_all(fx.config.local_path("acme")).unwrap();

    let report = registry.delete("acme", &mut AutoConfirm::yes()).unwrap();
    assert_eq!(report.local_dir, StepOutcome::Absent);
    assert_eq!(report.symlinks.mirror_folder, Some(StepOutcome::Skipped));
    assert_eq!(report.manifest, StepOutcome::Removed);
    assert!(fx.config.mirror_folder("acme").is_dir());
    assert!(fx.buckets_holding("acme").is_empty());
}

#[test]
fn delete_unknown_project_is_not_found() {
    let fx = Fixture::new();
    let err = fx
        .registry()
        .delete("ghost", &mut AutoConfirm::yes())
        .unwrap_err();
    assert!(matches!(err, RegistryError::NotFound(name) if name == "ghost"));
}

#[test]
fn sync_aliases_preserves_manual_section_and_lists_local_projects() {
    let fx = Fixture::new();
    let registry = fx.registry();
    std::fs::create_dir_all(fx.config.aliases_file.parent().unwrap()).unwrap();
    std::fs::write(
        &fx.config.aliases_file,
        format!("alias ll='ls -l'\n{ALIAS_SENTINEL}\nalias workon-gone='x'\n"),
    )
    .unwrap();

    registry.create(CreateProjectRequest::new("acme")).unwrap();
    registry.create(CreateProjectRequest::new("remote")).unwrap();
    std::fs::remove_dir_all(fx.config.local_path("remote")).unwrap();

    assert_eq!(registry.sync_aliases().unwrap(), 1);
    let content = std::fs::read_to_string(&fx.config.aliases_file).unwrap();
    let workon = fx.config.local_path("acme").join(WORKON_SCRIPT_NAME);
    assert_eq!(
        content,
        format!(
            "alias ll='ls -l'\n{ALIAS_SENTINEL}\nalias dubby='dubby'\n\
             alias workon-acme='source \"{w}\"'\n\
             alias edit-workon-acme='nano \"{w}\"'\n",
            w = workon.display()
        )
    );
}

#[test]
fn manifest_store_is_shared_with_the_registry() {
    let fx = Fixture::new();
    let registry = fx.registry();
    registry.create(CreateProjectRequest::new("acme")).unwrap();

    let repo = dubby_core::JsonManifestRepository::new(
        fx.config.registry_dir(),
        fx.config.projects_local.clone(),
    );
    assert!(repo.exists("acme"));
}

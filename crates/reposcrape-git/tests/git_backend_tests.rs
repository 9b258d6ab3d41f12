mod common;

use common::{commit_version, git_available, origin_repo, version_of};
use reposcrape_core::{Backend, Progress, RepoType, Repository, UpdateKind};
use reposcrape_git::GitBackend;

fn descriptor(url: &str, tag: Option<&str>) -> Repository {
    let mut builder = Repository::builder(RepoType::Git).url(url);
    if let Some(tag) = tag {
        builder = builder.tag(tag);
    }
    builder.build().unwrap()
}

#[test]
fn test_scrape_at_revision() {
    if !git_available() {
        eprintln!("git not available, skipping");
        return;
    }

    let tmp = tempfile::tempdir().unwrap();
    let origin = origin_repo(&tmp.path().join("origin"));
    let url = tmp.path().join("origin").to_string_lossy().into_owned();

    let mut backend = GitBackend::new(tmp.path().join("scrape"));
    let repo = descriptor(&url, Some(&origin.first[..7]));

    let mut messages = Vec::new();
    let mut record = |msg: &str, advance: bool| messages.push((msg.to_string(), advance));
    backend.scrape(&repo, &mut Progress::new(Some(&mut record)));

    assert!(backend.succeeded(), "errors: {:?}", backend.errors());
    assert_eq!(backend.last_update(), Some(UpdateKind::Full));
    assert_eq!(backend.current_commit(), Some(origin.first.as_str()));

    let dir = backend.repo_dir().unwrap();
    assert!(dir.starts_with(tmp.path().join("scrape").join("git")));
    assert_eq!(version_of(dir), "1");
    assert!(dir.join("old.txt").exists());

    assert_eq!(messages.iter().filter(|(_, advance)| *advance).count(), 1);
    assert!(messages.last().unwrap().1);
}

#[test]
fn test_default_branch_then_incremental_updates() {
    if !git_available() {
        eprintln!("git not available, skipping");
        return;
    }

    let tmp = tempfile::tempdir().unwrap();
    let origin_path = tmp.path().join("origin");
    let origin = origin_repo(&origin_path);
    let url = origin_path.to_string_lossy().into_owned();

    let mut backend = GitBackend::new(tmp.path().join("scrape"));
    let repo = descriptor(&url, None);

    backend.scrape(&repo, &mut Progress::none());
    assert!(backend.succeeded(), "errors: {:?}", backend.errors());
    assert_eq!(backend.last_update(), Some(UpdateKind::Full));
    assert_eq!(backend.current_commit(), Some(origin.second.as_str()));
    let first_dir = backend.repo_dir().unwrap().to_path_buf();
    assert_eq!(version_of(&first_dir), "2");
    assert!(!first_dir.join("old.txt").exists());

    // Unchanged remote: same path, nothing rewritten
    backend.scrape(&repo, &mut Progress::none());
    assert!(backend.succeeded(), "errors: {:?}", backend.errors());
    assert_eq!(backend.last_update(), Some(UpdateKind::Unchanged));
    assert_eq!(backend.repo_dir(), Some(first_dir.as_path()));

    // New upstream commit is picked up by a fetch, not a clone
    let third = commit_version(&origin_path, "3");
    backend.scrape(&repo, &mut Progress::none());
    assert!(backend.succeeded(), "errors: {:?}", backend.errors());
    assert_eq!(backend.last_update(), Some(UpdateKind::Incremental));
    assert_eq!(backend.current_commit(), Some(third.as_str()));
    assert_eq!(version_of(&first_dir), "3");
}

#[test]
fn test_switching_references_rewrites_worktree() {
    if !git_available() {
        eprintln!("git not available, skipping");
        return;
    }

    let tmp = tempfile::tempdir().unwrap();
    let origin_path = tmp.path().join("origin");
    let origin = origin_repo(&origin_path);
    let url = origin_path.to_string_lossy().into_owned();

    let mut backend = GitBackend::new(tmp.path().join("scrape"));

    backend.scrape(&descriptor(&url, Some("v1.0")), &mut Progress::none());
    assert!(backend.succeeded(), "errors: {:?}", backend.errors());
    assert_eq!(backend.current_commit(), Some(origin.first.as_str()));
    let dir = backend.repo_dir().unwrap().to_path_buf();
    assert!(dir.join("old.txt").exists());

    backend.scrape(&descriptor(&url, Some("main")), &mut Progress::none());
    assert!(backend.succeeded(), "errors: {:?}", backend.errors());
    assert_eq!(backend.last_update(), Some(UpdateKind::Incremental));
    assert_eq!(backend.repo_dir(), Some(dir.as_path()));
    assert_eq!(version_of(&dir), "2");
    assert!(!dir.join("old.txt").exists());
}

#[test]
fn test_missing_revision_is_reported() {
    if !git_available() {
        eprintln!("git not available, skipping");
        return;
    }

    let tmp = tempfile::tempdir().unwrap();
    origin_repo(&tmp.path().join("origin"));
    let url = tmp.path().join("origin").to_string_lossy().into_owned();

    let mut backend = GitBackend::new(tmp.path().join("scrape"));
    backend.scrape(&descriptor(&url, Some("no-such-branch")), &mut Progress::none());

    assert!(!backend.succeeded());
    assert_eq!(backend.errors(), &["revision not found: no-such-branch"]);
}

#[test]
fn test_credentials_stay_out_of_the_clone() {
    if !git_available() {
        eprintln!("git not available, skipping");
        return;
    }

    let tmp = tempfile::tempdir().unwrap();
    let origin_path = tmp.path().join("origin");
    origin_repo(&origin_path);
    let url = origin_path.to_string_lossy().into_owned();

    let mut backend = GitBackend::new(tmp.path().join("scrape"));
    let repo = Repository::builder(RepoType::Git)
        .url(&url)
        .credentials("deploy", "s3cret")
        .build()
        .unwrap();

    backend.scrape(&repo, &mut Progress::none());
    assert!(backend.succeeded(), "errors: {:?}", backend.errors());

    let dir = backend.repo_dir().unwrap().to_path_buf();
    let stored = std::fs::read_to_string(dir.join(".git").join("config")).unwrap();
    assert!(!stored.contains("s3cret"), "{}", stored);
    assert!(!stored.contains("deploy"), "{}", stored);
    assert_eq!(common::git(&dir, &["config", "remote.origin.url"]), url);

    // Later fetches still go to the bare URL
    commit_version(&origin_path, "3");
    backend.scrape(&repo, &mut Progress::none());
    assert!(backend.succeeded(), "errors: {:?}", backend.errors());
    assert_eq!(backend.last_update(), Some(UpdateKind::Incremental));
    assert_eq!(version_of(&dir), "3");
}

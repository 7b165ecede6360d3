//! Tests for DomService: tag-addressed operations and persistence

use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use rstest::rstest;
use tempfile::TempDir;

use domviz::application::services::DomService;
use domviz::application::ApplicationError;
use domviz::domain::DomainError;
use domviz::infrastructure::traits::{FileSystem, RealFileSystem};

/// Filesystem double that records writes or fails them.
struct MockFileSystem {
    written: Mutex<Vec<(PathBuf, String)>>,
    should_fail: bool,
}

impl MockFileSystem {
    fn new() -> Self {
        Self {
            written: Mutex::new(Vec::new()),
            should_fail: false,
        }
    }

    fn failing() -> Self {
        Self {
            written: Mutex::new(Vec::new()),
            should_fail: true,
        }
    }
}

impl MockFileSystem {
    fn written_to(&self, path: &Path) -> Option<String> {
        self.written
            .lock()
            .unwrap()
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, c)| c.clone())
    }
}

impl FileSystem for MockFileSystem {
    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        if self.should_fail {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "read-only filesystem",
            ));
        }
        self.written
            .lock()
            .unwrap()
            .push((path.to_path_buf(), content.to_string()));
        Ok(())
    }

    fn exists(&self, _path: &Path) -> bool {
        true
    }

    fn create_dir_all(&self, _path: &Path) -> io::Result<()> {
        Ok(())
    }
}

fn service() -> DomService {
    domviz::util::testing::init_test_setup();
    DomService::new("html", Arc::new(RealFileSystem))
}

const EXPECTED: &str = "<html>\n  <body>\n    <p>\n      hello\n    </p>\n  </body>\n</html>\n";

#[test]
fn given_body_and_p_when_displaying_then_writes_nested_markup() {
    let mut svc = service();
    svc.add("html", "body", "").unwrap();
    svc.add("body", "p", "hello").unwrap();

    let mut out: Vec<u8> = Vec::new();
    svc.display(&mut out).unwrap();

    assert_eq!(String::from_utf8(out).unwrap(), EXPECTED);
}

#[test]
fn given_p_removed_when_counting_then_only_html_and_body_remain() {
    let mut svc = service();
    svc.add("html", "body", "").unwrap();
    svc.add("body", "p", "hello").unwrap();

    assert_eq!(svc.remove("p").unwrap(), 1);
    assert_eq!(svc.count(), 2);
}

#[rstest]
#[case("remove")]
#[case("view")]
#[case("edit")]
#[case("move-node")]
#[case("move-parent")]
fn given_unknown_tag_when_operating_then_not_found(#[case] op: &str) {
    let mut svc = service();
    svc.add("html", "body", "").unwrap();

    let err = match op {
        "remove" => svc.remove("nav").unwrap_err(),
        "view" => svc.view("nav").unwrap_err(),
        "edit" => svc.edit("nav", "x").unwrap_err(),
        "move-node" => svc.move_node("nav", "body").unwrap_err(),
        "move-parent" => svc.move_node("body", "nav").unwrap_err(),
        _ => unreachable!(),
    };

    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::NotFound(ref tag)) if tag == "nav"
    ));
    assert_eq!(svc.count(), 2);
}

#[test]
fn given_root_tag_when_removing_then_invalid_target() {
    let mut svc = service();
    let err = svc.remove("html").unwrap_err();
    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::InvalidTarget(_))
    ));
    assert_eq!(svc.count(), 1);
}

#[test]
fn given_ancestor_when_moving_under_descendant_then_cyclic_move() {
    let mut svc = service();
    svc.add("html", "body", "").unwrap();
    svc.add("body", "div", "").unwrap();
    svc.add("div", "p", "").unwrap();

    let err = svc.move_node("body", "p").unwrap_err();

    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::CyclicMove { .. })
    ));
    assert_eq!(svc.tree().parent(svc.tree().find_by_tag("body").unwrap()), Some(svc.tree().root()));
}

#[test]
fn given_node_when_moving_then_render_shows_new_position() {
    let mut svc = service();
    svc.add("html", "head", "").unwrap();
    svc.add("html", "body", "").unwrap();
    svc.add("body", "title", "Home").unwrap();

    svc.move_node("title", "head").unwrap();

    let mut out: Vec<u8> = Vec::new();
    svc.display(&mut out).unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "<html>\n  <head>\n    <title>\n      Home\n    </title>\n  </head>\n  <body>\n  </body>\n</html>\n"
    );
    assert_eq!(svc.count(), 4);
}

#[test]
fn given_tree_when_saving_to_temp_dir_then_file_matches_display() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("dom_structure.html");
    let mut svc = service();
    svc.add("html", "body", "").unwrap();
    svc.add("body", "p", "hello").unwrap();

    let saved = svc.save(&path).unwrap();

    assert_eq!(saved, path);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), EXPECTED);
}

#[test]
fn given_mock_fs_when_saving_then_rendered_text_is_written() {
    let fs = Arc::new(MockFileSystem::new());
    let mut svc = DomService::new("html", fs.clone());
    svc.add("html", "body", "").unwrap();
    svc.add("body", "p", "hello").unwrap();

    svc.save(Path::new("out.html")).unwrap();

    assert_eq!(fs.written_to(Path::new("out.html")).as_deref(), Some(EXPECTED));
}

#[test]
fn given_failing_fs_when_saving_then_io_failure_and_tree_intact() {
    let mut svc = DomService::new("html", Arc::new(MockFileSystem::failing()));
    svc.add("html", "body", "").unwrap();

    let err = svc.save(Path::new("out.html")).unwrap_err();

    assert!(err.is_io());
    assert!(err.to_string().contains("out.html"));
    assert_eq!(svc.count(), 2);
}

#[test]
fn given_outline_display_then_uses_tree_glyphs() {
    let mut svc = service();
    svc.add("html", "body", "").unwrap();
    svc.add("body", "p", "hello").unwrap();

    let mut out: Vec<u8> = Vec::new();
    svc.display_outline(&mut out).unwrap();
    let text = String::from_utf8(out).unwrap();

    assert!(text.starts_with("<html>\n"));
    assert!(text.contains("<body>"));
    assert!(text.contains("<p> \"hello\""));
}

//! Scripted sessions through the numbered menu

use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;

use tempfile::TempDir;

use domviz::application::services::DomService;
use domviz::cli::menu::Menu;
use domviz::infrastructure::traits::RealFileSystem;

fn run_script(script: &str, save_file: PathBuf) -> (DomService, String) {
    run_bytes(script.as_bytes(), save_file)
}

fn run_bytes(script: &[u8], save_file: PathBuf) -> (DomService, String) {
    domviz::util::testing::init_test_setup();
    let service = DomService::new("html", Arc::new(RealFileSystem));
    let mut menu = Menu::new(service, Cursor::new(script.to_vec()), Vec::new(), save_file);
    menu.run().unwrap();
    let (service, out) = menu.into_parts();
    (service, String::from_utf8(out).unwrap())
}

#[test]
fn given_add_and_display_script_then_renders_tree() {
    let script = "1\nhtml\nbody\n\n1\nbody\np\nhello world\n6\n9\n";
    let (svc, out) = run_script(script, PathBuf::from("unused.html"));

    assert_eq!(svc.count(), 3);
    assert_eq!(svc.view("p").unwrap(), "hello world");
    assert!(out.contains("    <p>\n      hello world\n    </p>\n"));
}

#[test]
fn given_non_numeric_choice_then_reprompts_without_acting() {
    let script = "abc\n-3\n8\n9\n";
    let (svc, out) = run_script(script, PathBuf::from("unused.html"));

    assert_eq!(out.matches("please enter a valid number").count(), 2);
    assert!(out.contains("Total elements: 1"));
    assert_eq!(svc.count(), 1);
}

#[test]
fn given_out_of_range_choice_then_reports_invalid_choice() {
    let (_, out) = run_script("42\n9\n", PathBuf::from("unused.html"));
    assert!(out.contains("Invalid choice. Please try again."));
}

#[test]
fn given_errors_then_session_continues() {
    let script = "2\nhtml\n3\nnav\n1\nnav\nli\n\n8\n9\n";
    let (svc, out) = run_script(script, PathBuf::from("unused.html"));

    assert!(out.contains("cannot remove the root node"));
    assert!(out.contains("tag not found: nav"));
    assert!(out.contains("Total elements: 1"));
    assert_eq!(svc.count(), 1);
}

#[test]
fn given_edit_view_and_move_script_then_state_follows() {
    let script = "\
1\nhtml\nhead\n\n\
1\nhtml\nbody\n\n\
1\nbody\ntitle\nold\n\
4\ntitle\nnew title\n\
5\ntitle\nhead\n\
3\ntitle\n\
9\n";
    let (svc, out) = run_script(script, PathBuf::from("unused.html"));

    assert!(out.contains("Content of <title>: new title"));
    let tree = svc.tree();
    let title = tree.find_by_tag("title").unwrap();
    assert_eq!(tree.parent(title), tree.find_by_tag("head"));
}

#[test]
fn given_cyclic_move_then_reported_and_tree_unchanged() {
    let script = "1\nhtml\nbody\n\n1\nbody\np\n\n5\nbody\np\n9\n";
    let (svc, out) = run_script(script, PathBuf::from("unused.html"));

    assert!(out.contains("cannot move <body> under its own descendant <p>"));
    let tree = svc.tree();
    assert_eq!(tree.parent(tree.find_by_tag("body").unwrap()), Some(tree.root()));
}

#[test]
fn given_save_choice_then_snapshot_is_written() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("dom_structure.html");
    let script = "1\nhtml\nbody\n\n7\n9\n";

    let (_, out) = run_script(script, path.clone());

    assert!(out.contains("DOM saved to file:"));
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "<html>\n  <body>\n  </body>\n</html>\n"
    );
}

#[test]
fn given_input_ends_mid_operation_then_run_returns() {
    let (svc, _) = run_script("1\nhtml\n", PathBuf::from("unused.html"));
    assert_eq!(svc.count(), 1);
}

#[test]
fn given_invalid_utf8_content_then_session_continues() {
    let mut script = b"1\nhtml\nbody\n".to_vec();
    script.extend_from_slice(&[0xff, 0xfe]);
    script.extend_from_slice(b"\n8\n9\n");

    let (svc, out) = run_bytes(&script, PathBuf::from("unused.html"));

    assert_eq!(svc.count(), 2);
    assert_eq!(svc.view("body").unwrap(), "\u{fffd}\u{fffd}");
    assert!(out.contains("Total elements: 2"));
}

#[test]
fn given_crlf_line_endings_then_tags_and_content_are_clean() {
    let (svc, _) = run_script("1\r\nhtml\r\nbody\r\nhi\r\n9\r\n", PathBuf::from("unused.html"));
    assert_eq!(svc.view("body").unwrap(), "hi");
}

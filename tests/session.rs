use std::fs;
use tiny_ide::{EditorSession, SessionError};

#[test]
fn test_open_until_capacity_then_reject() {
    let mut session = EditorSession::new(10, 1024);
    for i in 0..10 {
        assert_eq!(session.open_new_file(&format!("file{i}.c")).unwrap(), i);
    }
    assert!(session.is_full());
    session.switch_to(4);

    let err = session.open_new_file("one-too-many.c").unwrap_err();
    assert!(matches!(err, SessionError::CapacityExceeded { max: 10 }));
    assert_eq!(session.len(), 10);
    assert_eq!(session.current_index(), Some(4));
}

#[test]
fn test_save_writes_buffer_verbatim() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = EditorSession::default().with_root(dir.path());
    session.open_new_file("hello.txt").unwrap();
    let file = session.current_file_mut().unwrap();
    for ch in "hello".chars() {
        file.insert_char(ch);
    }
    assert!(file.is_modified());

    let path = session.save_current_file().unwrap();
    assert_eq!(path, dir.path().join("hello.txt"));
    assert_eq!(fs::read_to_string(&path).unwrap(), "hello");
    assert!(!session.current_file().unwrap().is_modified());
}

#[test]
fn test_save_overwrites_existing_content() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("main.c"), "a much longer previous content").unwrap();

    let mut session = EditorSession::default().with_root(dir.path());
    session.open_new_file("main.c").unwrap();
    session.current_file_mut().unwrap().insert_char('x');
    session.save_current_file().unwrap();

    assert_eq!(fs::read_to_string(dir.path().join("main.c")).unwrap(), "x");
}

#[test]
fn test_save_failure_keeps_modified() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("not-a-dir");
    let mut session = EditorSession::default().with_root(&missing);
    session.open_new_file("main.c").unwrap();
    session.current_file_mut().unwrap().insert_char('x');

    let err = session.save_current_file().unwrap_err();
    assert!(matches!(err, SessionError::Save { .. }));
    assert!(session.current_file().unwrap().is_modified());
    assert_eq!(session.current_file().unwrap().text(), "x");
}

#[test]
fn test_save_empty_buffer_creates_empty_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = EditorSession::default().with_root(dir.path());
    session.open_new_file("empty.txt").unwrap();
    session.save_current_file().unwrap();
    assert_eq!(fs::read(dir.path().join("empty.txt")).unwrap(), b"");
}

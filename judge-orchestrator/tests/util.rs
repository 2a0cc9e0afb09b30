use judge_orchestrator::util;

#[test]
fn clamp_feedback_on_missing_file_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let content = util::clamp_feedback(dir.path().join("does-not-exist.txt")).unwrap();
    assert!(content.is_empty());
}

#[test]
fn clamp_feedback_truncates_past_32767_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("huge.txt");
    std::fs::write(&path, vec![b'a'; 40_000]).unwrap();

    let content = util::clamp_feedback(&path).unwrap();
    assert_eq!(content.len(), 32767);
    assert!(content.ends_with(b"..."));
}

#[test]
fn clamp_feedback_replaces_non_ascii_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("binary.txt");
    std::fs::write(&path, [b'o', b'k', 0xff, 0x80]).unwrap();

    let content = util::clamp_feedback(&path).unwrap();
    assert_eq!(content, b"ok??");
}

#[test]
fn combined_feedback_appends_label_and_extra_file() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("judge.log");
    let extra = dir.path().join("checker.txt");
    std::fs::write(&log, b"base log\n").unwrap();
    std::fs::write(&extra, b"checker said no\n").unwrap();

    let content =
        util::combined_feedback(&log, "\nChecker Output:\n", &extra).unwrap();
    assert_eq!(
        content,
        b"base log\n\nChecker Output:\nchecker said no\n".to_vec()
    );
}

#[test]
fn enumerate_testcase_pairs_in_and_matches_lexicographically() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["2.in", "2.out", "10.in", "10.out", "1.in", "1.out"] {
        std::fs::write(dir.path().join(name), b"").unwrap();
    }

    let cases = util::enumerate_testcase(dir.path()).unwrap();
    let names: Vec<String> = cases
        .iter()
        .map(|(inp, _)| inp.file_name().unwrap().to_str().unwrap().to_owned())
        .collect();
    // Lexicographic, not numeric: "10.in" sorts before "1.in"'s sibling "2.in".
    assert_eq!(names, vec!["1.in", "10.in", "2.in"]);
}

#[test]
fn enumerate_testcase_ignores_files_without_an_in_suffix() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("1.in"), b"").unwrap();
    std::fs::write(dir.path().join("1.out"), b"").unwrap();
    std::fs::write(dir.path().join("README.md"), b"").unwrap();

    let cases = util::enumerate_testcase(dir.path()).unwrap();
    assert_eq!(cases.len(), 1);
}

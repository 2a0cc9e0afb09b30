//! Checker `exec` template expansion (spec.md §4.8): named
//! placeholders substitute independently within each argv word.

use judge_orchestrator::language::expand;

#[test]
fn substitutes_each_named_placeholder() {
    let template = vec![
        "./checker".to_string(),
        "{input}".to_string(),
        "{judge}".to_string(),
        "{contestant}".to_string(),
    ];
    let got = expand(
        &template,
        &[
            ("input", "input.txt"),
            ("judge", "judge.txt"),
            ("contestant", "contestant.txt"),
        ],
    );
    assert_eq!(
        got,
        vec!["./checker", "input.txt", "judge.txt", "contestant.txt"]
    );
}

#[test]
fn leaves_words_without_placeholders_untouched() {
    let template = vec!["./a.out".to_string()];
    let got = expand(&template, &[("input", "input.txt")]);
    assert_eq!(got, vec!["./a.out"]);
}

#[test]
fn substitutes_multiple_placeholders_within_one_word() {
    let template = vec!["{input}-vs-{contestant}".to_string()];
    let got = expand(
        &template,
        &[("input", "in.txt"), ("contestant", "out.txt")],
    );
    assert_eq!(got, vec!["in.txt-vs-out.txt"]);
}

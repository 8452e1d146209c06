use assert_cmd::Command;

#[test]
fn list_intervals_prints_catalog() {
    let output = Command::cargo_bin("tartini")
        .unwrap()
        .arg("--list-intervals")
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.lines().count(), 32);
    assert!(stdout.contains("Perfect fifth"));
    assert!(stdout.contains("Octave + Perfect fifth"));
    assert!(stdout.contains("9:5"));
    assert!(stdout.contains(" 115"));
}

#[test]
fn help_mentions_selection_flag() {
    let output = Command::cargo_bin("tartini")
        .unwrap()
        .arg("--help")
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--select"));
    assert!(stdout.contains("--list-intervals"));
}

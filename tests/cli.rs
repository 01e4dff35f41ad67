use assert_cmd::Command;
use predicates::str::contains;
use std::fs;
use tempfile::TempDir;

fn cmd() -> Command {
    Command::cargo_bin("iron-gate").unwrap()
}

#[test]
fn check_inline_json_danger() {
    let out = cmd()
        .args([
            "check",
            "--male-genotype",
            "AS",
            "--female-genotype",
            "as",
            "--json",
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value = serde_json::from_slice(&out).expect("valid json output");
    assert_eq!(json["status"], "danger");
    assert_eq!(json["can_unblur_photos"], false);
}

#[test]
fn check_rhesus_caution() {
    cmd()
        .args([
            "check",
            "--male-genotype",
            "AA",
            "--male-rhesus",
            "A POS",
            "--female-genotype",
            "AA",
            "--female-rhesus",
            "O NEG",
        ])
        .assert()
        .success()
        .stdout(contains("CAUTION"))
        .stdout(contains("Rhesus Incompatibility"));
}

#[test]
fn check_rejects_unknown_genotype() {
    cmd()
        .args(["check", "--male-genotype", "XY"])
        .assert()
        .failure()
        .stderr(contains("invalid genotype"));
}

#[test]
fn check_request_file() {
    let tmp = TempDir::new().expect("create temp dir");
    let request = tmp.path().join("request.json");
    fs::write(
        &request,
        r#"{"male_profile": {"genotype": "AA"}, "female_profile": {"genotype": "SS"}}"#,
    )
    .expect("write request");

    cmd()
        .arg("check")
        .arg("--request")
        .arg(&request)
        .arg("--json")
        .assert()
        .success()
        .stdout(contains("\"safe\""))
        .stdout(contains("Genotype compatibility: Safe."));
}

#[test]
fn scan_report_file() {
    let tmp = TempDir::new().expect("create temp dir");
    let report = tmp.path().join("lab.txt");
    fs::write(&report, "Hb genotype: SC\nBlood group: AB NEG\n").expect("write report");

    cmd()
        .arg("scan")
        .arg(&report)
        .assert()
        .success()
        .stdout(contains("SC"))
        .stdout(contains("AB-"));
}

#[test]
fn screen_writes_reports() {
    let tmp = TempDir::new().expect("create temp dir");
    let subject = tmp.path().join("subject.json");
    fs::write(&subject, r#"{"genotype": "AA", "rhesus_factor": "O NEG"}"#).expect("write subject");

    let candidates = tmp.path().join("candidates");
    fs::create_dir(&candidates).expect("create candidates dir");
    fs::write(candidates.join("one.json"), r#"{"genotype": "AS", "rhesus_factor": "A POS"}"#)
        .expect("write candidate");

    let output = tmp.path().join("out");
    cmd()
        .arg("screen")
        .arg("--profile")
        .arg(&subject)
        .args(["--role", "maternal", "--format", "json", "--threads", "1"])
        .arg("--candidates")
        .arg(&candidates)
        .arg("--output")
        .arg(&output)
        .assert()
        .success()
        .stdout(contains("1 caution"));

    let reports: Vec<_> = fs::read_dir(&output).expect("output dir").collect();
    assert_eq!(reports.len(), 1);
}

#[test]
fn genotypes_lists_vocabulary() {
    cmd()
        .arg("genotypes")
        .assert()
        .success()
        .stdout(contains("SC"))
        .stdout(contains("AB-"));
}

#[test]
fn check_request_file_prints_json_without_flag() {
    let tmp = TempDir::new().expect("create temp dir");
    let request = tmp.path().join("request.json");
    fs::write(
        &request,
        r#"{"male_profile": {"genotype": "AS"}, "female_profile": {"genotype": "SS"}}"#,
    )
    .expect("write request");

    let output = cmd()
        .arg("check")
        .arg("--request")
        .arg(&request)
        .output()
        .expect("run check");
    assert!(output.status.success());

    let response: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout is a JSON document");
    assert_eq!(response["status"], "danger");
    assert_eq!(response["can_unblur_photos"], false);
    assert!(response["messages"][0]
        .as_str()
        .unwrap_or_default()
        .contains("(AS + SS)"));
}

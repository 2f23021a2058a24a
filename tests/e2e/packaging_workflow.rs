//! E2E Scenario: pack, clean, sign and install an extension
//!
//! Drives the binary against a project whose signing tool is a shell script,
//! covering the default chain, fail-fast behavior and step ordering.

use super::fixture::{archive_entries, E2EFixture};

const KEY: &str = "user:12345";
const SECRET: &str = "0f1e2d3c4b5a";

fn populate_sources(fixture: &E2EFixture) {
    fixture.create_source("install.rdf", "<RDF:RDF/>\n");
    fixture.create_source("chrome.manifest", "content cssxfire content/\n");
    fixture.create_source("content/cssxfire.js", "var CssXFire = {};\n");
}

#[test]
fn test_default_chain_installs_signed_artifact() {
    let mut fixture = E2EFixture::new("default_chain");
    populate_sources(&fixture);
    let stale = fixture.create_dist_file("css_x_fire-0.9-fx.xpi", "stale");

    fixture.log_step("Run default task");
    let output = fixture.run_extpack(&[], Some((KEY, SECRET)));
    fixture.assert_success(&output, "default task");
    fixture.checkpoint("post_run");

    fixture.log_step("Verify archive contents");
    let entries = archive_entries(&fixture.unsigned_archive());
    for name in ["install.rdf", "chrome.manifest", "content/", "content/cssxfire.js"] {
        assert!(entries.contains(&name.to_string()), "missing entry {name}: {entries:?}");
    }

    fixture.log_step("Verify clean, sign and install");
    assert!(!stale.exists(), "stale artifact survived clean");
    assert_eq!(
        fixture.signer_invocation().as_deref(),
        Some(format!("sign --api-key {KEY} --api-secret {SECRET} --xpi cssxfire_unsigned.xpi").as_str())
    );
    assert_eq!(
        std::fs::read(&fixture.destination).unwrap(),
        std::fs::read(fixture.signed_artifact()).unwrap()
    );

    fixture.log_step("Verify credentials never reach the output");
    fixture.assert_output_contains(&output, "Signed cssxfire_unsigned.xpi for ***");
    fixture.assert_output_not_contains(&output, KEY);
    fixture.assert_output_not_contains(&output, SECRET);

    fixture.generate_report();
}

#[test]
fn test_default_chain_is_repeatable() {
    let mut fixture = E2EFixture::new("repeatable_chain");
    populate_sources(&fixture);

    fixture.log_step("First run");
    let output = fixture.run_extpack(&[], Some((KEY, SECRET)));
    fixture.assert_success(&output, "first run");

    fixture.log_step("Change a source file and run again");
    fixture.create_source("content/cssxfire.js", "var CssXFire = { version: 2 };\n");
    let output = fixture.run_extpack(&[], Some((KEY, SECRET)));
    fixture.assert_success(&output, "second run");
    fixture.checkpoint("post_second_run");

    let installed = std::fs::read(&fixture.destination).unwrap();
    assert_eq!(installed, std::fs::read(fixture.unsigned_archive()).unwrap());

    fixture.generate_report();
}

#[test]
fn test_signer_failure_stops_chain_with_its_exit_code() {
    let mut fixture = E2EFixture::with_signer_exit("signer_failure", 3);
    populate_sources(&fixture);

    fixture.log_step("Run default task with a rejecting signer");
    let output = fixture.run_extpack(&[], Some((KEY, SECRET)));
    assert!(!output.success);
    assert_eq!(output.exit_code, 3);
    fixture.assert_output_contains(&output, "sign failed");
    fixture.assert_output_contains(&output, "Server rejected the key");
    fixture.checkpoint("post_failure");

    fixture.log_step("Verify install never ran");
    assert!(fixture.unsigned_archive().exists(), "pack should have run");
    assert!(!fixture.signed_artifact().exists());
    assert!(!fixture.destination.exists(), "install ran after a failed sign");

    fixture.generate_report();
}

#[test]
fn test_missing_credentials_never_invoke_signer() {
    let mut fixture = E2EFixture::new("missing_credentials");
    populate_sources(&fixture);

    fixture.log_step("Run default task without credentials");
    let output = fixture.run_extpack(&[], None);
    assert!(!output.success);
    assert_eq!(output.exit_code, 1);
    fixture.assert_output_contains(&output, "API_KEY");

    assert!(fixture.unsigned_archive().exists());
    assert!(fixture.signer_invocation().is_none(), "signer was invoked");
    assert!(!fixture.destination.exists());

    fixture.generate_report();
}

#[test]
fn test_requested_steps_run_in_canonical_order() {
    let mut fixture = E2EFixture::new("canonical_order");
    populate_sources(&fixture);

    fixture.log_step("Request install before pack");
    let output = fixture.run_extpack(&["run", "install", "pack"], None);
    fixture.checkpoint("post_run");

    // pack runs first; install then finds no signed artifact.
    assert!(!output.success);
    fixture.assert_output_contains(&output, "install failed");
    fixture.assert_output_contains(&output, "No such file");
    assert!(fixture.unsigned_archive().exists(), "pack did not run before install");
    assert!(fixture.signer_invocation().is_none());

    fixture.generate_report();
}

#[test]
fn test_machine_report_lists_steps() {
    let mut fixture = E2EFixture::new("machine_report");
    populate_sources(&fixture);

    fixture.log_step("Run default task in machine mode");
    let output = fixture.run_extpack(&["-m"], Some((KEY, SECRET)));
    fixture.assert_success(&output, "machine run");

    let json = output.json();
    assert_eq!(json["status"], "ok");
    let steps: Vec<&str> = json["data"]["steps"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["step"].as_str().unwrap())
        .collect();
    assert_eq!(steps, ["pack", "clean", "sign", "install"]);
    assert_eq!(json["data"]["steps"][0]["files"].as_array().unwrap().len(), 3);
    assert!(!output.stdout.contains(SECRET));

    fixture.generate_report();
}

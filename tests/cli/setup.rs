use linksmith::core::manifest::{Element, Manifest};
use linksmith::core::project::{Project, SettingsFile};
use linksmith::core::property_list::{associated_domains, PropertyDocument};
use plist::Value;

use crate::support::assertions::*;
use crate::support::fixtures::*;
use crate::support::Test;

fn info_plist(t: &Test) -> PropertyDocument {
    PropertyDocument::load(t.file(INFO_PLIST_PATH)).unwrap()
}

fn entitlements(t: &Test) -> Vec<String> {
    PropertyDocument::load(t.file(ENTITLEMENTS_PATH))
        .unwrap()
        .string_array("com.apple.developer.associated-domains")
}

fn routing_filters(manifest: &mut Manifest) -> Vec<Element> {
    let activity = manifest
        .select_activity(&Default::default())
        .unwrap();
    activity
        .children_named("intent-filter")
        .filter(|f| f.attr("android:autoVerify") == Some("true"))
        .cloned()
        .collect()
}

#[test]
fn test_setup_ios_writes_keys_domains_and_scheme() {
    let t = Test::new();
    t.ios_project();

    let output = t.setup(&[
        "-p",
        "project.toml",
        "--app-link-subdomain",
        "myapp",
        "--uri-scheme",
        "myapp",
    ]);
    assert_success(&output);
    assert_stdout_contains(&output, "created entitlements");
    assert_stdout_contains(&output, "link configuration complete");

    let doc = info_plist(&t);
    assert_eq!(
        doc.get("branch_key").and_then(Value::as_string),
        Some(LIVE_KEY)
    );
    assert_eq!(
        doc.string_array("branch_universal_link_domains"),
        ["myapp.app.link", "myapp-alternate.app.link"]
    );
    assert_eq!(
        doc.get("CFBundleName").and_then(Value::as_string),
        Some("MyApp")
    );
    let schemes: Vec<&str> = doc
        .get("CFBundleURLTypes")
        .and_then(Value::as_array)
        .and_then(|types| types.first())
        .and_then(Value::as_dictionary)
        .and_then(|entry| entry.get("CFBundleURLSchemes"))
        .and_then(Value::as_array)
        .map(|schemes| schemes.iter().filter_map(Value::as_string).collect())
        .unwrap_or_default();
    assert_eq!(schemes, ["myapp"]);

    assert_eq!(
        entitlements(&t),
        ["applinks:myapp.app.link", "applinks:myapp-alternate.app.link"]
    );

    let project = SettingsFile::load(t.file("project.toml")).unwrap();
    assert_eq!(
        project
            .build_setting("MyApp", "CODE_SIGN_ENTITLEMENTS", "Release")
            .unwrap()
            .as_deref(),
        Some(ENTITLEMENTS_PATH)
    );
    assert!(project
        .files()
        .iter()
        .any(|f| f.to_string_lossy() == ENTITLEMENTS_PATH));
}

#[test]
fn test_setup_ios_twice_is_stable() {
    let t = Test::new();
    t.ios_project();
    let args = [
        "-p",
        "project.toml",
        "-D",
        "example.com",
        "--uri-scheme",
        "myapp",
    ];

    assert_success(&t.setup(&args));
    let plist_once = t.read(INFO_PLIST_PATH);
    let entitlements_once = t.read(ENTITLEMENTS_PATH);
    let project_once = t.read("project.toml");

    let output = t.setup(&args);
    assert_success(&output);
    assert_stdout_excludes(&output, "created entitlements");
    assert_eq!(t.read(INFO_PLIST_PATH), plist_once);
    assert_eq!(t.read(ENTITLEMENTS_PATH), entitlements_once);
    assert_eq!(t.read("project.toml"), project_once);
}

#[test]
fn test_setup_both_keys_writes_dictionary() {
    let t = Test::new();
    t.ios_project();
    let output = t.setup(&[
        "--test-key",
        TEST_KEY,
        "-p",
        "project.toml",
        "-D",
        "example.com",
    ]);
    assert_success(&output);

    let doc = info_plist(&t);
    let keys = doc
        .get("branch_key")
        .and_then(Value::as_dictionary)
        .unwrap();
    assert_eq!(keys.get("live").and_then(Value::as_string), Some(LIVE_KEY));
    assert_eq!(keys.get("test").and_then(Value::as_string), Some(TEST_KEY));
}

#[test]
fn test_setup_merges_existing_entitlements() {
    let t = Test::new();
    t.ios_project().entitlements(&["old.example.com"]);

    assert_success(&t.setup(&["-p", "project.toml", "-D", "new.example.com"]));
    assert_eq!(
        entitlements(&t),
        ["applinks:old.example.com", "applinks:new.example.com"]
    );
}

#[test]
fn test_setup_remove_existing_replaces_entitlements() {
    let t = Test::new();
    t.ios_project().entitlements(&["old.example.com"]);

    assert_success(&t.setup(&[
        "-p",
        "project.toml",
        "-D",
        "new.example.com",
        "--remove-existing",
    ]));
    let doc = PropertyDocument::load(t.file(ENTITLEMENTS_PATH)).unwrap();
    assert_eq!(associated_domains(&doc), ["new.example.com"]);
}

#[test]
fn test_setup_android_adds_keys_and_intent_filter() {
    let t = Test::new();
    t.android_project();

    let output = t.setup(&[
        "--android-manifest",
        "android",
        "-D",
        "example.com",
        "--uri-scheme",
        "myapp",
    ]);
    assert_success(&output);
    assert_stdout_contains(&output, "intent filter added to .MainActivity");

    let mut manifest = Manifest::load(t.file(ANDROID_MANIFEST_PATH)).unwrap();
    assert_eq!(
        manifest.metadata("io.branch.sdk.BranchKey"),
        Some(LIVE_KEY)
    );

    let filters = routing_filters(&mut manifest);
    assert_eq!(filters.len(), 1);
    let data: Vec<(Option<&str>, Option<&str>)> = filters[0]
        .children_named("data")
        .map(|d| (d.attr("android:scheme"), d.attr("android:host")))
        .collect();
    assert_eq!(
        data,
        [
            (Some("https"), Some("example.com")),
            (Some("myapp"), Some("open"))
        ]
    );
    let categories: Vec<&str> = filters[0]
        .children_named("category")
        .filter_map(|c| c.attr("android:name"))
        .collect();
    assert_eq!(
        categories,
        [
            "android.intent.category.DEFAULT",
            "android.intent.category.BROWSABLE"
        ]
    );
}

#[test]
fn test_setup_android_remove_existing_keeps_one_filter() {
    let t = Test::new();
    t.android_project();
    let args = [
        "--android-manifest",
        "android",
        "-D",
        "example.com",
        "--remove-existing",
    ];

    assert_success(&t.setup(&args));
    assert_success(&t.setup(&args));

    let mut manifest = Manifest::load(t.file(ANDROID_MANIFEST_PATH)).unwrap();
    assert_eq!(routing_filters(&mut manifest).len(), 1);

    // The launcher filter carries no data element and survives.
    let activity = manifest.select_activity(&Default::default()).unwrap();
    assert_eq!(activity.children_named("intent-filter").count(), 2);
}

#[test]
fn test_setup_android_without_remove_existing_accumulates() {
    let t = Test::new();
    t.android_project();
    let args = ["--android-manifest", "android", "-D", "example.com"];

    assert_success(&t.setup(&args));
    assert_success(&t.setup(&args));

    let mut manifest = Manifest::load(t.file(ANDROID_MANIFEST_PATH)).unwrap();
    assert_eq!(routing_filters(&mut manifest).len(), 2);
    assert_eq!(
        manifest
            .application()
            .unwrap()
            .children_named("meta-data")
            .count(),
        1
    );
}

#[test]
fn test_setup_android_named_activity() {
    let t = Test::new();
    t.android_project();
    let output = t.setup(&[
        "--android-manifest",
        t.file(ANDROID_MANIFEST_PATH).to_str().unwrap(),
        "-D",
        "example.com",
        "--activity",
        ".SettingsActivity",
    ]);
    assert_success(&output);
    assert_stdout_contains(&output, "intent filter added to .SettingsActivity");
}

#[test]
fn test_setup_reads_config_file() {
    let t = Test::new();
    t.ios_project().android_project().config(
        r#"
app_link_subdomain = "myapp"
project = "project.toml"
android_manifest = "android"
"#,
    );

    assert_success(&t.setup(&[]));
    assert_eq!(
        entitlements(&t),
        ["applinks:myapp.app.link", "applinks:myapp-alternate.app.link"]
    );
    let manifest = Manifest::load(t.file(ANDROID_MANIFEST_PATH)).unwrap();
    assert_eq!(
        manifest.metadata("io.branch.sdk.BranchKey"),
        Some(LIVE_KEY)
    );
}

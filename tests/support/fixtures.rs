//! Test fixtures.

pub const LIVE_KEY: &str = "key_live_abc123";
pub const TEST_KEY: &str = "key_test_abc123";

pub const INFO_PLIST_PATH: &str = "MyApp/Info.plist";
pub const ENTITLEMENTS_PATH: &str = "MyApp/MyApp.entitlements";
pub const ANDROID_MANIFEST_PATH: &str = "android/app/src/main/AndroidManifest.xml";

pub const PROJECT_TOML: &str = r#"files = ["MyApp/Info.plist"]

[[targets]]
name = "MyAppTests"
kind = "unit-test"

[[targets]]
name = "MyApp"

[targets.settings]
INFOPLIST_FILE = "MyApp/Info.plist"
DEVELOPMENT_TEAM = "TEAM123"
PRODUCT_BUNDLE_IDENTIFIER = "com.example.MyApp"
"#;

pub const PLIST_HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
"#;

pub const INFO_PLIST: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
    <key>CFBundleName</key>
    <string>MyApp</string>
</dict>
</plist>
"#;

pub const MANIFEST: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<manifest xmlns:android="http://schemas.android.com/apk/res/android" package="com.example.myapp">
    <application android:label="MyApp">
        <activity android:name=".SettingsActivity"/>
        <activity android:name=".MainActivity" android:launchMode="singleTask">
            <intent-filter>
                <action android:name="android.intent.action.MAIN"/>
                <category android:name="android.intent.category.LAUNCHER"/>
            </intent-filter>
        </activity>
    </application>
</manifest>
"#;

/// An unsigned association file listing `app_ids`.
pub fn association_file(app_ids: &[&str]) -> String {
    let details: Vec<String> = app_ids
        .iter()
        .map(|id| format!(r#"{{"appID": "{id}", "paths": ["*"]}}"#))
        .collect();
    format!(
        r#"{{"applinks": {{"apps": [], "details": [{}]}}}}"#,
        details.join(", ")
    )
}

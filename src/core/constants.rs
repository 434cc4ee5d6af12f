//! Constants used throughout linksmith.
//!
//! Centralizes well-known keys, paths and hosts.

/// Configuration file name (.linksmith.toml).
pub const CONFIG_FILE: &str = ".linksmith.toml";

/// Default build configuration.
pub const RELEASE_CONFIGURATION: &str = "Release";

/// Candidate association file paths, tried in order.
pub const ASSOCIATION_PATHS: &[&str] = &[
    "/.well-known/apple-app-site-association",
    "/apple-app-site-association",
];

/// Content type marking a signed (CMS/PKCS#7) association file.
pub const SIGNED_CONTENT_TYPE: &str = "application/pkcs7-mime";

/// Prefix marking a Universal Link entry in the associated domains list.
pub const APPLINKS: &str = "applinks";

/// Entitlements key holding the associated domains list.
pub const ASSOCIATED_DOMAINS: &str = "com.apple.developer.associated-domains";

/// Info.plist key holding the SDK key(s).
pub const BRANCH_KEY: &str = "branch_key";

/// Info.plist key listing the Universal Link domains for the SDK.
pub const LINK_DOMAINS_KEY: &str = "branch_universal_link_domains";

/// Info.plist keys for custom URI schemes.
pub const URL_TYPES: &str = "CFBundleURLTypes";
pub const URL_SCHEMES: &str = "CFBundleURLSchemes";

/// Build setting names.
pub const CODE_SIGN_ENTITLEMENTS: &str = "CODE_SIGN_ENTITLEMENTS";
pub const DEVELOPMENT_TEAM: &str = "DEVELOPMENT_TEAM";
pub const INFOPLIST_FILE: &str = "INFOPLIST_FILE";
pub const PRODUCT_BUNDLE_IDENTIFIER: &str = "PRODUCT_BUNDLE_IDENTIFIER";

/// Generated link domain suffixes.
pub const LIVE_LINK_SUFFIX: &str = "app.link";
pub const TEST_LINK_SUFFIX: &str = "test-app.link";

/// Android metadata keys for the live and test SDK keys.
pub const ANDROID_LIVE_KEY: &str = "io.branch.sdk.BranchKey";
pub const ANDROID_TEST_KEY: &str = "io.branch.sdk.BranchKey.test";

/// Host used for custom URI scheme data elements.
pub const URI_SCHEME_HOST: &str = "open";

/// Default Android manifest location relative to the Android project.
pub const ANDROID_MANIFEST_PATH: &str = "app/src/main/AndroidManifest.xml";

//! Android manifest mutation.
//!
//! SDK key metadata under `<application>`, activity selection, and
//! intent-filter routing for App Links and a custom URI scheme.

mod xml;

pub use xml::{Declaration, Document, Element, Node};

use std::fmt;
use std::path::Path;

use tracing::debug;

use crate::core::constants::{ANDROID_LIVE_KEY, ANDROID_TEST_KEY, URI_SCHEME_HOST};
use crate::core::domains::Credentials;
use crate::core::store::write_atomic;
use crate::core::types::Domain;
use crate::error::{ConfigError, DocumentError, ManifestError, Result};

const ANDROID_NAME: &str = "android:name";
const ANDROID_VALUE: &str = "android:value";
const ANDROID_SCHEME: &str = "android:scheme";
const ANDROID_HOST: &str = "android:host";
const ANDROID_LAUNCH_MODE: &str = "android:launchMode";
const ANDROID_AUTO_VERIFY: &str = "android:autoVerify";

const ACTION_VIEW: &str = "android.intent.action.VIEW";
const CATEGORY_DEFAULT: &str = "android.intent.category.DEFAULT";
const CATEGORY_BROWSABLE: &str = "android.intent.category.BROWSABLE";

/// How to choose the activity that receives links.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ActivitySelector {
    /// The activity whose `android:name` equals this value.
    Named(String),
    /// The first `singleTask` activity, else the first activity.
    #[default]
    PreferSingleTask,
}

impl ActivitySelector {
    pub fn from_name(name: Option<&str>) -> Self {
        name.map_or(Self::PreferSingleTask, |n| Self::Named(n.to_string()))
    }
}

impl fmt::Display for ActivitySelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => write!(f, "named {name}"),
            Self::PreferSingleTask => write!(f, "prefer singleTask"),
        }
    }
}

/// A parsed `AndroidManifest.xml`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    document: Document,
}

impl Manifest {
    /// Load a manifest file.
    ///
    /// # Errors
    ///
    /// Returns `DocumentError::NotFound` if the file is missing, or
    /// `ManifestError::Parse` for malformed XML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading manifest");
        if !path.exists() {
            return Err(DocumentError::NotFound(path.to_path_buf()).into());
        }
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// # Errors
    ///
    /// Returns `ManifestError::Parse` for malformed XML.
    pub fn parse(text: &str) -> Result<Self> {
        Ok(Self {
            document: Document::parse(text)?,
        })
    }

    /// # Errors
    ///
    /// Returns `ManifestError::Write` if serialization fails.
    pub fn to_xml(&self) -> Result<String> {
        self.document.to_xml()
    }

    /// Write the manifest atomically.
    ///
    /// # Errors
    ///
    /// Returns `ManifestError::Write` if serialization or the write fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        debug!(path = %path.display(), "saving manifest");
        let xml = self.to_xml()?;
        write_atomic(path, xml.as_bytes()).map_err(|e| ManifestError::Write(e.to_string()))?;
        Ok(())
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// The `<application>` element.
    ///
    /// # Errors
    ///
    /// Returns `ManifestError::ApplicationNotFound`.
    pub fn application(&self) -> Result<&Element> {
        self.document
            .root
            .child("application")
            .ok_or_else(|| ManifestError::ApplicationNotFound.into())
    }

    fn application_mut(&mut self) -> Result<&mut Element> {
        self.document
            .root
            .child_mut("application")
            .ok_or_else(|| ManifestError::ApplicationNotFound.into())
    }

    /// Value of a `<meta-data>` entry under `<application>`.
    pub fn metadata(&self, key: &str) -> Option<&str> {
        self.application()
            .ok()?
            .children_named("meta-data")
            .find(|e| e.attr(ANDROID_NAME) == Some(key))
            .and_then(|e| e.attr(ANDROID_VALUE))
    }

    /// Insert or overwrite a `<meta-data>` entry under `<application>`.
    ///
    /// # Errors
    ///
    /// Returns `ManifestError::ApplicationNotFound`.
    pub fn upsert_metadata(&mut self, key: &str, value: &str) -> Result<()> {
        let application = self.application_mut()?;
        let existing = application
            .elements_mut()
            .find(|e| e.name == "meta-data" && e.attr(ANDROID_NAME) == Some(key));

        match existing {
            Some(element) => {
                debug!(key, "updating metadata");
                element.set_attr(ANDROID_VALUE, value);
            }
            None => {
                debug!(key, "adding metadata");
                application.push(
                    Element::new("meta-data")
                        .with_attr(ANDROID_NAME, key)
                        .with_attr(ANDROID_VALUE, value),
                );
            }
        }
        Ok(())
    }

    /// Write the live and/or test SDK key metadata.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` when no key is given, or
    /// `ManifestError::ApplicationNotFound`.
    pub fn add_keys(&mut self, credentials: &Credentials) -> Result<()> {
        if credentials.is_empty() {
            return Err(ConfigError::Missing("live_key or test_key").into());
        }
        if let Some(live) = &credentials.live {
            self.upsert_metadata(ANDROID_LIVE_KEY, live)?;
        }
        if let Some(test) = &credentials.test {
            self.upsert_metadata(ANDROID_TEST_KEY, test)?;
        }
        Ok(())
    }

    /// Locate the activity that receives links.
    ///
    /// # Errors
    ///
    /// Returns `ManifestError::NamedActivityNotFound` for an unknown name,
    /// `ManifestError::ActivityNotFound` when the manifest has no activity,
    /// or `ManifestError::ApplicationNotFound`.
    pub fn select_activity(&mut self, selector: &ActivitySelector) -> Result<&mut Element> {
        let application = self.application_mut()?;
        let activities: Vec<&Element> = application.children_named("activity").collect();

        let index = match selector {
            ActivitySelector::Named(name) => activities
                .iter()
                .position(|a| a.attr(ANDROID_NAME) == Some(name.as_str()))
                .ok_or_else(|| ManifestError::NamedActivityNotFound(name.clone()))?,
            ActivitySelector::PreferSingleTask => {
                if activities.is_empty() {
                    return Err(ManifestError::ActivityNotFound.into());
                }
                activities
                    .iter()
                    .position(|a| a.attr(ANDROID_LAUNCH_MODE) == Some("singleTask"))
                    .unwrap_or(0)
            }
        };

        let activity = application
            .elements_mut()
            .filter(|e| e.name == "activity")
            .nth(index)
            .ok_or(ManifestError::ActivityNotFound)?;
        debug!(
            activity = activity.attr(ANDROID_NAME).unwrap_or_default(),
            strategy = %selector,
            "selected activity"
        );
        Ok(activity)
    }
}

fn carries_scheme(filter: &Element) -> bool {
    filter
        .children_named("data")
        .any(|data| data.attr(ANDROID_SCHEME).is_some())
}

/// Add an auto-verified intent filter routing `domains` (HTTPS) and an
/// optional custom scheme to `activity`.
///
/// With `remove_existing`, every intent filter carrying a scheme-bearing
/// `<data>` element is removed first. Without it, repeated runs add another
/// filter each time.
pub fn install_intent_routing(
    activity: &mut Element,
    domains: &[Domain],
    uri_scheme: Option<&str>,
    remove_existing: bool,
) {
    if remove_existing {
        let before = activity.children_named("intent-filter").count();
        activity.retain_elements(|e| !(e.name == "intent-filter" && carries_scheme(e)));
        let removed = before - activity.children_named("intent-filter").count();
        debug!(removed, "removed existing intent filters");
    }

    let mut filter = Element::new("intent-filter").with_attr(ANDROID_AUTO_VERIFY, "true");
    filter.push(Element::new("action").with_attr(ANDROID_NAME, ACTION_VIEW));
    filter.push(Element::new("category").with_attr(ANDROID_NAME, CATEGORY_DEFAULT));
    filter.push(Element::new("category").with_attr(ANDROID_NAME, CATEGORY_BROWSABLE));
    for domain in domains {
        filter.push(
            Element::new("data")
                .with_attr(ANDROID_SCHEME, "https")
                .with_attr(ANDROID_HOST, domain),
        );
    }
    if let Some(scheme) = uri_scheme {
        filter.push(
            Element::new("data")
                .with_attr(ANDROID_SCHEME, scheme)
                .with_attr(ANDROID_HOST, URI_SCHEME_HOST),
        );
    }

    debug!(domains = domains.len(), uri_scheme, "adding intent filter");
    activity.push(filter);
}

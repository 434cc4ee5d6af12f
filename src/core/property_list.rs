//! Property-list documents: Info.plist and entitlements.
//!
//! [`PropertyDocument`] wraps the root dictionary of a plist file. The
//! mutation functions work on a loaded document; [`write_keys`] and
//! [`merge_associated_domains`] also locate the document through the project
//! model and edit it under the [`DocumentStore`] lock.

use std::path::{Path, PathBuf};

use plist::{Dictionary, Value};
use tracing::{debug, info};

use crate::core::constants::{
    APPLINKS, ASSOCIATED_DOMAINS, BRANCH_KEY, CODE_SIGN_ENTITLEMENTS, INFOPLIST_FILE,
    LINK_DOMAINS_KEY, URL_SCHEMES, URL_TYPES,
};
use crate::core::domains::Credentials;
use crate::core::project::{require_setting, resolve_path_setting, Project};
use crate::core::store::{write_atomic, DocumentStore, IfMissing};
use crate::core::types::Domain;
use crate::error::{ConfigError, DocumentError, Result};

/// A plist document with a dictionary root.
#[derive(Debug, Clone)]
pub struct PropertyDocument {
    path: PathBuf,
    root: Dictionary,
}

impl PropertyDocument {
    /// Load a plist file (XML or binary).
    ///
    /// # Errors
    ///
    /// Returns `DocumentError::NotFound`, `DocumentError::Parse`, or
    /// `DocumentError::InvalidShape` when the root is not a dictionary.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading property list");

        if !path.exists() {
            return Err(DocumentError::NotFound(path.to_path_buf()).into());
        }
        let value = Value::from_file(path).map_err(|e| DocumentError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let root = value
            .into_dictionary()
            .ok_or_else(|| DocumentError::InvalidShape {
                path: path.to_path_buf(),
                reason: "root element is not a dictionary".to_string(),
            })?;

        Ok(Self {
            path: path.to_path_buf(),
            root,
        })
    }

    /// A new document with an empty root dictionary.
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            root: Dictionary::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn root(&self) -> &Dictionary {
        &self.root
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.root.get(key)
    }

    /// Overwrite a top-level key.
    pub fn insert(&mut self, key: &str, value: Value) {
        self.root.insert(key.to_string(), value);
    }

    /// String elements of a top-level array. Missing keys and non-string
    /// elements are ignored.
    pub fn string_array(&self, key: &str) -> Vec<String> {
        self.root
            .get(key)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_string)
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Write the document as an XML plist, atomically.
    ///
    /// # Errors
    ///
    /// Returns `DocumentError::Write` when serialization or the write fails.
    pub fn save(&self) -> Result<()> {
        debug!(path = %self.path.display(), "saving property list");
        let write_error = |reason: String| DocumentError::Write {
            path: self.path.clone(),
            reason,
        };

        let mut buf = Vec::new();
        Value::Dictionary(self.root.clone())
            .to_writer_xml(&mut buf)
            .map_err(|e| write_error(e.to_string()))?;
        buf.push(b'\n');
        write_atomic(&self.path, &buf).map_err(|e| write_error(e.to_string()))?;
        Ok(())
    }
}

fn string_values<'a>(items: impl IntoIterator<Item = &'a String>) -> Value {
    Value::Array(items.into_iter().cloned().map(Value::String).collect())
}

/// Write the SDK key(s).
///
/// A single key is stored as a string; both keys as a `{live, test}`
/// dictionary. The existing value is always replaced.
///
/// # Errors
///
/// Returns `ConfigError::Missing` when no key is given.
pub fn set_keys(doc: &mut PropertyDocument, credentials: &Credentials) -> Result<()> {
    let value = match (&credentials.live, &credentials.test) {
        (Some(live), Some(test)) => {
            let mut keys = Dictionary::new();
            keys.insert("live".to_string(), Value::String(live.clone()));
            keys.insert("test".to_string(), Value::String(test.clone()));
            Value::Dictionary(keys)
        }
        (Some(key), None) | (None, Some(key)) => Value::String(key.clone()),
        (None, None) => return Err(ConfigError::Missing("live_key or test_key").into()),
    };
    debug!(path = %doc.path().display(), keys = credentials.count(), "writing SDK keys");
    doc.insert(BRANCH_KEY, value);
    Ok(())
}

/// Write the link domain list read by the SDK at runtime.
pub fn set_link_domains(doc: &mut PropertyDocument, domains: &[Domain]) {
    doc.insert(LINK_DOMAINS_KEY, string_values(domains));
}

/// Register a custom URI scheme under `CFBundleURLTypes`.
///
/// Appends to the first URL type's schemes, creating the structure when
/// absent. Returns `false` if any URL type already lists the scheme.
///
/// # Errors
///
/// Returns `DocumentError::InvalidShape` when `CFBundleURLTypes` is not an
/// array of dictionaries.
pub fn add_uri_scheme(doc: &mut PropertyDocument, scheme: &str) -> Result<bool> {
    let path = doc.path.clone();
    let shape_error = |reason: &str| DocumentError::InvalidShape {
        path: path.clone(),
        reason: reason.to_string(),
    };

    if !doc.root.contains_key(URL_TYPES) {
        doc.root.insert(URL_TYPES.to_string(), Value::Array(Vec::new()));
    }
    let types = doc
        .root
        .get_mut(URL_TYPES)
        .and_then(Value::as_array_mut)
        .ok_or_else(|| shape_error("CFBundleURLTypes is not an array"))?;

    let mut first: Option<&mut Dictionary> = None;
    for url_type in types.iter_mut() {
        let entry = url_type
            .as_dictionary_mut()
            .ok_or_else(|| shape_error("CFBundleURLTypes contains a non-dictionary entry"))?;
        let listed = entry
            .get(URL_SCHEMES)
            .and_then(Value::as_array)
            .is_some_and(|schemes| schemes.iter().any(|s| s.as_string() == Some(scheme)));
        if listed {
            return Ok(false);
        }
        if first.is_none() {
            first = Some(entry);
        }
    }

    match first {
        Some(entry) => {
            if !entry.contains_key(URL_SCHEMES) {
                entry.insert(URL_SCHEMES.to_string(), Value::Array(Vec::new()));
            }
            entry
                .get_mut(URL_SCHEMES)
                .and_then(Value::as_array_mut)
                .ok_or_else(|| shape_error("CFBundleURLSchemes is not an array"))?
                .push(Value::String(scheme.to_string()));
        }
        None => {
            let mut entry = Dictionary::new();
            entry.insert(
                URL_SCHEMES.to_string(),
                Value::Array(vec![Value::String(scheme.to_string())]),
            );
            types.push(Value::Dictionary(entry));
        }
    }

    debug!(scheme, "added URI scheme");
    Ok(true)
}

/// Universal Link domains listed in an entitlements document, without the
/// `applinks:` marker. Other associated-domain services are ignored.
pub fn associated_domains(doc: &PropertyDocument) -> Vec<Domain> {
    let marker = format!("{APPLINKS}:");
    doc.string_array(ASSOCIATED_DOMAINS)
        .into_iter()
        .filter_map(|entry| entry.strip_prefix(&marker).map(String::from))
        .collect()
}

/// Merge `domains` into an associated-domains list.
///
/// Existing entries are kept (unless `replace_existing`), each new domain is
/// prefixed with `applinks:`, and the result is deduplicated in order of
/// first occurrence.
pub fn merge_domain_list(
    existing: &[String],
    domains: &[Domain],
    replace_existing: bool,
) -> Vec<String> {
    let kept = if replace_existing { &[][..] } else { existing };
    let mut merged: Vec<String> = Vec::with_capacity(kept.len() + domains.len());
    let added = domains.iter().map(|d| format!("{APPLINKS}:{d}"));
    for entry in kept.iter().cloned().chain(added) {
        if !merged.contains(&entry) {
            merged.push(entry);
        }
    }
    merged
}

/// Location of the Info document for a target and configuration.
///
/// # Errors
///
/// Returns `ProjectError::SettingMissing` when `INFOPLIST_FILE` is unset.
pub fn info_plist_path(
    project: &dyn Project,
    target: &str,
    configuration: &str,
) -> Result<PathBuf> {
    let relative = require_setting(project, target, INFOPLIST_FILE, configuration)?;
    Ok(project.directory().join(relative))
}

/// Locate the Info document for a target and edit it under its lock.
///
/// # Errors
///
/// Returns `ProjectError::SettingMissing`, `DocumentError::NotFound`,
/// `DocumentError::Parse`, or the error returned by `f`.
pub fn edit_info_plist<R>(
    store: &DocumentStore,
    project: &dyn Project,
    target: &str,
    configuration: &str,
    f: impl FnOnce(&mut PropertyDocument) -> Result<R>,
) -> Result<(PathBuf, R)> {
    let path = info_plist_path(project, target, configuration)?;
    let result = store.edit_property_list(&path, IfMissing::Fail, f)?;
    Ok((path, result))
}

/// Locate the Info document and write the SDK key(s) into it.
///
/// # Errors
///
/// Returns `ProjectError::SettingMissing`, `DocumentError::NotFound`,
/// `DocumentError::Parse`, or `ConfigError::Missing` when no key is given.
pub fn write_keys(
    store: &DocumentStore,
    project: &dyn Project,
    target: &str,
    configuration: &str,
    credentials: &Credentials,
) -> Result<PathBuf> {
    let (path, ()) = edit_info_plist(store, project, target, configuration, |doc| {
        set_keys(doc, credentials)
    })?;
    Ok(path)
}

/// Result of merging domains into an entitlements document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitlementsUpdate {
    /// Document that was written.
    pub path: PathBuf,
    /// Relative path newly registered with the target, if any.
    pub registered: Option<PathBuf>,
    /// The associated domains list after the merge.
    pub entries: Vec<String>,
}

/// Merge Universal Link domains into the target's entitlements document.
///
/// When the target has no `CODE_SIGN_ENTITLEMENTS` setting, a document at
/// `<target>/<target>.entitlements` is created, the setting is written on
/// every configuration and the file is added to the project. The project is
/// modified in memory only; the caller saves it.
///
/// # Errors
///
/// Returns project errors for an unknown target, or document errors when the
/// existing entitlements file cannot be read or written.
pub fn merge_associated_domains(
    store: &DocumentStore,
    project: &mut dyn Project,
    target: &str,
    configuration: &str,
    domains: &[Domain],
    replace_existing: bool,
) -> Result<EntitlementsUpdate> {
    let (path, registered) =
        match resolve_path_setting(&*project, target, CODE_SIGN_ENTITLEMENTS, configuration)? {
            Some(path) => (path, None),
            None => {
                let relative = PathBuf::from(target).join(format!("{target}.entitlements"));
                let relative_str = relative.to_string_lossy().into_owned();
                info!(
                    target_name = target,
                    path = %relative.display(),
                    "registering entitlements file"
                );
                project.set_build_setting(target, CODE_SIGN_ENTITLEMENTS, &relative_str)?;
                project.add_file(&relative)?;
                (project.directory().join(&relative), Some(relative))
            }
        };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let entries = store.edit_property_list(&path, IfMissing::Create, |doc| {
        let existing = doc.string_array(ASSOCIATED_DOMAINS);
        let merged = merge_domain_list(&existing, domains, replace_existing);
        doc.insert(ASSOCIATED_DOMAINS, string_values(&merged));
        Ok(merged)
    })?;

    debug!(path = %path.display(), entries = entries.len(), "associated domains updated");
    Ok(EntitlementsUpdate {
        path,
        registered,
        entries,
    })
}

/// Universal Link domains currently claimed by the target's entitlements.
///
/// Returns an empty list when the target has no entitlements document.
///
/// # Errors
///
/// Returns project errors for an unknown target, or document errors when the
/// entitlements file cannot be parsed.
pub fn read_associated_domains(
    store: &DocumentStore,
    project: &dyn Project,
    target: &str,
    configuration: &str,
) -> Result<Vec<Domain>> {
    let Some(path) = resolve_path_setting(project, target, CODE_SIGN_ENTITLEMENTS, configuration)?
    else {
        return Ok(Vec::new());
    };
    if !path.exists() {
        return Ok(Vec::new());
    }
    let doc = store.read_property_list(&path)?;
    Ok(associated_domains(&doc))
}

//! Setup command.
//!
//! Validates the link domains (unless `--no-validate`), then writes the SDK
//! keys, link domains and routing into the iOS project and/or the Android
//! manifest.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::cli::{output, settings, validate, SetupArgs};
use crate::core::config::Settings;
use crate::core::constants::ANDROID_MANIFEST_PATH;
use crate::core::domains::DomainSet;
use crate::core::manifest::install_intent_routing;
use crate::core::project::{Project, SettingsFile};
use crate::core::property_list::{
    add_uri_scheme, edit_info_plist, merge_associated_domains, set_keys, set_link_domains,
};
use crate::core::store::DocumentStore;
use crate::error::{ConfigError, Error, Result};

/// Configure link routing.
pub fn execute(args: &SetupArgs) -> Result<()> {
    let settings = settings(args.overrides())?;
    if settings.credentials.is_empty() {
        return Err(ConfigError::Missing("live_key or test_key").into());
    }
    if settings.project.is_none() && settings.android_manifest.is_none() {
        return Err(ConfigError::Missing("project or android_manifest").into());
    }
    let domains = settings.require_domains()?;
    let store = DocumentStore::new();

    output::header("Link domains");
    for domain in &domains {
        output::list_item(output::path(domain));
    }

    if let Some(path) = &settings.project {
        let mut project = SettingsFile::load(path)?;
        let target = settings.target.select(&project)?;

        if args.no_validate {
            debug!("validation skipped");
        } else {
            let validation = validate::check(&project, &target, &settings, &domains)?;
            validate::report(&validation);
            if !validation.valid {
                if !args.force {
                    output::hint("fix the association files, or rerun with --force");
                    return Err(Error::ValidationFailed);
                }
                output::warn("validation failed, continuing because of --force");
            }
        }

        setup_ios(&store, &mut project, &target, &settings, &domains)?;
    }

    if let Some(path) = &settings.android_manifest {
        setup_android(&store, &manifest_path(path), &settings, &domains)?;
    }

    output::blank();
    output::success("link configuration complete");
    Ok(())
}

fn setup_ios(
    store: &DocumentStore,
    project: &mut SettingsFile,
    target: &str,
    settings: &Settings,
    domains: &DomainSet,
) -> Result<()> {
    let configuration = settings.configuration.as_str();
    output::section(&format!("iOS target {target}"));

    let (info_plist, added_scheme) =
        edit_info_plist(store, &*project, target, configuration, |doc| {
            set_keys(doc, &settings.credentials)?;
            set_link_domains(doc, domains.as_slice());
            settings
                .uri_scheme
                .as_deref()
                .map(|scheme| add_uri_scheme(doc, scheme))
                .transpose()
        })?;
    output::success(&format!("keys written to {}", output::path(info_plist.display())));
    if added_scheme == Some(true) {
        output::success("URI scheme registered");
    }

    let update = merge_associated_domains(
        store,
        project,
        target,
        configuration,
        domains.as_slice(),
        settings.remove_existing,
    )?;
    if let Some(registered) = &update.registered {
        output::success(&format!(
            "created entitlements {}",
            output::path(registered.display())
        ));
    }
    output::success(&format!(
        "{} associated domains in {}",
        update.entries.len(),
        output::path(update.path.display())
    ));

    project.save()?;
    info!(target_name = target, "iOS project updated");
    Ok(())
}

fn manifest_path(path: &Path) -> PathBuf {
    if path.is_dir() {
        path.join(ANDROID_MANIFEST_PATH)
    } else {
        path.to_path_buf()
    }
}

fn setup_android(
    store: &DocumentStore,
    path: &Path,
    settings: &Settings,
    domains: &DomainSet,
) -> Result<()> {
    output::section("Android manifest");
    let activity = store.edit_manifest(path, |manifest| {
        manifest.add_keys(&settings.credentials)?;
        let activity = manifest.select_activity(&settings.activity)?;
        install_intent_routing(
            activity,
            domains.as_slice(),
            settings.uri_scheme.as_deref(),
            settings.remove_existing,
        );
        Ok(activity.attr("android:name").unwrap_or_default().to_string())
    })?;

    output::success(&format!("keys written to {}", output::path(path.display())));
    output::success(&format!("intent filter added to {activity}"));
    info!(path = %path.display(), "Android manifest updated");
    Ok(())
}

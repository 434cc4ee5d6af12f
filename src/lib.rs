//! Linksmith - configure and validate Universal Links and App Links.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── cli/                # Command-line interface
//! │   ├── setup           # Write keys, domains and routing into projects
//! │   ├── validate        # Check domains against association files
//! │   ├── owner           # Identify the app a domain is associated with
//! │   ├── domains         # Print the resolved domain set
//! │   └── completions     # Shell completions
//! └── core/               # Core library components
//!     ├── config          # .linksmith.toml and merged settings
//!     ├── domains         # Domain resolution
//!     ├── association/    # Association file client
//!     │   ├── transport   # HTTPS transport
//!     │   └── envelope    # Signed (CMS) envelope verification
//!     ├── identity        # Ownership validation
//!     ├── project/        # Project model and TOML adapter
//!     ├── property_list   # Info.plist and entitlements mutation
//!     ├── manifest/       # AndroidManifest.xml mutation
//!     └── store/          # Serialized, atomic document writes
//! ```
//!
//! # Features
//!
//! - Explicit and generated link domains with stable ordering
//! - Association file retrieval with signed-envelope verification
//! - Per-domain diagnostics accumulated across a validation run
//! - Idempotent key, domain and routing updates for iOS and Android projects

pub mod cli;
pub mod core;
pub mod error;

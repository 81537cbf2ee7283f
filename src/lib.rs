//! kvrotate - Format-preserving credential rotation for versioned
//! key-value secret stores.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── cli/              # Command-line interface
//! │   ├── paths         # List configured paths
//! │   ├── plan          # Show a rotation plan
//! │   ├── rotate        # Rotate one or all paths
//! │   └── check         # Read-only fetch and decode
//! └── core/             # Core library components
//!     ├── config        # .kvrotate.toml loading
//!     ├── registry      # Environment → application → path entries
//!     ├── catalog       # Per-format path patterns and field names
//!     ├── resolve       # Format strategies and field-name precedence
//!     ├── codec/        # Payload codecs
//!     │   ├── json      # Flat JSON objects
//!     │   └── dotenv    # KEY=VALUE and export KEY="VALUE"
//!     ├── merge         # Apply updates to a decoded secret
//!     ├── planner       # Dry-run plans and apply
//!     ├── engine        # Requests, batches, checks
//!     └── store/        # Secret store trait
//!         ├── memory    # In-process store
//!         └── fs        # Versioned JSON documents on disk
//! ```
//!
//! # Example
//!
//! ```
//! use kvrotate::core::codec;
//! use kvrotate::core::domain::{FieldUpdate, FormatKind};
//! use kvrotate::core::merge;
//! use kvrotate::core::resolve::FieldMap;
//!
//! let kind = FormatKind::DotenvExport;
//! let decoded = codec::decode(kind, "export AWS_ACCESS_KEY_ID=\"old\"\n# keep\n").unwrap();
//! let update = FieldUpdate::new("access_key", "new").unwrap();
//!
//! let merged = merge::apply(decoded, &[update], &FieldMap::baseline(kind)).unwrap();
//! let payload = codec::encode(&merged.secret).unwrap();
//!
//! assert_eq!(payload, "export AWS_ACCESS_KEY_ID=\"new\"\n# keep\n");
//! ```

pub mod cli;
pub mod core;
pub mod error;

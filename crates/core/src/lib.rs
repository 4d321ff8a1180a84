//! Core library for the Klaviyo dispatcher
//!
//! This crate implements the **Functional Core** of the `klaviyo` application,
//! following the Functional Core - Imperative Shell architectural pattern.
//!
//! # Architecture Overview
//!
//! - **`klaviyo_core`** (this crate): Pure transformation functions with zero I/O
//! - **`klaviyo`**: configuration, HTTP transport and orchestration (the Imperative Shell)
//!
//! All functions in this crate are deterministic and free of side effects, so
//! they are tested with plain fixture data and no mocking.
//!
//! # Module Organization
//!
//! - [`resource`]: Resource and operation selectors and the supported pairs
//! - [`fields`]: Field bags and last-write-wins folds over ordered pairs
//! - [`request`]: The request builder, from (resource, operation, fields) to a [`RequestDescriptor`]
//! - [`response`]: The response normalizer, from raw bodies to [`OutputRecord`]s
//! - [`credentials`]: API key headers, revisions and the credential test request
//! - [`error`]: Errors raised while building a request
//!
//! # Example Usage
//!
//! ```rust
//! use klaviyo_core::{build_request, FieldBag, Method, OperationKind, ResourceKind};
//! use serde_json::json;
//!
//! let fields = FieldBag::new()
//!     .with("templateId", "XyZ123")
//!     .with("fields", json!(["name", "id"]));
//!
//! let request = build_request(ResourceKind::Template, OperationKind::GetOne, &fields).unwrap();
//!
//! assert_eq!(request.method, Method::Get);
//! assert_eq!(request.path, "/templates/XyZ123/?fields[template]=name,id");
//! ```

pub mod credentials;
pub mod error;
pub mod fields;
pub mod request;
pub mod resource;
pub mod response;

pub use credentials::{auth_headers, Credentials, DEFAULT_BASE_URL, DEFAULT_REVISION};
pub use error::DispatchError;
pub use fields::{FieldBag, Pair};
pub use request::{build_request, Method, RequestDescriptor};
pub use resource::{OperationKind, ResourceKind};
pub use response::{normalize_responses, OutputRecord};

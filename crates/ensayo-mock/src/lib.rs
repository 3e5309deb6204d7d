// Allow unwrap/expect in tests for clear failure messages
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

//! # ensayo-mock
//!
//! Mocks, stubs and spies for the ensayo testing framework.
//!
//! - [`MockFactory`] creates surfaces from a [`TargetRef`]: a live
//!   [`Component`], a bare [`Contract`], or a name resolved through a
//!   [`ComponentLoader`]
//! - [`MockSurface`] answers calls from its [`StubRule`]s, newest first,
//!   and records each one in a per-method [`CallLog`]
//! - Verification helpers (`times`, `times_matching`, `was_called`) read
//!   those logs
//!
//! ## Example
//!
//! ```rust
//! use ensayo_mock::{ArgMatcher, Contract, MockFactory};
//! use serde_json::json;
//!
//! let contract = Contract::new("Mailer", ["send"]);
//! let mailer = MockFactory::new().create_mock(contract)?;
//! mailer.stub("send").with_args([json!("ops@example.com")]).raises("bounced");
//!
//! assert!(mailer.invoke("send", &[json!("dev@example.com")])?.is_null());
//! assert!(mailer.invoke("send", &[json!("ops@example.com")]).is_err());
//! assert!(mailer.times_matching(1, "send", &ArgMatcher::exact([json!("ops@example.com")])));
//! # Ok::<(), ensayo_mock::MockError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod call_log;
pub mod contract;
pub mod error;
pub mod factory;
pub mod rule;
pub mod surface;

pub use call_log::{CallLog, CallOutcome, CallRecord};
pub use contract::{Component, ComponentLoader, ComponentRegistry, Contract, TargetIdentity, TargetRef};
pub use error::{MockError, Result};
pub use factory::MockFactory;
pub use rule::{ArgMatcher, StubAction, StubRule};
pub use surface::{MockId, MockSurface, RuleBuilder, SurfaceKind};

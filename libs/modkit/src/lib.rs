//! # ModKit - shared HTTP plumbing
//!
//! Building blocks reused by every module of the server:
//!
//! - **Problem Details**: RFC 9457 error envelope rendered as `application/problem+json`
//! - **Error layer**: one place that turns extractor rejections, unclassified
//!   failures and handler panics into Problem responses
//! - **Shutdown**: OS signal handling wired to a `CancellationToken`

pub use anyhow::Result;

pub mod api;
pub use api::error_layer::{panic_to_problem, IntoProblemResponse, INTERNAL_SERVER_ERROR_DETAIL};
pub use api::json_body::JsonBody;
pub use api::problem::{internal_error, unprocessable, Problem, ProblemResponse, ValidationError};

pub mod runtime;
pub use runtime::shutdown::{cancel_on_shutdown, wait_for_shutdown};

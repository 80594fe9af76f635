//! Mock rules and their selection.
//!
//! This module provides the two kinds of rules the pipeline applies:
//! - [`RequestMock`]: appends header overrides to matching outgoing requests
//! - [`ResponseMock`]: replaces the whole response for matching requests
//!
//! Both share the [`MockRule::matches`] predicate. Selection helpers live in
//! [`selection`].

pub mod rules;
pub mod selection;

pub use rules::{MockRule, MockSet, RequestMock, ResponseMock};
pub use selection::{build_mock_response, matching_request_mocks, select_response_mock};

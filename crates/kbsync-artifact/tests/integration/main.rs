//! Integration tests for kbsync-artifact
//!
//! Uses wiremock to simulate the artifact catalog API and verifies the
//! ICatalogService adapter end to end: URL layout, headers, payloads,
//! paging, and error/throttling behavior.

mod common;

mod test_catalogs;
mod test_files;
mod test_retry;

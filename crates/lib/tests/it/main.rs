/*! Integration tests for Pagemodel.
 *
 * This test suite is organized as a single integration test binary
 * following the pattern described by matklad in
 * https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html
 *
 * The module structure mirrors the main library structure:
 * - path: Tests for path addressing and URL helpers
 * - store: Tests for the ModelStore against the shared page fixture
 * - manager: Tests for initialization, fetching, deduplication and listeners
 * - editor: Tests for editor commands applied through the manager
 * - router: Tests for route driven model loading
 */

use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("pagemodel=info".parse().unwrap()),
        )
        .with_test_writer()
        .try_init();
}

mod editor;
mod store;

/*! Integration tests for relmap.
 *
 * This test suite is organized as a single integration test binary
 * following the pattern described by matklad in
 * https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html
 *
 * The module structure mirrors the main library structure:
 * - model: Tests for Document/Body add-or-replace semantics
 * - builder: Tests for the mapping-definition session, ledger and merge
 * - subtype: Tests for the type-keyed subtype registries
 */

use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("relmap=info".parse().unwrap()),
        )
        .with_test_writer()
        .try_init();
}

mod builder;
mod subtype;

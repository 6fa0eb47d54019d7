//! Test support utilities.
//!
//! [`ModelTester`] pairs a factory for some document-producing builder with a
//! function extracting the sub-document (node) under test, so assertions can
//! be written against the finished node without repeating the plumbing in
//! every test.
//!
//! ```
//! use relmap::testing::ModelTester;
//! use relmap::{ClassBuilder, Entity, Property};
//!
//! struct Account;
//! impl Entity for Account {
//!     const NAME: &'static str = "Account";
//!     fn properties() -> &'static [Property] {
//!         const PROPS: &[Property] = &[Property::new("Balance", "f64")];
//!         PROPS
//!     }
//! }
//!
//! let tester = ModelTester::new(
//!     || ClassBuilder::<Account>::new(),
//!     |mapping| mapping.document().body().property("Balance").cloned(),
//! );
//!
//! let node = tester
//!     .model(|mapping| {
//!         mapping.map(Property::new("Balance", "f64")).column("bal");
//!     })
//!     .unwrap();
//! assert_eq!(node.column, "bal");
//! ```

use std::fmt;

/// Builds a document-producing object and extracts one node from it.
pub struct ModelTester<B, N> {
    instantiate: Box<dyn Fn() -> B>,
    extract: Box<dyn Fn(&B) -> N>,
}

impl<B, N> ModelTester<B, N> {
    /// Creates a tester from a builder factory and a node extractor.
    pub fn new(
        instantiate: impl Fn() -> B + 'static,
        extract: impl Fn(&B) -> N + 'static,
    ) -> Self {
        Self { instantiate: Box::new(instantiate), extract: Box::new(extract) }
    }

    /// Applies `configure` to a fresh builder and returns the extracted node.
    pub fn model(&self, configure: impl FnOnce(&mut B)) -> N {
        let mut builder = (self.instantiate)();
        configure(&mut builder);
        (self.extract)(&builder)
    }
}

impl<B, N: PartialEq + fmt::Debug> ModelTester<B, N> {
    /// Asserts that `configure` produces a node equal to `expected`.
    ///
    /// # Panics
    ///
    /// Panics when the extracted node differs from `expected`.
    pub fn assert_model(&self, configure: impl FnOnce(&mut B), expected: &N) {
        let actual = self.model(configure);
        assert_eq!(&actual, expected);
    }
}

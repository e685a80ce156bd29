//! Fixture files that declare protocol settings and mocks.

pub mod error;
pub mod fixture;
pub mod parser;

pub use error::ConfigError;
pub use fixture::{
    BodyFixture, ExactMockFixture, FixtureFile, MockFixture, PatternMockFixture, ProtocolSettings,
    ResponseFixture,
};
pub use parser::{load_fixture_files, parse_config};

use crate::mocks::MockRequest;
use crate::protocol::MockUrlProtocol;
use std::sync::Arc;
use tracing::debug;

impl MockUrlProtocol {
    /// Apply settings and register the mocks of every file, in order.
    ///
    /// Every mock is built before anything is applied, so an invalid fixture leaves the
    /// protocol untouched. Returns the number of registered mocks.
    pub fn apply_fixtures(&self, files: Vec<FixtureFile>) -> Result<usize, ConfigError> {
        let mocks = files
            .iter()
            .flat_map(|file| file.mocks.iter())
            .map(MockFixture::to_mock_request)
            .collect::<Result<Vec<Arc<dyn MockRequest>>, _>>()?;

        for settings in files.iter().filter_map(|file| file.settings.as_ref()) {
            settings.apply_to(self);
        }

        let count = mocks.len();
        for mock in mocks {
            self.expect_mock_request(mock);
        }
        debug!(count, "Applied fixtures");
        Ok(count)
    }

    /// Load fixture files matching `pattern` and apply them.
    pub async fn load_fixtures(&self, pattern: &str) -> Result<usize, ConfigError> {
        let files = load_fixture_files(pattern).await?;
        self.apply_fixtures(files)
    }
}

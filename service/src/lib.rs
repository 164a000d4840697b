use domain::ContentRepository;
use events::Producer;
use sse::Manager;
use std::sync::Arc;

pub mod config;
pub mod logging;

pub use config::Config;

// Service-level state wiring the content repository, the publish pipeline,
// and the stream session manager together.
// Needs to implement Clone to be able to be passed into Router as State
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub repository: Arc<ContentRepository>,
    pub sse_manager: Arc<Manager>,
    pub producer: Arc<Producer>,
}

impl AppState {
    pub fn new(
        config: Config,
        repository: Arc<ContentRepository>,
        sse_manager: Arc<Manager>,
        producer: Arc<Producer>,
    ) -> Self {
        Self {
            config,
            repository,
            sse_manager,
            producer,
        }
    }

    pub fn repository_ref(&self) -> &ContentRepository {
        self.repository.as_ref()
    }
}

//! Resource modules, one per backend router.
//!
//! Each accessor borrows the shared [`ApiClient`], so all resources see the
//! same base URL and token store:
//!
//! ```no_run
//! # async fn demo(client: rolefit_client::ApiClient) -> Result<(), rolefit_client::ApiError> {
//! let page = client.devices().list(&Default::default()).await?;
//! println!("{} devices", page.total);
//! # Ok(())
//! # }
//! ```

pub mod ai;
pub mod alarms;
pub mod auth;
pub mod database;
pub mod devices;
pub mod executions;
pub mod feature_cards;
pub mod llm;
pub mod llm_config;
pub mod positions;
pub mod results;
pub mod scripts;
pub mod software;
pub mod stats;
pub mod tasks;

use crate::transport::ApiClient;

impl ApiClient {
    pub fn auth(&self) -> auth::Auth<'_> {
        auth::Auth { client: self }
    }

    pub fn devices(&self) -> devices::Devices<'_> {
        devices::Devices { client: self }
    }

    pub fn tasks(&self) -> tasks::Tasks<'_> {
        tasks::Tasks { client: self }
    }

    pub fn scripts(&self) -> scripts::Scripts<'_> {
        scripts::Scripts { client: self }
    }

    pub fn software(&self) -> software::SoftwareCatalog<'_> {
        software::SoftwareCatalog { client: self }
    }

    pub fn positions(&self) -> positions::Positions<'_> {
        positions::Positions { client: self }
    }

    pub fn results(&self) -> results::Results<'_> {
        results::Results { client: self }
    }

    pub fn executions(&self) -> executions::Executions<'_> {
        executions::Executions { client: self }
    }

    /// Endpoints a benchmarking agent calls while running tasks.
    pub fn agent(&self) -> executions::Agent<'_> {
        executions::Agent { client: self }
    }

    pub fn feature_cards(&self) -> feature_cards::FeatureCards<'_> {
        feature_cards::FeatureCards { client: self }
    }

    pub fn stats(&self) -> stats::Stats<'_> {
        stats::Stats { client: self }
    }

    pub fn ai(&self) -> ai::Ai<'_> {
        ai::Ai { client: self }
    }

    pub fn llm(&self) -> llm::Llm<'_> {
        llm::Llm { client: self }
    }

    pub fn llm_config(&self) -> llm_config::LlmSettings<'_> {
        llm_config::LlmSettings { client: self }
    }

    pub fn database(&self) -> database::Database<'_> {
        database::Database { client: self }
    }

    pub fn alarms(&self) -> alarms::Alarms<'_> {
        alarms::Alarms { client: self }
    }
}

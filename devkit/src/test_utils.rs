/*!
Test Harness pour rolefit-client

Facilite l'écriture de tests avec:
- Initialisation des logs (`RUST_LOG`)
- Backend simulé et client prêts à l'emploi
- Assertions sur le nombre d'appels reçus par chaque mock
*/

use crate::mock_backend::MockBackend;
use anyhow::Result;
use httpmock::Mock;
use rolefit_client::{ApiClient, AuthGuard, TokenStore};

/// Harness de test complet: backend simulé + client + guard partageant le même store
pub struct TestHarness {
    pub backend: MockBackend,
    pub client: ApiClient,
}

impl TestHarness {
    /// Harness sans session
    pub fn new() -> Self {
        env_logger::builder().is_test(true).try_init().ok();
        let backend = MockBackend::start();
        let client = backend.client();
        log::info!("🧪 Mock backend listening on {}", backend.base_url());
        Self { backend, client }
    }

    /// Harness avec un token déjà stocké
    pub fn logged_in(token: &str) -> Self {
        env_logger::builder().is_test(true).try_init().ok();
        let backend = MockBackend::logged_in(token);
        let client = backend.client();
        log::info!("🧪 Mock backend listening on {} (session active)", backend.base_url());
        Self { backend, client }
    }

    pub fn guard(&self) -> AuthGuard {
        AuthGuard::new(self.client.tokens().clone())
    }

    pub fn has_session(&self) -> bool {
        self.backend.tokens().has_token()
    }

    /// Nombre de fois où le token a été effacé
    pub fn session_clears(&self) -> usize {
        self.backend.tokens().clear_count()
    }

    /// Vérifie qu'un mock a reçu exactement `expected` requêtes
    pub fn expect_calls(&self, mock: &Mock<'_>, expected: usize) -> Result<()> {
        let actual = mock.calls();
        if actual != expected {
            anyhow::bail!("expected {} call(s), mock received {}", expected, actual);
        }
        log::info!("✅ Mock received {} call(s) as expected", actual);
        Ok(())
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Macro pour créer des tests asynchrones contre le backend simulé
#[macro_export]
macro_rules! backend_test {
    ($name:ident, |$harness:ident| $body:block) => {
        #[tokio::test]
        async fn $name() {
            let $harness = $crate::test_utils::TestHarness::logged_in("test-token");
            let outcome: anyhow::Result<()> = async { $body }.await;
            if let Err(e) = outcome {
                panic!("Test '{}' failed: {:#}", stringify!($name), e);
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Fixtures;
    use httpmock::Method::GET;
    use rolefit_client::{Navigation, RouteName};

    #[tokio::test]
    async fn test_harness_basic_functionality() {
        let harness = TestHarness::logged_in("abc");
        let mock = harness.backend.respond(GET, "stats/dashboard", 200, Fixtures::dashboard());

        let summary = harness.client.stats().dashboard().await.unwrap();
        assert_eq!(summary.total_devices, 42);
        harness.expect_calls(&mock, 1).unwrap();
        assert!(harness.expect_calls(&mock, 2).is_err());
    }

    #[test]
    fn test_guard_shares_session() {
        let harness = TestHarness::new();
        assert!(!harness.has_session());
        assert_eq!(harness.guard().check(RouteName::Dashboard), Navigation::Redirect(RouteName::Login));
    }

    backend_test!(test_macro_functionality, |harness| {
        harness.backend.fail(GET, "devices/missing", 404, "Device not found");
        let err = harness.client.devices().get("missing").await.unwrap_err();
        anyhow::ensure!(err.is_not_found(), "expected 404, got {err}");
        Ok(())
    });
}

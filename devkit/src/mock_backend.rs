/*!
Backend RoleFit simulé

Démarre un serveur httpmock monté sous `/api` et fournit un `ApiClient`
pointé dessus, avec un store de token en mémoire pour observer les
connexions et déconnexions.
*/

use httpmock::prelude::*;
use httpmock::Mock;
use rolefit_client::{ApiClient, MemoryTokenStore};
use serde_json::Value;
use std::sync::Arc;

/// Préfixe sous lequel le backend expose son API
pub const API_PREFIX: &str = "/api";

pub struct MockBackend {
    server: MockServer,
    tokens: Arc<MemoryTokenStore>,
}

impl MockBackend {
    /// Backend sans session
    pub fn start() -> Self {
        Self {
            server: MockServer::start(),
            tokens: Arc::new(MemoryTokenStore::new()),
        }
    }

    /// Backend avec un token déjà stocké
    pub fn logged_in(token: &str) -> Self {
        Self {
            server: MockServer::start(),
            tokens: Arc::new(MemoryTokenStore::with_token(token)),
        }
    }

    pub fn server(&self) -> &MockServer {
        &self.server
    }

    pub fn tokens(&self) -> &Arc<MemoryTokenStore> {
        &self.tokens
    }

    /// URL de base à donner au client (`http://127.0.0.1:<port>/api`)
    pub fn base_url(&self) -> String {
        self.server.url(API_PREFIX)
    }

    /// Chemin complet côté serveur pour un chemin d'API relatif
    pub fn path(&self, relative: &str) -> String {
        format!("{}/{}", API_PREFIX, relative.trim_start_matches('/'))
    }

    /// Client relié au backend simulé et à son store de token
    pub fn client(&self) -> ApiClient {
        match ApiClient::new(&self.base_url(), self.tokens.clone()) {
            Ok(client) => client,
            Err(e) => panic!("mock backend URL rejected: {e}"),
        }
    }

    /// Répond `status` + `body` JSON à `method` sur `relative`
    pub fn respond(&self, method: Method, relative: &str, status: u16, body: Value) -> Mock<'_> {
        let path = self.path(relative);
        log::debug!("🧪 mock {:?} {} -> {}", method, path, status);
        self.server.mock(|when, then| {
            when.method(method).path(path);
            then.status(status)
                .header("content-type", "application/json")
                .json_body(body);
        })
    }

    /// Réponse d'erreur au format FastAPI (`{"detail": "..."}`)
    pub fn fail(&self, method: Method, relative: &str, status: u16, detail: &str) -> Mock<'_> {
        self.respond(method, relative, status, crate::Fixtures::error_detail(detail))
    }

    /// Réponse vide (204) à `method` sur `relative`
    pub fn no_content(&self, method: Method, relative: &str) -> Mock<'_> {
        let path = self.path(relative);
        self.server.mock(|when, then| {
            when.method(method).path(path);
            then.status(204);
        })
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::start()
    }
}

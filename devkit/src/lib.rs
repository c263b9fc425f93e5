/*!
# RoleFit DevKit - Backend simulé et utilitaires de test

Bibliothèque facilitant les tests de `rolefit-client` sans backend réel:
- Serveur HTTP simulé (httpmock) déjà relié à un `ApiClient`
- Fixtures JSON conformes aux réponses du backend
- Harness de test avec logs et assertions sur les requêtes reçues
*/

pub mod fixtures;
pub mod mock_backend;
pub mod test_utils;

pub use fixtures::Fixtures;
pub use mock_backend::MockBackend;
pub use test_utils::TestHarness;

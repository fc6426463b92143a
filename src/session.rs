// ============================================================================
// Session Gate
// ============================================================================
// Décide si la session est anonyme ou authentifiée, à partir du token
// persisté localement (écrit par le flux de login externe, jamais modifié ici)
//
// Règles :
// - Pas de token : session anonyme, l'identité n'est JAMAIS résolue,
//   les actions send/receive restent désactivées
// - Token présent : une seule requête GET /users/user par exécution ;
//   si elle échoue, la session reste anonyme en silence (échec loggé,
//   jamais remonté comme erreur bloquante)
// - Aucune expiration locale du token, aucun re-check
// ============================================================================

use std::path::Path;

use tracing::{debug, info};

use crate::models::User;

/// État de session de l'application
///
/// CONCEPT RUST : Option<T> comme machine à deux états
/// - credential: None => anonyme définitif pour cette exécution
/// - user: None => identité pas (encore) résolue
#[derive(Debug, Clone, Default)]
pub struct Session {
    /// Bearer token opaque, lu une seule fois au démarrage
    credential: Option<String>,

    /// Identité résolue par le backend (au plus une fois par exécution)
    user: Option<User>,
}

impl Session {
    /// Construit une session à partir d'un credential éventuel
    pub fn from_credential(credential: Option<String>) -> Self {
        Self {
            credential,
            user: None,
        }
    }

    /// Charge la session depuis le stockage local
    ///
    /// PLEB_WALLET_TOKEN (env) est prioritaire sur le fichier token.
    /// L'absence de token n'est pas une erreur : la session est anonyme.
    pub fn load(token_path: &Path) -> Self {
        let credential = read_credential(token_path);

        match &credential {
            Some(_) => info!("Credential found, session may authenticate"),
            None => info!("No credential found, running anonymous"),
        }

        Self::from_credential(credential)
    }

    /// Retourne le token si présent
    pub fn credential(&self) -> Option<&str> {
        self.credential.as_deref()
    }

    /// Indique si la résolution d'identité doit être tentée
    ///
    /// true uniquement si un token est présent ET que l'identité n'a pas
    /// encore été résolue. Sans token, toujours false.
    pub fn should_resolve_identity(&self) -> bool {
        self.credential.is_some() && self.user.is_none()
    }

    /// Marque la session comme authentifiée avec l'identité renvoyée
    pub fn resolve(&mut self, user: User) {
        info!(user_id = user.id, "Session resolved, user logged in");
        self.user = Some(user);
    }

    /// Vérifie si la session est authentifiée
    ///
    /// Loggée = identité résolue. Un token présent mais non vérifié par le
    /// backend ne suffit pas.
    pub fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }

    /// Retourne l'identité résolue
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }
}

/// Lit le credential depuis l'environnement ou le fichier token
///
/// CONCEPT RUST : Option chaining
/// - .ok() : Result -> Option
/// - .filter() : écarte les valeurs vides
/// - .or_else() : fallback sur le fichier si la variable est absente
fn read_credential(token_path: &Path) -> Option<String> {
    std::env::var("PLEB_WALLET_TOKEN")
        .ok()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .or_else(|| {
            let content = std::fs::read_to_string(token_path)
                .map_err(|e| {
                    debug!(path = ?token_path, error = ?e, "Token file not readable");
                    e
                })
                .ok()?;

            let token = content.trim().to_string();
            if token.is_empty() {
                None
            } else {
                Some(token)
            }
        })
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_session_never_resolves() {
        let session = Session::from_credential(None);

        // Sans credential : jamais de tentative de résolution, jamais loggé
        assert!(!session.should_resolve_identity());
        assert!(!session.is_logged_in());
        assert!(session.user().is_none());
    }

    #[test]
    fn test_credential_triggers_single_resolution() {
        let mut session = Session::from_credential(Some("token123".to_string()));

        assert!(session.should_resolve_identity());
        // Token présent mais identité pas encore confirmée : pas loggé
        assert!(!session.is_logged_in());

        let user: User = serde_json::from_str(r#"{"id": 7, "username": "pleb"}"#).unwrap();
        session.resolve(user);

        assert!(session.is_logged_in());
        assert_eq!(session.user().unwrap().id, 7);
        // L'identité est résolue : plus aucune tentative
        assert!(!session.should_resolve_identity());
    }

    #[test]
    fn test_failed_resolution_stays_anonymous() {
        // Un échec de GET /users/user ne fait que... ne rien résoudre
        let session = Session::from_credential(Some("token123".to_string()));

        assert!(!session.is_logged_in());
        assert!(session.user().is_none());
    }

    #[test]
    fn test_load_with_missing_file() {
        let session = Session::load(Path::new("/nonexistent/pleb/token"));
        // Fichier absent : pas une erreur, session anonyme
        if std::env::var("PLEB_WALLET_TOKEN").is_err() {
            assert!(session.credential().is_none());
        }
    }
}

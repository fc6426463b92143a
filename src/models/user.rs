// ============================================================================
// Structure : User
// ============================================================================
// Identité renvoyée par le backend (GET /users/user) quand un token est présent
//
// Résolue au plus une fois par exécution : pas de re-check, pas de refresh.
// Consommée par le flux de paiement pour attacher le user_id aux requêtes.
// ============================================================================

use serde::Deserialize;

/// Profil utilisateur rapporté par le backend
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    /// Identifiant utilisateur, attaché aux POST /lightning/pay et /invoice
    pub id: i64,

    /// Nom d'utilisateur (absent sur certaines versions du backend)
    pub username: Option<String>,

    /// true si l'utilisateur peut payer des invoices (droit admin)
    #[serde(default)]
    pub admin: bool,
}

impl User {
    /// Nom à afficher dans le header
    pub fn display_name(&self) -> String {
        match &self.username {
            Some(name) => name.clone(),
            None => format!("user #{}", self.id),
        }
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_user() {
        let json = r#"{"id": 7, "username": "pleb", "admin": true}"#;
        let user: User = serde_json::from_str(json).unwrap();

        assert_eq!(user.id, 7);
        assert_eq!(user.display_name(), "pleb");
        assert!(user.admin);
    }

    #[test]
    fn test_deserialize_user_minimal() {
        // Le backend peut ne renvoyer que l'id
        let json = r#"{"id": 42}"#;
        let user: User = serde_json::from_str(json).unwrap();

        assert_eq!(user.id, 42);
        assert!(!user.admin);
        assert_eq!(user.display_name(), "user #42");
    }
}

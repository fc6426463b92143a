// ============================================================================
// Configuration
// ============================================================================
// Regroupe la configuration lue une seule fois au démarrage :
// - URL du backend pleb-wallet (variable d'environnement)
// - emplacement du fichier token (équivalent du localStorage du navigateur)
//
// CONCEPT RUST : std::env::var
// - Retourne Result<String, VarError>
// - unwrap_or_else() fournit la valeur par défaut si absente
// ============================================================================

use std::path::PathBuf;

/// URL du backend si PLEB_WALLET_BACKEND_URL n'est pas définie
const DEFAULT_BACKEND_URL: &str = "http://localhost:5500";

/// Configuration de l'application
#[derive(Debug, Clone)]
pub struct Config {
    /// URL de base du backend pleb-wallet (sans slash final)
    pub backend_url: String,

    /// Chemin du fichier contenant le bearer token
    pub token_path: PathBuf,
}

impl Config {
    /// Charge la configuration depuis l'environnement
    ///
    /// - PLEB_WALLET_BACKEND_URL : URL du backend (défaut: localhost:5500)
    /// - Le token est lu dans ~/.config/pleb-wallet-tui/token
    ///   (ou l'équivalent de la plateforme via le crate dirs)
    pub fn from_env() -> Self {
        let backend_url = std::env::var("PLEB_WALLET_BACKEND_URL")
            .unwrap_or_else(|_| DEFAULT_BACKEND_URL.to_string());

        Self {
            backend_url: normalize_url(backend_url),
            token_path: default_token_path(),
        }
    }

    /// Construit une URL complète vers un endpoint du backend
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.backend_url, path)
    }
}

/// Supprime le slash final éventuel de l'URL du backend
///
/// Évite les URLs du type "http://host//lightning/balance"
fn normalize_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

/// Emplacement du fichier token, écrit par le flux de login externe
///
/// - Linux/WSL : ~/.config/pleb-wallet-tui/token
/// - macOS : ~/Library/Application Support/pleb-wallet-tui/token
/// - Windows : C:\Users\<user>\AppData\Roaming\pleb-wallet-tui\token
fn default_token_path() -> PathBuf {
    // Fallback sur ./token si le répertoire de config est introuvable
    let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("pleb-wallet-tui").join("token")
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_url_strips_trailing_slash() {
        assert_eq!(
            normalize_url("http://localhost:5500/".to_string()),
            "http://localhost:5500"
        );
        assert_eq!(
            normalize_url("http://localhost:5500".to_string()),
            "http://localhost:5500"
        );
    }

    #[test]
    fn test_endpoint_building() {
        let config = Config {
            backend_url: "http://localhost:5500".to_string(),
            token_path: PathBuf::from("/tmp/token"),
        };

        assert_eq!(
            config.endpoint("/lightning/balance"),
            "http://localhost:5500/lightning/balance"
        );
    }

    #[test]
    fn test_default_token_path_ends_with_token() {
        let path = default_token_path();
        assert!(path.ends_with("pleb-wallet-tui/token") || path.ends_with("token"));
    }
}

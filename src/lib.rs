// ============================================================================
// pleb-wallet-tui - Library
// ============================================================================
// Expose les modules publics pour le binaire et les tests
// ============================================================================

pub mod api;     // Clients API (backend pleb-wallet, Coinbase)
pub mod app;     // État de l'application
pub mod config;  // Configuration (URL backend, fichier token)
pub mod models;  // Structures de données
pub mod poller;  // Rafraîchissement périodique des données
pub mod session; // Session Gate (anonyme vs authentifié)
pub mod ui;      // Interface utilisateur

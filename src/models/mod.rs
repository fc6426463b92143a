// ============================================================================
// Module : models
// ============================================================================
// Ce module contient toutes les structures de données de l'application
//
// CONCEPT RUST : Modules et visibilité
// - "pub mod" : déclare un sous-module publique (accessible depuis l'extérieur)
// - Sans "pub", le module serait privé au crate
// ============================================================================

pub mod invoice; // Déclaration du module invoice (fichier invoice.rs)
pub mod price;   // Déclaration du module price (fichier price.rs)
pub mod user;    // Déclaration du module user (fichier user.rs)

// Re-export des structures principales pour simplifier les imports
// Au lieu de : use plebwallet::models::price::PriceSeries;
// On peut faire : use plebwallet::models::PriceSeries;
pub use invoice::Invoice;
pub use price::{PricePoint, PriceSeries};
pub use user::User;

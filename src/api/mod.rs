// ============================================================================
// Module : api
// ============================================================================
// Ce module contient tous les clients API : le backend pleb-wallet
// (soldes, invoices, identité, paiements) et Coinbase (prix spot BTC-USD)
// ============================================================================

pub mod backend;  // Client API du backend pleb-wallet
pub mod coinbase; // Client API Coinbase (prix spot)

// Re-export des fonctions principales
pub use backend::{
    create_invoice, fetch_channel_balance, fetch_transactions, fetch_user,
    fetch_wallet_balance, pay_invoice, PaymentReceipt,
};
pub use coinbase::fetch_spot_price;

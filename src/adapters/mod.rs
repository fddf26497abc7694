// Adapters layer: concrete implementations of the domain ports (platform API, site content).

pub mod content;
pub mod secure_privacy;

pub use content::HttpContentStore;
pub use secure_privacy::SecurePrivacyClient;

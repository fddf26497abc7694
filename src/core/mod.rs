pub mod injection;
pub mod installer;

pub use crate::domain::model::{DomainRegistration, InstallSummary, ScriptInjectionResult};
pub use crate::domain::ports::{ConsentPlatform, SiteContentStore};
pub use crate::utils::error::Result;

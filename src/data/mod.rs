//! Site data: the JSON document models, the fetch boundary, and the
//! memoizing services the page sections read from.

pub mod cache;
pub mod fetch;
pub mod models;
pub mod services;

pub use fetch::{HttpGet, ReqwestFetcher};
pub use models::{AboutMe, HeroImage, Platform, Project, SiteProperties, SocialIcons};
pub use services::Services;

//! Configuration module

mod site;

pub use site::HighlightConfig;
pub use site::NavItem;
pub use site::RendererConfig;
pub use site::SiteConfig;
pub use site::SocialLink;
pub use site::ThemeConfig;
pub use site::TransitionConfig;

pub mod directives;
pub mod loader;
pub mod parser;
pub mod resolver;
#[cfg(feature = "xpath")]
pub mod xpath;

pub use directives::{
    DEFAULT_KEY, DEFAULT_STRIP_CHARS, LevelConfig, SelectorKind, SelectorSet, SiteConfig, SiteConfigBuilder,
    StartUrlRule,
};
pub use loader::{ConfigLoader, ConfigLoaderBuilder};
pub use parser::ConfigParser;
#[cfg(feature = "xpath")]
pub use xpath::XPathQuery;

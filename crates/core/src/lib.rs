pub mod dom_tree;
pub mod encoding;
pub mod error;
pub mod extract;
pub mod extractor;
pub mod parse;
pub mod postprocess;
pub mod record;
pub mod scoring;
pub mod siteconfig;

#[doc(hidden)]
pub use dom_tree::{NodeKind, TreeNode};
pub use encoding::Body;
pub use error::{Result, StrataError};
pub use extract::{Fragments, itertext, will_skip_node};
pub use extractor::{Extractor, extract_page};
pub use parse::{Document, Matched, Scalar, Selection};
#[doc(hidden)]
pub use postprocess::Assembler;
pub use record::{Extracted, LevelRecord, OutputFormat, PageRecord};
pub use scoring::{level_depth, level_weight};
pub use siteconfig::{
    ConfigLoader, ConfigLoaderBuilder, ConfigParser, DEFAULT_KEY, DEFAULT_STRIP_CHARS, LevelConfig, SelectorKind,
    SelectorSet, SiteConfig, SiteConfigBuilder, StartUrlRule,
};

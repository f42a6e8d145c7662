// ─── Remote Manifests ───
// The two network discovery phases: mirror sweep (version/filenames/basic
// config documents) and package-manifest parsing into the catalog tree.

pub mod parser;
pub mod resolver;
pub mod tree;

pub use parser::{JsonManifestParser, ManifestParser};
pub use resolver::ManifestResolver;
pub use tree::ModTreeBuilder;

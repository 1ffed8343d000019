//! Config namespace: link config file shape, simplified input forms, and the
//! canonical [`LinkSpecification`] they all normalize into.

mod file;
mod input;
mod spec;

pub use file::{DEFAULT_CONFIG_FILE, LinkConfigFile, LinkMappingFile, PackageNames, load_link_config};
pub use input::{LinkConfigInput, PRESET_EXCLUDES, Preset};
pub use spec::{DEFAULT_IGNORES, LinkMapping, LinkSpecification, SessionDefaults};

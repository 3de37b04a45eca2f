mod layer;

pub use layer::{project_dir, read_json, ConfigLayer, CONFIG_DIR_NAME};

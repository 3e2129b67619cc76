pub mod loader;
pub mod schema;

pub use loader::{get_config_path, load_robot_config};
pub use schema::{Attributes, ComponentConfig, RobotConfig};

pub mod loader;
pub mod schema;

pub use loader::{
    load_config, load_config_from_str, load_mailer_config, load_mailer_config_from_str,
};
pub use schema::{Config, MailerConfig};

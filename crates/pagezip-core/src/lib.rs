pub mod config;
pub mod logging;

pub mod archive;
pub mod checksum;
pub mod extract;
pub mod fetch;
pub mod layout;
pub mod request_id;
pub mod url_model;

pub use archive::{generate_zip_file, generate_zip_file_with_id, ArchiveError};

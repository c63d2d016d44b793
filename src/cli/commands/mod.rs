mod delete;
mod metadata;
mod status;
mod upload;

pub use delete::DeleteArgs;
pub use metadata::MetadataArgs;
pub use upload::UploadArgs;

pub use delete::handle_delete;
pub use metadata::handle_metadata;
pub use status::handle_status;
pub use upload::handle_upload;

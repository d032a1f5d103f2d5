pub mod file_request_handler;

pub use file_request_handler::{__path_get_upload_request, get_upload_request};

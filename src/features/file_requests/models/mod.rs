mod file_request;

pub use file_request::{generate_request_token, FileRequest, FileRequestStatus, NewFileRequest};

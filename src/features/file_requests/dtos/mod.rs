pub mod file_request_dto;

pub use file_request_dto::FileRequestLookupDto;

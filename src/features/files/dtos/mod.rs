pub mod trash_dto;

pub use trash_dto::{TrashQuery, TrashedFileDto};

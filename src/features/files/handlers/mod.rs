pub mod trash_handler;

pub use trash_handler::{
    __path_list_trash, __path_purge_file, __path_restore_file, list_trash, purge_file,
    restore_file, TrashState,
};

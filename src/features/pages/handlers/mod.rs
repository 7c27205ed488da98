pub mod page_handler;

pub use page_handler::{
    __path_create_page, __path_delete_page, __path_get_page, __path_list_pages,
    __path_update_page, create_page, delete_page, get_page, list_pages, update_page,
};

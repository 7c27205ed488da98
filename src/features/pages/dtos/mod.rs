mod page_dto;

pub use page_dto::{CreatePageDto, PageAuthorDto, PageResponseDto, UpdatePageDto};

mod page;

pub use page::{Page, PageStatus, PageWithAuthor};

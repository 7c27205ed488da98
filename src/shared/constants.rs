/// Default page size for pagination
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

/// Template applied to pages created without an explicit one
pub const DEFAULT_PAGE_TEMPLATE: &str = "default";

// Core modules implementing the record file, its text layout, and error modeling.
pub mod error;
pub mod format;
pub mod record;
pub mod store;

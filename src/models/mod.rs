mod article;
mod entry;

pub use article::{Article, StoredArticle};
pub use entry::{Enclosure, MediaAttachment, RawEntry};

/// One item from a parsed feed, before filtering and normalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawEntry {
    pub title: String,
    pub link: String,
    pub published: Option<String>,
    /// Raw summary, may carry markup.
    pub summary: Option<String>,
    pub media_content: Vec<MediaAttachment>,
    pub media_thumbnails: Vec<String>,
    pub enclosures: Vec<Enclosure>,
    /// Full HTML content blocks.
    pub content: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaAttachment {
    pub url: String,
    pub mime_type: Option<String>,
    pub width: Option<u32>,
}

impl MediaAttachment {
    pub fn is_image(&self) -> bool {
        is_image_type(self.mime_type.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Enclosure {
    pub href: String,
    pub mime_type: Option<String>,
}

impl Enclosure {
    pub fn is_image(&self) -> bool {
        is_image_type(self.mime_type.as_deref())
    }
}

fn is_image_type(mime: Option<&str>) -> bool {
    mime.is_some_and(|m| m.starts_with("image"))
}

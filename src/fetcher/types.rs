use url::Url;

/// A downloaded HTML page, already decoded to UTF-8.
#[derive(Debug)]
pub struct PageResponse {
    /// Address after redirects; relative image sources resolve against it.
    pub url_final: Url,
    pub body_utf8: String,
}

impl PageResponse {
    /// Scheme and host of the final URL, with an empty path.
    pub fn origin(&self) -> Url {
        let mut origin = self.url_final.clone();
        origin.set_path("/");
        origin.set_query(None);
        origin.set_fragment(None);
        origin
    }
}

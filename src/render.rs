//! Page documents shown by the display surface.
//!
//! A rendered page is a JSON file in a temp directory, addressed by a
//! `file://` URL. The file lives exactly as long as its [`RenderedPage`].

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use url::Url;

use crate::error::RenderError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "text", rename_all = "snake_case")]
pub enum PageBody {
    Loading,
    Translated(String),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub target: String,
    pub body: PageBody,
}

impl Page {
    pub fn loading(target: &str) -> Self {
        Self { target: target.to_string(), body: PageBody::Loading }
    }

    pub fn translated(target: &str, translated: &str) -> Self {
        Self { target: target.to_string(), body: PageBody::Translated(translated.to_string()) }
    }

    pub fn failed(target: &str, error: &dyn std::error::Error) -> Self {
        Self { target: target.to_string(), body: PageBody::Failed(error.to_string()) }
    }

    pub fn load(url: &Url) -> Result<Self, RenderError> {
        let path = url
            .to_file_path()
            .map_err(|()| RenderError::NotLocal(url.to_string()))?;
        let bytes = fs::read(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// A page written to disk. Dropping it removes the file.
#[derive(Debug)]
pub struct RenderedPage {
    file: NamedTempFile,
    url: Url,
}

impl RenderedPage {
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

pub trait Renderer: Send + Sync + 'static {
    fn render(&self, page: &Page) -> Result<RenderedPage, RenderError>;
}

#[derive(Debug, Clone)]
pub struct JsonPageRenderer {
    dir: PathBuf,
}

impl JsonPageRenderer {
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl Default for JsonPageRenderer {
    fn default() -> Self {
        Self::in_dir(std::env::temp_dir())
    }
}

impl Renderer for JsonPageRenderer {
    fn render(&self, page: &Page) -> Result<RenderedPage, RenderError> {
        let mut file = tempfile::Builder::new()
            .prefix("translated")
            .suffix(".json")
            .tempfile_in(&self.dir)?;
        serde_json::to_writer(file.as_file_mut(), page)?;
        file.as_file_mut().flush()?;

        let url = Url::from_file_path(file.path())
            .map_err(|()| RenderError::NotLocal(file.path().display().to_string()))?;
        Ok(RenderedPage { file, url })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rendered_page_loads_back_from_its_url() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = JsonPageRenderer::in_dir(dir.path());
        let page = Page::translated("Good night", "おやすみなさい");

        let rendered = renderer.render(&page).unwrap();
        assert_eq!(rendered.url().scheme(), "file");
        assert_eq!(Page::load(rendered.url()).unwrap(), page);
    }

    #[test]
    fn dropping_the_page_removes_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let rendered = JsonPageRenderer::in_dir(dir.path())
            .render(&Page::loading("Hello"))
            .unwrap();
        let path = rendered.path().to_path_buf();
        assert!(path.exists());

        drop(rendered);
        assert!(!path.exists());
    }

    #[test]
    fn loading_page_has_no_text() {
        let json = serde_json::to_value(Page::loading("Hi")).unwrap();
        assert_eq!(json, serde_json::json!({"target": "Hi", "body": {"state": "loading"}}));
    }

    #[test]
    fn remote_url_is_rejected() {
        let url = Url::parse("https://example.com/page.json").unwrap();
        assert!(matches!(Page::load(&url), Err(RenderError::NotLocal(_))));
    }

    #[test]
    fn missing_directory_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = JsonPageRenderer::in_dir(dir.path().join("gone"));
        assert!(matches!(renderer.render(&Page::loading("x")), Err(RenderError::Io(_))));
    }
}

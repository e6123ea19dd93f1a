use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use cityweather_core::{HtmlRegion, RenderError, Renderer, WeatherCard};
use parking_lot::Mutex;

/// Display region mirrored into a standalone HTML page on disk.
///
/// The page reloads itself, so a browser pointed at the file follows the
/// controller's renders.
#[derive(Debug)]
pub struct PageRenderer {
    region: HtmlRegion,
    path: PathBuf,
    reload_secs: u64,
    write_lock: Mutex<()>,
}

impl PageRenderer {
    pub fn new(path: PathBuf, reload_secs: u64) -> Result<Arc<Self>, RenderError> {
        Ok(Arc::new(Self {
            region: HtmlRegion::new()?,
            path,
            reload_secs: reload_secs.max(1),
            write_lock: Mutex::new(()),
        }))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn publish(&self) -> Result<(), RenderError> {
        let _guard = self.write_lock.lock();
        let page = page_document(&self.region.html(), self.reload_secs);

        let tmp = self.path.with_extension("html.tmp");
        fs::write(&tmp, page)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl Renderer for PageRenderer {
    // The page is only rewritten with new content, so a reload never
    // catches the blank region between clear and render.
    fn clear(&self) -> Result<(), RenderError> {
        self.region.clear()
    }

    fn render_weather(&self, card: &WeatherCard) -> Result<(), RenderError> {
        self.region.render_weather(card)?;
        self.publish()
    }

    fn render_error(&self, message: &str) -> Result<(), RenderError> {
        self.region.render_error(message)?;
        self.publish()
    }
}

fn page_document(region: &str, reload_secs: u64) -> String {
    let display = if region.is_empty() { "none" } else { "flex" };
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta http-equiv="refresh" content="{reload_secs}">
<title>Weather</title>
</head>
<body>
<div class="informations" style="display: {display}; flex-direction: column;">
{region}
</div>
</body>
</html>
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_region_is_hidden() {
        let page = page_document("", 30);
        assert!(page.contains("display: none"));
        assert!(page.contains(r#"content="30""#));
    }

    #[test]
    fn error_is_published_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weather.html");

        let renderer = PageRenderer::new(path.clone(), 0).unwrap();
        renderer.render_error("Please enter a city").unwrap();

        let page = fs::read_to_string(&path).unwrap();
        assert!(page.contains(r#"<p class="errorDisplay">Please enter a city</p>"#));
        assert!(page.contains("display: flex"));
        assert!(page.contains(r#"content="1""#));
        assert!(!dir.path().join("weather.html.tmp").exists());
    }

    #[test]
    fn clear_does_not_blank_the_page() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weather.html");
        let renderer = PageRenderer::new(path.clone(), 30).unwrap();

        renderer.clear().unwrap();
        assert!(!path.exists());

        renderer.render_error("Could not fetch data from the API").unwrap();
        renderer.clear().unwrap();

        let page = fs::read_to_string(&path).unwrap();
        assert!(page.contains("Could not fetch data from the API"));
        assert!(page.contains("display: flex"));
        assert!(renderer.region.is_empty());
    }
}

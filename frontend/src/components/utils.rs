use super::super::Model;
use gloo_file::{Blob, File as GlooFile, ObjectUrl};
use shared::has_accepted_extension;
use std::sync::atomic::{AtomicU64, Ordering};
use wasm_bindgen::JsCast;
use web_sys::{FileList, HtmlAnchorElement};
use yew::prelude::*;

pub fn generate_id() -> u64 {
    static ID_COUNTER: AtomicU64 = AtomicU64::new(0);
    ID_COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// The first jpg/jpeg/png file in the list, if any.
pub fn first_accepted_file(file_list: &FileList) -> Option<GlooFile> {
    (0..file_list.length())
        .filter_map(|i| file_list.item(i))
        .find(|file| is_accepted(&file.name(), &file.type_()))
        .map(GlooFile::from)
}

pub fn is_accepted(file_name: &str, mime_type: &str) -> bool {
    matches!(mime_type, "image/jpeg" | "image/png") || has_accepted_extension(file_name)
}

/// Offers `bytes` to the browser as a download named `file_name`.
///
/// The returned URL must outlive the click, so the caller keeps it.
pub fn trigger_download(
    bytes: &[u8],
    mime_type: &str,
    file_name: &str,
) -> Result<ObjectUrl, String> {
    let url = ObjectUrl::from(Blob::new_with_options(bytes, Some(mime_type)));

    let anchor = web_sys::window()
        .and_then(|window| window.document())
        .and_then(|document| document.create_element("a").ok())
        .and_then(|element| element.dyn_into::<HtmlAnchorElement>().ok())
        .ok_or_else(|| "Could not start the download.".to_string())?;
    anchor.set_href(&url);
    anchor.set_download(file_name);
    anchor.click();

    Ok(url)
}

pub fn render_error_message(model: &Model) -> Html {
    if let Some(error_msg) = &model.error {
        html! {
            <div class="error-message">
                <i class="fa-solid fa-circle-exclamation"></i>
                <p>{ error_msg }</p>
            </div>
        }
    } else {
        html! {}
    }
}

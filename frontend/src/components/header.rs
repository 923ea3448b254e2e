use yew::prelude::*;

/// Renders the application header
pub fn render_header() -> Html {
    html! {
        <header class="app-header">
            <h1><i class="fa-solid fa-user-secret"></i> {" Deepfake Image Detection"}</h1>
            <p class="subtitle">{"Upload an image via button, drag & drop, or paste"}</p>
        </header>
    }
}

mod api;
mod components;

use components::handlers;
use components::header::render_header;
use components::preview_area::render_preview_area;
use components::report_section::render_report_section;
use components::upload_section::render_upload_section;
use components::utils::render_error_message;
use gloo_events::EventListener;
use gloo_file::{File as GlooFile, ObjectUrl};
use shared::PredictionResponse;
use wasm_bindgen::JsCast;
use web_sys::{ClipboardEvent, DragEvent};
use yew::prelude::*;

/// The image currently on screen, with its preview kept alive for the `<img>` tag.
pub struct SelectedImage {
    pub id: u64,
    pub file: GlooFile,
    pub preview_url: ObjectUrl,
}

pub enum Msg {
    // File operations
    FileSelected(GlooFile),
    ClearFile,

    // Prediction, tagged with the id of the image it was made for
    PredictionReady(u64, PredictionResponse),
    PredictionFailed(u64, String),

    // Report
    SetUserName(String),
    GenerateReport,
    ReportReady(Vec<u8>),

    // UI states
    SetError(Option<String>),
    SetDragging(bool),

    // Input events
    HandleDrop(DragEvent),
    HandlePaste(ClipboardEvent),
}

pub struct Model {
    pub image: Option<SelectedImage>,
    pub prediction: Option<PredictionResponse>,
    pub user_name: String,
    pub loading: bool,
    pub generating_report: bool,
    pub report_url: Option<ObjectUrl>,
    pub error: Option<String>,
    pub is_dragging: bool,
    paste_listener: Option<EventListener>,
}

impl Component for Model {
    type Message = Msg;
    type Properties = ();

    fn create(ctx: &Context<Self>) -> Self {
        let mut model = Self {
            image: None,
            prediction: None,
            user_name: String::new(),
            loading: false,
            generating_report: false,
            report_url: None,
            error: None,
            is_dragging: false,
            paste_listener: None,
        };

        if let Some(window) = web_sys::window() {
            let link = ctx.link().clone();
            let listener = EventListener::new(&window, "paste", move |event| {
                if let Some(clipboard_event) = event.dyn_ref::<ClipboardEvent>() {
                    link.send_message(Msg::HandlePaste(clipboard_event.clone()));
                }
            });
            model.paste_listener = Some(listener);
        }

        model
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::FileSelected(file) => handlers::handle_file_selected(self, ctx, file),
            Msg::ClearFile => handlers::handle_clear_file(self),

            Msg::PredictionReady(id, response) => {
                handlers::handle_prediction_ready(self, id, response)
            }
            Msg::PredictionFailed(id, error) => handlers::handle_prediction_failed(self, id, error),

            Msg::SetUserName(name) => {
                self.user_name = name;
                true
            }
            Msg::GenerateReport => handlers::handle_generate_report(self, ctx),
            Msg::ReportReady(bytes) => handlers::handle_report_ready(self, bytes),

            Msg::SetError(error) => {
                self.error = error;
                self.loading = false;
                self.generating_report = false;
                true
            }
            Msg::SetDragging(is_dragging) => {
                self.is_dragging = is_dragging;
                true
            }

            Msg::HandleDrop(event) => handlers::handle_drop(self, ctx, event),
            Msg::HandlePaste(event) => handlers::handle_paste(ctx, event),
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        html! {
            <div class="container">
                { render_header() }

                <main class="main-content">
                { render_upload_section(self, ctx) }
                { render_error_message(self) }
                { render_preview_area(self, ctx) }
                { render_report_section(self, ctx) }
                </main>

                <footer class="app-footer">
                    <p>{"Deepfake Image Detection | Fullstack Rust WASM"}</p>
                </footer>
            </div>
        }
    }
}

fn main() {
    wasm_logger::init(wasm_logger::Config::default());
    log::info!("App starting...");
    yew::Renderer::<Model>::new().render();
}

use super::super::Model;
use super::super::Msg;
use shared::REPORT_FILE_NAME;
use web_sys::HtmlInputElement;
use yew::prelude::*;

/// Name entry and report download, offered once a prediction is on screen.
pub fn render_report_section(model: &Model, ctx: &Context<Model>) -> Html {
    if model.prediction.is_none() {
        return html! {};
    }

    let link = ctx.link().clone();
    let handle_input = link.callback(|e: InputEvent| {
        let input: HtmlInputElement = e.target_unchecked_into();
        Msg::SetUserName(input.value())
    });

    html! {
        <div class="report-section">
            <label for="user-name">{"Enter your name:"}</label>
            <input
                id="user-name"
                type="text"
                value={model.user_name.clone()}
                oninput={handle_input}
            />
            <button
                class="analyze-btn"
                disabled={model.generating_report}
                onclick={link.callback(|_| Msg::GenerateReport)}
            >
                {
                    if model.generating_report {
                        html! { <><i class="fa-solid fa-spinner fa-spin"></i>{" Generating..."}</> }
                    } else {
                        html! { <><i class="fa-solid fa-file-pdf"></i>{" Generate Report"}</> }
                    }
                }
            </button>
            {
                if let Some(url) = &model.report_url {
                    html! {
                        <a class="download-link" href={url.to_string()} download={REPORT_FILE_NAME}>
                            <i class="fa-solid fa-download"></i>{" Download Report"}
                        </a>
                    }
                } else {
                    html! {}
                }
            }
        </div>
    }
}

use super::super::Model;
use super::super::Msg;
use shared::Label;
use yew::prelude::*;

pub fn render_preview_area(model: &Model, ctx: &Context<Model>) -> Html {
    let Some(image) = model.image.as_ref() else {
        return html! {};
    };

    html! {
        <div id="preview-container">
            <figure class="image-preview">
                <img id="actual-image-preview"
                    src={image.preview_url.to_string()}
                    alt={image.file.name()}
                    style="max-width:100%; max-height: 400px; object-fit: contain; margin-bottom: 10px;" />
                <figcaption>{ render_caption(model) }</figcaption>
            </figure>
            <div class="button-container">
                <button
                    class="analyze-btn"
                    style="background-color: var(--danger-color);"
                    onclick={ctx.link().callback(|_| Msg::ClearFile)}
                >
                    <i class="fa-solid fa-trash"></i>{" Clear"}
                </button>
            </div>
        </div>
    }
}

fn render_caption(model: &Model) -> Html {
    if model.loading {
        return html! { <><i class="fa-solid fa-spinner fa-spin"></i>{" Analyzing..."}</> };
    }

    match &model.prediction {
        Some(prediction) => {
            let class = match prediction.label {
                Label::Fake => "ai-detected",
                Label::Real => "not-ai",
            };
            html! {
                <div class={classes!("result-header", class)}>
                    <h2>{ format!("Prediction: {}", prediction.label) }</h2>
                    <p class="meter-value" title={format!("Request {}", prediction.request_id)}>
                        { format!("Score {:.4} ({} model)", prediction.score, prediction.route) }
                    </p>
                </div>
            }
        }
        None => html! {},
    }
}

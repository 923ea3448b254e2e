use image::DynamicImage;
use shared::Route;

use super::PipelineError;
use super::preprocess::to_tensor;
use crate::model::LoadedModel;

/// Raw score plus the predictor that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scored {
    pub route: Route,
    pub score: f32,
}

/// Hides the primary/secondary pair behind a single `predict`.
///
/// The primary always wins when it is loaded; the secondary only runs when no primary exists.
#[derive(Debug)]
pub struct PredictionSelector {
    primary: Option<LoadedModel>,
    secondary: Option<LoadedModel>,
}

impl PredictionSelector {
    pub fn new(primary: Option<LoadedModel>, secondary: Option<LoadedModel>) -> Self {
        Self { primary, secondary }
    }

    pub fn primary(&self) -> Option<&LoadedModel> {
        self.primary.as_ref()
    }

    pub fn secondary(&self) -> Option<&LoadedModel> {
        self.secondary.as_ref()
    }

    /// The route the next request will take, if any model is loaded.
    pub fn route(&self) -> Option<Route> {
        self.select().ok().map(|(route, _)| route)
    }

    fn select(&self) -> Result<(Route, &LoadedModel), PipelineError> {
        match (&self.primary, &self.secondary) {
            (Some(model), _) => Ok((Route::Primary, model)),
            (None, Some(model)) => Ok((Route::Secondary, model)),
            (None, None) => Err(PipelineError::ModelUnavailable),
        }
    }

    pub fn predict(&self, image: &DynamicImage) -> Result<Scored, PipelineError> {
        let (route, model) = self.select()?;
        let tensor = to_tensor(image, model.input_size());
        let output = model.forward(&tensor)?;
        let score = output
            .get((0, 0))
            .copied()
            .ok_or(PipelineError::EmptyOutput)?;

        if !(0.0..=1.0).contains(&score) {
            log::warn!(
                "{} model returned score {} outside [0, 1]",
                model.name(),
                score
            );
        }

        Ok(Scored { route, score })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::testing::FixedPredictor;
    use image::{ImageBuffer, Rgb};

    fn sample_image() -> DynamicImage {
        DynamicImage::ImageRgb8(ImageBuffer::from_pixel(100, 50, Rgb([12, 34, 56])))
    }

    #[test]
    fn returns_primary_score_unchanged() {
        let primary = FixedPredictor::new(0.73);
        let selector = PredictionSelector::new(Some(primary.into_model("primary", 224)), None);

        let scored = selector.predict(&sample_image()).unwrap();
        assert_eq!(scored, Scored { route: Route::Primary, score: 0.73 });
    }

    #[test]
    fn secondary_is_never_invoked_while_primary_is_loaded() {
        let primary = FixedPredictor::new(0.2);
        let secondary = FixedPredictor::new(0.9);
        let selector = PredictionSelector::new(
            Some(primary.clone().into_model("primary", 224)),
            Some(secondary.clone().into_model("secondary", 256)),
        );

        for _ in 0..5 {
            let scored = selector.predict(&sample_image()).unwrap();
            assert_eq!(scored.route, Route::Primary);
            assert_eq!(scored.score, 0.2);
        }

        assert_eq!(primary.calls(), 5);
        assert_eq!(secondary.calls(), 0);
        assert_eq!(primary.last_shape(), Some(vec![1, 224, 224, 3]));
    }

    #[test]
    fn falls_back_to_secondary_at_its_resolution() {
        let secondary = FixedPredictor::new(0.9);
        let selector =
            PredictionSelector::new(None, Some(secondary.clone().into_model("secondary", 256)));

        let scored = selector.predict(&sample_image()).unwrap();
        assert_eq!(scored.route, Route::Secondary);
        assert_eq!(scored.score, 0.9);
        assert_eq!(secondary.calls(), 1);
        assert_eq!(secondary.last_shape(), Some(vec![1, 256, 256, 3]));
        assert_eq!(selector.route(), Some(Route::Secondary));
    }

    #[test]
    fn no_models_is_model_unavailable() {
        let selector = PredictionSelector::new(None, None);

        assert_eq!(selector.route(), None);
        let err = selector.predict(&sample_image()).unwrap_err();
        assert!(matches!(err, PipelineError::ModelUnavailable));
    }
}

//! UI-facing state and the only rules allowed to change it.

use tracing::{debug, warn};

use crate::{error::ResolutionError, model::Resolution};

/// Monotonic tag given to every submitted query.
pub type Generation = u64;

#[derive(Debug, Clone, PartialEq)]
pub struct LoadedView {
    pub resolution: Resolution,
    pub forecast_visible: bool,
}

impl LoadedView {
    /// The forecast toggle is only offered when a forecast was resolved.
    pub fn can_toggle_forecast(&self) -> bool {
        self.resolution.forecast.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum ViewState {
    #[default]
    Idle,
    Loading,
    Loaded(LoadedView),
    Error(String),
}

#[derive(Debug)]
pub enum Event {
    Submit,
    ResolveOk(Generation, Resolution),
    ResolveErr(Generation, ResolutionError),
    ToggleForecast,
}

/// What the caller has to do after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Start resolving the submitted query under this generation.
    Resolve(Generation),
    Render,
    ShowError,
    /// Event was stale or not applicable in the current state.
    None,
}

#[derive(Debug, Default)]
pub struct ViewStateMachine {
    state: ViewState,
    generation: Generation,
}

impl ViewStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Generation of the most recently submitted query.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, ViewState::Loading)
    }

    pub fn apply(&mut self, event: Event) -> Effect {
        match event {
            Event::Submit => {
                self.generation += 1;
                self.state = ViewState::Loading;
                debug!(generation = self.generation, "query submitted");
                Effect::Resolve(self.generation)
            }
            Event::ResolveOk(generation, resolution) => {
                if !self.accepts(generation) {
                    return Effect::None;
                }
                self.state = ViewState::Loaded(LoadedView {
                    resolution,
                    forecast_visible: false,
                });
                Effect::Render
            }
            Event::ResolveErr(generation, err) => {
                if !self.accepts(generation) {
                    return Effect::None;
                }
                self.state = ViewState::Error(err.to_string());
                Effect::ShowError
            }
            Event::ToggleForecast => match &mut self.state {
                ViewState::Loaded(view) if view.can_toggle_forecast() => {
                    view.forecast_visible = !view.forecast_visible;
                    Effect::Render
                }
                _ => Effect::None,
            },
        }
    }

    /// Shorthand for [`Event::Submit`]; returns the new generation.
    pub fn submit(&mut self) -> Generation {
        match self.apply(Event::Submit) {
            Effect::Resolve(generation) => generation,
            _ => self.generation,
        }
    }

    pub fn complete(
        &mut self,
        generation: Generation,
        result: Result<Resolution, ResolutionError>,
    ) -> Effect {
        match result {
            Ok(resolution) => self.apply(Event::ResolveOk(generation, resolution)),
            Err(err) => self.apply(Event::ResolveErr(generation, err)),
        }
    }

    pub fn toggle_forecast(&mut self) -> Effect {
        self.apply(Event::ToggleForecast)
    }

    fn accepts(&self, generation: Generation) -> bool {
        if generation != self.generation {
            warn!(
                generation,
                current = self.generation,
                "dropping stale completion"
            );
            return false;
        }
        if !self.is_loading() {
            debug!(generation, "completion arrived outside of loading state");
            return false;
        }
        true
    }
}

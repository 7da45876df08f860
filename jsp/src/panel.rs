use std::fmt;

use indexmap::IndexMap;
use rand::Rng;
use tracing::{debug, warn};

use crate::{
    error::Error,
    model::Joint,
    surface::{format_position, Element, ElementId, Surface},
};

/// Called after every user edit with the updated sliders.
pub type OnChange = Box<dyn FnMut(&IndexMap<String, SliderState>) -> Result<(), Error> + Send>;

/// Current value of one joint together with the two inputs that show it.
#[derive(Debug, Clone, PartialEq)]
pub struct SliderState {
    joint: Joint,
    current_value: f64,
    text_input: ElementId,
    range_input: ElementId,
}

impl SliderState {
    pub fn joint_name(&self) -> &str {
        self.joint.name()
    }

    pub fn joint(&self) -> &Joint {
        &self.joint
    }

    pub fn current_value(&self) -> f64 {
        self.current_value
    }

    pub fn text_input(&self) -> ElementId {
        self.text_input
    }

    pub fn range_input(&self) -> ElementId {
        self.range_input
    }

    fn is_bound_to(&self, element: ElementId) -> bool {
        self.text_input == element || self.range_input == element
    }

    fn write<S>(&mut self, surface: &mut S, position: f64)
    where
        S: Surface + ?Sized,
    {
        self.current_value = position;
        for element in [self.text_input, self.range_input] {
            if let Some(element) = surface.element_mut(element) {
                element.set_position(position);
            }
        }
    }
}

/// One label, text box and range slider per joint.
pub struct SliderPanel {
    sliders: IndexMap<String, SliderState>,
    on_change: OnChange,
}

impl fmt::Debug for SliderPanel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SliderPanel")
            .field("sliders", &self.sliders)
            .finish_non_exhaustive()
    }
}

impl SliderPanel {
    /// Appends the rows for `joints` to `surface`, in order.
    ///
    /// Each row is the joint name, its text box, a line break, its range
    /// slider and another line break.
    pub fn render<S, F>(surface: &mut S, joints: &[Joint], on_change: F) -> Self
    where
        S: Surface + ?Sized,
        F: FnMut(&IndexMap<String, SliderState>) -> Result<(), Error> + Send + 'static,
    {
        let mut sliders = IndexMap::with_capacity(joints.len());
        for joint in joints {
            let name = joint.name();
            surface.append(Element::Text(name.to_owned()));
            let text_input = surface.append(Element::TextInput {
                id: format!("{name}_text"),
                value: format_position(joint.initial()),
            });
            surface.append(Element::LineBreak);
            let range_input = surface.append(Element::RangeInput {
                id: format!("{name}_slider"),
                min: joint.min(),
                max: joint.max(),
                step: joint.step(),
                value: joint.initial(),
            });
            surface.append(Element::LineBreak);
            sliders.insert(
                name.to_owned(),
                SliderState {
                    joint: joint.clone(),
                    current_value: joint.initial(),
                    text_input,
                    range_input,
                },
            );
        }
        Self {
            sliders,
            on_change: Box::new(on_change),
        }
    }

    pub fn sliders(&self) -> &IndexMap<String, SliderState> {
        &self.sliders
    }

    pub fn get(&self, joint_name: &str) -> Option<&SliderState> {
        self.sliders.get(joint_name)
    }

    pub fn len(&self) -> usize {
        self.sliders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sliders.is_empty()
    }

    /// Handles the text box losing focus: its text is copied into the paired
    /// slider and the change is reported.
    ///
    /// Text that is not a number is reverted to the current value and
    /// reported as [`Error::InvalidPosition`] without a change notification.
    pub fn text_committed<S>(&mut self, surface: &mut S, element: ElementId) -> Result<f64, Error>
    where
        S: Surface + ?Sized,
    {
        let index = self.index_of(element)?;
        let raw = match surface.element(element) {
            Some(Element::TextInput { value, .. }) => value.clone(),
            _ => return Err(Error::NoElement(element)),
        };
        match raw.trim().parse::<f64>() {
            Ok(position) if position.is_finite() => self.apply(surface, index, element, position),
            _ => Err(self.revert(surface, index, element, raw)),
        }
    }

    /// Handles a change of the range slider: its value is copied into the
    /// paired text box and the change is reported.
    ///
    /// A non-finite value is reverted like invalid text.
    pub fn slider_changed<S>(&mut self, surface: &mut S, element: ElementId) -> Result<f64, Error>
    where
        S: Surface + ?Sized,
    {
        let index = self.index_of(element)?;
        let position = match surface.element(element) {
            Some(Element::RangeInput { value, .. }) => *value,
            _ => return Err(Error::NoElement(element)),
        };
        if !position.is_finite() {
            return Err(self.revert(surface, index, element, position.to_string()));
        }
        self.apply(surface, index, element, position)
    }

    /// Moves every slider back to its joint's initial value.
    pub fn center<S>(&mut self, surface: &mut S) -> Result<(), Error>
    where
        S: Surface + ?Sized,
    {
        for slider in self.sliders.values_mut() {
            let initial = slider.joint.initial();
            slider.write(surface, initial);
        }
        (self.on_change)(&self.sliders)
    }

    /// Moves every slider to a random value within its range.
    pub fn randomize<S>(&mut self, surface: &mut S) -> Result<(), Error>
    where
        S: Surface + ?Sized,
    {
        let mut rng = rand::thread_rng();
        for slider in self.sliders.values_mut() {
            let position = rng.gen_range(slider.joint.range());
            slider.write(surface, position);
        }
        (self.on_change)(&self.sliders)
    }

    fn index_of(&self, element: ElementId) -> Result<usize, Error> {
        self.sliders
            .values()
            .position(|slider| slider.is_bound_to(element))
            .ok_or(Error::NoElement(element))
    }

    fn apply<S>(
        &mut self,
        surface: &mut S,
        index: usize,
        element: ElementId,
        position: f64,
    ) -> Result<f64, Error>
    where
        S: Surface + ?Sized,
    {
        let (joint, slider) = self
            .sliders
            .get_index_mut(index)
            .ok_or(Error::NoElement(element))?;
        // Same clamping as a range input.
        let position = position.clamp(slider.joint.min(), slider.joint.max());
        debug!(joint = %joint, position, "update");
        slider.write(surface, position);
        (self.on_change)(&self.sliders)?;
        Ok(position)
    }

    /// Puts both inputs back to the current value without notifying.
    fn revert<S>(
        &mut self,
        surface: &mut S,
        index: usize,
        element: ElementId,
        input: String,
    ) -> Error
    where
        S: Surface + ?Sized,
    {
        let Some((joint, slider)) = self.sliders.get_index_mut(index) else {
            return Error::NoElement(element);
        };
        warn!(joint = %joint, %input, "Position is not a valid number");
        let current = slider.current_value;
        slider.write(surface, current);
        Error::InvalidPosition {
            joint: joint.clone(),
            input,
        }
    }
}

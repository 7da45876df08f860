use auto_impl::auto_impl;
use serde::{Deserialize, Serialize};

/// Index of an element inside its surface.
pub type ElementId = usize;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Element {
    Text(String),
    TextInput {
        id: String,
        value: String,
    },
    LineBreak,
    RangeInput {
        id: String,
        min: f64,
        max: f64,
        step: f64,
        value: f64,
    },
}

impl Element {
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::TextInput { id, .. } | Self::RangeInput { id, .. } => Some(id),
            Self::Text(_) | Self::LineBreak => None,
        }
    }

    /// Writes `position` into an input element. Other elements are left as is.
    pub fn set_position(&mut self, position: f64) {
        match self {
            Self::TextInput { value, .. } => *value = format_position(position),
            Self::RangeInput { value, .. } => *value = position,
            Self::Text(_) | Self::LineBreak => {}
        }
    }
}

pub(crate) fn format_position(position: f64) -> String {
    position.to_string()
}

/// Something rows of inputs can be appended to.
#[auto_impl(&mut, Box)]
pub trait Surface {
    fn append(&mut self, element: Element) -> ElementId;
    fn element(&self, id: ElementId) -> Option<&Element>;
    fn element_mut(&mut self, id: ElementId) -> Option<&mut Element>;
}

/// Append-only element list standing in for the page container.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Container {
    id: String,
    elements: Vec<Element>,
}

impl Container {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            elements: vec![],
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Finds an input by its `id` attribute.
    pub fn find_by_id(&self, id: &str) -> Option<ElementId> {
        self.elements
            .iter()
            .position(|element| element.id() == Some(id))
    }

    /// Replaces the raw text of a text input, as typing does. No event fires.
    pub fn set_text(&mut self, element: ElementId, text: impl Into<String>) -> bool {
        match self.elements.get_mut(element) {
            Some(Element::TextInput { value, .. }) => {
                *value = text.into();
                true
            }
            _ => false,
        }
    }

    /// Moves a range input, as dragging does. No event fires.
    pub fn set_range_value(&mut self, element: ElementId, position: f64) -> bool {
        match self.elements.get_mut(element) {
            Some(Element::RangeInput { value, .. }) => {
                *value = position;
                true
            }
            _ => false,
        }
    }
}

impl Surface for Container {
    fn append(&mut self, element: Element) -> ElementId {
        self.elements.push(element);
        self.elements.len() - 1
    }

    fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id)
    }

    fn element_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.get_mut(id)
    }
}

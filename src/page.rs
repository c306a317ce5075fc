// viewport-relative, like `getBoundingClientRect`
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// Lookups that find nothing return `None` or an empty list. Mutations on
/// detached nodes are ignored.
pub trait Page {
    type Element: Clone + PartialEq + 'static;

    fn query(&self, selector: &str) -> Option<Self::Element>;
    fn query_all(&self, selector: &str) -> Vec<Self::Element>;
    fn element_by_id(&self, id: &str) -> Option<Self::Element>;

    fn attribute(&self, element: &Self::Element, name: &str) -> Option<String>;
    fn has_class(&self, element: &Self::Element, class: &str) -> bool;
    fn set_class(&self, element: &Self::Element, class: &str, present: bool);

    fn style(&self, element: &Self::Element, property: &str) -> String;
    /// An empty `value` removes the inline property.
    fn set_style(&self, element: &Self::Element, property: &str, value: &str);

    fn text(&self, element: &Self::Element) -> String;
    fn set_text(&self, element: &Self::Element, text: &str);

    fn bounding_rect(&self, element: &Self::Element) -> Rect;
    fn offset_top(&self, element: &Self::Element) -> f64;
    fn offset_height(&self, element: &Self::Element) -> f64;
    fn offset_size(&self, element: &Self::Element) -> (f64, f64);

    fn create_element(&self, tag: &str) -> Option<Self::Element>;
    fn append_child(&self, parent: &Self::Element, child: &Self::Element);
    fn remove(&self, element: &Self::Element);
    fn head(&self) -> Option<Self::Element>;
    fn body(&self) -> Option<Self::Element>;

    fn scroll_y(&self) -> f64;
    fn inner_width(&self) -> f64;
    fn inner_height(&self) -> f64;
    fn scroll_to_smooth(&self, top: f64);

    fn form_fields(&self, form: &Self::Element) -> Vec<(String, String)>;
    fn reset_form(&self, form: &Self::Element);
}

/// Formats a CSS number the way script string coercion does: no trailing
/// `.0` and never a negative zero.
pub fn css_number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    format!("{value}")
}

pub fn css_px(value: f64) -> String {
    format!("{}px", css_number(value))
}

pub fn translate_y(offset: f64) -> String {
    format!("translateY({})", css_px(offset))
}

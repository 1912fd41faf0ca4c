use lopdf::{Dictionary, Object, ObjectId};

/// Resources a page's content stream refers to
#[derive(Debug, Default)]
pub struct PageResources {
    pub uses_font: bool,
    /// `(name, alpha)` for every transparency state in use
    pub alpha_states: Vec<(String, f64)>,
    pub xobjects: Vec<(String, ObjectId)>,
}

impl PageResources {
    pub const FONT_NAME: &'static str = "F1";

    /// Name of a graphics state with the given fill and stroke alpha,
    /// reusing an existing one when possible
    pub fn alpha_state(&mut self, alpha: f64) -> String {
        if let Some((name, _)) = self
            .alpha_states
            .iter()
            .find(|(_, a)| (a - alpha).abs() < 1e-6)
        {
            return name.clone();
        }
        let name = format!("GS{}", self.alpha_states.len());
        self.alpha_states.push((name.clone(), alpha));
        name
    }

    pub fn add_xobject(&mut self, id: ObjectId) -> String {
        let name = format!("Im{}", self.xobjects.len());
        self.xobjects.push((name.clone(), id));
        name
    }

    /// Build the `/Resources` dictionary. `font` must be given when any text
    /// was drawn.
    pub fn into_dictionary(self, font: Option<ObjectId>) -> Dictionary {
        let mut resources = Dictionary::new();

        if let (true, Some(font_id)) = (self.uses_font, font) {
            let mut fonts = Dictionary::new();
            fonts.set(Self::FONT_NAME, Object::Reference(font_id));
            resources.set("Font", Object::Dictionary(fonts));
        }

        if !self.alpha_states.is_empty() {
            let mut states = Dictionary::new();
            for (name, alpha) in self.alpha_states {
                let state = Dictionary::from_iter(vec![
                    ("Type", Object::Name(b"ExtGState".to_vec())),
                    ("ca", Object::Real(alpha as f32)),
                    ("CA", Object::Real(alpha as f32)),
                ]);
                states.set(name.into_bytes(), Object::Dictionary(state));
            }
            resources.set("ExtGState", Object::Dictionary(states));
        }

        if !self.xobjects.is_empty() {
            let mut xobjects = Dictionary::new();
            for (name, id) in self.xobjects {
                xobjects.set(name.into_bytes(), Object::Reference(id));
            }
            resources.set("XObject", Object::Dictionary(xobjects));
        }

        resources
    }
}

/// Standard Helvetica, which every PDF reader carries
pub fn helvetica() -> Dictionary {
    Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Font".to_vec())),
        ("Subtype", Object::Name(b"Type1".to_vec())),
        ("BaseFont", Object::Name(b"Helvetica".to_vec())),
        ("Encoding", Object::Name(b"WinAnsiEncoding".to_vec())),
    ])
}

//! KeyframeRegistry - named `@keyframes` animations.
//!
//! Unlike styles there is no unpublished state: an animation is rendered as
//! soon as it is created. Mutate the stored frames through
//! [`KeyframeRegistry::get_mut`] and call [`KeyframeRegistry::update`] to
//! re-render.

use indexmap::IndexMap;

use super::map::push_declaration;

/// Properties of one frame.
pub type FrameProps = IndexMap<String, String>;

/// Frame key (`0%`, `50%`, `from`, `to`) → properties, in order.
pub type Frames = IndexMap<String, FrameProps>;

/// Build [`Frames`] from nested `key => { prop => value }` pairs.
///
/// ```ignore
/// let fade = frames! {
///     "0%" => { "opacity" => "0" },
///     "100%" => { "opacity" => "1" },
/// };
/// ```
#[macro_export]
macro_rules! frames {
    ($($key:expr => { $($prop:expr => $value:expr),* $(,)? }),* $(,)?) => {{
        let mut frames = $crate::style::Frames::new();
        $(
            let mut props = $crate::style::FrameProps::new();
            $( props.insert(::std::string::String::from($prop), ::std::string::String::from($value)); )*
            frames.insert(::std::string::String::from($key), props);
        )*
        frames
    }};
}

/// A stored animation and its rendered rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyframes {
    frames: Frames,
    text: String,
}

impl Keyframes {
    pub fn frames(&self) -> &Frames {
        &self.frames
    }

    /// Frames for in-place edits. Call `update` afterwards.
    pub fn frames_mut(&mut self) -> &mut Frames {
        &mut self.frames
    }

    /// Rendered `@keyframes` rule as of the last create/update.
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Animations in registration order.
#[derive(Debug, Default, Clone)]
pub struct KeyframeRegistry {
    keyframes: IndexMap<String, Keyframes>,
}

impl KeyframeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store and render an animation. Re-creating a name replaces its frames
    /// but keeps its position.
    pub fn create(&mut self, name: &str, frames: Frames) -> &Keyframes {
        let text = render_keyframes(name, &frames);
        tracing::debug!(name, frames = frames.len(), "created animation");
        self.keyframes.insert(name.to_string(), Keyframes { frames, text });
        &self.keyframes[name]
    }

    /// Re-render `name` from its stored frames.
    pub fn update(&mut self, name: &str) -> bool {
        match self.keyframes.get_mut(name) {
            Some(keyframes) => {
                keyframes.text = render_keyframes(name, &keyframes.frames);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, name: &str) -> Option<&Keyframes> {
        self.keyframes.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Keyframes> {
        self.keyframes.get_mut(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Keyframes)> {
        self.keyframes.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }
}

fn render_keyframes(name: &str, frames: &Frames) -> String {
    let mut text = format!("@keyframes {name}{{");
    for (key, props) in frames {
        text.push_str(key);
        text.push('{');
        for (property, value) in props {
            push_declaration(&mut text, property, value);
        }
        text.push('}');
    }
    text.push('}');
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frames;

    #[test]
    fn test_create_renders_immediately() {
        let mut registry = KeyframeRegistry::new();
        let fade = registry.create(
            "fadeIn",
            frames! {
                "0%" => { "opacity" => "0" },
                "100%" => { "opacity" => "1", "backgroundColor" => "white" },
            },
        );
        assert_eq!(
            fade.text(),
            "@keyframes fadeIn{0%{opacity:0;}100%{opacity:1;background-color:white;}}"
        );
    }

    #[test]
    fn test_update_after_mutation() {
        let mut registry = KeyframeRegistry::new();
        registry.create("pulse", frames! { "0%" => { "opacity" => "1" } });

        let stored = registry.get_mut("pulse").unwrap();
        stored
            .frames_mut()
            .insert("50%".to_string(), FrameProps::from([("opacity".to_string(), "0.5".to_string())]));
        // Not re-rendered until update.
        assert_eq!(registry.get("pulse").unwrap().text(), "@keyframes pulse{0%{opacity:1;}}");

        assert!(registry.update("pulse"));
        assert_eq!(
            registry.get("pulse").unwrap().text(),
            "@keyframes pulse{0%{opacity:1;}50%{opacity:0.5;}}"
        );
        assert!(!registry.update("missing"));
    }

    #[test]
    fn test_registration_order() {
        let mut registry = KeyframeRegistry::new();
        registry.create("b", Frames::new());
        registry.create("a", Frames::new());
        registry.create("b", frames! { "to" => { "top" => "0" } });
        let names: Vec<_> = registry.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(registry.get("a").unwrap().text(), "@keyframes a{}");
    }
}

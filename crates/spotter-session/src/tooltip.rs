//! Tooltip placement and content for hovered matches.

use serde::{Deserialize, Serialize};
use spotter_core::config::TooltipConfig;
use spotter_definitions::DefinitionCache;

/// On-screen bounding box of a hovered element, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// What the tooltip currently shows, and where.
///
/// `x` is the horizontal center of the hovered element; `y` is the bottom
/// edge of the tooltip.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TooltipState {
    pub text: String,
    pub x: f64,
    pub y: f64,
}

/// Tracks hover events and derives the tooltip from the definition cache.
#[derive(Debug, Clone)]
pub struct TooltipController {
    config: TooltipConfig,
    current: Option<TooltipState>,
}

impl TooltipController {
    pub fn new(config: TooltipConfig) -> Self {
        Self {
            config,
            current: None,
        }
    }

    /// Show the definition for `text` above `rect`.
    ///
    /// Lookup normalizes `text` the way the annotator does, so the raw span
    /// text (with its punctuation) can be passed straight through.
    pub fn hover_enter(
        &mut self,
        text: &str,
        rect: BoundingBox,
        cache: &DefinitionCache,
    ) -> &TooltipState {
        let lookup = cache.lookup(text);
        let body = match (lookup.text, lookup.pending) {
            (Some(definition), _) => definition,
            (None, true) => self.config.loading_text.clone(),
            (None, false) => self.config.unavailable_text.clone(),
        };

        self.current.insert(TooltipState {
            text: body,
            x: rect.left + rect.width / 2.0,
            y: rect.top - self.config.offset_px,
        })
    }

    /// Hide the tooltip.
    pub fn hover_exit(&mut self) {
        self.current = None;
    }

    pub fn current(&self) -> Option<&TooltipState> {
        self.current.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spotter_annotate::KeywordSet;
    use spotter_definitions::{DefinitionError, Definitions};

    fn rect() -> BoundingBox {
        BoundingBox {
            left: 100.0,
            top: 200.0,
            width: 40.0,
            height: 18.0,
        }
    }

    fn cache_with(context: &str, defs: &[(&str, &str)]) -> DefinitionCache {
        let mut cache = DefinitionCache::new();
        let ticket = cache.begin(&KeywordSet::parse(context).unwrap());
        let definitions: Definitions = defs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        cache.complete(&ticket, Ok(definitions)).unwrap();
        cache
    }

    #[test]
    fn test_hover_shows_cached_definition() {
        let cache = cache_with("cat", &[("cat", "a small domesticated feline")]);
        let mut tooltip = TooltipController::new(TooltipConfig::default());

        let state = tooltip.hover_enter("Cat.", rect(), &cache).clone();
        assert_eq!(state.text, "a small domesticated feline");
        assert!((state.x - 120.0).abs() < f64::EPSILON);
        assert!((state.y - 190.0).abs() < f64::EPSILON);
        assert_eq!(tooltip.current(), Some(&state));
    }

    #[test]
    fn test_hover_while_pending_shows_loading() {
        let mut cache = DefinitionCache::new();
        cache.begin(&KeywordSet::parse("cat").unwrap());
        let mut tooltip = TooltipController::new(TooltipConfig::default());

        let state = tooltip.hover_enter("cat", rect(), &cache);
        assert_eq!(state.text, "Loading definition...");
    }

    #[test]
    fn test_hover_missing_definition_shows_unavailable() {
        let cache = cache_with("cat dog", &[("cat", "feline")]);
        let mut tooltip = TooltipController::new(TooltipConfig::default());

        let state = tooltip.hover_enter("dog", rect(), &cache);
        assert_eq!(state.text, "Definition unavailable");
    }

    #[test]
    fn test_hover_after_failed_request_shows_unavailable() {
        let mut cache = DefinitionCache::new();
        let ticket = cache.begin(&KeywordSet::parse("cat").unwrap());
        let _ = cache.complete(&ticket, Err(DefinitionError::Transport("down".to_string())));
        let mut tooltip = TooltipController::new(TooltipConfig::default());

        let state = tooltip.hover_enter("cat", rect(), &cache);
        assert_eq!(state.text, "Definition unavailable");
    }

    #[test]
    fn test_hover_exit_clears() {
        let cache = cache_with("cat", &[("cat", "feline")]);
        let mut tooltip = TooltipController::new(TooltipConfig::default());
        tooltip.hover_enter("cat", rect(), &cache);

        tooltip.hover_exit();
        assert!(tooltip.current().is_none());
        tooltip.hover_exit();
        assert!(tooltip.current().is_none());
    }

    #[test]
    fn test_custom_offset_and_placeholders() {
        let config = TooltipConfig {
            offset_px: 4.0,
            loading_text: "...".to_string(),
            unavailable_text: "n/a".to_string(),
        };
        let cache = DefinitionCache::new();
        let mut tooltip = TooltipController::new(config);

        let state = tooltip.hover_enter("zebra", rect(), &cache);
        assert_eq!(state.text, "n/a");
        assert!((state.y - 196.0).abs() < f64::EPSILON);
    }
}

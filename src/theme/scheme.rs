//! Preferred color scheme.
//!
//! One thread-local signal holds the preference and another the host's
//! system setting; [`is_dark`] combines both and is what the `dark`
//! condition reads.

use std::cell::RefCell;

use crate::properties::PropValue;
use crate::reactive::{signal, Signal};
use crate::types::Keyword;

crate::types::keyword_enum! {
    /// Which palette components should use.
    ColorScheme {
        Light => "light",
        Dark => "dark",
        #[default]
        System => "system",
    }
}

#[derive(Clone)]
struct SchemeState {
    preferred: Signal<ColorScheme>,
    system_dark: Signal<bool>,
}

thread_local! {
    static STATE: RefCell<Option<SchemeState>> = const { RefCell::new(None) };
}

fn state() -> SchemeState {
    STATE.with(|s| {
        s.borrow_mut()
            .get_or_insert_with(|| SchemeState {
                preferred: signal(ColorScheme::System),
                system_dark: signal(false),
            })
            .clone()
    })
}

/// Set the preferred color scheme for every root on this thread.
pub fn set_preferred_color_scheme(scheme: ColorScheme) {
    state().preferred.set(scheme);
}

/// Parse and set the preferred color scheme; unknown names are ignored.
pub fn set_preferred_color_scheme_name(name: &str) -> bool {
    match ColorScheme::from_name(name) {
        Some(scheme) => {
            set_preferred_color_scheme(scheme);
            true
        }
        None => false,
    }
}

pub fn preferred_color_scheme() -> ColorScheme {
    state().preferred.get()
}

/// Report the host's system preference, used when the scheme is `System`.
pub fn set_system_dark(dark: bool) {
    state().system_dark.set(dark);
}

/// Whether the dark palette is in effect (tracked).
pub fn is_dark() -> bool {
    let state = state();
    match state.preferred.get() {
        ColorScheme::Light => false,
        ColorScheme::Dark => true,
        ColorScheme::System => state.system_dark.get(),
    }
}

/// The `dark` condition input for a [`ConditionContext`].
///
/// [`ConditionContext`]: crate::properties::ConditionContext
pub fn dark_condition() -> PropValue<bool> {
    PropValue::getter(is_dark)
}

/// Reset scheme state (for testing).
pub fn reset_theme_state() {
    STATE.with(|s| *s.borrow_mut() = None);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::effect;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_system_follows_host() {
        reset_theme_state();
        assert!(!is_dark());
        set_system_dark(true);
        assert!(is_dark());

        set_preferred_color_scheme(ColorScheme::Light);
        assert!(!is_dark());
        reset_theme_state();
    }

    #[test]
    fn test_dark_is_reactive() {
        reset_theme_state();
        let seen = Rc::new(Cell::new(false));
        let seen_clone = seen.clone();
        let dark = dark_condition();
        let watcher = effect(move || seen_clone.set(dark.get()));

        assert!(!seen.get());
        assert!(set_preferred_color_scheme_name("dark"));
        assert!(seen.get());
        assert!(!set_preferred_color_scheme_name("sepia"));

        watcher.stop();
        reset_theme_state();
    }
}

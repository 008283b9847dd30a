//! Screen lifecycle shell
//!
//! Guarantees the fixed setup order for screens: bind first, toolbar second,
//! and nothing at all for screens that declare no layout.

pub mod survey;

pub use survey::{ScreenActivation, SurveyScreen};

use thiserror::Error;

/// Identifier of a screen's layout resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutId(pub u32);

impl LayoutId {
    /// Sentinel for screens that render no layout
    pub const NONE: LayoutId = LayoutId(0);

    /// Whether this is the no-layout sentinel
    pub fn is_none(&self) -> bool {
        self.0 == 0
    }
}

/// How a shell activation pass ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// Binding and toolbar are up
    Ready,
    /// The screen declared no layout; setup was skipped
    Skipped,
}

/// Screen setup errors
#[derive(Debug, Error)]
pub enum ScreenError {
    #[error("Binding failed: {0}")]
    Binding(String),

    #[error("Toolbar setup failed: {0}")]
    Toolbar(String),
}

/// What a concrete screen supplies to the activation shell
pub trait Screen {
    /// Layout to inflate, or [`LayoutId::NONE`] for layout-less screens
    fn layout_id(&self) -> LayoutId;

    /// Bind the layout to the screen state
    fn set_binding(&mut self) -> Result<(), ScreenError>;

    /// Configure the toolbar element once binding is up
    fn set_toolbar(&mut self) -> Result<(), ScreenError>;
}

/// Drive a screen through its fixed setup order
///
/// A zero layout id is a valid terminal state: the shell logs one warning and
/// touches neither binding nor toolbar. A binding failure makes the screen
/// unusable; it propagates to the caller unrecovered.
pub fn activate(screen: &mut dyn Screen) -> Result<Activation, ScreenError> {
    if screen.layout_id().is_none() {
        tracing::warn!("Layout id is zero");
        return Ok(Activation::Skipped);
    }

    screen.set_binding()?;
    screen.set_toolbar()?;

    Ok(Activation::Ready)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ProbeScreen {
        layout: LayoutId,
        calls: Vec<&'static str>,
        fail_binding: bool,
    }

    impl ProbeScreen {
        fn with_layout(layout: LayoutId) -> Self {
            Self {
                layout,
                calls: Vec::new(),
                fail_binding: false,
            }
        }
    }

    impl Screen for ProbeScreen {
        fn layout_id(&self) -> LayoutId {
            self.layout
        }

        fn set_binding(&mut self) -> Result<(), ScreenError> {
            self.calls.push("binding");
            if self.fail_binding {
                return Err(ScreenError::Binding("inflate failed".to_string()));
            }
            Ok(())
        }

        fn set_toolbar(&mut self) -> Result<(), ScreenError> {
            self.calls.push("toolbar");
            Ok(())
        }
    }

    #[test]
    fn test_zero_layout_skips_setup() {
        let mut screen = ProbeScreen::with_layout(LayoutId::NONE);

        let outcome = activate(&mut screen).unwrap();

        assert_eq!(outcome, Activation::Skipped);
        assert!(screen.calls.is_empty());
    }

    #[test]
    fn test_binding_runs_before_toolbar() {
        let mut screen = ProbeScreen::with_layout(LayoutId(11));

        let outcome = activate(&mut screen).unwrap();

        assert_eq!(outcome, Activation::Ready);
        assert_eq!(screen.calls, vec!["binding", "toolbar"]);
    }

    #[test]
    fn test_binding_failure_propagates() {
        let mut screen = ProbeScreen::with_layout(LayoutId(11));
        screen.fail_binding = true;

        assert!(activate(&mut screen).is_err());
        assert_eq!(screen.calls, vec!["binding"]);
    }
}

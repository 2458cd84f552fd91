//! Lifecycle of the presenter's progress indicator
//!
//! ```text
//!   Idle ──get_or_create──▶ Active ──drain──▶ Draining ──on_drained──▶ Idle
//! ```
//!
//! An indicator is created lazily when there is something to show and drained
//! as soon as its counters reach parity. Draining finishes the indicator,
//! which flushes the lines it buffered. The slot then waits in `Draining`
//! until the next render acknowledges the drain through
//! [`IndicatorSlot::on_drained`]; that render recreates an indicator if the
//! build has outstanding work again. Teardown uses [`IndicatorSlot::clear`],
//! which drains and acknowledges in one step.

use tracing::debug;

use crate::output::ProgressIndicator;

pub type BoxedIndicator = Box<dyn ProgressIndicator>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndicatorPhase {
    #[default]
    Idle,
    Active,
    Draining,
}

#[derive(Default)]
pub struct IndicatorSlot {
    phase: IndicatorPhase,
    indicator: Option<BoxedIndicator>,
    drained: usize,
}

impl IndicatorSlot {
    pub fn phase(&self) -> IndicatorPhase {
        self.phase
    }

    /// Number of indicators drained over the slot's lifetime
    pub fn drained(&self) -> usize {
        self.drained
    }

    /// The live indicator, if any
    pub fn active_mut(&mut self) -> Option<&mut BoxedIndicator> {
        self.indicator.as_mut()
    }

    /// The live indicator, creating one if there is none
    pub fn get_or_create(&mut self, create: impl FnOnce() -> BoxedIndicator) -> &mut BoxedIndicator {
        if self.indicator.is_none() {
            debug!(drained = self.drained, "IndicatorSlot::get_or_create: creating indicator");
            self.phase = IndicatorPhase::Active;
        }
        self.indicator.get_or_insert_with(create)
    }

    /// Drain the live indicator once its counters reach parity
    pub fn drain_if_complete(&mut self) -> bool {
        let complete = self.indicator.as_ref().is_some_and(|i| i.is_complete());
        complete && self.drain()
    }

    /// Finish the live indicator, leaving the slot `Draining`; returns whether one was drained
    pub fn drain(&mut self) -> bool {
        let Some(mut indicator) = self.indicator.take() else {
            return false;
        };
        debug!(
            position = indicator.position(),
            total = indicator.total(),
            "IndicatorSlot::drain: finishing indicator"
        );
        indicator.finish();
        self.drained += 1;
        self.phase = IndicatorPhase::Draining;
        true
    }

    /// Acknowledge a finished drain and return to `Idle`
    ///
    /// Returns true when a drain was pending, meaning the next indicator has
    /// to be created afresh.
    pub fn on_drained(&mut self) -> bool {
        if self.phase != IndicatorPhase::Draining {
            return false;
        }
        debug!(drained = self.drained, "IndicatorSlot::on_drained: back to idle");
        self.phase = IndicatorPhase::Idle;
        true
    }

    /// Drain and acknowledge in one step; returns whether an indicator was drained
    pub fn clear(&mut self) -> bool {
        let drained = self.drain();
        self.on_drained();
        drained
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::Output;
    use crate::testing::MemoryOutput;

    #[test]
    fn test_created_once_until_drained() {
        let output = MemoryOutput::terminal();
        let mut slot = IndicatorSlot::default();
        assert_eq!(slot.phase(), IndicatorPhase::Idle);
        assert!(slot.active_mut().is_none());

        slot.get_or_create(|| output.progress_indicator(2, 0)).increment(1);
        slot.get_or_create(|| output.progress_indicator(2, 0)).println("line");
        assert_eq!(slot.phase(), IndicatorPhase::Active);
        assert_eq!(output.indicators_created(), 1);

        assert!(!slot.drain_if_complete());
        slot.active_mut().unwrap().increment(1);
        assert!(slot.drain_if_complete());

        assert_eq!(slot.phase(), IndicatorPhase::Draining);
        assert!(slot.active_mut().is_none());
        assert_eq!(slot.drained(), 1);
        assert_eq!(output.lines(), vec!["line"]);

        assert!(slot.on_drained());
        assert_eq!(slot.phase(), IndicatorPhase::Idle);
        assert!(!slot.on_drained());

        slot.get_or_create(|| output.progress_indicator(4, 2));
        assert_eq!(output.indicators_created(), 2);
        assert_eq!(slot.phase(), IndicatorPhase::Active);
    }

    #[test]
    fn test_clear_settles_to_idle() {
        let output = MemoryOutput::terminal();
        let mut slot = IndicatorSlot::default();
        slot.get_or_create(|| output.progress_indicator(3, 0));

        assert!(slot.clear());
        assert_eq!(slot.phase(), IndicatorPhase::Idle);
        assert_eq!(output.indicators_finished(), 1);
    }

    #[test]
    fn test_drain_on_idle_slot_is_noop() {
        let mut slot = IndicatorSlot::default();
        assert!(!slot.drain());
        assert!(!slot.clear());
        assert_eq!(slot.phase(), IndicatorPhase::Idle);
        assert_eq!(slot.drained(), 0);
    }
}

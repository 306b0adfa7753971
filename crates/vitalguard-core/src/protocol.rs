//! Escalation protocol state machine.
//!
//! The protocol is expressed as pure transitions over [`ProtocolState`]:
//! [`ProtocolState::observe`] decides what a cycle requires given the new
//! abnormality score, and [`ProtocolState::resolve`] folds the outcome of a
//! confirmation prompt back into the state. Both return a fresh state, so
//! the whole escalation logic is unit-testable without any console I/O or
//! timers.
//!
//! Conceptual states are combinations of the flags rather than an explicit
//! enum: normal, awaiting-response (an earlier prompt went unanswered),
//! tracking-after-safe (the wearer confirmed safety during an active
//! episode and consecutive abnormal cycles are being counted), and the
//! transient alerted state.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Escalation thresholds, fixed for a session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// Score above which the wearer must confirm safety.
    pub escalation: f64,
    /// Cycle-over-cycle score increase treated as a sharp jump.
    pub sharp_jump: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            escalation: 45.0,
            sharp_jump: 20.0,
        }
    }
}

/// Mutable protocol state, created once per session.
///
/// `awaiting_response` and `previously_safe` are never both true: an
/// unanswered prompt takes precedence and clears the tracking flags when
/// it resolves.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ProtocolState {
    /// A prior prompt got no valid response; re-ask next cycle.
    pub awaiting_response: bool,
    /// Wearer confirmed safety during an active episode; consecutive
    /// abnormal cycles are being counted.
    pub previously_safe: bool,
    /// Abnormal cycles observed since the last safe confirmation.
    pub consecutive_abnormal: u32,
    /// An alert is outstanding (sent and not yet acknowledged as resolved).
    pub alert_sent: bool,
    /// Previous cycle's score, used only for sharp-jump detection.
    pub last_score: Option<f64>,
}

/// What a monitoring cycle requires, as decided by [`ProtocolState::observe`].
#[derive(Debug, Clone, PartialEq)]
pub enum CycleDirective {
    /// No prompt this cycle.
    Continue(CycleStatus),
    /// A confirmation prompt must be issued.
    Prompt(PromptReason),
}

/// Status reported for a cycle that needs no prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CycleStatus {
    /// Score at or below the escalation threshold, nothing tracked.
    Normal,
    /// Score returned to the normal range while tracking; the episode is
    /// over and the counters were cleared.
    EpisodeCleared,
    /// Abnormal cycle within a tracked episode, not yet enough to re-ask.
    Tracking {
        /// Consecutive abnormal cycles since the safe confirmation.
        consecutive: u32,
    },
}

/// Why a confirmation prompt is being issued.
#[derive(Debug, Clone, PartialEq)]
pub enum PromptReason {
    /// Re-asking because the previous cycle's prompt went unanswered.
    Reprompt,
    /// Score crossed the escalation threshold outside a tracked episode.
    Escalation,
    /// Sharp score jump within a tracked episode.
    SharpJump {
        /// Score increase over the previous cycle.
        delta: f64,
    },
    /// Third consecutive abnormal cycle within a tracked episode.
    ConsecutiveAbnormal {
        /// Current consecutive count (>= 3).
        count: u32,
    },
}

/// Outcome of a confirmation prompt, as seen by the protocol.
///
/// A termination request is handled by the orchestrator before the state
/// is resolved, so it never reaches the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptOutcome {
    /// Wearer confirmed safety with a valid response.
    Confirmed,
    /// Timeout, invalid PIN, or any non-affirmative response.
    Unsafe,
}

/// Side effect requested by [`ProtocolState::resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolEffect {
    /// Wearer is safe; `alert_cleared` is true when an outstanding alert
    /// was acknowledged by this confirmation and the contacts should be
    /// told the wearer is fine.
    ConfirmedSafe {
        /// An alert had been sent and is now considered resolved.
        alert_cleared: bool,
    },
    /// Emergency contacts must be notified.
    AlertRequired,
}

impl ProtocolState {
    /// Fresh state for a new session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide what this cycle requires given the new score.
    ///
    /// Pure: returns the successor state and a directive. The unanswered
    /// prompt check comes first and wins regardless of the current score;
    /// the sharp-jump comparison uses the previous cycle's score and runs
    /// before the consecutive counter is incremented.
    pub fn observe(&self, score: f64, thresholds: &Thresholds) -> (ProtocolState, CycleDirective) {
        let mut next = self.clone();

        if self.awaiting_response {
            return (next, CycleDirective::Prompt(PromptReason::Reprompt));
        }

        if score > thresholds.escalation {
            if self.previously_safe {
                let jump = self.last_score.map(|previous| score - previous);
                let sharp = jump.is_some_and(|delta| delta > thresholds.sharp_jump);
                next.consecutive_abnormal += 1;

                if sharp {
                    let delta = jump.unwrap_or_default();
                    (next, CycleDirective::Prompt(PromptReason::SharpJump { delta }))
                } else if next.consecutive_abnormal >= 3 {
                    let count = next.consecutive_abnormal;
                    (
                        next,
                        CycleDirective::Prompt(PromptReason::ConsecutiveAbnormal { count }),
                    )
                } else {
                    let consecutive = next.consecutive_abnormal;
                    (
                        next,
                        CycleDirective::Continue(CycleStatus::Tracking { consecutive }),
                    )
                }
            } else {
                (next, CycleDirective::Prompt(PromptReason::Escalation))
            }
        } else if self.previously_safe {
            // A normal reading breaks the tracked episode.
            next.previously_safe = false;
            next.consecutive_abnormal = 0;
            (next, CycleDirective::Continue(CycleStatus::EpisodeCleared))
        } else {
            (next, CycleDirective::Continue(CycleStatus::Normal))
        }
    }

    /// Fold a prompt outcome back into the state.
    pub fn resolve(
        &self,
        reason: &PromptReason,
        outcome: PromptOutcome,
    ) -> (ProtocolState, ProtocolEffect) {
        let mut next = self.clone();
        next.consecutive_abnormal = 0;
        next.previously_safe = false;

        match (reason, outcome) {
            (PromptReason::Reprompt, PromptOutcome::Confirmed) => {
                let alert_cleared = self.alert_sent;
                next.awaiting_response = false;
                next.alert_sent = false;
                (next, ProtocolEffect::ConfirmedSafe { alert_cleared })
            }
            (PromptReason::Reprompt, PromptOutcome::Unsafe) => {
                next.awaiting_response = false;
                next.alert_sent = true;
                (next, ProtocolEffect::AlertRequired)
            }
            (PromptReason::Escalation, PromptOutcome::Confirmed) => {
                // Start tracking; the counter increments on the next
                // abnormal cycle.
                next.previously_safe = true;
                (next, ProtocolEffect::ConfirmedSafe { alert_cleared: false })
            }
            (
                PromptReason::SharpJump { .. } | PromptReason::ConsecutiveAbnormal { .. },
                PromptOutcome::Confirmed,
            ) => (next, ProtocolEffect::ConfirmedSafe { alert_cleared: false }),
            (_, PromptOutcome::Unsafe) => {
                next.awaiting_response = true;
                next.alert_sent = true;
                (next, ProtocolEffect::AlertRequired)
            }
        }
    }

    /// Record the cycle's score for next cycle's jump detection. Skipped by
    /// the orchestrator while the window is still filling.
    pub fn with_score_recorded(&self, score: f64) -> ProtocolState {
        let mut next = self.clone();
        next.last_score = Some(score);
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thresholds() -> Thresholds {
        Thresholds::default()
    }

    /// Run observe + optional resolve + score recording, like one
    /// orchestrator cycle.
    fn cycle(
        state: &ProtocolState,
        score: f64,
        outcome: Option<PromptOutcome>,
    ) -> (ProtocolState, CycleDirective) {
        let (mut next, directive) = state.observe(score, &thresholds());
        if let CycleDirective::Prompt(reason) = &directive {
            let outcome = outcome.expect("test must supply an outcome for a prompt");
            let (resolved, _effect) = next.resolve(reason, outcome);
            next = resolved;
        }
        (next.with_score_recorded(score), directive)
    }

    #[test]
    fn normal_score_needs_no_prompt() {
        let state = ProtocolState::new();
        let (next, directive) = state.observe(30.0, &thresholds());
        assert_eq!(directive, CycleDirective::Continue(CycleStatus::Normal));
        assert_eq!(next, state);
    }

    #[test]
    fn threshold_is_strictly_greater() {
        let state = ProtocolState::new();
        let (_, directive) = state.observe(45.0, &thresholds());
        assert_eq!(directive, CycleDirective::Continue(CycleStatus::Normal));
        let (_, directive) = state.observe(45.5, &thresholds());
        assert_eq!(directive, CycleDirective::Prompt(PromptReason::Escalation));
    }

    #[test]
    fn escalation_confirmed_starts_tracking() {
        let state = ProtocolState::new();
        let (state, directive) = cycle(&state, 50.0, Some(PromptOutcome::Confirmed));
        assert_eq!(directive, CycleDirective::Prompt(PromptReason::Escalation));
        assert!(state.previously_safe);
        assert_eq!(state.consecutive_abnormal, 0);
        assert!(!state.awaiting_response);
    }

    #[test]
    fn escalation_unsafe_sets_awaiting_and_alert() {
        let state = ProtocolState::new();
        let (next, directive) = state.observe(60.0, &thresholds());
        let CycleDirective::Prompt(reason) = directive else {
            panic!("expected prompt");
        };
        let (next, effect) = next.resolve(&reason, PromptOutcome::Unsafe);
        assert_eq!(effect, ProtocolEffect::AlertRequired);
        assert!(next.awaiting_response);
        assert!(next.alert_sent);
        assert!(!next.previously_safe);
    }

    #[test]
    fn sharp_jump_scenario() {
        // Score sequence [50, 46, 75]: confirm at 50, then 46 tracks
        // quietly (delta -4), then 75 jumps 29 > 20 and prompts regardless
        // of the consecutive count.
        let state = ProtocolState::new();
        let (state, _) = cycle(&state, 50.0, Some(PromptOutcome::Confirmed));

        let (state, directive) = state.observe(46.0, &thresholds());
        assert_eq!(
            directive,
            CycleDirective::Continue(CycleStatus::Tracking { consecutive: 1 })
        );
        let state = state.with_score_recorded(46.0);

        let (_, directive) = state.observe(75.0, &thresholds());
        match directive {
            CycleDirective::Prompt(PromptReason::SharpJump { delta }) => {
                assert!((delta - 29.0).abs() < f64::EPSILON);
            }
            other => panic!("expected sharp jump prompt, got {other:?}"),
        }
    }

    #[test]
    fn third_consecutive_abnormal_prompts() {
        // Scores [50, 50, 50, 50] after initial confirmation: the first two
        // tracked cycles stay quiet, the third prompts.
        let state = ProtocolState::new();
        let (state, _) = cycle(&state, 50.0, Some(PromptOutcome::Confirmed));

        let (state, directive) = state.observe(50.0, &thresholds());
        assert_eq!(
            directive,
            CycleDirective::Continue(CycleStatus::Tracking { consecutive: 1 })
        );
        let state = state.with_score_recorded(50.0);

        let (state, directive) = state.observe(50.0, &thresholds());
        assert_eq!(
            directive,
            CycleDirective::Continue(CycleStatus::Tracking { consecutive: 2 })
        );
        let state = state.with_score_recorded(50.0);

        let (_, directive) = state.observe(50.0, &thresholds());
        assert_eq!(
            directive,
            CycleDirective::Prompt(PromptReason::ConsecutiveAbnormal { count: 3 })
        );
    }

    #[test]
    fn tracked_confirmation_stops_tracking() {
        let state = ProtocolState::new();
        let (state, _) = cycle(&state, 50.0, Some(PromptOutcome::Confirmed));
        let (state, _) = cycle(&state, 50.0, None);
        let (state, _) = cycle(&state, 50.0, None);
        // Third consecutive prompts; confirming clears the episode.
        let (state, directive) = cycle(&state, 50.0, Some(PromptOutcome::Confirmed));
        assert!(matches!(
            directive,
            CycleDirective::Prompt(PromptReason::ConsecutiveAbnormal { .. })
        ));
        assert!(!state.previously_safe);
        assert_eq!(state.consecutive_abnormal, 0);
        // Next abnormal cycle escalates as a fresh episode.
        let (_, directive) = state.observe(50.0, &thresholds());
        assert_eq!(directive, CycleDirective::Prompt(PromptReason::Escalation));
    }

    #[test]
    fn normal_cycle_clears_tracked_episode() {
        let state = ProtocolState::new();
        let (state, _) = cycle(&state, 50.0, Some(PromptOutcome::Confirmed));
        let (state, _) = cycle(&state, 50.0, None);
        assert_eq!(state.consecutive_abnormal, 1);

        let (next, directive) = state.observe(20.0, &thresholds());
        assert_eq!(directive, CycleDirective::Continue(CycleStatus::EpisodeCleared));
        assert!(!next.previously_safe);
        assert_eq!(next.consecutive_abnormal, 0);
    }

    #[test]
    fn awaiting_response_takes_precedence_over_normal_score() {
        let mut state = ProtocolState::new();
        state.awaiting_response = true;
        state.alert_sent = true;
        // Even a normal score re-prompts first.
        let (_, directive) = state.observe(10.0, &thresholds());
        assert_eq!(directive, CycleDirective::Prompt(PromptReason::Reprompt));
    }

    #[test]
    fn reprompt_confirmed_clears_everything_and_reports_alert() {
        let mut state = ProtocolState::new();
        state.awaiting_response = true;
        state.alert_sent = true;
        let (next, effect) = state.resolve(&PromptReason::Reprompt, PromptOutcome::Confirmed);
        assert_eq!(effect, ProtocolEffect::ConfirmedSafe { alert_cleared: true });
        assert!(!next.awaiting_response);
        assert!(!next.alert_sent);
        assert!(!next.previously_safe);
        assert_eq!(next.consecutive_abnormal, 0);
    }

    #[test]
    fn reprompt_unsafe_realerts_without_reentering_awaiting() {
        let mut state = ProtocolState::new();
        state.awaiting_response = true;
        state.alert_sent = true;
        let (next, effect) = state.resolve(&PromptReason::Reprompt, PromptOutcome::Unsafe);
        assert_eq!(effect, ProtocolEffect::AlertRequired);
        assert!(!next.awaiting_response);
        assert!(next.alert_sent);
    }

    #[test]
    fn no_jump_detection_without_previous_score() {
        // First tracked cycle after confirmation has last_score unset when
        // the window just filled; a high score must not count as a jump.
        let mut state = ProtocolState::new();
        state.previously_safe = true;
        assert!(state.last_score.is_none());
        let (_, directive) = state.observe(90.0, &thresholds());
        assert_eq!(
            directive,
            CycleDirective::Continue(CycleStatus::Tracking { consecutive: 1 })
        );
    }

    #[test]
    fn flags_stay_mutually_exclusive() {
        let state = ProtocolState::new();
        let (state, _) = cycle(&state, 50.0, Some(PromptOutcome::Unsafe));
        assert!(state.awaiting_response && !state.previously_safe);
        let (state, _) = cycle(&state, 50.0, Some(PromptOutcome::Confirmed));
        assert!(!state.awaiting_response && !state.previously_safe);
    }
}

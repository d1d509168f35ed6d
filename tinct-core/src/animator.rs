//! Animated palette transitions.
//!
//! A transition interpolates from whatever the host currently shows to a
//! target palette over a fixed number of frames, easing with smoothstep.
//! Starting a new transition supersedes the running one: the generation
//! counter and the cancellation token are swapped under one lock, and every
//! publish re-checks the generation under that same lock, so a superseded
//! transition can never write another frame.

use std::{sync::Arc, time::Duration};

use parking_lot::Mutex;
use tinct_model::{Palette, PaletteField};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::config::ThemingConfig;
use crate::constants::transition::{DURATION_MS, SKIP_DISTANCE, STEPS};
use crate::error::{Result, ThemeError};
use crate::sink::{ThemeSink, capture_palette, palette_resources};

/// Fields compared to decide whether a transition is visible at all.
const PROBE_FIELDS: [PaletteField; 3] = [
    PaletteField::Accent,
    PaletteField::OverlayMid,
    PaletteField::MenuBorderEnd,
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionSettings {
    pub steps: u32,
    pub duration: Duration,
    pub skip_distance: f64,
}

impl Default for TransitionSettings {
    fn default() -> Self {
        Self {
            steps: STEPS,
            duration: Duration::from_millis(DURATION_MS),
            skip_distance: SKIP_DISTANCE,
        }
    }
}

impl TransitionSettings {
    pub fn from_config(config: &ThemingConfig) -> Self {
        Self {
            steps: config.transition_steps.max(1),
            duration: config.transition_duration(),
            skip_distance: config.skip_distance,
        }
    }

    fn frame_interval(&self) -> Duration {
        self.duration / self.steps.max(1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// Target was indistinguishable from what was shown; published once.
    Skipped,
    /// Every frame was published.
    Completed,
}

#[derive(Debug, Default)]
struct AnimatorState {
    generation: u64,
    token: CancellationToken,
    last_target: Option<Palette>,
}

pub struct TransitionAnimator {
    sink: Arc<dyn ThemeSink>,
    settings: TransitionSettings,
    state: Mutex<AnimatorState>,
}

impl std::fmt::Debug for TransitionAnimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("TransitionAnimator")
            .field("settings", &self.settings)
            .field("generation", &state.generation)
            .field("has_target", &state.last_target.is_some())
            .finish()
    }
}

/// `t² (3 - 2t)`, with `t` clamped to `0..=1`.
pub fn smoothstep(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// True when every probe field moves less than `threshold`.
pub fn is_imperceptible(from: &Palette, to: &Palette, threshold: f64) -> bool {
    PROBE_FIELDS
        .iter()
        .all(|field| from.get(*field).distance(to.get(*field)) < threshold)
}

impl TransitionAnimator {
    pub fn new(sink: Arc<dyn ThemeSink>, settings: TransitionSettings) -> Self {
        Self {
            sink,
            settings,
            state: Mutex::new(AnimatorState::default()),
        }
    }

    pub fn settings(&self) -> TransitionSettings {
        self.settings
    }

    /// Most recent palette a transition was started towards.
    pub fn last_target(&self) -> Option<Palette> {
        self.state.lock().last_target
    }

    /// Animate to `target`. Returns [`ThemeError::TransitionAborted`] when a
    /// newer transition (or [`cancel`](Self::cancel)) takes over midway.
    pub async fn transition(
        &self,
        target: Palette,
    ) -> Result<TransitionOutcome> {
        self.begin_transition(target).run().await
    }

    /// Supersede the running transition and capture the starting palette
    /// now; frames are only published once the returned value is run.
    pub fn begin_transition(&self, target: Palette) -> Transition<'_> {
        let mut state = self.state.lock();
        let token = Self::supersede(&mut state);
        let fallback = state.last_target.unwrap_or(target);
        let from = capture_palette(self.sink.as_ref(), &fallback);
        state.last_target = Some(target);
        Transition {
            animator: self,
            generation: state.generation,
            token,
            from,
            target,
        }
    }

    /// Publish `palette` at once, superseding any running transition.
    pub fn apply_immediately(&self, palette: Palette) {
        let mut state = self.state.lock();
        Self::supersede(&mut state);
        state.last_target = Some(palette);
        self.sink.apply(palette_resources(&palette));
    }

    /// Stop the running transition, if any. No further frames from it are
    /// published.
    pub fn cancel(&self) {
        let mut state = self.state.lock();
        Self::supersede(&mut state);
    }

    fn supersede(state: &mut AnimatorState) -> CancellationToken {
        state.generation = state.generation.wrapping_add(1);
        let next = CancellationToken::new();
        let previous = std::mem::replace(&mut state.token, next.clone());
        previous.cancel();
        next
    }

    fn publish(&self, generation: u64, palette: &Palette) -> Result<()> {
        let state = self.state.lock();
        if state.generation != generation {
            return Err(ThemeError::TransitionAborted);
        }
        self.sink.apply(palette_resources(palette));
        Ok(())
    }
}

/// A started transition. Dropping it without running publishes nothing.
#[derive(Debug)]
pub struct Transition<'a> {
    animator: &'a TransitionAnimator,
    generation: u64,
    token: CancellationToken,
    from: Palette,
    target: Palette,
}

impl Transition<'_> {
    pub async fn run(self) -> Result<TransitionOutcome> {
        let Transition {
            animator,
            generation,
            token,
            from,
            target,
        } = self;
        let settings = animator.settings;

        if is_imperceptible(&from, &target, settings.skip_distance) {
            trace!(generation, "transition below skip distance");
            animator.publish(generation, &target)?;
            return Ok(TransitionOutcome::Skipped);
        }

        let steps = settings.steps.max(1);
        let frame = settings.frame_interval();
        debug!(generation, steps, ?frame, "transition started");

        for step in 1..=steps {
            tokio::select! {
                _ = token.cancelled() => {
                    return Err(ThemeError::TransitionAborted);
                }
                _ = tokio::time::sleep(frame) => {}
            }
            let eased = smoothstep(f64::from(step) / f64::from(steps));
            let palette = if step == steps {
                target
            } else {
                Palette::lerp(&from, &target, eased)
            };
            animator.publish(generation, &palette)?;
        }
        Ok(TransitionOutcome::Completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::synthesize;
    use crate::sink::InMemorySink;
    use tinct_model::Rgb;

    fn animator() -> (Arc<InMemorySink>, Arc<TransitionAnimator>) {
        let sink = Arc::new(InMemorySink::new());
        let animator = Arc::new(TransitionAnimator::new(
            sink.clone(),
            TransitionSettings::default(),
        ));
        (sink, animator)
    }

    #[test]
    fn smoothstep_shape() {
        assert_eq!(smoothstep(0.0), 0.0);
        assert_eq!(smoothstep(1.0), 1.0);
        assert_eq!(smoothstep(0.5), 0.5);
        assert!(smoothstep(0.25) < 0.25);
        assert!(smoothstep(0.75) > 0.75);
        assert_eq!(smoothstep(2.0), 1.0);
    }

    #[tokio::test(start_paused = true)]
    async fn first_transition_with_empty_host_publishes_once() {
        // Nothing shown yet: "from" falls back to the target itself.
        let (sink, animator) = animator();
        let target = synthesize(Rgb::new(200, 60, 60));

        let outcome = animator.transition(target).await.unwrap();
        assert_eq!(outcome, TransitionOutcome::Skipped);
        assert_eq!(sink.apply_count(), 1);
        assert_eq!(sink.palette(), Some(target));
    }

    #[tokio::test(start_paused = true)]
    async fn near_identical_target_is_skipped() {
        let (sink, animator) = animator();
        animator.apply_immediately(synthesize(Rgb::new(200, 60, 60)));
        let target = synthesize(Rgb::new(202, 61, 60));

        let outcome = animator.transition(target).await.unwrap();
        assert_eq!(outcome, TransitionOutcome::Skipped);
        assert_eq!(sink.apply_count(), 2);
        assert_eq!(sink.palette(), Some(target));
    }

    #[tokio::test(start_paused = true)]
    async fn distant_target_animates_every_frame() {
        let (sink, animator) = animator();
        let from = synthesize(Rgb::new(200, 60, 60));
        let target = synthesize(Rgb::new(30, 90, 220));
        animator.apply_immediately(from);

        let start = tokio::time::Instant::now();
        let outcome = animator.transition(target).await.unwrap();
        assert_eq!(outcome, TransitionOutcome::Completed);
        assert_eq!(sink.apply_count(), 1 + STEPS as usize);
        assert_eq!(sink.palette(), Some(target));
        assert!(start.elapsed() >= Duration::from_millis(DURATION_MS));
    }

    #[tokio::test(start_paused = true)]
    async fn superseded_transition_never_publishes_again() {
        let (sink, animator) = animator();
        animator.apply_immediately(synthesize(Rgb::new(200, 60, 60)));

        let first = {
            let animator = Arc::clone(&animator);
            tokio::spawn(async move {
                animator.transition(synthesize(Rgb::new(30, 90, 220))).await
            })
        };
        tokio::time::sleep(Duration::from_millis(70)).await;

        let last = synthesize(Rgb::new(40, 200, 80));
        let second = animator.transition(last).await.unwrap();
        assert_eq!(second, TransitionOutcome::Completed);

        assert!(matches!(
            first.await.unwrap(),
            Err(ThemeError::TransitionAborted)
        ));
        let published = sink.apply_count();
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(sink.apply_count(), published);
        assert_eq!(sink.palette(), Some(last));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_publishing() {
        let (sink, animator) = animator();
        animator.apply_immediately(synthesize(Rgb::new(200, 60, 60)));

        let running = {
            let animator = Arc::clone(&animator);
            tokio::spawn(async move {
                animator.transition(synthesize(Rgb::new(30, 90, 220))).await
            })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        animator.cancel();
        let published = sink.apply_count();

        assert!(running.await.unwrap().is_err());
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(sink.apply_count(), published);
    }
}

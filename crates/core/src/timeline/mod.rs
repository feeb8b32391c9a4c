use std::{cell::Cell, rc::Rc};

use crate::{
    analysis::{AnalysisFeed, AudioAnalysisResult},
    config::RenderConfig,
    render::{RenderLoop, Surface},
    settings::VisualizationSettings,
};

/// Single-threaded cancellation flag shared between a renderer and whatever
/// drives its frames.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Rc<Cell<bool>>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}

#[derive(Debug, Default, Clone)]
pub struct PlaybackClock {
    pub time_seconds: f32,
}

impl PlaybackClock {
    pub fn reset(&mut self) {
        self.time_seconds = 0.0;
    }

    pub fn advance(&mut self, delta: f32) {
        self.time_seconds = (self.time_seconds + delta).max(0.0);
    }
}

/// Inputs the host hands over for one frame tick.
#[derive(Debug, Clone, Default)]
pub struct FrameInput {
    /// Replacement settings when the user edited something this tick.
    pub settings: Option<VisualizationSettings>,
    /// Fresh analysis, if the audio side produced one in time.
    pub analysis: Option<AudioAnalysisResult>,
    /// Host resize, applied before the frame is drawn.
    pub resize: Option<(u32, u32)>,
}

/// Supplies per-tick input to a [`FrameDriver`]. Returning `None` ends the run.
pub trait FrameSource {
    fn next_frame(&mut self, frame_index: u64, clock: &PlaybackClock) -> Option<FrameInput>;
}

impl<F> FrameSource for F
where
    F: FnMut(u64, &PlaybackClock) -> Option<FrameInput>,
{
    fn next_frame(&mut self, frame_index: u64, clock: &PlaybackClock) -> Option<FrameInput> {
        self(frame_index, clock)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: u64,
    pub shape_draw_calls: usize,
    /// Frames drawn with a reused analysis snapshot.
    pub stale_frames: u64,
    pub cancelled: bool,
}

/// Explicit frame loop. Each iteration checks the cancellation token, pulls
/// input, and renders exactly one frame.
#[derive(Debug)]
pub struct FrameDriver {
    token: CancellationToken,
    clock: PlaybackClock,
    frame_seconds: f32,
    settings: VisualizationSettings,
    feed: AnalysisFeed,
}

impl FrameDriver {
    /// Paces the clock at `render.fps`.
    pub fn new(
        token: CancellationToken,
        render: &RenderConfig,
        settings: VisualizationSettings,
    ) -> Self {
        Self {
            token,
            clock: PlaybackClock::default(),
            frame_seconds: render.frame_seconds(),
            settings,
            feed: AnalysisFeed::new(),
        }
    }

    pub fn clock(&self) -> &PlaybackClock {
        &self.clock
    }

    pub fn settings(&self) -> &VisualizationSettings {
        &self.settings
    }

    /// Runs until the source is exhausted, `max_frames` were drawn, or the
    /// token is cancelled.
    pub fn run<S, F>(
        &mut self,
        render: &mut RenderLoop<S>,
        source: &mut F,
        max_frames: u64,
    ) -> RunSummary
    where
        S: Surface,
        F: FrameSource + ?Sized,
    {
        let mut summary = RunSummary::default();

        while summary.frames < max_frames {
            if self.token.is_cancelled() {
                summary.cancelled = true;
                break;
            }
            let Some(input) = source.next_frame(summary.frames, &self.clock) else {
                break;
            };

            if let Some(settings) = input.settings {
                self.settings = settings;
            }
            if let Some(analysis) = input.analysis {
                self.feed.publish(analysis);
            }
            if let Some((width, height)) = input.resize {
                render.resize(width, height);
            }

            let sample = self.feed.current();
            if sample.stale {
                summary.stale_frames += 1;
            }

            // The source may have torn the renderer down during this tick.
            if self.token.is_cancelled() {
                summary.cancelled = true;
                break;
            }
            let stats = render.frame(&self.settings, &sample.result);
            summary.shape_draw_calls += stats.shape_draw_calls;
            summary.frames += 1;
            self.clock.advance(self.frame_seconds);
        }

        tracing::debug!(
            frames = summary.frames,
            stale = summary.stale_frames,
            cancelled = summary.cancelled,
            "frame loop finished"
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        geometry::GeometryParams,
        render::{RecordingSurface, Viewport},
        ShapeKind,
    };

    fn at_fps(fps: u32) -> RenderConfig {
        RenderConfig {
            fps,
            ..Default::default()
        }
    }

    fn renderer() -> RenderLoop<RecordingSurface> {
        RenderLoop::mount(
            Some(RecordingSurface::new()),
            Viewport::new(64, 64),
            GeometryParams::default(),
        )
    }

    #[test]
    fn clock_never_goes_negative() {
        let mut clock = PlaybackClock::default();
        clock.advance(0.5);
        clock.advance(-2.0);
        assert_eq!(clock.time_seconds, 0.0);
        clock.advance(0.25);
        clock.reset();
        assert_eq!(clock.time_seconds, 0.0);
    }

    #[test]
    fn runs_requested_number_of_frames() {
        let mut render = renderer();
        let mut driver = FrameDriver::new(
            render.cancellation_token(),
            &at_fps(50),
            VisualizationSettings::default(),
        );
        let mut source = |_: u64, _: &PlaybackClock| Some(FrameInput::default());

        let summary = driver.run(&mut render, &mut source, 25);
        assert_eq!(summary.frames, 25);
        assert_eq!(summary.shape_draw_calls, 50);
        assert!(!summary.cancelled);
        assert!((driver.clock().time_seconds - 0.5).abs() < 1e-5);
    }

    #[test]
    fn stale_analysis_is_reused() {
        let mut render = renderer();
        let mut driver = FrameDriver::new(
            render.cancellation_token(),
            &at_fps(60),
            VisualizationSettings::default(),
        );
        let mut source = |frame: u64, _: &PlaybackClock| {
            Some(FrameInput {
                analysis: (frame % 3 == 0).then(|| AudioAnalysisResult::new(0.9, 300.0, None)),
                ..Default::default()
            })
        };

        let summary = driver.run(&mut render, &mut source, 9);
        assert_eq!(summary.frames, 9);
        assert_eq!(summary.stale_frames, 6);
        let flower = render.scene().get(ShapeKind::FlowerOfLife).unwrap();
        assert!(flower.transform.scale > 1.0);
    }

    #[test]
    fn settings_are_replaced_wholesale() {
        let mut render = renderer();
        let mut driver = FrameDriver::new(
            render.cancellation_token(),
            &at_fps(60),
            VisualizationSettings::default(),
        );
        let mut source = |frame: u64, _: &PlaybackClock| {
            Some(FrameInput {
                settings: (frame == 2).then(|| {
                    VisualizationSettings::default().with_active_shapes([ShapeKind::PrimeSpiral])
                }),
                ..Default::default()
            })
        };

        driver.run(&mut render, &mut source, 4);
        assert_eq!(render.scene().shapes(), vec![ShapeKind::PrimeSpiral]);
        assert_eq!(driver.settings().active_shapes.len(), 1);
    }

    #[test]
    fn source_exhaustion_ends_the_run() {
        let mut render = renderer();
        let mut driver = FrameDriver::new(
            render.cancellation_token(),
            &at_fps(60),
            VisualizationSettings::default(),
        );
        let mut source =
            |frame: u64, _: &PlaybackClock| (frame < 3).then(FrameInput::default);

        let summary = driver.run(&mut render, &mut source, 100);
        assert_eq!(summary.frames, 3);
        assert!(!summary.cancelled);
    }

    #[test]
    fn cancellation_stops_the_loop() {
        let mut render = renderer();
        let token = render.cancellation_token();
        let mut driver =
            FrameDriver::new(token.clone(), &at_fps(60), VisualizationSettings::default());
        let mut source = |frame: u64, _: &PlaybackClock| {
            if frame == 4 {
                token.cancel();
            }
            Some(FrameInput::default())
        };

        let summary = driver.run(&mut render, &mut source, 100);
        assert_eq!(summary.frames, 4);
        assert!(summary.cancelled);
    }

    #[test]
    fn resize_is_forwarded() {
        let mut render = renderer();
        let mut driver = FrameDriver::new(
            render.cancellation_token(),
            &at_fps(60),
            VisualizationSettings::default(),
        );
        let mut source = |_: u64, _: &PlaybackClock| {
            Some(FrameInput {
                resize: Some((320, 200)),
                ..Default::default()
            })
        };
        driver.run(&mut render, &mut source, 1);
        assert_eq!(render.viewport(), Viewport::new(320, 200));
    }
}
